// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template rendering: loops, then conditionals, then variables.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::condition::evaluate_condition;
use crate::format::format_value;
use crate::path::resolve;

/// Default cap on iterations of a single `{{for}}` loop.
pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 50;

/// Brackets the index of a finished loop's output while the outer passes run.
const LOOP_OPEN: char = '\u{E000}';
const LOOP_CLOSE: char = '\u{E001}';

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_\-]*(?:\.[A-Za-z0-9_\-]+|\[\s*\d+\s*\])*)\s*\}\}")
        .expect("variable pattern is valid")
});

#[derive(Debug, PartialEq, Eq)]
enum TagKind<'a> {
    For { item: &'a str, path: &'a str },
    EndFor,
    If { condition: &'a str },
    Else,
    EndIf,
    Other,
}

#[derive(Debug)]
struct Tag<'a> {
    start: usize,
    end: usize,
    kind: TagKind<'a>,
}

fn classify(inner: &str) -> TagKind<'_> {
    let inner = inner.trim();
    match inner {
        "endfor" => return TagKind::EndFor,
        "else" => return TagKind::Else,
        "endif" => return TagKind::EndIf,
        _ => {}
    }
    if let Some(rest) = inner.strip_prefix("for ") {
        let parts: Vec<&str> = rest.split_whitespace().collect();
        if let [item, "in", path] = parts.as_slice() {
            return TagKind::For { item: *item, path: *path };
        }
        return TagKind::Other;
    }
    if let Some(condition) = inner.strip_prefix("if ") {
        return TagKind::If {
            condition: condition.trim(),
        };
    }
    TagKind::Other
}

/// Next `{{...}}` tag at or after `from`.
fn next_tag(text: &str, from: usize) -> Option<Tag<'_>> {
    let open = text.get(from..)?.find("{{")? + from;
    let close = text.get(open + 2..)?.find("}}")? + open + 2;
    // `{{ a {{b}}`: the tag is the innermost opening before the close.
    let start = text[open..close].rfind("{{").map_or(open, |i| open + i);
    Some(Tag {
        start,
        end: close + 2,
        kind: classify(&text[start + 2..close]),
    })
}

/// Renders templates against session variables.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    max_loop_iterations: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOOP_ITERATIONS)
    }
}

impl Renderer {
    pub fn new(max_loop_iterations: usize) -> Self {
        Self {
            max_loop_iterations,
        }
    }

    pub fn max_loop_iterations(&self) -> usize {
        self.max_loop_iterations
    }

    /// Renders `template` against `data`.
    ///
    /// Unresolved variables are left as written. Unclosed block tags are left
    /// verbatim. Loop iterations beyond the cap are dropped. Loop output is
    /// final: tags that arrive through loop items are not expanded.
    pub fn render(&self, template: &str, data: &Map<String, Value>) -> String {
        if !template.contains("{{") {
            return template.to_string();
        }
        let mut outputs = Vec::new();
        let looped = self.expand_loops(template, data, &mut outputs);
        let branched = expand_conditionals(&looped, data);
        if outputs.is_empty() {
            return substitute_variables(&branched, data);
        }
        splice_loop_outputs(&branched, &outputs, data)
    }

    /// Expands top-level loops. Each loop's output is pushed to `outputs` and
    /// replaced in the returned text by a marker holding its index.
    fn expand_loops(
        &self,
        text: &str,
        data: &Map<String, Value>,
        outputs: &mut Vec<String>,
    ) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        let mut scan = 0;
        while let Some(tag) = next_tag(text, scan) {
            let TagKind::For { item, path } = tag.kind else {
                scan = tag.end;
                continue;
            };
            let Some((body_end, after)) = find_endfor(text, tag.end) else {
                scan = tag.end;
                continue;
            };
            out.push_str(&text[pos..tag.start]);
            let body = &text[tag.end..body_end];
            let mut rendered = String::new();
            if let Some(Value::Array(items)) = resolve(data, path) {
                if items.len() > self.max_loop_iterations {
                    tracing::debug!(
                        path,
                        len = items.len(),
                        cap = self.max_loop_iterations,
                        "loop truncated"
                    );
                }
                for (index, element) in items.iter().take(self.max_loop_iterations).enumerate() {
                    let mut scope = data.clone();
                    scope.insert(item.to_string(), element.clone());
                    scope.insert(format!("{item}_index"), Value::from(index));
                    rendered.push_str(&self.render(body, &scope));
                }
            }
            out.push(LOOP_OPEN);
            out.push_str(&outputs.len().to_string());
            out.push(LOOP_CLOSE);
            outputs.push(rendered);
            pos = after;
            scan = after;
        }
        out.push_str(&text[pos..]);
        out
    }
}

/// Substitutes variables in the text between loop markers and puts each
/// loop's output back in place of its marker.
fn splice_loop_outputs(text: &str, outputs: &[String], data: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(LOOP_OPEN) {
        let inner = &rest[start + LOOP_OPEN.len_utf8()..];
        let output = inner.find(LOOP_CLOSE).and_then(|end| {
            let index = inner[..end].parse::<usize>().ok()?;
            Some((outputs.get(index)?, end))
        });
        match output {
            Some((output, end)) => {
                out.push_str(&substitute_variables(&rest[..start], data));
                out.push_str(output);
                rest = &inner[end + LOOP_CLOSE.len_utf8()..];
            }
            None => {
                out.push_str(&substitute_variables(&rest[..start], data));
                out.push(LOOP_OPEN);
                rest = inner;
            }
        }
    }
    out.push_str(&substitute_variables(rest, data));
    out
}

/// Finds the `{{endfor}}` closing a loop whose body starts at `from`.
/// Returns the body end and the offset after the closing tag.
fn find_endfor(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut scan = from;
    while let Some(tag) = next_tag(text, scan) {
        match tag.kind {
            TagKind::For { .. } => depth += 1,
            TagKind::EndFor => {
                depth -= 1;
                if depth == 0 {
                    return Some((tag.start, tag.end));
                }
            }
            _ => {}
        }
        scan = tag.end;
    }
    None
}

struct IfBlock {
    /// Offsets of the `{{else}}` tag belonging to this block.
    else_tag: Option<(usize, usize)>,
    endif_start: usize,
    endif_end: usize,
}

fn find_endif(text: &str, from: usize) -> Option<IfBlock> {
    let mut depth = 1usize;
    let mut scan = from;
    let mut else_tag = None;
    while let Some(tag) = next_tag(text, scan) {
        match tag.kind {
            TagKind::If { .. } => depth += 1,
            TagKind::Else if depth == 1 && else_tag.is_none() => {
                else_tag = Some((tag.start, tag.end));
            }
            TagKind::EndIf => {
                depth -= 1;
                if depth == 0 {
                    return Some(IfBlock {
                        else_tag,
                        endif_start: tag.start,
                        endif_end: tag.end,
                    });
                }
            }
            _ => {}
        }
        scan = tag.end;
    }
    None
}

fn expand_conditionals(text: &str, data: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut scan = 0;
    while let Some(tag) = next_tag(text, scan) {
        let TagKind::If { condition } = tag.kind else {
            scan = tag.end;
            continue;
        };
        let Some(block) = find_endif(text, tag.end) else {
            scan = tag.end;
            continue;
        };
        out.push_str(&text[pos..tag.start]);
        let (then_branch, else_branch) = match block.else_tag {
            Some((else_start, else_end)) => (
                &text[tag.end..else_start],
                &text[else_end..block.endif_start],
            ),
            None => (&text[tag.end..block.endif_start], ""),
        };
        let chosen = if evaluate_condition(condition, data) {
            then_branch
        } else {
            else_branch
        };
        out.push_str(&expand_conditionals(chosen, data));
        pos = block.endif_end;
        scan = block.endif_end;
    }
    out.push_str(&text[pos..]);
    out
}

fn substitute_variables(text: &str, data: &Map<String, Value>) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| {
            let path = &caps[1];
            if matches!(path, "else" | "endif" | "endfor") {
                return caps[0].to_string();
            }
            match resolve(data, path) {
                Some(value) => format_value(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Renders `template` against `data` with the default loop cap.
pub fn render(template: &str, data: &Map<String, Value>) -> String {
    Renderer::default().render(template, data)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn substitutes_variables() {
        let d = data(json!({"name": "Ada", "order": {"id": 42, "total": 19.0}}));
        assert_eq!(
            render("Hi {{name}}, order {{ order.id }} costs {{order.total}}", &d),
            "Hi Ada, order 42 costs 19"
        );
    }

    #[test]
    fn unresolved_variable_keeps_placeholder() {
        let d = data(json!({}));
        assert_eq!(render("Hello {{name}}!", &d), "Hello {{name}}!");
    }

    #[test]
    fn null_renders_empty() {
        let d = data(json!({"nothing": null}));
        assert_eq!(render("[{{nothing}}]", &d), "[]");
    }

    #[test]
    fn loop_renders_body_per_element_with_index() {
        let d = data(json!({"items": [{"name": "tea"}, {"name": "cake"}]}));
        assert_eq!(
            render("{{for it in items}}{{it_index}}:{{it.name}} {{endfor}}", &d),
            "0:tea 1:cake "
        );
    }

    #[test]
    fn loop_over_missing_or_scalar_renders_nothing() {
        let d = data(json!({"n": 3}));
        assert_eq!(render("a{{for x in n}}X{{endfor}}b", &d), "ab");
        assert_eq!(render("a{{for x in missing}}X{{endfor}}b", &d), "ab");
    }

    #[test]
    fn loop_is_capped() {
        let items: Vec<u32> = (0..80).collect();
        let d = data(json!({ "items": items }));
        let out = render("{{for x in items}}.{{endfor}}", &d);
        assert_eq!(out.len(), DEFAULT_MAX_LOOP_ITERATIONS);
        let out = Renderer::new(5).render("{{for x in items}}.{{endfor}}", &d);
        assert_eq!(out, ".....");
    }

    #[test]
    fn loop_variables_do_not_leak() {
        let d = data(json!({"xs": [1, 2]}));
        assert_eq!(render("{{for x in xs}}{{x}}{{endfor}}{{x}}", &d), "12{{x}}");
    }

    #[test]
    fn nested_loops() {
        let d = data(json!({"rows": [[1, 2], [3]]}));
        assert_eq!(
            render("{{for r in rows}}[{{for c in r}}{{c}}{{endfor}}]{{endfor}}", &d),
            "[12][3]"
        );
    }

    #[test]
    fn loop_items_are_not_rendered_as_templates() {
        let d = data(json!({
            "secret": "s3cr3t",
            "xs": ["{{secret}}", "{{if secret}}leak{{endif}}"],
        }));
        assert_eq!(
            render("{{for x in xs}}[{{x}}]{{endfor}} {{secret}}", &d),
            "[{{secret}}][{{if secret}}leak{{endif}}] s3cr3t"
        );
    }

    #[test]
    fn loop_inside_conditional() {
        let d = data(json!({"show": true, "hide": false, "xs": ["a", "b"]}));
        assert_eq!(
            render("{{if show}}<{{for x in xs}}{{x}}{{endfor}}>{{endif}}", &d),
            "<ab>"
        );
        assert_eq!(
            render("{{if hide}}{{for x in xs}}{{x}}{{endfor}}{{else}}none{{endif}}", &d),
            "none"
        );
    }

    #[test]
    fn conditionals_with_else() {
        let d = data(json!({"age": 20, "vip": false}));
        assert_eq!(render("{{if age >= 18}}adult{{else}}minor{{endif}}", &d), "adult");
        assert_eq!(render("{{if vip}}VIP{{else}}regular{{endif}}", &d), "regular");
        assert_eq!(render("x{{if vip}}VIP{{endif}}y", &d), "xy");
    }

    #[test]
    fn nested_conditionals() {
        let d = data(json!({"a": true, "b": false}));
        let t = "{{if a}}A{{if b}}B{{else}}notB{{endif}}{{else}}notA{{endif}}";
        assert_eq!(render(t, &d), "AnotB");
    }

    #[test]
    fn conditional_inside_loop_sees_item() {
        let d = data(json!({"xs": [{"ok": true, "n": "a"}, {"ok": false, "n": "b"}]}));
        assert_eq!(
            render("{{for x in xs}}{{if x.ok}}{{x.n}}{{endif}}{{endfor}}", &d),
            "a"
        );
    }

    #[test]
    fn unclosed_tags_are_verbatim() {
        let d = data(json!({"xs": [1], "name": "Ada"}));
        assert_eq!(render("{{for x in xs}}{{x}}", &d), "{{for x in xs}}{{x}}");
        assert_eq!(render("{{if name}}hi {{name}}", &d), "{{if name}}hi Ada");
    }

    #[test]
    fn stray_keywords_are_left_alone() {
        let d = data(json!({"else": "oops"}));
        assert_eq!(render("a{{else}}b", &d), "a{{else}}b");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let d = data(json!({"a": 1}));
        assert_eq!(render("no tags { here }", &d), "no tags { here }");
    }
}
