// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Variable path resolution: `a.b.c`, `items[2].name`, `matrix[0][1]`.

use serde_json::{Map, Value};

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Splits a path into key and index segments. Returns `None` when malformed.
fn parse(path: &str) -> Option<Vec<Segment<'_>>> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let mut segments = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            return None;
        }
        let (name, mut rest) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if name.is_empty() && segments.is_empty() {
            return None;
        }
        if !name.is_empty() {
            segments.push(Segment::Key(name));
        }
        while !rest.is_empty() {
            let close = rest.find(']')?;
            let index = rest.get(1..close)?.trim().parse::<usize>().ok()?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return None;
            }
        }
    }
    Some(segments)
}

fn step<'v>(value: &'v Value, segment: &Segment<'_>) -> Option<&'v Value> {
    match (segment, value) {
        (Segment::Key(k), Value::Object(map)) => map.get(*k),
        (Segment::Index(i), Value::Array(items)) => items.get(*i),
        _ => None,
    }
}

/// Resolves `path` against a variable map.
///
/// The first segment names a variable; the rest walk into objects and arrays.
pub fn resolve<'v>(data: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    let segments = parse(path)?;
    let (first, rest) = segments.split_first()?;
    let Segment::Key(name) = first else {
        return None;
    };
    let root = data.get(*name)?;
    rest.iter().try_fold(root, |v, seg| step(v, seg))
}

/// Resolves `path` inside an arbitrary JSON value.
///
/// Used to pick fields out of API responses. A path of `$` or `.` returns the
/// value itself.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let trimmed = path.trim();
    if trimmed == "$" || trimmed == "." {
        return Some(value);
    }
    let prefixed;
    let segments: Vec<Segment<'_>> = if trimmed.starts_with('[') {
        prefixed = format!("_{trimmed}");
        parse(&prefixed)?.into_iter().skip(1).collect()
    } else {
        parse(trimmed)?
    };
    segments.iter().try_fold(value, |v, seg| step(v, seg))
}
