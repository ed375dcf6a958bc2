// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single comparisons: `<path> [op <literal>]`.

use std::cmp::Ordering;

use parley_core::data::{as_number, is_truthy};
use serde_json::{Map, Value};

use crate::format::format_value;
use crate::path::resolve;

/// Comparison operators, longest spellings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

const OPERATORS: [(&str, Operator); 6] = [
    (">=", Operator::Ge),
    ("<=", Operator::Le),
    ("==", Operator::Eq),
    ("!=", Operator::Ne),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

/// Finds the first operator outside quotes. Returns its byte offset,
/// spelling length and kind.
fn find_operator(cond: &str) -> Option<(usize, usize, Operator)> {
    let mut quote: Option<char> = None;
    for (i, c) in cond.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None => {
                let rest = &cond[i..];
                if let Some((text, op)) = OPERATORS.iter().find(|(t, _)| rest.starts_with(t)) {
                    return Some((i, text.len(), *op));
                }
            }
        }
    }
    None
}

/// Strips one pair of matching single or double quotes.
pub fn unquote(literal: &str) -> &str {
    let t = literal.trim();
    for q in ['\'', '"'] {
        if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
            return &t[1..t.len() - 1];
        }
    }
    t
}

/// Compares a resolved value with a literal.
///
/// Numeric when both sides parse as finite numbers, lexical otherwise. An
/// unresolved left side compares as the empty string.
pub fn compare(left: Option<&Value>, op: Operator, literal: &str) -> bool {
    let left_num = left.and_then(as_number);
    let right_num = literal.trim().parse::<f64>().ok().filter(|f| f.is_finite());
    let ordering = match (left_num, right_num) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => {
            let text = left.map(format_value).unwrap_or_default();
            Some(text.as_str().cmp(literal))
        }
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Ne => ordering != Ordering::Equal,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Ge => ordering != Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
    }
}

/// Evaluates one condition against `data`.
///
/// Without an operator the condition is a truthiness check on the path.
/// Unresolved paths are falsy.
pub fn evaluate_condition(condition: &str, data: &Map<String, Value>) -> bool {
    let condition = condition.trim();
    if condition.is_empty() {
        return false;
    }
    match find_operator(condition) {
        Some((at, len, op)) => {
            let path = condition[..at].trim();
            let literal = unquote(&condition[at + len..]);
            compare(resolve(data, path), op, literal)
        }
        None => resolve(data, condition).is_some_and(is_truthy),
    }
}
