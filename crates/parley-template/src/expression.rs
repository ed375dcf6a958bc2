// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boolean expressions for step skip conditions.
//!
//! An expression combines single comparisons with `AND` / `OR` (any case)
//! and parentheses. `AND` binds tighter than `OR`. Parentheses without a
//! partner are kept as plain text in the comparison they touch, which then
//! fails to resolve and evaluates false.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::condition::evaluate_condition;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Atom(String),
}

/// Byte offsets of parentheses that have a partner, ignoring quoted text.
fn matched_parens(expr: &str) -> HashSet<usize> {
    let mut matched = HashSet::new();
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    for (i, c) in expr.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => stack.push(i),
            (None, ')') => {
                if let Some(open) = stack.pop() {
                    matched.insert(open);
                    matched.insert(i);
                }
            }
            _ => {}
        }
    }
    matched
}

fn tokenize(expr: &str) -> Vec<Token> {
    let matched = matched_parens(expr);
    let mut tokens = Vec::new();
    let mut atom: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;

    fn end_word(word: &mut String, atom: &mut Vec<String>, tokens: &mut Vec<Token>) {
        if word.is_empty() {
            return;
        }
        let w = std::mem::take(word);
        let op = if w.eq_ignore_ascii_case("and") {
            Some(Token::And)
        } else if w.eq_ignore_ascii_case("or") {
            Some(Token::Or)
        } else {
            None
        };
        match op {
            Some(op) => {
                end_atom(atom, tokens);
                tokens.push(op);
            }
            None => atom.push(w),
        }
    }

    fn end_atom(atom: &mut Vec<String>, tokens: &mut Vec<Token>) {
        if !atom.is_empty() {
            tokens.push(Token::Atom(atom.join(" ")));
            atom.clear();
        }
    }

    for (i, c) in expr.char_indices() {
        if let Some(q) = quote {
            word.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                word.push(c);
            }
            '(' | ')' if matched.contains(&i) => {
                end_word(&mut word, &mut atom, &mut tokens);
                end_atom(&mut atom, &mut tokens);
                tokens.push(if c == '(' { Token::Open } else { Token::Close });
            }
            c if c.is_whitespace() => end_word(&mut word, &mut atom, &mut tokens),
            c => word.push(c),
        }
    }
    end_word(&mut word, &mut atom, &mut tokens);
    end_atom(&mut atom, &mut tokens);
    tokens
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    data: &'a Map<String, Value>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn or_expr(&mut self) -> bool {
        let mut value = self.and_expr();
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.and_expr();
            value = value || rhs;
        }
        value
    }

    fn and_expr(&mut self) -> bool {
        let mut value = self.operand();
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.operand();
            value = value && rhs;
        }
        value
    }

    fn operand(&mut self) -> bool {
        match self.peek() {
            Some(Token::Open) => {
                self.pos += 1;
                let value = self.or_expr();
                if self.peek() == Some(&Token::Close) {
                    self.pos += 1;
                }
                value
            }
            Some(Token::Atom(text)) => {
                self.pos += 1;
                evaluate_condition(text, self.data)
            }
            // Missing operand, e.g. `a AND` or `()`.
            _ => false,
        }
    }
}

/// Evaluates a boolean expression against `data`.
///
/// ```
/// use serde_json::json;
/// let data = json!({"age": 20, "country": "NZ"});
/// let data = data.as_object().unwrap();
/// assert!(parley_template::evaluate_expression(
///     "age > 18 and (country == 'NZ' OR country == 'AU')",
///     data,
/// ));
/// ```
pub fn evaluate_expression(expr: &str, data: &Map<String, Value>) -> bool {
    let tokens = tokenize(expr);
    if tokens.is_empty() {
        return false;
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        data,
    };
    let value = parser.or_expr();
    if parser.pos < tokens.len() {
        tracing::debug!(expr, "trailing tokens in expression ignored");
    }
    value
}
