// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword matching and rule selection.

use parley_core::rules::{KeywordRule, MatchType};
use regex::RegexBuilder;

/// Whether `keyword` matches `text` under `match_type`.
///
/// Exact matches compare trimmed strings. Regex patterns are compiled on
/// every call; a pattern that fails to compile never matches. Blank
/// keywords never match.
pub fn matches_keyword(keyword: &str, text: &str, match_type: MatchType, case_sensitive: bool) -> bool {
    if keyword.trim().is_empty() {
        return false;
    }
    if match_type == MatchType::Regex {
        return match RegexBuilder::new(keyword)
            .case_insensitive(!case_sensitive)
            .build()
        {
            Ok(re) => re.is_match(text),
            Err(e) => {
                tracing::warn!(pattern = keyword, error = %e, "invalid keyword regex");
                false
            }
        };
    }

    let (keyword, text) = if case_sensitive {
        (keyword.to_string(), text.to_string())
    } else {
        (keyword.to_lowercase(), text.to_lowercase())
    };
    match match_type {
        MatchType::Exact => text.trim() == keyword.trim(),
        MatchType::Contains => text.contains(&keyword),
        MatchType::StartsWith => text.trim_start().starts_with(&keyword),
        MatchType::Regex => false,
    }
}

fn rule_matches(rule: &KeywordRule, text: &str) -> bool {
    rule.keywords
        .iter()
        .any(|k| matches_keyword(k, text, rule.match_type, rule.case_sensitive))
}

/// Returns the first rule whose keywords match `text`.
///
/// Rules are tried by descending priority; equal priorities keep their
/// configured order. Disabled rules and text rules with nothing to say are
/// passed over.
pub fn match_rules<'r>(rules: &'r [KeywordRule], text: &str) -> Option<&'r KeywordRule> {
    let mut ordered: Vec<&KeywordRule> = rules.iter().filter(|r| r.enabled).collect();
    ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

    for rule in ordered {
        if !rule_matches(rule, text) {
            continue;
        }
        if !rule.has_usable_response() {
            tracing::debug!(rule_id = %rule.id, "matched rule has no response, skipping");
            continue;
        }
        tracing::debug!(rule_id = %rule.id, response_type = %rule.response_type, "keyword rule matched");
        return Some(rule);
    }
    None
}
