// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow trigger and cancel keyword matching.

use parley_core::flow::Flow;
use parley_core::rules::MatchType;

use crate::keyword::matches_keyword;

/// First enabled flow with a trigger keyword matching `text`.
///
/// Triggers are case-insensitive and use the flow's trigger match type.
pub fn match_flow_trigger<'f>(flows: &'f [Flow], text: &str) -> Option<&'f Flow> {
    flows.iter().filter(|f| f.enabled).find(|flow| {
        flow.trigger_keywords
            .iter()
            .any(|k| matches_keyword(k, text, flow.trigger_match_type, false))
    })
}

/// Whether `text` contains any of the flow's cancel keywords, ignoring case.
pub fn contains_cancel_keyword(flow: &Flow, text: &str) -> bool {
    flow.cancel_keywords
        .iter()
        .any(|k| matches_keyword(k, text, MatchType::Contains, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(id: &str, triggers: &[&str]) -> Flow {
        let mut f = Flow::new(id, id);
        f.trigger_keywords = triggers.iter().map(|s| s.to_string()).collect();
        f
    }

    #[test]
    fn trigger_defaults_to_exact_case_insensitive() {
        let flows = vec![flow("signup", &["sign up", "register"])];
        assert_eq!(match_flow_trigger(&flows, " Register ").map(|f| f.id.as_str()), Some("signup"));
        assert!(match_flow_trigger(&flows, "I want to register").is_none());
    }

    #[test]
    fn trigger_respects_match_type() {
        let mut f = flow("order", &["order"]);
        f.trigger_match_type = MatchType::Contains;
        let flows = vec![f];
        assert!(match_flow_trigger(&flows, "track my ORDER").is_some());
    }

    #[test]
    fn disabled_flows_never_trigger() {
        let mut f = flow("signup", &["signup"]);
        f.enabled = false;
        assert!(match_flow_trigger(&[f], "signup").is_none());
    }

    #[test]
    fn first_matching_flow_wins() {
        let flows = vec![flow("a", &["go"]), flow("b", &["go"])];
        assert_eq!(match_flow_trigger(&flows, "go").unwrap().id, "a");
    }

    #[test]
    fn cancel_is_case_insensitive_substring() {
        let mut f = flow("signup", &["signup"]);
        f.cancel_keywords = vec!["cancel".into(), "stop".into()];
        assert!(contains_cancel_keyword(&f, "please CANCEL this"));
        assert!(contains_cancel_keyword(&f, "Stop"));
        assert!(!contains_cancel_keyword(&f, "continue"));
    }
}
