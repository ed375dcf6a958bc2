// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete dispatch pipeline.
//!
//! Each test creates an isolated TestHarness with in-memory storage and mock
//! collaborators. Tests are independent and order-insensitive.

use std::time::Duration;

use chrono::{Datelike, Utc};
use parley_agent::DispatchOutcome;
use parley_config::EngineConfig;
use parley_core::flow::{Flow, InputType, OnComplete, Step, WebhookAction};
use parley_core::rules::KeywordRule;
use parley_core::session::SessionStatus;
use parley_core::settings::{
    AiSettings, BotDefinition, BusinessHours, ChatbotSettings, OpeningWindow, Weekday,
};
use parley_core::traits::SessionStore;
use parley_core::types::{Button, Direction, HandoffSource, InboundMessage};
use parley_flow::FlowState;
use parley_test_utils::TestHarness;
use serde_json::json;

/// A weekday that is neither today nor yesterday in UTC.
fn day_after_tomorrow() -> Weekday {
    Utc::now().weekday().succ().succ()
}

fn signup_flow() -> Flow {
    let mut flow = Flow::new("signup", "Signup");
    flow.trigger_keywords = vec!["signup".into()];
    flow.cancel_keywords = vec!["stop".into()];
    flow.steps = vec![
        Step {
            store_as: Some("name".into()),
            ..Step::text("ask_name", "Your name?")
        },
        Step {
            store_as: Some("plan".into()),
            ..Step::buttons(
                "ask_plan",
                "Which plan, {{name}}?",
                vec![Button::reply("", "Basic"), Button::reply("", "Pro")],
            )
        },
        Step {
            input_type: InputType::None,
            ..Step::text("done", "{{name}} is on {{plan}}")
        },
    ];
    flow
}

fn definition() -> BotDefinition {
    BotDefinition {
        settings: ChatbotSettings {
            greeting: "Welcome!".into(),
            fallback_message: "Sorry, I didn't get that.".into(),
            ..ChatbotSettings::default()
        },
        rules: vec![
            KeywordRule {
                team_id: Some("billing".into()),
                ..KeywordRule::transfer(["refund"])
            },
            KeywordRule::text(["hi"], "Hello!"),
        ],
        flows: vec![signup_flow()],
    }
}

/// Business hours that are closed right now.
fn closed_hours(allow_automation: bool) -> BusinessHours {
    BusinessHours {
        utc_offset_minutes: 0,
        windows: vec![OpeningWindow {
            day: day_after_tomorrow(),
            open: "00:00".into(),
            close: "00:01".into(),
        }],
        out_of_hours_message: "We're closed".into(),
        allow_automation_outside_hours: allow_automation,
    }
}

// ---- Routing order ----

#[tokio::test]
async fn new_session_gets_greeting_then_fallback() {
    let harness = TestHarness::with_definition(definition());

    assert_eq!(harness.send("good morning").await.unwrap(), DispatchOutcome::Greeting);
    assert_eq!(harness.send("what?").await.unwrap(), DispatchOutcome::Fallback);

    assert_eq!(
        harness.sender.sent_bodies().await,
        vec!["Welcome!", "Sorry, I didn't get that."]
    );
    assert_eq!(harness.sessions().await.len(), 1);
}

#[tokio::test]
async fn greeting_beats_text_rule_on_new_session() {
    let harness = TestHarness::with_definition(definition());

    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::Greeting);
    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::KeywordReply);
    assert_eq!(harness.sender.last_sent().await.unwrap().body(), "Hello!");
}

#[tokio::test]
async fn new_session_without_greeting_stays_silent() {
    let mut def = definition();
    def.settings.greeting.clear();
    let harness = TestHarness::with_definition(def);

    assert_eq!(harness.send("hmm").await.unwrap(), DispatchOutcome::NoReply);
    assert_eq!(harness.sender.sent_count().await, 0);
    assert_eq!(harness.sessions().await.len(), 1);
}

#[tokio::test]
async fn empty_message_is_ignored() {
    let harness = TestHarness::with_definition(definition());
    assert_eq!(harness.send("   ").await.unwrap(), DispatchOutcome::Ignored);
    assert!(harness.sessions().await.is_empty());
}

#[tokio::test]
async fn greeting_buttons_get_generated_ids() {
    let mut def = definition();
    def.settings.greeting_buttons = vec![Button::reply("", "Sign up"), Button::reply("help", "Help")];
    let harness = TestHarness::with_definition(def);

    harness.send("hello").await.unwrap();
    let sent = harness.sender.last_sent().await.unwrap();
    let ids: Vec<&str> = sent.buttons().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["btn_1", "help"]);
}

// ---- Keyword rules and transfers ----

#[test]
fn refund_sentence_selects_transfer_rule() {
    let rules = definition().rules;
    let rule = parley_router::match_rules(&rules, "I need a refund please").unwrap();
    assert!(rule.is_transfer());
}

#[tokio::test]
async fn transfer_rule_hands_off_and_silences_bot() {
    let harness = TestHarness::with_definition(definition());

    assert_eq!(
        harness.send("I need a refund please").await.unwrap(),
        DispatchOutcome::KeywordTransfer
    );
    assert_eq!(harness.sender.last_sent().await.unwrap().body(), harness.messages.transfer);

    let requests = harness.handoff.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].team_id.as_deref(), Some("billing"));
    assert_eq!(requests[0].source, HandoffSource::KeywordRule);
    assert!(requests[0].notes.contains("refund"));

    let sent_before = harness.sender.sent_count().await;
    assert_eq!(harness.send("hello?").await.unwrap(), DispatchOutcome::HumanHandling);
    assert_eq!(harness.sender.sent_count().await, sent_before);

    assert!(harness.dispatcher.release_handoff(&harness.contact));
    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::KeywordReply);
}

#[tokio::test]
async fn tenant_transfer_message_overrides_default() {
    let mut def = definition();
    def.settings.transfer_message = Some("Connecting you to billing".into());
    let harness = TestHarness::with_definition(def);

    harness.send("refund").await.unwrap();
    assert_eq!(
        harness.sender.last_sent().await.unwrap().body(),
        "Connecting you to billing"
    );
}

#[tokio::test]
async fn transfer_rule_exits_running_flow() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    assert_eq!(
        harness.send("refund").await.unwrap(),
        DispatchOutcome::KeywordTransfer
    );

    let session = harness.latest_session().await.unwrap();
    assert!(!session.in_flow());
    assert_eq!(session.status, SessionStatus::Active);
}

#[tokio::test]
async fn failed_handoff_is_not_tracked() {
    let harness = TestHarness::with_definition(definition());
    harness.handoff.set_failing(true);

    assert_eq!(
        harness.send("refund").await.unwrap(),
        DispatchOutcome::KeywordTransfer
    );
    assert!(!harness.dispatcher.is_handed_off(&harness.contact));
}

// ---- Tenant gates ----

#[tokio::test]
async fn disabled_chatbot_hands_off_to_general_queue() {
    let mut def = definition();
    def.settings.enabled = false;
    let harness = TestHarness::with_definition(def);

    assert_eq!(harness.send("hello").await.unwrap(), DispatchOutcome::ChatbotDisabled);

    let requests = harness.handoff.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].team_id, None);
    assert_eq!(requests[0].source, HandoffSource::ChatbotDisabled);
    assert_eq!(harness.sender.sent_count().await, 0);
    assert!(harness.sessions().await.is_empty());

    assert_eq!(harness.send("anyone?").await.unwrap(), DispatchOutcome::HumanHandling);
    assert_eq!(harness.handoff.requests().await.len(), 1);
}

#[tokio::test]
async fn out_of_hours_sends_notice_without_session() {
    let mut def = definition();
    def.settings.business_hours = Some(closed_hours(false));
    let harness = TestHarness::with_definition(def);

    assert_eq!(harness.send("hello").await.unwrap(), DispatchOutcome::OutOfHours);
    assert_eq!(harness.sender.sent_bodies().await, vec!["We're closed"]);
    assert!(harness.sessions().await.is_empty());
}

#[tokio::test]
async fn automation_outside_hours_still_blocks_transfer() {
    let mut def = definition();
    def.settings.business_hours = Some(closed_hours(true));
    let harness = TestHarness::with_definition(def);

    assert_eq!(harness.send("hello").await.unwrap(), DispatchOutcome::Greeting);
    assert_eq!(harness.send("refund").await.unwrap(), DispatchOutcome::OutOfHours);

    assert_eq!(harness.sender.last_sent().await.unwrap().body(), "We're closed");
    assert!(harness.handoff.requests().await.is_empty());
    assert!(!harness.dispatcher.is_handed_off(&harness.contact));
}

// ---- Flows ----

#[tokio::test]
async fn signup_flow_runs_to_completion() {
    let mut def = definition();
    def.flows[0].completion_message = "All set, {{name}}!".into();
    def.flows[0].on_complete = OnComplete::Webhook(WebhookAction {
        url: "https://hooks.example.com/signup".into(),
        headers: Default::default(),
        body: None,
    });
    let harness = TestHarness::with_definition(def);

    assert_eq!(
        harness.send("signup").await.unwrap(),
        DispatchOutcome::FlowStarted(FlowState::AtStep("ask_name".into()))
    );
    assert_eq!(
        harness.send("Ada").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::AtStep("ask_plan".into()))
    );
    assert_eq!(
        harness.click("btn_2", "Pro").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::Completed)
    );

    assert_eq!(
        harness.sender.sent_bodies().await,
        vec!["Your name?", "Which plan, Ada?", "Ada is on Pro", "All set, Ada!"]
    );

    let session = harness.latest_session().await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(!session.in_flow());
    assert_eq!(session.data.get("plan"), Some(&json!("Pro")));
    assert_eq!(session.data.get("plan_id"), Some(&json!("btn_2")));

    assert_eq!(harness.webhook.wait_for_calls(1, Duration::from_secs(5)).await, 1);
    let calls = harness.webhook.calls().await;
    assert_eq!(calls[0].0, "signup");
    assert_eq!(calls[0].1.data.get("name"), Some(&json!("Ada")));
}

#[tokio::test]
async fn completed_session_is_replaced_by_a_new_one() {
    let mut def = definition();
    def.flows[0].steps.truncate(1);
    let harness = TestHarness::with_definition(def);

    harness.send("signup").await.unwrap();
    assert_eq!(
        harness.send("Ada").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::Completed)
    );
    assert_eq!(harness.send("hello again").await.unwrap(), DispatchOutcome::Greeting);

    let sessions = harness.sessions().await;
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[1].status, SessionStatus::Active);
}

#[tokio::test]
async fn mid_flow_answer_is_not_routed_to_rules() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    assert_eq!(
        harness.send("hi").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::AtStep("ask_plan".into()))
    );
    let session = harness.latest_session().await.unwrap();
    assert_eq!(session.data.get("name"), Some(&json!("hi")));
}

#[tokio::test]
async fn cancel_keyword_leaves_flow_and_keeps_session() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    assert_eq!(
        harness.send("stop").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::Exited)
    );
    assert_eq!(harness.sender.last_sent().await.unwrap().body(), harness.messages.cancel);

    let session = harness.latest_session().await.unwrap();
    assert!(!session.in_flow());
    assert!(session.is_active());
    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::KeywordReply);
}

#[tokio::test]
async fn repeated_invalid_choice_closes_session() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    harness.send("Ada").await.unwrap();
    for _ in 0..2 {
        assert_eq!(
            harness.send("Enterprise").await.unwrap(),
            DispatchOutcome::FlowResponse(FlowState::AtStep("ask_plan".into()))
        );
    }
    assert_eq!(
        harness.send("Enterprise").await.unwrap(),
        DispatchOutcome::FlowResponse(FlowState::Exited)
    );

    let session = harness.latest_session().await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(!session.in_flow());
    assert_eq!(
        harness.sender.last_sent().await.unwrap().body(),
        harness.messages.retries_exhausted
    );
}

#[tokio::test]
async fn vanished_flow_is_exited_and_routing_continues() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    let mut session = harness.latest_session().await.unwrap();
    session.current_flow_id = Some("retired".into());
    harness.store.save(&session).await.unwrap();

    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::KeywordReply);
    assert!(!harness.latest_session().await.unwrap().in_flow());
}

#[tokio::test]
async fn disabled_flow_cannot_be_triggered() {
    let mut def = definition();
    def.flows[0].enabled = false;
    let harness = TestHarness::with_definition(def);

    harness.send("hello").await.unwrap();
    assert_eq!(harness.send("signup").await.unwrap(), DispatchOutcome::Fallback);
}

// ---- AI ----

fn ai_definition() -> BotDefinition {
    let mut def = definition();
    def.settings.greeting.clear();
    def.settings.ai = AiSettings {
        enabled: true,
        provider: "mock".into(),
        history_limit: Some(4),
        ..AiSettings::default()
    };
    def
}

#[tokio::test]
async fn ai_answers_with_history_excluding_current_message() {
    let harness = TestHarness::builder()
        .with_definition(ai_definition())
        .with_ai_responses(["First answer", "Second answer"])
        .build();

    assert_eq!(harness.send("first question").await.unwrap(), DispatchOutcome::AiReply);
    assert_eq!(harness.send("second question").await.unwrap(), DispatchOutcome::AiReply);

    let calls = harness.ai.as_ref().unwrap().calls().await;
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.is_empty());
    assert_eq!(calls[1].1, "second question");
    let history: Vec<(Direction, &str)> = calls[1]
        .0
        .iter()
        .map(|t| (t.direction, t.text.as_str()))
        .collect();
    assert_eq!(
        history,
        vec![
            (Direction::Inbound, "first question"),
            (Direction::Outbound, "First answer"),
        ]
    );
    assert_eq!(harness.sender.last_sent().await.unwrap().body(), "Second answer");
}

#[tokio::test]
async fn ai_failure_falls_back() {
    let harness = TestHarness::builder()
        .with_definition(ai_definition())
        .with_failing_ai()
        .build();

    assert_eq!(harness.send("question").await.unwrap(), DispatchOutcome::Fallback);
    assert_eq!(
        harness.sender.last_sent().await.unwrap().body(),
        "Sorry, I didn't get that."
    );
}

#[tokio::test]
async fn empty_ai_answer_falls_back() {
    let harness = TestHarness::builder()
        .with_definition(ai_definition())
        .with_ai_responses(["   "])
        .build();

    assert_eq!(harness.send("question").await.unwrap(), DispatchOutcome::Fallback);
}

#[tokio::test]
async fn rules_and_flows_win_over_ai() {
    let harness = TestHarness::builder()
        .with_definition(ai_definition())
        .with_ai_responses(["unused"])
        .build();

    assert_eq!(harness.send("hi").await.unwrap(), DispatchOutcome::KeywordReply);
    assert!(matches!(
        harness.send("signup").await.unwrap(),
        DispatchOutcome::FlowStarted(_)
    ));
    assert!(harness.ai.as_ref().unwrap().calls().await.is_empty());
}

#[tokio::test]
async fn ai_is_skipped_when_no_responder_is_wired() {
    let harness = TestHarness::with_definition(ai_definition());

    assert_eq!(harness.send("question").await.unwrap(), DispatchOutcome::NoReply);
    assert_eq!(harness.send("another").await.unwrap(), DispatchOutcome::Fallback);
}

// ---- Conversation log ----

#[tokio::test]
async fn inbound_and_outbound_messages_are_logged() {
    let harness = TestHarness::with_definition(definition());

    harness.send("signup").await.unwrap();
    harness.send("Ada").await.unwrap();

    let session = harness.latest_session().await.unwrap();
    let entries: Vec<(Direction, String, Option<String>)> = harness
        .log
        .entries(&session.id)
        .into_iter()
        .map(|e| (e.direction, e.text, e.step))
        .collect();
    assert_eq!(
        entries,
        vec![
            (Direction::Inbound, "signup".into(), None),
            (Direction::Outbound, "Your name?".into(), Some("ask_name".into())),
            (Direction::Inbound, "Ada".into(), Some("ask_name".into())),
            (
                Direction::Outbound,
                "Which plan, Ada?".into(),
                Some("ask_plan".into())
            ),
        ]
    );
}

// ---- Concurrency ----

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_first_messages_share_one_session() {
    let harness = TestHarness::builder()
        .with_definition(definition())
        .with_lookup_delay(Duration::from_millis(50))
        .build();

    let first = harness
        .dispatcher
        .spawn(InboundMessage::text(harness.contact.clone(), "hello"));
    let second = harness
        .dispatcher
        .spawn(InboundMessage::text(harness.contact.clone(), "hello"));
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(harness.sessions().await.len(), 1);
    assert_eq!(harness.sender.sent_bodies().await, vec!["Welcome!", "Sorry, I didn't get that."]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unserialised_first_messages_race_into_two_sessions() {
    let harness = TestHarness::builder()
        .with_definition(definition())
        .with_engine(EngineConfig {
            serialize_per_contact: false,
            ..EngineConfig::default()
        })
        .with_lookup_delay(Duration::from_millis(50))
        .build();

    let first = harness
        .dispatcher
        .spawn(InboundMessage::text(harness.contact.clone(), "hello"));
    let second = harness
        .dispatcher
        .spawn(InboundMessage::text(harness.contact.clone(), "hello"));
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(harness.sessions().await.len(), 2);
    assert_eq!(harness.sender.sent_bodies().await, vec!["Welcome!", "Welcome!"]);
}
