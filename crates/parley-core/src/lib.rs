// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley conversation engine.
//!
//! This crate provides the data model (sessions, flows, keyword rules,
//! settings), the collaborator traits the engine drives its side effects
//! through, and the shared error type. It contains no engine logic.

pub mod data;
pub mod error;
pub mod flow;
pub mod rules;
pub mod services;
pub mod session;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use data::SessionData;
pub use error::ParleyError;
pub use flow::{
    ApiFetchConfig, Flow, InputType, OnComplete, Step, StepKind, TransferConfig, WebhookAction,
};
pub use rules::{KeywordRule, MatchType, ResponseType, RuleResponse};
pub use services::Services;
pub use session::{Session, SessionStatus};
pub use settings::{AiSettings, BotDefinition, BusinessHours, ChatbotSettings, OpeningWindow};
pub use types::{
    ApiResponse, Button, ButtonKind, ChatTurn, ContactKey, Direction, HandoffRequest,
    HandoffSource, InboundMessage, MessageId, SessionId,
};

pub use traits::{
    AiResponder, BotCatalog, ConversationLog, ExternalFetcher, HandoffService, MessageSender,
    SessionStore, WebhookDispatcher,
};
