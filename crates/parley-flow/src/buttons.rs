// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Button answer matching.

use parley_core::types::{Button, ButtonKind, InboundMessage};

/// Finds the button an inbound message answers.
///
/// A clicked button id wins. Otherwise the typed text is compared against
/// button ids, then against titles ignoring case.
pub fn match_button<'b>(buttons: &'b [Button], msg: &InboundMessage) -> Option<&'b Button> {
    if let Some(id) = msg.button_id.as_deref()
        && let Some(button) = buttons.iter().find(|b| b.id == id)
    {
        return Some(button);
    }

    let text = msg.text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(button) = buttons.iter().find(|b| b.id == text) {
        return Some(button);
    }
    let lowered = text.to_lowercase();
    buttons
        .iter()
        .find(|b| b.title.trim().to_lowercase() == lowered)
}

/// Splits buttons into reply buttons and URL buttons, keeping order.
///
/// Channels cannot mix the two kinds in one message.
pub fn split_buttons(buttons: &[Button]) -> (Vec<Button>, Vec<Button>) {
    buttons
        .iter()
        .cloned()
        .partition(|b| b.kind == ButtonKind::Reply)
}
