// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template and expression language used to render flow messages.
//!
//! Templates support three constructs, expanded in this order:
//!
//! 1. `{{for <item> in <path>}}...{{endfor}}` loops
//! 2. `{{if <condition>}}...{{else}}...{{endif}}` conditionals
//! 3. `{{path}}` variable substitution
//!
//! The language has no assignment and no unbounded iteration. Rendering and
//! evaluation are pure functions of the template and the data.

pub mod condition;
pub mod expression;
pub mod format;
pub mod path;
pub mod render;

pub use condition::evaluate_condition;
pub use expression::evaluate_expression;
pub use format::format_value;
pub use path::{lookup, resolve};
pub use render::{DEFAULT_MAX_LOOP_ITERATIONS, Renderer, render};
