// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its level with the message's fields attached.

use tracing::Span;

pub mod dispatch;
pub mod publish;
pub mod validation;

pub trait StructuredLog {
    /// Emit the message at its level with structured fields.
    fn log(&self);

    /// A span carrying the same fields, for scoping work under this message.
    fn span(&self, name: &str) -> Span;
}
