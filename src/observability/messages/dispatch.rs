// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for unit registration and command dispatch.

use crate::family::Family;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A unit was added to the registry.
///
/// # Log Level
/// `debug!` - Registration detail
pub struct UnitRegistered<'a> {
    pub unit: &'a str,
    pub family: Family,
    pub toolchain: &'a str,
    pub is_extension: bool,
    pub is_built_in: bool,
}

impl Display for UnitRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered unit '{}' for family {} (toolchain={}, extension={}, built_in={})",
            self.unit, self.family, self.toolchain, self.is_extension, self.is_built_in
        )
    }
}

impl StructuredLog for UnitRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            family = %self.family,
            toolchain = self.toolchain,
            is_extension = self.is_extension,
            is_built_in = self.is_built_in,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unit_registered",
            span_name = name,
            unit = self.unit,
            family = %self.family,
        )
    }
}

/// A unit returned an error from `process`; dispatch moves on.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_foundry::family::Family;
/// use the_foundry::observability::messages::dispatch::UnitFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// let msg = UnitFailed {
///     unit: "cpp-publish",
///     phase: Family::custom(18),
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Unit 'cpp-publish' failed on Custom+18 command: disk full");
/// ```
pub struct UnitFailed<'a> {
    pub unit: &'a str,
    pub phase: Family,
    pub error: &'a dyn std::error::Error,
}

impl Display for UnitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' failed on {} command: {}",
            self.unit, self.phase, self.error
        )
    }
}

impl StructuredLog for UnitFailed<'_> {
    fn log(&self) {
        tracing::error!(
            unit = self.unit,
            phase = %self.phase,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unit_failed",
            span_name = name,
            unit = self.unit,
            phase = %self.phase,
        )
    }
}

/// A unit panicked inside `process`.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnitPanicked<'a> {
    pub unit: &'a str,
    pub phase: Family,
    pub message: &'a str,
}

impl Display for UnitPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' panicked on {} command: {}",
            self.unit, self.phase, self.message
        )
    }
}

impl StructuredLog for UnitPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            unit = self.unit,
            phase = %self.phase,
            panic = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unit_panicked",
            span_name = name,
            unit = self.unit,
            phase = %self.phase,
        )
    }
}

/// A unit accepted the command.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CommandHandled<'a> {
    pub unit: &'a str,
    pub phase: Family,
    pub target: &'a std::path::Path,
}

impl Display for CommandHandled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' accepted {} command for {}",
            self.unit,
            self.phase,
            self.target.display()
        )
    }
}

impl StructuredLog for CommandHandled<'_> {
    fn log(&self) {
        tracing::info!(
            unit = self.unit,
            phase = %self.phase,
            target = %self.target.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "command_handled",
            span_name = name,
            unit = self.unit,
            phase = %self.phase,
        )
    }
}

/// No unit accepted the command.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct CommandUnrecognized {
    pub phase: Family,
    pub candidates: usize,
}

impl Display for CommandUnrecognized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No unit handled the {} command ({} candidates offered)",
            self.phase, self.candidates
        )
    }
}

impl StructuredLog for CommandUnrecognized {
    fn log(&self) {
        tracing::warn!(
            phase = %self.phase,
            candidates = self.candidates,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "command_unrecognized",
            span_name = name,
            phase = %self.phase,
        )
    }
}
