// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workspace validation findings.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A validation finding that does not block the run.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct ValidationWarning<'a> {
    pub workspace: &'a str,
    pub finding: &'a ValidationError,
}

impl Display for ValidationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Workspace '{}': {}", self.workspace, self.finding)
    }
}

impl StructuredLog for ValidationWarning<'_> {
    fn log(&self) {
        tracing::warn!(workspace = self.workspace, finding = %self.finding, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "validation_warning",
            span_name = name,
            workspace = self.workspace,
        )
    }
}

/// An undeclared dependency name was given a placeholder module.
///
/// # Log Level
/// `debug!` - Graph construction detail
pub struct PlaceholderModuleCreated<'a> {
    pub dependency: &'a str,
    pub dependent: &'a str,
}

impl Display for PlaceholderModuleCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' depends on undeclared '{}'; added a placeholder outside the publish set",
            self.dependent, self.dependency
        )
    }
}

impl StructuredLog for PlaceholderModuleCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            dependency = self.dependency,
            dependent = self.dependent,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "placeholder_module",
            span_name = name,
            dependency = self.dependency,
        )
    }
}
