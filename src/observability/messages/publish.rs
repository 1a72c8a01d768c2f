// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for publish runs.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion)
//! * Package identity resolution
//! * Dependency readiness checks and skipped modules
//! * Per-module publish outcomes

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Publish run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foundry::observability::messages::publish::PublishRunStarted;
///
/// let msg = PublishRunStarted {
///     toolchain: "cpp",
///     module_count: 12,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PublishRunStarted<'a> {
    pub toolchain: &'a str,
    pub module_count: usize,
    pub max_concurrency: usize,
}

impl Display for PublishRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} publish run: {} modules, max_concurrency={}",
            self.toolchain, self.module_count, self.max_concurrency
        )
    }
}

impl StructuredLog for PublishRunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            toolchain = self.toolchain,
            module_count = self.module_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "publish_run",
            span_name = name,
            toolchain = self.toolchain,
            module_count = self.module_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Publish run finished draining.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PublishRunCompleted<'a> {
    pub toolchain: &'a str,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for PublishRunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} publish run finished in {:?}: {} published, {} skipped, {} failed",
            self.toolchain, self.duration, self.completed, self.skipped, self.failed
        )
    }
}

impl StructuredLog for PublishRunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            toolchain = self.toolchain,
            completed = self.completed,
            skipped = self.skipped,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "publish_run_completed",
            span_name = name,
            toolchain = self.toolchain,
            duration = ?self.duration,
        )
    }
}

/// Package identity attached to a module.
///
/// # Log Level
/// `debug!` - Resolution detail
pub struct IdentityResolved<'a> {
    pub module: &'a str,
    pub package: &'a str,
}

impl Display for IdentityResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' publishes as {}", self.module, self.package)
    }
}

impl StructuredLog for IdentityResolved<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, package = self.package, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "identity_resolved",
            span_name = name,
            module = self.module,
            package = self.package,
        )
    }
}

/// No identity could be synthesized for a module; it is not published.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct IdentityResolutionFailed<'a> {
    pub module: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for IdentityResolutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cannot determine a package identity for module '{}': {}",
            self.module, self.error
        )
    }
}

impl StructuredLog for IdentityResolutionFailed<'_> {
    fn log(&self) {
        tracing::error!(module = self.module, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "identity_resolution_failed",
            span_name = name,
            module = self.module,
        )
    }
}

/// A dependency was not complete yet, so the walk drains the in-flight batch.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct AwaitingInFlight<'a> {
    pub module: &'a str,
    pub dependency: &'a str,
    pub in_flight: usize,
}

impl Display for AwaitingInFlight<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' waits on '{}': draining {} in-flight publish tasks",
            self.module, self.dependency, self.in_flight
        )
    }
}

impl StructuredLog for AwaitingInFlight<'_> {
    fn log(&self) {
        tracing::debug!(
            module = self.module,
            dependency = self.dependency,
            in_flight = self.in_flight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "awaiting_in_flight",
            span_name = name,
            module = self.module,
            in_flight = self.in_flight,
        )
    }
}

/// A module was skipped because a dependency never completed.
///
/// # Log Level
/// `warn!` - Module skipped, run continues
///
/// # Example
/// ```
/// use the_foundry::observability::messages::publish::DependencyMissing;
///
/// let msg = DependencyMissing {
///     module: "http",
///     dependency: "log",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Skipping module 'http': dependency 'log' has not been published in this run"
/// );
/// ```
pub struct DependencyMissing<'a> {
    pub module: &'a str,
    pub dependency: &'a str,
}

impl Display for DependencyMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping module '{}': dependency '{}' has not been published in this run",
            self.module, self.dependency
        )
    }
}

impl StructuredLog for DependencyMissing<'_> {
    fn log(&self) {
        tracing::warn!(
            module = self.module,
            dependency = self.dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "dependency_missing",
            span_name = name,
            module = self.module,
            dependency = self.dependency,
        )
    }
}

/// A package dependency carries no identity, so it is left out of the manifest.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct PackageDependencyUnpinned<'a> {
    pub module: &'a str,
    pub dependency: &'a str,
}

impl Display for PackageDependencyUnpinned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Package dependency '{}' of module '{}' has no identity and is omitted from its manifest",
            self.dependency, self.module
        )
    }
}

impl StructuredLog for PackageDependencyUnpinned<'_> {
    fn log(&self) {
        tracing::warn!(
            module = self.module,
            dependency = self.dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "package_dependency_unpinned",
            span_name = name,
            module = self.module,
        )
    }
}

/// Module manifest written.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModulePublished<'a> {
    pub module: &'a str,
    pub package: &'a str,
    pub path: &'a Path,
}

impl Display for ModulePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Published {} from module '{}' to {}",
            self.package,
            self.module,
            self.path.display()
        )
    }
}

impl StructuredLog for ModulePublished<'_> {
    fn log(&self) {
        tracing::info!(
            module = self.module,
            package = self.package,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "module_published",
            span_name = name,
            module = self.module,
            package = self.package,
        )
    }
}

/// A publish task failed; dependents of the module will be skipped.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModulePublishFailed<'a> {
    pub module: &'a str,
    pub package: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModulePublishFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to publish {} (module '{}'): {}",
            self.package, self.module, self.error
        )
    }
}

impl StructuredLog for ModulePublishFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module = self.module,
            package = self.package,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "module_publish_failed",
            span_name = name,
            module = self.module,
            package = self.package,
        )
    }
}
