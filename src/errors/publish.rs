// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for package identity resolution and the publish scheduler.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The run was asked to publish nothing; reported before any task launches.
    #[error("no modules were supplied to the publish run")]
    EmptyModuleSet,

    #[error("cyclic module dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("'{reference}' is not a package reference: {reason}")]
    InvalidPackageReference { reference: String, reason: String },

    #[error("failed to write manifest '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest '{}': {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("publish task for module '{module}' panicked")]
    TaskPanicked { module: String },

    #[error("internal scheduler error: {message}")]
    Internal { message: String },
}
