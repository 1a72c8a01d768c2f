// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::errors::{GraphError, RegistryError};

/// Problems found while validating a workspace's module graph
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between modules
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A module depends on a name that no declared module carries
    UnresolvedDependency {
        /// The module that has the unresolved dependency
        module: String,
        /// The dependency that couldn't be resolved
        missing_dependency: String,
    },
    /// Two modules share a name
    DuplicateModuleName {
        module: String,
    },
    /// A package-only module has no package reference, so dependents cannot pin it
    PackageWithoutReference {
        module: String,
    },
}

impl ValidationError {
    /// Unresolved dependencies and unpinned packages degrade a run instead of
    /// blocking it: dependents are skipped at publish time.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ValidationError::UnresolvedDependency { .. }
                | ValidationError::PackageWithoutReference { .. }
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                module,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Module '{}' depends on '{}' which does not exist",
                    module, missing_dependency
                )
            }
            ValidationError::DuplicateModuleName { module } => {
                write!(f, "Duplicate module name: '{}'", module)
            }
            ValidationError::PackageWithoutReference { module } => {
                write!(
                    f,
                    "Package module '{}' has no package_ref; dependents will not record its version",
                    module
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a workspace file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read workspace '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workspace '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),

    #[error("module '{module}' has an invalid package_ref: {reason}")]
    InvalidPackageRef { module: String, reason: String },

    #[error("toolchain '{toolchain}' has no registered units")]
    UnsupportedToolchain { toolchain: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
