// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for unit registration and unit-level command handling.

use thiserror::Error;

use crate::family::Family;

/// Errors raised while registering processor units.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    /// Two toolchains defined the same custom family value.
    #[error("family {family} is claimed by toolchain '{claimed_by}' and cannot be reused by '{requested_by}'")]
    FamilyCollision {
        family: Family,
        claimed_by: String,
        requested_by: String,
    },
}

/// Errors a unit may return from `process`. The dispatcher logs these and moves
/// on to the next candidate unit.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unit '{unit}' requires a tokio runtime to launch its work")]
    NoRuntime { unit: String },

    #[error("{0}")]
    Other(String),
}
