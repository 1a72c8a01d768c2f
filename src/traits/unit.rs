// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::command::{Command, OptionStore};
use crate::errors::UnitError;
use crate::family::Family;

/// A pipeline node that conditionally handles a dispatched command.
///
/// Units are immutable once constructed. `enabled` is asked again on every
/// dispatch, so it should read the command's options rather than cache them.
pub trait ProcessorUnit: Send + Sync {
    fn name(&self) -> &str;

    fn family(&self) -> Family;

    /// Path this unit operates on, for diagnostics.
    fn target(&self) -> &Path;

    fn enabled(&self, options: &OptionStore) -> bool;

    /// Returns `Ok(true)` when the unit accepted the command. Accepted work that
    /// finishes later is attached to the command with [`Command::attach`].
    fn process(&self, command: &mut Command) -> Result<bool, UnitError>;
}

/// A unit plus the registration metadata the registry orders it by.
#[derive(Clone)]
pub struct UnitDescriptor {
    unit: Arc<dyn ProcessorUnit>,
    toolchain: String,
    is_extension: bool,
    is_built_in: bool,
}

impl UnitDescriptor {
    pub fn new(toolchain: impl Into<String>, unit: Arc<dyn ProcessorUnit>) -> Self {
        Self {
            unit,
            toolchain: toolchain.into(),
            is_extension: false,
            is_built_in: false,
        }
    }

    /// Stand-alone unit offered every command, outside any family ordering.
    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    /// Default fallback that runs after user-supplied units of its family.
    pub fn built_in(mut self) -> Self {
        self.is_built_in = true;
        self
    }

    pub fn unit(&self) -> &Arc<dyn ProcessorUnit> {
        &self.unit
    }

    pub fn toolchain(&self) -> &str {
        &self.toolchain
    }

    pub fn is_extension(&self) -> bool {
        self.is_extension
    }

    pub fn is_built_in(&self) -> bool {
        self.is_built_in
    }
}

impl fmt::Debug for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDescriptor")
            .field("unit", &self.unit.name())
            .field("family", &self.unit.family())
            .field("toolchain", &self.toolchain)
            .field("is_extension", &self.is_extension)
            .field("is_built_in", &self.is_built_in)
            .finish()
    }
}
