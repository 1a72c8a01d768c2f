// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unit registry and command dispatch.
//!
//! Units are grouped by family. Within a family, user-supplied units are offered
//! a command in registration order and built-in defaults come last, so a user
//! unit can take over a phase simply by being registered. The first grouped unit
//! that accepts the command ends the walk for that family.
//!
//! Extension units sit outside the family grouping and are offered every
//! command on their own.
//!
//! A unit that returns an error or panics is logged and treated as not having
//! handled the command.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::command::Command;
use crate::errors::RegistryError;
use crate::family::{Family, FamilyClaims};
use crate::observability::messages::dispatch::{
    CommandHandled, CommandUnrecognized, UnitFailed, UnitPanicked, UnitRegistered,
};
use crate::observability::messages::StructuredLog;
use crate::traits::UnitDescriptor;

#[derive(Debug, Default)]
struct FamilyGroup {
    user: Vec<UnitDescriptor>,
    built_in: Vec<UnitDescriptor>,
}

/// Result of offering a command to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Names of the units that accepted the command.
    Handled { units: Vec<String> },
    /// No unit accepted the command.
    Unrecognized,
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

#[derive(Debug, Default)]
pub struct UnitRegistry {
    groups: HashMap<Family, FamilyGroup>,
    extensions: Vec<UnitDescriptor>,
    claims: FamilyClaims,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit. Fails if its custom family belongs to another toolchain.
    pub fn register(&mut self, descriptor: UnitDescriptor) -> Result<(), RegistryError> {
        let family = descriptor.unit().family();
        self.claims.claim(family, descriptor.toolchain())?;

        UnitRegistered {
            unit: descriptor.unit().name(),
            family,
            toolchain: descriptor.toolchain(),
            is_extension: descriptor.is_extension(),
            is_built_in: descriptor.is_built_in(),
        }
        .log();

        if descriptor.is_extension() {
            self.extensions.push(descriptor);
        } else {
            let group = self.groups.entry(family).or_default();
            if descriptor.is_built_in() {
                group.built_in.push(descriptor);
            } else {
                group.user.push(descriptor);
            }
        }
        Ok(())
    }

    /// Grouped units of `family` in dispatch order.
    pub fn candidates(&self, family: Family) -> impl Iterator<Item = &UnitDescriptor> {
        self.groups
            .get(&family)
            .into_iter()
            .flat_map(|group| group.user.iter().chain(group.built_in.iter()))
    }

    pub fn extensions(&self) -> &[UnitDescriptor] {
        &self.extensions
    }

    pub fn claims(&self) -> &FamilyClaims {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.groups
            .values()
            .map(|group| group.user.len() + group.built_in.len())
            .sum::<usize>()
            + self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch(&self, command: &mut Command) -> DispatchOutcome {
        let mut handled_by = Vec::new();
        let mut offered = 0;

        for descriptor in self.candidates(command.phase()) {
            offered += 1;
            if offer(descriptor, command) {
                handled_by.push(descriptor.unit().name().to_string());
                break;
            }
        }

        for descriptor in &self.extensions {
            offered += 1;
            if offer(descriptor, command) {
                handled_by.push(descriptor.unit().name().to_string());
            }
        }

        if handled_by.is_empty() {
            CommandUnrecognized {
                phase: command.phase(),
                candidates: offered,
            }
            .log();
            DispatchOutcome::Unrecognized
        } else {
            DispatchOutcome::Handled { units: handled_by }
        }
    }
}

fn offer(descriptor: &UnitDescriptor, command: &mut Command) -> bool {
    let unit = descriptor.unit();
    if !unit.enabled(command.options()) {
        return false;
    }

    let phase = command.phase();
    match panic::catch_unwind(AssertUnwindSafe(|| unit.process(command))) {
        Ok(Ok(true)) => {
            CommandHandled {
                unit: unit.name(),
                phase,
                target: unit.target(),
            }
            .log();
            true
        }
        Ok(Ok(false)) => false,
        Ok(Err(error)) => {
            UnitFailed {
                unit: unit.name(),
                phase,
                error: &error,
            }
            .log();
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            UnitPanicked {
                unit: unit.name(),
                phase,
                message: &message,
            }
            .log();
            false
        }
    }
}
