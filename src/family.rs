// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Numeric family identifiers that partition processor units into phases.
//!
//! Built-in families occupy the values below [`Family::CUSTOM`]. A toolchain that
//! ships its own units reserves a contiguous block above it by defining constants
//! with [`Family::custom`]:
//!
//! ```
//! use the_foundry::family::Family;
//!
//! const RUST_INITIALIZE: Family = Family::custom(32);
//! const RUST_PUBLISH: Family = Family::custom(33);
//!
//! assert!(RUST_INITIALIZE.is_custom());
//! assert_eq!(RUST_PUBLISH.offset(), Some(33));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Family(pub u32);

impl Family {
    pub const INITIALIZE: Family = Family(1);
    pub const BUILD: Family = Family(2);
    pub const PUBLISH: Family = Family(3);

    /// First value of the extensible range.
    pub const CUSTOM: Family = Family(256);

    pub const fn custom(offset: u32) -> Family {
        Family(Self::CUSTOM.0 + offset)
    }

    pub const fn is_custom(self) -> bool {
        self.0 >= Self::CUSTOM.0
    }

    /// Offset above [`Family::CUSTOM`], or `None` for built-in families.
    pub const fn offset(self) -> Option<u32> {
        if self.is_custom() {
            Some(self.0 - Self::CUSTOM.0)
        } else {
            None
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(k) => write!(f, "Custom+{}", k),
            None => match *self {
                Family::INITIALIZE => write!(f, "Initialize"),
                Family::BUILD => write!(f, "Build"),
                Family::PUBLISH => write!(f, "Publish"),
                Family(other) => write!(f, "Family({})", other),
            },
        }
    }
}

impl From<u32> for Family {
    fn from(value: u32) -> Self {
        Family(value)
    }
}

/// Tracks which toolchain owns each custom family value.
///
/// A custom value claimed by two toolchains is reported when the second unit
/// registers.
#[derive(Debug, Default, Clone)]
pub struct FamilyClaims {
    owners: HashMap<Family, String>,
}

impl FamilyClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `family` for `toolchain`. Re-claiming by the same toolchain is a no-op.
    pub fn claim(&mut self, family: Family, toolchain: &str) -> Result<(), RegistryError> {
        if !family.is_custom() {
            return Ok(());
        }

        match self.owners.get(&family) {
            Some(owner) if owner != toolchain => Err(RegistryError::FamilyCollision {
                family,
                claimed_by: owner.clone(),
                requested_by: toolchain.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(family, toolchain.to_string());
                Ok(())
            }
        }
    }

    pub fn owner(&self, family: Family) -> Option<&str> {
        self.owners.get(&family).map(String::as_str)
    }
}
