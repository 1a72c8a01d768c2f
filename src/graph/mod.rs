// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod module;
pub mod ordering;

pub use module::{BuildModule, ModuleGraph, ModuleId, PropertyBag};
pub use ordering::{order_modules, ModuleComparer, OrderingPolicy, StableModuleComparer};
