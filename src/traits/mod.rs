// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod unit;

pub use unit::{ProcessorUnit, UnitDescriptor};
