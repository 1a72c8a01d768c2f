// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Toolchain backends.
//!
//! Each backend contributes processor units for its own family block plus the
//! facets and comparer its publish controller relies on.
//!
//! ## C++ Backend
//! - **Families**: `Custom+16` (initialize) through `Custom+18` (publish)
//! - **Publish controller**: built-in default for `CPP_PUBLISH`
//! - **Facet**: [`cpp::CppModule`] marks a module as part of the C++ build
//!
//! ## Stub Backend (Test-Only)
//! Units and a recording manifest writer for dispatch and scheduler tests.
//! Not available in production builds.

pub mod cpp;
#[cfg(test)]
pub mod stub;
