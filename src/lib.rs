// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // toolchain units
pub mod command;    // dispatched message + run handles
pub mod config;     // workspace files + runtime
pub mod engine;     // registry + publish scheduler
pub mod errors;     // error handling
pub mod family;
pub mod graph;      // module arena + ordering
pub mod observability;
pub mod package;    // identities + manifests
pub mod traits;     // unit abstraction
