// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the foundry.
//!
//! Every diagnostic the library emits is a message struct with a `Display`
//! implementation, so log text lives in one place instead of being scattered
//! through the scheduler and dispatcher as format strings.
//!
//! Messages are organized by subsystem:
//! * `messages::dispatch` - unit registration and command dispatch
//! * `messages::publish` - publish runs and per-module outcomes
//! * `messages::validation` - workspace validation findings
//!
//! # Usage
//!
//! ```rust
//! use the_foundry::observability::messages::publish::DependencyMissing;
//! use the_foundry::observability::messages::StructuredLog;
//!
//! let msg = DependencyMissing {
//!     module: "http",
//!     dependency: "log",
//! };
//!
//! msg.log();
//! ```
//!
//! The library never installs a subscriber; the `foundry` binary does.

pub mod messages;
