// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command dispatch and the dependency-ordered publish scheduler.

pub mod completion;
pub mod publish;
pub mod registry;

pub use completion::CompletionSet;
pub use publish::{FailedModule, PublishScheduler, RunReport, RunStatus, SkippedModule};
pub use registry::{DispatchOutcome, UnitRegistry};
