// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::graph::ModuleId;

/// Errors raised while wiring a module graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("module {module} is not part of the graph")]
    UnknownModule { module: ModuleId },
}
