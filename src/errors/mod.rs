// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod dispatch;
mod graph;
mod publish;

pub use config::{ConfigError, ValidationError};
pub use dispatch::{RegistryError, UnitError};
pub use graph::GraphError;
pub use publish::PublishError;
