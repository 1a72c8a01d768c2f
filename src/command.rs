// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The message handed to processor units, and the handle through which an
//! accepting unit returns its asynchronous result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::engine::RunReport;
use crate::errors::PublishError;
use crate::family::Family;
use crate::graph::{ModuleGraph, ModuleId};

/// Invocation options owned by the caller. Units only read them.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    flags: HashSet<String>,
    values: HashMap<String, String>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.set_flag(flag);
        self
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Asynchronous result of a unit that accepted a command.
#[derive(Debug)]
pub struct RunHandle {
    unit: String,
    handle: JoinHandle<Result<RunReport, PublishError>>,
}

impl RunHandle {
    pub fn new(unit: impl Into<String>, handle: JoinHandle<Result<RunReport, PublishError>>) -> Self {
        Self {
            unit: unit.into(),
            handle,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub async fn join(self) -> Result<RunReport, PublishError> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(PublishError::Internal {
                message: format!("run launched by unit '{}' did not finish: {}", self.unit, join_error),
            }),
        }
    }
}

/// A request dispatched to every unit of its phase.
#[derive(Debug)]
pub struct Command {
    phase: Family,
    options: OptionStore,
    graph: Arc<ModuleGraph>,
    modules: Vec<ModuleId>,
    handles: Vec<RunHandle>,
}

impl Command {
    pub fn new(phase: Family, graph: Arc<ModuleGraph>, modules: Vec<ModuleId>) -> Self {
        Self {
            phase,
            options: OptionStore::default(),
            graph,
            modules,
            handles: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: OptionStore) -> Self {
        self.options = options;
        self
    }

    pub fn phase(&self) -> Family {
        self.phase
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn graph(&self) -> &Arc<ModuleGraph> {
        &self.graph
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn attach(&mut self, handle: RunHandle) {
        self.handles.push(handle);
    }

    pub fn attached(&self) -> usize {
        self.handles.len()
    }

    /// Await every attached handle, in attachment order.
    pub async fn join(&mut self) -> Vec<(String, Result<RunReport, PublishError>)> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in self.handles.drain(..) {
            let unit = handle.unit().to_string();
            results.push((unit, handle.join().await));
        }
        results
    }
}
