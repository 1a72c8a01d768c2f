// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::graph::ModuleId;

#[derive(Debug, Default)]
struct CompletionState {
    members: HashSet<ModuleId>,
    order: Vec<ModuleId>,
}

/// Modules whose publish task finished successfully during one run.
///
/// Publish tasks insert concurrently while the walk checks membership, so every
/// access goes through the mutex. Membership only grows: there is no removal.
#[derive(Debug, Clone, Default)]
pub struct CompletionSet {
    inner: Arc<Mutex<CompletionState>>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the module was already complete.
    pub async fn insert(&self, id: ModuleId) -> bool {
        let mut state = self.inner.lock().await;
        if state.members.insert(id) {
            state.order.push(id);
            true
        } else {
            false
        }
    }

    pub async fn contains(&self, id: ModuleId) -> bool {
        self.inner.lock().await.members.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Members in the order they completed.
    pub async fn snapshot(&self) -> Vec<ModuleId> {
        self.inner.lock().await.order.clone()
    }
}
