// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;

/// A package repository and its owner -> scope prefix table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            prefixes: HashMap::new(),
        }
    }

    pub fn with_prefix(mut self, owner: impl Into<String>, scope: impl Into<String>) -> Self {
        self.prefixes.insert(owner.into(), scope.into());
        self
    }

    /// Owners are matched case-insensitively since package ids are lowercased.
    pub fn scope_for(&self, owner: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(owner))
            .map(|(_, scope)| scope.as_str())
    }
}

/// Ordered, read-only collection of configured repositories.
#[derive(Debug, Clone, Default)]
pub struct RepositorySet(pub Vec<Repository>);

impl RepositorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope from the first repository whose prefix table knows `owner`.
    pub fn resolve_scope(&self, owner: &str) -> Option<&str> {
        self.0.iter().find_map(|repository| repository.scope_for(owner))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Repository>> for RepositorySet {
    fn from(repositories: Vec<Repository>) -> Self {
        Self(repositories)
    }
}
