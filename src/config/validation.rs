// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workspace validation.
//!
//! Checks run in this order:
//!
//! 1. **Uniqueness**: module names are unique
//! 2. **References**: every `depends_on` names a declared module
//! 3. **Packages**: package-only modules carry a `package_ref`
//! 4. **Cycles**: DFS with a recursion stack over the resolvable edges
//!
//! Findings from steps 2 and 3 are warnings (see [`ValidationError::is_warning`]).
//! An undeclared dependency becomes a placeholder module at runtime and its
//! dependents are skipped when publishing, so it does not block the workspace.
//! Cycle detection is skipped when names are not unique, since edges would be
//! ambiguous.
//!
//! # Example
//! ```rust
//! use the_foundry::config::validate_dependency_graph;
//! use the_foundry::errors::ValidationError;
//!
//! let config = serde_yaml::from_str(r#"
//! modules:
//!   - name: a
//!     depends_on: [b]
//!   - name: b
//!     depends_on: [a]
//! "#).unwrap();
//!
//! let errors = validate_dependency_graph(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::CyclicDependency {
//!         cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
//!     }]
//! );
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::WorkspaceConfig;
use crate::errors::ValidationError;

/// Validate a workspace's module graph, returning every finding.
///
/// Callers separate warnings from blocking errors with
/// [`ValidationError::is_warning`].
pub fn validate_dependency_graph(config: &WorkspaceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let duplicates = validate_unique_module_names(config);
    let has_duplicates = !duplicates.is_empty();
    errors.extend(duplicates);
    errors.extend(validate_dependency_references(config));
    errors.extend(validate_package_references(config));

    if !has_duplicates {
        if let Some(cycle) = find_cycle(config) {
            errors.push(ValidationError::CyclicDependency { cycle });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_module_names(config: &WorkspaceConfig) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    for module in &config.modules {
        if !seen.insert(module.name.as_str()) && reported.insert(module.name.as_str()) {
            errors.push(ValidationError::DuplicateModuleName {
                module: module.name.clone(),
            });
        }
    }
    errors
}

fn validate_dependency_references(config: &WorkspaceConfig) -> Vec<ValidationError> {
    let names: HashSet<&str> = config.modules.iter().map(|m| m.name.as_str()).collect();

    config
        .modules
        .iter()
        .flat_map(|module| {
            module
                .depends_on
                .iter()
                .filter(|dependency| !names.contains(dependency.as_str()))
                .map(move |dependency| ValidationError::UnresolvedDependency {
                    module: module.name.clone(),
                    missing_dependency: dependency.clone(),
                })
        })
        .collect()
}

fn validate_package_references(config: &WorkspaceConfig) -> Vec<ValidationError> {
    config
        .modules
        .iter()
        .filter(|module| module.package && module.package_ref.is_none())
        .map(|module| ValidationError::PackageWithoutReference {
            module: module.name.clone(),
        })
        .collect()
}

/// Cycle over declared edges, as `[start, ..., start]`, or `None`.
///
/// Modules are visited in declaration order so the reported cycle is stable.
fn find_cycle(config: &WorkspaceConfig) -> Option<Vec<String>> {
    let graph: HashMap<&str, Vec<&str>> = config
        .modules
        .iter()
        .map(|module| (module.name.as_str(), module.depends_on.iter().map(String::as_str).collect()))
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for module in &config.modules {
        if !visited.contains(module.name.as_str()) {
            if let Some(cycle) =
                dfs_cycle_detection(&module.name, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Some(cycle);
            }
        }
    }
    None
}

/// Three-colour DFS: `visited` holds black and gray nodes, `rec_stack` the gray
/// ones on the current path. Reaching a gray node closes a cycle.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            // Undeclared names are reported separately.
            if !graph.contains_key(neighbor) {
                continue;
            }
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
