// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Walk order for the publish scheduler.
//!
//! The scheduler relies on "earlier in the order means it may already be
//! complete", so every comparer must put package-only modules after buildable
//! ones and break ties deterministically.
//!
//! Two policies are available:
//!
//! * [`OrderingPolicy::Stable`] sorts with the comparer alone. A dependency that
//!   happens to sort after its dependent can never be ready in time, and the
//!   dependent is skipped.
//! * [`OrderingPolicy::Topological`] runs Kahn's algorithm over the buildable
//!   modules, using the comparer to order each level, and reports true cycles.

use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::errors::ValidationError;
use crate::graph::{BuildModule, ModuleGraph, ModuleId};

pub trait ModuleComparer: Send + Sync {
    fn compare(&self, a: &BuildModule, b: &BuildModule) -> Ordering;
}

/// Buildable before package, then fewer declared dependencies first, then name.
#[derive(Debug, Default, Clone, Copy)]
pub struct StableModuleComparer;

impl ModuleComparer for StableModuleComparer {
    fn compare(&self, a: &BuildModule, b: &BuildModule) -> Ordering {
        a.is_package()
            .cmp(&b.is_package())
            .then_with(|| a.dependencies().len().cmp(&b.dependencies().len()))
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    #[default]
    Stable,
    Topological,
}

/// Produce the walk order for `modules`. Duplicate ids are collapsed.
pub fn order_modules(
    graph: &ModuleGraph,
    modules: &[ModuleId],
    comparer: &dyn ModuleComparer,
    policy: OrderingPolicy,
) -> Result<Vec<ModuleId>, ValidationError> {
    let mut sorted: Vec<ModuleId> = modules.to_vec();
    sorted.sort_by(|a, b| comparer.compare(&graph[*a], &graph[*b]));
    sorted.dedup();

    match policy {
        OrderingPolicy::Stable => Ok(sorted),
        OrderingPolicy::Topological => topological_order(graph, &sorted, comparer),
    }
}

fn topological_order(
    graph: &ModuleGraph,
    sorted: &[ModuleId],
    comparer: &dyn ModuleComparer,
) -> Result<Vec<ModuleId>, ValidationError> {
    let (buildable, packages): (Vec<ModuleId>, Vec<ModuleId>) =
        sorted.iter().copied().partition(|id| !graph[*id].is_package());
    let members: HashSet<ModuleId> = buildable.iter().copied().collect();

    // Only edges between buildable members of this run constrain the order.
    let mut in_degree: HashMap<ModuleId, usize> = HashMap::new();
    let mut dependents: HashMap<ModuleId, Vec<ModuleId>> = HashMap::new();
    for id in &buildable {
        let deps: Vec<ModuleId> = graph[*id]
            .dependencies()
            .iter()
            .copied()
            .filter(|dep| members.contains(dep))
            .collect();
        in_degree.insert(*id, deps.len());
        for dep in deps {
            dependents.entry(dep).or_default().push(*id);
        }
    }

    let mut order = Vec::with_capacity(sorted.len());
    let mut level: Vec<ModuleId> = buildable
        .iter()
        .copied()
        .filter(|id| in_degree[id] == 0)
        .collect();

    while !level.is_empty() {
        level.sort_by(|a, b| comparer.compare(&graph[*a], &graph[*b]));
        let mut next = Vec::new();
        for id in &level {
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(*dependent);
                    }
                }
            }
        }
        order.append(&mut level);
        level = next;
    }

    if order.len() != buildable.len() {
        let placed: HashSet<ModuleId> = order.iter().copied().collect();
        let remaining: HashSet<ModuleId> = buildable
            .iter()
            .copied()
            .filter(|id| !placed.contains(id))
            .collect();
        return Err(ValidationError::CyclicDependency {
            cycle: find_cycle(graph, &buildable, &remaining),
        });
    }

    order.extend(packages);
    Ok(order)
}

/// Every module left over by Kahn's algorithm has a dependency that is also
/// left over, so following those edges must revisit a module.
fn find_cycle(graph: &ModuleGraph, buildable: &[ModuleId], remaining: &HashSet<ModuleId>) -> Vec<String> {
    let Some(start) = buildable.iter().copied().find(|id| remaining.contains(id)) else {
        return Vec::new();
    };

    let mut path: Vec<ModuleId> = Vec::new();
    let mut current = start;
    loop {
        if let Some(pos) = path.iter().position(|id| *id == current) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|id| graph[*id].name().to_string())
                .collect();
            cycle.push(graph[current].name().to_string());
            return cycle;
        }
        path.push(current);
        match graph[current]
            .dependencies()
            .iter()
            .copied()
            .find(|dep| remaining.contains(dep))
        {
            Some(next) => current = next,
            None => return path.iter().map(|id| graph[*id].name().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(graph: &ModuleGraph, order: &[ModuleId]) -> Vec<String> {
        order.iter().map(|id| graph[*id].name().to_string()).collect()
    }

    #[test]
    fn test_stable_order_is_deterministic_and_packages_last() {
        let mut graph = ModuleGraph::new();
        let pkg = graph.add_package("zlib", "/pkgs/zlib");
        let c = graph.add("c", "/ws/c");
        let b = graph.add("b", "/ws/b");
        let a = graph.add("a", "/ws/a");
        let apkg = graph.add_package("abseil", "/pkgs/abseil");
        graph.add_dependency(b, a).unwrap();
        graph.add_dependency(c, b).unwrap();
        graph.add_dependency(c, pkg).unwrap();

        let input = vec![pkg, c, b, a, apkg];
        let first = order_modules(&graph, &input, &StableModuleComparer, OrderingPolicy::Stable).unwrap();
        let mut reversed = input.clone();
        reversed.reverse();
        let second = order_modules(&graph, &reversed, &StableModuleComparer, OrderingPolicy::Stable).unwrap();

        assert_eq!(first, second);
        assert_eq!(names(&graph, &first), vec!["a", "b", "c", "abseil", "zlib"]);
    }

    #[test]
    fn test_stable_order_collapses_duplicates() {
        let mut graph = ModuleGraph::new();
        let a = graph.add("a", "/ws/a");
        let order = order_modules(&graph, &[a, a], &StableModuleComparer, OrderingPolicy::Stable).unwrap();
        assert_eq!(order, vec![a]);
    }

    #[test]
    fn test_stable_order_can_place_dependency_after_dependent() {
        // "app" has one dependency, "zeta" has two, so the comparer puts app first
        // even though app depends on zeta.
        let mut graph = ModuleGraph::new();
        let base = graph.add("base", "/ws/base");
        let extra = graph.add("extra", "/ws/extra");
        let zeta = graph.add("zeta", "/ws/zeta");
        let app = graph.add("app", "/ws/app");
        graph.add_dependency(zeta, base).unwrap();
        graph.add_dependency(zeta, extra).unwrap();
        graph.add_dependency(app, zeta).unwrap();

        let stable = order_modules(&graph, &[base, extra, zeta, app], &StableModuleComparer, OrderingPolicy::Stable).unwrap();
        assert_eq!(names(&graph, &stable), vec!["base", "extra", "app", "zeta"]);

        let topo = order_modules(&graph, &[base, extra, zeta, app], &StableModuleComparer, OrderingPolicy::Topological).unwrap();
        assert_eq!(names(&graph, &topo), vec!["base", "extra", "zeta", "app"]);
    }

    #[test]
    fn test_topological_order_reports_cycles() {
        let mut graph = ModuleGraph::new();
        let entry = graph.add("entry", "/ws/entry");
        let a = graph.add("a", "/ws/a");
        let b = graph.add("b", "/ws/b");
        graph.add_dependency(a, entry).unwrap();
        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(b, a).unwrap();

        let result = order_modules(&graph, &[entry, a, b], &StableModuleComparer, OrderingPolicy::Topological);
        match result {
            Err(ValidationError::CyclicDependency { cycle }) => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_topological_order_ignores_edges_outside_the_run() {
        let mut graph = ModuleGraph::new();
        let outside = graph.add("outside", "/ws/outside");
        let a = graph.add("a", "/ws/a");
        graph.add_dependency(a, outside).unwrap();

        let order = order_modules(&graph, &[a], &StableModuleComparer, OrderingPolicy::Topological).unwrap();
        assert_eq!(order, vec![a]);
    }
}
