// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::GraphError;

/// Index of a module inside its owning [`ModuleGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Facet storage keyed by the facet's type.
///
/// Facets can be attached after the graph has been shared across tasks. Each
/// facet type has a single writer per run.
#[derive(Default)]
pub struct PropertyBag {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Insert a facet, replacing any previous facet of the same type.
    pub fn insert<T: Any + Send + Sync>(&self, value: T) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(TypeId::of::<T>(), Arc::new(value));
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("facet_count", &self.len())
            .finish()
    }
}

/// One compilable or already-resolved unit of a build session.
#[derive(Debug)]
pub struct BuildModule {
    id: ModuleId,
    name: String,
    location: PathBuf,
    is_package: bool,
    dependencies: Vec<ModuleId>,
    properties: PropertyBag,
}

impl BuildModule {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// True for externally resolved packages that this run does not produce.
    pub fn is_package(&self) -> bool {
        self.is_package
    }

    pub fn dependencies(&self) -> &[ModuleId] {
        &self.dependencies
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

/// Arena of build modules. Edges are [`ModuleId`]s, so forward references and
/// cycles can be expressed without reference-counted loops.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<BuildModule>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a buildable module
    pub fn add(&mut self, name: impl Into<String>, location: impl Into<PathBuf>) -> ModuleId {
        self.push(name.into(), location.into(), false)
    }

    /// Add a package-only module
    pub fn add_package(&mut self, name: impl Into<String>, location: impl Into<PathBuf>) -> ModuleId {
        self.push(name.into(), location.into(), true)
    }

    fn push(&mut self, name: String, location: PathBuf, is_package: bool) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(BuildModule {
            id,
            name,
            location,
            is_package,
            dependencies: Vec::new(),
            properties: PropertyBag::new(),
        });
        id
    }

    /// Record that `dependent` depends on `dependency`. Duplicate edges are ignored.
    ///
    /// Both ids must come from this graph.
    pub fn add_dependency(&mut self, dependent: ModuleId, dependency: ModuleId) -> Result<(), GraphError> {
        if dependency.0 >= self.modules.len() {
            return Err(GraphError::UnknownModule { module: dependency });
        }
        let deps = &mut self
            .modules
            .get_mut(dependent.0)
            .ok_or(GraphError::UnknownModule { module: dependent })?
            .dependencies;
        if !deps.contains(&dependency) {
            deps.push(dependency);
        }
        Ok(())
    }

    pub fn get(&self, id: ModuleId) -> Option<&BuildModule> {
        self.modules.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ModuleId> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildModule> {
        self.modules.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().map(|m| m.id)
    }

    /// Dependencies of `id`; empty when `id` is not in the graph.
    pub fn dependencies_of(&self, id: ModuleId) -> impl Iterator<Item = &BuildModule> {
        self.modules
            .get(id.0)
            .into_iter()
            .flat_map(|module| module.dependencies.iter())
            .filter_map(move |dep| self.modules.get(dep.0))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Index<ModuleId> for ModuleGraph {
    type Output = BuildModule;

    fn index(&self, id: ModuleId) -> &Self::Output {
        &self.modules[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_property_bag_is_keyed_by_type() {
        let bag = PropertyBag::new();
        assert!(bag.is_empty());

        bag.insert(Marker(1));
        bag.insert(String::from("facet"));
        assert_eq!(bag.len(), 2);
        assert_eq!(*bag.get::<Marker>().unwrap(), Marker(1));
        assert_eq!(bag.get::<String>().unwrap().as_str(), "facet");
        assert!(bag.get::<u64>().is_none());

        bag.insert(Marker(2));
        assert_eq!(bag.len(), 2);
        assert_eq!(*bag.get::<Marker>().unwrap(), Marker(2));
    }

    #[test]
    fn test_edges_to_unknown_ids_are_rejected() {
        let mut graph = ModuleGraph::new();
        let a = graph.add("a", "/ws/a");
        let stray = ModuleId(7);

        assert_eq!(
            graph.add_dependency(a, stray),
            Err(GraphError::UnknownModule { module: stray })
        );
        assert_eq!(
            graph.add_dependency(stray, a),
            Err(GraphError::UnknownModule { module: stray })
        );
        assert!(graph[a].dependencies().is_empty());
        assert_eq!(graph.dependencies_of(stray).count(), 0);
    }

    #[test]
    fn test_graph_allows_forward_references_and_cycles() {
        let mut graph = ModuleGraph::new();
        let a = graph.add("a", "/ws/a");
        let b = graph.add("b", "/ws/b");
        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(b, a).unwrap();
        graph.add_dependency(b, a).unwrap();

        assert_eq!(graph[a].dependencies(), &[b]);
        assert_eq!(graph[b].dependencies(), &[a]);
        assert_eq!(graph.find("b"), Some(b));
        assert_eq!(graph.dependencies_of(a).map(|m| m.name()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_package_flag() {
        let mut graph = ModuleGraph::new();
        let lib = graph.add("lib", "/ws/lib");
        let zlib = graph.add_package("zlib", "/pkgs/zlib");

        assert!(!graph[lib].is_package());
        assert!(graph[zlib].is_package());
        assert_eq!(graph.len(), 2);
    }
}
