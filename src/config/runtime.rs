// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::backends::cpp::{
    cpp_module_tags, CppModule, CppModuleComparer, CppPublishController, CPP_TOOLCHAIN,
};
use crate::command::{Command, OptionStore};
use crate::config::WorkspaceConfig;
use crate::engine::{PublishScheduler, UnitRegistry};
use crate::errors::ConfigError;
use crate::family::Family;
use crate::graph::{ModuleGraph, ModuleId};
use crate::observability::messages::validation::PlaceholderModuleCreated;
use crate::observability::messages::StructuredLog;
use crate::package::{PackageIdentity, PackageMetadata, PackageReference, RepositorySet};
use crate::traits::UnitDescriptor;

/// Everything needed to dispatch commands against one workspace.
#[derive(Debug)]
pub struct Runtime {
    pub graph: Arc<ModuleGraph>,
    /// Declared modules in declaration order. Placeholders are not included.
    pub modules: Vec<ModuleId>,
    pub repositories: Arc<RepositorySet>,
    pub registry: UnitRegistry,
    pub options: OptionStore,
    pub root: PathBuf,
}

impl Runtime {
    /// Command for `phase` over every declared module, carrying the workspace's
    /// default options.
    pub fn command(&self, phase: Family) -> Command {
        Command::new(phase, self.graph.clone(), self.modules.clone())
            .with_options(self.options.clone())
    }
}

/// Workspace runtime builder - turns a validated configuration into a module
/// graph and a unit registry.
///
/// # Examples
/// ```
/// use the_foundry::backends::cpp::CPP_PUBLISH;
/// use the_foundry::config::{RuntimeBuilder, WorkspaceConfig};
///
/// let config: WorkspaceConfig = serde_yaml::from_str(r#"
/// options: [publish]
/// modules:
///   - name: log
///   - name: http
///     depends_on: [log]
/// "#).unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(runtime.modules.len(), 2);
/// assert_eq!(runtime.registry.candidates(CPP_PUBLISH).count(), 1);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(cfg: &WorkspaceConfig) -> Result<Runtime, ConfigError> {
        if cfg.toolchain != CPP_TOOLCHAIN {
            return Err(ConfigError::UnsupportedToolchain {
                toolchain: cfg.toolchain.clone(),
            });
        }

        let repositories = Arc::new(RepositorySet::from(cfg.repositories.clone()));
        let (graph, modules) = Self::build_graph(cfg, &repositories)?;

        let mut scheduler = PublishScheduler::new(CPP_TOOLCHAIN, repositories.clone())
            .with_comparer(Arc::new(CppModuleComparer))
            .with_module_tags(cpp_module_tags)
            .with_ordering(cfg.ordering);
        if let Some(max_concurrency) = cfg.executor_options.max_concurrency {
            scheduler = scheduler.with_max_concurrency(max_concurrency);
        }

        let mut registry = UnitRegistry::new();
        let controller = CppPublishController::new(cfg.root.clone(), Arc::new(scheduler));
        registry.register(UnitDescriptor::new(CPP_TOOLCHAIN, Arc::new(controller)).built_in())?;

        let mut options = OptionStore::new();
        for flag in &cfg.options {
            options.set_flag(flag.clone());
        }

        Ok(Runtime {
            graph: Arc::new(graph),
            modules,
            repositories,
            registry,
            options,
            root: cfg.root.clone(),
        })
    }

    fn build_graph(
        cfg: &WorkspaceConfig,
        repositories: &RepositorySet,
    ) -> Result<(ModuleGraph, Vec<ModuleId>), ConfigError> {
        let mut graph = ModuleGraph::new();
        let mut by_name: HashMap<&str, ModuleId> = HashMap::new();
        let mut declared = Vec::with_capacity(cfg.modules.len());

        for module in &cfg.modules {
            let location = cfg.module_location(module);
            let id = if module.package {
                graph.add_package(module.name.clone(), location)
            } else {
                graph.add(module.name.clone(), location)
            };
            by_name.entry(module.name.as_str()).or_insert(id);
            declared.push(id);

            let properties = graph[id].properties();
            if !module.package {
                properties.insert(CppModule {
                    output: module.output,
                });
            }
            if module.description.is_some() || module.license.is_some() {
                properties.insert(PackageMetadata {
                    description: module.description.clone().unwrap_or_default(),
                    license: module.license.clone().unwrap_or_default(),
                });
            }
            if let Some(text) = &module.package_ref {
                let reference: PackageReference =
                    text.parse().map_err(|e: crate::errors::PublishError| {
                        ConfigError::InvalidPackageRef {
                            module: module.name.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                let mut identity = PackageIdentity::from(reference);
                if identity.id.scope.is_empty() {
                    identity.id.scope = repositories
                        .resolve_scope(&identity.id.owner)
                        .unwrap_or_default()
                        .to_string();
                }
                identity.description = module.description.clone().unwrap_or_default();
                identity.license = module.license.clone().unwrap_or_default();
                properties.insert(identity);
            }
        }

        for (module, &dependent) in cfg.modules.iter().zip(&declared) {
            for dependency in &module.depends_on {
                let target = match by_name.get(dependency.as_str()) {
                    Some(id) => *id,
                    None => {
                        PlaceholderModuleCreated {
                            dependency,
                            dependent: &module.name,
                        }
                        .log();
                        let id = graph.add(dependency.clone(), cfg.root.join(dependency));
                        by_name.insert(dependency.as_str(), id);
                        id
                    }
                };
                graph.add_dependency(dependent, target)?;
            }
        }

        Ok((graph, declared))
    }
}
