// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency-ordered publish scheduler.
//!
//! One sequential walk over the ordered publish set launches a concurrent task per
//! module. Before a module launches, each of its buildable dependencies must be in
//! the [`CompletionSet`]. When one is not, the walk waits for every task that is
//! currently in flight and checks again. A dependency that is still missing after
//! that causes the module to be skipped for the rest of the run.
//!
//! Per-module failures never abort the run. They surface in the [`RunReport`] and
//! propagate to dependents only through the readiness check.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::consts::DEFAULT_MAX_CONCURRENCY;
use crate::engine::completion::CompletionSet;
use crate::errors::{PublishError, ValidationError};
use crate::graph::{
    order_modules, BuildModule, ModuleComparer, ModuleGraph, ModuleId, OrderingPolicy,
    StableModuleComparer,
};
use crate::observability::messages::publish::{
    AwaitingInFlight, DependencyMissing, IdentityResolutionFailed, IdentityResolved,
    ModulePublishFailed, ModulePublished, PackageDependencyUnpinned, PublishRunCompleted,
    PublishRunStarted,
};
use crate::observability::messages::StructuredLog;
use crate::package::{
    resolve_identity, synthesize, FileManifestWriter, PackageIdentity, PackageWriter,
    RepositorySet,
};

/// Aggregate outcome of a run that got past ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Success,
    Failure,
}

impl RunStatus {
    /// Status of a finished run. Module failures and skips are diagnostics in
    /// the report; only a run that never got past ordering is a failure.
    pub fn of(result: &Result<RunReport, PublishError>) -> Self {
        match result {
            Ok(_) => RunStatus::Success,
            Err(_) => RunStatus::Failure,
        }
    }

    /// Process exit code for this status.
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModule {
    pub module: String,
    pub missing_dependency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedModule {
    pub module: String,
    pub reason: String,
}

/// What happened to each module of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Published module names, in completion order.
    pub completed: Vec<String>,
    pub skipped: Vec<SkippedModule>,
    pub failed: Vec<FailedModule>,
}

impl RunReport {
    pub fn is_skipped(&self, module: &str) -> bool {
        self.skipped.iter().any(|s| s.module == module)
    }

    pub fn is_failed(&self, module: &str) -> bool {
        self.failed.iter().any(|f| f.module == module)
    }
}

struct InFlight {
    module: String,
    package: String,
    handle: JoinHandle<Result<(), PublishError>>,
}

/// Everything one publish task needs, moved into the spawned future.
struct PublishTask {
    graph: Arc<ModuleGraph>,
    id: ModuleId,
    identity: Arc<PackageIdentity>,
    tags: Vec<String>,
    writer: Arc<dyn PackageWriter>,
    completion: CompletionSet,
    semaphore: Arc<Semaphore>,
}

pub struct PublishScheduler {
    toolchain: String,
    toolchain_tags: Vec<String>,
    repositories: Arc<RepositorySet>,
    comparer: Arc<dyn ModuleComparer>,
    ordering: OrderingPolicy,
    writer: Arc<dyn PackageWriter>,
    max_concurrency: usize,
    module_tags: fn(&BuildModule) -> Vec<String>,
}

impl std::fmt::Debug for PublishScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishScheduler")
            .field("toolchain", &self.toolchain)
            .field("toolchain_tags", &self.toolchain_tags)
            .field("repositories", &self.repositories.len())
            .field("ordering", &self.ordering)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

fn no_module_tags(_: &BuildModule) -> Vec<String> {
    Vec::new()
}

impl PublishScheduler {
    /// Scheduler with the stable comparer, stable ordering, the `package.json`
    /// writer and one task per available core.
    pub fn new(toolchain: impl Into<String>, repositories: Arc<RepositorySet>) -> Self {
        let toolchain = toolchain.into();
        let max_concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);

        Self {
            toolchain_tags: vec![toolchain.clone()],
            toolchain,
            repositories,
            comparer: Arc::new(StableModuleComparer),
            ordering: OrderingPolicy::default(),
            writer: Arc::new(FileManifestWriter),
            max_concurrency,
            module_tags: no_module_tags,
        }
    }

    /// Replace the toolchain tags every manifest carries.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.toolchain_tags = tags;
        self
    }

    pub fn with_comparer(mut self, comparer: Arc<dyn ModuleComparer>) -> Self {
        self.comparer = comparer;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn PackageWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Per-module tags added next to the toolchain tags.
    pub fn with_module_tags(mut self, module_tags: fn(&BuildModule) -> Vec<String>) -> Self {
        self.module_tags = module_tags;
        self
    }

    pub fn toolchain(&self) -> &str {
        &self.toolchain
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    /// Publish `modules`, draining every launched task before returning.
    ///
    /// Fails only before the walk starts: on an empty set, an unknown module id
    /// or a cycle found by topological ordering.
    pub async fn run(
        &self,
        graph: Arc<ModuleGraph>,
        modules: &[ModuleId],
    ) -> Result<RunReport, PublishError> {
        if modules.is_empty() {
            return Err(PublishError::EmptyModuleSet);
        }
        if let Some(unknown) = modules.iter().find(|id| graph.get(**id).is_none()) {
            return Err(PublishError::Internal {
                message: format!("module {} is not part of the graph", unknown),
            });
        }

        let order = order_modules(&graph, modules, self.comparer.as_ref(), self.ordering)
            .map_err(|error| match error {
                ValidationError::CyclicDependency { cycle } => {
                    PublishError::CyclicDependency { cycle }
                }
                other => PublishError::Internal {
                    message: other.to_string(),
                },
            })?;

        let started = Instant::now();
        let buildable = order.iter().filter(|id| !graph[**id].is_package()).count();
        let run_span = PublishRunStarted {
            toolchain: &self.toolchain,
            module_count: buildable,
            max_concurrency: self.max_concurrency,
        }
        .span("run");

        async {
            PublishRunStarted {
                toolchain: &self.toolchain,
                module_count: buildable,
                max_concurrency: self.max_concurrency,
            }
            .log();

            let completion = CompletionSet::new();
            let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
            let mut in_flight: Vec<InFlight> = Vec::new();
            let mut report = RunReport::default();

            for id in order {
                let module = &graph[id];
                // Packages sort last, so nothing buildable follows the first one.
                if module.is_package() {
                    break;
                }

                let identity = match resolve_identity(module, &self.repositories) {
                    Ok(identity) => identity,
                    Err(error) => {
                        IdentityResolutionFailed {
                            module: module.name(),
                            error: &error,
                        }
                        .log();
                        report.failed.push(FailedModule {
                            module: module.name().to_string(),
                            reason: error.to_string(),
                        });
                        continue;
                    }
                };
                let package = identity.friendly_name();
                IdentityResolved {
                    module: module.name(),
                    package: &package,
                }
                .log();

                if let Some(missing) = self
                    .unready_dependency(&graph, module, &completion, &mut in_flight, &mut report)
                    .await
                {
                    DependencyMissing {
                        module: module.name(),
                        dependency: &missing,
                    }
                    .log();
                    report.skipped.push(SkippedModule {
                        module: module.name().to_string(),
                        missing_dependency: missing,
                    });
                    continue;
                }

                let mut tags = self.toolchain_tags.clone();
                tags.extend((self.module_tags)(module));

                let span = IdentityResolved {
                    module: module.name(),
                    package: &package,
                }
                .span("publish_module");
                let task = PublishTask {
                    graph: graph.clone(),
                    id,
                    identity,
                    tags,
                    writer: self.writer.clone(),
                    completion: completion.clone(),
                    semaphore: semaphore.clone(),
                };
                in_flight.push(InFlight {
                    module: module.name().to_string(),
                    package,
                    handle: tokio::spawn(publish_module(task).instrument(span)),
                });
            }

            drain(&mut in_flight, &mut report).await;

            report.completed = completion
                .snapshot()
                .await
                .into_iter()
                .map(|id| graph[id].name().to_string())
                .collect();

            PublishRunCompleted {
                toolchain: &self.toolchain,
                completed: report.completed.len(),
                skipped: report.skipped.len(),
                failed: report.failed.len(),
                duration: started.elapsed(),
            }
            .log();

            Ok(report)
        }
        .instrument(run_span)
        .await
    }

    /// First buildable dependency of `module` that is not complete, after waiting
    /// out the in-flight batch once if needed.
    async fn unready_dependency(
        &self,
        graph: &ModuleGraph,
        module: &BuildModule,
        completion: &CompletionSet,
        in_flight: &mut Vec<InFlight>,
        report: &mut RunReport,
    ) -> Option<String> {
        for dependency in graph.dependencies_of(module.id()) {
            if dependency.is_package() || completion.contains(dependency.id()).await {
                continue;
            }

            if !in_flight.is_empty() {
                AwaitingInFlight {
                    module: module.name(),
                    dependency: dependency.name(),
                    in_flight: in_flight.len(),
                }
                .log();
                drain(in_flight, report).await;

                if completion.contains(dependency.id()).await {
                    continue;
                }
            }

            return Some(dependency.name().to_string());
        }
        None
    }
}

/// Wait for every in-flight task and record failures.
async fn drain(in_flight: &mut Vec<InFlight>, report: &mut RunReport) {
    for task in in_flight.drain(..) {
        match task.handle.await {
            Ok(Ok(())) => {}
            // Already logged by the task.
            Ok(Err(error)) => report.failed.push(FailedModule {
                module: task.module,
                reason: error.to_string(),
            }),
            Err(join_error) => {
                let error = if join_error.is_panic() {
                    PublishError::TaskPanicked {
                        module: task.module.clone(),
                    }
                } else {
                    PublishError::Internal {
                        message: format!("publish task for '{}' was cancelled", task.module),
                    }
                };
                ModulePublishFailed {
                    module: &task.module,
                    package: &task.package,
                    error: &error,
                }
                .log();
                report.failed.push(FailedModule {
                    module: task.module,
                    reason: error.to_string(),
                });
            }
        }
    }
}

async fn publish_module(task: PublishTask) -> Result<(), PublishError> {
    let _permit = task
        .semaphore
        .acquire()
        .await
        .map_err(|e| PublishError::Internal {
            message: format!("failed to acquire publish permit: {}", e),
        })?;

    let module = &task.graph[task.id];

    let mut dependencies = Vec::with_capacity(module.dependencies().len());
    for dependency in task.graph.dependencies_of(task.id) {
        match dependency.properties().get::<PackageIdentity>() {
            Some(identity) => dependencies.push(identity),
            None => PackageDependencyUnpinned {
                module: module.name(),
                dependency: dependency.name(),
            }
            .log(),
        }
    }

    let published = synthesize(&task.identity, &task.tags, &dependencies);
    let package = published.friendly_name();

    match task.writer.write(module.location(), &published).await {
        Ok(path) => {
            module.properties().insert(published);
            task.completion.insert(task.id).await;
            ModulePublished {
                module: module.name(),
                package: &package,
                path: &path,
            }
            .log();
            Ok(())
        }
        Err(error) => {
            ModulePublishFailed {
                module: module.name(),
                package: &package,
                error: &error,
            }
            .log();
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_codes() {
        assert_eq!(RunStatus::Success.code(), 0);
        assert_eq!(RunStatus::Failure.code(), 1);
    }

    #[test]
    fn test_status_of_run_result() {
        let mut report = RunReport::default();
        report.failed.push(FailedModule {
            module: "a".to_string(),
            reason: "disk full".to_string(),
        });
        assert_eq!(RunStatus::of(&Ok(report)), RunStatus::Success);
        assert_eq!(RunStatus::of(&Err(PublishError::EmptyModuleSet)), RunStatus::Failure);
    }

    #[test]
    fn test_builder_clamps_concurrency() {
        let scheduler = PublishScheduler::new("cpp", Arc::new(RepositorySet::default()))
            .with_max_concurrency(0)
            .with_ordering(OrderingPolicy::Topological);
        assert_eq!(scheduler.max_concurrency(), 1);
        assert_eq!(scheduler.ordering(), OrderingPolicy::Topological);
        assert_eq!(scheduler.toolchain(), "cpp");
    }

    #[tokio::test]
    async fn test_empty_set_fails_before_launch() {
        let scheduler = PublishScheduler::new("cpp", Arc::new(RepositorySet::default()));
        let result = scheduler.run(Arc::new(ModuleGraph::new()), &[]).await;
        assert!(matches!(result, Err(PublishError::EmptyModuleSet)));
    }

    #[tokio::test]
    async fn test_unknown_module_id_is_rejected() {
        let scheduler = PublishScheduler::new("cpp", Arc::new(RepositorySet::default()));
        let result = scheduler.run(Arc::new(ModuleGraph::new()), &[ModuleId(3)]).await;
        assert!(matches!(result, Err(PublishError::Internal { .. })));
    }
}
