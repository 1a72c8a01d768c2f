// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! C++ toolchain units.
//!
//! The toolchain reserves the family block starting at `Custom+16`. Its publish
//! controller is registered as the built-in default for [`CPP_PUBLISH`] and hands
//! every module carrying a [`CppModule`] facet to a [`PublishScheduler`].

use serde::Deserialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::{Command, OptionStore, RunHandle};
use crate::config::consts::PUBLISH_FLAG;
use crate::engine::PublishScheduler;
use crate::errors::UnitError;
use crate::family::Family;
use crate::graph::{BuildModule, ModuleComparer, ModuleId};
use crate::traits::ProcessorUnit;

pub const CPP_TOOLCHAIN: &str = "cpp";
pub const CPP_FAMILY_OFFSET: u32 = 16;

pub const CPP_INITIALIZE: Family = Family::custom(CPP_FAMILY_OFFSET);
pub const CPP_BUILD: Family = Family::custom(CPP_FAMILY_OFFSET + 1);
pub const CPP_PUBLISH: Family = Family::custom(CPP_FAMILY_OFFSET + 2);

/// What a C++ module produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CppOutput {
    #[default]
    StaticLibrary,
    SharedLibrary,
    Executable,
    HeaderOnly,
}

impl CppOutput {
    pub fn tag(self) -> &'static str {
        match self {
            CppOutput::StaticLibrary => "static_library",
            CppOutput::SharedLibrary => "shared_library",
            CppOutput::Executable => "executable",
            CppOutput::HeaderOnly => "header_only",
        }
    }

    // Header-only libraries have nothing to link, so they go first among peers.
    fn rank(self) -> u8 {
        match self {
            CppOutput::HeaderOnly => 0,
            CppOutput::StaticLibrary => 1,
            CppOutput::SharedLibrary => 2,
            CppOutput::Executable => 3,
        }
    }
}

/// Toolchain facet marking a module as part of the C++ build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CppModule {
    pub output: CppOutput,
}

fn output_of(module: &BuildModule) -> CppOutput {
    module
        .properties()
        .get::<CppModule>()
        .map(|facet| facet.output)
        .unwrap_or_default()
}

/// Packages last, then dependency count, then output kind, then name.
#[derive(Debug, Default, Clone, Copy)]
pub struct CppModuleComparer;

impl ModuleComparer for CppModuleComparer {
    fn compare(&self, a: &BuildModule, b: &BuildModule) -> Ordering {
        a.is_package()
            .cmp(&b.is_package())
            .then_with(|| a.dependencies().len().cmp(&b.dependencies().len()))
            .then_with(|| output_of(a).rank().cmp(&output_of(b).rank()))
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Per-module manifest tags: the output kind.
pub fn cpp_module_tags(module: &BuildModule) -> Vec<String> {
    vec![output_of(module).tag().to_string()]
}

/// Publish controller for the C++ toolchain.
pub struct CppPublishController {
    target: PathBuf,
    scheduler: Arc<PublishScheduler>,
}

impl CppPublishController {
    pub fn new(target: impl Into<PathBuf>, scheduler: Arc<PublishScheduler>) -> Self {
        Self {
            target: target.into(),
            scheduler,
        }
    }

    pub fn scheduler(&self) -> &Arc<PublishScheduler> {
        &self.scheduler
    }
}

impl ProcessorUnit for CppPublishController {
    fn name(&self) -> &str {
        "cpp-publish"
    }

    fn family(&self) -> Family {
        CPP_PUBLISH
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn enabled(&self, options: &OptionStore) -> bool {
        options.has_flag(PUBLISH_FLAG)
    }

    fn process(&self, command: &mut Command) -> Result<bool, UnitError> {
        if command.phase() != CPP_PUBLISH {
            return Ok(false);
        }

        let graph = command.graph().clone();
        let modules: Vec<ModuleId> = command
            .modules()
            .iter()
            .copied()
            .filter(|id| {
                graph
                    .get(*id)
                    .map_or(false, |m| m.properties().contains::<CppModule>())
            })
            .collect();

        // Nothing here for this toolchain; an empty request still fails fast in the run.
        if modules.is_empty() && !command.modules().is_empty() {
            return Ok(false);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| UnitError::NoRuntime {
            unit: self.name().to_string(),
        })?;

        let scheduler = self.scheduler.clone();
        let handle = runtime.spawn(async move { scheduler.run(graph, &modules).await });
        command.attach(RunHandle::new(self.name(), handle));
        Ok(true)
    }
}
