// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backends::cpp::{CppOutput, CPP_TOOLCHAIN};
use crate::errors::ConfigError;
use crate::graph::OrderingPolicy;
use crate::observability::messages::validation::ValidationWarning;
use crate::observability::messages::StructuredLog;
use crate::package::Repository;

/// A build workspace: the modules of one toolchain plus publishing settings.
///
/// Typically loaded from a YAML file next to the modules it describes.
///
/// # Example
/// ```yaml
/// toolchain: cpp
/// ordering: topological
/// executor_options:
///   max_concurrency: 4
/// options: [publish]
/// repositories:
///   - name: internal
///     url: https://packages.example.com
///     prefixes:
///       acme: tools
/// modules:
///   - name: log
///     location: libs/log
///     output: static_library
///     license: MIT
///   - name: zlib
///     package: true
///     package_ref: "vendor:se.zlib@1.2.11"
///   - name: http
///     depends_on: [log, zlib]
/// ```
#[derive(Debug, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_toolchain")]
    pub toolchain: String,
    #[serde(default)]
    pub ordering: OrderingPolicy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    /// Flags set on every command built from this workspace
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    pub modules: Vec<ModuleConfig>,
    /// Directory relative module locations resolve against
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_toolchain() -> String {
    CPP_TOOLCHAIN.to_string()
}

/// Scheduler options.
///
/// `max_concurrency` bounds the number of publish tasks writing at once; when
/// unset the scheduler uses the host's available parallelism.
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// One module of the workspace.
///
/// # Fields
/// * `name` - Module name, either a plain name or a package reference
/// * `location` - Directory of the module, relative to the workspace file (defaults to `name`)
/// * `package` - True for externally resolved packages this workspace does not build
/// * `package_ref` - Pinned identity, `owner:namespace[.scope].name[@version]`
/// * `output` - What the module produces
/// * `depends_on` - Names of other modules
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub package: bool,
    #[serde(default)]
    pub package_ref: Option<String>,
    #[serde(default)]
    pub output: CppOutput,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl WorkspaceConfig {
    /// Absolute location of `module`.
    pub fn module_location(&self, module: &ModuleConfig) -> PathBuf {
        match &module.location {
            Some(location) if location.is_absolute() => location.clone(),
            Some(location) => self.root.join(location),
            None => self.root.join(&module.name),
        }
    }
}

/// Load a workspace from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkspaceConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: WorkspaceConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    cfg.root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(cfg)
}

/// Load a workspace and validate its module graph.
///
/// Blocking findings fail the load; warnings are logged and the workspace is
/// returned.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<WorkspaceConfig, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(findings) = crate::config::validate_dependency_graph(&cfg) {
        let (warnings, errors): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(|finding| finding.is_warning());

        let workspace = path.display().to_string();
        for finding in &warnings {
            ValidationWarning {
                workspace: &workspace,
                finding,
            }
            .log();
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_workspace(yaml: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.yaml");
        std::fs::write(&path, yaml).unwrap();
        (dir, path)
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
modules:
  - name: log
  - name: http
    location: net/http
    output: shared_library
    depends_on: [log]
"#;

        let cfg: WorkspaceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.toolchain, "cpp");
        assert_eq!(cfg.ordering, OrderingPolicy::Stable);
        assert!(cfg.executor_options.max_concurrency.is_none());
        assert_eq!(cfg.modules.len(), 2);
        assert_eq!(cfg.modules[1].depends_on, vec!["log"]);
        assert_eq!(cfg.modules[1].output, CppOutput::SharedLibrary);
        assert_eq!(cfg.modules[0].output, CppOutput::StaticLibrary);
    }

    #[test]
    fn test_parse_full_workspace() {
        let yaml = r#"
toolchain: cpp
ordering: topological
executor_options:
  max_concurrency: 2
options: [publish]
repositories:
  - name: internal
    url: https://packages.example.com
    prefixes:
      acme: tools
modules:
  - name: zlib
    package: true
    package_ref: "vendor:se.zlib@1.2.11"
  - name: lint
    description: Linter
    license: MIT
    output: executable
"#;

        let cfg: WorkspaceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ordering, OrderingPolicy::Topological);
        assert_eq!(cfg.executor_options.max_concurrency, Some(2));
        assert_eq!(cfg.options, vec!["publish"]);
        assert_eq!(cfg.repositories[0].scope_for("acme"), Some("tools"));
        assert!(cfg.modules[0].package);
        assert_eq!(cfg.modules[0].package_ref.as_deref(), Some("vendor:se.zlib@1.2.11"));
        assert_eq!(cfg.modules[1].license.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_module_locations_resolve_against_workspace_dir() {
        let yaml = r#"
modules:
  - name: log
  - name: http
    location: net/http
  - name: sys
    location: /opt/sys
"#;
        let (dir, path) = write_workspace(yaml);

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.root, dir.path());
        assert_eq!(cfg.module_location(&cfg.modules[0]), dir.path().join("log"));
        assert_eq!(cfg.module_location(&cfg.modules[1]), dir.path().join("net/http"));
        assert_eq!(cfg.module_location(&cfg.modules[2]), PathBuf::from("/opt/sys"));
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let yaml = r#"
modules:
  - name: log
  - name: http
    depends_on: [log]
  - name: app
    output: executable
    depends_on: [http]
"#;
        let (_dir, path) = write_workspace(yaml);

        let result = load_and_validate_config(&path);
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_and_validate_cyclic_config() {
        let yaml = r#"
modules:
  - name: a
    depends_on: [b]
  - name: b
    depends_on: [a]
"#;
        let (_dir, path) = write_workspace(yaml);

        let result = load_and_validate_config(&path);
        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("Cyclic dependency detected"));
    }

    #[test]
    fn test_unresolved_dependency_is_only_a_warning() {
        let yaml = r#"
modules:
  - name: http
    depends_on: [nonexistent]
"#;
        let (_dir, path) = write_workspace(yaml);

        let cfg = load_and_validate_config(&path).unwrap();
        assert_eq!(cfg.modules[0].depends_on, vec!["nonexistent"]);
    }

    #[test]
    fn test_duplicate_names_fail() {
        let yaml = r#"
modules:
  - name: log
  - name: log
"#;
        let (_dir, path) = write_workspace(yaml);

        let error_msg = load_and_validate_config(&path).unwrap_err().to_string();
        assert!(error_msg.contains("Duplicate module name: 'log'"));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(dir.path().join("absent.yaml")),
            Err(ConfigError::Read { .. })
        ));

        let (_dir, path) = write_workspace("modules: [");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        let (_dir, path) = write_workspace("modules:\n  - name: a\n    output: dylib\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
