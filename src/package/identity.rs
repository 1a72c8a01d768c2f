// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Package identity: what a module publishes as, and how a missing identity is
//! synthesized from the module's name and location.
//!
//! The textual package reference is `owner:namespace[.scope].name[@version]`:
//!
//! ```
//! use the_foundry::package::PackageReference;
//!
//! let reference: PackageReference = "acme:se.core.logging@2.1.0".parse().unwrap();
//! assert_eq!(reference.id.scope, "core");
//! assert_eq!(reference.version.unwrap().to_string(), "2.1.0");
//! ```

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::consts::{DEFAULT_NAMESPACE, DEFAULT_OWNER, DEFAULT_PRERELEASE};
use crate::errors::PublishError;
use crate::graph::BuildModule;
use crate::package::manifest::DependencyVersion;
use crate::package::RepositorySet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    pub owner: String,
    pub namespace: String,
    #[serde(default)]
    pub scope: String,
    pub name: String,
}

impl PackageId {
    pub fn new(
        owner: impl Into<String>,
        namespace: impl Into<String>,
        scope: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            namespace: namespace.into(),
            scope: scope.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            write!(f, "{}:{}.{}", self.owner, self.namespace, self.name)
        } else {
            write!(f, "{}:{}.{}.{}", self.owner, self.namespace, self.scope, self.name)
        }
    }
}

/// A parsed package reference. The version is optional in the text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub id: PackageId,
    pub version: Option<Version>,
}

impl FromStr for PackageReference {
    type Err = PublishError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| PublishError::InvalidPackageReference {
            reference: text.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = text.trim();
        let (body, version) = match trimmed.rsplit_once('@') {
            Some((body, version)) => (
                body,
                Some(parse_version_lenient(version).ok_or_else(|| invalid("unparseable version"))?),
            ),
            None => (trimmed, None),
        };

        let (owner, path) = body
            .split_once(':')
            .ok_or_else(|| invalid("missing 'owner:' prefix"))?;
        let segments: Vec<&str> = path.split('.').collect();
        let (namespace, scope, name) = match segments.as_slice() {
            [namespace, name] => (*namespace, "", *name),
            [namespace, scope, name] => (*namespace, *scope, *name),
            _ => return Err(invalid("expected namespace[.scope].name")),
        };

        let owner = checked_segment(owner).ok_or_else(|| invalid("invalid owner"))?;
        let namespace = checked_segment(namespace).ok_or_else(|| invalid("invalid namespace"))?;
        let name = checked_segment(name).ok_or_else(|| invalid("invalid name"))?;
        let scope = if scope.is_empty() {
            String::new()
        } else {
            checked_segment(scope).ok_or_else(|| invalid("invalid scope"))?
        };

        Ok(PackageReference {
            id: PackageId { owner, namespace, scope, name },
            version,
        })
    }
}

fn checked_segment(segment: &str) -> Option<String> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| segment.to_ascii_lowercase())
}

/// Accept `1`, `1.2` and `1.2.3[-pre]`.
fn parse_version_lenient(text: &str) -> Option<Version> {
    let text = text.trim();
    if let Ok(version) = Version::parse(text) {
        return Some(version);
    }
    let parts: Vec<&str> = text.split('.').collect();
    if parts.is_empty() || parts.len() > 2 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }
    let padded = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        _ => format!("{}.{}.0", parts[0], parts[1]),
    };
    Version::parse(&padded).ok()
}

/// Free-form metadata a session may attach to a module before publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub description: String,
    pub license: String,
}

/// Package facet attached to a build module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub id: PackageId,
    pub version: Version,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyVersion>,
}

impl PackageIdentity {
    pub fn new(id: PackageId, version: Version) -> Self {
        Self {
            id,
            version,
            description: String::new(),
            license: String::new(),
            tags: BTreeSet::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// `owner:namespace.scope.name@version`, used in diagnostics.
    pub fn friendly_name(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }
}

impl From<PackageReference> for PackageIdentity {
    fn from(reference: PackageReference) -> Self {
        let version = match reference.version {
            Some(version) if !is_zero(&version) => version,
            _ => default_version(),
        };
        PackageIdentity::new(reference.id, version)
    }
}

pub fn default_version() -> Version {
    Version {
        major: 1,
        minor: 0,
        patch: 0,
        pre: Prerelease::new(DEFAULT_PRERELEASE).unwrap_or(Prerelease::EMPTY),
        build: BuildMetadata::EMPTY,
    }
}

fn is_zero(version: &Version) -> bool {
    version.major == 0 && version.minor == 0 && version.patch == 0
}

/// Lowercase a path or module segment and replace anything a package id
/// cannot carry with `-`.
fn sanitize(segment: &str) -> String {
    let mapped: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    mapped.trim_matches('-').to_string()
}

fn parent_directory_name(location: &Path) -> String {
    location
        .parent()
        .and_then(Path::file_name)
        .map(|name| sanitize(&name.to_string_lossy()))
        .unwrap_or_default()
}

/// Identity derived from the module's location when its name is not a package
/// reference: default owner and namespace, parent directory as scope.
fn default_identity(module: &BuildModule) -> Result<PackageIdentity, PublishError> {
    let name = sanitize(module.name());
    if name.is_empty() {
        return Err(PublishError::InvalidPackageReference {
            reference: module.name().to_string(),
            reason: "no usable package name can be derived".to_string(),
        });
    }

    let id = PackageId::new(
        DEFAULT_OWNER,
        DEFAULT_NAMESPACE,
        parent_directory_name(module.location()),
        name,
    );
    Ok(PackageIdentity::new(id, default_version()))
}

/// Return the module's package facet, or synthesize one when none is attached.
///
/// A synthesized identity is not attached; the publish task attaches the
/// published identity once the manifest is written. An identity that is already
/// attached is returned untouched.
pub fn resolve_identity(
    module: &BuildModule,
    repositories: &RepositorySet,
) -> Result<Arc<PackageIdentity>, PublishError> {
    if let Some(existing) = module.properties().get::<PackageIdentity>() {
        return Ok(existing);
    }

    let mut identity = match module.name().parse::<PackageReference>() {
        Ok(reference) => PackageIdentity::from(reference),
        Err(_) => default_identity(module)?,
    };

    if identity.id.scope.is_empty() {
        identity.id.scope = repositories
            .resolve_scope(&identity.id.owner)
            .unwrap_or_default()
            .to_string();
    }

    if let Some(metadata) = module.properties().get::<PackageMetadata>() {
        identity.description = metadata.description.clone();
        identity.license = metadata.license.clone();
    }

    Ok(Arc::new(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModuleGraph;
    use crate::package::Repository;

    #[test]
    fn test_parse_reference_table_driven() {
        struct TestCase {
            input: &'static str,
            expected: Option<(&'static str, &'static str, &'static str, &'static str, Option<&'static str>)>,
        }

        let cases = vec![
            TestCase { input: "acme:se.core.log", expected: Some(("acme", "se", "core", "log", None)) },
            TestCase { input: "acme:se.log@1.2.3", expected: Some(("acme", "se", "", "log", Some("1.2.3"))) },
            TestCase { input: "Acme:SE.Net.Http@2.1", expected: Some(("acme", "se", "net", "http", Some("2.1.0"))) },
            TestCase { input: "acme:se.log@0.0.0", expected: Some(("acme", "se", "", "log", Some("0.0.0"))) },
            TestCase { input: "foo", expected: None },
            TestCase { input: "acme:log", expected: None },
            TestCase { input: "acme:a.b.c.d", expected: None },
            TestCase { input: ":se.log", expected: None },
            TestCase { input: "acme:se.log@banana", expected: None },
            TestCase { input: "acme:se.lo g", expected: None },
        ];

        for case in cases {
            let parsed = case.input.parse::<PackageReference>();
            match (parsed, case.expected) {
                (Ok(reference), Some((owner, namespace, scope, name, version))) => {
                    assert_eq!(reference.id, PackageId::new(owner, namespace, scope, name), "input '{}'", case.input);
                    assert_eq!(reference.version.map(|v| v.to_string()).as_deref(), version, "input '{}'", case.input);
                }
                (Err(_), None) => {}
                (result, expected) => panic!("input '{}': got {:?}, expected {:?}", case.input, result, expected),
            }
        }
    }

    #[test]
    fn test_default_identity_from_location() {
        let mut graph = ModuleGraph::new();
        let foo = graph.add("foo", "/workspace/Bar/foo");

        let identity = resolve_identity(&graph[foo], &RepositorySet::default()).unwrap();
        assert_eq!(identity.id, PackageId::new("schroedingerentertainment", "se", "bar", "foo"));
        assert_eq!(identity.version.to_string(), "1.0.0-pre");
        assert!(!graph[foo].properties().contains::<PackageIdentity>());
    }

    #[test]
    fn test_zero_version_defaults_to_prerelease() {
        let mut graph = ModuleGraph::new();
        let module = graph.add("acme:se.core.log@0.0.0", "/workspace/log");

        let identity = resolve_identity(&graph[module], &RepositorySet::default()).unwrap();
        assert_eq!(identity.version, default_version());
        assert_eq!(identity.id.scope, "core");
    }

    #[test]
    fn test_empty_scope_resolved_from_repositories() {
        let repositories = RepositorySet::from(vec![
            Repository::new("mirror"),
            Repository::new("main").with_prefix("acme", "tools"),
            Repository::new("fallback").with_prefix("acme", "ignored"),
        ]);
        let mut graph = ModuleGraph::new();
        let named = graph.add("acme:se.lint@3.0.0", "/workspace/lint");
        let unknown = graph.add("other:se.fmt@1.0.0", "/workspace/fmt");

        let identity = resolve_identity(&graph[named], &repositories).unwrap();
        assert_eq!(identity.id.scope, "tools");
        assert_eq!(identity.version.to_string(), "3.0.0");

        let identity = resolve_identity(&graph[unknown], &repositories).unwrap();
        assert_eq!(identity.id.scope, "");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let repositories = RepositorySet::from(vec![Repository::new("main").with_prefix("schroedingerentertainment", "x")]);
        let mut graph = ModuleGraph::new();
        let module = graph.add("foo", "/workspace/Bar/foo");

        let first = resolve_identity(&graph[module], &repositories).unwrap();
        let second = resolve_identity(&graph[module], &repositories).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.id.scope, "bar");

        let attached = PackageIdentity::new(PackageId::new("acme", "se", "core", "foo"), Version::new(2, 0, 0));
        graph[module].properties().insert(attached.clone());
        let pinned = resolve_identity(&graph[module], &repositories).unwrap();
        assert_eq!(*pinned, attached);
    }

    #[test]
    fn test_metadata_facet_fills_description_and_license() {
        let mut graph = ModuleGraph::new();
        let module = graph.add("foo", "/workspace/Bar/foo");
        graph[module].properties().insert(PackageMetadata {
            description: "Foo library".to_string(),
            license: "MIT".to_string(),
        });

        let identity = resolve_identity(&graph[module], &RepositorySet::default()).unwrap();
        assert_eq!(identity.description, "Foo library");
        assert_eq!(identity.license, "MIT");
    }

    #[test]
    fn test_unusable_name_is_an_error() {
        let mut graph = ModuleGraph::new();
        let module = graph.add("???", "/workspace/q");
        assert!(matches!(
            resolve_identity(&graph[module], &RepositorySet::default()),
            Err(PublishError::InvalidPackageReference { .. })
        ));
    }

    #[test]
    fn test_friendly_name() {
        let identity = PackageIdentity::new(PackageId::new("acme", "se", "core", "log"), Version::new(1, 2, 3));
        assert_eq!(identity.friendly_name(), "acme:se.core.log@1.2.3");
    }
}
