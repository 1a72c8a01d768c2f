// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Manifest synthesis and the `package.json` writer.
//!
//! [`synthesize`] is pure: it decorates an identity with toolchain tags and a
//! dependency map built from the dependencies' own identities. Writing the
//! result is the only file-system side effect of a publish run and goes through
//! the [`PackageWriter`] seam.

use async_trait::async_trait;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::consts::MANIFEST_FILE_NAME;
use crate::errors::PublishError;
use crate::package::PackageIdentity;

/// Version requirement recorded for a dependency.
///
/// `range` marks compatible-range matching (`^M.m.r`) rather than an exact pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyVersion {
    pub major: u64,
    pub minor: u64,
    pub revision: u64,
    pub range: bool,
}

impl DependencyVersion {
    pub fn compatible(version: &Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            revision: version.patch,
            range: true,
        }
    }

    pub fn exact(version: &Version) -> Self {
        Self {
            range: false,
            ..Self::compatible(version)
        }
    }
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.range {
            write!(f, "^")?;
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl FromStr for DependencyVersion {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (range, rest) = match text.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let version = Version::parse(rest).map_err(|e| format!("invalid dependency version '{}': {}", text, e))?;
        Ok(Self {
            major: version.major,
            minor: version.minor,
            revision: version.patch,
            range,
        })
    }
}

impl Serialize for DependencyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DependencyVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Build the identity that gets published: toolchain tags plus the namespace,
/// and a compatible-range entry for every dependency identity.
pub fn synthesize(
    identity: &PackageIdentity,
    toolchain_tags: &[String],
    dependencies: &[Arc<PackageIdentity>],
) -> PackageIdentity {
    let mut published = identity.clone();
    published.tags.extend(toolchain_tags.iter().cloned());
    published.tags.insert(identity.id.namespace.clone());

    for dependency in dependencies {
        published.dependencies.insert(
            dependency.id.to_string(),
            DependencyVersion::compatible(&dependency.version),
        );
    }
    published
}

#[async_trait]
pub trait PackageWriter: Send + Sync {
    /// Persist `identity` for the module at `location`, returning the written path.
    async fn write(&self, location: &Path, identity: &PackageIdentity) -> Result<PathBuf, PublishError>;
}

/// Writes pretty-printed JSON to `<location>/package.json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileManifestWriter;

#[async_trait]
impl PackageWriter for FileManifestWriter {
    async fn write(&self, location: &Path, identity: &PackageIdentity) -> Result<PathBuf, PublishError> {
        let path = location.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_vec_pretty(identity).map_err(|source| PublishError::Serialize {
            path: path.clone(),
            source,
        })?;

        tokio::fs::create_dir_all(location)
            .await
            .map_err(|source| PublishError::Io {
                path: location.to_path_buf(),
                source,
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Load a previously written manifest.
pub fn read_manifest(path: &Path) -> Result<PackageIdentity, PublishError> {
    let content = std::fs::read(path).map_err(|source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| PublishError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageId;

    fn identity(name: &str, version: &str) -> PackageIdentity {
        PackageIdentity::new(
            PackageId::new("acme", "se", "core", name),
            Version::parse(version).unwrap(),
        )
    }

    #[test]
    fn test_dependency_version_text_form() {
        let version = Version::parse("2.4.1-pre").unwrap();
        assert_eq!(DependencyVersion::compatible(&version).to_string(), "^2.4.1");
        assert_eq!(DependencyVersion::exact(&version).to_string(), "2.4.1");
        assert_eq!("^2.4.1".parse::<DependencyVersion>().unwrap(), DependencyVersion::compatible(&version));
        assert!("^two".parse::<DependencyVersion>().is_err());
    }

    #[test]
    fn test_synthesize_tags_and_dependencies() {
        let base = identity("http", "1.0.0");
        let deps = vec![Arc::new(identity("log", "1.2.3")), Arc::new(identity("io", "0.4.0-pre"))];
        let tags = vec!["cpp".to_string(), "static_library".to_string()];

        let published = synthesize(&base, &tags, &deps);

        assert_eq!(
            published.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["cpp", "se", "static_library"]
        );
        assert_eq!(published.dependencies.len(), 2);
        let log = &published.dependencies["acme:se.core.log"];
        assert_eq!((log.major, log.minor, log.revision, log.range), (1, 2, 3, true));
        assert_eq!(published.dependencies["acme:se.core.io"].to_string(), "^0.4.0");
        // the input identity is left as it was
        assert!(base.tags.is_empty());
    }

    #[tokio::test]
    async fn test_file_writer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("libs").join("http");
        let mut published = identity("http", "1.0.0-pre");
        published.description = "HTTP client".to_string();
        published.license = "MIT".to_string();
        let published = synthesize(&published, &["cpp".to_string()], &[Arc::new(identity("log", "1.2.3"))]);

        let path = FileManifestWriter.write(&location, &published).await.unwrap();
        assert_eq!(path, location.join("package.json"));

        let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], "1.0.0-pre");
        assert_eq!(raw["dependencies"]["acme:se.core.log"], "^1.2.3");
        assert_eq!(raw["id"]["scope"], "core");

        assert_eq!(read_manifest(&path).unwrap(), published);
    }

    #[test]
    fn test_read_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_manifest(&dir.path().join("package.json"));
        assert!(matches!(result, Err(PublishError::Io { .. })));
    }
}
