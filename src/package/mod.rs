// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod identity;
pub mod manifest;
mod repository;

pub use identity::{resolve_identity, PackageId, PackageIdentity, PackageMetadata, PackageReference};
pub use manifest::{read_manifest, synthesize, DependencyVersion, FileManifestWriter, PackageWriter};
pub use repository::{Repository, RepositorySet};
