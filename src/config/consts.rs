// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Owner used when a module name is not a package reference
pub const DEFAULT_OWNER: &str = "schroedingerentertainment";
/// Namespace used when a module name is not a package reference
pub const DEFAULT_NAMESPACE: &str = "se";
/// Pre-release tag of the default `1.0.0` version
pub const DEFAULT_PRERELEASE: &str = "pre";
/// Option flag that enables publishing
pub const PUBLISH_FLAG: &str = "publish";
/// File written at each published module's location
pub const MANIFEST_FILE_NAME: &str = "package.json";
/// Fallback when the host cannot report its parallelism
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
