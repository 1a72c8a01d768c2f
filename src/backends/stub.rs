// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::command::{Command, OptionStore};
use crate::errors::{PublishError, UnitError};
use crate::family::Family;
use crate::package::{PackageIdentity, PackageWriter};
use crate::traits::ProcessorUnit;

/// A unit that answers every command with a fixed verdict and counts calls
pub struct StubUnit {
    name: String,
    family: Family,
    handles: bool,
    required_flag: Option<String>,
    calls: AtomicUsize,
}

impl StubUnit {
    pub fn new(name: &str, family: Family, handles: bool) -> Self {
        Self {
            name: name.to_string(),
            family,
            handles,
            required_flag: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Only enabled when the command carries `flag`.
    pub fn requiring_flag(mut self, flag: &str) -> Self {
        self.required_flag = Some(flag.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProcessorUnit for StubUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        self.family
    }

    fn target(&self) -> &Path {
        Path::new("stub")
    }

    fn enabled(&self, options: &OptionStore) -> bool {
        self.required_flag
            .as_deref()
            .map_or(true, |flag| options.has_flag(flag))
    }

    fn process(&self, _command: &mut Command) -> Result<bool, UnitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.handles)
    }
}

/// A unit that always fails for testing dispatch error handling
pub struct FailingUnit {
    name: String,
    family: Family,
}

impl FailingUnit {
    pub fn new(name: &str, family: Family) -> Self {
        Self {
            name: name.to_string(),
            family,
        }
    }
}

impl ProcessorUnit for FailingUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        self.family
    }

    fn target(&self) -> &Path {
        Path::new("failing")
    }

    fn enabled(&self, _options: &OptionStore) -> bool {
        true
    }

    fn process(&self, _command: &mut Command) -> Result<bool, UnitError> {
        Err(UnitError::Other("simulated unit failure".to_string()))
    }
}

pub struct PanickingUnit {
    name: String,
    family: Family,
}

impl PanickingUnit {
    pub fn new(name: &str, family: Family) -> Self {
        Self {
            name: name.to_string(),
            family,
        }
    }
}

impl ProcessorUnit for PanickingUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        self.family
    }

    fn target(&self) -> &Path {
        Path::new("panicking")
    }

    fn enabled(&self, _options: &OptionStore) -> bool {
        true
    }

    fn process(&self, _command: &mut Command) -> Result<bool, UnitError> {
        panic!("simulated unit panic");
    }
}

/// In-memory manifest writer that records what would have been written.
///
/// Writes for names in `failing` return an I/O error; names in `panicking`
/// panic inside the publish task.
#[derive(Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<PackageIdentity>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, package_name: &str) -> Self {
        self.failing.insert(package_name.to_string());
        self
    }

    pub fn panicking_for(mut self, package_name: &str) -> Self {
        self.panicking.insert(package_name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn written(&self) -> Vec<PackageIdentity> {
        self.written
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn written_for(&self, package_name: &str) -> Option<PackageIdentity> {
        self.written()
            .into_iter()
            .find(|identity| identity.id.name == package_name)
    }
}

#[async_trait]
impl PackageWriter for RecordingWriter {
    async fn write(&self, location: &Path, identity: &PackageIdentity) -> Result<PathBuf, PublishError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panicking.contains(&identity.id.name) {
            panic!("simulated writer panic for {}", identity.id.name);
        }
        let path = location.join("package.json");
        if self.failing.contains(&identity.id.name) {
            return Err(PublishError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        self.written
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(identity.clone());
        Ok(path)
    }
}
