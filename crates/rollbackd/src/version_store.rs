//! Version store accessor.
//!
//! The store is a flat `KEY=VALUE` file (the compose .env file). Each
//! managed service pins its deployable version under a `<SERVICE>_VERSION`
//! key. Every read and write reopens the file; nothing is cached between
//! calls. The file may also be edited by other tooling - last writer wins.

use anyhow::{Context, Result};
use rollback_common::ServiceName;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Accessor for the flat version pin file.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current pinned version for a service.
    ///
    /// Returns `None` when the file is missing, unreadable, or has no
    /// matching key. All of those degrade to "unknown" rather than an
    /// error; the caller can proceed without a previous version.
    pub fn read_version(&self, service: ServiceName) -> Option<String> {
        let prefix = format!("{}=", service.version_key());

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to read version store {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        for line in content.lines() {
            if let Some(value) = line.trim().strip_prefix(&prefix) {
                let version = value.trim().to_string();
                debug!("Found current version for {}: {}", service, version);
                return Some(version);
            }
        }

        None
    }

    /// Pin `version` for a service.
    ///
    /// Replaces the first matching line in place, or appends a new
    /// `KEY=VALUE` line when the key is absent. The rewritten content
    /// replaces the store atomically (temp file + rename), so a crash
    /// mid-write cannot leave a truncated store. Fails if the store file
    /// does not already exist; this never creates one.
    pub fn write_version(&self, service: ServiceName, version: &str) -> Result<()> {
        let key = service.version_key();
        let prefix = format!("{key}=");

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading version store {}", self.path.display()))?;

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        let mut updated = false;
        for line in lines.iter_mut() {
            if line.trim().starts_with(&prefix) {
                *line = format!("{key}={version}");
                updated = true;
                info!("Updated {} to {} in {}", key, version, self.path.display());
                break;
            }
        }
        if !updated {
            warn!("{} not found in {}, appending", key, self.path.display());
            lines.push(format!("{key}={version}"));
        }

        self.replace_contents(lines.join("\n") + "\n")
    }

    fn replace_contents(&self, contents: String) -> Result<()> {
        // Unique temp name: overlapping writers must not stomp each
        // other's staging file before the rename lands.
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        fs::write(&tmp, contents)
            .with_context(|| format!("writing staging file {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e)
                .with_context(|| format!("replacing version store {}", self.path.display()));
        }
        Ok(())
    }
}
