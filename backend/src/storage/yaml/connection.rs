use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::models::{Scope, OWNER_ROOT_COLLECTION};

/// Directory name used under the platform data directory
pub const DEFAULT_DATA_DIR_NAME: &str = "pet-memorial";

/// YamlConnection maps collection paths onto directories under a base directory
#[derive(Debug, Clone)]
pub struct YamlConnection {
    base_directory: PathBuf,
}

impl YamlConnection {
    /// Create a new connection, creating the base directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the platform data directory
    pub fn new_default() -> Result<Self> {
        Self::new(default_data_directory()?)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory holding the documents of one collection
    pub fn collection_directory(&self, scope: &Scope) -> Result<PathBuf> {
        let mut path = self.base_directory.clone();
        for segment in scope.collection_path() {
            validate_segment(segment)?;
            path.push(segment);
        }
        Ok(path)
    }

    /// Directory whose children are the per-owner document trees
    pub fn owners_directory(&self) -> PathBuf {
        self.base_directory.join(OWNER_ROOT_COLLECTION)
    }
}

/// Platform data directory joined with the service's directory name
pub fn default_data_directory() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine the platform data directory")?;
    Ok(data_dir.join(DEFAULT_DATA_DIR_NAME))
}

/// A path segment must name exactly one directory entry
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        bail!("Invalid collection path segment: {:?}", segment);
    }
    if segment.contains(['/', '\\']) || segment.chars().any(char::is_control) {
        bail!("Invalid collection path segment: {:?}", segment);
    }
    Ok(())
}
