//! Test utilities for the YAML document store
//!
//! RAII-based cleanup: the temporary data directory is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::YamlConnection;
use super::memorial_repository::MemorialRepository;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// Kept alive to prevent cleanup until drop
    _temp_dir: TempDir,
    pub connection: YamlConnection,
    /// Base directory path for inspecting written documents
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = YamlConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn memorial_repository(&self) -> MemorialRepository {
        MemorialRepository::new(self.connection.clone())
    }
}
