use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Sex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::connection::{validate_segment, YamlConnection};
use crate::domain::models::{
    MemorialCode, MemorialFields, MemorialPatch, MemorialRecord, RecordDate, Scope, Timestamp,
    OWNER_MEMORIAL_COLLECTION,
};
use crate::storage::traits::{MemorialQuery, MemorialStorage};

const DOCUMENT_EXTENSION: &str = "yaml";

/// On-disk form of a memorial. The id is the file name, timestamps are kept
/// in the store's native `{seconds, nanoseconds}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorialDocument {
    pub memorial_code: MemorialCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<RecordDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cremation_date: Option<RecordDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MemorialDocument {
    fn into_record(self, id: String) -> Result<MemorialRecord> {
        let created_at = self
            .created_at
            .to_datetime()
            .context("createdAt is out of range")?;
        let updated_at = self
            .updated_at
            .to_datetime()
            .context("updatedAt is out of range")?;

        Ok(MemorialRecord {
            id,
            name: self.name,
            memorial_code: self.memorial_code,
            tutors: self.tutors,
            animal_type: self.animal_type,
            sex: self.sex,
            breed: self.breed,
            birth_date: self.birth_date,
            cremation_date: self.cremation_date,
            tree: self.tree,
            short_description: self.short_description,
            full_description: self.full_description,
            image_urls: self.image_urls,
            created_at,
            updated_at,
        })
    }
}

impl From<&MemorialRecord> for MemorialDocument {
    fn from(record: &MemorialRecord) -> Self {
        Self {
            memorial_code: record.memorial_code.clone(),
            name: record.name.clone(),
            tutors: record.tutors.clone(),
            animal_type: record.animal_type.clone(),
            sex: record.sex,
            breed: record.breed.clone(),
            birth_date: record.birth_date.clone(),
            cremation_date: record.cremation_date.clone(),
            tree: record.tree.clone(),
            short_description: record.short_description.clone(),
            full_description: record.full_description.clone(),
            image_urls: record.image_urls.clone(),
            created_at: Timestamp::from_datetime(record.created_at),
            updated_at: Timestamp::from_datetime(record.updated_at),
        }
    }
}

/// YAML document store: one `{id}.yaml` file per memorial, one directory per collection
#[derive(Debug, Clone)]
pub struct MemorialRepository {
    connection: YamlConnection,
}

impl MemorialRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self { connection }
    }

    /// Ids are file names; anything else is treated as a missing document
    fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn document_path(&self, scope: &Scope, id: &str) -> Result<PathBuf> {
        Ok(self
            .connection
            .collection_directory(scope)?
            .join(format!("{}.{}", id, DOCUMENT_EXTENSION)))
    }

    /// Load every document of a collection in creation order
    async fn discover_memorials(&self, scope: &Scope) -> Result<Vec<MemorialRecord>> {
        let collection_dir = self.connection.collection_directory(scope)?;

        if !collection_dir.exists() {
            debug!("Collection {} doesn't exist yet, returning empty list", scope);
            return Ok(Vec::new());
        }

        let mut memorials = Vec::new();

        let entries = fs::read_dir(&collection_dir)
            .with_context(|| format!("Failed to read collection {}", collection_dir.display()))?;
        for entry in entries {
            let path = entry?.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }

            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!("Skipping document with invalid name: {:?}", path);
                continue;
            };

            match Self::load_document(&path, id) {
                Ok(memorial) => memorials.push(memorial),
                Err(e) => warn!("Error loading memorial document {:?}: {:#}", path, e),
            }
        }

        memorials.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        debug!("Discovered {} memorials in {}", memorials.len(), scope);
        Ok(memorials)
    }

    fn load_document(path: &Path, id: &str) -> Result<MemorialRecord> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document: MemorialDocument =
            serde_yaml::from_str(&yaml_content).context("Failed to parse memorial document")?;
        document.into_record(id.to_string())
    }

    fn save_document(&self, scope: &Scope, record: &MemorialRecord) -> Result<()> {
        let collection_dir = self.connection.collection_directory(scope)?;
        if !collection_dir.exists() {
            fs::create_dir_all(&collection_dir)
                .with_context(|| format!("Failed to create collection {}", collection_dir.display()))?;
            info!("Created collection directory: {:?}", collection_dir);
        }

        let yaml_path = self.document_path(scope, &record.id)?;
        let yaml_content = serde_yaml::to_string(&MemorialDocument::from(record))
            .context("Failed to serialize memorial document")?;

        // Atomic write using a temp file unique to this write, so concurrent
        // saves of one document never share it and the last rename wins
        let temp_path = collection_dir.join(format!("{}.{}.tmp", record.id, Uuid::new_v4()));
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        if let Err(e) = fs::rename(&temp_path, &yaml_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to replace {}", yaml_path.display()));
        }

        debug!("Saved memorial {} to {}", record.id, scope);
        Ok(())
    }
}

#[async_trait]
impl MemorialStorage for MemorialRepository {
    async fn query_memorials(&self, scope: &Scope, query: &MemorialQuery) -> Result<Vec<MemorialRecord>> {
        let memorials = self.discover_memorials(scope).await?;
        Ok(query.apply(memorials))
    }

    async fn list_owner_scopes(&self) -> Result<Vec<Scope>> {
        let owners_dir = self.connection.owners_directory();
        if !owners_dir.exists() {
            return Ok(Vec::new());
        }

        let mut scopes = Vec::new();
        let entries = fs::read_dir(&owners_dir)
            .with_context(|| format!("Failed to read {}", owners_dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.join(OWNER_MEMORIAL_COLLECTION).is_dir() {
                continue;
            }
            match path.file_name().and_then(|name| name.to_str()) {
                Some(uid) if validate_segment(uid).is_ok() => scopes.push(Scope::owner(uid)),
                _ => warn!("Skipping owner directory with invalid name: {:?}", path),
            }
        }

        scopes.sort_by_key(|scope| scope.to_string());
        Ok(scopes)
    }

    async fn get_memorial(&self, scope: &Scope, id: &str) -> Result<Option<MemorialRecord>> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }
        let yaml_path = self.document_path(scope, id)?;
        if !yaml_path.exists() {
            return Ok(None);
        }
        Self::load_document(&yaml_path, id).map(Some)
    }

    async fn create_memorial(
        &self,
        scope: &Scope,
        fields: &MemorialFields,
        created_at: DateTime<Utc>,
    ) -> Result<MemorialRecord> {
        let record = MemorialRecord::create(Uuid::new_v4().to_string(), fields.clone(), created_at);
        self.save_document(scope, &record)?;
        info!("Stored memorial {} ({}) in {}", record.id, record.memorial_code, scope);
        Ok(record)
    }

    async fn merge_memorial(
        &self,
        scope: &Scope,
        id: &str,
        patch: &MemorialPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<MemorialRecord>> {
        let Some(mut record) = self.get_memorial(scope, id).await? else {
            return Ok(None);
        };
        record.apply_patch(patch, updated_at);
        self.save_document(scope, &record)?;
        Ok(Some(record))
    }

    async fn delete_memorial(&self, scope: &Scope, id: &str) -> Result<bool> {
        if !Self::is_valid_id(id) {
            return Ok(false);
        }
        let yaml_path = self.document_path(scope, id)?;
        if !yaml_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&yaml_path)
            .with_context(|| format!("Failed to delete {}", yaml_path.display()))?;
        info!("Deleted memorial document: {:?}", yaml_path);
        Ok(true)
    }
}
