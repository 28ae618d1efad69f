//! In-memory document store.
//!
//! Keeps each collection as a vector in insertion order. Used by tests and by
//! ephemeral deployments (`STORE_KIND=memory`); nothing survives a restart.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::traits::{MemorialQuery, MemorialStorage};
use crate::domain::models::{MemorialFields, MemorialPatch, MemorialRecord, Scope};

#[derive(Clone, Default)]
pub struct InMemoryMemorialStore {
    collections: Arc<RwLock<HashMap<Scope, Vec<MemorialRecord>>>>,
}

impl InMemoryMemorialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemorialStorage for InMemoryMemorialStore {
    async fn query_memorials(&self, scope: &Scope, query: &MemorialQuery) -> Result<Vec<MemorialRecord>> {
        let collections = self.collections.read().await;
        let records = collections.get(scope).cloned().unwrap_or_default();
        Ok(query.apply(records))
    }

    async fn list_owner_scopes(&self) -> Result<Vec<Scope>> {
        let collections = self.collections.read().await;
        let mut scopes: Vec<Scope> = collections
            .iter()
            .filter(|(scope, records)| matches!(scope, Scope::Owner(_)) && !records.is_empty())
            .map(|(scope, _)| scope.clone())
            .collect();
        scopes.sort_by_key(|scope| scope.to_string());
        Ok(scopes)
    }

    async fn get_memorial(&self, scope: &Scope, id: &str) -> Result<Option<MemorialRecord>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(scope)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn create_memorial(
        &self,
        scope: &Scope,
        fields: &MemorialFields,
        created_at: DateTime<Utc>,
    ) -> Result<MemorialRecord> {
        let record = MemorialRecord::create(Uuid::new_v4().to_string(), fields.clone(), created_at);
        let mut collections = self.collections.write().await;
        collections.entry(scope.clone()).or_default().push(record.clone());
        debug!("Stored memorial {} in {}", record.id, scope);
        Ok(record)
    }

    async fn merge_memorial(
        &self,
        scope: &Scope,
        id: &str,
        patch: &MemorialPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<MemorialRecord>> {
        let mut collections = self.collections.write().await;
        let Some(record) = collections
            .get_mut(scope)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
        else {
            return Ok(None);
        };
        record.apply_patch(patch, updated_at);
        Ok(Some(record.clone()))
    }

    async fn delete_memorial(&self, scope: &Scope, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(scope) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}
