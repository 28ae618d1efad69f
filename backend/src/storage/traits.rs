//! # Storage Traits
//!
//! The document store collaborator behind the memorial service. Every call is
//! addressed to a [`Scope`], the collection path a memorial lives under, so
//! the same store serves both the flat and the per-owner layout.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::domain::models::{MemorialCode, MemorialFields, MemorialPatch, MemorialRecord, Scope};

/// Fields the store can order by on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    MemorialCode,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Equality filters plus a single-field ordering, the subset of queries a
/// document store answers natively
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemorialQuery {
    pub memorial_code: Option<MemorialCode>,
    pub animal_type: Option<String>,
    pub order_by: Option<(QueryField, SortDirection)>,
    pub limit: Option<usize>,
}

impl MemorialQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_code(code: MemorialCode) -> Self {
        Self {
            memorial_code: Some(code),
            ..Self::default()
        }
    }

    pub fn order_by(mut self, field: QueryField, direction: SortDirection) -> Self {
        self.order_by = Some((field, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &MemorialRecord) -> bool {
        if let Some(code) = &self.memorial_code {
            if &record.memorial_code != code {
                return false;
            }
        }
        if let Some(animal_type) = &self.animal_type {
            if record.animal_type.as_deref() != Some(animal_type.as_str()) {
                return false;
            }
        }
        true
    }

    /// Filter, order and truncate records already in storage order
    pub fn apply(&self, records: Vec<MemorialRecord>) -> Vec<MemorialRecord> {
        let mut matched: Vec<MemorialRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some((field, direction)) = self.order_by {
            matched.sort_by(|a, b| {
                let ordering = compare_field(field, a, b);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn compare_field(field: QueryField, a: &MemorialRecord, b: &MemorialRecord) -> Ordering {
    match field {
        // Plain string order, the way the document store indexes it
        QueryField::MemorialCode => a.memorial_code.as_str().cmp(b.memorial_code.as_str()),
        QueryField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Trait defining the interface for memorial document storage
///
/// Implementations return records of a collection in creation order
/// (`created_at`, then id) unless the query asks for another ordering.
#[async_trait]
pub trait MemorialStorage: Send + Sync {
    /// Query one collection
    async fn query_memorials(&self, scope: &Scope, query: &MemorialQuery) -> Result<Vec<MemorialRecord>>;

    /// Every owner scope that currently holds a memorial collection
    async fn list_owner_scopes(&self) -> Result<Vec<Scope>>;

    /// Retrieve a specific memorial by id
    async fn get_memorial(&self, scope: &Scope, id: &str) -> Result<Option<MemorialRecord>>;

    /// Store a new memorial; the store assigns the id
    async fn create_memorial(
        &self,
        scope: &Scope,
        fields: &MemorialFields,
        created_at: DateTime<Utc>,
    ) -> Result<MemorialRecord>;

    /// Merge a patch into an existing memorial
    /// Returns the updated record, or None if the id does not exist in the scope
    async fn merge_memorial(
        &self,
        scope: &Scope,
        id: &str,
        patch: &MemorialPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<MemorialRecord>>;

    /// Delete a memorial permanently
    /// Returns true if the memorial was found and deleted, false otherwise
    async fn delete_memorial(&self, scope: &Scope, id: &str) -> Result<bool>;
}
