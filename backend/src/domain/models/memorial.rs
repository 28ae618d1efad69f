//! backend/src/domain/models/memorial.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Sex;
use std::fmt;
use std::str::FromStr;

/// Flat collection holding every memorial when ownership is global
pub const GLOBAL_COLLECTION: &str = "pet_profiles";
/// Root collection of per-owner documents
pub const OWNER_ROOT_COLLECTION: &str = "users";
/// Sub-collection under each owner holding that owner's memorials
pub const OWNER_MEMORIAL_COLLECTION: &str = "pet_memorial_profiles";

/// Ownership boundary under which a memorial is stored and queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Owner(String),
}

impl Scope {
    pub fn owner(uid: impl Into<String>) -> Self {
        Scope::Owner(uid.into())
    }

    /// Path segments of the collection backing this scope
    pub fn collection_path(&self) -> Vec<&str> {
        match self {
            Scope::Global => vec![GLOBAL_COLLECTION],
            Scope::Owner(uid) => vec![OWNER_ROOT_COLLECTION, uid.as_str(), OWNER_MEMORIAL_COLLECTION],
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.collection_path().join("/"))
    }
}

/// Deployment-wide choice of where memorials live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipScheme {
    /// Every memorial in the single global collection
    Flat,
    /// Each admin user owns a sub-collection
    PerOwner,
}

impl OwnershipScheme {
    /// Scope that writes by the given user land in
    pub fn scope_for(&self, uid: &str) -> Scope {
        match self {
            OwnershipScheme::Flat => Scope::Global,
            OwnershipScheme::PerOwner => Scope::owner(uid),
        }
    }
}

impl FromStr for OwnershipScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" | "global" => Ok(OwnershipScheme::Flat),
            "per_owner" | "per-owner" | "owner" => Ok(OwnershipScheme::PerOwner),
            other => Err(anyhow::anyhow!("Unknown ownership scheme: {}", other)),
        }
    }
}

/// Public protocol code of a memorial. Always `#`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MemorialCode(String);

impl MemorialCode {
    /// Normalize a user-supplied code: trim and prepend `#` when missing
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            MemorialCode(trimmed.to_string())
        } else {
            MemorialCode(format!("#{}", trimmed))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The code without its `#` prefix
    pub fn body(&self) -> &str {
        &self.0[1..]
    }

    /// Integer value used for protocol ordering.
    ///
    /// Reads an optional sign and the leading digits after `#`, ignoring any
    /// trailing text (`#12b` is 12). `None` when no digits lead the code.
    pub fn number(&self) -> Option<i64> {
        let body = self.body().trim_start();
        let (negative, rest) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body.strip_prefix('+').unwrap_or(body)),
        };
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let value = digits.parse::<i64>().unwrap_or(i64::MAX);
        Some(if negative { -value } else { value })
    }
}

impl From<String> for MemorialCode {
    fn from(raw: String) -> Self {
        MemorialCode::normalize(&raw)
    }
}

impl From<MemorialCode> for String {
    fn from(code: MemorialCode) -> Self {
        code.0
    }
}

impl fmt::Display for MemorialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-native timestamp as stored by the document database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanoseconds: value.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds)
    }
}

/// A memorial date in either of its stored representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordDate {
    /// ISO calendar string, normally `YYYY-MM-DD`
    Calendar(String),
    Instant(Timestamp),
}

impl RecordDate {
    pub fn calendar(value: impl Into<String>) -> Self {
        RecordDate::Calendar(value.into())
    }

    pub fn instant(value: DateTime<Utc>) -> Self {
        RecordDate::Instant(Timestamp::from_datetime(value))
    }
}

/// Domain model of a single memorial entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorialRecord {
    pub id: String,
    pub name: Option<String>,
    pub memorial_code: MemorialCode,
    pub tutors: Option<String>,
    pub animal_type: Option<String>,
    pub sex: Option<Sex>,
    pub breed: Option<String>,
    pub birth_date: Option<RecordDate>,
    pub cremation_date: Option<RecordDate>,
    pub tree: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-editable content of a memorial, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorialFields {
    pub memorial_code: MemorialCode,
    pub name: Option<String>,
    pub tutors: Option<String>,
    pub animal_type: Option<String>,
    pub sex: Option<Sex>,
    pub breed: Option<String>,
    pub birth_date: Option<RecordDate>,
    pub cremation_date: Option<RecordDate>,
    pub tree: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub image_urls: Vec<String>,
}

impl MemorialFields {
    pub fn new(memorial_code: MemorialCode) -> Self {
        Self {
            memorial_code,
            name: None,
            tutors: None,
            animal_type: None,
            sex: None,
            breed: None,
            birth_date: None,
            cremation_date: None,
            tree: None,
            short_description: None,
            full_description: None,
            image_urls: Vec::new(),
        }
    }
}

/// Merge-style change set. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemorialPatch {
    pub memorial_code: Option<MemorialCode>,
    pub name: Option<Option<String>>,
    pub tutors: Option<Option<String>>,
    pub animal_type: Option<Option<String>>,
    pub sex: Option<Sex>,
    pub breed: Option<Option<String>>,
    pub birth_date: Option<Option<RecordDate>>,
    pub cremation_date: Option<Option<RecordDate>>,
    pub tree: Option<Option<String>>,
    pub short_description: Option<Option<String>>,
    pub full_description: Option<Option<String>>,
    pub image_urls: Option<Vec<String>>,
}

impl MemorialPatch {
    pub fn is_empty(&self) -> bool {
        *self == MemorialPatch::default()
    }
}

fn merge<T: Clone>(target: &mut T, change: &Option<T>) {
    if let Some(value) = change {
        *target = value.clone();
    }
}

impl MemorialRecord {
    /// Build a freshly created record; both timestamps are `now`
    pub fn create(id: String, fields: MemorialFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            memorial_code: fields.memorial_code,
            tutors: fields.tutors,
            animal_type: fields.animal_type,
            sex: fields.sex,
            breed: fields.breed,
            birth_date: fields.birth_date,
            cremation_date: fields.cremation_date,
            tree: fields.tree,
            short_description: fields.short_description,
            full_description: fields.full_description,
            image_urls: fields.image_urls,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a merge-style change set and restamp `updated_at`
    pub fn apply_patch(&mut self, patch: &MemorialPatch, updated_at: DateTime<Utc>) {
        merge(&mut self.memorial_code, &patch.memorial_code);
        merge(&mut self.name, &patch.name);
        merge(&mut self.tutors, &patch.tutors);
        merge(&mut self.animal_type, &patch.animal_type);
        if patch.sex.is_some() {
            self.sex = patch.sex;
        }
        merge(&mut self.breed, &patch.breed);
        merge(&mut self.birth_date, &patch.birth_date);
        merge(&mut self.cremation_date, &patch.cremation_date);
        merge(&mut self.tree, &patch.tree);
        merge(&mut self.short_description, &patch.short_description);
        merge(&mut self.full_description, &patch.full_description);
        merge(&mut self.image_urls, &patch.image_urls);
        self.updated_at = updated_at;
    }

    /// The user-supplied part of the record
    pub fn fields(&self) -> MemorialFields {
        MemorialFields {
            memorial_code: self.memorial_code.clone(),
            name: self.name.clone(),
            tutors: self.tutors.clone(),
            animal_type: self.animal_type.clone(),
            sex: self.sex,
            breed: self.breed.clone(),
            birth_date: self.birth_date.clone(),
            cremation_date: self.cremation_date.clone(),
            tree: self.tree.clone(),
            short_description: self.short_description.clone(),
            full_description: self.full_description.clone(),
            image_urls: self.image_urls.clone(),
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }

    /// Name if present and not blank
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}
