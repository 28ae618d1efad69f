//! Memorial record store client.
//!
//! Façade over the configured [`MemorialStorage`]: validates and prepares
//! writes, resolves the ownership scope of reads and maps storage failures
//! into [`MemorialError`]. A store that is not configured or not reachable
//! makes reads come back empty; writes fail with `StoreUnavailable` or
//! `WriteFailure`.

use chrono::Utc;
use shared::{CreateMemorialRequest, UpdateMemorialRequest};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::errors::MemorialError;
use crate::domain::image_service::ImageService;
use crate::domain::models::{MemorialCode, MemorialRecord, OwnershipScheme, Scope};
use crate::domain::validation::{validate_create, validate_update};
use crate::storage::{MemorialQuery, MemorialStorage, QueryField, SortDirection};

const STORE_DISABLED: &str = "no memorial store is configured";

/// Service for reading and editing memorial records
#[derive(Clone)]
pub struct MemorialService {
    store: Option<Arc<dyn MemorialStorage>>,
    scheme: OwnershipScheme,
    images: ImageService,
}

impl MemorialService {
    pub fn new(store: Arc<dyn MemorialStorage>, scheme: OwnershipScheme, images: ImageService) -> Self {
        Self {
            store: Some(store),
            scheme,
            images,
        }
    }

    /// A service with no backing store
    pub fn unavailable(scheme: OwnershipScheme, images: ImageService) -> Self {
        Self {
            store: None,
            scheme,
            images,
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn scheme(&self) -> OwnershipScheme {
        self.scheme
    }

    /// Scope that the given user's admin operations address
    pub fn scope_for(&self, uid: &str) -> Scope {
        self.scheme.scope_for(uid)
    }

    fn writable_store(&self) -> Result<&Arc<dyn MemorialStorage>, MemorialError> {
        self.store
            .as_ref()
            .ok_or_else(|| MemorialError::StoreUnavailable(STORE_DISABLED.to_string()))
    }

    /// Unreachable store on a read: logged, then treated as empty
    fn read_failure<T: Default>(operation: &str, e: anyhow::Error) -> T {
        error!("Failed to {}, store unreachable: {:#}", operation, e);
        T::default()
    }

    async fn query(&self, scope: &Scope, query: &MemorialQuery) -> Result<Vec<MemorialRecord>, MemorialError> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        Ok(store
            .query_memorials(scope, query)
            .await
            .unwrap_or_else(|e| Self::read_failure(&format!("list memorials in {}", scope), e)))
    }

    /// Scopes that public reads cover under the configured scheme
    async fn public_scopes(&self) -> Result<Vec<Scope>, MemorialError> {
        match (self.scheme, &self.store) {
            (_, None) => Ok(Vec::new()),
            (OwnershipScheme::Flat, Some(_)) => Ok(vec![Scope::Global]),
            (OwnershipScheme::PerOwner, Some(store)) => Ok(store
                .list_owner_scopes()
                .await
                .unwrap_or_else(|e| Self::read_failure("list memorial owners", e))),
        }
    }

    /// Every record under the scope
    pub async fn list(&self, scope: &Scope) -> Result<Vec<MemorialRecord>, MemorialError> {
        let records = self.query(scope, &MemorialQuery::all()).await?;
        info!("Found {} memorials in {}", records.len(), scope);
        Ok(records)
    }

    /// Every record visible on the public site
    pub async fn list_public(&self) -> Result<Vec<MemorialRecord>, MemorialError> {
        let mut records = Vec::new();
        for scope in self.public_scopes().await? {
            records.extend(self.query(&scope, &MemorialQuery::all()).await?);
        }
        info!("Found {} public memorials", records.len());
        Ok(records)
    }

    /// Records in scope ordered by code, descending, as the store orders strings
    pub async fn list_for_dashboard(&self, scope: &Scope) -> Result<Vec<MemorialRecord>, MemorialError> {
        let query = MemorialQuery::all().order_by(QueryField::MemorialCode, SortDirection::Descending);
        self.query(scope, &query).await
    }

    /// Public lookup by memorial code; `"7"` and `"#7"` are the same code
    pub async fn get_by_code(&self, raw_code: &str) -> Result<Option<MemorialRecord>, MemorialError> {
        let code = MemorialCode::normalize(raw_code);
        if code.body().is_empty() {
            return Ok(None);
        }

        let query = MemorialQuery::by_code(code.clone()).limit(1);
        for scope in self.public_scopes().await? {
            if let Some(record) = self.query(&scope, &query).await?.into_iter().next() {
                info!("Found memorial {} for code {}", record.id, code);
                return Ok(Some(record));
            }
        }

        info!("No memorial found for code {}", code);
        Ok(None)
    }

    pub async fn get_by_id(&self, scope: &Scope, id: &str) -> Result<Option<MemorialRecord>, MemorialError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let record = store
            .get_memorial(scope, id)
            .await
            .unwrap_or_else(|e| Self::read_failure(&format!("load memorial {}", id), e));

        if record.is_none() {
            warn!("Memorial not found: {} in {}", id, scope);
        }
        Ok(record)
    }

    /// Validate, prepare images and store a new memorial. Returns the new id.
    pub async fn create(&self, scope: &Scope, request: CreateMemorialRequest) -> Result<String, MemorialError> {
        let store = self.writable_store()?;
        info!("Creating memorial {} in {}", request.memorial_code.trim(), scope);

        let mut fields = validate_create(request, &self.images).map_err(MemorialError::Validation)?;

        let now = Utc::now();
        fields.image_urls = self
            .images
            .with_placeholder(std::mem::take(&mut fields.image_urls), now.timestamp_millis());

        match self.get_by_code(fields.memorial_code.as_str()).await {
            Ok(Some(existing)) => warn!(
                "Memorial code {} is already used by {}",
                fields.memorial_code, existing.id
            ),
            Ok(None) => {}
            Err(e) => warn!("Could not check memorial code uniqueness: {}", e),
        }

        let record = store
            .create_memorial(scope, &fields, now)
            .await
            .map_err(MemorialError::WriteFailure)?;

        info!("Created memorial {} with ID: {}", record.memorial_code, record.id);
        Ok(record.id)
    }

    /// Merge an update into an existing memorial
    pub async fn update(
        &self,
        scope: &Scope,
        id: &str,
        request: UpdateMemorialRequest,
    ) -> Result<MemorialRecord, MemorialError> {
        let store = self.writable_store()?;
        info!("Updating memorial: {} in {}", id, scope);

        let patch = validate_update(request, &self.images).map_err(MemorialError::Validation)?;

        let record = store
            .merge_memorial(scope, id, &patch, Utc::now())
            .await
            .map_err(MemorialError::WriteFailure)?
            .ok_or_else(|| MemorialError::NotFound(id.to_string()))?;

        info!("Updated memorial {} with ID: {}", record.memorial_code, record.id);
        Ok(record)
    }

    /// Permanently delete a memorial
    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), MemorialError> {
        let store = self.writable_store()?;
        info!("Deleting memorial: {} in {}", id, scope);

        let deleted = store
            .delete_memorial(scope, id)
            .await
            .map_err(MemorialError::WriteFailure)?;

        if !deleted {
            warn!("Memorial not found for deletion: {} in {}", id, scope);
            return Err(MemorialError::NotFound(id.to_string()));
        }

        info!("Deleted memorial: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryMemorialStore, MemorialRepository, YamlConnection};
    use shared::{ImageInput, Sex};

    fn service(scheme: OwnershipScheme) -> MemorialService {
        MemorialService::new(
            Arc::new(InMemoryMemorialStore::new()),
            scheme,
            ImageService::default(),
        )
    }

    fn request(code: &str, name: &str) -> CreateMemorialRequest {
        CreateMemorialRequest {
            memorial_code: code.to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_get_preserves_fields() {
        let service = service(OwnershipScheme::Flat);
        let create = CreateMemorialRequest {
            memorial_code: "10".to_string(),
            name: Some("Rex".to_string()),
            tutors: Some("Ana".to_string()),
            animal_type: Some("Cão".to_string()),
            sex: Some(Sex::Macho),
            breed: Some("Labrador".to_string()),
            birth_date: Some("2012-03-20".to_string()),
            cremation_date: Some("2024-01-05".to_string()),
            tree: Some("Ipê amarelo".to_string()),
            short_description: Some("Um bom garoto".to_string()),
            full_description: Some("Muito amado.".to_string()),
            images: vec![
                ImageInput::Url {
                    value: "https://img/1.jpg".to_string(),
                },
                ImageInput::Url {
                    value: "https://img/2.jpg".to_string(),
                },
            ],
        };

        let id = service.create(&Scope::Global, create).await.unwrap();
        let record = service.get_by_id(&Scope::Global, &id).await.unwrap().unwrap();

        assert_eq!(record.memorial_code.as_str(), "#10");
        assert_eq!(record.name.as_deref(), Some("Rex"));
        assert_eq!(record.tutors.as_deref(), Some("Ana"));
        assert_eq!(record.sex, Some(Sex::Macho));
        assert_eq!(record.tree.as_deref(), Some("Ipê amarelo"));
        assert_eq!(record.image_urls, vec!["https://img/1.jpg", "https://img/2.jpg"]);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn test_create_without_images_gets_placeholder() {
        let service = service(OwnershipScheme::Flat);
        let id = service.create(&Scope::Global, request("1", "Mia")).await.unwrap();
        let record = service.get_by_id(&Scope::Global, &id).await.unwrap().unwrap();
        assert_eq!(record.image_urls.len(), 1);
        assert!(record.image_urls[0].starts_with("https://picsum.photos/seed/"));
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_store() {
        let service = service(OwnershipScheme::Flat);
        let err = service
            .create(&Scope::Global, request("", "Rex"))
            .await
            .unwrap_err();
        assert!(matches!(err, MemorialError::Validation(_)));
        assert!(service.list(&Scope::Global).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_code_normalizes_prefix() {
        let service = service(OwnershipScheme::Flat);
        let id = service.create(&Scope::Global, request("#7", "Bidu")).await.unwrap();

        let bare = service.get_by_code("7").await.unwrap().unwrap();
        let prefixed = service.get_by_code("#7").await.unwrap().unwrap();
        assert_eq!(bare.id, id);
        assert_eq!(prefixed.id, id);
        assert!(service.get_by_code("8").await.unwrap().is_none());
        assert!(service.get_by_code("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_code_returns_first_of_duplicates() {
        let service = service(OwnershipScheme::Flat);
        let first = service.create(&Scope::Global, request("5", "Primeiro")).await.unwrap();
        service.create(&Scope::Global, request("5", "Segundo")).await.unwrap();

        let found = service.get_by_code("5").await.unwrap().unwrap();
        assert_eq!(found.id, first);
    }

    #[tokio::test]
    async fn test_update_merges_and_restamps() {
        let service = service(OwnershipScheme::Flat);
        let id = service.create(&Scope::Global, request("3", "Tom")).await.unwrap();
        let before = service.get_by_id(&Scope::Global, &id).await.unwrap().unwrap();

        let updated = service
            .update(
                &Scope::Global,
                &id,
                UpdateMemorialRequest {
                    breed: Some("Siamês".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.breed.as_deref(), Some("Siamês"));
        assert_eq!(updated.name.as_deref(), Some("Tom"));
        assert_eq!(updated.image_urls, before.image_urls);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let service = service(OwnershipScheme::Flat);
        let err = service
            .update(&Scope::Global, "missing", UpdateMemorialRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_not_found_and_list_unchanged() {
        let service = service(OwnershipScheme::Flat);
        service.create(&Scope::Global, request("1", "Rex")).await.unwrap();

        let err = service.delete(&Scope::Global, "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(service.list(&Scope::Global).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let service = service(OwnershipScheme::Flat);
        let id = service.create(&Scope::Global, request("1", "Rex")).await.unwrap();
        service.delete(&Scope::Global, &id).await.unwrap();
        assert!(service.get_by_id(&Scope::Global, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_per_owner_scopes_are_isolated_but_public() {
        let service = service(OwnershipScheme::PerOwner);
        let owner_a = service.scope_for("a");
        let owner_b = service.scope_for("b");

        let id = service.create(&owner_a, request("42", "Luna")).await.unwrap();
        service.create(&owner_b, request("43", "Sol")).await.unwrap();

        let b_list = service.list_for_dashboard(&owner_b).await.unwrap();
        assert_eq!(b_list.len(), 1);
        assert!(b_list.iter().all(|r| r.id != id));

        assert_eq!(service.get_by_code("42").await.unwrap().unwrap().id, id);
        assert_eq!(service.list_public().await.unwrap().len(), 2);
        assert!(service.get_by_id(&owner_b, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_orders_codes_as_strings_descending() {
        let service = service(OwnershipScheme::Flat);
        for code in ["2", "10", "9"] {
            service.create(&Scope::Global, request(code, "Pet")).await.unwrap();
        }
        let codes: Vec<String> = service
            .list_for_dashboard(&Scope::Global)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.memorial_code.to_string())
            .collect();
        assert_eq!(codes, vec!["#9", "#2", "#10"]);
    }

    #[tokio::test]
    async fn test_unreachable_store_reads_are_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let connection = YamlConnection::new(temp_dir.path()).unwrap();
        // The collection path exists but is not a directory
        std::fs::write(temp_dir.path().join("pet_profiles"), "not a directory").unwrap();
        let service = MemorialService::new(
            Arc::new(MemorialRepository::new(connection)),
            OwnershipScheme::Flat,
            ImageService::default(),
        );

        assert!(service.list(&Scope::Global).await.unwrap().is_empty());
        assert!(service.list_public().await.unwrap().is_empty());
        assert!(service.list_for_dashboard(&Scope::Global).await.unwrap().is_empty());
        assert!(service.get_by_code("1").await.unwrap().is_none());
        assert!(service.get_by_id(&Scope::Global, "x").await.unwrap().is_none());

        let err = service.create(&Scope::Global, request("1", "Rex")).await.unwrap_err();
        assert!(matches!(err, MemorialError::WriteFailure(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let service = MemorialService::unavailable(OwnershipScheme::Flat, ImageService::default());
        assert!(!service.is_available());
        assert!(service.list(&Scope::Global).await.unwrap().is_empty());
        assert!(service.list_public().await.unwrap().is_empty());
        assert!(service.get_by_code("1").await.unwrap().is_none());
        assert!(service.get_by_id(&Scope::Global, "x").await.unwrap().is_none());

        let err = service.create(&Scope::Global, request("1", "Rex")).await.unwrap_err();
        assert!(matches!(err, MemorialError::StoreUnavailable(_)));
        let err = service.delete(&Scope::Global, "x").await.unwrap_err();
        assert!(matches!(err, MemorialError::StoreUnavailable(_)));
    }
}
