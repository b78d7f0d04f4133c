// PreserveStore - administrator write path and canonical listing for preserve records
// Sits above a storage backend and enforces authorization and the data-model invariants.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::PreserveId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::id_generator::PreserveIdGenerator;
use crate::infrastructure::storage::PreserveStorage;
use crate::infrastructure::viewer::{ViewerContext, WritePolicy};
use crate::models::{Preserve, PreserveDraft, PreservePatch, PreserveStatus};

/// Listing filter for the store layer. Ordering is left to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreserveFilter {
    pub status: Option<PreserveStatus>,
}

impl PreserveFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            status: Some(PreserveStatus::Published),
        }
    }
}

pub struct PreserveStore {
    storage: Arc<dyn PreserveStorage>,
    policy: Arc<dyn WritePolicy>,
    id_generator: PreserveIdGenerator,
    revision: AtomicU64,
}

impl PreserveStore {
    pub fn new(storage: Arc<dyn PreserveStorage>, policy: Arc<dyn WritePolicy>) -> Self {
        Self {
            storage,
            policy,
            id_generator: PreserveIdGenerator::new(),
            revision: AtomicU64::new(0),
        }
    }

    /// Incremented after every successful write; read-side caches compare against it
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn storage(&self) -> &Arc<dyn PreserveStorage> {
        &self.storage
    }

    /// Evaluate the write policy for `viewer`; denied operations fail with `Forbidden`
    pub fn authorize(&self, viewer: &ViewerContext, operation: &str) -> AppResult<()> {
        if self.policy.can_write(viewer) {
            Ok(())
        } else {
            warn!(
                request_id = %viewer.request_id,
                policy = self.policy.name(),
                "Denied preserve {}",
                operation
            );
            Err(AppError::Forbidden(format!(
                "Not allowed to {} preserves",
                operation
            )))
        }
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    #[instrument(skip(self, draft), fields(request_id = %viewer.request_id))]
    pub async fn create(&self, viewer: &ViewerContext, draft: PreserveDraft) -> AppResult<Preserve> {
        self.authorize(viewer, "create")?;
        let fields = draft.validate()?;

        let preserve = Preserve::from_fields(self.id_generator.next_id(), fields, Utc::now());
        self.storage.insert(&preserve).await?;
        self.bump_revision();

        info!(id = %preserve.id, status = preserve.status.as_str(), "Created preserve");
        Ok(preserve)
    }

    #[instrument(skip(self, patch), fields(request_id = %viewer.request_id))]
    pub async fn update(
        &self,
        viewer: &ViewerContext,
        id: PreserveId,
        patch: PreservePatch,
    ) -> AppResult<Preserve> {
        self.authorize(viewer, "update")?;
        let existing = self.get(id).await?;

        let fields = patch.apply_to(existing.to_draft()).validate()?;
        let updated = Preserve::from_fields(existing.id, fields, Utc::now());

        // Deleted between read and write
        if !self.storage.replace(&updated).await? {
            return Err(not_found(id));
        }
        self.bump_revision();

        info!(id = %id, status = updated.status.as_str(), "Updated preserve");
        Ok(updated)
    }

    #[instrument(skip(self), fields(request_id = %viewer.request_id))]
    pub async fn delete(&self, viewer: &ViewerContext, id: PreserveId) -> AppResult<()> {
        self.authorize(viewer, "delete")?;
        if !self.storage.remove(id).await? {
            return Err(not_found(id));
        }
        self.bump_revision();

        info!(id = %id, "Deleted preserve");
        Ok(())
    }

    pub async fn get(&self, id: PreserveId) -> AppResult<Preserve> {
        self.storage.get(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: PreserveFilter) -> AppResult<Vec<Preserve>> {
        self.storage.list(filter.status).await
    }
}

fn not_found(id: PreserveId) -> AppError {
    AppError::NotFound(format!("Preserve {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorage;
    use crate::infrastructure::viewer::AdministratorsOnly;
    use crate::models::{Amenity, GeoPoint};

    fn store() -> PreserveStore {
        PreserveStore::new(Arc::new(MemoryStorage::new()), Arc::new(AdministratorsOnly))
    }

    fn admin() -> ViewerContext {
        ViewerContext::administrator("req-admin")
    }

    fn expect_validation(result: AppResult<Preserve>, field: &str) {
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors.has_field(field), "expected {} in {:?}", field, errors)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_draft_hidden_until_published() {
        let store = store();
        let created = store
            .create(&admin(), PreserveDraft::new("Ridges").location(44.9, -87.2))
            .await
            .unwrap();
        assert_eq!(created.status, PreserveStatus::Draft);
        assert!(store.list(PreserveFilter::published()).await.unwrap().is_empty());
        assert_eq!(store.list(PreserveFilter::all()).await.unwrap().len(), 1);

        let patch = PreservePatch {
            status: Some(PreserveStatus::Published),
            ..Default::default()
        };
        store.update(&admin(), created.id, patch).await.unwrap();

        let published = store.list(PreserveFilter::published()).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_partial_coordinates_and_unknown_amenities() {
        let store = store();
        let mut draft = PreserveDraft::new("Clay Banks");
        draft.latitude = Some(44.8);
        expect_validation(store.create(&admin(), draft).await, "longitude");

        let draft = PreserveDraft::new("Clay Banks").amenities(["parking", "zipline"]);
        expect_validation(store.create(&admin(), draft).await, "amenities");

        assert!(store.list(PreserveFilter::all()).await.unwrap().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_record() {
        let store = store();
        let created = store
            .create(&admin(), PreserveDraft::new("Ridges").location(44.9, -87.2))
            .await
            .unwrap();

        // Clearing only one coordinate leaves a partial location behind
        let patch = PreservePatch {
            longitude: Some(None),
            ..Default::default()
        };
        expect_validation(store.update(&admin(), created.id, patch).await, "longitude");

        let patch = PreservePatch {
            latitude: Some(None),
            longitude: Some(None),
            amenities: Some(vec!["ADA-accessible".into()]),
            ..Default::default()
        };
        let updated = store.update(&admin(), created.id, patch).await.unwrap();
        assert_eq!(updated.location, None);
        assert!(updated.amenities.contains(&Amenity::AdaAccessible));
        assert_eq!(updated.id, created.id);
        assert!(updated.last_modified >= created.last_modified);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = store();
        let result = store
            .update(&admin(), PreserveId(404), PreservePatch::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let store = store();
        let created = store.create(&admin(), PreserveDraft::new("Ridges")).await.unwrap();

        store.delete(&admin(), created.id).await.unwrap();
        let second = store.delete(&admin(), created.id).await;
        assert!(matches!(second, Err(AppError::NotFound(_))));
        assert!(matches!(store.get(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_authorization_checked_before_validation() {
        let store = store();
        let anonymous = ViewerContext::anonymous("req-anon");

        // An invalid draft from an unauthorized viewer is rejected as forbidden
        let result = store.create(&anonymous, PreserveDraft::new("")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let created = store
            .create(&admin(), PreserveDraft::new("Ridges").location(44.9, -87.2))
            .await
            .unwrap();
        let result = store.delete(&anonymous, created.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(
            store.get(created.id).await.unwrap().location,
            Some(GeoPoint::new(44.9, -87.2))
        );
    }

    #[tokio::test]
    async fn test_revision_advances_on_writes() {
        let store = store();
        let created = store.create(&admin(), PreserveDraft::new("Ridges")).await.unwrap();
        assert_eq!(store.revision(), 1);
        store
            .update(&admin(), created.id, PreservePatch::default())
            .await
            .unwrap();
        assert_eq!(store.revision(), 2);
        store.delete(&admin(), created.id).await.unwrap();
        assert_eq!(store.revision(), 3);
    }
}
