use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{NewRecommendation, Recommendation, RecommendationFilter};

use super::RecommendationStore;

/// In-memory recommendation store.
///
/// Ids come from a monotonic counter, so iterating the map in key order walks
/// records in insertion order. Deleted ids are never handed out again.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    next_id: i64,
    records: BTreeMap<i64, Recommendation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn create(&self, candidate: NewRecommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let record = Recommendation {
            id,
            name: candidate.name,
            base_product_id: candidate.base_product_id,
            recommended_product_id: candidate.recommended_product_id,
            recommendation_type: candidate.recommendation_type,
            status: candidate.status,
            likes: 0,
            rationale: candidate.rationale,
            weighted_score: candidate.weighted_score,
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> AppResult<Recommendation> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn update(&self, id: i64, candidate: NewRecommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::recommendation_not_found(id))?;

        record.name = candidate.name;
        record.base_product_id = candidate.base_product_id;
        record.recommended_product_id = candidate.recommended_product_id;
        record.recommendation_type = candidate.recommendation_type;
        record.status = candidate.status;
        record.likes = candidate.likes;
        record.rationale = candidate.rationale;
        record.weighted_score = candidate.weighted_score;
        record.updated_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.remove(&id).is_some())
    }

    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|rec| filter.matches(rec))
            .cloned()
            .collect())
    }

    async fn like(&self, id: i64) -> AppResult<Recommendation> {
        self.modify(id, Recommendation::increment_likes).await
    }

    async fn dislike(&self, id: i64) -> AppResult<Recommendation> {
        self.modify(id, Recommendation::decrement_likes).await
    }

    async fn cancel(&self, id: i64) -> AppResult<Recommendation> {
        self.modify(id, Recommendation::cancel).await
    }
}

impl MemoryStore {
    /// Read-modify-write under the write lock, so concurrent counter updates
    /// never lose increments.
    async fn modify(
        &self,
        id: i64,
        apply: impl FnOnce(&mut Recommendation),
    ) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::recommendation_not_found(id))?;
        apply(record);
        record.updated_at = Some(Utc::now());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecommendationStatus, RecommendationType};

    fn candidate(base: i64, rtype: RecommendationType, status: RecommendationStatus) -> NewRecommendation {
        NewRecommendation {
            name: None,
            base_product_id: base,
            recommended_product_id: base + 100,
            recommendation_type: rtype,
            status,
            likes: 0,
            rationale: None,
            weighted_score: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_zeroes_likes() {
        let store = MemoryStore::new();
        let mut with_likes = candidate(
            101,
            RecommendationType::Accessory,
            RecommendationStatus::Draft,
        );
        with_likes.likes = 9;

        let first = store.create(with_likes).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.likes, 0);
        assert!(first.created_at.is_some());

        let second = store
            .create(candidate(
                345,
                RecommendationType::UpSell,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = MemoryStore::new();
        let first = store
            .create(candidate(
                101,
                RecommendationType::Accessory,
                RecommendationStatus::Draft,
            ))
            .await
            .unwrap();
        assert!(store.delete(first.id).await.unwrap());

        let next = store
            .create(candidate(
                345,
                RecommendationType::UpSell,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();
        assert!(next.id > first.id);
    }

    #[tokio::test]
    async fn get_after_delete_is_not_found() {
        let store = MemoryStore::new();
        let rec = store
            .create(candidate(
                101,
                RecommendationType::Trending,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();
        assert!(store.delete(rec.id).await.unwrap());
        let err = store.get(rec.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_record_reports_absent() {
        let store = MemoryStore::new();
        assert!(!store.delete(42).await.unwrap());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_under_filter() {
        let store = MemoryStore::new();
        for base in [101, 345, 101, 101] {
            store
                .create(candidate(
                    base,
                    RecommendationType::Accessory,
                    RecommendationStatus::Draft,
                ))
                .await
                .unwrap();
        }

        let filter = RecommendationFilter {
            base_product_id: Some(101),
            ..Default::default()
        };
        let found = store.list(&filter).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn like_and_dislike_round_trip() {
        let store = MemoryStore::new();
        let rec = store
            .create(candidate(
                101,
                RecommendationType::CrossSell,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();

        let liked = store.like(rec.id).await.unwrap();
        assert_eq!(liked.likes, 1);
        let disliked = store.dislike(rec.id).await.unwrap();
        assert_eq!(disliked.likes, 0);
    }

    #[tokio::test]
    async fn dislike_at_zero_stays_at_zero() {
        let store = MemoryStore::new();
        let rec = store
            .create(candidate(
                101,
                RecommendationType::CrossSell,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();
        let disliked = store.dislike(rec.id).await.unwrap();
        assert_eq!(disliked.likes, 0);
    }

    #[tokio::test]
    async fn update_replaces_all_mutable_fields() {
        let store = MemoryStore::new();
        let rec = store
            .create(candidate(
                101,
                RecommendationType::Accessory,
                RecommendationStatus::Draft,
            ))
            .await
            .unwrap();

        let mut replacement = candidate(
            500,
            RecommendationType::Trending,
            RecommendationStatus::Active,
        );
        replacement.name = Some("Bundle".to_string());
        replacement.likes = 4;

        let updated = store.update(rec.id, replacement).await.unwrap();
        assert_eq!(updated.id, rec.id);
        assert_eq!(updated.base_product_id, 500);
        assert_eq!(updated.status, RecommendationStatus::Active);
        assert_eq!(updated.likes, 4);
        assert_eq!(updated.name.as_deref(), Some("Bundle"));
        assert_eq!(updated.created_at, rec.created_at);
    }

    #[tokio::test]
    async fn cancel_marks_record_inactive() {
        let store = MemoryStore::new();
        let rec = store
            .create(candidate(
                101,
                RecommendationType::UpSell,
                RecommendationStatus::Active,
            ))
            .await
            .unwrap();
        let cancelled = store.cancel(rec.id).await.unwrap();
        assert_eq!(cancelled.status, RecommendationStatus::Inactive);
    }
}
