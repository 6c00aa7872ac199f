mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewRecommendation, Recommendation, RecommendationFilter};

/// Capability interface over recommendation storage.
///
/// Implementations own their synchronization: the counter operations are
/// atomic read-modify-writes, and `list` observes a consistent snapshot.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Stores a new recommendation. The id is assigned by the store and never
    /// reused; the likes counter starts at zero.
    async fn create(&self, candidate: NewRecommendation) -> AppResult<Recommendation>;

    /// Looks up a recommendation by id.
    async fn get(&self, id: i64) -> AppResult<Recommendation>;

    /// Replaces every mutable field of an existing recommendation.
    async fn update(&self, id: i64, candidate: NewRecommendation) -> AppResult<Recommendation>;

    /// Hard-deletes a recommendation. Returns whether a record existed.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Returns matching recommendations in insertion order.
    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>>;

    /// Adds one like to the addressed recommendation.
    async fn like(&self, id: i64) -> AppResult<Recommendation>;

    /// Removes one like, never dropping the counter below zero.
    async fn dislike(&self, id: i64) -> AppResult<Recommendation>;

    /// Sets the addressed recommendation's status to inactive.
    async fn cancel(&self, id: i64) -> AppResult<Recommendation>;
}
