use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{NewRecommendation, Recommendation, RecommendationFilter};

use super::RecommendationStore;

/// PostgreSQL-backed recommendation store.
///
/// Counter updates run as single statements so the row-level atomicity comes
/// from the database rather than application-side locking.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects a pool and applies pending migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecommendationStore for PgStore {
    async fn create(&self, candidate: NewRecommendation) -> AppResult<Recommendation> {
        let record = sqlx::query_as::<_, Recommendation>(
            r#"
            INSERT INTO recommendations
                (name, base_product_id, recommended_product_id,
                 recommendation_type, status, rationale, weighted_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(candidate.name)
        .bind(candidate.base_product_id)
        .bind(candidate.recommended_product_id)
        .bind(candidate.recommendation_type)
        .bind(candidate.status)
        .bind(candidate.rationale)
        .bind(candidate.weighted_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn get(&self, id: i64) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>("SELECT * FROM recommendations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn update(&self, id: i64, candidate: NewRecommendation) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET name = $2,
                base_product_id = $3,
                recommended_product_id = $4,
                recommendation_type = $5,
                status = $6,
                likes = $7,
                rationale = $8,
                weighted_score = $9,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(candidate.name)
        .bind(candidate.base_product_id)
        .bind(candidate.recommended_product_id)
        .bind(candidate.recommendation_type)
        .bind(candidate.status)
        .bind(candidate.likes)
        .bind(candidate.rationale)
        .bind(candidate.weighted_score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let records = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT * FROM recommendations
            WHERE ($1::bigint IS NULL OR base_product_id = $1)
              AND ($2::recommendation_type IS NULL OR recommendation_type = $2)
              AND ($3::recommendation_status IS NULL OR status = $3)
            ORDER BY id
            "#,
        )
        .bind(filter.base_product_id)
        .bind(filter.recommendation_type)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn like(&self, id: i64) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET likes = likes + 1, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn dislike(&self, id: i64) -> AppResult<Recommendation> {
        // GREATEST keeps the counter clamped at zero
        sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET likes = GREATEST(likes - 1, 0), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn cancel(&self, id: i64) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET status = 'inactive', updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
    }
}
