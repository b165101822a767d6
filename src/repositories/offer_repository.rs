use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::offer::{Offer, OfferFields};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Newest first. With `active_at`, only offers active at that instant.
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> AppResult<Vec<Offer>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Offer>>;

    async fn active_for_vehicle(&self, vehicle_id: Uuid, now: DateTime<Utc>) -> AppResult<Vec<Offer>>;

    async fn create(&self, fields: OfferFields) -> AppResult<Offer>;

    async fn update(&self, id: Uuid, fields: OfferFields) -> AppResult<Option<Offer>>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgOfferRepository {
    pool: PgPool,
}

impl PgOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferRepository for PgOfferRepository {
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> AppResult<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE $1::timestamptz IS NULL
               OR (is_active = TRUE AND start_date <= $1 AND end_date >= $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(active_at)
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(offer)
    }

    async fn active_for_vehicle(&self, vehicle_id: Uuid, now: DateTime<Utc>) -> AppResult<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE vehicle_id = $1 AND is_active = TRUE AND start_date <= $2 AND end_date >= $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(vehicle_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }

    async fn create(&self, fields: OfferFields) -> AppResult<Offer> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (
                id, title, description, discount_price, discount_percentage,
                start_date, end_date, is_active, vehicle_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.discount_price)
        .bind(fields.discount_percentage)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.is_active)
        .bind(fields.vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(offer)
    }

    async fn update(&self, id: Uuid, fields: OfferFields) -> AppResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                title = $2, description = $3, discount_price = $4, discount_percentage = $5,
                start_date = $6, end_date = $7, is_active = $8, vehicle_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.discount_price)
        .bind(fields.discount_percentage)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.is_active)
        .bind(fields.vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
