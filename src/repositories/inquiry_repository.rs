use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::inquiry::{Inquiry, InquiryStats, InquiryStatus, NewInquiry};
use crate::models::pagination::Pagination;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn create(&self, inquiry: NewInquiry) -> AppResult<Inquiry>;

    /// Newest first, optionally restricted to one status
    async fn list(&self, status: Option<InquiryStatus>, page: &Pagination) -> AppResult<(Vec<Inquiry>, i64)>;

    async fn update_status(&self, id: Uuid, status: InquiryStatus) -> AppResult<Option<Inquiry>>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    async fn stats(&self) -> AppResult<InquiryStats>;
}

pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    new: i64,
    contacted: i64,
    closed: i64,
}

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn create(&self, inquiry: NewInquiry) -> AppResult<Inquiry> {
        let created = sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (id, name, email, phone, message, vehicle_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'new', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(inquiry.name)
        .bind(inquiry.email)
        .bind(inquiry.phone)
        .bind(inquiry.message)
        .bind(inquiry.vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(&self, status: Option<InquiryStatus>, page: &Pagination) -> AppResult<(Vec<Inquiry>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM inquiries WHERE $1::inquiry_status IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let inquiries = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT * FROM inquiries
            WHERE $1::inquiry_status IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((inquiries, total))
    }

    async fn update_status(&self, id: Uuid, status: InquiryStatus) -> AppResult<Option<Inquiry>> {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            "UPDATE inquiries SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inquiry)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> AppResult<InquiryStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'new') AS "new",
                COUNT(*) FILTER (WHERE status = 'contacted') AS contacted,
                COUNT(*) FILTER (WHERE status = 'closed') AS closed
            FROM inquiries
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(InquiryStats {
            total: row.total,
            new: row.new,
            contacted: row.contacted,
            closed: row.closed,
        })
    }
}
