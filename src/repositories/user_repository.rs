//! User repository
//!
//! Account persistence. Account creation counts existing users and inserts
//! inside one transaction so the "first user becomes admin" decision
//! cannot race with a concurrent registration.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserChanges, UserRole};
use crate::utils::errors::AppResult;

/// Decides the stored role given the number of existing users. Runs while
/// the user table is locked; an error aborts the insert.
pub type RoleResolver = dyn Fn(i64) -> AppResult<UserRole> + Send + Sync;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// `email` must already be normalized
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list(&self) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64>;

    /// Insert `user`, with its role replaced by `resolve_role(existing_count)`
    async fn create(&self, user: NewUser, resolve_role: &RoleResolver) -> AppResult<User>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<bool>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, user: NewUser, resolve_role: &RoleResolver) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        // blocks concurrent inserts until commit; plain reads still proceed
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let role = resolve_role(existing)?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
