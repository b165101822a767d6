//! Vehicle repository
//!
//! Catalog persistence. The listing query is assembled with `QueryBuilder`
//! from a typed `VehicleFilter`: every filter field adds one bound predicate
//! and the sort column comes from `VehicleSort`, so no request text is ever
//! spliced into SQL. Images live in a JSONB array column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::vehicle::{
    FuelType, Transmission, Vehicle, VehicleFields, VehicleFilter, VehicleImage, VehicleQuery, VehicleStats,
    VehicleStatus,
};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// One page of matches plus the total match count
    async fn list(&self, query: &VehicleQuery) -> AppResult<(Vec<Vehicle>, i64)>;

    /// Featured, available vehicles, newest first
    async fn featured(&self, limit: i64) -> AppResult<Vec<Vehicle>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Vehicle>>;

    /// Atomically add one view and return the updated record
    async fn increment_views(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn create(&self, fields: VehicleFields) -> AppResult<Vehicle>;

    async fn update(&self, id: Uuid, fields: VehicleFields) -> AppResult<Option<Vehicle>>;

    /// Append to the end of the image list
    async fn append_images(&self, id: Uuid, images: &[VehicleImage]) -> AppResult<Option<Vehicle>>;

    /// Drop the image entry with `storage_key`, keeping the others in order
    async fn remove_image(&self, id: Uuid, storage_key: &str) -> AppResult<Option<Vehicle>>;

    /// Delete and return the removed record. Offers go with it; inquiries
    /// keep their row with the vehicle reference cleared.
    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn stats(&self) -> AppResult<VehicleStats>;

    /// Storage keys referenced by any vehicle
    async fn referenced_image_keys(&self) -> AppResult<Vec<String>>;
}

#[derive(Debug, FromRow)]
struct VehicleRow {
    id: Uuid,
    title: String,
    make: String,
    model: String,
    year: i32,
    price: Decimal,
    mileage: Option<i32>,
    transmission: Transmission,
    fuel_type: FuelType,
    engine_size: Option<String>,
    color: Option<String>,
    body_type: Option<String>,
    description: Option<String>,
    images: Json<Vec<VehicleImage>>,
    status: VehicleStatus,
    featured: bool,
    views: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            make: row.make,
            model: row.model,
            year: row.year,
            price: row.price,
            mileage: row.mileage,
            transmission: row.transmission,
            fuel_type: row.fuel_type,
            engine_size: row.engine_size,
            color: row.color,
            body_type: row.body_type,
            description: row.description,
            images: row.images.0,
            status: row.status,
            featured: row.featured,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatusCounts {
    total: i64,
    available: i64,
    reserved: i64,
    sold: i64,
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &VehicleFilter) {
    qb.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR make ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR model ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(make) = &filter.make {
        qb.push(" AND make ILIKE ").push_bind(like_pattern(make));
    }
    if let Some(model) = &filter.model {
        qb.push(" AND model ILIKE ").push_bind(like_pattern(model));
    }
    if let Some(transmission) = filter.transmission {
        qb.push(" AND transmission = ").push_bind(transmission);
    }
    if let Some(fuel_type) = filter.fuel_type {
        qb.push(" AND fuel_type = ").push_bind(fuel_type);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(year_min) = filter.year_min {
        qb.push(" AND year >= ").push_bind(year_min);
    }
    if let Some(year_max) = filter.year_max {
        qb.push(" AND year <= ").push_bind(year_max);
    }
    if let Some(price_min) = filter.price_min {
        qb.push(" AND price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filter.price_max {
        qb.push(" AND price <= ").push_bind(price_max);
    }
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn list(&self, query: &VehicleQuery) -> AppResult<(Vec<Vehicle>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicles");
        push_filters(&mut count_qb, &query.filter);
        let total: i64 = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM vehicles");
        push_filters(&mut qb, &query.filter);
        let direction = query.order.as_sql();
        qb.push(format!(" ORDER BY {} {}, id {}", query.sort.column(), direction, direction));
        qb.push(" LIMIT ").push_bind(query.page.limit);
        qb.push(" OFFSET ").push_bind(query.page.offset());

        let rows = qb.build_query_as::<VehicleRow>().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(Vehicle::from).collect(), total))
    }

    async fn featured(&self, limit: i64) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT * FROM vehicles
            WHERE featured = TRUE AND status = 'available'
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Vehicle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            "UPDATE vehicles SET views = views + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn create(&self, fields: VehicleFields) -> AppResult<Vehicle> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (
                id, title, make, model, year, price, mileage, transmission, fuel_type,
                engine_size, color, body_type, description, images, status, featured,
                views, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, '[]'::jsonb, $14, $15, 0, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.title)
        .bind(fields.make)
        .bind(fields.model)
        .bind(fields.year)
        .bind(fields.price)
        .bind(fields.mileage)
        .bind(fields.transmission)
        .bind(fields.fuel_type)
        .bind(fields.engine_size)
        .bind(fields.color)
        .bind(fields.body_type)
        .bind(fields.description)
        .bind(fields.status)
        .bind(fields.featured)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, fields: VehicleFields) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE vehicles SET
                title = $2, make = $3, model = $4, year = $5, price = $6, mileage = $7,
                transmission = $8, fuel_type = $9, engine_size = $10, color = $11,
                body_type = $12, description = $13, status = $14, featured = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.title)
        .bind(fields.make)
        .bind(fields.model)
        .bind(fields.year)
        .bind(fields.price)
        .bind(fields.mileage)
        .bind(fields.transmission)
        .bind(fields.fuel_type)
        .bind(fields.engine_size)
        .bind(fields.color)
        .bind(fields.body_type)
        .bind(fields.description)
        .bind(fields.status)
        .bind(fields.featured)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn append_images(&self, id: Uuid, images: &[VehicleImage]) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            "UPDATE vehicles SET images = images || $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Json(images.to_vec()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn remove_image(&self, id: Uuid, storage_key: &str) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE vehicles SET
                images = (
                    SELECT COALESCE(jsonb_agg(e.value ORDER BY e.ordinality), '[]'::jsonb)
                    FROM jsonb_array_elements(images) WITH ORDINALITY AS e(value, ordinality)
                    WHERE e.value->>'storageKey' <> $2
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(storage_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("DELETE FROM vehicles WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn stats(&self) -> AppResult<VehicleStats> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'available') AS available,
                COUNT(*) FILTER (WHERE status = 'reserved') AS reserved,
                COUNT(*) FILTER (WHERE status = 'sold') AS sold
            FROM vehicles
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let makes: Vec<String> = sqlx::query_scalar::<_, String>("SELECT DISTINCT make FROM vehicles ORDER BY make")
            .fetch_all(&self.pool)
            .await?;

        Ok(VehicleStats {
            total: counts.total,
            available: counts.available,
            reserved: counts.reserved,
            sold: counts.sold,
            makes,
        })
    }

    async fn referenced_image_keys(&self) -> AppResult<Vec<String>> {
        let lists: Vec<Json<Vec<VehicleImage>>> = sqlx::query_scalar::<_, Json<Vec<VehicleImage>>>("SELECT images FROM vehicles")
            .fetch_all(&self.pool)
            .await?;

        Ok(lists
            .into_iter()
            .flat_map(|list| list.0.into_iter().map(|image| image.storage_key))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pagination::Pagination;
    use crate::models::vehicle::{SortOrder, VehicleSort};

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("toy"), "%toy%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_filters_bind_every_value() {
        let filter = VehicleFilter {
            search: Some("hilux".into()),
            make: Some("toyota".into()),
            status: Some(VehicleStatus::Available),
            price_min: Some(Decimal::from(1_000)),
            price_max: Some(Decimal::from(9_000)),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicles");
        push_filters(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM vehicles WHERE TRUE AND (title ILIKE $1 OR make ILIKE $2 OR model ILIKE $3) \
             AND make ILIKE $4 AND status = $5 AND price >= $6 AND price <= $7"
        );
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM vehicles");
        push_filters(&mut qb, &VehicleFilter::default());
        assert_eq!(qb.sql(), "SELECT * FROM vehicles WHERE TRUE");
    }

    #[test]
    fn test_order_clause_uses_enum_column() {
        let query = VehicleQuery {
            filter: VehicleFilter::default(),
            sort: VehicleSort::from_param(Some("price; DROP TABLE vehicles")),
            order: SortOrder::Asc,
            page: Pagination::new(None, None, 12),
        };
        assert_eq!(query.sort.column(), "created_at");
    }
}
