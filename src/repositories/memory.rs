//! In-memory repository implementation.
//!
//! Implements every repository trait over plain vectors behind one
//! `tokio::sync::RwLock`, mirroring the Postgres schema rules: unique
//! emails, offers removed with their vehicle, inquiry vehicle references
//! cleared on vehicle delete. Used by the test suite and for running the
//! API without a database.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::inquiry::{Inquiry, InquiryStats, InquiryStatus, NewInquiry};
use crate::models::offer::{Offer, OfferFields};
use crate::models::pagination::Pagination;
use crate::models::user::{NewUser, User, UserChanges, UserRole};
use crate::models::vehicle::{Vehicle, VehicleFields, VehicleImage, VehicleQuery, VehicleStats, VehicleStatus};
use crate::repositories::inquiry_repository::InquiryRepository;
use crate::repositories::offer_repository::OfferRepository;
use crate::repositories::user_repository::{RoleResolver, UserRepository};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    vehicles: Vec<Vehicle>,
    offers: Vec<Offer>,
    inquiries: Vec<Inquiry>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps keep "newest first" deterministic
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_stamp = Some(now);
        now
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(a_created: &DateTime<Utc>, a_id: &Uuid, b_created: &DateTime<Utc>, b_id: &Uuid) -> Ordering {
    b_created.cmp(a_created).then_with(|| b_id.cmp(a_id))
}

fn paginate<T: Clone>(items: &[T], page: &Pagination) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        let data = self.data.read().await;
        Ok(data.users.len() as i64)
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let data = self.data.read().await;
        Ok(data.users.iter().filter(|u| u.role == role).count() as i64)
    }

    async fn create(&self, user: NewUser, resolve_role: &RoleResolver) -> AppResult<User> {
        let mut data = self.data.write().await;
        let role = resolve_role(data.users.len() as i64)?;

        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::UniqueViolation("email".to_string()));
        }

        let now = data.now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        data.users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>> {
        let mut data = self.data.write().await;
        let now = data.now();
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<bool> {
        let mut data = self.data.write().await;
        let now = data.now();
        match data.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn apply_vehicle_fields(vehicle: &mut Vehicle, fields: VehicleFields) {
    vehicle.title = fields.title;
    vehicle.make = fields.make;
    vehicle.model = fields.model;
    vehicle.year = fields.year;
    vehicle.price = fields.price;
    vehicle.mileage = fields.mileage;
    vehicle.transmission = fields.transmission;
    vehicle.fuel_type = fields.fuel_type;
    vehicle.engine_size = fields.engine_size;
    vehicle.color = fields.color;
    vehicle.body_type = fields.body_type;
    vehicle.description = fields.description;
    vehicle.status = fields.status;
    vehicle.featured = fields.featured;
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn list(&self, query: &VehicleQuery) -> AppResult<(Vec<Vehicle>, i64)> {
        let data = self.data.read().await;
        let mut matches: Vec<&Vehicle> = data.vehicles.iter().filter(|v| query.filter.matches(v)).collect();
        matches.sort_by(|a, b| {
            query
                .order
                .apply(query.sort.compare(a, b).then_with(|| a.id.cmp(&b.id)))
        });

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn featured(&self, limit: i64) -> AppResult<Vec<Vehicle>> {
        let data = self.data.read().await;
        let mut featured: Vec<Vehicle> = data
            .vehicles
            .iter()
            .filter(|v| v.featured && v.status == VehicleStatus::Available)
            .cloned()
            .collect();
        featured.sort_by(|a, b| newest_first(&a.created_at, &a.id, &b.created_at, &b.id));
        featured.truncate(limit.max(0) as usize);
        Ok(featured)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let data = self.data.read().await;
        Ok(data.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Vehicle>> {
        let data = self.data.read().await;
        Ok(data.vehicles.iter().filter(|v| ids.contains(&v.id)).cloned().collect())
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        Ok(data.vehicles.iter_mut().find(|v| v.id == id).map(|v| {
            v.views += 1;
            v.clone()
        }))
    }

    async fn create(&self, fields: VehicleFields) -> AppResult<Vehicle> {
        let mut data = self.data.write().await;
        let now = data.now();
        let mut vehicle = Vehicle {
            id: Uuid::new_v4(),
            title: String::new(),
            make: String::new(),
            model: String::new(),
            year: 0,
            price: Default::default(),
            mileage: None,
            transmission: Default::default(),
            fuel_type: Default::default(),
            engine_size: None,
            color: None,
            body_type: None,
            description: None,
            images: Vec::new(),
            status: Default::default(),
            featured: false,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        apply_vehicle_fields(&mut vehicle, fields);
        data.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn update(&self, id: Uuid, fields: VehicleFields) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let now = data.now();
        Ok(data.vehicles.iter_mut().find(|v| v.id == id).map(|v| {
            apply_vehicle_fields(v, fields);
            v.updated_at = now;
            v.clone()
        }))
    }

    async fn append_images(&self, id: Uuid, images: &[VehicleImage]) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let now = data.now();
        Ok(data.vehicles.iter_mut().find(|v| v.id == id).map(|v| {
            v.images.extend_from_slice(images);
            v.updated_at = now;
            v.clone()
        }))
    }

    async fn remove_image(&self, id: Uuid, storage_key: &str) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let now = data.now();
        Ok(data.vehicles.iter_mut().find(|v| v.id == id).map(|v| {
            v.images.retain(|image| image.storage_key != storage_key);
            v.updated_at = now;
            v.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let Some(index) = data.vehicles.iter().position(|v| v.id == id) else {
            return Ok(None);
        };
        let removed = data.vehicles.remove(index);

        data.offers.retain(|o| o.vehicle_id != id);
        for inquiry in data.inquiries.iter_mut().filter(|i| i.vehicle_id == Some(id)) {
            inquiry.vehicle_id = None;
        }
        Ok(Some(removed))
    }

    async fn stats(&self) -> AppResult<VehicleStats> {
        let data = self.data.read().await;
        let count = |status: VehicleStatus| data.vehicles.iter().filter(|v| v.status == status).count() as i64;

        let mut makes: Vec<String> = data.vehicles.iter().map(|v| v.make.clone()).collect();
        makes.sort();
        makes.dedup();

        Ok(VehicleStats {
            total: data.vehicles.len() as i64,
            available: count(VehicleStatus::Available),
            reserved: count(VehicleStatus::Reserved),
            sold: count(VehicleStatus::Sold),
            makes,
        })
    }

    async fn referenced_image_keys(&self) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .vehicles
            .iter()
            .flat_map(|v| v.images.iter().map(|image| image.storage_key.clone()))
            .collect())
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> AppResult<Vec<Offer>> {
        let data = self.data.read().await;
        let mut offers: Vec<Offer> = data
            .offers
            .iter()
            .filter(|o| active_at.map_or(true, |now| o.is_currently_active(now)))
            .cloned()
            .collect();
        offers.sort_by(|a, b| newest_first(&a.created_at, &a.id, &b.created_at, &b.id));
        Ok(offers)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Offer>> {
        let data = self.data.read().await;
        Ok(data.offers.iter().find(|o| o.id == id).cloned())
    }

    async fn active_for_vehicle(&self, vehicle_id: Uuid, now: DateTime<Utc>) -> AppResult<Vec<Offer>> {
        let data = self.data.read().await;
        let mut offers: Vec<Offer> = data
            .offers
            .iter()
            .filter(|o| o.vehicle_id == vehicle_id && o.is_currently_active(now))
            .cloned()
            .collect();
        offers.sort_by(|a, b| newest_first(&a.created_at, &a.id, &b.created_at, &b.id));
        Ok(offers)
    }

    async fn create(&self, fields: OfferFields) -> AppResult<Offer> {
        let mut data = self.data.write().await;
        if !data.vehicles.iter().any(|v| v.id == fields.vehicle_id) {
            return Err(not_found_error("Vehicle"));
        }

        let now = data.now();
        let offer = Offer {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            discount_price: fields.discount_price,
            discount_percentage: fields.discount_percentage,
            start_date: fields.start_date,
            end_date: fields.end_date,
            is_active: fields.is_active,
            vehicle_id: fields.vehicle_id,
            created_at: now,
            updated_at: now,
        };
        data.offers.push(offer.clone());
        Ok(offer)
    }

    async fn update(&self, id: Uuid, fields: OfferFields) -> AppResult<Option<Offer>> {
        let mut data = self.data.write().await;
        if !data.vehicles.iter().any(|v| v.id == fields.vehicle_id) {
            return Err(not_found_error("Vehicle"));
        }

        let now = data.now();
        Ok(data.offers.iter_mut().find(|o| o.id == id).map(|o| {
            o.title = fields.title;
            o.description = fields.description;
            o.discount_price = fields.discount_price;
            o.discount_percentage = fields.discount_percentage;
            o.start_date = fields.start_date;
            o.end_date = fields.end_date;
            o.is_active = fields.is_active;
            o.vehicle_id = fields.vehicle_id;
            o.updated_at = now;
            o.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.write().await;
        let before = data.offers.len();
        data.offers.retain(|o| o.id != id);
        Ok(data.offers.len() < before)
    }
}

#[async_trait]
impl InquiryRepository for MemoryStore {
    async fn create(&self, inquiry: NewInquiry) -> AppResult<Inquiry> {
        let mut data = self.data.write().await;
        if let Some(vehicle_id) = inquiry.vehicle_id {
            if !data.vehicles.iter().any(|v| v.id == vehicle_id) {
                return Err(not_found_error("Vehicle"));
            }
        }

        let now = data.now();
        let created = Inquiry {
            id: Uuid::new_v4(),
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            vehicle_id: inquiry.vehicle_id,
            status: InquiryStatus::New,
            created_at: now,
            updated_at: now,
        };
        data.inquiries.push(created.clone());
        Ok(created)
    }

    async fn list(&self, status: Option<InquiryStatus>, page: &Pagination) -> AppResult<(Vec<Inquiry>, i64)> {
        let data = self.data.read().await;
        let mut matches: Vec<Inquiry> = data
            .inquiries
            .iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| newest_first(&a.created_at, &a.id, &b.created_at, &b.id));
        Ok((paginate(&matches, page), matches.len() as i64))
    }

    async fn update_status(&self, id: Uuid, status: InquiryStatus) -> AppResult<Option<Inquiry>> {
        let mut data = self.data.write().await;
        let now = data.now();
        Ok(data.inquiries.iter_mut().find(|i| i.id == id).map(|i| {
            i.status = status;
            i.updated_at = now;
            i.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.write().await;
        let before = data.inquiries.len();
        data.inquiries.retain(|i| i.id != id);
        Ok(data.inquiries.len() < before)
    }

    async fn stats(&self) -> AppResult<InquiryStats> {
        let data = self.data.read().await;
        let count = |status: InquiryStatus| data.inquiries.iter().filter(|i| i.status == status).count() as i64;
        Ok(InquiryStats {
            total: data.inquiries.len() as i64,
            new: count(InquiryStatus::New),
            contacted: count(InquiryStatus::Contacted),
            closed: count(InquiryStatus::Closed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pagination::Pagination;
    use crate::models::vehicle::{FuelType, SortOrder, Transmission, VehicleFilter, VehicleSort};
    use rust_decimal::Decimal;

    fn fields(make: &str, model: &str, year: i32, price: i64) -> VehicleFields {
        VehicleFields {
            title: format!("{} {} {}", year, make, model),
            make: make.into(),
            model: model.into(),
            year,
            price: Decimal::from(price),
            mileage: None,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Petrol,
            engine_size: None,
            color: None,
            body_type: None,
            description: None,
            status: VehicleStatus::Available,
            featured: false,
        }
    }

    fn query(sort: VehicleSort, order: SortOrder) -> VehicleQuery {
        VehicleQuery {
            filter: VehicleFilter::default(),
            sort,
            order,
            page: Pagination::new(None, None, 12),
        }
    }

    #[tokio::test]
    async fn test_first_user_role_is_resolved_under_lock() {
        let store = MemoryStore::new();
        let new_user = |email: &str| NewUser {
            name: "Staffer".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: UserRole::Staff,
        };
        let resolver = |count: i64| -> AppResult<UserRole> {
            Ok(if count == 0 { UserRole::Admin } else { UserRole::Staff })
        };

        let first = UserRepository::create(&store, new_user("a@dealer.test"), &resolver).await.unwrap();
        let second = UserRepository::create(&store, new_user("b@dealer.test"), &resolver).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);
        assert_eq!(second.role, UserRole::Staff);

        let duplicate = UserRepository::create(&store, new_user("a@dealer.test"), &resolver).await;
        assert!(matches!(duplicate, Err(AppError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_sorting_and_pagination() {
        let store = MemoryStore::new();
        for (model, price) in [("A", 300), ("B", 100), ("C", 200)] {
            VehicleRepository::create(&store, fields("Make", model, 2020, price)).await.unwrap();
        }

        let (asc, total) = VehicleRepository::list(&store, &query(VehicleSort::Price, SortOrder::Asc)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(asc.iter().map(|v| v.model.as_str()).collect::<Vec<_>>(), vec!["B", "C", "A"]);

        let (newest, _) = VehicleRepository::list(&store, &query(VehicleSort::CreatedAt, SortOrder::Desc)).await.unwrap();
        assert_eq!(newest[0].model, "C");

        let mut paged = query(VehicleSort::Price, SortOrder::Desc);
        paged.page = Pagination::new(Some(2), Some(2), 12);
        let (page_two, total) = VehicleRepository::list(&store, &paged).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].model, "B");
    }

    #[tokio::test]
    async fn test_delete_cascades_offers_and_clears_inquiries() {
        let store = MemoryStore::new();
        let vehicle = VehicleRepository::create(&store, fields("Nissan", "Note", 2017, 900_000)).await.unwrap();
        let now = Utc::now();
        OfferRepository::create(
            &store,
            OfferFields {
                title: "Deal".into(),
                description: None,
                discount_price: None,
                discount_percentage: Some(5),
                start_date: now - Duration::days(1),
                end_date: now + Duration::days(1),
                is_active: true,
                vehicle_id: vehicle.id,
            },
        )
        .await
        .unwrap();
        let inquiry = InquiryRepository::create(
            &store,
            NewInquiry {
                name: "Otieno".into(),
                email: None,
                phone: "0700000000".into(),
                message: "Still available?".into(),
                vehicle_id: Some(vehicle.id),
            },
        )
        .await
        .unwrap();

        assert!(VehicleRepository::delete(&store, vehicle.id).await.unwrap().is_some());
        assert!(OfferRepository::list(&store, None).await.unwrap().is_empty());

        let (inquiries, _) = InquiryRepository::list(&store, None, &Pagination::new(None, None, 20)).await.unwrap();
        assert_eq!(inquiries.len(), 1);
        assert_eq!(inquiries[0].id, inquiry.id);
        assert_eq!(inquiries[0].vehicle_id, None);
    }

    #[tokio::test]
    async fn test_inquiry_for_a_vanished_vehicle_is_not_found() {
        let store = MemoryStore::new();
        let err = InquiryRepository::create(
            &store,
            NewInquiry {
                name: "Wanjiru".into(),
                email: None,
                phone: "0711000000".into(),
                message: "Is it still here?".into(),
                vehicle_id: Some(Uuid::new_v4()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(&err, AppError::NotFound(msg) if msg == "Vehicle not found"));
    }

    #[tokio::test]
    async fn test_views_increment() {
        let store = MemoryStore::new();
        let vehicle = VehicleRepository::create(&store, fields("Subaru", "Forester", 2016, 1_500_000)).await.unwrap();
        for expected in 1..=3 {
            let updated = store.increment_views(vehicle.id).await.unwrap().unwrap();
            assert_eq!(updated.views, expected);
        }
        assert!(store.increment_views(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_image_list_edits_keep_order() {
        let store = MemoryStore::new();
        let vehicle = VehicleRepository::create(&store, fields("Audi", "A4", 2018, 2_000_000)).await.unwrap();
        let image = |key: &str| VehicleImage {
            url: format!("http://localhost/uploads/vehicles/{}", key),
            storage_key: key.into(),
        };

        store.append_images(vehicle.id, &[image("a.jpg"), image("b.jpg")]).await.unwrap();
        let updated = store.append_images(vehicle.id, &[image("c.jpg")]).await.unwrap().unwrap();
        assert_eq!(updated.images.len(), 3);

        let updated = store.remove_image(vehicle.id, "b.jpg").await.unwrap().unwrap();
        let keys: Vec<_> = updated.images.iter().map(|i| i.storage_key.as_str()).collect();
        assert_eq!(keys, vec!["a.jpg", "c.jpg"]);
        assert_eq!(store.referenced_image_keys().await.unwrap(), vec!["a.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryStore::new();
        let mut sold = fields("Toyota", "Vitz", 2012, 500_000);
        sold.status = VehicleStatus::Sold;
        VehicleRepository::create(&store, sold).await.unwrap();
        VehicleRepository::create(&store, fields("Mazda", "Axela", 2015, 800_000)).await.unwrap();
        VehicleRepository::create(&store, fields("Toyota", "Hilux", 2021, 4_800_000)).await.unwrap();

        let stats = VehicleRepository::stats(&store).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.available, 2);
        assert_eq!(stats.sold, 1);
        assert_eq!(stats.makes, vec!["Mazda".to_string(), "Toyota".to_string()]);
    }
}
