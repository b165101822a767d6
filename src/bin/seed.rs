//! Seed an empty database with a sample catalog and one running offer.
//!
//! Refuses to run when vehicles already exist. Creates the configured
//! bootstrap admin (`BOOTSTRAP_ADMIN_EMAIL` / `BOOTSTRAP_ADMIN_PASSWORD`)
//! when one is set.

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dealership_api::config::database::DatabaseConfig;
use dealership_api::config::environment::EnvironmentConfig;
use dealership_api::controllers::auth_controller::AuthController;
use dealership_api::database::DatabaseConnection;
use dealership_api::models::offer::OfferFields;
use dealership_api::models::vehicle::{FuelType, Transmission, VehicleFields, VehicleStatus};
use dealership_api::AppState;

struct Sample {
    title: &'static str,
    make: &'static str,
    model: &'static str,
    year: i32,
    price: i64,
    mileage: i32,
    fuel_type: FuelType,
    engine_size: &'static str,
    color: &'static str,
    body_type: &'static str,
    description: &'static str,
    status: VehicleStatus,
    featured: bool,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "2022 Toyota Land Cruiser V8",
        make: "Toyota",
        model: "Land Cruiser",
        year: 2022,
        price: 12_500_000,
        mileage: 15_000,
        fuel_type: FuelType::Diesel,
        engine_size: "4.5L V8",
        color: "Pearl White",
        body_type: "SUV",
        description: "Pristine Land Cruiser V8 with full leather interior and sunroof.",
        status: VehicleStatus::Available,
        featured: true,
    },
    Sample {
        title: "2021 Mercedes-Benz C200",
        make: "Mercedes-Benz",
        model: "C-Class",
        year: 2021,
        price: 5_800_000,
        mileage: 28_000,
        fuel_type: FuelType::Petrol,
        engine_size: "2.0L Turbo",
        color: "Obsidian Black",
        body_type: "Sedan",
        description: "C200 with AMG styling package and panoramic sunroof.",
        status: VehicleStatus::Available,
        featured: true,
    },
    Sample {
        title: "2020 BMW X5 xDrive40i",
        make: "BMW",
        model: "X5",
        year: 2020,
        price: 8_500_000,
        mileage: 35_000,
        fuel_type: FuelType::Petrol,
        engine_size: "3.0L Twin-Turbo",
        color: "Mineral White",
        body_type: "SUV",
        description: "X5 with M Sport package and heads-up display.",
        status: VehicleStatus::Available,
        featured: true,
    },
    Sample {
        title: "2023 Mazda CX-5",
        make: "Mazda",
        model: "CX-5",
        year: 2023,
        price: 4_200_000,
        mileage: 8_000,
        fuel_type: FuelType::Petrol,
        engine_size: "2.5L",
        color: "Soul Red Crystal",
        body_type: "SUV",
        description: "Nearly new CX-5 with premium interior and 360-degree camera.",
        status: VehicleStatus::Available,
        featured: true,
    },
    Sample {
        title: "2019 Nissan X-Trail",
        make: "Nissan",
        model: "X-Trail",
        year: 2019,
        price: 2_800_000,
        mileage: 55_000,
        fuel_type: FuelType::Petrol,
        engine_size: "2.5L",
        color: "Diamond Black",
        body_type: "SUV",
        description: "Well-maintained 7-seater family vehicle.",
        status: VehicleStatus::Available,
        featured: false,
    },
    Sample {
        title: "2022 Volkswagen Tiguan",
        make: "Volkswagen",
        model: "Tiguan",
        year: 2022,
        price: 5_200_000,
        mileage: 18_000,
        fuel_type: FuelType::Petrol,
        engine_size: "2.0L TSI",
        color: "Oryx White",
        body_type: "SUV",
        description: "Tiguan with digital cockpit and panoramic sunroof.",
        status: VehicleStatus::Reserved,
        featured: false,
    },
    Sample {
        title: "2021 Toyota Hilux Double Cab",
        make: "Toyota",
        model: "Hilux",
        year: 2021,
        price: 4_800_000,
        mileage: 30_000,
        fuel_type: FuelType::Diesel,
        engine_size: "2.8L D-4D",
        color: "Silver Metallic",
        body_type: "Pickup",
        description: "Double cab Hilux with 4x4 capability.",
        status: VehicleStatus::Available,
        featured: false,
    },
    Sample {
        title: "2019 Mitsubishi Pajero",
        make: "Mitsubishi",
        model: "Pajero",
        year: 2019,
        price: 3_500_000,
        mileage: 48_000,
        fuel_type: FuelType::Diesel,
        engine_size: "3.2L DI-D",
        color: "Warm White",
        body_type: "SUV",
        description: "Pajero with Super Select 4WD.",
        status: VehicleStatus::Sold,
        featured: false,
    },
];

impl Sample {
    fn fields(&self) -> VehicleFields {
        VehicleFields {
            title: self.title.to_string(),
            make: self.make.to_string(),
            model: self.model.to_string(),
            year: self.year,
            price: Decimal::from(self.price),
            mileage: Some(self.mileage),
            transmission: Transmission::Automatic,
            fuel_type: self.fuel_type,
            engine_size: Some(self.engine_size.to_string()),
            color: Some(self.color.to_string()),
            body_type: Some(self.body_type.to_string()),
            description: Some(self.description.to_string()),
            status: self.status,
            featured: self.featured,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EnvironmentConfig::from_env()?;
    let db = DatabaseConnection::connect(&DatabaseConfig::from_config(&config)?).await?;
    db.run_migrations().await?;
    let state = AppState::postgres(db.pool().clone(), config.clone());

    if state.vehicles.stats().await?.total > 0 {
        bail!("the vehicles table is not empty; seed only runs against an empty catalog");
    }

    if let Some(admin) = &config.bootstrap_admin {
        if let Some(user) = AuthController::new(&state).bootstrap_admin(admin).await? {
            info!("👤 Admin created: {}", user.email);
        }
    }

    info!("🚗 Creating sample vehicles...");
    let mut created = Vec::with_capacity(SAMPLES.len());
    for sample in SAMPLES {
        created.push(state.vehicles.create(sample.fields()).await?);
    }
    info!("   ✅ Created {} vehicles", created.len());

    if let Some(vehicle) = created.iter().find(|v| v.featured) {
        let now = Utc::now();
        state
            .offers
            .create(OfferFields {
                title: "New Year Special - 5% Off".to_string(),
                description: Some("Start the year with a new ride! Get 5% off on this vehicle.".to_string()),
                discount_price: None,
                discount_percentage: Some(5),
                start_date: now,
                end_date: now + Duration::days(30),
                is_active: true,
                vehicle_id: vehicle.id,
            })
            .await?;
        info!("🏷️ Created 1 offer for {}", vehicle.title);
    }

    info!("🎉 Database seeded");
    Ok(())
}
