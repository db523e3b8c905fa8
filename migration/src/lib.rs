//! Database migrations for the Epic Events CRM API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_06_01_000001_create_users;
mod m2024_06_01_000002_create_employees;
mod m2024_06_01_000003_create_locations;
mod m2024_06_01_000004_create_clients;
mod m2024_06_01_000005_create_contracts;
mod m2024_06_01_000006_create_events;
mod m2024_06_01_000007_create_client_locations;
mod m2024_06_01_000008_create_event_locations;
mod m2024_06_01_000009_create_refresh_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_06_01_000001_create_users::Migration),
            Box::new(m2024_06_01_000002_create_employees::Migration),
            Box::new(m2024_06_01_000003_create_locations::Migration),
            Box::new(m2024_06_01_000004_create_clients::Migration),
            Box::new(m2024_06_01_000005_create_contracts::Migration),
            Box::new(m2024_06_01_000006_create_events::Migration),
            Box::new(m2024_06_01_000007_create_client_locations::Migration),
            Box::new(m2024_06_01_000008_create_event_locations::Migration),
            Box::new(m2024_06_01_000009_create_refresh_tokens::Migration),
        ]
    }
}
