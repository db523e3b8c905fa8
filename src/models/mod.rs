//! # Data Models
//!
//! This module contains all the SeaORM entities used throughout the
//! Epic Events CRM API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod client;
pub mod client_location;
pub mod contract;
pub mod employee;
pub mod event;
pub mod event_location;
pub mod location;
pub mod refresh_token;
pub mod user;

pub use client::Entity as Client;
pub use client_location::Entity as ClientLocation;
pub use contract::Entity as Contract;
pub use employee::Entity as Employee;
pub use event::Entity as Event;
pub use event_location::Entity as EventLocation;
pub use location::Entity as Location;
pub use refresh_token::Entity as RefreshToken;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "epicevents".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
