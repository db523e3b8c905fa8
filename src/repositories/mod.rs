//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities. The cross-entity lifecycle rules the
//! original system ran from ORM signals live here as explicit methods:
//! employee deletion removes the linked user, client/event deletion prunes
//! orphaned locations, contract and event creation enforce their state gates
//! inside transactions.

pub mod client;
pub mod contract;
pub mod employee;
pub mod event;
pub mod location;
pub mod token;
pub mod user;

pub use client::ClientRepository;
pub use contract::ContractRepository;
pub use employee::EmployeeRepository;
pub use event::EventRepository;
pub use location::LocationRepository;
pub use token::TokenRepository;
pub use user::UserRepository;
