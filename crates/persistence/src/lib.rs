//! Storage layer for the geotrace service.
//!
//! This crate contains:
//! - The document store abstraction with Postgres and in-memory backends
//! - Store handle and connection pool management
//! - Entity definitions (stored document mappings)
//! - Group-scoped repositories for users, devices, events and places
//! - Configuration, logging and metrics setup

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use crate::config::{StoreConfig, UpdatePolicy};
pub use crate::db::Store;
pub use crate::error::StoreError;
