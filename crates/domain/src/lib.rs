//! Domain layer for the Geotrace store.
//!
//! This crate contains:
//! - Domain models (User, Device, Event, Place)
//! - Geographic primitives and geofence normalization
//! - Domain error types

pub mod errors;
pub mod models;
