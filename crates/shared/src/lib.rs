//! Shared utilities for the Geotrace store.
//!
//! This crate provides functionality used across the other crates:
//! - Identifier generation for users, devices, places and events
//! - Password digests with Argon2id
//! - Coordinate validation helpers

pub mod id;
pub mod password;
pub mod validation;
