//! Repository implementations for stored documents.
//!
//! Repositories borrow a [`Store`](crate::db::Store) and are obtained
//! through its accessors.

pub mod device;
pub mod event;
pub mod place;
pub mod scoped;
pub mod user;

pub use device::DeviceRepository;
pub use event::EventRepository;
pub use place::PlaceRepository;
pub use scoped::{DeviceScope, GroupScope, Scope, ScopedDocument, ScopedRepository};
pub use user::UserRepository;
