//! Stored document definitions.
//!
//! Entities are direct mappings to stored documents, keyed by `_id` and
//! carrying the scope fields the domain models leave optional.

pub mod device;
pub mod event;
pub mod place;
pub mod user;

pub use device::DeviceEntity;
pub use event::EventEntity;
pub use place::PlaceEntity;
pub use user::UserEntity;
