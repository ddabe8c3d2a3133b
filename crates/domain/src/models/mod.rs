//! Domain models for the Geotrace store.

pub mod device;
pub mod event;
pub mod geometry;
pub mod place;
pub mod user;

pub use device::Device;
pub use event::{Event, ExtraValue};
pub use geometry::{circle_to_polygon, Circle, IndexGeometry, Point, Polygon};
pub use place::Place;
pub use user::User;
