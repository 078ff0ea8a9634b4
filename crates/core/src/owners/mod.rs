//! Owners module - account holders and their contact data.

mod owners_model;
mod owners_traits;

pub use owners_model::{NewOwner, Owner, OwnerContact};
pub use owners_traits::OwnerRepositoryTrait;
