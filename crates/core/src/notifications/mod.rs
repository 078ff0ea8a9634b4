//! Notifications module - the email dispatch boundary and message templates.

mod notifications_model;
mod notifications_traits;
pub mod templates;

pub use notifications_model::{DispatchError, EmailMessage};
pub use notifications_traits::EmailDispatcherTrait;
