use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::owners_model::{NewOwner, Owner};
use crate::errors::Result;

/// Trait for owner repository operations
#[async_trait]
pub trait OwnerRepositoryTrait: Send + Sync {
    fn get_by_id(&self, owner_id: &str) -> Result<Option<Owner>>;

    /// Registers an owner together with its default monthly report subscription.
    async fn create(&self, new_owner: NewOwner, now: DateTime<Utc>) -> Result<Owner>;

    /// Deletes an owner and, through cascading keys, everything it owns.
    async fn delete(&self, owner_id: &str) -> Result<usize>;
}
