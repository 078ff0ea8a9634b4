use async_trait::async_trait;

use super::notifications_model::{DispatchError, EmailMessage};

/// Outbound email boundary.
///
/// Implementations enforce their own timeout and never retry; callers decide
/// what a failure means for the item being processed.
#[async_trait]
pub trait EmailDispatcherTrait: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}
