use async_trait::async_trait;

use crate::types::{PostRequest, PublishResult};

/// Common interface implemented by every platform publisher (Facebook, Instagram, …).
///
/// Implementations must be `Send + Sync` so they can be stored in a
/// [`PublisherRegistry`](crate::registry::PublisherRegistry).
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stable lowercase identifier matching the row's platform column
    /// (e.g. `"facebook"`).
    fn name(&self) -> &str;

    /// Run the platform's full publish call sequence once.
    ///
    /// Every failure, including a missing precondition, comes back as `Err`
    /// with a human-readable cause; nothing panics or retries internally.
    async fn publish(&self, post: &PostRequest) -> PublishResult;
}
