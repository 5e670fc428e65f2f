//! Delay primitive used between poll cycles

use async_trait::async_trait;
use std::time::Duration;

/// Waits for a duration
///
/// Sessions sleep through this trait so tests can substitute their own
/// clock.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by `tokio::time::sleep`
///
/// Honors tokio's paused test clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
