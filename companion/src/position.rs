use safe_commute_lib::sample::PositionSample;
use tokio::sync::mpsc;

use crate::error::{PositionError, StreamError};

/// One message from a live position feed.
pub type PositionUpdate = Result<PositionSample, StreamError>;

/// A provider of position fixes, e.g. a platform geolocation API or a
/// simulated route.
#[async_trait::async_trait]
pub trait PositionSource: Send + Sync {
    /// Request a single current fix.
    async fn current_position(&self) -> Result<PositionSample, PositionError>;

    /// Open a live feed of fixes. Dropping the returned subscription
    /// closes the feed.
    async fn subscribe(&self) -> PositionSubscription;
}

/// Receiving end of a live feed, held by the trip monitor while tracking.
pub struct PositionSubscription {
    rx: mpsc::Receiver<PositionUpdate>,
}

impl PositionSubscription {
    pub fn new(rx: mpsc::Receiver<PositionUpdate>) -> Self {
        Self { rx }
    }

    /// Next update, or `None` once the source ends the feed.
    pub async fn next(&mut self) -> Option<PositionUpdate> {
        self.rx.recv().await
    }
}
