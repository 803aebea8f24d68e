use std::time::Duration;

use chrono::Utc;
use safe_commute_lib::coordinate::Coordinate;
use safe_commute_lib::sample::PositionSample;
use tokio::sync::mpsc;

use crate::error::{PositionError, StreamError};
use crate::position::{PositionSource, PositionSubscription, PositionUpdate};

/// One scripted event on a simulated route.
#[derive(Debug, Clone)]
pub enum RouteStep {
    /// Report a fix at this coordinate.
    Point(Coordinate),
    /// Deliver a stream error instead of a fix.
    Error(StreamError),
}

/// Position source that walks a scripted route, one step per interval,
/// with a little jitter on every fix. Stands in for a real geolocation
/// API in the demo binary.
///
/// A real location watch does not end on its own, so after the last step
/// the feed keeps reporting the final position until the subscription is
/// dropped.
pub struct SimulatedSource {
    route: Vec<RouteStep>,
    interval: Duration,
    jitter_degrees: f64,
}

impl SimulatedSource {
    pub fn new(route: Vec<RouteStep>, interval: Duration) -> Self {
        Self {
            route,
            interval,
            jitter_degrees: 1e-5,
        }
    }

    pub fn with_jitter(mut self, degrees: f64) -> Self {
        self.jitter_degrees = degrees;
        self
    }
}

#[async_trait::async_trait]
impl PositionSource for SimulatedSource {
    async fn current_position(&self) -> Result<PositionSample, PositionError> {
        let first_point = self.route.iter().find_map(|step| match step {
            RouteStep::Point(coordinate) => Some(*coordinate),
            RouteStep::Error(_) => None,
        });

        match first_point {
            Some(coordinate) => Ok(fix(coordinate, self.jitter_degrees)),
            None => Err(PositionError::Unavailable(
                "simulated route has no points".to_string(),
            )),
        }
    }

    async fn subscribe(&self) -> PositionSubscription {
        let (tx, rx) = mpsc::channel(16);
        let route = self.route.clone();
        let interval = self.interval;
        let jitter_degrees = self.jitter_degrees;

        tokio::spawn(walk_route(route, interval, jitter_degrees, tx));

        PositionSubscription::new(rx)
    }
}

async fn walk_route(
    route: Vec<RouteStep>,
    interval: Duration,
    jitter_degrees: f64,
    tx: mpsc::Sender<PositionUpdate>,
) {
    let mut last_point = None;

    for step in route {
        tokio::time::sleep(interval).await;

        let update = match step {
            RouteStep::Point(coordinate) => {
                last_point = Some(coordinate);
                Ok(fix(coordinate, jitter_degrees))
            }
            RouteStep::Error(error) => Err(error),
        };

        if tx.send(update).await.is_err() {
            return; // subscriber hung up
        }
    }

    let Some(coordinate) = last_point else {
        return;
    };

    loop {
        tokio::time::sleep(interval).await;
        if tx.send(Ok(fix(coordinate, jitter_degrees))).await.is_err() {
            return;
        }
    }
}

fn fix(coordinate: Coordinate, jitter_degrees: f64) -> PositionSample {
    let j = jitter_degrees;
    PositionSample::new(
        Coordinate::new(
            coordinate.latitude + rand::random_range(-j..=j),
            coordinate.longitude + rand::random_range(-j..=j),
        ),
        5.0 + rand::random_range(0.0..10.0),
        Utc::now(),
    )
}
