use std::{sync::Arc, time::Duration};

use companion::{
    error::StreamError,
    monitor::{MonitorConfig, TripMonitor},
    simulate::{RouteStep, SimulatedSource},
    stillness::StillnessConfig,
};
use safe_commute_lib::coordinate::Coordinate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting safety companion demo...");

    // A short walk through Copenhagen that ends standing still. The source
    // keeps reporting the final position, so the stillness alert fires.
    let route = vec![
        RouteStep::Point(Coordinate::new(55.6761, 12.5683)),
        RouteStep::Point(Coordinate::new(55.6764, 12.5683)),
        RouteStep::Point(Coordinate::new(55.6767, 12.5684)),
        RouteStep::Error(StreamError::signal_lost("simulated tunnel")),
        RouteStep::Point(Coordinate::new(55.6770, 12.5686)),
        RouteStep::Point(Coordinate::new(55.6773, 12.5688)),
    ];
    let source = Arc::new(SimulatedSource::new(route, Duration::from_secs(2)));

    let config = MonitorConfig {
        stillness: StillnessConfig {
            threshold_meters: 10.0,
            // Shortened so the demo does not take a full minute to alert.
            still_duration: Duration::from_secs(15),
        },
        first_fix_timeout: Duration::from_secs(10),
    };
    let handle = TripMonitor::spawn(source, config);

    // Stand-ins for the real outward transports.
    let mut alerts = handle.alerts();
    tokio::spawn(async move {
        while let Ok(alert) = alerts.recv().await {
            tracing::info!("Contact channel:\n{}", alert.share_text());
        }
    });

    let mut status = handle.status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            tracing::info!("Status [{:?}]: {}", current.level, current.message);
        }
    });

    handle.start_trip().await?;
    handle.start_checkin(0.5).await?;

    // Walk the route, stand still at the end, miss the check-in.
    tokio::time::sleep(Duration::from_secs(40)).await;

    handle.share_location().await?;
    handle.trigger_sos().await?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.stop_trip().await?;

    tracing::info!("Demo finished");
    Ok(())
}
