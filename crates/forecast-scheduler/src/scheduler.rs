//! Periodic Forecast Scheduler

use crate::engine::{ForecastEngine, ForecastError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use trend_classifier::{PressureForecaster, Zambretti};
use weather_store::{ForecastLog, SampleSource};

/// Drives [`ForecastEngine::run_periodic_cycle`] on a fixed interval.
///
/// Each tick is an independent attempt: a failed or skipped cycle is not
/// retried, the next tick simply tries again.
pub struct ForecastScheduler<S, F, A = Zambretti> {
    engine: Arc<ForecastEngine<S, F, A>>,
    startup_delay: Duration,
    interval: Duration,
}

impl<S, F, A> ForecastScheduler<S, F, A>
where
    S: SampleSource + 'static,
    F: ForecastLog + 'static,
    A: PressureForecaster + 'static,
{
    /// Create a scheduler using the engine's configured delay and interval
    pub fn new(engine: Arc<ForecastEngine<S, F, A>>) -> Self {
        let startup_delay = engine.config().startup_delay();
        let interval = engine.config().interval().max(Duration::from_secs(1));
        Self {
            engine,
            startup_delay,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    /// Run until `shutdown` turns true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting forecast scheduler: first run in {:?}, then every {:?}",
            self.startup_delay, self.interval
        );

        tokio::select! {
            _ = tokio::time::sleep(self.startup_delay) => {}
            _ = shutdown_requested(&mut shutdown) => {
                info!("Forecast scheduler stopped before first cycle");
                return;
            }
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        info!("Forecast scheduler stopped");
    }

    /// Spawn [`Self::run`] onto the runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    async fn tick(&self) {
        match self.engine.run_periodic_cycle().await {
            Ok(record) => {
                info!("Stored forecast #{}: {}", record.id, record.forecast);
            }
            Err(ForecastError::InsufficientData {
                required,
                available,
            }) => {
                debug!(
                    "Skipping forecast cycle: {} of {} required samples",
                    available, required
                );
            }
            Err(ForecastError::Storage(e)) => {
                warn!("Forecast cycle failed, waiting for next tick: {}", e);
            }
        }
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also ends the scheduler.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
