//! Forecast Scheduler
//!
//! Runs the pressure-trend forecast on a fixed interval and exposes the
//! same computation on demand. Both paths share one classification
//! routine in [`ForecastEngine`].

mod clock;
mod config;
mod engine;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, MAX_HORIZON_HOURS};
pub use engine::{ForecastEngine, ForecastError, ForecastResult};
pub use scheduler::ForecastScheduler;
