pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod model;
pub mod scheduler;
pub mod sim;
pub mod sink;
pub mod telemetry;

pub use config::Config;
pub use domain::{ForecastSnapshot, SimulatedRecord, SystemDescription, WeatherObservation};
pub use model::{PowerEstimate, PowerModel};
pub use scheduler::{PollOutcome, RefreshScheduler, RunMode, SnapshotSlot};
