pub mod record;
pub mod system;
pub mod weather;

pub use record::{FlatRecord, SimulatedRecord};
pub use system::SystemDescription;
pub use weather::{Fingerprint, ForecastSnapshot, WeatherObservation};
