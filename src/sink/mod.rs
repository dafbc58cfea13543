//! Output sinks for simulated forecast records.
//!
//! Every sink receives the full batch for a snapshot. Sinks are independent:
//! one failing write is logged and the remaining sinks still run, so a full
//! disk never takes the console output down with it.

pub mod console;
pub mod csv;
#[cfg(feature = "db")]
pub mod db;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::SimulatedRecord;
use crate::error::SinkError;

#[async_trait]
pub trait RecordSink: Send {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Persist one batch of records.
    async fn write(&mut self, records: &[SimulatedRecord]) -> Result<(), SinkError>;
}

/// Fans one batch out to every configured sink.
#[derive(Default)]
pub struct SinkDispatcher {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl SinkDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Write the batch to every sink, logging failures instead of returning
    /// them. Returns how many sinks succeeded.
    pub async fn dispatch(&mut self, records: &[SimulatedRecord]) -> usize {
        let mut written = 0;
        for sink in &mut self.sinks {
            match sink.write(records).await {
                Ok(()) => written += 1,
                Err(error) => {
                    warn!(sink = sink.name(), %error, "sink write failed");
                }
            }
        }
        written
    }
}
