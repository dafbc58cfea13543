//! CSV file sink.
//!
//! Each batch rewrites the file from scratch: the forecast horizon is the
//! whole file, so appending would duplicate timestamps across snapshots.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::SimulatedRecord;
use crate::error::SinkError;

use super::RecordSink;

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn write(&mut self, records: &[SimulatedRecord]) -> Result<(), SinkError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(record.flatten())?;
        }
        writer.flush()?;
        debug!(path = %self.path.display(), rows = records.len(), "csv file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::sample_records;

    #[tokio::test]
    async fn writes_header_and_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let mut sink = CsvSink::new(&path);

        sink.write(&sample_records()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("forecast_time,epoch_s,irradiance_wh_m2"));
        assert!(header.ends_with("cell_temperature_c"));
        assert_eq!(header.split(',').count(), 11);

        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-06-21 12:00:00.000,1718971200,"));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn rewrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let mut sink = CsvSink::new(&path);

        sink.write(&sample_records()).await.unwrap();
        sink.write(&sample_records()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // Header plus one data row, not two.
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn unwritable_path_reports_an_error() {
        let mut sink = CsvSink::new("/nonexistent-dir/forecast.csv");
        assert!(sink.write(&sample_records()).await.is_err());
    }
}
