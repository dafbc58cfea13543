//! Human-readable table output on stdout.

use async_trait::async_trait;

use crate::domain::SimulatedRecord;
use crate::error::SinkError;

use super::RecordSink;

pub struct ConsoleSink;

impl ConsoleSink {
    fn render(records: &[SimulatedRecord]) -> String {
        let mut out = String::new();

        out.push_str("forecast weather\n");
        out.push_str(
            "time (UTC)               ghi Wh/m2  temp C   press hPa  wind m/s\n",
        );
        for record in records {
            let o = &record.observation;
            out.push_str(&format!(
                "{}  {:>9.1}  {:>6.1}  {:>9.1}  {:>8.1}\n",
                o.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                o.irradiance_wh_m2,
                o.temperature_c,
                o.pressure_hpa,
                o.wind_speed_ms,
            ));
        }

        out.push_str("\nsimulated output\n");
        out.push_str(
            "time (UTC)               ac W      dc W      cell C  simple Wh\n",
        );
        for record in records {
            out.push_str(&format!(
                "{}  {:>8.1}  {:>8.1}  {:>6.1}  {:>9.1}\n",
                record.observation.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.ac_power_w,
                record.dc_power_w,
                record.cell_temperature_c,
                record.simplified_energy_wh,
            ));
        }

        out
    }
}

#[async_trait]
impl RecordSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn write(&mut self, records: &[SimulatedRecord]) -> Result<(), SinkError> {
        print!("{}", Self::render(records));
        Ok(())
    }
}
