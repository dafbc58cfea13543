//! Postgres sink, available behind the `db` feature.
//!
//! Rows upsert on the epoch column, so re-publishing an overlapping horizon
//! updates the overlap instead of duplicating it.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::SimulatedRecord;
use crate::error::{ConfigError, SinkError};

use super::RecordSink;

pub struct DbSink {
    pool: PgPool,
    table: String,
}

impl DbSink {
    /// The table name is interpolated into SQL text, so it must be a plain
    /// identifier rather than a bound parameter.
    pub fn new(pool: PgPool, table: &str) -> Result<Self, ConfigError> {
        if !is_plain_identifier(table) {
            return Err(ConfigError::Invalid {
                field: "output.db.table",
                reason: format!("{table:?} is not a plain SQL identifier"),
            });
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub async fn ensure_table(&self) -> Result<(), SinkError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                forecast_time TIMESTAMP NOT NULL, \
                epoch_s BIGINT PRIMARY KEY, \
                irradiance_wh_m2 DOUBLE PRECISION NOT NULL, \
                temperature_c DOUBLE PRECISION NOT NULL, \
                pressure_hpa DOUBLE PRECISION NOT NULL, \
                wind_speed_ms DOUBLE PRECISION NOT NULL, \
                temperature_adjusted_c DOUBLE PRECISION NOT NULL, \
                simplified_energy_wh DOUBLE PRECISION NOT NULL, \
                ac_power_w DOUBLE PRECISION NOT NULL, \
                dc_power_w DOUBLE PRECISION NOT NULL, \
                cell_temperature_c DOUBLE PRECISION NOT NULL\
            )",
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl RecordSink for DbSink {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn write(&mut self, records: &[SimulatedRecord]) -> Result<(), SinkError> {
        let sql = format!(
            "INSERT INTO {} (\
                forecast_time, epoch_s, irradiance_wh_m2, temperature_c, \
                pressure_hpa, wind_speed_ms, temperature_adjusted_c, \
                simplified_energy_wh, ac_power_w, dc_power_w, cell_temperature_c\
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
            ON CONFLICT (epoch_s) DO UPDATE SET \
                forecast_time = EXCLUDED.forecast_time, \
                irradiance_wh_m2 = EXCLUDED.irradiance_wh_m2, \
                temperature_c = EXCLUDED.temperature_c, \
                pressure_hpa = EXCLUDED.pressure_hpa, \
                wind_speed_ms = EXCLUDED.wind_speed_ms, \
                temperature_adjusted_c = EXCLUDED.temperature_adjusted_c, \
                simplified_energy_wh = EXCLUDED.simplified_energy_wh, \
                ac_power_w = EXCLUDED.ac_power_w, \
                dc_power_w = EXCLUDED.dc_power_w, \
                cell_temperature_c = EXCLUDED.cell_temperature_c",
            self.table
        );

        let mut tx = self.pool.begin().await?;
        for record in records {
            let row = record.flatten();
            sqlx::query(&sql)
                .bind(record.timestamp().naive_utc())
                .bind(row.epoch_s)
                .bind(row.irradiance_wh_m2)
                .bind(row.temperature_c)
                .bind(row.pressure_hpa)
                .bind(row.wind_speed_ms)
                .bind(row.temperature_adjusted_c)
                .bind(row.simplified_energy_wh)
                .bind(row.ac_power_w)
                .bind(row.dc_power_w)
                .bind(row.cell_temperature_c)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(table = %self.table, rows = records.len(), "database upsert complete");
        Ok(())
    }
}
