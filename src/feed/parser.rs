//! MOSMIX KML timeseries parser.
//!
//! The document declares one shared axis of forecast timestamps, then one
//! `Forecast` element per parameter code whose whitespace-separated value
//! list aligns positionally with that axis. Upstream marks missing data with
//! a `-` placeholder; a timestamp missing any of the four required
//! parameters is dropped from the snapshot instead of defaulted.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Fingerprint, ForecastSnapshot, WeatherObservation};
use crate::error::ParseError;

/// Global irradiance, upstream unit kJ/m² per hour.
pub const ELEMENT_IRRADIANCE: &str = "Rad1h";
/// Temperature 2 m above ground, upstream unit Kelvin.
pub const ELEMENT_TEMPERATURE: &str = "TTT";
/// Surface pressure (reduced), upstream unit Pa.
pub const ELEMENT_PRESSURE: &str = "PPPP";
/// Wind speed, m/s.
pub const ELEMENT_WIND_SPEED: &str = "FF";

const KJ_PER_M2_TO_WH_PER_M2: f64 = 0.277_778;
const KELVIN_OFFSET: f64 = 273.15;
const PA_PER_HPA: f64 = 100.0;

/// Parse a decompressed document into a validated snapshot.
///
/// Fails on schema violations: missing axis, non-monotonic axis, wrong
/// station, a required parameter absent or misaligned. Individual bad value
/// tokens are not failures; they exclude their timestamp.
pub fn parse(
    kml: &str,
    station: &str,
    fetched_at: DateTime<Utc>,
    fingerprint: Fingerprint,
) -> Result<ForecastSnapshot, ParseError> {
    let document: Kml = serde_xml_rs::from_str(kml)?;

    let axis = parse_time_axis(&document)?;

    let placemark = document
        .document
        .placemarks
        .iter()
        .find(|p| p.name == station)
        .ok_or_else(|| ParseError::StationMismatch(station.to_string()))?;

    let irradiance = parameter_tokens(placemark, ELEMENT_IRRADIANCE, axis.len())?;
    let temperature = parameter_tokens(placemark, ELEMENT_TEMPERATURE, axis.len())?;
    let pressure = parameter_tokens(placemark, ELEMENT_PRESSURE, axis.len())?;
    let wind = parameter_tokens(placemark, ELEMENT_WIND_SPEED, axis.len())?;

    let mut observations = Vec::with_capacity(axis.len());
    for (i, &timestamp) in axis.iter().enumerate() {
        let slot = (
            numeric(irradiance[i]),
            numeric(temperature[i]),
            numeric(pressure[i]),
            numeric(wind[i]),
        );
        match slot {
            (Some(rad_kj), Some(ttt_k), Some(pppp_pa), Some(ff_ms)) => {
                observations.push(WeatherObservation {
                    timestamp,
                    irradiance_wh_m2: rad_kj * KJ_PER_M2_TO_WH_PER_M2,
                    temperature_c: ttt_k - KELVIN_OFFSET,
                    pressure_hpa: pppp_pa / PA_PER_HPA,
                    wind_speed_ms: ff_ms,
                });
            }
            _ => {
                debug!(%timestamp, "dropping timestamp with missing parameter value");
            }
        }
    }

    Ok(ForecastSnapshot::new(fetched_at, fingerprint, observations))
}

fn parse_time_axis(document: &Kml) -> Result<Vec<DateTime<Utc>>, ParseError> {
    let steps = &document
        .document
        .extended_data
        .product_definition
        .forecast_time_steps
        .time_steps;
    if steps.is_empty() {
        return Err(ParseError::MissingTimeAxis);
    }

    let mut axis = Vec::with_capacity(steps.len());
    for raw in steps {
        let timestamp = DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|_| ParseError::BadTimestamp(raw.clone()))?
            .with_timezone(&Utc);
        if let Some(&previous) = axis.last() {
            if timestamp <= previous {
                return Err(ParseError::NonMonotonicAxis(timestamp));
            }
        }
        axis.push(timestamp);
    }
    Ok(axis)
}

/// The value list for one parameter code, split into positional tokens and
/// checked against the axis length.
fn parameter_tokens<'a>(
    placemark: &'a Placemark,
    code: &'static str,
    axis_len: usize,
) -> Result<Vec<&'a str>, ParseError> {
    let element = placemark
        .extended_data
        .forecasts
        .iter()
        .find(|f| f.element_name == code)
        .ok_or(ParseError::MissingParameter { code })?;

    let tokens: Vec<&str> = element.value.split_whitespace().collect();
    if tokens.len() != axis_len {
        return Err(ParseError::AxisMismatch {
            code,
            values: tokens.len(),
            axis: axis_len,
        });
    }
    Ok(tokens)
}

/// A numeric token, or `None` for the upstream placeholder and anything else
/// that does not parse.
fn numeric(token: &str) -> Option<f64> {
    token.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Document shape. serde-xml-rs matches on local names, so the kml:/dwd:
// namespace prefixes need no special handling here.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Kml {
    #[serde(rename = "Document")]
    document: Document,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "ExtendedData")]
    extended_data: DocumentData,
    #[serde(rename = "Placemark", default)]
    placemarks: Vec<Placemark>,
}

#[derive(Debug, Deserialize)]
struct DocumentData {
    #[serde(rename = "ProductDefinition")]
    product_definition: ProductDefinition,
}

#[derive(Debug, Deserialize)]
struct ProductDefinition {
    #[serde(rename = "ForecastTimeSteps")]
    forecast_time_steps: ForecastTimeSteps,
}

#[derive(Debug, Deserialize)]
struct ForecastTimeSteps {
    #[serde(rename = "TimeStep", default)]
    time_steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Placemark {
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "ExtendedData")]
    extended_data: PlacemarkData,
}

#[derive(Debug, Deserialize)]
struct PlacemarkData {
    #[serde(rename = "Forecast", default)]
    forecasts: Vec<ForecastElement>,
}

#[derive(Debug, Deserialize)]
struct ForecastElement {
    #[serde(rename = "elementName")]
    element_name: String,
    #[serde(rename = "value")]
    value: String,
}
