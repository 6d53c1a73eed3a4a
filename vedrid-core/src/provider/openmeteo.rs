use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::SearchError,
    model::{Coordinate, ForecastRecord},
    provider::truncate_body,
};

use super::ForecastProvider;

const HOURLY_FIELDS: &str = "temperature_2m,precipitation,wind_speed_10m,relative_humidity_2m";

/// Hourly forecast from the Open-Meteo API.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    base_url: String,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    async fn fetch_day(
        &self,
        coord: Coordinate,
        day: NaiveDate,
    ) -> Result<Vec<ForecastRecord>, SearchError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let day = day.format("%Y-%m-%d").to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coord.lat().to_string()),
                ("longitude", coord.lng().to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("timezone", "GMT".to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "open-meteo forecast failed");
            let reason = serde_json::from_str::<OmError>(&body).ok().map(|e| e.reason);
            return Err(SearchError::ForecastFailed { status, reason });
        }

        let parsed: OmResponse = serde_json::from_str(&body)
            .map_err(|e| SearchError::Malformed(format!("open-meteo: {e}")))?;

        parsed.hourly.into_records()
    }
}

#[derive(Debug, Deserialize)]
struct OmError {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    hourly: OmHourly,
}

/// Parallel arrays, one slot per hour.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
}

impl OmHourly {
    fn into_records(self) -> Result<Vec<ForecastRecord>, SearchError> {
        let n = self.time.len();
        let lengths = [
            self.temperature_2m.len(),
            self.precipitation.len(),
            self.wind_speed_10m.len(),
            self.relative_humidity_2m.len(),
        ];

        if lengths.iter().any(|&len| len != n) {
            return Err(SearchError::Malformed(format!(
                "open-meteo: hourly arrays differ in length (time {n}, values {lengths:?})"
            )));
        }

        let records = self
            .time
            .into_iter()
            .zip(self.temperature_2m)
            .zip(self.precipitation)
            .zip(self.wind_speed_10m)
            .zip(self.relative_humidity_2m)
            .map(|((((time, temperature), precipitation), windspeed), humidity)| ForecastRecord {
                time,
                // Open-Meteo sends null for slots it has no model output for.
                temperature: temperature.unwrap_or(f64::NAN),
                precipitation: precipitation.unwrap_or(f64::NAN),
                windspeed: windspeed.unwrap_or(f64::NAN),
                humidity: humidity.unwrap_or(f64::NAN),
            })
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoForecast {
    async fn fetch(&self, coord: Coordinate) -> Result<Vec<ForecastRecord>, SearchError> {
        let today = Utc::now().date_naive();
        self.fetch_day(coord, today).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_arrays_are_zipped_in_order() {
        let hourly: OmHourly = serde_json::from_str(
            r#"{
                "time": ["2024-03-01T00:00", "2024-03-01T01:00"],
                "temperature_2m": [1.5, 2.0],
                "precipitation": [0.0, 0.4],
                "wind_speed_10m": [3.2, 4.1],
                "relative_humidity_2m": [80, 85]
            }"#,
        )
        .unwrap();

        let records = hourly.into_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, "2024-03-01T00:00");
        assert_eq!(records[1].precipitation, 0.4);
        assert_eq!(records[1].humidity, 85.0);
    }

    #[test]
    fn mismatched_lengths_are_malformed() {
        let hourly = OmHourly {
            time: vec!["2024-03-01T00:00".into()],
            temperature_2m: vec![Some(1.0), Some(2.0)],
            precipitation: vec![Some(0.0)],
            wind_speed_10m: vec![Some(1.0)],
            relative_humidity_2m: vec![Some(50.0)],
        };

        assert!(matches!(hourly.into_records(), Err(SearchError::Malformed(_))));
    }

    #[test]
    fn missing_hourly_arrays_mean_no_records() {
        let parsed: OmResponse = serde_json::from_str(r#"{"hourly": {}}"#).unwrap();
        assert!(parsed.hourly.into_records().unwrap().is_empty());
    }
}
