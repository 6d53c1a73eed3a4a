use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::SearchError, model::Coordinate, provider::truncate_body};

use super::GeocodeProvider;

/// Place search against an OpenStreetMap Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }
}

/// Nominatim reports coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    async fn resolve(&self, name: &str) -> Result<Option<Coordinate>, SearchError> {
        let url = format!("{}/search", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", name), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "nominatim search failed");
            return Err(SearchError::GeocodeFailed { status });
        }

        let places: Vec<NmPlace> = serde_json::from_str(&body).map_err(|e| {
            SearchError::Malformed(format!("nominatim: {e}"))
        })?;

        let Some(place) = places.first() else {
            tracing::debug!(name, "nominatim returned no match");
            return Ok(None);
        };

        let lat = parse_degrees(&place.lat)?;
        let lng = parse_degrees(&place.lon)?;

        Coordinate::new(lat, lng).map(Some)
    }
}

fn parse_degrees(raw: &str) -> Result<f64, SearchError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SearchError::Malformed(format!("nominatim: '{raw}' is not a number")))
}
