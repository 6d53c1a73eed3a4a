use crate::{
    Config,
    error::{GeolocationError, SearchError},
    model::{Coordinate, ForecastRecord},
    provider::{nominatim::NominatimGeocoder, openmeteo::OpenMeteoForecast},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod nominatim;
pub mod openmeteo;

/// Resolves free-text place names to coordinates.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    /// `Ok(None)` means the service answered but had no match.
    async fn resolve(&self, name: &str) -> Result<Option<Coordinate>, SearchError>;
}

/// Fetches today's hourly forecast for a coordinate.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(&self, coord: Coordinate) -> Result<Vec<ForecastRecord>, SearchError>;
}

/// The host's "where am I" capability.
#[async_trait]
pub trait Geolocation: Send + Sync + Debug {
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Geolocation for hosts that have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocation for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Geolocation that always reports one fixed position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl Geolocation for FixedPosition {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// Shared HTTP client honouring the configured timeout and user agent.
pub fn http_client(config: &Config) -> Result<Client, SearchError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()?;

    Ok(client)
}

/// The concrete services a search needs.
#[derive(Debug, Clone)]
pub struct Services {
    pub geocoder: Arc<dyn GeocodeProvider>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub geolocation: Arc<dyn Geolocation>,
}

impl Services {
    /// Wire the HTTP providers from config.
    ///
    /// Geolocation comes from the configured home position; without one the
    /// capability reports itself unsupported.
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        let http = http_client(config)?;

        let geolocation: Arc<dyn Geolocation> = match config.home_coordinate()? {
            Some(coord) => Arc::new(FixedPosition(coord)),
            None => Arc::new(NoGeolocation),
        };

        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(config.geocode_url.clone(), http.clone())),
            forecast: Arc::new(OpenMeteoForecast::new(config.forecast_url.clone(), http)),
            geolocation,
        })
    }
}

/// Trim a response body for logging.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
