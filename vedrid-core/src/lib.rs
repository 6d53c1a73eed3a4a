//! Core library for the `vedrid` weather lookup.
//!
//! This crate defines:
//! - Shared domain models (locations, coordinates, forecast records)
//! - Geocoding and forecast providers behind async traits
//! - A declarative view tree and the map widget adapter
//! - The search orchestrator that wires user actions to all of the above
//! - Configuration handling
//!
//! It is used by `vedrid-cli`, but any host that can implement
//! [`view::Surface`] and [`map::MapLibrary`] can drive it.

pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod view;

pub use config::{Config, MapConfig};
pub use error::{GeolocationError, SearchError};
pub use model::{Coordinate, ForecastRecord, Location, SearchResult};
pub use orchestrator::{Orchestrator, Outcome};
pub use provider::{ForecastProvider, GeocodeProvider, Geolocation, Services};
