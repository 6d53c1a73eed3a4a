use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Title of the predefined entry that resolves to the user's own position.
pub const MY_LOCATION_TITLE: &str = "Mín staðsetning";

/// Title given to a position resolved through geolocation.
pub const CURRENT_POSITION_TITLE: &str = "Núverandi staðsetning";

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, SearchError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if !valid {
            return Err(SearchError::InvalidCoordinate { lat, lng });
        }

        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// A named place the user can search against.
///
/// `coord` is `None` only for the "my location" sentinel, which gets its
/// coordinates from the geolocation capability at search time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct Location {
    pub title: String,
    pub coord: Option<Coordinate>,
}

/// On-disk shape of a [`Location`]: `lat`/`lng` are both present or both absent.
#[derive(Serialize, Deserialize)]
struct RawLocation {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
}

impl TryFrom<RawLocation> for Location {
    type Error = SearchError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let coord = match (raw.lat, raw.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
            (None, None) => None,
            _ => {
                return Err(SearchError::Malformed(format!(
                    "location '{}' needs both lat and lng",
                    raw.title
                )));
            }
        };

        Location::new(raw.title, coord)
            .ok_or_else(|| SearchError::Malformed("location title is empty".to_string()))
    }
}

impl From<Location> for RawLocation {
    fn from(location: Location) -> Self {
        Self {
            title: location.title,
            lat: location.coord.map(|c| c.lat),
            lng: location.coord.map(|c| c.lng),
        }
    }
}

impl Location {
    /// Build a location with a trimmed, non-empty title.
    pub fn new(title: impl Into<String>, coord: Option<Coordinate>) -> Option<Self> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self { title: title.to_string(), coord })
    }

    pub fn at(title: impl Into<String>, coord: Coordinate) -> Option<Self> {
        Self::new(title, Some(coord))
    }

    pub fn my_location() -> Self {
        Self { title: MY_LOCATION_TITLE.to_string(), coord: None }
    }

    pub fn is_my_location(&self) -> bool {
        self.coord.is_none()
    }

    /// The locations offered as buttons when nothing else is configured.
    pub fn predefined() -> Vec<Location> {
        const PLACES: [(&str, f64, f64); 5] = [
            ("Reykjavík", 64.1355, -21.8954),
            ("Akureyri", 65.6835, -18.0878),
            ("New York", 40.7128, -74.006),
            ("Tokyo", 35.6764, 139.65),
            ("Sydney", -33.8688, 151.2093),
        ];

        std::iter::once(Self::my_location())
            .chain(PLACES.iter().map(|&(title, lat, lng)| Self {
                title: title.to_string(),
                coord: Some(Coordinate { lat, lng }),
            }))
            .collect()
    }
}

/// One hour of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Local timestamp as reported by the service, e.g. `2024-03-01T13:00`.
    pub time: String,
    /// °C
    pub temperature: f64,
    /// mm
    pub precipitation: f64,
    /// m/s
    pub windspeed: f64,
    /// %
    pub humidity: f64,
}

/// What the output area currently shows for one search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Loading,
    Error(String),
    Success(Location, Vec<ForecastRecord>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert!(matches!(
            Coordinate::new(90.5, 0.0),
            Err(SearchError::InvalidCoordinate { .. })
        ));
        assert!(Coordinate::new(0.0, -180.01).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn coordinate_display_uses_four_decimals() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        assert_eq!(c.to_string(), "(10.0000, 20.0000)");
    }

    #[test]
    fn location_title_is_trimmed_and_required() {
        assert!(Location::new("   ", None).is_none());
        let loc = Location::new("  Vík ", None).unwrap();
        assert_eq!(loc.title, "Vík");
    }

    #[test]
    fn predefined_starts_with_my_location_sentinel() {
        let locations = Location::predefined();
        assert_eq!(locations.len(), 6);
        assert!(locations[0].is_my_location());
        assert_eq!(locations[0].title, MY_LOCATION_TITLE);
        assert!(locations[1..].iter().all(|l| l.coord.is_some()));
        assert_eq!(
            locations[1].coord,
            Some(Coordinate::new(64.1355, -21.8954).unwrap())
        );
    }

    #[test]
    fn location_rejects_invalid_coordinates_when_deserialized() {
        let err = serde_json::from_str::<Location>(r#"{"title":"X","lat":91.0,"lng":0.0}"#);
        assert!(err.is_err());

        let loc: Location = serde_json::from_str(r#"{"title":"X"}"#).unwrap();
        assert!(loc.is_my_location());

        assert!(serde_json::from_str::<Location>(r#"{"title":"X","lat":1.0}"#).is_err());
        assert!(serde_json::from_str::<Location>(r#"{"title":" ","lat":1.0,"lng":2.0}"#).is_err());
    }
}
