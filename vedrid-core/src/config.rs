use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::{error::SearchError, model::{Coordinate, Location}};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Map widget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 10,
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

/// Position reported as "my location" by hosts without a real geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    pub lat: f64,
    pub lng: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// user_agent = "vedrid/0.1 (me@example.com)"
///
/// [home]
/// lat = 64.1355
/// lng = -21.8954
///
/// [[locations]]
/// title = "Ísafjörður"
/// lat = 66.0749
/// lng = -23.1240
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast_url: String,
    pub geocode_url: String,
    /// Nominatim refuses requests without an identifying user agent.
    pub user_agent: String,
    pub timeout_secs: u64,
    pub map: MapConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeConfig>,
    pub locations: Vec<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            user_agent: concat!("vedrid/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            map: MapConfig::default(),
            home: None,
            locations: Location::predefined(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.locations.is_empty() {
            return Err(anyhow!(
                "Config file {} lists no locations.\n\
                 Hint: remove the `locations` key to use the built-in list.",
                path.display()
            ));
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("is", "vedrid", "vedrid")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_home(&mut self, coord: Coordinate) {
        self.home = Some(HomeConfig { lat: coord.lat(), lng: coord.lng() });
    }

    /// The configured home position, validated.
    pub fn home_coordinate(&self) -> Result<Option<Coordinate>, SearchError> {
        self.home.map(|h| Coordinate::new(h.lat, h.lng)).transpose()
    }

    /// Find a configured location by title, ignoring case.
    pub fn location(&self, title: &str) -> Option<&Location> {
        let wanted = title.trim().to_lowercase();
        self.locations.iter().find(|l| l.title.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("vedrid-config-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn default_lists_predefined_locations() {
        let cfg = Config::default();
        assert_eq!(cfg.locations, Location::predefined());
        assert_eq!(cfg.map.zoom, 10);
        assert_eq!(cfg.home_coordinate().unwrap(), None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            user_agent = "test-agent"

            [home]
            lat = 64.0
            lng = -22.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.user_agent, "test-agent");
        assert_eq!(cfg.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.locations.len(), 6);
        assert_eq!(cfg.home_coordinate().unwrap(), Some(Coordinate::new(64.0, -22.0).unwrap()));
    }

    #[test]
    fn invalid_home_is_reported() {
        let mut cfg = Config::default();
        cfg.home = Some(HomeConfig { lat: 123.0, lng: 0.0 });
        assert!(matches!(
            cfg.home_coordinate(),
            Err(SearchError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_custom_locations_and_sentinel() {
        let path = temp_path("roundtrip");
        let mut cfg = Config::default();
        cfg.locations.push(Location::at("Ísafjörður", Coordinate::new(66.0749, -23.124).unwrap()).unwrap());
        cfg.set_home(Coordinate::new(64.1, -21.9).unwrap());

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, cfg);
        assert!(loaded.locations[0].is_my_location());
    }

    #[test]
    fn missing_file_means_defaults() {
        let loaded = Config::load_from(&temp_path("missing")).expect("defaults");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn empty_location_list_is_rejected() {
        let path = temp_path("empty");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "locations = []\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let _ = fs::remove_dir_all(path.parent().unwrap());
        assert!(err.to_string().contains("lists no locations"));
    }

    #[test]
    fn location_lookup_ignores_case() {
        let cfg = Config::default();
        assert_eq!(cfg.location("reykjavík").map(|l| l.title.as_str()), Some("Reykjavík"));
        assert!(cfg.location("Atlantis").is_none());
    }
}
