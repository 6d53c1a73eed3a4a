//! Map widget adapter.
//!
//! The adapter owns at most one mounted map. Showing a new coordinate always
//! destroys the previous instance before a fresh one is mounted; instances
//! are never updated in place.

use tokio::sync::mpsc;

use crate::{config::MapConfig, model::Coordinate};

/// A raw click position as reported by the widget. Not yet validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapClick {
    pub lat: f64,
    pub lng: f64,
}

pub type MapClickReceiver = mpsc::UnboundedReceiver<MapClick>;

/// Handed to each mounted map so it can report clicks back.
#[derive(Debug, Clone)]
pub struct MapClickSender(mpsc::UnboundedSender<MapClick>);

impl MapClickSender {
    /// Returns `false` once nothing listens for clicks anymore.
    pub fn click(&self, lat: f64, lng: f64) -> bool {
        self.0.send(MapClick { lat, lng }).is_ok()
    }
}

pub fn click_channel() -> (MapClickSender, MapClickReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MapClickSender(tx), rx)
}

/// Everything the widget library needs to draw one map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSpec {
    pub center: Coordinate,
    pub marker: Coordinate,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

/// A live map created by a [`MapLibrary`].
pub trait MapInstance: Send {
    /// Release layers, handlers and the element the map was mounted into.
    fn destroy(&mut self);
}

/// The external map widget library.
pub trait MapLibrary: Send + Sync {
    fn mount(&self, spec: &MapSpec, on_click: MapClickSender) -> anyhow::Result<Box<dyn MapInstance>>;
}

/// A mounted instance; dropping it tears the map down.
struct MountedMap {
    instance: Box<dyn MapInstance>,
    center: Coordinate,
}

impl Drop for MountedMap {
    fn drop(&mut self) {
        tracing::debug!(center = %self.center, "tearing down map");
        self.instance.destroy();
    }
}

pub struct MapAdapter {
    library: Box<dyn MapLibrary>,
    config: MapConfig,
    clicks: MapClickSender,
    current: Option<MountedMap>,
}

impl std::fmt::Debug for MapAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapAdapter")
            .field("config", &self.config)
            .field("mounted", &self.center())
            .finish()
    }
}

impl MapAdapter {
    pub fn new(library: Box<dyn MapLibrary>, config: MapConfig, clicks: MapClickSender) -> Self {
        Self { library, config, clicks, current: None }
    }

    /// Replace whatever map is mounted with a fresh one centered on `coord`.
    ///
    /// A mount failure leaves no map mounted.
    pub fn show(&mut self, coord: Coordinate) -> anyhow::Result<()> {
        self.clear();

        let spec = MapSpec {
            center: coord,
            marker: coord,
            zoom: self.config.zoom,
            tile_url: self.config.tile_url.clone(),
            attribution: self.config.attribution.clone(),
        };

        let instance = self.library.mount(&spec, self.clicks.clone())?;
        tracing::debug!(center = %coord, zoom = spec.zoom, "map mounted");
        self.current = Some(MountedMap { instance, center: coord });

        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Center of the mounted map, if any.
    pub fn center(&self) -> Option<Coordinate> {
        self.current.as_ref().map(|m| m.center)
    }
}
