//! Search orchestration: one entry point per user action.
//!
//! Every search bumps a generation counter and shows the loading view. When
//! its network calls complete, the result is rendered only if no newer search
//! has started in the meantime; otherwise it is dropped and the caller gets
//! [`Outcome::Superseded`]. The counter, output surface and map live behind
//! one lock so the check and the render cannot interleave with another search.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::{
    config::MapConfig,
    error::SearchError,
    map::{MapAdapter, MapClickReceiver, MapLibrary, click_channel},
    model::{CURRENT_POSITION_TITLE, Coordinate, ForecastRecord, Location, SearchResult},
    provider::Services,
    view::{self, Surface},
};

/// What a search did to the output area.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The search finished and its result is what the user now sees.
    Rendered(SearchResult),
    /// A newer search started first; this result was discarded.
    Superseded,
    /// Nothing to search for; the output area was left alone.
    Ignored,
}

type Found = Result<(Location, Vec<ForecastRecord>), SearchError>;

struct Display {
    generation: u64,
    surface: Arc<dyn Surface>,
    map: MapAdapter,
}

pub struct Orchestrator {
    services: Services,
    display: Mutex<Display>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display = self.display.lock();
        f.debug_struct("Orchestrator")
            .field("services", &self.services)
            .field("generation", &display.generation)
            .field("map", &display.map)
            .finish()
    }
}

impl Orchestrator {
    /// Build an orchestrator drawing into `surface` and `library`.
    ///
    /// The returned receiver yields clicks on the mounted map; feed it to
    /// [`Orchestrator::run_map_clicks`] or drain it yourself.
    pub fn new(
        services: Services,
        surface: Arc<dyn Surface>,
        library: Box<dyn MapLibrary>,
        map_config: MapConfig,
    ) -> (Self, MapClickReceiver) {
        let (clicks, receiver) = click_channel();
        let display = Display {
            generation: 0,
            surface,
            map: MapAdapter::new(library, map_config, clicks),
        };

        (Self { services, display: Mutex::new(display) }, receiver)
    }

    /// Search one of the predefined locations.
    ///
    /// The "my location" sentinel has no coordinates and is handed over to
    /// [`Orchestrator::search_my_location`].
    pub async fn search_predefined(&self, location: &Location) -> Outcome {
        let Some(coord) = location.coord else {
            return self.search_my_location().await;
        };

        let generation = self.begin(&location.title);
        let found = self.forecast_for(location.clone(), coord).await;
        self.finish(generation, found)
    }

    pub async fn search_my_location(&self) -> Outcome {
        let generation = self.begin(CURRENT_POSITION_TITLE);
        let found = self.locate_and_forecast().await;
        self.finish(generation, found)
    }

    /// Geocode free text, then search there. Blank input is ignored.
    pub async fn search_by_name(&self, raw: &str) -> Outcome {
        let name = raw.trim();
        if name.is_empty() {
            return Outcome::Ignored;
        }

        let generation = self.begin(name);
        let found = self.geocode_and_forecast(name).await;
        self.finish(generation, found)
    }

    pub async fn on_map_clicked(&self, lat: f64, lng: f64) -> Outcome {
        let generation = self.begin("map click");

        let found = match Coordinate::new(lat, lng) {
            Ok(coord) => {
                let location = Location {
                    title: format!("Valin staðsetning {coord}"),
                    coord: Some(coord),
                };
                self.forecast_for(location, coord).await
            }
            Err(e) => Err(e),
        };

        self.finish(generation, found)
    }

    /// Handle map clicks until the orchestrator is dropped. Each click runs as
    /// its own task, so a slow forecast does not hold up the next click.
    ///
    /// The returned future only keeps a weak handle: the orchestrator owns a
    /// click sender, and the channel closes once the last outside `Arc` goes.
    pub fn run_map_clicks(
        self: Arc<Self>,
        mut clicks: MapClickReceiver,
    ) -> impl Future<Output = ()> + Send + 'static {
        let weak: Weak<Self> = Arc::downgrade(&self);
        drop(self);

        async move {
            while let Some(click) = clicks.recv().await {
                let Some(this) = weak.upgrade() else {
                    break;
                };
                tokio::spawn(async move {
                    this.on_map_clicked(click.lat, click.lng).await;
                });
            }

            tracing::debug!("map click channel closed");
        }
    }

    /// Center of the currently mounted map.
    pub fn map_center(&self) -> Option<Coordinate> {
        self.display.lock().map.center()
    }

    async fn geocode_and_forecast(&self, name: &str) -> Found {
        let coord = self
            .services
            .geocoder
            .resolve(name)
            .await?
            .ok_or(SearchError::NotFound)?;

        let location = Location { title: name.to_string(), coord: Some(coord) };
        self.forecast_for(location, coord).await
    }

    async fn locate_and_forecast(&self) -> Found {
        let geolocation = &self.services.geolocation;
        if !geolocation.is_supported() {
            return Err(SearchError::Unsupported);
        }

        let coord = geolocation.current_position().await.map_err(|e| {
            tracing::warn!(error = %e, "geolocation failed");
            SearchError::Position
        })?;

        let location = Location {
            title: CURRENT_POSITION_TITLE.to_string(),
            coord: Some(coord),
        };
        self.forecast_for(location, coord).await
    }

    async fn forecast_for(&self, location: Location, coord: Coordinate) -> Found {
        let records = self.services.forecast.fetch(coord).await?;
        Ok((location, records))
    }

    fn begin(&self, label: &str) -> u64 {
        let mut state = self.display.lock();
        state.generation += 1;
        let generation = state.generation;

        state.map.clear();
        state.surface.replace(view::loading());

        tracing::info!(generation, search = label, "search started");
        generation
    }

    fn finish(&self, generation: u64, found: Found) -> Outcome {
        if let Err(e) = &found {
            tracing::warn!(generation, error = %e, detail = ?e, "search failed");
        }

        let mut state = self.display.lock();
        let latest = state.generation;
        if latest != generation {
            tracing::debug!(generation, latest, "discarding superseded search");
            return Outcome::Superseded;
        }

        match found {
            Ok((location, records)) => {
                state.surface.replace(view::results(&location, &records));
                if let Some(coord) = location.coord
                    && let Err(e) = state.map.show(coord)
                {
                    tracing::warn!(error = %e, "could not mount map");
                }
                tracing::info!(generation, title = %location.title, hours = records.len(), "search rendered");
                Outcome::Rendered(SearchResult::Success(location, records))
            }
            Err(e) => {
                let message = e.to_string();
                state.surface.replace(view::error(&message));
                Outcome::Rendered(SearchResult::Error(message))
            }
        }
    }
}
