//! Terminal implementations of the host seams: output surface and map widget.

use parking_lot::Mutex;
use std::sync::Arc;

use vedrid_core::{
    Coordinate,
    map::{MapClickSender, MapInstance, MapLibrary, MapSpec},
    view::{Node, Surface},
};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// Prints every replacement of the output area to stdout.
#[derive(Debug)]
pub struct TerminalSurface {
    format: OutputFormat,
}

impl TerminalSurface {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Surface for TerminalSurface {
    fn replace(&self, tree: Node) {
        match self.format {
            OutputFormat::Text => println!("\n{}", render::to_text(&tree)),
            OutputFormat::Html => println!("{}", tree.to_html()),
        }
    }
}

/// Click handler of the currently mounted terminal map, if any.
pub type ClickSlot = Arc<Mutex<Option<MapClickSender>>>;

/// "Draws" a map as a short description plus an openstreetmap.org link.
///
/// Clicks cannot come from the terminal itself; the interactive prompt reads
/// a coordinate and reports it through the mounted map's click handler.
#[derive(Debug, Clone, Default)]
pub struct TerminalMap {
    slot: ClickSlot,
    format: OutputFormat,
}

impl TerminalMap {
    pub fn new(format: OutputFormat) -> Self {
        Self { slot: ClickSlot::default(), format }
    }

    /// Report a click on the mounted map. Returns `false` when no map is shown.
    pub fn click(&self, lat: f64, lng: f64) -> bool {
        self.slot.lock().as_ref().is_some_and(|sender| sender.click(lat, lng))
    }

    pub fn is_mounted(&self) -> bool {
        self.slot.lock().is_some()
    }
}

struct TerminalMapInstance {
    slot: ClickSlot,
}

impl MapInstance for TerminalMapInstance {
    fn destroy(&mut self) {
        self.slot.lock().take();
    }
}

impl MapLibrary for TerminalMap {
    fn mount(&self, spec: &MapSpec, on_click: MapClickSender) -> anyhow::Result<Box<dyn MapInstance>> {
        let text = describe(spec);
        match self.format {
            // Keep stdout pure HTML.
            OutputFormat::Html => eprintln!("{text}"),
            OutputFormat::Text => println!("{text}"),
        }

        *self.slot.lock() = Some(on_click);
        Ok(Box::new(TerminalMapInstance { slot: Arc::clone(&self.slot) }))
    }
}

fn describe(spec: &MapSpec) -> String {
    format!(
        "\nKort: miðja {center}, aðdráttur {zoom}, merki {marker}\n{url}\n{attribution}",
        center = spec.center,
        zoom = spec.zoom,
        marker = spec.marker,
        url = osm_link(spec.center, spec.zoom),
        attribution = plain_attribution(&spec.attribution),
    )
}

fn osm_link(center: Coordinate, zoom: u8) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.4}&mlon={lng:.4}#map={zoom}/{lat:.4}/{lng:.4}",
        lat = center.lat(),
        lng = center.lng(),
    )
}

/// Tile attributions are HTML snippets; strip the markup for the terminal.
fn plain_attribution(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&copy;", "©").replace("&amp;", "&")
}
