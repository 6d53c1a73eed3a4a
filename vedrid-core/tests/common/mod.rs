//! Test doubles for the host side: output surface and map library.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;

use vedrid_core::{
    map::{MapClickSender, MapInstance, MapLibrary, MapSpec},
    view::{Node, Surface},
};

/// Remembers every tree it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub history: Mutex<Vec<Node>>,
}

impl RecordingSurface {
    pub fn last(&self) -> Option<Node> {
        self.history.lock().last().cloned()
    }

    pub fn last_text(&self) -> String {
        self.last().map(|n| n.text_content()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }
}

impl Surface for RecordingSurface {
    fn replace(&self, tree: Node) {
        self.history.lock().push(tree);
    }
}

#[derive(Debug, Default)]
pub struct MapLog {
    pub mounted: Vec<MapSpec>,
    pub destroyed: usize,
    pub live: usize,
    pub last_sender: Option<MapClickSender>,
    /// Make every `mount` call fail.
    pub fail_mount: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeMapLibrary(pub Arc<Mutex<MapLog>>);

struct FakeMapInstance(Arc<Mutex<MapLog>>);

impl MapInstance for FakeMapInstance {
    fn destroy(&mut self) {
        let mut log = self.0.lock();
        log.destroyed += 1;
        log.live -= 1;
    }
}

impl MapLibrary for FakeMapLibrary {
    fn mount(&self, spec: &MapSpec, on_click: MapClickSender) -> anyhow::Result<Box<dyn MapInstance>> {
        let mut log = self.0.lock();
        if log.fail_mount {
            anyhow::bail!("map container missing");
        }
        log.mounted.push(spec.clone());
        log.live += 1;
        log.last_sender = Some(on_click);
        Ok(Box::new(FakeMapInstance(Arc::clone(&self.0))))
    }
}

/// Number of body rows in the first forecast table of a tree.
pub fn body_rows(tree: &Node) -> usize {
    tree.find_all("tr").len().saturating_sub(1)
}

pub fn heading(tree: &Node) -> Option<String> {
    tree.find_all("h2")
        .first()
        .map(|h| Node::Element((*h).clone()).text_content())
}
