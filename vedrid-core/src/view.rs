//! Declarative view tree.
//!
//! Every function here is a pure mapping from data to an immutable [`Node`].
//! Hosts reconcile the tree into whatever they draw on (HTML, a terminal,
//! ...) through [`Surface`]. Nothing in this module touches the network.

use chrono::NaiveDateTime;

use crate::model::{ForecastRecord, Location};

/// Id of the element a host mounts the map widget into.
pub const MAP_ELEMENT_ID: &str = "map";

/// Something the user can trigger from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Search the predefined location at this index.
    Search(usize),
    SearchMyLocation,
    /// Submit the free-text search form.
    SubmitName,
}

impl Action {
    fn as_data(&self) -> String {
        match self {
            Action::Search(idx) => format!("search:{idx}"),
            Action::SearchMyLocation => "my-location".to_string(),
            Action::SubmitName => "submit-name".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub action: Option<Action>,
    pub children: Vec<Node>,
}

/// Start building an element.
pub fn el(tag: &'static str) -> Element {
    Element { tag, attrs: Vec::new(), action: None, children: Vec::new() }
}

impl Element {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: &str) -> Self {
        self.attr("class", value)
    }

    pub fn on(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

const VOID_TAGS: &[&str] = &["input", "br", "img", "hr"];

impl Node {
    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Actionable elements in document order, with their visible labels.
    pub fn actions(&self) -> Vec<(String, Action)> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Some(action) = e.action {
                out.push((Node::Element(e.clone()).text_content(), action));
            }
        });
        out
    }

    /// Every element with the given tag, depth first.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_tag(tag, &mut out);
        out
    }

    fn collect_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if let Node::Element(e) = self {
            if e.tag == tag {
                out.push(e);
            }
            e.children.iter().for_each(|c| c.collect_tag(tag, out));
        }
    }

    fn walk(&self, f: &mut impl FnMut(&Element)) {
        if let Node::Element(e) = self {
            f(e);
            e.children.iter().for_each(|c| c.walk(f));
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&escape(t)),
            Node::Element(e) => {
                out.push('<');
                out.push_str(e.tag);
                for (name, value) in &e.attrs {
                    out.push(' ');
                    out.push_str(name);
                    // Empty value renders as a boolean attribute.
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape(value));
                        out.push('"');
                    }
                }
                if let Some(action) = e.action {
                    out.push_str(" data-action=\"");
                    out.push_str(&action.as_data());
                    out.push('"');
                }
                out.push('>');

                if VOID_TAGS.contains(&e.tag) {
                    return;
                }

                e.children.iter().for_each(|c| c.write_html(out));
                out.push_str("</");
                out.push_str(e.tag);
                out.push('>');
            }
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The output region of the page. Each call replaces everything shown before.
pub trait Surface: Send + Sync {
    fn replace(&self, tree: Node);
}

pub fn loading() -> Node {
    el("p").child("Leita...").into()
}

pub fn error(message: &str) -> Node {
    el("p").child(format!("Villa: {message}")).into()
}

/// Results section: heading, coordinate line, hourly table and the map slot.
pub fn results(location: &Location, records: &[ForecastRecord]) -> Node {
    let header = el("tr").children(
        ["Klukkutími", "Hiti (°C)", "Úrkoma (mm)", "Vindur (m/s)", "Raki (%)"]
            .into_iter()
            .map(|h| el("th").child(h)),
    );

    let rows = records.iter().map(|r| {
        el("tr").children([
            el("td").child(hour_minute(&r.time)),
            el("td").child(number(r.temperature)),
            el("td").child(precipitation(r.precipitation)),
            el("td").child(number(r.windspeed)),
            el("td").child(number(r.humidity)),
        ])
    });

    let table = el("table").class("forecast").child(header).children(rows);

    let mut section = el("section").child(el("h2").child(location.title.as_str()));
    if let Some(coord) = location.coord {
        section = section.child(el("p").child(format!(
            "Spá fyrir daginn í breiddargráðu {:.4} og lengdargráðu {:.4}",
            coord.lat(),
            coord.lng()
        )));
    }

    section
        .child(table)
        .child(el("div").attr("id", MAP_ELEMENT_ID))
        .into()
}

/// Page skeleton: header, one button per location, search form, output region.
pub fn app_shell(locations: &[Location]) -> Node {
    let buttons = locations.iter().enumerate().map(|(idx, location)| {
        let action = if location.is_my_location() {
            Action::SearchMyLocation
        } else {
            Action::Search(idx)
        };

        el("li").class("locations__location").child(
            el("button")
                .class("locations__button")
                .on(action)
                .child(location.title.as_str()),
        )
    });

    let header = el("header")
        .child(el("h1").child("Veðrið"))
        .child(el("p").child("Veldu stað til að sjá hita- og úrkomuspá."));

    let search_form = el("form")
        .class("search-form")
        .on(Action::SubmitName)
        .child(
            el("input")
                .attr("type", "text")
                .attr("name", "location")
                .attr("placeholder", "Leita að stað")
                .attr("required", ""),
        )
        .child(el("button").attr("type", "submit").child("Leita"));

    el("main")
        .class("weather")
        .child(header)
        .child(el("div").class("locations").child(el("ul").class("locations__list").children(buttons)))
        .child(el("div").class("output"))
        .child(search_form)
        .into()
}

/// `HH:MM` portion of a forecast timestamp.
fn hour_minute(time: &str) -> String {
    match NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M") {
        Ok(dt) => dt.format("%H:%M").to_string(),
        Err(_) => time.get(11..16).unwrap_or(time).to_string(),
    }
}

fn number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "–".to_string()
    }
}

fn precipitation(value: f64) -> String {
    // Also catches -0.0, which would otherwise print as "-0".
    if value == 0.0 {
        return "0".to_string();
    }
    number(value)
}
