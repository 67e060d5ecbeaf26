//! Outline tree input model
//!
//! The host note-taking tree is mirrored as plain [`OutlineNode`]s. Only the top level is
//! inspected for marker sections (`ROUTE`, `PLACES`); each section's children are the locations.

use crate::{Coordinates, MapError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// `<number>, <number>` with optional sign, fraction and whitespace around the comma
static LITERAL_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)").expect("literal pair regex")
});

/// `#tag` and `#[[multi word tag]]`
static HASH_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\[\[[^\]]*\]\]|#[^\s#]+").expect("hash tag regex"));

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]").expect("wiki link regex"));

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup regex"));

/// A text node with ordered children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
    /// Opaque identifier of the node in the host tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl OutlineNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_child(mut self, child: OutlineNode) -> Self {
        self.children.push(child);
        self
    }

    /// Display name with tagging syntax removed
    pub fn display_name(&self) -> String {
        strip_tags(&self.text)
    }

    /// Literal coordinates embedded in the first child, if any
    pub fn literal_coordinates(&self) -> Option<Coordinates> {
        self.children
            .first()
            .and_then(|child| parse_literal_coordinates(&child.text))
    }
}

/// Root of an outline: only its children carry data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineTree {
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

/// Kind of a top-level marker section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Route,
    Places,
}

impl SectionKind {
    /// Recognize a marker node text (trimmed, case-insensitive, exact)
    pub fn from_marker(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("ROUTE") {
            Some(Self::Route)
        } else if text.eq_ignore_ascii_case("PLACES") {
            Some(Self::Places)
        } else {
            None
        }
    }
}

/// A marker section and the location nodes below it
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub kind: SectionKind,
    pub nodes: &'a [OutlineNode],
}

impl OutlineTree {
    pub fn new(children: Vec<OutlineNode>) -> Self {
        Self { children }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(MapError::Outline)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// All marker sections in document order
    pub fn sections(&self) -> impl Iterator<Item = Section<'_>> {
        self.children.iter().filter_map(|node| {
            SectionKind::from_marker(&node.text).map(|kind| Section {
                kind,
                nodes: &node.children,
            })
        })
    }

    /// Location nodes of every section of `kind`, concatenated in document order
    pub fn section_nodes(&self, kind: SectionKind) -> Vec<&OutlineNode> {
        self.sections()
            .filter(|section| section.kind == kind)
            .flat_map(|section| section.nodes.iter())
            .collect()
    }

    pub fn route_nodes(&self) -> Vec<&OutlineNode> {
        self.section_nodes(SectionKind::Route)
    }

    pub fn place_nodes(&self) -> Vec<&OutlineNode> {
        self.section_nodes(SectionKind::Places)
    }
}

/// Remove tagging syntax from a node text, keeping the readable name
pub fn strip_tags(text: &str) -> String {
    let text = MARKUP.replace_all(text, " ");
    let text = HASH_TAG.replace_all(&text, " ");
    let text = WIKI_LINK.replace_all(&text, "$1");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find an embedded `<lat>, <lon>` pair
pub fn parse_literal_coordinates(text: &str) -> Option<Coordinates> {
    let captures = LITERAL_PAIR.captures(text)?;
    let lat = captures.get(1)?.as_str().parse().ok()?;
    let lon = captures.get(2)?.as_str().parse().ok()?;
    Some(Coordinates::new(lat, lon))
}
