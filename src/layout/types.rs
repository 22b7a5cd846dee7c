use serde::{Deserialize, Serialize};

use crate::theme::MAX_DISPLAY_LEVEL;

/// Connector hint passed through to the rendering surface untouched.
pub const DEFAULT_CONNECTOR: &str = "smoothstep";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Heading,
    Subheading,
    Visual,
    Placeholder,
    Empty,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Subheading => "subheading",
            Self::Visual => "visual",
            Self::Placeholder => "placeholder",
            Self::Empty => "empty",
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Placeholder | Self::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Top,
    Bottom,
}

impl HandlePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// A positioned diagram node. `position` is the center of the node's box.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub level: u32,
    pub position: Position,
    pub page_reference: u32,
    pub context: Option<String>,
}

impl DiagramNode {
    pub fn new(id: String, kind: NodeKind, label: String, level: u32, position: Position) -> Self {
        Self {
            id,
            kind,
            label,
            level,
            position,
            page_reference: 1,
            context: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page_reference = page;
        self
    }

    /// Level used for styling; everything past the cap shares its look.
    pub fn display_level(&self) -> u32 {
        self.level.min(MAX_DISPLAY_LEVEL)
    }

    pub fn source_position(&self) -> HandlePosition {
        HandlePosition::Bottom
    }

    pub fn target_position(&self) -> HandlePosition {
        HandlePosition::Top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub style: EdgeStyle,
    pub connector: String,
}

impl DiagramEdge {
    pub fn new(source: &str, target: &str, style: EdgeStyle) -> Self {
        Self {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            style,
            connector: DEFAULT_CONNECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&DiagramEdge> {
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }

    /// True when the diagram is one of the single-node fallbacks.
    pub fn is_fallback(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].kind.is_fallback()
    }
}

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned box around a node center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBox {
    pub fn left(&self) -> f32 {
        self.cx - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.cx + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.cy - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.cy + self.height / 2.0
    }

    /// Overlap along (x, y); both positive means the boxes intersect.
    pub fn overlap(&self, other: &NodeBox) -> (f32, f32) {
        let x = (self.width + other.width) / 2.0 - (self.cx - other.cx).abs();
        let y = (self.height + other.height) / 2.0 - (self.cy - other.cy).abs();
        (x, y)
    }

    pub fn intersects(&self, other: &NodeBox) -> bool {
        let (x, y) = self.overlap(other);
        x > 0.0 && y > 0.0
    }
}
