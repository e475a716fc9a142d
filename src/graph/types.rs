use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one store for the life of the process.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

/// Identifier of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<&str> for EdgeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

/// Semantic type of a node. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
	/// Top level of the outline.
	Chapter,
	/// Topic under a chapter.
	MainTopic,
	/// Detail under a main topic.
	SubTopic,
}

impl NodeKind {
	/// Every kind, in toolbar order.
	pub const ALL: [NodeKind; 3] = [NodeKind::Chapter, NodeKind::MainTopic, NodeKind::SubTopic];

	/// Wire name, as written to saved documents.
	pub const fn as_str(self) -> &'static str {
		match self {
			NodeKind::Chapter => "chapter",
			NodeKind::MainTopic => "main-topic",
			NodeKind::SubTopic => "sub-topic",
		}
	}

	/// Human readable form, e.g. `"main topic"`.
	pub const fn display_name(self) -> &'static str {
		match self {
			NodeKind::Chapter => "chapter",
			NodeKind::MainTopic => "main topic",
			NodeKind::SubTopic => "sub topic",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Top-left corner of a card, in graph units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Position {
	/// Position at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Attachment point on a node's boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
	/// Middle of the top side.
	Top,
	/// Middle of the bottom side.
	Bottom,
	/// Middle of the left side.
	Left,
	/// Middle of the right side.
	Right,
}

impl Handle {
	/// Every handle of a card.
	pub const ALL: [Handle; 4] = [Handle::Top, Handle::Bottom, Handle::Left, Handle::Right];
}

/// A titled card on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Store-assigned identifier.
	pub id: NodeId,
	/// Kind chosen at creation.
	pub kind: NodeKind,
	/// Plain text heading.
	pub title: String,
	/// Rich text serialized as markup.
	pub body: String,
	/// Top-left corner of the card.
	pub position: Position,
}

impl Node {
	/// Card width in graph units.
	pub const WIDTH: f64 = 260.0;
	/// Card height in graph units.
	pub const HEIGHT: f64 = 150.0;

	/// Whether a card placed at `at` would cover part of this one.
	pub fn overlaps(&self, at: Position) -> bool {
		(self.position.x - at.x).abs() < Self::WIDTH && (self.position.y - at.y).abs() < Self::HEIGHT
	}
}

/// Directed connection between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Store-assigned identifier.
	pub id: EdgeId,
	/// Node the edge starts from.
	pub source: NodeId,
	/// Node the edge points at.
	pub target: NodeId,
	/// Attachment on the source; `None` draws from the bottom.
	pub source_handle: Option<Handle>,
	/// Attachment on the target; `None` draws to the top.
	pub target_handle: Option<Handle>,
}

impl Edge {
	/// Whether `node` is either endpoint.
	pub fn touches(&self, node: &NodeId) -> bool {
		&self.source == node || &self.target == node
	}
}

/// Fields to overwrite in [`update_node_content`](super::GraphStore::update_node_content).
/// `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentPatch {
	/// Replacement title.
	pub title: Option<String>,
	/// Replacement body markup.
	pub body: Option<String>,
}

impl ContentPatch {
	/// Patch that only sets the title.
	pub fn title(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			body: None,
		}
	}

	/// Patch that only sets the body.
	pub fn body(body: impl Into<String>) -> Self {
		Self {
			title: None,
			body: Some(body.into()),
		}
	}
}

/// Immutable copy of the whole graph, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	/// Nodes, oldest first.
	pub nodes: Vec<Node>,
	/// Edges, oldest first.
	pub edges: Vec<Edge>,
}
