//! Saved-flow document: the JSON written to storage on "Save".
//!
//! ```json
//! { "version": 1,
//!   "nodes": [{ "id": "n1", "type": "textNode", "position": { "x": 0, "y": 0 },
//!               "data": { "label": "Intro", "content": "<p></p>", "type": "chapter" } }],
//!   "edges": [{ "id": "e1", "source": "n1", "target": "n2", "sourceHandle": "right" }] }
//! ```
//!
//! Documents written before versioning carry no `version` and are read as
//! version 0, whose layout is the same.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{Edge, EdgeId, Graph, Handle, Node, NodeId, NodeKind, Position};

/// Version written by this build.
pub const CURRENT_VERSION: u32 = 1;

const LEGACY_VERSION: u32 = 0;
const RENDER_NODE_TYPE: &str = "textNode";

/// Wire form of a whole graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
	/// Layout version; absent in legacy documents.
	#[serde(default = "legacy_version")]
	pub version: u32,
	/// Saved nodes.
	#[serde(default)]
	pub nodes: Vec<NodeRecord>,
	/// Saved edges.
	#[serde(default)]
	pub edges: Vec<EdgeRecord>,
}

fn legacy_version() -> u32 {
	LEGACY_VERSION
}

/// One saved node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Node id.
	pub id: NodeId,
	/// Renderer tag, always `textNode`.
	#[serde(rename = "type", default = "render_node_type")]
	pub render_type: String,
	/// Top-left corner.
	pub position: Position,
	/// Content and kind.
	pub data: NodeData,
}

fn render_node_type() -> String {
	RENDER_NODE_TYPE.to_owned()
}

/// Content of a saved node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Title.
	pub label: String,
	/// Body markup; omitted while empty.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	/// Node kind.
	#[serde(rename = "type")]
	pub kind: NodeKind,
}

/// One saved edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
	/// Edge id.
	pub id: EdgeId,
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
	/// Source attachment, if chosen.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_handle: Option<Handle>,
	/// Target attachment, if chosen.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_handle: Option<Handle>,
}

impl FlowDocument {
	/// Builds a current-version document from a snapshot.
	pub fn from_graph(graph: &Graph) -> Self {
		Self {
			version: CURRENT_VERSION,
			nodes: graph.nodes.iter().map(NodeRecord::from).collect(),
			edges: graph.edges.iter().map(EdgeRecord::from).collect(),
		}
	}

	/// Converts back to a snapshot. No structural checks happen here; the
	/// store drops dangling edges on restore.
	pub fn into_graph(self) -> Graph {
		Graph {
			nodes: self.nodes.into_iter().map(Node::from).collect(),
			edges: self.edges.into_iter().map(Edge::from).collect(),
		}
	}

	/// Serializes the document.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Parses a document, refusing versions newer than this build knows.
	pub fn from_json(text: &str) -> Result<Self> {
		let doc: FlowDocument = serde_json::from_str(text)?;
		if doc.version > CURRENT_VERSION {
			return Err(GraphError::Persistence(format!(
				"saved flow has version {}, newest supported is {}",
				doc.version, CURRENT_VERSION
			)));
		}
		if doc.version == LEGACY_VERSION {
			log::info!("reading unversioned saved flow");
		}
		Ok(doc)
	}
}

impl From<&Node> for NodeRecord {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			render_type: render_node_type(),
			position: node.position,
			data: NodeData {
				label: node.title.clone(),
				content: (!node.body.is_empty()).then(|| node.body.clone()),
				kind: node.kind,
			},
		}
	}
}

impl From<NodeRecord> for Node {
	fn from(record: NodeRecord) -> Self {
		Self {
			id: record.id,
			kind: record.data.kind,
			title: record.data.label,
			body: record.data.content.unwrap_or_default(),
			position: record.position,
		}
	}
}

impl From<&Edge> for EdgeRecord {
	fn from(edge: &Edge) -> Self {
		Self {
			id: edge.id.clone(),
			source: edge.source.clone(),
			target: edge.target.clone(),
			source_handle: edge.source_handle,
			target_handle: edge.target_handle,
		}
	}
}

impl From<EdgeRecord> for Edge {
	fn from(record: EdgeRecord) -> Self {
		Self {
			id: record.id,
			source: record.source,
			target: record.target,
			source_handle: record.source_handle,
			target_handle: record.target_handle,
		}
	}
}
