use std::collections::HashSet;

use log::{debug, warn};

use super::types::{ContentPatch, Edge, EdgeId, Graph, Handle, Node, NodeId, NodeKind, Position};
use crate::error::{GraphError, Result};

const NODE_PREFIX: &str = "n";
const EDGE_PREFIX: &str = "e";

/// Authoritative node/edge collections for one canvas.
///
/// Every mutation is synchronous and completes before returning, so a read
/// always observes the latest finished mutation. The store never holds an
/// edge whose endpoint is missing.
#[derive(Clone, Debug)]
pub struct GraphStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	next_node: u64,
	next_edge: u64,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphStore {
	/// Empty store; the first ids issued are `n1` and `e1`.
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			next_node: 1,
			next_edge: 1,
		}
	}

	/// Store holding a restored copy of `graph`.
	pub fn from_graph(graph: Graph) -> Self {
		let mut store = Self::new();
		store.restore(graph);
		store
	}

	/// Live nodes, oldest first.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Live edges, oldest first.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Node by id.
	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	/// Edge by id.
	pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| &e.id == id)
	}

	/// Whether a live node has this id.
	pub fn contains_node(&self, id: &NodeId) -> bool {
		self.node(id).is_some()
	}

	/// No nodes and no edges.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Creates a node titled after its kind, with an empty body.
	pub fn add_node(&mut self, kind: NodeKind, position: Position) -> Node {
		let id = self.fresh_node_id();
		let node = Node {
			id,
			kind,
			title: format!("New {}", kind.display_name()),
			body: String::new(),
			position,
		};
		debug!("add node {} ({})", node.id, kind);
		self.nodes.push(node.clone());
		node
	}

	/// Overwrites the fields present in `patch` and returns the new version.
	pub fn update_node_content(&mut self, id: &NodeId, patch: ContentPatch) -> Result<Node> {
		let node = self.node_mut(id)?;
		if let Some(title) = patch.title {
			node.title = title;
		}
		if let Some(body) = patch.body {
			node.body = body;
		}
		debug!("updated content of node {id}");
		Ok(node.clone())
	}

	/// Stores a new position for a node.
	pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<Node> {
		let node = self.node_mut(id)?;
		node.position = position;
		Ok(node.clone())
	}

	/// Removes the node and every edge touching it. Unknown ids are a no-op.
	/// Returns the ids of the cascaded edges.
	pub fn delete_node(&mut self, id: &NodeId) -> Vec<EdgeId> {
		let before = self.nodes.len();
		self.nodes.retain(|n| &n.id != id);
		if self.nodes.len() == before {
			return Vec::new();
		}

		let mut removed = Vec::new();
		self.edges.retain(|e| {
			if e.touches(id) {
				removed.push(e.id.clone());
				false
			} else {
				true
			}
		});
		debug!("deleted node {id}, cascaded {} edge(s)", removed.len());
		removed
	}

	/// Creates an edge between two live nodes. Self loops and parallel edges
	/// are accepted.
	pub fn connect(
		&mut self,
		source: &NodeId,
		target: &NodeId,
		source_handle: Option<Handle>,
		target_handle: Option<Handle>,
	) -> Result<Edge> {
		for endpoint in [source, target] {
			if !self.contains_node(endpoint) {
				return Err(GraphError::NotFound(endpoint.to_string()));
			}
		}

		let id = self.fresh_edge_id();
		let edge = Edge {
			id,
			source: source.clone(),
			target: target.clone(),
			source_handle,
			target_handle,
		};
		debug!("connect {} -> {} as {}", source, target, edge.id);
		self.edges.push(edge.clone());
		Ok(edge)
	}

	/// Removes a single edge. Unknown ids are a no-op.
	pub fn delete_edge(&mut self, id: &EdgeId) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| &e.id != id);
		self.edges.len() != before
	}

	/// Copy of the current graph, detached from the store.
	pub fn snapshot(&self) -> Graph {
		Graph {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}

	/// Replaces the whole graph. Dangling edges and repeated ids are dropped
	/// and logged; id counters move past every restored generated id.
	/// A generated id whose counter has no successor is dropped as well.
	pub fn restore(&mut self, graph: Graph) {
		let mut node_ids = HashSet::new();
		let mut nodes = Vec::with_capacity(graph.nodes.len());
		for node in graph.nodes {
			if counter_of(&node.id.0, NODE_PREFIX) == Some(u64::MAX) {
				warn!("restore: dropping node {} with an exhausted id", node.id);
				continue;
			}
			if !node_ids.insert(node.id.clone()) {
				warn!("restore: dropping node with repeated id {}", node.id);
				continue;
			}
			nodes.push(node);
		}

		let mut edge_ids = HashSet::new();
		let mut edges = Vec::with_capacity(graph.edges.len());
		for edge in graph.edges {
			if !node_ids.contains(&edge.source) || !node_ids.contains(&edge.target) {
				warn!(
					"restore: dropping edge {} ({} -> {}) with a missing endpoint",
					edge.id, edge.source, edge.target
				);
				continue;
			}
			if counter_of(&edge.id.0, EDGE_PREFIX) == Some(u64::MAX) {
				warn!("restore: dropping edge {} with an exhausted id", edge.id);
				continue;
			}
			if !edge_ids.insert(edge.id.clone()) {
				warn!("restore: dropping edge with repeated id {}", edge.id);
				continue;
			}
			edges.push(edge);
		}

		self.next_node = self
			.next_node
			.max(next_after(nodes.iter().map(|n| n.id.0.as_str()), NODE_PREFIX));
		self.next_edge = self
			.next_edge
			.max(next_after(edges.iter().map(|e| e.id.0.as_str()), EDGE_PREFIX));
		debug!("restored {} node(s), {} edge(s)", nodes.len(), edges.len());
		self.nodes = nodes;
		self.edges = edges;
	}

	/// Next `n<k>` not held by a live node. The counter wraps instead of
	/// overflowing.
	fn fresh_node_id(&mut self) -> NodeId {
		loop {
			let id = NodeId(format!("{NODE_PREFIX}{}", self.next_node));
			self.next_node = self.next_node.checked_add(1).unwrap_or(1);
			if !self.contains_node(&id) {
				return id;
			}
		}
	}

	fn fresh_edge_id(&mut self) -> EdgeId {
		loop {
			let id = EdgeId(format!("{EDGE_PREFIX}{}", self.next_edge));
			self.next_edge = self.next_edge.checked_add(1).unwrap_or(1);
			if self.edge(&id).is_none() {
				return id;
			}
		}
	}

	fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node> {
		self.nodes
			.iter_mut()
			.find(|n| &n.id == id)
			.ok_or_else(|| GraphError::NotFound(id.to_string()))
	}
}

/// Counter value encoded in a generated id such as `n12`.
fn counter_of(id: &str, prefix: &str) -> Option<u64> {
	id.strip_prefix(prefix)?.parse().ok()
}

/// Smallest counter value that cannot reproduce any of `ids`, or 1 when
/// none of them has a successor.
fn next_after<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
	ids.filter_map(|id| counter_of(id, prefix))
		.max()
		.and_then(|max| max.checked_add(1))
		.unwrap_or(1)
}
