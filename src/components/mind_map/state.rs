use crate::graph::{Edge, EdgeId, GraphStore, Handle, Node, NodeId, Position};

pub const NODE_WIDTH: f64 = Node::WIDTH;
pub const NODE_HEIGHT: f64 = Node::HEIGHT;
pub const HANDLE_RADIUS: f64 = 7.0;
/// Handles are easier to grab than they look.
const HANDLE_HIT_RADIUS: f64 = 12.0;
const EDGE_HIT_DISTANCE: f64 = 6.0;
pub const DELETE_BUTTON_SIZE: f64 = 22.0;
const DELETE_BUTTON_INSET: f64 = 8.0;
/// Dot spacing of the background, in graph units.
pub const GRID_GAP: f64 = 16.0;
/// Screen margin kept around the graph by [`MindMapState::fit_view`].
const FIT_PADDING: f64 = 40.0;
const FIT_MAX_ZOOM: f64 = 1.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Axis-aligned box in graph units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Box covering every card, or `None` for an empty graph.
	pub fn of_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Self> {
		nodes.into_iter().fold(None, |acc: Option<Bounds>, node| {
			let card = Bounds {
				min_x: node.position.x,
				min_y: node.position.y,
				max_x: node.position.x + NODE_WIDTH,
				max_y: node.position.y + NODE_HEIGHT,
			};
			Some(acc.map_or(card, |b| b.union(card)))
		})
	}

	pub fn union(self, other: Bounds) -> Bounds {
		Bounds {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
		}
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub current: Position,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Connection being drawn from a handle; `to` is in graph space.
#[derive(Clone, Debug)]
pub struct ConnectDraft {
	pub source: NodeId,
	pub handle: Handle,
	pub to: (f64, f64),
}

pub struct MindMapState {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: Option<ConnectDraft>,
	pub hovered: Option<NodeId>,
	pub selected_edge: Option<EdgeId>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl MindMapState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			connect: None,
			hovered: None,
			selected_edge: None,
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Where a node is drawn: the drag preview wins over the stored value.
	pub fn position_of(&self, node: &Node) -> Position {
		match &self.drag.node {
			Some(id) if id == &node.id => self.drag.current,
			_ => node.position,
		}
	}

	pub fn anchor(&self, node: &Node, handle: Handle) -> (f64, f64) {
		let p = self.position_of(node);
		match handle {
			Handle::Top => (p.x + NODE_WIDTH / 2.0, p.y),
			Handle::Bottom => (p.x + NODE_WIDTH / 2.0, p.y + NODE_HEIGHT),
			Handle::Left => (p.x, p.y + NODE_HEIGHT / 2.0),
			Handle::Right => (p.x + NODE_WIDTH, p.y + NODE_HEIGHT / 2.0),
		}
	}

	/// Graph-space endpoints of an edge, or `None` if an endpoint is gone.
	pub fn edge_endpoints(&self, store: &GraphStore, edge: &Edge) -> Option<((f64, f64), (f64, f64))> {
		let source = store.node(&edge.source)?;
		let target = store.node(&edge.target)?;
		Some((
			self.anchor(source, edge.source_handle.unwrap_or(Handle::Bottom)),
			self.anchor(target, edge.target_handle.unwrap_or(Handle::Top)),
		))
	}

	/// Topmost node under a screen point.
	pub fn node_at(&self, store: &GraphStore, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		store
			.nodes()
			.iter()
			.rev()
			.find(|node| {
				let p = self.position_of(node);
				gx >= p.x && gx <= p.x + NODE_WIDTH && gy >= p.y && gy <= p.y + NODE_HEIGHT
			})
			.map(|node| node.id.clone())
	}

	pub fn handle_at(&self, store: &GraphStore, sx: f64, sy: f64) -> Option<(NodeId, Handle)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// HANDLE_HIT_RADIUS is in screen space, independent of zoom
		let radius = HANDLE_HIT_RADIUS / self.transform.k;
		store.nodes().iter().rev().find_map(|node| {
			Handle::ALL.into_iter().find_map(|handle| {
				let (hx, hy) = self.anchor(node, handle);
				let (dx, dy) = (hx - gx, hy - gy);
				((dx * dx + dy * dy).sqrt() <= radius).then(|| (node.id.clone(), handle))
			})
		})
	}

	pub fn edge_at(&self, store: &GraphStore, sx: f64, sy: f64) -> Option<EdgeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let limit = EDGE_HIT_DISTANCE / self.transform.k;
		store
			.edges()
			.iter()
			.rev()
			.find(|edge| {
				self.edge_endpoints(store, edge)
					.is_some_and(|(a, b)| segment_distance((gx, gy), a, b) <= limit)
			})
			.map(|edge| edge.id.clone())
	}

	pub fn begin_drag(&mut self, node: &Node, sx: f64, sy: f64) {
		self.drag = DragState {
			node: Some(node.id.clone()),
			start_x: sx,
			start_y: sy,
			node_start: node.position,
			current: node.position,
			moved: false,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		if self.drag.node.is_none() {
			return;
		}
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.drag.current = Position::new(self.drag.node_start.x + dx, self.drag.node_start.y + dy);
		self.drag.moved |= dx != 0.0 || dy != 0.0;
	}

	/// Ends a drag, yielding the node and its new position if it moved.
	pub fn end_drag(&mut self) -> Option<(NodeId, Position)> {
		let drag = std::mem::take(&mut self.drag);
		let node = drag.node?;
		drag.moved.then_some((node, drag.current))
	}

	/// Top-left corner of a node's delete button, in graph space.
	pub fn delete_button(&self, node: &Node) -> (f64, f64) {
		let p = self.position_of(node);
		(
			p.x + NODE_WIDTH - DELETE_BUTTON_INSET - DELETE_BUTTON_SIZE,
			p.y + DELETE_BUTTON_INSET,
		)
	}

	/// Node whose delete button is under a screen point. Only the topmost
	/// card at that point counts.
	pub fn delete_button_at(&self, store: &GraphStore, sx: f64, sy: f64) -> Option<NodeId> {
		let id = self.node_at(store, sx, sy)?;
		let node = store.node(&id)?;
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let (bx, by) = self.delete_button(node);
		let inside = gx >= bx
			&& gx <= bx + DELETE_BUTTON_SIZE
			&& gy >= by
			&& gy <= by + DELETE_BUTTON_SIZE;
		inside.then_some(id)
	}

	/// Graph-space rectangle currently on screen.
	pub fn viewport(&self) -> Bounds {
		let (min_x, min_y) = self.screen_to_graph(0.0, 0.0);
		let (max_x, max_y) = self.screen_to_graph(self.width, self.height);
		Bounds { min_x, min_y, max_x, max_y }
	}

	/// Centres every card on screen, zooming out if they do not fit.
	/// An empty graph resets the view.
	pub fn fit_view(&mut self, store: &GraphStore) {
		let Some(bounds) = Bounds::of_nodes(store.nodes()) else {
			self.transform = ViewTransform::default();
			return;
		};
		let room_x = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let room_y = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (room_x / bounds.width())
			.min(room_y / bounds.height())
			.clamp(MIN_ZOOM, FIT_MAX_ZOOM);
		let (cx, cy) = (
			(bounds.min_x + bounds.max_x) / 2.0,
			(bounds.min_y + bounds.max_y) / 2.0,
		);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Screen position of the first background dot and the dot spacing.
	pub fn grid(&self) -> (f64, f64, f64) {
		let step = GRID_GAP * self.transform.k;
		(
			self.transform.x.rem_euclid(step),
			self.transform.y.rem_euclid(step),
			step,
		)
	}

	/// Zoom around the middle of the canvas, as the zoom buttons do.
	pub fn zoom_centered(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn reset_pointer(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.connect = None;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len2 = abx * abx + aby * aby;
	let t = if len2 == 0.0 {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeKind;

	fn two_nodes() -> (GraphStore, Node, Node) {
		let mut store = GraphStore::new();
		let a = store.add_node(NodeKind::Chapter, Position::new(0.0, 0.0));
		let b = store.add_node(NodeKind::SubTopic, Position::new(0.0, 400.0));
		(store, a, b)
	}

	#[test]
	fn hit_tests_respect_transform() {
		let (store, a, b) = two_nodes();
		let mut state = MindMapState::new(800.0, 600.0);
		assert_eq!(state.node_at(&store, 10.0, 10.0), Some(a.id.clone()));
		assert_eq!(state.node_at(&store, 10.0, 410.0), Some(b.id.clone()));
		assert_eq!(state.node_at(&store, 10.0, 300.0), None);

		state.transform = ViewTransform { x: 100.0, y: 0.0, k: 0.5 };
		assert_eq!(state.node_at(&store, 110.0, 10.0), Some(a.id));
		assert_eq!(state.node_at(&store, 10.0, 10.0), None);
	}

	#[test]
	fn handle_beats_node_body() {
		let (store, a, _) = two_nodes();
		let state = MindMapState::new(800.0, 600.0);
		assert_eq!(
			state.handle_at(&store, NODE_WIDTH, NODE_HEIGHT / 2.0 + 3.0),
			Some((a.id.clone(), Handle::Right))
		);
		assert_eq!(state.handle_at(&store, NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0), None);
	}

	#[test]
	fn edge_hit_uses_default_handles() {
		let (mut store, a, b) = two_nodes();
		let edge = store.connect(&a.id, &b.id, None, None).unwrap();
		let state = MindMapState::new(800.0, 600.0);

		let x = NODE_WIDTH / 2.0 + 2.0;
		assert_eq!(state.edge_at(&store, x, 275.0), Some(edge.id));
		assert_eq!(state.edge_at(&store, x + 40.0, 275.0), None);
	}

	#[test]
	fn drag_reports_only_real_moves() {
		let (_, a, _) = two_nodes();
		let mut state = MindMapState::new(800.0, 600.0);
		state.begin_drag(&a, 5.0, 5.0);
		assert_eq!(state.end_drag(), None);

		state.transform.k = 2.0;
		state.begin_drag(&a, 5.0, 5.0);
		state.drag_to(25.0, 45.0);
		assert_eq!(state.position_of(&a), Position::new(10.0, 20.0));
		assert_eq!(state.end_drag(), Some((a.id.clone(), Position::new(10.0, 20.0))));
		assert_eq!(state.position_of(&a), a.position);
	}

	#[test]
	fn delete_button_sits_in_top_right_corner() {
		let (store, a, b) = two_nodes();
		let state = MindMapState::new(800.0, 600.0);
		let (bx, by) = state.delete_button(&a);
		let (cx, cy) = (bx + DELETE_BUTTON_SIZE / 2.0, by + DELETE_BUTTON_SIZE / 2.0);

		assert_eq!(state.delete_button_at(&store, cx, cy), Some(a.id.clone()));
		assert_eq!(state.delete_button_at(&store, cx, cy + 400.0), Some(b.id));
		assert_eq!(state.delete_button_at(&store, 20.0, cy), None);
		assert_eq!(state.delete_button_at(&store, cx, cy + 200.0), None);
	}

	#[test]
	fn fit_view_brings_far_cards_on_screen() {
		let mut store = GraphStore::new();
		store.add_node(NodeKind::Chapter, Position::new(5000.0, -3000.0));
		store.add_node(NodeKind::SubTopic, Position::new(5600.0, -2600.0));
		let mut state = MindMapState::new(800.0, 600.0);
		state.fit_view(&store);

		let bounds = Bounds::of_nodes(store.nodes()).unwrap();
		let view = state.viewport();
		assert!(view.min_x <= bounds.min_x && view.max_x >= bounds.max_x);
		assert!(view.min_y <= bounds.min_y && view.max_y >= bounds.max_y);
		assert!(state.transform.k <= FIT_MAX_ZOOM);
		assert!(state.node_at(&store, 400.0, 300.0).is_none());
	}

	#[test]
	fn fit_view_does_not_magnify_a_single_card() {
		let mut store = GraphStore::new();
		let only = store.add_node(NodeKind::Chapter, Position::new(-900.0, 900.0));
		let mut state = MindMapState::new(800.0, 600.0);
		state.fit_view(&store);

		assert_eq!(state.transform.k, 1.0);
		assert_eq!(state.node_at(&store, 400.0, 300.0), Some(only.id));

		state.fit_view(&GraphStore::new());
		assert_eq!(state.transform.x, 0.0);
		assert_eq!(state.transform.k, 1.0);
	}

	#[test]
	fn grid_follows_pan_and_zoom() {
		let mut state = MindMapState::new(800.0, 600.0);
		assert_eq!(state.grid(), (0.0, 0.0, GRID_GAP));

		state.transform = ViewTransform { x: -5.0, y: 37.0, k: 2.0 };
		assert_eq!(state.grid(), (27.0, 5.0, 32.0));
	}

	#[test]
	fn zoom_buttons_respect_limits() {
		let mut state = MindMapState::new(800.0, 600.0);
		for _ in 0..100 {
			state.zoom_centered(1.2);
		}
		assert_eq!(state.transform.k, MAX_ZOOM);
		for _ in 0..100 {
			state.zoom_centered(1.0 / 1.2);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
	}

	#[test]
	fn zoom_keeps_cursor_fixed() {
		let mut state = MindMapState::new(800.0, 600.0);
		let before = state.screen_to_graph(200.0, 100.0);
		state.zoom_at(200.0, 100.0, 1.1);
		let after = state.screen_to_graph(200.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}
}
