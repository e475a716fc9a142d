//! Maps user gestures onto graph store calls, persistence and notifications.

mod notify;
mod storage;

use log::{debug, info, warn};

pub use notify::{Level, Notification, Notifier, RecordingNotifier};
pub use storage::{BrowserStorage, FlowStorage, MemoryStorage};

use crate::config::EditorConfig;
use crate::error::Result;
use crate::graph::{
	ContentPatch, Edge, EdgeId, GraphStore, Handle, Node, NodeId, NodeKind, Position,
};
use crate::persistence::FlowDocument;

const SEED_POSITION: Position = Position::new(250.0, 100.0);
/// Draws tried before settling for the least crowded spot.
const PLACEMENT_ATTEMPTS: usize = 32;

/// Editing lifecycle of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditState {
	/// Card shows stored content.
	Viewing,
	/// Card shows the draft of an open session.
	Editing,
}

/// Editable text of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeContent {
	/// Plain text title.
	pub title: String,
	/// Body markup.
	pub body: String,
}

impl From<&Node> for NodeContent {
	fn from(node: &Node) -> Self {
		Self {
			title: node.title.clone(),
			body: node.body.clone(),
		}
	}
}

/// Open edit of one node. Keystrokes land in `draft`; the store is only
/// touched when the session is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
	/// Node being edited.
	pub node: NodeId,
	/// Content when the session began.
	pub original: NodeContent,
	/// Content typed so far.
	pub draft: NodeContent,
}

/// Owns the graph store for one canvas and turns gestures into mutations.
pub struct InteractionController<S, N> {
	store: GraphStore,
	storage: S,
	notifier: N,
	config: EditorConfig,
	session: Option<EditSession>,
	placements: u64,
}

impl<S: FlowStorage, N: Notifier> InteractionController<S, N> {
	/// Controller over an empty store; call [`start`](Self::start) to load.
	pub fn new(storage: S, notifier: N, config: EditorConfig) -> Self {
		Self {
			store: GraphStore::new(),
			storage,
			notifier,
			config,
			session: None,
			placements: 0,
		}
	}

	/// Read access to the graph.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// Where flows are saved.
	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Mutable access to the save medium.
	pub fn storage_mut(&mut self) -> &mut S {
		&mut self.storage
	}

	/// Sink for user-visible messages.
	pub fn notifier(&self) -> &N {
		&self.notifier
	}

	/// Active settings.
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// App start: restore the last save, or seed an empty canvas.
	pub fn start(&mut self) {
		if let Ok(true) = self.load() {
			return;
		}
		let Some(title) = self.config.seed_title.clone() else {
			return;
		};
		let seed = self.store.add_node(NodeKind::Chapter, SEED_POSITION);
		if let Err(err) = self.store.update_node_content(&seed.id, ContentPatch::title(title)) {
			warn!("seeding canvas: {err}");
		}
	}

	/// Adds a node of `kind` at a free spot inside the spawn extent.
	pub fn add_node(&mut self, kind: NodeKind) -> Node {
		let position = self.next_placement();
		let node = self.store.add_node(kind, position);
		self.notifier.notify(Notification::success(format!(
			"Added new {}",
			kind.display_name()
		)));
		node
	}

	/// Whether `id` is being edited.
	pub fn edit_state(&self, id: &NodeId) -> EditState {
		match &self.session {
			Some(session) if &session.node == id => EditState::Editing,
			_ => EditState::Viewing,
		}
	}

	/// The open edit, if any.
	pub fn session(&self) -> Option<&EditSession> {
		self.session.as_ref()
	}

	/// `Viewing -> Editing`. An edit already open on another node is
	/// committed first, as focus leaving it would.
	pub fn begin_edit(&mut self, id: &NodeId) -> Result<()> {
		if self.edit_state(id) == EditState::Editing {
			return Ok(());
		}
		if let Err(err) = self.commit_edit() {
			debug!("previous edit not committed: {err}");
		}

		let node = self
			.store
			.node(id)
			.ok_or_else(|| crate::error::GraphError::NotFound(id.to_string()));
		let content = NodeContent::from(self.report(node)?);
		debug!("begin edit of {id}");
		self.session = Some(EditSession {
			node: id.clone(),
			original: content.clone(),
			draft: content,
		});
		Ok(())
	}

	/// Replaces the draft title of the open session.
	pub fn edit_title(&mut self, title: impl Into<String>) {
		if let Some(session) = &mut self.session {
			session.draft.title = title.into();
		}
	}

	/// Replaces the draft body of the open session.
	pub fn edit_body(&mut self, markup: impl Into<String>) {
		if let Some(session) = &mut self.session {
			session.draft.body = markup.into();
		}
	}

	/// `Editing -> Viewing`, writing the draft with a single store update.
	/// Returns `None` when no edit was open.
	pub fn commit_edit(&mut self) -> Result<Option<Node>> {
		let Some(session) = self.session.take() else {
			return Ok(None);
		};
		let patch = ContentPatch {
			title: Some(session.draft.title),
			body: Some(session.draft.body),
		};
		let updated = self.store.update_node_content(&session.node, patch);
		self.report(updated).map(Some)
	}

	/// Drops the open edit and returns the values captured when it began.
	pub fn cancel_edit(&mut self) -> Option<NodeContent> {
		self.session.take().map(|session| session.original)
	}

	/// Deletes a node and its edges, ending its edit session.
	pub fn delete_node(&mut self, id: &NodeId) {
		if self.edit_state(id) == EditState::Editing {
			self.session = None;
		}
		self.store.delete_node(id);
		self.notifier.notify(Notification::success("Node deleted"));
	}

	/// Connects two nodes; a missing endpoint is reported.
	pub fn connect(
		&mut self,
		source: &NodeId,
		source_handle: Option<Handle>,
		target: &NodeId,
		target_handle: Option<Handle>,
	) -> Result<Edge> {
		let edge = self.store.connect(source, target, source_handle, target_handle);
		self.report(edge)
	}

	/// Removes one edge.
	pub fn delete_edge(&mut self, id: &EdgeId) -> bool {
		self.store.delete_edge(id)
	}

	/// Stores the position a drag ended at.
	pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<Node> {
		let moved = self.store.move_node(id, position);
		self.report(moved)
	}

	/// Writes the current graph to storage as a versioned document.
	pub fn save(&mut self) -> Result<()> {
		let saved = FlowDocument::from_graph(&self.store.snapshot())
			.to_json()
			.and_then(|json| self.storage.save(&self.config.storage_key, &json));
		self.report(saved)?;
		info!("saved flow under {:?}", self.config.storage_key);
		self.notifier.notify(Notification::success("Flow saved successfully!"));
		Ok(())
	}

	/// Replaces the canvas with the saved flow. Returns `false` when there
	/// is no save; the current graph is kept on any failure.
	pub fn load(&mut self) -> Result<bool> {
		let loaded = self.storage.load(&self.config.storage_key);
		let Some(text) = self.report(loaded)? else {
			return Ok(false);
		};
		let doc = FlowDocument::from_json(&text);
		let graph = self.report(doc)?.into_graph();
		self.session = None;
		self.store.restore(graph);
		self.placements = self.store.nodes().len() as u64;
		info!("loaded flow from {:?}", self.config.storage_key);
		Ok(true)
	}

	fn report<T>(&self, result: Result<T>) -> Result<T> {
		if let Err(err) = &result {
			warn!("{err}");
			self.notifier.notify(Notification::error(err.to_string()));
		}
		result
	}

	/// First drawn spot that covers no card, else the one covering fewest.
	fn next_placement(&mut self) -> Position {
		let extent = self.config.spawn_extent;
		let mut best: Option<(usize, Position)> = None;
		for _ in 0..PLACEMENT_ATTEMPTS {
			let candidate = Position::new(
				scatter(&mut self.placements) * extent,
				scatter(&mut self.placements) * extent,
			);
			let covered = self.store.nodes().iter().filter(|n| n.overlaps(candidate)).count();
			if covered == 0 {
				return candidate;
			}
			if best.is_none_or(|(fewest, _)| covered < fewest) {
				best = Some((covered, candidate));
			}
		}
		best.map_or_else(Position::default, |(_, position)| position)
	}
}

/// Steps a linear congruential sequence, returning a value in `[0, 1)`.
fn scatter(state: &mut u64) -> f64 {
	*state = (*state * 9301 + 49297) % 233280;
	*state as f64 / 233280.0
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::GraphError;

	type Controller = InteractionController<MemoryStorage, RecordingNotifier>;

	fn controller() -> Controller {
		InteractionController::new(
			MemoryStorage::new(),
			RecordingNotifier::default(),
			EditorConfig::default(),
		)
	}

	#[test]
	fn add_node_notifies_and_places_inside_extent() {
		let mut c = controller();
		let node = c.add_node(NodeKind::MainTopic);
		let other = c.add_node(NodeKind::MainTopic);

		assert!((0.0..500.0).contains(&node.position.x));
		assert!((0.0..500.0).contains(&node.position.y));
		assert_ne!(node.position, other.position);
		assert_eq!(
			c.notifier().take()[0],
			Notification::success("Added new main topic")
		);
	}

	#[test]
	fn keystrokes_do_not_reach_store_until_commit() {
		let mut c = controller();
		let node = c.add_node(NodeKind::Chapter);
		c.begin_edit(&node.id).unwrap();
		assert_eq!(c.edit_state(&node.id), EditState::Editing);

		c.edit_title("I");
		c.edit_title("In");
		c.edit_title("Intro");
		c.edit_body("<p>body</p>");
		assert_eq!(c.store().node(&node.id).unwrap().title, "New chapter");

		let committed = c.commit_edit().unwrap().unwrap();
		assert_eq!(committed.title, "Intro");
		assert_eq!(committed.body, "<p>body</p>");
		assert_eq!(c.edit_state(&node.id), EditState::Viewing);
		assert_eq!(c.commit_edit(), Ok(None));
	}

	#[test]
	fn beginning_another_edit_commits_the_open_one() {
		let mut c = controller();
		let a = c.add_node(NodeKind::Chapter);
		let b = c.add_node(NodeKind::SubTopic);
		c.begin_edit(&a.id).unwrap();
		c.edit_title("First");
		c.begin_edit(&b.id).unwrap();

		assert_eq!(c.store().node(&a.id).unwrap().title, "First");
		assert_eq!(c.edit_state(&a.id), EditState::Viewing);
		assert_eq!(c.edit_state(&b.id), EditState::Editing);
	}

	#[test]
	fn cancel_returns_pre_edit_values() {
		let mut c = controller();
		let node = c.add_node(NodeKind::Chapter);
		c.begin_edit(&node.id).unwrap();
		c.edit_title("scratch");

		let original = c.cancel_edit().unwrap();
		assert_eq!(original.title, "New chapter");
		assert_eq!(c.store().node(&node.id).unwrap().title, "New chapter");
		assert!(c.session().is_none());
	}

	#[test]
	fn begin_edit_of_missing_node_reports() {
		let mut c = controller();
		c.notifier().take();
		assert_eq!(
			c.begin_edit(&"n3".into()),
			Err(GraphError::NotFound("n3".into()))
		);
		assert_eq!(c.notifier().take()[0].level, Level::Error);
	}

	#[test]
	fn deleting_edited_node_ends_session() {
		let mut c = controller();
		let node = c.add_node(NodeKind::Chapter);
		c.begin_edit(&node.id).unwrap();
		c.delete_node(&node.id);

		assert!(c.session().is_none());
		assert_eq!(c.commit_edit(), Ok(None));
		assert!(c.store().is_empty());
	}

	#[test]
	fn connect_failure_is_notified() {
		let mut c = controller();
		let a = c.add_node(NodeKind::Chapter);
		c.notifier().take();

		assert!(c.connect(&a.id, None, &"nope".into(), None).is_err());
		let seen = c.notifier().take();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].level, Level::Error);
	}

	#[test]
	fn save_then_load_round_trips() {
		let mut c = controller();
		let a = c.add_node(NodeKind::Chapter);
		let b = c.add_node(NodeKind::SubTopic);
		c.connect(&a.id, Some(Handle::Bottom), &b.id, Some(Handle::Top))
			.unwrap();
		let before = c.store().snapshot();
		c.save().unwrap();
		assert!(c.storage().get("flow").is_some());

		c.delete_node(&a.id);
		assert!(c.load().unwrap());
		assert_eq!(c.store().snapshot(), before);
	}

	#[test]
	fn failed_save_keeps_graph_and_notifies() {
		let mut c = controller();
		c.add_node(NodeKind::Chapter);
		c.storage_mut().unavailable = true;
		c.notifier().take();

		assert!(matches!(c.save(), Err(GraphError::Persistence(_))));
		assert_eq!(c.notifier().take()[0].level, Level::Error);
		assert_eq!(c.store().nodes().len(), 1);
	}

	#[test]
	fn corrupt_save_is_reported_not_applied() {
		let mut c = InteractionController::new(
			MemoryStorage::with_entry("flow", "{ not json"),
			RecordingNotifier::default(),
			EditorConfig::default(),
		);
		let node = c.add_node(NodeKind::Chapter);

		assert!(c.load().is_err());
		assert!(c.store().contains_node(&node.id));
	}

	#[test]
	fn start_seeds_empty_canvas() {
		let mut c = controller();
		c.start();

		let nodes = c.store().nodes();
		assert_eq!(nodes.len(), 1);
		assert_eq!(nodes[0].title, "My First Chapter");
		assert_eq!(nodes[0].kind, NodeKind::Chapter);
		assert_eq!(nodes[0].position, Position::new(250.0, 100.0));
	}

	#[test]
	fn reloaded_flow_places_new_cards_on_free_space() {
		let mut first = controller();
		first.start();
		first.add_node(NodeKind::MainTopic);
		first.add_node(NodeKind::SubTopic);
		first.save().unwrap();
		let saved = first.storage().get("flow").unwrap().to_owned();

		let mut second = InteractionController::new(
			MemoryStorage::with_entry("flow", &saved),
			RecordingNotifier::default(),
			EditorConfig::default(),
		);
		second.start();
		let existing = second.store().nodes().to_vec();
		assert_eq!(existing.len(), 3);

		let added = second.add_node(NodeKind::SubTopic);
		assert!(
			existing.iter().all(|n| !n.overlaps(added.position)),
			"{:?} lands on an existing card",
			added.position
		);
	}

	#[test]
	fn crowded_extent_still_places_inside_it() {
		let mut c = InteractionController::new(
			MemoryStorage::new(),
			RecordingNotifier::default(),
			EditorConfig {
				spawn_extent: 50.0,
				..EditorConfig::default()
			},
		);
		let first = c.add_node(NodeKind::Chapter);
		let second = c.add_node(NodeKind::Chapter);
		assert!(first.overlaps(second.position));
		assert!((0.0..50.0).contains(&second.position.x));
		assert!((0.0..50.0).contains(&second.position.y));
	}

	#[test]
	fn start_prefers_saved_flow() {
		let saved = r#"{ "version": 1, "nodes": [
			{ "id": "n4", "type": "textNode", "position": { "x": 0, "y": 0 },
			  "data": { "label": "Saved", "type": "sub-topic" } } ], "edges": [] }"#;
		let mut c = InteractionController::new(
			MemoryStorage::with_entry("flow", saved),
			RecordingNotifier::default(),
			EditorConfig::default(),
		);
		c.start();

		assert_eq!(c.store().nodes().len(), 1);
		assert_eq!(c.store().nodes()[0].title, "Saved");
		assert_eq!(c.add_node(NodeKind::Chapter).id, NodeId::from("n5"));
	}
}
