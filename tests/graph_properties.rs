use std::collections::HashSet;

use mind_map_canvas::error::GraphError;
use mind_map_canvas::graph::{
	ContentPatch, EdgeId, Graph, GraphStore, Handle, NodeId, NodeKind, Position,
};
use mind_map_canvas::persistence::FlowDocument;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
	Add(NodeKind, Position),
	/// Index into every node id issued so far, deleted ones included.
	Delete(usize),
	Connect(usize, usize, Option<Handle>, Option<Handle>),
	DeleteEdge(usize),
	Update(usize, String, String),
	Reload,
}

fn kind() -> impl Strategy<Value = NodeKind> {
	prop::sample::select(NodeKind::ALL.to_vec())
}

fn handle() -> impl Strategy<Value = Option<Handle>> {
	prop::option::of(prop::sample::select(Handle::ALL.to_vec()))
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		4 => (kind(), -5000i32..5000, -5000i32..5000)
			.prop_map(|(k, x, y)| Op::Add(k, Position::new(x.into(), y.into()))),
		2 => any::<usize>().prop_map(Op::Delete),
		4 => (any::<usize>(), any::<usize>(), handle(), handle())
			.prop_map(|(s, t, sh, th)| Op::Connect(s, t, sh, th)),
		1 => any::<usize>().prop_map(Op::DeleteEdge),
		1 => (any::<usize>(), "\\PC{0,12}", "(<p>[a-z ]{0,10}</p>)?")
			.prop_map(|(i, title, body)| Op::Update(i, title, body)),
		1 => Just(Op::Reload),
	]
}

fn pick<T: Clone>(items: &[T], index: usize) -> Option<T> {
	(!items.is_empty()).then(|| items[index % items.len()].clone())
}

fn through_document(graph: &Graph) -> Graph {
	let text = FlowDocument::from_graph(graph).to_json().unwrap();
	FlowDocument::from_json(&text).unwrap().into_graph()
}

fn assert_no_dangling(store: &GraphStore) -> Result<(), TestCaseError> {
	for edge in store.edges() {
		prop_assert!(store.contains_node(&edge.source), "{} has no source", edge.id);
		prop_assert!(store.contains_node(&edge.target), "{} has no target", edge.id);
	}
	Ok(())
}

proptest! {
	#[test]
	fn ids_are_never_reissued(ops in prop::collection::vec(op(), 1..80)) {
		let mut store = GraphStore::new();
		let mut issued: Vec<NodeId> = Vec::new();
		let mut node_ids = HashSet::new();
		let mut edge_ids: HashSet<EdgeId> = HashSet::new();

		for op in ops {
			match op {
				Op::Add(kind, position) => {
					let node = store.add_node(kind, position);
					prop_assert!(node_ids.insert(node.id.clone()), "node id {} reissued", node.id);
					issued.push(node.id);
				}
				Op::Delete(i) => {
					if let Some(id) = pick(&issued, i) {
						store.delete_node(&id);
					}
				}
				Op::Connect(s, t, sh, th) => {
					if let (Some(source), Some(target)) = (pick(&issued, s), pick(&issued, t)) {
						if let Ok(edge) = store.connect(&source, &target, sh, th) {
							prop_assert!(edge_ids.insert(edge.id.clone()), "edge id {} reissued", edge.id);
						}
					}
				}
				Op::DeleteEdge(i) => {
					let live: Vec<EdgeId> = store.edges().iter().map(|e| e.id.clone()).collect();
					if let Some(id) = pick(&live, i) {
						store.delete_edge(&id);
					}
				}
				Op::Update(i, title, body) => {
					if let Some(id) = pick(&issued, i) {
						let _ = store.update_node_content(&id, ContentPatch { title: Some(title), body: Some(body) });
					}
				}
				Op::Reload => store.restore(through_document(&store.snapshot())),
			}
			assert_no_dangling(&store)?;
		}
	}

	#[test]
	fn delete_removes_exactly_the_touching_edges(
		ops in prop::collection::vec(op(), 1..60),
		victim in any::<usize>(),
	) {
		let mut store = GraphStore::new();
		let mut issued: Vec<NodeId> = Vec::new();
		for op in ops {
			match op {
				Op::Add(kind, position) => issued.push(store.add_node(kind, position).id),
				Op::Connect(s, t, sh, th) => {
					if let (Some(source), Some(target)) = (pick(&issued, s), pick(&issued, t)) {
						let _ = store.connect(&source, &target, sh, th);
					}
				}
				_ => {}
			}
		}
		let Some(id) = pick(&issued, victim) else {
			return Ok(());
		};

		let before = store.edges().to_vec();
		let removed = store.delete_node(&id);

		let touching: Vec<EdgeId> = before.iter().filter(|e| e.touches(&id)).map(|e| e.id.clone()).collect();
		let kept: Vec<_> = before.iter().filter(|e| !e.touches(&id)).cloned().collect();
		prop_assert_eq!(removed, touching);
		prop_assert_eq!(store.edges(), kept.as_slice());
		prop_assert!(!store.contains_node(&id));
		prop_assert!(store.delete_node(&id).is_empty());
	}

	#[test]
	fn saved_graph_restores_unchanged(ops in prop::collection::vec(op(), 0..60)) {
		let mut store = GraphStore::new();
		let mut issued: Vec<NodeId> = Vec::new();
		for op in ops {
			match op {
				Op::Add(kind, position) => issued.push(store.add_node(kind, position).id),
				Op::Delete(i) => {
					if let Some(id) = pick(&issued, i) {
						store.delete_node(&id);
					}
				}
				Op::Connect(s, t, sh, th) => {
					if let (Some(source), Some(target)) = (pick(&issued, s), pick(&issued, t)) {
						let live = store.contains_node(&source) && store.contains_node(&target);
						match store.connect(&source, &target, sh, th) {
							Ok(edge) => {
								prop_assert!(live);
								prop_assert_eq!(store.edge(&edge.id), Some(&edge));
							}
							Err(err) => {
								prop_assert!(!live);
								prop_assert!(matches!(err, GraphError::NotFound(_)));
							}
						}
					}
				}
				Op::Update(i, title, body) => {
					if let Some(id) = pick(&issued, i) {
						let _ = store.update_node_content(&id, ContentPatch { title: Some(title), body: Some(body) });
					}
				}
				Op::DeleteEdge(_) | Op::Reload => {}
			}
		}

		let before = store.snapshot();
		let restored = GraphStore::from_graph(through_document(&before));
		prop_assert_eq!(restored.snapshot(), before);
	}
}

#[test]
fn exhausted_id_in_a_saved_flow_does_not_break_new_ids() {
	let text = format!(
		r#"{{ "version": 1, "nodes": [
			{{ "id": "n{max}", "type": "textNode", "position": {{ "x": 0, "y": 0 }},
			   "data": {{ "label": "Last", "type": "chapter" }} }},
			{{ "id": "n2", "type": "textNode", "position": {{ "x": 0, "y": 0 }},
			   "data": {{ "label": "Two", "type": "chapter" }} }} ],
		  "edges": [ {{ "id": "e1", "source": "n{max}", "target": "n2" }} ] }}"#,
		max = u64::MAX
	);
	let mut store = GraphStore::from_graph(FlowDocument::from_json(&text).unwrap().into_graph());
	assert_eq!(store.nodes().len(), 1);
	assert!(store.edges().is_empty());

	let mut seen: HashSet<NodeId> = store.nodes().iter().map(|n| n.id.clone()).collect();
	for _ in 0..3 {
		let node = store.add_node(NodeKind::SubTopic, Position::default());
		assert!(seen.insert(node.id.clone()), "reused {}", node.id);
	}
}
