//! Node/edge model of a mind map and the store that mutates it.

mod store;
mod types;

pub use store::GraphStore;
pub use types::{ContentPatch, Edge, EdgeId, Graph, Handle, Node, NodeId, NodeKind, Position};
