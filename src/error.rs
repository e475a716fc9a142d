//! Errors surfaced by the graph store and the persistence layer.

use thiserror::Error;

/// Result alias used throughout the editor core.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Failures reported synchronously to the interaction controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
	/// An operation referenced a node that is not live.
	#[error("node {0} not found")]
	NotFound(String),

	/// The save/load medium was unavailable or held unreadable data.
	#[error("persistence failure: {0}")]
	Persistence(String),
}

impl GraphError {
	pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
		Self::Persistence(err.to_string())
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(value: serde_json::Error) -> Self {
		Self::persistence(value)
	}
}
