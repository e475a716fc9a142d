//! Editor settings.

use log::{info, warn};
use serde::Deserialize;

use crate::controller::FlowStorage;

/// Storage key a settings override is read from at start.
pub const CONFIG_KEY: &str = "editor-config";

/// Tunables for the editor. Every field has a default, so a partial JSON
/// override such as `{"storage_key": "draft"}` is accepted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Key the saved flow lives under in storage.
	pub storage_key: String,
	/// New nodes land inside `[0, spawn_extent)` on both axes.
	pub spawn_extent: f64,
	/// Title of the chapter placed on an empty canvas at start, if any.
	pub seed_title: Option<String>,
	/// How long a toast stays visible.
	pub toast_millis: u64,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			storage_key: "flow".to_owned(),
			spawn_extent: 500.0,
			seed_title: Some("My First Chapter".to_owned()),
			toast_millis: 3000,
		}
	}
}

impl EditorConfig {
	/// Parses a JSON override on top of the defaults.
	pub fn from_json(text: &str) -> crate::error::Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Settings stored under [`CONFIG_KEY`]. Falls back to the defaults when
	/// nothing is stored or the override cannot be read.
	pub fn load(storage: &impl FlowStorage) -> Self {
		let text = match storage.load(CONFIG_KEY) {
			Ok(Some(text)) => text,
			Ok(None) => return Self::default(),
			Err(err) => {
				warn!("reading editor settings: {err}");
				return Self::default();
			}
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("using editor settings from {CONFIG_KEY:?}");
				config
			}
			Err(err) => {
				warn!("ignoring editor settings: {err}");
				Self::default()
			}
		}
	}
}
