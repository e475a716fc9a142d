use std::collections::HashMap;

use crate::error::{GraphError, Result};

/// Key/value medium a saved flow is written to.
pub trait FlowStorage {
	/// Returns `None` when nothing was saved under `key`.
	fn load(&self, key: &str) -> Result<Option<String>>;
	/// Writes `value` under `key`, replacing what was there.
	fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// The browser's `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
	fn storage() -> Result<web_sys::Storage> {
		web_sys::window()
			.ok_or_else(|| GraphError::persistence("no window"))?
			.local_storage()
			.map_err(|e| GraphError::persistence(format!("{e:?}")))?
			.ok_or_else(|| GraphError::persistence("localStorage is unavailable"))
	}
}

impl FlowStorage for BrowserStorage {
	fn load(&self, key: &str) -> Result<Option<String>> {
		Self::storage()?
			.get_item(key)
			.map_err(|e| GraphError::persistence(format!("{e:?}")))
	}

	fn save(&mut self, key: &str, value: &str) -> Result<()> {
		Self::storage()?
			.set_item(key, value)
			.map_err(|e| GraphError::persistence(format!("{e:?}")))
	}
}

/// In-process storage, used off the browser.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
	entries: HashMap<String, String>,
	/// When set, every call fails, like a full or blocked quota.
	pub unavailable: bool,
}

impl MemoryStorage {
	/// Empty storage.
	pub fn new() -> Self {
		Self::default()
	}

	/// Storage already holding one entry.
	pub fn with_entry(key: &str, value: &str) -> Self {
		let mut storage = Self::new();
		storage.entries.insert(key.to_owned(), value.to_owned());
		storage
	}

	/// Raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	fn check(&self) -> Result<()> {
		if self.unavailable {
			return Err(GraphError::persistence("storage unavailable"));
		}
		Ok(())
	}
}

impl FlowStorage for MemoryStorage {
	fn load(&self, key: &str) -> Result<Option<String>> {
		self.check()?;
		Ok(self.entries.get(key).cloned())
	}

	fn save(&mut self, key: &str, value: &str) -> Result<()> {
		self.check()?;
		self.entries.insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}
