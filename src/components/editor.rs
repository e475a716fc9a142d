use std::cell::Cell;
use std::time::Duration;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use crate::controller::{BrowserStorage, InteractionController, Notification, Notifier};

pub type EditorController = InteractionController<BrowserStorage, ToastNotifier>;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub notification: Notification,
}

/// Pushes notifications into a toast list and expires them after a delay.
pub struct ToastNotifier {
	toasts: RwSignal<Vec<Toast>>,
	next_id: Cell<u64>,
	lifetime: Duration,
}

impl ToastNotifier {
	pub fn new(toasts: RwSignal<Vec<Toast>>, millis: u64) -> Self {
		Self {
			toasts,
			next_id: Cell::new(0),
			lifetime: Duration::from_millis(millis),
		}
	}
}

impl Notifier for ToastNotifier {
	fn notify(&self, notification: Notification) {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		log::debug!("toast: {}", notification.message);
		self.toasts.update(|t| t.push(Toast { id, notification }));

		let toasts = self.toasts;
		set_timeout(
			move || {
				toasts.try_update(|t| t.retain(|toast| toast.id != id));
			},
			self.lifetime,
		);
	}
}

/// Copyable handle to the controller shared by every editor component.
///
/// `revision` ticks after each mutation so reactive views can re-read;
/// the canvas reads on every frame and uses [`Editor::peek`] instead.
#[derive(Clone, Copy)]
pub struct Editor {
	controller: StoredValue<EditorController, LocalStorage>,
	revision: RwSignal<u64>,
}

impl Editor {
	pub fn new(controller: EditorController) -> Self {
		Self {
			controller: StoredValue::new_local(controller),
			revision: RwSignal::new(0),
		}
	}

	/// Tracked read.
	pub fn read<R>(&self, f: impl FnOnce(&EditorController) -> R) -> Option<R> {
		self.revision.track();
		self.controller.try_with_value(f)
	}

	/// Untracked read.
	pub fn peek<R>(&self, f: impl FnOnce(&EditorController) -> R) -> Option<R> {
		self.controller.try_with_value(f)
	}

	/// Mutation that views should react to.
	pub fn update<R>(&self, f: impl FnOnce(&mut EditorController) -> R) -> Option<R> {
		let out = self.controller.try_update_value(f);
		self.revision.update(|r| *r += 1);
		out
	}

	/// Mutation of the edit buffer only; no view re-renders.
	pub fn update_quiet<R>(&self, f: impl FnOnce(&mut EditorController) -> R) -> Option<R> {
		self.controller.try_update_value(f)
	}
}
