/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
	/// An action completed.
	Success,
	/// An action failed; the graph is unchanged.
	Error,
}

/// A transient, user-visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
	/// Severity.
	pub level: Level,
	/// Text shown to the user.
	pub message: String,
}

impl Notification {
	/// Success message.
	pub fn success(message: impl Into<String>) -> Self {
		Self {
			level: Level::Success,
			message: message.into(),
		}
	}

	/// Error message.
	pub fn error(message: impl Into<String>) -> Self {
		Self {
			level: Level::Error,
			message: message.into(),
		}
	}
}

/// Fire-and-forget sink for notifications.
pub trait Notifier {
	/// Shows or records one notification.
	fn notify(&self, notification: Notification);
}

/// Keeps every notification, newest last.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	seen: std::cell::RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
	/// Drains what was recorded so far.
	pub fn take(&self) -> Vec<Notification> {
		std::mem::take(&mut *self.seen.borrow_mut())
	}
}

impl Notifier for RecordingNotifier {
	fn notify(&self, notification: Notification) {
		self.seen.borrow_mut().push(notification);
	}
}
