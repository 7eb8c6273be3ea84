//! Host notification capability.
//!
//! The engine never talks to a platform notification API directly. Hosts
//! hand it a [`Notifier`], and the engine asks two things of it: whether
//! permission is currently granted, and to display a payload. Display is
//! fire-and-forget; a host that cannot show anything right now may
//! silently drop it.

use crate::reminders::Payload;

/// Every host notification backend implements this trait.
pub trait Notifier {
    /// Whether the user currently allows notifications. Checked before
    /// every delivery; a denied answer leaves the delivery log untouched.
    fn permission_granted(&self) -> bool;

    /// Display a notification. Best effort, never fails.
    fn display(&self, payload: &Payload);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn permission_granted(&self) -> bool {
        (**self).permission_granted()
    }

    fn display(&self, payload: &Payload) {
        (**self).display(payload)
    }
}

/// Notifier that prints to stdout.
///
/// The delivery path for the CLI host; also handy in examples. Permission
/// mirrors the `notifications.enabled` config switch.
pub struct TerminalNotifier {
    enabled: bool,
}

impl TerminalNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for TerminalNotifier {
    fn permission_granted(&self) -> bool {
        self.enabled
    }

    fn display(&self, payload: &Payload) {
        if payload.body.is_empty() {
            println!("[reminder] {}", payload.title);
        } else {
            println!("[reminder] {}: {}", payload.title, payload.body);
        }
    }
}
