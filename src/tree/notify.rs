//! Passive notifications raised when a tree lookup degrades.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::InventoryObjectRef;

/// A user-facing message about a lookup that was recovered locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// The node whose lookup failed.
    pub object: Option<InventoryObjectRef>,
}

/// Side channel for reporting recovered failures without interrupting the caller.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification.object {
            Some(object) => tracing::warn!(
                class_name = %object.class_name,
                id = %object.id,
                "{}: {}",
                notification.title,
                notification.message
            ),
            None => tracing::warn!("{}: {}", notification.title, notification.message),
        }
    }
}

/// Keeps notifications so they can be handed back to the client with the result.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().expect("notifier lock poisoned"))
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!("{}: {}", notification.title, notification.message);
        self.notifications
            .lock()
            .expect("notifier lock poisoned")
            .push(notification);
    }
}
