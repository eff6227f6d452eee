#![forbid(unsafe_code)]

//! Visibility notifications and listener registration.
//!
//! The controller never knows who is listening. Hosts register callbacks
//! with [`Listeners::subscribe`] or take a channel from
//! [`notification_channel`] and drain it at their own pace.

use core::fmt;
use core::time::Duration;
use std::sync::mpsc;

use super::a11y::TooltipId;

/// Which visibility transition completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The tooltip became visible.
    Shown,
    /// The tooltip became hidden.
    Hidden,
}

impl NotificationKind {
    /// DOM event name for this notification.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Shown => "tooltip-show",
            Self::Hidden => "tooltip-hide",
        }
    }

    /// Parse a DOM event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "tooltip-show" => Some(Self::Shown),
            "tooltip-hide" => Some(Self::Hidden),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A completed visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipNotification {
    /// What happened.
    pub kind: NotificationKind,
    /// Which tooltip it happened to.
    pub source: TooltipId,
    /// Host time at which the transition completed.
    pub at: Duration,
}

impl TooltipNotification {
    /// Notifications propagate to ancestors.
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        true
    }

    /// Notifications cross shadow-root boundaries.
    #[must_use]
    pub const fn composed(&self) -> bool {
        true
    }
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&TooltipNotification)>;

/// Ordered list of notification callbacks.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Callback)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    /// Create an empty listener list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn subscribe(&mut self, callback: impl FnMut(&TooltipNotification) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Deliver a notification to every callback.
    pub fn dispatch(&mut self, notification: &TooltipNotification) {
        for (_, callback) in &mut self.entries {
            callback(notification);
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a callback that forwards notifications into a channel.
///
/// Sends after the receiver is dropped are ignored.
pub fn notification_channel() -> (
    impl FnMut(&TooltipNotification) + 'static,
    mpsc::Receiver<TooltipNotification>,
) {
    let (tx, rx) = mpsc::channel();
    let forward = move |n: &TooltipNotification| {
        let _ = tx.send(*n);
    };
    (forward, rx)
}
