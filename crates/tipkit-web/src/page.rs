#![forbid(unsafe_code)]

//! Host page: owns elements, routes input, drives time.
//!
//! [`Page`] is the document a set of tooltip elements live in. The host
//! controls the loop:
//!
//! 1. Push input via [`Page::push_event`].
//! 2. Advance time via [`Page::advance_time`].
//! 3. Call [`Page::step`] to deliver queued input, fire elapsed deadlines
//!    and bubble notifications.
//!
//! Queued input is delivered at the clock reading of the `step` that
//! processes it. Deadlines that elapsed by that reading fire first, so a
//! late step never turns a completed show or hide into a cancellation.
//!
//! # Routing
//!
//! - A touch on an element reaches that element as-is and every *other*
//!   element as an outside touch, mirroring a document-level touch listener.
//! - A touch on the document reaches every element as an outside touch.
//! - Key events on the document reach no element.
//!
//! # Bubbling
//!
//! Element listeners run when the deadline fires; document listeners run
//! afterwards, in the order the notifications were produced.

use core::fmt;
use core::time::Duration;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tipkit_core::event::{Event, HitTarget};
use tipkit_core::geometry::{LayoutMetrics, Rect, Size};
use tipkit_core::{debug, trace, warn};
use tipkit_widgets::tooltip::{
    ListenerId, Listeners, NotificationKind, TooltipId, TooltipNotification,
};

use crate::element::TooltipElement;
use crate::{DeterministicClock, HostClock, WebHostError};

/// Handle to an element attached to a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Where an input event lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An element's trigger region (or the element for key and touch).
    Element(ElementId),
    /// The page background.
    Document,
}

/// A queued input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEvent {
    /// Where it lands.
    pub target: Target,
    /// What happened.
    pub event: Event,
}

/// A notification as seen by document listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNotification {
    /// Element that emitted it.
    pub element: ElementId,
    /// What happened.
    pub kind: NotificationKind,
    /// Host time of the transition.
    pub at: Duration,
}

/// Result of a single [`Page::step`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Number of input events delivered during this step.
    pub events_processed: u32,
    /// Notifications produced during this step, in emission order.
    pub notifications: Vec<PageNotification>,
    /// Clock reading the step ran at.
    pub now: Duration,
}

type Outbox = Rc<RefCell<VecDeque<TooltipNotification>>>;

#[derive(Debug)]
struct Entry {
    element: TooltipElement,
    forwarder: ListenerId,
    layout: Option<(Rect, Size)>,
}

/// A document holding tooltip elements.
pub struct Page<C: HostClock = DeterministicClock> {
    clock: C,
    viewport: Size,
    entries: BTreeMap<ElementId, Entry>,
    next_id: u32,
    queue: VecDeque<PageEvent>,
    outbox: Outbox,
    document_listeners: Listeners,
}

impl<C: HostClock> fmt::Debug for Page<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("now", &self.clock.now_mono())
            .field("viewport", &self.viewport)
            .field("elements", &self.entries.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl Page<DeterministicClock> {
    /// Create a page with a host-driven clock at `0`.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self::with_clock(DeterministicClock::new(), viewport)
    }

    /// Advance monotonic time by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set monotonic time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }
}

impl<C: HostClock> Page<C> {
    /// Create a page around any clock.
    #[must_use]
    pub fn with_clock(clock: C, viewport: Size) -> Self {
        Self {
            clock,
            viewport,
            entries: BTreeMap::new(),
            next_id: 0,
            queue: VecDeque::new(),
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            document_listeners: Listeners::new(),
        }
    }

    /// Current clock reading.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Current viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    // ── Elements ──────────────────────────────────────────────────────

    /// Insert an element and run its connected callback.
    pub fn append(&mut self, mut element: TooltipElement) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let outbox = Rc::clone(&self.outbox);
        let forwarder = element.add_listener(move |n| outbox.borrow_mut().push_back(*n));
        element.connected_callback();
        debug!(target: "tipkit::web", element = %id, tooltip = %element.tooltip_id(), "element appended");

        self.entries.insert(
            id,
            Entry {
                element,
                forwarder,
                layout: None,
            },
        );
        id
    }

    /// Detach an element and hand it back.
    ///
    /// Pending deadlines are dropped without notifications.
    pub fn remove(&mut self, id: ElementId) -> Result<TooltipElement, WebHostError> {
        let mut entry = self
            .entries
            .remove(&id)
            .ok_or(WebHostError::UnknownElement(id))?;
        entry.element.disconnected_callback();
        entry.element.remove_listener(entry.forwarder);
        debug!(target: "tipkit::web", element = %id, "element removed");
        Ok(entry.element)
    }

    /// Borrow an element.
    pub fn element(&self, id: ElementId) -> Result<&TooltipElement, WebHostError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.element)
            .ok_or(WebHostError::UnknownElement(id))
    }

    /// Mutably borrow an element (attributes, properties, slots).
    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut TooltipElement, WebHostError> {
        self.entries
            .get_mut(&id)
            .map(|entry| &mut entry.element)
            .ok_or(WebHostError::UnknownElement(id))
    }

    /// Ids of attached elements in insertion order.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of attached elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Layout ────────────────────────────────────────────────────────

    /// Report an element's anchor box and content size.
    ///
    /// The element receives a resize with the current viewport.
    pub fn set_layout(
        &mut self,
        id: ElementId,
        anchor: Rect,
        content: Size,
    ) -> Result<(), WebHostError> {
        let now = self.clock.now_mono();
        let viewport = self.viewport;
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(WebHostError::UnknownElement(id))?;
        entry.layout = Some((anchor, content));
        let metrics = LayoutMetrics::new(anchor, content, viewport);
        entry.element.dispatch_event(&Event::Resize(metrics), now);
        Ok(())
    }

    /// Change the viewport. Every element with a known layout is notified.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let now = self.clock.now_mono();
        for entry in self.entries.values_mut() {
            if let Some((anchor, content)) = entry.layout {
                let metrics = LayoutMetrics::new(anchor, content, viewport);
                entry.element.dispatch_event(&Event::Resize(metrics), now);
            }
        }
        debug!(
            target: "tipkit::web",
            width = viewport.width,
            height = viewport.height,
            "viewport changed"
        );
    }

    // ── Input ─────────────────────────────────────────────────────────

    /// Queue an input event for the next [`step`](Self::step).
    pub fn push_event(&mut self, target: Target, event: Event) -> Result<(), WebHostError> {
        if let Target::Element(id) = target
            && !self.entries.contains_key(&id)
        {
            return Err(WebHostError::UnknownElement(id));
        }
        self.queue.push_back(PageEvent { target, event });
        Ok(())
    }

    /// Number of queued input events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Imperative `show()` on one element, at the current time.
    pub fn show(&mut self, id: ElementId) -> Result<(), WebHostError> {
        let now = self.clock.now_mono();
        self.element_mut(id)?.show(now);
        Ok(())
    }

    /// Imperative `hide()` on one element, at the current time.
    pub fn hide(&mut self, id: ElementId) -> Result<(), WebHostError> {
        let now = self.clock.now_mono();
        self.element_mut(id)?.hide(now);
        Ok(())
    }

    // ── Listeners ─────────────────────────────────────────────────────

    /// Listen for every notification that bubbles to the document.
    pub fn add_document_listener(
        &mut self,
        callback: impl FnMut(&TooltipNotification) + 'static,
    ) -> ListenerId {
        self.document_listeners.subscribe(callback)
    }

    /// Remove a document listener.
    pub fn remove_document_listener(&mut self, id: ListenerId) -> bool {
        self.document_listeners.unsubscribe(id)
    }

    // ── Stepping ──────────────────────────────────────────────────────

    /// Earliest pending deadline across all elements.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries
            .values()
            .filter_map(|entry| entry.element.next_deadline())
            .min()
    }

    /// Deliver queued input, fire elapsed deadlines, bubble notifications.
    pub fn step(&mut self) -> StepResult {
        let now = self.clock.now_mono();

        // Deadlines that elapsed before this step complete ahead of input.
        for entry in self.entries.values_mut() {
            entry.element.advance(now);
        }

        let mut events_processed: u32 = 0;
        while let Some(PageEvent { target, event }) = self.queue.pop_front() {
            events_processed = events_processed.saturating_add(1);
            self.route(target, &event, now);
        }

        for entry in self.entries.values_mut() {
            entry.element.advance(now);
        }

        let drained: Vec<TooltipNotification> = self.outbox.borrow_mut().drain(..).collect();
        let mut notifications = Vec::with_capacity(drained.len());
        for notification in &drained {
            self.document_listeners.dispatch(notification);
            if let Some(element) = self.element_for(notification.source) {
                notifications.push(PageNotification {
                    element,
                    kind: notification.kind,
                    at: notification.at,
                });
            }
        }

        if events_processed > 0 || !notifications.is_empty() {
            trace!(
                target: "tipkit::web",
                now_ms = u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
                events_processed,
                notifications = notifications.len(),
                "step"
            );
        }

        StepResult {
            events_processed,
            notifications,
            now,
        }
    }

    fn route(&mut self, target: Target, event: &Event, now: Duration) {
        let outside = Event::touch(HitTarget::Outside);
        match (target, event) {
            (Target::Element(id), Event::Touch(_)) => {
                for (other, entry) in &mut self.entries {
                    if *other == id {
                        entry.element.dispatch_event(event, now);
                    } else {
                        entry.element.dispatch_event(&outside, now);
                    }
                }
            }
            (Target::Element(id), _) => match self.entries.get_mut(&id) {
                Some(entry) => entry.element.dispatch_event(event, now),
                None => {
                    warn!(target: "tipkit::web", element = %id, event = event.name(), "dropping event for removed element");
                }
            },
            (Target::Document, Event::Touch(_)) => {
                for entry in self.entries.values_mut() {
                    entry.element.dispatch_event(&outside, now);
                }
            }
            (Target::Document, _) => {
                trace!(target: "tipkit::web", event = event.name(), "document event not routed");
            }
        }
    }

    fn element_for(&self, source: TooltipId) -> Option<ElementId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.element.tooltip_id() == source)
            .map(|(id, _)| *id)
    }
}
