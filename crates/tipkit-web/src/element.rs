#![forbid(unsafe_code)]

//! The embeddable `<tip-tooltip>` element.
//!
//! [`TooltipElement`] is the element surface around a
//! [`TooltipController`]: a string attribute map (three of which are
//! observed), typed property mirrors that write through those attributes,
//! two named slots, lifecycle callbacks, and event-name based listeners.
//!
//! Attribute writes follow the DOM rule that setting an attribute to its
//! current value does not re-run the change callback. Names the DOM would
//! reject (empty, or containing whitespace, quotes, `/`, `=` or `>`) are
//! refused and never reach the attribute map.

use core::time::Duration;
use std::collections::BTreeMap;

use tipkit_core::event::Event;
use tipkit_core::{debug, trace, warn};
use tipkit_widgets::tooltip::{
    ConfigChange, ListenerId, NotificationKind, OBSERVED_ATTRIBUTES, Placement,
    TooltipController, TooltipId, TooltipNotification, TooltipView,
};

use crate::markup::ShadowMarkup;

/// Custom element tag name.
pub const TAG_NAME: &str = "tip-tooltip";

/// Default trigger content: a 24x24 circled "i" glyph.
pub const DEFAULT_TRIGGER_MARKUP: &str = concat!(
    r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">"#,
    r#"<circle cx="12" cy="12" r="10"/>"#,
    r#"<path d="M12 16v-4"/>"#,
    r#"<path d="M12 8h.01"/>"#,
    "</svg>",
);

/// Default content text.
pub const DEFAULT_CONTENT_MARKUP: &str = "Info";

/// Named insertion points in the shadow tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotName {
    /// The hover/focus target.
    Trigger,
    /// The tooltip body.
    Content,
}

impl SlotName {
    /// The `name` attribute of the slot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Content => "content",
        }
    }

    /// Fallback markup rendered when nothing is assigned.
    #[must_use]
    pub const fn default_markup(self) -> &'static str {
        match self {
            Self::Trigger => DEFAULT_TRIGGER_MARKUP,
            Self::Content => DEFAULT_CONTENT_MARKUP,
        }
    }
}

/// Embeddable tooltip element.
#[derive(Debug, Default)]
pub struct TooltipElement {
    controller: TooltipController,
    attributes: BTreeMap<String, String>,
    trigger: Option<String>,
    content: Option<String>,
}

impl TooltipElement {
    /// Create an element with default configuration and no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`set_slot`](Self::set_slot).
    #[must_use]
    pub fn slot(mut self, slot: SlotName, markup: impl Into<String>) -> Self {
        self.set_slot(slot, markup);
        self
    }

    // ── Attributes ────────────────────────────────────────────────────

    /// Read an attribute.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether an attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// All attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Set an attribute. Observed attributes reconfigure the tooltip.
    ///
    /// Invalid attribute names are refused with a warning.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        if !is_valid_attribute_name(name) {
            warn!(target: "tipkit::web", name, "invalid attribute name refused");
            return;
        }
        let value = value.into();
        if self.attributes.get(name) == Some(&value) {
            trace!(target: "tipkit::web", name, "attribute unchanged");
            return;
        }
        self.attributes.insert(name.to_string(), value.clone());
        self.attribute_changed(name, Some(value.as_str()));
    }

    /// Remove an attribute. Returns `false` if it was absent.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        if self.attributes.remove(name).is_none() {
            return false;
        }
        self.attribute_changed(name, None);
        true
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn attribute_changed(&mut self, name: &str, value: Option<&str>) {
        if !OBSERVED_ATTRIBUTES.contains(&name) {
            return;
        }
        let changed = self.controller.set_attribute(name, value);
        debug!(
            target: "tipkit::web",
            id = %self.controller.id(),
            name,
            value = value.unwrap_or("<removed>"),
            changed,
            "observed attribute changed"
        );
    }

    // ── Properties ────────────────────────────────────────────────────

    /// Requested placement.
    #[must_use]
    pub const fn position(&self) -> Placement {
        self.controller.placement()
    }

    /// Set the requested placement through the `position` attribute.
    pub fn set_position(&mut self, placement: Placement) {
        self.reflect(ConfigChange::Placement(placement));
    }

    /// Activation delay in milliseconds.
    #[must_use]
    pub const fn delay(&self) -> u64 {
        self.controller.activation_delay_ms()
    }

    /// Set the activation delay through the `delay` attribute.
    pub fn set_delay(&mut self, ms: u64) {
        self.reflect(ConfigChange::ActivationDelay(ms));
    }

    /// Whether activation is suppressed.
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.controller.is_disabled()
    }

    /// Add or remove the `disabled` attribute.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.reflect(ConfigChange::Disabled(disabled));
    }

    /// Write a typed change back into its attribute, which then configures
    /// the controller.
    fn reflect(&mut self, change: ConfigChange) {
        let name = change.attribute_name();
        match change {
            ConfigChange::Placement(placement) => self.set_attribute(name, placement.as_str()),
            ConfigChange::ActivationDelay(ms) => self.set_attribute(name, ms.to_string()),
            ConfigChange::Disabled(true) => self.set_attribute(name, ""),
            ConfigChange::Disabled(false) => {
                self.remove_attribute(name);
            }
        }
    }

    // ── Slots ─────────────────────────────────────────────────────────

    /// Assign markup to a slot.
    pub fn set_slot(&mut self, slot: SlotName, markup: impl Into<String>) {
        *self.slot_mut(slot) = Some(markup.into());
    }

    /// Remove assigned markup so the slot falls back to its default.
    pub fn clear_slot(&mut self, slot: SlotName) {
        *self.slot_mut(slot) = None;
    }

    /// Markup assigned to a slot, if any.
    #[must_use]
    pub fn assigned(&self, slot: SlotName) -> Option<&str> {
        match slot {
            SlotName::Trigger => self.trigger.as_deref(),
            SlotName::Content => self.content.as_deref(),
        }
    }

    /// Markup the slot renders: assigned content or the default.
    #[must_use]
    pub fn slot_markup(&self, slot: SlotName) -> &str {
        self.assigned(slot).unwrap_or(slot.default_markup())
    }

    fn slot_mut(&mut self, slot: SlotName) -> &mut Option<String> {
        match slot {
            SlotName::Trigger => &mut self.trigger,
            SlotName::Content => &mut self.content,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Called when the element is inserted into a page.
    pub fn connected_callback(&mut self) {
        self.controller.connect();
    }

    /// Called when the element is removed from a page.
    pub fn disconnected_callback(&mut self) {
        self.controller.disconnect();
    }

    /// Whether the element is attached to a page.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }

    // ── Behavior ──────────────────────────────────────────────────────

    /// Imperative `show()`.
    pub fn show(&mut self, now: Duration) {
        self.controller.show(now);
    }

    /// Imperative `hide()`.
    pub fn hide(&mut self, now: Duration) {
        self.controller.hide(now);
    }

    /// Deliver an input event routed to this element.
    pub fn dispatch_event(&mut self, event: &Event, now: Duration) {
        self.controller.handle_event(event, now);
    }

    /// Fire the pending deadline if it has elapsed.
    pub fn advance(&mut self, now: Duration) -> Option<NotificationKind> {
        self.controller.advance(now)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Duration> {
        self.controller.next_deadline()
    }

    // ── Listeners ─────────────────────────────────────────────────────

    /// Listen for every notification from this element.
    pub fn add_listener(
        &mut self,
        callback: impl FnMut(&TooltipNotification) + 'static,
    ) -> ListenerId {
        self.controller.subscribe(callback)
    }

    /// Listen for one event name (`tooltip-show` or `tooltip-hide`).
    ///
    /// Returns `None` for names this element never emits.
    pub fn add_event_listener(
        &mut self,
        event_name: &str,
        mut callback: impl FnMut(&TooltipNotification) + 'static,
    ) -> Option<ListenerId> {
        let kind = NotificationKind::from_event_name(event_name)?;
        Some(self.controller.subscribe(move |n| {
            if n.kind == kind {
                callback(n);
            }
        }))
    }

    /// Remove a listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.controller.unsubscribe(id)
    }

    // ── Accessors ─────────────────────────────────────────────────────

    /// The content id.
    #[must_use]
    pub const fn tooltip_id(&self) -> TooltipId {
        self.controller.id()
    }

    /// Whether the content is rendered visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.controller.is_visible()
    }

    /// Rendered placement.
    #[must_use]
    pub const fn effective_position(&self) -> Placement {
        self.controller.effective_placement()
    }

    /// Underlying controller.
    #[must_use]
    pub const fn controller(&self) -> &TooltipController {
        &self.controller
    }

    /// Rendered attribute state.
    #[must_use]
    pub const fn view(&self) -> &TooltipView {
        self.controller.view()
    }

    /// Shadow tree markup in its current state.
    #[must_use]
    pub fn shadow_markup(&self) -> ShadowMarkup<'_> {
        ShadowMarkup::new(self)
    }
}

/// Whether `name` is acceptable as an HTML attribute name.
fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_ascii_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}
