#![forbid(unsafe_code)]

//! The tooltip controller state machine.
//!
//! # Invariants
//!
//! 1. The tooltip becomes visible only when a show deadline elapses with no
//!    intervening deactivation and `disabled` is false at that moment.
//! 2. At most one deadline is pending. Scheduling a show cancels a pending
//!    hide and vice versa; the deadline lives inside the phase so the two
//!    can never coexist.
//! 3. Exactly one `Shown` notification per completed activation and one
//!    `Hidden` per completed deactivation.
//! 4. The configured placement is never changed by placement resolution.
//!
//! # Time
//!
//! The controller never reads a clock. Every input carries the host's
//! monotonic `now`, and [`TooltipController::advance`] fires whichever
//! deadline has elapsed. Hosts that cannot poll can ask
//! [`TooltipController::next_deadline`] when to wake up.

use core::time::Duration;

use tipkit_core::event::{Event, HitTarget, PointerEventKind};
use tipkit_core::geometry::LayoutMetrics;
use tipkit_core::{debug, debug_span, trace};

use super::a11y::TooltipId;
use super::config::{ConfigChange, Placement, TooltipConfig};
use super::notify::{ListenerId, Listeners, NotificationKind, TooltipNotification};
use super::placement;
use super::view::TooltipView;

/// Observable phase of a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TooltipPhase {
    /// Not shown, nothing pending.
    Hidden,
    /// Waiting for the activation delay to elapse.
    PendingShow,
    /// Shown, nothing pending.
    Visible,
    /// Shown, waiting for the deactivation delay to elapse.
    PendingHide,
}

impl TooltipPhase {
    /// Whether the tooltip is currently rendered.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible | Self::PendingHide)
    }

    /// Lowercase name for logs and records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::PendingShow => "pending_show",
            Self::Visible => "visible",
            Self::PendingHide => "pending_hide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Hidden,
    PendingShow { due: Duration },
    Visible,
    PendingHide { due: Duration },
}

impl State {
    const fn phase(self) -> TooltipPhase {
        match self {
            Self::Hidden => TooltipPhase::Hidden,
            Self::PendingShow { .. } => TooltipPhase::PendingShow,
            Self::Visible => TooltipPhase::Visible,
            Self::PendingHide { .. } => TooltipPhase::PendingHide,
        }
    }
}

/// What caused a transition. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cause {
    Pointer,
    Touch,
    Focus,
    Keyboard,
    Programmatic,
    Timer,
}

/// Debounced, viewport-aware tooltip controller.
///
/// Owns its configuration, phase, pending deadline, rendered view and
/// listeners. Everything is reachable only through methods.
#[derive(Debug)]
pub struct TooltipController {
    id: TooltipId,
    config: TooltipConfig,
    state: State,
    connected: bool,
    metrics: Option<LayoutMetrics>,
    view: TooltipView,
    listeners: Listeners,
}

impl Default for TooltipController {
    fn default() -> Self {
        Self::new(TooltipConfig::default())
    }
}

impl TooltipController {
    /// Create a detached controller with a freshly allocated id.
    #[must_use]
    pub fn new(config: TooltipConfig) -> Self {
        Self::with_id(TooltipId::next(), config)
    }

    /// Create a detached controller with a host-chosen id.
    #[must_use]
    pub fn with_id(id: TooltipId, config: TooltipConfig) -> Self {
        let view = TooltipView::new(config.placement, config.disabled);
        Self {
            id,
            config,
            state: State::Hidden,
            connected: false,
            metrics: None,
            view,
            listeners: Listeners::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    /// Identifier linking content and trigger.
    #[must_use]
    pub const fn id(&self) -> TooltipId {
        self.id
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Configured (requested) placement.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.config.placement
    }

    /// Rendered placement after viewport resolution.
    #[must_use]
    pub const fn effective_placement(&self) -> Placement {
        self.view.data_position()
    }

    /// Configured activation delay in milliseconds.
    #[must_use]
    pub const fn activation_delay_ms(&self) -> u64 {
        self.config.activation_delay_ms
    }

    /// Whether activation is suppressed.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Whether the tooltip is currently rendered.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.view.is_shown()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TooltipPhase {
        self.state.phase()
    }

    /// Whether the tooltip is attached to a page.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Rendered attribute state.
    #[must_use]
    pub const fn view(&self) -> &TooltipView {
        &self.view
    }

    /// Last layout metrics delivered by the host, if any.
    #[must_use]
    pub const fn metrics(&self) -> Option<LayoutMetrics> {
        self.metrics
    }

    /// When the host should next call [`advance`](Self::advance), if ever.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Duration> {
        match self.state {
            State::PendingShow { due } | State::PendingHide { due } => Some(due),
            State::Hidden | State::Visible => None,
        }
    }

    // ── Listeners ─────────────────────────────────────────────────────

    /// Register a notification callback.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&TooltipNotification) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    /// Remove a notification callback.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Attach to a page. Links content to trigger on first attachment.
    pub fn connect(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;
        self.view.link(self.id);
        self.view.set_disabled(self.config.disabled);
        debug!(target: "tipkit::tooltip", id = %self.id, "connected");
    }

    /// Detach from the page. Pending deadlines are dropped and the tooltip
    /// is hidden without a notification.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.state = State::Hidden;
        self.view.set_shown(false);
        self.view.set_data_position(self.config.placement);
        debug!(target: "tipkit::tooltip", id = %self.id, "disconnected");
    }

    // ── Configuration ─────────────────────────────────────────────────

    /// Apply one configuration change. Returns `true` if anything changed.
    ///
    /// This is the only path through which configuration mutates.
    pub fn apply(&mut self, change: ConfigChange) -> bool {
        if !self.config.apply(change) {
            return false;
        }
        match change {
            ConfigChange::Placement(placement) => {
                self.view.set_data_position(placement);
                if self.is_visible() {
                    self.resolve_placement();
                }
            }
            ConfigChange::ActivationDelay(_) => {}
            ConfigChange::Disabled(disabled) => self.view.set_disabled(disabled),
        }
        debug!(
            target: "tipkit::tooltip",
            id = %self.id,
            change = ?change,
            "configuration changed"
        );
        true
    }

    /// Apply a raw attribute change (`None` = attribute removed).
    ///
    /// Returns `true` if the attribute is observed and changed the
    /// configuration.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> bool {
        ConfigChange::from_attribute(name, value).is_some_and(|change| self.apply(change))
    }

    /// Set the requested placement.
    pub fn set_placement(&mut self, placement: Placement) {
        self.apply(ConfigChange::Placement(placement));
    }

    /// Set the activation delay.
    pub fn set_activation_delay_ms(&mut self, ms: u64) {
        self.apply(ConfigChange::ActivationDelay(ms));
    }

    /// Set the disabled flag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.apply(ConfigChange::Disabled(disabled));
    }

    // ── Inputs ────────────────────────────────────────────────────────

    /// Programmatically request visibility.
    ///
    /// A deadline that elapsed before `now` fires first.
    pub fn show(&mut self, now: Duration) {
        if self.ensure_connected("show") {
            self.advance(now);
            self.activate(now, Cause::Programmatic);
        }
    }

    /// Programmatically request hiding.
    ///
    /// A deadline that elapsed before `now` fires first.
    pub fn hide(&mut self, now: Duration) {
        if self.ensure_connected("hide") {
            self.advance(now);
            self.deactivate(now, Cause::Programmatic);
        }
    }

    /// React to a host input event.
    ///
    /// A deadline that elapsed before `now` fires before the event is
    /// applied, so late input never cancels a completed transition.
    pub fn handle_event(&mut self, event: &Event, now: Duration) {
        if !self.ensure_connected(event.name()) {
            return;
        }
        let span = debug_span!(
            target: "tipkit::tooltip",
            "tooltip_event",
            id = %self.id,
            event = event.name()
        );
        let _guard = span.enter();
        self.advance(now);
        match event {
            Event::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Enter => self.activate(now, Cause::Pointer),
                PointerEventKind::Leave => self.deactivate(now, Cause::Pointer),
            },
            Event::Touch(touch) => match touch.target {
                HitTarget::Trigger => self.activate(now, Cause::Touch),
                HitTarget::Outside => self.deactivate(now, Cause::Touch),
                HitTarget::Component => {}
            },
            Event::Focus(true) => self.activate(now, Cause::Focus),
            Event::Focus(false) => self.deactivate(now, Cause::Focus),
            Event::Key(key) => {
                if key.is_escape_press()
                    && matches!(self.state, State::Visible | State::PendingShow { .. })
                {
                    self.deactivate(now, Cause::Keyboard);
                }
            }
            Event::Resize(metrics) => {
                self.metrics = Some(*metrics);
                if self.is_visible() {
                    self.resolve_placement();
                }
            }
        }
    }

    /// Fire the pending deadline if it has elapsed by `now`.
    ///
    /// Returns the notification emitted, if any.
    pub fn advance(&mut self, now: Duration) -> Option<NotificationKind> {
        match self.state {
            State::PendingShow { due } if now >= due => {
                if self.config.disabled {
                    trace!(target: "tipkit::tooltip", id = %self.id, "show deadline fired while disabled");
                    self.transition(State::Hidden, Cause::Timer);
                    return None;
                }
                self.transition(State::Visible, Cause::Timer);
                self.view.set_shown(true);
                self.resolve_placement();
                self.emit(NotificationKind::Shown, due);
                Some(NotificationKind::Shown)
            }
            State::PendingHide { due } if now >= due => {
                self.transition(State::Hidden, Cause::Timer);
                self.view.set_shown(false);
                self.emit(NotificationKind::Hidden, due);
                Some(NotificationKind::Hidden)
            }
            _ => None,
        }
    }

    // ── Internals ─────────────────────────────────────────────────────

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn ensure_connected(&self, input: &'static str) -> bool {
        if !self.connected {
            trace!(target: "tipkit::tooltip", id = %self.id, input, "ignored while detached");
        }
        self.connected
    }

    fn activate(&mut self, now: Duration, cause: Cause) {
        if self.config.disabled {
            trace!(target: "tipkit::tooltip", id = %self.id, ?cause, "activation suppressed");
            return;
        }
        match self.state {
            State::Hidden => {
                let due = now.saturating_add(self.config.activation_delay());
                self.transition(State::PendingShow { due }, cause);
            }
            State::PendingHide { .. } => self.transition(State::Visible, cause),
            State::PendingShow { .. } | State::Visible => {
                trace!(target: "tipkit::tooltip", id = %self.id, ?cause, "already activating");
            }
        }
    }

    fn deactivate(&mut self, now: Duration, cause: Cause) {
        match self.state {
            State::PendingShow { .. } => self.transition(State::Hidden, cause),
            State::Visible => {
                let due = now.saturating_add(self.config.deactivation_delay());
                self.transition(State::PendingHide { due }, cause);
            }
            State::Hidden | State::PendingHide { .. } => {
                trace!(target: "tipkit::tooltip", id = %self.id, ?cause, "already deactivating");
            }
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn transition(&mut self, next: State, cause: Cause) {
        debug!(
            target: "tipkit::tooltip",
            id = %self.id,
            from = self.state.phase().as_str(),
            to = next.phase().as_str(),
            ?cause,
            "phase transition"
        );
        self.state = next;
    }

    fn resolve_placement(&mut self) {
        let effective = match self.metrics {
            Some(metrics) => {
                let resolution = placement::resolve(self.config.placement, &metrics);
                debug!(
                    target: "tipkit::placement",
                    id = %self.id,
                    requested = %resolution.requested,
                    effective = %resolution.effective,
                    top = resolution.measured.top(),
                    bottom = resolution.measured.bottom(),
                    "placement resolved"
                );
                resolution.effective
            }
            None => self.config.placement,
        };
        self.view.set_data_position(effective);
    }

    fn emit(&mut self, kind: NotificationKind, at: Duration) {
        let notification = TooltipNotification {
            kind,
            source: self.id,
            at,
        };
        debug!(
            target: "tipkit::tooltip",
            id = %self.id,
            event = kind.event_name(),
            at_ms = u64::try_from(at.as_millis()).unwrap_or(u64::MAX),
            "notification"
        );
        self.listeners.dispatch(&notification);
    }
}
