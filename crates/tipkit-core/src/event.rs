#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! These are the events a host page delivers to a widget. They mirror the
//! subset of DOM events a tooltip reacts to: pointer enter/leave on the
//! trigger, touch starts (classified by where they landed), focus changes on
//! the trigger, key presses inside the component, and size-change
//! notifications from the host's resize watcher.
//!
//! # Design Notes
//!
//! - Hit classification of touches is done by the host; widgets never
//!   hit-test themselves.
//! - `KeyEventKind` defaults to `Press`; only presses drive behavior.
//! - DOM key names map onto [`KeyCode`] via [`KeyCode::from_dom_key`].

use bitflags::bitflags;

use crate::geometry::LayoutMetrics;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A pointer crossed the trigger boundary.
    Pointer(PointerEvent),

    /// A touch started somewhere on the page.
    Touch(TouchEvent),

    /// The trigger region gained (`true`) or lost (`false`) keyboard focus.
    Focus(bool),

    /// A keyboard event routed to the component.
    Key(KeyEvent),

    /// The host element's bounding box changed.
    Resize(LayoutMetrics),
}

impl Event {
    /// Pointer entered the trigger region.
    #[must_use]
    pub const fn pointer_enter() -> Self {
        Self::Pointer(PointerEvent::new(PointerEventKind::Enter))
    }

    /// Pointer left the trigger region.
    #[must_use]
    pub const fn pointer_leave() -> Self {
        Self::Pointer(PointerEvent::new(PointerEventKind::Leave))
    }

    /// Touch started at the given target.
    #[must_use]
    pub const fn touch(target: HitTarget) -> Self {
        Self::Touch(TouchEvent::new(target))
    }

    /// A key press with no modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Short, stable name used in logs and session records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pointer(p) => match p.kind {
                PointerEventKind::Enter => "pointer_enter",
                PointerEventKind::Leave => "pointer_leave",
            },
            Self::Touch(_) => "touch_start",
            Self::Focus(true) => "focus",
            Self::Focus(false) => "blur",
            Self::Key(_) => "key",
            Self::Resize(_) => "resize",
        }
    }
}

/// A pointer boundary event on the trigger region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Whether the pointer entered or left.
    pub kind: PointerEventKind,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event with no modifiers.
    #[must_use]
    pub const fn new(kind: PointerEventKind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::NONE,
        }
    }
}

/// The type of pointer boundary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pointer moved onto the trigger.
    Enter,

    /// Pointer moved off the trigger.
    Leave,
}

/// Where a touch landed relative to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// On the trigger region.
    Trigger,

    /// Inside the component but not on the trigger (e.g. on the content).
    Component,

    /// Outside the component's bounding region.
    Outside,
}

/// A touch-start event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// Classified touch location.
    pub target: HitTarget,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub const fn new(target: HitTarget) -> Self {
        Self { target }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check for a pressed (or repeating) Escape key.
    #[must_use]
    pub const fn is_escape_press(&self) -> bool {
        matches!(self.code, KeyCode::Escape)
            && !matches!(self.kind, KeyEventKind::Release)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Tab key.
    Tab,

    /// Space bar.
    Space,

    /// Any key with no dedicated variant.
    Other,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value to a key code.
    ///
    /// `"Esc"` is accepted for legacy hosts.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            " " | "Spacebar" => Self::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
