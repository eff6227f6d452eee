#![forbid(unsafe_code)]

//! `tipkit-web` exposes the tooltip as an embeddable element on a host page.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes input events,
//!   layout changes and attribute writes.
//! - **Deterministic time**: the host advances a monotonic clock explicitly;
//!   pending deadlines fire only from [`Page::step`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen`. It provides the
//! element surface (attributes, properties, slots, markup) and a page that
//! routes events and bubbles notifications, so a thin JS shim can wrap it.

pub mod element;
pub mod markup;
pub mod page;
pub mod session_record;

use core::fmt;
use core::time::Duration;

pub use element::{SlotName, TAG_NAME, TooltipElement};
pub use page::{ElementId, Page, PageEvent, PageNotification, StepResult, Target};

/// Web host error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebHostError {
    /// No element with this id is attached to the page.
    UnknownElement(ElementId),
    /// A session record line could not be parsed.
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for WebHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element: {id}"),
            Self::MalformedRecord { line, message } => {
                write!(f, "malformed record at line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for WebHostError {}

/// Source of monotonic host time.
pub trait HostClock {
    /// Time elapsed since the clock's origin.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl HostClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Real monotonic clock, usable both natively and in the browser.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: web_time::Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}
