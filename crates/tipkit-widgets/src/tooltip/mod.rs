#![forbid(unsafe_code)]

//! Tooltip widget.
//!
//! A tooltip pairs a trigger region with a content box. The
//! [`TooltipController`] decides *when* the content is shown and *which
//! side* of the trigger it lands on; rendering is left to the host, which
//! reads the [`TooltipView`].
//!
//! # Lifecycle
//!
//! ```text
//!            activate                 delay elapsed
//!   Hidden ───────────▶ PendingShow ───────────────▶ Visible
//!     ▲                     │ deactivate                │ deactivate
//!     │◀────────────────────┘                           ▼
//!     │              100ms elapsed                 PendingHide
//!     └─────────────────────────────────────────────────┤
//!                           activate ──▶ Visible ◀──────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tipkit_core::event::Event;
//! use tipkit_widgets::tooltip::{NotificationKind, TooltipConfig, TooltipController};
//!
//! let mut tip = TooltipController::new(TooltipConfig::default().activation_delay_ms(300));
//! tip.connect();
//! tip.handle_event(&Event::pointer_enter(), Duration::ZERO);
//! assert!(!tip.is_visible());
//! assert_eq!(
//!     tip.advance(Duration::from_millis(300)),
//!     Some(NotificationKind::Shown)
//! );
//! assert!(tip.is_visible());
//! ```

mod a11y;
mod config;
mod controller;
mod notify;
pub mod placement;
mod view;

pub use a11y::{TabIndex, TooltipId};
pub use config::{
    ConfigChange, DEACTIVATION_DELAY_MS, DEFAULT_ACTIVATION_DELAY_MS, OBSERVED_ATTRIBUTES,
    Placement, TooltipConfig, parse_delay_ms,
};
pub use controller::{TooltipController, TooltipPhase};
pub use notify::{
    ListenerId, Listeners, NotificationKind, TooltipNotification, notification_channel,
};
pub use view::TooltipView;
