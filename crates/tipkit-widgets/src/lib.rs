#![forbid(unsafe_code)]

//! Widgets for tipkit.
//!
//! Currently a single widget: the [`tooltip`] controller, a host-driven state
//! machine that debounces show/hide requests and resolves which side of its
//! trigger the tooltip is rendered on.

pub mod tooltip;

pub use tooltip::{
    ConfigChange, Placement, TooltipConfig, TooltipController, TooltipId, TooltipNotification,
    TooltipPhase, TooltipView,
};
