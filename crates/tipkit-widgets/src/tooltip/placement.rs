#![forbid(unsafe_code)]

//! Viewport-aware placement resolution.
//!
//! # Invariants
//!
//! 1. Resolution always starts from the requested placement; a flip is
//!    never remembered between resolutions.
//! 2. `top` flips to `bottom` only when the box would start above the
//!    viewport; `bottom` flips to `top` only when it would end below it.
//! 3. The requested placement is never modified here.

use tipkit_core::geometry::{LayoutMetrics, Rect};

use super::config::Placement;

/// Vertical gap between the trigger and the tooltip box.
pub const PLACEMENT_GAP_PX: u32 = 10;

/// Outcome of one placement resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Placement that was asked for.
    pub requested: Placement,
    /// Placement that should be rendered.
    pub effective: Placement,
    /// Box measured at the requested placement.
    pub measured: Rect,
}

impl Resolution {
    /// Whether the effective placement differs from the requested one.
    #[must_use]
    pub fn flipped(&self) -> bool {
        self.requested != self.effective
    }
}

/// Compute where the tooltip box lands for `placement`.
///
/// The box is horizontally centered on the anchor and separated from it by
/// [`PLACEMENT_GAP_PX`].
#[must_use]
pub fn content_box(placement: Placement, metrics: &LayoutMetrics) -> Rect {
    let anchor = metrics.anchor;
    let content = metrics.content;
    let gap = PLACEMENT_GAP_PX as i32;
    let half_width = i32::try_from(content.width / 2).unwrap_or(i32::MAX);
    let height = i32::try_from(content.height).unwrap_or(i32::MAX);

    let x = anchor.center_x().saturating_sub(half_width);
    let y = match placement {
        Placement::Top => anchor.top().saturating_sub(gap).saturating_sub(height),
        Placement::Bottom => anchor.bottom().saturating_add(gap),
    };
    Rect::from_origin_size(x, y, content)
}

/// Resolve the effective placement for `requested` against the viewport.
#[must_use]
pub fn resolve(requested: Placement, metrics: &LayoutMetrics) -> Resolution {
    let measured = content_box(requested, metrics);
    let viewport_height = i32::try_from(metrics.viewport.height).unwrap_or(i32::MAX);

    let effective = match requested {
        Placement::Top if measured.top() < 0 => Placement::Bottom,
        Placement::Bottom if measured.bottom() > viewport_height => Placement::Top,
        _ => requested,
    };

    Resolution {
        requested,
        effective,
        measured,
    }
}
