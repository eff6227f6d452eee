#![forbid(unsafe_code)]

//! Rendered attribute state of a tooltip's shadow subtree.
//!
//! The controller writes here; a rendering layer reads. Nothing in this
//! module decides behavior.

use super::a11y::{TabIndex, TooltipId};
use super::config::Placement;

/// Attributes and classes the rendering layer must honor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TooltipView {
    shown: bool,
    animate: bool,
    data_position: Placement,
    tabindex: TabIndex,
    described_by: Option<TooltipId>,
}

impl TooltipView {
    pub(crate) fn new(placement: Placement, disabled: bool) -> Self {
        Self {
            data_position: placement,
            tabindex: TabIndex::for_disabled(disabled),
            ..Self::default()
        }
    }

    /// Whether the content carries the `visible` class.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// Whether the content carries the `animate` class.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animate
    }

    /// Rendered placement (the `data-position` attribute).
    #[must_use]
    pub const fn data_position(&self) -> Placement {
        self.data_position
    }

    /// Trigger keyboard reachability.
    #[must_use]
    pub const fn tabindex(&self) -> TabIndex {
        self.tabindex
    }

    /// Content id referenced by the trigger's `aria-describedby`.
    ///
    /// `None` until the tooltip is first attached.
    #[must_use]
    pub const fn described_by(&self) -> Option<TooltipId> {
        self.described_by
    }

    /// Classes on the content element, in render order.
    pub fn content_classes(&self) -> impl Iterator<Item = &'static str> {
        [
            Some("tooltip-content"),
            self.shown.then_some("visible"),
            self.animate.then_some("animate"),
        ]
        .into_iter()
        .flatten()
    }

    pub(crate) fn set_shown(&mut self, shown: bool) {
        self.shown = shown;
        self.animate = shown;
    }

    pub(crate) fn set_data_position(&mut self, placement: Placement) {
        self.data_position = placement;
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.tabindex = TabIndex::for_disabled(disabled);
    }

    pub(crate) fn link(&mut self, id: TooltipId) {
        if self.described_by.is_none() {
            self.described_by = Some(id);
        }
    }
}
