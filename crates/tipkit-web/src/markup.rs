#![forbid(unsafe_code)]

//! Shadow tree markup.
//!
//! Renders the element's shadow subtree as flattened HTML: each slot shows
//! its assigned markup or its fallback. The structure is fixed:
//!
//! ```text
//! <div class="tooltip-trigger" tabindex=".." aria-describedby="..">
//!   <slot name="trigger">..</slot>
//! </div>
//! <div class="tooltip-content [visible animate]" role="tooltip" id=".." data-position="..">
//!   <slot name="content">..</slot>
//! </div>
//! ```
//!
//! Slot markup is trusted host input and is emitted verbatim.

use core::fmt::{self, Write as _};

use crate::element::{SlotName, TAG_NAME, TooltipElement};

/// Display adapter for an element's shadow tree.
#[derive(Debug, Clone, Copy)]
pub struct ShadowMarkup<'a> {
    element: &'a TooltipElement,
}

impl<'a> ShadowMarkup<'a> {
    pub(crate) fn new(element: &'a TooltipElement) -> Self {
        Self { element }
    }

    fn write_slot(&self, f: &mut fmt::Formatter<'_>, slot: SlotName) -> fmt::Result {
        write!(
            f,
            r#"<slot name="{}">{}</slot>"#,
            slot.as_str(),
            self.element.slot_markup(slot)
        )
    }
}

impl fmt::Display for ShadowMarkup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.element.view();

        write!(
            f,
            r#"<div class="tooltip-trigger" tabindex="{}""#,
            view.tabindex().as_str()
        )?;
        if let Some(id) = view.described_by() {
            write!(f, r#" aria-describedby="{id}""#)?;
        }
        f.write_char('>')?;
        self.write_slot(f, SlotName::Trigger)?;
        f.write_str("</div>")?;

        f.write_str(r#"<div class=""#)?;
        for (i, class) in view.content_classes().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            f.write_str(class)?;
        }
        f.write_str(r#"" role="tooltip""#)?;
        if let Some(id) = view.described_by() {
            write!(f, r#" id="{id}""#)?;
        }
        write!(f, r#" data-position="{}">"#, view.data_position())?;
        self.write_slot(f, SlotName::Content)?;
        f.write_str("</div>")
    }
}

/// Opening host tag with the element's attributes, e.g.
/// `<tip-tooltip delay="300" position="bottom">`.
///
/// Values are escaped; names are already valid, see
/// [`TooltipElement::set_attribute`].
#[must_use]
pub fn host_open_tag(element: &TooltipElement) -> String {
    let mut out = format!("<{TAG_NAME}");
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    out.push('>');
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
