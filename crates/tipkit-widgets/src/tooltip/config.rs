#![forbid(unsafe_code)]

//! Tooltip configuration and attribute normalization.
//!
//! Every string attribute a host can set is parsed here and nowhere else.
//! Malformed values never fail: they are replaced by the default for that
//! field.

use core::fmt;
use core::time::Duration;

/// Activation delay used when none (or garbage) is configured.
pub const DEFAULT_ACTIVATION_DELAY_MS: u64 = 200;

/// Delay between a deactivating input and the tooltip hiding. Not configurable.
pub const DEACTIVATION_DELAY_MS: u64 = 100;

/// Attribute names the element observes for live changes.
pub const OBSERVED_ATTRIBUTES: [&str; 3] = ["position", "delay", "disabled"];

/// Requested side of the trigger the tooltip appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// Above the trigger.
    #[default]
    Top,
    /// Below the trigger.
    Bottom,
}

impl Placement {
    /// Attribute spelling of this placement.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// The opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// Parse an attribute value. Unknown or empty values become [`Placement::Top`].
    ///
    /// Matching ignores surrounding whitespace and ASCII case, like HTML
    /// enumerated attributes.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("bottom") {
            Self::Bottom
        } else {
            Self::Top
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `delay` attribute value in milliseconds.
///
/// Leading whitespace and a `+` sign are accepted and trailing garbage after
/// the digits is ignored (`"300ms"` is 300). Values with no leading digits,
/// negative values and absent attributes fall back to
/// [`DEFAULT_ACTIVATION_DELAY_MS`]. Huge values saturate.
#[must_use]
pub fn parse_delay_ms(value: Option<&str>) -> u64 {
    let Some(value) = value else {
        return DEFAULT_ACTIVATION_DELAY_MS;
    };
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let digits = value.bytes().take_while(u8::is_ascii_digit);

    let mut seen_digit = false;
    let mut ms: u64 = 0;
    for b in digits {
        seen_digit = true;
        ms = ms.saturating_mul(10).saturating_add(u64::from(b - b'0'));
    }

    if seen_digit {
        ms
    } else {
        DEFAULT_ACTIVATION_DELAY_MS
    }
}

/// Typed tooltip configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipConfig {
    /// Requested placement (default: top).
    pub placement: Placement,
    /// Delay before showing, in milliseconds (default: 200).
    pub activation_delay_ms: u64,
    /// Suppress activation entirely (default: false).
    pub disabled: bool,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            activation_delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
            disabled: false,
        }
    }
}

impl TooltipConfig {
    /// Set the requested placement.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the activation delay in milliseconds.
    #[must_use]
    pub fn activation_delay_ms(mut self, ms: u64) -> Self {
        self.activation_delay_ms = ms;
        self
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Activation delay as a [`Duration`].
    #[must_use]
    pub const fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    /// Deactivation delay as a [`Duration`].
    #[must_use]
    pub const fn deactivation_delay(&self) -> Duration {
        Duration::from_millis(DEACTIVATION_DELAY_MS)
    }

    /// Apply a single change. Returns `true` if the configuration changed.
    pub fn apply(&mut self, change: ConfigChange) -> bool {
        match change {
            ConfigChange::Placement(p) => replace_if_changed(&mut self.placement, p),
            ConfigChange::ActivationDelay(ms) => {
                replace_if_changed(&mut self.activation_delay_ms, ms)
            }
            ConfigChange::Disabled(d) => replace_if_changed(&mut self.disabled, d),
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// One normalized configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// New requested placement.
    Placement(Placement),
    /// New activation delay in milliseconds.
    ActivationDelay(u64),
    /// New disabled flag.
    Disabled(bool),
}

impl ConfigChange {
    /// Normalize an attribute change.
    ///
    /// `value` is `None` when the attribute was removed. Returns `None` for
    /// attributes the tooltip does not observe. `disabled` is a presence
    /// flag: any value, including `"false"`, disables.
    #[must_use]
    pub fn from_attribute(name: &str, value: Option<&str>) -> Option<Self> {
        match name {
            "position" => Some(Self::Placement(value.map_or(Placement::Top, Placement::parse))),
            "delay" => Some(Self::ActivationDelay(parse_delay_ms(value))),
            "disabled" => Some(Self::Disabled(value.is_some())),
            _ => None,
        }
    }

    /// Attribute name this change corresponds to.
    #[must_use]
    pub const fn attribute_name(&self) -> &'static str {
        match self {
            Self::Placement(_) => "position",
            Self::ActivationDelay(_) => "delay",
            Self::Disabled(_) => "disabled",
        }
    }
}
