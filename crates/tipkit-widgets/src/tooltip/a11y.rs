#![forbid(unsafe_code)]

//! Tooltip identity and accessibility attributes.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of distinct nine-digit base-36 suffixes.
const SUFFIX_SPACE: u64 = 36u64.pow(9);

/// Coprime with 36, so scrambling is a bijection on the suffix space.
const SUFFIX_SCRAMBLE: u64 = 0x5_DEEC_E66D;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier linking a tooltip's content to its trigger.
///
/// Renders as `tooltip-` followed by nine base-36 digits. Ids allocated by
/// [`TooltipId::next`] are unique within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TooltipId(u64);

impl TooltipId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let scrambled = (u128::from(seq) * u128::from(SUFFIX_SCRAMBLE)) % u128::from(SUFFIX_SPACE);
        Self(scrambled as u64)
    }

    /// Wrap a raw value. Values are reduced into the suffix space.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw % SUFFIX_SPACE)
    }

    /// Raw suffix value.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TooltipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut buf = [b'0'; 9];
        let mut n = self.0;
        for slot in buf.iter_mut().rev() {
            *slot = DIGITS[(n % 36) as usize];
            n /= 36;
        }
        f.write_str("tooltip-")?;
        for b in buf {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

/// Keyboard reachability of the trigger region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabIndex {
    /// Reachable by Tab (`tabindex="0"`).
    #[default]
    Reachable,
    /// Focusable only programmatically (`tabindex="-1"`).
    Unreachable,
}

impl TabIndex {
    /// Tab index for a given disabled flag.
    #[must_use]
    pub const fn for_disabled(disabled: bool) -> Self {
        if disabled {
            Self::Unreachable
        } else {
            Self::Reachable
        }
    }

    /// Attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reachable => "0",
            Self::Unreachable => "-1",
        }
    }
}
