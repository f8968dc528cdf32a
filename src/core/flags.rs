//! Output verbosity/format flags for ruleset-control contexts
//!
//! Flags control how the engine renders command output (JSON vs. text,
//! numeric vs. symbolic fields, terse vs. full listings). They are
//! independently-set bits, composable with bitwise OR, and their numeric
//! values are identical to the wrapped library's corresponding constants, so
//! a mask round-trips unchanged across the engine boundary.
//!
//! Two types cover the two views of the same data:
//!
//! - [`OutputFlag`] - one named single-bit capability
//! - [`OutputFlags`] - a composed mask, with a named constant for every
//!   capability plus the composite [`OutputFlags::NUMERIC_ALL`] and the empty
//!   [`OutputFlags::DEFAULT`]
//!
//! # Example
//!
//! ```
//! use nftctx::{OutputFlag, OutputFlags};
//!
//! let flags = OutputFlags::JSON | OutputFlags::HANDLE;
//! assert!(flags.contains(OutputFlags::JSON));
//! assert_eq!(flags.to_string(), "handle|json");
//! assert_eq!("terse".parse::<OutputFlag>().unwrap(), OutputFlag::Terse);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use strum::IntoEnumIterator;

/// A single output capability bit
///
/// `Copy` trait allows efficient passing by value for this small enum.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum OutputFlag {
    /// Translate IP addresses to names via reverse DNS lookups
    #[strum(serialize = "reversedns")]
    ReverseDns,
    /// Print port numbers as service names
    #[strum(serialize = "service")]
    ServiceName,
    /// Omit stateful information (counters, quotas) from listings
    #[strum(serialize = "stateless")]
    Stateless,
    /// Include rule handles in listings
    #[strum(serialize = "handle")]
    Handle,
    /// Render output as JSON
    #[strum(serialize = "json")]
    Json,
    /// Echo accepted commands back in the output
    #[strum(serialize = "echo")]
    Echo,
    /// Print numeric UIDs/GIDs instead of user/group names
    #[strum(serialize = "guid")]
    Guid,
    /// Print protocols numerically
    #[strum(serialize = "numeric-protocol")]
    NumericProtocol,
    /// Print chain priorities numerically
    #[strum(serialize = "numeric-priority")]
    NumericPriority,
    /// Print symbolic constants numerically
    #[strum(serialize = "numeric-symbol")]
    NumericSymbol,
    /// Print time values numerically
    #[strum(serialize = "numeric-time")]
    NumericTime,
    /// Shorten listings by omitting set contents
    #[strum(serialize = "terse")]
    Terse,
}

impl OutputFlag {
    /// Returns this capability's bit, numerically identical to the wrapped
    /// library's constant.
    pub const fn bits(self) -> u32 {
        match self {
            OutputFlag::ReverseDns => 1 << 0,
            OutputFlag::ServiceName => 1 << 1,
            OutputFlag::Stateless => 1 << 2,
            OutputFlag::Handle => 1 << 3,
            OutputFlag::Json => 1 << 4,
            OutputFlag::Echo => 1 << 5,
            OutputFlag::Guid => 1 << 6,
            OutputFlag::NumericProtocol => 1 << 7,
            OutputFlag::NumericPriority => 1 << 8,
            OutputFlag::NumericSymbol => 1 << 9,
            OutputFlag::NumericTime => 1 << 10,
            OutputFlag::Terse => 1 << 11,
        }
    }
}

/// A composed output flag mask
///
/// Serializes transparently as the underlying integer, so persisted
/// configuration stays compatible with the engine's numeric flag values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputFlags(u32);

impl OutputFlags {
    /// Engine default output (no flags set)
    pub const DEFAULT: Self = Self(0);
    pub const REVERSE_DNS: Self = Self(OutputFlag::ReverseDns.bits());
    pub const SERVICE_NAME: Self = Self(OutputFlag::ServiceName.bits());
    pub const STATELESS: Self = Self(OutputFlag::Stateless.bits());
    pub const HANDLE: Self = Self(OutputFlag::Handle.bits());
    pub const JSON: Self = Self(OutputFlag::Json.bits());
    pub const ECHO: Self = Self(OutputFlag::Echo.bits());
    pub const GUID: Self = Self(OutputFlag::Guid.bits());
    pub const NUMERIC_PROTOCOL: Self = Self(OutputFlag::NumericProtocol.bits());
    pub const NUMERIC_PRIORITY: Self = Self(OutputFlag::NumericPriority.bits());
    pub const NUMERIC_SYMBOL: Self = Self(OutputFlag::NumericSymbol.bits());
    pub const NUMERIC_TIME: Self = Self(OutputFlag::NumericTime.bits());
    /// All numeric display capabilities combined
    pub const NUMERIC_ALL: Self = Self(
        OutputFlag::NumericProtocol.bits()
            | OutputFlag::NumericPriority.bits()
            | OutputFlag::NumericSymbol.bits()
            | OutputFlag::NumericTime.bits(),
    );
    pub const TERSE: Self = Self(OutputFlag::Terse.bits());

    /// Returns the raw mask value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a mask from a raw value. Bits beyond the known capabilities are
    /// kept as-is; the engine decides what they mean.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns `true` if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterates over the named capabilities set in this mask.
    pub fn iter(self) -> impl Iterator<Item = OutputFlag> {
        OutputFlag::iter().filter(move |flag| self.0 & flag.bits() != 0)
    }
}

impl From<OutputFlag> for OutputFlags {
    fn from(flag: OutputFlag) -> Self {
        Self(flag.bits())
    }
}

impl FromIterator<OutputFlag> for OutputFlags {
    fn from_iter<I: IntoIterator<Item = OutputFlag>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::DEFAULT, |acc, flag| acc | flag.into())
    }
}

impl BitOr for OutputFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutputFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OutputFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for OutputFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("default");
        }
        let mut first = true;
        for flag in self.iter() {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{flag}")?;
            first = false;
        }
        Ok(())
    }
}
