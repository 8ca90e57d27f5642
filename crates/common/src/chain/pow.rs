//! Proof-of-work target and chain-work values.
//!
//! A [`Target`] is a 256-bit value that a block hash must not exceed; the
//! lower the target, the higher the difficulty. Block headers carry targets in
//! a 32-bit compact encoding ("bits"). [`Work`] is the expected number of
//! hashes needed to meet a target, and is what minimum-chain-work anchors are
//! expressed in.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Represents a target value expressed as an unsigned 256-bit integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// Creates a new Target instance with the specified U256 value.
    pub const fn new(target: U256) -> Self {
        Target(target)
    }

    /// Creates a new `Target` from a big-endian hexadecimal string.
    ///
    /// # Returns
    ///
    /// A new `Target`, or `None` if the string is not valid hex or does not
    /// fit in 256 bits
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from bytes (big-endian).
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Returns the underlying 256-bit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Converts a compact target representation into a Target instance.
    ///
    /// The compact format stores a 1-byte exponent followed by a 3-byte
    /// mantissa; the target is `mantissa * 256^(exponent - 3)`.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The parsed target value if valid
    /// * `None` - If the mantissa is zero or has its sign bit set, or the value
    ///   does not fit in 256 bits
    pub fn from_compact(compact: u32) -> Option<Self> {
        let exponent = compact >> 24;
        let mantissa = compact & 0x00ff_ffff;

        if mantissa & 0x0080_0000 != 0 {
            return None; // Negative targets are invalid
        }

        if mantissa == 0 {
            return None;
        }

        let base = U256::from(mantissa);

        #[allow(clippy::arithmetic_side_effects, reason = "Shift amounts are bounds checked")]
        let target = if exponent <= 3 {
            let shift_bits = 3u32.checked_sub(exponent)?.checked_mul(8)?;
            base >> shift_bits
        } else {
            let shift_bits = exponent.checked_sub(3)?.checked_mul(8)?;
            if shift_bits >= 256 {
                return None;
            }
            // Reject mantissa bits pushed past the top of the 256-bit range.
            let headroom = 256u32.checked_sub(shift_bits)?;
            if base.bits() > headroom as usize {
                return None;
            }
            base << shift_bits
        };

        Some(Target(target))
    }

    /// Converts a target value into its compact representation.
    ///
    /// The mantissa is normalized so its sign bit is never set; precision
    /// below the top three significant bytes is lost.
    pub fn to_compact(self) -> Option<u32> {
        if self.0.is_zero() {
            return Some(0);
        }

        let bit_length = u32::try_from(self.0.bits()).ok()?;
        let size = bit_length.checked_add(7)? / 8;

        let mantissa = if size <= 3 {
            let shift_bits = 3u32.checked_sub(size)?.checked_mul(8)?;
            self.0.low_u32().checked_shl(shift_bits)? & 0x00ff_ffff
        } else {
            let shift_bits = size.checked_sub(3)?.checked_mul(8)?;
            #[allow(clippy::arithmetic_side_effects, reason = "Shift is below 256 bits")]
            let shifted = self.0 >> shift_bits;
            shifted.low_u32() & 0x00ff_ffff
        };

        let (mantissa, size) = if mantissa & 0x0080_0000 != 0 {
            (mantissa >> 8, size.checked_add(1)?)
        } else {
            (mantissa, size)
        };

        size.checked_shl(24)?.checked_add(mantissa)
    }

    /// Computes the expected work to find a block hash at or below this
    /// target, `2^256 / (target + 1)`.
    pub fn to_work(self) -> Work {
        if self.0.is_zero() {
            return Work(U256::max_value());
        }
        if self.0 == U256::max_value() {
            return Work(U256::one());
        }
        // (~target / (target + 1)) + 1 avoids the 257-bit numerator.
        #[allow(clippy::arithmetic_side_effects, reason = "target + 1 cannot overflow here")]
        let work = (!self.0) / (self.0 + U256::one()) + U256::one();
        Work(work)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

/// Accumulated proof-of-work, as compared against minimum-chain-work anchors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Work(U256);

impl Work {
    /// Creates a new Work value.
    pub const fn new(work: U256) -> Self {
        Work(work)
    }

    /// Parses a big-endian hexadecimal work value.
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Work)
    }

    /// Returns the underlying 256-bit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl std::fmt::Display for Work {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

/// Big-endian, zero-padded 64 digit hex rendering of a 256-bit value.
fn to_hex(value: &U256) -> String {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    hex::encode(bytes)
}
