//! Platform fee normalization
//!
//! Fees are carried as validated basis points. The launchpad config stores
//! them either as raw bps or as a fraction (0.01 = 1%), so both constructors
//! exist along with [`FeeBps::from_legacy`] for values whose meaning depends on
//! magnitude.

use core::fmt;

use crate::{CurveError, Result, BPS_SCALE};

/// Fee in basis points, always in [0, 10000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FeeBps(u16);

impl FeeBps {
    pub const ZERO: FeeBps = FeeBps(0);

    /// Fee given directly in basis points (100 = 1%)
    pub fn new(bps: u64) -> Result<Self> {
        if bps >= BPS_SCALE {
            return Err(CurveError::InvalidFeeValue);
        }
        Ok(Self(bps as u16))
    }

    /// Fee given as a fraction in [0, 1), e.g. 0.01 for 1%
    ///
    /// Truncates toward zero after scaling, so 0.00015 becomes 1 bps.
    pub fn from_fraction(fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
            return Err(CurveError::InvalidFeeValue);
        }
        Self::new((fraction * BPS_SCALE as f64).floor() as u64)
    }

    /// Dual-meaning fee: values >= 1 are basis points (truncated), values
    /// below 1 are fractions.
    pub fn from_legacy(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(CurveError::InvalidFeeValue);
        }
        if value >= 1.0 {
            // `as` saturates, so huge values still land above the cap
            Self::new(value.floor() as u64)
        } else {
            Self::from_fraction(value)
        }
    }

    #[inline]
    pub fn bps(self) -> u64 {
        self.0 as u64
    }

    /// Share of an amount kept after the fee, in bps
    #[inline]
    pub fn complement(self) -> u64 {
        BPS_SCALE - self.bps()
    }

    /// `floor(amount * (10000 - bps) / 10000)`
    #[inline]
    pub fn deduct_from(self, amount: u64) -> u64 {
        // result <= amount, fits back into u64
        ((amount as u128 * self.complement() as u128) / BPS_SCALE as u128) as u64
    }

    /// `floor(amount * bps / 10000)`
    #[inline]
    pub fn fee_on(self, amount: u64) -> u64 {
        ((amount as u128 * self.bps() as u128) / BPS_SCALE as u128) as u64
    }
}

impl TryFrom<u64> for FeeBps {
    type Error = CurveError;

    fn try_from(bps: u64) -> Result<Self> {
        Self::new(bps)
    }
}

impl fmt::Display for FeeBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}
