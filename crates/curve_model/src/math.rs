//! Constant product swap estimates (x·y=k)
//!
//! Fee on input, as the launchpad client quotes it:
//! - Δin_net = floor(Δin * (10000 - fee_bps) / 10000)
//! - Δout = floor(reserve_out * Δin_net / (reserve_in + Δin_net))
//!
//! All intermediate products are taken in u128 before any division.

use log::trace;

use crate::{CurveError, FeeBps, Result};

/// Reserve snapshot of a bonding curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reserves {
    /// Native currency reserve (lamports)
    pub reserve_lamport: u64,
    /// Token reserve (smallest token unit)
    pub reserve_token: u64,
}

impl Reserves {
    pub const fn new(reserve_lamport: u64, reserve_token: u64) -> Self {
        Self {
            reserve_lamport,
            reserve_token,
        }
    }

    /// A curve with no tokens left cannot be priced
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.reserve_token == 0
    }
}

/// Quote for one side of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Gross input requested by the trader
    pub amount_in: u64,

    /// Input left after the platform fee
    pub adjusted_amount: u64,

    /// Part of the input taken as fee
    pub fee_amount: u64,

    /// Expected output
    pub amount_out: u64,

    /// Output floor after slippage tolerance
    pub min_amount_out: u64,
}

/// `floor(reserve_out * amount_in / (reserve_in + amount_in))`
pub(crate) fn constant_product_out(reserve_out: u64, reserve_in: u64, amount_in: u64) -> Result<u64> {
    let numerator = (reserve_out as u128)
        .checked_mul(amount_in as u128)
        .ok_or(CurveError::Overflow)?;
    let denominator = (reserve_in as u128)
        .checked_add(amount_in as u128)
        .ok_or(CurveError::Overflow)?;

    if denominator == 0 {
        return Err(CurveError::InvalidReserveState);
    }

    let out = numerator / denominator;
    trace!("constant product: {numerator} / {denominator} = {out}");

    u64::try_from(out).map_err(|_| CurveError::Overflow)
}

/// Lamports received for selling `amount` tokens
///
/// # Arguments
/// * `reserve_lamport` - Current lamport reserve
/// * `amount` - Tokens to sell
/// * `fee` - Platform sell fee
/// * `reserve_token` - Current token reserve
pub fn amount_out_sell(
    reserve_lamport: u64,
    amount: u64,
    fee: FeeBps,
    reserve_token: u64,
) -> Result<u64> {
    let adjusted = fee.deduct_from(amount);
    constant_product_out(reserve_lamport, reserve_token, adjusted)
}

/// Tokens received for spending `amount` lamports
///
/// # Arguments
/// * `reserve_token` - Current token reserve
/// * `amount` - Lamports to spend
/// * `reserve_lamport` - Current lamport reserve
/// * `fee` - Platform buy fee
pub fn amount_out_buy(
    reserve_token: u64,
    amount: u64,
    reserve_lamport: u64,
    fee: FeeBps,
) -> Result<u64> {
    let adjusted = fee.deduct_from(amount);
    constant_product_out(reserve_token, reserve_lamport, adjusted)
}

/// Output floor for a slippage tolerance: `floor(estimated * (10000 - slippage) / 10000)`
#[inline]
pub fn min_amount_out(estimated: u64, slippage: FeeBps) -> u64 {
    slippage.deduct_from(estimated)
}

/// Full quote for selling tokens into the curve
pub fn quote_sell(reserves: Reserves, amount: u64, fee: FeeBps, slippage: FeeBps) -> Result<Quote> {
    let amount_out = amount_out_sell(reserves.reserve_lamport, amount, fee, reserves.reserve_token)?;
    Ok(build_quote(amount, fee, amount_out, slippage))
}

/// Full quote for buying tokens from the curve
pub fn quote_buy(reserves: Reserves, amount: u64, fee: FeeBps, slippage: FeeBps) -> Result<Quote> {
    let amount_out = amount_out_buy(reserves.reserve_token, amount, reserves.reserve_lamport, fee)?;
    Ok(build_quote(amount, fee, amount_out, slippage))
}

fn build_quote(amount: u64, fee: FeeBps, amount_out: u64, slippage: FeeBps) -> Quote {
    let adjusted_amount = fee.deduct_from(amount);
    Quote {
        amount_in: amount,
        adjusted_amount,
        fee_amount: amount - adjusted_amount,
        amount_out,
        min_amount_out: min_amount_out(amount_out, slippage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bps(v: u64) -> FeeBps {
        FeeBps::new(v).unwrap()
    }

    #[test]
    fn test_sell_with_fractional_fee() {
        // 0.01 -> 100 bps -> adjusted 990 -> 990_000_000 / 500_990
        let fee = FeeBps::from_legacy(0.01).unwrap();
        let out = amount_out_sell(1_000_000, 1000, fee, 500_000).unwrap();
        assert_eq!(out, 1976);
    }

    #[test]
    fn test_buy_with_bps_fee() {
        // 100 is already bps -> adjusted 990 -> 495_000_000 / 1_000_990
        let fee = FeeBps::from_legacy(100.0).unwrap();
        let out = amount_out_buy(500_000, 1000, 1_000_000, fee).unwrap();
        assert_eq!(out, 494);
    }

    #[test]
    fn test_empty_curve_rejected() {
        assert_eq!(
            amount_out_sell(1_000_000, 0, FeeBps::ZERO, 0),
            Err(CurveError::InvalidReserveState)
        );
        assert_eq!(
            amount_out_buy(0, 0, 0, FeeBps::ZERO),
            Err(CurveError::InvalidReserveState)
        );
        // fee eats the whole input on an empty curve
        assert_eq!(
            amount_out_sell(1_000_000, 1, bps(9_999), 0),
            Err(CurveError::InvalidReserveState)
        );
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(amount_out_sell(1_000_000, 0, bps(100), 500_000).unwrap(), 0);
        assert_eq!(amount_out_buy(500_000, 0, 1_000_000, bps(100)).unwrap(), 0);
    }

    #[test]
    fn test_no_overflow_at_u64_extremes() {
        let out = amount_out_buy(u64::MAX, u64::MAX, u64::MAX, FeeBps::ZERO).unwrap();
        assert_eq!(out, u64::MAX / 2);

        let out = amount_out_sell(u64::MAX, u64::MAX, FeeBps::ZERO, 1).unwrap();
        assert!(out < u64::MAX);
    }

    #[test]
    fn test_quote_bundle() {
        let reserves = Reserves::new(1_000_000, 500_000);
        let quote = quote_sell(reserves, 1000, bps(100), bps(100)).unwrap();

        assert_eq!(quote.adjusted_amount, 990);
        assert_eq!(quote.fee_amount, 10);
        assert_eq!(quote.amount_out, 1976);
        // floor(1976 * 9900 / 10000) = floor(1956.24)
        assert_eq!(quote.min_amount_out, 1956);
    }

    #[test]
    fn test_min_amount_out() {
        assert_eq!(min_amount_out(10_000, bps(100)), 9_900);
        assert_eq!(min_amount_out(99, bps(100)), 98);
        assert_eq!(min_amount_out(0, bps(500)), 0);
        assert_eq!(min_amount_out(1234, FeeBps::ZERO), 1234);
    }
}
