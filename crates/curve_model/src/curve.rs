//! Settlement model of the launchpad program's bonding curve account
//!
//! The program charges fees differently from the client estimate:
//! - Buy: fee taken from the lamport input, the rest is swapped
//! - Sell: fee taken from the gross lamport output
//!
//! Buys are capped at the curve limit. Once `reserve_lamport` reaches the
//! limit the curve is completed and rejects further trades.

use log::debug;

use crate::math::constant_product_out;
use crate::{CurveError, FeeBps, Reserves, Result};

/// Trade direction. The program encodes it as 0 = buy, 1 = sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_direction(direction: u8) -> Option<Self> {
        match direction {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn direction(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

/// Platform fees from the global config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapFees {
    pub buy: FeeBps,
    pub sell: FeeBps,
}

/// Result of a settled swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub side: Side,
    /// Amount actually swapped (buys may be capped)
    pub amount_in: u64,
    /// Net amount delivered to the trader
    pub amount_out: u64,
    /// Fee in lamports sent to the team wallet
    pub fee: u64,
    /// Part of a buy that did not fit under the curve limit
    pub refund: u64,
    /// Curve reached its limit with this trade
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BondingCurve {
    pub reserve_lamport: u64,
    pub reserve_token: u64,
    /// Lamport reserve at which the curve completes
    pub curve_limit: u64,
    /// Per-trade buy cap (0 = unlimited)
    pub max_buy_amount: u64,
    /// Per-trade sell cap (0 = unlimited)
    pub max_sell_amount: u64,
    pub is_completed: bool,
}

impl BondingCurve {
    /// Curve state right after launch
    ///
    /// # Arguments
    /// * `token_supply` - Total minted supply
    /// * `init_percent` - Share of supply placed on the curve, in (0, 100]
    /// * `virtual_lamports` - Initial virtual lamport reserve
    /// * `curve_limit` - Lamport reserve that completes the curve
    pub fn at_launch(
        token_supply: u64,
        init_percent: f64,
        virtual_lamports: u64,
        curve_limit: u64,
    ) -> Result<Self> {
        if !init_percent.is_finite() || init_percent <= 0.0 || init_percent > 100.0 {
            return Err(CurveError::InvalidAmount);
        }
        let reserve_token = (token_supply as f64 * init_percent / 100.0).floor() as u64;

        Ok(Self {
            reserve_lamport: virtual_lamports,
            reserve_token,
            curve_limit,
            ..Self::default()
        })
    }

    #[inline]
    pub fn reserves(&self) -> Reserves {
        Reserves::new(self.reserve_lamport, self.reserve_token)
    }

    /// Lamports a buy can still add before the curve completes
    #[inline]
    pub fn remaining_lamports(&self) -> u64 {
        self.curve_limit.saturating_sub(self.reserve_lamport)
    }

    /// Net output and lamport fee for `amount`, as the program computes it
    ///
    /// Returns `(amount_out, fee_lamports)`.
    pub fn amount_out(&self, amount: u64, side: Side, fees: SwapFees) -> Result<(u64, u64)> {
        if self.reserve_token == 0 || self.reserve_lamport == 0 {
            return Err(CurveError::InvalidReserveState);
        }

        match side {
            Side::Buy => {
                let fee = fees.buy.fee_on(amount);
                let adjusted = amount - fee;
                let out = constant_product_out(self.reserve_token, self.reserve_lamport, adjusted)?;
                Ok((out, fee))
            }
            Side::Sell => {
                let gross = constant_product_out(self.reserve_lamport, self.reserve_token, amount)?;
                let fee = fees.sell.fee_on(gross);
                Ok((gross - fee, fee))
            }
        }
    }

    /// Settle a swap against the curve and update reserves
    ///
    /// State is untouched when an error is returned.
    pub fn swap(
        &mut self,
        amount: u64,
        side: Side,
        minimum_receive_amount: u64,
        fees: SwapFees,
    ) -> Result<SwapOutcome> {
        if amount == 0 {
            return Err(CurveError::InvalidAmount);
        }
        if self.is_completed {
            return Err(CurveError::CurveCompleted);
        }

        match side {
            Side::Buy if self.max_buy_amount != 0 && self.max_buy_amount <= amount => {
                return Err(CurveError::ExceedsMaxBuyAmount);
            }
            Side::Sell if self.max_sell_amount != 0 && self.max_sell_amount <= amount => {
                return Err(CurveError::ExceedsMaxSellAmount);
            }
            _ => {}
        }

        let (amount_in, refund, min_receive) = match side {
            Side::Sell => (amount, 0, minimum_receive_amount),
            Side::Buy => {
                let remaining = self.remaining_lamports();
                if remaining == 0 {
                    return Err(CurveError::CurveCompleted);
                }
                if amount > remaining {
                    // scale the floor by the share of the order that fits
                    let scaled = (minimum_receive_amount as u128 * remaining as u128) / amount as u128;
                    (remaining, amount - remaining, scaled as u64)
                } else {
                    (amount, 0, minimum_receive_amount)
                }
            }
        };

        let (amount_out, fee) = self.amount_out(amount_in, side, fees)?;
        if amount_out < min_receive {
            return Err(CurveError::SlippageExceeded);
        }

        let (new_token, new_lamport) = match side {
            Side::Buy => {
                let swapped = amount_in - fee;
                (
                    self.reserve_token
                        .checked_sub(amount_out)
                        .ok_or(CurveError::InsufficientReserve)?,
                    self.reserve_lamport
                        .checked_add(swapped)
                        .ok_or(CurveError::Overflow)?,
                )
            }
            Side::Sell => {
                let gross = amount_out.checked_add(fee).ok_or(CurveError::Overflow)?;
                (
                    self.reserve_token
                        .checked_add(amount_in)
                        .ok_or(CurveError::Overflow)?,
                    self.reserve_lamport
                        .checked_sub(gross)
                        .ok_or(CurveError::InsufficientReserve)?,
                )
            }
        };

        let completed = self.update_reserves(new_token, new_lamport);

        Ok(SwapOutcome {
            side,
            amount_in,
            amount_out,
            fee,
            refund,
            completed,
        })
    }

    fn update_reserves(&mut self, reserve_token: u64, reserve_lamport: u64) -> bool {
        self.reserve_token = reserve_token;
        self.reserve_lamport = reserve_lamport;

        if reserve_lamport >= self.curve_limit {
            debug!("curve is completed: reserve_lamport {reserve_lamport} >= limit {}", self.curve_limit);
            self.is_completed = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 113_000_000_000;

    fn fees(buy: u64, sell: u64) -> SwapFees {
        SwapFees {
            buy: FeeBps::new(buy).unwrap(),
            sell: FeeBps::new(sell).unwrap(),
        }
    }

    fn launch() -> BondingCurve {
        BondingCurve::at_launch(1_000_000_000_000_000, 100.0, 28_000_000_000, LIMIT).unwrap()
    }

    #[test]
    fn test_at_launch() {
        let curve = BondingCurve::at_launch(1_000_000, 80.0, 500, 10_000).unwrap();
        assert_eq!(curve.reserve_token, 800_000);
        assert_eq!(curve.reserve_lamport, 500);
        assert!(!curve.is_completed);

        assert_eq!(
            BondingCurve::at_launch(1_000_000, 0.0, 500, 10_000),
            Err(CurveError::InvalidAmount)
        );
        assert_eq!(
            BondingCurve::at_launch(1_000_000, 150.0, 500, 10_000),
            Err(CurveError::InvalidAmount)
        );
    }

    #[test]
    fn test_program_fee_placement() {
        let curve = BondingCurve {
            reserve_lamport: 1_000_000,
            reserve_token: 500_000,
            curve_limit: u64::MAX,
            ..Default::default()
        };

        // buy: fee = 10, swapped 990 -> 495_000_000 / 1_000_990
        assert_eq!(curve.amount_out(1000, Side::Buy, fees(100, 100)).unwrap(), (494, 10));

        // sell: gross = 1_000_000_000 / 501_000 = 1996, fee = 19
        assert_eq!(curve.amount_out(1000, Side::Sell, fees(100, 100)).unwrap(), (1977, 19));
    }

    #[test]
    fn test_buy_then_sell_updates_reserves() {
        let mut curve = launch();
        let start = curve;

        let buy = curve.swap(1_000_000_000, Side::Buy, 0, fees(100, 100)).unwrap();
        assert_eq!(buy.fee, 10_000_000);
        assert_eq!(buy.refund, 0);
        assert!(!buy.completed);
        assert_eq!(curve.reserve_lamport, start.reserve_lamport + 990_000_000);
        assert_eq!(curve.reserve_token, start.reserve_token - buy.amount_out);

        let sell = curve.swap(buy.amount_out, Side::Sell, 0, fees(100, 100)).unwrap();
        assert_eq!(curve.reserve_token, start.reserve_token);
        assert_eq!(
            curve.reserve_lamport,
            start.reserve_lamport + 990_000_000 - sell.amount_out - sell.fee
        );

        // round trip loses to fees
        assert!(sell.amount_out < 1_000_000_000);
    }

    #[test]
    fn test_buy_capped_at_curve_limit() {
        let mut curve = BondingCurve {
            reserve_lamport: 100_000,
            reserve_token: 1_000_000,
            curve_limit: 150_000,
            ..Default::default()
        };

        let outcome = curve.swap(80_000, Side::Buy, 0, SwapFees::default()).unwrap();

        assert_eq!(outcome.amount_in, 50_000);
        assert_eq!(outcome.refund, 30_000);
        assert!(outcome.completed);
        assert!(curve.is_completed);
        assert_eq!(curve.reserve_lamport, 150_000);

        // completed curves reject everything
        assert_eq!(
            curve.swap(1, Side::Sell, 0, SwapFees::default()),
            Err(CurveError::CurveCompleted)
        );
    }

    #[test]
    fn test_capped_buy_scales_minimum() {
        let mut curve = BondingCurve {
            reserve_lamport: 100_000,
            reserve_token: 1_000_000,
            curve_limit: 150_000,
            ..Default::default()
        };

        // uncapped output for 50_000 is 333_333; asking 600_000 for 100_000 scales to 300_000
        let outcome = curve.swap(100_000, Side::Buy, 600_000, SwapFees::default()).unwrap();
        assert_eq!(outcome.amount_out, 333_333);
        assert_eq!(outcome.refund, 50_000);
    }

    #[test]
    fn test_slippage_leaves_state_untouched() {
        let mut curve = launch();
        let before = curve;

        let result = curve.swap(1_000_000_000, Side::Buy, u64::MAX, fees(100, 100));

        assert_eq!(result, Err(CurveError::SlippageExceeded));
        assert_eq!(curve, before);
    }

    #[test]
    fn test_trade_caps() {
        let mut curve = launch();
        curve.max_buy_amount = 1_000;
        curve.max_sell_amount = 5_000;

        assert_eq!(
            curve.swap(1_000, Side::Buy, 0, SwapFees::default()),
            Err(CurveError::ExceedsMaxBuyAmount)
        );
        assert!(curve.swap(999, Side::Buy, 0, SwapFees::default()).is_ok());
        assert_eq!(
            curve.swap(5_000, Side::Sell, 0, SwapFees::default()),
            Err(CurveError::ExceedsMaxSellAmount)
        );
    }

    #[test]
    fn test_invalid_requests() {
        let mut curve = launch();
        assert_eq!(
            curve.swap(0, Side::Buy, 0, SwapFees::default()),
            Err(CurveError::InvalidAmount)
        );

        let mut empty = BondingCurve {
            curve_limit: LIMIT,
            ..Default::default()
        };
        assert_eq!(
            empty.swap(1_000, Side::Buy, 0, SwapFees::default()),
            Err(CurveError::InvalidReserveState)
        );
    }

    #[test]
    fn test_direction_encoding() {
        assert_eq!(Side::from_direction(0), Some(Side::Buy));
        assert_eq!(Side::from_direction(1), Some(Side::Sell));
        assert_eq!(Side::from_direction(2), None);
        assert_eq!(Side::Sell.direction(), 1);
    }
}
