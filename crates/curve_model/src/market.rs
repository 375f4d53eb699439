//! Display figures derived from a reserve snapshot
//!
//! These are f64 approximations for dashboards and CLI output. Settlement
//! always goes through the integer math in [`crate::math`] and [`crate::curve`].

use crate::{Reserves, LAMPORTS_PER_SOL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSnapshot {
    pub reserves: Reserves,
    pub token_decimals: u8,
    pub token_supply: u64,
}

impl MarketSnapshot {
    pub fn new(reserves: Reserves, token_decimals: u8, token_supply: u64) -> Self {
        Self {
            reserves,
            token_decimals,
            token_supply,
        }
    }

    fn token_unit(&self) -> f64 {
        10f64.powi(self.token_decimals as i32)
    }

    /// Spot price of one whole token in SOL, 0 for a degenerate curve
    pub fn price_sol(&self) -> f64 {
        if self.reserves.is_degenerate() {
            return 0.0;
        }
        let sol = self.reserves.reserve_lamport as f64 / LAMPORTS_PER_SOL as f64;
        let tokens = self.reserves.reserve_token as f64 / self.token_unit();
        sol / tokens
    }

    pub fn price_usd(&self, sol_price_usd: f64) -> f64 {
        self.price_sol() * sol_price_usd
    }

    /// Fully diluted market cap
    pub fn market_cap_usd(&self, sol_price_usd: f64) -> f64 {
        self.token_supply as f64 / self.token_unit() * self.price_usd(sol_price_usd)
    }

    /// Value of both reserves in USD
    pub fn liquidity_usd(&self, sol_price_usd: f64) -> f64 {
        let sol = self.reserves.reserve_lamport as f64 / LAMPORTS_PER_SOL as f64;
        let tokens = self.reserves.reserve_token as f64 / self.token_unit();
        sol * sol_price_usd + tokens * self.price_usd(sol_price_usd)
    }

    /// Percentage of the way from the virtual reserve to the curve limit
    ///
    /// `None` when the limit does not exceed the virtual reserve.
    pub fn curve_progress(&self, virtual_reserves: u64, curve_limit: u64) -> Option<f64> {
        if curve_limit <= virtual_reserves {
            return None;
        }
        let filled = self.reserves.reserve_lamport as f64 - virtual_reserves as f64;
        let span = (curve_limit - virtual_reserves) as f64;
        Some(filled / span * 100.0)
    }
}
