//! Curve Model - Pure bonding curve pricing (x·y=k) for the launchpad
//!
//! This crate holds the swap math shared by the quoting CLI and anything else
//! that needs to price a trade against a launchpad bonding curve:
//! - Fee normalization into basis points
//! - Client-side buy/sell estimates (fee deducted from the input)
//! - A settlement model mirroring the on-chain reserve accounting
//! - Display figures (price, market cap, curve progress)
//!
//! Every function is pure. Callers supply the reserve snapshot.

#![forbid(unsafe_code)]

pub mod curve;
pub mod fee;
pub mod market;
pub mod math;

pub use curve::{BondingCurve, Side, SwapFees, SwapOutcome};
pub use fee::FeeBps;
pub use market::MarketSnapshot;
pub use math::{
    amount_out_buy, amount_out_sell, min_amount_out, quote_buy, quote_sell, Quote, Reserves,
};

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Error types for curve pricing and settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    /// Pricing denominator is zero (empty curve)
    #[error("invalid reserve state: pricing denominator is zero")]
    InvalidReserveState,
    /// Fee does not normalize into [0, 10000) basis points
    #[error("invalid fee value: must normalize into [0, 10000) basis points")]
    InvalidFeeValue,
    /// Trade amount is zero
    #[error("trade amount must be greater than zero")]
    InvalidAmount,
    /// Output below the caller's minimum
    #[error("output amount is below the minimum receive amount")]
    SlippageExceeded,
    /// Curve already reached its lamport limit
    #[error("bonding curve is already completed")]
    CurveCompleted,
    /// Buy amount at or above the per-trade cap
    #[error("buy amount exceeds the curve's max buy amount")]
    ExceedsMaxBuyAmount,
    /// Sell amount at or above the per-trade cap
    #[error("sell amount exceeds the curve's max sell amount")]
    ExceedsMaxSellAmount,
    /// Trade would take more than a reserve holds
    #[error("trade would drain a reserve below zero")]
    InsufficientReserve,
    /// Arithmetic overflow
    #[error("arithmetic overflow")]
    Overflow,
}

pub type Result<T> = core::result::Result<T, CurveError>;
