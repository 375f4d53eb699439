//! Offline quotes from reserves given on the command line

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use curve_model::{quote_buy, quote_sell, BondingCurve, FeeBps, Quote, Reserves, Side, SwapFees};
use serde::Serialize;

use crate::client::{lamports_to_sol, tokens_to_ui};
use crate::config::QuoteConfig;

/// Mutually exclusive ways to pass the platform fee
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct FeeArgs {
    /// Fee in basis points (100 = 1%)
    #[arg(long)]
    pub fee_bps: Option<u64>,

    /// Fee as a fraction (0.01 = 1%)
    #[arg(long)]
    pub fee_fraction: Option<f64>,

    /// Fee as stored by the app: >= 1 is bps, below 1 is a fraction
    #[arg(long)]
    pub fee: Option<f64>,
}

impl FeeArgs {
    /// Resolve to basis points, falling back to the configured fee
    pub fn resolve(&self, config: &QuoteConfig) -> Result<FeeBps> {
        let fee = if let Some(bps) = self.fee_bps {
            FeeBps::new(bps).with_context(|| format!("Invalid --fee-bps {bps}"))?
        } else if let Some(fraction) = self.fee_fraction {
            FeeBps::from_fraction(fraction).with_context(|| format!("Invalid --fee-fraction {fraction}"))?
        } else if let Some(value) = self.fee {
            FeeBps::from_legacy(value).with_context(|| format!("Invalid --fee {value}"))?
        } else {
            config.fee
        };
        Ok(fee)
    }
}

/// Resolve an optional slippage override against the config
pub fn resolve_slippage(slippage_bps: Option<u64>, config: &QuoteConfig) -> Result<FeeBps> {
    match slippage_bps {
        Some(bps) => FeeBps::new(bps).with_context(|| format!("Invalid --slippage-bps {bps}")),
        None => Ok(config.slippage),
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteReport {
    pub side: &'static str,
    pub reserve_lamport: u64,
    pub reserve_token: u64,
    pub fee_bps: u64,
    pub slippage_bps: u64,
    pub amount_in: u64,
    pub adjusted_amount: u64,
    pub fee_amount: u64,
    pub amount_out: u64,
    pub min_amount_out: u64,
}

impl QuoteReport {
    pub fn new(side: Side, reserves: Reserves, fee: FeeBps, slippage: FeeBps, quote: &Quote) -> Self {
        Self {
            side: side_label(side),
            reserve_lamport: reserves.reserve_lamport,
            reserve_token: reserves.reserve_token,
            fee_bps: fee.bps(),
            slippage_bps: slippage.bps(),
            amount_in: quote.amount_in,
            adjusted_amount: quote.adjusted_amount,
            fee_amount: quote.fee_amount,
            amount_out: quote.amount_out,
            min_amount_out: quote.min_amount_out,
        }
    }

    pub fn print(&self, token_decimals: u8) {
        // buys spend lamports and receive tokens, sells the reverse
        let (fmt_in, fmt_out): (fn(u64, u8) -> String, fn(u64, u8) -> String) = match self.side {
            "buy" => (fmt_sol, fmt_tokens),
            _ => (fmt_tokens, fmt_sol),
        };

        println!("{} {}", "Side:".bright_cyan(), self.side.to_uppercase());
        println!("{} {} bps", "Fee:".bright_cyan(), self.fee_bps);
        println!("{} {}", "Amount In:".bright_cyan(), fmt_in(self.amount_in, token_decimals));
        println!("{} {}", "After Fee:".bright_cyan(), fmt_in(self.adjusted_amount, token_decimals));
        println!("{} {}", "Fee Amount:".bright_cyan(), fmt_in(self.fee_amount, token_decimals));
        println!(
            "{} {}",
            "Amount Out:".bright_green().bold(),
            fmt_out(self.amount_out, token_decimals)
        );
        println!(
            "{} {} ({} bps slippage)",
            "Min Out:".bright_cyan(),
            fmt_out(self.min_amount_out, token_decimals),
            self.slippage_bps
        );
    }
}

pub fn side_label(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

fn fmt_sol(lamports: u64, _decimals: u8) -> String {
    format!("{} lamports ({} SOL)", lamports, lamports_to_sol(lamports))
}

fn fmt_tokens(amount: u64, decimals: u8) -> String {
    format!("{} ({} tokens)", amount, tokens_to_ui(amount, decimals))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

/// Quote spending `amount` lamports on a curve
pub fn quote_buy_offline(
    config: &QuoteConfig,
    reserves: Reserves,
    amount: u64,
    fee: FeeBps,
    slippage: FeeBps,
    json: bool,
) -> Result<()> {
    let quote = quote_buy(reserves, amount, fee, slippage).context("Buy quote failed")?;
    log::debug!("buy quote: {quote:?}");
    let report = QuoteReport::new(Side::Buy, reserves, fee, slippage, &quote);

    if json {
        return print_json(&report);
    }
    println!("{}", "=== Buy Quote ===".bright_green().bold());
    report.print(config.token_decimals);
    Ok(())
}

/// Quote selling `amount` tokens into a curve
pub fn quote_sell_offline(
    config: &QuoteConfig,
    reserves: Reserves,
    amount: u64,
    fee: FeeBps,
    slippage: FeeBps,
    json: bool,
) -> Result<()> {
    let quote = quote_sell(reserves, amount, fee, slippage).context("Sell quote failed")?;
    log::debug!("sell quote: {quote:?}");
    let report = QuoteReport::new(Side::Sell, reserves, fee, slippage, &quote);

    if json {
        return print_json(&report);
    }
    println!("{}", "=== Sell Quote ===".bright_green().bold());
    report.print(config.token_decimals);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct LaunchReport {
    pub token_supply: u64,
    pub init_bonding_curve_percent: f64,
    pub virtual_reserves: u64,
    pub curve_limit: u64,
    pub amount_in: u64,
    pub fee: u64,
    pub refund: u64,
    pub amount_out: u64,
    pub min_amount_out: u64,
    pub reserve_lamport_after: u64,
    pub reserve_token_after: u64,
    pub completed: bool,
}

/// Expected output of the creator's first buy when launching a token
pub fn quote_launch(
    config: &QuoteConfig,
    amount: u64,
    token_supply: Option<u64>,
    virtual_reserves: Option<u64>,
    slippage: FeeBps,
    json: bool,
) -> Result<()> {
    let token_supply = token_supply.unwrap_or(config.token_supply);
    let virtual_reserves = virtual_reserves.unwrap_or(config.virtual_reserves);

    let mut curve = BondingCurve::at_launch(
        token_supply,
        config.init_bonding_curve_percent,
        virtual_reserves,
        config.curve_limit,
    )
    .context("Invalid launch parameters")?;

    let fees = SwapFees {
        buy: config.fee,
        sell: config.fee,
    };
    let outcome = curve
        .swap(amount, Side::Buy, 0, fees)
        .context("Launch buy failed")?;
    let min_amount_out = curve_model::min_amount_out(outcome.amount_out, slippage);

    let report = LaunchReport {
        token_supply,
        init_bonding_curve_percent: config.init_bonding_curve_percent,
        virtual_reserves,
        curve_limit: config.curve_limit,
        amount_in: outcome.amount_in,
        fee: outcome.fee,
        refund: outcome.refund,
        amount_out: outcome.amount_out,
        min_amount_out,
        reserve_lamport_after: curve.reserve_lamport,
        reserve_token_after: curve.reserve_token,
        completed: outcome.completed,
    };

    if json {
        return print_json(&report);
    }

    let d = config.token_decimals;
    println!("{}", "=== Launch Quote ===".bright_green().bold());
    println!("{} {}", "Token Supply:".bright_cyan(), fmt_tokens(token_supply, d));
    println!("{} {}%", "On Curve:".bright_cyan(), config.init_bonding_curve_percent);
    println!("{} {}", "Virtual Reserves:".bright_cyan(), fmt_sol(virtual_reserves, d));
    println!("{} {}", "Swap In:".bright_cyan(), fmt_sol(outcome.amount_in, d));
    println!("{} {}", "Fee:".bright_cyan(), fmt_sol(outcome.fee, d));
    if outcome.refund > 0 {
        println!("{} {}", "Refund:".yellow(), fmt_sol(outcome.refund, d));
    }
    println!("{} {}", "Tokens Out:".bright_green().bold(), fmt_tokens(outcome.amount_out, d));
    println!(
        "{} {} ({} bps slippage)",
        "Min Out:".bright_cyan(),
        fmt_tokens(min_amount_out, d),
        slippage.bps()
    );
    if outcome.completed {
        println!("\n{}", "Launch buy completes the curve".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    fn config() -> QuoteConfig {
        QuoteConfig::new(FileConfig::default(), None, None, None).unwrap()
    }

    #[test]
    fn test_fee_args_precedence() {
        let config = config();

        let none = FeeArgs::default();
        assert_eq!(none.resolve(&config).unwrap(), config.fee);

        let bps = FeeArgs { fee_bps: Some(250), ..Default::default() };
        assert_eq!(bps.resolve(&config).unwrap().bps(), 250);

        let fraction = FeeArgs { fee_fraction: Some(0.02), ..Default::default() };
        assert_eq!(fraction.resolve(&config).unwrap().bps(), 200);

        let legacy = FeeArgs { fee: Some(0.01), ..Default::default() };
        assert_eq!(legacy.resolve(&config).unwrap().bps(), 100);
    }

    #[test]
    fn test_fee_args_invalid() {
        let config = config();
        let bad = FeeArgs { fee_bps: Some(10_000), ..Default::default() };
        assert!(bad.resolve(&config).is_err());

        let bad = FeeArgs { fee_fraction: Some(1.5), ..Default::default() };
        assert!(bad.resolve(&config).is_err());
    }

    #[test]
    fn test_report_from_quote() {
        let reserves = Reserves::new(1_000_000, 500_000);
        let fee = FeeBps::new(100).unwrap();
        let quote = quote_sell(reserves, 1000, fee, FeeBps::ZERO).unwrap();
        let report = QuoteReport::new(Side::Sell, reserves, fee, FeeBps::ZERO, &quote);

        assert_eq!(report.side, "sell");
        assert_eq!(report.amount_out, 1976);
        assert_eq!(report.min_amount_out, 1976);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fee_amount"], 10);
    }

    #[test]
    fn test_launch_quote_runs() {
        let config = config();
        assert!(quote_launch(&config, 1_000_000_000, None, None, config.slippage, true).is_ok());
        // zero amount is rejected by the settlement model
        assert!(quote_launch(&config, 0, None, None, config.slippage, true).is_err());
    }
}
