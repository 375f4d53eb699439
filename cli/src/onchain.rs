//! Quotes against live bonding curve accounts

use anyhow::{Context, Result};
use colored::Colorize;
use curve_model::{quote_buy, quote_sell, FeeBps, MarketSnapshot, Side};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::client::{self, format_pubkey, lamports_to_sol, tokens_to_ui};
use crate::config::QuoteConfig;
use crate::quote::{print_json, side_label, QuoteReport};

fn parse_mint(mint: &str) -> Result<Pubkey> {
    Pubkey::from_str(mint).with_context(|| format!("Invalid mint address: {}", mint))
}

#[derive(Debug, Serialize)]
struct CurveReport {
    mint: String,
    bonding_curve: String,
    creator: String,
    created_time: i64,
    reserve_lamport: u64,
    reserve_token: u64,
    curve_limit: u64,
    is_completed: bool,
    max_buy_amount: u64,
    max_sell_amount: u64,
    platform_buy_fee_bps: u64,
    platform_sell_fee_bps: u64,
    price_sol: f64,
    price_usd: Option<f64>,
    market_cap_usd: Option<f64>,
    liquidity_usd: Option<f64>,
    curve_progress: Option<f64>,
}

/// Show reserves, fees and market figures for a token's bonding curve
pub async fn show_curve(config: &QuoteConfig, mint: String, json: bool) -> Result<()> {
    let mint = parse_mint(&mint)?;
    let rpc = client::create_rpc_client(config);

    let (curve_address, curve) = client::fetch_bonding_curve(&rpc, &config.program_id, &mint).await?;
    let (_, global) = client::fetch_global_config(&rpc, &config.program_id).await?;
    let fees = global.swap_fees()?;

    let model = curve.to_model();
    let snapshot = MarketSnapshot::new(model.reserves(), config.token_decimals, config.token_supply);
    let sol_price = config.sol_price_usd;

    let report = CurveReport {
        mint: mint.to_string(),
        bonding_curve: curve_address.to_string(),
        creator: curve.creator.to_string(),
        created_time: curve.created_time,
        reserve_lamport: curve.reserve_lamport,
        reserve_token: curve.reserve_token,
        curve_limit: curve.curve_limit,
        is_completed: curve.is_completed,
        max_buy_amount: curve.max_buy_amount,
        max_sell_amount: curve.max_sell_amount,
        platform_buy_fee_bps: fees.buy.bps(),
        platform_sell_fee_bps: fees.sell.bps(),
        price_sol: snapshot.price_sol(),
        price_usd: sol_price.map(|p| snapshot.price_usd(p)),
        market_cap_usd: sol_price.map(|p| snapshot.market_cap_usd(p)),
        liquidity_usd: sol_price.map(|p| snapshot.liquidity_usd(p)),
        curve_progress: snapshot.curve_progress(config.virtual_reserves, curve.curve_limit),
    };

    if json {
        return print_json(&report);
    }

    let d = config.token_decimals;
    println!("{}", "=== Bonding Curve ===".bright_green().bold());
    println!("{} {}", "Network:".bright_cyan(), config.network);
    println!("{} {}", "Mint:".bright_cyan(), mint);
    println!("{} {}", "Curve Account:".bright_cyan(), format_pubkey(&curve_address));
    println!("{} {}", "Creator:".bright_cyan(), format_pubkey(&curve.creator));
    println!(
        "{} {} lamports ({} SOL)",
        "Lamport Reserve:".bright_cyan(),
        curve.reserve_lamport,
        lamports_to_sol(curve.reserve_lamport)
    );
    println!(
        "{} {} ({} tokens)",
        "Token Reserve:".bright_cyan(),
        curve.reserve_token,
        tokens_to_ui(curve.reserve_token, d)
    );
    println!("{} {} SOL", "Curve Limit:".bright_cyan(), lamports_to_sol(curve.curve_limit));
    println!("{} {} / {}", "Fees (buy/sell):".bright_cyan(), fees.buy, fees.sell);
    println!("{} {:.12} SOL", "Price:".bright_cyan(), report.price_sol);
    if let (Some(price), Some(cap)) = (report.price_usd, report.market_cap_usd) {
        println!("{} ${:.10}", "Price (USD):".bright_cyan(), price);
        println!("{} ${:.2}", "Market Cap:".bright_cyan(), cap);
    }
    match report.curve_progress {
        Some(progress) => println!("{} {:.2}%", "Progress:".bright_cyan(), progress),
        None => println!("{} {}", "Progress:".bright_cyan(), "n/a".dimmed()),
    }
    if curve.is_completed {
        println!("\n{}", "Curve is completed, trading has moved off the curve".yellow());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SwapPreview {
    mint: String,
    direction: u8,
    estimate: QuoteReport,
    settlement: Option<SettlementReport>,
    settlement_error: Option<String>,
    deadline: i64,
}

#[derive(Debug, Serialize)]
struct SettlementReport {
    amount_in: u64,
    amount_out: u64,
    fee_lamports: u64,
    refund: u64,
    completes_curve: bool,
    reserve_lamport_after: u64,
    reserve_token_after: u64,
}

/// Quote a swap against the live curve with the program's configured fees
pub async fn preview_swap(
    config: &QuoteConfig,
    mint: String,
    side: Side,
    amount: u64,
    slippage: FeeBps,
    json: bool,
) -> Result<()> {
    let mint = parse_mint(&mint)?;
    let rpc = client::create_rpc_client(config);

    let (_, curve) = client::fetch_bonding_curve(&rpc, &config.program_id, &mint).await?;
    let (_, global) = client::fetch_global_config(&rpc, &config.program_id).await?;
    let fees = global.swap_fees()?;

    let model = curve.to_model();
    let reserves = model.reserves();

    let (fee, quote) = match side {
        Side::Buy => (fees.buy, quote_buy(reserves, amount, fees.buy, slippage)),
        Side::Sell => (fees.sell, quote_sell(reserves, amount, fees.sell, slippage)),
    };
    let quote = quote.with_context(|| format!("{} quote failed", side_label(side)))?;
    let estimate = QuoteReport::new(side, reserves, fee, slippage, &quote);

    // settle on a copy with the estimate's floor, as the transaction would
    let mut after = model;
    let (settlement, settlement_error) = match after.swap(amount, side, quote.min_amount_out, fees) {
        Ok(outcome) => (
            Some(SettlementReport {
                amount_in: outcome.amount_in,
                amount_out: outcome.amount_out,
                fee_lamports: outcome.fee,
                refund: outcome.refund,
                completes_curve: outcome.completed,
                reserve_lamport_after: after.reserve_lamport,
                reserve_token_after: after.reserve_token,
            }),
            None,
        ),
        Err(e) => {
            log::warn!("settlement preview rejected: {e}");
            (None, Some(e.to_string()))
        }
    };

    let preview = SwapPreview {
        mint: mint.to_string(),
        direction: side.direction(),
        estimate,
        settlement,
        settlement_error,
        deadline: chrono::Utc::now().timestamp() + config.deadline_secs,
    };

    if json {
        return print_json(&preview);
    }

    println!("{}", "=== Swap Preview ===".bright_green().bold());
    println!("{} {}", "Mint:".bright_cyan(), mint);
    println!("\n{}", "Client estimate".bold());
    preview.estimate.print(config.token_decimals);

    println!("\n{}", "Program settlement".bold());
    match (&preview.settlement, &preview.settlement_error) {
        (Some(s), _) => {
            println!("{} {}", "Amount In:".bright_cyan(), s.amount_in);
            println!("{} {}", "Amount Out:".bright_green().bold(), s.amount_out);
            println!("{} {} lamports", "Fee:".bright_cyan(), s.fee_lamports);
            if s.refund > 0 {
                println!("{} {} lamports (curve limit reached)", "Refund:".yellow(), s.refund);
            }
            println!(
                "{} {} / {}",
                "Reserves After:".bright_cyan(),
                s.reserve_lamport_after,
                s.reserve_token_after
            );
            if s.completes_curve {
                println!("{}", "This trade completes the curve".yellow());
            }
        }
        (None, Some(err)) => println!("{} {}", "Rejected:".bright_red(), err),
        (None, None) => {}
    }
    println!(
        "\n{} {} ({}s from now)",
        "Deadline:".bright_cyan(),
        preview.deadline,
        config.deadline_secs
    );
    Ok(())
}
