//! Launchpad quote CLI - Bonding curve pricing for launchpad tokens
//!
//! Prices buys and sells against a launchpad bonding curve, either from
//! reserves given on the command line or from the live program accounts
//! on localnet, devnet or mainnet.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use curve_model::{Reserves, Side};
use std::path::PathBuf;

mod client;
mod config;
mod onchain;
mod quote;

use config::{FileConfig, QuoteConfig};
use quote::FeeArgs;

#[derive(Parser)]
#[command(name = "launchpad-quote")]
#[command(about = "Launchpad bonding curve quotes - buy, sell and launch estimates", long_about = None)]
#[command(version)]
struct Cli {
    /// Network to connect to (localnet, devnet, mainnet-beta)
    #[arg(short, long)]
    network: Option<String>,

    /// RPC URL (overrides network default)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to config file (default: ~/.config/launchpad/quote.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Quote spending lamports for tokens
    Buy {
        /// Token reserve of the curve
        #[arg(long)]
        reserve_token: u64,

        /// Lamport reserve of the curve
        #[arg(long)]
        reserve_lamport: u64,

        /// Lamports to spend
        #[arg(short, long)]
        amount: u64,

        #[command(flatten)]
        fee: FeeArgs,

        /// Slippage tolerance (basis points)
        #[arg(long)]
        slippage_bps: Option<u64>,
    },

    /// Quote selling tokens for lamports
    Sell {
        /// Lamport reserve of the curve
        #[arg(long)]
        reserve_lamport: u64,

        /// Token reserve of the curve
        #[arg(long)]
        reserve_token: u64,

        /// Tokens to sell (raw units)
        #[arg(short, long)]
        amount: u64,

        #[command(flatten)]
        fee: FeeArgs,

        /// Slippage tolerance (basis points)
        #[arg(long)]
        slippage_bps: Option<u64>,
    },

    /// Estimate the creator's first buy at token launch
    Launch {
        /// Lamports to spend
        #[arg(short, long)]
        amount: u64,

        /// Token supply (raw units)
        #[arg(long)]
        supply: Option<u64>,

        /// Initial virtual lamport reserve
        #[arg(long)]
        virtual_reserves: Option<u64>,

        /// Slippage tolerance (basis points)
        #[arg(long)]
        slippage_bps: Option<u64>,
    },

    /// Show the live bonding curve for a token
    Curve {
        /// Token mint address
        mint: String,
    },

    /// Preview a swap against the live bonding curve
    Swap {
        /// Token mint address
        mint: String,

        /// Trade direction
        #[arg(short, long, value_enum)]
        side: SideArg,

        /// Lamports to spend (buy) or tokens to sell (sell)
        #[arg(short, long)]
        amount: u64,

        /// Slippage tolerance (basis points)
        #[arg(long)]
        slippage_bps: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (file, config_path) = FileConfig::load(cli.config.as_deref())?;
    let config = QuoteConfig::new(file, config_path, cli.network.clone(), cli.url.clone())?;

    if cli.verbose && !cli.json {
        println!("{} {}", "Network:".bright_cyan(), config.network);
        println!("{} {}", "RPC URL:".bright_cyan(), config.rpc_url);
        println!("{} {}", "Program:".bright_cyan(), config.program_id);
        if let Some(path) = &config.config_path {
            println!("{} {}", "Config:".bright_cyan(), path.display());
        }
        println!();
    }

    // Execute command
    match cli.command {
        Commands::Buy { reserve_token, reserve_lamport, amount, fee, slippage_bps } => {
            let fee = fee.resolve(&config)?;
            let slippage = quote::resolve_slippage(slippage_bps, &config)?;
            let reserves = Reserves::new(reserve_lamport, reserve_token);
            quote::quote_buy_offline(&config, reserves, amount, fee, slippage, cli.json)?;
        }
        Commands::Sell { reserve_lamport, reserve_token, amount, fee, slippage_bps } => {
            let fee = fee.resolve(&config)?;
            let slippage = quote::resolve_slippage(slippage_bps, &config)?;
            let reserves = Reserves::new(reserve_lamport, reserve_token);
            quote::quote_sell_offline(&config, reserves, amount, fee, slippage, cli.json)?;
        }
        Commands::Launch { amount, supply, virtual_reserves, slippage_bps } => {
            let slippage = quote::resolve_slippage(slippage_bps, &config)?;
            quote::quote_launch(&config, amount, supply, virtual_reserves, slippage, cli.json)?;
        }
        Commands::Curve { mint } => {
            onchain::show_curve(&config, mint, cli.json).await?;
        }
        Commands::Swap { mint, side, amount, slippage_bps } => {
            let slippage = quote::resolve_slippage(slippage_bps, &config)?;
            onchain::preview_swap(&config, mint, side.into(), amount, slippage, cli.json).await?;
        }
    }

    Ok(())
}
