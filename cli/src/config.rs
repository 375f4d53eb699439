//! Quote configuration and network resolution

use anyhow::{Context, Result};
use curve_model::FeeBps;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Used when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/launchpad/quote.toml";

/// Deployed launchpad program
pub const DEFAULT_PROGRAM_ID: &str = "autoUmixaMaYKFjexMpQuBpNYntgbkzCo2b1ZqUaAZ5";

/// Raw TOML file contents. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub network: String,
    pub rpc_url: Option<String>,
    pub program_id: String,
    pub token_decimals: u8,
    pub token_supply: u64,
    pub virtual_reserves: u64,
    pub curve_limit: u64,
    pub init_bonding_curve_percent: f64,
    pub fee_bps: u64,
    pub slippage_bps: u64,
    pub deadline_secs: i64,
    pub sol_price_usd: Option<f64>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            network: "mainnet-beta".to_string(),
            rpc_url: None,
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            token_decimals: 6,
            token_supply: 1_000_000_000_000_000,
            virtual_reserves: 100_000_000,
            curve_limit: 113_000_000_000,
            init_bonding_curve_percent: 100.0,
            fee_bps: 100,
            slippage_bps: 100,
            deadline_secs: 120,
            sol_price_usd: None,
        }
    }
}

impl FileConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse quote config")
    }

    /// Load from an explicit path, or from the default path when present
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let (path, required) = match path {
            Some(p) => (expand_path(p)?, true),
            None => (expand_path(Path::new(DEFAULT_CONFIG_PATH))?, false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("no config at {}, using defaults", path.display());
            return Ok((Self::default(), None));
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&data)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok((config, Some(path)))
    }
}

/// Resolved settings used by every command
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub network: String,
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub config_path: Option<PathBuf>,
    pub token_decimals: u8,
    pub token_supply: u64,
    pub virtual_reserves: u64,
    pub curve_limit: u64,
    pub init_bonding_curve_percent: f64,
    pub fee: FeeBps,
    pub slippage: FeeBps,
    pub deadline_secs: i64,
    pub sol_price_usd: Option<f64>,
}

impl QuoteConfig {
    /// Merge the file with command-line overrides
    pub fn new(
        file: FileConfig,
        config_path: Option<PathBuf>,
        network: Option<String>,
        rpc_url: Option<String>,
    ) -> Result<Self> {
        let network = network.unwrap_or(file.network);
        let rpc_url = match rpc_url.or(file.rpc_url) {
            Some(url) => url,
            None => default_rpc_url(&network)?,
        };

        let program_id = Pubkey::from_str(&file.program_id)
            .with_context(|| format!("Invalid program ID: {}", file.program_id))?;
        let fee = FeeBps::new(file.fee_bps)
            .with_context(|| format!("Invalid fee_bps: {}", file.fee_bps))?;
        let slippage = FeeBps::new(file.slippage_bps)
            .with_context(|| format!("Invalid slippage_bps: {}", file.slippage_bps))?;

        Ok(Self {
            network,
            rpc_url,
            program_id,
            config_path,
            token_decimals: file.token_decimals,
            token_supply: file.token_supply,
            virtual_reserves: file.virtual_reserves,
            curve_limit: file.curve_limit,
            init_bonding_curve_percent: file.init_bonding_curve_percent,
            fee,
            slippage,
            deadline_secs: file.deadline_secs,
            sol_price_usd: file.sol_price_usd,
        })
    }
}

fn default_rpc_url(network: &str) -> Result<String> {
    let url = match network {
        "localnet" | "local" => "http://127.0.0.1:8899",
        "devnet" => "https://api.devnet.solana.com",
        "mainnet-beta" | "mainnet" => "https://api.mainnet-beta.solana.com",
        _ => anyhow::bail!("Unknown network: {}. Use localnet, devnet, or mainnet-beta", network),
    };
    Ok(url.to_string())
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_resolve() {
        let config = QuoteConfig::new(FileConfig::default(), None, None, None).unwrap();
        assert_eq!(config.network, "mainnet-beta");
        assert_eq!(config.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.program_id.to_string(), DEFAULT_PROGRAM_ID);
        assert_eq!(config.slippage.bps(), 100);
        assert_eq!(config.curve_limit, 113_000_000_000);
    }

    #[test]
    fn test_overrides_win() {
        let file = FileConfig {
            rpc_url: Some("http://file:8899".to_string()),
            ..FileConfig::default()
        };

        let config = QuoteConfig::new(file.clone(), None, Some("devnet".to_string()), None).unwrap();
        assert_eq!(config.network, "devnet");
        assert_eq!(config.rpc_url, "http://file:8899");

        let config = QuoteConfig::new(file, None, None, Some("http://flag:8899".to_string())).unwrap();
        assert_eq!(config.rpc_url, "http://flag:8899");
    }

    #[test]
    fn test_unknown_network() {
        let err = QuoteConfig::new(FileConfig::default(), None, Some("testnet-x".to_string()), None)
            .unwrap_err();
        assert!(err.to_string().contains("Unknown network"));
    }

    #[test]
    fn test_invalid_slippage_rejected() {
        let file = FileConfig {
            slippage_bps: 10_000,
            ..FileConfig::default()
        };
        assert!(QuoteConfig::new(file, None, None, None).is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"devnet\"\ncurve_limit = 85000000000\nsol_price_usd = 150.0").unwrap();

        let (config, path) = FileConfig::load(Some(file.path())).unwrap();
        assert_eq!(path.as_deref(), Some(file.path()));
        assert_eq!(config.network, "devnet");
        assert_eq!(config.curve_limit, 85_000_000_000);
        assert_eq!(config.sol_price_usd, Some(150.0));
        // untouched keys keep their defaults
        assert_eq!(config.token_decimals, 6);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileConfig::from_toml("curve_limt = 5").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = FileConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
