//! Solana RPC client utilities and launchpad account decoding

use anyhow::{bail, Context, Result};
use colored::Colorize;
use curve_model::{BondingCurve, FeeBps, SwapFees};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, hash::hash, pubkey::Pubkey};

use crate::config::QuoteConfig;

pub const SEED_BONDING_CURVE: &[u8] = b"bonding_curve";
pub const SEED_CONFIG: &[u8] = b"config";

/// Create an RPC client from the quote configuration
pub fn create_rpc_client(config: &QuoteConfig) -> RpcClient {
    RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed())
}

/// Derive the bonding curve PDA for a token mint
pub fn derive_bonding_curve_pda(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SEED_BONDING_CURVE, mint.as_ref()], program_id)
}

/// Derive the global config PDA
pub fn derive_config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SEED_CONFIG], program_id)
}

/// Anchor account discriminator: first 8 bytes of sha256("account:<Name>")
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("account:{name}").as_bytes()).to_bytes();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Sequential little-endian reader over Borsh-encoded account data
struct AccountReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AccountReader<'a> {
    fn new(data: &'a [u8], name: &str) -> Result<Self> {
        let expected = account_discriminator(name);
        match data.get(..8) {
            Some(found) if found == expected => Ok(Self { data, offset: 8 }),
            Some(_) => bail!("Account is not a {name} (discriminator mismatch)"),
            None => bail!("Account data too short for {name}: {} bytes", data.len()),
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.offset + N;
        let bytes = self
            .data
            .get(self.offset..end)
            .with_context(|| format!("Account data ends at {} but {} bytes needed", self.data.len(), end))?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset = end;
        Ok(out)
    }

    fn pubkey(&mut self) -> Result<Pubkey> {
        Ok(Pubkey::new_from_array(self.take()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    fn u128(&mut self) -> Result<u128> {
        Ok(u128::from_le_bytes(self.take()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    fn bool(&mut self) -> Result<bool> {
        match self.take::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => bail!("Invalid bool byte {other} at offset {}", self.offset - 1),
        }
    }
}

/// Launchpad `BondingCurve` account
#[derive(Debug, Clone, PartialEq)]
pub struct BondingCurveAccount {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub created_time: i64,
    /// Percentage of supply placed on the curve at launch
    pub init_bonding_curve: f64,
    pub init_lamport: u64,
    pub reserve_lamport: u64,
    pub reserve_token: u64,
    pub max_buy_amount: u64,
    pub max_sell_amount: u64,
    pub curve_limit: u64,
    pub is_completed: bool,
}

impl BondingCurveAccount {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = AccountReader::new(data, "BondingCurve")?;
        Ok(Self {
            token_mint: r.pubkey()?,
            creator: r.pubkey()?,
            created_time: r.i64()?,
            init_bonding_curve: r.f64()?,
            init_lamport: r.u64()?,
            reserve_lamport: r.u64()?,
            reserve_token: r.u64()?,
            max_buy_amount: r.u64()?,
            max_sell_amount: r.u64()?,
            curve_limit: r.u64()?,
            is_completed: r.bool()?,
        })
    }

    pub fn to_model(&self) -> BondingCurve {
        BondingCurve {
            reserve_lamport: self.reserve_lamport,
            reserve_token: self.reserve_token,
            curve_limit: self.curve_limit,
            max_buy_amount: self.max_buy_amount,
            max_sell_amount: self.max_sell_amount,
            is_completed: self.is_completed,
        }
    }
}

/// Leading fields of the launchpad `Config` account
///
/// Amount configs after the fees are variable-length and not needed here.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfigAccount {
    pub authority: Pubkey,
    pub pending_authority: Pubkey,
    pub team_wallet: Pubkey,
    pub platform_buy_fee: u128,
    pub platform_sell_fee: u128,
}

impl GlobalConfigAccount {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = AccountReader::new(data, "Config")?;
        Ok(Self {
            authority: r.pubkey()?,
            pending_authority: r.pubkey()?,
            team_wallet: r.pubkey()?,
            platform_buy_fee: r.u128()?,
            platform_sell_fee: r.u128()?,
        })
    }

    /// Platform fees, stored on-chain in basis points
    pub fn swap_fees(&self) -> Result<SwapFees> {
        Ok(SwapFees {
            buy: fee_from_chain(self.platform_buy_fee).context("Invalid platform buy fee")?,
            sell: fee_from_chain(self.platform_sell_fee).context("Invalid platform sell fee")?,
        })
    }
}

fn fee_from_chain(raw: u128) -> Result<FeeBps> {
    let bps = u64::try_from(raw).with_context(|| format!("fee {raw} does not fit in u64"))?;
    Ok(FeeBps::new(bps)?)
}

async fn fetch_owned_account(client: &RpcClient, address: &Pubkey, program_id: &Pubkey) -> Result<Vec<u8>> {
    let account = client
        .get_account(address)
        .await
        .with_context(|| format!("Failed to get account: {}", address))?;

    if account.owner != *program_id {
        bail!("Account {} is owned by {}, expected {}", address, account.owner, program_id);
    }
    Ok(account.data)
}

/// Fetch and decode the bonding curve for `mint`
pub async fn fetch_bonding_curve(
    client: &RpcClient,
    program_id: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, BondingCurveAccount)> {
    let (address, _bump) = derive_bonding_curve_pda(mint, program_id);
    log::debug!("bonding curve PDA for {mint}: {address}");

    let data = fetch_owned_account(client, &address, program_id).await?;
    let curve = BondingCurveAccount::decode(&data)
        .with_context(|| format!("Failed to decode bonding curve: {}", address))?;
    Ok((address, curve))
}

/// Fetch and decode the global launchpad config
pub async fn fetch_global_config(
    client: &RpcClient,
    program_id: &Pubkey,
) -> Result<(Pubkey, GlobalConfigAccount)> {
    let (address, _bump) = derive_config_pda(program_id);
    log::debug!("config PDA: {address}");

    let data = fetch_owned_account(client, &address, program_id).await?;
    let config = GlobalConfigAccount::decode(&data)
        .with_context(|| format!("Failed to decode config: {}", address))?;
    Ok((address, config))
}

/// Format lamports as SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / curve_model::LAMPORTS_PER_SOL as f64
}

/// Format raw token units as whole tokens
pub fn tokens_to_ui(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}

/// Pretty print a pubkey as shortened address
pub fn format_pubkey(pubkey: &Pubkey) -> String {
    let addr = pubkey.to_string();
    format!("{}...{}", &addr[0..8], &addr[addr.len() - 8..]).bright_yellow().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_curve(curve: &BondingCurveAccount) -> Vec<u8> {
        let mut data = account_discriminator("BondingCurve").to_vec();
        data.extend_from_slice(curve.token_mint.as_ref());
        data.extend_from_slice(curve.creator.as_ref());
        data.extend_from_slice(&curve.created_time.to_le_bytes());
        data.extend_from_slice(&curve.init_bonding_curve.to_le_bytes());
        data.extend_from_slice(&curve.init_lamport.to_le_bytes());
        data.extend_from_slice(&curve.reserve_lamport.to_le_bytes());
        data.extend_from_slice(&curve.reserve_token.to_le_bytes());
        data.extend_from_slice(&curve.max_buy_amount.to_le_bytes());
        data.extend_from_slice(&curve.max_sell_amount.to_le_bytes());
        data.extend_from_slice(&curve.curve_limit.to_le_bytes());
        data.push(curve.is_completed as u8);
        data
    }

    fn sample_curve() -> BondingCurveAccount {
        BondingCurveAccount {
            token_mint: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            created_time: 1_700_000_000,
            init_bonding_curve: 100.0,
            init_lamport: 28_000_000_000,
            reserve_lamport: 30_500_000_000,
            reserve_token: 917_000_000_000_000,
            max_buy_amount: 0,
            max_sell_amount: 0,
            curve_limit: 113_000_000_000,
            is_completed: false,
        }
    }

    #[test]
    fn test_decode_bonding_curve() {
        let curve = sample_curve();
        // Anchor accounts carry padding after the fields
        let mut data = encode_curve(&curve);
        data.extend_from_slice(&[0u8; 16]);

        let decoded = BondingCurveAccount::decode(&data).unwrap();
        assert_eq!(decoded, curve);

        let model = decoded.to_model();
        assert_eq!(model.reserve_lamport, 30_500_000_000);
        assert_eq!(model.curve_limit, 113_000_000_000);
    }

    #[test]
    fn test_decode_rejects_wrong_account() {
        let mut data = encode_curve(&sample_curve());
        data[0] ^= 0xff;
        let err = BondingCurveAccount::decode(&data).unwrap_err();
        assert!(err.to_string().contains("discriminator mismatch"));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let data = encode_curve(&sample_curve());
        assert!(BondingCurveAccount::decode(&data[..data.len() - 9]).is_err());
        assert!(BondingCurveAccount::decode(&data[..4]).is_err());
    }

    #[test]
    fn test_decode_global_config_fees() {
        let mut data = account_discriminator("Config").to_vec();
        for _ in 0..3 {
            data.extend_from_slice(Pubkey::new_unique().as_ref());
        }
        data.extend_from_slice(&100u128.to_le_bytes());
        data.extend_from_slice(&150u128.to_le_bytes());
        // amount configs follow
        data.extend_from_slice(&[0u8; 40]);

        let config = GlobalConfigAccount::decode(&data).unwrap();
        let fees = config.swap_fees().unwrap();
        assert_eq!(fees.buy.bps(), 100);
        assert_eq!(fees.sell.bps(), 150);
    }

    #[test]
    fn test_out_of_range_chain_fee() {
        assert!(fee_from_chain(10_000).is_err());
        assert!(fee_from_chain(u128::MAX).is_err());
    }

    #[test]
    fn test_pda_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            derive_bonding_curve_pda(&mint, &program_id),
            derive_bonding_curve_pda(&mint, &program_id)
        );
        assert_ne!(
            derive_bonding_curve_pda(&mint, &program_id).0,
            derive_config_pda(&program_id).0
        );
    }
}
