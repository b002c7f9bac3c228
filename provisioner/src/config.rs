//! Provisioner configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL for Solana cluster
    pub rpc_url: String,

    /// Network label, recorded in snapshots and snapshot filenames
    pub network: String,

    /// CLMM program ID to provision against
    pub program_id: Pubkey,

    /// Payer/authority wallet keypair path
    pub keypair_path: String,

    /// Directory snapshot files are written into
    pub output_dir: String,

    /// Request an airdrop before provisioning if the payer is low
    pub request_airdrop: bool,

    /// Payer balance below which an airdrop is requested (lamports)
    pub min_balance_lamports: u64,

    /// Fail the process (exit nonzero) when the workflow is aborted
    /// by a remote-call failure. Off by default: a captured failure
    /// is recorded in the error snapshot and the process exits 0.
    pub exit_nonzero_on_failure: bool,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PROVISIONER_CONFIG")
            .unwrap_or_else(|_| "provisioner-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            network: "devnet".to_string(),
            program_id: Pubkey::from_str("8omdpoCLrwZPPvVDrLujvxdTRWCrkTNDFsXFmPyaNNfS")
                .unwrap(),
            keypair_path: "~/.config/solana/id.json".to_string(),
            output_dir: ".".to_string(),
            request_airdrop: true,
            min_balance_lamports: 2_000_000_000, // 2 SOL
            exit_nonzero_on_failure: false,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
