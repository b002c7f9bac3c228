//! CLMM Devnet Provisioner
//!
//! Off-chain tool that stands up a complete test deployment of the
//! CLMM trading program: test mints, funded holder accounts, an
//! initialized pool with vaults, and one swap through it. Every
//! address produced along the way is persisted to a timestamped JSON
//! snapshot, including partial progress when a step fails.

mod config;
mod error;
mod instructions;
mod snapshot;
mod token;
mod workflow;

use anyhow::{Context, Result};
use config::Config;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{Keypair, Signer},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting CLMM Devnet Provisioner");

    // Load configuration
    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using default devnet config");
        Config::default_devnet()
    });

    log::info!("Connected to RPC: {}", config.rpc_url);
    log::info!("Target program: {}", config.program_id);

    // Initialize RPC client
    let client = RpcClient::new_with_commitment(
        config.rpc_url.clone(),
        CommitmentConfig::confirmed(),
    );

    // Load payer wallet
    let payer = load_keypair(&config.keypair_path)?;
    log::info!("Provisioning wallet: {}", payer.pubkey());

    // Run the workflow; failures are folded into the report
    let report = workflow::run(&client, &config, &payer).await;

    // Persist the snapshot exactly once, success or failure
    let snap = snapshot::Snapshot::from_report(&report, &config.network, snapshot::utc_timestamp());
    match snapshot::save(&config.output_dir, &snap) {
        Ok(path) => log::info!("Snapshot saved to {}", path.display()),
        Err(e) => log::error!("Failed to save snapshot: {}", e),
    }

    match report.outcome {
        Ok(()) => {
            log::info!("Provisioning complete");
            Ok(())
        }
        Err(e) => {
            log::error!("Provisioning aborted: {}", e);
            for line in &e.logs {
                log::error!("  {}", line);
            }

            if config.exit_nonzero_on_failure {
                anyhow::bail!("provisioning failed during {}", e.step);
            }
            Ok(())
        }
    }
}

/// Load payer keypair from file
fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded_path = shellexpand::tilde(path);
    let bytes = std::fs::read(expanded_path.as_ref())
        .context(format!("Failed to read keypair from {}", path))?;

    let keypair = if bytes[0] == b'[' {
        // JSON format
        let json_data: Vec<u8> = serde_json::from_slice(&bytes)
            .context("Failed to parse keypair JSON")?;
        Keypair::try_from(&json_data[..])
            .context("Failed to create keypair from bytes")?
    } else {
        // Binary format
        Keypair::try_from(&bytes[..])
            .context("Failed to create keypair from bytes")?
    };

    Ok(keypair)
}
