//! The provisioning workflow
//!
//! Ten strictly sequential remote steps: two mints, two holder
//! accounts, funding, pool initialization, two pool vaults, one swap.
//! Every identifier is recorded as soon as its creation call returns,
//! and the remaining steps are abandoned on the first failure so the
//! snapshot can capture whatever already exists on-chain.

use crate::config::Config;
use crate::error::RemoteCallError;
use crate::instructions;
use crate::token;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use solana_client::rpc_client::RpcClient;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::thread;
use std::time::Duration;

/// Decimal precision for both test mints
pub const MINT_DECIMALS: u8 = 9;

/// Base units minted to each holder account
pub const INITIAL_FUNDING: u64 = 1_000_000_000;

/// Initial pool sqrt price, Q-fixed-point
pub const INITIAL_SQRT_PRICE: u128 = 1_000_000_000_000_000_000;

pub const TICK_SPACING: u16 = 10;

/// Swap parameters: 1_000_000 base units in, at least 990_000 out,
/// price capped at 1.1x the initial sqrt price, base-input direction
pub const SWAP_AMOUNT_IN: u64 = 1_000_000;
pub const SWAP_MINIMUM_OUT: u64 = 990_000;
pub const SWAP_SQRT_PRICE_LIMIT: u128 = 1_100_000_000_000_000_000;
pub const SWAP_IS_BASE_INPUT: bool = true;

/// Logical-name -> base58 address map, in recording order.
///
/// Serializes as a JSON object whose key order matches the order the
/// workflow produced the identifiers.
#[derive(Debug, Default, Clone)]
pub struct AddressBook {
    entries: Vec<(&'static str, String)>,
}

impl AddressBook {
    pub fn record(&mut self, name: &'static str, value: impl ToString) {
        self.entries.push((name, value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AddressBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Outcome of one provisioning run: everything that was created, plus
/// whether the sequence ran to completion.
#[derive(Debug)]
pub struct ProvisionReport {
    pub addresses: AddressBook,
    pub outcome: Result<(), RemoteCallError>,
}

impl ProvisionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run the full provisioning sequence against the configured cluster.
///
/// Never returns an error: a failed step is folded into the report so
/// the caller can persist the partial address set.
pub async fn run(client: &RpcClient, config: &Config, payer: &Keypair) -> ProvisionReport {
    let mut addresses = AddressBook::default();
    let outcome = run_steps(client, config, payer, &mut addresses).map(|_| ());

    ProvisionReport { addresses, outcome }
}

fn run_steps(
    client: &RpcClient,
    config: &Config,
    payer: &Keypair,
    addresses: &mut AddressBook,
) -> Result<Signature, RemoteCallError> {
    addresses.record("programId", config.program_id);
    log::info!("Program ID: {}", config.program_id);

    ensure_funded(client, config, payer)?;

    // Two fungible test mints, authority = payer
    log::info!("Creating test mints...");
    let token_mint_0 = token::create_mint(
        client,
        payer,
        &payer.pubkey(),
        MINT_DECIMALS,
        "create token mint 0",
    )?;
    log::info!("Token mint 0 created: {}", token_mint_0);
    addresses.record("tokenMint0", token_mint_0);

    let token_mint_1 = token::create_mint(
        client,
        payer,
        &payer.pubkey(),
        MINT_DECIMALS,
        "create token mint 1",
    )?;
    log::info!("Token mint 1 created: {}", token_mint_1);
    addresses.record("tokenMint1", token_mint_1);

    // Holder accounts for the payer
    log::info!("Creating user token accounts...");
    let user_token_account_0 = token::create_ata(
        client,
        payer,
        &payer.pubkey(),
        &token_mint_0,
        "create user token account 0",
    )?;
    log::info!("User token account 0: {}", user_token_account_0);
    addresses.record("userTokenAccount0", user_token_account_0);

    let user_token_account_1 = token::create_ata(
        client,
        payer,
        &payer.pubkey(),
        &token_mint_1,
        "create user token account 1",
    )?;
    log::info!("User token account 1: {}", user_token_account_1);
    addresses.record("userTokenAccount1", user_token_account_1);

    // Fund both holder accounts
    log::info!("Minting tokens...");
    token::mint_to(
        client,
        payer,
        &token_mint_0,
        &user_token_account_0,
        INITIAL_FUNDING,
        "mint to user token account 0",
    )?;
    log::info!("Minted {} base units to account 0", INITIAL_FUNDING);

    token::mint_to(
        client,
        payer,
        &token_mint_1,
        &user_token_account_1,
        INITIAL_FUNDING,
        "mint to user token account 1",
    )?;
    log::info!("Minted {} base units to account 1", INITIAL_FUNDING);

    // Pool state lives in a fresh keypair account; the address exists
    // locally before the initialize call registers it on-chain
    let pool_state = Keypair::new();
    log::info!("Pool state address: {}", pool_state.pubkey());
    addresses.record("poolState", pool_state.pubkey());

    log::info!("Initializing pool...");
    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| RemoteCallError::from_client_error("initialize pool", e))?;
    let init_tx = instructions::build_initialize_pool_transaction(
        &config.program_id,
        payer,
        &pool_state,
        &token_mint_0,
        &token_mint_1,
        INITIAL_SQRT_PRICE,
        TICK_SPACING,
        recent_blockhash,
    );
    client
        .send_and_confirm_transaction(&init_tx)
        .map_err(|e| RemoteCallError::from_client_error("initialize pool", e))?;
    log::info!("Pool initialized");

    // Vault accounts owned by the pool state
    let pool_vault_0 = token::create_ata(
        client,
        payer,
        &pool_state.pubkey(),
        &token_mint_0,
        "create pool vault 0",
    )?;
    log::info!("Pool vault 0 created: {}", pool_vault_0);
    addresses.record("poolVault0", pool_vault_0);

    let pool_vault_1 = token::create_ata(
        client,
        payer,
        &pool_state.pubkey(),
        &token_mint_1,
        "create pool vault 1",
    )?;
    log::info!("Pool vault 1 created: {}", pool_vault_1);
    addresses.record("poolVault1", pool_vault_1);

    // One swap through the freshly provisioned pool
    log::info!("Executing swap...");
    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| RemoteCallError::from_client_error("execute swap", e))?;
    let swap_tx = instructions::build_swap_transaction(
        &config.program_id,
        payer,
        &pool_state.pubkey(),
        &user_token_account_0,
        &pool_vault_0,
        SWAP_AMOUNT_IN,
        SWAP_MINIMUM_OUT,
        SWAP_SQRT_PRICE_LIMIT,
        SWAP_IS_BASE_INPUT,
        recent_blockhash,
    );
    let signature = client
        .send_and_confirm_transaction(&swap_tx)
        .map_err(|e| RemoteCallError::from_client_error("execute swap", e))?;
    log::info!("Swap executed: {}", signature);
    addresses.record("lastSwapTx", signature);

    addresses.record("walletAddress", payer.pubkey());

    // Post-swap sanity read; the swap already landed, so a failed
    // balance fetch only costs the log line
    match token::token_balance(client, &user_token_account_0, "read post-swap balance") {
        Ok(balance) => log::info!("User token account 0 balance after swap: {}", balance),
        Err(e) => log::warn!("Could not read post-swap balance: {}", e),
    }

    Ok(signature)
}

/// Top up the payer from the devnet faucet when it is below the
/// configured threshold, then poll until the airdrop lands.
fn ensure_funded(
    client: &RpcClient,
    config: &Config,
    payer: &Keypair,
) -> Result<(), RemoteCallError> {
    if !config.request_airdrop {
        return Ok(());
    }

    let step = "airdrop to payer";
    let balance = client
        .get_balance(&payer.pubkey())
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    if balance >= config.min_balance_lamports {
        log::debug!("Payer balance sufficient: {} lamports", balance);
        return Ok(());
    }

    log::info!(
        "Requesting airdrop for payer {} (balance: {} lamports)",
        payer.pubkey(),
        balance
    );
    client
        .request_airdrop(&payer.pubkey(), config.min_balance_lamports)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    // Wait for the airdrop
    for _ in 0..30 {
        if let Ok(new_balance) = client.get_balance(&payer.pubkey()) {
            if new_balance > balance {
                log::info!("Payer balance: {} lamports", new_balance);
                return Ok(());
            }
        }
        thread::sleep(Duration::from_millis(500));
    }

    Err(RemoteCallError::new(
        step,
        "airdrop requested but balance never increased",
    ))
}
