//! Client-side SPL token plumbing
//!
//! Mint creation, associated token accounts, and funding. Each helper
//! builds one transaction, signs it with the payer, and waits for
//! confirmation through the blocking RPC client.

use crate::error::RemoteCallError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;

/// Create a fungible token mint with the given authority.
///
/// The mint account is a fresh keypair funded to rent exemption, then
/// initialized in the same transaction. The freeze authority is set to
/// the mint authority.
pub fn create_mint(
    client: &RpcClient,
    payer: &Keypair,
    authority: &Pubkey,
    decimals: u8,
    step: &'static str,
) -> Result<Pubkey, RemoteCallError> {
    let mint = Keypair::new();

    let rent = client
        .get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    let create_account_ix = system_instruction::create_account(
        &payer.pubkey(),
        &mint.pubkey(),
        rent,
        spl_token::state::Mint::LEN as u64,
        &spl_token::id(),
    );

    let init_mint_ix = spl_token::instruction::initialize_mint(
        &spl_token::id(),
        &mint.pubkey(),
        authority,
        Some(authority),
        decimals,
    )
    .map_err(|e| RemoteCallError::new(step, e.to_string()))?;

    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    let transaction = Transaction::new_signed_with_payer(
        &[create_account_ix, init_mint_ix],
        Some(&payer.pubkey()),
        &[payer, &mint],
        recent_blockhash,
    );

    client
        .send_and_confirm_transaction(&transaction)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    Ok(mint.pubkey())
}

/// Create the associated token account for (wallet, mint).
///
/// The wallet may be any address, including a pool state account, so
/// the same helper covers user holder accounts and pool vaults.
pub fn create_ata(
    client: &RpcClient,
    payer: &Keypair,
    wallet: &Pubkey,
    mint: &Pubkey,
    step: &'static str,
) -> Result<Pubkey, RemoteCallError> {
    let ata = get_associated_token_address(wallet, mint);

    let create_ix = spl_associated_token_account::instruction::create_associated_token_account(
        &payer.pubkey(),
        wallet,
        mint,
        &spl_token::id(),
    );

    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    let transaction = Transaction::new_signed_with_payer(
        &[create_ix],
        Some(&payer.pubkey()),
        &[payer],
        recent_blockhash,
    );

    client
        .send_and_confirm_transaction(&transaction)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    Ok(ata)
}

/// Mint `amount` base units to a token account. The payer must hold
/// the mint authority.
pub fn mint_to(
    client: &RpcClient,
    payer: &Keypair,
    mint: &Pubkey,
    destination: &Pubkey,
    amount: u64,
    step: &'static str,
) -> Result<(), RemoteCallError> {
    let mint_ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &payer.pubkey(),
        &[],
        amount,
    )
    .map_err(|e| RemoteCallError::new(step, e.to_string()))?;

    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    let transaction = Transaction::new_signed_with_payer(
        &[mint_ix],
        Some(&payer.pubkey()),
        &[payer],
        recent_blockhash,
    );

    client
        .send_and_confirm_transaction(&transaction)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    Ok(())
}

/// Fetch a token account balance in base units, as reported by the RPC
/// node. Read-only; used for post-swap verification logging.
pub fn token_balance(
    client: &RpcClient,
    account: &Pubkey,
    step: &'static str,
) -> Result<String, RemoteCallError> {
    let balance = client
        .get_token_account_balance(account)
        .map_err(|e| RemoteCallError::from_client_error(step, e))?;

    Ok(balance.amount)
}
