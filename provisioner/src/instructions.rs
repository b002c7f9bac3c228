//! Instruction builders for the CLMM program
//!
//! The program exposes Anchor-style instructions, so instruction data
//! is the 8-byte method discriminator followed by the little-endian
//! serialized arguments.

use solana_sdk::{
    hash::{hash, Hash},
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_program, sysvar,
    transaction::Transaction,
};

/// First 8 bytes of sha256("global:<name>"), the Anchor method
/// discriminator.
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let digest = hash(preimage.as_bytes());

    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest.to_bytes()[..8]);
    discriminator
}

/// Build the initialize_pool instruction
///
/// The pool state account is a fresh keypair account created by the
/// instruction itself, so it must sign alongside the authority.
pub fn build_initialize_pool_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    pool_state: &Pubkey,
    token_mint_0: &Pubkey,
    token_mint_1: &Pubkey,
    initial_sqrt_price: u128,
    tick_spacing: u16,
) -> Instruction {
    let mut data = anchor_discriminator("initialize_pool").to_vec();
    data.extend_from_slice(&initial_sqrt_price.to_le_bytes());
    data.extend_from_slice(&tick_spacing.to_le_bytes());

    // Account order is fixed by the program's initialize_pool context
    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(*pool_state, true),
        AccountMeta::new_readonly(*token_mint_0, false),
        AccountMeta::new_readonly(*token_mint_1, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Build transaction for pool initialization
pub fn build_initialize_pool_transaction(
    program_id: &Pubkey,
    payer: &Keypair,
    pool_state: &Keypair,
    token_mint_0: &Pubkey,
    token_mint_1: &Pubkey,
    initial_sqrt_price: u128,
    tick_spacing: u16,
    recent_blockhash: Hash,
) -> Transaction {
    let instruction = build_initialize_pool_instruction(
        program_id,
        &payer.pubkey(),
        &pool_state.pubkey(),
        token_mint_0,
        token_mint_1,
        initial_sqrt_price,
        tick_spacing,
    );

    Transaction::new_signed_with_payer(
        &[instruction],
        Some(&payer.pubkey()),
        &[payer, pool_state],
        recent_blockhash,
    )
}

/// Build the swap instruction
pub fn build_swap_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    pool_state: &Pubkey,
    user_token_account: &Pubkey,
    pool_token_vault: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
    sqrt_price_limit: u128,
    is_base_input: bool,
) -> Instruction {
    let mut data = anchor_discriminator("swap").to_vec();
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&minimum_amount_out.to_le_bytes());
    data.extend_from_slice(&sqrt_price_limit.to_le_bytes());
    data.push(if is_base_input { 1 } else { 0 });

    let accounts = vec![
        AccountMeta::new(*user, true),
        AccountMeta::new(*pool_state, false),
        AccountMeta::new(*user_token_account, false),
        AccountMeta::new(*pool_token_vault, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Build transaction for a swap
pub fn build_swap_transaction(
    program_id: &Pubkey,
    user: &Keypair,
    pool_state: &Pubkey,
    user_token_account: &Pubkey,
    pool_token_vault: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
    sqrt_price_limit: u128,
    is_base_input: bool,
    recent_blockhash: Hash,
) -> Transaction {
    let instruction = build_swap_instruction(
        program_id,
        &user.pubkey(),
        pool_state,
        user_token_account,
        pool_token_vault,
        amount_in,
        minimum_amount_out,
        sqrt_price_limit,
        is_base_input,
    );

    Transaction::new_signed_with_payer(
        &[instruction],
        Some(&user.pubkey()),
        &[user],
        recent_blockhash,
    )
}
