use crate::error::PaymentError;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::instruction::{
    create_associated_token_account, create_associated_token_account_idempotent,
};

/// Creates the associated token account of `recipient` for `mint`, funded by `payer`.
///
/// Fails on-chain if the account already exists.
pub fn create_recipient_account(payer: &Pubkey, recipient: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account(payer, recipient, mint, &spl_token::id())
}

/// Like [`create_recipient_account`], but a no-op if the account already exists
pub fn create_recipient_account_idempotent(
    payer: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    create_associated_token_account_idempotent(payer, recipient, mint, &spl_token::id())
}

/// SPL token transfer of `amount` base units, signed by `authority`
pub fn transfer(
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, PaymentError> {
    spl_token::instruction::transfer(
        &spl_token::id(),
        source,
        destination,
        authority,
        &[],
        amount,
    )
    .map_err(|e| PaymentError::InstructionEncoding(e.to_string()))
}
