use crate::core::connection::SolConnection;
use crate::error::{CreatorPaySdkError, PaymentError, Result};
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use spl_token::solana_program::program_pack::Pack;
use std::str::FromStr;

//=============================================================================
// Address Helpers
//=============================================================================

/// Parse a base58 wallet address
pub fn parse_address(address: &str) -> std::result::Result<Pubkey, PaymentError> {
    Pubkey::from_str(address).map_err(|_| PaymentError::InvalidAddress(address.to_string()))
}

/// Derive the associated token account holding `mint` for `owner`
pub fn derive_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

//=============================================================================
// Amount Conversion
//=============================================================================

/// Convert a whole-token amount to base units, rounding to the nearest unit.
///
/// Returns `None` for non-finite or non-positive amounts, amounts that round
/// to zero base units, and amounts that overflow `u64`.
pub fn to_base_units(amount: f64, decimals: u8) -> Option<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }

    let scaled = (amount * 10f64.powi(decimals as i32)).round();
    // u64::MAX as f64 rounds up to 2^64, so anything at or above it overflows
    if scaled < 1.0 || scaled >= u64::MAX as f64 {
        return None;
    }

    Some(scaled as u64)
}

/// Render base units as a decimal string, e.g. `12345678` with 6 decimals is `12.345678`
pub fn format_ui_amount(base_units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return base_units.to_string();
    }

    let divisor = 10u128.pow(decimals as u32);
    let units = base_units as u128;
    format!(
        "{}.{:0width$}",
        units / divisor,
        units % divisor,
        width = decimals as usize
    )
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Token balance of `owner` for `mint` in base units.
/// A token account that does not exist yet reads as zero.
pub async fn fetch_token_balance(
    connection: &impl SolConnection,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<u64> {
    let token_account = derive_token_account(owner, mint);
    let account = connection
        .get_account(&token_account)
        .await
        .map_err(|e| CreatorPaySdkError::Connection(e.to_string()))?;

    match account {
        Some(account) => {
            let state = spl_token::state::Account::unpack(&account.data).map_err(|e| {
                CreatorPaySdkError::InvalidAccountData(format!(
                    "Failed to parse token account {}: {}",
                    token_account, e
                ))
            })?;
            Ok(state.amount)
        },
        None => Ok(0),
    }
}
