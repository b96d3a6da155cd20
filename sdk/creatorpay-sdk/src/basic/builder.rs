use crate::advanced::instructions;
use crate::config::{CreatorPayConfig, ExistencePolicy};
use crate::core::connection::SolConnection;
use crate::core::constants::{DEFAULT_USDC_MINT, USDC_DECIMALS};
use crate::error::PaymentError;
use crate::types::{AccountState, InstructionKind, Payment, PaymentInstructions};
use crate::utils;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

/// Builds the instructions for one payment: an optional account creation
/// followed by exactly one transfer.
#[derive(Debug, Clone)]
pub struct InstructionBuilder {
    mint: Pubkey,
    decimals: u8,
    existence_policy: ExistencePolicy,
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_USDC_MINT, USDC_DECIMALS)
    }
}

impl InstructionBuilder {
    pub fn new(mint: Pubkey, decimals: u8) -> Self {
        Self {
            mint,
            decimals,
            existence_policy: ExistencePolicy::default(),
        }
    }

    pub fn from_config(config: &CreatorPayConfig) -> Self {
        Self::new(config.mint, config.decimals).with_existence_policy(config.existence_policy)
    }

    pub fn with_existence_policy(mut self, policy: ExistencePolicy) -> Self {
        self.existence_policy = policy;
        self
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Build the instructions paying `payment` from `payer`'s token account.
    ///
    /// Only reads network state (the destination account lookup).
    pub async fn build(
        &self,
        connection: &impl SolConnection,
        payer: &Pubkey,
        payment: &Payment,
    ) -> Result<PaymentInstructions, PaymentError> {
        let recipient = utils::parse_address(&payment.destination)?;
        let base_units = utils::to_base_units(payment.amount, self.decimals)
            .ok_or(PaymentError::InvalidAmount(payment.amount))?;

        let source = utils::derive_token_account(payer, &self.mint);
        let destination = utils::derive_token_account(&recipient, &self.mint);

        let account_state = match connection.get_account(&destination).await {
            Ok(Some(_)) => AccountState::Exists,
            Ok(None) => AccountState::Missing,
            Err(e) => match self.existence_policy {
                ExistencePolicy::AssumeMissing => {
                    warn!(
                        %recipient,
                        token_account = %destination,
                        error = %e,
                        "Existence check failed, assuming token account is missing"
                    );
                    AccountState::Unknown
                },
                ExistencePolicy::SkipPayment => {
                    return Err(PaymentError::NetworkUnavailable {
                        account: destination,
                        reason: e.to_string(),
                    })
                },
            },
        };

        let mut ixs = Vec::with_capacity(2);
        let create = match account_state {
            AccountState::Exists => None,
            AccountState::Missing => Some(instructions::create_recipient_account(
                payer, &recipient, &self.mint,
            )),
            // May exist after all, so the create must not fail if it does
            AccountState::Unknown => Some(instructions::create_recipient_account_idempotent(
                payer, &recipient, &self.mint,
            )),
        };
        if let Some(create) = create {
            ixs.push((InstructionKind::CreateAssociatedAccount, create));
        }
        ixs.push((
            InstructionKind::Transfer,
            instructions::transfer(&source, &destination, payer, base_units)?,
        ));

        debug!(
            %recipient,
            base_units,
            ?account_state,
            "Built payment instructions"
        );

        Ok(PaymentInstructions {
            recipient,
            destination_token_account: destination,
            base_units,
            account_state,
            instructions: ixs,
        })
    }
}
