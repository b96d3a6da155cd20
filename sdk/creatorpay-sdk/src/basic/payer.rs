use crate::basic::batch::BatchTransactionAssembler;
use crate::basic::builder::InstructionBuilder;
use crate::basic::submit::TransactionSubmitter;
use crate::config::CreatorPayConfig;
use crate::core::connection::SolConnection;
use crate::core::signer::WalletSigner;
use crate::error::{BatchError, BatchFailure, Result};
use crate::types::{AssembledBatch, BatchOutcome, Payment};
use crate::utils;
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use tracing::info;

/// Entry point for paying a list of creators.
///
/// Owns the network connection, the wallet signer and the configuration so
/// no client lives in global state.
pub struct BatchPayer<C: SolConnection, S: WalletSigner> {
    connection: C,
    signer: S,
    config: CreatorPayConfig,
    in_flight: Mutex<HashSet<Pubkey>>,
}

impl<C: SolConnection, S: WalletSigner> BatchPayer<C, S> {
    pub fn new(connection: C, signer: S, config: CreatorPayConfig) -> Self {
        Self {
            connection,
            signer,
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &CreatorPayConfig {
        &self.config
    }

    /// Address of the wallet that signs and pays
    pub fn payer(&self) -> Pubkey {
        self.signer.pubkey()
    }

    pub fn assembler(&self) -> BatchTransactionAssembler<'_, C> {
        let builder = InstructionBuilder::from_config(&self.config);
        BatchTransactionAssembler::new(&self.connection, builder)
            .with_max_concurrency(self.config.max_concurrency)
    }

    pub fn submitter(&self) -> TransactionSubmitter<'_, C, S> {
        TransactionSubmitter::new(&self.connection, &self.signer)
            .with_poll_interval(self.config.poll_interval())
            .with_confirm_timeout(self.config.confirm_timeout())
    }

    /// Build, sign, submit and confirm one transaction paying `payments`.
    ///
    /// Only one run per payer may be in flight; a concurrent call for the same
    /// payer fails with `InFlight` without touching the network.
    ///
    /// Dropping the returned future after broadcast does not cancel the
    /// transaction, it may still land. This call is not idempotent: callers
    /// must track the signature (logged on broadcast, and carried by
    /// `ConfirmationTimeout`) before paying the same list again.
    pub async fn run_batch_payment(
        &self,
        payer: &Pubkey,
        payments: &[Payment],
    ) -> std::result::Result<BatchOutcome, BatchFailure> {
        let _guard = InFlightGuard::acquire(&self.in_flight, *payer)
            .ok_or(BatchError::InFlight(*payer))?;

        let AssembledBatch {
            transaction,
            failures,
        } = self.assembler().assemble(payer, payments).await?;

        match self.submitter().submit(&transaction).await {
            Ok(result) => {
                info!(
                    signature = %result.signature,
                    status = ?result.status,
                    paid = transaction.payments.len(),
                    skipped = failures.len(),
                    "Batch payment finished"
                );
                Ok(BatchOutcome {
                    result,
                    failures,
                    paid: transaction.payments.len(),
                    total_base_units: transaction.total_base_units(),
                })
            },
            Err(error) => Err(BatchFailure::new(error, failures)),
        }
    }

    /// Token balance of `owner` for the configured mint, in base units
    pub async fn token_balance(&self, owner: &Pubkey) -> Result<u64> {
        utils::fetch_token_balance(&self.connection, owner, &self.config.mint).await
    }
}

/// Marks a payer busy until dropped
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<Pubkey>>,
    payer: Pubkey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<Pubkey>>, payer: Pubkey) -> Option<Self> {
        if !in_flight.lock().insert(payer) {
            return None;
        }
        Some(Self { in_flight, payer })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.payer);
    }
}
