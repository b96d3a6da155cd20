use crate::basic::builder::InstructionBuilder;
use crate::core::connection::SolConnection;
use crate::error::{BatchError, BatchFailure};
use crate::types::{AssembledBatch, BatchTransaction, InstructionKind, Payment, PaymentFailure};
use futures::stream::{self, StreamExt};
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use tracing::{info, warn};

/// Folds per-payment instructions into a single transaction.
///
/// A payment that fails to build is recorded and skipped; the rest of the
/// batch still goes through.
pub struct BatchTransactionAssembler<'a, C: SolConnection> {
    connection: &'a C,
    builder: InstructionBuilder,
    max_concurrency: usize,
    max_transaction_size: usize,
}

impl<'a, C: SolConnection> BatchTransactionAssembler<'a, C> {
    pub fn new(connection: &'a C, builder: InstructionBuilder) -> Self {
        Self {
            connection,
            builder,
            max_concurrency: 8,
            max_transaction_size: PACKET_DATA_SIZE,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_max_transaction_size(mut self, size: usize) -> Self {
        self.max_transaction_size = size;
        self
    }

    /// Assemble one transaction paying every buildable payment, in input order.
    ///
    /// Fails with `EmptyBatch` if no payment produced instructions, and with
    /// `TooLarge` if the result would not fit in a single packet.
    #[tracing::instrument(skip_all, fields(payer = %payer, payments = payments.len()))]
    pub async fn assemble(
        &self,
        payer: &Pubkey,
        payments: &[Payment],
    ) -> Result<AssembledBatch, BatchFailure> {
        // `buffered` yields in submission order no matter which lookup finishes first
        let built: Vec<_> = stream::iter(
            payments
                .iter()
                .map(|payment| self.builder.build(self.connection, payer, payment)),
        )
        .buffered(self.max_concurrency)
        .collect()
        .await;

        let mut planned = Vec::with_capacity(built.len());
        let mut failures = Vec::new();
        let mut created = HashSet::new();
        for (index, (payment, result)) in payments.iter().zip(built).enumerate() {
            match result {
                Ok(mut instructions) => {
                    // A creator listed twice only needs its account created once
                    if instructions.creates_account()
                        && !created.insert(instructions.destination_token_account)
                    {
                        instructions
                            .instructions
                            .retain(|(kind, _)| *kind != InstructionKind::CreateAssociatedAccount);
                    }
                    planned.push(instructions);
                },
                Err(error) => {
                    warn!(
                        index,
                        destination = %payment.destination,
                        %error,
                        "Skipping payment"
                    );
                    failures.push(PaymentFailure {
                        index,
                        payment: payment.clone(),
                        error,
                    });
                },
            }
        }

        if planned.is_empty() {
            return Err(BatchFailure::new(BatchError::EmptyBatch, failures));
        }

        let (recent_blockhash, last_valid_block_height) =
            match self.connection.get_latest_blockhash().await {
                Ok(latest) => latest,
                Err(e) => {
                    return Err(BatchFailure::new(
                        BatchError::Connection(e.to_string()),
                        failures,
                    ))
                },
            };

        let transaction = BatchTransaction {
            payer: *payer,
            payments: planned,
            recent_blockhash,
            last_valid_block_height,
        };

        let size = match transaction.serialized_size() {
            Ok(size) => size,
            Err(error) => return Err(BatchFailure::new(error, failures)),
        };
        if size > self.max_transaction_size {
            return Err(BatchFailure::new(
                BatchError::TooLarge {
                    size,
                    limit: self.max_transaction_size,
                },
                failures,
            ));
        }

        info!(
            included = transaction.payments.len(),
            skipped = failures.len(),
            instructions = transaction.instruction_count(),
            size,
            "Assembled batch transaction"
        );

        Ok(AssembledBatch {
            transaction,
            failures,
        })
    }
}
