use crate::core::connection::SolConnection;
use crate::core::signer::WalletSigner;
use crate::error::{BatchError, TimeoutCause};
use crate::types::{BatchTransaction, SubmissionResult, SubmissionStatus};
use solana_sdk::signature::Signature;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Signs a batch through the wallet, broadcasts it and waits for confirmation.
///
/// Each call walks `Built -> Submitted -> Confirmed | Failed` once. Nothing is
/// retried here.
pub struct TransactionSubmitter<'a, C: SolConnection, S: WalletSigner> {
    connection: &'a C,
    signer: &'a S,
    poll_interval: Duration,
    confirm_timeout: Duration,
}

impl<'a, C: SolConnection, S: WalletSigner> TransactionSubmitter<'a, C, S> {
    pub fn new(connection: &'a C, signer: &'a S) -> Self {
        Self {
            connection,
            signer,
            poll_interval: Duration::from_millis(500),
            confirm_timeout: Duration::from_secs(90),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    pub async fn submit(&self, batch: &BatchTransaction) -> Result<SubmissionResult, BatchError> {
        let signer = self.signer.pubkey();
        if signer != batch.payer {
            return Err(BatchError::PayerMismatch {
                payer: batch.payer,
                signer,
            });
        }

        let signed = self.signer.sign_transaction(batch.to_transaction()).await?;

        let signature = self
            .connection
            .send_transaction(&signed)
            .await
            .map_err(|e| BatchError::SubmissionFailed(e.to_string()))?;
        info!(%signature, "Batch transaction broadcast");

        self.await_confirmation(signature, batch.last_valid_block_height)
            .await
    }

    /// Poll until the signature resolves, the blockhash expires or the
    /// timeout elapses, whichever comes first.
    async fn await_confirmation(
        &self,
        signature: Signature,
        last_valid_block_height: u64,
    ) -> Result<SubmissionResult, BatchError> {
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            // Height is read before status so a transaction that lands in the
            // final valid block is still reported as confirmed.
            let block_height = match self.connection.get_block_height().await {
                Ok(height) => Some(height),
                Err(e) => {
                    debug!(error = %e, "Block height query failed");
                    None
                },
            };

            match self.connection.get_signature_status(&signature).await {
                Ok(Some(Ok(()))) => {
                    info!(%signature, "Batch transaction confirmed");
                    return Ok(SubmissionResult {
                        signature,
                        status: SubmissionStatus::Confirmed,
                    });
                },
                Ok(Some(Err(err))) => {
                    warn!(%signature, error = %err, "Batch transaction failed on-chain");
                    return Ok(SubmissionResult {
                        signature,
                        status: SubmissionStatus::Failed(err.to_string()),
                    });
                },
                Ok(None) => {},
                Err(e) => debug!(%signature, error = %e, "Signature status query failed"),
            }

            let cause = if block_height.is_some_and(|height| height > last_valid_block_height) {
                Some(TimeoutCause::BlockhashExpired)
            } else if Instant::now() >= deadline {
                Some(TimeoutCause::Deadline)
            } else {
                None
            };
            if let Some(cause) = cause {
                warn!(%signature, %cause, "Gave up waiting for confirmation");
                return Err(BatchError::ConfirmationTimeout { signature, cause });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
