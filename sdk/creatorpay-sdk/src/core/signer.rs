use crate::error::{CreatorPaySdkError, Result, WalletError};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::path::Path;

/// Abstraction for the wallet that approves and signs a batch.
/// This allows the SDK to work with:
/// 1. Local Keypairs (Backend/CLI)
/// 2. Wallet Adapters (Frontend - the user may decline)
///
/// The SDK never holds key material itself.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Sign `tx` with the message's recent blockhash left untouched.
    /// Returns `WalletError::UserRejected` if the user declined.
    async fn sign_transaction(
        &self,
        tx: Transaction,
    ) -> std::result::Result<Transaction, WalletError>;
}

/// Signs with a keypair loaded in process memory.
#[derive(Debug)]
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let keypair = read_keypair_file(path)
            .map_err(|e| CreatorPaySdkError::Keypair(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl WalletSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        mut tx: Transaction,
    ) -> std::result::Result<Transaction, WalletError> {
        let recent_blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], recent_blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}
