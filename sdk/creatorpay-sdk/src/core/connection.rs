use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::error::Error;

/// Network access needed to build, submit and confirm a batch.
///
/// Implemented by [`RpcConnection`](crate::core::rpc::RpcConnection) for a live
/// cluster; tests provide in-memory implementations.
#[async_trait]
pub trait SolConnection: Send + Sync {
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>>;

    /// `None` means the account has not been initialized.
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>>;

    /// Recent blockhash and the last block height at which it stays valid.
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), Box<dyn Error + Send + Sync>>;

    /// `None` while the signature has not been observed at the connection's commitment.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, Box<dyn Error + Send + Sync>>;

    async fn get_block_height(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;
}
