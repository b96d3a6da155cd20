#![allow(dead_code)]

use async_trait::async_trait;
use creatorpay_sdk::core::connection::SolConnection;
use creatorpay_sdk::core::signer::WalletSigner;
use creatorpay_sdk::error::WalletError;
use creatorpay_sdk::utils::derive_token_account;
use creatorpay_sdk::Payment;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::{Transaction, TransactionError},
};
use spl_token::solana_program::program_pack::Pack;
use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

type BoxError = Box<dyn Error + Send + Sync>;

pub const LAST_VALID_BLOCK_HEIGHT: u64 = 150;

/// In-memory cluster used in place of an RPC node
pub struct MockConnection {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    unreachable: HashSet<Pubkey>,
    send_error: Option<String>,
    statuses: Mutex<VecDeque<Option<Result<(), TransactionError>>>>,
    block_height: AtomicU64,
    block_height_step: u64,
    blockhash_calls: AtomicUsize,
    pub sent: Mutex<Vec<Transaction>>,
    pub lookups: AtomicUsize,
    /// When set, `send_transaction` waits for a notification before returning
    pub send_gate: Option<Arc<Notify>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            unreachable: HashSet::new(),
            send_error: None,
            statuses: Mutex::new(VecDeque::new()),
            block_height: AtomicU64::new(100),
            block_height_step: 0,
            blockhash_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            send_gate: None,
        }
    }

    pub fn with_account(self, address: Pubkey, account: Account) -> Self {
        self.accounts.try_lock().unwrap().insert(address, account);
        self
    }

    /// Mark the token account of `owner` for `mint` as initialized
    pub fn with_token_account(self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Self {
        let address = derive_token_account(owner, mint);
        self.with_account(address, token_account(owner, mint, amount))
    }

    /// Lookups of `address` fail as if the node were down
    pub fn with_unreachable(mut self, address: Pubkey) -> Self {
        self.unreachable.insert(address);
        self
    }

    pub fn with_send_error(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    /// Status replies returned in order; once drained every poll sees `None`
    pub fn with_statuses(self, statuses: Vec<Option<Result<(), TransactionError>>>) -> Self {
        *self.statuses.try_lock().unwrap() = statuses.into();
        self
    }

    /// Each block height query advances the chain by `step` blocks
    pub fn with_block_height_step(mut self, step: u64) -> Self {
        self.block_height_step = step;
        self
    }

    pub fn with_send_gate(mut self, gate: Arc<Notify>) -> Self {
        self.send_gate = Some(gate);
        self
    }

    pub fn blockhash_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolConnection for MockConnection {
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, BoxError> {
        if let Some(gate) = &self.send_gate {
            gate.notified().await;
        }
        if let Some(message) = &self.send_error {
            return Err(message.clone().into());
        }
        let signature = *tx.signatures.first().ok_or("No signature")?;
        self.sent.lock().await.push(tx.clone());
        Ok(signature)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, BoxError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.contains(pubkey) {
            return Err("connection refused".into());
        }
        Ok(self.accounts.lock().await.get(pubkey).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), BoxError> {
        let call = self.blockhash_calls.fetch_add(1, Ordering::SeqCst) as u8;
        Ok((Hash::new_from_array([call + 1; 32]), LAST_VALID_BLOCK_HEIGHT))
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, BoxError> {
        Ok(self.statuses.lock().await.pop_front().flatten())
    }

    async fn get_block_height(&self) -> Result<u64, BoxError> {
        Ok(self
            .block_height
            .fetch_add(self.block_height_step, Ordering::SeqCst))
    }
}

/// Wallet that can be told to decline every request
pub struct MockWallet {
    keypair: Keypair,
    reject: bool,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            reject: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            keypair: Keypair::new(),
            reject: true,
        }
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        if self.reject {
            return Err(WalletError::UserRejected);
        }
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}

/// Packed, initialized SPL token account
pub fn token_account(owner: &Pubkey, mint: &Pubkey, amount: u64) -> Account {
    let state = spl_token::state::Account {
        mint: *mint,
        owner: *owner,
        amount,
        state: spl_token::state::AccountState::Initialized,
        ..Default::default()
    };
    let mut data = vec![0u8; spl_token::state::Account::LEN];
    spl_token::state::Account::pack(state, &mut data).unwrap();

    Account {
        lamports: 2_039_280,
        data,
        owner: spl_token::id(),
        executable: false,
        rent_epoch: 0,
    }
}

pub fn payment_to(recipient: &Pubkey, amount: f64) -> Payment {
    Payment::new(recipient.to_string(), amount)
}
