use crate::error::{BatchError, PaymentError};
use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

/// One creator to pay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Base58 wallet address of the recipient (owner of the token account)
    pub destination: String,

    /// Amount in whole tokens, e.g. `12.5` USDC
    pub amount: f64,
}

impl Payment {
    pub fn new(destination: impl Into<String>, amount: f64) -> Self {
        Self {
            destination: destination.into(),
            amount,
        }
    }
}

/// Validated payment list handed over by a [`PaymentSource`](crate::source::PaymentSource).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentList {
    payments: Vec<Payment>,

    /// Records the source discarded while loading
    pub dropped: usize,
}

impl PaymentList {
    pub fn new(payments: Vec<Payment>, dropped: usize) -> Self {
        Self { payments, dropped }
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Sum of all amounts in whole tokens
    pub fn total(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    CreateAssociatedAccount,
    Transfer,
}

/// What the existence check said about a destination token account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Exists,
    Missing,
    /// The check failed and the account was assumed missing
    Unknown,
}

/// Instructions produced for a single payment, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInstructions {
    /// Recipient wallet
    pub recipient: Pubkey,

    /// Recipient associated token account
    pub destination_token_account: Pubkey,

    /// Amount in the token's smallest unit
    pub base_units: u64,

    pub account_state: AccountState,

    pub instructions: Vec<(InstructionKind, Instruction)>,
}

impl PaymentInstructions {
    pub fn creates_account(&self) -> bool {
        self.instructions
            .iter()
            .any(|(kind, _)| *kind == InstructionKind::CreateAssociatedAccount)
    }

    pub fn transfer_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|(kind, _)| *kind == InstructionKind::Transfer)
            .count()
    }
}

/// A payment that was skipped, identified by its position in the input list
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailure {
    pub index: usize,
    pub payment: Payment,
    pub error: PaymentError,
}

/// All instructions of one batch plus the payer and freshness token.
#[derive(Debug, Clone)]
pub struct BatchTransaction {
    pub payer: Pubkey,
    pub payments: Vec<PaymentInstructions>,
    pub recent_blockhash: Hash,

    /// Last block height at which `recent_blockhash` is still accepted
    pub last_valid_block_height: u64,
}

impl BatchTransaction {
    /// Flattened instruction list in payment order
    pub fn instructions(&self) -> Vec<Instruction> {
        self.payments
            .iter()
            .flat_map(|p| p.instructions.iter().map(|(_, ix)| ix.clone()))
            .collect()
    }

    pub fn instruction_count(&self) -> usize {
        self.payments.iter().map(|p| p.instructions.len()).sum()
    }

    pub fn total_base_units(&self) -> u64 {
        self.payments
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.base_units))
    }

    /// Unsigned legacy transaction with the payer as fee payer
    pub fn to_transaction(&self) -> Transaction {
        let message = Message::new_with_blockhash(
            &self.instructions(),
            Some(&self.payer),
            &self.recent_blockhash,
        );
        Transaction::new_unsigned(message)
    }

    /// Wire size of the transaction once signed
    pub fn serialized_size(&self) -> Result<usize, BatchError> {
        // new_unsigned already reserves one default signature per required signer
        bincode::serialized_size(&self.to_transaction())
            .map(|size| size as usize)
            .map_err(|e| BatchError::Encoding(e.to_string()))
    }
}

/// Output of the assembler: a transaction plus the payments it had to skip
#[derive(Debug, Clone)]
pub struct AssembledBatch {
    pub transaction: BatchTransaction,
    pub failures: Vec<PaymentFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Confirmed,
    /// Landed on-chain but the runtime returned an error
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub signature: Signature,
    pub status: SubmissionStatus,
}

impl SubmissionResult {
    pub fn is_confirmed(&self) -> bool {
        self.status == SubmissionStatus::Confirmed
    }

    /// Solana Explorer link for the signature. `mainnet-beta` omits the cluster param.
    pub fn explorer_url(&self, cluster: &str) -> String {
        if cluster == "mainnet-beta" || cluster.is_empty() {
            format!("https://explorer.solana.com/tx/{}", self.signature)
        } else {
            format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                self.signature, cluster
            )
        }
    }
}

/// Successful batch run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub result: SubmissionResult,

    /// Payments that were skipped while assembling
    pub failures: Vec<PaymentFailure>,

    /// Number of payments included in the transaction
    pub paid: usize,

    pub total_base_units: u64,
}
