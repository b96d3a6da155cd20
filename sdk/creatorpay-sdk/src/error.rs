use crate::types::PaymentFailure;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

/// SDK-specific error types for configuration, sources and account queries
#[derive(Debug, Error)]
pub enum CreatorPaySdkError {
    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid account data or deserialization error
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payment list could not be read or parsed
    #[error("Payment source error: {0}")]
    Source(String),

    /// Keypair file missing or unreadable
    #[error("Keypair error: {0}")]
    Keypair(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, CreatorPaySdkError>;

/// Why a single payment was left out of a batch.
///
/// None of these abort the batch; the remaining payments are still paid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    #[error("Invalid destination address `{0}`")]
    InvalidAddress(String),

    /// Amount is not finite, not positive, or does not fit in base units
    #[error("Invalid amount {0}")]
    InvalidAmount(f64),

    /// Existence check for the destination token account failed
    #[error("Could not check token account {account}: {reason}")]
    NetworkUnavailable { account: Pubkey, reason: String },

    #[error("Failed to encode instruction: {0}")]
    InstructionEncoding(String),
}

/// Fatal errors for one batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Every payment failed to build, or the list was empty
    #[error("No valid payments to process")]
    EmptyBatch,

    /// The assembled transaction could not be serialized
    #[error("Failed to encode transaction: {0}")]
    Encoding(String),

    #[error("Transaction is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    /// A previous batch for this payer has not resolved yet
    #[error("A batch for payer {0} is already in flight")]
    InFlight(Pubkey),

    #[error("Signer {signer} cannot pay for a batch owned by {payer}")]
    PayerMismatch { payer: Pubkey, signer: Pubkey },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Wallet rejected the transaction")]
    UserRejected,

    /// RPC node or signer refused the transaction before broadcast completed
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// Broadcast succeeded but confirmation was not observed in time.
    /// The transaction may still land; track `signature` before retrying.
    #[error("Transaction {signature} was not confirmed: {cause}")]
    ConfirmationTimeout {
        signature: Signature,
        cause: TimeoutCause,
    },
}

/// Which limit ended the wait for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    /// Block height passed the blockhash's last valid height
    BlockhashExpired,
    /// `confirm_timeout` elapsed first
    Deadline,
}

impl std::fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutCause::BlockhashExpired => write!(f, "blockhash expired"),
            TimeoutCause::Deadline => write!(f, "confirmation timeout elapsed"),
        }
    }
}

/// A fatal batch error together with the payments skipped before it happened.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BatchFailure {
    pub error: BatchError,
    pub failures: Vec<PaymentFailure>,
}

impl BatchFailure {
    pub fn new(error: BatchError, failures: Vec<PaymentFailure>) -> Self {
        Self { error, failures }
    }
}

impl From<BatchError> for BatchFailure {
    fn from(error: BatchError) -> Self {
        Self::new(error, Vec::new())
    }
}

/// Errors surfaced by a [`WalletSigner`](crate::core::signer::WalletSigner).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<WalletError> for BatchError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::UserRejected => BatchError::UserRejected,
            WalletError::Signing(reason) => BatchError::SubmissionFailed(reason),
        }
    }
}
