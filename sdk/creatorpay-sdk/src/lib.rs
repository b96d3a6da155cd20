pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod error;
pub mod source;
pub mod types;
pub mod utils;

pub use crate::basic::batch::BatchTransactionAssembler;
pub use crate::basic::builder::InstructionBuilder;
pub use crate::basic::payer::BatchPayer;
pub use crate::basic::submit::TransactionSubmitter;
pub use crate::config::{CreatorPayConfig, ExistencePolicy};
pub use crate::core::connection::SolConnection;
pub use crate::core::rpc::RpcConnection;
pub use crate::core::signer::{KeypairSigner, WalletSigner};
pub use crate::error::{
    BatchError, BatchFailure, CreatorPaySdkError, PaymentError, Result, TimeoutCause,
    WalletError,
};
pub use crate::source::{JsonFileSource, PaymentSource};
pub use crate::types::{
    AccountState, AssembledBatch, BatchOutcome, BatchTransaction, InstructionKind, Payment,
    PaymentFailure, PaymentInstructions, PaymentList, SubmissionResult, SubmissionStatus,
};
pub use crate::utils::{
    derive_token_account, fetch_token_balance, format_ui_amount, parse_address, to_base_units,
};
