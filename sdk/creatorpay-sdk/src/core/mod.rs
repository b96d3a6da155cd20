pub mod connection;
pub mod constants;
pub mod rpc;
pub mod signer;
