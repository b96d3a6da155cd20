use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

// Devnet USDC mint
pub const DEFAULT_USDC_MINT: Pubkey = pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");
pub const USDC_DECIMALS: u8 = 6;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_CLUSTER: &str = "devnet";
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";
