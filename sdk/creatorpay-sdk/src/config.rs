//! Runtime configuration.
//!
//! Values come from (lowest to highest precedence) built-in devnet defaults,
//! an optional TOML file, then the `RPC_URL`, `KEYPAIR`, `USDC_MINT`,
//! `CLUSTER` and `EXISTENCE_POLICY` environment variables.

use crate::core::constants::{
    DEFAULT_CLUSTER, DEFAULT_KEYPAIR_PATH, DEFAULT_RPC_URL, DEFAULT_USDC_MINT, USDC_DECIMALS,
};
use crate::error::{CreatorPaySdkError, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// What to do when the destination token account cannot be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExistencePolicy {
    /// Add an idempotent create-account instruction, which is a no-op if the
    /// account turns out to exist.
    #[default]
    AssumeMissing,

    /// Skip the payment and report it as `NetworkUnavailable`.
    SkipPayment,
}

impl FromStr for ExistencePolicy {
    type Err = CreatorPaySdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "assume-missing" => Ok(Self::AssumeMissing),
            "skip-payment" => Ok(Self::SkipPayment),
            other => Err(CreatorPaySdkError::Config(format!(
                "Unknown existence policy `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreatorPayConfig {
    pub rpc_url: String,

    /// Explorer cluster name used for transaction links
    pub cluster: String,

    /// `processed`, `confirmed` or `finalized`
    pub commitment: String,

    /// Path to the payer keypair; `~` is expanded
    pub keypair_path: String,

    #[serde(with = "pubkey_string")]
    pub mint: Pubkey,

    pub decimals: u8,

    pub existence_policy: ExistencePolicy,

    /// Existence checks run at most this many at a time
    pub max_concurrency: usize,

    pub poll_interval_ms: u64,

    /// Upper bound on waiting for confirmation, on top of blockhash expiry
    pub confirm_timeout_secs: u64,
}

impl Default for CreatorPayConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            cluster: DEFAULT_CLUSTER.to_string(),
            commitment: "confirmed".to_string(),
            keypair_path: DEFAULT_KEYPAIR_PATH.to_string(),
            mint: DEFAULT_USDC_MINT,
            decimals: USDC_DECIMALS,
            existence_policy: ExistencePolicy::AssumeMissing,
            max_concurrency: 8,
            poll_interval_ms: 500,
            confirm_timeout_secs: 90,
        }
    }
}

impl CreatorPayConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CreatorPaySdkError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CreatorPaySdkError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load the file (if any) and apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, e.g. `std::env::var`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("RPC_URL") {
            self.rpc_url = url;
        }
        if let Some(path) = lookup("KEYPAIR") {
            self.keypair_path = path;
        }
        if let Some(cluster) = lookup("CLUSTER") {
            self.cluster = cluster;
        }
        if let Some(mint) = lookup("USDC_MINT") {
            self.mint = Pubkey::from_str(&mint)
                .map_err(|_| CreatorPaySdkError::Config(format!("Invalid USDC_MINT `{}`", mint)))?;
        }
        if let Some(policy) = lookup("EXISTENCE_POLICY") {
            self.existence_policy = policy.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.commitment()?;
        if self.max_concurrency == 0 {
            return Err(CreatorPaySdkError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(CreatorPaySdkError::Config(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        // 10^20 no longer fits in u64 base units
        if self.decimals > 19 {
            return Err(CreatorPaySdkError::Config(format!(
                "decimals {} out of range",
                self.decimals
            )));
        }
        Ok(())
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        let level = CommitmentLevel::from_str(&self.commitment).map_err(|_| {
            CreatorPaySdkError::Config(format!("Invalid commitment `{}`", self.commitment))
        })?;
        Ok(CommitmentConfig { commitment: level })
    }

    pub fn keypair_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.keypair_path).into_owned())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }
}

mod pubkey_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_devnet_usdc() {
        let config = CreatorPayConfig::default();
        assert_eq!(config.mint, DEFAULT_USDC_MINT);
        assert_eq!(config.decimals, 6);
        assert_eq!(config.existence_policy, ExistencePolicy::AssumeMissing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = CreatorPayConfig::from_toml_str(
            r#"
            rpc_url = "http://127.0.0.1:8899"
            cluster = "custom"
            mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
            existence_policy = "skip-payment"
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.cluster, "custom");
        assert_eq!(
            config.mint.to_string(),
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        );
        assert_eq!(config.existence_policy, ExistencePolicy::SkipPayment);
        assert_eq!(config.decimals, 6);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CreatorPayConfig::from_toml_str("rpc = \"x\"").is_err());
    }

    #[test]
    fn env_overrides_win() {
        let config = CreatorPayConfig::default()
            .with_overrides(|key| match key {
                "RPC_URL" => Some("http://localhost:8899".to_string()),
                "KEYPAIR" => Some("/tmp/payer.json".to_string()),
                "EXISTENCE_POLICY" => Some("skip-payment".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.keypair_path(), PathBuf::from("/tmp/payer.json"));
        assert_eq!(config.existence_policy, ExistencePolicy::SkipPayment);
    }

    #[test]
    fn bad_mint_override_fails() {
        let result = CreatorPayConfig::default().with_overrides(|key| match key {
            "USDC_MINT" => Some("not-a-key".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(CreatorPaySdkError::Config(_))));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let config = CreatorPayConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CreatorPaySdkError::Config(_))));
        assert!(CreatorPayConfig::from_toml_str("poll_interval_ms = 0")
            .unwrap()
            .with_overrides(|_| None)
            .is_err());
    }

    #[test]
    fn invalid_commitment_fails_validation() {
        let config = CreatorPayConfig {
            commitment: "eventually".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
