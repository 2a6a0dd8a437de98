//! Configuration management for the faucet server.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the faucet server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// HTTP server configuration
    pub http: HttpConfig,

    /// Ethereum blockchain configuration
    pub ethereum: EthereumConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Dispense ledger configuration
    pub ledger: LedgerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port to bind to
    pub port: u16,

    /// Address to bind to
    pub bind_address: String,
}

/// Ethereum blockchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Private key for the signing account (hex string, 0x prefix optional);
    /// the source address is derived from it
    pub private_key: String,

    /// Target chain id
    pub chain_id: u64,

    /// Fixed payout per dispense, in ETH
    pub transfer_amount_eth: f64,

    /// Gas limit for the transfer (21000 for a plain value transfer)
    pub gas_limit: u64,

    /// Legacy gas price in gwei
    pub gas_price_gwei: u64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum minutes between successful dispenses for the same caller IP
    /// or destination wallet
    pub cooldown_minutes: u64,
}

/// Dispense ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the append-only ledger file (JSON lines)
    pub path: String,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig {
                port: 3030,
                bind_address: "127.0.0.1".to_string(),
            },
            ethereum: EthereumConfig {
                rpc_url: "https://rpc.sepolia.org".to_string(),
                private_key: "your_private_key_here".to_string(),
                chain_id: 11155111,
                transfer_amount_eth: 0.0001,
                gas_limit: 21_000,
                gas_price_gwei: 50,
            },
            rate_limit: RateLimitConfig {
                cooldown_minutes: 60,
            },
            ledger: LedgerConfig {
                path: "dispense-ledger.jsonl".to_string(),
            },
        }
    }
}

impl FaucetConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path.as_ref().to_str().unwrap()))
            .add_source(config::Environment::with_prefix("FAUCET"))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ethereum.private_key == "your_private_key_here" {
            return Err(anyhow::anyhow!("Private key must be configured"));
        }

        let key = self
            .ethereum
            .private_key
            .strip_prefix("0x")
            .unwrap_or(&self.ethereum.private_key);
        if key.len() != 64 {
            return Err(anyhow::anyhow!("Private key must be 64 hex characters"));
        }

        if self.ethereum.transfer_amount_eth <= 0.0 {
            return Err(anyhow::anyhow!("Transfer amount must be positive"));
        }

        if self.ethereum.gas_limit < 21_000 {
            return Err(anyhow::anyhow!("Gas limit below the 21000 transfer minimum"));
        }

        if self.rate_limit.cooldown_minutes == 0 {
            return Err(anyhow::anyhow!("Cooldown must be greater than 0 minutes"));
        }

        if self.ledger.path.is_empty() {
            return Err(anyhow::anyhow!("Ledger path must be set"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FaucetConfig::default();

        assert_eq!(config.http.port, 3030);
        assert_eq!(config.http.bind_address, "127.0.0.1");
        assert_eq!(config.ethereum.chain_id, 11155111);
        assert_eq!(config.ethereum.gas_limit, 21_000);
        assert_eq!(config.rate_limit.cooldown_minutes, 60);
    }

    #[test]
    fn test_config_serialization() {
        let config = FaucetConfig::default();

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: FaucetConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.http.port, deserialized.http.port);
        assert_eq!(config.ethereum.transfer_amount_eth, deserialized.ethereum.transfer_amount_eth);
        assert_eq!(config.ledger.path, deserialized.ledger.path);
    }

    #[test]
    fn test_config_from_file() -> anyhow::Result<()> {
        let toml_content = r#"
[http]
port = 8080
bind_address = "0.0.0.0"

[ethereum]
rpc_url = "https://rpc.sepolia.org"
private_key = "abcd1234567890abcd1234567890abcd1234567890abcd1234567890abcd1234"
chain_id = 11155111
transfer_amount_eth = 0.0001
gas_limit = 21000
gas_price_gwei = 50

[rate_limit]
cooldown_minutes = 1

[ledger]
path = "/var/lib/faucet/ledger.jsonl"
"#;

        let temp_dir = tempfile::tempdir()?;
        let temp_path = temp_dir.path().join("test_config.toml");
        std::fs::write(&temp_path, toml_content)?;

        let config = FaucetConfig::from_file(&temp_path)?;

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.bind_address, "0.0.0.0");
        assert_eq!(config.rate_limit.cooldown_minutes, 1);
        assert_eq!(config.ledger.path, "/var/lib/faucet/ledger.jsonl");

        Ok(())
    }

    #[test]
    fn test_config_validation() {
        let mut config = FaucetConfig::default();

        // Should fail with the placeholder key
        assert!(config.validate().is_err());

        config.ethereum.private_key =
            "abcd1234567890abcd1234567890abcd1234567890abcd1234567890abcd1234".to_string();
        assert!(config.validate().is_ok());

        // 0x prefix is accepted
        config.ethereum.private_key =
            "0xabcd1234567890abcd1234567890abcd1234567890abcd1234567890abcd1234".to_string();
        assert!(config.validate().is_ok());

        config.ethereum.private_key = "short".to_string();
        assert!(config.validate().is_err());

        config.ethereum.private_key =
            "abcd1234567890abcd1234567890abcd1234567890abcd1234567890abcd1234".to_string();
        config.ethereum.transfer_amount_eth = -1.0;
        assert!(config.validate().is_err());

        config.ethereum.transfer_amount_eth = 0.0001;
        config.rate_limit.cooldown_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_config() -> anyhow::Result<()> {
        let mut config = FaucetConfig::default();
        config.ethereum.private_key =
            "abcd1234567890abcd1234567890abcd1234567890abcd1234567890abcd1234".to_string();
        config.http.port = 8080;

        let temp_dir = tempfile::tempdir()?;
        let temp_path = temp_dir.path().join("test_save_config.toml");
        config.save_to_file(&temp_path)?;

        let loaded_config = FaucetConfig::from_file(&temp_path)?;

        assert_eq!(config.http.port, loaded_config.http.port);
        assert_eq!(config.ethereum.private_key, loaded_config.ethereum.private_key);
        assert_eq!(config.rate_limit.cooldown_minutes, loaded_config.rate_limit.cooldown_minutes);

        Ok(())
    }
}
