use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::{env, fmt};

/// Where and how batch settlements are executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    pub chain_id: String,
    /// Address of the deployed settler contract; also the quote recipient.
    pub contract_address: String,
    pub module_name: String,
    pub function_name: String,
    pub currency: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            chain_id: "aptos-testnet".to_string(),
            contract_address: "0x1234567890123456789012345678901234567890123456789012345678901234".to_string(),
            module_name: "BundleFlow::Settler".to_string(),
            function_name: "batch_settle".to_string(),
            currency: "USDC".to_string(),
        }
    }
}

impl SettlementConfig {
    /// Fully qualified entry function, e.g. `0x..::BundleFlow::Settler::batch_settle`.
    pub fn function_id(&self) -> String {
        format!("{}::{}::{}", self.contract_address, self.module_name, self.function_name)
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            chain_id: env::var("CHAIN_ID").unwrap_or(defaults.chain_id),
            contract_address: env::var("SETTLEMENT_CONTRACT").unwrap_or(defaults.contract_address),
            module_name: env::var("SETTLEMENT_MODULE").unwrap_or(defaults.module_name),
            function_name: env::var("SETTLEMENT_FUNCTION").unwrap_or(defaults.function_name),
            currency: env::var("SETTLEMENT_CURRENCY").unwrap_or(defaults.currency),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub log_level: String,
    /// Hex secret for the development wallet; a fresh key is generated when unset.
    pub wallet_secret: Option<String>,
    /// Balance the mock relay reports for unfunded accounts, in whole units.
    pub mock_balance: String,
    /// Relayer fee the mock relay quotes, in whole units.
    pub mock_relayer_fee: String,
    pub settlement: SettlementConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("wallet_secret", &"<redacted>")
            .field("mock_balance", &self.mock_balance)
            .field("mock_relayer_fee", &self.mock_relayer_fee)
            .field("settlement", &self.settlement)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            wallet_secret: env::var("WALLET_SECRET").ok(),
            mock_balance: env::var("MOCK_BALANCE").unwrap_or_else(|_| "1000".to_string()),
            mock_relayer_fee: env::var("MOCK_RELAYER_FEE").unwrap_or_else(|_| "0.01".to_string()),
            settlement: SettlementConfig::from_env(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
