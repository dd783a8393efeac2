/// Configuration schemas - every config structure defined once with defaults
use crate::config_struct;

// ============================================================================
// QUOTE SOURCES
// ============================================================================

config_struct! {
    /// Primary order-routing service (Jupiter Ultra)
    pub struct JupiterConfig {
        enabled: bool = true,
        order_api: String = "https://api.jup.ag/ultra/v1/order".to_string(),
        /// Sent as `x-api-key`; empty means the header is omitted
        api_key: String = String::new(),
        timeout_secs: u64 = 15,
    }
}

config_struct! {
    /// Single-pool compute service (Raydium trade API)
    pub struct RaydiumConfig {
        enabled: bool = true,
        compute_api: String = "https://transaction-v1.raydium.io/compute/swap-base-in".to_string(),
        slippage_bps: u16 = 50,
        tx_version: String = "V0".to_string(),
        timeout_secs: u64 = 10,
    }
}

config_struct! {
    /// Signed-request service (OKX DEX aggregator)
    pub struct OkxConfig {
        enabled: bool = true,
        base_url: String = "https://web3.okx.com".to_string(),
        quote_path: String = "/api/v6/dex/aggregator/quote".to_string(),
        /// Solana mainnet
        chain_index: String = "501".to_string(),
        api_key: String = String::new(),
        secret: String = String::new(),
        passphrase: String = String::new(),
        user_agent: String = "SolSwap/1.0".to_string(),
        timeout_secs: u64 = 10,
    }
}

// ============================================================================
// SWAP STORE
// ============================================================================

config_struct! {
    /// Swap store behaviour
    pub struct StoreConfig {
        /// Input quiescence required before a fetch is issued
        debounce_ms: u64 = 300,
        default_slippage_bps: u16 = 100,
        default_slippage_stable_bps: u16 = 30,
    }
}

// ============================================================================
// TOKENS
// ============================================================================

config_struct! {
    /// Token metadata list
    pub struct TokensConfig {
        token_list_url: String = "https://tokens.jup.ag/tokens?tags=verified".to_string(),
        search_limit: usize = 20,
        timeout_secs: u64 = 15,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        jupiter: JupiterConfig = JupiterConfig::default(),
        raydium: RaydiumConfig = RaydiumConfig::default(),
        okx: OkxConfig = OkxConfig::default(),
        store: StoreConfig = StoreConfig::default(),
        tokens: TokensConfig = TokensConfig::default(),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl OkxConfig {
    /// All three credentials are needed to sign a request
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret.is_empty() && !self.passphrase.is_empty()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.store.debounce_ms == 0 {
            return Err("store.debounce_ms must be > 0".to_string());
        }

        let timeouts = [
            ("jupiter.timeout_secs", self.jupiter.timeout_secs),
            ("raydium.timeout_secs", self.raydium.timeout_secs),
            ("okx.timeout_secs", self.okx.timeout_secs),
            ("tokens.timeout_secs", self.tokens.timeout_secs),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(format!("{} must be > 0", field));
            }
        }

        if self.tokens.search_limit == 0 {
            return Err("tokens.search_limit must be > 0".to_string());
        }

        Ok(())
    }
}
