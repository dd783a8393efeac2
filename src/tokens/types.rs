/// Token identity and metadata types
use serde::{Deserialize, Serialize};

/// Wrapped SOL mint
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

const LOGO_BASE: &str =
    "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet";

/// A selectable token, shaped like the Jupiter token list entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Token {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            logo_uri: None,
            tags: Vec::new(),
        }
    }

    fn with_mainnet_logo(mut self) -> Self {
        self.logo_uri = Some(format!("{}/{}/logo.png", LOGO_BASE, self.address));
        self
    }
}

/// Defaults offered before the token list has loaded
pub fn popular_tokens() -> Vec<Token> {
    vec![
        Token::new(SOL_MINT, "SOL", "Solana", 9).with_mainnet_logo(),
        Token::new(USDC_MINT, "USDC", "USD Coin", 6).with_mainnet_logo(),
        Token::new(USDT_MINT, "USDT", "Tether USD", 6).with_mainnet_logo(),
    ]
}

/// Display metadata resolved for a mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub symbol: String,
    pub name: String,
    pub logo_uri: Option<String>,
    pub decimals: u8,
}

impl TokenMeta {
    /// Placeholder for mints missing from the list
    pub fn unknown(mint: &str) -> Self {
        let prefix: String = mint.chars().take(4).collect();
        Self {
            symbol: format!("{}...", prefix),
            name: "Unknown".to_string(),
            logo_uri: None,
            decimals: 0,
        }
    }
}

impl From<&Token> for TokenMeta {
    fn from(token: &Token) -> Self {
        Self {
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            logo_uri: token.logo_uri.clone(),
            decimals: token.decimals,
        }
    }
}
