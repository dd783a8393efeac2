//! Token identities and the session-wide metadata cache

pub mod cache;
pub mod types;

pub use cache::{init_token_cache, token_cache, TokenCache, TokenListProvider, TokenMetadataCache};
pub use types::{popular_tokens, Token, TokenMeta, SOL_MINT, USDC_MINT, USDT_MINT};
