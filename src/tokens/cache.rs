/// Read-through token metadata cache
///
/// The token list is fetched at most once per process and never invalidated
/// within a session. A failed fetch is remembered as an empty list, so a
/// broken endpoint costs one request rather than one per lookup.
use super::types::{popular_tokens, Token, TokenMeta, SOL_MINT};
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use once_cell::sync::OnceCell as SyncOnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Source of the full token list
#[async_trait]
pub trait TokenListProvider: Send + Sync {
    async fn fetch_token_list(&self) -> Result<Vec<Token>, SwapError>;
}

/// Lookup interface the rest of the crate depends on
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Cached metadata, populating the cache on first use
    async fn get(&self, mint: &str) -> TokenMeta;

    async fn search(&self, query: &str) -> Vec<Token>;
}

struct TokenIndex {
    tokens: Vec<Token>,
    by_mint: HashMap<String, usize>,
}

impl TokenIndex {
    fn new(tokens: Vec<Token>) -> Self {
        let by_mint = tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.address.clone(), idx))
            .collect();
        Self { tokens, by_mint }
    }

    fn get(&self, mint: &str) -> Option<&Token> {
        self.by_mint.get(mint).map(|&idx| &self.tokens[idx])
    }
}

pub struct TokenMetadataCache {
    provider: Arc<dyn TokenListProvider>,
    index: OnceCell<TokenIndex>,
    search_limit: usize,
}

impl TokenMetadataCache {
    pub fn new(provider: Arc<dyn TokenListProvider>, search_limit: usize) -> Self {
        Self {
            provider,
            index: OnceCell::new(),
            search_limit,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.index.initialized()
    }

    async fn index(&self) -> &TokenIndex {
        self.index
            .get_or_init(|| async {
                match self.provider.fetch_token_list().await {
                    Ok(tokens) => {
                        logger::info(
                            LogTag::Tokens,
                            &format!("Token list loaded: {} tokens", tokens.len()),
                        );
                        TokenIndex::new(tokens)
                    }
                    Err(e) => {
                        logger::warning(
                            LogTag::Tokens,
                            &format!("Token list unavailable for this session: {}", e),
                        );
                        TokenIndex::new(Vec::new())
                    }
                }
            })
            .await
    }

    /// Symbol or mint to a selectable token; popular tokens never need the list
    pub async fn resolve(&self, symbol_or_mint: &str) -> Option<Token> {
        let needle = symbol_or_mint.trim();
        if let Some(token) = popular_tokens()
            .into_iter()
            .find(|t| t.address == needle || t.symbol.eq_ignore_ascii_case(needle))
        {
            return Some(token);
        }

        let index = self.index().await;
        if let Some(token) = index.get(needle) {
            return Some(token.clone());
        }
        index
            .tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(needle))
            .cloned()
    }
}

#[async_trait]
impl TokenCache for TokenMetadataCache {
    async fn get(&self, mint: &str) -> TokenMeta {
        let index = self.index().await;

        if mint == SOL_MINT {
            if let Some(sol) = popular_tokens().iter().find(|t| t.address == SOL_MINT) {
                return TokenMeta::from(sol);
            }
        }

        index
            .get(mint)
            .map(TokenMeta::from)
            .unwrap_or_else(|| TokenMeta::unknown(mint))
    }

    async fn search(&self, query: &str) -> Vec<Token> {
        let index = self.index().await;
        let q = query.to_lowercase();

        index
            .tokens
            .iter()
            .filter(|t| {
                t.symbol.to_lowercase().contains(&q)
                    || t.name.to_lowercase().contains(&q)
                    || t.address == query
            })
            .take(self.search_limit)
            .cloned()
            .collect()
    }
}

// ============================================================================
// PROCESS-WIDE INSTANCE
// ============================================================================

static TOKEN_CACHE: SyncOnceCell<Arc<TokenMetadataCache>> = SyncOnceCell::new();

/// Install the process-wide cache; only the first call wins
pub fn init_token_cache(cache: Arc<TokenMetadataCache>) -> Result<(), String> {
    TOKEN_CACHE
        .set(cache)
        .map_err(|_| "Token cache already initialized".to_string())
}

pub fn token_cache() -> Option<Arc<TokenMetadataCache>> {
    TOKEN_CACHE.get().cloned()
}
