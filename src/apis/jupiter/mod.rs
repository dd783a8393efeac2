/// Jupiter token list client
///
/// Feeds the session token cache from the verified token list
/// (`tokens.jup.ag/tokens?tags=verified`).
use crate::apis::client::{check_status, HttpClient};
use crate::config::TokensConfig;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::tokens::{Token, TokenListProvider};
use async_trait::async_trait;
use std::time::Instant;

pub struct JupiterTokenList {
    http_client: HttpClient,
    url: String,
}

impl JupiterTokenList {
    pub fn new(config: &TokensConfig) -> Result<Self, SwapError> {
        Ok(Self {
            http_client: HttpClient::new(config.timeout_secs)?,
            url: config.token_list_url.clone(),
        })
    }
}

#[async_trait]
impl TokenListProvider for JupiterTokenList {
    async fn fetch_token_list(&self) -> Result<Vec<Token>, SwapError> {
        let start = Instant::now();

        let response = self
            .http_client
            .client()
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SwapError::network_error(format!("Token list request failed: {}", e)))?;

        let response = check_status(response).await.map_err(|(status, _)| {
            SwapError::network_error(format!("Token list request failed (HTTP {})", status))
        })?;

        let tokens: Vec<Token> = response
            .json()
            .await
            .map_err(|e| SwapError::parse_error("token list", e.to_string()))?;

        logger::debug(
            LogTag::Tokens,
            &format!(
                "Fetched {} tokens in {}ms",
                tokens.len(),
                start.elapsed().as_millis()
            ),
        );

        Ok(tokens)
    }
}
