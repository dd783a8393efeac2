/// Quote source trait - one implementation per liquidity provider
use super::types::{Quote, QuoteRequest};
use crate::errors::SwapError;
use async_trait::async_trait;

/// A provider adapter
///
/// Implementations are stateless per call and must keep their failures
/// inside the returned `Result`: a failing source is dropped from the
/// ranked set while its siblings keep running.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable identifier ("jupiter", "raydium", "okx")
    fn id(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    /// Whether this source's quote also carries the executable transaction
    fn is_authoritative(&self) -> bool {
        false
    }

    /// `Ok(None)` means the provider answered without a usable quote
    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Option<Quote>, SwapError>;
}
