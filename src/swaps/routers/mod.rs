/// Quote source implementations
pub mod jupiter;
pub mod okx;
pub mod raydium;

pub use jupiter::JupiterRouter;
pub use okx::{OkxRouter, RelayResponse};
pub use raydium::RaydiumRouter;

use crate::config::Config;
use crate::errors::SwapError;
use crate::swaps::router::QuoteSource;
use std::sync::Arc;

/// Build every configured source in dispatch order
///
/// Order matters: it breaks ties between equal outputs in the ranking.
pub fn build_sources(config: &Config) -> Result<Vec<Arc<dyn QuoteSource>>, SwapError> {
    Ok(vec![
        Arc::new(JupiterRouter::new(config.jupiter.clone())?),
        Arc::new(RaydiumRouter::new(config.raydium.clone())?),
        Arc::new(OkxRouter::new(config.okx.clone())?),
    ])
}
