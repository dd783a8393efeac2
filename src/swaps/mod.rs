/// Multi-source swap quoting
///
/// - `router`: the `QuoteSource` trait every provider implements
/// - `routers`: Jupiter (authoritative order), Raydium, OKX
/// - `aggregator`: concurrent all-settled fan-out
/// - `ranking`: best-first ordering and savings annotations
/// - `store`: debounced reactive state with a stale-response guard
pub mod aggregator;
pub mod ranking;
pub mod router;
pub mod routers;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregator::QuoteAggregator;
pub use ranking::{apply_usd_pricing, best_quote, rank_quotes};
pub use router::QuoteSource;
pub use store::{StorePhase, StoreSnapshot, SwapStore};
pub use types::{ExecutionPayload, Quote, QuoteRequest};
