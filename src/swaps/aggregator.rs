/// Aggregation engine: concurrent fan-out over every enabled quote source
///
/// Sources are polled together with `join_all`, which waits for every
/// settlement before results are combined. A failing source only removes
/// its own quote.
use super::ranking::{apply_usd_pricing, rank_quotes};
use super::router::QuoteSource;
use super::routers::build_sources;
use super::types::{Quote, QuoteRequest};
use crate::config::Config;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

pub struct QuoteAggregator {
    sources: Vec<Arc<dyn QuoteSource>>,
}

impl QuoteAggregator {
    /// Sources are dispatched, and ties ranked, in the given order
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(config: &Config) -> Result<Self, SwapError> {
        Ok(Self::new(build_sources(config)?))
    }

    pub fn has_authoritative(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.is_enabled() && s.is_authoritative())
    }

    /// Every enabled source, ranked best-first
    ///
    /// Empty when several sources all fail. When the order router is the
    /// only enabled source its failure is the caller's error.
    pub async fn fetch_all_quotes(
        &self,
        request: &QuoteRequest,
        output_decimals: u8,
    ) -> Result<Vec<Quote>, SwapError> {
        let sources: Vec<_> = self.sources.iter().filter(|s| s.is_enabled()).cloned().collect();

        if let [only] = sources.as_slice() {
            if only.is_authoritative() {
                let order = self.fetch_authoritative(request, output_decimals).await?;
                return Ok(finalize(vec![order], output_decimals));
            }
        }

        let quotes = collect_quotes(&sources, request).await;
        Ok(finalize(quotes, output_decimals))
    }

    pub async fn fetch_all_quotes_priced(
        &self,
        request: &QuoteRequest,
        output_decimals: u8,
        output_price_usd: Option<f64>,
    ) -> Result<Vec<Quote>, SwapError> {
        let mut quotes = self.fetch_all_quotes(request, output_decimals).await?;
        apply_usd_pricing(&mut quotes, output_price_usd);
        Ok(quotes)
    }

    /// The executable order from the authoritative source alone
    pub async fn fetch_authoritative(
        &self,
        request: &QuoteRequest,
        output_decimals: u8,
    ) -> Result<Quote, SwapError> {
        let source = self
            .sources
            .iter()
            .find(|s| s.is_enabled() && s.is_authoritative())
            .ok_or_else(|| SwapError::authoritative("no order source enabled"))?;

        match source.fetch_quote(request).await {
            Ok(Some(mut quote)) => {
                quote.normalize(output_decimals);
                Ok(quote)
            }
            Ok(None) => Err(SwapError::authoritative(format!(
                "{} returned no order",
                source.name()
            ))),
            Err(e) => {
                logger::warning(
                    LogTag::Quotes,
                    &format!("{} order failed: {}", source.name(), e),
                );
                Err(SwapError::authoritative(e.detail()))
            }
        }
    }

    /// Every non-authoritative source, ranked together with an order
    /// fetched earlier for the same request
    pub async fn fetch_comparison_quotes(
        &self,
        request: &QuoteRequest,
        output_decimals: u8,
        order: Option<Quote>,
    ) -> Vec<Quote> {
        let sources: Vec<_> = self
            .sources
            .iter()
            .filter(|s| s.is_enabled() && (order.is_none() || !s.is_authoritative()))
            .cloned()
            .collect();

        let mut quotes: Vec<Quote> = order.into_iter().collect();
        quotes.extend(collect_quotes(&sources, request).await);
        finalize(quotes, output_decimals)
    }
}

/// Settle every source, keeping dispatch order and dropping failures
async fn collect_quotes(sources: &[Arc<dyn QuoteSource>], request: &QuoteRequest) -> Vec<Quote> {
    let results = join_all(sources.iter().map(|source| async move {
        (source.name(), source.fetch_quote(request).await)
    }))
    .await;

    let mut quotes = Vec::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok(Some(quote)) => quotes.push(quote),
            Ok(None) => logger::debug(
                LogTag::Quotes,
                &SwapError::source_unavailable(name).to_string(),
            ),
            Err(e) => logger::warning(LogTag::Quotes, &format!("{} skipped: {}", name, e)),
        }
    }
    quotes
}

/// Deduplicate by source name (first wins), normalize, rank
fn finalize(quotes: Vec<Quote>, output_decimals: u8) -> Vec<Quote> {
    let mut seen = HashSet::new();
    let unique: Vec<Quote> = quotes
        .into_iter()
        .filter(|q| seen.insert(q.source_name.clone()))
        .map(|mut q| {
            q.normalize(output_decimals);
            q
        })
        .collect();

    let ranked = rank_quotes(unique);
    logger::debug(
        LogTag::Quotes,
        &format!(
            "Ranked {} quote(s), best: {}",
            ranked.len(),
            ranked.first().map_or("none", |q| q.source_name.as_str())
        ),
    );
    ranked
}
