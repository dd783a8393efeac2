/// Raydium Router Implementation
/// Single-pool compute quotes for comparison. No execution payload; every
/// failure degrades to "no quote" so the other sources are unaffected.
use crate::apis::client::{check_status, HttpClient};
use crate::config::RaydiumConfig;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::router::QuoteSource;
use crate::swaps::types::{deserialize_optional_f64, Quote, QuoteRequest};
use async_trait::async_trait;
use serde::Deserialize;

/// Route label used when the response carries no pool ids
const FALLBACK_ROUTE: &str = "Raydium Pool";
const POOL_ID_PREFIX_LEN: usize = 8;

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct RaydiumComputeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<RaydiumComputeData>,
}

#[derive(Debug, Deserialize)]
struct RaydiumComputeData {
    #[serde(rename = "outputAmount", default)]
    output_amount: Option<serde_json::Value>,
    #[serde(rename = "priceImpactPct", default, deserialize_with = "deserialize_optional_f64")]
    price_impact_pct: Option<f64>,
    #[serde(rename = "routePlan", default)]
    route_plan: Vec<RaydiumRouteStep>,
}

#[derive(Debug, Deserialize)]
struct RaydiumRouteStep {
    #[serde(rename = "poolId", default)]
    pool_id: Option<String>,
}

/// Parse a compute body; `None` when the service reports no usable quote
pub fn parse_compute_response(text: &str) -> Option<Quote> {
    let response: RaydiumComputeResponse = serde_json::from_str(text).ok()?;
    if !response.success {
        return None;
    }
    let data = response.data?;

    let output_amount = match data.output_amount {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    };

    let mut route: Vec<String> = data
        .route_plan
        .iter()
        .filter_map(|step| step.pool_id.as_deref())
        .filter(|id| !id.is_empty())
        .map(|id| id.chars().take(POOL_ID_PREFIX_LEN).collect())
        .collect();
    if route.is_empty() {
        route.push(FALLBACK_ROUTE.to_string());
    }

    Some(
        Quote::new("raydium", "Raydium", output_amount)
            .with_route(route)
            .with_price_impact(data.price_impact_pct),
    )
}

// ============================================================================
// RAYDIUM ROUTER
// ============================================================================

pub struct RaydiumRouter {
    http: HttpClient,
    config: RaydiumConfig,
}

impl RaydiumRouter {
    pub fn new(config: RaydiumConfig) -> Result<Self, SwapError> {
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            config,
        })
    }

    async fn compute(&self, request: &QuoteRequest) -> Result<String, SwapError> {
        let slippage = self.config.slippage_bps.to_string();
        let params = [
            ("inputMint", request.input_mint.as_str()),
            ("outputMint", request.output_mint.as_str()),
            ("amount", request.amount_raw.as_str()),
            ("slippageBps", slippage.as_str()),
            ("txVersion", self.config.tx_version.as_str()),
        ];

        let response = self
            .http
            .client()
            .get(&self.config.compute_api)
            .query(&params)
            .send()
            .await?;

        let response = check_status(response).await.map_err(|(status, body)| {
            SwapError::quote_fetch("Raydium", format!("HTTP {}: {}", status, body))
        })?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl QuoteSource for RaydiumRouter {
    fn id(&self) -> &'static str {
        "raydium"
    }

    fn name(&self) -> &'static str {
        "Raydium"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Option<Quote>, SwapError> {
        let text = match self.compute(request).await {
            Ok(text) => text,
            Err(e) => {
                logger::debug(LogTag::Raydium, &format!("Raydium compute unavailable: {}", e));
                return Ok(None);
            }
        };

        let quote = parse_compute_response(&text);
        match &quote {
            Some(q) => logger::debug(
                LogTag::Raydium,
                &format!("Raydium quote: {} output via {}", q.output_amount_raw, q.route_label()),
            ),
            None => logger::debug(LogTag::Raydium, "Raydium returned no usable quote"),
        }
        Ok(quote)
    }
}
