/// Jupiter Router Implementation
/// Primary order router: the quote it returns already carries the unsigned
/// transaction, so it is the only authoritative source.
use crate::apis::client::{check_status, HttpClient};
use crate::config::JupiterConfig;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::router::QuoteSource;
use crate::swaps::types::{
    deserialize_optional_f64, deserialize_string_or_number, ExecutionPayload, Quote, QuoteRequest,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "Jupiter";

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct JupiterOrderResponse {
    #[serde(rename = "outAmount", default = "zero_amount", deserialize_with = "deserialize_string_or_number")]
    out_amount: String,
    #[serde(rename = "priceImpactPct", default, deserialize_with = "deserialize_optional_f64")]
    price_impact_pct: Option<f64>,
    #[serde(rename = "routePlan", default)]
    route_plan: Vec<RoutePlanStep>,
    #[serde(default)]
    transaction: Option<String>,
    #[serde(rename = "requestId", default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoutePlanStep {
    #[serde(rename = "swapInfo", default)]
    swap_info: Option<SwapInfo>,
}

#[derive(Debug, Deserialize)]
struct SwapInfo {
    #[serde(default)]
    label: Option<String>,
}

fn zero_amount() -> String {
    "0".to_string()
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// "Jupiter + OKX" when the order was filled through OKX liquidity
fn source_name_for(labels: &[String]) -> &'static str {
    if labels.iter().any(|l| l.to_lowercase().contains("okx")) {
        "Jupiter + OKX"
    } else {
        PROVIDER
    }
}

/// Convert an order response body into a quote that keeps the body verbatim
pub fn parse_order_response(text: &str) -> Result<Quote, SwapError> {
    let parse_failed = |e: serde_json::Error| {
        SwapError::quote_fetch(PROVIDER, format!("order parse failed: {}", e))
    };
    let raw: Value = serde_json::from_str(text).map_err(parse_failed)?;
    let order = JupiterOrderResponse::deserialize(&raw).map_err(parse_failed)?;

    let labels: Vec<String> = order
        .route_plan
        .iter()
        .map(|step| {
            step.swap_info
                .as_ref()
                .and_then(|info| info.label.clone())
                .unwrap_or_else(|| "Unknown".to_string())
        })
        .collect();

    let payload = ExecutionPayload {
        transaction: order.transaction.filter(|tx| !tx.is_empty()),
        request_id: order.request_id.filter(|id| !id.is_empty()),
        raw,
    };

    Ok(Quote::new("jupiter", source_name_for(&labels), order.out_amount)
        .with_route(labels)
        .with_price_impact(order.price_impact_pct)
        .with_payload(payload))
}

// ============================================================================
// JUPITER ROUTER
// ============================================================================

pub struct JupiterRouter {
    http: HttpClient,
    config: JupiterConfig,
}

impl JupiterRouter {
    pub fn new(config: JupiterConfig) -> Result<Self, SwapError> {
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            config,
        })
    }

    fn query_params(request: &QuoteRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("inputMint", request.input_mint.clone()),
            ("outputMint", request.output_mint.clone()),
            ("amount", request.amount_raw.clone()),
        ];
        if let Some(taker) = &request.taker {
            params.push(("taker", taker.clone()));
        }
        params
    }
}

#[async_trait]
impl QuoteSource for JupiterRouter {
    fn id(&self) -> &'static str {
        "jupiter"
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn is_authoritative(&self) -> bool {
        true
    }

    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Option<Quote>, SwapError> {
        logger::debug(
            LogTag::Jupiter,
            &format!(
                "Jupiter order request: {} {} → {} (taker: {})",
                request.amount_raw,
                request.input_mint,
                request.output_mint,
                request.taker.as_deref().unwrap_or("none")
            ),
        );

        let mut builder = self
            .http
            .client()
            .get(&self.config.order_api)
            .query(&Self::query_params(request));
        if !self.config.api_key.is_empty() {
            builder = builder.header("x-api-key", &self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SwapError::quote_fetch(PROVIDER, format!("request failed: {}", e)))?;

        let response = check_status(response).await.map_err(|(status, body)| {
            SwapError::quote_fetch(PROVIDER, format!("HTTP {}: {}", status, body))
        })?;

        let text = response.text().await.map_err(|e| {
            SwapError::quote_fetch(PROVIDER, format!("failed to read body: {}", e))
        })?;

        let quote = parse_order_response(&text)?;

        logger::debug(
            LogTag::Jupiter,
            &format!(
                "Jupiter order: {} output via {} (executable: {})",
                quote.output_amount_raw,
                quote.route_label(),
                quote.is_executable()
            ),
        );

        Ok(Some(quote))
    }
}
