/// OKX DEX Router Implementation
///
/// Every request to the OKX aggregator must be signed with the account's
/// secret, so the signing lives behind [`OkxRouter::relay`]: callers pass
/// the three quote parameters and never see the credentials. The relay
/// always answers with a status and a JSON body, mirroring an HTTP proxy
/// endpoint. As a [`QuoteSource`] the router reads its own relay body.
use crate::apis::client::HttpClient;
use crate::config::OkxConfig;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::router::QuoteSource;
use crate::swaps::types::{Quote, QuoteRequest};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const PROVIDER: &str = "OKX";

// ============================================================================
// REQUEST SIGNING
// ============================================================================

/// ISO-8601 UTC timestamp with the millisecond field zeroed
pub fn okx_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// base64(HMAC-SHA256(secret, timestamp + method + request_path))
pub fn sign_request(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
) -> Result<String, SwapError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SwapError::signing_error(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(request_path.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Path plus query exactly as signed and sent
pub fn build_request_path(
    quote_path: &str,
    chain_index: &str,
    from_token: &str,
    to_token: &str,
    amount: &str,
) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("chainIndex", chain_index)
        .append_pair("fromTokenAddress", from_token)
        .append_pair("toTokenAddress", to_token)
        .append_pair("amount", amount)
        .finish();
    format!("{}?{}", quote_path, query)
}

// ============================================================================
// RELAY
// ============================================================================

/// Outcome of a relayed OKX call, shaped like an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Value,
}

impl RelayResponse {
    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Extract a quote from an OKX aggregator body (`code == "0"` only)
pub fn parse_relay_body(body: &Value) -> Option<Quote> {
    let code_ok = match body.get("code") {
        Some(Value::String(code)) => code == "0",
        Some(Value::Number(code)) => code.as_i64() == Some(0),
        _ => false,
    };
    if !code_ok {
        return None;
    }

    let first = body.get("data")?.get(0)?;
    let to_amount = match first.get("toTokenAmount")? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let mut dexes = Vec::new();
    if let Some(routers) = first.get("dexRouterList") {
        collect_dex_names(routers, &mut dexes);
    }

    let price_impact = first
        .get("priceImpactPercentage")
        .and_then(|v| match v {
            Value::String(s) => s.parse::<f64>().ok(),
            other => other.as_f64(),
        });

    Some(
        Quote::new("okx", PROVIDER, to_amount)
            .with_route(dexes)
            .with_price_impact(price_impact),
    )
}

/// Every `dexName` under the router list, first occurrence order
fn collect_dex_names(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "dexName" {
                    if let Value::String(name) = child {
                        if !name.is_empty() && !out.contains(name) {
                            out.push(name.clone());
                        }
                    }
                } else {
                    collect_dex_names(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_dex_names(item, out);
            }
        }
        _ => {}
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// OKX ROUTER
// ============================================================================

pub struct OkxRouter {
    http: HttpClient,
    config: OkxConfig,
}

impl OkxRouter {
    pub fn new(config: OkxConfig) -> Result<Self, SwapError> {
        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            config,
        })
    }

    /// Headers for one signed GET of `request_path`
    pub fn signed_headers(
        &self,
        request_path: &str,
        timestamp: &str,
    ) -> Result<Vec<(&'static str, String)>, SwapError> {
        let signature = sign_request(&self.config.secret, timestamp, "GET", request_path)?;
        Ok(vec![
            ("OK-ACCESS-KEY", self.config.api_key.clone()),
            ("OK-ACCESS-SIGN", signature),
            ("OK-ACCESS-TIMESTAMP", timestamp.to_string()),
            ("OK-ACCESS-PASSPHRASE", self.config.passphrase.clone()),
            ("User-Agent", self.config.user_agent.clone()),
        ])
    }

    /// Sign and forward one quote query; failures come back as error bodies
    pub async fn relay(
        &self,
        from_token: Option<&str>,
        to_token: Option<&str>,
        amount: Option<&str>,
    ) -> RelayResponse {
        let (from_token, to_token, amount) =
            match (non_empty(from_token), non_empty(to_token), non_empty(amount)) {
                (Some(f), Some(t), Some(a)) => (f, t, a),
                _ => return RelayResponse::error(400, "Missing params"),
            };

        if !self.config.has_credentials() {
            return RelayResponse::error(500, "OKX not configured");
        }

        let request_path = build_request_path(
            &self.config.quote_path,
            &self.config.chain_index,
            from_token,
            to_token,
            amount,
        );
        let timestamp = okx_timestamp(Utc::now());

        match self.send_signed(&request_path, &timestamp).await {
            Ok(body) => RelayResponse { status: 200, body },
            Err(e) => {
                logger::debug(LogTag::Okx, &format!("OKX relay failed: {}", e));
                RelayResponse::error(500, &e.detail())
            }
        }
    }

    async fn send_signed(&self, request_path: &str, timestamp: &str) -> Result<Value, SwapError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), request_path);
        let mut builder = self.http.client().get(&url);
        for (name, value) in self.signed_headers(request_path, timestamp)? {
            builder = builder.header(name, value);
        }

        logger::verbose(LogTag::Okx, &format!("OKX signed GET {}", request_path));

        let response = builder.send().await?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl QuoteSource for OkxRouter {
    fn id(&self) -> &'static str {
        "okx"
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    /// Without credentials every relay call would fail, so the source sits out
    fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.has_credentials()
    }

    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Option<Quote>, SwapError> {
        let relayed = self
            .relay(
                Some(&request.input_mint),
                Some(&request.output_mint),
                Some(&request.amount_raw),
            )
            .await;

        if !relayed.is_success() {
            logger::debug(
                LogTag::Okx,
                &format!("OKX relay returned {}: {}", relayed.status, relayed.body),
            );
            return Ok(None);
        }

        let quote = parse_relay_body(&relayed.body);
        if quote.is_none() {
            logger::debug(
                LogTag::Okx,
                &format!(
                    "OKX returned no quote (code {})",
                    relayed.body.get("code").unwrap_or(&Value::Null)
                ),
            );
        }
        Ok(quote)
    }
}
