/// Quote model shared by the quote sources, the aggregator and the store
use crate::errors::SwapError;
use crate::utils::normalize_amount;
use serde::{Deserialize, Deserializer, Serialize};

/// One swap request fanned out to every quote source
///
/// Amounts are integer strings in the input token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_raw: String,
    pub taker: Option<String>,
}

impl QuoteRequest {
    pub fn new(input_mint: &str, output_mint: &str, amount_raw: impl Into<String>) -> Self {
        Self {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount_raw: amount_raw.into(),
            taker: None,
        }
    }

    pub fn with_taker(mut self, taker: Option<String>) -> Self {
        self.taker = taker.filter(|t| !t.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), SwapError> {
        if self.input_mint.is_empty() || self.output_mint.is_empty() {
            return Err(SwapError::invalid_amount(&self.amount_raw, "token pair is incomplete"));
        }
        if self.input_mint == self.output_mint {
            return Err(SwapError::invalid_amount(&self.amount_raw, "input and output tokens are the same"));
        }
        match self.amount_raw.parse::<u128>() {
            Ok(0) => Err(SwapError::invalid_amount(&self.amount_raw, "amount must be positive")),
            Ok(_) => Ok(()),
            Err(_) => Err(SwapError::invalid_amount(&self.amount_raw, "not an integer amount")),
        }
    }
}

/// Provider data needed later to execute the trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPayload {
    /// Base64 unsigned transaction, when the provider builds one
    pub transaction: Option<String>,
    /// Correlation id the execution endpoint expects back
    pub request_id: Option<String>,
    /// Full provider response, kept verbatim
    pub raw: serde_json::Value,
}

/// Normalized quote from one source
///
/// `is_best`, `savings_over_worst` and the USD fields are annotations set by
/// the ranking policy; a freshly parsed quote has them at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source_id: String,
    /// Provider-combination label, e.g. "Jupiter + OKX"
    pub source_name: String,
    pub output_amount_raw: String,
    pub output_amount_normalized: f64,
    /// Venue labels in traversal order
    pub route: Vec<String>,
    pub execution_payload: Option<ExecutionPayload>,
    pub price_impact_pct: Option<f64>,
    pub is_best: bool,
    pub savings_over_worst: f64,
    pub output_usd: Option<f64>,
    pub savings_usd: Option<f64>,
}

impl Quote {
    pub fn new(source_id: &str, source_name: &str, output_amount_raw: impl Into<String>) -> Self {
        Self {
            source_id: source_id.to_string(),
            source_name: source_name.to_string(),
            output_amount_raw: output_amount_raw.into(),
            output_amount_normalized: 0.0,
            route: Vec::new(),
            execution_payload: None,
            price_impact_pct: None,
            is_best: false,
            savings_over_worst: 0.0,
            output_usd: None,
            savings_usd: None,
        }
    }

    pub fn with_route(mut self, route: Vec<String>) -> Self {
        self.route = route;
        self
    }

    pub fn with_payload(mut self, payload: ExecutionPayload) -> Self {
        self.execution_payload = Some(payload);
        self
    }

    pub fn with_price_impact(mut self, price_impact_pct: Option<f64>) -> Self {
        self.price_impact_pct = price_impact_pct;
        self
    }

    /// Recompute the normalized amount for the output token's decimals
    pub fn normalize(&mut self, output_decimals: u8) {
        self.output_amount_normalized = normalize_amount(&self.output_amount_raw, output_decimals);
    }

    pub fn route_label(&self) -> String {
        if self.route.is_empty() {
            "Direct".to_string()
        } else {
            self.route.join(" → ")
        }
    }

    /// Carries a transaction the wallet can sign
    pub fn is_executable(&self) -> bool {
        self.execution_payload
            .as_ref()
            .and_then(|p| p.transaction.as_deref())
            .map_or(false, |tx| !tx.is_empty())
    }
}

/// Deserializer for fields that can be either string or number
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_owned())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// Optional numeric field sent either as `"0.12"` or `0.12`
pub fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Flexible>::deserialize(deserializer)? {
        Some(Flexible::Number(value)) => Some(value),
        Some(Flexible::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    })
}
