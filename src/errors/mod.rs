/// Error handling for the quote engine
///
/// One error type crosses every module boundary. The quote taxonomy
/// (source unavailable, no route, authoritative failure, stale response)
/// lives next to the plumbing failures it is usually built from.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwapError {
    /// A quote source call failed (transport, non-2xx, undecodable body)
    #[error("{provider} quote failed: {message}")]
    QuoteFetch { provider: String, message: String },

    /// A quote source answered but had nothing usable
    #[error("{provider} has no quote available")]
    SourceUnavailable { provider: String },

    /// Aggregation produced zero quotes; an empty state, not a failure
    #[error("No route found")]
    NoRouteFound,

    /// The executable-order fetch failed; rendered verbatim to the user
    #[error("{}", authoritative_message(.message))]
    AuthoritativeFetchFailed { message: String },

    /// A response for a superseded request landed after a newer one was issued
    #[error("Discarded stale response #{sequence} (current #{current})")]
    StaleResponseDiscarded { sequence: u64, current: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse {data_type}: {error}")]
    Parse { data_type: String, error: String },

    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

fn authoritative_message(message: &str) -> String {
    if message.is_empty() {
        "Failed to get quote".to_string()
    } else {
        format!("Failed to get quote: {}", message)
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::Network(format!("HTTP request failed: {}", err))
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::Parse {
            data_type: "JSON".to_string(),
            error: err.to_string(),
        }
    }
}

// =============================================================================
// STRUCTURED ERROR BUILDERS
// =============================================================================

impl SwapError {
    pub fn quote_fetch(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SwapError::QuoteFetch {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn source_unavailable(provider: impl Into<String>) -> Self {
        SwapError::SourceUnavailable {
            provider: provider.into(),
        }
    }

    pub fn authoritative(message: impl Into<String>) -> Self {
        SwapError::AuthoritativeFetchFailed {
            message: message.into(),
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        SwapError::Network(message.into())
    }

    pub fn parse_error(data_type: impl Into<String>, error: impl Into<String>) -> Self {
        SwapError::Parse {
            data_type: data_type.into(),
            error: error.into(),
        }
    }

    pub fn invalid_amount(amount: impl Into<String>, reason: impl Into<String>) -> Self {
        SwapError::InvalidAmount {
            amount: amount.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        SwapError::Configuration(message.into())
    }

    pub fn signing_error(message: impl Into<String>) -> Self {
        SwapError::Signing(message.into())
    }

    /// Whether the store should surface this error in its `error` field
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            SwapError::AuthoritativeFetchFailed { .. }
                | SwapError::InvalidAmount { .. }
                | SwapError::Configuration(_)
        )
    }

    /// Detail message without the variant prefix, used when rewrapping
    pub fn detail(&self) -> String {
        match self {
            SwapError::QuoteFetch { message, .. } => message.clone(),
            SwapError::AuthoritativeFetchFailed { message } => message.clone(),
            SwapError::Network(message)
            | SwapError::Configuration(message)
            | SwapError::Signing(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
