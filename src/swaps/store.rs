/// Swap store: reactive quote state behind a debounced, stale-safe fetch
///
/// Every input change clears the derived quote state and re-arms a single
/// debounce timer. When the timer fires it spawns the fetch as its own task,
/// so re-arming never cancels a fetch that is already in flight. Instead,
/// each input change bumps a sequence number; a fetch result is applied only
/// if its sequence is still the latest and its request still matches the
/// inputs. Both checks run under the same lock that writes the state.
///
/// Methods that arm the timer call `tokio::spawn` and must run inside a
/// Tokio runtime.
use super::aggregator::QuoteAggregator;
use super::types::{ExecutionPayload, Quote, QuoteRequest};
use crate::config::StoreConfig;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::tokens::{popular_tokens, Token};
use crate::utils::{format_output_amount, to_smallest_unit};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorePhase {
    /// No valid amount entered
    Idle,
    AwaitingDebounce,
    /// Order or comparison quotes in flight
    Fetching,
    Ready,
    Error,
}

/// Reactive state observed by the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub phase: StorePhase,
    pub input_token: Token,
    pub output_token: Token,
    /// Amount exactly as typed, in UI units
    pub input_amount: String,
    /// Formatted output of the selected quote, or of the order before
    /// comparison quotes land
    pub output_amount: String,
    pub slippage_bps: u16,
    pub slippage_stable_bps: u16,
    pub taker: Option<String>,
    pub order: Option<Quote>,
    pub quotes: Vec<Quote>,
    pub quotes_loading: bool,
    pub selected_quote_index: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreSnapshot {
    fn initial(config: &StoreConfig) -> Self {
        let mut defaults = popular_tokens().into_iter();
        let input_token = defaults
            .next()
            .unwrap_or_else(|| Token::new(crate::tokens::SOL_MINT, "SOL", "Solana", 9));
        let output_token = defaults
            .next()
            .unwrap_or_else(|| Token::new(crate::tokens::USDC_MINT, "USDC", "USD Coin", 6));

        Self {
            phase: StorePhase::Idle,
            input_token,
            output_token,
            input_amount: String::new(),
            output_amount: String::new(),
            slippage_bps: config.default_slippage_bps,
            slippage_stable_bps: config.default_slippage_stable_bps,
            taker: None,
            order: None,
            quotes: Vec::new(),
            quotes_loading: false,
            selected_quote_index: 0,
            loading: false,
            error: None,
        }
    }

    /// The request the current inputs describe; `None` when not quotable
    pub fn current_request(&self) -> Option<QuoteRequest> {
        let raw = to_smallest_unit(&self.input_amount, self.input_token.decimals)?;
        if raw == 0 {
            return None;
        }
        let request = QuoteRequest::new(
            &self.input_token.address,
            &self.output_token.address,
            raw.to_string(),
        )
        .with_taker(self.taker.clone());
        request.validate().ok().map(|_| request)
    }

    pub fn selected_quote(&self) -> Option<&Quote> {
        self.quotes.get(self.selected_quote_index)
    }

    fn clear_derived(&mut self) {
        self.order = None;
        self.output_amount.clear();
        self.quotes.clear();
        self.selected_quote_index = 0;
        self.loading = false;
        self.quotes_loading = false;
    }
}

struct StoreInner {
    aggregator: Arc<QuoteAggregator>,
    state: watch::Sender<StoreSnapshot>,
    /// Latest issued request sequence
    sequence: AtomicU64,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// A fetch armed by an input change
struct PendingFetch {
    sequence: u64,
    request: QuoteRequest,
    output_decimals: u8,
}

pub struct SwapStore {
    inner: Arc<StoreInner>,
}

impl SwapStore {
    pub fn new(aggregator: Arc<QuoteAggregator>, config: &StoreConfig) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::initial(config));
        Self {
            inner: Arc::new(StoreInner {
                aggregator,
                state,
                sequence: AtomicU64::new(0),
                debounce: Duration::from_millis(config.debounce_ms),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.inner.state.subscribe()
    }

    // ------------------------------------------------------------------------
    // Input changes (clear derived state, re-arm the debounce)
    // ------------------------------------------------------------------------

    pub fn set_input_token(&self, token: Token) {
        self.change_inputs(|s| s.input_token = token);
    }

    pub fn set_output_token(&self, token: Token) {
        self.change_inputs(|s| s.output_token = token);
    }

    pub fn set_input_amount(&self, amount: &str) {
        let amount = amount.to_string();
        self.change_inputs(|s| s.input_amount = amount);
    }

    /// Wallet that will sign the order; part of the request
    pub fn set_taker(&self, taker: Option<String>) {
        self.change_inputs(|s| s.taker = taker.filter(|t| !t.is_empty()));
    }

    /// Swap the pair; the typed amount no longer applies and is cleared
    pub fn switch_tokens(&self) {
        self.change_inputs(|s| {
            std::mem::swap(&mut s.input_token, &mut s.output_token);
            s.input_amount.clear();
        });
    }

    // ------------------------------------------------------------------------
    // Pure state updates (no refetch)
    // ------------------------------------------------------------------------

    pub fn set_slippage(&self, bps: u16) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.slippage_bps != bps;
            s.slippage_bps = bps;
            changed
        });
    }

    pub fn set_slippage_stable(&self, bps: u16) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.slippage_stable_bps != bps;
            s.slippage_stable_bps = bps;
            changed
        });
    }

    /// Out-of-range indexes are ignored
    pub fn select_quote(&self, index: usize) {
        self.inner.state.send_if_modified(|s| {
            let Some(quote) = s.quotes.get(index) else {
                return false;
            };
            s.output_amount =
                format_output_amount(&quote.output_amount_raw, s.output_token.decimals);
            s.selected_quote_index = index;
            true
        });
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// What the wallet collaborator signs: the selected quote's payload,
    /// else the order's
    pub fn selected_execution_payload(&self) -> Option<ExecutionPayload> {
        let state = self.inner.state.borrow();
        state
            .selected_quote()
            .and_then(|q| q.execution_payload.clone())
            .or_else(|| state.order.as_ref().and_then(|o| o.execution_payload.clone()))
    }

    fn change_inputs<F>(&self, change: F)
    where
        F: FnOnce(&mut StoreSnapshot),
    {
        // Held until the timer is re-armed so the newest sequence always
        // owns the timer. Lock order: timer, then state.
        let mut timer = self.inner.timer.lock();
        let mut pending = None;
        self.inner.state.send_modify(|s| {
            change(s);
            s.clear_derived();

            let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            match s.current_request() {
                Some(request) => {
                    s.phase = StorePhase::AwaitingDebounce;
                    pending = Some(PendingFetch {
                        sequence,
                        request,
                        output_decimals: s.output_token.decimals,
                    });
                }
                None => s.phase = StorePhase::Idle,
            }
        });
        self.rearm(&mut timer, pending);
    }

    fn rearm(&self, timer: &mut Option<JoinHandle<()>>, pending: Option<PendingFetch>) {
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        if let Some(fetch) = pending {
            let inner = Arc::clone(&self.inner);
            let delay = self.inner.debounce;
            *timer = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                tokio::spawn(inner.run_fetch(fetch));
            }));
        }
    }
}

impl Drop for SwapStore {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
        }
    }
}

impl StoreInner {
    async fn run_fetch(self: Arc<Self>, fetch: PendingFetch) {
        let PendingFetch {
            sequence,
            request,
            output_decimals,
        } = fetch;

        let started = self.land(sequence, &request, |s| {
            s.phase = StorePhase::Fetching;
            s.loading = true;
            s.quotes_loading = true;
        });
        if !started {
            return;
        }

        logger::debug(
            LogTag::Store,
            &format!("Fetch #{}: {} {}", sequence, request.amount_raw, request.input_mint),
        );

        let order = match self
            .aggregator
            .fetch_authoritative(&request, output_decimals)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                self.land(sequence, &request, |s| {
                    s.phase = StorePhase::Error;
                    s.error = Some(e.to_string());
                    s.clear_derived();
                });
                return;
            }
        };

        let shown = self.land(sequence, &request, |s| {
            s.output_amount = format_output_amount(&order.output_amount_raw, output_decimals);
            s.order = Some(order.clone());
            s.error = None;
            s.loading = false;
        });
        if !shown {
            return;
        }

        let quotes = self
            .aggregator
            .fetch_comparison_quotes(&request, output_decimals, Some(order))
            .await;

        self.land(sequence, &request, |s| {
            if let Some(best) = quotes.first() {
                s.output_amount = format_output_amount(&best.output_amount_raw, output_decimals);
            }
            s.quotes = quotes;
            s.selected_quote_index = 0;
            s.quotes_loading = false;
            s.phase = StorePhase::Ready;
        });
    }

    /// Apply `update` only while `sequence` and `request` are still current
    fn land<F>(&self, sequence: u64, request: &QuoteRequest, update: F) -> bool
    where
        F: FnOnce(&mut StoreSnapshot),
    {
        let mut current = sequence;
        let applied = self.state.send_if_modified(|s| {
            current = self.sequence.load(Ordering::SeqCst);
            if current != sequence || s.current_request().as_ref() != Some(request) {
                return false;
            }
            update(s);
            true
        });

        if !applied {
            logger::debug(
                LogTag::Store,
                &SwapError::StaleResponseDiscarded { sequence, current }.to_string(),
            );
        }
        applied
    }
}
