/// Aggregator and store behaviour against scripted quote sources
///
/// Every test runs on a paused Tokio clock, so debounce windows and source
/// latencies are exact and no network is touched.
use super::aggregator::QuoteAggregator;
use super::router::QuoteSource;
use super::store::{StorePhase, SwapStore};
use super::types::{ExecutionPayload, Quote, QuoteRequest};
use crate::config::StoreConfig;
use crate::errors::SwapError;
use crate::tokens::{Token, USDT_MINT};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const ONE_SOL: &str = "1000000000";
const TWO_SOL: &str = "2000000000";

type QuoteResult = Result<Option<Quote>, SwapError>;
type Behaviour = Box<dyn Fn(&QuoteRequest) -> (Duration, QuoteResult) + Send + Sync>;

struct MockSource {
    id: &'static str,
    name: &'static str,
    authoritative: bool,
    enabled: bool,
    behaviour: Behaviour,
    calls: AtomicUsize,
    requests: Mutex<Vec<QuoteRequest>>,
}

impl MockSource {
    fn new<F>(id: &'static str, name: &'static str, behaviour: F) -> Self
    where
        F: Fn(&QuoteRequest) -> (Duration, QuoteResult) + Send + Sync + 'static,
    {
        Self {
            id,
            name,
            authoritative: false,
            enabled: true,
            behaviour: Box::new(behaviour),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn authoritative(mut self) -> Self {
        self.authoritative = true;
        self
    }

    fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> Option<QuoteRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl QuoteSource for MockSource {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    async fn fetch_quote(&self, request: &QuoteRequest) -> QuoteResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let (delay, result) = (self.behaviour)(request);
        sleep(delay).await;
        result
    }
}

/// Output in USDC units for `per_sol` USDC per SOL of input
fn scaled_output(request: &QuoteRequest, per_sol: u128) -> String {
    let lamports: u128 = request.amount_raw.parse().unwrap_or(0);
    (lamports / 1_000 * per_sol).to_string()
}

fn executable(source_id: &str, name: &str, request: &QuoteRequest, per_sol: u128) -> Quote {
    Quote::new(source_id, name, scaled_output(request, per_sol)).with_payload(ExecutionPayload {
        transaction: Some(format!("tx-{}", request.amount_raw)),
        request_id: Some(format!("req-{}", request.amount_raw)),
        raw: serde_json::Value::Null,
    })
}

fn jupiter(delay_ms: u64) -> Arc<MockSource> {
    Arc::new(
        MockSource::new("jupiter", "Jupiter", move |req| {
            (
                Duration::from_millis(delay_ms),
                Ok(Some(executable("jupiter", "Jupiter", req, 150))),
            )
        })
        .authoritative(),
    )
}

fn comparison(name: &'static str, delay_ms: u64, per_sol: u128) -> Arc<MockSource> {
    Arc::new(MockSource::new("cmp", name, move |req| {
        (
            Duration::from_millis(delay_ms),
            Ok(Some(Quote::new("cmp", name, scaled_output(req, per_sol)))),
        )
    }))
}

fn fixed(name: &'static str, delay_ms: u64, raw: &'static str) -> Arc<MockSource> {
    Arc::new(MockSource::new("fixed", name, move |_| {
        (Duration::from_millis(delay_ms), Ok(Some(Quote::new("fixed", name, raw))))
    }))
}

fn failing(name: &'static str, delay_ms: u64) -> Arc<MockSource> {
    Arc::new(MockSource::new("failing", name, move |_| {
        (
            Duration::from_millis(delay_ms),
            Err(SwapError::quote_fetch(name, "HTTP 503: unavailable")),
        )
    }))
}

fn aggregator(sources: &[&Arc<MockSource>]) -> QuoteAggregator {
    QuoteAggregator::new(
        sources
            .iter()
            .map(|s| Arc::clone(*s) as Arc<dyn QuoteSource>)
            .collect(),
    )
}

fn store(sources: &[&Arc<MockSource>]) -> SwapStore {
    SwapStore::new(Arc::new(aggregator(sources)), &StoreConfig::default())
}

async fn settle() {
    sleep(Duration::from_secs(5)).await;
}

// ============================================================================
// AGGREGATION ENGINE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sources_are_queried_concurrently() {
    let a = fixed("A", 100, "1");
    let b = fixed("B", 100, "2");
    let c = fixed("C", 100, "3");
    let engine = aggregator(&[&a, &b, &c]);

    let started = Instant::now();
    let quotes = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 0)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 3);
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn test_failing_source_does_not_affect_siblings() {
    let broken = failing("Broken", 10);
    let slow = fixed("Slow", 400, "1200");
    let engine = aggregator(&[&broken, &slow]);

    let quotes = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 2)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].source_name, "Slow");
    assert_eq!(quotes[0].output_amount_normalized, 12.0);
    assert!(quotes[0].is_best);
    assert_eq!(quotes[0].savings_over_worst, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_all_sources_failing_yields_empty() {
    let a = failing("A", 5);
    let b = Arc::new(MockSource::new("none", "None", |_| (Duration::ZERO, Ok(None))));
    let engine = aggregator(&[&a, &b]);

    let quotes = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 6)
        .await
        .unwrap();
    assert!(quotes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sole_order_source_failure_is_surfaced() {
    let broken = Arc::new(
        MockSource::new("jupiter", "Jupiter", |_| {
            (Duration::ZERO, Err(SwapError::quote_fetch("Jupiter", "HTTP 500")))
        })
        .authoritative(),
    );
    let off = Arc::new(
        MockSource::new("off", "Off", |_| (Duration::ZERO, Ok(Some(Quote::new("off", "Off", "9")))))
            .disabled(),
    );
    let engine = aggregator(&[&broken, &off]);

    let err = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::AuthoritativeFetchFailed { .. }));
    assert_eq!(err.to_string(), "Failed to get quote: HTTP 500");
    assert_eq!(broken.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sole_order_source_success_is_ranked() {
    let jup = jupiter(10);
    let quotes = aggregator(&[&jup])
        .fetch_all_quotes(&QuoteRequest::new("So1", "USDC", ONE_SOL), 6)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 1);
    assert!(quotes[0].is_best);
    assert_eq!(quotes[0].output_amount_normalized, 150.0);
}

#[tokio::test(start_paused = true)]
async fn test_order_failure_among_siblings_is_dropped() {
    let broken = Arc::new(
        MockSource::new("jupiter", "Jupiter", |_| {
            (Duration::ZERO, Err(SwapError::quote_fetch("Jupiter", "HTTP 500")))
        })
        .authoritative(),
    );
    let ray = fixed("Raydium", 10, "7");
    let quotes = aggregator(&[&broken, &ray])
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 0)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].source_name, "Raydium");
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_source_names_keep_first() {
    let first = fixed("Jupiter + OKX", 50, "100");
    let second = fixed("Jupiter + OKX", 10, "200");
    let other = fixed("Raydium", 10, "150");
    let engine = aggregator(&[&first, &second, &other]);

    let quotes = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 0)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 2);
    let jupiter = quotes.iter().find(|q| q.source_name == "Jupiter + OKX").unwrap();
    assert_eq!(jupiter.output_amount_raw, "100");
    assert_eq!(quotes[0].source_name, "Raydium");
}

#[tokio::test(start_paused = true)]
async fn test_disabled_sources_are_skipped() {
    let live = fixed("Live", 10, "5");
    let off = Arc::new(
        MockSource::new("off", "Off", |_| (Duration::ZERO, Ok(Some(Quote::new("off", "Off", "9")))))
            .disabled(),
    );
    let engine = aggregator(&[&live, &off]);

    let quotes = engine
        .fetch_all_quotes(&QuoteRequest::new("X", "Y", "10"), 0)
        .await
        .unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(off.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_priced_quotes_carry_usd_values() {
    let a = fixed("A", 10, "3000000");
    let b = fixed("B", 10, "2000000");
    let engine = aggregator(&[&a, &b]);

    let quotes = engine
        .fetch_all_quotes_priced(&QuoteRequest::new("X", "Y", "10"), 6, Some(2.0))
        .await
        .unwrap();
    assert_eq!(quotes[0].output_usd, Some(6.0));
    assert_eq!(quotes[0].savings_usd, Some(2.0));
    assert_eq!(quotes[1].savings_usd, Some(0.0));
}

#[tokio::test(start_paused = true)]
async fn test_authoritative_failures_are_wrapped() {
    let request = QuoteRequest::new("X", "Y", "10");

    let engine = aggregator(&[&fixed("Raydium", 0, "1")]);
    assert!(!engine.has_authoritative());
    assert!(matches!(
        engine.fetch_authoritative(&request, 0).await,
        Err(SwapError::AuthoritativeFetchFailed { .. })
    ));

    let empty = Arc::new(
        MockSource::new("jupiter", "Jupiter", |_| (Duration::ZERO, Ok(None))).authoritative(),
    );
    assert!(matches!(
        aggregator(&[&empty]).fetch_authoritative(&request, 0).await,
        Err(SwapError::AuthoritativeFetchFailed { .. })
    ));

    let broken = Arc::new(
        MockSource::new("jupiter", "Jupiter", |_| {
            (Duration::ZERO, Err(SwapError::quote_fetch("Jupiter", "HTTP 500")))
        })
        .authoritative(),
    );
    let err = aggregator(&[&broken])
        .fetch_authoritative(&request, 0)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to get quote: HTTP 500");
}

#[tokio::test(start_paused = true)]
async fn test_comparison_reuses_order() {
    let jup = jupiter(10);
    let ray = comparison("Raydium", 10, 160);
    let engine = aggregator(&[&jup, &ray]);
    let request = QuoteRequest::new("So1", "USDC", ONE_SOL);

    let order = engine.fetch_authoritative(&request, 6).await.unwrap();
    let quotes = engine.fetch_comparison_quotes(&request, 6, Some(order)).await;

    assert_eq!(jup.calls(), 1);
    assert_eq!(ray.calls(), 1);
    let names: Vec<&str> = quotes.iter().map(|q| q.source_name.as_str()).collect();
    assert_eq!(names, vec!["Raydium", "Jupiter"]);
    assert!(quotes[1].is_executable());
}

// ============================================================================
// SWAP STORE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_debounce_coalesces_rapid_edits() {
    let jup = jupiter(50);
    let store = store(&[&jup]);

    store.set_input_amount("1");
    sleep(Duration::from_millis(100)).await;
    store.set_input_amount("2");
    assert_eq!(store.snapshot().phase, StorePhase::AwaitingDebounce);

    settle().await;

    assert_eq!(jup.calls(), 1);
    assert_eq!(jup.last_request().unwrap().amount_raw, TWO_SOL);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::Ready);
    assert_eq!(snapshot.output_amount, "300.000000");
    assert_eq!(snapshot.quotes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_fetch_for_unquotable_amounts() {
    let jup = jupiter(10);
    let store = store(&[&jup]);

    for amount in ["", "0", "0.0", "abc", "-1", "0.0000000001"] {
        store.set_input_amount(amount);
        assert_eq!(store.snapshot().phase, StorePhase::Idle, "amount {:?}", amount);
    }
    settle().await;

    assert_eq!(jup.calls(), 0);
    assert!(store.snapshot().order.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let jup = Arc::new(
        MockSource::new("jupiter", "Jupiter", |req| {
            let delay = if req.amount_raw == ONE_SOL { 2_000 } else { 100 };
            (
                Duration::from_millis(delay),
                Ok(Some(executable("jupiter", "Jupiter", req, 150))),
            )
        })
        .authoritative(),
    );
    let store = store(&[&jup]);

    store.set_input_amount("1");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(jup.calls(), 1);
    store.set_input_amount("2");

    sleep(Duration::from_millis(600)).await;
    assert_eq!(store.snapshot().output_amount, "300.000000");

    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(jup.calls(), 2);
    assert_eq!(snapshot.phase, StorePhase::Ready);
    assert_eq!(snapshot.output_amount, "300.000000");
    assert_eq!(snapshot.order.unwrap().output_amount_raw, "300000000");
    assert_eq!(
        store.selected_execution_payload().unwrap().transaction.as_deref(),
        Some("tx-2000000000")
    );
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_fetch_dropped_after_amount_cleared() {
    let jup = jupiter(1_000);
    let store = store(&[&jup]);

    store.set_input_amount("1");
    sleep(Duration::from_millis(400)).await;
    store.set_input_amount("");
    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(jup.calls(), 1);
    assert_eq!(snapshot.phase, StorePhase::Idle);
    assert!(snapshot.order.is_none());
    assert!(snapshot.output_amount.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_order_failure_sets_error() {
    let jup = Arc::new(
        MockSource::new("jupiter", "Jupiter", |_| {
            (
                Duration::from_millis(20),
                Err(SwapError::quote_fetch("Jupiter", "HTTP 500: boom")),
            )
        })
        .authoritative(),
    );
    let ray = comparison("Raydium", 10, 160);
    let store = store(&[&jup, &ray]);

    store.set_input_amount("1");
    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::Error);
    assert_eq!(snapshot.error.as_deref(), Some("Failed to get quote: HTTP 500: boom"));
    assert!(snapshot.output_amount.is_empty());
    assert!(snapshot.quotes.is_empty());
    assert!(!snapshot.loading);
    assert!(!snapshot.quotes_loading);
    assert_eq!(ray.calls(), 0);

    store.clear_error();
    assert!(store.snapshot().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_error_cleared_by_next_successful_order() {
    let jup = Arc::new(
        MockSource::new("jupiter", "Jupiter", |req| {
            let result = if req.amount_raw == ONE_SOL {
                Err(SwapError::quote_fetch("Jupiter", "HTTP 429"))
            } else {
                Ok(Some(executable("jupiter", "Jupiter", req, 150)))
            };
            (Duration::from_millis(20), result)
        })
        .authoritative(),
    );
    let store = store(&[&jup]);

    store.set_input_amount("1");
    settle().await;
    assert!(store.snapshot().error.is_some());

    store.set_input_amount("2");
    assert!(store.snapshot().error.is_some());
    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::Ready);
    assert!(snapshot.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_order_shown_before_comparison_quotes() {
    let jup = jupiter(50);
    let ray = comparison("Raydium", 500, 160);
    let store = store(&[&jup, &ray]);

    store.set_input_amount("1");
    sleep(Duration::from_millis(360)).await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::Fetching);
    assert!(snapshot.order.is_some());
    assert!(!snapshot.loading);
    assert!(snapshot.quotes_loading);
    assert_eq!(snapshot.output_amount, "150.000000");

    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::Ready);
    assert!(!snapshot.quotes_loading);
    assert_eq!(snapshot.quotes.len(), 2);
    assert_eq!(snapshot.output_amount, "160.000000");
}

#[tokio::test(start_paused = true)]
async fn test_select_quote_updates_output_and_ignores_out_of_range() {
    let jup = jupiter(10);
    let ray = comparison("Raydium", 20, 160);
    let okx = comparison("OKX", 30, 140);
    let store = store(&[&jup, &ray, &okx]);

    store.set_input_amount("1");
    settle().await;

    assert_eq!(jup.calls(), 1);
    assert_eq!(ray.calls(), 1);
    assert_eq!(okx.calls(), 1);

    let snapshot = store.snapshot();
    let names: Vec<&str> = snapshot.quotes.iter().map(|q| q.source_name.as_str()).collect();
    assert_eq!(names, vec!["Raydium", "Jupiter", "OKX"]);
    assert_eq!(snapshot.selected_quote_index, 0);

    store.select_quote(2);
    assert_eq!(store.snapshot().selected_quote_index, 2);
    assert_eq!(store.snapshot().output_amount, "140.000000");

    store.select_quote(3);
    assert_eq!(store.snapshot().selected_quote_index, 2);
    assert_eq!(store.snapshot().output_amount, "140.000000");

    // OKX carries no payload, so the order's is handed off
    let payload = store.selected_execution_payload().unwrap();
    assert_eq!(payload.request_id.as_deref(), Some("req-1000000000"));
}

#[tokio::test(start_paused = true)]
async fn test_token_change_clears_and_refetches() {
    let jup = jupiter(10);
    let store = store(&[&jup]);

    store.set_input_amount("1");
    settle().await;
    assert_eq!(store.snapshot().phase, StorePhase::Ready);

    store.set_output_token(Token::new(USDT_MINT, "USDT", "Tether USD", 6));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.phase, StorePhase::AwaitingDebounce);
    assert!(snapshot.order.is_none());
    assert!(snapshot.quotes.is_empty());
    assert!(snapshot.output_amount.is_empty());
    assert_eq!(snapshot.selected_quote_index, 0);

    settle().await;
    assert_eq!(jup.calls(), 2);
    assert_eq!(jup.last_request().unwrap().output_mint, USDT_MINT);
}

#[tokio::test(start_paused = true)]
async fn test_switch_tokens_clears_amount() {
    let jup = jupiter(10);
    let store = store(&[&jup]);

    store.set_input_amount("1");
    settle().await;
    let before = store.snapshot();

    store.switch_tokens();
    let after = store.snapshot();
    assert_eq!(after.input_token, before.output_token);
    assert_eq!(after.output_token, before.input_token);
    assert!(after.input_amount.is_empty());
    assert_eq!(after.phase, StorePhase::Idle);

    settle().await;
    assert_eq!(jup.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_taker_is_forwarded() {
    let jup = jupiter(10);
    let store = store(&[&jup]);

    store.set_taker(Some("Wallet111".to_string()));
    store.set_input_amount("1");
    settle().await;

    assert_eq!(jup.calls(), 1);
    assert_eq!(jup.last_request().unwrap().taker.as_deref(), Some("Wallet111"));
}

#[tokio::test(start_paused = true)]
async fn test_slippage_does_not_refetch() {
    let jup = jupiter(10);
    let store = store(&[&jup]);

    store.set_input_amount("1");
    settle().await;

    store.set_slippage(250);
    store.set_slippage_stable(10);
    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.slippage_bps, 250);
    assert_eq!(snapshot.slippage_stable_bps, 10);
    assert_eq!(snapshot.phase, StorePhase::Ready);
    assert_eq!(jup.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_ready_state() {
    let jup = jupiter(10);
    let store = store(&[&jup]);
    let mut updates = store.subscribe();

    store.set_input_amount("1");
    let ready = updates
        .wait_for(|s| s.phase == StorePhase::Ready)
        .await
        .unwrap()
        .clone();
    assert_eq!(ready.output_amount, "150.000000");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_edits_settle_on_latest_inputs() {
    let jup = jupiter(0);
    let config = StoreConfig {
        debounce_ms: 5,
        ..StoreConfig::default()
    };
    let store = Arc::new(SwapStore::new(Arc::new(aggregator(&[&jup])), &config));

    let writers: Vec<_> = (0..2u32)
        .map(|worker| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || {
                for i in 0..200u32 {
                    store.set_input_amount(&((worker * 200 + i) % 7 + 1).to_string());
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }

    let mut updates = store.subscribe();
    let ready = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.phase == StorePhase::Ready),
    )
    .await
    .expect("store never left the debounce window")
    .unwrap()
    .clone();

    let request = ready.current_request().unwrap();
    let payload = ready.order.and_then(|o| o.execution_payload).unwrap();
    assert_eq!(payload.request_id, Some(format!("req-{}", request.amount_raw)));
}
