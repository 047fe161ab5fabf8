use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use tickline_core::{
    load_history, load_snapshot, ClientConfig, DateWindow, HistoricalRange, HttpClient,
    HttpError, HttpMethod, HttpRequest, HttpResponse, LabelFormatter, LoadErrorKind,
    MarketDataSource, PredictionClient, PredictionRequest, RestMarketSource, Symbol, Timeframe,
    UtcDateTime,
};

/// Replays canned responses and records every request it sees.
#[derive(Default)]
struct ScriptedHttpClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn replying(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
        let client = Self::default();
        client.responses.lock().expect("lock").push(response);
        Arc::new(client)
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let response = self
            .responses
            .lock()
            .expect("lock")
            .pop()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response")));
        Box::pin(async move { response })
    }
}

fn source_with(client: Arc<ScriptedHttpClient>) -> RestMarketSource {
    RestMarketSource::with_http_client(ClientConfig::default(), client)
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn window() -> DateWindow {
    HistoricalRange::OneMonth.window_ending_at(UtcDateTime::parse("2024-06-15T09:30:00Z").expect("ts"))
}

#[test]
fn snapshot_requests_stock_endpoint_and_maps_quote() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"{"price":{"regularMarketPrice":2901.5,"regularMarketOpen":2880.0,
            "regularMarketDayHigh":2910.0,"regularMarketDayLow":2875.25,
            "marketCap":19600000000000,"regularMarketTime":1714644000000}}"#,
    )));
    let source = source_with(client.clone());

    let seed = block_on(load_snapshot(&source, &symbol("RELIANCE.NS"), &LabelFormatter::default()))
        .expect("snapshot should load");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].url, "http://localhost:4000/stock/RELIANCE.NS");
    assert_eq!(requests[0].timeout_ms, None);

    assert_eq!(seed.quote.price, 2901.5);
    assert_eq!(seed.quote.day_low, Some(2875.25));
    assert_eq!(seed.quote.market_cap_display().as_deref(), Some("19.60 Trillion ₹"));
    assert_eq!(seed.series.len(), 1);
    assert_eq!(seed.series.labels(), ["2024-05-02 10:00:00"]);
}

#[test]
fn snapshot_without_price_object_is_data_unavailable() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(r#"{"summary":{}}"#)));
    let source = source_with(client);

    let error = block_on(load_snapshot(&source, &symbol("ZZZ"), &LabelFormatter::default()))
        .expect_err("missing price should fail");

    assert_eq!(error.kind(), LoadErrorKind::DataUnavailable);
    assert_eq!(error.code(), "load.data_unavailable");
}

#[test]
fn transport_failures_and_error_statuses_are_network_errors() {
    let cases = [
        Err(HttpError::new("connection refused")),
        Ok(HttpResponse::new(500, "internal error")),
        Ok(HttpResponse::new(404, r#"{"error":"unknown symbol"}"#)),
    ];

    for response in cases {
        let description = format!("{response:?}");
        let source = source_with(ScriptedHttpClient::replying(response));

        let error = block_on(load_snapshot(&source, &symbol("AAPL"), &LabelFormatter::default()))
            .expect_err("request should fail");
        assert_eq!(error.kind(), LoadErrorKind::Network, "case {description}");
    }
}

#[test]
fn undecodable_body_is_data_unavailable() {
    let source = source_with(ScriptedHttpClient::replying(Ok(HttpResponse::ok_json("<html>"))));

    let error = block_on(source.snapshot(symbol("AAPL"))).expect_err("body should not decode");
    assert_eq!(error.kind(), LoadErrorKind::DataUnavailable);
}

#[test]
fn history_sends_window_and_preserves_bar_order() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"{"data":[
            {"date":"2024-05-16T00:00:00.000Z","close":101.5,"open":100.0},
            {"date":"2024-05-15","close":100.25},
            {"date":1715904000000,"close":102.0}
        ]}"#,
    )));
    let source = source_with(client.clone());

    let series = block_on(load_history(
        &source,
        &symbol("AAPL"),
        window(),
        &LabelFormatter::default(),
    ))
    .expect("history should load");

    assert_eq!(
        client.requests()[0].url,
        "http://localhost:4000/historical/AAPL?startDate=2024-05-15&endDate=2024-06-15"
    );
    assert_eq!(series.prices(), vec![101.5, 100.25, 102.0]);
    assert_eq!(series.labels(), ["2024-05-16", "2024-05-15", "2024-05-17"]);
}

#[test]
fn history_with_a_null_close_fails_without_partial_series() {
    let source = source_with(ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"{"data":[{"date":"2024-05-15","close":100.0},{"date":"2024-05-16","close":null}]}"#,
    ))));

    let error = block_on(load_history(
        &source,
        &symbol("AAPL"),
        window(),
        &LabelFormatter::default(),
    ))
    .expect_err("null close should fail");
    assert_eq!(error.kind(), LoadErrorKind::DataUnavailable);
}

#[test]
fn history_without_a_data_array_is_data_unavailable() {
    for body in [r#"{"error":"no data for symbol"}"#, "{}"] {
        let source = source_with(ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(body))));

        let error = block_on(load_history(
            &source,
            &symbol("AAPL"),
            window(),
            &LabelFormatter::default(),
        ))
        .expect_err("missing data should fail");
        assert_eq!(error.kind(), LoadErrorKind::DataUnavailable, "body {body}");
    }
}

#[test]
fn history_with_an_empty_data_array_is_an_empty_series() {
    let source = source_with(ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"{"data":[]}"#,
    ))));

    let series = block_on(load_history(
        &source,
        &symbol("AAPL"),
        window(),
        &LabelFormatter::default(),
    ))
    .expect("empty window is valid");
    assert!(series.is_empty());
}

#[test]
fn blank_suggestion_prefix_skips_the_request() {
    let client = Arc::new(ScriptedHttpClient::default());
    let source = source_with(client.clone());

    let suggestions = block_on(source.suggestions(String::from("  "))).expect("no request");

    assert!(suggestions.is_empty());
    assert!(client.requests().is_empty());
}

#[test]
fn suggestions_are_fetched_by_prefix() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"["RELIANCE.NS","RELAXO.NS"]"#,
    )));
    let source = source_with(client.clone());

    let suggestions = block_on(source.suggestions(String::from("REL"))).expect("suggestions");

    assert_eq!(suggestions, vec!["RELIANCE.NS", "RELAXO.NS"]);
    assert_eq!(client.requests()[0].url, "http://localhost:4000/suggestions/REL");
}

#[test]
fn configured_timeout_is_applied_to_requests() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(r#"[]"#)));
    let config = ClientConfig {
        request_timeout_ms: Some(2_000),
        ..ClientConfig::default()
    };
    let source = RestMarketSource::with_http_client(config, client.clone());

    block_on(source.suggestions(String::from("A"))).expect("suggestions");
    assert_eq!(client.requests()[0].timeout_ms, Some(2_000));
}

#[test]
fn prediction_posts_json_and_returns_result_verbatim() {
    let client = ScriptedHttpClient::replying(Ok(HttpResponse::ok_json(
        r#"{"predicted_closing_price":3950.2,"threshold_price":3861.3,
            "mean_absolute_error":21.4,"mean_absolute_percentage_error":0.55,
            "mean_squared_error":702.9}"#,
    )));
    let predictions = PredictionClient::with_http_client(ClientConfig::default(), client.clone());
    let request = PredictionRequest::new(
        symbol("TCS.NS"),
        UtcDateTime::parse("2024-01-01").expect("date").date(),
        UtcDateTime::parse("2024-06-30").expect("date").date(),
        Timeframe::LongTerm,
        Some(3.0),
    )
    .expect("valid request");

    let result = block_on(predictions.submit(&request)).expect("prediction");

    let sent = &client.requests()[0];
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.url, "http://localhost:4000/predict");
    let body: serde_json::Value =
        serde_json::from_str(sent.body.as_deref().expect("body")).expect("json body");
    assert_eq!(body["timeframe"], "long-term");
    assert_eq!(body["start"], "2024-01-01");
    assert_eq!(result.predicted_closing_price, 3950.2);
    assert_eq!(result.mean_squared_error, 702.9);
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
