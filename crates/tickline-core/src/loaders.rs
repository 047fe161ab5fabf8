//! Snapshot and historical loaders.
//!
//! Each loader issues exactly one request through a [`MarketDataSource`] and
//! maps the payload into domain values. A payload that is missing anything
//! required fails the whole load; nothing partial is ever returned.

use tracing::warn;

use crate::data_source::{HistoricalBar, MarketDataSource, PriceFields, SnapshotPayload};
use crate::{
    Cadence, DateWindow, LabelFormatter, LoadError, PricePoint, Quote, Series, Symbol,
    UtcDateTime,
};

/// Result of a successful snapshot: the quote plus a one-point series.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSeed {
    pub quote: Quote,
    pub series: Series,
}

/// Fetch the current quote for `symbol`.
///
/// # Errors
///
/// `DataUnavailable` when the response lacks `price` or
/// `price.regularMarketPrice`; `Network` on transport failure.
pub async fn load_snapshot(
    source: &dyn MarketDataSource,
    symbol: &Symbol,
    labels: &LabelFormatter,
) -> Result<SnapshotSeed, LoadError> {
    let result = match source.snapshot(symbol.clone()).await {
        Ok(payload) => seed_from_payload(symbol, payload, labels, UtcDateTime::now()),
        Err(error) => Err(error),
    };
    if let Err(error) = &result {
        warn!(symbol = %symbol, code = error.code(), "snapshot load failed: {}", error.message());
    }
    result
}

/// Map a snapshot payload. `fetched_at` stands in for a missing
/// `regularMarketTime`.
pub fn seed_from_payload(
    symbol: &Symbol,
    payload: SnapshotPayload,
    labels: &LabelFormatter,
    fetched_at: UtcDateTime,
) -> Result<SnapshotSeed, LoadError> {
    let fields = payload.price.ok_or_else(|| {
        LoadError::data_unavailable(format!("snapshot for '{symbol}' has no price object"))
    })?;
    let quote = quote_from_fields(symbol, fields, fetched_at)?;

    let point = PricePoint::new(quote.market_time, quote.price)
        .map_err(|e| LoadError::data_unavailable(e.to_string()))?;
    let series = Series::single(point, labels.label(Cadence::Snapshot, quote.market_time));

    Ok(SnapshotSeed { quote, series })
}

fn quote_from_fields(
    symbol: &Symbol,
    fields: PriceFields,
    fetched_at: UtcDateTime,
) -> Result<Quote, LoadError> {
    let price = fields.regular_market_price.ok_or_else(|| {
        LoadError::data_unavailable(format!("snapshot for '{symbol}' has no regularMarketPrice"))
    })?;

    Quote::new(
        symbol.clone(),
        price,
        fields.regular_market_open,
        fields.regular_market_day_high,
        fields.regular_market_day_low,
        fields.market_cap,
        fields.regular_market_time.unwrap_or(fetched_at),
    )
    .map_err(|e| LoadError::data_unavailable(format!("snapshot for '{symbol}': {e}")))
}

/// Fetch every daily bar in `window` as a replacement series.
///
/// # Errors
///
/// `DataUnavailable` when any bar lacks a date or a finite close; `Network`
/// on transport failure.
pub async fn load_history(
    source: &dyn MarketDataSource,
    symbol: &Symbol,
    window: DateWindow,
    labels: &LabelFormatter,
) -> Result<Series, LoadError> {
    let result = match source.historical(symbol.clone(), window).await {
        Ok(payload) => series_from_bars(&payload.data, labels),
        Err(error) => Err(error),
    };
    if let Err(error) = &result {
        warn!(
            symbol = %symbol,
            start = %window.start_param(),
            end = %window.end_param(),
            code = error.code(),
            "history load failed: {}",
            error.message()
        );
    }
    result
}

/// Convert bars in order; the first bad bar rejects the lot.
pub fn series_from_bars(bars: &[HistoricalBar], labels: &LabelFormatter) -> Result<Series, LoadError> {
    let mut series = Series::with_capacity(bars.len());
    for (index, bar) in bars.iter().enumerate() {
        let date = bar
            .date
            .ok_or_else(|| LoadError::data_unavailable(format!("bar {index} has no date")))?;
        let close = bar
            .close
            .ok_or_else(|| LoadError::data_unavailable(format!("bar {index} has no close")))?;
        let point = PricePoint::new(date, close)
            .map_err(|e| LoadError::data_unavailable(format!("bar {index}: {e}")))?;
        series.push(point, labels.label(Cadence::DailyBar, date));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoadErrorKind;

    fn symbol() -> Symbol {
        Symbol::parse("INFY.NS").expect("symbol")
    }

    fn at(input: &str) -> UtcDateTime {
        UtcDateTime::parse(input).expect("timestamp")
    }

    #[test]
    fn snapshot_seeds_one_point_at_market_time() {
        let payload: SnapshotPayload = serde_json::from_str(
            r#"{"price":{"regularMarketPrice":1520.4,"marketCap":63000000000,
                "regularMarketTime":"2024-05-02T10:00:00Z"}}"#,
        )
        .expect("payload");

        let seed = seed_from_payload(
            &symbol(),
            payload,
            &LabelFormatter::default(),
            at("2024-05-02T12:00:00Z"),
        )
        .expect("seed");

        assert_eq!(seed.series.len(), 1);
        assert_eq!(seed.series.labels(), ["2024-05-02 10:00:00"]);
        assert_eq!(seed.quote.price, 1520.4);
        assert_eq!(seed.quote.market_cap_display().as_deref(), Some("63.00 Billion ₹"));
    }

    #[test]
    fn missing_market_time_falls_back_to_fetch_time() {
        let payload: SnapshotPayload =
            serde_json::from_str(r#"{"price":{"regularMarketPrice":10}}"#).expect("payload");
        let fetched_at = at("2024-05-02T12:00:00Z");

        let seed = seed_from_payload(&symbol(), payload, &LabelFormatter::default(), fetched_at)
            .expect("seed");
        assert_eq!(seed.quote.market_time, fetched_at);
    }

    #[test]
    fn missing_price_fields_are_data_unavailable() {
        for body in [r#"{}"#, r#"{"price":{"regularMarketOpen":10}}"#] {
            let payload: SnapshotPayload = serde_json::from_str(body).expect("payload");
            let err = seed_from_payload(
                &symbol(),
                payload,
                &LabelFormatter::default(),
                UtcDateTime::now(),
            )
            .expect_err("must fail");
            assert_eq!(err.kind(), LoadErrorKind::DataUnavailable, "body {body}");
        }
    }

    #[test]
    fn bars_keep_order_and_use_date_labels() {
        let bars = vec![
            HistoricalBar {
                date: Some(at("2024-05-03")),
                close: Some(11.0),
            },
            HistoricalBar {
                date: Some(at("2024-05-02")),
                close: Some(10.0),
            },
        ];

        let series = series_from_bars(&bars, &LabelFormatter::default()).expect("series");
        assert_eq!(series.prices(), vec![11.0, 10.0]);
        assert_eq!(series.labels(), ["2024-05-03", "2024-05-02"]);
    }

    #[test]
    fn one_bad_bar_rejects_the_whole_response() {
        let bars = vec![
            HistoricalBar {
                date: Some(at("2024-05-02")),
                close: Some(10.0),
            },
            HistoricalBar {
                date: Some(at("2024-05-03")),
                close: None,
            },
        ];

        let err = series_from_bars(&bars, &LabelFormatter::default()).expect_err("must fail");
        assert_eq!(err.kind(), LoadErrorKind::DataUnavailable);
    }
}
