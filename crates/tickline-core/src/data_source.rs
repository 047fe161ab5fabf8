//! Market backend contract and its wire payloads.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Payload | Description |
//! |----------|--------|---------|-------------|
//! | `/stock/{symbol}` | [`snapshot`](MarketDataSource::snapshot) | [`SnapshotPayload`] | Current quote |
//! | `/historical/{symbol}` | [`historical`](MarketDataSource::historical) | [`HistoricalPayload`] | Daily closes in a date window |
//! | `/suggestions/{prefix}` | [`suggestions`](MarketDataSource::suggestions) | `Vec<String>` | Ticker autocomplete |
//!
//! Payloads mirror the backend JSON and keep every field optional; mapping to
//! domain types (and deciding which missing fields are fatal) happens in
//! [`loaders`](crate::loaders).

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateWindow, LoadError, Symbol, UtcDateTime};

/// `GET /stock/{symbol}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub price: Option<PriceFields>,
}

/// The `price` object of a snapshot response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFields {
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    #[serde(default)]
    pub regular_market_open: Option<f64>,
    #[serde(default)]
    pub regular_market_day_high: Option<f64>,
    #[serde(default)]
    pub regular_market_day_low: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub regular_market_time: Option<UtcDateTime>,
}

/// `GET /historical/{symbol}` response. `data` is required; an explicit
/// empty array is a valid empty window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPayload {
    pub data: Vec<HistoricalBar>,
}

/// One daily bar; only the date and close are consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    #[serde(default)]
    pub date: Option<UtcDateTime>,
    #[serde(default)]
    pub close: Option<f64>,
}

/// Request/response market backend.
///
/// Implementations perform exactly one upstream call per invocation and never
/// retry; a failed attempt is reported to the caller as-is.
pub trait MarketDataSource: Send + Sync {
    /// Fetches the current quote for `symbol`.
    ///
    /// # Errors
    ///
    /// [`LoadErrorKind::Network`](crate::LoadErrorKind::Network) on transport
    /// failure or non-success status,
    /// [`LoadErrorKind::DataUnavailable`](crate::LoadErrorKind::DataUnavailable)
    /// when the body cannot be decoded.
    fn snapshot<'a>(
        &'a self,
        symbol: Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotPayload, LoadError>> + Send + 'a>>;

    /// Fetches every bar between `window.start` and `window.end`.
    ///
    /// # Errors
    ///
    /// Same classification as [`snapshot`](MarketDataSource::snapshot).
    fn historical<'a>(
        &'a self,
        symbol: Symbol,
        window: DateWindow,
    ) -> Pin<Box<dyn Future<Output = Result<HistoricalPayload, LoadError>> + Send + 'a>>;

    /// Ticker suggestions for a text prefix. A blank prefix yields an empty
    /// list without contacting the backend.
    fn suggestions<'a>(
        &'a self,
        prefix: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, LoadError>> + Send + 'a>>;
}
