//! # Tickline Core
//!
//! Live market series engine: seeds a price series from a quote snapshot,
//! backfills it from daily history, extends it with streamed ticks and
//! derives moving-average overlays for rendering.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, price points, series, quotes and ranges
//! - **Loaders** that turn one backend response into a quote or a series
//! - **Live subscription** bound to exactly one symbol at a time
//! - **Indicator calculator** for SMA and EMA overlays
//! - **Series composer**, a synchronous state machine producing view models
//! - **Session driver** running the composer on a tokio task
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | REST market source and WebSocket tick feed |
//! | [`composer`] | Engine states, events, effects and the view model |
//! | [`config`] | Endpoints, timeout, default period, label offset |
//! | [`data_source`] | Market backend trait and wire payloads |
//! | [`domain`] | Domain models (Symbol, Series, Quote, HistoricalRange) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`indicators`] | SMA / EMA computation |
//! | [`loaders`] | Snapshot and historical loaders |
//! | [`prediction`] | Prediction request and client |
//! | [`session`] | Async session driver and handle |
//! | [`stream`] | Ticks, tick feeds and the live subscription |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickline_core::{ClientConfig, MarketSession, RestMarketSource, Symbol, WebSocketTickFeed};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let (handle, _task) = MarketSession::spawn(
//!         Arc::new(RestMarketSource::new(config.clone())),
//!         Arc::new(WebSocketTickFeed::from_config(&config)),
//!         config.label_formatter(),
//!     );
//!
//!     handle.select_symbol(Symbol::parse("AAPL")?)?;
//!     let mut views = handle.views();
//!     while views.changed().await.is_ok() {
//!         let view = views.borrow_and_update().clone();
//!         println!("{} points", view.base_points.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐      commands       ┌──────────────────┐
//! │ SessionHandle   │────────────────────▶│ MarketSession    │
//! └─────────────────┘◀────────────────────└────────┬─────────┘
//!                        watch<ViewModel>          │ events / effects
//!                                                  ▼
//!                                         ┌──────────────────┐
//!                                         │ SeriesComposer   │
//!                                         └──────────────────┘
//!          ┌───────────────────────────────────────┴───────┐
//!          ▼                                               ▼
//! ┌─────────────────┐     ┌──────────────────┐   ┌──────────────────┐
//! │ Loaders         │────▶│ MarketDataSource │   │ LiveSubscription │
//! └─────────────────┘     │ (REST adapter)   │   │ (TickFeed / WS)  │
//!                         └──────────────────┘   └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Loads fail with a [`LoadError`] whose kind separates transport failures
//! from unusable payloads. The composer turns either into a notice on the
//! view model and keeps the previously displayed data:
//!
//! ```rust
//! use tickline_core::{LoadError, LoadErrorKind};
//!
//! fn describe(error: &LoadError) -> &'static str {
//!     match error.kind() {
//!         LoadErrorKind::Network => "backend unreachable",
//!         LoadErrorKind::DataUnavailable => "price data not available",
//!     }
//! }
//! ```

pub mod adapters;
pub mod composer;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod loaders;
pub mod prediction;
pub mod session;
pub mod stream;

// Adapter implementations
pub use adapters::{RestMarketSource, WebSocketTickFeed};

// Composer
pub use composer::{
    Effect, EngineEvent, EngineState, Notice, OverlayView, QuoteView, RequestId, SeriesComposer,
    ViewModel,
};

// Configuration
pub use config::ClientConfig;

// Data source trait and payloads
pub use data_source::{
    HistoricalBar, HistoricalPayload, MarketDataSource, PriceFields, SnapshotPayload,
};

// Domain models
pub use domain::{
    format_market_cap, parse_utc_offset, Cadence, DateWindow, HistoricalRange, LabelFormatter,
    PricePoint, Quote, Series, Symbol, UtcDateTime,
};

// Error types
pub use error::{CoreError, LoadError, LoadErrorKind, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Indicators
pub use indicators::{IndicatorKind, IndicatorSelection, DEFAULT_PERIOD};

// Loaders
pub use loaders::{load_history, load_snapshot, SnapshotSeed};

// Prediction
pub use prediction::{PredictionClient, PredictionRequest, PredictionResult, Timeframe};

// Session driver
pub use session::{MarketSession, SessionClosed, SessionCommand, SessionHandle};

// Live stream
pub use stream::{LiveSubscription, Tick, TickFeed, TickStream};
