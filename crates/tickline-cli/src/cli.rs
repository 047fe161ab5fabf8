//! CLI argument definitions for Tickline.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `watch` | Follow a symbol live and print every view as NDJSON |
//! | `quote` | Fetch one quote snapshot |
//! | `history` | Fetch a historical range, optionally with an overlay |
//! | `suggest` | Ticker suggestions for a prefix |
//! | `predict` | Submit a price prediction request |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-url` | `TICKLINE_API_URL` or `http://localhost:4000` | REST backend |
//! | `--stream-url` | `TICKLINE_STREAM_URL` or `ws://localhost:4000/stocks` | Tick stream |
//! | `--timeout-ms` | none | Request timeout in ms (0 disables) |
//! | `--label-offset` | `+00:00` | Display offset for date-time labels |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! tickline quote RELIANCE.NS --pretty
//! tickline history AAPL --range 1m --indicator ema --period 10
//! tickline watch AAPL --indicator ma --updates 20
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickline_core::{HistoricalRange, IndicatorKind, Timeframe};

/// Tickline - live market series from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "tickline",
    author,
    version,
    about = "Live market series engine CLI",
    long_about = "Tickline seeds a price series from a quote snapshot, backfills it from \
daily history, extends it with streamed ticks and overlays moving averages.\n\
\n\
Logs go to stderr (filter with RUST_LOG); results go to stdout as JSON."
)]
pub struct Cli {
    /// Base URL of the REST market backend.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// WebSocket URL of the all-symbol tick stream.
    #[arg(long, global = true)]
    pub stream_url: Option<String>,

    /// Request timeout in milliseconds; 0 disables it.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// UTC offset for snapshot and tick labels, e.g. +05:30.
    #[arg(long, global = true)]
    pub label_offset: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow a symbol: seed, optionally backfill, then stream ticks.
    ///
    /// # Examples
    ///
    ///   tickline watch AAPL
    ///   tickline watch INFY.NS --history --range 1w --indicator ema
    Watch(WatchArgs),

    /// Fetch the current quote snapshot.
    ///
    /// # Examples
    ///
    ///   tickline quote AAPL --pretty
    Quote(QuoteArgs),

    /// Fetch daily closes for a range.
    ///
    /// # Examples
    ///
    ///   tickline history AAPL --range 1y --indicator ma --period 20
    History(HistoryArgs),

    /// Ticker suggestions for a prefix.
    ///
    /// # Examples
    ///
    ///   tickline suggest REL
    Suggest(SuggestArgs),

    /// Submit a price prediction request.
    ///
    /// # Examples
    ///
    ///   tickline predict --ticker TCS.NS --start 2024-01-01 --end 2024-06-30 --timeframe short-term
    Predict(PredictArgs),
}

/// Range selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    #[value(name = "1d")]
    OneDay,
    #[value(name = "1w")]
    OneWeek,
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "1y")]
    OneYear,
}

impl From<RangeArg> for HistoricalRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::OneDay => Self::OneDay,
            RangeArg::OneWeek => Self::OneWeek,
            RangeArg::OneMonth => Self::OneMonth,
            RangeArg::OneYear => Self::OneYear,
        }
    }
}

/// Overlay indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndicatorArg {
    None,
    Ma,
    Ema,
}

impl From<IndicatorArg> for IndicatorKind {
    fn from(value: IndicatorArg) -> Self {
        match value {
            IndicatorArg::None => Self::None,
            IndicatorArg::Ma => Self::SimpleMovingAverage,
            IndicatorArg::Ema => Self::ExponentialMovingAverage,
        }
    }
}

/// Prediction horizon values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeframeArg {
    ShortTerm,
    LongTerm,
}

impl From<TimeframeArg> for Timeframe {
    fn from(value: TimeframeArg) -> Self {
        match value {
            TimeframeArg::ShortTerm => Self::ShortTerm,
            TimeframeArg::LongTerm => Self::LongTerm,
        }
    }
}

/// Overlay flags shared by `watch` and `history`.
#[derive(Debug, Args)]
pub struct OverlayArgs {
    /// Overlay indicator.
    #[arg(long, value_enum, default_value_t = IndicatorArg::None)]
    pub indicator: IndicatorArg,

    /// Indicator period; defaults to TICKLINE_INDICATOR_PERIOD or 5.
    #[arg(long)]
    pub period: Option<usize>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Market symbol, passed through verbatim.
    pub symbol: String,

    #[command(flatten)]
    pub overlay: OverlayArgs,

    /// Historical range used by --history.
    #[arg(long, value_enum, default_value_t = RangeArg::OneDay)]
    pub range: RangeArg,

    /// Backfill the selected range once the quote has loaded.
    #[arg(long, default_value_t = false)]
    pub history: bool,

    /// Stop after this many published views; runs until Ctrl-C if omitted.
    #[arg(long)]
    pub updates: Option<usize>,
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Market symbol, passed through verbatim.
    pub symbol: String,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Market symbol, passed through verbatim.
    pub symbol: String,

    /// Window ending today.
    #[arg(long, value_enum, default_value_t = RangeArg::OneDay)]
    pub range: RangeArg,

    #[command(flatten)]
    pub overlay: OverlayArgs,
}

/// Arguments for the `suggest` command.
#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Ticker prefix; an empty prefix returns an empty list.
    #[arg(default_value = "")]
    pub prefix: String,
}

/// Arguments for the `predict` command.
#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long)]
    pub ticker: String,

    /// First day of the training window (YYYY-MM-DD).
    #[arg(long)]
    pub start: String,

    /// Last day of the training window (YYYY-MM-DD).
    #[arg(long)]
    pub end: String,

    #[arg(long, value_enum)]
    pub timeframe: TimeframeArg,

    /// Risk tolerance in percent.
    #[arg(long = "risk")]
    pub risk_percentage: Option<f64>,
}
