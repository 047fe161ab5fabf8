//! Series view composer.
//!
//! [`SeriesComposer`] owns the active series, quote, indicator selection and
//! range. It never performs I/O itself: every [`EngineEvent`] is reduced
//! synchronously and may yield [`Effect`]s for the driver to execute, whose
//! completions come back as further events tagged with a [`RequestId`].
//!
//! | State | Entered on | Leaves on |
//! |-------|------------|-----------|
//! | `Idle` | start, or a failed first seed | symbol selected |
//! | `Seeding` | symbol selected | snapshot completion |
//! | `Live` | seed or history completion | symbol selected, history requested |
//! | `Replacing` | history requested | history completion, symbol selected |
//!
//! The overlay is not stored; [`SeriesComposer::view`] recomputes it from the
//! current base series every time.

use serde::Serialize;
use tracing::{debug, trace};

use crate::loaders::SnapshotSeed;
use crate::stream::Tick;
use crate::{
    Cadence, DateWindow, HistoricalRange, IndicatorKind, IndicatorSelection, LabelFormatter,
    LoadError, PricePoint, Quote, Series, Symbol, UtcDateTime,
};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Idle,
    Seeding,
    Live,
    Replacing,
}

/// Correlates an asynchronous load with the event reporting its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Inputs to the composer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    SymbolSelected(Symbol),
    RangeSelected(HistoricalRange),
    /// Backfill the selected range, computing the window from `as_of`.
    HistoryRequested { as_of: UtcDateTime },
    IndicatorSelected(IndicatorSelection),
    SnapshotLoaded {
        request: RequestId,
        result: Result<SnapshotSeed, LoadError>,
    },
    HistoryLoaded {
        request: RequestId,
        result: Result<Series, LoadError>,
    },
    TickReceived(Tick),
    /// The stream failed to open or ended; no reconnection follows.
    StreamClosed,
}

/// Side effects requested by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchSnapshot {
        request: RequestId,
        symbol: Symbol,
    },
    FetchHistory {
        request: RequestId,
        symbol: Symbol,
        window: DateWindow,
    },
    OpenStream(Symbol),
    CloseStream,
}

/// User-visible error attached to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: String,
    pub message: String,
}

impl Notice {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&LoadError> for Notice {
    fn from(error: &LoadError) -> Self {
        Self::new(error.code(), error.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesOrigin {
    Snapshot,
    Historical,
}

/// Derived overlay as rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub kind: IndicatorKind,
    pub period: usize,
    pub caption: String,
    pub values: Vec<f64>,
}

/// Quote fields as rendered, including the formatted market cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteView {
    pub price: f64,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_display: Option<String>,
    pub market_time: UtcDateTime,
}

impl From<&Quote> for QuoteView {
    fn from(quote: &Quote) -> Self {
        Self {
            price: quote.price,
            open: quote.open,
            day_high: quote.day_high,
            day_low: quote.day_low,
            market_cap: quote.market_cap,
            market_cap_display: quote.market_cap_display(),
            market_time: quote.market_time,
        }
    }
}

/// Render-ready projection of the composer state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    pub symbol: Option<Symbol>,
    pub pending_symbol: Option<Symbol>,
    pub state: EngineState,
    pub streaming: bool,
    pub range: HistoricalRange,
    pub caption: Option<String>,
    pub labels: Vec<String>,
    pub base_points: Vec<PricePoint>,
    pub overlay: Option<OverlayView>,
    pub quote: Option<QuoteView>,
    pub notice: Option<Notice>,
}

/// Single owner of the displayed series.
#[derive(Debug, Clone)]
pub struct SeriesComposer {
    labels: LabelFormatter,
    state: EngineState,
    symbol: Option<Symbol>,
    pending_symbol: Option<Symbol>,
    series: Series,
    origin: SeriesOrigin,
    quote: Option<Quote>,
    indicator: IndicatorSelection,
    range: HistoricalRange,
    notice: Option<Notice>,
    streaming: bool,
    next_request: u64,
    pending_snapshot: Option<RequestId>,
    pending_history: Option<RequestId>,
}

impl Default for SeriesComposer {
    fn default() -> Self {
        Self::new(LabelFormatter::default())
    }
}

impl SeriesComposer {
    pub fn new(labels: LabelFormatter) -> Self {
        Self {
            labels,
            state: EngineState::Idle,
            symbol: None,
            pending_symbol: None,
            series: Series::new(),
            origin: SeriesOrigin::Snapshot,
            quote: None,
            indicator: IndicatorSelection::none(),
            range: HistoricalRange::default(),
            notice: None,
            streaming: false,
            next_request: 0,
            pending_snapshot: None,
            pending_history: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn indicator(&self) -> IndicatorSelection {
        self.indicator
    }

    pub fn range(&self) -> HistoricalRange {
        self.range
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Reduce one event, returning the effects the driver must run in order.
    pub fn apply(&mut self, event: EngineEvent) -> Vec<Effect> {
        match event {
            EngineEvent::SymbolSelected(symbol) => self.select_symbol(symbol),
            EngineEvent::RangeSelected(range) => {
                self.range = range;
                Vec::new()
            }
            EngineEvent::HistoryRequested { as_of } => self.request_history(as_of),
            EngineEvent::IndicatorSelected(selection) => {
                self.indicator = selection;
                Vec::new()
            }
            EngineEvent::SnapshotLoaded { request, result } => {
                self.complete_snapshot(request, result)
            }
            EngineEvent::HistoryLoaded { request, result } => {
                self.complete_history(request, result);
                Vec::new()
            }
            EngineEvent::TickReceived(tick) => {
                self.append_tick(tick);
                Vec::new()
            }
            EngineEvent::StreamClosed => {
                self.streaming = false;
                Vec::new()
            }
        }
    }

    fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn select_symbol(&mut self, symbol: Symbol) -> Vec<Effect> {
        let request = self.issue_request();
        self.pending_snapshot = Some(request);
        self.pending_history = None;
        self.pending_symbol = Some(symbol.clone());
        self.state = EngineState::Seeding;
        self.streaming = false;
        self.notice = None;

        vec![
            Effect::CloseStream,
            Effect::FetchSnapshot { request, symbol },
        ]
    }

    fn request_history(&mut self, as_of: UtcDateTime) -> Vec<Effect> {
        let symbol = match (self.state, &self.symbol) {
            (EngineState::Live | EngineState::Replacing, Some(symbol)) => symbol.clone(),
            _ => {
                self.notice = Some(Notice::new(
                    "engine.not_ready",
                    "select a symbol and wait for its quote before loading history",
                ));
                return Vec::new();
            }
        };

        let request = self.issue_request();
        let window = self.range.window_ending_at(as_of);
        self.pending_history = Some(request);
        self.state = EngineState::Replacing;

        vec![Effect::FetchHistory {
            request,
            symbol,
            window,
        }]
    }

    fn complete_snapshot(
        &mut self,
        request: RequestId,
        result: Result<SnapshotSeed, LoadError>,
    ) -> Vec<Effect> {
        if self.pending_snapshot != Some(request) {
            debug!(request = request.get(), "ignoring superseded snapshot");
            return Vec::new();
        }
        self.pending_snapshot = None;
        let requested = self.pending_symbol.take();

        match (result, requested) {
            (Ok(seed), Some(symbol)) => {
                self.series = seed.series;
                self.origin = SeriesOrigin::Snapshot;
                self.quote = Some(seed.quote);
                self.indicator = IndicatorSelection::none();
                self.notice = None;
                self.symbol = Some(symbol.clone());
                self.state = EngineState::Live;
                self.streaming = true;
                vec![Effect::OpenStream(symbol)]
            }
            (result, _) => {
                if let Err(error) = &result {
                    self.notice = Some(Notice::from(error));
                }
                self.restore_previous_symbol()
            }
        }
    }

    fn restore_previous_symbol(&mut self) -> Vec<Effect> {
        match &self.symbol {
            Some(previous) => {
                self.state = EngineState::Live;
                self.streaming = true;
                vec![Effect::OpenStream(previous.clone())]
            }
            None => {
                self.state = EngineState::Idle;
                Vec::new()
            }
        }
    }

    fn complete_history(&mut self, request: RequestId, result: Result<Series, LoadError>) {
        if self.pending_history != Some(request) {
            debug!(request = request.get(), "ignoring superseded history");
            return;
        }
        self.pending_history = None;
        self.state = EngineState::Live;

        match result {
            Ok(series) => {
                self.series = series;
                self.origin = SeriesOrigin::Historical;
                self.notice = None;
            }
            Err(error) => self.notice = Some(Notice::from(&error)),
        }
    }

    fn append_tick(&mut self, tick: Tick) {
        if !matches!(self.state, EngineState::Live | EngineState::Replacing) {
            trace!(symbol = %tick.symbol, "dropping tick while not live");
            return;
        }
        let Some(symbol) = &self.symbol else {
            return;
        };
        if !symbol.matches(&tick.symbol) {
            trace!(symbol = %tick.symbol, "dropping tick for another symbol");
            return;
        }

        match tick.point() {
            Ok(point) => {
                let label = self.labels.label(Cadence::Tick, point.timestamp);
                self.series.push(point, label);
            }
            Err(error) => debug!(error = %error, "dropping malformed tick"),
        }
    }

    fn caption(&self) -> Option<String> {
        let symbol = self.symbol.as_ref()?;
        Some(match self.origin {
            SeriesOrigin::Snapshot => format!("{symbol} Stock Price"),
            SeriesOrigin::Historical => format!("{symbol} Historical Stock Prices"),
        })
    }

    fn overlay(&self) -> Option<OverlayView> {
        let values = self.indicator.apply(&self.series.prices())?;
        let legend = self.indicator.kind().legend();
        let caption = match &self.symbol {
            Some(symbol) => format!("{symbol} {legend}"),
            None => legend.to_owned(),
        };
        Some(OverlayView {
            kind: self.indicator.kind(),
            period: self.indicator.period(),
            caption,
            values,
        })
    }

    /// Rebuild the view model from owned state.
    pub fn view(&self) -> ViewModel {
        ViewModel {
            symbol: self.symbol.clone(),
            pending_symbol: self.pending_symbol.clone(),
            state: self.state,
            streaming: self.streaming,
            range: self.range,
            caption: self.caption(),
            labels: self.series.labels().to_vec(),
            base_points: self.series.points().to_vec(),
            overlay: self.overlay(),
            quote: self.quote.as_ref().map(QuoteView::from),
            notice: self.notice.clone(),
        }
    }
}
