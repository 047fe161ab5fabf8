//! Async driver around [`SeriesComposer`].
//!
//! One task owns the composer, the live subscription and every in-flight
//! load. Commands arrive through a [`SessionHandle`]; each processed event
//! publishes a freshly built [`ViewModel`] on a `watch` channel.

use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::composer::{Effect, EngineEvent, SeriesComposer, ViewModel};
use crate::data_source::MarketDataSource;
use crate::loaders::{load_history, load_snapshot};
use crate::stream::{LiveSubscription, TickFeed};
use crate::{HistoricalRange, IndicatorSelection, LabelFormatter, Symbol, UtcDateTime};

/// Requests accepted by a running session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    SelectSymbol(Symbol),
    SelectRange(HistoricalRange),
    LoadHistory,
    SelectIndicator(IndicatorSelection),
    Shutdown,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("market session has stopped")]
pub struct SessionClosed;

/// Cloneable control surface for a [`MarketSession`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    views: watch::Receiver<ViewModel>,
}

impl SessionHandle {
    pub fn select_symbol(&self, symbol: Symbol) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SelectSymbol(symbol))
    }

    pub fn select_range(&self, range: HistoricalRange) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SelectRange(range))
    }

    pub fn load_history(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::LoadHistory)
    }

    pub fn select_indicator(&self, selection: IndicatorSelection) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SelectIndicator(selection))
    }

    pub fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Shutdown)
    }

    /// Receiver that observes every published view.
    pub fn views(&self) -> watch::Receiver<ViewModel> {
        self.views.clone()
    }

    pub fn current(&self) -> ViewModel {
        self.views.borrow().clone()
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.commands.send(command).map_err(|_| SessionClosed)
    }
}

pub struct MarketSession {
    source: Arc<dyn MarketDataSource>,
    live: LiveSubscription,
    composer: SeriesComposer,
    labels: LabelFormatter,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    loads: JoinSet<EngineEvent>,
    views: watch::Sender<ViewModel>,
}

impl MarketSession {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        feed: Arc<dyn TickFeed>,
        labels: LabelFormatter,
    ) -> (Self, SessionHandle) {
        let composer = SeriesComposer::new(labels);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(composer.view());

        let session = Self {
            source,
            live: LiveSubscription::new(feed),
            composer,
            labels,
            commands: command_rx,
            loads: JoinSet::new(),
            views: view_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
            views: view_rx,
        };
        (session, handle)
    }

    /// Build a session and run it on the current tokio runtime.
    pub fn spawn(
        source: Arc<dyn MarketDataSource>,
        feed: Arc<dyn TickFeed>,
        labels: LabelFormatter,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (session, handle) = Self::new(source, feed, labels);
        (handle, tokio::spawn(session.run()))
    }

    /// Process commands, load completions and ticks until shutdown or until
    /// every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => {
                        if let Some(event) = into_event(command) {
                            self.dispatch(event).await;
                        }
                    }
                },
                Some(joined) = self.loads.join_next(), if !self.loads.is_empty() => match joined {
                    Ok(event) => self.dispatch(event).await,
                    Err(e) => warn!(error = %e, "load task did not complete"),
                },
                tick = self.live.next_tick() => match tick {
                    Some(tick) => self.dispatch(EngineEvent::TickReceived(tick)).await,
                    None => self.dispatch(EngineEvent::StreamClosed).await,
                },
            }
        }

        self.loads.abort_all();
        self.live.close();
        info!("market session stopped");
    }

    async fn dispatch(&mut self, event: EngineEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for effect in self.composer.apply(event) {
                if let Some(followup) = self.run_effect(effect).await {
                    queue.push_back(followup);
                }
            }
        }
        self.views.send_replace(self.composer.view());
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<EngineEvent> {
        match effect {
            Effect::FetchSnapshot { request, symbol } => {
                debug!(symbol = %symbol, request = request.get(), "loading snapshot");
                let source = Arc::clone(&self.source);
                let labels = self.labels;
                self.loads.spawn(async move {
                    let result = load_snapshot(source.as_ref(), &symbol, &labels).await;
                    EngineEvent::SnapshotLoaded { request, result }
                });
                None
            }
            Effect::FetchHistory {
                request,
                symbol,
                window,
            } => {
                debug!(symbol = %symbol, request = request.get(), "loading history");
                let source = Arc::clone(&self.source);
                let labels = self.labels;
                self.loads.spawn(async move {
                    let result = load_history(source.as_ref(), &symbol, window, &labels).await;
                    EngineEvent::HistoryLoaded { request, result }
                });
                None
            }
            Effect::OpenStream(symbol) => match self.live.open(symbol).await {
                Ok(()) => None,
                Err(error) => {
                    warn!(code = error.code(), "live stream unavailable: {}", error.message());
                    Some(EngineEvent::StreamClosed)
                }
            },
            Effect::CloseStream => {
                self.live.close();
                None
            }
        }
    }
}

fn into_event(command: SessionCommand) -> Option<EngineEvent> {
    let event = match command {
        SessionCommand::SelectSymbol(symbol) => EngineEvent::SymbolSelected(symbol),
        SessionCommand::SelectRange(range) => EngineEvent::RangeSelected(range),
        SessionCommand::LoadHistory => EngineEvent::HistoryRequested {
            as_of: UtcDateTime::now(),
        },
        SessionCommand::SelectIndicator(selection) => EngineEvent::IndicatorSelected(selection),
        SessionCommand::Shutdown => return None,
    };
    Some(event)
}
