//! Live tick subscription.
//!
//! A [`TickFeed`] opens the all-symbol stream and hands back a [`TickStream`];
//! [`LiveSubscription`] binds at most one such stream to the selected symbol
//! and filters everything else out. Closing (or dropping) a stream stops its
//! reader and discards the channel, so nothing queued for a previous symbol
//! can surface after a symbol change.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::{LoadError, PricePoint, Symbol, UtcDateTime};

/// One decoded stream message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub timestamp: UtcDateTime,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: UtcDateTime) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }

    /// Decode a text frame. Frames with a non-finite price are rejected.
    pub fn decode(text: &str) -> Result<Self, LoadError> {
        let tick: Self = serde_json::from_str(text)
            .map_err(|e| LoadError::data_unavailable(format!("undecodable tick: {e}")))?;
        if !tick.price.is_finite() {
            return Err(LoadError::data_unavailable(format!(
                "tick for '{}' has a non-finite price",
                tick.symbol
            )));
        }
        Ok(tick)
    }

    pub fn point(&self) -> Result<PricePoint, LoadError> {
        PricePoint::new(self.timestamp, self.price)
            .map_err(|e| LoadError::data_unavailable(e.to_string()))
    }
}

/// Receiving half of one open stream connection.
pub struct TickStream {
    receiver: mpsc::UnboundedReceiver<Tick>,
    shutdown: Option<oneshot::Sender<()>>,
    reader: Option<JoinHandle<()>>,
}

impl TickStream {
    /// Stream with no background reader, fed directly through `receiver`.
    pub fn from_receiver(receiver: mpsc::UnboundedReceiver<Tick>) -> Self {
        Self {
            receiver,
            shutdown: None,
            reader: None,
        }
    }

    /// Stream backed by a reader task that exits once `shutdown` fires.
    pub fn with_reader(
        receiver: mpsc::UnboundedReceiver<Tick>,
        shutdown: oneshot::Sender<()>,
        reader: JoinHandle<()>,
    ) -> Self {
        Self {
            receiver,
            shutdown: Some(shutdown),
            reader: Some(reader),
        }
    }

    /// Next tick, or `None` once the connection has ended.
    pub async fn recv(&mut self) -> Option<Tick> {
        self.receiver.recv().await
    }

    fn release(&mut self) {
        self.receiver.close();
        if let Some(shutdown) = self.shutdown.take() {
            if shutdown.send(()).is_err() {
                debug!("tick reader already stopped");
            }
        }
        self.reader.take();
    }
}

impl Drop for TickStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Source of all-symbol tick streams.
pub trait TickFeed: Send + Sync {
    fn connect<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<TickStream, LoadError>> + Send + 'a>>;
}

struct ActiveStream {
    symbol: Symbol,
    stream: TickStream,
    delivered: u64,
    discarded: u64,
}

/// At most one open stream, bound to the current symbol.
pub struct LiveSubscription {
    feed: Arc<dyn TickFeed>,
    active: Option<ActiveStream>,
}

impl LiveSubscription {
    pub fn new(feed: Arc<dyn TickFeed>) -> Self {
        Self { feed, active: None }
    }

    /// Close any open stream, then connect and bind to `symbol`.
    ///
    /// # Errors
    ///
    /// Returns the feed's [`LoadError`] when the connection cannot be opened;
    /// the subscription is left closed in that case.
    pub async fn open(&mut self, symbol: Symbol) -> Result<(), LoadError> {
        self.close();
        let stream = self.feed.connect().await?;
        info!(symbol = %symbol, "live stream opened");
        self.active = Some(ActiveStream {
            symbol,
            stream,
            delivered: 0,
            discarded: 0,
        });
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            info!(
                symbol = %active.symbol,
                delivered = active.delivered,
                discarded = active.discarded,
                "live stream closed"
            );
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.active.as_ref().map(|active| &active.symbol)
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Next tick for the bound symbol, in arrival order.
    ///
    /// Pends forever while closed. Returns `None` exactly once when the
    /// underlying connection ends, after which the subscription is closed.
    /// Cancel-safe: dropping the future loses no matching tick.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        let Some(active) = self.active.as_mut() else {
            return std::future::pending().await;
        };

        loop {
            match active.stream.recv().await {
                Some(tick) if active.symbol.matches(&tick.symbol) => {
                    active.delivered += 1;
                    return Some(tick);
                }
                Some(tick) => {
                    active.discarded += 1;
                    trace!(symbol = %tick.symbol, "discarding tick for another symbol");
                }
                None => break,
            }
        }

        warn!("live stream ended");
        self.close();
        None
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
