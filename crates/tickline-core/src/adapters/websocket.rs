use std::future::Future;
use std::pin::Pin;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::stream::{Tick, TickFeed, TickStream};
use crate::{ClientConfig, LoadError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// All-symbol WebSocket tick feed (`ws://localhost:4000/stocks` by default).
#[derive(Debug, Clone)]
pub struct WebSocketTickFeed {
    url: String,
}

impl WebSocketTickFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.stream_url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TickFeed for WebSocketTickFeed {
    fn connect<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<TickStream, LoadError>> + Send + 'a>> {
        Box::pin(async move {
            let (socket, _) = connect_async(self.url.as_str()).await.map_err(|e| {
                LoadError::network(format!("failed to connect to {}: {e}", self.url))
            })?;
            info!(url = %self.url, "websocket connected");

            let (tick_tx, tick_rx) = mpsc::unbounded_channel();
            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            let url = self.url.clone();
            let reader = tokio::spawn(async move {
                pump_frames(socket, tick_tx, shutdown_rx, url).await;
            });

            Ok(TickStream::with_reader(tick_rx, shutdown_tx, reader))
        })
    }
}

/// Forward decoded text frames until the socket ends, the receiver goes away,
/// or shutdown is requested.
async fn pump_frames(
    socket: Socket,
    tick_tx: mpsc::UnboundedSender<Tick>,
    mut shutdown_rx: oneshot::Receiver<()>,
    url: String,
) {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match Tick::decode(text.as_str()) {
                    Ok(tick) => {
                        if tick_tx.send(tick).is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!(error = %e, "skipping frame"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!(%url, "websocket closed by server");
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%url, error = %e, "websocket read failed");
                    return;
                }
            },
        }
    }

    if let Err(e) = write.close().await {
        debug!(%url, error = %e, "websocket close handshake failed");
    }
}
