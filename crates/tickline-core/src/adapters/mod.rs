//! Concrete backends: the REST market source and the WebSocket tick feed.

mod rest;
mod websocket;

pub use rest::RestMarketSource;
pub use websocket::WebSocketTickFeed;
