//! WebSocket implementation of the wire traits.

use crate::transport::{TransportError, WireConnector, WireSocket};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;

/// Dials the WebNowPlaying listener, e.g. `ws://127.0.0.1:8974`.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl WireConnector for WsConnector {
    type Socket = WsSocket;

    async fn connect(&self) -> Result<WsSocket, TransportError> {
        let (stream, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|err| TransportError::Connect {
                    url: self.url.clone(),
                    message: err.to_string(),
                })?;
        Ok(WsSocket { stream })
    }
}

pub struct WsSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl WireSocket for WsSocket {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(payload))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // pongs are produced by tungstenite itself; nothing else
                // on this wire carries commands
                Ok(other) => trace!(message = ?other, "ignoring non-text message"),
                Err(err) => return Some(Err(TransportError::Recv(err.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
