//! Connection lifecycle for the WebNowPlaying socket.
//!
//! The transport owns the socket handle, the connection state machine and
//! the reconnect backoff counters. Nothing outside this module mutates
//! them; other components only ask `is_connected` and hand over payloads.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use wnp_core::config::ReconnectConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("failed to send frame: {0}")]
    Send(String),
    #[error("failed to receive message: {0}")]
    Recv(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Exponential backoff bookkeeping for reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
    max_attempts: u32,
    base_delay: Duration,
    backoff_factor: f64,
}

impl ReconnectPolicy {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            attempts: 0,
            max_attempts: config.max_attempts,
            base_delay: config.base_delay(),
            backoff_factor: config.backoff_factor,
        }
    }

    /// Delay before the next attempt, or `None` once the policy is
    /// exhausted. Each call counts as one attempt.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        let delay = self
            .base_delay
            .mul_f64(self.backoff_factor.powi(self.attempts as i32));
        self.attempts += 1;
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(&ReconnectConfig::default())
    }
}

/// One established socket to the listener.
#[async_trait]
pub trait WireSocket: Send {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError>;
    /// Next inbound text message; `None` once the peer closed.
    async fn next_message(&mut self) -> Option<Result<String, TransportError>>;
    async fn close(&mut self);
}

/// Factory for sockets; the production implementation dials the
/// WebSocket endpoint, tests substitute an in-memory pair.
#[async_trait]
pub trait WireConnector: Send + Sync {
    type Socket: WireSocket;

    async fn connect(&self) -> Result<Self::Socket, TransportError>;
}

pub struct Transport<C: WireConnector> {
    connector: C,
    state: ConnectionState,
    socket: Option<C::Socket>,
    policy: ReconnectPolicy,
    reconnect_at: Option<Instant>,
    status_tx: watch::Sender<bool>,
}

impl<C: WireConnector> Transport<C> {
    pub fn new(connector: C, policy: ReconnectPolicy) -> Self {
        let (status_tx, _) = watch::channel(false);
        Self {
            connector,
            state: ConnectionState::Disconnected,
            socket: None,
            policy,
            reconnect_at: None,
            status_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Boolean connection status for consumers outside the bridge core.
    pub fn status_receiver(&self) -> watch::Receiver<bool> {
        self.status_tx.subscribe()
    }

    /// Deadline of the pending reconnect attempt, if one is armed.
    pub fn reconnect_due_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Attempts to establish the socket. No-op unless currently
    /// Disconnected, so racing callers cannot double-dial. Returns true
    /// when this call produced a fresh connection.
    pub async fn connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            debug!(state = ?self.state, "connect skipped");
            return false;
        }
        self.reconnect_at = None;
        self.state = ConnectionState::Connecting;

        match self.connector.connect().await {
            Ok(socket) => {
                self.socket = Some(socket);
                self.state = ConnectionState::Connected;
                self.policy.reset();
                let _ = self.status_tx.send(true);
                info!("connected to WebNowPlaying listener");
                true
            }
            Err(err) => {
                warn!(error = %err, "connection attempt failed");
                self.state = ConnectionState::Disconnected;
                let _ = self.status_tx.send(false);
                self.schedule_reconnect();
                false
            }
        }
    }

    /// Arms a single deferred reconnect, or logs the terminal condition
    /// once the policy is exhausted.
    pub fn schedule_reconnect(&mut self) {
        match self.policy.next_delay() {
            Some(delay) => {
                info!(
                    attempt = self.policy.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "scheduling reconnect"
                );
                self.reconnect_at = Some(Instant::now() + delay);
            }
            None => {
                error!("reconnect attempts exhausted; reload the bridge to reconnect");
                self.reconnect_at = None;
            }
        }
    }

    /// Writes one payload as a single message. Dropped with a warning
    /// when not connected; a write failure counts as a lost connection.
    pub async fn send(&mut self, payload: &str) {
        if self.state != ConnectionState::Connected {
            warn!("dropping outbound frame: not connected");
            return;
        }
        let Some(socket) = self.socket.as_mut() else {
            warn!("dropping outbound frame: no socket");
            return;
        };
        if let Err(err) = socket.send_text(payload.to_string()).await {
            warn!(error = %err, "send failed, treating connection as lost");
            self.drop_connection();
        }
    }

    /// Next inbound message. Returns `None` when not connected or when
    /// the peer closed; a close transitions to Disconnected and arms the
    /// reconnect path.
    pub async fn recv(&mut self) -> Option<String> {
        let socket = self.socket.as_mut()?;
        match socket.next_message().await {
            Some(Ok(text)) => Some(text),
            Some(Err(err)) => {
                warn!(error = %err, "receive failed");
                self.drop_connection();
                None
            }
            None => {
                warn!("connection closed by peer");
                self.drop_connection();
                None
            }
        }
    }

    /// Deliberate shutdown: closes the socket, cancels any pending
    /// reconnect and stays Disconnected. Idempotent.
    pub async fn close(&mut self) {
        self.reconnect_at = None;
        if let Some(mut socket) = self.socket.take() {
            socket.close().await;
        }
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
            let _ = self.status_tx.send(false);
        }
    }

    fn drop_connection(&mut self) {
        self.socket = None;
        self.state = ConnectionState::Disconnected;
        let _ = self.status_tx.send(false);
        self.schedule_reconnect();
    }
}
