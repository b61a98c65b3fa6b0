//! Lifecycle glue: wires player notifications, the transport and the
//! command interpreter into one event loop.

use crate::command::CommandInterpreter;
use crate::emitter::StateEmitter;
use crate::transport::{ReconnectPolicy, Transport, WireConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};
use wnp_core::notify::{NotificationHub, PlayerEvent, SubscriptionId};
use wnp_core::playback::PlaybackControl;

/// Settle time between handling an inbound command and re-reading the
/// player state for the follow-up emission.
const EMIT_DEBOUNCE: Duration = Duration::from_millis(100);

/// The bridge task. Owns all mutable bridge state; everything runs on
/// one logical execution context inside [`Bridge::run`].
pub struct Bridge<C: WireConnector> {
    transport: Transport<C>,
    emitter: StateEmitter,
    interpreter: CommandInterpreter,
    hub: Arc<NotificationHub>,
    events_rx: mpsc::UnboundedReceiver<PlayerEvent>,
    subscriptions: Vec<SubscriptionId>,
}

impl<C: WireConnector> Bridge<C> {
    /// Registers all notification handlers. The first connection attempt
    /// happens inside [`run`], after registration, exactly once.
    pub fn new(
        connector: C,
        policy: ReconnectPolicy,
        player: Arc<dyn PlaybackControl>,
        hub: Arc<NotificationHub>,
        player_name: impl Into<String>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let subscriptions = PlayerEvent::ALL
            .into_iter()
            .map(|event| {
                let events_tx = events_tx.clone();
                hub.subscribe(event, move || {
                    // Receiver side may already be gone during teardown.
                    let _ = events_tx.send(event);
                })
            })
            .collect();

        Self {
            transport: Transport::new(connector, policy),
            emitter: StateEmitter::new(player.clone(), player_name),
            interpreter: CommandInterpreter::new(player),
            hub,
            events_rx,
            subscriptions,
        }
    }

    /// Boolean connection status for external consumers (true iff
    /// connected).
    pub fn status_receiver(&self) -> watch::Receiver<bool> {
        self.transport.status_receiver()
    }

    /// Runs the bridge until the player unloads. Every failure mode is
    /// contained inside the loop; this only returns on deliberate
    /// teardown.
    pub async fn run(mut self) {
        if self.transport.connect().await {
            self.emitter.emit(&mut self.transport).await;
        }

        let mut emit_at: Option<Instant> = None;
        loop {
            let connected = self.transport.is_connected();
            let reconnect_at = self.transport.reconnect_due_at();
            tokio::select! {
                message = self.transport.recv(), if connected => {
                    if let Some(message) = message {
                        self.interpreter.handle(&message);
                        emit_at = Some(Instant::now() + EMIT_DEBOUNCE);
                    }
                }
                _ = sleep_until(reconnect_at.unwrap_or_else(Instant::now)),
                    if reconnect_at.is_some() =>
                {
                    if self.transport.connect().await {
                        self.emitter.emit(&mut self.transport).await;
                    }
                }
                _ = sleep_until(emit_at.unwrap_or_else(Instant::now)), if emit_at.is_some() => {
                    emit_at = None;
                    self.emitter.emit(&mut self.transport).await;
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(PlayerEvent::Unload) | None => {
                            info!("player unloading, closing bridge");
                            self.transport.close().await;
                            break;
                        }
                        Some(event) => {
                            debug!(?event, "player notification");
                            self.emitter.emit(&mut self.transport).await;
                        }
                    }
                }
            }
        }

        for id in self.subscriptions.drain(..) {
            self.hub.unsubscribe(id);
        }
    }
}
