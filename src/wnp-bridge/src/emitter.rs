//! On-demand state emission.

use crate::frame::NowPlayingSnapshot;
use crate::transport::{Transport, WireConnector};
use std::sync::Arc;
use tracing::{debug, warn};
use wnp_core::playback::PlaybackControl;

/// Reads the live player state and pushes one frame per call.
///
/// Emission is fire and forget: nothing here returns an error, because a
/// failed emission must never take down the listeners that triggered it.
pub struct StateEmitter {
    player: Arc<dyn PlaybackControl>,
    player_name: String,
}

impl StateEmitter {
    pub fn new(player: Arc<dyn PlaybackControl>, player_name: impl Into<String>) -> Self {
        Self {
            player,
            player_name: player_name.into(),
        }
    }

    pub async fn emit<C: WireConnector>(&self, transport: &mut Transport<C>) {
        if !transport.is_connected() {
            warn!("skipping emission: not connected");
            return;
        }
        match NowPlayingSnapshot::capture(self.player.as_ref(), &self.player_name) {
            Some(snapshot) => transport.send(&snapshot.to_frame()).await,
            None => debug!("skipping emission: no track loaded"),
        }
    }
}
