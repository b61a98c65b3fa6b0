//! WNP wire frame rendering.
//!
//! One frame is a newline-joined list of `KEY:VALUE` lines describing the
//! full player state. Key order and spelling are part of the wire contract;
//! a frame always carries every key, with placeholder values where the
//! player has nothing to report.

use wnp_core::playback::{PlaybackControl, RepeatMode};

/// Pixel size substituted for `{w}`/`{h}` artwork template placeholders.
pub const ARTWORK_SIZE: u32 = 500;

/// Full player state captured for one emission. Rebuilt from the live
/// player every time, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingSnapshot {
    pub player_name: String,
    pub is_playing: bool,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: String,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub volume_percent: u8,
    pub rating: i32,
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

impl NowPlayingSnapshot {
    /// Reads the player's current state. Returns `None` when no track is
    /// loaded; an empty player has nothing worth putting on the wire.
    pub fn capture(player: &dyn PlaybackControl, player_name: &str) -> Option<Self> {
        let track = player.current_track()?;
        Some(Self {
            player_name: player_name.to_string(),
            is_playing: player.is_playing(),
            title: track
                .title
                .unwrap_or_else(|| "Unknown Title".to_string()),
            artist: track
                .artist
                .unwrap_or_else(|| "Unknown Artist".to_string()),
            album: track
                .album
                .unwrap_or_else(|| "Unknown Album".to_string()),
            cover_url: track
                .artwork_url
                .map(|url| resolve_artwork(&url))
                .unwrap_or_default(),
            duration_ms: to_millis(track.duration_seconds),
            position_ms: to_millis(player.position_seconds()),
            volume_percent: to_percent(player.volume()),
            rating: track.rating,
            repeat: player.repeat_mode(),
            shuffle: player.shuffle_enabled(),
        })
    }

    /// Renders the frame. STATE is 1 while playing and 2 for every other
    /// playback state.
    pub fn to_frame(&self) -> String {
        [
            format!("PLAYER:{}", self.player_name),
            format!("STATE:{}", if self.is_playing { 1 } else { 2 }),
            format!("TITLE:{}", self.title),
            format!("ARTIST:{}", self.artist),
            format!("ALBUM:{}", self.album),
            format!("COVER:{}", self.cover_url),
            format!("DURATION:{}", self.duration_ms),
            format!("POSITION:{}", self.position_ms),
            format!("VOLUME:{}", self.volume_percent),
            format!("RATING:{}", self.rating),
            format!("REPEAT:{}", self.repeat.as_number()),
            format!("SHUFFLE:{}", if self.shuffle { 1 } else { 0 }),
        ]
        .join("\n")
    }
}

/// Seconds to whole milliseconds, rounded to nearest. Non-finite or
/// negative inputs collapse to 0.
fn to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

fn to_percent(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn resolve_artwork(url: &str) -> String {
    let size = ARTWORK_SIZE.to_string();
    url.replace("{w}", &size).replace("{h}", &size)
}
