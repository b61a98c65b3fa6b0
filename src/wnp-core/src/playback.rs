//! Playback-control capability consumed by the bridge.
//!
//! The bridge never owns playback. The host player exposes this trait and
//! the bridge both reads current state through it and drives transport
//! controls in response to remote commands.

use std::sync::Mutex;
use thiserror::Error;

/// Playback control errors surfaced by the host player.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("operation not supported by this player: {0}")]
    NotSupported(String),
    #[error("player backend unavailable: {0}")]
    Backend(String),
    #[error("{0}")]
    Other(String),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Repeat cycle state, numeric values matching the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    pub fn as_number(self) -> u8 {
        match self {
            RepeatMode::Off => 0,
            RepeatMode::One => 1,
            RepeatMode::All => 2,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

/// Metadata for the track currently loaded in the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Artwork URL template; may contain `{w}`/`{h}` placeholders.
    pub artwork_url: Option<String>,
    pub duration_seconds: f64,
    pub rating: i32,
}

/// Host player interface: transport controls plus state reads.
///
/// Reads are cheap and are re-queried on every emission; the bridge never
/// caches what it sees here.
pub trait PlaybackControl: Send + Sync {
    fn play(&self) -> PlaybackResult<()>;
    fn pause(&self) -> PlaybackResult<()>;
    fn play_pause(&self) -> PlaybackResult<()>;
    fn next(&self) -> PlaybackResult<()>;
    fn previous(&self) -> PlaybackResult<()>;
    fn stop(&self) -> PlaybackResult<()>;
    fn toggle_repeat(&self) -> PlaybackResult<()>;
    fn toggle_shuffle(&self) -> PlaybackResult<()>;
    fn seek_to(&self, seconds: f64) -> PlaybackResult<()>;
    /// Volume as a fraction in 0.0..=1.0.
    fn set_volume(&self, fraction: f64) -> PlaybackResult<()>;

    fn current_track(&self) -> Option<TrackInfo>;
    fn position_seconds(&self) -> f64;
    fn is_playing(&self) -> bool;
    fn volume(&self) -> f64;
    fn repeat_mode(&self) -> RepeatMode;
    fn shuffle_enabled(&self) -> bool;
}

#[derive(Debug, Default)]
struct NullPlayerState {
    track: Option<TrackInfo>,
    playing: bool,
    position_seconds: f64,
    volume: f64,
    repeat: RepeatMode,
    shuffle: bool,
}

/// In-memory player used by tests and headless runs.
#[derive(Debug)]
pub struct NullPlayer {
    state: Mutex<NullPlayerState>,
}

impl Default for NullPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl NullPlayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NullPlayerState {
                volume: 1.0,
                ..NullPlayerState::default()
            }),
        }
    }

    pub fn load_track(&self, track: TrackInfo) {
        let mut state = self.state.lock().unwrap();
        state.track = Some(track);
        state.position_seconds = 0.0;
    }

    pub fn unload_track(&self) {
        let mut state = self.state.lock().unwrap();
        state.track = None;
        state.playing = false;
        state.position_seconds = 0.0;
    }

    pub fn set_position(&self, seconds: f64) {
        self.state.lock().unwrap().position_seconds = seconds;
    }
}

impl PlaybackControl for NullPlayer {
    fn play(&self) -> PlaybackResult<()> {
        self.state.lock().unwrap().playing = true;
        Ok(())
    }

    fn pause(&self) -> PlaybackResult<()> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    fn play_pause(&self) -> PlaybackResult<()> {
        let mut state = self.state.lock().unwrap();
        state.playing = !state.playing;
        Ok(())
    }

    fn next(&self) -> PlaybackResult<()> {
        self.state.lock().unwrap().position_seconds = 0.0;
        Ok(())
    }

    fn previous(&self) -> PlaybackResult<()> {
        self.state.lock().unwrap().position_seconds = 0.0;
        Ok(())
    }

    fn stop(&self) -> PlaybackResult<()> {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.position_seconds = 0.0;
        Ok(())
    }

    fn toggle_repeat(&self) -> PlaybackResult<()> {
        let mut state = self.state.lock().unwrap();
        state.repeat = state.repeat.cycled();
        Ok(())
    }

    fn toggle_shuffle(&self) -> PlaybackResult<()> {
        let mut state = self.state.lock().unwrap();
        state.shuffle = !state.shuffle;
        Ok(())
    }

    fn seek_to(&self, seconds: f64) -> PlaybackResult<()> {
        self.state.lock().unwrap().position_seconds = seconds.max(0.0);
        Ok(())
    }

    fn set_volume(&self, fraction: f64) -> PlaybackResult<()> {
        self.state.lock().unwrap().volume = fraction.clamp(0.0, 1.0);
        Ok(())
    }

    fn current_track(&self) -> Option<TrackInfo> {
        self.state.lock().unwrap().track.clone()
    }

    fn position_seconds(&self) -> f64 {
        self.state.lock().unwrap().position_seconds
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.state.lock().unwrap().repeat
    }

    fn shuffle_enabled(&self) -> bool {
        self.state.lock().unwrap().shuffle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mode_cycles_through_all_states() {
        let mode = RepeatMode::Off;
        assert_eq!(mode.cycled(), RepeatMode::One);
        assert_eq!(mode.cycled().cycled(), RepeatMode::All);
        assert_eq!(mode.cycled().cycled().cycled(), RepeatMode::Off);
    }

    #[test]
    fn null_player_toggles_playback() {
        let player = NullPlayer::new();
        assert!(!player.is_playing());
        player.play_pause().expect("toggle should succeed");
        assert!(player.is_playing());
        player.pause().expect("pause should succeed");
        assert!(!player.is_playing());
    }

    #[test]
    fn null_player_clamps_volume() {
        let player = NullPlayer::new();
        player.set_volume(1.7).expect("set_volume should succeed");
        assert!((player.volume() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_rewinds_position() {
        let player = NullPlayer::new();
        player.load_track(TrackInfo {
            title: Some("one".into()),
            ..TrackInfo::default()
        });
        player.play().expect("play should succeed");
        player.set_position(42.0);
        player.stop().expect("stop should succeed");
        assert!(!player.is_playing());
        assert_eq!(player.position_seconds(), 0.0);
    }
}
