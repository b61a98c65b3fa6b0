//! Inbound WNP command handling.

use std::sync::Arc;
use tracing::{debug, warn};
use wnp_core::playback::{PlaybackControl, PlaybackResult};

/// One parsed inbound line: uppercase command token plus the raw
/// remainder after the first space, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub name: String,
    pub argument: Option<String>,
}

impl InboundCommand {
    /// Parses a raw line. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.split_once(' ') {
            Some((name, rest)) => Self {
                name: name.to_ascii_uppercase(),
                argument: Some(rest.to_string()),
            },
            None => Self {
                name: trimmed.to_ascii_uppercase(),
                argument: None,
            },
        })
    }
}

/// Translates inbound lines into playback-control calls.
///
/// Every entry point here is infallible: malformed lines and failing
/// player operations are logged and swallowed so one bad command can
/// never take the connection down.
pub struct CommandInterpreter {
    player: Arc<dyn PlaybackControl>,
}

impl CommandInterpreter {
    pub fn new(player: Arc<dyn PlaybackControl>) -> Self {
        Self { player }
    }

    /// Handles one inbound message. The caller schedules the deferred
    /// re-emission regardless of what happened here.
    pub fn handle(&self, raw: &str) {
        let Some(command) = InboundCommand::parse(raw) else {
            return;
        };
        if let Err(err) = self.dispatch(&command) {
            warn!(command = %command.name, error = %err, "playback command failed");
        }
    }

    fn dispatch(&self, command: &InboundCommand) -> PlaybackResult<()> {
        match command.name.as_str() {
            "PLAY" => self.player.play(),
            "PAUSE" => self.player.pause(),
            "PLAYPAUSE" => self.player.play_pause(),
            "NEXT" => self.player.next(),
            "PREVIOUS" => self.player.previous(),
            "STOP" => self.player.stop(),
            "REPEAT" => self.player.toggle_repeat(),
            "SHUFFLE" => self.player.toggle_shuffle(),
            "SETPOSITION" => match numeric_argument(command) {
                Some(ms) => self.player.seek_to(ms / 1000.0),
                None => {
                    debug!("ignoring SETPOSITION without a numeric argument");
                    Ok(())
                }
            },
            "SETVOLUME" => match numeric_argument(command) {
                Some(pct) => self.player.set_volume(pct.clamp(0.0, 100.0) / 100.0),
                None => {
                    debug!("ignoring SETVOLUME without a numeric argument");
                    Ok(())
                }
            },
            other => {
                // Unknown commands from newer peers are not an error.
                debug!(command = other, "ignoring unknown command");
                Ok(())
            }
        }
    }
}

fn numeric_argument(command: &InboundCommand) -> Option<f64> {
    command
        .argument
        .as_deref()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
