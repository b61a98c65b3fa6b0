//! Bridge between a host player and a WebNowPlaying listener.
//!
//! The bridge keeps one outbound WebSocket to the listener, pushes a full
//! now-playing frame whenever the player reports a change, and translates
//! inbound WNP commands back into playback-control calls.

mod bridge;
mod command;
mod emitter;
mod frame;
mod transport;
mod ws;

pub use bridge::Bridge;
pub use command::{CommandInterpreter, InboundCommand};
pub use emitter::StateEmitter;
pub use frame::{NowPlayingSnapshot, ARTWORK_SIZE};
pub use transport::{
    ConnectionState, ReconnectPolicy, Transport, TransportError, WireConnector, WireSocket,
};
pub use ws::WsConnector;
