pub mod config;
pub mod logging;
pub mod notify;
pub mod paths;
pub mod playback;

pub use config::{
    Config, ConfigError, EndpointConfig, LogLevel, LoggingConfig, ReconnectConfig, ValidationError,
};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use notify::{NotificationHub, PlayerEvent, SubscriptionId};
pub use paths::{AppDirs, DirsError};
pub use playback::{
    NullPlayer, PlaybackControl, PlaybackError, PlaybackResult, RepeatMode, TrackInfo,
};

pub const APP_NAME: &str = "wnpbridge";
pub const APP_AUTHOR: &str = "WnpBridge";
pub const APP_QUALIFIER: &str = "io";
