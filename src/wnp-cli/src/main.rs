use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use wnp_bridge::{Bridge, ReconnectPolicy, WsConnector};
use wnp_core::{init_logging, AppDirs, Config, NotificationHub, NullPlayer, PlayerEvent};

#[derive(Debug, Parser)]
#[command(name = "wnpbridge", version, about = "WebNowPlaying bridge")]
struct Cli {
    /// Listener host override (takes precedence over config)
    #[arg(long, global = true)]
    host: Option<String>,
    /// Listener port override (takes precedence over config)
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Player name reported on the wire
    #[arg(long, global = true)]
    player_name: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bridge headless against the built-in null player
    Run,
    /// Print the resolved config file path
    ConfigPath,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let mut config = Config::load_or_default(&dirs)?;
    if let Some(host) = cli.host {
        config.endpoint.host = host;
    }
    if let Some(port) = cli.port {
        config.endpoint.port = port;
    }
    if let Some(player_name) = cli.player_name {
        config.player_name = player_name;
    }
    config.validate()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::ConfigPath => {
            println!("{}", Config::config_path(&dirs).display());
            Ok(())
        }
        Command::Run => run(config, dirs).await,
    }
}

async fn run(config: Config, dirs: AppDirs) -> Result<()> {
    let _logging_guard = init_logging(&config.logging, &dirs)?;
    info!(endpoint = %config.endpoint.url(), "starting bridge");

    // Headless harness: a real host player would hand in its own
    // PlaybackControl and fire hub notifications itself.
    let player = Arc::new(NullPlayer::new());
    let hub = Arc::new(NotificationHub::new());

    let bridge = Bridge::new(
        WsConnector::new(config.endpoint.url()),
        ReconnectPolicy::new(&config.reconnect),
        player,
        hub.clone(),
        config.player_name.clone(),
    );

    let mut status = bridge.status_receiver();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let connected = *status.borrow();
            info!(connected, "connection status changed");
        }
    });

    let shutdown_hub = hub.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, unloading");
            shutdown_hub.notify(PlayerEvent::Unload);
        }
    });

    bridge.run().await;
    Ok(())
}
