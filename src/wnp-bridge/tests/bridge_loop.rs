use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wnp_bridge::{Bridge, ReconnectPolicy, TransportError, WireConnector, WireSocket};
use wnp_core::notify::{NotificationHub, PlayerEvent};
use wnp_core::playback::{NullPlayer, PlaybackControl, TrackInfo};

/// In-memory socket: inbound commands come from a channel, outbound
/// frames are captured on another.
struct ChannelConnector {
    inbound: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    sent: mpsc::UnboundedSender<String>,
}

struct ChannelSocket {
    inbound: mpsc::UnboundedReceiver<String>,
    sent: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl WireConnector for ChannelConnector {
    type Socket = ChannelSocket;

    async fn connect(&self) -> Result<ChannelSocket, TransportError> {
        let inbound = self
            .inbound
            .lock()
            .unwrap()
            .take()
            .ok_or(TransportError::Connect {
                url: "test".into(),
                message: "single-shot connector exhausted".into(),
            })?;
        Ok(ChannelSocket {
            inbound,
            sent: self.sent.clone(),
        })
    }
}

#[async_trait]
impl WireSocket for ChannelSocket {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.sent
            .send(payload)
            .map_err(|_| TransportError::Send("capture channel closed".into()))
    }

    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {}
}

struct Harness {
    player: Arc<NullPlayer>,
    hub: Arc<NotificationHub>,
    inbound_tx: mpsc::UnboundedSender<String>,
    sent_rx: mpsc::UnboundedReceiver<String>,
    bridge: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(with_track: bool) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let connector = ChannelConnector {
            inbound: Mutex::new(Some(inbound_rx)),
            sent: sent_tx,
        };

        let player = Arc::new(NullPlayer::new());
        if with_track {
            player.load_track(TrackInfo {
                title: Some("Song".into()),
                artist: Some("Artist".into()),
                album: Some("Album".into()),
                duration_seconds: 180.0,
                ..TrackInfo::default()
            });
        }

        let hub = Arc::new(NotificationHub::new());
        let bridge = Bridge::new(
            connector,
            ReconnectPolicy::default(),
            player.clone(),
            hub.clone(),
            "Test Player",
        );
        let bridge = tokio::spawn(bridge.run());

        Self {
            player,
            hub,
            inbound_tx,
            sent_rx,
            bridge,
        }
    }

    async fn next_frame(&mut self) -> String {
        timeout(Duration::from_secs(2), self.sent_rx.recv())
            .await
            .expect("frame should arrive before timeout")
            .expect("capture channel should stay open")
    }
}

#[tokio::test]
async fn connect_pushes_initial_frame() {
    let mut harness = Harness::start(true);

    let frame = harness.next_frame().await;
    assert!(frame.contains("PLAYER:Test Player"));
    assert!(frame.contains("STATE:2"));
    assert!(frame.contains("DURATION:180000"));

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}

#[tokio::test]
async fn player_notification_triggers_emission() {
    let mut harness = Harness::start(true);
    harness.next_frame().await; // initial emission

    harness.player.play().expect("play should succeed");
    harness.hub.notify(PlayerEvent::PlaybackStateChanged);

    let frame = harness.next_frame().await;
    assert!(frame.contains("STATE:1"));

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}

#[tokio::test]
async fn inbound_command_drives_player_and_reemits() {
    let mut harness = Harness::start(true);
    harness.next_frame().await; // initial emission

    harness
        .inbound_tx
        .send("PLAYPAUSE".into())
        .expect("bridge should be listening");

    // The debounced follow-up emission reflects the toggled state.
    let frame = harness.next_frame().await;
    assert!(frame.contains("STATE:1"));
    assert!(harness.player.is_playing());

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}

#[tokio::test]
async fn unknown_command_still_reemits() {
    let mut harness = Harness::start(true);
    harness.next_frame().await; // initial emission

    harness
        .inbound_tx
        .send("FOO".into())
        .expect("bridge should be listening");

    let frame = harness.next_frame().await;
    assert!(frame.contains("STATE:2"));
    assert!(!harness.player.is_playing());

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}

#[tokio::test]
async fn no_track_suppresses_emission() {
    let mut harness = Harness::start(false);

    // Nothing on connect and nothing on notifications without a track.
    harness.hub.notify(PlayerEvent::PlaybackTimeChanged);
    let nothing = timeout(Duration::from_millis(300), harness.sent_rx.recv()).await;
    assert!(nothing.is_err(), "no frame should be emitted without a track");

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}

#[tokio::test]
async fn unload_closes_and_unsubscribes() {
    let mut harness = Harness::start(true);
    harness.next_frame().await;

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");

    // Listeners are gone; further notifications are a no-op.
    harness.hub.notify(PlayerEvent::PlaybackStateChanged);
    let nothing = timeout(Duration::from_millis(200), harness.sent_rx.recv()).await;
    match nothing {
        Ok(None) | Err(_) => {}
        Ok(Some(frame)) => panic!("unexpected frame after unload: {frame}"),
    }
}

#[tokio::test]
async fn setvolume_roundtrip_updates_frame() {
    let mut harness = Harness::start(true);
    harness.next_frame().await;

    harness
        .inbound_tx
        .send("SETVOLUME 150".into())
        .expect("bridge should be listening");

    let frame = harness.next_frame().await;
    assert!(frame.contains("VOLUME:100"));
    assert!((harness.player.volume() - 1.0).abs() < f64::EPSILON);

    harness.hub.notify(PlayerEvent::Unload);
    harness.bridge.await.expect("bridge task should finish");
}
