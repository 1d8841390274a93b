//! Audio output primitive
//!
//! [`AudioEngine`] is the seam between the playback controller and the sound
//! device. Operations that complete asynchronously (media loaded, load failed,
//! media finished) are reported as [`EngineEvent`]s tagged with the generation
//! they were requested under, so the controller can drop callbacks that belong
//! to a superseded session.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{PermissionError, PlaybackError};

/// Period of the progress sampler used for whole-chapter highlighting
pub const PROGRESS_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Bitrate of every recording the URL templates point at
const STREAM_KBPS: u64 = 128;
const OUTPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Loaded { generation: u64 },
    Failed { generation: u64, error: PlaybackError },
    Ended { generation: u64 },
    /// Periodic progress sample request
    Tick { generation: u64 },
}

impl EngineEvent {
    pub fn generation(&self) -> u64 {
        match *self {
            EngineEvent::Loaded { generation }
            | EngineEvent::Failed { generation, .. }
            | EngineEvent::Ended { generation }
            | EngineEvent::Tick { generation } => generation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaPosition {
    pub position: Duration,
    pub duration: Option<Duration>,
}

/// Platform audio primitive driven by the playback controller
pub trait AudioEngine: Send {
    /// Start loading `url` for `generation`; completion arrives as an event
    fn acquire(&mut self, generation: u64, url: &str, volume: f32) -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Seek the current resource back to its start
    fn rewind(&mut self);
    fn release(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Option<MediaPosition>;
}

/// Rough duration of a constant-bitrate stream
pub fn estimate_duration(byte_len: usize, kbps: u64) -> Option<Duration> {
    if kbps == 0 || byte_len == 0 {
        return None;
    }
    Some(Duration::from_millis(byte_len as u64 * 8 / kbps))
}

enum OutputCommand {
    Load {
        generation: u64,
        bytes: Arc<Vec<u8>>,
        volume: f32,
    },
    Play,
    Pause,
    Rewind,
    Release,
    SetVolume(f32),
}

struct ActiveSink {
    generation: u64,
    sink: Sink,
    duration: Option<Duration>,
    ended: bool,
}

#[derive(Clone, Copy)]
struct SharedPosition {
    generation: u64,
    position: MediaPosition,
}

/// Engine backed by `rodio`, with downloads done through `reqwest`.
///
/// The output stream is not `Send`, so it lives on a dedicated thread that
/// receives commands over a channel and polls the sink for end-of-media.
pub struct RodioEngine {
    commands: std_mpsc::Sender<OutputCommand>,
    events: UnboundedSender<EngineEvent>,
    http: reqwest::Client,
    current: Arc<AtomicU64>,
    position: Arc<Mutex<Option<SharedPosition>>>,
    recent: Arc<Mutex<Option<(String, Arc<Vec<u8>>)>>>,
    live: bool,
}

impl RodioEngine {
    pub fn new(events: UnboundedSender<EngineEvent>) -> Result<Self, PermissionError> {
        let (commands, command_rx) = std_mpsc::channel::<OutputCommand>();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel::<Result<(), String>>(1);
        let current = Arc::new(AtomicU64::new(0));
        let position = Arc::new(Mutex::new(None));

        let thread_events = events.clone();
        let thread_current = current.clone();
        let thread_position = position.clone();
        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                output_thread(command_rx, ready_tx, thread_events, thread_current, thread_position)
            })
            .map_err(|e| PermissionError::AudioOutputDenied(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(PermissionError::AudioOutputDenied(reason)),
            Err(_) => {
                return Err(PermissionError::AudioOutputDenied(
                    "audio thread exited during start-up".to_string(),
                ));
            }
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("recite-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PermissionError::AudioOutputDenied(e.to_string()))?;

        tracing::info!("Audio output initialized");
        Ok(Self {
            commands,
            events,
            http,
            current,
            position,
            recent: Arc::new(Mutex::new(None)),
            live: false,
        })
    }

    fn send(&self, command: OutputCommand) {
        if self.commands.send(command).is_err() {
            tracing::error!("Audio output thread is gone");
        }
    }
}

impl AudioEngine for RodioEngine {
    fn acquire(&mut self, generation: u64, url: &str, volume: f32) -> Result<(), PlaybackError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;

        self.current.store(generation, Ordering::SeqCst);
        self.live = true;

        let cached = self
            .recent
            .lock()
            .as_ref()
            .filter(|(cached_url, _)| cached_url == url)
            .map(|(_, bytes)| bytes.clone());

        if let Some(bytes) = cached {
            tracing::debug!(generation, url, "Reusing downloaded audio");
            self.send(OutputCommand::Load { generation, bytes, volume });
            return Ok(());
        }

        let http = self.http.clone();
        let commands = self.commands.clone();
        let events = self.events.clone();
        let current = self.current.clone();
        let recent = self.recent.clone();
        let url = url.to_string();

        runtime.spawn(async move {
            tracing::debug!(generation, url = %url, "Downloading audio");
            match download(&http, &url).await {
                Ok(bytes) => {
                    let bytes = Arc::new(bytes);
                    *recent.lock() = Some((url.clone(), bytes.clone()));
                    if current.load(Ordering::SeqCst) != generation {
                        tracing::debug!(generation, "Download finished for a superseded session");
                        return;
                    }
                    let _ = commands.send(OutputCommand::Load { generation, bytes, volume });
                }
                Err(error) => {
                    tracing::warn!(generation, url = %url, error = %error, "Audio download failed");
                    let _ = events.send(EngineEvent::Failed { generation, error });
                }
            }
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.live {
            return Err(PlaybackError::Output("no audio loaded".to_string()));
        }
        self.send(OutputCommand::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.send(OutputCommand::Pause);
    }

    fn rewind(&mut self) {
        self.send(OutputCommand::Rewind);
    }

    fn release(&mut self) {
        self.live = false;
        self.send(OutputCommand::Release);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(OutputCommand::SetVolume(volume));
    }

    fn position(&self) -> Option<MediaPosition> {
        let current = self.current.load(Ordering::SeqCst);
        self.position
            .lock()
            .filter(|shared| shared.generation == current)
            .map(|shared| shared.position)
    }
}

async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, PlaybackError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| PlaybackError::Source(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PlaybackError::Source(format!("HTTP {}", status.as_u16())));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PlaybackError::Source(e.to_string()))?;
    Ok(bytes.to_vec())
}

fn output_thread(
    commands: std_mpsc::Receiver<OutputCommand>,
    ready: std_mpsc::SyncSender<Result<(), String>>,
    events: UnboundedSender<EngineEvent>,
    current: Arc<AtomicU64>,
    position: Arc<Mutex<Option<SharedPosition>>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => {
            let _ = ready.send(Ok(()));
            output
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not open audio output device");
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let mut active: Option<ActiveSink> = None;

    loop {
        match commands.recv_timeout(OUTPUT_POLL_INTERVAL) {
            Ok(OutputCommand::Load { generation, bytes, volume }) => {
                if generation != current.load(Ordering::SeqCst) {
                    continue;
                }
                if let Some(previous) = active.take() {
                    previous.sink.stop();
                }
                match load_sink(&handle, &bytes, volume) {
                    Ok((sink, duration)) => {
                        tracing::debug!(generation, ?duration, "Audio loaded");
                        active = Some(ActiveSink { generation, sink, duration, ended: false });
                        let _ = events.send(EngineEvent::Loaded { generation });
                    }
                    Err(error) => {
                        tracing::warn!(generation, error = %error, "Audio could not be decoded");
                        let _ = events.send(EngineEvent::Failed { generation, error });
                    }
                }
            }
            Ok(OutputCommand::Play) => {
                if let Some(a) = &active {
                    a.sink.play();
                }
            }
            Ok(OutputCommand::Pause) => {
                if let Some(a) = &active {
                    a.sink.pause();
                }
            }
            Ok(OutputCommand::Rewind) => {
                if let Some(a) = &active {
                    if let Err(e) = a.sink.try_seek(Duration::ZERO) {
                        tracing::debug!(error = %e, "Rewind not supported by source");
                    }
                }
            }
            Ok(OutputCommand::Release) => {
                if let Some(a) = active.take() {
                    a.sink.stop();
                }
                *position.lock() = None;
            }
            Ok(OutputCommand::SetVolume(volume)) => {
                if let Some(a) = &active {
                    a.sink.set_volume(volume);
                }
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {}
            Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if let Some(a) = active.as_mut() {
            *position.lock() = Some(SharedPosition {
                generation: a.generation,
                position: MediaPosition {
                    position: a.sink.get_pos(),
                    duration: a.duration,
                },
            });
            if !a.ended && a.sink.empty() {
                a.ended = true;
                let _ = events.send(EngineEvent::Ended { generation: a.generation });
            }
        }
    }

    tracing::debug!("Audio output thread stopped");
}

fn load_sink(
    handle: &rodio::OutputStreamHandle,
    bytes: &Arc<Vec<u8>>,
    volume: f32,
) -> Result<(Sink, Option<Duration>), PlaybackError> {
    let decoder = Decoder::new(Cursor::new(bytes.as_ref().clone()))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let duration = decoder
        .total_duration()
        .or_else(|| estimate_duration(bytes.len(), STREAM_KBPS));
    let sink = Sink::try_new(handle).map_err(|e| PlaybackError::Output(e.to_string()))?;
    sink.pause();
    sink.set_volume(volume);
    sink.append(decoder);
    Ok((sink, duration))
}

/// Engine used when audio is disabled or no output device is available
#[derive(Debug, Default)]
pub struct SilentEngine {
    reason: String,
}

impl SilentEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl AudioEngine for SilentEngine {
    fn acquire(&mut self, _generation: u64, _url: &str, _volume: f32) -> Result<(), PlaybackError> {
        Err(PlaybackError::Output(self.reason.clone()))
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Output(self.reason.clone()))
    }

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn release(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn position(&self) -> Option<MediaPosition> {
        None
    }
}
