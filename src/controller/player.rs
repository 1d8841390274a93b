//! Playback session state machine
//!
//! Owns the single audio resource. Every change of target goes through
//! [`PlaybackController::load_and_play`], which tears the previous resource
//! down (sampler, pause, rewind, release) before acquiring the next one.
//! Engine callbacks carry the generation they were issued under; anything not
//! matching the current generation is ignored.

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::audio::{AudioEngine, EngineEvent, MediaPosition, PROGRESS_SAMPLE_INTERVAL};
use crate::model::catalog::{self, Reciter};
use crate::model::{
    EndAction, LoopMode, PlaybackInfo, PlaybackStatus, PlaybackTarget, ProgressChange,
    clamp_repeat_count, clamp_volume, end_of_media, project_verse,
};
use crate::settings::{PrefKey, Preferences};

pub struct PlaybackController {
    engine: Box<dyn AudioEngine>,
    events: UnboundedSender<EngineEvent>,
    prefs: Preferences,
    reciter: &'static Reciter,
    generation: u64,
    /// Generation of the resource currently held by the engine
    handle: Option<u64>,
    target: Option<PlaybackTarget>,
    status: PlaybackStatus,
    mode: LoopMode,
    repeat_count: u8,
    repeat_progress: u8,
    volume: f32,
    highlighted_verse: Option<u16>,
    position: Option<MediaPosition>,
    last_error: Option<String>,
    sampler: Option<JoinHandle<()>>,
    audio_enabled: bool,
}

impl PlaybackController {
    pub fn new(
        engine: Box<dyn AudioEngine>,
        events: UnboundedSender<EngineEvent>,
        prefs: Preferences,
    ) -> Self {
        let audio_enabled = prefs.get::<bool>(PrefKey::AudioEnabled);
        Self {
            engine,
            events,
            reciter: prefs.reciter(),
            generation: 0,
            handle: None,
            target: None,
            status: PlaybackStatus::Idle,
            mode: prefs.loop_mode(),
            repeat_count: prefs.repeat_count(),
            repeat_progress: 0,
            volume: prefs.volume(),
            highlighted_verse: None,
            position: None,
            last_error: None,
            sampler: None,
            audio_enabled,
            prefs,
        }
    }

    pub fn info(&self) -> PlaybackInfo {
        let (position_ms, duration_ms) = match self.position {
            Some(p) => (
                p.position.as_millis() as u64,
                p.duration.map(|d| d.as_millis() as u64).unwrap_or(0),
            ),
            None => (0, 0),
        };
        PlaybackInfo {
            target: self.target,
            status: self.status,
            mode: self.mode,
            repeat_count: self.repeat_count,
            repeat_progress: self.repeat_progress,
            volume: self.volume,
            highlighted_verse: self.highlighted_verse,
            position_ms,
            duration_ms,
            reciter_name: self.reciter.name.to_string(),
            audio_enabled: self.audio_enabled,
            last_error: self.last_error.clone(),
        }
    }

    pub fn target(&self) -> Option<PlaybackTarget> {
        self.target
    }

    /// Replace whatever is playing with `target`
    pub fn load_and_play(&mut self, target: PlaybackTarget) {
        if !self.audio_enabled {
            tracing::debug!("Audio disabled, ignoring play request");
            return;
        }
        self.teardown();
        self.acquire(target);
    }

    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.engine.pause();
        self.status = PlaybackStatus::Paused;
        tracing::debug!(generation = self.generation, "Playback paused");
    }

    pub fn resume(&mut self) {
        if self.status != PlaybackStatus::Paused {
            return;
        }
        match self.engine.play() {
            Ok(()) => {
                self.status = PlaybackStatus::Playing;
                tracing::debug!(generation = self.generation, "Playback resumed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Resume failed");
                self.teardown();
                self.status = PlaybackStatus::Errored;
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Pause when playing, resume when paused, replay a finished target
    pub fn toggle(&mut self) {
        match self.status {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
            PlaybackStatus::Ended | PlaybackStatus::Errored => {
                if let Some(target) = self.target {
                    self.repeat_progress = 0;
                    self.load_and_play(target);
                }
            }
            PlaybackStatus::Idle | PlaybackStatus::Loading => {}
        }
    }

    pub fn stop(&mut self) {
        if self.status == PlaybackStatus::Idle && self.target.is_none() && self.handle.is_none() {
            return;
        }
        self.teardown();
        self.generation += 1;
        self.target = None;
        self.repeat_progress = 0;
        self.status = PlaybackStatus::Idle;
        tracing::debug!(generation = self.generation, "Playback stopped");
    }

    /// Move one verse forward; no-op at the last verse or on a chapter stream
    pub fn next(&mut self) {
        self.step(1);
    }

    pub fn previous(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, delta: i32) {
        let Some(moved) = self.target.and_then(|t| t.step(delta)) else {
            return;
        };
        self.repeat_progress = 0;
        self.load_and_play(moved);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        if self.handle.is_some() {
            self.engine.set_volume(self.volume);
        }
        self.persist(PrefKey::Volume, self.volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_mode(&mut self, mode: LoopMode) {
        self.mode = mode;
        self.repeat_progress = 0;
        self.persist(PrefKey::LoopMode, mode);
    }

    pub fn cycle_mode(&mut self) -> LoopMode {
        self.set_mode(self.mode.next());
        self.mode
    }

    /// Takes effect at the next completion
    pub fn set_repeat_count(&mut self, count: i64) -> u8 {
        self.repeat_count = clamp_repeat_count(count);
        self.persist(PrefKey::RepeatCount, self.repeat_count);
        self.repeat_count
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }

    /// Applies to the next load; the current recording keeps playing
    pub fn set_reciter(&mut self, id: &str) -> &'static Reciter {
        self.reciter = catalog::reciter(id);
        self.persist(PrefKey::Reciter, self.reciter.id);
        self.reciter
    }

    pub fn reciter(&self) -> &'static Reciter {
        self.reciter
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop();
        }
        self.audio_enabled = enabled;
        self.persist(PrefKey::AudioEnabled, enabled);
    }

    /// Mute for this run only; the stored preference is left alone
    pub fn disable_audio_for_session(&mut self) {
        self.stop();
        self.audio_enabled = false;
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Apply an engine callback. Returns false when it was stale and ignored.
    pub fn on_event(&mut self, event: EngineEvent) -> bool {
        if event.generation() != self.generation || self.handle.is_none() {
            tracing::trace!(?event, current = self.generation, "Ignoring stale engine event");
            return false;
        }

        match event {
            EngineEvent::Loaded { .. } => {
                if self.status == PlaybackStatus::Loading {
                    match self.engine.play() {
                        Ok(()) => {
                            self.status = PlaybackStatus::Playing;
                            tracing::debug!(generation = self.generation, "Playback started");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Playback could not start");
                            self.teardown();
                            self.status = PlaybackStatus::Errored;
                            self.last_error = Some(e.to_string());
                        }
                    }
                }
            }
            EngineEvent::Failed { error, .. } => {
                tracing::warn!(generation = self.generation, error = %error, "Playback failed");
                self.teardown();
                self.status = PlaybackStatus::Errored;
                self.last_error = Some(error.to_string());
            }
            EngineEvent::Ended { .. } => {
                if matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Loading) {
                    self.end_of_media();
                }
            }
            EngineEvent::Tick { .. } => self.sample_progress(),
        }
        true
    }

    fn end_of_media(&mut self) {
        let Some(target) = self.target else {
            return;
        };
        let budget_left = self.repeat_progress.saturating_add(1) < self.repeat_count;
        let transition = end_of_media(self.mode, budget_left, target.has_next());
        tracing::debug!(
            ?target,
            mode = ?self.mode,
            progress = self.repeat_progress,
            action = ?transition.action,
            "End of media"
        );

        match transition.progress {
            ProgressChange::Increment => self.repeat_progress = self.repeat_progress.saturating_add(1),
            ProgressChange::Reset => self.repeat_progress = 0,
        }

        match transition.action {
            EndAction::Replay => self.load_and_play(target),
            EndAction::Advance => match target.step(1) {
                Some(next) => self.load_and_play(next),
                None => self.finish(),
            },
            EndAction::RestartChapter => self.load_and_play(target.restart()),
            EndAction::Finish => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.teardown();
        self.status = PlaybackStatus::Ended;
    }

    fn sample_progress(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        self.position = self.engine.position();
        if let PlaybackTarget::Chapter { verse_count, .. } = target {
            if let Some(MediaPosition { position, duration: Some(duration) }) = self.position {
                self.highlighted_verse = project_verse(
                    position.as_millis() as u64,
                    duration.as_millis() as u64,
                    verse_count,
                );
            }
        }
    }

    fn acquire(&mut self, target: PlaybackTarget) {
        self.generation += 1;
        self.target = Some(target);
        self.status = PlaybackStatus::Loading;
        let url = target.audio_url(self.reciter);
        tracing::info!(generation = self.generation, url = %url, "Loading audio");

        match self.engine.acquire(self.generation, &url, self.volume) {
            Ok(()) => {
                self.handle = Some(self.generation);
                self.start_sampler();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load audio");
                self.status = PlaybackStatus::Errored;
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Release the current resource; safe to call with nothing loaded
    fn teardown(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.abort();
        }
        if self.handle.take().is_some() {
            self.engine.pause();
            self.engine.rewind();
            self.engine.release();
        }
        self.highlighted_verse = None;
        self.position = None;
        self.last_error = None;
    }

    fn start_sampler(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime, progress sampling disabled");
            return;
        };
        let events = self.events.clone();
        let generation = self.generation;
        self.sampler = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_SAMPLE_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(EngineEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn persist<T: serde::Serialize>(&self, key: PrefKey, value: T) {
        if let Err(e) = self.prefs.set(key, value) {
            tracing::warn!(key = key.name(), error = %e, "Playback preference not saved");
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Acquire(u64, String),
        Play,
        Pause,
        Rewind,
        Release,
        Volume(f32),
    }

    #[derive(Default)]
    struct EngineLog {
        calls: Vec<Call>,
        live: usize,
        max_live: usize,
        acquired_while_live: bool,
        position: Option<MediaPosition>,
        fail_acquire: bool,
    }

    #[derive(Clone, Default)]
    struct FakeEngine {
        log: Arc<Mutex<EngineLog>>,
    }

    impl AudioEngine for FakeEngine {
        fn acquire(&mut self, generation: u64, url: &str, _volume: f32) -> Result<(), PlaybackError> {
            let mut log = self.log.lock();
            if log.fail_acquire {
                return Err(PlaybackError::Source("HTTP 404".into()));
            }
            if log.live > 0 {
                log.acquired_while_live = true;
            }
            log.live += 1;
            log.max_live = log.max_live.max(log.live);
            log.calls.push(Call::Acquire(generation, url.to_string()));
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.log.lock().calls.push(Call::Play);
            Ok(())
        }

        fn pause(&mut self) {
            self.log.lock().calls.push(Call::Pause);
        }

        fn rewind(&mut self) {
            self.log.lock().calls.push(Call::Rewind);
        }

        fn release(&mut self) {
            let mut log = self.log.lock();
            log.live = log.live.saturating_sub(1);
            log.calls.push(Call::Release);
        }

        fn set_volume(&mut self, volume: f32) {
            self.log.lock().calls.push(Call::Volume(volume));
        }

        fn position(&self) -> Option<MediaPosition> {
            self.log.lock().position
        }
    }

    struct Harness {
        player: PlaybackController,
        engine: FakeEngine,
        prefs: Preferences,
        _events: UnboundedReceiver<EngineEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let engine = FakeEngine::default();
            let prefs = Preferences::in_memory();
            let (tx, rx) = mpsc::unbounded_channel();
            let player = PlaybackController::new(Box::new(engine.clone()), tx, prefs.clone());
            Self { player, engine, prefs, _events: rx }
        }

        fn generation(&self) -> u64 {
            self.player.generation
        }

        fn loaded(&mut self) {
            let generation = self.generation();
            self.player.on_event(EngineEvent::Loaded { generation });
        }

        fn ended(&mut self) {
            let generation = self.generation();
            self.player.on_event(EngineEvent::Ended { generation });
            self.loaded();
        }

        fn verse(&self) -> Option<u16> {
            self.player.target().and_then(|t| t.verse_number())
        }

        fn acquisitions(&self) -> usize {
            self.engine
                .log
                .lock()
                .calls
                .iter()
                .filter(|c| matches!(c, Call::Acquire(..)))
                .count()
        }

        fn live(&self) -> usize {
            self.engine.log.lock().live
        }

        fn clear_calls(&self) {
            self.engine.log.lock().calls.clear();
        }
    }

    #[test]
    fn load_reports_loading_then_playing() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        assert_eq!(h.player.info().status, PlaybackStatus::Loading);
        h.loaded();
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);
        assert_eq!(h.live(), 1);
    }

    #[test]
    fn previous_resource_is_torn_down_before_the_next_is_acquired() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.loaded();
        h.clear_calls();

        h.player.load_and_play(PlaybackTarget::verse(1, 4, 7));
        let calls = h.engine.log.lock().calls.clone();
        assert_eq!(calls[..3], [Call::Pause, Call::Rewind, Call::Release]);
        assert!(matches!(calls[3], Call::Acquire(_, ref url) if url.ends_with("/4.mp3")));

        let log = h.engine.log.lock();
        assert!(!log.acquired_while_live);
        assert_eq!(log.max_live, 1);
    }

    #[test]
    fn loop_verse_replays_then_advances() {
        let mut h = Harness::new();
        h.player.set_mode(LoopMode::LoopVerse);
        h.player.set_repeat_count(3);
        h.player.load_and_play(PlaybackTarget::verse(2, 5, 286));
        h.loaded();

        h.ended();
        assert_eq!((h.verse(), h.player.info().repeat_progress), (Some(5), 1));
        h.ended();
        assert_eq!((h.verse(), h.player.info().repeat_progress), (Some(5), 2));
        h.ended();
        assert_eq!((h.verse(), h.player.info().repeat_progress), (Some(6), 0));

        assert_eq!(h.acquisitions(), 4);
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);
    }

    #[test]
    fn single_mode_advances_and_finishes_at_the_last_verse() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 6, 7));
        h.loaded();

        h.ended();
        assert_eq!(h.verse(), Some(7));
        let generation = h.generation();
        h.player.on_event(EngineEvent::Ended { generation });

        assert_eq!(h.player.info().status, PlaybackStatus::Ended);
        assert_eq!(h.player.target(), Some(PlaybackTarget::verse(1, 7, 7)));
        assert_eq!(h.live(), 0);
    }

    #[test]
    fn loop_chapter_restarts_whole_chapter_once() {
        let mut h = Harness::new();
        h.player.set_mode(LoopMode::LoopChapter);
        h.player.set_repeat_count(2);
        h.player.load_and_play(PlaybackTarget::chapter(1, 7));
        h.loaded();

        h.ended();
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);
        assert_eq!(h.player.info().repeat_progress, 1);

        let generation = h.generation();
        h.player.on_event(EngineEvent::Ended { generation });
        assert_eq!(h.player.info().status, PlaybackStatus::Ended);
        assert_eq!(h.player.info().repeat_progress, 0);
        assert_eq!(h.acquisitions(), 2);
    }

    #[test]
    fn loop_chapter_over_verses_restarts_from_the_first_verse() {
        let mut h = Harness::new();
        h.player.set_mode(LoopMode::LoopChapter);
        h.player.set_repeat_count(2);
        h.player.load_and_play(PlaybackTarget::verse(103, 2, 3));
        h.loaded();

        h.ended();
        assert_eq!((h.verse(), h.player.info().repeat_progress), (Some(1), 1));
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);

        let generation = h.generation();
        h.player.on_event(EngineEvent::Ended { generation });
        assert_eq!(h.player.info().status, PlaybackStatus::Ended);
        assert_eq!(h.player.info().repeat_progress, 0);
        assert_eq!(h.acquisitions(), 2);
        assert_eq!(h.live(), 0);
    }

    #[test]
    fn loop_chapter_without_budget_stops_even_with_verses_left() {
        let mut h = Harness::new();
        h.player.set_mode(LoopMode::LoopChapter);
        h.player.set_repeat_count(1);
        h.player.load_and_play(PlaybackTarget::verse(103, 2, 3));
        h.loaded();

        let generation = h.generation();
        h.player.on_event(EngineEvent::Ended { generation });
        assert_eq!(h.player.info().status, PlaybackStatus::Ended);
        assert_eq!(h.verse(), Some(2));
        assert_eq!(h.acquisitions(), 1);
    }

    #[test]
    fn stale_callbacks_after_stop_are_ignored() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        let old = h.generation();
        h.player.stop();

        assert!(!h.player.on_event(EngineEvent::Loaded { generation: old }));
        assert!(!h.player.on_event(EngineEvent::Ended { generation: old }));
        assert_eq!(h.player.info().status, PlaybackStatus::Idle);
        assert_eq!(h.player.target(), None);
        assert_eq!(h.acquisitions(), 1);
    }

    #[test]
    fn superseded_load_cannot_start_playback() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        let first = h.generation();
        h.player.load_and_play(PlaybackTarget::verse(1, 2, 7));

        h.player.on_event(EngineEvent::Failed {
            generation: first,
            error: PlaybackError::Decode("truncated".into()),
        });
        assert_eq!(h.player.info().status, PlaybackStatus::Loading);
        h.loaded();
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);
        assert_eq!(h.verse(), Some(2));
    }

    #[test]
    fn stop_twice_has_no_further_effect() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.loaded();
        h.player.stop();
        let calls_after_first = h.engine.log.lock().calls.len();
        let info_after_first = h.player.info();

        h.player.stop();
        assert_eq!(h.engine.log.lock().calls.len(), calls_after_first);
        assert_eq!(h.player.info(), info_after_first);
        assert_eq!(info_after_first.status, PlaybackStatus::Idle);
        assert_eq!(info_after_first.position_ms, 0);
    }

    #[test]
    fn next_and_previous_clamp_at_chapter_edges() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 7, 7));
        h.player.next();
        assert_eq!(h.verse(), Some(7));
        assert_eq!(h.acquisitions(), 1);

        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.player.previous();
        assert_eq!(h.verse(), Some(1));
        assert_eq!(h.acquisitions(), 2);

        h.player.next();
        assert_eq!(h.verse(), Some(2));
    }

    #[test]
    fn next_is_a_no_op_on_chapter_streams() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::chapter(1, 7));
        h.player.next();
        assert_eq!(h.acquisitions(), 1);
    }

    #[test]
    fn pause_and_resume_follow_status() {
        let mut h = Harness::new();
        h.player.pause();
        assert_eq!(h.player.info().status, PlaybackStatus::Idle);

        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.loaded();
        h.player.toggle();
        assert_eq!(h.player.info().status, PlaybackStatus::Paused);
        h.player.toggle();
        assert_eq!(h.player.info().status, PlaybackStatus::Playing);
        assert!(h.engine.log.lock().calls.contains(&Call::Play));
    }

    #[test]
    fn failed_load_reports_error_and_holds_nothing() {
        let mut h = Harness::new();
        h.engine.log.lock().fail_acquire = true;
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));

        let info = h.player.info();
        assert_eq!(info.status, PlaybackStatus::Errored);
        assert!(info.last_error.unwrap().contains("404"));
        assert_eq!(h.live(), 0);
    }

    #[test]
    fn engine_failure_releases_the_resource() {
        let mut h = Harness::new();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        let generation = h.generation();
        h.player.on_event(EngineEvent::Failed {
            generation,
            error: PlaybackError::Source("HTTP 500".into()),
        });
        assert_eq!(h.player.info().status, PlaybackStatus::Errored);
        assert_eq!(h.live(), 0);
    }

    #[test]
    fn settings_are_clamped_and_persisted() {
        let mut h = Harness::new();
        h.player.set_volume(1.5);
        assert_eq!(h.player.volume(), 1.0);
        assert_eq!(h.player.set_repeat_count(0), 1);
        h.player.cycle_mode();
        h.player.set_reciter("ar.husary");

        assert_eq!(h.prefs.volume(), 1.0);
        assert_eq!(h.prefs.repeat_count(), 1);
        assert_eq!(h.prefs.loop_mode(), LoopMode::LoopVerse);
        assert_eq!(h.prefs.reciter().id, "ar.husary");
    }

    #[test]
    fn repeat_count_change_is_not_retroactive() {
        let mut h = Harness::new();
        h.player.set_mode(LoopMode::LoopVerse);
        h.player.set_repeat_count(5);
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.loaded();
        h.ended();
        h.ended();
        assert_eq!(h.player.info().repeat_progress, 2);

        h.player.set_repeat_count(2);
        assert_eq!(h.player.info().repeat_progress, 2);
        h.ended();
        assert_eq!(h.verse(), Some(2));
    }

    #[test]
    fn volume_reaches_the_engine_only_with_a_live_resource() {
        let mut h = Harness::new();
        h.player.set_volume(0.3);
        assert!(h.engine.log.lock().calls.is_empty());

        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        h.player.set_volume(0.4);
        assert!(h.engine.log.lock().calls.contains(&Call::Volume(0.4)));
    }

    #[test]
    fn disabled_audio_ignores_play_requests() {
        let mut h = Harness::new();
        h.player.set_audio_enabled(false);
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));
        assert_eq!(h.acquisitions(), 0);
        assert_eq!(h.player.info().status, PlaybackStatus::Idle);
    }

    #[test]
    fn session_mute_leaves_the_stored_preference() {
        let mut h = Harness::new();
        h.player.disable_audio_for_session();
        h.player.load_and_play(PlaybackTarget::verse(1, 1, 7));

        assert!(!h.player.info().audio_enabled);
        assert_eq!(h.acquisitions(), 0);
        assert!(h.prefs.get::<bool>(PrefKey::AudioEnabled));
    }

    #[tokio::test(start_paused = true)]
    async fn chapter_progress_is_projected_onto_verses() {
        let engine = FakeEngine::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut player = PlaybackController::new(Box::new(engine.clone()), tx, Preferences::in_memory());

        player.load_and_play(PlaybackTarget::chapter(1, 10));
        let generation = player.generation;
        player.on_event(EngineEvent::Loaded { generation });
        engine.log.lock().position = Some(MediaPosition {
            position: Duration::from_secs(50),
            duration: Some(Duration::from_secs(100)),
        });

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick, EngineEvent::Tick { generation });
        player.on_event(tick);
        assert_eq!(player.info().highlighted_verse, Some(6));
        assert_eq!(player.info().current_verse(), Some((1, 6)));

        player.stop();
        assert_eq!(player.info().highlighted_verse, None);
    }
}
