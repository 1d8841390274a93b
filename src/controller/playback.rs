//! Playback commands issued from the UI

use crate::model::catalog;
use crate::model::{PlaybackStatus, PlaybackTarget, Tab};
use super::AppController;

const VOLUME_STEP: f32 = 0.05;

impl AppController {
    /// Play the verse under the reading-pane cursor
    pub async fn play_selected_verse(&self) {
        let model = self.model.lock().await;
        let Some(verse) = model.get_selected_verse().await else {
            return;
        };
        let verse_count = model.verse_count(verse.chapter).await;
        drop(model);

        tracing::info!(chapter = verse.chapter, verse = verse.number, "Playing verse");
        self.play_target(PlaybackTarget::verse(verse.chapter, verse.number, verse_count))
            .await;
    }

    /// Play the whole chapter open in the reading pane, or the one selected in the sidebar
    pub async fn play_chapter(&self) {
        let model = self.model.lock().await;
        let open = model.get_content_state().await.reading.chapter;
        let chapter = match open {
            Some(chapter) => Some(chapter),
            None => model.get_selected_chapter().await,
        };
        drop(model);

        if let Some(chapter) = chapter {
            tracing::info!(chapter = chapter.number, "Playing chapter");
            self.play_target(PlaybackTarget::chapter(chapter.number, chapter.verse_count))
                .await;
        }
    }

    pub async fn play_favorite(&self) {
        let model = self.model.lock().await;
        let Some(entry) = model.get_selected_favorite().await else {
            return;
        };
        let verse_count = model.verse_count(entry.chapter).await;
        drop(model);

        self.play_target(PlaybackTarget::verse(entry.chapter, entry.verse, verse_count))
            .await;
    }

    pub(crate) async fn play_target(&self, target: PlaybackTarget) {
        let mut player = self.player.lock().await;
        if !player.audio_enabled() {
            drop(player);
            let model = self.model.lock().await;
            model
                .set_error("Audio is turned off. Press 'a' to turn it back on.".to_string())
                .await;
            return;
        }
        player.load_and_play(target);
        let info = player.info();
        drop(player);

        self.report_playback_failure(info.status, info.last_error).await;
        if let Some(verse) = target.verse_number() {
            let model = self.model.lock().await;
            model.follow_verse(target.chapter_number(), verse).await;
        }
    }

    pub async fn toggle_playback(&self) {
        let mut player = self.player.lock().await;
        if player.target().is_none() {
            drop(player);
            let tab = self.model.lock().await.get_ui_state().await.active_tab;
            if tab == Tab::Quran {
                self.play_selected_verse().await;
            }
            return;
        }
        player.toggle();
        let info = player.info();
        drop(player);
        tracing::debug!(status = ?info.status, "Playback toggled");
        self.report_playback_failure(info.status, info.last_error).await;
    }

    pub async fn stop_playback(&self) {
        self.player.lock().await.stop();
        tracing::info!("Playback stopped");
    }

    pub async fn next_verse(&self) {
        self.step_verse(true).await;
    }

    pub async fn previous_verse(&self) {
        self.step_verse(false).await;
    }

    async fn step_verse(&self, forward: bool) {
        let mut player = self.player.lock().await;
        if forward {
            player.next();
        } else {
            player.previous();
        }
        let info = player.info();
        drop(player);

        self.report_playback_failure(info.status, info.last_error).await;
        if let Some(target) = info.target {
            if let Some(verse) = target.verse_number() {
                let model = self.model.lock().await;
                model.follow_verse(target.chapter_number(), verse).await;
            }
        }
    }

    pub async fn cycle_loop_mode(&self) {
        let mode = self.player.lock().await.cycle_mode();
        tracing::info!(mode = ?mode, "Loop mode changed");
    }

    pub async fn change_repeat_count(&self, delta: i64) {
        let mut player = self.player.lock().await;
        let count = player.repeat_count() as i64 + delta;
        let count = player.set_repeat_count(count);
        tracing::debug!(count, "Repeat count changed");
    }

    pub async fn change_volume(&self, up: bool) {
        let mut player = self.player.lock().await;
        let step = if up { VOLUME_STEP } else { -VOLUME_STEP };
        let volume = ((player.volume() + step) * 100.0).round() / 100.0;
        player.set_volume(volume);
    }

    pub async fn cycle_reciter(&self) {
        let mut player = self.player.lock().await;
        let next = catalog::next_reciter(player.reciter().id);
        let reciter = player.set_reciter(next.id);
        tracing::info!(reciter = reciter.id, "Reciter changed");
    }

    pub async fn toggle_audio(&self) {
        let mut player = self.player.lock().await;
        let enabled = !player.audio_enabled();
        player.set_audio_enabled(enabled);
        tracing::info!(enabled, "Audio toggled");
    }

    async fn report_playback_failure(&self, status: PlaybackStatus, error: Option<String>) {
        if status != PlaybackStatus::Errored {
            return;
        }
        if let Some(message) = error {
            let model = self.model.lock().await;
            model.set_error(format!("Playback failed: {message}")).await;
        }
    }
}
