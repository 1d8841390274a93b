//! Navigation-related controller methods (chapters, reading pane, tabs, bookmarks)

use crate::model::{ActiveSection, Chapter, Tab};
use super::AppController;

impl AppController {
    pub async fn load_chapters(&self) {
        tracing::debug!("Loading chapter list");
        self.model.lock().await.set_chapters_loading(true).await;

        match self.client.fetch_chapter_list().await {
            Ok(chapters) => {
                tracing::info!(count = chapters.len(), "Chapter list loaded");
                self.model.lock().await.set_chapters(chapters).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load chapter list");
                let model = self.model.lock().await;
                model.set_chapters_loading(false).await;
                model.set_error(e.user_message()).await;
            }
        }
    }

    /// Open `number` once the chapter list is available
    pub async fn open_chapter_number(&self, number: u16) {
        let chapter = {
            let model = self.model.lock().await;
            model.get_content_state().await.chapter(number).cloned()
        };
        match chapter {
            Some(chapter) => self.open_chapter(chapter).await,
            None => tracing::warn!(number, "Requested chapter is not in the chapter list"),
        }
    }

    pub async fn open_selected_chapter(&self) {
        let model = self.model.lock().await;
        let Some(chapter) = model.get_selected_chapter().await else {
            return;
        };
        model.set_active_section(ActiveSection::MainContent).await;
        drop(model);
        self.open_chapter(chapter).await;
    }

    pub async fn open_chapter(&self, chapter: Chapter) {
        self.open_chapter_at(chapter, None).await;
    }

    /// Load verses for `chapter` in the background, then put the cursor on
    /// `focus` if given. A response that arrives after another chapter or
    /// translation was requested is discarded.
    pub async fn open_chapter_at(&self, chapter: Chapter, focus: Option<u16>) {
        let model = self.model.lock().await;
        let translation = model.get_display().await.translation;
        model.set_tab(Tab::Quran).await;
        let request = model.begin_reading(chapter, &translation).await;
        drop(model);

        tracing::debug!(chapter = request.chapter, translation = %request.translation, "Opening chapter");
        let controller = self.clone();
        tokio::spawn(async move {
            let result = controller
                .client
                .fetch_verses(request.chapter, &request.translation)
                .await;
            let error = result.as_ref().err().map(|e| e.user_message());

            let model = controller.model.lock().await;
            if model.finish_reading(&request, result).await {
                match (error, focus) {
                    (Some(message), _) => model.set_error(message).await,
                    (None, Some(verse)) => model.select_verse(verse).await,
                    (None, None) => {}
                }
            }
        });
    }

    /// Re-fetch the open chapter, e.g. after the translation changed
    pub async fn reload_reading(&self) {
        let chapter = self.model.lock().await.get_content_state().await.reading.chapter;
        if let Some(chapter) = chapter {
            self.open_chapter(chapter).await;
        }
    }

    pub async fn cycle_translation(&self) {
        let result = self.model.lock().await.cycle_translation().await;
        if let Some(code) = self.report("Changing translation", result).await {
            tracing::info!(translation = %code, "Translation changed");
            self.reload_reading().await;
        }
    }

    pub async fn toggle_bookmark(&self) {
        let model = self.model.lock().await;
        let Some(verse) = model.get_selected_verse().await else {
            return;
        };
        let chapter_name = model
            .get_content_state()
            .await
            .reading
            .chapter
            .map(|c| c.english_name)
            .unwrap_or_default();
        let result = model.toggle_favorite(&verse, &chapter_name).await;
        drop(model);
        self.report("Saving bookmark", result).await;
    }

    pub async fn remove_selected_favorite(&self) {
        let result = self.model.lock().await.remove_selected_favorite().await;
        self.report("Removing bookmark", result).await;
    }

    pub async fn clear_favorites(&self) {
        let result = self.model.lock().await.clear_favorites().await;
        self.report("Clearing bookmarks", result).await;
    }

    /// Open the bookmarked verse in the reading pane
    pub async fn open_selected_favorite(&self) {
        let model = self.model.lock().await;
        let Some(entry) = model.get_selected_favorite().await else {
            return;
        };
        let chapter = model.get_content_state().await.chapter(entry.chapter).cloned();
        drop(model);

        if let Some(chapter) = chapter {
            self.open_chapter_at(chapter, Some(entry.verse)).await;
        }
    }

    pub async fn cycle_city(&self) {
        let result = self.model.lock().await.cycle_city().await;
        if let Some(city) = self.report("Changing city", result).await {
            tracing::info!(city = city.name, "Prayer-time city changed");
        }
    }

    pub async fn change_font_size(&self, delta: i64) {
        let result = self.model.lock().await.change_font_size(delta).await;
        if let Some(size) = self.report("Changing text size", result).await {
            tracing::debug!(size, "Arabic text size changed");
        }
    }

    pub async fn cycle_theme(&self) {
        let result = self.model.lock().await.cycle_theme().await;
        self.report("Changing theme", result).await;
    }

    pub async fn toggle_hifz(&self) {
        let result = self.model.lock().await.toggle_hifz().await;
        self.report("Toggling hifz mode", result).await;
    }

    pub async fn toggle_tajweed(&self) {
        let result = self.model.lock().await.toggle_tajweed().await;
        self.report("Toggling tajweed mode", result).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::{Mutex, mpsc};

    use crate::audio::SilentEngine;
    use crate::controller::PlaybackController;
    use crate::error::FetchError;
    use crate::model::quran_client::tests::{FakeSource, ayahs_json, chapter_list_json};
    use crate::model::{AppModel, QuranClient};
    use crate::settings::Preferences;

    fn controller(source: Arc<FakeSource>) -> AppController {
        let prefs = Preferences::in_memory();
        let (tx, _rx) = mpsc::unbounded_channel();
        let player = PlaybackController::new(Box::new(SilentEngine::new("test")), tx, prefs.clone());
        AppController::new(
            Arc::new(Mutex::new(AppModel::new(prefs))),
            Arc::new(Mutex::new(player)),
            QuranClient::new(source),
        )
    }

    async fn wait_for_reading(controller: &AppController) {
        for _ in 0..100 {
            let loading = controller.model.lock().await.get_content_state().await.reading.loading;
            if !loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn opening_a_chapter_fills_the_reading_pane() {
        let source = FakeSource::with(vec![
            ("/surah", Ok(chapter_list_json())),
            ("/surah/1", Ok(ayahs_json(&["a1", "a2"]))),
            ("/surah/1/en.sahih", Ok(ayahs_json(&["t1", "t2"]))),
        ]);
        let controller = controller(source);
        controller.load_chapters().await;
        controller.open_chapter_number(1).await;
        wait_for_reading(&controller).await;

        let content = controller.model.lock().await.get_content_state().await;
        assert_eq!(content.chapters.len(), 2);
        assert_eq!(content.reading.verses.len(), 2);
        assert_eq!(content.reading.verses[1].translation.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn chapter_list_failure_is_reported() {
        let source = FakeSource::with(vec![("/surah", Err(FetchError::Network("offline".into())))]);
        let controller = controller(source);
        controller.load_chapters().await;

        let model = controller.model.lock().await;
        assert!(model.has_error().await);
        assert!(!model.get_content_state().await.chapters_loading);
    }

    #[tokio::test]
    async fn bookmark_toggles_selected_verse() {
        let source = FakeSource::with(vec![
            ("/surah", Ok(chapter_list_json())),
            ("/surah/1", Ok(ayahs_json(&["a1", "a2"]))),
            ("/surah/1/en.sahih", Ok(ayahs_json(&["t1", "t2"]))),
        ]);
        let controller = controller(source);
        controller.load_chapters().await;
        controller.open_chapter_number(1).await;
        wait_for_reading(&controller).await;

        controller.toggle_bookmark().await;
        let favorites = controller.model.lock().await.favorites().await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].chapter_name, "Al-Faatiha");
        assert_eq!(favorites[0].verse_text, "a1");
    }

    #[tokio::test]
    async fn clear_key_empties_the_favorites_tab() {
        let source = FakeSource::with(vec![
            ("/surah", Ok(chapter_list_json())),
            ("/surah/1", Ok(ayahs_json(&["a1", "a2"]))),
            ("/surah/1/en.sahih", Ok(ayahs_json(&["t1", "t2"]))),
        ]);
        let controller = controller(source);
        controller.load_chapters().await;
        controller.open_chapter_number(1).await;
        wait_for_reading(&controller).await;
        controller.toggle_bookmark().await;
        assert_eq!(controller.model.lock().await.favorites().await.len(), 1);

        let press = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        controller.handle_key_event(press('4')).await.unwrap();
        controller.handle_key_event(press('C')).await.unwrap();

        let model = controller.model.lock().await;
        assert!(model.favorites().await.is_empty());
        assert_eq!(model.get_ui_state().await.content_selected, 0);
        assert!(!model.has_error().await);
    }

    #[tokio::test]
    async fn silent_engine_failure_is_surfaced() {
        let source = FakeSource::with(vec![]);
        let controller = controller(source);
        controller
            .play_target(crate::model::PlaybackTarget::verse(1, 1, 7))
            .await;
        assert!(controller.model.lock().await.has_error().await);
        assert_eq!(
            controller.playback_info().await.status,
            crate::model::PlaybackStatus::Errored
        );
    }
}
