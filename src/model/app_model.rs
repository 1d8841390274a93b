//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Mutex;

use super::calendar::Prayer;
use super::catalog;
use super::content::{ContentState, DisplaySettings, ReadingRequest};
use super::duas;
use super::favorites::{FavoriteEntry, FavoriteFields, FavoritesLedger};
use super::types::{ActiveSection, Chapter, Tab, Theme, UiState, Verse};
use crate::error::FetchError;
use crate::settings::{PrefKey, Preferences};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel {
    prefs: Preferences,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    display: Arc<Mutex<DisplaySettings>>,
    favorites: Arc<Mutex<FavoritesLedger>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            display: Arc::new(Mutex::new(DisplaySettings::from_prefs(&prefs))),
            favorites: Arc::new(Mutex::new(FavoritesLedger::load(prefs.clone()))),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
            prefs,
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn get_display(&self) -> DisplaySettings {
        self.display.lock().await.clone()
    }

    // ========================================================================
    // Focus & Tabs
    // ========================================================================

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
        state.filter_editing = false;
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn set_tab(&self, tab: Tab) {
        let mut state = self.ui_state.lock().await;
        if state.active_tab != tab {
            state.active_tab = tab;
            state.content_selected = 0;
            state.filter_editing = false;
        }
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub async fn start_filter(&self) {
        self.ui_state.lock().await.filter_editing = true;
    }

    pub async fn stop_filter(&self) {
        self.ui_state.lock().await.filter_editing = false;
    }

    pub async fn append_to_filter(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Chapters => {
                state.chapter_filter.push(c);
                state.chapter_selected = 0;
            }
            ActiveSection::MainContent => {
                state.dua_query.push(c);
                state.content_selected = 0;
            }
        }
    }

    pub async fn backspace_filter(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Chapters => {
                state.chapter_filter.pop();
                state.chapter_selected = 0;
            }
            ActiveSection::MainContent => {
                state.dua_query.pop();
                state.content_selected = 0;
            }
        }
    }

    pub async fn clear_filter(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Chapters => state.chapter_filter.clear(),
            ActiveSection::MainContent => state.dua_query.clear(),
        }
        state.filter_editing = false;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        let section = state.active_section;
        match section {
            ActiveSection::Chapters => {
                state.chapter_selected = state.chapter_selected.saturating_sub(1);
            }
            ActiveSection::MainContent => {
                state.content_selected = state.content_selected.saturating_sub(1);
                drop(state);
                self.content_state.lock().await.hifz_revealed = 0;
            }
        }
    }

    pub async fn move_selection_down(&self) {
        let len = self.selectable_len().await;
        let mut state = self.ui_state.lock().await;
        let section = state.active_section;
        match section {
            ActiveSection::Chapters => {
                if state.chapter_selected + 1 < len {
                    state.chapter_selected += 1;
                }
            }
            ActiveSection::MainContent => {
                if state.content_selected + 1 < len {
                    state.content_selected += 1;
                }
                drop(state);
                self.content_state.lock().await.hifz_revealed = 0;
            }
        }
    }

    /// Number of rows in the focused list
    async fn selectable_len(&self) -> usize {
        let ui = self.get_ui_state().await;
        match ui.active_section {
            ActiveSection::Chapters => {
                let content = self.content_state.lock().await;
                content.filtered_chapters(&ui.chapter_filter).len()
            }
            ActiveSection::MainContent => match ui.active_tab {
                Tab::Quran => self.content_state.lock().await.reading.verses.len(),
                Tab::Duas => duas::search(&ui.dua_query).len(),
                Tab::Prayer => Prayer::ALL.len(),
                Tab::Favorites => self.favorites.lock().await.len(),
            },
        }
    }

    pub async fn get_selected_chapter(&self) -> Option<Chapter> {
        let ui = self.get_ui_state().await;
        let content = self.content_state.lock().await;
        content
            .filtered_chapters(&ui.chapter_filter)
            .get(ui.chapter_selected)
            .map(|c| (*c).clone())
    }

    pub async fn get_selected_verse(&self) -> Option<Verse> {
        let selected = self.ui_state.lock().await.content_selected;
        self.content_state.lock().await.reading.verses.get(selected).cloned()
    }

    /// Move the reading-pane cursor onto `verse`
    pub async fn select_verse(&self, verse: u16) {
        let index = {
            let content = self.content_state.lock().await;
            content.reading.verses.iter().position(|v| v.number == verse)
        };
        if let Some(index) = index {
            let mut state = self.ui_state.lock().await;
            state.active_tab = Tab::Quran;
            state.active_section = ActiveSection::MainContent;
            state.content_selected = index;
        }
    }

    /// Keep the cursor on the verse being recited while the reading pane shows its chapter
    pub async fn follow_verse(&self, chapter: u16, verse: u16) {
        let index = {
            let content = self.content_state.lock().await;
            if content.reading.chapter.as_ref().map(|c| c.number) != Some(chapter) {
                return;
            }
            content.reading.verses.iter().position(|v| v.number == verse)
        };
        let mut state = self.ui_state.lock().await;
        if let (Some(index), Tab::Quran) = (index, state.active_tab) {
            state.content_selected = index;
        }
    }

    pub async fn reveal_next_word(&self) {
        let mut content = self.content_state.lock().await;
        content.hifz_revealed = content.hifz_revealed.saturating_add(1);
    }

    // ========================================================================
    // Chapters & Reading Pane
    // ========================================================================

    pub async fn set_chapters_loading(&self, loading: bool) {
        self.content_state.lock().await.chapters_loading = loading;
    }

    pub async fn set_chapters(&self, chapters: Vec<Chapter>) {
        let mut content = self.content_state.lock().await;
        content.chapters = chapters;
        content.chapters_loading = false;
    }

    pub async fn verse_count(&self, chapter: u16) -> u16 {
        let content = self.content_state.lock().await;
        content
            .chapter(chapter)
            .map(|c| c.verse_count)
            .or_else(|| catalog::verse_count(chapter))
            .unwrap_or(1)
    }

    /// Mark the reading pane as loading `chapter` and hand out the request tag
    pub async fn begin_reading(&self, chapter: Chapter, translation: &str) -> ReadingRequest {
        let mut content = self.content_state.lock().await;
        content.request_counter += 1;
        let request = ReadingRequest {
            id: content.request_counter,
            chapter: chapter.number,
            translation: translation.to_string(),
        };
        if content.reading.chapter.as_ref().map(|c| c.number) != Some(chapter.number) {
            content.reading.verses.clear();
            drop(content);
            self.ui_state.lock().await.content_selected = 0;
            content = self.content_state.lock().await;
        }
        content.reading.chapter = Some(chapter);
        content.reading.loading = true;
        content.reading.error = None;
        content.reading.pending = Some(request.clone());
        content.hifz_revealed = 0;
        request
    }

    /// Apply a fetch result if it still answers the latest request.
    /// Returns false when the result was stale and dropped.
    pub async fn finish_reading(
        &self,
        request: &ReadingRequest,
        result: Result<Vec<Verse>, FetchError>,
    ) -> bool {
        let mut content = self.content_state.lock().await;
        if content.reading.pending.as_ref() != Some(request) {
            tracing::debug!(request = request.id, "Dropping stale reading-pane result");
            return false;
        }
        content.reading.pending = None;
        content.reading.loading = false;
        match result {
            Ok(verses) => {
                content.reading.verses = verses;
                content.reading.error = None;
            }
            Err(e) => {
                content.reading.error = Some(e.user_message());
            }
        }
        true
    }

    // ========================================================================
    // Display Preferences
    // ========================================================================

    pub async fn cycle_theme(&self) -> Result<Theme> {
        let mut display = self.display.lock().await;
        let theme = display.theme.next();
        self.prefs.set_theme(theme)?;
        display.theme = theme;
        Ok(theme)
    }

    pub async fn toggle_hifz(&self) -> Result<bool> {
        let enabled = self.prefs.toggle(PrefKey::HifzMode)?;
        self.display.lock().await.hifz = enabled;
        self.content_state.lock().await.hifz_revealed = 0;
        Ok(enabled)
    }

    pub async fn toggle_tajweed(&self) -> Result<bool> {
        let enabled = self.prefs.toggle(PrefKey::TajweedMode)?;
        self.display.lock().await.tajweed = enabled;
        Ok(enabled)
    }

    pub async fn cycle_translation(&self) -> Result<String> {
        let mut display = self.display.lock().await;
        let code = catalog::next_translation(&display.translation);
        self.prefs.set_translation(code)?;
        display.translation = code.to_string();
        Ok(display.translation.clone())
    }

    /// Step the Arabic text size; the preference layer clamps it
    pub async fn change_font_size(&self, delta: i64) -> Result<u16> {
        let mut display = self.display.lock().await;
        let size = self.prefs.set_font_size(display.font_size as i64 + delta)?;
        display.font_size = size;
        Ok(size)
    }

    pub async fn cycle_city(&self) -> Result<&'static catalog::City> {
        let mut display = self.display.lock().await;
        let city = catalog::next_city(display.city.name);
        self.prefs.set(PrefKey::SelectedCity, city.name)?;
        display.city = city;
        Ok(city)
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn favorites(&self) -> Vec<FavoriteEntry> {
        self.favorites.lock().await.entries().to_vec()
    }

    pub async fn is_favorite(&self, chapter: u16, verse: u16) -> bool {
        self.favorites.lock().await.contains(chapter, verse)
    }

    pub async fn toggle_favorite(&self, verse: &Verse, chapter_name: &str) -> Result<bool> {
        let fields = FavoriteFields {
            chapter_name: chapter_name.to_string(),
            verse_text: verse.text.clone(),
            translation: verse.translation.clone().unwrap_or_default(),
        };
        self.favorites.lock().await.toggle(verse.chapter, verse.number, fields)
    }

    pub async fn get_selected_favorite(&self) -> Option<FavoriteEntry> {
        let selected = self.ui_state.lock().await.content_selected;
        self.favorites.lock().await.entries().get(selected).cloned()
    }

    pub async fn remove_selected_favorite(&self) -> Result<()> {
        let Some(entry) = self.get_selected_favorite().await else {
            return Ok(());
        };
        let remaining = {
            let mut favorites = self.favorites.lock().await;
            favorites.remove(entry.chapter, entry.verse)?;
            favorites.len()
        };
        let mut state = self.ui_state.lock().await;
        state.content_selected = state.content_selected.min(remaining.saturating_sub(1));
        Ok(())
    }

    pub async fn clear_favorites(&self) -> Result<()> {
        self.favorites.lock().await.clear()?;
        self.ui_state.lock().await.content_selected = 0;
        Ok(())
    }

    // ========================================================================
    // Errors & Popups
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Revelation;

    fn chapter(number: u16, verse_count: u16) -> Chapter {
        Chapter {
            number,
            name: String::new(),
            english_name: format!("Chapter {number}"),
            english_name_translation: String::new(),
            verse_count,
            revelation: Revelation::Meccan,
        }
    }

    fn verses(chapter: u16, count: u16) -> Vec<Verse> {
        (1..=count)
            .map(|number| Verse {
                chapter,
                number,
                text: format!("text {number}"),
                translation: Some(format!("translation {number}")),
            })
            .collect()
    }

    #[tokio::test]
    async fn stale_reading_results_are_dropped() {
        let model = AppModel::new(Preferences::in_memory());
        let first = model.begin_reading(chapter(1, 7), "en.sahih").await;
        let second = model.begin_reading(chapter(2, 286), "en.sahih").await;

        assert!(!model.finish_reading(&first, Ok(verses(1, 7))).await);
        let content = model.get_content_state().await;
        assert!(content.reading.loading);
        assert!(content.reading.verses.is_empty());

        assert!(model.finish_reading(&second, Ok(verses(2, 3))).await);
        let content = model.get_content_state().await;
        assert!(!content.reading.loading);
        assert_eq!(content.reading.chapter.map(|c| c.number), Some(2));
        assert_eq!(content.reading.verses.len(), 3);
    }

    #[tokio::test]
    async fn translation_change_supersedes_pending_request() {
        let model = AppModel::new(Preferences::in_memory());
        let sahih = model.begin_reading(chapter(1, 7), "en.sahih").await;
        let pickthall = model.begin_reading(chapter(1, 7), "en.pickthall").await;
        assert_ne!(sahih, pickthall);
        assert!(!model.finish_reading(&sahih, Ok(verses(1, 7))).await);
        assert!(model.finish_reading(&pickthall, Err(FetchError::Status(404))).await);

        let content = model.get_content_state().await;
        assert!(content.reading.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn selection_stays_within_the_focused_list() {
        let model = AppModel::new(Preferences::in_memory());
        model.set_chapters(vec![chapter(1, 7), chapter(2, 286)]).await;
        for _ in 0..5 {
            model.move_selection_down().await;
        }
        assert_eq!(model.get_selected_chapter().await.map(|c| c.number), Some(2));

        model.cycle_section().await;
        let request = model.begin_reading(chapter(1, 7), "en.sahih").await;
        model.finish_reading(&request, Ok(verses(1, 3))).await;
        for _ in 0..10 {
            model.move_selection_down().await;
        }
        assert_eq!(model.get_selected_verse().await.map(|v| v.number), Some(3));
        model.move_selection_up().await;
        assert_eq!(model.get_selected_verse().await.map(|v| v.number), Some(2));
    }

    #[tokio::test]
    async fn chapter_filter_narrows_selection() {
        let model = AppModel::new(Preferences::in_memory());
        model.set_chapters(vec![chapter(1, 7), chapter(2, 286), chapter(3, 200)]).await;
        model.start_filter().await;
        model.append_to_filter('3').await;
        assert_eq!(model.get_selected_chapter().await.map(|c| c.number), Some(3));
        model.backspace_filter().await;
        assert_eq!(model.get_selected_chapter().await.map(|c| c.number), Some(1));
    }

    #[tokio::test]
    async fn favorite_toggle_twice_restores_ledger() {
        let prefs = Preferences::in_memory();
        let model = AppModel::new(prefs.clone());
        let all = verses(1, 2);
        let verse = &all[1];

        assert!(model.toggle_favorite(verse, "Al-Faatiha").await.unwrap());
        assert!(model.is_favorite(1, 2).await);
        assert!(!model.toggle_favorite(verse, "Al-Faatiha").await.unwrap());
        assert!(model.favorites().await.is_empty());
        assert_eq!(prefs.get::<Vec<FavoriteEntry>>(PrefKey::Favorites), vec![]);
    }

    #[tokio::test]
    async fn display_toggles_persist() {
        let prefs = Preferences::in_memory();
        let model = AppModel::new(prefs.clone());
        assert_eq!(model.cycle_theme().await.unwrap(), Theme::Dark);
        assert!(model.toggle_hifz().await.unwrap());
        assert_eq!(model.cycle_translation().await.unwrap(), "en.pickthall");

        assert_eq!(prefs.theme(), Theme::Dark);
        assert!(prefs.get::<bool>(PrefKey::HifzMode));
        assert_eq!(prefs.translation(), "en.pickthall");
        assert_eq!(model.get_display().await.translation, "en.pickthall");
    }

    #[tokio::test]
    async fn font_size_steps_are_clamped() {
        let prefs = Preferences::in_memory();
        let model = AppModel::new(prefs.clone());
        assert_eq!(model.change_font_size(2).await.unwrap(), 26);
        assert_eq!(model.change_font_size(100).await.unwrap(), 48);
        assert_eq!(prefs.font_size(), 48);
        assert_eq!(model.get_display().await.font_size, 48);
    }

    #[tokio::test]
    async fn select_verse_moves_focus_to_the_reading_pane() {
        let model = AppModel::new(Preferences::in_memory());
        model.set_tab(Tab::Favorites).await;
        let request = model.begin_reading(chapter(1, 7), "en.sahih").await;
        model.finish_reading(&request, Ok(verses(1, 7))).await;

        model.select_verse(5).await;
        let ui = model.get_ui_state().await;
        assert_eq!(ui.active_tab, Tab::Quran);
        assert_eq!(ui.content_selected, 4);
    }

    #[tokio::test]
    async fn errors_clear_explicitly() {
        let model = AppModel::new(Preferences::in_memory());
        model.set_error("offline".to_string()).await;
        assert!(model.has_error().await);
        model.auto_clear_old_errors().await;
        assert!(model.has_error().await);
        model.clear_error().await;
        assert!(!model.has_error().await);
    }
}
