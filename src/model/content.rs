//! Content view state: chapter list, reading pane and display settings

use super::catalog::{self, City};
use super::types::{Chapter, Theme, Verse};
use crate::settings::{DEFAULT_FONT_SIZE, PrefKey, Preferences};

/// Identifies a reading-pane fetch so a late response for an older
/// chapter or translation can be recognised and dropped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadingRequest {
    pub id: u64,
    pub chapter: u16,
    pub translation: String,
}

#[derive(Clone, Debug, Default)]
pub struct ReadingPane {
    pub chapter: Option<Chapter>,
    pub verses: Vec<Verse>,
    pub loading: bool,
    pub pending: Option<ReadingRequest>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub chapters: Vec<Chapter>,
    pub chapters_loading: bool,
    pub reading: ReadingPane,
    /// Words revealed on the selected verse while hifz mode is on
    pub hifz_revealed: usize,
    pub(crate) request_counter: u64,
}

impl ContentState {
    /// Chapters matching `filter` by number, transliterated or translated name
    pub fn filtered_chapters(&self, filter: &str) -> Vec<&Chapter> {
        let filter = filter.trim().to_lowercase();
        if filter.is_empty() {
            return self.chapters.iter().collect();
        }
        self.chapters
            .iter()
            .filter(|c| {
                c.number.to_string() == filter
                    || c.english_name.to_lowercase().contains(&filter)
                    || c.english_name_translation.to_lowercase().contains(&filter)
            })
            .collect()
    }

    pub fn chapter(&self, number: u16) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }
}

/// Reading preferences mirrored from the preference store
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySettings {
    pub theme: Theme,
    pub hifz: bool,
    pub tajweed: bool,
    pub translation: String,
    pub city: &'static City,
    /// Arabic text size in px, shared with other clients of the same preference file
    pub font_size: u16,
}

impl DisplaySettings {
    pub fn from_prefs(prefs: &Preferences) -> Self {
        Self {
            theme: prefs.theme(),
            hifz: prefs.get(PrefKey::HifzMode),
            tajweed: prefs.get(PrefKey::TajweedMode),
            translation: prefs.translation(),
            city: prefs.selected_city(),
            font_size: prefs.font_size(),
        }
    }

    pub fn translation_label(&self) -> &'static str {
        catalog::translation_label(&self.translation)
    }

    /// Columns available to Arabic text in a pane `width` wide; larger sizes wrap sooner
    pub fn arabic_width(&self, width: usize) -> usize {
        (width * DEFAULT_FONT_SIZE as usize / self.font_size.max(1) as usize).max(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Revelation;

    fn chapter(number: u16, name: &str, meaning: &str) -> Chapter {
        Chapter {
            number,
            name: String::new(),
            english_name: name.to_string(),
            english_name_translation: meaning.to_string(),
            verse_count: 7,
            revelation: Revelation::Meccan,
        }
    }

    #[test]
    fn filter_matches_number_and_names() {
        let state = ContentState {
            chapters: vec![
                chapter(1, "Al-Faatiha", "The Opening"),
                chapter(2, "Al-Baqara", "The Cow"),
                chapter(12, "Yusuf", "Joseph"),
            ],
            ..Default::default()
        };
        assert_eq!(state.filtered_chapters("").len(), 3);
        assert_eq!(state.filtered_chapters("2")[0].number, 2);
        assert_eq!(state.filtered_chapters("COW")[0].number, 2);
        assert_eq!(state.filtered_chapters("al-")[1].number, 2);
        assert!(state.filtered_chapters("zzz").is_empty());
    }

    #[test]
    fn display_settings_follow_preferences() {
        let prefs = Preferences::in_memory();
        prefs.set(PrefKey::TajweedMode, true).unwrap();
        let display = DisplaySettings::from_prefs(&prefs);
        assert!(display.tajweed);
        assert!(!display.hifz);
        assert_eq!(display.city.name, "Auckland");
        assert_eq!(display.translation, "en.sahih");
    }

    #[test]
    fn larger_arabic_text_wraps_sooner() {
        let prefs = Preferences::in_memory();
        let mut display = DisplaySettings::from_prefs(&prefs);
        assert_eq!(display.arabic_width(60), 60);
        display.font_size = 48;
        assert_eq!(display.arabic_width(60), 30);
        assert_eq!(display.arabic_width(4), 8);
    }
}
