//! Core type definitions for the application

use std::time::Instant;
use serde::{Deserialize, Serialize};

/// Where a chapter was revealed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revelation {
    Meccan,
    Medinan,
}

/// A chapter (surah) as listed by the content API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u16,
    pub name: String,
    #[serde(rename = "englishName")]
    pub english_name: String,
    #[serde(rename = "englishNameTranslation")]
    pub english_name_translation: String,
    #[serde(rename = "numberOfAyahs")]
    pub verse_count: u16,
    #[serde(rename = "revelationType")]
    pub revelation: Revelation,
}

/// A single verse (ayah) with its optional translation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verse {
    pub chapter: u16,
    pub number: u16,
    pub text: String,
    pub translation: Option<String>,
}

/// Colour theme, cycled from the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Sepia,
            Theme::Sepia => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Sepia => "Sepia",
        }
    }
}

/// Which part of the UI has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Chapters,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Chapters => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Chapters,
        }
    }
}

/// Tabs of the main content area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Quran,
    Duas,
    Prayer,
    Favorites,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Quran, Tab::Duas, Tab::Prayer, Tab::Favorites];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Quran => "Quran",
            Tab::Duas => "Duas",
            Tab::Prayer => "Prayer",
            Tab::Favorites => "Favorites",
        }
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub active_tab: Tab,
    pub chapter_filter: String,
    pub dua_query: String,
    /// Typed characters go to the filter of the focused list
    pub filter_editing: bool,
    pub chapter_selected: usize,
    pub content_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Chapters,
            active_tab: Tab::Quran,
            chapter_filter: String::new(),
            dua_query: String::new(),
            filter_editing: false,
            chapter_selected: 0,
            content_selected: 0,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
        }
    }
}
