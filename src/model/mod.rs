//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (chapters, verses, UI state)
//! - `catalog`: Static tables (verse counts, reciters, translations, cities)
//! - `playback`: Playback targets, loop policy and session snapshot
//! - `content`: Chapter list, reading pane and display settings
//! - `favorites`: Bookmarked verses
//! - `text`: Hifz masking and tajweed segmentation
//! - `calendar`: Hijri date and prayer-time estimates
//! - `duas`: Static supplication table
//! - `quran_client`: Content API client with memoization
//! - `app_model`: Main application model with state management methods

mod types;
pub mod catalog;
mod playback;
mod content;
mod favorites;
pub mod text;
pub mod calendar;
pub mod duas;
pub mod quran_client;
mod app_model;

// Re-export all public types for convenient access
pub use types::{ActiveSection, Chapter, Revelation, Tab, Theme, UiState, Verse};

pub use playback::{
    DEFAULT_VOLUME, EndAction, LoopMode, PlaybackInfo, PlaybackStatus, PlaybackTarget,
    ProgressChange, clamp_repeat_count, clamp_volume, end_of_media, project_verse,
};

pub use content::{ContentState, DisplaySettings};

pub use favorites::FavoriteEntry;

pub use quran_client::QuranClient;

pub use app_model::AppModel;
