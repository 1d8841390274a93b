//! Bookmarked verses, persisted through the preference store

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::settings::{PrefKey, Preferences};

/// A bookmarked verse with denormalized display text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    #[serde(rename = "surahNumber")]
    pub chapter: u16,
    #[serde(rename = "ayahNumber")]
    pub verse: u16,
    #[serde(rename = "surahName")]
    pub chapter_name: String,
    #[serde(rename = "ayahText")]
    pub verse_text: String,
    pub translation: String,
}

/// Display fields captured when a verse is bookmarked
#[derive(Clone, Debug, Default)]
pub struct FavoriteFields {
    pub chapter_name: String,
    pub verse_text: String,
    pub translation: String,
}

/// Ledger of bookmarked verses, at most one entry per (chapter, verse)
#[derive(Clone, Debug)]
pub struct FavoritesLedger {
    prefs: Preferences,
    entries: Vec<FavoriteEntry>,
}

impl FavoritesLedger {
    pub fn load(prefs: Preferences) -> Self {
        let stored: Vec<FavoriteEntry> = prefs.get(PrefKey::Favorites);
        let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(stored.len());
        for entry in stored {
            if !entries.iter().any(|e| e.chapter == entry.chapter && e.verse == entry.verse) {
                entries.push(entry);
            }
        }
        tracing::debug!(count = entries.len(), "Favorites loaded");
        Self { prefs, entries }
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, chapter: u16, verse: u16) -> bool {
        self.position(chapter, verse).is_some()
    }

    /// Add the verse if absent, remove it if present. Returns whether it is now bookmarked.
    pub fn toggle(&mut self, chapter: u16, verse: u16, fields: FavoriteFields) -> Result<bool> {
        let now_present = match self.position(chapter, verse) {
            Some(index) => {
                self.entries.remove(index);
                false
            }
            None => {
                self.entries.push(FavoriteEntry {
                    chapter,
                    verse,
                    chapter_name: fields.chapter_name,
                    verse_text: fields.verse_text,
                    translation: fields.translation,
                });
                true
            }
        };
        tracing::info!(chapter, verse, bookmarked = now_present, "Favorite toggled");
        self.persist()?;
        Ok(now_present)
    }

    pub fn remove(&mut self, chapter: u16, verse: u16) -> Result<()> {
        if let Some(index) = self.position(chapter, verse) {
            self.entries.remove(index);
            self.persist()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    fn position(&self, chapter: u16, verse: u16) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.chapter == chapter && e.verse == verse)
    }

    fn persist(&self) -> Result<()> {
        self.prefs.set(PrefKey::Favorites, &self.entries)
    }
}
