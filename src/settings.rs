//! Typed preference store
//!
//! Every user setting is addressed by a [`PrefKey`] with a known default. Values
//! live in a single JSON object and are written back to the backend on every
//! mutation, so a crash never loses more than the in-flight change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::model::catalog;
use crate::model::{LoopMode, Theme, clamp_repeat_count, clamp_volume};

pub const PREFERENCES_FILE: &str = "preferences.json";
pub const DEFAULT_FONT_SIZE: u16 = 24;
pub const MIN_FONT_SIZE: u16 = 18;
pub const MAX_FONT_SIZE: u16 = 48;

/// Enumerated preference keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefKey {
    Translation,
    FontSizeArabic,
    Theme,
    HifzMode,
    TajweedMode,
    Reciter,
    LoopMode,
    RepeatCount,
    Volume,
    AudioEnabled,
    Favorites,
    SelectedCity,
}

impl PrefKey {
    pub const ALL: [PrefKey; 12] = [
        PrefKey::Translation,
        PrefKey::FontSizeArabic,
        PrefKey::Theme,
        PrefKey::HifzMode,
        PrefKey::TajweedMode,
        PrefKey::Reciter,
        PrefKey::LoopMode,
        PrefKey::RepeatCount,
        PrefKey::Volume,
        PrefKey::AudioEnabled,
        PrefKey::Favorites,
        PrefKey::SelectedCity,
    ];

    /// Name under which the value is stored
    pub fn name(self) -> &'static str {
        match self {
            PrefKey::Translation => "translation",
            PrefKey::FontSizeArabic => "fontSizeArabic",
            PrefKey::Theme => "theme",
            PrefKey::HifzMode => "hifzMode",
            PrefKey::TajweedMode => "tajweedMode",
            PrefKey::Reciter => "reciter",
            PrefKey::LoopMode => "loopMode",
            PrefKey::RepeatCount => "repeatCount",
            PrefKey::Volume => "volume",
            PrefKey::AudioEnabled => "audioEnabled",
            PrefKey::Favorites => "quran-favorites",
            PrefKey::SelectedCity => "selected-city",
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            PrefKey::Translation => json!(catalog::DEFAULT_TRANSLATION),
            PrefKey::FontSizeArabic => json!(DEFAULT_FONT_SIZE),
            PrefKey::Theme => json!("light"),
            PrefKey::HifzMode => json!(false),
            PrefKey::TajweedMode => json!(false),
            PrefKey::Reciter => json!(catalog::DEFAULT_RECITER),
            PrefKey::LoopMode => json!("none"),
            PrefKey::RepeatCount => json!(1),
            PrefKey::Volume => json!(crate::model::DEFAULT_VOLUME),
            PrefKey::AudioEnabled => json!(true),
            PrefKey::Favorites => json!([]),
            PrefKey::SelectedCity => json!(catalog::DEFAULT_CITY),
        }
    }
}

/// Storage substrate for the preference document
pub trait PreferenceBackend: Send {
    fn load(&self) -> Result<Map<String, Value>>;
    fn save(&self, values: &Map<String, Value>) -> Result<()>;
}

/// Stores preferences as a JSON file on disk
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PREFERENCES_FILE))
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(values) => Ok(values),
            other => anyhow::bail!("preferences file holds {} instead of an object", type_name(&other)),
        }
    }

    fn save(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps preferences in memory only
#[derive(Default)]
pub struct MemoryBackend {
    stored: Mutex<Map<String, Value>>,
}

impl MemoryBackend {
    pub fn with_values(values: Map<String, Value>) -> Self {
        Self { stored: Mutex::new(values) }
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load(&self) -> Result<Map<String, Value>> {
        Ok(self.stored.lock().clone())
    }

    fn save(&self, values: &Map<String, Value>) -> Result<()> {
        *self.stored.lock() = values.clone();
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

struct PreferencesInner {
    backend: Box<dyn PreferenceBackend>,
    values: Map<String, Value>,
}

/// Shared handle to the preference document
#[derive(Clone)]
pub struct Preferences {
    inner: Arc<Mutex<PreferencesInner>>,
}

impl Preferences {
    /// Load from `backend`; an unreadable document starts from defaults
    pub fn open(backend: impl PreferenceBackend + 'static) -> Self {
        let values = match backend.load() {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load preferences, using defaults");
                Map::new()
            }
        };
        tracing::debug!(keys = values.len(), "Preferences loaded");
        Self {
            inner: Arc::new(Mutex::new(PreferencesInner {
                backend: Box::new(backend),
                values,
            })),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(MemoryBackend::default())
    }

    /// Stored value for `key`, or its default when missing or undecodable
    pub fn get<T: DeserializeOwned + Default>(&self, key: PrefKey) -> T {
        let stored = self.inner.lock().values.get(key.name()).cloned();
        if let Some(value) = stored {
            match serde_json::from_value(value) {
                Ok(v) => return v,
                Err(e) => {
                    tracing::warn!(key = key.name(), error = %e, "Ignoring invalid stored preference");
                }
            }
        }
        serde_json::from_value(key.default_value()).unwrap_or_default()
    }

    /// Store `value` under `key` and persist immediately
    pub fn set<T: Serialize>(&self, key: PrefKey, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut inner = self.inner.lock();
        inner.values.insert(key.name().to_string(), value);
        let result = inner.backend.save(&inner.values);
        if let Err(e) = &result {
            tracing::error!(key = key.name(), error = %e, "Failed to persist preference");
        }
        result
    }

    pub fn is_set(&self, key: PrefKey) -> bool {
        self.inner.lock().values.contains_key(key.name())
    }

    /// Flip a boolean preference, returning the new value
    pub fn toggle(&self, key: PrefKey) -> Result<bool> {
        let value = !self.get::<bool>(key);
        self.set(key, value)?;
        Ok(value)
    }

    pub fn translation(&self) -> String {
        let code: String = self.get(PrefKey::Translation);
        if catalog::is_known_translation(&code) {
            code
        } else {
            catalog::DEFAULT_TRANSLATION.to_string()
        }
    }

    pub fn set_translation(&self, code: &str) -> Result<()> {
        if !catalog::is_known_translation(code) {
            anyhow::bail!("unknown translation code {code}");
        }
        self.set(PrefKey::Translation, code)
    }

    pub fn font_size(&self) -> u16 {
        let size: i64 = self.get(PrefKey::FontSizeArabic);
        size.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u16
    }

    pub fn set_font_size(&self, size: i64) -> Result<u16> {
        let size = size.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u16;
        self.set(PrefKey::FontSizeArabic, size)?;
        Ok(size)
    }

    pub fn theme(&self) -> Theme {
        self.get(PrefKey::Theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set(PrefKey::Theme, theme)
    }

    pub fn reciter(&self) -> &'static catalog::Reciter {
        let id: String = self.get(PrefKey::Reciter);
        catalog::reciter(&id)
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.get(PrefKey::LoopMode)
    }

    pub fn repeat_count(&self) -> u8 {
        let count: i64 = self.get(PrefKey::RepeatCount);
        clamp_repeat_count(count)
    }

    pub fn volume(&self) -> f32 {
        let volume: f64 = self.get(PrefKey::Volume);
        clamp_volume(volume as f32)
    }

    pub fn selected_city(&self) -> &'static catalog::City {
        let name: String = self.get(PrefKey::SelectedCity);
        catalog::city(&name)
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("values", &self.inner.lock().values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_when_nothing_is_stored() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.translation(), "en.sahih");
        assert_eq!(prefs.font_size(), 24);
        assert_eq!(prefs.theme(), Theme::Light);
        assert!(!prefs.get::<bool>(PrefKey::HifzMode));
        assert!(prefs.get::<bool>(PrefKey::AudioEnabled));
        assert_eq!(prefs.loop_mode(), LoopMode::Single);
        assert_eq!(prefs.repeat_count(), 1);
        assert!((prefs.volume() - 0.7).abs() < f32::EPSILON);
        assert_eq!(prefs.selected_city().name, "Auckland");
        assert_eq!(prefs.reciter().id, "ar.alafasy");
    }

    #[test]
    fn every_default_decodes() {
        for key in PrefKey::ALL {
            assert!(!key.default_value().is_null(), "{key:?}");
        }
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let mut values = Map::new();
        values.insert("theme".into(), json!("neon"));
        values.insert("repeatCount".into(), json!("three"));
        values.insert("fontSizeArabic".into(), json!(100));
        values.insert("translation".into(), json!("en.saheeh"));
        let prefs = Preferences::open(MemoryBackend::with_values(values));

        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.repeat_count(), 1);
        assert_eq!(prefs.font_size(), MAX_FONT_SIZE);
        assert_eq!(prefs.translation(), "en.sahih");
    }

    #[test]
    fn setters_clamp_and_validate() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.set_font_size(4).unwrap(), MIN_FONT_SIZE);
        assert!(prefs.set_translation("xx.nothing").is_err());
        prefs.set(PrefKey::RepeatCount, 40).unwrap();
        assert_eq!(prefs.repeat_count(), 10);
        prefs.set(PrefKey::Volume, 3.5).unwrap();
        assert_eq!(prefs.volume(), 1.0);
    }

    #[test]
    fn toggle_flips_booleans() {
        let prefs = Preferences::in_memory();
        assert!(prefs.toggle(PrefKey::TajweedMode).unwrap());
        assert!(!prefs.toggle(PrefKey::TajweedMode).unwrap());
        assert!(prefs.is_set(PrefKey::TajweedMode));
    }

    #[test]
    fn file_backend_survives_restart() {
        let dir = TempDir::new().unwrap();
        {
            let prefs = Preferences::open(JsonFileBackend::in_dir(dir.path()));
            prefs.set_theme(Theme::Sepia).unwrap();
            prefs.set(PrefKey::LoopMode, LoopMode::LoopVerse).unwrap();
        }
        let reopened = Preferences::open(JsonFileBackend::in_dir(dir.path()));
        assert_eq!(reopened.theme(), Theme::Sepia);
        assert_eq!(reopened.loop_mode(), LoopMode::LoopVerse);

        let raw = fs::read_to_string(dir.path().join(PREFERENCES_FILE)).unwrap();
        assert!(raw.contains("\"loopMode\": \"verse\""));
    }

    #[test]
    fn unreadable_file_starts_from_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "[1, 2, 3]").unwrap();
        let prefs = Preferences::open(JsonFileBackend::in_dir(dir.path()));
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn file_backend_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let prefs = Preferences::open(JsonFileBackend::in_dir(&nested));
        prefs.set(PrefKey::HifzMode, true).unwrap();
        assert!(nested.join(PREFERENCES_FILE).exists());
    }
}
