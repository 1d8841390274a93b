//! Playback-related types: targets, loop modes, session state and the
//! end-of-media transition table

use serde::{Deserialize, Serialize};

use super::catalog::{self, Reciter, VerseSource};

pub const MIN_REPEAT_COUNT: u8 = 1;
pub const MAX_REPEAT_COUNT: u8 = 10;
pub const DEFAULT_VOLUME: f32 = 0.7;

const EVERYAYAH_BASE: &str = "https://everyayah.com/data";
const VERSE_AUDIO_BASE: &str = "https://cdn.islamic.network/quran/audio/128";
const CHAPTER_AUDIO_BASE: &str = "https://cdn.islamic.network/quran/audio-surah/128";

/// What is currently loaded into the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackTarget {
    Verse { chapter: u16, verse: u16, verse_count: u16 },
    Chapter { chapter: u16, verse_count: u16 },
}

impl PlaybackTarget {
    /// Verse number is clamped into `[1, verse_count]`
    pub fn verse(chapter: u16, verse: u16, verse_count: u16) -> Self {
        let verse_count = verse_count.max(1);
        PlaybackTarget::Verse {
            chapter,
            verse: verse.clamp(1, verse_count),
            verse_count,
        }
    }

    pub fn chapter(chapter: u16, verse_count: u16) -> Self {
        PlaybackTarget::Chapter {
            chapter,
            verse_count: verse_count.max(1),
        }
    }

    pub fn chapter_number(&self) -> u16 {
        match *self {
            PlaybackTarget::Verse { chapter, .. } | PlaybackTarget::Chapter { chapter, .. } => chapter,
        }
    }

    pub fn verse_number(&self) -> Option<u16> {
        match *self {
            PlaybackTarget::Verse { verse, .. } => Some(verse),
            PlaybackTarget::Chapter { .. } => None,
        }
    }

    /// Whole-chapter streams never have a "next" unit
    pub fn has_next(&self) -> bool {
        match *self {
            PlaybackTarget::Verse { verse, verse_count, .. } => verse < verse_count,
            PlaybackTarget::Chapter { .. } => false,
        }
    }

    /// Same target shifted by `delta` verses, or `None` at the boundary
    pub fn step(&self, delta: i32) -> Option<Self> {
        match *self {
            PlaybackTarget::Verse { chapter, verse, verse_count } => {
                let moved = verse as i32 + delta;
                if moved < 1 || moved > verse_count as i32 {
                    None
                } else {
                    Some(PlaybackTarget::Verse { chapter, verse: moved as u16, verse_count })
                }
            }
            PlaybackTarget::Chapter { .. } => None,
        }
    }

    /// The first unit of the same chapter
    pub fn restart(&self) -> Self {
        match *self {
            PlaybackTarget::Verse { chapter, verse_count, .. } => {
                PlaybackTarget::Verse { chapter, verse: 1, verse_count }
            }
            chapter @ PlaybackTarget::Chapter { .. } => chapter,
        }
    }

    /// Deterministic audio address for this target and reciter
    pub fn audio_url(&self, reciter: &Reciter) -> String {
        match *self {
            PlaybackTarget::Verse { chapter, verse, .. } => match reciter.verse_source {
                VerseSource::EveryAyah(folder) => {
                    format!("{EVERYAYAH_BASE}/{folder}/{chapter:03}{verse:03}.mp3")
                }
                VerseSource::IslamicNetwork => match catalog::global_verse_number(chapter, verse) {
                    Some(global) => format!("{VERSE_AUDIO_BASE}/{}/{global}.mp3", reciter.edition),
                    None => format!("{VERSE_AUDIO_BASE}/{}/{chapter}:{verse}.mp3", reciter.edition),
                },
            },
            PlaybackTarget::Chapter { chapter, .. } => {
                format!("{CHAPTER_AUDIO_BASE}/{}/{chapter}.mp3", reciter.edition)
            }
        }
    }
}

/// Repetition policy applied when a recording finishes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    #[default]
    #[serde(rename = "none")]
    Single,
    #[serde(rename = "verse")]
    LoopVerse,
    #[serde(rename = "surah")]
    LoopChapter,
}

impl LoopMode {
    pub fn next(self) -> Self {
        match self {
            LoopMode::Single => LoopMode::LoopVerse,
            LoopMode::LoopVerse => LoopMode::LoopChapter,
            LoopMode::LoopChapter => LoopMode::Single,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoopMode::Single => "No Loop",
            LoopMode::LoopVerse => "Verse",
            LoopMode::LoopChapter => "Surah",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Errored,
}

/// What the controller does when the current recording finishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndAction {
    /// Play the same target again from the start
    Replay,
    /// Move to the next verse
    Advance,
    /// Jump back to the first unit of the chapter
    RestartChapter,
    /// Release the resource and report `Ended`
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressChange {
    Increment,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndTransition {
    pub action: EndAction,
    pub progress: ProgressChange,
}

impl EndTransition {
    const fn new(action: EndAction, progress: ProgressChange) -> Self {
        Self { action, progress }
    }
}

/// End-of-media transition table.
///
/// `budget_left` is `repeat_progress + 1 < repeat_count`; `has_next` is whether
/// the current target has a following verse in its chapter.
pub fn end_of_media(mode: LoopMode, budget_left: bool, has_next: bool) -> EndTransition {
    use EndAction::*;
    use ProgressChange::*;

    match (mode, budget_left, has_next) {
        (LoopMode::Single, _, true) => EndTransition::new(Advance, Reset),
        (LoopMode::Single, _, false) => EndTransition::new(Finish, Reset),
        (LoopMode::LoopVerse, true, _) => EndTransition::new(Replay, Increment),
        (LoopMode::LoopVerse, false, true) => EndTransition::new(Advance, Reset),
        (LoopMode::LoopVerse, false, false) => EndTransition::new(Finish, Reset),
        (LoopMode::LoopChapter, true, _) => EndTransition::new(RestartChapter, Increment),
        (LoopMode::LoopChapter, false, _) => EndTransition::new(Finish, Reset),
    }
}

/// Map a playback fraction onto a 1-based verse indicator.
///
/// Linear over verses of unequal length, so only a display hint.
pub fn project_verse(position_ms: u64, duration_ms: u64, verse_count: u16) -> Option<u16> {
    if duration_ms == 0 || verse_count == 0 {
        return None;
    }
    let fraction = (position_ms.min(duration_ms) as f64) / duration_ms as f64;
    let index = ((fraction * verse_count as f64).floor() as u16).min(verse_count - 1);
    Some(index + 1)
}

pub fn clamp_repeat_count(count: i64) -> u8 {
    count.clamp(MIN_REPEAT_COUNT as i64, MAX_REPEAT_COUNT as i64) as u8
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return DEFAULT_VOLUME;
    }
    volume.clamp(0.0, 1.0)
}

/// Snapshot of the playback session for rendering the UI
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackInfo {
    pub target: Option<PlaybackTarget>,
    pub status: PlaybackStatus,
    pub mode: LoopMode,
    pub repeat_count: u8,
    pub repeat_progress: u8,
    pub volume: f32,
    pub highlighted_verse: Option<u16>,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub reciter_name: String,
    pub audio_enabled: bool,
    pub last_error: Option<String>,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            target: None,
            status: PlaybackStatus::Idle,
            mode: LoopMode::Single,
            repeat_count: MIN_REPEAT_COUNT,
            repeat_progress: 0,
            volume: DEFAULT_VOLUME,
            highlighted_verse: None,
            position_ms: 0,
            duration_ms: 0,
            reciter_name: String::new(),
            audio_enabled: true,
            last_error: None,
        }
    }
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// The verse the UI should emphasise, whichever kind of target is loaded
    pub fn current_verse(&self) -> Option<(u16, u16)> {
        let target = self.target?;
        match target {
            PlaybackTarget::Verse { chapter, verse, .. } => Some((chapter, verse)),
            PlaybackTarget::Chapter { chapter, .. } => self.highlighted_verse.map(|v| (chapter, v)),
        }
    }
}
