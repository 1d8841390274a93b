//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{LoopMode, PlaybackInfo, PlaybackStatus, PlaybackTarget};
use super::utils::{Palette, format_duration};

fn status_icon(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Idle => "■",
        PlaybackStatus::Loading => "…",
        PlaybackStatus::Playing => "▶",
        PlaybackStatus::Paused => "⏸",
        PlaybackStatus::Ended => "✓",
        PlaybackStatus::Errored => "✗",
    }
}

fn target_text(playback: &PlaybackInfo) -> String {
    match playback.target {
        None if !playback.audio_enabled => "Audio off (a to enable)".to_string(),
        None => "Nothing playing".to_string(),
        Some(PlaybackTarget::Verse { chapter, verse, .. }) => format!("Surah {chapter}:{verse}"),
        Some(PlaybackTarget::Chapter { chapter, verse_count }) => match playback.highlighted_verse {
            Some(v) => format!("Surah {chapter} (verse {v}/{verse_count})"),
            None => format!("Surah {chapter}"),
        },
    }
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, palette: &Palette) {
    let mut title = format!(
        " {} {} │ {} ",
        status_icon(playback.status),
        target_text(playback),
        playback.reciter_name
    );
    if let Some(error) = &playback.last_error {
        title.push_str(&format!("│ {error} "));
    }

    let repeat_text = match playback.mode {
        LoopMode::Single => String::new(),
        _ => format!(" {}/{} │", playback.repeat_progress, playback.repeat_count),
    };
    let controls_info = format!(
        " {} │{} Vol: {}% ",
        playback.mode.label(),
        repeat_text,
        (playback.volume * 100.0).round() as u32
    );

    let time_str = format!(
        "{} / {}",
        format_duration(playback.position_ms),
        format_duration(playback.duration_ms)
    );
    let progress_ratio = if playback.duration_ms > 0 {
        (playback.position_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(playback.is_playing()))
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(palette.accent))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_target_shows_followed_verse() {
        let info = PlaybackInfo {
            target: Some(PlaybackTarget::chapter(36, 83)),
            highlighted_verse: Some(12),
            ..PlaybackInfo::default()
        };
        assert_eq!(target_text(&info), "Surah 36 (verse 12/83)");
    }

    #[test]
    fn idle_text_mentions_disabled_audio() {
        let info = PlaybackInfo { audio_enabled: false, ..PlaybackInfo::default() };
        assert_eq!(target_text(&info), "Audio off (a to enable)");
    }
}
