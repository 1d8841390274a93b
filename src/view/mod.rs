//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, wrapping, palette)
//! - `layout`: Main layout structure (top bar, chapter sidebar)
//! - `content`: Main content area rendering (reading pane and other tabs)
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};

use crate::model::{ContentState, DisplaySettings, FavoriteEntry, PlaybackInfo, UiState};
use utils::Palette;

/// Everything one frame needs, snapshotted from the model
pub struct Screen<'a> {
    pub playback: &'a PlaybackInfo,
    pub ui_state: &'a UiState,
    pub content_state: &'a ContentState,
    pub display: &'a DisplaySettings,
    pub favorites: &'a [FavoriteEntry],
    /// Local civil time used for the Hijri date and prayer times
    pub now: NaiveDateTime,
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, screen: &Screen) {
        let palette = Palette::for_theme(screen.display.theme);
        frame.render_widget(Block::default().style(palette.base()), frame.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title, translation, reciter, date
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], screen, &palette);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Chapter list
                Constraint::Percentage(70), // Tabs
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], screen, &palette);
        content::render_main_content(frame, main_chunks[1], screen, &palette);
        progress::render_progress_bar(frame, chunks[2], screen.playback, &palette);

        if screen.ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, screen.ui_state);
        }

        if screen.ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
