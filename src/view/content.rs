//! Main content area rendering: tab strip, reading pane, duas, prayer times, favorites

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Tabs},
    Frame,
};

use crate::model::calendar::{next_prayer, nz_utc_offset_hours, prayer_times};
use crate::model::duas;
use crate::model::text::{Mark, hifz_mask, tajweed_segments};
use crate::model::{ActiveSection, Tab, Verse};
use super::Screen;
use super::utils::{Palette, render_scrollable_list, wrap_text};

pub fn render_main_content(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let active = Tab::ALL
        .iter()
        .position(|t| *t == screen.ui_state.active_tab)
        .unwrap_or(0);
    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(active)
        .style(Style::default().fg(palette.muted))
        .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    match screen.ui_state.active_tab {
        Tab::Quran => render_reading_pane(frame, chunks[1], screen, palette),
        Tab::Duas => render_duas(frame, chunks[1], screen, palette),
        Tab::Prayer => render_prayer_times(frame, chunks[1], screen, palette),
        Tab::Favorites => render_favorites(frame, chunks[1], screen, palette),
    }
}

fn pane_block<'a>(title: String, focused: bool, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(palette.border(focused))
}

fn is_focused(screen: &Screen) -> bool {
    screen.ui_state.active_section == ActiveSection::MainContent
}

fn render_message(frame: &mut Frame, area: Rect, block: Block, text: &str, color: Color) {
    let message = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(block);
    frame.render_widget(message, area);
}

fn render_reading_pane(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let reading = &screen.content_state.reading;
    let focused = is_focused(screen);

    let mut title = match &reading.chapter {
        Some(chapter) => format!(
            " {}. {} ({}) · {} verses ",
            chapter.number, chapter.english_name, chapter.english_name_translation, chapter.verse_count
        ),
        None => " Quran ".to_string(),
    };
    if screen.display.hifz {
        title.push_str("· hifz ");
    }
    if screen.display.tajweed {
        title.push_str("· tajweed ");
    }
    let block = pane_block(title, focused, palette);

    if reading.loading && reading.verses.is_empty() {
        render_message(frame, area, block, "Loading...", Color::Yellow);
        return;
    }
    if let Some(error) = &reading.error {
        if reading.verses.is_empty() {
            render_message(frame, area, block, error, Color::Red);
            return;
        }
    }
    if reading.chapter.is_none() {
        render_message(
            frame,
            area,
            block,
            "Select a chapter and press Enter to start reading\n\nUse Tab to move between the chapter list and this pane\nPress ? for all keys",
            palette.muted,
        );
        return;
    }

    let width = (area.width as usize).saturating_sub(10);
    let playing = screen.playback.current_verse();
    let items: Vec<ListItem> = reading
        .verses
        .iter()
        .enumerate()
        .map(|(i, verse)| {
            let selected = i == screen.ui_state.content_selected;
            let is_playing = playing == Some((verse.chapter, verse.number));
            let bookmarked = screen
                .favorites
                .iter()
                .any(|f| f.chapter == verse.chapter && f.verse == verse.number);
            let revealed = if selected { screen.content_state.hifz_revealed } else { 0 };
            ListItem::new(verse_lines(verse, width, selected, is_playing, bookmarked, revealed, screen, palette))
        })
        .collect();

    render_scrollable_list(frame, area, items, screen.ui_state.content_selected, block);
}

#[allow(clippy::too_many_arguments)]
fn verse_lines<'a>(
    verse: &Verse,
    width: usize,
    selected: bool,
    is_playing: bool,
    bookmarked: bool,
    revealed_words: usize,
    screen: &Screen,
    palette: &Palette,
) -> Vec<Line<'a>> {
    let marker = match (selected, is_playing) {
        (_, true) => "♪",
        (true, false) => "▶",
        _ => " ",
    };
    let number_style = if is_playing {
        Style::default().fg(palette.playing).add_modifier(Modifier::BOLD)
    } else if selected {
        palette.selected(is_focused(screen))
    } else {
        Style::default().fg(palette.muted)
    };
    let text_style = if is_playing {
        Style::default().fg(palette.playing)
    } else {
        Style::default().fg(palette.text)
    };

    let arabic = if screen.display.hifz {
        hifz_mask(&verse.text, revealed_words)
    } else {
        verse.text.clone()
    };

    let mut lines = Vec::new();
    for (n, chunk) in wrap_text(&arabic, screen.display.arabic_width(width)).into_iter().enumerate() {
        let prefix = if n == 0 {
            format!("{marker}{:>4}{} ", verse.number, if bookmarked { "★" } else { " " })
        } else {
            " ".repeat(7)
        };
        let mut spans = vec![Span::styled(prefix, number_style)];
        if screen.display.tajweed && !screen.display.hifz {
            spans.extend(
                tajweed_segments(&chunk)
                    .into_iter()
                    .map(|segment| Span::styled(segment.text, mark_style(segment.mark, text_style))),
            );
        } else {
            spans.push(Span::styled(chunk, text_style));
        }
        lines.push(Line::from(spans));
    }

    if let Some(translation) = &verse.translation {
        for chunk in wrap_text(translation, width) {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(7)),
                Span::styled(chunk, Style::default().fg(palette.muted)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines
}

fn mark_style(mark: Mark, base: Style) -> Style {
    match mark {
        Mark::Plain => base,
        Mark::Fatha => base.fg(Color::Red),
        Mark::Damma => base.fg(Color::Blue),
        Mark::Kasra => base.fg(Color::Green),
        Mark::Sukun => base.fg(Color::Magenta),
        Mark::Shadda => base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
    }
}

fn render_duas(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let ui_state = screen.ui_state;
    let focused = is_focused(screen);
    let found = duas::search(&ui_state.dua_query);
    let width = (area.width as usize).saturating_sub(6);

    let title = if ui_state.filter_editing && focused {
        format!(" Duas /{}_ ", ui_state.dua_query)
    } else if !ui_state.dua_query.is_empty() {
        format!(" Duas /{} ({}) ", ui_state.dua_query, found.len())
    } else {
        " Duas (/ to search) ".to_string()
    };
    let block = pane_block(title, focused, palette);

    if found.is_empty() {
        render_message(frame, area, block, "No supplication matches this search.", palette.muted);
        return;
    }

    let items: Vec<ListItem> = found
        .iter()
        .enumerate()
        .map(|(i, dua)| {
            let heading = if i == ui_state.content_selected {
                palette.selected(focused)
            } else {
                Style::default().fg(palette.accent)
            };
            let mut lines = vec![Line::from(Span::styled(
                format!("{} · {}", dua.category, dua.reference),
                heading,
            ))];
            lines.extend(
                wrap_text(dua.arabic, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(palette.text)))),
            );
            lines.extend(
                wrap_text(dua.english, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(palette.muted)))),
            );
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    render_scrollable_list(frame, area, items, ui_state.content_selected, block);
}

fn render_prayer_times(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let city = screen.display.city;
    let date = screen.now.date();
    let times = prayer_times(city, date, nz_utc_offset_hours(date));
    let upcoming = next_prayer(&times, screen.now.time());
    let focused = is_focused(screen);

    let items: Vec<ListItem> = times
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let time = p
                .time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            let next = if Some(i) == upcoming { "  ◀ next" } else { "" };
            let style = if Some(i) == upcoming {
                Style::default().fg(palette.playing).add_modifier(Modifier::BOLD)
            } else if i == screen.ui_state.content_selected && focused {
                palette.selected(focused)
            } else {
                Style::default().fg(palette.text)
            };
            ListItem::new(format!("{:<10}{}{}", p.prayer.name(), time, next)).style(style)
        })
        .collect();

    let title = format!(
        " Prayer times · {} · {} (estimate, Enter for next city) ",
        city.name,
        date.format("%a %d %b %Y")
    );
    let block = pane_block(title, focused, palette);
    render_scrollable_list(frame, area, items, screen.ui_state.content_selected, block);
}

fn render_favorites(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let focused = is_focused(screen);
    let block = pane_block(
        format!(" Favorites ({}) · Enter play · o open · d remove · C clear ", screen.favorites.len()),
        focused,
        palette,
    );

    if screen.favorites.is_empty() {
        render_message(
            frame,
            area,
            block,
            "No bookmarks yet. Press b on a verse in the reading pane to add one.",
            palette.muted,
        );
        return;
    }

    let width = (area.width as usize).saturating_sub(6);
    let items: Vec<ListItem> = screen
        .favorites
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let heading = if i == screen.ui_state.content_selected {
                palette.selected(focused)
            } else {
                Style::default().fg(palette.accent)
            };
            let mut lines = vec![Line::from(Span::styled(
                format!("★ {} {}:{}", entry.chapter_name, entry.chapter, entry.verse),
                heading,
            ))];
            lines.extend(
                wrap_text(&entry.verse_text, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(palette.text)))),
            );
            lines.extend(
                wrap_text(&entry.translation, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(palette.muted)))),
            );
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    render_scrollable_list(frame, area, items, screen.ui_state.content_selected, block);
}
