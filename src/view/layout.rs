//! Layout rendering (top bar, chapter sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::calendar::to_hijri;
use crate::model::{ActiveSection, Revelation};
use super::Screen;
use super::utils::{Palette, render_scrollable_list, truncate_string};

pub fn render_top_bar(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Title and reading settings
            Constraint::Length(34), // Hijri date
        ])
        .split(area);

    let settings = Line::from(vec![
        Span::styled("recite ", Style::default().fg(palette.accent)),
        Span::styled(
            format!("│ {} │ {}", screen.display.translation_label(), screen.playback.reciter_name),
            Style::default().fg(palette.text),
        ),
        Span::styled(
            format!(" │ {} │ Arabic {}px", screen.display.theme.label(), screen.display.font_size),
            Style::default().fg(palette.muted),
        ),
    ]);
    let title = Paragraph::new(settings).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(false))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(title, chunks[0]);

    let hijri = to_hijri(screen.now.date());
    let date = Paragraph::new(format!("{}, {}", hijri.weekday, hijri))
        .style(Style::default().fg(palette.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(" Hijri "),
        );
    frame.render_widget(date, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, screen: &Screen, palette: &Palette) {
    let ui_state = screen.ui_state;
    let is_focused = ui_state.active_section == ActiveSection::Chapters;
    let name_width = (area.width as usize).saturating_sub(12);

    let chapters = screen.content_state.filtered_chapters(&ui_state.chapter_filter);
    let open = screen.content_state.reading.chapter.as_ref().map(|c| c.number);

    let items: Vec<ListItem> = chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let style = if i == ui_state.chapter_selected {
                palette.selected(is_focused)
            } else if Some(chapter.number) == open {
                Style::default().fg(palette.accent)
            } else {
                Style::default().fg(palette.text)
            };
            let origin = match chapter.revelation {
                Revelation::Meccan => "M",
                Revelation::Medinan => "D",
            };
            ListItem::new(format!(
                "{:>3} {} {}",
                chapter.number,
                truncate_string(&chapter.english_name, name_width),
                origin
            ))
            .style(style)
        })
        .collect();

    let title = if ui_state.filter_editing && is_focused {
        format!(" Chapters /{}_ ", ui_state.chapter_filter)
    } else if !ui_state.chapter_filter.is_empty() {
        format!(" Chapters /{} ", ui_state.chapter_filter)
    } else if screen.content_state.chapters_loading {
        " Chapters (loading...) ".to_string()
    } else {
        " Chapters ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(palette.border(is_focused));

    render_scrollable_list(frame, area, items, ui_state.chapter_selected, block);
}
