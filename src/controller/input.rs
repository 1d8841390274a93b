//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, Tab};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        let ui_state = model.get_ui_state().await;

        // Typed characters go to the chapter filter or the dua search
        if ui_state.filter_editing {
            match key.code {
                KeyCode::Enter => model.stop_filter().await,
                KeyCode::Esc => model.clear_filter().await,
                KeyCode::Backspace => model.backspace_filter().await,
                KeyCode::Char(c) => {
                    if c == 'q' && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                    } else {
                        model.append_to_filter(c).await;
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        if key.code == KeyCode::Enter {
            drop(model);
            match (ui_state.active_section, ui_state.active_tab) {
                (ActiveSection::Chapters, _) => self.open_selected_chapter().await,
                (ActiveSection::MainContent, Tab::Quran) => self.play_selected_verse().await,
                (ActiveSection::MainContent, Tab::Favorites) => self.play_favorite().await,
                (ActiveSection::MainContent, Tab::Prayer) => self.cycle_city().await,
                (ActiveSection::MainContent, Tab::Duas) => {}
            }
            return Ok(());
        }

        // Tab-specific bindings in the main pane
        if ui_state.active_section == ActiveSection::MainContent {
            match (ui_state.active_tab, key.code) {
                (Tab::Quran, KeyCode::Char('b')) => {
                    drop(model);
                    self.toggle_bookmark().await;
                    return Ok(());
                }
                (Tab::Quran, KeyCode::Char('w')) => {
                    model.reveal_next_word().await;
                    return Ok(());
                }
                (Tab::Favorites, KeyCode::Char('o')) => {
                    drop(model);
                    self.open_selected_favorite().await;
                    return Ok(());
                }
                (Tab::Favorites, KeyCode::Delete | KeyCode::Char('d')) => {
                    drop(model);
                    self.remove_selected_favorite().await;
                    return Ok(());
                }
                (Tab::Favorites, KeyCode::Char('C')) => {
                    drop(model);
                    self.clear_favorites().await;
                    return Ok(());
                }
                (Tab::Duas, KeyCode::Char('/')) => {
                    model.start_filter().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                model.cycle_section().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::Chapters).await;
                model.start_filter().await;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                model.set_tab(Tab::ALL[index]).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            KeyCode::Char('?') => {
                model.show_help_popup().await;
            }
            // Play whole chapter
            KeyCode::Char('c') => {
                drop(model);
                self.play_chapter().await;
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('s') => {
                drop(model);
                self.stop_playback().await;
            }
            KeyCode::Char('n') => {
                drop(model);
                self.next_verse().await;
            }
            KeyCode::Char('p') => {
                drop(model);
                self.previous_verse().await;
            }
            KeyCode::Char('l') => {
                drop(model);
                self.cycle_loop_mode().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.change_repeat_count(1).await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.change_repeat_count(-1).await;
            }
            KeyCode::Char(']') => {
                drop(model);
                self.change_volume(true).await;
            }
            KeyCode::Char('[') => {
                drop(model);
                self.change_volume(false).await;
            }
            KeyCode::Char('r') => {
                drop(model);
                self.cycle_reciter().await;
            }
            KeyCode::Char('a') => {
                drop(model);
                self.toggle_audio().await;
            }
            KeyCode::Char('T') => {
                drop(model);
                self.cycle_translation().await;
            }
            KeyCode::Char('t') => {
                drop(model);
                self.cycle_theme().await;
            }
            KeyCode::Char('h') => {
                drop(model);
                self.toggle_hifz().await;
            }
            KeyCode::Char('j') => {
                drop(model);
                self.toggle_tajweed().await;
            }
            KeyCode::Char('>') => {
                drop(model);
                self.change_font_size(2).await;
            }
            KeyCode::Char('<') => {
                drop(model);
                self.change_font_size(-2).await;
            }
            _ => {}
        }
        Ok(())
    }
}
