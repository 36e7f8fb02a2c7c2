mod config;
mod db;
mod error;
mod models;
mod store;

use std::{fs::File, path::Path, sync::Mutex};

use clap::Parser;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, ToSpan},
    widgets::{Block, List, ListItem, Paragraph},
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{config::Config, db::Database, store::NoteStore};

enum Screen {
    List,
    Form,
}

enum FocusedInput {
    Title,
    Content,
}

struct App {
    db: Database,
    store: NoteStore,
    storage_key: String,
    current_screen: Screen,
    title_input: Input,
    content_input: Input,
    focused_input: FocusedInput,
    modified: bool,
    status: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::parse();
    init_tracing(&config.log_file)?;

    let db = Database::new(&config.db_path)?;
    let mut store = NoteStore::new();
    // Startup order matters: the fresh note's selection outlives the load.
    store.create();
    store.load(&db, &config.storage_key);

    let mut app = App {
        db,
        store,
        storage_key: config.storage_key,
        current_screen: Screen::List,
        title_input: Input::default(),
        content_input: Input::default(),
        focused_input: FocusedInput::Title,
        modified: false,
        status: None,
    };
    ratatui::run(|t| app.run(t))?;

    Ok(())
}

fn init_tracing(log_file: &Path) -> color_eyre::Result<()> {
    let file = File::options().create(true).append(true).open(log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tiny_notes=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

impl App {
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            let event = crossterm::event::read()?;

            if let crossterm::event::Event::Key(key) = event {
                match self.current_screen {
                    Screen::List => match (key.modifiers, key.code) {
                        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                            self.save_notes();
                        }
                        (_, KeyCode::Char('q') | KeyCode::Esc) => {
                            return Ok(());
                        }
                        (_, KeyCode::Char('j') | KeyCode::Down) => {
                            if let Some(i) = next_index(self.store.active(), self.store.len()) {
                                self.store.select(i);
                            }
                        }
                        (_, KeyCode::Char('k') | KeyCode::Up) => {
                            if let Some(i) = prev_index(self.store.active(), self.store.len()) {
                                self.store.select(i);
                            }
                        }
                        (_, KeyCode::Enter | KeyCode::Char('e')) => {
                            self.edit_active_note();
                        }
                        (_, KeyCode::Char('a')) => {
                            self.store.create();
                            self.modified = true;
                            self.edit_active_note();
                        }
                        (_, KeyCode::Char('d')) => {
                            if let Some(note) = self.store.delete() {
                                debug!(title = note.display_title(), "deleted note");
                                self.modified = true;
                            }
                        }
                        _ => {}
                    },
                    Screen::Form => match (key.modifiers, key.code) {
                        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                            self.save_notes();
                        }
                        (_, KeyCode::Tab) => {
                            self.toggle_input();
                        }
                        (_, KeyCode::Esc) => self.current_screen = Screen::List,
                        _ => {
                            let changed = match self.focused_input {
                                FocusedInput::Title => self
                                    .title_input
                                    .handle_event(&event)
                                    .is_some_and(|c| c.value)
                                    && self.store.update_title(self.title_input.value()),
                                FocusedInput::Content => self
                                    .content_input
                                    .handle_event(&event)
                                    .is_some_and(|c| c.value)
                                    && self.store.update_content(self.content_input.value()),
                            };
                            self.modified |= changed;
                        }
                    },
                }
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        match self.current_screen {
            Screen::List => {
                self.render_list(frame);
            }
            Screen::Form => {
                self.render_form(frame);
            }
        }
    }

    fn render_form(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Max(4), Constraint::Min(1)])
            .split(frame.area());

        let inner_content_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Min(1),
                Constraint::Max(1),
                Constraint::Max(1),
            ])
            .split(layout[1]);

        let help_message = Line::from_iter([
            "Esc".bold().yellow(),
            " back, ".to_span(),
            "Ctrl+S".bold().yellow(),
            " save, ".to_span(),
            "Tab".bold().yellow(),
            " switch input focus.".to_span(),
        ])
        .centered();

        let mut title_input =
            Paragraph::new(self.title_input.value()).style(Style::default().bold());

        let mut content_input = Paragraph::new(self.content_input.value());
        let mut input_block = Block::bordered().title("Title");
        let mut content_block = Block::bordered().title("Content");

        match self.focused_input {
            FocusedInput::Title => {
                input_block = input_block.border_style(Style::new().yellow());
                let width = layout[0].width.max(3) - 3;
                let scroll = self.title_input.visual_scroll(width as usize);
                title_input = title_input.scroll((0, scroll as u16));

                let x = self.title_input.visual_cursor().max(scroll) - scroll + 1;
                frame.set_cursor_position((layout[0].x + x as u16, layout[0].y + 1));
            }
            FocusedInput::Content => {
                content_block = content_block.border_style(Style::new().yellow());
                let width = layout[1].width.max(3) - 3;
                let scroll = self.content_input.visual_scroll(width as usize);
                content_input = content_input.scroll((0, scroll as u16));

                let x = self.content_input.visual_cursor().max(scroll) - scroll + 1;
                frame.set_cursor_position((layout[1].x + x as u16, layout[1].y + 1));
            }
        }

        frame.render_widget(title_input.block(input_block), layout[0]);
        frame.render_widget(content_input.block(content_block), inner_content_layout[0]);
        frame.render_widget(self.status_line(), inner_content_layout[1]);
        frame.render_widget(help_message, inner_content_layout[2]);
    }

    fn render_list(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(30), Constraint::Min(1)])
            .split(frame.area());

        let inner_list_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
            .split(layout[0]);

        let inner_details_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
            .split(layout[1]);

        let block = Block::bordered()
            .title("My Notes")
            .border_set(border::THICK);

        let active = self.store.active();
        let notes_list_items = self.store.notes().iter().enumerate().map(|(i, note)| {
            let item = ListItem::new(Line::from(note.display_title())).bold();

            if Some(i) == active {
                item.black().on_white()
            } else {
                item
            }
        });

        // Nothing active leaves the editor pane blank.
        let details = if self.store.is_empty() {
            "No notes yet, press a to add one."
        } else {
            self.store
                .active_note()
                .map_or("", |n| n.content.as_str())
        };
        let note_details = Paragraph::new(details).block(Block::bordered());

        let help_message = Line::from_iter([
            "Esc/q".bold().yellow(),
            " exit, ".to_span(),
            "e".bold().yellow(),
            " edit, ".to_span(),
            "a".bold().yellow(),
            " add, ".to_span(),
            "d".bold().red(),
            " delete, ".to_span(),
            "Ctrl+S".bold().yellow(),
            " save".to_span(),
        ])
        .centered();

        frame.render_widget(help_message, inner_list_layout[1]);
        frame.render_widget(
            List::new(notes_list_items).block(block),
            inner_list_layout[0],
        );
        frame.render_widget(note_details, inner_details_layout[0]);
        frame.render_widget(self.status_line(), inner_details_layout[1]);
    }

    fn status_line(&self) -> Line<'_> {
        let mut line = Line::from(self.status.as_deref().unwrap_or_default());
        if self.modified {
            line.push_span(" [modified]".yellow());
        }
        line
    }

    fn edit_active_note(&mut self) {
        let Some(note) = self.store.active_note() else {
            return;
        };
        self.title_input = Input::new(note.title.clone());
        self.content_input = Input::new(note.content.clone());
        self.focused_input = FocusedInput::Title;
        self.current_screen = Screen::Form;
    }

    fn save_notes(&mut self) {
        match self.store.save(&self.db, &self.storage_key) {
            Ok(()) => {
                self.modified = false;
                self.status = Some(format!("Saved {} notes", self.store.len()));
            }
            Err(err) => {
                error!("failed to save notes: {err}");
                self.status = Some(format!("Save failed: {err}"));
            }
        }
    }

    fn toggle_input(&mut self) {
        self.focused_input = match self.focused_input {
            FocusedInput::Title => FocusedInput::Content,
            FocusedInput::Content => FocusedInput::Title,
        };
    }
}

/// Next selection going down, wrapping to the top; with nothing selected, the first note.
fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i > 0 && i < len => i - 1,
        _ => len - 1,
    })
}
