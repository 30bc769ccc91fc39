//! Terminal loop for the interactive console.
//!
//! Each tick draws one frame from the current state, waits up to the tick
//! rate for a key, then applies every task outcome that arrived meanwhile.

use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::console::{Console, KeyAction, TaskDispatcher, TaskOutcome};
use crate::presentation::presenters::build_screen;
use crate::presentation::views::ScreenView;

pub struct TuiRenderer {
    tick_rate: Duration,
    preview_lines: usize,
}

impl TuiRenderer {
    pub fn new(tick_rate: Duration, preview_lines: usize) -> Self {
        Self {
            tick_rate,
            preview_lines,
        }
    }

    pub fn run<D: TaskDispatcher>(
        self,
        console: &mut Console<D>,
        rx: Receiver<TaskOutcome>,
    ) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, console, rx);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<D: TaskDispatcher>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        console: &mut Console<D>,
        rx: Receiver<TaskOutcome>,
    ) -> Result<()> {
        console.start();

        loop {
            let screen = build_screen(console.state(), console.pending().len(), self.preview_lines);
            terminal.draw(|f| f.render_widget(ScreenView::new(&screen), f.area()))?;

            if event::poll(self.tick_rate)?
                && let Event::Key(key) = event::read()?
                && let Some(action) = map_key(key)
            {
                console.handle_key(action);
            }

            loop {
                match rx.try_recv() {
                    Ok(outcome) => console.handle_outcome(outcome),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::warn!("task channel closed");
                        break;
                    }
                }
            }

            if console.should_quit() {
                break;
            }
        }

        Ok(())
    }
}

/// Translate a terminal key press into a console action
pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(KeyAction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(KeyAction::Right),
        KeyCode::Enter => Some(KeyAction::Enter),
        KeyCode::Esc | KeyCode::Backspace => Some(KeyAction::Back),
        _ => None,
    }
}
