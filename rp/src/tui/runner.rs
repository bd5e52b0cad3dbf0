//! TUI Runner - main loop that owns the terminal and the assistant
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to the App
//! - Applying the App's pending actions to the Assistant
//! - Polling the in-flight completion on every tick
//! - Drawing the frame

use std::time::Duration;

use eyre::Result;
use tracing::{debug, info};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::PendingAction;
use super::views;
use crate::assistant::Assistant;

/// Input poll timeout; roughly 30 frames per second
const TICK_RATE: Duration = Duration::from_millis(33);

/// Owns the terminal, the App and the Assistant for one session
pub struct TuiRunner {
    app: App,
    assistant: Assistant,
    terminal: Tui,
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, assistant: Assistant) -> Self {
        Self {
            app: App::new(),
            assistant,
            terminal,
            event_handler: EventHandler::new(TICK_RATE),
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        info!("TUI started with {} product(s)", self.assistant.catalog().len());

        loop {
            let (app, assistant) = (&mut self.app, &self.assistant);
            self.terminal
                .draw(|frame| views::render(frame, app.state_mut(), assistant))?;

            match self.event_handler.next().await? {
                Event::Tick => {
                    if self.assistant.poll() {
                        debug!("TuiRunner::run: completion applied");
                    }
                }
                Event::Key(key) => {
                    if self.app.handle_key(key, &self.assistant) {
                        break;
                    }
                }
                Event::Mouse(mouse) => self.app.handle_mouse(mouse, &self.assistant),
                Event::Resize(width, height) => {
                    debug!(width, height, "TuiRunner::run: resize");
                }
            }

            self.apply_pending_actions();

            if self.app.state().should_quit {
                break;
            }
        }

        if self.assistant.cancel() {
            info!("Cancelled outstanding completion on exit");
        }
        Ok(())
    }

    fn apply_pending_actions(&mut self) {
        for action in self.app.state_mut().take_actions() {
            debug!(?action, "TuiRunner::apply_pending_actions: applying");
            match action {
                PendingAction::ToggleProduct(id) => {
                    self.assistant.toggle(&id);
                }
                PendingAction::RemoveProduct(id) => {
                    self.assistant.remove(&id);
                }
                PendingAction::ClearSelection => self.assistant.clear_selection(),
                // Rejections (busy, blank, empty selection) already left a notice in the chat
                PendingAction::SubmitChat(text) => {
                    let _ = self.assistant.submit_chat(&text);
                }
                PendingAction::GenerateRoutine => {
                    let _ = self.assistant.generate_routine();
                }
                PendingAction::ToggleDirection => {
                    self.assistant.toggle_direction();
                }
                PendingAction::ClearChat => {
                    let _ = self.assistant.clear_chat();
                }
            }
        }
    }
}
