//! TUI application - event handling
//!
//! The App owns the AppState and turns key and mouse events into state
//! changes and pending actions. It reads the assistant to know what is on
//! screen but never mutates it; the runner applies the pending actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use super::state::{AppState, InteractionMode, PendingAction};
use crate::assistant::Assistant;
use crate::catalog::Product;
use crate::view::{CardAction, Region, hit_test};

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    state: AppState,
}

impl App {
    pub fn new() -> Self {
        Self { state: AppState::new() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Products the products region currently lists
    pub fn visible_products<'a>(&self, assistant: &'a Assistant) -> Vec<&'a Product> {
        if self.state.filter.is_unset() {
            return Vec::new();
        }
        self.state.filter.apply(assistant.catalog())
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent, assistant: &Assistant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key, assistant),
            InteractionMode::Search => self.handle_search_key(key),
            InteractionMode::ChatInput => self.handle_chat_input_key(key, assistant.is_busy()),
            InteractionMode::Help => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
        }
        self.state.should_quit
    }

    fn handle_normal_key(&mut self, key: KeyEvent, assistant: &Assistant) {
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Tab => self.state.focus = self.state.focus.next(),

            // === Filtering ===
            KeyCode::Char('c') => {
                let categories = assistant.catalog().categories();
                self.state.cycle_category(&categories);
            }
            KeyCode::Char('/') => {
                self.state.focus = Region::Products;
                self.state.interaction_mode = InteractionMode::Search;
            }

            // === Global actions ===
            KeyCode::Char('g') => self.state.push_action(PendingAction::GenerateRoutine),
            KeyCode::Char('x') => {
                if !assistant.selection().is_empty() {
                    self.state.push_action(PendingAction::ClearSelection);
                }
            }
            KeyCode::Char('r') => self.state.push_action(PendingAction::ToggleDirection),
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.push_action(PendingAction::ClearChat);
            }

            // === Navigation ===
            KeyCode::Up | KeyCode::Char('k') => match self.state.focus {
                Region::Products => self.state.product_cursor.prev(),
                Region::Selected => self.state.selected_cursor.prev(),
                Region::Chat => self.state.chat_scroll = self.state.chat_scroll.saturating_add(1),
            },
            KeyCode::Down | KeyCode::Char('j') => match self.state.focus {
                Region::Products => {
                    let len = self.visible_products(assistant).len();
                    self.state.product_cursor.next(len);
                }
                Region::Selected => {
                    let len = assistant.selected_products().len();
                    self.state.selected_cursor.next(len);
                }
                Region::Chat => self.state.chat_scroll = self.state.chat_scroll.saturating_sub(1),
            },

            // === Region-specific ===
            _ => match self.state.focus {
                Region::Products => self.handle_products_key(key, assistant),
                Region::Selected => self.handle_selected_key(key, assistant),
                Region::Chat => self.handle_chat_key(key),
            },
        }
    }

    fn handle_products_key(&mut self, key: KeyEvent, assistant: &Assistant) {
        let products = self.visible_products(assistant);
        let Some(product) = products.get(self.state.product_cursor.index) else {
            return;
        };

        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.state.push_action(PendingAction::ToggleProduct(product.id.clone()));
            }
            KeyCode::Char('i') => {
                self.state.details.toggle(&product.id);
            }
            KeyCode::Esc => {
                self.state.details.close(&product.id);
            }
            _ => {}
        }
    }

    fn handle_selected_key(&mut self, key: KeyEvent, assistant: &Assistant) {
        if let KeyCode::Enter | KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('d') = key.code {
            let selected = assistant.selected_products();
            if let Some(product) = selected.get(self.state.selected_cursor.index) {
                self.state.push_action(PendingAction::RemoveProduct(product.id.clone()));
            }
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.interaction_mode = InteractionMode::ChatInput,
            // Any other printable character starts input
            KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                self.state.chat_input.push(c);
                self.state.interaction_mode = InteractionMode::ChatInput;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let mut search = self.state.filter.search.clone();
        match key.code {
            KeyCode::Enter => {
                self.state.interaction_mode = InteractionMode::Normal;
                return;
            }
            KeyCode::Esc => {
                search.clear();
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => {
                search.pop();
            }
            KeyCode::Char(c) => search.push(c),
            _ => return,
        }
        self.state.set_search(search);
    }

    fn handle_chat_input_key(&mut self, key: KeyEvent, busy: bool) {
        match key.code {
            KeyCode::Esc => self.state.interaction_mode = InteractionMode::Normal,
            KeyCode::Enter => {
                // Blank input stays in the box and sends nothing
                if !self.state.chat_input.trim().is_empty() {
                    // While a reply is pending the submission only yields the busy notice; keep the draft
                    let text = if busy {
                        self.state.chat_input.clone()
                    } else {
                        std::mem::take(&mut self.state.chat_input)
                    };
                    self.state.push_action(PendingAction::SubmitChat(text));
                    self.state.chat_scroll = 0;
                }
            }
            KeyCode::Backspace => {
                self.state.chat_input.pop();
            }
            KeyCode::Char(c) => self.state.chat_input.push(c),
            _ => {}
        }
    }

    /// Handle a mouse event using the geometry of the last frame
    pub fn handle_mouse(&mut self, mouse: MouseEvent, assistant: &Assistant) {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(region) = self.state.region_at(col, row) {
                    self.state.focus = region;
                }
                let Some(hit) = hit_test(&self.state.card_layouts, col, row) else {
                    return;
                };
                debug!(?hit, "App::handle_mouse: card hit");

                if let Some(index) = self.visible_products(assistant).iter().position(|p| p.id == hit.id) {
                    self.state.product_cursor.index = index;
                }
                match hit.action() {
                    Some(CardAction::ToggleSelection(id)) => self.state.push_action(PendingAction::ToggleProduct(id)),
                    Some(CardAction::ToggleDetails(id)) => {
                        self.state.details.toggle(&id);
                    }
                    Some(CardAction::CloseDetails(id)) => self.state.details.close(&id),
                    None => {}
                }
            }
            MouseEventKind::ScrollUp => match self.state.region_at(col, row) {
                Some(Region::Chat) => self.state.chat_scroll = self.state.chat_scroll.saturating_add(1),
                Some(Region::Products) => self.state.product_cursor.prev(),
                _ => {}
            },
            MouseEventKind::ScrollDown => match self.state.region_at(col, row) {
                Some(Region::Chat) => self.state.chat_scroll = self.state.chat_scroll.saturating_sub(1),
                Some(Region::Products) => {
                    let len = self.visible_products(assistant).len();
                    self.state.product_cursor.next(len);
                }
                _ => {}
            },
            _ => {}
        }
    }
}
