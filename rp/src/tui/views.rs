//! TUI views and rendering
//!
//! Draws the view models from `crate::view`. Geometry used for mouse
//! hit-testing (region rectangles and card layouts) is recorded in the
//! state on every frame.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::state::{AppState, InteractionMode};
use crate::assistant::Assistant;
use crate::chat::{EntryKind, Role};
use crate::completion::Segment;
use crate::view::{
    self, CLOSE_LABEL, DETAILS_LABEL, ProductCard, ProductsView, Region, SOURCES_HEADING, layout_cards,
};

const INPUT_PLACEHOLDER: &str = "Ask about your routine or the products...";

/// Main render function
pub fn render(frame: &mut Frame, state: &mut AppState, assistant: &Assistant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, state, assistant, chunks[0]);

    // RTL mirrors the column order
    let rtl = assistant.direction().is_rtl();
    let constraints = if rtl {
        [Constraint::Percentage(45), Constraint::Percentage(55)]
    } else {
        [Constraint::Percentage(55), Constraint::Percentage(45)]
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[1]);
    let (products_area, side_area) = if rtl {
        (columns[1], columns[0])
    } else {
        (columns[0], columns[1])
    };

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35), // Selected products
            Constraint::Min(5),         // Chat transcript
            Constraint::Length(3),      // Chat input
        ])
        .split(side_area);

    state.regions = vec![
        (Region::Products, products_area),
        (Region::Selected, side[0]),
        (Region::Chat, side[1]),
        (Region::Chat, side[2]),
    ];

    render_products(frame, state, assistant, products_area);
    render_selected(frame, state, assistant, side[0]);
    render_chat(frame, state, assistant, side[1]);
    render_input(frame, state, assistant, side[2]);
    render_footer(frame, state, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        let area = frame.area();
        render_help_overlay(frame, area);
    }
}

fn alignment(assistant: &Assistant) -> Alignment {
    if assistant.direction().is_rtl() {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn region_block(state: &AppState, region: Region, title: String) -> Block<'static> {
    let border = if state.focus == region {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default().borders(Borders::ALL).border_style(border).title(title)
}

/// Render the header bar
fn render_header(frame: &mut Frame, state: &AppState, assistant: &Assistant, area: Rect) {
    let category = state.filter.category.as_deref().unwrap_or("none");
    let mut spans = vec![
        Span::styled(
            "RoutinePicker ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(format!("Category: {}", category), Style::default().fg(Color::Yellow)),
        Span::raw(" │ "),
        Span::styled(
            format!("Search: {}", state.filter.search),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{} selected", assistant.selection().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" │ "),
        Span::styled(
            assistant.direction().to_string().to_uppercase(),
            Style::default().fg(Color::Blue),
        ),
    ];
    if assistant.is_busy() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("waiting for reply", Style::default().fg(Color::Magenta)));
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(alignment(assistant))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Render the product cards (or the placeholder)
fn render_products(frame: &mut Frame, state: &mut AppState, assistant: &Assistant, area: Rect) {
    let block = region_block(state, Region::Products, format!(" {} ", Region::Products.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let products = view::render_products(assistant.catalog(), &state.filter, assistant.selection(), &state.details);
    let cards = match products {
        ProductsView::Placeholder(text) => {
            state.card_layouts.clear();
            let placeholder = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        }
        ProductsView::Cards(cards) => cards,
    };

    // Keep the cursor card on screen
    state.product_cursor.clamp(cards.len());
    let cursor = state.product_cursor.index;
    if cursor < state.product_scroll {
        state.product_scroll = cursor;
    }
    let direction = assistant.direction();
    let mut layouts = layout_cards(inner, &cards, state.product_scroll, direction);
    while cursor >= state.product_scroll + layouts.len() && state.product_scroll < cursor {
        state.product_scroll += 1;
        layouts = layout_cards(inner, &cards, state.product_scroll, direction);
    }

    let align = alignment(assistant);
    for (offset, (layout, card)) in layouts.iter().zip(cards.iter().skip(state.product_scroll)).enumerate() {
        let is_cursor = state.focus == Region::Products && state.product_scroll + offset == cursor;
        render_card(frame, card, layout, is_cursor, align);
    }
    state.card_layouts = layouts;
}

fn render_card(
    frame: &mut Frame,
    card: &ProductCard<'_>,
    layout: &view::CardLayout,
    is_cursor: bool,
    align: Alignment,
) {
    let mut border = Style::default();
    if card.selected {
        border = border.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if is_cursor {
        border = border.fg(Color::Yellow);
    }
    let title = if card.selected { " ✓ selected " } else { "" };
    let block = Block::default().borders(Borders::ALL).border_style(border).title(title);
    frame.render_widget(block, layout.body);

    let body = layout.body;
    let inner_width = body.width.saturating_sub(2);
    let name_row = Rect::new(body.x + 1, body.y + 1, inner_width, 1);
    let brand_row = Rect::new(body.x + 1, body.y + 2, inner_width, 1);

    let name = Paragraph::new(Span::styled(
        card.product.name.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(align);
    frame.render_widget(name, name_row);

    let mut brand = card.product.brand.clone();
    if let Some(price) = card.product.price {
        brand.push_str(&format!("  ${:.2}", price));
    }
    frame.render_widget(
        Paragraph::new(Span::styled(brand, Style::default().fg(Color::DarkGray))).alignment(align),
        brand_row,
    );
    // Drawn last so it sits over the brand row
    frame.render_widget(
        Paragraph::new(Span::styled(DETAILS_LABEL, Style::default().fg(Color::Cyan))),
        layout.details_button,
    );

    if let Some(description) = layout.description {
        frame.render_widget(Clear, description);
        let text_area = Rect::new(
            description.x,
            description.y,
            description.width,
            description.height.saturating_sub(1),
        );
        let text = Paragraph::new(card.product.description.as_str())
            .wrap(Wrap { trim: true })
            .alignment(align)
            .style(Style::default().fg(Color::White));
        frame.render_widget(text, text_area);
    }
    if let Some(close) = layout.close_button {
        frame.render_widget(
            Paragraph::new(Span::styled(CLOSE_LABEL, Style::default().fg(Color::Red))),
            close,
        );
    }
}

/// Render the selected-products panel
fn render_selected(frame: &mut Frame, state: &mut AppState, assistant: &Assistant, area: Rect) {
    let panel = view::render_selected(assistant.catalog(), assistant.selection());
    let mut block = region_block(
        state,
        Region::Selected,
        format!(" {} ({}) ", Region::Selected.title(), panel.items.len()),
    );
    if panel.clear_all_visible {
        block = block.title_bottom(Line::from(" [x] Clear all ").right_aligned());
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let align = alignment(assistant);
    if let Some(placeholder) = panel.placeholder {
        let text = Paragraph::new(placeholder)
            .alignment(align)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, inner);
        return;
    }

    state.selected_cursor.clamp(panel.items.len());
    let lines: Vec<Line> = panel
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = format!("× {} ({})", item.name, item.brand);
            if state.focus == Region::Selected && i == state.selected_cursor.index {
                Line::from(Span::styled(text, Style::default().bg(Color::DarkGray).fg(Color::White)))
            } else {
                Line::from(text)
            }
        })
        .collect();

    let scroll = (state.selected_cursor.index as u16).saturating_sub(inner.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).alignment(align).scroll((scroll, 0)), inner);
}

/// Render the chat transcript
fn render_chat(frame: &mut Frame, state: &mut AppState, assistant: &Assistant, area: Rect) {
    let block = region_block(state, Region::Chat, format!(" {} ", Region::Chat.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let link = Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
    let mut lines: Vec<Line> = Vec::new();
    for block in view::render_chat(assistant.chat().entries()) {
        let label_style = match (block.kind, block.role) {
            (EntryKind::Notice, _) => Style::default().fg(Color::Red),
            (EntryKind::Loading, _) => Style::default().fg(Color::DarkGray),
            (_, Role::User) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(Span::styled(format!("{}:", block.label()), label_style)));

        for chat_line in &block.lines {
            let spans: Vec<Span> = chat_line
                .segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) if block.kind == EntryKind::Loading => Span::styled(
                        *text,
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ),
                    Segment::Text(text) => Span::raw(*text),
                    Segment::Link(url) => Span::styled(*url, link),
                })
                .collect();
            lines.push(Line::from(spans));
        }

        if !block.sources.is_empty() {
            lines.push(Line::from(Span::styled(
                SOURCES_HEADING,
                Style::default().fg(Color::DarkGray),
            )));
            for url in &block.sources {
                lines.push(Line::from(vec![Span::raw("  "), Span::styled(*url, link)]));
            }
        }
        lines.push(Line::from(""));
    }

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .alignment(alignment(assistant));

    // Follow the bottom unless the user scrolled up; wrapped rows, not logical lines
    let content_height = transcript.line_count(inner.width);
    let max_offset = content_height.saturating_sub(inner.height as usize);
    state.chat_scroll = state.chat_scroll.min(max_offset);
    let offset = u16::try_from(max_offset - state.chat_scroll).unwrap_or(u16::MAX);

    frame.render_widget(transcript.scroll((offset, 0)), inner);
}

/// Render the chat input box
fn render_input(frame: &mut Frame, state: &AppState, assistant: &Assistant, area: Rect) {
    let typing = state.interaction_mode == InteractionMode::ChatInput;
    let title = if assistant.is_busy() {
        " Waiting for reply... "
    } else {
        " Message "
    };
    let border = if typing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text = if typing {
        Line::from(vec![Span::raw(state.chat_input.as_str()), Span::styled("▏", border)])
    } else if state.chat_input.is_empty() {
        Line::from(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(state.chat_input.as_str())
    };

    let input = Paragraph::new(text)
        .alignment(alignment(assistant))
        .block(Block::default().borders(Borders::ALL).border_style(border).title(title));
    frame.render_widget(input, area);
}

/// Render the key hint line
fn render_footer(frame: &mut Frame, state: &AppState, area: Rect) {
    let hints = match state.interaction_mode {
        InteractionMode::Search => "type to search · Enter done · Esc clear",
        InteractionMode::ChatInput => "Enter send · Esc stop typing",
        InteractionMode::Help => "any key closes help",
        InteractionMode::Normal => {
            concat!(
                "Tab focus · c category · / search · Space select · i details · ",
                "g routine · x clear · r direction · ? help · q quit"
            )
        }
    };
    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let rows = [
        ("Tab", "move focus: products, selected, chat"),
        ("c", "next category"),
        ("/", "search name, brand and description"),
        ("Space / Enter", "select or deselect the product"),
        ("i", "show or hide the description"),
        ("Esc", "close the description"),
        ("d / Delete", "remove from selected products"),
        ("x", "clear all selected products"),
        ("g", "generate a routine"),
        ("Enter (chat)", "type a message"),
        ("Ctrl-l", "clear the conversation"),
        ("r", "toggle right-to-left layout"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(k, desc)| Line::from(vec![Span::styled(format!("{:>14}  ", k), key), Span::raw(*desc)]))
        .collect();

    let help = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(help, popup);
}

/// Rectangle of the given percentage size centred in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
