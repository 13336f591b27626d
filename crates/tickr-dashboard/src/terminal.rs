//! Full-screen terminal board.
//!
//! `TerminalSurface` keeps the board contents and draws them with ratatui;
//! `TerminalGuard` owns the raw-mode terminal and restores it on drop.

use crate::error::DashboardResult;
use crate::surface::{CardField, Placeholder, StatusTone, UiSurface};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tickr_core::{Direction, Instrument, UiHandle};
use tracing::debug;

const CARD_WIDTH: u16 = 26;
const CARD_HEIGHT: u16 = 6;

/// What a key press asks the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    QueryChanged(String),
    Quit,
}

#[derive(Debug)]
struct Card {
    name: String,
    symbol: String,
    price: String,
    updated: String,
    visible: bool,
    pulse: Option<(Direction, Instant)>,
}

#[derive(Debug)]
pub struct TerminalSurface {
    title: String,
    cards: Vec<(UiHandle, Card)>,
    index: HashMap<UiHandle, usize>,
    placeholder: Option<(Placeholder, String)>,
    status: (String, StatusTone),
    query: String,
    next_handle: u64,
}

impl TerminalSurface {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cards: Vec::new(),
            index: HashMap::new(),
            placeholder: None,
            status: (String::new(), StatusTone::Info),
            query: String::new(),
            next_handle: 1,
        }
    }

    /// Current search box content.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> (&str, StatusTone) {
        (&self.status.0, self.status.1)
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder.as_ref().map(|(p, _)| *p)
    }

    /// Symbols of the visible cards, in board order.
    pub fn visible_symbols(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|(_, c)| c.visible)
            .map(|(_, c)| c.symbol.as_str())
            .collect()
    }

    /// Whether the card is emphasised at `now`.
    pub fn pulse_at(&self, handle: UiHandle, now: Instant) -> Option<Direction> {
        let idx = *self.index.get(&handle)?;
        match self.cards[idx].1.pulse {
            Some((direction, until)) if until > now => Some(direction),
            _ => None,
        }
    }

    /// Edit the search box from a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if key.kind != KeyEventKind::Press {
            return InputAction::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            KeyCode::Esc if self.query.is_empty() => InputAction::Quit,
            KeyCode::Esc => {
                self.query.clear();
                InputAction::QueryChanged(String::new())
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    InputAction::QueryChanged(self.query.clone())
                } else {
                    InputAction::None
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                InputAction::QueryChanged(self.query.clone())
            }
            _ => InputAction::None,
        }
    }

    /// Draw the whole board.
    pub fn draw(&self, frame: &mut Frame, now: Instant) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // search
                Constraint::Length(1), // status
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(1), // footer
            ])
            .split(frame.area());

        self.draw_search(frame, chunks[0]);
        self.draw_status(frame, chunks[1]);
        match &self.placeholder {
            Some((kind, text)) => draw_placeholder(frame, chunks[2], *kind, text),
            None => self.draw_cards(frame, chunks[2], now),
        }
        draw_footer(frame, chunks[3]);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let search = Paragraph::new(Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.query.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", self.title)),
        );
        frame.render_widget(search, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let (text, tone) = &self.status;
        let color = match tone {
            StatusTone::Info => Color::Gray,
            StatusTone::Live => Color::Cyan,
            StatusTone::Warning => Color::Yellow,
            StatusTone::Error => Color::Red,
        };
        let status = Paragraph::new(text.as_str())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center);
        frame.render_widget(status, area);
    }

    fn draw_cards(&self, frame: &mut Frame, area: Rect, now: Instant) {
        let columns = (area.width / CARD_WIDTH).max(1);
        let rows = (area.height / CARD_HEIGHT).max(1);

        let visible = self.cards.iter().filter(|(_, c)| c.visible);
        for (slot, (_, card)) in visible.enumerate().take((columns * rows) as usize) {
            let slot = slot as u16;
            let rect = Rect {
                x: area.x + (slot % columns) * CARD_WIDTH,
                y: area.y + (slot / columns) * CARD_HEIGHT,
                width: CARD_WIDTH.min(area.width),
                height: CARD_HEIGHT.min(area.height),
            };
            draw_card(frame, rect, card, now);
        }
    }

    fn card_mut(&mut self, handle: UiHandle) -> Option<&mut Card> {
        let idx = *self.index.get(&handle)?;
        self.cards.get_mut(idx).map(|(_, card)| card)
    }
}

fn draw_card(frame: &mut Frame, area: Rect, card: &Card, now: Instant) {
    let price_style = match card.pulse {
        Some((Direction::Up, until)) if until > now => {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        }
        Some((Direction::Down, until)) if until > now => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
        _ => Style::default().add_modifier(Modifier::BOLD),
    };

    let lines = vec![
        Line::from(Span::styled(
            card.symbol.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(card.price.as_str(), price_style)),
        Line::from(Span::styled(
            card.updated.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", card.name)),
    );
    frame.render_widget(widget, area);
}

fn draw_placeholder(frame: &mut Frame, area: Rect, kind: Placeholder, text: &str) {
    let style = match kind {
        Placeholder::Error => Style::default().fg(Color::Red),
        Placeholder::Loading | Placeholder::Empty => Style::default().fg(Color::Gray),
    };
    let widget = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            " type",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" filter  "),
        Span::styled(
            "Esc",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" clear/quit  "),
        Span::styled(
            "Ctrl-C",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

impl UiSurface for TerminalSurface {
    fn create_card(&mut self, instrument: &Instrument) -> UiHandle {
        let handle = UiHandle(self.next_handle);
        self.next_handle += 1;
        self.placeholder = None;
        self.index.insert(handle, self.cards.len());
        self.cards.push((
            handle,
            Card {
                name: instrument.display_name.clone(),
                symbol: instrument.id.to_string(),
                price: String::new(),
                updated: String::new(),
                visible: true,
                pulse: None,
            },
        ));
        handle
    }

    fn set_text(&mut self, handle: UiHandle, field: CardField, text: &str) {
        let Some(card) = self.card_mut(handle) else {
            return;
        };
        let slot = match field {
            CardField::Name => &mut card.name,
            CardField::Symbol => &mut card.symbol,
            CardField::Price => &mut card.price,
            CardField::Updated => &mut card.updated,
        };
        text.clone_into(slot);
    }

    fn set_visible(&mut self, handle: UiHandle, visible: bool) {
        if let Some(card) = self.card_mut(handle) {
            card.visible = visible;
        }
    }

    fn pulse(&mut self, handle: UiHandle, direction: Direction, duration: Duration) {
        if let Some(card) = self.card_mut(handle) {
            // A newer pulse replaces the running one
            card.pulse = Some((direction, Instant::now() + duration));
        }
    }

    fn clear_surface(&mut self) {
        self.cards.clear();
        self.index.clear();
        self.placeholder = None;
    }

    fn show_placeholder(&mut self, placeholder: Placeholder, text: &str) {
        self.placeholder = Some((placeholder, text.to_string()));
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.status = (text.to_string(), tone);
    }
}

/// Raw-mode alternate-screen terminal, restored on drop.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen.
    pub fn enter() -> DashboardResult<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(info);
        }));

        debug!("Terminal entered raw mode");
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, surface: &TerminalSurface) -> DashboardResult<()> {
        draw_to(&mut self.terminal, surface)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Draw a surface on any ratatui backend.
pub fn draw_to<B: Backend>(
    terminal: &mut Terminal<B>,
    surface: &TerminalSurface,
) -> DashboardResult<()> {
    let now = Instant::now();
    terminal.draw(|frame| surface.draw(frame, now))?;
    Ok(())
}
