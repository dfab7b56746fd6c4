use crate::animation::EntranceFrame;
use crate::models::quote::Quote;
use crate::services::quote_service::{Alert, ViewState};
use crate::util::format::{change_chip, format_price, format_volume, ChangeDirection, ChangeStyle};
use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::crossterm::style::Stylize;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Widget};

pub const APP_TITLE: &str = "MarketView";
pub const APP_SUBTITLE: &str = "Real-time quotes";
pub const EXCHANGE_LINE: &str = "NASDAQ · USD";
pub const LOADING_TEXT: &str = "Loading quote data...";
pub const EMPTY_TITLE: &str = "No data to show";
pub const EMPTY_HINT: &str = "Type a ticker symbol and press Enter to see its quote.";

pub const CARD_WIDTH: u16 = 48;
pub const CARD_HEIGHT: u16 = 11;

// Entrance offset units per terminal row.
const OFFSET_PER_ROW: f64 = 8.0;

pub fn change_color(style: ChangeStyle) -> Color {
    match style {
        ChangeStyle::Positive => Color::Green,
        ChangeStyle::Negative => Color::Red,
    }
}

/// Quote card widget: ticker, change chip, price, stats grid and footer.
pub struct CardView<'a> {
    quote: &'a Quote,
    fetched_at: &'a DateTime<Local>,
    entrance: EntranceFrame,
    color: bool,
}

impl<'a> CardView<'a> {
    pub fn new(quote: &'a Quote, fetched_at: &'a DateTime<Local>) -> Self {
        Self {
            quote,
            fetched_at,
            entrance: EntranceFrame::SETTLED,
            color: true,
        }
    }

    pub fn entrance(mut self, entrance: EntranceFrame) -> Self {
        self.entrance = entrance;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn change_style(&self) -> Style {
        if !self.color {
            return Style::default();
        }
        let direction = ChangeDirection::from_change_percent(&self.quote.change_percent);
        Style::default().fg(change_color(direction.style()))
    }

    /// Where the card sits inside `area` for the current entrance frame.
    ///
    /// `None` while the card is fully transparent or pushed out of `area`.
    pub fn placement(&self, area: Rect) -> Option<Rect> {
        if self.entrance.opacity <= 0.0 {
            return None;
        }
        let shift = (self.entrance.translate_y.max(0.0) / OFFSET_PER_ROW).round() as u16;
        let height = CARD_HEIGHT.min(area.height.saturating_sub(shift));
        if height == 0 {
            return None;
        }
        Some(Rect::new(area.x, area.y + shift, CARD_WIDTH.min(area.width), height))
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let change_style = self.change_style();
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let block = Block::default().borders(Borders::ALL).border_style(change_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // ticker + chip
                Constraint::Length(2), // price
                Constraint::Length(2), // stats
                Constraint::Length(2), // change + volume
                Constraint::Length(1), // fetched at
            ])
            .split(inner);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(16)])
            .split(rows[0]);

        Paragraph::new(vec![
            Line::from(Span::styled(self.quote.symbol.clone(), bold)),
            Line::from(EXCHANGE_LINE),
        ])
        .render(header[0], buf);

        Paragraph::new(Line::from(Span::styled(change_chip(&self.quote.change_percent), change_style)))
            .alignment(Alignment::Right)
            .render(header[1], buf);

        Paragraph::new(Line::from(Span::styled(format_price(self.quote.price), bold))).render(rows[1], buf);

        let stats = vec![
            Row::new(vec![
                "OPEN".to_string(),
                format_price(self.quote.open),
                "HIGH".to_string(),
                format_price(self.quote.high),
            ]),
            Row::new(vec![
                "LOW".to_string(),
                format_price(self.quote.low),
                "PREV CLOSE".to_string(),
                format_price(self.quote.previous_close),
            ]),
        ];
        Table::new(
            stats,
            [
                Constraint::Length(10),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(11),
            ],
        )
        .render(rows[2], buf);

        let mut footer = vec![
            Span::raw("DAILY CHANGE "),
            Span::styled(self.quote.change_percent.clone(), change_style),
        ];
        if let Some(volume) = self.quote.volume {
            footer.push(Span::raw("    VOLUME "));
            footer.push(Span::raw(format_volume(volume)));
        }
        Paragraph::new(Line::from(footer)).render(rows[3], buf);

        Paragraph::new(Line::from(Span::styled(
            format!("Fetched at {}", self.fetched_at.format("%Y-%m-%d %H:%M:%S")),
            Style::default().add_modifier(Modifier::DIM),
        )))
        .render(rows[4], buf);

        if self.entrance.opacity < 1.0 {
            buf.set_style(area, Style::default().add_modifier(Modifier::DIM));
        }
    }
}

/// Text shown in place of the card when no quote is loaded.
pub fn state_message(state: &ViewState) -> String {
    match state {
        ViewState::Loading { symbol } => format!("{} ({})", LOADING_TEXT, symbol),
        ViewState::Loaded { quote, .. } => quote.symbol.clone(),
        ViewState::Idle | ViewState::Empty | ViewState::Failed => format!("{}\n{}", EMPTY_TITLE, EMPTY_HINT),
    }
}

pub fn render_alert(alert: Alert) -> String {
    format!("{}: {}", alert.title(), alert.message())
}

/// What a one-shot lookup prints: the card, or the quote as JSON.
///
/// `None` unless `state` holds a loaded quote.
pub fn loaded_output(state: &ViewState, json: bool, color: bool) -> serde_json::Result<Option<String>> {
    let (quote, fetched_at) = match state {
        ViewState::Loaded { quote, fetched_at } => (quote, fetched_at),
        _ => return Ok(None),
    };
    if json {
        serde_json::to_string_pretty(quote).map(Some)
    } else {
        Ok(Some(card_text(quote, fetched_at, color)))
    }
}

/// Render the card off-screen and return it as printable lines.
pub fn card_text(quote: &Quote, fetched_at: &DateTime<Local>, color: bool) -> String {
    let area = Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT);
    let mut buf = Buffer::empty(area);
    CardView::new(quote, fetched_at).color(color).render(area, &mut buf);
    buffer_text(&buf)
}

/// Flatten a buffer into lines, keeping green/red foregrounds as terminal colors.
pub fn buffer_text(buf: &Buffer) -> String {
    buf.content()
        .chunks(buf.area.width as usize)
        .map(|row| {
            let mut line = String::new();
            for cell in row {
                let symbol = cell.symbol().to_string();
                match cell.fg {
                    Color::Green => line.push_str(&symbol.green().to_string()),
                    Color::Red => line.push_str(&symbol.red().to_string()),
                    _ => line.push_str(&symbol),
                }
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
