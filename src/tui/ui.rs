use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::animation::EntranceFrame;
use crate::services::quote_service::ViewState;
use crate::tui::app::TuiApp;
use crate::view::{self, CardView, CARD_HEIGHT};

const SEARCH_TITLE: &str = "Ticker (e.g. AAPL, PETR4.SA) · Enter to search · Esc to quit";

pub fn draw(f: &mut Frame, app: &TuiApp, state: &ViewState, entrance: EntranceFrame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),        // header
            Constraint::Length(3),        // search
            Constraint::Min(CARD_HEIGHT), // card
        ])
        .split(f.size());

    // --- HEADER ---
    let live = if app.color {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(view::APP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled("● LIVE", live),
        ]),
        Line::from(view::APP_SUBTITLE),
    ]);
    f.render_widget(header, chunks[0]);

    // --- SEARCH ---
    let search_style = if state.is_loading() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let search = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .title(SEARCH_TITLE)
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    f.render_widget(search, chunks[1]);
    if app.alert.is_none() {
        let cursor_x = chunks[1].x + 1 + app.input.chars().count() as u16;
        f.set_cursor(cursor_x.min(chunks[1].right().saturating_sub(2)), chunks[1].y + 1);
    }

    // --- CARD ---
    match state {
        ViewState::Loaded { quote, fetched_at } => {
            let card = CardView::new(quote, fetched_at).entrance(entrance).color(app.color);
            if let Some(area) = card.placement(chunks[2]) {
                f.render_widget(card, area);
            }
        }
        other => {
            let message = Paragraph::new(view::state_message(other)).alignment(Alignment::Center);
            f.render_widget(message, chunks[2]);
        }
    }

    // --- ALERT ---
    if let Some(alert) = app.alert {
        let area = centered(50, 5, f.size());
        let popup = Paragraph::new(vec![Line::from(alert.message()), Line::from(""), Line::from("Press any key")])
            .block(Block::default().title(alert.title()).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::{Quote, Symbol};
    use crate::services::quote_service::Alert;
    use chrono::Local;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn screen(app: &TuiApp, state: &ViewState, entrance: EntranceFrame) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app, state, entrance)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        view::buffer_text(buf)
    }

    fn loaded() -> ViewState {
        ViewState::Loaded {
            quote: Quote {
                symbol: "MSFT".to_string(),
                price: 410.5,
                open: 408.0,
                high: 412.25,
                low: 407.1,
                previous_close: 405.0,
                change_percent: "1.3580%".to_string(),
                volume: Some(21_000_000),
            },
            fetched_at: Local::now(),
        }
    }

    #[test]
    fn idle_screen_shows_the_empty_hint() {
        let app = TuiApp::new("AAPL", false);
        let out = text(&screen(&app, &ViewState::Idle, EntranceFrame::HIDDEN));
        assert!(out.contains(view::APP_TITLE));
        assert!(out.contains("AAPL"));
        assert!(out.contains(view::EMPTY_TITLE));
    }

    #[test]
    fn loading_screen_names_the_symbol() {
        let app = TuiApp::new("IBM", false);
        let state = ViewState::Loading { symbol: Symbol::parse("IBM").unwrap() };
        let out = text(&screen(&app, &state, EntranceFrame::HIDDEN));
        assert!(out.contains("Loading quote data... (IBM)"));
    }

    #[test]
    fn card_follows_the_entrance_frame() {
        let app = TuiApp::new("MSFT", false);
        let state = loaded();

        let hidden = text(&screen(&app, &state, EntranceFrame::HIDDEN));
        assert!(!hidden.contains("$410.50"));

        let settled = screen(&app, &state, EntranceFrame::SETTLED);
        assert!(text(&settled).contains("$410.50"));
        assert!(text(&settled).contains("▲ 1.3580%"));
        // Settled card sits directly under the search box.
        assert_eq!(settled.get(0, 5).symbol(), "┌");
    }

    #[test]
    fn alert_popup_is_drawn_over_the_screen() {
        let mut app = TuiApp::new("ZZZZ", false);
        app.alert = Some(Alert::NotFound);
        let out = text(&screen(&app, &ViewState::Empty, EntranceFrame::HIDDEN));
        assert!(out.contains(Alert::NotFound.title()));
        assert!(out.contains(Alert::NotFound.message()));
    }
}
