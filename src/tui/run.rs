use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::crossterm::{execute, terminal};
use ratatui::Terminal;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use log::debug;

use crate::errors::Result;
use crate::models::quote::QuoteLookup;
use crate::providers::base::QuoteProvider;
use crate::services::quote_service::{FetchTicket, QuoteController};
use crate::tui::app::{Action, TuiApp};
use crate::tui::ui::draw;

// Redraw cadence while the card animates or a fetch is pending.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(200);

pub type FetchOutcome = (FetchTicket, Result<QuoteLookup>);

pub async fn run_tui(
    provider: Arc<dyn QuoteProvider + Send + Sync>,
    color: bool,
    initial: &str,
) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, provider, color, initial).await;

    terminal::disable_raw_mode()?;
    execute!(stdout(), terminal::LeaveAlternateScreen)?;
    res
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    provider: Arc<dyn QuoteProvider + Send + Sync>,
    color: bool,
    initial: &str,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut controller = QuoteController::new(provider);
    let mut app = TuiApp::new(initial, color);

    start_fetch(&mut controller, &mut app, initial, &tx);

    loop {
        while let Ok((ticket, outcome)) = rx.try_recv() {
            if let Some(alert) = controller.complete(&ticket, outcome) {
                app.alert = Some(alert);
            }
        }

        let now = Instant::now();
        let entrance = controller.entrance().frame_at(now);
        terminal.draw(|f| draw(f, &app, controller.state(), entrance))?;

        let animating = controller.entrance().is_started() && !controller.entrance().is_settled_at(now);
        let timeout = if animating || controller.state().is_loading() {
            FRAME_INTERVAL
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.on_key(key) {
                    Action::Quit => break,
                    Action::Submit(input) => start_fetch(&mut controller, &mut app, &input, &tx),
                    Action::None => {}
                }
            }
        }
    }

    debug!("Leaving interactive mode");
    Ok(())
}

/// Begin a fetch on `controller` and run the network call on a task.
///
/// The outcome comes back over `tx` tagged with its ticket; blank input
/// raises the alert immediately instead.
pub fn start_fetch(
    controller: &mut QuoteController,
    app: &mut TuiApp,
    input: &str,
    tx: &mpsc::UnboundedSender<FetchOutcome>,
) {
    let ticket = match controller.begin(input) {
        Ok(ticket) => ticket,
        Err(alert) => {
            app.alert = Some(alert);
            return;
        }
    };

    let provider = controller.provider();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = provider.fetch_quote(&ticket.symbol).await;
        // Receiver is gone once the loop exits.
        let _ = tx.send((ticket, outcome));
    });
}
