use crate::animation::EntranceTransition;
use crate::errors::Result;
use crate::models::quote::{Quote, QuoteLookup, Symbol};
use crate::providers::base::QuoteProvider;
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// What the quote screen is showing
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading { symbol: Symbol },
    Loaded { quote: Quote, fetched_at: DateTime<Local> },
    Empty,
    Failed,
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }
}

/// Blocking message shown to the user after a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    MissingSymbol,
    NotFound,
    ConnectionFailed,
}

impl Alert {
    pub fn title(self) -> &'static str {
        match self {
            Alert::MissingSymbol => "Required field",
            Alert::NotFound => "Symbol not found",
            Alert::ConnectionFailed => "Connection error",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Alert::MissingSymbol => "Enter a valid ticker symbol.",
            Alert::NotFound => "Check the ticker or try again later.",
            Alert::ConnectionFailed => "Could not connect to the server.",
        }
    }
}

/// Handle for one in-flight fetch, returned by [`QuoteController::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub symbol: Symbol,
}

/// Owns the single live quote and the view state around it.
///
/// `begin` and `complete` are split so callers can run the network fetch
/// elsewhere; only the ticket from the most recent `begin` is applied,
/// results for superseded tickets are dropped.
pub struct QuoteController {
    provider: Arc<dyn QuoteProvider + Send + Sync>,
    state: ViewState,
    generation: u64,
    entrance: EntranceTransition,
}

impl QuoteController {
    pub fn new(provider: Arc<dyn QuoteProvider + Send + Sync>) -> Self {
        Self {
            provider,
            state: ViewState::Idle,
            generation: 0,
            entrance: EntranceTransition::new(),
        }
    }

    pub fn provider(&self) -> Arc<dyn QuoteProvider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn quote(&self) -> Option<&Quote> {
        match &self.state {
            ViewState::Loaded { quote, .. } => Some(quote),
            _ => None,
        }
    }

    pub fn entrance(&self) -> &EntranceTransition {
        &self.entrance
    }

    /// Validate `input` and move to `Loading`.
    ///
    /// Blank input yields `Alert::MissingSymbol` and leaves the state alone.
    pub fn begin(&mut self, input: &str) -> std::result::Result<FetchTicket, Alert> {
        let symbol = match Symbol::parse(input) {
            Ok(symbol) => symbol,
            Err(_) => {
                debug!("Rejected blank symbol input");
                return Err(Alert::MissingSymbol);
            }
        };

        self.generation += 1;
        self.state = ViewState::Loading { symbol: symbol.clone() };
        debug!("Fetch #{} started for {}", self.generation, symbol);

        Ok(FetchTicket {
            generation: self.generation,
            symbol,
        })
    }

    /// Apply the outcome of `ticket`'s fetch. Returns the alert to show, if any.
    pub fn complete(&mut self, ticket: &FetchTicket, outcome: Result<QuoteLookup>) -> Option<Alert> {
        if ticket.generation != self.generation {
            debug!(
                "Dropping stale result #{} for {} (current #{})",
                ticket.generation, ticket.symbol, self.generation
            );
            return None;
        }

        match outcome {
            Ok(QuoteLookup::Found(quote)) => {
                info!("Loaded quote for {}", quote.symbol);
                self.state = ViewState::Loaded {
                    quote,
                    fetched_at: Local::now(),
                };
                self.entrance.restart(Instant::now());
                None
            }
            Ok(QuoteLookup::NotFound) => {
                info!("No quote found for {}", ticket.symbol);
                self.state = ViewState::Empty;
                self.entrance.reset();
                Some(Alert::NotFound)
            }
            Err(e) => {
                warn!("Quote request for {} failed: {}", ticket.symbol, e);
                self.state = ViewState::Failed;
                self.entrance.reset();
                Some(Alert::ConnectionFailed)
            }
        }
    }

    /// Validate, fetch and apply in one step.
    pub async fn submit(&mut self, input: &str) -> Option<Alert> {
        let ticket = match self.begin(input) {
            Ok(ticket) => ticket,
            Err(alert) => return Some(alert),
        };
        let outcome = self.provider.fetch_quote(&ticket.symbol).await;
        self.complete(&ticket, outcome)
    }
}
