// Public modules
pub mod models;
pub mod providers;
pub mod services;
pub mod errors;
pub mod config;

// Presentation
pub mod animation;
pub mod tui;
pub mod util;
pub mod view;

// Re-export the common types
pub use config::Config;
pub use errors::{QuoteError, Result};
pub use models::quote::{Quote, QuoteLookup, Symbol};
pub use providers::alpha_vantage::AlphaVantageProvider;
pub use providers::base::QuoteProvider;
pub use services::quote_service::{Alert, FetchTicket, QuoteController, ViewState};
