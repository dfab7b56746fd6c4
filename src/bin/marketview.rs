use marketview::config::Config;
use marketview::providers::alpha_vantage::AlphaVantageProvider;
use marketview::providers::base::QuoteProvider;
use marketview::services::quote_service::QuoteController;
use marketview::tui::run::run_tui;
use marketview::view;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{debug, info, warn};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_SYMBOL: &str = "AAPL";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let symbol_arg = Arg::with_name("symbol")
        .short('s')
        .long("symbol")
        .value_name("SYMBOL")
        .takes_value(true);

    let matches = App::new("MarketView")
        .version("1.0.0")
        .about("Stock quote viewer")
        .arg(
            Arg::with_name("env-file")
                .long("env-file")
                .value_name("PATH")
                .help("Read settings from this file instead of ./.env")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("api-key")
                .long("api-key")
                .value_name("KEY")
                .help("Alpha Vantage API key (overrides MARKETVIEW_API_KEY)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Quote endpoint host (overrides MARKETVIEW_BASE_URL)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Request timeout in seconds; the HTTP client default applies when unset")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no-color")
                .long("no-color")
                .help("Disable colored change indicators")
                .takes_value(false),
        )
        .subcommand(
            SubCommand::with_name("quote")
                .about("Fetch a single quote and print it")
                .arg(symbol_arg.clone().help("Ticker symbol to look up").required(true))
                .arg(
                    Arg::with_name("json")
                        .long("json")
                        .help("Print the quote as JSON instead of a card")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("interactive")
                .about("Full-screen quote viewer with a ticker search box")
                .arg(
                    symbol_arg
                        .help("Symbol fetched on startup")
                        .default_value(DEFAULT_SYMBOL),
                ),
        )
        .get_matches();

    let config = load_config(&matches)?;
    debug!("Using {:?}", config);
    if config.uses_demo_key() {
        warn!("No API key configured, using the public demo key");
    }

    let provider: Arc<dyn QuoteProvider + Send + Sync> =
        Arc::new(AlphaVantageProvider::new(&config).context("failed to build HTTP client")?);

    if let Some(matches) = matches.subcommand_matches("quote") {
        let symbol = matches.value_of("symbol").unwrap_or_default();
        return run_once(provider, &config, symbol, matches.is_present("json")).await;
    }

    if let Some(matches) = matches.subcommand_matches("interactive") {
        let initial = matches.value_of("symbol").unwrap_or(DEFAULT_SYMBOL);
        run_tui(provider, config.color, initial).await?;
        info!("Bye");
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.value_of("env-file") {
        Some(path) => Config::from_env_file(Path::new(path))?,
        None => Config::load().context("invalid environment configuration")?,
    };

    if let Some(key) = matches.value_of("api-key") {
        config = config.with_api_key(key);
    }
    if let Some(url) = matches.value_of("base-url") {
        config = config.with_base_url(url);
    }
    if let Some(secs) = matches.value_of("timeout") {
        config = config.with_timeout_secs(secs)?;
    }
    if matches.is_present("no-color") {
        config = config.with_color(false);
    }

    Ok(config)
}

// Alerts go to stderr; the card or JSON is printed only for a loaded quote.
async fn run_once(
    provider: Arc<dyn QuoteProvider + Send + Sync>,
    config: &Config,
    symbol: &str,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let mut controller = QuoteController::new(provider);
    if let Some(alert) = controller.submit(symbol).await {
        eprintln!("{}", view::render_alert(alert));
    }

    match view::loaded_output(controller.state(), json, config.color)? {
        Some(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
