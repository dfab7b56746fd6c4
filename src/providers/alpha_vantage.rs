use crate::config::Config;
use crate::errors::{QuoteError, Result};
use crate::models::quote::{Quote, QuoteLookup, Symbol};
use crate::providers::base::QuoteProvider;
use crate::util::{parse_decimal, parse_volume};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Request};
use serde_json::{Map, Value};

pub const GLOBAL_QUOTE_FUNCTION: &str = "GLOBAL_QUOTE";
pub const ENVELOPE_KEY: &str = "Global Quote";

pub const FIELD_SYMBOL: &str = "01. symbol";
pub const FIELD_OPEN: &str = "02. open";
pub const FIELD_HIGH: &str = "03. high";
pub const FIELD_LOW: &str = "04. low";
pub const FIELD_PRICE: &str = "05. price";
pub const FIELD_VOLUME: &str = "06. volume";
pub const FIELD_PREVIOUS_CLOSE: &str = "08. previous close";
pub const FIELD_CHANGE_PERCENT: &str = "10. change percent";

// Rate limiting and bad keys come back as 200 with one of these instead of the envelope.
const NOTICE_KEYS: [&str; 3] = ["Note", "Information", "Error Message"];

/// Alpha Vantage `GLOBAL_QUOTE` client
pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(QuoteError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key().to_string(),
        })
    }

    /// The single GET issued for `symbol`, without sending it.
    pub fn build_request(&self, symbol: &Symbol) -> Result<Request> {
        self.client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("function", GLOBAL_QUOTE_FUNCTION),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .build()
            .map_err(|e| QuoteError::RequestError(e.without_url()))
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn provider_name(&self) -> &'static str {
        "AlphaVantage"
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteLookup> {
        info!("Fetching quote for {}", symbol);

        let request = self.build_request(symbol)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| QuoteError::RequestError(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::StatusError(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| QuoteError::RequestError(e.without_url()))?;
        debug!("Received {} bytes for {}", text.len(), symbol);

        parse_global_quote(&text)
    }
}

/// Decode a `GLOBAL_QUOTE` body.
///
/// A missing, null or empty `"Global Quote"` object means the symbol is
/// unknown and yields `NotFound`. Malformed JSON is an error.
pub fn parse_global_quote(body: &str) -> Result<QuoteLookup> {
    let json: Value = serde_json::from_str(body)?;

    for key in NOTICE_KEYS {
        if let Some(notice) = json.get(key).and_then(Value::as_str) {
            warn!("Provider notice ({}): {}", key, notice);
        }
    }

    match json.get(ENVELOPE_KEY).and_then(Value::as_object) {
        Some(envelope) if !envelope.is_empty() => Ok(QuoteLookup::Found(quote_from_envelope(envelope))),
        _ => {
            debug!("Quote envelope absent or empty");
            Ok(QuoteLookup::NotFound)
        }
    }
}

fn text_field<'a>(envelope: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    envelope.get(name).and_then(Value::as_str)
}

// Numbers are normally quoted, but a bare JSON number is accepted too.
fn decimal_field(envelope: &Map<String, Value>, name: &str) -> f64 {
    match envelope.get(name) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        other => parse_decimal(other.and_then(Value::as_str), name),
    }
}

fn volume_field(envelope: &Map<String, Value>) -> Option<u64> {
    match envelope.get(FIELD_VOLUME) {
        Some(Value::Number(n)) => n.as_u64(),
        other => parse_volume(other.and_then(Value::as_str)),
    }
}

fn quote_from_envelope(envelope: &Map<String, Value>) -> Quote {
    Quote {
        symbol: text_field(envelope, FIELD_SYMBOL).unwrap_or_default().to_string(),
        price: decimal_field(envelope, FIELD_PRICE),
        open: decimal_field(envelope, FIELD_OPEN),
        high: decimal_field(envelope, FIELD_HIGH),
        low: decimal_field(envelope, FIELD_LOW),
        previous_close: decimal_field(envelope, FIELD_PREVIOUS_CLOSE),
        change_percent: text_field(envelope, FIELD_CHANGE_PERCENT).unwrap_or_default().to_string(),
        volume: volume_field(envelope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quote_service::{Alert, QuoteController};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const AAPL_BODY: &str = r#"{
        "Global Quote": {
            "01. symbol": "AAPL",
            "02. open": "173.0500",
            "03. high": "174.3000",
            "04. low": "171.9600",
            "05. price": "172.3500",
            "06. volume": "48425699",
            "07. latest trading day": "2024-03-08",
            "08. previous close": "173.0700",
            "09. change": "-0.7200",
            "10. change percent": "-0.4160%"
        }
    }"#;

    /// Local HTTP server answering one request; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..read]).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    fn provider(base_url: &str) -> AlphaVantageProvider {
        let config = Config::new()
            .with_api_key("TESTKEY123")
            .with_base_url(base_url);
        AlphaVantageProvider::new(&config).unwrap()
    }

    #[test]
    fn full_envelope_maps_every_field() {
        let lookup = parse_global_quote(AAPL_BODY).unwrap();
        let quote = match lookup {
            QuoteLookup::Found(q) => q,
            QuoteLookup::NotFound => panic!("expected a quote"),
        };

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, 172.35);
        assert_eq!(quote.open, 173.05);
        assert_eq!(quote.high, 174.3);
        assert_eq!(quote.low, 171.96);
        assert_eq!(quote.previous_close, 173.07);
        assert_eq!(quote.change_percent, "-0.4160%");
        assert_eq!(quote.volume, Some(48_425_699));
    }

    #[test]
    fn empty_or_missing_envelope_is_not_found() {
        for body in [
            r#"{"Global Quote": {}}"#,
            r#"{"Global Quote": null}"#,
            r#"{}"#,
            r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
            r#"[]"#,
        ] {
            assert_eq!(parse_global_quote(body).unwrap(), QuoteLookup::NotFound, "body: {}", body);
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_global_quote("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, QuoteError::JsonError(_)));
    }

    #[test]
    fn partial_envelope_keeps_nan_and_skips_volume() {
        let body = r#"{"Global Quote": {"01. symbol": "XYZ", "05. price": "abc", "10. change percent": "1.2%"}}"#;
        let quote = match parse_global_quote(body).unwrap() {
            QuoteLookup::Found(q) => q,
            QuoteLookup::NotFound => panic!("expected a quote"),
        };

        assert_eq!(quote.symbol, "XYZ");
        assert!(quote.price.is_nan());
        assert!(quote.open.is_nan());
        assert_eq!(quote.change_percent, "1.2%");
        assert_eq!(quote.volume, None);
    }

    #[test]
    fn request_carries_symbol_and_key() {
        let provider = provider("https://www.alphavantage.co");
        let symbol = Symbol::parse("AAPL").unwrap();
        let request = provider.build_request(&symbol).unwrap();

        assert_eq!(request.method(), &reqwest::Method::GET);
        assert_eq!(request.url().host_str(), Some("www.alphavantage.co"));
        assert_eq!(request.url().path(), "/query");

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("function".to_string(), "GLOBAL_QUOTE".to_string()),
                ("symbol".to_string(), "AAPL".to_string()),
                ("apikey".to_string(), "TESTKEY123".to_string()),
            ]
        );
    }

    #[test]
    fn symbol_case_is_sent_as_typed() {
        let provider = provider("https://www.alphavantage.co");
        let request = provider.build_request(&Symbol::parse("petr4.sa").unwrap()).unwrap();
        assert!(request.url().query_pairs().any(|(k, v)| k == "symbol" && v == "petr4.sa"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error_without_the_key() {
        // Nothing listens on port 1.
        let provider = provider("http://127.0.0.1:1");
        let err = provider
            .fetch_quote(&Symbol::parse("AAPL").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, QuoteError::RequestError(_)));
        assert!(!err.to_string().contains("TESTKEY123"));
    }

    #[test]
    fn bare_json_numbers_are_accepted() {
        let body = r#"{"Global Quote": {"01. symbol": "IBM", "05. price": 185.5, "02. open": "184.00", "06. volume": 3120045, "10. change percent": "0.80%"}}"#;
        let quote = match parse_global_quote(body).unwrap() {
            QuoteLookup::Found(q) => q,
            QuoteLookup::NotFound => panic!("expected a quote"),
        };

        assert_eq!(quote.price, 185.5);
        assert_eq!(quote.open, 184.0);
        assert_eq!(quote.volume, Some(3_120_045));
        assert!(quote.high.is_nan());
    }

    #[tokio::test]
    async fn live_request_decodes_full_body() {
        let (base_url, server) = serve_once("200 OK", AAPL_BODY).await;
        let lookup = provider(&base_url)
            .fetch_quote(&Symbol::parse("AAPL").unwrap())
            .await
            .unwrap();

        match lookup {
            QuoteLookup::Found(quote) => {
                assert_eq!(quote.symbol, "AAPL");
                assert_eq!(quote.price, 172.35);
            }
            QuoteLookup::NotFound => panic!("expected a quote"),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /query?function=GLOBAL_QUOTE&symbol=AAPL&apikey=TESTKEY123 "));
    }

    #[tokio::test]
    async fn live_empty_envelope_is_not_found() {
        let (base_url, server) = serve_once("200 OK", r#"{"Global Quote":{}}"#).await;
        let lookup = provider(&base_url)
            .fetch_quote(&Symbol::parse("NOPE").unwrap())
            .await
            .unwrap();

        assert_eq!(lookup, QuoteLookup::NotFound);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn service_unavailable_is_a_status_error() {
        let (base_url, server) = serve_once("503 Service Unavailable", "{}").await;
        let err = provider(&base_url)
            .fetch_quote(&Symbol::parse("AAPL").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, QuoteError::StatusError(s) if s == reqwest::StatusCode::SERVICE_UNAVAILABLE));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn service_unavailable_surfaces_as_connection_failure() {
        let (base_url, server) = serve_once("503 Service Unavailable", "{}").await;
        let mut controller = QuoteController::new(Arc::new(provider(&base_url)));

        assert_eq!(controller.submit("AAPL").await, Some(Alert::ConnectionFailed));
        assert!(controller.quote().is_none());
        server.await.unwrap();
    }
}
