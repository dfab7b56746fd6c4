use crate::errors::Result;
use crate::models::quote::{QuoteLookup, Symbol};
use async_trait::async_trait;

/// Source of quote snapshots
#[async_trait]
pub trait QuoteProvider {
    /// Short name used in logs
    fn provider_name(&self) -> &'static str;

    /// Look up the current quote for `symbol`.
    ///
    /// An empty answer from the provider is `Ok(QuoteLookup::NotFound)`;
    /// only transport, status and decoding failures are errors.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteLookup>;
}
