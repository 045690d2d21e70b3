//! Price enrichment.
//!
//! [`PriceSource`] implementations answer one [`PriceKey`] at a time. The
//! [`PriceRouter`] chains sources (first quote wins) and the [`PriceEnricher`]
//! fans unique keys out with bounded concurrency, then merges the quotes back
//! into balance records by key.

mod coingecko;
mod moralis;

pub use coingecko::CoinGeckoPriceSource;
pub use moralis::MoralisPriceSource;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::Error;
use crate::models::{Asset, PriceKey};

/// Current USD price and percentage changes for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price_usd: f64,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
}

impl PriceQuote {
    pub fn new(price_usd: f64) -> Self {
        Self {
            price_usd,
            change_24h: None,
            change_7d: None,
        }
    }

    pub fn with_change_24h(mut self, change: f64) -> Self {
        self.change_24h = Some(change);
        self
    }

    pub fn with_change_7d(mut self, change: f64) -> Self {
        self.change_7d = Some(change);
        self
    }
}

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the source has no price for this key.
    async fn quote(&self, key: &PriceKey) -> Result<Option<PriceQuote>, Error>;
}

/// Asks each source in order; the first quote wins.
///
/// A failing source does not stop the chain. The last error is returned only
/// when no source produced a quote.
pub struct PriceRouter {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceRouter {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name())
    }
}

#[async_trait::async_trait]
impl PriceSource for PriceRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn quote(&self, key: &PriceKey) -> Result<Option<PriceQuote>, Error> {
        let mut last_error = None;
        for source in &self.sources {
            match source.quote(key).await {
                Ok(Some(quote)) => return Ok(Some(quote)),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(source = source.name(), error = %e, "price source failed; trying next");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

/// Priced assets plus the lookups that failed.
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub assets: Vec<Asset>,
    pub diagnostics: Vec<Error>,
}

pub struct PriceEnricher {
    source: Arc<dyn PriceSource>,
    concurrency: usize,
}

impl PriceEnricher {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            concurrency: 4,
        }
    }

    /// Maximum number of lookups in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Populate price fields of `assets`, one lookup per distinct price key.
    ///
    /// Assets keep their order and balances. A key whose lookup fails or finds
    /// nothing leaves its assets with zeroed price fields.
    pub async fn enrich(&self, assets: Vec<Asset>) -> EnrichmentReport {
        let keys: Vec<PriceKey> = {
            let mut seen = HashSet::new();
            assets
                .iter()
                .filter(|asset| seen.insert(&asset.price_key))
                .map(|asset| asset.price_key.clone())
                .collect()
        };

        if keys.is_empty() {
            return EnrichmentReport {
                assets,
                diagnostics: Vec::new(),
            };
        }

        let source = &self.source;
        let outcomes: Vec<(PriceKey, Result<Option<PriceQuote>, Error>)> = stream::iter(keys)
            .map(|key| async move {
                let outcome = source.quote(&key).await;
                (key, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut quotes: HashMap<PriceKey, PriceQuote> = HashMap::new();
        let mut diagnostics = Vec::new();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(Some(quote)) => {
                    quotes.insert(key, quote);
                }
                Ok(None) => {
                    tracing::debug!(key = ?key, "no price found");
                }
                Err(e) => {
                    tracing::warn!(key = ?key, error = %e, "price lookup failed");
                    diagnostics.push(e);
                }
            }
        }

        let assets = assets
            .into_iter()
            .map(|mut asset| {
                match quotes.get(&asset.price_key) {
                    Some(quote) => apply_quote(&mut asset, quote),
                    None => asset.clear_prices(),
                }
                asset
            })
            .collect();

        tracing::debug!(
            priced = quotes.len(),
            failed = diagnostics.len(),
            "price enrichment complete"
        );
        EnrichmentReport {
            assets,
            diagnostics,
        }
    }
}

fn apply_quote(asset: &mut Asset, quote: &PriceQuote) {
    asset.price_usd = quote.price_usd;
    asset.change_24h = quote.change_24h.unwrap_or(0.0);
    if let Some(change) = quote.change_7d {
        asset.change_7d = change;
    }
}
