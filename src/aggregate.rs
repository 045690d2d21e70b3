//! Aggregation orchestrator.
//!
//! Dispatches each connected wallet to the balance fetcher registered for its
//! kind, runs the fetches concurrently, concatenates the results in wallet
//! order and prices the combined list once.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use secrecy::SecretString;

use crate::balances::{BalanceFetcher, EmptyBalanceFetcher, FetcherRegistry, MoralisBalanceFetcher};
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::models::{Asset, ConnectedWallet, Network, WalletKind};
use crate::pricing::{
    CoinGeckoPriceSource, MoralisPriceSource, PriceEnricher, PriceRouter, PriceSource,
};

/// Unified asset list for a set of wallets, plus everything that degraded.
#[derive(Debug, Default)]
pub struct AggregationReport {
    pub assets: Vec<Asset>,
    pub diagnostics: Vec<Error>,
}

impl AggregationReport {
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub struct PortfolioAggregator {
    registry: FetcherRegistry,
    enricher: PriceEnricher,
}

impl PortfolioAggregator {
    pub fn new(registry: FetcherRegistry, enricher: PriceEnricher) -> Self {
        Self { registry, enricher }
    }

    /// Wire up the default fetchers and price sources from configuration.
    ///
    /// Without a Moralis key, MetaMask wallets fall back to an empty fetcher
    /// and tokens are priced by CoinGecko alone.
    pub async fn from_config(config: &Config, credentials: &dyn CredentialStore) -> Result<Self> {
        let client = config.http_client()?;
        let moralis_key = lookup_key(credentials, &config.moralis.api_key_env).await;
        let coingecko_key = lookup_key(credentials, &config.coingecko.api_key_env).await;

        let evm_fetcher: Arc<dyn BalanceFetcher> = match &moralis_key {
            Some(key) => Arc::new(
                MoralisBalanceFetcher::new(key.clone())
                    .with_client(client.clone())
                    .with_base_url(&config.moralis.base_url)
                    .with_chains(config.moralis.chains.clone()),
            ),
            None => {
                tracing::warn!(
                    env = %config.moralis.api_key_env,
                    "Moralis API key not set; MetaMask balances will be empty"
                );
                Arc::new(EmptyBalanceFetcher::new(Network::Bsc))
            }
        };

        let registry = FetcherRegistry::new()
            .with_fetcher(WalletKind::MetaMask, evm_fetcher)
            .with_fetcher(
                WalletKind::Phantom,
                Arc::new(EmptyBalanceFetcher::new(Network::Solana)),
            )
            .with_fetcher(
                WalletKind::Yoroi,
                Arc::new(EmptyBalanceFetcher::new(Network::Cardano)),
            );

        let mut sources: Vec<Arc<dyn PriceSource>> = vec![Arc::new(
            CoinGeckoPriceSource::new()
                .with_client(client.clone())
                .with_base_url(&config.coingecko.base_url)
                .with_api_key(coingecko_key)
                .with_symbol_ids(config.coingecko.symbol_ids.clone()),
        )];
        if let Some(key) = moralis_key {
            sources.push(Arc::new(
                MoralisPriceSource::new(key)
                    .with_client(client)
                    .with_base_url(&config.moralis.base_url),
            ));
        }

        let router = PriceRouter::new(sources);
        tracing::debug!(
            sources = ?router.sources().collect::<Vec<_>>(),
            "price sources configured"
        );
        let enricher =
            PriceEnricher::new(Arc::new(router)).with_concurrency(config.coingecko.concurrency);
        Ok(Self::new(registry, enricher))
    }

    /// Fetch and price every wallet's holdings.
    ///
    /// Never fails: a wallet whose fetch degrades contributes what it could
    /// read, and its problems land in the report's diagnostics.
    pub async fn aggregate(&self, wallets: &[ConnectedWallet]) -> AggregationReport {
        if wallets.is_empty() {
            return AggregationReport::default();
        }

        let fetches = wallets.iter().map(|wallet| async move {
            let Some(fetcher) = self.registry.get(wallet.kind) else {
                tracing::warn!(wallet = %wallet.kind, "no balance fetcher registered; skipping wallet");
                return None;
            };
            tracing::debug!(wallet = %wallet.kind, fetcher = fetcher.name(), "fetching balances");
            Some(fetcher.fetch_balances(&wallet.address).await)
        });
        let reports = join_all(fetches).await;

        let mut assets = Vec::new();
        let mut diagnostics = Vec::new();
        for (wallet, report) in wallets.iter().zip(reports) {
            let Some(report) = report else { continue };
            if report.is_degraded() {
                tracing::warn!(
                    wallet = %wallet.kind,
                    problems = report.diagnostics.len(),
                    "wallet balances degraded"
                );
            }
            assets.extend(report.assets);
            diagnostics.extend(report.diagnostics);
        }

        let priced = self.enricher.enrich(assets).await;
        diagnostics.extend(priced.diagnostics);

        tracing::info!(
            wallets = wallets.len(),
            assets = priced.assets.len(),
            problems = diagnostics.len(),
            "portfolio aggregated"
        );
        AggregationReport {
            assets: priced.assets,
            diagnostics,
        }
    }
}

async fn lookup_key(credentials: &dyn CredentialStore, name: &str) -> Option<SecretString> {
    match credentials.get(name).await {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(key = name, error = %e, "credential lookup failed");
            None
        }
    }
}
