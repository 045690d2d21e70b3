use crate::models::Network;

use super::{BalanceFetcher, BalanceReport};

/// Placeholder for networks without an indexer integration yet.
///
/// Always reports no assets. Registered for Solana and Cardano wallets, and
/// used for EVM wallets when no Moralis key is configured.
#[derive(Debug, Clone)]
pub struct EmptyBalanceFetcher {
    network: Network,
    name: String,
}

impl EmptyBalanceFetcher {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            name: format!("empty-{}", network.as_str().to_lowercase()),
        }
    }
}

#[async_trait::async_trait]
impl BalanceFetcher for EmptyBalanceFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(&self, address: &str) -> BalanceReport {
        tracing::debug!(
            network = %self.network,
            address,
            "no balance integration for network; reporting no assets"
        );
        BalanceReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_nothing() {
        let fetcher = EmptyBalanceFetcher::new(Network::Cardano);
        let report = fetcher.fetch_balances("addr1xyz").await;
        assert!(report.assets.is_empty());
        assert!(!report.is_degraded());
        assert_eq!(fetcher.name(), "empty-cardano");
    }
}
