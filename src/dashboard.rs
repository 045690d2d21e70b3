//! Dashboard service.
//!
//! Connects wallets through injected [`WalletProvider`]s, resolves their
//! addresses, runs the aggregation and feeds every outcome through
//! [`AppState::apply`]. Aggregation results are tagged with the state
//! generation they were started under so a slow result for an outdated
//! wallet set never overwrites a newer one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::address::hex_to_bech32;
use crate::aggregate::PortfolioAggregator;
use crate::chart::{RandomWalkSeries, SeriesSource};
use crate::error::Error;
use crate::models::{ConnectedWallet, WalletKind};
use crate::state::{Action, AppState};
use crate::view::DashboardView;

/// Address as handed over by a wallet extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAddress {
    /// Already in the network's text format (EVM `0x…`, Solana base58).
    Text(String),
    /// CIP-30 style hex-encoded address bytes.
    Hex(String),
}

/// Turn a wallet-provided address into the text form balance queries use.
pub fn resolve_address(kind: WalletKind, raw: RawAddress) -> Result<String, Error> {
    match raw {
        RawAddress::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(Error::connection(kind, "wallet returned an empty address"));
            }
            Ok(text.to_string())
        }
        RawAddress::Hex(payload) => Ok(hex_to_bech32(&payload)?),
    }
}

/// Access to one wallet extension.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    fn kind(&self) -> WalletKind;

    /// Prompt the wallet for an account address.
    async fn request_address(&self) -> Result<RawAddress, Error>;
}

/// The address-listing part of a CIP-30 wallet API.
#[async_trait::async_trait]
pub trait Cip30Api: Send + Sync {
    async fn used_addresses(&self) -> Result<Vec<String>, Error>;
    async fn unused_addresses(&self) -> Result<Vec<String>, Error>;
}

/// Provider for CIP-30 wallets such as Yoroi.
///
/// Prefers the first used address; a fresh wallet with no history only has
/// unused ones.
pub struct Cip30WalletProvider<A> {
    kind: WalletKind,
    api: A,
}

impl<A: Cip30Api> Cip30WalletProvider<A> {
    pub fn new(kind: WalletKind, api: A) -> Self {
        Self { kind, api }
    }
}

#[async_trait::async_trait]
impl<A: Cip30Api> WalletProvider for Cip30WalletProvider<A> {
    fn kind(&self) -> WalletKind {
        self.kind
    }

    async fn request_address(&self) -> Result<RawAddress, Error> {
        let mut addresses = self.api.used_addresses().await?;
        if addresses.is_empty() {
            tracing::debug!(wallet = %self.kind, "no used addresses; falling back to unused");
            addresses = self.api.unused_addresses().await?;
        }
        addresses
            .into_iter()
            .find(|a| !a.trim().is_empty())
            .map(RawAddress::Hex)
            .ok_or_else(|| Error::connection(self.kind, "wallet exposed no addresses"))
    }
}

/// Provider with a fixed address, for headless use.
#[derive(Debug, Clone)]
pub struct StaticWalletProvider {
    kind: WalletKind,
    address: RawAddress,
}

impl StaticWalletProvider {
    pub fn new(kind: WalletKind, address: RawAddress) -> Self {
        Self { kind, address }
    }
}

#[async_trait::async_trait]
impl WalletProvider for StaticWalletProvider {
    fn kind(&self) -> WalletKind {
        self.kind
    }

    async fn request_address(&self) -> Result<RawAddress, Error> {
        Ok(self.address.clone())
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// `false` when the wallet set changed while the run was in flight.
    pub applied: bool,
    pub diagnostics: Vec<Error>,
}

pub struct Dashboard {
    providers: HashMap<WalletKind, Arc<dyn WalletProvider>>,
    aggregator: Arc<PortfolioAggregator>,
    series: Arc<dyn SeriesSource>,
    state: RwLock<AppState>,
}

impl Dashboard {
    pub fn new(aggregator: Arc<PortfolioAggregator>, state: AppState) -> Self {
        Self {
            providers: HashMap::new(),
            aggregator,
            series: Arc::new(RandomWalkSeries::new()),
            state: RwLock::new(state),
        }
    }

    /// Register (or replace) the provider for its wallet kind.
    pub fn with_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn with_series(mut self, series: Arc<dyn SeriesSource>) -> Self {
        self.series = series;
        self
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Apply a UI action such as a fiat or network selection.
    pub async fn dispatch(&self, action: Action) -> bool {
        self.state.write().await.apply(action)
    }

    /// Connect a wallet and refresh the portfolio.
    ///
    /// Any failure leaves the kind disconnected (or still connected to its
    /// previous address) and is returned to the caller.
    pub async fn connect(&self, kind: WalletKind) -> Result<ConnectedWallet, Error> {
        let Some(provider) = self.providers.get(&kind).cloned() else {
            let error = Error::connection(kind, "wallet extension not installed");
            self.fail_connect(kind, &error).await;
            return Err(error);
        };

        if !self.dispatch(Action::ConnectStarted(kind)).await {
            return Err(Error::connection(kind, "connection already in progress"));
        }

        let resolved = match provider.request_address().await {
            Ok(raw) => resolve_address(kind, raw),
            Err(e) => Err(e),
        };
        let wallet = match resolved {
            Ok(address) => ConnectedWallet::new(kind, address),
            Err(error) => {
                self.fail_connect(kind, &error).await;
                return Err(error);
            }
        };

        tracing::info!(wallet = %kind, address = %wallet.address, "wallet connected");
        self.dispatch(Action::ConnectSucceeded(wallet.clone())).await;
        self.refresh().await;
        Ok(wallet)
    }

    async fn fail_connect(&self, kind: WalletKind, error: &Error) {
        tracing::warn!(wallet = %kind, error = %error, "wallet connection failed");
        self.dispatch(Action::ConnectFailed {
            kind,
            reason: error.to_string(),
        })
        .await;
    }

    /// Disconnect a wallet once the user has confirmed it, then re-aggregate
    /// whatever wallets remain.
    ///
    /// The disconnect bumps the generation, so a refresh still in flight is
    /// discarded and must be replaced here.
    pub async fn disconnect(&self, kind: WalletKind, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let (removed, remaining) = {
            let mut state = self.state.write().await;
            let removed = state.apply(Action::Disconnect(kind));
            (removed, state.wallets.len())
        };
        if !removed {
            return false;
        }
        tracing::info!(wallet = %kind, remaining, "wallet disconnected");
        if remaining > 0 {
            self.refresh().await;
        }
        true
    }

    /// Re-aggregate the connected wallets.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (generation, wallets) = {
            let mut state = self.state.write().await;
            state.apply(Action::RefreshStarted);
            (state.generation, state.wallets.clone())
        };

        let report = self.aggregator.aggregate(&wallets).await;
        let applied = self
            .dispatch(Action::AssetsLoaded {
                generation,
                assets: report.assets,
                at: Utc::now(),
            })
            .await;

        RefreshOutcome {
            applied,
            diagnostics: report.diagnostics,
        }
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        DashboardView::build(
            &state.assets,
            &state.wallets,
            state.network,
            state.fiat,
            state.range,
            self.series.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::DecodeError;

    struct FakeCip30 {
        used: Vec<String>,
        unused: Vec<String>,
    }

    #[async_trait::async_trait]
    impl Cip30Api for FakeCip30 {
        async fn used_addresses(&self) -> Result<Vec<String>, Error> {
            Ok(self.used.clone())
        }

        async fn unused_addresses(&self) -> Result<Vec<String>, Error> {
            Ok(self.unused.clone())
        }
    }

    #[test]
    fn text_addresses_are_trimmed() {
        let resolved =
            resolve_address(WalletKind::MetaMask, RawAddress::Text(" 0xabc \n".to_string()));
        assert_eq!(resolved.unwrap(), "0xabc");
        assert!(matches!(
            resolve_address(WalletKind::Phantom, RawAddress::Text("  ".to_string())),
            Err(Error::Connection { .. })
        ));
    }

    #[test]
    fn bad_hex_is_a_decode_error() {
        let err = resolve_address(WalletKind::Yoroi, RawAddress::Hex("zz".to_string()));
        assert!(matches!(err, Err(Error::Decode(DecodeError::InvalidHex(_)))));
    }

    #[tokio::test]
    async fn cip30_prefers_used_addresses() {
        let provider = Cip30WalletProvider::new(
            WalletKind::Yoroi,
            FakeCip30 {
                used: vec!["01aa".to_string()],
                unused: vec!["01bb".to_string()],
            },
        );
        assert_eq!(
            provider.request_address().await.unwrap(),
            RawAddress::Hex("01aa".to_string())
        );
    }

    #[tokio::test]
    async fn cip30_falls_back_to_unused_addresses() {
        let provider = Cip30WalletProvider::new(
            WalletKind::Yoroi,
            FakeCip30 {
                used: Vec::new(),
                unused: vec!["01bb".to_string()],
            },
        );
        assert_eq!(
            provider.request_address().await.unwrap(),
            RawAddress::Hex("01bb".to_string())
        );
    }

    #[tokio::test]
    async fn cip30_without_addresses_fails() {
        let provider = Cip30WalletProvider::new(
            WalletKind::Yoroi,
            FakeCip30 {
                used: Vec::new(),
                unused: Vec::new(),
            },
        );
        assert!(matches!(
            provider.request_address().await,
            Err(Error::Connection { wallet: WalletKind::Yoroi, .. })
        ));
    }
}
