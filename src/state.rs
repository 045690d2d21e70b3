//! Dashboard UI state and its transitions.
//!
//! [`AppState::apply`] is the only writer of the wallet and asset lists. It
//! performs no I/O; the dashboard service feeds it actions as connections and
//! aggregations complete.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chart::TimeRange;
use crate::models::{
    Asset, ConnectedWallet, ConnectionState, FiatCurrency, NetworkFilter, WalletKind,
};
use crate::view::available_networks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Tab {
    #[default]
    Balance,
    History,
}

#[derive(Debug, Clone)]
pub enum Action {
    SelectTab(Tab),
    SelectNetwork(NetworkFilter),
    SelectFiat(FiatCurrency),
    SelectRange(TimeRange),
    ConnectStarted(WalletKind),
    ConnectSucceeded(ConnectedWallet),
    ConnectFailed { kind: WalletKind, reason: String },
    Disconnect(WalletKind),
    RefreshStarted,
    AssetsLoaded {
        generation: u64,
        assets: Vec<Asset>,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub tab: Tab,
    pub network: NetworkFilter,
    pub fiat: FiatCurrency,
    pub range: TimeRange,
    pub wallets: Vec<ConnectedWallet>,
    connections: HashMap<WalletKind, ConnectionState>,
    pub assets: Vec<Asset>,
    /// Bumped on every wallet-set change; results tagged older are dropped.
    pub generation: u64,
    pub loading: bool,
    pub last_error: Option<String>,
    pub last_refresh_utc: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new(fiat: FiatCurrency, range: TimeRange) -> Self {
        Self {
            fiat,
            range,
            ..Self::default()
        }
    }

    pub fn connection(&self, kind: WalletKind) -> ConnectionState {
        self.connections.get(&kind).copied().unwrap_or_default()
    }

    pub fn wallet(&self, kind: WalletKind) -> Option<&ConnectedWallet> {
        self.wallets.iter().find(|w| w.kind == kind)
    }

    fn network_available(&self, filter: NetworkFilter) -> bool {
        available_networks(&self.wallets)
            .iter()
            .any(|option| option.filter == filter)
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Apply one transition. Returns `false` when the action was ignored.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SelectTab(tab) => self.tab = tab,
            Action::SelectNetwork(filter) => {
                if !self.network_available(filter) {
                    tracing::debug!(network = %filter, "network not unlocked by any wallet");
                    return false;
                }
                self.network = filter;
            }
            Action::SelectFiat(fiat) => self.fiat = fiat,
            Action::SelectRange(range) => self.range = range,
            Action::ConnectStarted(kind) => {
                if self.connection(kind) == ConnectionState::Connecting {
                    return false;
                }
                self.connections.insert(kind, ConnectionState::Connecting);
                self.last_error = None;
            }
            Action::ConnectSucceeded(wallet) => {
                let kind = wallet.kind;
                match self.wallets.iter_mut().find(|w| w.kind == kind) {
                    Some(existing) => *existing = wallet,
                    None => self.wallets.push(wallet),
                }
                self.connections.insert(kind, ConnectionState::Connected);
                self.bump_generation();
            }
            Action::ConnectFailed { kind, reason } => {
                // A failed reconnect keeps an already connected wallet.
                let state = if self.wallet(kind).is_some() {
                    ConnectionState::Connected
                } else {
                    ConnectionState::Disconnected
                };
                self.connections.insert(kind, state);
                self.last_error = Some(reason);
            }
            Action::Disconnect(kind) => {
                if self.wallet(kind).is_none() {
                    return false;
                }
                self.wallets.retain(|w| w.kind != kind);
                self.connections.insert(kind, ConnectionState::Disconnected);

                let remaining: Vec<_> = self
                    .wallets
                    .iter()
                    .flat_map(|w| w.kind.networks())
                    .copied()
                    .collect();
                self.assets.retain(|asset| remaining.contains(&asset.network));
                if self.wallets.is_empty() {
                    self.assets.clear();
                    self.last_refresh_utc = None;
                }
                if !self.network_available(self.network) {
                    self.network = NetworkFilter::All;
                }
                self.loading = false;
                self.bump_generation();
            }
            Action::RefreshStarted => self.loading = true,
            Action::AssetsLoaded {
                generation,
                assets,
                at,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "discarding stale aggregation result"
                    );
                    return false;
                }
                self.assets = assets;
                self.loading = false;
                self.last_refresh_utc = Some(at);
            }
        }
        true
    }
}
