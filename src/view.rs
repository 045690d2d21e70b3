//! Pure view-model derivation over the unified asset list.
//!
//! Nothing here touches the network: switching fiat, network or range only
//! re-derives from the assets already held.

use serde::Serialize;

use crate::chart::{ChartDataPoint, SeriesSource, TimeRange};
use crate::models::{Asset, ConnectedWallet, FiatCurrency, FiatInfo, Network, NetworkFilter};

/// Assets visible under `filter`, in their original order.
pub fn filter_assets<'a>(assets: &'a [Asset], filter: NetworkFilter) -> Vec<&'a Asset> {
    assets
        .iter()
        .filter(|asset| filter.matches(asset.network))
        .collect()
}

/// One asset row with fiat-converted figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    pub asset: Asset,
    pub display_price: f64,
    pub display_value: f64,
}

pub fn present(asset: &Asset, fiat: &FiatInfo) -> AssetView {
    AssetView {
        display_price: asset.price_usd * fiat.rate,
        display_value: asset.balance * asset.price_usd * fiat.rate,
        asset: asset.clone(),
    }
}

/// Sum of `balance * price_usd * rate` over the assets matching `filter`.
pub fn total_value(assets: &[Asset], filter: NetworkFilter, fiat: &FiatInfo) -> f64 {
    filter_assets(assets, filter)
        .into_iter()
        .map(|asset| asset.balance * asset.price_usd * fiat.rate)
        .sum()
}

/// Value-weighted 24h change of the assets matching `filter`.
pub fn portfolio_change_24h(assets: &[Asset], filter: NetworkFilter) -> f64 {
    let visible = filter_assets(assets, filter);
    let total: f64 = visible.iter().map(|a| a.value_usd()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    visible
        .iter()
        .map(|a| a.value_usd() * a.change_24h)
        .sum::<f64>()
        / total
}

/// An entry of the network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkOption {
    pub filter: NetworkFilter,
    pub label: &'static str,
}

impl From<NetworkFilter> for NetworkOption {
    fn from(filter: NetworkFilter) -> Self {
        Self {
            filter,
            label: filter.label(),
        }
    }
}

/// `ALL` followed by every network the connected wallets unlock, in
/// connection order.
pub fn available_networks(wallets: &[ConnectedWallet]) -> Vec<NetworkOption> {
    let mut networks: Vec<Network> = Vec::new();
    for network in wallets.iter().flat_map(|w| w.kind.networks()) {
        if !networks.contains(network) {
            networks.push(*network);
        }
    }

    std::iter::once(NetworkFilter::All)
        .chain(networks.into_iter().map(NetworkFilter::Only))
        .map(NetworkOption::from)
        .collect()
}

/// First connected wallet whose kind unlocks the selected network.
pub fn connected_with(filter: NetworkFilter, wallets: &[ConnectedWallet]) -> Option<&ConnectedWallet> {
    let NetworkFilter::Only(network) = filter else {
        return None;
    };
    wallets
        .iter()
        .find(|wallet| wallet.kind.networks().contains(&network))
}

/// Everything the presentation layer renders for one selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub fiat: FiatInfo,
    pub network: NetworkFilter,
    pub range: TimeRange,
    pub rows: Vec<AssetView>,
    pub total_value: f64,
    pub change_24h: f64,
    pub asset_count: usize,
    pub networks: Vec<NetworkOption>,
    pub connected_with: Option<ConnectedWallet>,
    pub chart: Vec<ChartDataPoint>,
}

impl DashboardView {
    pub fn build(
        assets: &[Asset],
        wallets: &[ConnectedWallet],
        network: NetworkFilter,
        fiat: FiatCurrency,
        range: TimeRange,
        series: &dyn SeriesSource,
    ) -> Self {
        let fiat = fiat.info();
        let rows: Vec<AssetView> = filter_assets(assets, network)
            .into_iter()
            .map(|asset| present(asset, &fiat))
            .collect();

        Self {
            total_value: rows.iter().map(|row| row.display_value).sum(),
            change_24h: portfolio_change_24h(assets, network),
            asset_count: rows.len(),
            rows,
            networks: available_networks(wallets),
            connected_with: connected_with(network, wallets).cloned(),
            chart: series.series(network, range),
            fiat,
            network,
            range,
        }
    }
}
