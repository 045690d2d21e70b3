//! Per-network balance fetching.
//!
//! A [`BalanceFetcher`] turns one wallet address into balance-only assets
//! (prices zeroed). Fetchers never fail outright: transport and shape problems
//! become diagnostics on the [`BalanceReport`] next to whatever assets could
//! still be read.

mod empty;
mod moralis;

pub use empty::EmptyBalanceFetcher;
pub use moralis::MoralisBalanceFetcher;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::models::{Asset, WalletKind};

/// Assets read for one address, plus anything that went wrong along the way.
#[derive(Debug, Default)]
pub struct BalanceReport {
    pub assets: Vec<Asset>,
    pub diagnostics: Vec<Error>,
}

impl BalanceReport {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(error: Error) -> Self {
        Self {
            assets: Vec::new(),
            diagnostics: vec![error],
        }
    }

    /// Append another report, keeping asset order.
    pub fn extend(&mut self, other: BalanceReport) {
        self.assets.extend(other.assets);
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[async_trait::async_trait]
pub trait BalanceFetcher: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Read native and token balances for `address`.
    async fn fetch_balances(&self, address: &str) -> BalanceReport;
}

/// Wallet kind → fetcher table used by the aggregator.
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<WalletKind, Arc<dyn BalanceFetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the fetcher for a wallet kind.
    pub fn with_fetcher(mut self, kind: WalletKind, fetcher: Arc<dyn BalanceFetcher>) -> Self {
        self.fetchers.insert(kind, fetcher);
        self
    }

    pub fn get(&self, kind: WalletKind) -> Option<Arc<dyn BalanceFetcher>> {
        self.fetchers.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<WalletKind> {
        let mut kinds: Vec<_> = self.fetchers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

const MAX_DECIMALS: u32 = u8::MAX as u32;

/// Scale a raw integer amount by its token decimals: `raw / 10^decimals`.
///
/// Works on the digit string so 18-decimal balances keep full precision up
/// to the final conversion. Returns `None` for anything that is not a plain
/// non-negative integer, or when `decimals` exceeds what an ERC-20 `uint8`
/// can hold.
pub fn scale_raw_amount(raw: &str, decimals: u32) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if decimals > MAX_DECIMALS {
        return None;
    }

    let decimals = decimals as usize;
    if decimals == 0 {
        return raw.parse().ok();
    }

    let padded = if raw.len() <= decimals {
        format!("{}{raw}", "0".repeat(decimals + 1 - raw.len()))
    } else {
        raw.to_string()
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    format!("{int_part}.{frac_part}").parse().ok()
}
