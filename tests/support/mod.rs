#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use walletfolio::balances::{BalanceFetcher, BalanceReport};
use walletfolio::models::Asset;
use walletfolio::pricing::{PriceEnricher, PriceRouter};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const WALLET: &str = "0x1111111111111111111111111111111111111111";
pub const USDT: &str = "0x55d398326f99059ff775485246999027b3197955";
pub const CAKE: &str = "0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82";

/// Enterprise mainnet address bytes and their bech32 form.
pub const YOROI_HEX: &str = "619493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
pub const YOROI_BECH32: &str = "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8";

pub fn native_body(wei: &str) -> String {
    format!(r#"{{"balance":"{wei}"}}"#)
}

/// ERC-20 list: 500 USDT, 12.5 CAKE, plus two spam entries.
pub fn erc20_body() -> String {
    format!(
        r#"[
            {{"token_address":"{USDT}","name":"Tether USD","symbol":"USDT","decimals":18,
              "balance":"500000000000000000000","possible_spam":false}},
            {{"token_address":"{CAKE}","name":"PancakeSwap Token","symbol":"CAKE","decimals":"18",
              "balance":"12500000000000000000","possible_spam":false}},
            {{"token_address":"0x2222222222222222222222222222222222222222","name":"","symbol":"",
              "decimals":18,"balance":"1000"}},
            {{"token_address":"0x3333333333333333333333333333333333333333","name":"Claim Rewards",
              "symbol":"CLAIM","decimals":18,"balance":"1000","possible_spam":true}}
        ]"#
    )
}

pub fn json(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "application/json")
}

/// Mount Moralis balance endpoints for `address` on `chain`.
pub async fn mount_moralis_wallet(
    server: &MockServer,
    address: &str,
    chain: &str,
    native: ResponseTemplate,
    tokens: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(format!("/{address}/balance")))
        .and(query_param("chain", chain))
        .and(header("X-API-Key", API_KEY))
        .respond_with(native)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{address}/erc20")))
        .and(query_param("chain", chain))
        .and(header("X-API-Key", API_KEY))
        .respond_with(tokens)
        .mount(server)
        .await;
}

/// Enricher with no price sources: every asset ends up unpriced.
pub fn unpriced_enricher() -> PriceEnricher {
    PriceEnricher::new(Arc::new(PriceRouter::new(Vec::new())))
}

/// Fetcher returning fixed assets and counting calls.
pub struct FixedFetcher {
    assets: Vec<Asset>,
    pub calls: AtomicUsize,
}

impl FixedFetcher {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceFetcher for FixedFetcher {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_balances(&self, _address: &str) -> BalanceReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        BalanceReport::new(self.assets.clone())
    }
}
