mod support;

use std::time::{Duration, Instant};

use secrecy::SecretString;
use support::{erc20_body, json, mount_moralis_wallet, native_body, API_KEY, CAKE, USDT, WALLET};
use walletfolio::balances::{BalanceFetcher, MoralisBalanceFetcher};
use walletfolio::models::{Network, PriceKey};
use walletfolio::pricing::{MoralisPriceSource, PriceSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> MoralisBalanceFetcher {
    MoralisBalanceFetcher::new(SecretString::from(API_KEY.to_string())).with_base_url(server.uri())
}

#[tokio::test]
async fn reads_native_and_token_balances() {
    let server = MockServer::start().await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x38",
        json(native_body("1500000000000000000")),
        json(erc20_body()),
    )
    .await;

    let report = fetcher(&server).fetch_balances(WALLET).await;
    assert!(!report.is_degraded(), "{:?}", report.diagnostics);

    let tickers: Vec<_> = report.assets.iter().map(|a| a.ticker.as_str()).collect();
    assert_eq!(tickers, ["BNB", "USDT", "CAKE"]);

    let bnb = &report.assets[0];
    assert_eq!(bnb.balance, 1.5);
    assert_eq!(bnb.network, Network::Bsc);
    assert_eq!(bnb.price_key, PriceKey::native("BNB"));
    assert_eq!(bnb.price_usd, 0.0);

    assert_eq!(report.assets[1].balance, 500.0);
    assert_eq!(report.assets[1].price_key, PriceKey::contract(Network::Bsc, USDT));
    assert_eq!(report.assets[2].balance, 12.5);
    assert_eq!(report.assets[2].id, CAKE);

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn zero_native_balance_is_still_listed() {
    let server = MockServer::start().await;
    mount_moralis_wallet(&server, WALLET, "0x38", json(native_body("0")), json("[]")).await;

    let report = fetcher(&server).fetch_balances(WALLET).await;
    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.assets[0].ticker, "BNB");
    assert_eq!(report.assets[0].balance, 0.0);
}

#[tokio::test]
async fn token_failure_keeps_native_balance() {
    let server = MockServer::start().await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x38",
        json(native_body("2000000000000000000")),
        ResponseTemplate::new(500).set_body_string("indexer down"),
    )
    .await;

    let report = fetcher(&server).fetch_balances(WALLET).await;
    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.assets[0].balance, 2.0);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].is_transport());
}

#[tokio::test]
async fn malformed_token_list_is_a_shape_problem() {
    let server = MockServer::start().await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x38",
        json(native_body("1000000000000000000")),
        json(r#"{"result":[]}"#),
    )
    .await;

    let report = fetcher(&server).fetch_balances(WALLET).await;
    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(!report.diagnostics[0].is_transport());
}

#[tokio::test]
async fn unreachable_indexer_yields_empty_report() {
    let fetcher = MoralisBalanceFetcher::new(SecretString::from(API_KEY.to_string()))
        .with_base_url("http://127.0.0.1:9");

    let report = fetcher.fetch_balances(WALLET).await;
    assert!(report.assets.is_empty());
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report.diagnostics.iter().all(|e| e.is_transport()));
}

#[tokio::test]
async fn fetches_every_configured_chain() {
    let server = MockServer::start().await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x1",
        json(native_body("250000000000000000")),
        json("[]"),
    )
    .await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x38",
        json(native_body("1000000000000000000")),
        json("[]"),
    )
    .await;

    let report = fetcher(&server)
        .with_chains(vec![Network::Eth, Network::Bsc])
        .fetch_balances(WALLET)
        .await;
    let found: Vec<_> = report
        .assets
        .iter()
        .map(|a| (a.network, a.ticker.as_str(), a.balance))
        .collect();
    assert_eq!(
        found,
        [(Network::Eth, "ETH", 0.25), (Network::Bsc, "BNB", 1.0)]
    );
}

const DELAY: Duration = Duration::from_millis(300);

#[tokio::test]
async fn native_and_token_requests_overlap() {
    let server = MockServer::start().await;
    mount_moralis_wallet(
        &server,
        WALLET,
        "0x38",
        json(native_body("1000000000000000000")).set_delay(DELAY),
        json(erc20_body()).set_delay(DELAY),
    )
    .await;

    let started = Instant::now();
    let report = fetcher(&server).fetch_balances(WALLET).await;
    let elapsed = started.elapsed();

    assert_eq!(report.assets.len(), 3);
    assert!(elapsed < DELAY * 2 - Duration::from_millis(50), "took {elapsed:?}");
}

#[tokio::test]
async fn chains_are_fetched_concurrently() {
    let server = MockServer::start().await;
    for chain in ["0x1", "0x38"] {
        mount_moralis_wallet(
            &server,
            WALLET,
            chain,
            json(native_body("1000000000000000000")).set_delay(DELAY),
            json("[]").set_delay(DELAY),
        )
        .await;
    }

    let started = Instant::now();
    let report = fetcher(&server)
        .with_chains(vec![Network::Eth, Network::Bsc])
        .fetch_balances(WALLET)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(report.assets.len(), 2);
    assert!(elapsed < DELAY * 2 - Duration::from_millis(50), "took {elapsed:?}");
}

#[tokio::test]
async fn token_price_reads_usd_price_and_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/erc20/{CAKE}/price")))
        .and(query_param("chain", "0x38"))
        .respond_with(json(
            r#"{"tokenName":"PancakeSwap Token","usdPrice":2.4,"24hrPercentChange":"3.5"}"#,
        ))
        .mount(&server)
        .await;

    let source = MoralisPriceSource::new(SecretString::from(API_KEY.to_string()))
        .with_base_url(server.uri());
    let quote = source
        .quote(&PriceKey::contract(Network::Bsc, CAKE))
        .await
        .unwrap()
        .expect("expected quote");
    assert_eq!(quote.price_usd, 2.4);
    assert_eq!(quote.change_24h, Some(3.5));
    assert_eq!(quote.change_7d, None);
}

#[tokio::test]
async fn token_price_not_found_is_no_quote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/erc20/{USDT}/price")))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"No pools found"}"#))
        .mount(&server)
        .await;

    let source = MoralisPriceSource::new(SecretString::from(API_KEY.to_string()))
        .with_base_url(server.uri());
    let quote = source
        .quote(&PriceKey::contract(Network::Bsc, USDT))
        .await
        .unwrap();
    assert!(quote.is_none());
}
