//! CoinGecko 클라이언트 HTTP 테스트 (mockito).

use market_core::{ChartDays, Currency, PricePoint, UpstreamConfig};
use market_data::provider::{ChartSeriesSource, CoinGeckoClient, SpotPriceSource};
use market_data::DataError;
use mockito::Matcher;

fn client_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> CoinGeckoClient {
    let config = UpstreamConfig {
        base_url: server.url(),
        api_key: api_key.map(str::to_string),
        ..Default::default()
    };
    CoinGeckoClient::new(&config).unwrap()
}

fn usd() -> Currency {
    Currency::new("usd").unwrap()
}

#[tokio::test]
async fn test_market_chart_parses_prices() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
            Matcher::UrlEncoded("days".into(), "7".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"prices":[[1700000000000,100.0],[1700003600000,101.0]],"market_caps":[],"total_volumes":[]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server, None);
    let series = client.fetch_chart(&usd(), ChartDays::Days(7)).await.unwrap();

    assert_eq!(
        series,
        vec![
            PricePoint::new(1_700_000_000_000, 100.0),
            PricePoint::new(1_700_003_600_000, 101.0),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_market_chart_max_and_api_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::UrlEncoded("days".into(), "max".into()))
        .match_header("x-cg-demo-api-key", "demo-key")
        .with_status(200)
        .with_body(r#"{"prices":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server, Some("demo-key"));
    let series = client.fetch_chart(&usd(), ChartDays::Max).await.unwrap();

    assert!(series.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_market_chart_rate_limited_is_network_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"status":{"error_code":429}}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let err = client
        .fetch_chart(&usd(), ChartDays::Days(1))
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_market_chart_missing_prices_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/coins/bitcoin/market_chart")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error":"coin not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let err = client
        .fetch_chart(&usd(), ChartDays::Days(30))
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_simple_price_with_market_cap() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/simple/price")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "bitcoin".into()),
            Matcher::UrlEncoded("vs_currencies".into(), "usd,eur,jpy".into()),
            Matcher::UrlEncoded("include_market_cap".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"bitcoin":{"usd":50000.0,"usd_market_cap":1.0e12,"eur":46000.5,"eur_market_cap":null}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server, None);
    let currencies: Vec<Currency> = ["usd", "eur", "jpy"]
        .iter()
        .map(|c| Currency::new(c).unwrap())
        .collect();
    let quotes = client.simple_price(&currencies).await.unwrap();

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[&currencies[0]].price, 50000.0);
    assert_eq!(quotes[&currencies[0]].market_cap, Some(1.0e12));
    assert_eq!(quotes[&currencies[1]].market_cap, None);
    assert!(!quotes.contains_key(&currencies[2]));
}

#[tokio::test]
async fn test_spot_price_missing_currency_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/simple/price")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"bitcoin":{}}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let err = client
        .spot_price(&Currency::new("eur").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_spot_price() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/simple/price")
        .match_query(Matcher::UrlEncoded("vs_currencies".into(), "eur".into()))
        .with_status(200)
        .with_body(r#"{"bitcoin":{"eur":1234.5,"eur_market_cap":2.0e10}}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let price = client
        .spot_price(&Currency::new("EUR").unwrap())
        .await
        .unwrap();

    assert_eq!(price, 1234.5);
}
