//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `TdaClient` with a
//! real `UreqTransport`. The mock echoes unknown routes back as JSON, so each
//! test can check what actually went over the wire.

use chrono::NaiveDate;
use serde_json::{json, Value};
use tda_core::{
    ApiError, ClientConfig, FixedClock, Market, OrderQuery, OrderStatus, Projection, TdaClient,
    UreqTransport,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> TdaClient<UreqTransport> {
    let now = NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    let config = ClientConfig::new("KEY@AMER.OAUTHAP")
        .with_account_id("42")
        .with_base_url(base_url);
    TdaClient::new(config, UreqTransport::new()).with_clock(FixedClock(now.into()))
}

fn echo(body: &str) -> Value {
    serde_json::from_str(body).expect("mock server echoes JSON")
}

#[test]
fn market_data_requests_reach_the_server() {
    let base_url = start_server();
    let client = client(&base_url);

    let response = client.get_quotes(["AAPL", "MSFT"]).unwrap();
    assert_eq!(response.status, 200);
    let echoed = echo(&response.body);
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/v1/marketdata/quotes");
    assert_eq!(echoed["query"], json!({"apikey": "KEY@AMER.OAUTHAP", "symbol": "AAPL,MSFT"}));

    let response = client.get_instrument("00123").unwrap();
    let echoed = echo(&response.body);
    assert_eq!(echoed["path"], "/v1/instruments/00123");
    assert_eq!(echoed["query"], json!({"apikey": "KEY@AMER.OAUTHAP"}));

    let response = client.search_instruments("AAPL", Projection::SymbolRegex).unwrap();
    assert_eq!(echo(&response.body)["query"]["projection"], "symbol-regex");

    let date = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
    let response = client
        .get_hours_for_multiple_markets(&[Market::Equity, Market::Option], date)
        .unwrap();
    let echoed = echo(&response.body);
    assert_eq!(echoed["query"]["markets"], "EQUITY,OPTION");
    assert_eq!(echoed["query"]["date"], "2020-04-01T00:00:00+0000");
}

#[test]
fn order_query_reaches_the_server_with_defaults() {
    let base_url = start_server();
    let client = client(&base_url);

    let query = OrderQuery::new().statuses([OrderStatus::Working, OrderStatus::Queued]);
    let response = client.get_orders_by_path(&query).unwrap();
    let echoed = echo(&response.body);
    assert_eq!(echoed["path"], "/v1/accounts/42/orders");
    assert_eq!(
        echoed["query"],
        json!({
            "fromEnteredTime": "0001-01-01T00:00:00+0000",
            "toEnteredTime": "2020-01-02T03:04:05+0000",
            "status": "WORKING,QUEUED",
        })
    );
}

#[test]
fn order_bodies_are_sent_as_json() {
    let base_url = start_server();
    let client = client(&base_url);

    let order = json!({
        "orderType": "MARKET",
        "session": "NORMAL",
        "duration": "DAY",
        "orderStrategyType": "SINGLE",
        "orderLegCollection": [{
            "instruction": "Buy",
            "quantity": 15,
            "instrument": {"symbol": "XYZ", "assetType": "EQUITY"}
        }]
    });
    let response = client.place_order(&order).unwrap();
    let echoed = echo(&response.body);
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/v1/accounts/42/orders");
    assert_eq!(echoed["body"], order);

    let response = client.cancel_order(1001).unwrap();
    let echoed = echo(&response.body);
    assert_eq!(echoed["method"], "DELETE");
    assert_eq!(echoed["path"], "/v1/accounts/42/orders/1001");
}

#[test]
fn saved_order_lifecycle() {
    let base_url = start_server();
    let client = client(&base_url);

    let response = client.get_saved_orders_by_path().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(echo(&response.body), json!([]));

    let response = client
        .create_saved_order(&json!({"orderType": "LIMIT", "price": "20.00"}))
        .unwrap();
    assert_eq!(response.status, 201);
    let location = response
        .headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("location"))
        .map(|(_, value)| value.clone());
    assert_eq!(location.as_deref(), Some("/v1/accounts/42/savedorders/1"));

    let response = client
        .replace_saved_order(1, &json!({"orderType": "LIMIT", "price": "21.00"}))
        .unwrap();
    assert_eq!(response.status, 200);

    let response = client.get_saved_order(1).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(echo(&response.body)["price"], "21.00");

    let response = client.delete_saved_order(1).unwrap();
    assert_eq!(response.status, 204);

    // 4xx statuses come back as responses, not errors.
    let response = client.get_saved_order(1).unwrap();
    assert_eq!(response.status, 404);
}

#[test]
fn client_without_account_still_serves_market_data() {
    let base_url = start_server();
    let transport = UreqTransport::new();
    let client = TdaClient::new(ClientConfig::new("").with_base_url(&base_url), &transport);

    let response = client.get_quote("AAPL").unwrap();
    assert_eq!(response.status, 200);

    let err = client.get_account(&[]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidState(_)));
}
