//! Endpoint-failover behavior against scripted transports.

use graphene_providers::{
    CancellationToken, ChainProfile, Client, MockProvider, ProviderError,
};
use serde_json::json;
use std::collections::HashMap;
use url::Url;

const GOLOS_CHAIN_ID: &str = "782a3039b478c839e4cb0c941ff4eaeb7df40bdd68bd441afd444b9da763de12";
const OTHER_CHAIN_ID: &str = "0000000000000000000000000000000000000000000000000000000000000001";

fn url(host: &str) -> Url {
    format!("http://{host}.example").parse().unwrap()
}

/// Scripts a successful probe on `mock`. Responses pop LIFO, so the
/// hardfork version goes in first and the config second.
fn prime_probe(mock: &MockProvider, chain_id: &str, version: &str) {
    mock.push::<String, _>(String::from(version)).unwrap();
    mock.push(json!({
        "STEEMIT_CHAIN_ID": chain_id,
        "STEEMIT_MIN_PAYOUT_SBD": "0.020 GBG",
    }))
    .unwrap();
}

/// A client whose endpoints resolve to scripted transports; URLs
/// absent from `mocks` fail at session-open time.
fn scripted_client(
    urls: Vec<Url>,
    mocks: HashMap<Url, MockProvider>,
) -> Client<MockProvider> {
    Client::with_factory(urls, move |u| {
        mocks.get(u).cloned().ok_or(ProviderError::NotConnected)
    })
}

#[tokio::test]
async fn commits_first_endpoint_that_passes_validation() {
    // node-a is unreachable, node-b answers garbage, node-c is healthy
    let broken = MockProvider::new();
    broken.push(json!({"IS_TEST_NET": false})).unwrap();
    let healthy = MockProvider::new();
    prime_probe(&healthy, GOLOS_CHAIN_ID, "0.19.3");

    let client = scripted_client(
        vec![url("node-a"), url("node-b"), url("node-c")],
        HashMap::from([(url("node-b"), broken), (url("node-c"), healthy)]),
    );

    let committed = client.try_connect().await.unwrap();
    assert_eq!(committed, Some(url("node-c")));
    assert_eq!(client.connected_url().await, Some(url("node-c")));
    assert_eq!(
        client.chain_profile().await,
        Some(ChainProfile {
            chain_id: hex::decode(GOLOS_CHAIN_ID).unwrap(),
            sbd_symbol: "GBG".into(),
            version: 19,
        })
    );
}

#[tokio::test]
async fn all_candidates_rejected_yields_none() {
    let client = scripted_client(
        vec![url("node-a"), url("node-b")],
        HashMap::new(),
    );

    assert_eq!(client.try_connect().await.unwrap(), None);
    assert_eq!(client.connected_url().await, None);
    // lazy accessors re-probe the same dead list and come back empty
    assert_eq!(client.chain_id().await, None);
    assert_eq!(client.version().await, None);
}

#[tokio::test]
async fn empty_endpoint_list_is_an_error() {
    let client = scripted_client(Vec::new(), HashMap::new());
    assert!(matches!(
        client.try_connect().await,
        Err(ProviderError::EmptyEndpointList)
    ));
}

#[tokio::test]
async fn cancellation_aborts_the_probe_loop() {
    let healthy = MockProvider::new();
    prime_probe(&healthy, GOLOS_CHAIN_ID, "0.19.3");
    let client = scripted_client(
        vec![url("node-a")],
        HashMap::from([(url("node-a"), healthy)]),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(matches!(
        client.try_connect_with_cancellation(&cancel).await,
        Err(ProviderError::Cancelled)
    ));
    assert_eq!(client.connected_url().await, None);

    // a fresh attempt is unaffected by the earlier cancellation
    assert_eq!(client.try_connect().await.unwrap(), Some(url("node-a")));
}

#[tokio::test]
async fn accessors_connect_lazily() {
    let healthy = MockProvider::new();
    prime_probe(&healthy, GOLOS_CHAIN_ID, "0.19.3");
    let client = scripted_client(
        vec![url("node-a")],
        HashMap::from([(url("node-a"), healthy)]),
    );

    // no try_connect call; the accessor triggers the probe itself
    assert_eq!(client.sbd_symbol().await.as_deref(), Some("GBG"));
    assert_eq!(client.connected_url().await, Some(url("node-a")));
    // and the committed session is reused, not re-probed
    assert_eq!(client.version().await, Some(19));
}

#[tokio::test]
async fn reconnecting_replaces_the_profile_wholesale() {
    let first = MockProvider::new();
    prime_probe(&first, GOLOS_CHAIN_ID, "0.19.3");
    let second = MockProvider::new();
    prime_probe(&second, OTHER_CHAIN_ID, "0.22.0");

    let client = scripted_client(
        vec![url("node-a")],
        HashMap::from([(url("node-a"), first), (url("node-b"), second)]),
    );
    client.try_connect().await.unwrap();
    assert_eq!(client.version().await, Some(19));

    let committed = client.try_connect_to(vec![url("node-b")]).await.unwrap();
    assert_eq!(committed, Some(url("node-b")));
    assert_eq!(
        client.chain_profile().await,
        Some(ChainProfile {
            chain_id: hex::decode(OTHER_CHAIN_ID).unwrap(),
            sbd_symbol: "GBG".into(),
            version: 22,
        })
    );
}

#[tokio::test]
async fn rejects_a_zero_hardfork_version() {
    let suspect = MockProvider::new();
    prime_probe(&suspect, GOLOS_CHAIN_ID, "0.0.1");
    let client = scripted_client(
        vec![url("node-a")],
        HashMap::from([(url("node-a"), suspect)]),
    );

    assert_eq!(client.try_connect().await.unwrap(), None);
    assert_eq!(client.connected_url().await, None);
}

#[tokio::test]
async fn disconnect_is_idempotent_and_forgets_the_session() {
    let healthy = MockProvider::new();
    prime_probe(&healthy, GOLOS_CHAIN_ID, "0.19.3");
    let client = scripted_client(
        vec![url("node-a")],
        HashMap::from([(url("node-a"), healthy)]),
    );

    client.try_connect().await.unwrap();
    client.disconnect().await;
    client.disconnect().await;
    assert_eq!(client.connected_url().await, None);
}
