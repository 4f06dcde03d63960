use crate::{
    connection::{request_cancellable, Connection},
    ChainProfile, JsonRpcClient, JsonRpcTransport, ProviderError,
};
use chrono::Utc;
use graphene_core::types::{DynamicGlobalProperties, Operation, SignedTransaction, Transaction};
use graphene_signers::Signer;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// A client for a Graphene-chain node, generic over the JSON-RPC
/// transport.
///
/// The client owns an ordered endpoint list and at most one active
/// session. Every operation resolves the session through an
/// ensure-connected guard: if none is active the last-known endpoint
/// list is probed first, so callers never need to connect explicitly.
/// Reconnection is serialized; concurrent callers wait for the probe
/// in flight instead of racing it.
///
/// # Example
///
/// ```no_run
/// use graphene_providers::{Client, Http};
/// use graphene_signers::Wallet;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::<Http>::new(vec!["https://api.golos.id".parse()?]);
/// let wallet: Wallet = "5JRaypasxMx1L97ZUX7YuC5Psb5EAbF821kkAGtBj7xCJFQcbLg".parse()?;
///
/// let vote = graphene_core::types::VoteOperation {
///     voter: "alice".into(),
///     author: "bob".into(),
///     permlink: "first-post".into(),
///     weight: 10000,
/// };
/// let response = client.broadcast_operations(&[wallet], vec![Box::new(vote)]).await?;
/// # Ok(())
/// # }
/// ```
pub struct Client<T> {
    connection: Connection<T>,
}

impl<T: JsonRpcTransport> Client<T> {
    /// Instantiates a client that opens one `T` session per candidate
    /// endpoint. No connection is attempted until the first operation
    /// needs one.
    pub fn new(urls: Vec<Url>) -> Self {
        Self::with_factory(urls, |url| T::open(url).map_err(Into::into))
    }
}

impl<T: JsonRpcClient> Client<T> {
    /// Instantiates a client with a custom session factory; used to
    /// plug in transports that need extra construction context (and
    /// scripted transports in tests).
    pub fn with_factory<F>(urls: Vec<Url>, factory: F) -> Self
    where
        F: Fn(&Url) -> Result<T, ProviderError> + Send + Sync + 'static,
    {
        Self {
            connection: Connection::new(urls, Box::new(factory)),
        }
    }

    /// Probes the configured endpoints in order and commits the first
    /// one that passes chain validation; `Ok(None)` if all fail.
    pub async fn try_connect(&self) -> Result<Option<Url>, ProviderError> {
        self.try_connect_with_cancellation(&CancellationToken::new()).await
    }

    pub async fn try_connect_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Url>, ProviderError> {
        self.connection.connect(None, cancel).await
    }

    /// Replaces the endpoint list and reconnects.
    pub async fn try_connect_to(&self, urls: Vec<Url>) -> Result<Option<Url>, ProviderError> {
        self.try_connect_to_with_cancellation(urls, &CancellationToken::new()).await
    }

    pub async fn try_connect_to_with_cancellation(
        &self,
        urls: Vec<Url>,
        cancel: &CancellationToken,
    ) -> Result<Option<Url>, ProviderError> {
        self.connection.connect(Some(urls), cancel).await
    }

    /// Closes the active session without reconnecting. Idempotent.
    pub async fn disconnect(&self) {
        self.connection.disconnect().await
    }

    /// The URL of the active session, if one is committed.
    pub async fn connected_url(&self) -> Option<Url> {
        self.connection.url().await
    }

    /// The 32-byte chain id of the connected chain, reconnecting
    /// lazily; `None` when no endpoint can be reached.
    pub async fn chain_id(&self) -> Option<Vec<u8>> {
        self.chain_profile().await.map(|profile| profile.chain_id)
    }

    /// The stable-asset symbol of the connected chain, reconnecting
    /// lazily.
    pub async fn sbd_symbol(&self) -> Option<String> {
        self.chain_profile().await.map(|profile| profile.sbd_symbol)
    }

    /// The active protocol (hardfork) version, reconnecting lazily.
    pub async fn version(&self) -> Option<u32> {
        self.chain_profile().await.map(|profile| profile.version)
    }

    /// The full [`ChainProfile`], reconnecting lazily.
    pub async fn chain_profile(&self) -> Option<ChainProfile> {
        self.connection.chain_profile(&CancellationToken::new()).await
    }

    /// Fetches the current head-block metadata. Never cached; the
    /// expiration window is too short for stale values to be useful.
    pub async fn dynamic_global_properties(
        &self,
    ) -> Result<DynamicGlobalProperties, ProviderError> {
        self.dynamic_global_properties_with_cancellation(&CancellationToken::new()).await
    }

    pub async fn dynamic_global_properties_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DynamicGlobalProperties, ProviderError> {
        let (transport, _) = self.connection.ensure_connected(cancel).await?;
        request_cancellable(&*transport, "get_dynamic_global_properties", crate::NO_PARAMS, cancel)
            .await
    }

    /// Builds a transaction bound to `head` and signs it with each key
    /// in order. An empty key list yields a transaction with zero
    /// signatures (structural-only construction).
    pub async fn create_transaction<S: Signer>(
        &self,
        head: &DynamicGlobalProperties,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
    ) -> Result<SignedTransaction, ProviderError> {
        self.create_transaction_with_cancellation(head, keys, operations, &CancellationToken::new())
            .await
    }

    pub async fn create_transaction_with_cancellation<S: Signer>(
        &self,
        head: &DynamicGlobalProperties,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
        cancel: &CancellationToken,
    ) -> Result<SignedTransaction, ProviderError> {
        let (_, profile) = self.connection.ensure_connected(cancel).await?;
        sign_transaction(&profile, head, keys, operations, cancel).await
    }

    /// Creates and broadcasts a transaction carrying `operations`,
    /// signed with each of `keys`.
    ///
    /// The head-block fetch happens first; if it fails, its error is
    /// returned untouched and nothing is built or signed.
    pub async fn broadcast_operations<S: Signer>(
        &self,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
    ) -> Result<Value, ProviderError> {
        self.broadcast_operations_with_cancellation(keys, operations, &CancellationToken::new())
            .await
    }

    pub async fn broadcast_operations_with_cancellation<S: Signer>(
        &self,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let (transport, profile) = self.connection.ensure_connected(cancel).await?;
        let head: DynamicGlobalProperties =
            request_cancellable(&*transport, "get_dynamic_global_properties", crate::NO_PARAMS, cancel)
                .await?;

        let signed = sign_transaction(&profile, &head, keys, operations, cancel).await?;
        debug!(
            operations = signed.transaction.operations.len(),
            signatures = signed.signatures.len(),
            "broadcasting transaction"
        );
        request_cancellable(&*transport, "broadcast_transaction", [&signed], cancel).await
    }

    /// Checks whether `keys` carry the authority required by
    /// `operations`, without touching chain state.
    ///
    /// The transaction is built against a synthetic head (zeroed block
    /// id, block number 0, wall-clock now): the verification endpoint
    /// checks signature authority only and ignores ref-block
    /// freshness.
    pub async fn verify_authority<S: Signer>(
        &self,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
    ) -> Result<bool, ProviderError> {
        self.verify_authority_with_cancellation(keys, operations, &CancellationToken::new()).await
    }

    pub async fn verify_authority_with_cancellation<S: Signer>(
        &self,
        keys: &[S],
        operations: Vec<Box<dyn Operation>>,
        cancel: &CancellationToken,
    ) -> Result<bool, ProviderError> {
        let (transport, profile) = self.connection.ensure_connected(cancel).await?;
        let head = DynamicGlobalProperties::placeholder(Utc::now().naive_utc());
        let signed = sign_transaction(&profile, &head, keys, operations, cancel).await?;
        request_cancellable(&*transport, "verify_authority", [&signed], cancel).await
    }

    /// Executes an arbitrary JSON-RPC method with positional
    /// parameters against the active session, resolving it lazily.
    pub async fn get<P, R>(&self, method: &str, params: P) -> Result<R, ProviderError>
    where
        P: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        self.get_with_cancellation(method, params, &CancellationToken::new()).await
    }

    pub async fn get_with_cancellation<P, R>(
        &self,
        method: &str,
        params: P,
        cancel: &CancellationToken,
    ) -> Result<R, ProviderError>
    where
        P: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let (transport, _) = self.connection.ensure_connected(cancel).await?;
        request_cancellable(&*transport, method, params, cancel).await
    }

    /// Executes an arbitrary JSON-RPC method whose single positional
    /// parameter is a signed transaction.
    pub async fn post<R>(
        &self,
        method: &str,
        transaction: &SignedTransaction,
    ) -> Result<R, ProviderError>
    where
        R: DeserializeOwned + Send,
    {
        self.post_with_cancellation(method, transaction, &CancellationToken::new()).await
    }

    pub async fn post_with_cancellation<R>(
        &self,
        method: &str,
        transaction: &SignedTransaction,
        cancel: &CancellationToken,
    ) -> Result<R, ProviderError>
    where
        R: DeserializeOwned + Send,
    {
        self.get_with_cancellation(method, [transaction], cancel).await
    }
}

/// Binds a transaction to `head` under `profile` and appends one
/// signature per key, preserving key order. All signatures commit to
/// the same digest; cancellation is checked before each signing step.
async fn sign_transaction<S: Signer>(
    profile: &ChainProfile,
    head: &DynamicGlobalProperties,
    keys: &[S],
    operations: Vec<Box<dyn Operation>>,
    cancel: &CancellationToken,
) -> Result<SignedTransaction, ProviderError> {
    let transaction = Transaction::new(profile.chain_id.clone(), head, operations)?;
    let digest = transaction.digest(profile.version);

    let mut signed = transaction.into_unsigned();
    for key in keys {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        let signature = key
            .sign_digest(&digest)
            .await
            .map_err(|e| ProviderError::SignerError(Box::new(e)))?;
        signed.signatures.push(signature);
    }
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockProvider, MockResponse, RpcError, NO_PARAMS};
    use graphene_core::types::VoteOperation;
    use graphene_signers::Wallet;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;

    const CHAIN_ID: &str = "782a3039b478c839e4cb0c941ff4eaeb7df40bdd68bd441afd444b9da763de12";

    fn config() -> Value {
        json!({
            "STEEMIT_CHAIN_ID": CHAIN_ID,
            "STEEMIT_MIN_PAYOUT_SBD": "0.020 GBG",
        })
    }

    /// Responses are served LIFO, so the probe pair is pushed
    /// version-first (`get_config` is requested first).
    fn prime_probe(mock: &MockProvider) {
        mock.push::<String, _>(String::from("0.19.3")).unwrap();
        mock.push(config()).unwrap();
    }

    fn client_for(mock: MockProvider) -> Client<MockProvider> {
        let url: Url = "http://node-a.example".parse().unwrap();
        let mocks = HashMap::from([(url.clone(), mock)]);
        Client::with_factory(vec![url], move |u| {
            mocks.get(u).cloned().ok_or(ProviderError::NotConnected)
        })
    }

    fn head() -> DynamicGlobalProperties {
        DynamicGlobalProperties {
            head_block_number: 1234567890,
            head_block_id: "00bc614e11223344556677889900aabbccddeeff".into(),
            time: NaiveDate::from_ymd_opt(2018, 7, 14)
                .unwrap()
                .and_hms_opt(21, 24, 51)
                .unwrap(),
        }
    }

    fn wallet(seed: u8) -> Wallet {
        Wallet::from_bytes(&[seed; 32]).unwrap()
    }

    fn vote() -> Box<dyn Operation> {
        Box::new(VoteOperation {
            voter: "alice".into(),
            author: "bob".into(),
            permlink: "first-post".into(),
            weight: 10000,
        })
    }

    fn profile() -> ChainProfile {
        ChainProfile {
            chain_id: hex::decode(CHAIN_ID).unwrap(),
            sbd_symbol: "GBG".into(),
            version: 19,
        }
    }

    #[tokio::test]
    async fn broadcast_builds_signs_and_submits() {
        let mock = MockProvider::new();
        mock.push(json!({})).unwrap(); // broadcast result, served last
        mock.push(head()).unwrap();
        prime_probe(&mock);

        let client = client_for(mock.clone());
        let keys = [wallet(0x11)];
        client.broadcast_operations(&keys, vec![vote()]).await.unwrap();

        mock.assert_request("get_config", NO_PARAMS).unwrap();
        mock.assert_request("get_hardfork_version", NO_PARAMS).unwrap();
        mock.assert_request("get_dynamic_global_properties", NO_PARAMS).unwrap();

        // signing is deterministic, so the submitted transaction can
        // be reproduced exactly
        let expected = sign_transaction(
            &profile(),
            &head(),
            &keys,
            vec![vote()],
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        mock.assert_request("broadcast_transaction", [&expected]).unwrap();
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn head_fetch_error_is_returned_untouched() {
        let mock = MockProvider::new();
        mock.push_response(MockResponse::Error(crate::JsonRpcError {
            code: -32603,
            message: "server is overloaded".into(),
            data: None,
        }));
        prime_probe(&mock);

        let client = client_for(mock.clone());
        let err = client
            .broadcast_operations(&[wallet(0x11)], vec![vote()])
            .await
            .unwrap_err();
        assert_eq!(err.as_error_response().unwrap().code, -32603);

        // the builder never ran: no broadcast request was issued
        mock.assert_request("get_config", NO_PARAMS).unwrap();
        mock.assert_request("get_hardfork_version", NO_PARAMS).unwrap();
        mock.assert_request("get_dynamic_global_properties", NO_PARAMS).unwrap();
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn verify_authority_uses_synthetic_head() {
        let mock = MockProvider::new();
        mock.push(true).unwrap();
        prime_probe(&mock);

        let client = client_for(mock.clone());
        let valid = client.verify_authority(&[wallet(0x11)], vec![vote()]).await.unwrap();
        assert!(valid);

        mock.assert_request("get_config", NO_PARAMS).unwrap();
        mock.assert_request("get_hardfork_version", NO_PARAMS).unwrap();
        let (method, params) = mock.pop_request().unwrap();
        assert_eq!(method, "verify_authority");
        let tx = &params[0];
        assert_eq!(tx["ref_block_num"], 0);
        assert_eq!(tx["ref_block_prefix"], 0);
        assert_eq!(tx["operations"][0][0], "vote");
        assert_eq!(tx["signatures"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_keys_and_one_key_share_unsigned_fields_and_digest() {
        let mock = MockProvider::new();
        prime_probe(&mock);
        let client = client_for(mock);

        let unsigned = client
            .create_transaction(&head(), &[] as &[Wallet], vec![vote()])
            .await
            .unwrap();
        let signed = client
            .create_transaction(&head(), &[wallet(0x11)], vec![vote()])
            .await
            .unwrap();

        assert!(unsigned.signatures.is_empty());
        assert_eq!(signed.signatures.len(), 1);
        assert_eq!(
            unsigned.transaction.digest(19),
            signed.transaction.digest(19)
        );
        assert_eq!(
            serde_json::to_value(&unsigned.transaction).unwrap(),
            serde_json::to_value(&signed.transaction).unwrap()
        );
    }

    #[tokio::test]
    async fn signatures_follow_key_order() {
        let mock = MockProvider::new();
        prime_probe(&mock);
        let client = client_for(mock);

        let (a, b) = (wallet(0x11), wallet(0x22));
        let forward = client
            .create_transaction(&head(), &[a.clone(), b.clone()], vec![vote()])
            .await
            .unwrap();
        let reversed = client
            .create_transaction(&head(), &[b, a], vec![vote()])
            .await
            .unwrap();

        // same signature set, opposite sequence
        assert_eq!(forward.signatures[0], reversed.signatures[1]);
        assert_eq!(forward.signatures[1], reversed.signatures[0]);
        assert_ne!(forward.signatures[0], forward.signatures[1]);
    }

    #[tokio::test]
    async fn cancellation_interrupts_signing() {
        let mock = MockProvider::new();
        prime_probe(&mock);
        let client = client_for(mock);
        client.try_connect().await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client
            .create_transaction_with_cancellation(&head(), &[wallet(0x11)], vec![vote()], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }
}
