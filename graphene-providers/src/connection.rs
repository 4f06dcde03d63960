use crate::{JsonRpcClient, ProviderError};
use graphene_core::types::{Asset, ChainConfig, HardforkVersion};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, sync::Arc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// The three facts that make a signed transaction valid on a specific
/// chain, learned from the active endpoint during its probe.
///
/// Either no session is active and no profile exists, or all three
/// fields are set and consistent with the active endpoint. The profile
/// is replaced atomically on reconnection and never partially updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainProfile {
    /// The 32-byte chain identifier.
    pub chain_id: Vec<u8>,
    /// Symbol of the chain's stable asset (e.g. `GBG`, `SBD`).
    pub sbd_symbol: String,
    /// The active protocol (hardfork) version.
    pub version: u32,
}

/// One committed session: a transport bound to the endpoint that
/// passed validation, plus the profile it reported.
struct Active<T> {
    transport: Arc<T>,
    url: Url,
    profile: ChainProfile,
}

struct State<T> {
    urls: Vec<Url>,
    active: Option<Active<T>>,
}

/// Opens a fresh transport session against a candidate endpoint.
pub(crate) type TransportFactory<T> =
    Box<dyn Fn(&Url) -> Result<T, ProviderError> + Send + Sync>;

/// The endpoint-failover connection: probes candidate URLs in order,
/// validates chain identity, and owns the single active session.
///
/// All state lives behind one async mutex, so a reconnect is a
/// critical section: concurrent callers needing the session are
/// serialized through `ensure_connected` rather than racing to
/// replace it.
pub(crate) struct Connection<T> {
    state: Mutex<State<T>>,
    factory: TransportFactory<T>,
}

/// Why a candidate was not committed.
enum ProbeError {
    /// The probe loop must stop and surface cancellation.
    Cancelled,
    /// The candidate failed; advance to the next one.
    Rejected(String),
}

impl<T: JsonRpcClient> Connection<T> {
    pub(crate) fn new(urls: Vec<Url>, factory: TransportFactory<T>) -> Self {
        Self {
            state: Mutex::new(State { urls, active: None }),
            factory,
        }
    }

    /// Probes `urls` (or the last-known list) in order and commits the
    /// first candidate that passes chain validation.
    ///
    /// Returns the committed URL, or `Ok(None)` when every candidate
    /// was rejected. Any previously active session is closed first,
    /// even if the reconnect then fails.
    pub(crate) async fn connect(
        &self,
        urls: Option<Vec<Url>>,
        cancel: &CancellationToken,
    ) -> Result<Option<Url>, ProviderError> {
        let mut state = self.state.lock().await;
        if let Some(urls) = urls {
            state.urls = urls;
        }
        state.active = None;
        self.probe_list(&mut state, cancel).await
    }

    /// Returns the active session, probing the last-known URL list
    /// first if none is active. Callers clone the transport handle out
    /// of the critical section so requests don't hold the lock.
    pub(crate) async fn ensure_connected(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(Arc<T>, ChainProfile), ProviderError> {
        let mut state = self.state.lock().await;
        if state.active.is_none() {
            self.probe_list(&mut state, cancel).await?;
        }
        state
            .active
            .as_ref()
            .map(|active| (active.transport.clone(), active.profile.clone()))
            .ok_or(ProviderError::NotConnected)
    }

    /// The profile of the active session, reconnecting lazily; `None`
    /// when no endpoint can be reached.
    pub(crate) async fn chain_profile(&self, cancel: &CancellationToken) -> Option<ChainProfile> {
        match self.ensure_connected(cancel).await {
            Ok((_, profile)) => Some(profile),
            Err(_) => None,
        }
    }

    /// The URL of the active session, without triggering a reconnect.
    pub(crate) async fn url(&self) -> Option<Url> {
        self.state.lock().await.active.as_ref().map(|active| active.url.clone())
    }

    /// Closes the active session, if any. Idempotent.
    pub(crate) async fn disconnect(&self) {
        self.state.lock().await.active = None;
    }

    async fn probe_list(
        &self,
        state: &mut State<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<Url>, ProviderError> {
        if state.urls.is_empty() {
            return Err(ProviderError::EmptyEndpointList);
        }

        let urls = state.urls.clone();
        for url in urls {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            match self.probe(&url, cancel).await {
                Ok(active) => {
                    debug!(url = %url, version = active.profile.version, "endpoint committed");
                    state.active = Some(active);
                    return Ok(Some(url));
                }
                Err(ProbeError::Cancelled) => return Err(ProviderError::Cancelled),
                Err(ProbeError::Rejected(reason)) => {
                    // failed candidate's session is dropped here
                    warn!(url = %url, %reason, "endpoint rejected");
                }
            }
        }

        Ok(None)
    }

    /// One probe: open a session, fetch and validate the chain config
    /// and hardfork version. Any failure rejects the candidate.
    async fn probe(&self, url: &Url, cancel: &CancellationToken) -> Result<Active<T>, ProbeError> {
        debug!(url = %url, "probing endpoint");
        let transport =
            (self.factory)(url).map_err(|e| ProbeError::Rejected(e.to_string()))?;

        let config: ChainConfig =
            probe_request(&transport, "get_config", cancel).await?;

        let chain_id = config
            .chain_id
            .filter(|hex| !hex.is_empty())
            .ok_or_else(|| ProbeError::Rejected("config has no chain id".into()))
            .and_then(|hex| {
                hex::decode(hex).map_err(|e| ProbeError::Rejected(format!("chain id: {e}")))
            })?;

        let sbd_symbol = config
            .min_payout_sbd
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProbeError::Rejected("config has no min payout".into()))
            .and_then(|s| {
                s.parse::<Asset>()
                    .map(|asset| asset.symbol)
                    .map_err(|e| ProbeError::Rejected(format!("min payout: {e}")))
            })?;

        let reported: String =
            probe_request(&transport, "get_hardfork_version", cancel).await?;
        let version = reported
            .parse::<HardforkVersion>()
            .map_err(|e| ProbeError::Rejected(e.to_string()))?
            .protocol_version();
        // hardfork 0 counts as invalid; chains that version from zero
        // would need this relaxed
        if version == 0 {
            return Err(ProbeError::Rejected(format!(
                "hardfork version {reported} is not positive"
            )));
        }

        Ok(Active {
            transport: Arc::new(transport),
            url: url.clone(),
            profile: ChainProfile { chain_id, sbd_symbol, version },
        })
    }
}

/// A transport request inside a probe; cancellation aborts the probe
/// loop, any other failure only rejects this candidate.
async fn probe_request<T, R>(
    transport: &T,
    method: &str,
    cancel: &CancellationToken,
) -> Result<R, ProbeError>
where
    T: JsonRpcClient,
    R: DeserializeOwned + Send,
{
    match request_cancellable(transport, method, crate::NO_PARAMS, cancel).await {
        Ok(value) => Ok(value),
        Err(ProviderError::Cancelled) => Err(ProbeError::Cancelled),
        Err(e) => Err(ProbeError::Rejected(e.to_string())),
    }
}

/// Runs one transport round-trip, aborting it as soon as `cancel`
/// fires.
pub(crate) async fn request_cancellable<T, P, R>(
    transport: &T,
    method: &str,
    params: P,
    cancel: &CancellationToken,
) -> Result<R, ProviderError>
where
    T: JsonRpcClient,
    P: Debug + Serialize + Send + Sync,
    R: DeserializeOwned + Send,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        res = transport.request(method, params) => res.map_err(Into::into),
    }
}
