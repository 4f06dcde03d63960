use crate::{JsonRpcClient, JsonRpcTransport, ProviderError, RpcError};

use super::common::{JsonRpcError, Request, Response};
use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::Debug,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use url::Url;

/// A low-level JSON-RPC Client over HTTP.
///
/// # Example
///
/// ```no_run
/// use graphene_providers::{Http, JsonRpcClient, NO_PARAMS};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Http::from_str("https://api.golos.id")?;
/// let version: String = provider.request("get_hardfork_version", NO_PARAMS).await?;
/// # Ok(())
/// # }
/// ```
pub struct Http {
    id: AtomicU64,
    client: Client,
    url: Url,
}

impl Debug for Http {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Http {{ id: {:?}, url: {} }}", self.id, self.url)
    }
}

#[derive(Error, Debug)]
/// Error thrown when sending an HTTP request
pub enum ClientError {
    /// Thrown if the request failed
    #[error(transparent)]
    ReqwestError(#[from] ReqwestError),

    /// Thrown if the node returned a structured JSON-RPC error
    #[error(transparent)]
    JsonRpcError(#[from] JsonRpcError),

    #[error("Deserialization Error: {err}. Response: {text}")]
    /// Serde JSON Error
    SerdeJson {
        err: serde_json::Error,
        text: String,
    },
}

impl RpcError for ClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            ClientError::JsonRpcError(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ClientError::SerdeJson { err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for ProviderError {
    fn from(src: ClientError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}

#[async_trait]
impl JsonRpcClient for Http {
    type Error = ClientError;

    /// Sends a POST request with the provided method and the params
    /// serialized as JSON over HTTP
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ClientError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let next_id = self.id.fetch_add(1, Ordering::SeqCst);
        let payload = Request::new(next_id, method, params);

        let res = self.client.post(self.url.as_ref()).json(&payload).send().await?;
        let body = res.bytes().await?;

        let response: Response<R> =
            serde_json::from_slice(&body).map_err(|err| ClientError::SerdeJson {
                err,
                text: String::from_utf8_lossy(&body).to_string(),
            })?;

        Ok(response.data.into_result()?)
    }
}

impl JsonRpcTransport for Http {
    fn open(url: &Url) -> Result<Self, Self::Error> {
        Ok(Self::new(url.clone()))
    }
}

impl Http {
    /// Initializes a new HTTP Client
    ///
    /// # Example
    ///
    /// ```
    /// use graphene_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://api.golos.id").unwrap();
    /// let provider = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// The Url to which requests are made
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Allows to customize the provider by providing your own http
    /// client
    pub fn new_with_client(url: impl Into<Url>, client: Client) -> Self {
        Self {
            id: AtomicU64::new(1),
            client,
            url: url.into(),
        }
    }
}

impl FromStr for Http {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(src)?;
        Ok(Http::new(url))
    }
}

impl Clone for Http {
    fn clone(&self) -> Self {
        Self {
            id: AtomicU64::new(1),
            client: self.client.clone(),
            url: self.url.clone(),
        }
    }
}
