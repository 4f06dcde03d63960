//! # Clients for interacting with Graphene-chain nodes
//!
//! This crate provides asynchronous JSON-RPC clients for Steem-family
//! networks, with failover across a configured list of node endpoints:
//! each candidate is probed, validated against the expected chain
//! (chain id, stable-asset symbol, hardfork version) and committed as
//! the active session only if it passes.
//!
//! # Examples
//!
//! ```no_run
//! use graphene_providers::{Client, Http};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::<Http>::new(vec![
//!     "https://api.golos.id".parse()?,
//!     "https://api.golos.today".parse()?,
//! ]);
//!
//! match client.try_connect().await? {
//!     Some(url) => println!("connected to {url}"),
//!     None => println!("no endpoint passed validation"),
//! }
//! # Ok(())
//! # }
//! ```

mod transports;
pub use transports::*;

mod errors;
pub use errors::{ProviderError, RpcError};

mod connection;
pub use connection::ChainProfile;

mod client;
pub use client::Client;

pub use tokio_util::sync::CancellationToken;

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use url::Url;

/// An empty positional-parameter list.
pub const NO_PARAMS: [(); 0] = [];

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with
/// the Graphene JSON-RPC client.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: RpcError + Into<ProviderError> + Send + Sync + 'static;

    /// Sends a request with the provided JSON-RPC method and positional
    /// parameters serialized as JSON
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}

/// A [`JsonRpcClient`] that can be opened against an arbitrary endpoint
/// URL, so the failover connection can mint one session per candidate.
pub trait JsonRpcTransport: JsonRpcClient + Sized {
    /// Opens a new session against `url`. Opening is allowed to be
    /// lazy; a transport that only fails on first use is treated as a
    /// failed probe by the connection logic.
    fn open(url: &Url) -> Result<Self, Self::Error>;
}
