use crate::JsonRpcError;
use graphene_core::types::TransactionError;
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// All clients can return [`JsonRpcError`] responses, as well as serde
/// deserialization errors. Because client errors are typically
/// type-erased via the [`ProviderError`], this trait provides
/// convenient access to the underlying error types.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Attempts to access an underlying [`JsonRpcError`], i.e. a
    /// structured error the node itself returned. `None` if the error
    /// arose before a response was received.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error
    /// response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Attempts to access an underlying [`serde_json::Error`].
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the underlying error is a serde_json
    /// (de)serialization error
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

#[derive(Debug, Error)]
/// An error thrown when making a call to the provider
pub enum ProviderError {
    /// An internal error in the JSON RPC Client
    #[error("{0}")]
    JsonRpcClientError(Box<dyn RpcError + Send + Sync>),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Error in underlying lib `hex`
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),

    /// Error while binding a transaction to head-block metadata
    #[error(transparent)]
    TransactionError(#[from] TransactionError),

    /// Error produced by a [`graphene_signers::Signer`]
    #[error("signer error: {0}")]
    SignerError(Box<dyn Error + Send + Sync>),

    /// The operation was cancelled through its cancellation token.
    /// Deliberately distinct from connection failures: a cancelled
    /// probe is not an unreachable endpoint.
    #[error("the operation was cancelled")]
    Cancelled,

    /// Connecting requires at least one candidate endpoint
    #[error("no endpoint URLs were supplied")]
    EmptyEndpointList,

    /// No session is active and the implicit reconnect found no
    /// endpoint that passes chain validation
    #[error("not connected: no configured endpoint passed validation")]
    NotConnected,
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ProviderError::JsonRpcClientError(err) = self {
            err.as_error_response()
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::JsonRpcClientError(e) => e.as_serde_error(),
            ProviderError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}
