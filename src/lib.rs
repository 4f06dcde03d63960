//! graphene-rs
//!
//! A client library for Graphene-family blockchains (Steem, Golos):
//! node discovery with failover, canonical transaction serialization
//! and multi-key recoverable signing.
//!
//! ```no_run
//! use graphene::providers::{Client, Http};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::<Http>::new(vec![
//!     "https://api.golos.id".parse()?,
//!     "https://api.golos.today".parse()?,
//! ]);
//! let url = client.try_connect().await?;
//! println!("connected to {url:?}");
//! # Ok(())
//! # }
//! ```

/// Chain data types, the canonical wire codec and digest computation.
pub mod core {
    pub use graphene_core::*;
}

/// JSON-RPC transports, endpoint failover and the client facade.
pub mod providers {
    pub use graphene_providers::*;
}

/// Private keys and the canonical recoverable signature scheme.
pub mod signers {
    pub use graphene_signers::*;
}

/// Easy imports of the frequently used types.
pub mod prelude {
    pub use super::core::*;
    pub use super::providers::*;
    pub use super::signers::*;
}
