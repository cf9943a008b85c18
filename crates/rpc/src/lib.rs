//! Starknet JSON-RPC implementation of the attestation [`Signer`] and
//! [`HeaderSubscriber`].
//!
//! [`Signer`]: attestor_core::Signer
//! [`HeaderSubscriber`]: attestor_core::HeaderSubscriber

mod client;
mod error;
mod hash;
mod signer;
mod subscriber;
mod wire;

pub use client::{Client, ClientResult};
pub use error::{codes, ClientError};
pub use hash::invoke_v3_hash;
pub use signer::{sign_hash, ExternalSigner, RpcSigner, SigningKey};
pub use subscriber::PollingSubscriber;
