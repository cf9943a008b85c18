//! Errors of the JSON-RPC client.

use attestor_core::SignerError;

/// Starknet JSON-RPC error codes the attestor reacts to.
pub mod codes {
    pub const BLOCK_NOT_FOUND: i64 = 24;
    pub const TXN_HASH_NOT_FOUND: i64 = 29;
    pub const CONTRACT_ERROR: i64 = 40;
    pub const TRANSACTION_EXECUTION_ERROR: i64 = 41;
}

/// Revert reasons of the attestation contract meaning the epoch is already attested.
const ALREADY_DONE_REASONS: &[&str] = &[
    "Attestation is done for this epoch",
    "already done",
    "already an attestation",
    "already attested",
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The node answered with a JSON-RPC error.
    #[error("RPC server returned error '{message}' (code {code})")]
    Server {
        code: i64,
        message: String,
        data: Option<String>,
    },

    #[error("Error parsing rpc response: {0}")]
    Parse(String),

    #[error("Empty data received")]
    EmptyResponse,

    #[error("Could not connect: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    /// HTTP status error
    #[error("Obtained failure status({0}): {1}")]
    Status(String, String),

    #[error("Could not create request: {0}")]
    Request(String),

    #[error("Invalid url {0}: {1}")]
    InvalidUrl(String, String),

    #[error("{0}")]
    Other(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_status() {
            match err.status() {
                Some(code) => ClientError::Status(code.to_string(), err.to_string()),
                None => ClientError::Other(err.to_string()),
            }
        } else if err.is_decode() || err.is_body() {
            ClientError::Parse(err.to_string())
        } else if err.is_request() || err.is_builder() {
            ClientError::Request(err.to_string())
        } else {
            ClientError::Other(err.to_string())
        }
    }

    /// Whether the node refused the attestation because the epoch is already attested.
    pub fn is_attestation_already_done(&self) -> bool {
        let ClientError::Server {
            code,
            message,
            data,
        } = self
        else {
            return false;
        };

        if *code != codes::CONTRACT_ERROR && *code != codes::TRANSACTION_EXECUTION_ERROR {
            return false;
        }

        ALREADY_DONE_REASONS.iter().any(|reason| {
            message.contains(reason) || data.as_deref().is_some_and(|d| d.contains(reason))
        })
    }
}

impl From<ClientError> for SignerError {
    fn from(err: ClientError) -> Self {
        if err.is_attestation_already_done() {
            return SignerError::AttestationAlreadyDone;
        }

        match err {
            ClientError::Server {
                code: codes::TXN_HASH_NOT_FOUND,
                ..
            } => SignerError::TransactionNotFound,
            ClientError::Server {
                code: codes::BLOCK_NOT_FOUND,
                ..
            } => SignerError::BlockNotFound,
            ClientError::Server {
                code,
                message,
                data,
            } => SignerError::Rpc {
                code,
                message: match data {
                    Some(data) => format!("{message}: {data}"),
                    None => message,
                },
            },
            ClientError::Parse(e) => SignerError::InvalidResponse(e),
            ClientError::EmptyResponse => SignerError::InvalidResponse("empty result".to_string()),
            other => SignerError::Transport(other.to_string()),
        }
    }
}
