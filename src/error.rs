//! Error taxonomy shared by the aggregation pipeline.
//!
//! Only [`Error::Connection`] and [`Error::Decode`] ever reach a user. Transport
//! and data-shape failures are collected as diagnostics by the fetchers and the
//! price enricher and degrade the affected item to empty/zero values.

use thiserror::Error;

use crate::address::DecodeError;
use crate::models::WalletKind;

#[derive(Debug, Error)]
pub enum Error {
    /// Provider missing, user rejected the request, or the wallet exposed no address.
    #[error("could not connect {wallet}: {reason}")]
    Connection { wallet: WalletKind, reason: String },

    #[error("invalid address payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {detail}")]
    DataShape { endpoint: String, detail: String },
}

impl Error {
    pub fn connection(wallet: WalletKind, reason: impl Into<String>) -> Self {
        Error::Connection {
            wallet,
            reason: reason.into(),
        }
    }

    pub fn data_shape(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::DataShape {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// Network-level failure (including non-success statuses).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::HttpStatus { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
