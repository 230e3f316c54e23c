use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::observer::TransferObserver;

/// Opaque identifier for a submitted transfer.
///
/// Handles are allocated from a strictly increasing counter and are never
/// reused, so a late event can never be misattributed to a newer transfer
/// that happened to receive the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    /// Reconstruct a handle from its raw integer form, e.g. one that crossed
    /// a foreign-function boundary.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Per-transfer lifecycle. A transfer is present in the manager's active
/// table iff it has not yet reached one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Pending,
    InFlight,
    Succeeded,
    Failed,
    Aborted,
}

/// Serializable snapshot of an active transfer, for front-end status views.
#[derive(Debug, Clone, Serialize)]
pub struct TransferStatus {
    pub handle: Handle,
    pub url: String,
    pub destination: PathBuf,
    pub state: LifecycleState,
}

/// Codes reported through `on_error` for failures that carry no HTTP status.
pub mod error_code {
    /// Failure below the HTTP layer (DNS, connect, mid-stream network error).
    pub const NETWORK: u32 = 0;

    /// The response arrived with a 2xx status but persisting the body to the
    /// storage collaborator failed. Outside the HTTP status range so callers
    /// can tell it apart from a server-reported error.
    pub const STORAGE: u32 = 1000;
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("disk error: {0}")]
    Disk(#[from] std::io::Error),
}

/// Input to `TransferManager::submit`.
///
/// `body` must be present for POST (an empty body is fine) and is ignored
/// for GET. The observer is optional; unobserved outcomes are dropped.
pub struct TransferRequest {
    pub url: String,
    pub method: Method,
    pub destination: String,
    pub body: Option<Vec<u8>>,
    pub observer: Option<Arc<dyn TransferObserver>>,
}

impl TransferRequest {
    pub fn get(url: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            destination: destination.into(),
            body: None,
            observer: None,
        }
    }

    pub fn post(
        url: impl Into<String>,
        destination: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            destination: destination.into(),
            body: Some(body.into()),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}
