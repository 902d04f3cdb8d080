use std::fmt;

use thiserror::Error;

use crate::bin::{Bin, BinId, NewBin, Priority};

/// Identifies one issued backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn new(raw: u64) -> Self {
        Ticket(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A backend operation requested by the bin map.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    ListBins,
    CreateBin(NewBin),
    DeleteBin(BinId),
    UpdatePriority { id: BinId, priority: Priority },
}

impl SyncRequest {
    /// Short description used in notices and logs.
    pub fn describe(&self) -> String {
        match self {
            SyncRequest::ListBins => "load bins".to_string(),
            SyncRequest::CreateBin(new) => format!("add bin at ({:.5}, {:.5})", new.lat, new.lng),
            SyncRequest::DeleteBin(id) => format!("delete bin {}", id),
            SyncRequest::UpdatePriority { id, priority } => {
                format!("set priority of bin {} to {}", id, priority)
            }
        }
    }

    /// Bin the request operates on, if any.
    pub fn bin_id(&self) -> Option<&str> {
        match self {
            SyncRequest::DeleteBin(id) | SyncRequest::UpdatePriority { id, .. } => Some(id.as_str()),
            SyncRequest::ListBins | SyncRequest::CreateBin(_) => None,
        }
    }
}

/// A request paired with the ticket its completion must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: SyncRequest,
}

/// Successful backend result.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResponse {
    Listed(Vec<Bin>),
    Created(Bin),
    Deleted(BinId),
    PriorityUpdated { id: BinId, priority: Priority },
}

/// Why a backend request failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncFailure {
    /// The backend could not be reached or its reply could not be read.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },
}

impl SyncFailure {
    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            SyncFailure::Transport(_) => "Backend unreachable".to_string(),
            SyncFailure::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            SyncFailure::Rejected { status, .. } => format!("Request failed (status {})", status),
        }
    }
}

/// The outcome of a request, delivered back to the bin map.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCompletion {
    pub ticket: Ticket,
    pub result: Result<SyncResponse, SyncFailure>,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
