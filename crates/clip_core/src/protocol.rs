//! Messages exchanged between the popup, the background coordinator and the
//! content context. Field and tag names match the extension's JSON messages.
use serde::{Deserialize, Serialize};

use crate::media::MediaKind;
use crate::state::{AttemptId, ScanOutcome, ScanResult, TabId};

/// Everything the coordinator can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    /// Popup asks for a scan of a tab.
    StartScan {
        #[serde(default)]
        tab_id: Option<TabId>,
        #[serde(default)]
        media_kind: Option<MediaKind>,
    },
    /// Content context reports the outcome of an injected scan.
    ScanReport {
        tab_id: TabId,
        attempt: AttemptId,
        outcome: ScanOutcome,
    },
    GetResultsForTab {
        tab_id: TabId,
    },
    DownloadSingleUrl {
        #[serde(default)]
        url: String,
        #[serde(default)]
        folder: String,
    },
    DownloadAllUrls {
        #[serde(default)]
        urls: Vec<String>,
        #[serde(default)]
        folder: String,
    },
    /// Host housekeeping: the tab went away.
    TabClosed {
        tab_id: TabId,
    },
    /// Host housekeeping: the tab committed a new URL.
    TabUpdated {
        tab_id: TabId,
        url: String,
    },
}

/// Synchronous answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Received,
    Found {
        data: ScanResult,
    },
    NotFound,
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
    Error {
        message: String,
    },
}

impl Reply {
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

/// Asynchronous notifications pushed to the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum UiEvent {
    ScanStarted { tab_id: TabId },
    /// An empty `urls` list means the scan finished and found nothing.
    ScanComplete { tab_id: TabId, urls: Vec<String> },
    ScanError { tab_id: TabId, message: String },
}

impl UiEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            UiEvent::ScanStarted { tab_id }
            | UiEvent::ScanComplete { tab_id, .. }
            | UiEvent::ScanError { tab_id, .. } => *tab_id,
        }
    }
}
