//! Awaitable views of the browser services the coordinator depends on.
use async_trait::async_trait;
use clip_core::{AttemptId, MediaKind, TabId, UiEvent};

use crate::types::{ChannelClosed, DownloadId, DownloadRequest, HostError};

#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Starts the scanner inside the tab. Returning `Ok` only means the
    /// scanner is running; its outcome arrives later as a scan report.
    async fn inject_scanner(
        &self,
        tab_id: TabId,
        attempt: AttemptId,
        media_kind: MediaKind,
    ) -> Result<(), HostError>;

    /// Current URL of the tab, or `None` when the tab no longer exists.
    async fn tab_url(&self, tab_id: TabId) -> Result<Option<String>, HostError>;
}

#[async_trait]
pub trait DownloadSubsystem: Send + Sync {
    /// Asks for a download. `Ok` means the transfer was accepted, not finished.
    async fn start_download(&self, request: DownloadRequest) -> Result<DownloadId, HostError>;
}

/// Push channel to the popup. It may be closed at any time.
pub trait UiChannel: Send + Sync {
    fn send(&self, event: UiEvent) -> Result<(), ChannelClosed>;
}

impl UiChannel for std::sync::mpsc::Sender<UiEvent> {
    fn send(&self, event: UiEvent) -> Result<(), ChannelClosed> {
        std::sync::mpsc::Sender::send(self, event).map_err(|_| ChannelClosed)
    }
}
