use std::sync::Arc;

use clip_core::Reply;
use clip_logging::{clip_info, clip_warn};
use futures_util::future::join_all;

use crate::filename::download_path;
use crate::host::DownloadSubsystem;
use crate::settings::DownloadSettings;
use crate::types::{ConflictAction, DownloadId, DownloadRequest, HostError};

/// Outcome of a batch: how many transfers were accepted and how many were not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub initiated: usize,
    pub failed: usize,
}

/// Turns URL + folder requests into download-subsystem calls.
#[derive(Clone)]
pub struct DownloadDispatcher {
    subsystem: Arc<dyn DownloadSubsystem>,
    settings: DownloadSettings,
}

impl DownloadDispatcher {
    pub fn new(subsystem: Arc<dyn DownloadSubsystem>, settings: DownloadSettings) -> Self {
        Self {
            subsystem,
            settings,
        }
    }

    pub fn request_for(&self, url: &str, folder: &str) -> DownloadRequest {
        DownloadRequest {
            url: url.to_string(),
            filename: download_path(url, folder, &self.settings),
            conflict: ConflictAction::Uniquify,
        }
    }

    pub async fn download_one(&self, url: &str, folder: &str) -> Result<DownloadId, HostError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(HostError::Download("Missing URL".to_string()));
        }
        let request = self.request_for(url, folder);
        clip_info!("Initiating download: {} as {}", request.url, request.filename);
        self.subsystem.start_download(request).await
    }

    /// Every item is attempted on its own; a failing item never stops the rest.
    pub async fn download_all(&self, urls: &[String], folder: &str) -> BatchSummary {
        let attempts = urls.iter().map(|url| async move {
            match self.download_one(url, folder).await {
                Ok(id) => Some(id),
                Err(err) => {
                    clip_warn!("Batch download item failed ({}): {}", url, err);
                    None
                }
            }
        });
        let results = join_all(attempts).await;
        let initiated = results.iter().filter(|r| r.is_some()).count();
        let summary = BatchSummary {
            initiated,
            failed: results.len() - initiated,
        };
        clip_info!(
            "Initiated {} downloads, {} failed during initiation",
            summary.initiated,
            summary.failed
        );
        summary
    }

    pub async fn single_reply(&self, url: &str, folder: &str) -> Reply {
        match self.download_one(url, folder).await {
            Ok(id) => {
                clip_info!("Single download {} started", id);
                Reply::Success { count: None }
            }
            Err(err) => {
                clip_warn!("Single download failed for {}: {}", url, err);
                Reply::error(err.to_string())
            }
        }
    }

    pub async fn batch_reply(&self, urls: &[String], folder: &str) -> Reply {
        if urls.is_empty() {
            return Reply::error("Invalid URLs provided.");
        }
        let summary = self.download_all(urls, folder).await;
        if summary.initiated > 0 {
            Reply::Success {
                count: Some(summary.initiated),
            }
        } else {
            Reply::error(format!(
                "Failed to initiate any downloads ({} errors).",
                summary.failed
            ))
        }
    }
}
