use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};

use async_trait::async_trait;
use clip_logging::{clip_info, clip_warn};
use tempfile::NamedTempFile;
use url::Url;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::host::DownloadSubsystem;
use crate::persist::{ensure_output_dir, persist_unique, PersistError};
use crate::types::{DownloadCompletion, DownloadId, DownloadRequest, HostError, TransferError};

/// Download subsystem backed by a local directory instead of a browser.
///
/// Requests are validated and scheduled on the current tokio runtime;
/// completions are reported on an optional channel.
pub struct FsDownloader {
    root: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    next_id: AtomicU64,
    completions: Option<mpsc::Sender<DownloadCompletion>>,
}

impl FsDownloader {
    pub fn new(root: impl Into<PathBuf>, settings: FetchSettings) -> Self {
        Self::with_fetcher(root, Arc::new(ReqwestFetcher::new(settings)))
    }

    pub fn with_fetcher(root: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
            next_id: AtomicU64::new(1),
            completions: None,
        }
    }

    pub fn with_completions(mut self, tx: mpsc::Sender<DownloadCompletion>) -> Self {
        self.completions = Some(tx);
        self
    }

    /// Validates `request` and resolves the directory it will land in.
    pub fn prepare(&self, request: &DownloadRequest) -> Result<(PathBuf, String), HostError> {
        let url = Url::parse(&request.url)
            .map_err(|err| HostError::Download(format!("invalid url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HostError::Download(format!(
                "unsupported url scheme `{}`",
                url.scheme()
            )));
        }

        let relative = Path::new(&request.filename);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        let file_name = relative
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        let file_name = match file_name {
            Some(name) if !escapes => name,
            _ => {
                return Err(HostError::Download(format!(
                    "invalid target path `{}`",
                    request.filename
                )))
            }
        };

        let dir = match relative.parent() {
            Some(parent) => self.root.join(parent),
            None => self.root.clone(),
        };
        ensure_output_dir(&dir).map_err(|err| HostError::Download(err.to_string()))?;
        Ok((dir, file_name))
    }

    /// Performs the whole transfer and returns the path written.
    pub async fn download_now(&self, request: &DownloadRequest) -> Result<PathBuf, TransferError> {
        let (dir, file_name) = self.prepare(request)?;
        transfer(self.fetcher.as_ref(), &request.url, &dir, &file_name).await
    }
}

async fn transfer(
    fetcher: &dyn Fetcher,
    url: &str,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, TransferError> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(PersistError::Io)?;
    let metadata = fetcher.fetch_into(url, tmp.as_file_mut()).await?;
    tmp.as_file_mut().sync_all().map_err(PersistError::Io)?;
    let path = persist_unique(tmp, dir, file_name)?;
    clip_info!("Saved {} bytes from {} to {:?}", metadata.byte_len, url, path);
    Ok(path)
}

#[async_trait]
impl DownloadSubsystem for FsDownloader {
    async fn start_download(&self, request: DownloadRequest) -> Result<DownloadId, HostError> {
        let (dir, file_name) = self.prepare(&request)?;
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = transfer(fetcher.as_ref(), &request.url, &dir, &file_name).await;
            if let Err(err) = &result {
                clip_warn!("{} failed for {}: {}", id, request.url, err);
            }
            if let Some(tx) = completions {
                let _ = tx.send(DownloadCompletion {
                    id,
                    url: request.url,
                    result,
                });
            }
        });
        Ok(id)
    }
}
