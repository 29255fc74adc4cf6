//! Clip engine: page scanning, coordination and download execution.
mod coordinator;
mod dispatch;
mod engine;
mod extract;
mod fetch;
mod filename;
mod fs_download;
mod host;
mod page;
mod persist;
mod replay;
mod scan;
mod scroll;
mod settings;
mod types;

pub use coordinator::Coordinator;
pub use dispatch::{BatchSummary, DownloadDispatcher};
pub use engine::{CoordinatorHandle, CoordinatorInbox};
pub use extract::{HtmlMediaExtractor, MediaExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{derive_filename, download_path, sanitize_folder};
pub use fs_download::FsDownloader;
pub use host::{BrowserHost, DownloadSubsystem, UiChannel};
pub use page::{ChatPage, PageError, ScrollMetrics, ScrollTarget};
pub use persist::{ensure_output_dir, numbered_name, persist_unique, PersistError};
pub use replay::ReplayPage;
pub use scan::{
    deliver_outcome, run_injected_scan, Clock, MediaAccumulator, OutcomeSink, ScanObserver,
    Scanner,
};
pub use scroll::{resolve_container, Conclusion, ScrollCheckpoint, ScrollDriver, ScrollState};
pub use settings::{DownloadSettings, ScanSettings, DEFAULT_CONTAINER_SELECTORS};
pub use types::{
    ChannelClosed, ConflictAction, DownloadCompletion, DownloadId, DownloadRequest, FailureKind,
    FetchError, FetchMetadata, HostError, ScanError, TransferError,
};
