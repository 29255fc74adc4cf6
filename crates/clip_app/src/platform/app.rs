use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clip_core::{MediaKind, PopupState, Reply, Request, TabId, UiEvent};
use clip_engine::{
    Coordinator, CoordinatorHandle, DownloadCompletion, DownloadDispatcher, FsDownloader,
    ReplayPage,
};
use clip_logging::{clip_info, clip_warn, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;

use super::host::{load_frames, ReplayHost};
use super::persistence::{load_settings, save_settings};
use super::ui::render::render;
use crate::cli::Cli;

/// The replayed feed is the only tab the harness knows about.
const REPLAY_TAB: TabId = 1;

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    clip_logging::initialize(log_destination(&cli), LevelFilter::Info);

    let settings = load_settings(&cli.settings);
    if cli.save_settings {
        save_settings(&cli.settings, &settings);
    }

    let frames = load_frames(&cli.frames)?;
    let page = ReplayPage::new(settings.page_url.clone(), frames, settings.viewport_height);

    let (coordinator, inbox) = CoordinatorHandle::channel();
    let host =
        ReplayHost::new(coordinator.clone(), settings.scan.clone()).with_tab(REPLAY_TAB, page);

    let (completion_tx, completion_rx) = mpsc::channel();
    let downloader = FsDownloader::new(cli.out.clone(), settings.fetch_settings())
        .with_completions(completion_tx);
    let dispatcher = DownloadDispatcher::new(Arc::new(downloader), settings.download.clone());

    let (ui_tx, ui_rx) = mpsc::channel();
    inbox
        .spawn(Coordinator::new(Arc::new(host), dispatcher, Arc::new(ui_tx)))
        .context("failed to start the coordinator thread")?;

    let mut popup = Popup::new(coordinator, REPLAY_TAB);

    popup.scan(cli.kind)?;
    popup.wait_for_scan(&ui_rx, settings.scan_timeout())?;
    // Reopening the popup reads the result back from the tab cache.
    popup.restore()?;

    if cli.dry_run {
        clip_info!("Dry run; skipping downloads");
        return Ok(());
    }

    let started = popup.download_all(&cli.folder)?;
    if started > 0 {
        wait_for_downloads(
            &completion_rx,
            started,
            settings.fetch_settings().request_timeout,
        );
    }
    Ok(())
}

/// A verbose dry run writes nothing to disk, the log file included.
fn log_destination(cli: &Cli) -> LogDestination {
    match (cli.verbose, cli.dry_run) {
        (true, true) => LogDestination::Terminal,
        (true, false) => LogDestination::Both(DEFAULT_LOG_FILE.into()),
        (false, _) => LogDestination::File(DEFAULT_LOG_FILE.into()),
    }
}

/// Drives the coordinator the way the extension popup does and prints its
/// view whenever it changes.
struct Popup {
    coordinator: CoordinatorHandle,
    state: PopupState,
}

impl Popup {
    fn new(coordinator: CoordinatorHandle, tab_id: TabId) -> Self {
        Self {
            coordinator,
            state: PopupState::new(tab_id),
        }
    }

    fn ask(&self, request: Request) -> anyhow::Result<Reply> {
        self.coordinator
            .request(request)?
            .context("coordinator sent no reply")
    }

    fn restore(&mut self) -> anyhow::Result<()> {
        let reply = self.ask(Request::GetResultsForTab {
            tab_id: self.state.tab_id(),
        })?;
        self.state.restore(&reply);
        self.show();
        Ok(())
    }

    fn scan(&mut self, kind: MediaKind) -> anyhow::Result<()> {
        if !self.state.scan_requested() {
            return Ok(());
        }
        let reply = self.ask(Request::StartScan {
            tab_id: Some(self.state.tab_id()),
            media_kind: Some(kind),
        })?;
        self.state.scan_request_answered(&reply);
        self.show();
        Ok(())
    }

    fn wait_for_scan(
        &mut self,
        events: &Receiver<UiEvent>,
        timeout: Duration,
    ) -> anyhow::Result<()> {
        let deadline = Instant::now() + timeout;
        while !self.state.view().scan_enabled {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = match events.recv_timeout(remaining) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => bail!("scan did not finish within {timeout:?}"),
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("coordinator stopped during the scan")
                }
            };
            self.state.apply_event(&event);
            self.show();
        }
        Ok(())
    }

    /// Returns how many transfers were started.
    fn download_all(&mut self, folder: &str) -> anyhow::Result<usize> {
        let Some(urls) = self.state.batch_requested() else {
            clip_info!("Nothing to download");
            return Ok(0);
        };
        let reply = self.ask(Request::DownloadAllUrls {
            urls,
            folder: folder.to_string(),
        })?;
        self.state.batch_answered(&reply);
        self.show();
        Ok(match reply {
            Reply::Success { count } => count.unwrap_or_default(),
            _ => 0,
        })
    }

    fn show(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        for line in render(&self.state.view()) {
            println!("{line}");
        }
    }
}

fn wait_for_downloads(
    completions: &Receiver<DownloadCompletion>,
    expected: usize,
    per_item: Duration,
) {
    let mut saved = 0;
    for _ in 0..expected {
        match completions.recv_timeout(per_item) {
            Ok(DownloadCompletion {
                result: Ok(path), ..
            }) => {
                saved += 1;
                println!("Saved {}", path.display());
            }
            Ok(DownloadCompletion {
                id,
                url,
                result: Err(err),
            }) => {
                println!("Failed {url}: {err}");
                clip_warn!("{} for {} failed: {}", id, url, err);
            }
            Err(err) => {
                clip_warn!("Stopped waiting for downloads: {}", err);
                break;
            }
        }
    }
    println!("{saved} of {expected} downloads finished");
}
