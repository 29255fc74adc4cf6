//! In-process stand-in for the browser: each tab is a recorded page and
//! "injecting" the scanner runs it on the coordinator's runtime.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clip_core::{AttemptId, MediaKind, TabId};
use clip_engine::{
    run_injected_scan, BrowserHost, ChatPage, CoordinatorHandle, HostError, ReplayPage,
    ScanSettings, Scanner,
};
use clip_logging::{clip_debug, clip_info};

pub(crate) struct ReplayHost {
    coordinator: CoordinatorHandle,
    tabs: HashMap<TabId, ReplayPage>,
    scan: ScanSettings,
}

impl ReplayHost {
    pub fn new(coordinator: CoordinatorHandle, scan: ScanSettings) -> Self {
        Self {
            coordinator,
            tabs: HashMap::new(),
            scan,
        }
    }

    pub fn with_tab(mut self, tab_id: TabId, page: ReplayPage) -> Self {
        self.tabs.insert(tab_id, page);
        self
    }
}

#[async_trait]
impl BrowserHost for ReplayHost {
    async fn inject_scanner(
        &self,
        tab_id: TabId,
        attempt: AttemptId,
        media_kind: MediaKind,
    ) -> Result<(), HostError> {
        let Some(page) = self.tabs.get(&tab_id) else {
            return Err(HostError::Injection(format!("No tab with id: {tab_id}.")));
        };
        // Every injection starts from a fresh copy of the recording.
        let mut page = page.clone();
        let scanner = Scanner::new(self.scan.clone());
        let sink = self.coordinator.clone();
        clip_debug!("Running scanner for tab {} ({})", tab_id, attempt);
        tokio::spawn(async move {
            run_injected_scan(&scanner, &mut page, media_kind, tab_id, attempt, &sink).await;
        });
        Ok(())
    }

    async fn tab_url(&self, tab_id: TabId) -> Result<Option<String>, HostError> {
        Ok(self.tabs.get(&tab_id).map(|page| page.page_url()))
    }
}

/// Reads every `*.html` file in `dir`, sorted by file name.
pub(crate) fn load_frames(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("cannot read frames directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .collect::<Vec<_>>();
    paths.sort();

    if paths.is_empty() {
        bail!("no .html frames in {}", dir.display());
    }

    let frames = paths
        .iter()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("cannot read frame {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    clip_info!("Loaded {} frames from {}", frames.len(), dir.display());
    Ok(frames)
}
