use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clip_core::{AttemptId, MediaKind, ScanOutcome, ScanResult, TabId};
use clip_logging::{clip_error, clip_info, clip_warn};

use crate::extract::{HtmlMediaExtractor, MediaExtractor};
use crate::page::ChatPage;
use crate::scroll::{resolve_container, ScrollCheckpoint, ScrollDriver};
use crate::settings::ScanSettings;
use crate::types::{ChannelClosed, ScanError};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Receives progress while a scan runs.
pub trait ScanObserver: Send + Sync {
    fn checkpoint(&self, checkpoint: &ScrollCheckpoint, accumulated: &[String]);
}

impl ScanObserver for () {
    fn checkpoint(&self, _checkpoint: &ScrollCheckpoint, _accumulated: &[String]) {}
}

/// Where a finished scan is delivered (the background coordinator).
pub trait OutcomeSink: Send + Sync {
    fn report(
        &self,
        tab_id: TabId,
        attempt: AttemptId,
        outcome: ScanOutcome,
    ) -> Result<(), ChannelClosed>;
}

/// Union of everything seen during one traverse, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAccumulator {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl MediaAccumulator {
    /// Adds unseen URLs and returns how many were new.
    pub fn merge(&mut self, found: impl IntoIterator<Item = String>) -> usize {
        let before = self.urls.len();
        for url in found {
            if self.seen.insert(url.clone()) {
                self.urls.push(url);
            }
        }
        self.urls.len() - before
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

/// Content-side entry point: scrolls the feed and harvests media as it renders.
pub struct Scanner<E = HtmlMediaExtractor> {
    settings: ScanSettings,
    extractor: E,
    clock: Clock,
}

impl Scanner<HtmlMediaExtractor> {
    pub fn new(settings: ScanSettings) -> Self {
        Self::with_extractor(settings, HtmlMediaExtractor)
    }
}

impl<E: MediaExtractor> Scanner<E> {
    pub fn with_extractor(settings: ScanSettings, extractor: E) -> Self {
        Self {
            settings,
            extractor,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub async fn scan<P: ChatPage + ?Sized>(&self, page: &mut P, kind: MediaKind) -> ScanOutcome {
        self.scan_observed(page, kind, &()).await
    }

    /// Runs one complete scan. Exactly one outcome is produced.
    pub async fn scan_observed<P: ChatPage + ?Sized>(
        &self,
        page: &mut P,
        kind: MediaKind,
        observer: &dyn ScanObserver,
    ) -> ScanOutcome {
        match self.traverse(page, kind, observer).await {
            Ok(found) if found.is_empty() => {
                clip_info!("Finished scanning; no {:?} URLs found", kind);
                ScanOutcome::Empty
            }
            Ok(found) => {
                clip_info!("Finished scanning; found {} unique {:?} URLs", found.len(), kind);
                ScanOutcome::Success(ScanResult::new(
                    found.into_urls(),
                    page.page_url(),
                    (self.clock)(),
                ))
            }
            Err(err) => {
                clip_error!("Scan failed: {}", err);
                ScanOutcome::failure(err.to_string())
            }
        }
    }

    async fn traverse<P: ChatPage + ?Sized>(
        &self,
        page: &mut P,
        kind: MediaKind,
        observer: &dyn ScanObserver,
    ) -> Result<MediaAccumulator, ScanError> {
        let target = resolve_container(page, &self.settings.container_selectors)?;
        clip_info!("Scroll container found: {}", target);

        let mut driver = ScrollDriver::new(target, self.settings.clone());
        let mut found = MediaAccumulator::default();

        driver.start(page).await?;
        self.harvest(page, kind, &mut found)?;

        loop {
            let checkpoint = driver.advance(page).await?;
            self.harvest(page, kind, &mut found)?;
            observer.checkpoint(&checkpoint, found.urls());
            if checkpoint.is_final() {
                break;
            }
        }

        driver.settle().await;
        self.harvest(page, kind, &mut found)?;
        driver.reset(page);
        Ok(found)
    }

    fn harvest<P: ChatPage + ?Sized>(
        &self,
        page: &P,
        kind: MediaKind,
        found: &mut MediaAccumulator,
    ) -> Result<(), ScanError> {
        let html = page.snapshot()?;
        found.merge(self.extractor.extract(&html, kind));
        Ok(())
    }
}

/// Sends the outcome home. A closed channel is logged and swallowed: nothing
/// else can be done from the content side.
pub fn deliver_outcome(
    sink: &dyn OutcomeSink,
    tab_id: TabId,
    attempt: AttemptId,
    outcome: ScanOutcome,
) {
    if let Err(err) = sink.report(tab_id, attempt, outcome) {
        clip_warn!(
            "Failed to deliver scan outcome for tab {} attempt {}: {}",
            tab_id,
            attempt,
            err
        );
    }
}

/// What an injected scanner does: scan once, report once.
pub async fn run_injected_scan<P, E>(
    scanner: &Scanner<E>,
    page: &mut P,
    kind: MediaKind,
    tab_id: TabId,
    attempt: AttemptId,
    sink: &dyn OutcomeSink,
) where
    P: ChatPage + ?Sized,
    E: MediaExtractor,
{
    let outcome = scanner.scan(page, kind).await;
    deliver_outcome(sink, tab_id, attempt, outcome);
}
