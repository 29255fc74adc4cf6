use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::TabResultCache;

/// Host browser's integer key for one open page.
pub type TabId = i32;

/// Monotonic tag for one scan attempt; later attempts compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Media URLs gathered by one successful scan. Immutable once built.
///
/// `urls` never holds the same URL twice and keeps first-seen order; every
/// construction path, deserialization included, goes through [`ScanResult::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawScanResult")]
pub struct ScanResult {
    urls: Vec<String>,
    source_page_url: String,
    captured_at: DateTime<Utc>,
}

/// Wire shape of [`ScanResult`] before repeated URLs are dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScanResult {
    urls: Vec<String>,
    source_page_url: String,
    captured_at: DateTime<Utc>,
}

impl From<RawScanResult> for ScanResult {
    fn from(raw: RawScanResult) -> Self {
        ScanResult::new(raw.urls, raw.source_page_url, raw.captured_at)
    }
}

impl ScanResult {
    /// Builds a result, dropping repeated URLs while keeping first-seen order.
    pub fn new(
        urls: impl IntoIterator<Item = String>,
        source_page_url: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let mut seen = std::collections::HashSet::new();
        let urls = urls
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();
        Self {
            urls,
            source_page_url: source_page_url.into(),
            captured_at,
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn source_page_url(&self) -> &str {
        &self.source_page_url
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Exactly one of these is produced per scan attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanOutcome {
    Success(ScanResult),
    Empty,
    Failure { reason: String },
}

impl ScanOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        ScanOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn url_count(&self) -> usize {
        match self {
            ScanOutcome::Success(result) => result.urls().len(),
            ScanOutcome::Empty | ScanOutcome::Failure { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPhase {
    Idle,
    Scanning(AttemptId),
}

/// Everything the background coordinator remembers between events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinatorState {
    cache: TabResultCache,
    in_flight: HashMap<TabId, AttemptId>,
    last_attempt: u64,
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &TabResultCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut TabResultCache {
        &mut self.cache
    }

    pub fn phase(&self, tab_id: TabId) -> TabPhase {
        match self.in_flight.get(&tab_id) {
            Some(attempt) => TabPhase::Scanning(*attempt),
            None => TabPhase::Idle,
        }
    }

    /// True when `attempt` is the newest attempt still awaited for `tab_id`.
    pub fn is_current_attempt(&self, tab_id: TabId, attempt: AttemptId) -> bool {
        self.in_flight.get(&tab_id) == Some(&attempt)
    }

    /// Allocates a fresh attempt and makes it the only one awaited for the tab.
    pub(crate) fn begin_attempt(&mut self, tab_id: TabId) -> AttemptId {
        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        self.in_flight.insert(tab_id, attempt);
        attempt
    }

    pub(crate) fn finish_attempt(&mut self, tab_id: TabId) {
        self.in_flight.remove(&tab_id);
    }
}
