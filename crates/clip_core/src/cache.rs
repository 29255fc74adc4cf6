use std::collections::HashMap;

use crate::state::{ScanResult, TabId};

/// Last successful scan per tab. At most one entry per tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabResultCache {
    entries: HashMap<TabId, ScanResult>,
}

impl TabResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab_id: TabId) -> Option<&ScanResult> {
        self.entries.get(&tab_id)
    }

    /// Stores `result`, replacing whatever the tab had before.
    pub fn store(&mut self, tab_id: TabId, result: ScanResult) {
        self.entries.insert(tab_id, result);
    }

    pub fn invalidate(&mut self, tab_id: TabId) -> Option<ScanResult> {
        self.entries.remove(&tab_id)
    }

    /// Drops the entry when the tab now shows a page other than the scanned one.
    /// Returns whether an entry was removed.
    pub fn invalidate_if_moved(&mut self, tab_id: TabId, current_url: &str) -> bool {
        let moved = self
            .entries
            .get(&tab_id)
            .is_some_and(|result| result.source_page_url() != current_url);
        if moved {
            self.entries.remove(&tab_id);
        }
        moved
    }

    /// Returns the cached result only if the tab still exists (`live_url` is
    /// `Some`) and still shows the scanned page. A stale entry is removed.
    pub fn lookup_fresh(&mut self, tab_id: TabId, live_url: Option<&str>) -> Option<ScanResult> {
        let fresh = match (self.entries.get(&tab_id), live_url) {
            (Some(result), Some(url)) => result.source_page_url() == url,
            (Some(_), None) => false,
            (None, _) => return None,
        };
        if fresh {
            self.entries.get(&tab_id).cloned()
        } else {
            self.entries.remove(&tab_id);
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
