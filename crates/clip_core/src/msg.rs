use crate::{AttemptId, MediaKind, ScanOutcome, TabId};

/// Input of the coordinator state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Popup requested a (re)scan of a tab.
    StartScan { tab_id: TabId, media_kind: MediaKind },
    /// The host could not inject the scanner for this attempt.
    InjectionFailed {
        tab_id: TabId,
        attempt: AttemptId,
        message: String,
    },
    /// The content context delivered its outcome.
    ScanReported {
        tab_id: TabId,
        attempt: AttemptId,
        outcome: ScanOutcome,
    },
    /// Popup asked for cached results. `live_url` is the tab's current URL,
    /// or `None` when the tab no longer exists.
    ResultsQueried {
        tab_id: TabId,
        live_url: Option<String>,
    },
    TabClosed { tab_id: TabId },
    TabNavigated { tab_id: TabId, url: String },
}
