use crate::{AttemptId, MediaKind, Reply, TabId, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the scanner in the tab, tagged with `attempt`.
    InjectScanner {
        tab_id: TabId,
        attempt: AttemptId,
        media_kind: MediaKind,
    },
    /// Push a notification to the popup.
    Notify(UiEvent),
    /// Answer the request currently being handled.
    Reply(Reply),
}
