//! Clip core: data model, message protocol and pure state machines.
mod cache;
mod effect;
mod media;
mod msg;
mod protocol;
mod state;
mod update;
mod view_model;

pub use cache::TabResultCache;
pub use effect::Effect;
pub use media::{
    has_media_extension, media_extension_of, MediaKind, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use msg::Msg;
pub use protocol::{Reply, Request, UiEvent};
pub use state::{AttemptId, CoordinatorState, ScanOutcome, ScanResult, TabId, TabPhase};
pub use update::update;
pub use view_model::{DownloadMark, ItemRow, PopupState, PopupView, StatusLine};
