use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Selectors tried in order when looking for the message list.
pub const DEFAULT_CONTAINER_SELECTORS: &[&str] = &[
    r#"div[class^="scrollerInner-"] > div[class^="messagesWrapper-"]"#,
    r#"main div[class^="scroller-"]"#,
    r#"div[class*="chatContent-"]"#,
    r#"[data-list-id="chat-messages"]"#,
    r#"[aria-label*="Messages"]"#,
];

/// Tuning for one scroll traverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub container_selectors: Vec<String>,
    /// Fraction of the viewport height advanced per step.
    pub step_fraction: f64,
    pub pause_ms: u64,
    pub initial_pause_ms: u64,
    /// Consecutive non-moving steps that count as end of content.
    pub stall_limit: u32,
    pub stall_tolerance_px: f64,
    pub bottom_tolerance_px: f64,
    /// Hard cap on steps regardless of how the page behaves.
    pub max_steps: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            container_selectors: DEFAULT_CONTAINER_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            step_fraction: 0.8,
            pause_ms: 450,
            initial_pause_ms: 500,
            stall_limit: 5,
            stall_tolerance_px: 10.0,
            bottom_tolerance_px: 20.0,
            max_steps: 2_000,
        }
    }
}

impl ScanSettings {
    /// Same thresholds with every wait removed; used for recorded pages.
    pub fn without_pauses(mut self) -> Self {
        self.pause_ms = 0;
        self.initial_pause_ms = 0;
        self
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn initial_pause(&self) -> Duration {
        Duration::from_millis(self.initial_pause_ms)
    }
}

/// How download targets are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub default_folder: String,
    pub max_folder_len: usize,
    pub max_filename_len: usize,
    pub default_extension: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            default_folder: "ChatClips".to_string(),
            max_folder_len: 64,
            max_filename_len: 100,
            default_extension: "mp4".to_string(),
        }
    }
}
