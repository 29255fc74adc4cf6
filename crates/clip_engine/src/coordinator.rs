use std::collections::VecDeque;
use std::sync::Arc;

use clip_core::{update, CoordinatorState, Effect, Msg, Reply, Request};
use clip_logging::{clip_debug, clip_error, clip_info, clip_warn};

use crate::dispatch::DownloadDispatcher;
use crate::host::{BrowserHost, UiChannel};

/// Background message router. Owns the per-tab state and is the only thing
/// that talks to the popup about scans.
pub struct Coordinator {
    state: CoordinatorState,
    host: Arc<dyn BrowserHost>,
    downloads: DownloadDispatcher,
    ui: Arc<dyn UiChannel>,
}

impl Coordinator {
    pub fn new(
        host: Arc<dyn BrowserHost>,
        downloads: DownloadDispatcher,
        ui: Arc<dyn UiChannel>,
    ) -> Self {
        Self {
            state: CoordinatorState::new(),
            host,
            downloads,
            ui,
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Handles one request. Requests that expect an answer get `Some(reply)`.
    pub async fn handle(&mut self, request: Request) -> Option<Reply> {
        match request {
            Request::StartScan { tab_id: None, .. } => {
                clip_error!("START_SCAN message missing tabId");
                Some(Reply::error("Missing tabId"))
            }
            Request::StartScan {
                tab_id: Some(tab_id),
                media_kind,
            } => {
                clip_info!("Starting scan for tab {}", tab_id);
                let effects = self.apply(Msg::StartScan {
                    tab_id,
                    media_kind: media_kind.unwrap_or_default(),
                });
                self.run_effects(effects).await;
                Some(Reply::Received)
            }
            Request::ScanReport {
                tab_id,
                attempt,
                outcome,
            } => {
                if !self.state.is_current_attempt(tab_id, attempt) {
                    clip_warn!(
                        "Dropping outcome of abandoned scan attempt {} for tab {}",
                        attempt,
                        tab_id
                    );
                    return None;
                }
                clip_info!(
                    "Tab {} attempt {} reported {} URLs",
                    tab_id,
                    attempt,
                    outcome.url_count()
                );
                let effects = self.apply(Msg::ScanReported {
                    tab_id,
                    attempt,
                    outcome,
                });
                self.run_effects(effects).await;
                None
            }
            Request::GetResultsForTab { tab_id } => {
                let live_url = match self.host.tab_url(tab_id).await {
                    Ok(url) => url,
                    Err(err) => {
                        clip_warn!("Could not look up tab {}: {}", tab_id, err);
                        None
                    }
                };
                let effects = self.apply(Msg::ResultsQueried { tab_id, live_url });
                self.run_effects(effects).await
            }
            Request::DownloadSingleUrl { url, folder } => {
                Some(self.downloads.single_reply(&url, &folder).await)
            }
            Request::DownloadAllUrls { urls, folder } => {
                Some(self.downloads.batch_reply(&urls, &folder).await)
            }
            Request::TabClosed { tab_id } => {
                clip_debug!("Tab {} closed", tab_id);
                let effects = self.apply(Msg::TabClosed { tab_id });
                self.run_effects(effects).await;
                None
            }
            Request::TabUpdated { tab_id, url } => {
                let effects = self.apply(Msg::TabNavigated { tab_id, url });
                self.run_effects(effects).await;
                None
            }
        }
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) -> Option<Reply> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut reply = None;
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::InjectScanner {
                    tab_id,
                    attempt,
                    media_kind,
                } => match self.host.inject_scanner(tab_id, attempt, media_kind).await {
                    Ok(()) => {
                        clip_info!(
                            "Scanner injected into tab {} ({}); waiting for results",
                            tab_id,
                            attempt
                        );
                    }
                    Err(err) => {
                        clip_error!("Script injection failed for tab {}: {}", tab_id, err);
                        queue.extend(self.apply(Msg::InjectionFailed {
                            tab_id,
                            attempt,
                            message: err.to_string(),
                        }));
                    }
                },
                Effect::Notify(event) => {
                    if let Err(err) = self.ui.send(event) {
                        clip_debug!("Popup not listening ({}); event dropped", err);
                    }
                }
                Effect::Reply(answer) => reply = Some(answer),
            }
        }
        reply
    }
}
