use crate::{CoordinatorState, Effect, Msg, Reply, ScanOutcome, UiEvent};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CoordinatorState, msg: Msg) -> (CoordinatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartScan { tab_id, media_kind } => {
            // Clear before rescan; an older attempt still running is abandoned.
            state.cache_mut().invalidate(tab_id);
            let attempt = state.begin_attempt(tab_id);
            vec![
                Effect::Notify(UiEvent::ScanStarted { tab_id }),
                Effect::InjectScanner {
                    tab_id,
                    attempt,
                    media_kind,
                },
            ]
        }
        Msg::InjectionFailed {
            tab_id,
            attempt,
            message,
        } => {
            if !state.is_current_attempt(tab_id, attempt) {
                return (state, Vec::new());
            }
            state.finish_attempt(tab_id);
            vec![Effect::Notify(UiEvent::ScanError {
                tab_id,
                message: format!("Script injection failed: {message}"),
            })]
        }
        Msg::ScanReported {
            tab_id,
            attempt,
            outcome,
        } => {
            if !state.is_current_attempt(tab_id, attempt) {
                return (state, Vec::new());
            }
            state.finish_attempt(tab_id);
            let event = match outcome {
                ScanOutcome::Success(result) => {
                    let urls = result.urls().to_vec();
                    state.cache_mut().store(tab_id, result);
                    UiEvent::ScanComplete { tab_id, urls }
                }
                ScanOutcome::Empty => UiEvent::ScanComplete {
                    tab_id,
                    urls: Vec::new(),
                },
                ScanOutcome::Failure { reason } => UiEvent::ScanError {
                    tab_id,
                    message: reason,
                },
            };
            vec![Effect::Notify(event)]
        }
        Msg::ResultsQueried { tab_id, live_url } => {
            let reply = match state.cache_mut().lookup_fresh(tab_id, live_url.as_deref()) {
                Some(data) => Reply::Found { data },
                None => Reply::NotFound,
            };
            vec![Effect::Reply(reply)]
        }
        Msg::TabClosed { tab_id } => {
            state.cache_mut().invalidate(tab_id);
            state.finish_attempt(tab_id);
            Vec::new()
        }
        Msg::TabNavigated { tab_id, url } => {
            state.cache_mut().invalidate_if_moved(tab_id, &url);
            Vec::new()
        }
    };

    (state, effects)
}
