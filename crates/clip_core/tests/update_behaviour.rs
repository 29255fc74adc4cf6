use std::sync::Once;

use chrono::{TimeZone, Utc};
use clip_core::{
    update, AttemptId, CoordinatorState, Effect, MediaKind, Msg, Reply, ScanOutcome, ScanResult,
    TabId, TabPhase, UiEvent,
};
use pretty_assertions::assert_eq;

const PAGE: &str = "https://chat.example.com/channels/1/2";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(clip_logging::initialize_for_tests);
}

fn result(urls: &[&str], page: &str) -> ScanResult {
    ScanResult::new(
        urls.iter().map(|u| u.to_string()),
        page,
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    )
}

fn start(state: CoordinatorState, tab_id: TabId) -> (CoordinatorState, AttemptId) {
    let (state, effects) = update(
        state,
        Msg::StartScan {
            tab_id,
            media_kind: MediaKind::Video,
        },
    );
    let attempt = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::InjectScanner { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .expect("inject effect");
    (state, attempt)
}

fn report(
    state: CoordinatorState,
    tab_id: TabId,
    attempt: AttemptId,
    outcome: ScanOutcome,
) -> (CoordinatorState, Vec<Effect>) {
    update(
        state,
        Msg::ScanReported {
            tab_id,
            attempt,
            outcome,
        },
    )
}

fn query(state: CoordinatorState, tab_id: TabId, live_url: Option<&str>) -> (CoordinatorState, Reply) {
    let (state, effects) = update(
        state,
        Msg::ResultsQueried {
            tab_id,
            live_url: live_url.map(str::to_string),
        },
    );
    match effects.as_slice() {
        [Effect::Reply(reply)] => (state, reply.clone()),
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn start_scan_notifies_and_injects() {
    init_logging();
    let (state, effects) = update(
        CoordinatorState::new(),
        Msg::StartScan {
            tab_id: 3,
            media_kind: MediaKind::Image,
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Notify(UiEvent::ScanStarted { tab_id: 3 }),
            Effect::InjectScanner {
                tab_id: 3,
                attempt: AttemptId(1),
                media_kind: MediaKind::Image,
            },
        ]
    );
    assert_eq!(state.phase(3), TabPhase::Scanning(AttemptId(1)));
}

#[test]
fn successful_report_is_cached_and_forwarded() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 1);
    let scanned = result(&["https://cdn.test/a.mp4", "https://cdn.test/b.mp4"], PAGE);

    let (state, effects) = report(state, 1, attempt, ScanOutcome::Success(scanned.clone()));

    assert_eq!(
        effects,
        vec![Effect::Notify(UiEvent::ScanComplete {
            tab_id: 1,
            urls: scanned.urls().to_vec(),
        })]
    );
    assert_eq!(state.phase(1), TabPhase::Idle);
    assert_eq!(state.cache().get(1), Some(&scanned));

    let (_, reply) = query(state, 1, Some(PAGE));
    assert_eq!(reply, Reply::Found { data: scanned });
}

#[test]
fn empty_and_failed_outcomes_are_not_cached() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 1);
    let (state, effects) = report(state, 1, attempt, ScanOutcome::Empty);
    assert_eq!(
        effects,
        vec![Effect::Notify(UiEvent::ScanComplete {
            tab_id: 1,
            urls: Vec::new(),
        })]
    );
    assert!(state.cache().is_empty());

    let (state, attempt) = start(state, 1);
    let (state, effects) = report(state, 1, attempt, ScanOutcome::failure("no container"));
    assert_eq!(
        effects,
        vec![Effect::Notify(UiEvent::ScanError {
            tab_id: 1,
            message: "no container".to_string(),
        })]
    );
    assert!(state.cache().is_empty());
    assert_eq!(state.phase(1), TabPhase::Idle);
}

#[test]
fn navigation_makes_query_miss_and_drops_entry() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 7);
    let (state, _) = report(
        state,
        7,
        attempt,
        ScanOutcome::Success(result(&["https://cdn.test/a.mp4"], PAGE)),
    );

    let (state, reply) = query(state, 7, Some("https://chat.example.com/channels/1/3"));
    assert_eq!(reply, Reply::NotFound);
    assert!(state.cache().get(7).is_none());
}

#[test]
fn tab_navigated_event_drops_entry_only_for_new_url() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 7);
    let (state, _) = report(
        state,
        7,
        attempt,
        ScanOutcome::Success(result(&["https://cdn.test/a.mp4"], PAGE)),
    );

    let (state, effects) = update(
        state,
        Msg::TabNavigated {
            tab_id: 7,
            url: PAGE.to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.cache().get(7).is_some());

    let (state, _) = update(
        state,
        Msg::TabNavigated {
            tab_id: 7,
            url: "https://chat.example.com/channels/9/9".to_string(),
        },
    );
    assert!(state.cache().get(7).is_none());
}

#[test]
fn closed_tab_is_forgotten_and_late_report_ignored() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 2);
    let (state, _) = update(state, Msg::TabClosed { tab_id: 2 });
    assert_eq!(state.phase(2), TabPhase::Idle);

    let (state, effects) = report(
        state,
        2,
        attempt,
        ScanOutcome::Success(result(&["https://cdn.test/a.mp4"], PAGE)),
    );
    assert!(effects.is_empty());
    assert!(state.cache().is_empty());

    let (_, reply) = query(state, 2, None);
    assert_eq!(reply, Reply::NotFound);
}

#[test]
fn rescan_clears_entry_and_rejects_abandoned_attempt() {
    init_logging();
    let (state, first) = start(CoordinatorState::new(), 5);
    let (state, _) = report(
        state,
        5,
        first,
        ScanOutcome::Success(result(&["https://cdn.test/old.mp4"], PAGE)),
    );
    assert!(state.cache().get(5).is_some());

    // Rescan clears the previous entry immediately.
    let (state, second) = start(state, 5);
    assert!(state.cache().get(5).is_none());

    // A third request abandons the second attempt.
    let (state, third) = start(state, 5);
    assert!(third > second && second > first);

    let newest = result(&["https://cdn.test/new.mp4"], PAGE);
    let (state, _) = report(state, 5, third, ScanOutcome::Success(newest.clone()));

    // The abandoned attempt arrives late and must not overwrite.
    let (state, effects) = report(
        state,
        5,
        second,
        ScanOutcome::Success(result(&["https://cdn.test/stale.mp4"], PAGE)),
    );
    assert!(effects.is_empty());
    assert_eq!(state.cache().get(5), Some(&newest));
}

#[test]
fn injection_failure_reports_error_for_current_attempt_only() {
    init_logging();
    let (state, first) = start(CoordinatorState::new(), 8);
    let (state, second) = start(state, 8);

    let (state, effects) = update(
        state,
        Msg::InjectionFailed {
            tab_id: 8,
            attempt: first,
            message: "tab crashed".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(8), TabPhase::Scanning(second));

    let (state, effects) = update(
        state,
        Msg::InjectionFailed {
            tab_id: 8,
            attempt: second,
            message: "Cannot access contents of the page".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(UiEvent::ScanError {
            tab_id: 8,
            message: "Script injection failed: Cannot access contents of the page".to_string(),
        })]
    );
    assert_eq!(state.phase(8), TabPhase::Idle);
}

#[test]
fn tabs_are_isolated() {
    init_logging();
    let (state, a) = start(CoordinatorState::new(), 1);
    let (state, b) = start(state, 2);
    let (state, _) = report(
        state,
        2,
        b,
        ScanOutcome::Success(result(&["https://cdn.test/b.mp4"], PAGE)),
    );
    assert_eq!(state.phase(1), TabPhase::Scanning(a));
    assert!(state.cache().get(1).is_none());
    assert!(state.cache().get(2).is_some());
}

#[test]
fn reported_duplicates_are_cached_once() {
    init_logging();
    let (state, attempt) = start(CoordinatorState::new(), 7);
    let outcome: ScanOutcome = serde_json::from_value(serde_json::json!({
        "kind": "success",
        "urls": ["https://a.test/x.mp4", "https://a.test/x.mp4"],
        "sourcePageUrl": PAGE,
        "capturedAt": "2024-05-01T12:00:00Z"
    }))
    .unwrap();
    let (state, _) = report(state, 7, attempt, outcome);

    let cached = state.cache().get(7).expect("cached result");
    assert_eq!(cached.urls(), ["https://a.test/x.mp4".to_string()]);
    assert_eq!(cached, &result(&["https://a.test/x.mp4"], PAGE));
}
