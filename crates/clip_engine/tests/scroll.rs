use std::collections::VecDeque;

use clip_engine::{
    resolve_container, ChatPage, Conclusion, PageError, ReplayPage, ScanError, ScanSettings,
    ScrollDriver, ScrollMetrics, ScrollTarget,
};

const PAGE: &str = "https://chat.test/channels/1/2";

fn frames(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!(r#"<main><div aria-label="Messages"><p>msg {i}</p></div></main>"#))
        .collect()
}

fn settings() -> ScanSettings {
    ScanSettings::default().without_pauses()
}

async fn run_to_end(page: &mut ReplayPage, settings: ScanSettings) -> (u32, Conclusion) {
    let target = resolve_container(page, &settings.container_selectors).unwrap();
    let mut driver = ScrollDriver::new(target, settings);
    driver.start(page).await.unwrap();
    loop {
        let checkpoint = driver.advance(page).await.unwrap();
        if let Some(conclusion) = checkpoint.conclusion {
            return (checkpoint.step, conclusion);
        }
    }
}

#[test]
fn resolves_first_matching_selector_then_document() {
    let page = ReplayPage::new(PAGE, frames(1), 100.0);
    let selectors = vec![
        r#"div[class^="scrollerInner-"]"#.to_string(),
        r#"[aria-label*="Messages"]"#.to_string(),
        "main".to_string(),
    ];
    assert_eq!(
        resolve_container(&page, &selectors).unwrap(),
        ScrollTarget::Element {
            selector: r#"[aria-label*="Messages"]"#.to_string()
        }
    );

    let bare = ReplayPage::new(PAGE, vec!["<p>plain</p>".to_string()], 100.0);
    assert_eq!(
        resolve_container(&bare, &selectors).unwrap(),
        ScrollTarget::Document
    );
}

#[test]
fn missing_container_is_an_error() {
    let page = ReplayPage::new(PAGE, vec!["<p>plain</p>".to_string()], 100.0)
        .without_document_scroller();
    assert_eq!(
        resolve_container(&page, &settings().container_selectors),
        Err(ScanError::NoContainer)
    );
}

#[tokio::test]
async fn static_page_reaches_bottom() {
    let mut page = ReplayPage::new(PAGE, frames(5), 100.0);
    let (steps, conclusion) = run_to_end(&mut page, settings()).await;
    assert_eq!(conclusion, Conclusion::BottomReached);
    // 80px per step over 400px of travel.
    assert_eq!(steps, 5);
}

#[tokio::test]
async fn single_screen_page_concludes_after_one_step() {
    let mut page = ReplayPage::new(PAGE, frames(1), 100.0);
    let (steps, conclusion) = run_to_end(&mut page, settings()).await;
    assert_eq!(conclusion, Conclusion::BottomReached);
    assert_eq!(steps, 1);
}

#[tokio::test]
async fn frozen_page_stalls_after_limit() {
    let mut page = ReplayPage::new(PAGE, frames(10), 100.0).with_frozen_scroll();
    let settings = ScanSettings {
        stall_limit: 4,
        ..settings()
    };
    let (steps, conclusion) = run_to_end(&mut page, settings).await;
    assert_eq!(conclusion, Conclusion::Stalled);
    assert_eq!(steps, 4);
}

#[tokio::test]
async fn step_limit_bounds_the_traverse() {
    let mut page = ReplayPage::new(PAGE, frames(100), 100.0);
    let settings = ScanSettings {
        max_steps: 3,
        ..settings()
    };
    let (steps, conclusion) = run_to_end(&mut page, settings).await;
    assert_eq!(conclusion, Conclusion::StepLimit);
    assert_eq!(steps, 3);
}

#[tokio::test]
async fn lazy_loading_keeps_scrolling_until_all_frames_loaded() {
    let mut page = ReplayPage::new(PAGE, frames(4), 100.0).with_lazy_loading(1);
    let (_, conclusion) = run_to_end(&mut page, settings()).await;
    assert_eq!(conclusion, Conclusion::BottomReached);
    let metrics = page.metrics(&ScrollTarget::Document).unwrap();
    assert_eq!(metrics.scroll_height, 400.0);
    assert!(page.snapshot().unwrap().contains("msg 3"));
}

/// Page whose offset after each scroll request is scripted.
struct ScriptedPage {
    offsets: VecDeque<f64>,
    offset: f64,
}

impl ChatPage for ScriptedPage {
    fn page_url(&self) -> String {
        PAGE.to_string()
    }

    fn viewport_height(&self) -> f64 {
        100.0
    }

    fn matches(&self, _selector: &str) -> bool {
        false
    }

    fn has_document_scroller(&self) -> bool {
        true
    }

    fn metrics(&self, _target: &ScrollTarget) -> Result<ScrollMetrics, PageError> {
        Ok(ScrollMetrics {
            scroll_top: self.offset,
            client_height: 100.0,
            scroll_height: 100_000.0,
        })
    }

    fn scroll_to(&mut self, _target: &ScrollTarget, _top: f64) -> Result<(), PageError> {
        if let Some(next) = self.offsets.pop_front() {
            self.offset = next;
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<String, PageError> {
        Ok(String::new())
    }
}

#[tokio::test]
async fn movement_resets_stall_counter() {
    let mut page = ScriptedPage {
        offsets: VecDeque::from(vec![0.0, 0.0, 5.0, 50.0, 52.0]),
        offset: 0.0,
    };
    let mut driver = ScrollDriver::new(ScrollTarget::Document, settings());
    driver.start(&mut page).await.unwrap();

    let mut stalls = Vec::new();
    for _ in 0..4 {
        driver.advance(&mut page).await.unwrap();
        stalls.push(driver.state().stall_count);
    }
    // 0 -> 0 and 0 -> 5 are below the 10px tolerance; 5 -> 50 moves.
    assert_eq!(stalls, vec![1, 2, 0, 1]);
}

#[tokio::test]
async fn reset_returns_to_top_and_ignores_failures() {
    let mut page = ReplayPage::new(PAGE, frames(3), 100.0);
    let target = ScrollTarget::Document;
    let mut driver = ScrollDriver::new(target, settings());
    driver.start(&mut page).await.unwrap();
    driver.advance(&mut page).await.unwrap();
    assert!(page.offset() > 0.0);
    driver.reset(&mut page);
    assert_eq!(page.offset(), 0.0);

    let mut broken = ReplayPage::new(PAGE, frames(3), 100.0).with_broken_scroll();
    driver.reset(&mut broken);
}
