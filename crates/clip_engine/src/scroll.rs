use clip_logging::{clip_debug, clip_info, clip_warn};

use crate::page::{ChatPage, PageError, ScrollTarget};
use crate::settings::ScanSettings;
use crate::types::ScanError;

/// Why a traverse stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    BottomReached,
    Stalled,
    StepLimit,
}

/// Observation taken after one step has settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCheckpoint {
    pub step: u32,
    pub offset: f64,
    pub scroll_height: f64,
    pub conclusion: Option<Conclusion>,
}

impl ScrollCheckpoint {
    pub fn is_final(&self) -> bool {
        self.conclusion.is_some()
    }
}

/// Per-traverse bookkeeping; never outlives one scan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub last_offset: f64,
    pub stall_count: u32,
    pub steps: u32,
}

/// Picks the first configured selector that matches, else the document's
/// scrolling element.
pub fn resolve_container<P: ChatPage + ?Sized>(
    page: &P,
    selectors: &[String],
) -> Result<ScrollTarget, ScanError> {
    if let Some(selector) = selectors.iter().find(|selector| page.matches(selector)) {
        return Ok(ScrollTarget::Element {
            selector: selector.clone(),
        });
    }
    if page.has_document_scroller() {
        clip_warn!("No message container matched; falling back to the document scroller");
        return Ok(ScrollTarget::Document);
    }
    Err(ScanError::NoContainer)
}

/// Drives a container from the top to the end of its content one step at a time.
#[derive(Debug)]
pub struct ScrollDriver {
    target: ScrollTarget,
    settings: ScanSettings,
    state: ScrollState,
}

impl ScrollDriver {
    pub fn new(target: ScrollTarget, settings: ScanSettings) -> Self {
        Self {
            target,
            settings,
            state: ScrollState::default(),
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Moves to offset 0 and waits for the first screen to render.
    pub async fn start<P: ChatPage + ?Sized>(&mut self, page: &mut P) -> Result<(), PageError> {
        page.scroll_to(&self.target, 0.0)?;
        tokio::time::sleep(self.settings.initial_pause()).await;
        self.state = ScrollState {
            last_offset: page.metrics(&self.target)?.scroll_top,
            ..ScrollState::default()
        };
        Ok(())
    }

    /// Advances one step, waits for lazy content, then decides whether the
    /// traverse is over.
    pub async fn advance<P: ChatPage + ?Sized>(
        &mut self,
        page: &mut P,
    ) -> Result<ScrollCheckpoint, PageError> {
        let before = page.metrics(&self.target)?.scroll_top;
        let step = page.viewport_height() * self.settings.step_fraction;
        page.scroll_to(&self.target, before + step)?;
        tokio::time::sleep(self.settings.pause()).await;

        let after = page.metrics(&self.target)?;
        self.state.steps += 1;
        self.state.last_offset = after.scroll_top;

        if (after.scroll_top - before).abs() < self.settings.stall_tolerance_px {
            self.state.stall_count += 1;
            clip_debug!(
                "Scroll offset stuck at {:.0}, stall {}/{}",
                after.scroll_top,
                self.state.stall_count,
                self.settings.stall_limit
            );
        } else {
            self.state.stall_count = 0;
        }

        let at_bottom = after.scroll_top + after.client_height
            >= after.scroll_height - self.settings.bottom_tolerance_px;
        let conclusion = if at_bottom {
            Some(Conclusion::BottomReached)
        } else if self.state.stall_count >= self.settings.stall_limit {
            Some(Conclusion::Stalled)
        } else if self.state.steps >= self.settings.max_steps {
            Some(Conclusion::StepLimit)
        } else {
            None
        };

        clip_debug!(
            "Step {}: offset {:.0} / {:.0}",
            self.state.steps,
            after.scroll_top,
            after.scroll_height
        );
        if let Some(conclusion) = conclusion {
            clip_info!(
                "Scroll traverse concluded after {} steps: {:?}",
                self.state.steps,
                conclusion
            );
        }

        Ok(ScrollCheckpoint {
            step: self.state.steps,
            offset: after.scroll_top,
            scroll_height: after.scroll_height,
            conclusion,
        })
    }

    /// One last wait so content finishing at the boundary can render.
    pub async fn settle(&self) {
        tokio::time::sleep(self.settings.pause()).await;
    }

    /// Best-effort return to the top; failures are only logged.
    pub fn reset<P: ChatPage + ?Sized>(&self, page: &mut P) {
        if let Err(err) = page.scroll_to(&self.target, 0.0) {
            clip_debug!("Could not scroll {} back to top: {}", self.target, err);
        }
    }
}
