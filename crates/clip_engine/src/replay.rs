use scraper::{Html, Selector};

use crate::page::{ChatPage, PageError, ScrollMetrics, ScrollTarget};

/// A recorded virtualized feed: each frame is the markup rendered while the
/// viewport sits over that slice of the list. Frame `i` covers offsets
/// `[i * h, (i + 1) * h)` where `h` is the viewport height.
///
/// With lazy loading enabled only the first frames exist at first. Scrolling to
/// within one viewport of the bottom materializes one more frame, the way a
/// chat client fetches history.
#[derive(Debug, Clone)]
pub struct ReplayPage {
    url: String,
    frames: Vec<String>,
    viewport_height: f64,
    loaded: usize,
    offset: f64,
    frozen: bool,
    broken: bool,
    document_scroller: bool,
    scroll_calls: usize,
}

impl ReplayPage {
    pub fn new(url: impl Into<String>, frames: Vec<String>, viewport_height: f64) -> Self {
        let loaded = frames.len();
        Self {
            url: url.into(),
            frames,
            viewport_height,
            loaded,
            offset: 0.0,
            frozen: false,
            broken: false,
            document_scroller: true,
            scroll_calls: 0,
        }
    }

    /// Start with only `initially_loaded` frames rendered.
    pub fn with_lazy_loading(mut self, initially_loaded: usize) -> Self {
        self.loaded = initially_loaded.clamp(1, self.frames.len().max(1));
        self
    }

    /// Scrolling requests are accepted but the offset never changes.
    pub fn with_frozen_scroll(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Every scroll request fails, as if the container was torn down.
    pub fn with_broken_scroll(mut self) -> Self {
        self.broken = true;
        self
    }

    /// The document exposes no scrolling element either.
    pub fn without_document_scroller(mut self) -> Self {
        self.document_scroller = false;
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scroll_calls(&self) -> usize {
        self.scroll_calls
    }

    fn scroll_height(&self) -> f64 {
        self.loaded.max(1) as f64 * self.viewport_height
    }

    fn max_offset(&self) -> f64 {
        (self.scroll_height() - self.viewport_height).max(0.0)
    }

    fn current_frame(&self) -> Option<&str> {
        if self.frames.is_empty() || self.viewport_height <= 0.0 {
            return None;
        }
        let index = (self.offset / self.viewport_height).floor() as usize;
        self.frames
            .get(index.min(self.loaded.saturating_sub(1)))
            .map(String::as_str)
    }
}

impl ChatPage for ReplayPage {
    fn page_url(&self) -> String {
        self.url.clone()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn matches(&self, selector: &str) -> bool {
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        let Some(frame) = self.current_frame() else {
            return false;
        };
        let document = Html::parse_document(frame);
        let found = document.select(&selector).next().is_some();
        found
    }

    fn has_document_scroller(&self) -> bool {
        self.document_scroller
    }

    fn metrics(&self, target: &ScrollTarget) -> Result<ScrollMetrics, PageError> {
        if matches!(target, ScrollTarget::Document) && !self.document_scroller {
            return Err(PageError::Detached(target.to_string()));
        }
        Ok(ScrollMetrics {
            scroll_top: self.offset,
            client_height: self.viewport_height,
            scroll_height: self.scroll_height(),
        })
    }

    fn scroll_to(&mut self, target: &ScrollTarget, top: f64) -> Result<(), PageError> {
        self.scroll_calls += 1;
        if self.broken {
            return Err(PageError::Detached(target.to_string()));
        }
        if self.frozen {
            return Ok(());
        }
        self.offset = top.clamp(0.0, self.max_offset());
        let near_bottom =
            self.offset + self.viewport_height >= self.scroll_height() - self.viewport_height;
        if near_bottom && self.loaded < self.frames.len() {
            self.loaded += 1;
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<String, PageError> {
        Ok(self.current_frame().unwrap_or_default().to_string())
    }
}
