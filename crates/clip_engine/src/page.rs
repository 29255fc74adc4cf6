//! What the scanner needs from a live chat page. The concrete DOM (or a
//! recording of it) lives behind [`ChatPage`]; nothing outside this seam knows
//! about element handles.

/// Where scrolling happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    /// First element matching this selector.
    Element { selector: String },
    /// The document's own scrolling element.
    Document,
}

impl std::fmt::Display for ScrollTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollTarget::Element { selector } => write!(f, "element `{selector}`"),
            ScrollTarget::Document => write!(f, "document scroller"),
        }
    }
}

/// Scroll geometry in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("scroll target {0} is no longer attached")]
    Detached(String),
    #[error("page access failed: {0}")]
    Access(String),
}

pub trait ChatPage: Send {
    /// URL of the page as the host reports it.
    fn page_url(&self) -> String;

    fn viewport_height(&self) -> f64;

    /// Whether `selector` currently matches an element.
    fn matches(&self, selector: &str) -> bool;

    fn has_document_scroller(&self) -> bool;

    fn metrics(&self, target: &ScrollTarget) -> Result<ScrollMetrics, PageError>;

    fn scroll_to(&mut self, target: &ScrollTarget, top: f64) -> Result<(), PageError>;

    /// Serialized markup of what is rendered right now.
    fn snapshot(&self) -> Result<String, PageError>;
}
