use crate::{Reply, TabId, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusLine {
    #[default]
    Ready,
    Scanning,
    Found(usize),
    NothingFound,
    Error(String),
    DownloadsStarted(usize),
    DownloadFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMark {
    #[default]
    NotStarted,
    Started,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub url: String,
    pub mark: DownloadMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupView {
    pub scan_enabled: bool,
    pub download_all_enabled: bool,
    pub status: StatusLine,
    pub items: Vec<ItemRow>,
}

/// Popup-side state for one tab, driven by coordinator events and replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupState {
    tab_id: TabId,
    scanning: bool,
    batch_pending: bool,
    status: StatusLine,
    items: Vec<ItemRow>,
    dirty: bool,
}

impl PopupState {
    pub fn new(tab_id: TabId) -> Self {
        Self {
            tab_id,
            scanning: false,
            batch_pending: false,
            status: StatusLine::Ready,
            items: Vec::new(),
            dirty: false,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn view(&self) -> PopupView {
        PopupView {
            scan_enabled: !self.scanning,
            download_all_enabled: !self.scanning && !self.batch_pending && !self.items.is_empty(),
            status: self.status.clone(),
            items: self.items.clone(),
        }
    }

    /// Returns whether anything changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// User pressed Scan. Returns false while a scan is already running.
    pub fn scan_requested(&mut self) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;
        self.items.clear();
        self.status = StatusLine::Scanning;
        self.dirty = true;
        true
    }

    /// Synchronous reply to START_SCAN; only an error changes anything.
    pub fn scan_request_answered(&mut self, reply: &Reply) {
        if let Reply::Error { message } = reply {
            self.scanning = false;
            self.status = StatusLine::Error(message.clone());
            self.dirty = true;
        }
    }

    pub fn apply_event(&mut self, event: &UiEvent) {
        if event.tab_id() != self.tab_id {
            return;
        }
        match event {
            UiEvent::ScanStarted { .. } => {
                self.scanning = true;
                self.status = StatusLine::Scanning;
            }
            UiEvent::ScanComplete { urls, .. } => {
                self.scanning = false;
                self.set_items(urls);
                self.status = if urls.is_empty() {
                    StatusLine::NothingFound
                } else {
                    StatusLine::Found(urls.len())
                };
            }
            UiEvent::ScanError { message, .. } => {
                self.scanning = false;
                self.status = StatusLine::Error(message.clone());
            }
        }
        self.dirty = true;
    }

    /// Reply to GET_RESULTS_FOR_TAB sent when the popup opens.
    pub fn restore(&mut self, reply: &Reply) {
        if let Reply::Found { data } = reply {
            self.set_items(data.urls());
            self.status = StatusLine::Found(data.urls().len());
            self.dirty = true;
        }
    }

    /// User asked for one item. Returns false if the item is unknown or
    /// already started; failed items may be retried.
    pub fn download_requested(&mut self, url: &str) -> bool {
        match self.items.iter_mut().find(|item| item.url == url) {
            Some(item) if item.mark != DownloadMark::Started => {
                item.mark = DownloadMark::Started;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn download_answered(&mut self, url: &str, reply: &Reply) {
        let failed = reply.is_error();
        if let Some(item) = self.items.iter_mut().find(|item| item.url == url) {
            item.mark = if failed {
                DownloadMark::Failed
            } else {
                DownloadMark::Started
            };
        }
        if let Reply::Error { message } = reply {
            self.status = StatusLine::DownloadFailed(message.clone());
        }
        self.dirty = true;
    }

    /// User pressed Download All. Returns the URLs to send, or `None` when
    /// there is nothing to do or a batch is already pending.
    pub fn batch_requested(&mut self) -> Option<Vec<String>> {
        if self.batch_pending || self.scanning || self.items.is_empty() {
            return None;
        }
        self.batch_pending = true;
        self.dirty = true;
        Some(self.items.iter().map(|item| item.url.clone()).collect())
    }

    pub fn batch_answered(&mut self, reply: &Reply) {
        self.batch_pending = false;
        match reply {
            Reply::Success { count } => {
                let started = count.unwrap_or(self.items.len());
                // The reply does not say which rows failed, so a partial batch marks none.
                if started >= self.items.len() {
                    for item in &mut self.items {
                        item.mark = DownloadMark::Started;
                    }
                }
                self.status = StatusLine::DownloadsStarted(started);
            }
            Reply::Error { message } => {
                self.status = StatusLine::DownloadFailed(message.clone());
            }
            Reply::Received | Reply::Found { .. } | Reply::NotFound => {}
        }
        self.dirty = true;
    }

    fn set_items(&mut self, urls: &[String]) {
        self.items = urls
            .iter()
            .map(|url| ItemRow {
                url: url.clone(),
                mark: DownloadMark::NotStarted,
            })
            .collect();
    }
}
