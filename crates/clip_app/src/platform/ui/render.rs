use clip_core::{DownloadMark, ItemRow, PopupView, StatusLine};

/// Terminal lines for the popup: status first, then one row per item.
pub fn render(view: &PopupView) -> Vec<String> {
    let mut lines = vec![status_text(&view.status)];
    lines.extend(view.items.iter().enumerate().map(|(i, item)| format_item_row(i, item)));
    if view.download_all_enabled {
        lines.push(format!("[Download All: {} clips]", view.items.len()));
    }
    lines
}

pub fn status_text(status: &StatusLine) -> String {
    match status {
        StatusLine::Ready => "Scan or refresh to find clips.".to_string(),
        StatusLine::Scanning => "Scanning page for clips...".to_string(),
        StatusLine::Found(n) => format!("Found {n} clips. Ready!"),
        StatusLine::NothingFound => "Scan found 0 clips.".to_string(),
        StatusLine::Error(message) => format!("Error: {message}"),
        StatusLine::DownloadsStarted(n) => format!("Download started for {n} clips."),
        StatusLine::DownloadFailed(message) => format!("Download failed: {message}"),
    }
}

fn format_item_row(index: usize, item: &ItemRow) -> String {
    let mark = match item.mark {
        DownloadMark::NotStarted => "    ",
        DownloadMark::Started => "Done",
        DownloadMark::Failed => "ERR ",
    };
    format!("{:>3}. [{mark}] {}", index + 1, item.url)
}
