use clip_core::{media_extension_of, MediaKind, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
use url::Url;

use crate::settings::DownloadSettings;

/// Single path segment safe to use as the download folder. Never contains
/// separators or `..`; falls back to the configured default when nothing
/// usable is left.
pub fn sanitize_folder(raw: &str, settings: &DownloadSettings) -> String {
    let joined = raw
        .split(['/', '\\'])
        .map(|segment| segment.trim().trim_matches('.'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let mut cleaned = replace_forbidden(&joined);
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = collapse_underscores(cleaned.trim_matches(&['_', ' ', '.'][..]));
    let mut folder = truncate_chars(&cleaned, settings.max_folder_len)
        .trim_end_matches(&['_', ' ', '.'][..])
        .to_string();

    if folder.is_empty() {
        return settings.default_folder.clone();
    }
    if is_reserved_windows_name(&folder) {
        folder.push('_');
    }
    folder
}

/// File name for `url`: the decoded last path segment when it looks like a
/// file, otherwise `clip-{short_hash(url)}`. A media extension is always
/// present: kept from the name, else inferred from the URL, else the default.
pub fn derive_filename(url: &str, settings: &DownloadSettings) -> String {
    let candidate = last_segment(url)
        .map(|segment| {
            let decoded = percent_decode_str(&segment).decode_utf8_lossy().into_owned();
            sanitize_name(&decoded)
        })
        .filter(|name| looks_like_file(name));

    let name = candidate.unwrap_or_else(|| format!("clip-{}", short_hash(url)));
    if has_known_extension(&name) {
        return cap_name(&name, settings.max_filename_len);
    }

    let extension =
        infer_extension(url).unwrap_or_else(|| settings.default_extension.trim_matches('.').to_string());
    let suffix = format!(".{extension}");
    let stem_budget = settings.max_filename_len.saturating_sub(suffix.len()).max(1);
    format!("{}{suffix}", truncate_chars(&name, stem_budget))
}

/// `{folder}/{file}` relative to the download root.
pub fn download_path(url: &str, raw_folder: &str, settings: &DownloadSettings) -> String {
    format!(
        "{}/{}",
        sanitize_folder(raw_folder, settings),
        derive_filename(url, settings)
    )
}

fn last_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn looks_like_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty() && name.chars().count() > 3,
        None => false,
    }
}

fn has_known_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .chain(IMAGE_EXTENSIONS)
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Looks for a known media extension on the last path segment, then in the
/// query (`?format=webm`, `?f=clip.mp4`).
fn infer_extension(url: &str) -> Option<String> {
    for kind in [MediaKind::Video, MediaKind::Image] {
        if let Some(ext) = media_extension_of(url, kind) {
            return Some(ext);
        }
    }
    let lower = url.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .chain(IMAGE_EXTENSIONS)
        .find(|ext| {
            [".", "="].iter().any(|lead| {
                let needle = format!("{lead}{ext}");
                lower.match_indices(&needle).any(|(idx, _)| {
                    lower[idx + needle.len()..]
                        .chars()
                        .next()
                        .map_or(true, |next| !next.is_ascii_alphanumeric())
                })
            })
        })
        .map(|ext| ext.to_string())
}

fn sanitize_name(input: &str) -> String {
    let cleaned: String = replace_forbidden(input)
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let compacted = collapse_underscores(cleaned.trim_matches(&['_', ' '][..]));
    let trimmed = compacted.trim_start_matches('.');
    let mut name = trimmed.to_string();
    if let Some((stem, _)) = name.rsplit_once('.') {
        if is_reserved_windows_name(stem) {
            name.insert(stem.len(), '_');
        }
    }
    name
}

fn cap_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            let budget = max_len.saturating_sub(ext.chars().count() + 1).max(1);
            format!("{}.{ext}", truncate_chars(stem, budget))
        }
        None => truncate_chars(name, max_len),
    }
}

fn replace_forbidden(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn collapse_underscores(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    compacted
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
