use std::collections::HashSet;

use clip_core::{has_media_extension, MediaKind};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub trait MediaExtractor: Send + Sync {
    /// Media URLs present in `html`, in document order, without repeats.
    fn extract(&self, html: &str, kind: MediaKind) -> Vec<String>;
}

/// Reads media from rendered chat markup:
/// - `<video>`: its `src`, else the first nested `<source src>`
/// - `<img>` (image scans only): its `src`
/// - `<a href>` attachments whose path ends in a known extension for the kind
///
/// Only absolute `http`/`https` URLs survive; inline video elements may also
/// yield `blob:` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlMediaExtractor;

impl MediaExtractor for HtmlMediaExtractor {
    fn extract(&self, html: &str, kind: MediaKind) -> Vec<String> {
        let document = Html::parse_document(html);
        let (Ok(candidates), Ok(source_sel)) =
            (Selector::parse("video, img, a[href]"), Selector::parse("source[src]"))
        else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for element in document.select(&candidates) {
            let found = match (element.value().name(), kind) {
                ("video", MediaKind::Video) => video_source(element, &source_sel)
                    .filter(|src| is_accepted(src, &["http", "https", "blob"])),
                ("img", MediaKind::Image) => attr(element, "src")
                    .filter(|src| is_accepted(src, &["http", "https"])),
                ("a", _) => attr(element, "href").filter(|href| {
                    is_accepted(href, &["http", "https"]) && has_media_extension(href, kind)
                }),
                _ => None,
            };
            if let Some(url) = found {
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }
        urls
    }
}

/// A direct `src` on the `<video>` wins over nested `<source>` children.
fn video_source(video: ElementRef, source_sel: &Selector) -> Option<String> {
    attr(video, "src").or_else(|| {
        video
            .select(source_sel)
            .next()
            .and_then(|source| attr(source, "src"))
    })
}

fn attr(element: ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_accepted(candidate: &str, schemes: &[&str]) -> bool {
    Url::parse(candidate)
        .map(|url| schemes.contains(&url.scheme()))
        .unwrap_or(false)
}
