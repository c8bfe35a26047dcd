//! Rich-content rendering pipeline.
//!
//! Backend documents arrive with a `content` body that is either real HTML
//! or plain text. This crate turns that body into a display-ready fragment:
//!
//! 1. [`normalize`] — classify the body and, when it is plain text (or HTML
//!    that is effectively plain text), segment it into heading/paragraph/list
//!    blocks.
//! 2. [`rewrite`] — parse the fragment and re-serialize it with presentation
//!    classes injected and media wrapped in layout containers, assigning
//!    stable ids to `h2`/`h3` headings along the way.
//! 3. [`toc`] — the table-of-contents entries collected during the rewrite,
//!    plus the scroll-position resolver used to highlight the active entry.

pub mod normalize;
pub mod rewrite;
pub mod toc;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

pub use rewrite::rewrite_fragment;
pub use toc::{HeadingBox, HeadingLevel, TocEntry, active_heading, slugify};

/// Words-per-minute assumed when estimating reading time.
const WORDS_PER_MINUTE: usize = 200;

// ---------------------------------------------------------------------------
// RenderedDocument
// ---------------------------------------------------------------------------

/// The final output of the rendering pipeline for one document body.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Display-ready HTML fragment, safe to embed as-is.
    pub html: String,
    /// Heading outline in document order (h2/h3 only).
    pub toc: Vec<TocEntry>,
    /// Estimated reading time in minutes (always at least 1).
    pub reading_time_min: u32,
    /// Word count of the body text, tags excluded.
    pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Run the full pipeline on a raw document body.
///
/// Never fails: malformed input degrades to over- or under-segmentation,
/// and empty input yields a fallback paragraph.
#[instrument(skip_all, fields(raw_len = raw.len()))]
pub fn render_document(raw: &str) -> RenderedDocument {
    let normalized = normalize::normalize(raw);
    let rewritten = rewrite::rewrite_fragment(&normalized);

    let word_count = count_words(&normalized);
    let reading_time_min = reading_time_minutes(word_count);

    debug!(
        word_count,
        headings = rewritten.toc.len(),
        out_len = rewritten.html.len(),
        "document rendered"
    );

    RenderedDocument {
        html: rewritten.html,
        toc: rewritten.toc,
        reading_time_min,
        word_count,
    }
}

/// Count words in an HTML fragment, ignoring tags.
pub fn count_words(html: &str) -> usize {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    TAG_RE
        .replace_all(html, " ")
        .split_whitespace()
        .count()
}

/// Estimate reading time from a word count. Minimum one minute.
pub fn reading_time_minutes(word_count: usize) -> u32 {
    (word_count.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}
