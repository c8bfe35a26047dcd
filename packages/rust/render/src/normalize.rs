//! Plain-text-to-HTML normalizer.
//!
//! Backend bodies are either real HTML or unstructured text (sometimes text
//! dressed up with `<br>` tags). Structured HTML passes through untouched;
//! everything else is segmented into heading/paragraph/list blocks using
//! line- and sentence-level heuristics. The thresholds below are content
//! heuristics, tunable, not contracts.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Sentences grouped into one paragraph in sentence mode.
const SENTENCES_PER_PARAGRAPH: usize = 2;

/// Flush a sentence-mode paragraph once it grows past this many chars.
const PARAGRAPH_CHAR_BUDGET: usize = 240;

/// Max length for a lead group promoted to a heading.
const LEAD_HEADING_MAX_LEN: usize = 80;

/// Max length for a punctuation-terminated heading-like line.
const HEADING_PUNCT_MAX_LEN: usize = 100;

/// Word/length caps for the all-caps heading rule.
const HEADING_ALLCAPS_MAX_WORDS: usize = 8;
const HEADING_ALLCAPS_MAX_LEN: usize = 80;

/// Max length for a short unpunctuated heading-like line.
const HEADING_SHORT_MAX_LEN: usize = 60;

/// HTML with no block tags counts as unstructured once its text exceeds this.
const UNSTRUCTURED_TEXT_THRESHOLD: usize = 400;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Normalize a raw document body into a structured HTML fragment.
///
/// Structured HTML (anything with at least one block-level tag) is returned
/// unchanged. Plain text, and HTML that is effectively plain text (`<br>`
/// soup or one long untagged run), is segmented into blocks. Always returns
/// a fragment; empty input yields a fallback paragraph.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<p>No content available.</p>".to_string();
    }

    if !looks_like_html(trimmed) {
        return plain_text_to_html(trimmed);
    }

    if is_mostly_unstructured(trimmed) {
        let text = flatten_to_text(trimmed);
        if text.is_empty() {
            return "<p>No content available.</p>".to_string();
        }
        return plain_text_to_html(&text);
    }

    raw.to_string()
}

/// True if the string contains a real tag open: `<` followed by a letter,
/// `!`, or `/`.
pub fn looks_like_html(s: &str) -> bool {
    static TAG_OPEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[A-Za-z!/]").expect("valid regex"));
    TAG_OPEN_RE.is_match(s)
}

/// HTML with tags but no block-level structure: only `<br>`s or one long
/// uninterrupted text run. Such bodies are treated as plain text.
fn is_mostly_unstructured(html: &str) -> bool {
    static BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "p, ul, ol, table, pre, blockquote, img, figure, iframe, video, h1, h2, h3, h4, h5, h6",
        )
        .expect("valid selector")
    });

    let doc = Html::parse_fragment(html);
    if doc.select(&BLOCK_SEL).next().is_some() {
        return false;
    }

    let br_sel = Selector::parse("br").expect("valid selector");
    let br_count = doc.select(&br_sel).count();
    let text_len: usize = doc.root_element().text().map(|t| t.trim().len()).sum();

    br_count > 0 || text_len > UNSTRUCTURED_TEXT_THRESHOLD
}

/// Strip tags from unstructured HTML, converting `<br>` to newlines and
/// decoding the common entities so the text can be re-escaped cleanly.
fn flatten_to_text(html: &str) -> String {
    static BR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    let with_newlines = BR_RE.replace_all(html, "\n");
    let stripped = TAG_RE.replace_all(&with_newlines, "");
    unescape_entities(stripped.trim())
}

// ---------------------------------------------------------------------------
// Plain-text segmentation
// ---------------------------------------------------------------------------

/// Segment plain text into an HTML fragment.
///
/// Text with fewer than two newlines is segmented by sentence boundaries;
/// anything longer is processed line-by-line with bullet/numbered/heading
/// detection.
pub fn plain_text_to_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let newline_count = text.matches('\n').count();

    let html = if newline_count < 2 {
        sentence_mode(text.trim())
    } else {
        line_mode(&text)
    };

    if html.is_empty() {
        "<p>No content available.</p>".to_string()
    } else {
        html
    }
}

/// Segment a short, newline-free run by sentence boundaries.
///
/// A lead label (`Key Facts: ...`) or a short colon-terminated first group
/// is promoted to a section heading; the remaining sentences are grouped
/// two per paragraph (or until the paragraph budget is hit).
fn sentence_mode(text: &str) -> String {
    let mut html = String::new();
    let mut body = text;

    // Lead label: text up to the first colon, when it is short and contains
    // no sentence terminator of its own, heads the whole run.
    if let Some(colon) = text.find(':') {
        let label = text[..colon].trim();
        let after = text[colon + 1..].trim();
        if !label.is_empty()
            && label.len() <= LEAD_HEADING_MAX_LEN
            && !label.contains(['.', '!', '?'])
            && !after.is_empty()
        {
            html.push_str("<h2>");
            html.push_str(&escape_text(label));
            html.push_str("</h2>");
            body = &text[colon + 1..];
        }
    }

    let mut paragraphs = group_sentences(body);

    // Promote a short colon-terminated first group when no lead label fired.
    let promote_first = html.is_empty()
        && paragraphs.first().is_some_and(|first| {
            first.len() <= LEAD_HEADING_MAX_LEN && first.trim_end().ends_with(':')
        });
    if promote_first {
        let first = paragraphs.remove(0);
        let heading = first.trim_end().trim_end_matches(':').trim_end();
        html.push_str("<h2>");
        html.push_str(&escape_text(heading));
        html.push_str("</h2>");
    }

    for p in &paragraphs {
        html.push_str("<p>");
        html.push_str(&escape_text(p));
        html.push_str("</p>");
    }

    html
}

/// Group sentences two-at-a-time (or until the char budget) into paragraphs.
fn group_sentences(text: &str) -> Vec<String> {
    static SENTENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+|[^.!?]+$").expect("valid regex"));

    let mut groups = Vec::new();
    let mut buf = String::new();
    let mut count = 0;

    for m in SENTENCE_RE.find_iter(text) {
        let sentence = m.as_str().trim();
        if sentence.is_empty() {
            continue;
        }
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(sentence);
        count += 1;
        if count >= SENTENCES_PER_PARAGRAPH || buf.len() > PARAGRAPH_CHAR_BUDGET {
            groups.push(std::mem::take(&mut buf));
            count = 0;
        }
    }

    if !buf.trim().is_empty() {
        groups.push(buf.trim().to_string());
    }

    groups
}

/// Line-by-line segmentation for multi-line text.
fn line_mode(text: &str) -> String {
    #[derive(PartialEq)]
    enum ListKind {
        Bulleted,
        Numbered,
    }

    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    let close_list = |html: &mut String, open: &mut Option<ListKind>| {
        match open.take() {
            Some(ListKind::Bulleted) => html.push_str("</ul>"),
            Some(ListKind::Numbered) => html.push_str("</ol>"),
            None => {}
        }
    };

    let lines: Vec<&str> = text.lines().collect();

    for (i, raw_line) in lines.iter().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            // Blank line: close any open list and break the paragraph flow.
            close_list(&mut html, &mut open_list);
            continue;
        }

        if let Some(item) = strip_bullet_marker(line) {
            if open_list != Some(ListKind::Bulleted) {
                close_list(&mut html, &mut open_list);
                html.push_str("<ul>");
                open_list = Some(ListKind::Bulleted);
            }
            html.push_str("<li>");
            html.push_str(&escape_text(item));
            html.push_str("</li>");
            continue;
        }

        if let Some(item) = strip_number_marker(line) {
            if open_list != Some(ListKind::Numbered) {
                close_list(&mut html, &mut open_list);
                html.push_str("<ol>");
                open_list = Some(ListKind::Numbered);
            }
            html.push_str("<li>");
            html.push_str(&escape_text(item));
            html.push_str("</li>");
            continue;
        }

        close_list(&mut html, &mut open_list);

        let has_following_content = lines[i + 1..].iter().any(|l| !l.trim().is_empty());
        if is_heading_like(line, has_following_content) {
            if line.ends_with(':') {
                html.push_str("<h2>");
                html.push_str(&escape_text(line.trim_end_matches(':').trim_end()));
                html.push_str("</h2>");
            } else {
                html.push_str("<h3>");
                html.push_str(&escape_text(line));
                html.push_str("</h3>");
            }
        } else {
            html.push_str("<p>");
            html.push_str(&escape_text(line));
            html.push_str("</p>");
        }
    }

    close_list(&mut html, &mut open_list);
    html
}

/// Bullet list item: `-`, `*`, or `•` followed by whitespace.
fn strip_bullet_marker(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Numbered list item: digits, a dot, then whitespace.
fn strip_number_marker(line: &str) -> Option<&str> {
    static NUMBERED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid regex"));
    NUMBERED_RE.find(line).map(|m| line[m.end()..].trim_start())
}

/// Heading detection for line mode.
///
/// A bare short line only reads as a heading when something follows it;
/// a trailing fragment at the end of the text is body copy.
fn is_heading_like(line: &str, has_following_content: bool) -> bool {
    if (line.ends_with(':') || line.ends_with('.')) && line.len() <= HEADING_PUNCT_MAX_LEN {
        return true;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let all_caps = !words.is_empty()
        && words.len() <= HEADING_ALLCAPS_MAX_WORDS
        && words
            .iter()
            .all(|w| w.chars().any(|c| c.is_alphabetic()) && *w == w.to_uppercase());
    if all_caps && line.len() <= HEADING_ALLCAPS_MAX_LEN {
        return true;
    }

    has_following_content
        && line.len() <= HEADING_SHORT_MAX_LEN
        && !line.ends_with(['.', '!', '?'])
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// HTML-escape literal text before wrapping it in generated tags.
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the handful of entities that show up in flattened CMS bodies.
fn unescape_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
