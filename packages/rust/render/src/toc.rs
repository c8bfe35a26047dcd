//! Table-of-contents entries, heading slugs, and the scroll-position resolver.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// Heading levels that participate in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    /// Tag name for this level.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::H2 => "h2",
            Self::H3 => "h3",
        }
    }

    /// Map a tag name to a TOC level, if it participates in the outline.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            _ => None,
        }
    }
}

/// One entry in a document's outline, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor id assigned to the heading element.
    pub id: String,
    /// Visible heading text.
    pub text: String,
    /// Heading level (h2 or h3).
    pub level: HeadingLevel,
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Compute an anchor slug from heading text: lowercase, strip anything that
/// is not alphanumeric/space/hyphen, collapse whitespace to single hyphens,
/// collapse repeated hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(filtered.len());
    let mut last_hyphen = true;
    for c in filtered.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_hyphen {
                slug.push('-');
                last_hyphen = true;
            }
        } else {
            slug.push(c);
            last_hyphen = false;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Allocates document-unique heading ids, disambiguating collisions with a
/// numeric suffix (`overview`, `overview-1`, `overview-2`, ...).
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashMap<String, usize>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique id for the given heading text.
    pub fn allocate(&mut self, text: &str) -> String {
        let base = {
            let s = slugify(text);
            if s.is_empty() { "section".to_string() } else { s }
        };

        let n = self.seen.entry(base.clone()).or_insert(0);
        let id = if *n == 0 {
            base.clone()
        } else {
            format!("{base}-{n}")
        };
        *n += 1;
        id
    }

    /// Record an id that already exists in the document so generated ids
    /// never collide with it.
    pub fn reserve(&mut self, id: &str) {
        *self.seen.entry(id.to_string()).or_insert(0) += 1;
    }
}

// ---------------------------------------------------------------------------
// Scroll-position resolver
// ---------------------------------------------------------------------------

/// Measured vertical extent of a rendered heading, in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBox {
    /// Anchor id of the heading element.
    pub id: String,
    pub top: f64,
    pub bottom: f64,
}

/// Resolve which TOC entry is "active" for a given viewport.
///
/// The entry whose heading has the greatest visible intersection ratio wins;
/// on ties the earlier heading in document order is preferred. Returns `None`
/// when no heading intersects the viewport.
pub fn active_heading<'a>(
    boxes: &'a [HeadingBox],
    viewport_top: f64,
    viewport_bottom: f64,
) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;

    for hb in boxes {
        let height = (hb.bottom - hb.top).max(f64::EPSILON);
        let visible = (hb.bottom.min(viewport_bottom) - hb.top.max(viewport_top)).max(0.0);
        let ratio = visible / height;
        if ratio <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_ratio)) if ratio <= best_ratio => {}
            _ => best = Some((hb.id.as_str(), ratio)),
        }
    }

    best.map(|(id, _)| id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Overview"), "overview");
        assert_eq!(slugify("How Much Coverage?"), "how-much-coverage");
        assert_eq!(slugify("  Rates — by state  "), "rates-by-state");
        assert_eq!(slugify("A -- B"), "a-b");
    }

    #[test]
    fn slugify_strips_symbols() {
        assert_eq!(slugify("What's an SR-22?"), "whats-an-sr-22");
        assert_eq!(slugify("100% / No-Fault!"), "100-no-fault");
    }

    #[test]
    fn allocator_disambiguates_duplicates() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate("Overview"), "overview");
        assert_eq!(ids.allocate("Overview"), "overview-1");
        assert_eq!(ids.allocate("Overview"), "overview-2");
        assert_eq!(ids.allocate("Details"), "details");
    }

    #[test]
    fn allocator_respects_reserved_ids() {
        let mut ids = IdAllocator::new();
        ids.reserve("overview");
        assert_eq!(ids.allocate("Overview"), "overview-1");
    }

    #[test]
    fn allocator_falls_back_for_symbol_only_text() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate("!!!"), "section");
        assert_eq!(ids.allocate("???"), "section-1");
    }

    #[test]
    fn heading_level_tags() {
        assert_eq!(HeadingLevel::from_tag("h2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_tag("h3"), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_tag("h1"), None);
        assert_eq!(HeadingLevel::H2.tag(), "h2");
    }

    #[test]
    fn active_heading_prefers_greatest_intersection() {
        let boxes = vec![
            HeadingBox {
                id: "intro".into(),
                top: 0.0,
                bottom: 40.0,
            },
            HeadingBox {
                id: "coverage".into(),
                top: 500.0,
                bottom: 540.0,
            },
        ];

        // Viewport fully contains "coverage", clips "intro" to a quarter.
        let active = active_heading(&boxes, 30.0, 700.0);
        assert_eq!(active, Some("coverage"));

        // Viewport above both → only "intro" visible.
        let active = active_heading(&boxes, 0.0, 100.0);
        assert_eq!(active, Some("intro"));
    }

    #[test]
    fn active_heading_tie_prefers_document_order() {
        let boxes = vec![
            HeadingBox {
                id: "first".into(),
                top: 100.0,
                bottom: 140.0,
            },
            HeadingBox {
                id: "second".into(),
                top: 300.0,
                bottom: 340.0,
            },
        ];
        // Both fully visible → ratio 1.0 each → first wins.
        assert_eq!(active_heading(&boxes, 0.0, 1000.0), Some("first"));
    }

    #[test]
    fn active_heading_none_when_nothing_visible() {
        let boxes = vec![HeadingBox {
            id: "only".into(),
            top: 1000.0,
            bottom: 1040.0,
        }];
        assert_eq!(active_heading(&boxes, 0.0, 500.0), None);
    }
}
