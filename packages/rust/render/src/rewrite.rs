//! HTML rewrite pass: presentation-class injection and heading ids.
//!
//! The fragment is parsed into a real tree and re-serialized by a visitor,
//! so irregular or nested markup can never confuse the transformation the
//! way text-level substitution could. Each supported tag gains its class
//! set, media tags are wrapped in layout containers, and `h2`/`h3` headings
//! receive document-unique anchor ids which are collected into the TOC.
//!
//! The pass is meant to run exactly once per fragment; re-running it would
//! append the class sets again.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::normalize::escape_text;
use crate::toc::{HeadingLevel, IdAllocator, TocEntry};

// ---------------------------------------------------------------------------
// Class tables
// ---------------------------------------------------------------------------

/// Classes appended to each supported tag. Tags not listed pass through.
fn injected_classes(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "h1" => "text-4xl font-bold text-gray-900 mt-12 mb-6 leading-tight border-b-2 border-red-100 pb-4",
        "h2" => "text-3xl font-bold text-gray-900 mt-10 mb-5 leading-tight",
        "h3" => "text-2xl font-semibold text-gray-900 mt-8 mb-4 leading-tight",
        "h4" => "text-xl font-semibold text-gray-900 mt-6 mb-3 leading-tight",
        "h5" => "text-lg font-semibold text-gray-900 mt-6 mb-3 leading-tight",
        "h6" => "text-base font-semibold text-gray-900 mt-4 mb-2 leading-tight",
        "p" => "mb-6 leading-relaxed text-gray-800",
        "img" => "w-full h-auto rounded-xl shadow-lg max-w-full mx-auto",
        "video" => "w-full h-auto",
        "iframe" => "absolute inset-0 w-full h-full",
        "ul" | "ol" => "mb-6 pl-6 space-y-2",
        "li" => "text-gray-800 leading-relaxed",
        "blockquote" => {
            "border-l-4 border-red-500 pl-6 py-4 my-8 bg-gray-50 rounded-r-lg italic text-gray-700"
        }
        "a" => "text-blue-600 hover:text-blue-700 underline underline-offset-2",
        "table" => "min-w-full bg-white border border-gray-200 rounded-lg shadow-sm",
        "th" => {
            "px-6 py-3 bg-gray-50 text-left text-xs font-medium text-gray-500 uppercase tracking-wider border-b"
        }
        "td" => "px-6 py-4 whitespace-nowrap text-sm text-gray-900 border-b",
        "pre" => "bg-gray-900 text-gray-100 p-6 rounded-lg overflow-x-auto my-8 text-sm",
        "code" => "bg-gray-100 text-red-600 px-2 py-1 rounded text-sm font-mono",
        _ => return None,
    })
}

/// Layout container classes for tags that get wrapped in a `<div>`.
/// The wrapper opens immediately before the tag and closes immediately
/// after it, one wrapper per element.
fn wrapper_classes(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "img" => "my-8",
        "video" => "relative w-full my-8 rounded-xl overflow-hidden shadow-lg",
        "iframe" => "relative w-full aspect-video my-8 rounded-xl overflow-hidden shadow-lg",
        "table" => "overflow-x-auto my-8",
        _ => return None,
    })
}

/// Void elements serialize without a closing tag.
fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

// ---------------------------------------------------------------------------
// Rewrite pass
// ---------------------------------------------------------------------------

/// Output of the rewrite pass.
#[derive(Debug, Clone)]
pub struct RewrittenFragment {
    /// The serialized fragment with classes, wrappers, and heading ids.
    pub html: String,
    /// Outline entries for every `h2`/`h3`, in document order.
    pub toc: Vec<TocEntry>,
}

/// Parse a fragment and re-serialize it with presentation classes injected.
pub fn rewrite_fragment(fragment: &str) -> RewrittenFragment {
    let doc = Html::parse_fragment(fragment);

    let mut ids = IdAllocator::new();
    // Ids already present in the source must stay unique against ours.
    for node in doc.root_element().descendants() {
        if let Node::Element(el) = node.value() {
            if let Some(id) = el.attr("id") {
                ids.reserve(id);
            }
        }
    }

    let mut out = String::with_capacity(fragment.len() + fragment.len() / 2);
    let mut toc = Vec::new();

    for child in doc.root_element().children() {
        serialize_node(child, &mut ids, &mut toc, &mut out);
    }

    RewrittenFragment { html: out, toc }
}

fn serialize_node(
    node: NodeRef<'_, Node>,
    ids: &mut IdAllocator,
    toc: &mut Vec<TocEntry>,
    out: &mut String,
) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment);
            out.push_str("-->");
        }
        Node::Element(_) => serialize_element(node, ids, toc, out),
        // Doctype/PI have no place in a body fragment.
        _ => {}
    }
}

fn serialize_element(
    node: NodeRef<'_, Node>,
    ids: &mut IdAllocator,
    toc: &mut Vec<TocEntry>,
    out: &mut String,
) {
    let Node::Element(el) = node.value() else {
        return;
    };
    let tag = el.name();

    if let Some(wrapper) = wrapper_classes(tag) {
        out.push_str("<div class=\"");
        out.push_str(wrapper);
        out.push_str("\">");
    }

    // Outline headings get a document-unique anchor id (existing ids win).
    let mut heading_id: Option<String> = None;
    if let Some(level) = HeadingLevel::from_tag(tag) {
        let text = ElementRef::wrap(node)
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default();
        let text = text.trim().to_string();
        if !text.is_empty() {
            let id = match el.attr("id") {
                Some(existing) => existing.to_string(),
                None => ids.allocate(&text),
            };
            toc.push(TocEntry {
                id: id.clone(),
                text,
                level,
            });
            heading_id = Some(id);
        }
    }

    out.push('<');
    out.push_str(tag);

    let extra = injected_classes(tag);
    let mut class_written = false;

    for (name, value) in el.attrs() {
        if name == "id" && heading_id.is_some() {
            continue;
        }
        if name == "class" {
            let merged = match extra {
                Some(extra) if !value.is_empty() => format!("{value} {extra}"),
                Some(extra) => extra.to_string(),
                None => value.to_string(),
            };
            push_attr(out, "class", &merged);
            class_written = true;
        } else {
            push_attr(out, name, value);
        }
    }

    if let Some(extra) = extra {
        if !class_written {
            push_attr(out, "class", extra);
        }
    }
    if let Some(id) = &heading_id {
        push_attr(out, "id", id);
    }

    // Media niceties: lazy-load images, always give videos controls.
    if tag == "img" && el.attr("loading").is_none() {
        push_attr(out, "loading", "lazy");
    }
    if tag == "video" && el.attr("controls").is_none() {
        out.push_str(" controls");
    }

    out.push('>');

    if !is_void(tag) {
        for child in node.children() {
            serialize_node(child, ids, toc, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    if wrapper_classes(tag).is_some() {
        out.push_str("</div>");
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_gains_classes() {
        let result = rewrite_fragment("<p>Liability limits vary.</p>");
        assert_eq!(
            result.html,
            r#"<p class="mb-6 leading-relaxed text-gray-800">Liability limits vary.</p>"#
        );
    }

    #[test]
    fn every_supported_tag_gains_a_class() {
        let cases = [
            ("<h1>t</h1>", "<h1 class=\"text-4xl"),
            ("<h2>t</h2>", "<h2 class=\"text-3xl"),
            ("<h3>t</h3>", "<h3 class=\"text-2xl"),
            ("<h4>t</h4>", "<h4 class=\"text-xl"),
            ("<h5>t</h5>", "<h5 class=\"text-lg"),
            ("<h6>t</h6>", "<h6 class=\"text-base"),
            ("<ul><li>t</li></ul>", "<ul class=\"mb-6 pl-6"),
            ("<ol><li>t</li></ol>", "<ol class=\"mb-6 pl-6"),
            ("<ul><li>t</li></ul>", "<li class=\"text-gray-800"),
            ("<blockquote>t</blockquote>", "<blockquote class=\"border-l-4"),
            ("<p><a href=\"/x\">t</a></p>", "<a href=\"/x\" class=\"text-blue-600"),
            ("<pre>t</pre>", "<pre class=\"bg-gray-900"),
            ("<p><code>t</code></p>", "<code class=\"bg-gray-100"),
        ];
        for (input, expected) in cases {
            let result = rewrite_fragment(input);
            assert!(
                result.html.contains(expected),
                "input {input:?} produced {:?}, expected to contain {expected:?}",
                result.html
            );
        }
    }

    #[test]
    fn existing_classes_are_preserved_and_extended() {
        let result = rewrite_fragment(r#"<p class="intro">Hello</p>"#);
        assert!(
            result
                .html
                .contains(r#"class="intro mb-6 leading-relaxed text-gray-800""#)
        );
    }

    #[test]
    fn unsupported_tags_pass_through() {
        let result = rewrite_fragment("<section><span data-note=\"1\">x</span></section>");
        assert_eq!(
            result.html,
            "<section><span data-note=\"1\">x</span></section>"
        );
    }

    #[test]
    fn img_is_wrapped_and_lazy_loaded() {
        let result = rewrite_fragment(r#"<img src="chart.png" alt="Chart">"#);
        assert!(result.html.starts_with(r#"<div class="my-8"><img"#));
        assert!(result.html.contains(r#"loading="lazy""#));
        assert!(result.html.contains("w-full h-auto rounded-xl"));
        assert!(result.html.ends_with("</div>"));
        // img is void: no closing tag
        assert!(!result.html.contains("</img>"));
    }

    #[test]
    fn img_existing_loading_attr_is_kept() {
        let result = rewrite_fragment(r#"<img src="x.png" loading="eager">"#);
        assert!(result.html.contains(r#"loading="eager""#));
        assert_eq!(result.html.matches("loading=").count(), 1);
    }

    #[test]
    fn video_gets_container_and_controls() {
        let result = rewrite_fragment(r#"<video src="demo.mp4"></video>"#);
        assert!(
            result
                .html
                .starts_with(r#"<div class="relative w-full my-8 rounded-xl overflow-hidden shadow-lg">"#)
        );
        assert!(result.html.contains(" controls"));
        assert!(result.html.ends_with("</video></div>"));
    }

    #[test]
    fn iframe_gets_aspect_container() {
        let result = rewrite_fragment(r#"<iframe src="https://example.com/embed"></iframe>"#);
        assert!(result.html.contains("aspect-video"));
        assert!(result.html.contains("absolute inset-0 w-full h-full"));
    }

    #[test]
    fn each_table_gets_its_own_wrapper() {
        let input = "<table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table>";
        let result = rewrite_fragment(input);
        assert_eq!(
            result
                .html
                .matches(r#"<div class="overflow-x-auto my-8"><table"#)
                .count(),
            2,
            "each table opens its own wrapper: {}",
            result.html
        );
        assert_eq!(
            result.html.matches("</table></div>").count(),
            2,
            "each wrapper closes right after its table: {}",
            result.html
        );
    }

    #[test]
    fn table_cells_are_styled() {
        let input = "<table><thead><tr><th>Name</th></tr></thead><tbody><tr><td>foo</td></tr></tbody></table>";
        let result = rewrite_fragment(input);
        assert!(result.html.contains("<th class=\"px-6 py-3 bg-gray-50"));
        assert!(result.html.contains("<td class=\"px-6 py-4 whitespace-nowrap"));
        assert!(result.html.contains("min-w-full bg-white"));
    }

    #[test]
    fn headings_receive_unique_ids() {
        let input = "<h2>Overview</h2><p>a</p><h2>Overview</h2><p>b</p>";
        let result = rewrite_fragment(input);
        assert!(result.html.contains(r#"id="overview""#));
        assert!(result.html.contains(r#"id="overview-1""#));
        assert_eq!(result.toc.len(), 2);
        assert_eq!(result.toc[0].id, "overview");
        assert_eq!(result.toc[1].id, "overview-1");
    }

    #[test]
    fn toc_covers_h2_and_h3_only_in_document_order() {
        let input = "<h1>Title</h1><h2>Coverage</h2><h3>Liability</h3><h4>Fine print</h4><h2>Costs</h2>";
        let result = rewrite_fragment(input);
        let ids: Vec<&str> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["coverage", "liability", "costs"]);
        assert_eq!(result.toc[0].level, HeadingLevel::H2);
        assert_eq!(result.toc[1].level, HeadingLevel::H3);
        // h1/h4 get classes but never ids
        assert!(!result.html.contains(r#"<h1 class="text-4xl font-bold text-gray-900 mt-12 mb-6 leading-tight border-b-2 border-red-100 pb-4" id="#));
    }

    #[test]
    fn existing_heading_id_is_kept() {
        let input = r#"<h2 id="keep-me">Overview</h2><h2>Keep me</h2>"#;
        let result = rewrite_fragment(input);
        assert!(result.html.contains(r#"id="keep-me""#));
        assert_eq!(result.toc[0].id, "keep-me");
        // generated id for the second heading must not collide
        assert_eq!(result.toc[1].id, "keep-me-1");
    }

    #[test]
    fn empty_heading_gets_no_id_or_toc_entry() {
        let result = rewrite_fragment("<h2></h2><p>body</p>");
        assert!(result.toc.is_empty());
        assert!(!result.html.contains("id="));
    }

    #[test]
    fn nested_markup_is_not_cross_wrapped() {
        let input = "<blockquote><p>Quote with <a href=\"/x\">link</a>.</p></blockquote>";
        let result = rewrite_fragment(input);
        assert!(result.html.starts_with("<blockquote class=\"border-l-4"));
        assert!(result.html.ends_with("</p></blockquote>"));
    }

    #[test]
    fn text_nodes_are_escaped_on_output() {
        let result = rewrite_fragment("<p>Fees &amp; charges</p>");
        assert!(result.html.contains("Fees &amp; charges"));
        assert!(!result.html.contains("&amp;amp;"));
    }
}
