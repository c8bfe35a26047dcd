//! Domain types mirroring the backend content API payloads.
//!
//! Every entity here is owned by the backend; the client never mutates
//! these beyond ephemeral view state, and nothing is persisted locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Paginated
// ---------------------------------------------------------------------------

/// A paginated list response: `{count, results}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of records matching the query (not just this page).
    pub count: usize,
    /// Records for the requested page.
    pub results: Vec<T>,
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A blog/FAQ category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Blog posts
// ---------------------------------------------------------------------------

/// A blog post as returned by the list endpoint (no body content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: u64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A blog post as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Raw body — may be HTML or plain text; the render pipeline decides.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub helpful_count: u64,
    #[serde(default)]
    pub not_helpful_count: u64,
}

// ---------------------------------------------------------------------------
// FAQs
// ---------------------------------------------------------------------------

/// An FAQ entry as returned by list/recent endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqSummary {
    pub id: u64,
    pub slug: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// An FAQ entry as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: u64,
    pub slug: String,
    pub question: String,
    /// Raw answer body — may be HTML or plain text.
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub helpful_count: u64,
    #[serde(default)]
    pub not_helpful_count: u64,
}

// ---------------------------------------------------------------------------
// Insurers / company
// ---------------------------------------------------------------------------

/// An insurance company as listed on the reviews index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurerSummary {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// An insurance company review page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insurer {
    pub id: u64,
    pub slug: String,
    pub name: String,
    /// Raw review body — may be HTML or plain text.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Site-wide company info used for headers/footers and contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

/// An admin-configured static page (about, terms, privacy, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPage {
    pub page_type: String,
    pub title: String,
    /// Raw body — may be HTML or plain text.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Request body for the helpful/not-helpful feedback endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackBody {
    pub is_helpful: bool,
    #[serde(default)]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_post_list_deserializes() {
        let json = r#"{
            "count": 95,
            "results": [
                {
                    "id": 1,
                    "slug": "cheapest-rates-by-state",
                    "title": "Cheapest Rates by State",
                    "summary": "Where premiums are lowest.",
                    "category": {"id": 3, "name": "Savings", "slug": "savings"},
                    "author_name": "Staff",
                    "published_at": "2025-03-01T12:00:00Z",
                    "tags": ["rates", "states"]
                }
            ]
        }"#;
        let page: Paginated<PostSummary> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.count, 95);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].slug, "cheapest-rates-by-state");
        assert_eq!(page.results[0].category.as_ref().unwrap().name, "Savings");
    }

    #[test]
    fn post_detail_defaults_counters() {
        let json = r#"{
            "id": 7,
            "slug": "sr22-explained",
            "title": "SR-22 Explained",
            "content": "<p>What an SR-22 actually is.</p>"
        }"#;
        let post: Post = serde_json::from_str(json).expect("deserialize");
        assert_eq!(post.views, 0);
        assert_eq!(post.helpful_count, 0);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn faq_roundtrip() {
        let faq = Faq {
            id: 2,
            slug: "do-i-need-comprehensive".into(),
            question: "Do I need comprehensive coverage?".into(),
            answer: "It depends on your vehicle's value.".into(),
            short_answer: Some("Usually for newer cars.".into()),
            category: None,
            created_at: None,
            helpful_count: 4,
            not_helpful_count: 1,
        };
        let json = serde_json::to_string(&faq).expect("serialize");
        let parsed: Faq = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.question, faq.question);
        assert_eq!(parsed.helpful_count, 4);
    }

    #[test]
    fn company_info_tolerates_empty_object() {
        let info: CompanyInfo = serde_json::from_str("{}").expect("deserialize");
        assert!(info.name.is_none());
    }
}
