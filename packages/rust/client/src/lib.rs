//! Typed client for the backend content API.
//!
//! The backend is the sole source of truth for all displayed content: blog
//! posts, FAQs, insurer reviews, and admin-configured static pages. Every
//! method is an independent async call; nothing is cached or persisted, and
//! no retry is attempted — a failed request is surfaced to the caller and
//! stays failed until re-issued.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use quotelane_shared::{
    CompanyInfo, Faq, FaqSummary, FeedbackBody, Insurer, InsurerSummary, Paginated, Post,
    PostSummary, QuotelaneError, Result, SiteConfig, StaticPage,
};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("quotelane/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Cap on error-body text carried into an error value.
const ERROR_BODY_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// PostQuery
// ---------------------------------------------------------------------------

/// Query parameters for the paginated post list endpoint.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Page size.
    pub limit: Option<u32>,
    /// Zero-based record offset.
    pub offset: Option<u32>,
    /// Filter by category id.
    pub category: Option<u64>,
    /// Filter by category name.
    pub category_name: Option<String>,
    /// Full-text search term.
    pub search: Option<String>,
}

impl PostQuery {
    /// A query for one page of results.
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..Self::default()
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(name) = &self.category_name {
            pairs.push(("category__name", name.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the backend content API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client from the site configuration.
    ///
    /// Fails fast when the base URL is missing or malformed — this is the
    /// fatal-startup check, not something to defer to the first request.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(&config.api_base_url)
            .map_err(|e| QuotelaneError::config(format!("invalid api_base_url: {e}")))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuotelaneError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base })
    }

    // --- Blog posts ---

    /// Fetch a page of blog posts.
    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Paginated<PostSummary>> {
        let url = self.endpoint("api/blog/posts/")?;
        self.get_json(url, &query.query_pairs()).await
    }

    /// Fetch a single blog post by slug.
    #[instrument(skip(self))]
    pub async fn get_post(&self, slug: &str) -> Result<Post> {
        ensure_slug("blog post", slug)?;
        let url = self.endpoint(&format!("api/blog/posts/{slug}/"))?;
        self.get_detail(url, "blog post", slug).await
    }

    /// Record a view on a post. Callers treat failures as non-fatal.
    #[instrument(skip(self))]
    pub async fn increment_views(&self, slug: &str) -> Result<()> {
        ensure_slug("blog post", slug)?;
        let url = self.endpoint(&format!("api/blog/posts/{slug}/increment-views/"))?;
        self.post_empty(url).await
    }

    /// Submit helpful/not-helpful feedback on a post.
    #[instrument(skip(self))]
    pub async fn post_feedback(&self, slug: &str, is_helpful: bool, comment: &str) -> Result<()> {
        ensure_slug("blog post", slug)?;
        let url = self.endpoint(&format!("api/blog/posts/{slug}/feedback/"))?;
        self.post_json(
            url,
            &FeedbackBody {
                is_helpful,
                comment: comment.to_string(),
            },
        )
        .await
    }

    // --- FAQs ---

    /// Fetch all FAQs.
    #[instrument(skip(self))]
    pub async fn list_faqs(&self) -> Result<Vec<FaqSummary>> {
        let url = self.endpoint("api/faq/api/faqs/")?;
        self.get_json(url, &[]).await
    }

    /// Fetch the most recent FAQs.
    #[instrument(skip(self))]
    pub async fn recent_faqs(&self, limit: u32) -> Result<Vec<FaqSummary>> {
        let url = self.endpoint("api/faq/api/faqs/recent/")?;
        self.get_json(url, &[("limit", limit.to_string())]).await
    }

    /// Fetch a single FAQ by slug.
    #[instrument(skip(self))]
    pub async fn get_faq(&self, slug: &str) -> Result<Faq> {
        ensure_slug("FAQ", slug)?;
        let url = self.endpoint(&format!("api/faq/api/faqs/{slug}/"))?;
        self.get_detail(url, "FAQ", slug).await
    }

    /// Submit helpful/not-helpful feedback on an FAQ.
    #[instrument(skip(self))]
    pub async fn faq_feedback(&self, slug: &str, is_helpful: bool, comment: &str) -> Result<()> {
        ensure_slug("FAQ", slug)?;
        let url = self.endpoint(&format!("api/faq/api/faqs/{slug}/feedback/"))?;
        self.post_json(
            url,
            &FeedbackBody {
                is_helpful,
                comment: comment.to_string(),
            },
        )
        .await
    }

    // --- Company / insurers ---

    /// Fetch site-wide company info (headers, footers, contact details).
    #[instrument(skip(self))]
    pub async fn company_info(&self) -> Result<CompanyInfo> {
        let url = self.endpoint("api/company/")?;
        self.get_json(url, &[]).await
    }

    /// Fetch the insurer review index.
    #[instrument(skip(self))]
    pub async fn list_insurers(&self) -> Result<Vec<InsurerSummary>> {
        let url = self.endpoint("api/company/insurers/")?;
        self.get_json(url, &[]).await
    }

    /// Fetch a single insurer review by slug.
    #[instrument(skip(self))]
    pub async fn get_insurer(&self, slug: &str) -> Result<Insurer> {
        ensure_slug("insurer", slug)?;
        let url = self.endpoint(&format!("api/company/insurers/{slug}/"))?;
        self.get_detail(url, "insurer", slug).await
    }

    // --- Static pages ---

    /// Fetch an admin-configured static page by page type.
    #[instrument(skip(self))]
    pub async fn static_page(&self, page_type: &str) -> Result<StaticPage> {
        ensure_slug("static page", page_type)?;
        let url = self.endpoint(&format!("api/pages/{page_type}/"))?;
        self.get_detail(url, "static page", page_type).await
    }

    // --- Internals ---

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| QuotelaneError::config(format!("bad endpoint path '{path}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request_id = Uuid::now_v7();
        debug!(%request_id, %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| QuotelaneError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuotelaneError::Api {
                status: status.as_u16(),
                message: truncate(&message),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| QuotelaneError::parse(format!("{url}: {e}")))
    }

    /// Like [`Self::get_json`], but 404 maps to `NotFound` for detail lookups.
    async fn get_detail<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &str,
        slug: &str,
    ) -> Result<T> {
        let request_id = Uuid::now_v7();
        debug!(%request_id, %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| QuotelaneError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuotelaneError::not_found(resource, slug));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuotelaneError::Api {
                status: status.as_u16(),
                message: truncate(&message),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| QuotelaneError::parse(format!("{url}: {e}")))
    }

    async fn post_empty(&self, url: Url) -> Result<()> {
        let request_id = Uuid::now_v7();
        debug!(%request_id, %url, "POST");

        let response = self
            .http
            .post(url.clone())
            .send()
            .await
            .map_err(|e| QuotelaneError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuotelaneError::Api {
                status: status.as_u16(),
                message: truncate(&message),
            });
        }
        Ok(())
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<()> {
        let request_id = Uuid::now_v7();
        debug!(%request_id, %url, "POST");

        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| QuotelaneError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuotelaneError::Api {
                status: status.as_u16(),
                message: truncate(&message),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slug guard, applied before any request is attempted.
///
/// The literal string `"undefined"` shows up when an upstream templating
/// layer interpolates a missing value; treat it like an empty slug.
fn ensure_slug(resource: &str, slug: &str) -> Result<()> {
    let trimmed = slug.trim();
    if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
        return Err(QuotelaneError::validation(format!(
            "missing or invalid {resource} slug: {slug:?}"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('?') || trimmed.contains('#') {
        return Err(QuotelaneError::validation(format!(
            "malformed {resource} slug: {slug:?}"
        )));
    }
    Ok(())
}

fn truncate(s: &str) -> String {
    if s.len() <= ERROR_BODY_LIMIT {
        s.to_string()
    } else {
        let mut end = ERROR_BODY_LIMIT;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
