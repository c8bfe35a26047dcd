//! Display-ready view models: fetch a document, run it through the
//! rendering pipeline, and hand back everything a page needs.
//!
//! Each view issues its own independent fetches; a failure is confined to
//! the view (or panel) that issued it and never propagates further.

use tracing::{instrument, warn};

use quotelane_client::{ApiClient, PostQuery};
use quotelane_render::{RenderedDocument, render_document};
use quotelane_shared::{
    Faq, FaqSummary, Insurer, Post, PostSummary, Result, StaticPage,
};

use crate::browse::ListBrowser;

/// How many items the home page panels show.
const HOME_PANEL_LIMIT: u32 = 3;

// ---------------------------------------------------------------------------
// Detail views
// ---------------------------------------------------------------------------

/// A blog article ready for display.
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub post: Post,
    pub rendered: RenderedDocument,
}

/// Assemble the article detail view.
///
/// The view-count increment is fire-and-forget: a failure there is logged
/// and the article still renders.
#[instrument(skip(client))]
pub async fn article_view(client: &ApiClient, slug: &str, track_view: bool) -> Result<ArticleView> {
    let post = client.get_post(slug).await?;

    if track_view {
        if let Err(e) = client.increment_views(slug).await {
            warn!(slug, error = %e, "view-count increment failed");
        }
    }

    let rendered = render_document(&post.content);
    Ok(ArticleView { post, rendered })
}

/// An FAQ answer ready for display.
#[derive(Debug, Clone)]
pub struct FaqView {
    pub faq: Faq,
    pub rendered: RenderedDocument,
}

/// Assemble the FAQ detail view. The answer body runs through the same
/// pipeline as articles (it is frequently plain text).
#[instrument(skip(client))]
pub async fn faq_view(client: &ApiClient, slug: &str) -> Result<FaqView> {
    let faq = client.get_faq(slug).await?;
    let rendered = render_document(&faq.answer);
    Ok(FaqView { faq, rendered })
}

/// An insurer review ready for display.
#[derive(Debug, Clone)]
pub struct InsurerView {
    pub insurer: Insurer,
    pub rendered: RenderedDocument,
}

/// Assemble the insurer review view.
#[instrument(skip(client))]
pub async fn insurer_view(client: &ApiClient, slug: &str) -> Result<InsurerView> {
    let insurer = client.get_insurer(slug).await?;
    let rendered = render_document(&insurer.description);
    Ok(InsurerView { insurer, rendered })
}

/// A static page ready for display.
#[derive(Debug, Clone)]
pub struct PageView {
    pub page: StaticPage,
    pub rendered: RenderedDocument,
}

/// Assemble a static page view (about, terms, privacy, ...).
#[instrument(skip(client))]
pub async fn static_page_view(client: &ApiClient, page_type: &str) -> Result<PageView> {
    let page = client.static_page(page_type).await?;
    let rendered = render_document(&page.content);
    Ok(PageView { page, rendered })
}

// ---------------------------------------------------------------------------
// Home view (independent panels)
// ---------------------------------------------------------------------------

/// Outcome of one home-page panel's fetch.
#[derive(Debug, Clone)]
pub enum PanelState<T> {
    Loaded(T),
    Failed(String),
}

impl<T> PanelState<T> {
    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// The home page: recent posts and recent FAQs, fetched concurrently.
#[derive(Debug, Clone)]
pub struct HomeView {
    pub recent_posts: PanelState<Vec<PostSummary>>,
    pub recent_faqs: PanelState<Vec<FaqSummary>>,
}

/// Fetch both home panels concurrently. Each panel fails independently —
/// one rejecting never blocks or empties the other.
#[instrument(skip(client))]
pub async fn home_view(client: &ApiClient) -> HomeView {
    let home_query = PostQuery::page(HOME_PANEL_LIMIT, 0);
    let (posts, faqs) = tokio::join!(
        client.list_posts(&home_query),
        client.recent_faqs(HOME_PANEL_LIMIT),
    );

    HomeView {
        recent_posts: PanelState::from_result(posts.map(|page| page.results)),
        recent_faqs: PanelState::from_result(faqs),
    }
}

// ---------------------------------------------------------------------------
// Paginated list fetching
// ---------------------------------------------------------------------------

/// Fetch one page of posts through the browser's clamp + staleness guard.
///
/// The requested page is clamped against the known total before the offset
/// is computed, so an out-of-range page is never put on the wire. Returns
/// whether the response was applied (a stale response is dropped).
#[instrument(skip(client, browser))]
pub async fn fetch_posts_page(
    client: &ApiClient,
    browser: &mut ListBrowser,
    requested_page: usize,
) -> Result<bool> {
    let (token, query) = browser.request_page(requested_page);
    let page = client.list_posts(&query).await?;
    Ok(browser.apply(token, page))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use quotelane_shared::SiteConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&SiteConfig {
            api_base_url: server.uri(),
            ..SiteConfig::default()
        })
        .expect("client")
    }

    fn post_json(slug: &str, content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "slug": slug,
            "title": "Understanding Deductibles",
            "summary": "What you pay before coverage kicks in.",
            "content": content
        })
    }

    #[tokio::test]
    async fn article_view_renders_content_and_toc() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/blog/posts/deductibles/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(
                "deductibles",
                "<h2>Overview</h2><p>A deductible is what you pay first.</p>",
            )))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/blog/posts/deductibles/increment-views/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let view = article_view(&client, "deductibles", true).await.unwrap();

        assert!(view.rendered.html.contains(r#"id="overview""#));
        assert_eq!(view.rendered.toc.len(), 1);
        assert_eq!(view.rendered.reading_time_min, 1);
    }

    #[tokio::test]
    async fn failed_view_increment_does_not_fail_the_article() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/blog/posts/deductibles/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(post_json("deductibles", "Plain text body here.")),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/blog/posts/deductibles/increment-views/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let view = article_view(&client, "deductibles", true).await.unwrap();
        assert!(view.rendered.html.contains("<p"));
    }

    #[tokio::test]
    async fn article_view_propagates_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/blog/posts/gone/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = article_view(&client, "gone", false).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn faq_view_normalizes_plain_text_answers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/faq/api/faqs/sr22/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2,
                "slug": "sr22",
                "question": "What is an SR-22?",
                "answer": "Key Facts: It is a filing, not insurance. Your insurer files it for you."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let view = faq_view(&client, "sr22").await.unwrap();
        assert!(view.rendered.html.contains("<h2"));
        assert_eq!(view.rendered.toc[0].id, "key-facts");
    }

    #[tokio::test]
    async fn home_panels_fail_independently() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/blog/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1,
                "results": [{
                    "id": 1,
                    "slug": "only-post",
                    "title": "Only Post",
                    "summary": "s"
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/faq/api/faqs/recent/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("faq backend down"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let home = home_view(&client).await;

        match &home.recent_posts {
            PanelState::Loaded(posts) => assert_eq!(posts[0].slug, "only-post"),
            PanelState::Failed(e) => panic!("posts panel must load: {e}"),
        }
        match &home.recent_faqs {
            PanelState::Failed(message) => assert!(message.contains("500")),
            PanelState::Loaded(_) => panic!("faq panel must fail"),
        }
    }

    #[tokio::test]
    async fn out_of_range_page_is_never_requested() {
        let server = MockServer::start().await;

        // First page establishes total_count = 95 (10 pages of 10).
        Mock::given(method("GET"))
            .and(path("/api/blog/posts/"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 95,
                "results": [{"id": 1, "slug": "p1", "title": "P1", "summary": ""}]
            })))
            .mount(&server)
            .await;

        // Page 11 must clamp to page 10 → offset 90. No other offset is mocked,
        // so an unclamped request would fail the test.
        Mock::given(method("GET"))
            .and(path("/api/blog/posts/"))
            .and(query_param("offset", "90"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 95,
                "results": [{"id": 95, "slug": "p95", "title": "P95", "summary": ""}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut browser = ListBrowser::new(10);

        fetch_posts_page(&client, &mut browser, 1).await.unwrap();
        assert_eq!(browser.pagination.total_pages(), 10);

        fetch_posts_page(&client, &mut browser, 11).await.unwrap();
        assert_eq!(browser.pagination.page, 10);
        assert_eq!(browser.results()[0].slug, "p95");
    }
}
