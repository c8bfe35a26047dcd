//! View assembly: fetch → render → display-ready view models.
//!
//! This crate composes the API client and the rendering pipeline into the
//! views the site shows: article/FAQ/insurer detail, the paginated post
//! browser, and the home page's independent panels.

pub mod browse;
pub mod pagination;
pub mod views;

pub use browse::{ListBrowser, RequestGuard, filter_by_term};
pub use pagination::Pagination;
pub use views::{
    ArticleView, FaqView, HomeView, InsurerView, PageView, PanelState, article_view, faq_view,
    fetch_posts_page, home_view, insurer_view, static_page_view,
};
