//! Shared domain types, error type, and configuration for quotelane.

pub mod config;
pub mod error;
pub mod types;

pub use config::{SiteConfig, config_dir, config_file_path, init_config, load_config};
pub use error::{QuotelaneError, Result};
pub use types::{
    Category, CompanyInfo, Faq, FaqSummary, FeedbackBody, Insurer, InsurerSummary, Paginated, Post,
    PostSummary, StaticPage,
};
