//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use quotelane_client::ApiClient;
use quotelane_core::{ListBrowser, PanelState, fetch_posts_page};
use quotelane_render::TocEntry;
use quotelane_shared::{init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// quotelane — auto-insurance content, rendered.
#[derive(Parser)]
#[command(
    name = "quotelane",
    version,
    about = "Fetch and render content from the quotelane backend API.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render a blog post to display-ready HTML.
    Post {
        /// Post slug.
        slug: String,

        /// Write the rendered fragment to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip the view-count increment.
        #[arg(long)]
        no_track: bool,
    },

    /// List blog posts, one page at a time.
    Posts {
        /// Page number (1-based; out-of-range pages clamp).
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Posts per page.
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Filter by category name.
        #[arg(short, long)]
        category: Option<String>,

        /// Search term.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Render an FAQ answer to display-ready HTML.
    Faq {
        /// FAQ slug.
        slug: String,

        /// Write the rendered fragment to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List FAQs.
    Faqs {
        /// Only show the N most recent.
        #[arg(long)]
        recent: Option<u32>,
    },

    /// List insurer reviews.
    Insurers,

    /// Render an insurer review.
    Insurer {
        /// Insurer slug.
        slug: String,
    },

    /// Render an admin-configured static page (about, terms, privacy, ...).
    Page {
        /// Page type.
        page_type: String,
    },

    /// Fetch the home view: recent posts and recent FAQs.
    Home,

    /// Submit helpful/not-helpful feedback on a post or FAQ.
    Feedback {
        /// What kind of content: post or faq.
        #[arg(value_parser = ["post", "faq"])]
        kind: String,

        /// Content slug.
        slug: String,

        /// Mark as helpful.
        #[arg(long, conflicts_with = "not_helpful")]
        helpful: bool,

        /// Mark as not helpful.
        #[arg(long)]
        not_helpful: bool,

        /// Optional comment.
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "quotelane=info",
        1 => "quotelane=debug",
        _ => "quotelane=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Post {
            slug,
            out,
            no_track,
        } => cmd_post(&slug, out.as_deref(), !no_track).await,
        Command::Posts {
            page,
            page_size,
            category,
            search,
        } => cmd_posts(page, page_size, category, search).await,
        Command::Faq { slug, out } => cmd_faq(&slug, out.as_deref()).await,
        Command::Faqs { recent } => cmd_faqs(recent).await,
        Command::Insurers => cmd_insurers().await,
        Command::Insurer { slug } => cmd_insurer(&slug).await,
        Command::Page { page_type } => cmd_page(&page_type).await,
        Command::Home => cmd_home().await,
        Command::Feedback {
            kind,
            slug,
            helpful,
            not_helpful,
            comment,
        } => cmd_feedback(&kind, &slug, helpful, not_helpful, &comment).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Load config and build the API client, failing fast on a missing base URL.
fn connect() -> Result<ApiClient> {
    let config = load_config()?;
    Ok(ApiClient::new(&config)?)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

fn emit_fragment(html: &str, out: Option<&std::path::Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, html)
                .map_err(|e| eyre!("failed to write {}: {e}", path.display()))?;
            println!("wrote {} bytes to {}", html.len(), path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn print_toc(toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    eprintln!("On this page:");
    for entry in toc {
        let indent = match entry.level.tag() {
            "h3" => "    ",
            _ => "  ",
        };
        eprintln!("{indent}#{} — {}", entry.id, entry.text);
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_post(slug: &str, out: Option<&std::path::Path>, track: bool) -> Result<()> {
    let client = connect()?;
    let sp = spinner(&format!("Fetching post {slug}"));
    let view = quotelane_core::article_view(&client, slug, track).await;
    sp.finish_and_clear();

    let view = view?;
    info!(
        slug,
        words = view.rendered.word_count,
        reading_time_min = view.rendered.reading_time_min,
        "post rendered"
    );

    eprintln!("# {}", view.post.title);
    eprintln!("{} min read", view.rendered.reading_time_min);
    print_toc(&view.rendered.toc);
    emit_fragment(&view.rendered.html, out)
}

async fn cmd_posts(
    page: usize,
    page_size: usize,
    category: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let client = connect()?;
    let mut browser = ListBrowser::new(page_size);
    if category.is_some() {
        browser.set_category(category);
    }
    if search.is_some() {
        browser.set_search(search);
    }

    let sp = spinner("Fetching posts");
    // First fetch learns the total; refetch if the requested page clamps.
    let applied = fetch_posts_page(&client, &mut browser, page).await;
    sp.finish_and_clear();
    applied?;

    if browser.pagination.clamp(page) != browser.pagination.page {
        fetch_posts_page(&client, &mut browser, page).await?;
    }

    println!(
        "Page {} of {} ({} posts)",
        browser.pagination.page,
        browser.pagination.total_pages(),
        browser.pagination.total_count
    );
    for post in browser.results() {
        let category = post
            .category
            .as_ref()
            .map(|c| format!(" [{}]", c.name))
            .unwrap_or_default();
        println!("  {}{}  — {}", post.slug, category, post.title);
    }
    Ok(())
}

async fn cmd_faq(slug: &str, out: Option<&std::path::Path>) -> Result<()> {
    let client = connect()?;
    let sp = spinner(&format!("Fetching FAQ {slug}"));
    let view = quotelane_core::faq_view(&client, slug).await;
    sp.finish_and_clear();

    let view = view?;
    eprintln!("# {}", view.faq.question);
    if let Some(short) = &view.faq.short_answer {
        eprintln!("> {short}");
    }
    print_toc(&view.rendered.toc);
    emit_fragment(&view.rendered.html, out)
}

async fn cmd_faqs(recent: Option<u32>) -> Result<()> {
    let client = connect()?;
    let sp = spinner("Fetching FAQs");
    let faqs = match recent {
        Some(limit) => client.recent_faqs(limit).await,
        None => client.list_faqs().await,
    };
    sp.finish_and_clear();

    for faq in faqs? {
        println!("  {}  — {}", faq.slug, faq.question);
    }
    Ok(())
}

async fn cmd_insurers() -> Result<()> {
    let client = connect()?;
    let sp = spinner("Fetching insurers");
    let insurers = client.list_insurers().await;
    sp.finish_and_clear();

    for insurer in insurers? {
        let rating = insurer
            .rating
            .map(|r| format!(" ({r:.1}/5)"))
            .unwrap_or_default();
        println!("  {}  — {}{}", insurer.slug, insurer.name, rating);
    }
    Ok(())
}

async fn cmd_insurer(slug: &str) -> Result<()> {
    let client = connect()?;
    let sp = spinner(&format!("Fetching insurer {slug}"));
    let view = quotelane_core::insurer_view(&client, slug).await;
    sp.finish_and_clear();

    let view = view?;
    eprintln!("# {}", view.insurer.name);
    if let Some(rating) = view.insurer.rating {
        eprintln!("Rating: {rating:.1}/5");
    }
    print_toc(&view.rendered.toc);
    emit_fragment(&view.rendered.html, None)
}

async fn cmd_page(page_type: &str) -> Result<()> {
    let client = connect()?;
    let sp = spinner(&format!("Fetching page {page_type}"));
    let view = quotelane_core::static_page_view(&client, page_type).await;
    sp.finish_and_clear();

    let view = view?;
    eprintln!("# {}", view.page.title);
    emit_fragment(&view.rendered.html, None)
}

async fn cmd_home() -> Result<()> {
    let client = connect()?;
    let sp = spinner("Fetching home panels");
    let home = quotelane_core::home_view(&client).await;
    sp.finish_and_clear();

    println!("Recent posts:");
    match &home.recent_posts {
        PanelState::Loaded(posts) => {
            for post in posts {
                println!("  {}  — {}", post.slug, post.title);
            }
        }
        PanelState::Failed(message) => println!("  unable to load posts: {message}"),
    }

    println!("Recent FAQs:");
    match &home.recent_faqs {
        PanelState::Loaded(faqs) => {
            for faq in faqs {
                println!("  {}  — {}", faq.slug, faq.question);
            }
        }
        PanelState::Failed(message) => println!("  unable to load FAQs: {message}"),
    }
    Ok(())
}

async fn cmd_feedback(
    kind: &str,
    slug: &str,
    helpful: bool,
    not_helpful: bool,
    comment: &str,
) -> Result<()> {
    if helpful == not_helpful {
        return Err(eyre!("pass exactly one of --helpful or --not-helpful"));
    }

    let client = connect()?;
    match kind {
        "post" => client.post_feedback(slug, helpful, comment).await?,
        "faq" => client.faq_feedback(slug, helpful, comment).await?,
        other => return Err(eyre!("unknown feedback kind '{other}'")),
    }

    println!("feedback recorded for {kind} {slug}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    print!("{rendered}");

    match config.validate() {
        Ok(()) => println!("# backend: ok"),
        Err(e) => println!("# backend: {e}"),
    }
    Ok(())
}
