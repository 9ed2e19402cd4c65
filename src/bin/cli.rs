//! Profile sniffer CLI
//!
//! Live capture needs the `browser` feature; every capture command can also run
//! offline against a recorded fixture with `--fixture`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ig_sniffer::{
    browser::{BrowserPage, ReplayPage},
    error::{AppError, Result},
    models::{Config, ScrapeTarget},
    pipeline::{self, UnitReport},
    services::{ImageDownloader, collect_image_urls},
    storage::{LocalStorage, ProfileStorage},
    utils::url::username_from_url,
};

/// Profile sniffer - feed, highlight and carousel capture
#[derive(Parser, Debug)]
#[command(name = "sniffer", version, about = "Captures profile media metadata from browser traffic")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sniffer.toml")]
    config: PathBuf,

    /// Override the output directory from the configuration
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture one or more profiles
    Scrape {
        /// Profile page URLs
        #[arg(required = true)]
        profiles: Vec<String>,

        /// Extra post URLs to visit (applied to the first profile)
        #[arg(long = "post")]
        posts: Vec<String>,

        /// Serve pages from a recorded fixture instead of a live browser
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Capture a profile from a recorded fixture
    Replay {
        #[arg(long)]
        fixture: PathBuf,

        profile: String,

        #[arg(long = "post")]
        posts: Vec<String>,
    },

    /// Diff two follower exports
    Diff {
        #[arg(long)]
        pre: PathBuf,

        #[arg(long)]
        post: PathBuf,

        /// Write the diff here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Diff follower exports, then capture the changed accounts
    Pipeline {
        #[arg(long)]
        pre: PathBuf,

        #[arg(long)]
        post: PathBuf,

        /// Maximum number of profiles to capture
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Download every image referenced by a captured profile
    Images { username: String },

    /// Validate the configuration file
    Validate,

    /// Show what has been captured for a profile
    Info { username: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// The page binding a command runs against.
enum PageHandle {
    Replay(ReplayPage),
    #[cfg(feature = "browser")]
    Chromium(ig_sniffer::browser::ChromiumPage),
}

impl PageHandle {
    async fn open(config: &Config, fixture: Option<&Path>) -> Result<Self> {
        if let Some(path) = fixture {
            log::info!("Replaying fixture {}", path.display());
            return Ok(Self::Replay(ReplayPage::from_file(path)?));
        }
        Self::launch(config).await
    }

    #[cfg(feature = "browser")]
    async fn launch(config: &Config) -> Result<Self> {
        let page = ig_sniffer::browser::ChromiumPage::launch(&config.browser).await?;
        Ok(Self::Chromium(page))
    }

    #[cfg(not(feature = "browser"))]
    async fn launch(_config: &Config) -> Result<Self> {
        Err(AppError::config(
            "live capture needs the `browser` feature; pass --fixture to replay a recording",
        ))
    }

    fn page(&self) -> &dyn BrowserPage {
        match self {
            Self::Replay(page) => page,
            #[cfg(feature = "browser")]
            Self::Chromium(page) => page,
        }
    }

    async fn close(self) -> Result<()> {
        match self {
            Self::Replay(_) => Ok(()),
            #[cfg(feature = "browser")]
            Self::Chromium(page) => page.close().await,
        }
    }
}

fn scrape_target(profile_url: &str, extra_posts: Vec<String>) -> Result<ScrapeTarget> {
    let username = username_from_url(profile_url)
        .ok_or_else(|| AppError::validation(format!("no username in profile URL {profile_url}")))?;
    Ok(ScrapeTarget {
        username,
        profile_url: profile_url.to_string(),
        extra_posts,
    })
}

fn log_reports(reports: &[UnitReport]) {
    for report in reports {
        match &report.error {
            None => log::info!(
                "✓ {}: {} posts, {} highlights",
                report.username,
                report.post_count,
                report.highlight_count
            ),
            Some(e) => log::warn!("✗ {}: {}", report.username, e),
        }
    }
}

async fn scrape(
    config: &Config,
    storage: &LocalStorage,
    fixture: Option<&Path>,
    targets: &[ScrapeTarget],
) -> Result<Vec<UnitReport>> {
    let handle = PageHandle::open(config, fixture).await?;
    let reports = pipeline::run_scraper(handle.page(), storage, config, targets).await;
    handle.close().await?;
    reports
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.display().to_string();
    }
    let storage = LocalStorage::new(&config.paths.output_dir);

    match cli.command {
        Command::Scrape {
            profiles,
            posts,
            fixture,
        } => {
            let mut extra = Some(posts);
            let targets = profiles
                .iter()
                .map(|url| scrape_target(url, extra.take().unwrap_or_default()))
                .collect::<Result<Vec<_>>>()?;

            let reports = scrape(&config, &storage, fixture.as_deref(), &targets).await?;
            log_reports(&reports);
        }

        Command::Replay {
            fixture,
            profile,
            posts,
        } => {
            let targets = vec![scrape_target(&profile, posts)?];
            let reports = scrape(&config, &storage, Some(&fixture), &targets).await?;
            log_reports(&reports);
        }

        Command::Diff { pre, post, output } => {
            let diff = pipeline::run_diff(&pre, &post)?;
            let json = serde_json::to_string_pretty(&diff)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("Diff saved to {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        Command::Pipeline {
            pre,
            post,
            limit,
            fixture,
        } => {
            if let Some(limit) = limit {
                config.batch.limit = limit;
            }
            let handle = PageHandle::open(&config, fixture.as_deref()).await?;
            let reports =
                pipeline::run_follower_pipeline(handle.page(), &storage, &config, &pre, &post).await;
            handle.close().await?;
            log_reports(&reports?);
        }

        Command::Images { username } => {
            let posts = storage.load_posts(&username).await?;
            let urls = collect_image_urls(&posts);
            log::info!("{} image URL(s) across {} post(s)", urls.len(), posts.len());

            let downloader = ImageDownloader::new(&config.download)?;
            downloader
                .download_all(&urls, &storage.images_dir(&username))
                .await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info { username } => {
            log::info!("Output directory: {}", storage.root_dir().display());

            let posts = storage.load_posts(&username).await?;
            let highlights = storage.load_highlights(&username).await?;
            if posts.is_empty() && highlights.is_empty() {
                log::info!("Nothing captured for {} yet.", username);
                return Ok(());
            }

            let with_carousel = posts.iter().filter(|p| p.carousel.is_some()).count();
            let slides: usize = posts.iter().filter_map(|p| p.carousel.as_ref()).map(Vec::len).sum();
            log::info!("Posts: {} ({} with carousel, {} slides)", posts.len(), with_carousel, slides);
            log::info!("Highlights: {}", highlights.len());

            let latest = posts
                .iter()
                .filter_map(|p| p.taken_at)
                .max()
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0));
            if let Some(latest) = latest {
                log::info!("Latest post: {}", latest.to_rfc3339());
            }
        }
    }

    Ok(())
}
