use anyhow::{Context, Result};
use clap::Parser;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use tickerfeed::api::ApiClient;
use tickerfeed::app::{App, AppEvent};
use tickerfeed::config::Config;
use tickerfeed::news::CategoryKey;
use tickerfeed::ui;

/// Get the default config file path (~/.config/tickerfeed/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("tickerfeed")
        .join("config.toml"))
}

/// Create a redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

#[derive(Parser, Debug)]
#[command(name = "tickerfeed", about = "Terminal browser for categorized stock-market news")]
struct Args {
    /// Path to the config file (default: ~/.config/tickerfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured news service base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Category tab to open on startup (e.g. BANKING, FMCG)
    #[arg(long, value_name = "LABEL")]
    category: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path).context("Failed to load configuration")?;

    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .redirect(create_redirect_policy())
        .user_agent(concat!("tickerfeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let client = ApiClient::new(http, &config.base_url);
    tracing::info!(base = client.base(), "News service endpoint configured");

    let mut app = App::new(client, &config);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Kick off the initial tab before entering the loop
    let initial = args
        .category
        .as_deref()
        .map(CategoryKey::from_label)
        .or_else(|| app.tabs.first().copied())
        .unwrap_or(CategoryKey::All);
    app.select_category(initial, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
