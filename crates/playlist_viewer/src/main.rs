mod browser;
mod config;
mod logging;
mod prompts;
mod spinner;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use playlist_core::{ClientOptions, FileStore, ListController, PlaylistClient};
use tokio::runtime::Builder;

use browser::{Browser, ScrollHome};
use config::ConfigStore;
use prompts::prompt_input;
use spinner::BusySpinner;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse a YouTube playlist with local favourites", long_about = None)]
struct Cli {
    /// Custom config file path
    #[arg(long = "config-path")]
    config_path: Option<PathBuf>,

    /// API key, stored in the config file once given
    #[arg(long = "api-key")]
    api_key: Option<String>,

    /// Playlist to browse instead of the configured one
    #[arg(long = "playlist-id")]
    playlist_id: Option<String>,
}

fn main() -> Result<()> {
    logging::init_logging()?;
    let cli = Cli::parse();

    let mut store = ConfigStore::load(cli.config_path)?;
    if let Some(api_key) = cli.api_key {
        store.config_mut().api_key = api_key;
    }
    if let Some(playlist_id) = cli.playlist_id {
        store.config_mut().playlist_id = playlist_id;
    }
    if store.config().api_key.trim().is_empty() {
        let api_key = prompt_input("YouTube API key", None)?;
        if api_key.is_empty() {
            println!("An API key is required.");
            return Ok(());
        }
        store.config_mut().api_key = api_key;
    }
    store.save()?;

    let config = store.config().clone();
    let client = PlaylistClient::new(ClientOptions {
        api_key: config.api_key.clone(),
        playlist_id: config.playlist_id.clone(),
        timeout: config.timeout(),
        base_url: None,
    })
    .context("failed to build playlist client")?;

    let favourites = FileStore::open(config.favourites_path())
        .context("failed to open favourites store")?;
    let mut controller = ListController::new(client, Box::new(favourites))
        .context("failed to restore favourites")?;

    let scroll_home = Arc::new(ScrollHome::default());
    controller.subscribe(Arc::new(BusySpinner::new()));
    controller.subscribe(scroll_home.clone());

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    if config.page_size != playlist_core::DEFAULT_PAGE_SIZE {
        runtime.block_on(controller.set_page_size(config.page_size));
    } else {
        runtime.block_on(controller.start());
    }
    if controller.accumulated().is_empty() {
        println!(
            "{}",
            style("No results loaded; check the API key and network.").yellow()
        );
    }

    Browser::new(&mut controller, &runtime, scroll_home).run()?;

    // Remember the page size chosen during the session.
    store.config_mut().page_size = controller.query().page_size;
    store.save()?;
    controller.shutdown();
    Ok(())
}
