use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use cubox_clipper::{
    config::ENV_STORE_PATH,
    extractor::{Extractor, HttpPageHost},
    pipeline::{Phase, Session, resolve_target_url},
    storage::{JsonFileStore, KeyValueStore, SettingsStore, record_handoff},
};

const DEFAULT_STORE_PATH: &str = "cubox-clipper.json";

#[derive(Parser)]
#[command(name = "cubox-clipper")]
#[command(about = "Extract a web page, summarize it with an LLM, and bookmark it in Cubox")]
#[command(version)]
struct Cli {
    /// Settings and handoff store (defaults to $CUBOX_CLIPPER_STORE or ./cubox-clipper.json)
    #[arg(short = 's', long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a page, review the result, then save it
    Clip(ClipArgs),

    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Record a page for the next clip run, as the keyboard shortcut does
    Shortcut {
        url: String,
    },
}

#[derive(clap::Args)]
struct ClipArgs {
    /// Page to clip; falls back to a fresh shortcut handoff
    url: Option<String>,

    /// Save without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Replace the generated title
    #[arg(long)]
    title: Option<String>,

    /// Replace the generated description
    #[arg(long)]
    description: Option<String>,

    #[arg(long = "add-tag")]
    add_tags: Vec<String>,

    #[arg(long = "remove-tag")]
    remove_tags: Vec<String>,

    /// Cubox folder to save into
    #[arg(long)]
    folder: Option<String>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings with keys masked
    Show,
    /// Set one field by its stored name, e.g. `openaiApiKey`
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli
        .store
        .or_else(|| std::env::var(ENV_STORE_PATH).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    debug!(path = %path.display(), "using store");
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(path));

    match cli.command {
        Commands::Clip(args) => clip(store, args).await,
        Commands::Config { action } => configure(store, action).await,
        Commands::Shortcut { url } => {
            record_handoff(store.as_ref(), &url, Utc::now()).await?;
            info!(url = %url, "shortcut target recorded");
            Ok(())
        }
    }
}

async fn clip(store: Arc<dyn KeyValueStore>, args: ClipArgs) -> Result<()> {
    let Some(url) = resolve_target_url(args.url.as_deref(), store.as_ref(), Utc::now()).await?
    else {
        bail!("no URL given and no recent shortcut target");
    };

    let settings = SettingsStore::new(store.clone())
        .load()
        .await?
        .with_env_fallbacks();
    settings.validate()?;

    let host = Arc::new(HttpPageHost::new(url.clone()));
    let extractor = Extractor::for_settings(&settings, host);
    let mut session = Session::new(settings, url, extractor)
        .with_observer(Box::new(|phase: Phase, message: &str| {
            if phase == Phase::Loading && !message.is_empty() {
                eprintln!("{message}");
            }
        }));
    if let Some(folder) = args.folder {
        session = session.with_folder(folder);
    }

    // `clip` itself is the explicit request when auto-analyze does not fire
    if !session.maybe_auto_analyze().await {
        session.analyze().await;
    }
    if session.phase() != Phase::Previewing {
        bail!("{}", session.message());
    }

    if let Some(analysis) = session.preview_mut() {
        if let Some(title) = args.title {
            analysis.title = title;
        }
        if let Some(description) = args.description {
            analysis.description = description;
        }
        for tag in &args.remove_tags {
            analysis.remove_tag(tag);
        }
        for tag in &args.add_tags {
            analysis.add_tag(tag);
        }
    }

    if let Some(preview) = session.preview() {
        let analysis = &preview.analysis;
        println!("URL:         {}", session.url());
        println!("Title:       {}", analysis.title);
        println!("Description: {}", analysis.description);
        println!("Tags:        {}", analysis.tags.join(", "));
        if let Some(image) = &preview.snapshot {
            println!("Snapshot:    {image}");
        }
    }

    if !args.yes && !ask("Save to Cubox? [y/N] ")? {
        session.cancel();
        println!("Cancelled");
        return Ok(());
    }

    if session.confirm().await != Phase::Success {
        bail!("{}", session.message());
    }
    println!("{}", session.message());
    session.dismiss_success().await;
    Ok(())
}

async fn configure(store: Arc<dyn KeyValueStore>, action: ConfigAction) -> Result<()> {
    let settings_store = SettingsStore::new(store);
    let mut settings = settings_store.load().await?;
    match action {
        ConfigAction::Show => {
            let shown = settings.with_env_fallbacks().masked();
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigAction::Set { key, value } => {
            settings.set_field(&key, &value)?;
            settings.validate()?;
            settings_store.save(&settings).await?;
            info!(field = %key, "setting updated");
        }
    }
    Ok(())
}

fn ask(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
