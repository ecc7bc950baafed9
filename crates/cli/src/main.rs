//! lectern reading/preload binary.
//!
//! The application root: wires configuration, logging, the chapter store,
//! and a translation-scoped loader context together, then preloads around
//! the requested chapter and prints it. Logging goes to stderr so the
//! chapter text on stdout stays clean.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use lectern_client::{BibleLoader, ChapterFetcher, HttpContentSource, PreloadPhase, Preloader};
use lectern_core::{AppConfig, ChapterStore, Translation, canon};

#[derive(Debug, Parser)]
#[command(name = "lectern", about = "Offline-first scripture reader cache")]
struct Args {
    /// Book to open, e.g. "genesis" or "1 Corinthians".
    #[arg(default_value = "genesis")]
    book: String,

    /// Chapter to open (1-indexed).
    #[arg(default_value_t = 1)]
    chapter: u32,

    /// Override the configured translation (asv, web, kjv).
    #[arg(long)]
    translation: Option<Translation>,

    /// Wipe the persistent chapter cache before loading.
    #[arg(long)]
    clear_cache: bool,

    /// Search cached verse text offline and print matches instead of
    /// opening a chapter.
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Skip the adjacent/background preload after the chapter is shown.
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(translation) = args.translation {
        config.translation = translation;
    }
    tracing::info!(translation = %config.translation, db = %config.db_path.display(), "starting lectern");

    let store = ChapterStore::open(&config.db_path)
        .await
        .with_context(|| format!("opening chapter store at {}", config.db_path.display()))?;
    if args.clear_cache {
        let deleted = store.clear().await.context("clearing chapter cache")?;
        tracing::info!(deleted, "chapter cache cleared");
    }

    if let Some(query) = &args.search {
        let results = store.search(config.translation, query).await?;
        for (key, verse) in &results {
            let title = canon::display_name(&key.book).unwrap_or(key.book.as_str());
            println!("{} {}:{}  {}", title, key.chapter, verse.number, verse.text);
        }
        tracing::info!(matches = results.len(), "offline search finished");
        return Ok(());
    }

    let source = HttpContentSource::new(&config).context("building content source")?;
    let loader = Arc::new(BibleLoader::new(source, store, config.translation));
    let fetcher = ChapterFetcher::new(loader.clone(), config.extract_annotations);

    let (preloader, mut progress) = Preloader::new(loader);
    let handle = preloader.handle();
    let (ready_tx, ready_rx) = oneshot::channel();
    let book = args.book.clone();
    let chapter_number = args.chapter;
    let preload = tokio::spawn(async move { preloader.run(&book, chapter_number, ready_tx).await });

    if ready_rx.await.is_err() {
        // The ready sender is only dropped on a fatal initial failure.
        if let Err(err) = preload.await.context("preloader task failed")? {
            bail!("initial chapter load failed: {err}");
        }
        bail!("preloader exited before the initial chapter was ready");
    }

    let chapter = fetcher.fetch_chapter(&args.book, args.chapter).await?;
    let title = canon::display_name(&chapter.book_key).unwrap_or(chapter.book_key.as_str());
    println!("{} {} ({})", title, chapter.number, chapter.translation.display_name());
    println!();
    for verse in &chapter.verses {
        println!("{:>3}  {}", verse.number, verse.text);
    }

    if args.no_preload {
        handle.cancel();
    }
    while progress.changed().await.is_ok() {
        let update = *progress.borrow();
        if update.phase == PreloadPhase::Background {
            tracing::info!(percent = update.percent, "background preload");
        }
        if update.phase == PreloadPhase::Done {
            break;
        }
    }

    preload.await.context("preloader task failed")??;

    let metrics = fetcher.loader().metrics();
    tracing::info!(
        book_fetches = metrics.book_fetches(),
        persist_failures = metrics.persist_failures(),
        "preload finished"
    );

    Ok(())
}
