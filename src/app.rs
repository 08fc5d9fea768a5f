use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config;
use crate::dom::{FeedDocument, MemoryFeed};
use crate::engine::Engine;
use crate::keywords::KeywordStore;
use crate::storage;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing keyword argument for `{0}`")]
    MissingKeyword(&'static str),
}

/// Routes a parsed command line. Flags (`--version`, `--help`) are
/// handled before this in `main`.
pub fn dispatch(args: &[String]) -> Result<()> {
    match args.split_first() {
        None => run(),
        Some((cmd, rest)) => match cmd.as_str() {
            "demo" => run(),
            "add" => match rest.first() {
                Some(word) => add(word),
                None => Err(UsageError::MissingKeyword("add").into()),
            },
            "remove" => match rest.first() {
                Some(word) => remove(word),
                None => Err(UsageError::MissingKeyword("remove").into()),
            },
            "list" => list(),
            other => Err(UsageError::UnknownCommand(other.to_string()).into()),
        },
    }
}

/// Runs the filter engine over a built-in sample feed using the
/// persisted keyword set, then reports what was hidden.
pub fn run() -> Result<()> {
    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    let store = open_store(&cfg)?;

    let feed = Arc::new(MemoryFeed::new());
    if !cfg.filter.feed_root_selector.is_empty() {
        feed.add_container(&cfg.filter.feed_root_selector);
    }

    let mut handles = Vec::new();
    for (title, body) in sample_posts() {
        let id = feed.push_post(
            &cfg.filter.post_selector,
            &[("span.reshared_by", title), ("div.text", body)],
        );
        handles.push((title, id));
    }

    let doc: Arc<dyn FeedDocument> = feed.clone();
    let engine = Engine::start(doc, store, cfg.filter.clone()).context("start engine")?;
    let outcome = engine.scan_now();

    let keywords = engine.keywords();
    if keywords.is_empty() {
        println!("No keywords saved; every post stays visible.");
        println!("Add one with: feedsift add <keyword>");
    } else {
        println!("Keywords: {}", keywords.join(", "));
    }
    println!();
    for (title, id) in &handles {
        let state = if feed.is_hidden(*id) { "hidden " } else { "visible" };
        println!("  {state}  {title}");
    }
    println!();
    println!(
        "Processed {} posts, hid {}.",
        outcome.processed, outcome.hidden
    );
    println!("Keyword store: {}", friendly_path(cfg.storage.path.as_ref()));
    Ok(())
}

pub fn add(word: &str) -> Result<()> {
    let keywords = load_keywords()?;
    if keywords.add(word)? {
        println!("Added \"{}\".", word.trim().to_lowercase());
    } else if word.trim().is_empty() {
        println!("Nothing to add.");
    } else {
        println!("Keyword \"{}\" already present.", word.trim().to_lowercase());
    }
    Ok(())
}

pub fn remove(word: &str) -> Result<()> {
    let keywords = load_keywords()?;
    if keywords.remove(word)? {
        println!("Removed \"{}\".", word.trim().to_lowercase());
    } else {
        println!(
            "Keyword \"{}\" not found; nothing to remove.",
            word.trim().to_lowercase()
        );
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let keywords = load_keywords()?;
    let words = keywords.keywords();
    if words.is_empty() {
        println!("No keywords saved.");
    } else {
        for word in words {
            println!("{word}");
        }
    }
    Ok(())
}

fn load_keywords() -> Result<KeywordStore> {
    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    let store = open_store(&cfg)?;
    KeywordStore::load(store).context("load keywords")
}

fn open_store(cfg: &config::Config) -> Result<Arc<storage::Store>> {
    let store = storage::Store::open(storage::Options {
        path: cfg.storage.path.clone(),
    })
    .context("open storage")?;
    Ok(Arc::new(store))
}

fn sample_posts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "welcome",
            "Welcome to feedsift. This post has nothing objectionable in it.",
        ),
        (
            "spoilers",
            "Heads up, a big SPOILER about the season finale follows.",
        ),
        (
            "markets",
            "Another day, another crypto rally. To the moon again.",
        ),
        (
            "recipes",
            "A quiet post about sourdough starters and patience.",
        ),
    ]
}

/// Home-relative rendering of a path for status lines.
pub fn friendly_path(path: Option<&std::path::PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/feedsift/state.db".to_string()
    }
}
