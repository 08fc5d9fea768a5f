use std::sync::Arc;
use std::thread;
use std::time::Duration;

use feedsift::config::FilterConfig;
use feedsift::dom::{FeedDocument, MemoryFeed};
use feedsift::engine::Engine;
use feedsift::storage::{MemoryStore, Options, Store, ValueStore};

const POST: &str = "div.new-status.status-wrapper";
const ROOT: &str = "div.stream-items";
const WINDOW: Duration = Duration::from_millis(20);

// Enough wall time for one debounce cycle to complete, with slack for
// slow CI machines.
const SETTLE: Duration = Duration::from_millis(250);

fn filter() -> FilterConfig {
    FilterConfig {
        post_selector: POST.into(),
        region_selectors: vec![
            "span.reshared_by".into(),
            "div.text".into(),
            "blockquote p".into(),
        ],
        feed_root_selector: ROOT.into(),
        debounce_window: WINDOW,
    }
}

fn feed_with_root() -> Arc<MemoryFeed> {
    let feed = Arc::new(MemoryFeed::new());
    feed.add_container(ROOT);
    feed
}

fn start(feed: &Arc<MemoryFeed>, backend: Arc<dyn ValueStore>) -> Engine {
    let doc: Arc<dyn FeedDocument> = feed.clone();
    Engine::start(doc, backend, filter()).unwrap()
}

#[test]
fn startup_scan_hides_matching_posts() {
    let feed = feed_with_root();
    let spoiler = feed.push_post(POST, &[("div.text", "Big SPOILER inside")]);
    let plain = feed.push_post(POST, &[("div.text", "nothing here")]);

    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "'spoiler'").unwrap();

    let _engine = start(&feed, backend);
    thread::sleep(SETTLE);

    assert!(feed.is_hidden(spoiler));
    assert!(!feed.is_hidden(plain));
}

#[test]
fn post_added_after_startup_is_filtered_within_one_cycle() {
    let feed = feed_with_root();
    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "'crypto'").unwrap();

    let _engine = start(&feed, backend);
    thread::sleep(SETTLE);

    let late = feed.push_post(POST, &[("div.text", "hot new CRYPTO coin")]);
    thread::sleep(SETTLE);

    assert!(feed.is_hidden(late));
    assert!(feed.is_processed(late));
}

#[test]
fn burst_of_appends_is_processed_after_one_quiet_window() {
    let feed = feed_with_root();
    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "'spam'").unwrap();

    let _engine = start(&feed, backend);
    thread::sleep(SETTLE);

    let mut ids = Vec::new();
    for i in 0..10 {
        let body = if i % 2 == 0 { "spam offer" } else { "regular news" };
        ids.push((feed.push_post(POST, &[("div.text", body)]), i % 2 == 0));
    }
    thread::sleep(SETTLE);

    for (id, spammy) in ids {
        assert!(feed.is_processed(id));
        assert_eq!(feed.is_hidden(id), spammy);
    }
}

#[test]
fn adding_a_keyword_affects_only_later_posts() {
    let feed = feed_with_root();
    let engine = start(&feed, Arc::new(MemoryStore::new()));
    let early = feed.push_post(POST, &[("div.text", "crypto thread")]);
    thread::sleep(SETTLE);

    // Processed while the set was empty; stays visible.
    assert!(feed.is_processed(early));
    assert!(!feed.is_hidden(early));

    engine.add_keyword("crypto").unwrap();
    let late = feed.push_post(POST, &[("div.text", "more crypto talk")]);
    thread::sleep(SETTLE);

    assert!(!feed.is_hidden(early));
    assert!(feed.is_hidden(late));
}

#[test]
fn removing_a_keyword_does_not_unhide() {
    let feed = feed_with_root();
    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "'spoiler'").unwrap();

    let engine = start(&feed, backend);
    let early = feed.push_post(POST, &[("div.text", "spoiler ahead")]);
    thread::sleep(SETTLE);
    assert!(feed.is_hidden(early));

    engine.remove_keyword("spoiler").unwrap();
    let late = feed.push_post(POST, &[("div.text", "another spoiler")]);
    thread::sleep(SETTLE);

    assert!(feed.is_hidden(early));
    assert!(!feed.is_hidden(late));
}

#[test]
fn quoted_text_regions_are_searched() {
    let feed = feed_with_root();
    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "'giveaway'").unwrap();

    let _engine = start(&feed, backend);
    let reshare = feed.push_post(
        POST,
        &[
            ("span.reshared_by", "reshared by a friend"),
            ("blockquote p", "huge GIVEAWAY click here"),
        ],
    );
    thread::sleep(SETTLE);

    assert!(feed.is_hidden(reshare));
}

#[test]
fn keywords_persist_across_engines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let feed = feed_with_root();
    {
        let store = Arc::new(
            Store::open(Options {
                path: Some(path.clone()),
            })
            .unwrap(),
        );
        let engine = start(&feed, store);
        engine.add_keyword("Spoiler").unwrap();
        engine.add_keyword("crypto").unwrap();
        thread::sleep(SETTLE);
    }

    let store = Arc::new(Store::open(Options { path: Some(path) }).unwrap());
    let engine = start(&feed, store);
    assert_eq!(
        engine.keywords(),
        vec!["spoiler".to_string(), "crypto".to_string()]
    );

    let post = feed.push_post(POST, &[("div.text", "yet another crypto post")]);
    thread::sleep(SETTLE);
    assert!(feed.is_hidden(post));
}

#[test]
fn malformed_persisted_blob_degrades_to_no_filtering() {
    let feed = feed_with_root();
    let backend = Arc::new(MemoryStore::new());
    backend.set("keywordString", "',',,'''").unwrap();

    let engine = start(&feed, backend);
    let post = feed.push_post(POST, &[("div.text", "anything at all")]);
    thread::sleep(SETTLE);

    assert!(engine.keywords().is_empty());
    assert!(feed.is_processed(post));
    assert!(!feed.is_hidden(post));
}
