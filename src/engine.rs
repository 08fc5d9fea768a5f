use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::FilterConfig;
use crate::debounce::Debouncer;
use crate::dom::FeedDocument;
use crate::keywords::KeywordStore;
use crate::scanner::{FeedScanner, ScanOutcome};
use crate::storage::ValueStore;
use crate::watcher::ChangeWatcher;

/// The assembled filter pipeline for one document: keyword store →
/// scanner → debouncer → change watcher. Starting an engine loads the
/// persisted keywords, begins observing the document, and requests the
/// initial scan through the debouncer.
///
/// The edit surface (`add_keyword`, `remove_keyword`) is what a panel or
/// context-menu UI calls into; each edit persists synchronously and, if
/// the set changed, requests a debounced re-scan.
pub struct Engine {
    keywords: Arc<KeywordStore>,
    scanner: Arc<FeedScanner>,
    // The watcher holds a debouncer handle; dropping it first lets the
    // debouncer shut down from this thread.
    _watcher: ChangeWatcher,
    debouncer: Arc<Debouncer>,
}

impl Engine {
    pub fn start(
        doc: Arc<dyn FeedDocument>,
        backend: Arc<dyn ValueStore>,
        filter: FilterConfig,
    ) -> Result<Self> {
        let keywords =
            Arc::new(KeywordStore::load(backend).context("engine: load keywords")?);
        let scanner = Arc::new(FeedScanner::new(
            doc.clone(),
            keywords.clone(),
            filter.post_selector.clone(),
            filter.region_selectors.clone(),
        ));

        let debouncer = {
            let scanner = scanner.clone();
            Arc::new(Debouncer::new(filter.debounce_window, move || {
                scanner.scan();
            }))
        };
        let watcher = ChangeWatcher::start(doc, &filter.feed_root_selector, debouncer.clone());

        debouncer.trigger();

        Ok(Self {
            keywords,
            scanner,
            _watcher: watcher,
            debouncer,
        })
    }

    /// Adds a keyword; on an actual change, persists and requests a
    /// debounced re-scan. Empty and duplicate words are no-ops.
    pub fn add_keyword(&self, word: &str) -> Result<bool> {
        let changed = self.keywords.add(word)?;
        if changed {
            self.debouncer.trigger();
        }
        Ok(changed)
    }

    /// Removes a keyword; persists either way, re-scans on change.
    /// Posts already processed keep their visibility.
    pub fn remove_keyword(&self, word: &str) -> Result<bool> {
        let changed = self.keywords.remove(word)?;
        if changed {
            self.debouncer.trigger();
        }
        Ok(changed)
    }

    pub fn keywords(&self) -> Vec<String> {
        self.keywords.keywords()
    }

    /// Synchronous scan, bypassing the debouncer. Used by the CLI demo
    /// and tests; the watcher path goes through the debouncer.
    pub fn scan_now(&self) -> ScanOutcome {
        self.scanner.scan()
    }
}
