use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Sender};

use crate::debounce::Debouncer;
use crate::dom::{FeedDocument, ObserveRoot};

/// Watches the document for structural changes and requests a debounced
/// re-scan whenever a batch added at least one node.
///
/// Observation is rooted at `feed_root` when the document has a matching
/// node, else at the document root. When the observation channel
/// disconnects (the observed root went away), the watcher stops quietly.
pub struct ChangeWatcher {
    stop: Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ChangeWatcher {
    pub fn start(
        doc: Arc<dyn FeedDocument>,
        feed_root: &str,
        debouncer: Arc<Debouncer>,
    ) -> Self {
        let root = if !feed_root.is_empty() && doc.contains(feed_root) {
            ObserveRoot::Selector(feed_root)
        } else {
            ObserveRoot::Document
        };
        let mutations = doc.observe(root);

        let (stop_tx, stop_rx) = unbounded::<()>();
        let handle = thread::spawn(move || loop {
            crossbeam_channel::select! {
                recv(stop_rx) -> _ => break,
                recv(mutations) -> msg => match msg {
                    Ok(batch) => {
                        if batch.added_nodes > 0 {
                            debouncer.trigger();
                        }
                    }
                    Err(_) => break,
                },
            }
        });

        Self {
            stop: stop_tx,
            handle: Some(handle),
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
