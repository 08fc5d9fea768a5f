use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Identity of one post within a document, stable for the document's
/// lifetime. The host owns post creation and removal; this crate only
/// reads text and toggles visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(pub u64);

/// One batch of structural changes under an observed root.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationBatch {
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

/// Where an observer attaches.
#[derive(Debug, Clone, Copy)]
pub enum ObserveRoot<'a> {
    /// The first node matching the selector.
    Selector(&'a str),
    /// The document root.
    Document,
}

/// Narrow capability surface over the host document: enumerate posts,
/// claim their processed flag, read region text, hide, and observe
/// structural changes. Everything the filter pipeline needs and nothing
/// more, so tests can run against [`MemoryFeed`].
pub trait FeedDocument: Send + Sync {
    /// Posts matching `post_selector` whose processed flag is unset, in
    /// document order.
    fn unprocessed_posts(&self, post_selector: &str) -> Vec<PostId>;

    /// Claims the processed flag for `post`. Returns false when another
    /// visit already claimed it (or the post no longer exists); the flag
    /// is set at most once and never cleared.
    fn claim_processed(&self, post: PostId) -> bool;

    /// Text of the sub-region of `post` addressed by `selector`, or
    /// `None` when the region is missing.
    fn region_text(&self, post: PostId, selector: &str) -> Option<String>;

    /// Removes `post` from view. Visibility only ever goes one way;
    /// there is no unhide.
    fn hide(&self, post: PostId);

    fn is_hidden(&self, post: PostId) -> bool;

    /// Whether any node matches `selector`.
    fn contains(&self, selector: &str) -> bool;

    /// Structural-change feed under `root`. The sender side is dropped
    /// when the observed root disappears, which disconnects the
    /// receiver.
    fn observe(&self, root: ObserveRoot<'_>) -> Receiver<MutationBatch>;
}

#[derive(Debug)]
struct MemoryPost {
    id: PostId,
    selector: String,
    regions: Vec<(String, String)>,
    processed: bool,
    hidden: bool,
}

#[derive(Debug)]
struct Observer {
    /// `None` observes the whole document.
    root: Option<String>,
    tx: Sender<MutationBatch>,
}

#[derive(Debug, Default)]
struct FeedInner {
    next_id: u64,
    posts: Vec<MemoryPost>,
    containers: Vec<String>,
    observers: Vec<Observer>,
}

/// In-memory feed document: the backend used by the demo binary and the
/// engine tests. Posts are appended in document order; observers receive
/// one [`MutationBatch`] per append.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    inner: Mutex<FeedInner>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container node (e.g. the feed's scroll wrapper) so that
    /// [`FeedDocument::contains`] finds it.
    pub fn add_container(&self, selector: &str) {
        let mut inner = self.inner.lock();
        if !inner.containers.iter().any(|c| c == selector) {
            inner.containers.push(selector.to_owned());
        }
    }

    /// Removes a container. Observers rooted at it are dropped, which
    /// disconnects their channels.
    pub fn remove_container(&self, selector: &str) {
        let mut inner = self.inner.lock();
        inner.containers.retain(|c| c != selector);
        inner
            .observers
            .retain(|obs| obs.root.as_deref() != Some(selector));
    }

    /// Appends a post matching `post_selector` with the given
    /// `(region selector, text)` pairs and notifies observers.
    pub fn push_post(&self, post_selector: &str, regions: &[(&str, &str)]) -> PostId {
        let mut inner = self.inner.lock();
        let id = PostId(inner.next_id);
        inner.next_id += 1;
        inner.posts.push(MemoryPost {
            id,
            selector: post_selector.to_owned(),
            regions: regions
                .iter()
                .map(|(sel, text)| (sel.to_string(), text.to_string()))
                .collect(),
            processed: false,
            hidden: false,
        });
        inner
            .observers
            .retain(|obs| {
                obs.tx
                    .send(MutationBatch {
                        added_nodes: 1,
                        removed_nodes: 0,
                    })
                    .is_ok()
            });
        id
    }

    pub fn post_count(&self) -> usize {
        self.inner.lock().posts.len()
    }

    pub fn is_processed(&self, post: PostId) -> bool {
        self.inner
            .lock()
            .posts
            .iter()
            .any(|p| p.id == post && p.processed)
    }
}

impl FeedDocument for MemoryFeed {
    fn unprocessed_posts(&self, post_selector: &str) -> Vec<PostId> {
        self.inner
            .lock()
            .posts
            .iter()
            .filter(|p| p.selector == post_selector && !p.processed)
            .map(|p| p.id)
            .collect()
    }

    fn claim_processed(&self, post: PostId) -> bool {
        let mut inner = self.inner.lock();
        match inner.posts.iter_mut().find(|p| p.id == post) {
            Some(p) if !p.processed => {
                p.processed = true;
                true
            }
            _ => false,
        }
    }

    fn region_text(&self, post: PostId, selector: &str) -> Option<String> {
        let inner = self.inner.lock();
        let post = inner.posts.iter().find(|p| p.id == post)?;
        post.regions
            .iter()
            .find(|(sel, _)| sel == selector)
            .map(|(_, text)| text.clone())
    }

    fn hide(&self, post: PostId) {
        let mut inner = self.inner.lock();
        if let Some(p) = inner.posts.iter_mut().find(|p| p.id == post) {
            p.hidden = true;
        }
    }

    fn is_hidden(&self, post: PostId) -> bool {
        self.inner
            .lock()
            .posts
            .iter()
            .any(|p| p.id == post && p.hidden)
    }

    fn contains(&self, selector: &str) -> bool {
        let inner = self.inner.lock();
        inner.containers.iter().any(|c| c == selector)
            || inner.posts.iter().any(|p| {
                p.selector == selector || p.regions.iter().any(|(sel, _)| sel == selector)
            })
    }

    fn observe(&self, root: ObserveRoot<'_>) -> Receiver<MutationBatch> {
        let (tx, rx) = unbounded();
        let root = match root {
            ObserveRoot::Selector(selector) => Some(selector.to_owned()),
            ObserveRoot::Document => None,
        };
        self.inner.lock().observers.push(Observer { root, tx });
        rx
    }
}
