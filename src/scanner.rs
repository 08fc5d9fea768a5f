use std::sync::Arc;

use crate::dom::{FeedDocument, PostId};
use crate::keywords::KeywordStore;
use crate::matcher;

/// Tally of one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Posts whose processed flag this pass claimed.
    pub processed: usize,
    /// Posts this pass hid.
    pub hidden: usize,
}

/// Visits unprocessed posts, extracts their text, and hides the ones
/// matching the current keyword set.
///
/// Each post is processed at most once: the processed flag is claimed
/// before any text extraction, and posts that lost the claim are
/// skipped. A scan never re-evaluates or re-shows a processed post, so
/// removing a keyword does not restore posts hidden earlier; only posts
/// scanned after the edit see the updated set.
pub struct FeedScanner {
    doc: Arc<dyn FeedDocument>,
    keywords: Arc<KeywordStore>,
    post_selector: String,
    region_selectors: Vec<String>,
}

impl FeedScanner {
    pub fn new(
        doc: Arc<dyn FeedDocument>,
        keywords: Arc<KeywordStore>,
        post_selector: String,
        region_selectors: Vec<String>,
    ) -> Self {
        Self {
            doc,
            keywords,
            post_selector,
            region_selectors,
        }
    }

    /// One pass over the document, in document order, against a snapshot
    /// of the keyword set taken at the start of the pass.
    pub fn scan(&self) -> ScanOutcome {
        let keywords = self.keywords.keywords();
        let mut outcome = ScanOutcome::default();
        for post in self.doc.unprocessed_posts(&self.post_selector) {
            if !self.doc.claim_processed(post) {
                continue;
            }
            outcome.processed += 1;
            let text = self.extract(post);
            if matcher::matches(&text, &keywords) {
                self.doc.hide(post);
                outcome.hidden += 1;
            }
        }
        outcome
    }

    /// Region texts in configured order, single-space separated. A
    /// missing region contributes nothing.
    fn extract(&self, post: PostId) -> String {
        let mut parts = Vec::new();
        for selector in &self.region_selectors {
            if let Some(text) = self.doc.region_text(post, selector) {
                parts.push(text);
            }
        }
        parts.join(" ")
    }
}
