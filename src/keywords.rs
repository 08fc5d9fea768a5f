use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use crate::storage::ValueStore;

/// Settings key holding the serialized keyword list.
pub const STORAGE_KEY: &str = "keywordString";

/// Ordered set of filter keywords, case-insensitively unique, persisted
/// as a single blob under [`STORAGE_KEY`].
///
/// Keywords are normalized on entry (trimmed, lowercased); empty results
/// and duplicates are silently ignored. Edits persist synchronously
/// before returning.
pub struct KeywordStore {
    backend: Arc<dyn ValueStore>,
    words: RwLock<Vec<String>>,
}

impl KeywordStore {
    /// Reads the persisted blob and decodes it. An absent key or a
    /// malformed blob degrades to fewer (or zero) keywords, never an
    /// error; only backend I/O failures propagate.
    pub fn load(backend: Arc<dyn ValueStore>) -> Result<Self> {
        let blob = backend
            .get(STORAGE_KEY)
            .context("keywords: read persisted blob")?
            .unwrap_or_default();
        Ok(Self {
            backend,
            words: RwLock::new(decode(&blob)),
        })
    }

    /// Snapshot of the current set in insertion order.
    pub fn keywords(&self) -> Vec<String> {
        self.words.read().clone()
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = normalize(word);
        self.words.read().iter().any(|k| *k == word)
    }

    /// Appends a normalized keyword and persists. Returns false (and
    /// skips the write) when the normalized word is empty or already
    /// present.
    pub fn add(&self, word: &str) -> Result<bool> {
        let word = normalize(word);
        if word.is_empty() {
            return Ok(false);
        }
        {
            let mut words = self.words.write();
            if words.iter().any(|k| *k == word) {
                return Ok(false);
            }
            words.push(word);
        }
        self.save()?;
        Ok(true)
    }

    /// Removes a keyword by case-insensitive match. Persists whether or
    /// not anything was removed; returns whether the set changed.
    pub fn remove(&self, word: &str) -> Result<bool> {
        let word = normalize(word);
        let changed = {
            let mut words = self.words.write();
            let before = words.len();
            words.retain(|k| *k != word);
            words.len() != before
        };
        self.save()?;
        Ok(changed)
    }

    /// Encodes the current set and overwrites the persisted value.
    pub fn save(&self) -> Result<()> {
        let blob = encode(&self.words.read());
        self.backend
            .set(STORAGE_KEY, &blob)
            .context("keywords: persist blob")
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Encodes keywords as `'a','b','c'` (empty set: `''`).
///
/// The scheme cannot represent every string: [`decode`] strips quote
/// characters and splits on commas, so a keyword containing `'` or `,`
/// does not round-trip exactly. Kept as-is for compatibility with
/// previously persisted blobs.
pub fn encode(words: &[String]) -> String {
    format!("'{}'", words.join("','"))
}

/// Decodes a persisted blob: strip quotes, split on commas, trim,
/// lowercase, drop empty and duplicate tokens. Never fails; malformed
/// input yields fewer keywords.
pub fn decode(blob: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for token in blob.replace('\'', "").split(',') {
        let word = normalize(token);
        if word.is_empty() || words.iter().any(|k| *k == word) {
            continue;
        }
        words.push(word);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> KeywordStore {
        KeywordStore::load(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn encode_decode_roundtrip_preserves_order() {
        let words = vec!["spoiler".to_string(), "crypto".to_string(), "ad".to_string()];
        assert_eq!(decode(&encode(&words)), words);
        assert_eq!(encode(&words), "'spoiler','crypto','ad'");
    }

    #[test]
    fn empty_set_roundtrip() {
        let words: Vec<String> = Vec::new();
        assert_eq!(encode(&words), "''");
        assert!(decode("''").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn decode_tolerates_malformed_blobs() {
        assert_eq!(decode(",,'a',, ,"), vec!["a".to_string()]);
        assert_eq!(decode("'''"), Vec::<String>::new());
        assert_eq!(decode("  A , b "), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(decode("'a','A','a'"), vec!["a".to_string()]);
    }

    #[test]
    fn quotes_inside_keywords_are_lossy() {
        let words = vec!["it's".to_string()];
        assert_eq!(decode(&encode(&words)), vec!["its".to_string()]);
    }

    #[test]
    fn add_normalizes_and_persists() {
        let store = store();
        assert!(store.add("  Spoiler ").unwrap());
        assert_eq!(store.keywords(), vec!["spoiler".to_string()]);
        assert!(store.contains("SPOILER"));
    }

    #[test]
    fn add_duplicate_is_noop() {
        let store = store();
        assert!(store.add("foo").unwrap());
        assert!(!store.add("foo").unwrap());
        assert!(!store.add("FOO ").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_empty_is_noop() {
        let store = store();
        assert!(!store.add("").unwrap());
        assert!(!store.add("   ").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_is_case_insensitive_and_idempotent() {
        let store = store();
        store.add("foo").unwrap();
        store.add("bar").unwrap();
        assert!(store.remove("FOO").unwrap());
        assert_eq!(store.keywords(), vec!["bar".to_string()]);
        assert!(!store.remove("foo").unwrap());
        assert_eq!(store.keywords(), vec!["bar".to_string()]);
    }

    #[test]
    fn reload_sees_persisted_set() {
        let backend: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let store = KeywordStore::load(backend.clone()).unwrap();
        store.add("spoiler").unwrap();
        store.add("crypto").unwrap();

        let reloaded = KeywordStore::load(backend).unwrap();
        assert_eq!(
            reloaded.keywords(),
            vec!["spoiler".to_string(), "crypto".to_string()]
        );
    }
}
