/// True iff `text` is non-empty and at least one keyword is a
/// case-insensitive substring of it. An empty keyword set never matches.
///
/// Pure over the given snapshot; callers pass a clone of the keyword set
/// so concurrent edits cannot change the outcome mid-call.
pub fn matches(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() || keywords.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && haystack.contains(&keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn empty_keyword_set_never_matches() {
        assert!(!matches("anything at all", &[]));
        assert!(!matches("", &[]));
    }

    #[test]
    fn empty_text_never_matches() {
        assert!(!matches("", &keywords(&["spoiler"])));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let kw = keywords(&["spoiler"]);
        assert!(matches("Big SPOILER inside", &kw));
        assert!(matches("spoilers ahead", &kw));
        assert!(!matches("nothing here", &kw));
    }

    #[test]
    fn any_keyword_suffices() {
        let kw = keywords(&["crypto", "spoiler"]);
        assert!(matches("breaking Crypto news", &kw));
        assert!(matches("a spoiler thread", &kw));
        assert!(!matches("plain post", &kw));
    }

    #[test]
    fn non_ascii_case_folding() {
        assert!(matches("ПРИВЕТ мир", &keywords(&["привет"])));
        assert!(matches("café DOUBLÉ", &keywords(&["doublé"])));
    }
}
