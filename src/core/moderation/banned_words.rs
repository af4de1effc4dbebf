// Banned-word filter.
//
// The list is a plain line-delimited file loaded once at startup. Matching is
// a case-insensitive *substring* scan: there is no tokenizing or word-boundary
// handling, so "ass" matches "class". That over-matching is the board's
// documented behavior and must not be "fixed" here.

use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;

static BANNED_WORDS: OnceCell<Arc<BannedWords>> = OnceCell::new();

/// Ordered list of lowercase banned words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedWords {
    words: Vec<String>,
}

impl BannedWords {
    /// Build a list, trimming and lowercasing each entry. Blank entries are
    /// dropped since an empty pattern is contained in every text.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parse a line-delimited list.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Load the list from disk. A missing or unreadable file gives an empty
    /// list and a warning; the board keeps running unfiltered.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let list = Self::parse(&text);
                tracing::info!(
                    path = %path.display(),
                    count = list.len(),
                    "Banned words loaded"
                );
                list
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Banned words file could not be read; filtering is disabled"
                );
                Self::default()
            }
        }
    }

    /// First word (in list order) contained in `text`, ignoring case.
    pub fn find_banned_word(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.words
            .iter()
            .map(String::as_str)
            .find(|word| lowered.contains(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Install the process-wide list. The first call wins; later calls are
/// ignored and return the list already installed.
pub fn init_banned_words(list: BannedWords) -> Arc<BannedWords> {
    let mut fresh = Some(list);
    let installed = BANNED_WORDS.get_or_init(|| Arc::new(fresh.take().unwrap_or_default()));
    if fresh.is_some() {
        tracing::warn!("Banned words already initialized; ignoring second list");
    }
    Arc::clone(installed)
}

/// The process-wide list, or an empty one if `init_banned_words` never ran.
pub fn banned_words() -> Arc<BannedWords> {
    BANNED_WORDS.get().cloned().unwrap_or_default()
}
