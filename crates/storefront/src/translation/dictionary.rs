//! Static per-language dictionary bundled with the binary.

use rustc_hash::FxHashMap;

use atelier_core::LanguageCode;

const BUNDLED: &str = include_str!("../../fixtures/dictionary.json");

type Entries = FxHashMap<String, String>;

/// Hand-maintained `key -> text` tables, one per language.
///
/// Keys are semantic identifiers such as `ui.cart.total` or
/// `product.p-1.name`; the source-language table doubles as the index for
/// reverse lookups by text.
#[derive(Debug, Clone, Default)]
pub struct StaticDictionary {
    source: LanguageCode,
    languages: FxHashMap<String, Entries>,
}

impl StaticDictionary {
    /// The dictionary shipped in `fixtures/dictionary.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled JSON is malformed.
    pub fn bundled(source: LanguageCode) -> Result<Self, serde_json::Error> {
        Self::from_json(source, BUNDLED)
    }

    /// Parse a `{ "lang": { "key": "text" } }` document.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` does not have that shape.
    pub fn from_json(source: LanguageCode, json: &str) -> Result<Self, serde_json::Error> {
        let languages: FxHashMap<String, Entries> = serde_json::from_str(json)?;
        Ok(Self { source, languages })
    }

    /// An empty dictionary; every lookup misses.
    #[must_use]
    pub fn empty(source: LanguageCode) -> Self {
        Self {
            source,
            languages: FxHashMap::default(),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &LanguageCode {
        &self.source
    }

    /// Exact lookup by key.
    #[must_use]
    pub fn lookup(&self, lang: &LanguageCode, key: &str) -> Option<&str> {
        self.languages
            .get(lang.as_str())?
            .get(key)
            .map(String::as_str)
    }

    /// Find any key whose source-language text equals `text` and return that
    /// key's rendering in `lang`.
    ///
    /// When several keys share the same source text the first one with a
    /// target rendering wins; they are expected to agree.
    #[must_use]
    pub fn reverse_lookup(&self, lang: &LanguageCode, text: &str) -> Option<&str> {
        let source = self.languages.get(self.source.as_str())?;
        let target = self.languages.get(lang.as_str())?;
        source
            .iter()
            .filter(|(_, value)| value.as_str() == text)
            .find_map(|(key, _)| target.get(key))
            .map(String::as_str)
    }

    /// Number of keys known for `lang`.
    #[must_use]
    pub fn entry_count(&self, lang: &LanguageCode) -> usize {
        self.languages.get(lang.as_str()).map_or(0, FxHashMap::len)
    }
}
