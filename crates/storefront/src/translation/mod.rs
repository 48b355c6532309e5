//! Translation resolution pipeline.
//!
//! Resolves catalog and UI text into the visitor's language through a chain
//! of tiers, cheapest first:
//!
//! 1. Source language requested: text returned verbatim.
//! 2. Static dictionary, by semantic key.
//! 3. Translation memory: any known translation of the exact same text,
//!    whatever key it was filed under.
//! 4. Translation cache, by `(language, content_hash(text))`.
//! 5. Remote text generation.
//!
//! Tier 5 never blocks the caller. [`Translator::resolve`] hands back a
//! [`PendingTranslation`] that displays the source text until the remote
//! call settles. Every failure in this module is soft: the visitor sees the
//! source text and the error is only logged.

mod cache;
mod dictionary;
mod hash;

pub use cache::{CacheEntry, TranslationCache};
pub use dictionary::StaticDictionary;
pub use hash::content_hash;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use atelier_core::LanguageCode;

use crate::claude::{ClaudeError, Message, TextGenerator};
use crate::models::Product;

/// Default bound on a single remote translation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Reasons a remote translation produced nothing usable.
///
/// Never shown to visitors; logged and replaced by the source text.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service failed: {0}")]
    Remote(#[from] ClaudeError),

    #[error("translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("translation service returned an empty result")]
    Empty,

    #[error("translation service returned the input unchanged")]
    Unchanged,
}

/// Text ready for display, with a flag for the "still translating"
/// treatment (e.g. reduced opacity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    pub text: String,
    pub pending: bool,
}

impl DisplayText {
    #[must_use]
    pub fn ready(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pending: false,
        }
    }

    #[must_use]
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pending: true,
        }
    }
}

impl std::fmt::Display for DisplayText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Outcome of [`Translator::resolve`].
#[derive(Debug)]
pub enum Resolution {
    /// Resolved without a remote call.
    Ready(String),
    /// A remote call is in flight.
    Pending(PendingTranslation),
}

impl Resolution {
    /// What to show right now.
    #[must_use]
    pub fn display(&self) -> DisplayText {
        match self {
            Self::Ready(text) => DisplayText::ready(text.clone()),
            Self::Pending(pending) => pending.interim(),
        }
    }
}

/// Handle on an in-flight remote translation.
///
/// Dropping the handle discards the result for this consumer only; the
/// spawned call still finishes and writes the cache for everyone else.
#[derive(Debug)]
pub struct PendingTranslation {
    source: String,
    receiver: oneshot::Receiver<Option<String>>,
}

impl PendingTranslation {
    /// The source text, flagged as pending.
    #[must_use]
    pub fn interim(&self) -> DisplayText {
        DisplayText::pending(self.source.clone())
    }

    /// Wait for the remote call. Falls back to the source text on any
    /// failure.
    pub async fn settle(self) -> DisplayText {
        match self.receiver.await {
            Ok(Some(translated)) => DisplayText::ready(translated),
            Ok(None) | Err(_) => DisplayText::ready(self.source),
        }
    }
}

/// A product's visitor-facing text in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedProduct {
    pub name: DisplayText,
    pub description: DisplayText,
    pub history: DisplayText,
}

/// Translation pipeline.
///
/// Cheaply cloneable; clones share the cache and generator.
#[derive(Clone)]
pub struct Translator {
    inner: Arc<TranslatorInner>,
}

struct TranslatorInner {
    dictionary: StaticDictionary,
    cache: TranslationCache,
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("source", self.inner.dictionary.source())
            .field("cache", &self.inner.cache)
            .field("remote", &self.inner.generator.is_some())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl Translator {
    /// Build a translator. Without a generator, tier 5 is skipped and
    /// unknown text stays in the source language.
    #[must_use]
    pub fn new(
        dictionary: StaticDictionary,
        cache: TranslationCache,
        generator: Option<Arc<dyn TextGenerator>>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(TranslatorInner {
                dictionary,
                cache,
                generator,
                timeout,
            }),
        }
    }

    /// The language catalog text is authored in.
    #[must_use]
    pub fn source_language(&self) -> &LanguageCode {
        self.inner.dictionary.source()
    }

    #[must_use]
    pub fn cache(&self) -> &TranslationCache {
        &self.inner.cache
    }

    /// Preload persisted translations for `lang` so translation memory
    /// covers them. Failures are logged and ignored.
    pub async fn warm(&self, lang: &LanguageCode) {
        if let Err(e) = self.inner.cache.warm(lang).await {
            warn!(lang = %lang, error = %e, "Failed to warm translation cache");
        }
    }

    /// Resolve `text` into `target`, starting a remote call if no local tier
    /// knows it.
    ///
    /// `key` is the semantic identifier used for the static dictionary
    /// (e.g. `product.p-1.name`).
    #[instrument(skip_all, fields(lang = %target, key = key.unwrap_or_default()))]
    pub async fn resolve(&self, text: &str, target: &LanguageCode, key: Option<&str>) -> Resolution {
        let inner = &self.inner;

        if target == inner.dictionary.source() || text.trim().is_empty() {
            return Resolution::Ready(text.to_owned());
        }

        if let Some(key) = key
            && let Some(hit) = inner.dictionary.lookup(target, key)
        {
            return Resolution::Ready(hit.to_owned());
        }

        if let Some(hit) = inner.dictionary.reverse_lookup(target, text) {
            debug!("Translation memory hit (dictionary)");
            return Resolution::Ready(hit.to_owned());
        }

        if let Some(hit) = inner.cache.memory_lookup(target, text) {
            debug!("Translation memory hit (cache)");
            return Resolution::Ready(hit);
        }

        if let Some(hit) = inner.cache.get(target, text).await {
            return Resolution::Ready(hit);
        }

        let Some(generator) = inner.generator.clone() else {
            debug!("No translation service configured, showing source text");
            return Resolution::Ready(text.to_owned());
        };

        let (sender, receiver) = oneshot::channel();
        let task = RemoteTranslation {
            generator,
            cache: inner.cache.clone(),
            source_language: inner.dictionary.source().clone(),
            target: target.clone(),
            text: text.to_owned(),
            timeout: inner.timeout,
        };
        tokio::spawn(async move {
            let outcome = task.run().await;
            // A closed channel means the consumer went away; the cache is already written.
            let _ = sender.send(outcome);
        });

        Resolution::Pending(PendingTranslation {
            source: text.to_owned(),
            receiver,
        })
    }

    /// Resolve and wait for the final text.
    pub async fn translate(&self, text: &str, target: &LanguageCode, key: Option<&str>) -> DisplayText {
        match self.resolve(text, target, key).await {
            Resolution::Ready(text) => DisplayText::ready(text),
            Resolution::Pending(pending) => pending.settle().await,
        }
    }

    /// Translate a product's name, description and history concurrently.
    pub async fn localize_product(&self, product: &Product, target: &LanguageCode) -> LocalizedProduct {
        let name_key = product.field_key("name");
        let description_key = product.field_key("description");
        let history_key = product.field_key("history");

        let (name, description, history) = tokio::join!(
            self.translate(&product.name, target, Some(&name_key)),
            self.translate(&product.description, target, Some(&description_key)),
            self.translate(&product.history, target, Some(&history_key)),
        );

        LocalizedProduct {
            name,
            description,
            history,
        }
    }
}

/// One remote call plus its cache write, run on a spawned task.
struct RemoteTranslation {
    generator: Arc<dyn TextGenerator>,
    cache: TranslationCache,
    source_language: LanguageCode,
    target: LanguageCode,
    text: String,
    timeout: Duration,
}

impl RemoteTranslation {
    async fn run(self) -> Option<String> {
        match self.fetch().await {
            Ok(translated) => {
                if let Err(e) = self.cache.put(&self.target, &self.text, &translated).await {
                    warn!(lang = %self.target, error = %e, "Translation not cached");
                }
                Some(translated)
            }
            Err(e @ (TranslationError::Unchanged | TranslationError::Empty)) => {
                debug!(lang = %self.target, reason = %e, "Discarding degenerate translation");
                None
            }
            Err(e) => {
                warn!(lang = %self.target, error = %e, "Remote translation failed");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<String, TranslationError> {
        let system = translation_prompt(&self.source_language, &self.target);
        let messages = [Message::user(self.text.clone())];

        let raw = tokio::time::timeout(
            self.timeout,
            self.generator.generate(Some(&system), &messages),
        )
        .await
        .map_err(|_| TranslationError::Timeout(self.timeout))??;

        let translated = raw.trim();
        if translated.is_empty() {
            return Err(TranslationError::Empty);
        }
        if translated == self.text.trim() {
            return Err(TranslationError::Unchanged);
        }
        Ok(translated.to_owned())
    }
}

fn translation_prompt(source: &LanguageCode, target: &LanguageCode) -> String {
    format!(
        "You translate product copy for a boutique of cultural goods. \
         Translate the user's text from language code '{source}' into language code '{target}'. \
         Keep proper nouns and craft terms. \
         Reply with the translated text only, without quotes or commentary."
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreKeys};
    use crate::testing::{Reply, ScriptedGenerator};

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn translator(store: Arc<MemoryStore>, generator: Option<Arc<ScriptedGenerator>>) -> Translator {
        let generator = generator.map(|g| g as Arc<dyn TextGenerator>);
        Translator::new(
            StaticDictionary::bundled(LanguageCode::english()).unwrap(),
            TranslationCache::new(store, StoreKeys::default()),
            generator,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_source_language_is_verbatim() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("fr:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));

        let out = t.translate("Anything at all", &lang("en"), None).await;
        assert_eq!(out, DisplayText::ready("Anything at all"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_dictionary_key_wins() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("fr:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));

        let out = t.translate("Your cart", &lang("fr"), Some("ui.cart.title")).await;
        assert_eq!(out.text, "Votre panier");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_translation_memory_ignores_key() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("fr:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));

        // Same text as p-6's name, filed under a different entity.
        let out = t
            .translate("Murano Glass Beads", &lang("fr"), Some("product.custom-9.name"))
            .await;
        assert_eq!(out.text, "Perles de verre de Murano");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_result_is_pending_then_cached() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("fr:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));

        let resolution = t.resolve("Hand-carved olive spoon", &lang("fr"), None).await;
        assert_eq!(
            resolution.display(),
            DisplayText::pending("Hand-carved olive spoon")
        );
        let Resolution::Pending(pending) = resolution else {
            panic!("expected a remote call");
        };
        assert_eq!(pending.settle().await.text, "fr:Hand-carved olive spoon");

        let again = t.translate("Hand-carved olive spoon", &lang("fr"), None).await;
        assert_eq!(again, DisplayText::ready("fr:Hand-carved olive spoon"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_result_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(ScriptedGenerator::new(Reply::Echo));
        let t = translator(store.clone(), Some(generator.clone()));

        let out = t.translate("Kilim", &lang("it"), None).await;
        assert_eq!(out, DisplayText::ready("Kilim"));
        assert!(store.is_empty().await);

        t.translate("Kilim", &lang("it"), None).await;
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_source() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(ScriptedGenerator::new(Reply::Fail));
        let t = translator(store.clone(), Some(generator.clone()));

        let out = t.translate("Lacquered box", &lang("it"), None).await;
        assert_eq!(out, DisplayText::ready("Lacquered box"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_source() {
        let generator = Arc::new(
            ScriptedGenerator::new(Reply::Prefix("it:".into())).with_delay(Duration::from_secs(60)),
        );
        let t = Translator::new(
            StaticDictionary::empty(LanguageCode::english()),
            TranslationCache::new(Arc::new(MemoryStore::new()), StoreKeys::default()),
            Some(generator),
            Duration::from_millis(20),
        );

        let out = t.translate("Lacquered box", &lang("it"), None).await;
        assert_eq!(out, DisplayText::ready("Lacquered box"));
    }

    #[tokio::test]
    async fn test_dropped_consumer_still_writes_cache() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(
            ScriptedGenerator::new(Reply::Prefix("it:".into())).with_delay(Duration::from_millis(20)),
        );
        let t = translator(store.clone(), Some(generator.clone()));

        let resolution = t.resolve("Painted gourd", &lang("it"), None).await;
        assert!(matches!(resolution, Resolution::Pending(_)));
        drop(resolution);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            t.cache().get(&lang("it"), "Painted gourd").await.as_deref(),
            Some("it:Painted gourd")
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_without_generator_degrades_to_source() {
        let t = translator(Arc::new(MemoryStore::new()), None);
        let resolution = t.resolve("Painted gourd", &lang("it"), None).await;
        assert!(matches!(resolution, Resolution::Ready(ref text) if text == "Painted gourd"));
    }

    #[tokio::test]
    async fn test_localize_seeded_product_uses_dictionary() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("it:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));
        let product = crate::backend::seed_catalog().unwrap().remove(0);

        let localized = t.localize_product(&product, &lang("it")).await;
        assert_eq!(localized.name.text, "Scialle di seta ikat");
        assert!(localized.history.text.starts_with("La tessitura ikat"));
        assert!(!localized.history.pending);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_localize_new_product_goes_remote_per_field() {
        let generator = Arc::new(ScriptedGenerator::new(Reply::Prefix("it:".into())));
        let t = translator(Arc::new(MemoryStore::new()), Some(generator.clone()));
        let mut product = crate::backend::seed_catalog().unwrap().remove(0);
        product.id = atelier_core::ProductId::new("1760000000000-k7x2qa");
        product.history = "Dyed with indigo grown on the same farm.".to_string();

        let localized = t.localize_product(&product, &lang("it")).await;
        // Name and description still match source text in the dictionary.
        assert_eq!(localized.name.text, "Scialle di seta ikat");
        assert_eq!(
            localized.history.text,
            "it:Dyed with indigo grown on the same farm."
        );
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn test_prompt_names_both_languages() {
        let prompt = translation_prompt(&lang("en"), &lang("fr"));
        assert!(prompt.contains("'en'"));
        assert!(prompt.contains("'fr'"));
    }
}
