//! Application state shared across the storefront.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use atelier_core::LanguageCode;

use crate::admin::AdminSession;
use crate::backend::{Backend, BackendError, Latency, LocalBackend};
use crate::checkout::{CheckoutFlow, Pacing};
use crate::claude::{ClaudeClient, ClaudeError, TextGenerator};
use crate::config::StorefrontConfig;
use crate::curator::Curator;
use crate::store::{FileStore, KeyValueStore, StoreError, StoreKeys};
use crate::translation::{DEFAULT_TIMEOUT, StaticDictionary, TranslationCache, Translator};

/// Error building application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),
    #[error("failed to open backend: {0}")]
    Backend(#[from] BackendError),
    #[error("bundled dictionary is invalid: {0}")]
    Dictionary(#[from] serde_json::Error),
    #[error("failed to create Claude client: {0}")]
    Claude(#[from] ClaudeError),
}

/// Application state shared across all consumers.
///
/// This struct is cheaply cloneable via `Arc`. Everything in it is built
/// once per process; consumers receive it instead of reaching for globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    translator: Translator,
    curator: Option<Curator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("translator", &self.inner.translator)
            .field("curator", &self.inner.curator.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Open the file-backed store and build every service from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created, the stored
    /// records are unreadable, or the Claude client cannot be built.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = FileStore::open(config.data_dir.clone()).await?;
        let generator = match config.claude() {
            Some(claude) => Some(Arc::new(ClaudeClient::new(claude)?) as Arc<dyn TextGenerator>),
            None => None,
        };
        Self::with_parts(config, Arc::new(store), generator).await
    }

    /// Build state over an explicit store and text generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub async fn with_parts(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self, StateError> {
        let keys = StoreKeys::new(config.store_prefix.clone());
        let latency = Latency::from_flag(config.simulate_latency);
        let backend: Arc<dyn Backend> =
            Arc::new(LocalBackend::open(store.clone(), keys.clone(), latency).await?);

        let timeout = config.claude().map_or(DEFAULT_TIMEOUT, |c| c.timeout);
        let translator = Translator::new(
            StaticDictionary::bundled(config.source_language.clone())?,
            TranslationCache::new(store, keys),
            generator.clone(),
            timeout,
        );
        let curator = generator.map(|g| Curator::new(backend.clone(), g));

        info!(
            prefix = %config.store_prefix,
            simulate_latency = config.simulate_latency,
            remote_translation = curator.is_some(),
            "Storefront state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                translator,
                curator,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The backend facade.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn Backend> {
        self.inner.backend.clone()
    }

    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.inner.translator
    }

    /// The curator chat, if a text service is configured.
    #[must_use]
    pub fn curator(&self) -> Option<&Curator> {
        self.inner.curator.as_ref()
    }

    /// A fresh, locked admin session.
    #[must_use]
    pub fn admin_session(&self) -> AdminSession {
        AdminSession::new(self.backend())
    }

    /// A new checkout recording `language` on the order, paced like the
    /// backend.
    #[must_use]
    pub fn checkout(&self, language: LanguageCode) -> CheckoutFlow {
        let pacing = if self.inner.config.simulate_latency {
            Pacing::simulated()
        } else {
            Pacing::instant()
        };
        CheckoutFlow::new(self.backend(), language).with_pacing(pacing)
    }
}
