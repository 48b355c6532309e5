//! AI curator chat.
//!
//! Answers visitor questions about the collection. The system prompt is
//! rebuilt from the live catalog on every turn so admin edits show up
//! immediately.

use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, warn};

use atelier_core::LanguageCode;

use crate::backend::{Backend, BackendError};
use crate::claude::{ClaudeError, Message, Role, TextGenerator};
use crate::models::Product;

/// Messages kept in a conversation; older turns are dropped.
pub const MAX_HISTORY: usize = 20;

/// Errors returned by the curator.
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("could not load the catalog: {0}")]
    Catalog(#[from] BackendError),

    #[error("curator is unavailable: {0}")]
    Unavailable(#[from] ClaudeError),
}

/// A visitor's chat history, capped at [`MAX_HISTORY`] messages.
///
/// Always starts with a user message, as the Messages API requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        let excess = self.messages.len().saturating_sub(MAX_HISTORY);
        self.messages.drain(..excess);
        while self
            .messages
            .first()
            .is_some_and(|m| m.role == Role::Assistant)
        {
            self.messages.remove(0);
        }
    }
}

/// Chat assistant grounded in the current catalog.
#[derive(Clone)]
pub struct Curator {
    backend: Arc<dyn Backend>,
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for Curator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Curator").finish_non_exhaustive()
    }
}

impl Curator {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { backend, generator }
    }

    /// Ask a question and record both sides of the exchange.
    ///
    /// On failure the conversation is left as it was.
    ///
    /// # Errors
    ///
    /// [`CuratorError::Unavailable`] if the text service fails; callers
    /// should show a friendly fallback message.
    #[instrument(skip_all, fields(lang = %language, history = conversation.len()))]
    pub async fn ask(
        &self,
        conversation: &mut Conversation,
        question: &str,
        language: &LanguageCode,
    ) -> Result<String, CuratorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CuratorError::EmptyQuestion);
        }

        let catalog = self.backend.list_products().await?;
        let system = system_prompt(&catalog, language);

        let mut draft = conversation.clone();
        draft.push(Message::user(question));

        let answer = match self.generator.generate(Some(&system), draft.messages()).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Curator request failed");
                return Err(e.into());
            }
        };

        draft.push(Message::assistant(answer.clone()));
        *conversation = draft;
        Ok(answer)
    }
}

/// System prompt describing the collection.
#[must_use]
pub fn system_prompt(catalog: &[Product], language: &LanguageCode) -> String {
    let mut prompt = String::from(
        "You are the curator of Atelier, a boutique of traditional crafts and cultural goods. \
         Answer questions about the pieces below: their origins, materials, and how to care \
         for them. Recommend only pieces from this list, and say so when something is sold out. \
         Keep answers under 120 words.\n",
    );
    let _ = writeln!(prompt, "Reply in the language with code '{language}'.");
    prompt.push_str("\nCollection:\n");

    for product in catalog {
        let stock = if product.in_stock { "in stock" } else { "sold out" };
        let _ = writeln!(
            prompt,
            "- {} ({}, {}, {stock}): {}",
            product.name, product.category, product.price, product.description
        );
    }
    prompt
}
