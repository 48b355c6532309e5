//! Test doubles shared by unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::claude::{ClaudeError, Message, Role, TextGenerator};

/// How a [`ScriptedGenerator`] answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return the last user message unchanged.
    Echo,
    /// Always return this text.
    Fixed(String),
    /// Return the last user message with this prefix.
    Prefix(String),
    /// Fail as if the service were overloaded.
    Fail,
}

/// A [`TextGenerator`] with canned answers that counts its calls.
#[derive(Debug)]
pub struct ScriptedGenerator {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    last_system: Mutex<Option<String>>,
}

impl ScriptedGenerator {
    #[must_use]
    pub const fn new(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_system: Mutex::const_new(None),
        }
    }

    /// Sleep this long before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `generate` calls so far, including ones still sleeping.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// System prompt of the most recent call.
    pub async fn last_system(&self) -> Option<String> {
        self.last_system.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        system: Option<&str>,
        messages: &[Message],
    ) -> Result<String, ClaudeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().await = system.map(str::to_owned);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        match &self.reply {
            Reply::Echo => Ok(last_user),
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Prefix(prefix) => Ok(format!("{prefix}{last_user}")),
            Reply::Fail => Err(ClaudeError::Api {
                error_type: "overloaded_error".to_string(),
                message: "Overloaded".to_string(),
            }),
        }
    }
}
