//! One-shot question to the curator.

use atelier_core::LanguageCode;
use atelier_storefront::curator::{Conversation, CuratorError};
use atelier_storefront::error::{AppError, Result};
use atelier_storefront::state::AppState;

const UNAVAILABLE: &str =
    "The curator is away from the gallery right now. Please try again in a moment.";

/// Ask `question` and print the answer.
///
/// A failing text service prints a friendly fallback instead of an error.
///
/// # Errors
///
/// [`AppError::InvalidInput`] if no text service is configured or the
/// question is blank.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState, question: &str, lang: &LanguageCode) -> Result<()> {
    let Some(curator) = state.curator() else {
        return Err(AppError::InvalidInput(
            "the curator needs ANTHROPIC_API_KEY to be set".to_string(),
        ));
    };

    let mut conversation = Conversation::new();
    match curator.ask(&mut conversation, question, lang).await {
        Ok(answer) => println!("{answer}"),
        Err(e @ CuratorError::Unavailable(_)) => {
            AppError::from(e).report();
            println!("{UNAVAILABLE}");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
