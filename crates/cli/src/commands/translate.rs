//! Translate arbitrary text through the resolution pipeline.

use atelier_core::LanguageCode;
use atelier_storefront::state::AppState;
use atelier_storefront::translation::Resolution;

/// Resolve `text` into `lang`, printing the interim source text while a
/// remote call is in flight.
///
/// Never fails: every error degrades to the source text.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState, text: &str, lang: &LanguageCode, key: Option<&str>) {
    let translator = state.translator();
    translator.warm(lang).await;

    match translator.resolve(text, lang, key).await {
        Resolution::Ready(text) => println!("{text}"),
        Resolution::Pending(pending) => {
            println!("{} (translating...)", pending.interim());
            println!("{}", pending.settle().await);
        }
    }
}
