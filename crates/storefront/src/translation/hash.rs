//! Content hash for translation cache keys.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Fast non-cryptographic hash of `text`, as 16 lowercase hex digits.
///
/// Two different texts can collide. The cache stores the source text next to
/// each translation and treats a source mismatch as a miss, so a collision
/// costs a re-translation rather than a wrong one. The hash is only stable
/// for a given `rustc-hash` major version; bump the store prefix when
/// upgrading it.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    format!("{:016x}", hasher.finish())
}
