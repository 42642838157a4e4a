//! Drop-zone digest.

use sha1::{Digest, Sha1};

/// Sorts case-insensitively, lowercases and joins with single spaces.
///
/// `["b", "A"]` normalizes to `"a b"` regardless of input order.
pub fn normalized_text<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut lowered: Vec<String> = tokens
        .iter()
        .map(|token| token.as_ref().to_lowercase())
        .collect();
    lowered.sort();
    lowered.join(" ")
}

/// Lowercase hex SHA-1 of the UTF-8 bytes of `text`.
pub fn sha1_hex(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest of a drop zone; `None` for an empty zone.
pub fn tokens_digest<S: AsRef<str>>(tokens: &[S]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(sha1_hex(&normalized_text(tokens)))
}

#[cfg(test)]
mod tests {
    use super::{normalized_text, sha1_hex, tokens_digest};

    #[test]
    fn sha1_matches_known_vectors() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(sha1_hex(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn normalization_ignores_case_and_order() {
        assert_eq!(normalized_text(&["b", "A"]), "a b");
        assert_eq!(normalized_text(&["A", "b"]), "a b");
    }

    #[test]
    fn digest_is_order_independent_and_absent_when_empty() {
        let first = tokens_digest(&["b", "A"]).unwrap();
        let second = tokens_digest(&["A", "b"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, sha1_hex("a b"));
        assert_eq!(first.len(), 40);
        let empty: [&str; 0] = [];
        assert_eq!(tokens_digest(&empty), None);
    }
}
