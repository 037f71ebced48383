use sha2::{Digest, Sha256};

/// Lower-cases, trims and collapses internal whitespace to single spaces.
pub fn normalize_question(question: &str) -> String {
    question
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 of the normalized question.
#[inline]
pub fn hash_question(question: &str) -> [u8; 32] {
    Sha256::digest(normalize_question(question).as_bytes()).into()
}

/// Hex-encoded [`hash_question`]; this is the fact store key.
///
/// Two questions that differ only in case or spacing share a key:
///
/// ```
/// use arbiter::hashing::question_key;
///
/// assert_eq!(question_key("What Is X?"), question_key("what   is x?"));
/// ```
#[inline]
pub fn question_key(question: &str) -> String {
    hex::encode(hash_question(question))
}

/// First eight hex characters of a key, for log fields.
#[inline]
pub fn short_key(key: &str) -> &str {
    key.get(..8).unwrap_or(key)
}
