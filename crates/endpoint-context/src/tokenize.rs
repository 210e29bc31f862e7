//! Tokenizer and suffix stemmer shared by index build and query time.
//!
//! The stemmer is a fixed list of suffix rules, not a linguistic stemmer.
//! Index terms and query terms must go through exactly the same reduction or
//! they stop matching, so the rules here are frozen.

const SEPARATORS: &[char] = &['/', '-', '_', '.', '{', '}', '[', ']', '(', ')'];

/// Lowercase, split on whitespace and path/identifier separators, drop short
/// and numeric tokens (status codes survive), then stem.
///
/// The drop rules run again on the stemmed form: `"as"` stems to `"a"` and
/// `"10s"` to `"10"`, neither of which may reach the index.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| is_indexable(token))
        .map(stem)
        .filter(|token| is_indexable(token))
        .collect()
}

fn is_indexable(token: &str) -> bool {
    token.chars().count() >= 2 && (!is_numeric(token) || is_status_code(token))
}

/// Apply the first matching suffix rule, if any.
pub fn stem(token: &str) -> String {
    if let Some(root) = token.strip_suffix("tion") {
        if !root.is_empty() {
            return root.to_string();
        }
    }
    if let Some(root) = token.strip_suffix("ing") {
        if root.chars().count() > 5 {
            return root.to_string();
        }
    }
    if let Some(root) = token.strip_suffix("ed") {
        if root.chars().count() > 4 {
            return root.to_string();
        }
    }
    if let Some(root) = token.strip_suffix('s') {
        if !root.ends_with('s') && !root.is_empty() {
            return root.to_string();
        }
    }
    token.to_string()
}

pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Three digits with a leading 1-5, the shape of an HTTP status code.
pub fn is_status_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
}
