//! Character-count token approximation.
//!
//! Used only when the upstream API never reports usage for a response. The
//! result is a rough guess, not a tokenizer count; callers that record it must
//! flag the value as estimated.

/// Characters assumed per token.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Estimate token count from text using the chars/4 heuristic.
///
/// Uses ceiling division to avoid underestimating by a fraction.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(CHARS_PER_TOKEN)
}
