//! Numeral search through noun chunks.
//!
//! The quantity for a reporting unit usually sits inside the unit's own
//! noun chunk ("2,000 people"). In conjunctions it can sit one chunk to
//! the left ("500 families and individuals"), and failing both, a numeral
//! child of the unit token is accepted.

use displace_core::{Fact, FactKind, Pos, Span, Token};

/// Number words accepted alongside genuine numerals.
const VAGUE_QUANTITIES: &[&str] = &["dozens", "hundreds", "thousands", "fifty"];

/// Whether a token counts as a quantity: a parser-flagged number, a NUM
/// tag, or one of the vague number words.
pub fn is_numeral_like(token: Token<'_>) -> bool {
    VAGUE_QUANTITIES.contains(&token.text()) || token.like_num() || token.pos() == Pos::Num
}

/// First numeral-like token inside a chunk, as a quantity fact.
pub fn quantity_in_phrase(phrase: &Span<'_>) -> Option<Fact> {
    phrase
        .tokens()
        .find(|t| is_numeral_like(*t))
        .map(|t| Fact::from_token(FactKind::Quantity, t))
}

/// Find the quantity attached to a reporting unit.
///
/// Walks the sentence's noun chunks; for every chunk containing the unit,
/// searches that chunk and then the chunk before it. As a last resort any
/// numeral-like child of the unit token is taken.
pub fn quantity<'a>(sentence: &Span<'a>, unit: Token<'a>) -> Option<Fact> {
    let chunks: Vec<Span<'a>> = sentence.noun_chunks().collect();
    let mut found = None;
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.contains(unit) {
            found = quantity_in_phrase(chunk);
            if found.is_none() && i > 0 {
                found = quantity_in_phrase(&chunks[i - 1]);
            }
        }
    }
    found.or_else(|| {
        unit.children()
            .find(|c| is_numeral_like(*c))
            .map(|c| Fact::from_token(FactKind::Quantity, c))
    })
}
