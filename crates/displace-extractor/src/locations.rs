//! Place-entity extraction scoped to a parse subtree.
//!
//! A sentence can mention several places with different roles ("floods hit
//! London, said officials in Paris"). Scoping to the reporting verb's
//! descendants and then growing a contiguous syntactic block around the
//! candidate tokens separates event locations from incidental mentions.
//! When the block test cannot decide, every place entity is returned and
//! disambiguation is deferred to a later merge stage.

use std::collections::HashSet;

use displace_core::{EntityLabel, Fact, FactKind, Span, Token};

/// Tokens of `sentence` strictly below `root` in the parse tree.
fn descendants<'a>(sentence: &Span<'a>, root: Token<'a>) -> Vec<Token<'a>> {
    sentence
        .tokens()
        .filter(|t| root.is_ancestor_of(*t))
        .collect()
}

/// Ancestor tokens shared by every token in `tokens`.
fn common_ancestors<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let Some(first) = tokens.first() else {
        return Vec::new();
    };
    let mut common: Vec<Token<'a>> = first.ancestors().collect();
    for token in &tokens[1..] {
        let ancestors: HashSet<usize> = token.ancestors().map(|a| a.i()).collect();
        common.retain(|a| ancestors.contains(&a.i()));
    }
    common
}

/// Grow the contiguous syntactic block over `tokens`.
///
/// Seeded with tokens headed by a common ancestor, then closed under two
/// relations: a token joins if its head is already in the block, or if it
/// is an ancestor of a block member.
fn contiguous_block<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let common: HashSet<usize> = common_ancestors(tokens).iter().map(|t| t.i()).collect();
    let mut block: Vec<Token<'a>> = tokens
        .iter()
        .copied()
        .filter(|t| common.contains(&t.head().i()))
        .collect();
    let mut in_block: HashSet<usize> = block.iter().map(|t| t.i()).collect();
    loop {
        let mut added = 0;
        for token in tokens {
            if in_block.contains(&token.i()) {
                continue;
            }
            let joins = in_block.contains(&token.head().i())
                || block.iter().any(|member| token.is_ancestor_of(*member));
            if joins {
                block.push(*token);
                in_block.insert(token.i());
                added += 1;
            }
        }
        if added == 0 {
            break;
        }
    }
    block
}

/// Entities whose every token belongs to `block`. Partial containment
/// does not count.
fn entities_fully_in_block<'a>(entities: &[Span<'a>], block: &[Token<'a>]) -> Vec<Span<'a>> {
    let in_block: HashSet<usize> = block.iter().map(|t| t.i()).collect();
    entities
        .iter()
        .filter(|e| e.tokens().all(|t| in_block.contains(&t.i())))
        .copied()
        .collect()
}

/// Extract location facts from a sentence.
///
/// With a `root` given, only place entities touching the root's subtree
/// participate in disambiguation; without one the sentence root is used.
/// Zero entities yields an empty list, one is returned as is, and two or
/// more go through the contiguous-block filter.
pub fn extract_locations<'a>(sentence: &Span<'a>, root: Option<Token<'a>>) -> Vec<Fact> {
    let root = root.unwrap_or_else(|| sentence.root());
    let gpes: Vec<Span<'a>> = sentence
        .entities()
        .filter(|e| e.label() == Some(EntityLabel::Gpe))
        .collect();

    let to_facts =
        |spans: &[Span<'a>]| -> Vec<Fact> {
            spans
                .iter()
                .map(|s| Fact::from_span(FactKind::Location, *s))
                .collect()
        };

    match gpes.len() {
        0 => Vec::new(),
        1 => to_facts(&gpes),
        _ => {
            let below = descendants(sentence, root);
            let below_ids: HashSet<usize> = below.iter().map(|t| t.i()).collect();
            let mut candidate_tokens: Vec<Token<'a>> = Vec::new();
            for entity in &gpes {
                if entity.tokens().any(|t| below_ids.contains(&t.i())) {
                    candidate_tokens.extend(entity.tokens());
                }
            }
            let block = contiguous_block(&candidate_tokens);
            let kept = entities_fully_in_block(&gpes, &block);
            if kept.is_empty() {
                // Cannot decide which place is the event location, so keep
                // them all for the downstream merge.
                to_facts(&gpes)
            } else {
                to_facts(&kept)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use displace_core::{DepRel, DocBuilder, ParsedDocument, Pos};

    // "Floods hit London and Middlesex while Paris stayed dry ."
    fn three_place_doc() -> ParsedDocument {
        DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("hit", "hit", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("London", "london", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .token("and", "and", Pos::Cconj, "CC", DepRel::Cc, 2)
            .token("Middlesex", "middlesex", Pos::Propn, "NNP", DepRel::Conj, 2)
            .token("while", "while", Pos::Sconj, "IN", DepRel::Mark, 7)
            .token("Paris", "paris", Pos::Propn, "NNP", DepRel::Nsubj, 7)
            .token("stayed", "stay", Pos::Verb, "VBD", DepRel::Advcl, 1)
            .token("dry", "dry", Pos::Adj, "JJ", DepRel::Acomp, 7)
            .punct(".", 1)
            .entity(2, 3, EntityLabel::Gpe)
            .entity(4, 5, EntityLabel::Gpe)
            .entity(6, 7, EntityLabel::Gpe)
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_locations() {
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("worsened", "worsen", Pos::Verb, "VBD", DepRel::Root, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        let sentence = doc.sentences().next().unwrap();
        assert!(extract_locations(&sentence, None).is_empty());
    }

    #[test]
    fn test_single_location_returned_directly() {
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("hit", "hit", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("London", "london", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .punct(".", 1)
            .entity(2, 3, EntityLabel::Gpe)
            .build()
            .unwrap();
        let sentence = doc.sentences().next().unwrap();
        let locations = extract_locations(&sentence, None);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].text, "London");
        assert_eq!(locations[0].kind, FactKind::Location);
    }

    #[test]
    fn test_block_excludes_unrelated_place() {
        let doc = three_place_doc();
        let sentence = doc.sentences().next().unwrap();
        // Root is "hit"; London and Middlesex form the block, Paris sits in
        // a subordinate clause and is filtered out.
        let locations = extract_locations(&sentence, None);
        let texts: Vec<&str> = locations.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["London", "Middlesex"]);
    }

    #[test]
    fn test_scoping_keeps_places_under_root() {
        let doc = three_place_doc();
        let sentence = doc.sentences().next().unwrap();
        // Scoped under "stayed", only Paris touches the subtree.
        let locations = extract_locations(&sentence, Some(doc.token(7)));
        let texts: Vec<&str> = locations.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Paris"]);
    }

    #[test]
    fn test_ambiguity_returns_all() {
        let doc = three_place_doc();
        let sentence = doc.sentences().next().unwrap();
        // "dry" has no place entity below it, so the block is empty and
        // every place entity comes back.
        let locations = extract_locations(&sentence, Some(doc.token(8)));
        assert_eq!(locations.len(), 3);
    }

    #[test]
    fn test_offsets_are_document_absolute() {
        let doc = three_place_doc();
        let sentence = doc.sentences().next().unwrap();
        let locations = extract_locations(&sentence, None);
        let london = &locations[0];
        assert_eq!(&doc.text()[london.start..london.end], "London");
    }
}
