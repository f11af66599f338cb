//! Subject and object resolution around a verb.
//!
//! The simple collectors mirror what a dependency parse gives directly:
//! subject arcs to the verb's left, object arcs to its right, each expanded
//! through conjunction chains. [`subjects_and_objects`] layers the special
//! cases on top: linear neighbours of the verb, conjoined and clausal verbs
//! that inherit arguments from their ancestors, and relative clauses.

use displace_core::{DepRel, Pos, Span, Token};

// ============================================================================
// Simple collectors
// ============================================================================

/// Main verbs of a sentence: verb tokens that are not auxiliaries.
pub fn main_verbs<'a>(sentence: &Span<'a>) -> Vec<Token<'a>> {
    sentence
        .tokens()
        .filter(|t| t.pos() == Pos::Verb && !t.dep().is_aux())
        .collect()
}

/// Conjuncts hanging off a token (its right children with a `conj` arc).
fn conjuncts<'a>(token: Token<'a>) -> impl Iterator<Item = Token<'a>> + 'a {
    token.rights().filter(|t| t.dep() == DepRel::Conj)
}

/// Subjects of a verb: left children with a subject arc, plus their
/// conjuncts.
pub fn subjects_of_verb<'a>(verb: Token<'a>) -> Vec<Token<'a>> {
    let mut subjects: Vec<Token<'a>> =
        verb.lefts().filter(|t| t.dep().is_subject()).collect();
    let extra: Vec<Token<'a>> = subjects.iter().flat_map(|t| conjuncts(*t)).collect();
    subjects.extend(extra);
    subjects
}

/// Objects of a verb: right children with an object arc, plus their
/// conjuncts.
pub fn objects_of_verb<'a>(verb: Token<'a>) -> Vec<Token<'a>> {
    let mut objects: Vec<Token<'a>> =
        verb.rights().filter(|t| t.dep().is_object()).collect();
    let extra: Vec<Token<'a>> = objects.iter().flat_map(|t| conjuncts(*t)).collect();
    objects.extend(extra);
    objects
}

/// Objects followed by subjects, unexpanded.
pub fn simple_subjects_and_objects<'a>(verb: Token<'a>) -> Vec<Token<'a>> {
    let mut out = objects_of_verb(verb);
    out.extend(subjects_of_verb(verb));
    out
}

/// The token directly after `token` in the document, if any.
pub fn next_word(token: Token<'_>) -> Option<Token<'_>> {
    let doc = token.doc();
    if token.i() + 1 < doc.len() {
        Some(doc.token(token.i() + 1))
    } else {
        None
    }
}

// ============================================================================
// Full resolution
// ============================================================================

/// All candidate argument tokens for a verb, special cases included.
///
/// Duplicates are removed keeping the first occurrence, so candidate order
/// is deterministic.
pub fn subjects_and_objects<'a>(sentence: &Span<'a>, verb: Token<'a>) -> Vec<Token<'a>> {
    let doc = verb.doc();
    let mut candidates = simple_subjects_and_objects(verb);

    // A reporting unit often sits directly before or after the verb with
    // an arc that the simple collectors do not cover.
    if verb.i() > 0 {
        let preceding = doc.token(verb.i() - 1);
        if matches!(
            preceding.dep(),
            DepRel::Pobj | DepRel::Dobj | DepRel::Nsubj | DepRel::Conj
        ) && !candidates.contains(&preceding)
        {
            candidates.push(preceding);
        }
    }
    if verb.i() + 1 < doc.len() {
        let following = doc.token(verb.i() + 1);
        if matches!(following.dep(), DepRel::Pobj | DepRel::Dobj | DepRel::Root)
            && !candidates.contains(&following)
        {
            candidates.push(following);
        }
    }

    // A conjoined verb shares the subject of the verb it conjoins with.
    if verb.dep() == DepRel::Conj {
        let lefts: Vec<Token<'a>> = verb.lefts().collect();
        if lefts.is_empty() {
            for anc in verb.ancestors() {
                candidates.extend(simple_subjects_and_objects(anc));
            }
        } else {
            for token in lefts {
                if matches!(token.dep(), DepRel::Nsubj | DepRel::NsubjPass) {
                    candidates.push(token);
                }
            }
        }
    }

    // Clausal complements inherit arguments from their governing verbs.
    if matches!(
        verb.dep(),
        DepRel::Xcomp | DepRel::Acomp | DepRel::Ccomp
    ) {
        for anc in verb.ancestors() {
            candidates.extend(simple_subjects_and_objects(anc));
        }
    }

    // Prepositional objects anywhere in the sentence can carry the unit.
    if matches!(verb.dep(), DepRel::Root | DepRel::Xcomp) {
        for token in sentence.tokens() {
            if token.dep() == DepRel::Pobj {
                candidates.push(token);
            }
        }
    }

    if verb.dep() == DepRel::RelCl {
        if let Some(noun) = noun_from_relative_clause(sentence, verb) {
            candidates.push(noun);
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|t| seen.insert(t.i()));
    candidates
}

// ============================================================================
// Part-of-speech sequence scans
// ============================================================================

/// Contiguous token runs in `sentence` matching noun+ verb.
fn noun_verb_clauses<'a>(sentence: &Span<'a>) -> Vec<Span<'a>> {
    let doc = sentence.doc();
    let tokens: Vec<Token<'a>> = sentence.tokens().collect();
    let mut clauses = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].pos() == Pos::Noun {
            let start = i;
            while i < tokens.len() && tokens[i].pos() == Pos::Noun {
                i += 1;
            }
            if i < tokens.len() && tokens[i].pos() == Pos::Verb {
                clauses.push(doc.span(tokens[start].i(), tokens[i].i() + 1));
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    clauses
}

/// The plural noun inside a noun+ verb clause containing `verb`, if any.
pub fn noun_from_relative_clause<'a>(
    sentence: &Span<'a>,
    verb: Token<'a>,
) -> Option<Token<'a>> {
    for clause in noun_verb_clauses(sentence) {
        if clause.contains(verb) {
            for token in clause.tokens() {
                if token.tag() == "NNS" {
                    return Some(token);
                }
            }
        }
    }
    None
}

/// The noun-cconj-noun triple containing `noun`, if the sentence has one.
pub fn noun_conjunction<'a>(sentence: &Span<'a>, noun: Token<'a>) -> Option<Span<'a>> {
    let doc = sentence.doc();
    let tokens: Vec<Token<'a>> = sentence.tokens().collect();
    for window in tokens.windows(3) {
        if window[0].pos() == Pos::Noun
            && window[1].pos() == Pos::Cconj
            && window[2].pos() == Pos::Noun
        {
            let span = doc.span(window[0].i(), window[2].i() + 1);
            if span.contains(noun) {
                return Some(span);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
