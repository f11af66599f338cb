//! Reporting-term classification of main verbs.
//!
//! A verb is promoted to a reporting term either because its lemma is a
//! configured keyword, or through one of the special constructions
//! ("ordered the eviction of", "left 500 homeless", "claimed lives").
//! The match carries the unit scope to search under: person units,
//! structure units, or both.

use displace_core::{DepRel, Fact, FactKind, KeywordIndex, Token, UnitScope};

use crate::resolve::objects_of_verb;

/// A verb accepted as a reporting term.
#[derive(Debug, Clone)]
pub struct VerbMatch {
    /// Which unit vocabulary the branch search may match against.
    pub scope: UnitScope,
    /// The term fact, anchored on the verb. For multi-token constructions
    /// the fact covers the verb through its object and carries a synthetic
    /// compound lemma such as "order eviction".
    pub term: Fact,
}

/// Classifies main verbs against the keyword vocabulary.
pub struct VerbClassifier<'k> {
    keywords: &'k KeywordIndex,
}

impl<'k> VerbClassifier<'k> {
    pub fn new(keywords: &'k KeywordIndex) -> Self {
        Self { keywords }
    }

    /// Run the cascade. The rule order is load-bearing and the first match
    /// wins; `None` means the verb reports nothing and the caller moves on
    /// to the next verb.
    pub fn classify(&self, verb: Token<'_>) -> Option<VerbMatch> {
        let rules: &[fn(&Self, Token<'_>) -> Option<VerbMatch>] = &[
            Self::eviction_object,
            Self::keyword_lemma,
            Self::predicative_complement,
            Self::affected_in_relevant_article,
            Self::feared_or_assumed,
            Self::claimed_lives,
        ];
        rules.iter().find_map(|rule| rule(self, verb))
    }

    /// Whether the article mentions any hazard keyword at all.
    pub fn article_relevance(&self, verb: Token<'_>) -> bool {
        verb.doc()
            .tokens()
            .any(|t| self.keywords.article_relevance().contains(t.lemma()))
    }

    fn span_fact<'a>(verb: Token<'a>, through: Token<'a>, lemma: String) -> Fact {
        let span = verb.doc().span(verb.i(), through.i() + 1);
        let mut fact = Fact::from_span(FactKind::Term, span);
        fact.lemma = lemma;
        fact
    }

    /// "ordered the [forced] eviction of ..." reports an eviction even
    /// though the verb itself is unremarkable. Checked before keyword
    /// lemmas so "forced eviction" does not match as a person term.
    fn eviction_object(&self, verb: Token<'_>) -> Option<VerbMatch> {
        for object in objects_of_verb(verb) {
            if object.text() == "eviction" || object.text() == "evictions" {
                return Some(VerbMatch {
                    scope: UnitScope::Joint,
                    term: Self::span_fact(
                        verb,
                        object,
                        format!("{} eviction", verb.lemma()),
                    ),
                });
            }
        }
        None
    }

    fn keyword_lemma(&self, verb: Token<'_>) -> Option<VerbMatch> {
        let lemma = verb.lemma();
        let scope = if self.keywords.joint_term().contains(lemma) {
            UnitScope::Joint
        } else if self.keywords.structure_term().contains(lemma) {
            UnitScope::Structure
        } else if self.keywords.person_term().contains(lemma) {
            UnitScope::Person
        } else {
            return None;
        };
        Some(VerbMatch {
            scope,
            term: Fact::from_token(FactKind::Term, verb),
        })
    }

    /// "left 500 homeless", "rendered houses uninhabitable". The lemma is
    /// normalized to "leave <predicate>" whichever verb introduced it.
    fn predicative_complement(&self, verb: Token<'_>) -> Option<VerbMatch> {
        if !matches!(verb.lemma(), "leave" | "render" | "become") {
            return None;
        }
        let predicate = verb
            .children()
            .filter(|c| matches!(c.dep(), DepRel::Oprd | DepRel::Dobj | DepRel::Acomp))
            .last()?;
        let scope = if self.keywords.structure_term().contains(predicate.lemma()) {
            UnitScope::Structure
        } else if self.keywords.person_term().contains(predicate.lemma()) {
            UnitScope::Person
        } else {
            return None;
        };
        Some(VerbMatch {
            scope,
            term: Self::span_fact(verb, predicate, format!("leave {}", predicate.lemma())),
        })
    }

    /// "affected" counts only when the article is about a hazard.
    fn affected_in_relevant_article(&self, verb: Token<'_>) -> Option<VerbMatch> {
        if verb.lemma() == "affect" && self.article_relevance(verb) {
            Some(VerbMatch {
                scope: UnitScope::Joint,
                term: Fact::from_token(FactKind::Term, verb),
            })
        } else {
            None
        }
    }

    /// "feared displaced", "assumed destroyed": classify by the first
    /// object's lemma.
    fn feared_or_assumed(&self, verb: Token<'_>) -> Option<VerbMatch> {
        if !matches!(verb.lemma(), "fear" | "assume") {
            return None;
        }
        let object = objects_of_verb(verb).into_iter().next()?;
        let scope = if self.keywords.person_term().contains(object.lemma()) {
            UnitScope::Person
        } else if self.keywords.structure_term().contains(object.lemma()) {
            UnitScope::Structure
        } else {
            return None;
        };
        Some(VerbMatch {
            scope,
            term: Self::span_fact(
                verb,
                object,
                format!("{} {}", verb.lemma(), object.text()),
            ),
        })
    }

    /// "claimed N lives".
    fn claimed_lives(&self, verb: Token<'_>) -> Option<VerbMatch> {
        if verb.lemma() != "claim" {
            return None;
        }
        for object in objects_of_verb(verb) {
            if object.text() == "lives" {
                return Some(VerbMatch {
                    scope: UnitScope::Person,
                    term: Self::span_fact(verb, object, format!("{} lives", verb.lemma())),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use displace_core::{
        DepRel, DocBuilder, KeywordConfig, ParsedDocument, Pos, SuffixLemmatizer,
    };

    fn index() -> KeywordIndex {
        KeywordIndex::new(&KeywordConfig::default(), &SuffixLemmatizer::new())
    }

    // "Floods displaced thousands ."
    fn displaced_doc() -> ParsedDocument {
        DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("displaced", "displace", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("thousands", "thousand", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .punct(".", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_keyword_lemma_person_term() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        let doc = displaced_doc();
        let m = classifier.classify(doc.token(1)).unwrap();
        assert_eq!(m.scope, UnitScope::Person);
        assert_eq!(m.term.lemma, "displace");
        assert_eq!(m.term.anchor, 1);
    }

    #[test]
    fn test_structure_term_scope() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // "Floods damaged houses ."
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("damaged", "damage", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("houses", "house", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        let m = classifier.classify(doc.token(1)).unwrap();
        assert_eq!(m.scope, UnitScope::Structure);
    }

    #[test]
    fn test_irrelevant_verb_rejected() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // "Officials visited London ."
        let doc = DocBuilder::new()
            .token("Officials", "official", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("visited", "visit", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("London", "london", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        assert!(classifier.classify(doc.token(1)).is_none());
    }

    #[test]
    fn test_ordered_eviction_span() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // "Authorities ordered the eviction of families ."
        let doc = DocBuilder::new()
            .token("Authorities", "authority", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("ordered", "order", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("the", "the", Pos::Det, "DT", DepRel::Det, 3)
            .token("eviction", "eviction", Pos::Noun, "NN", DepRel::Dobj, 1)
            .token("of", "of", Pos::Adp, "IN", DepRel::Prep, 3)
            .token("families", "family", Pos::Noun, "NNS", DepRel::Pobj, 4)
            .punct(".", 1)
            .build()
            .unwrap();
        let m = classifier.classify(doc.token(1)).unwrap();
        assert_eq!(m.scope, UnitScope::Joint);
        assert_eq!(m.term.lemma, "order eviction");
        assert_eq!(m.term.text, "ordered the eviction");
    }

    #[test]
    fn test_left_homeless_compound() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // "Floods left 500 homeless ." with "homeless" as oprd
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("left", "leave", Pos::Verb, "VBD", DepRel::Root, 1)
            .num("500", DepRel::Nummod, 3)
            .token("homeless", "homeless", Pos::Adj, "JJ", DepRel::Oprd, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        let m = classifier.classify(doc.token(1)).unwrap();
        assert_eq!(m.scope, UnitScope::Person);
        assert_eq!(m.term.lemma, "leave homeless");
    }

    #[test]
    fn test_affect_requires_relevant_article() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // No hazard keyword anywhere: "affect" stays irrelevant.
        let doc = DocBuilder::new()
            .token("Cuts", "cut", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("affected", "affect", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("thousands", "thousand", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        assert!(classifier.classify(doc.token(1)).is_none());

        // "The storm affected thousands ."
        let doc = DocBuilder::new()
            .token("The", "the", Pos::Det, "DT", DepRel::Det, 1)
            .token("storm", "storm", Pos::Noun, "NN", DepRel::Nsubj, 2)
            .token("affected", "affect", Pos::Verb, "VBD", DepRel::Root, 2)
            .token("thousands", "thousand", Pos::Noun, "NNS", DepRel::Dobj, 2)
            .punct(".", 2)
            .build()
            .unwrap();
        let m = classifier.classify(doc.token(2)).unwrap();
        assert_eq!(m.scope, UnitScope::Joint);
    }

    #[test]
    fn test_claimed_lives() {
        let index = index();
        let classifier = VerbClassifier::new(&index);
        // "The storm claimed 12 lives ."
        let doc = DocBuilder::new()
            .token("The", "the", Pos::Det, "DT", DepRel::Det, 1)
            .token("storm", "storm", Pos::Noun, "NN", DepRel::Nsubj, 2)
            .token("claimed", "claim", Pos::Verb, "VBD", DepRel::Root, 2)
            .num("12", DepRel::Nummod, 4)
            .token("lives", "life", Pos::Noun, "NNS", DepRel::Dobj, 2)
            .punct(".", 2)
            .build()
            .unwrap();
        let m = classifier.classify(doc.token(2)).unwrap();
        assert_eq!(m.scope, UnitScope::Person);
        assert_eq!(m.term.lemma, "claim lives");
    }
}
