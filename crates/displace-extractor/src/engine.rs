//! Sentence loop, branch search and deduplication.
//!
//! [`Engine`] drives the pipeline over one parsed article: classify each
//! sentence's main verbs, branch out from every reporting term to find a
//! unit, a quantity and locations, and assemble immutable reports. The
//! most recent locations seen in the article are carried forward so a
//! sentence without a place name inherits the last one mentioned.

use std::collections::HashSet;

use displace_core::{
    DepRel, Fact, FactKind, KeywordConfig, KeywordIndex, Lemmatizer, ParsedDocument, Quantity,
    Report, ReportingTerm, ReportingUnit, Span, SuffixLemmatizer, TagSpan, UnitScope,
};
use tracing::debug;

use crate::convert::TermUnitConverter;
use crate::locations::extract_locations;
use crate::quantity::{is_numeral_like, quantity};
use crate::resolve::{main_verbs, next_word, noun_conjunction, subjects_and_objects};
use crate::verbs::{VerbClassifier, VerbMatch};

/// Rule-based report extraction engine.
///
/// Holds the lemmatized keyword index and the lemmatizer for the lifetime
/// of the engine; both are read-only after construction.
pub struct Engine {
    keywords: KeywordIndex,
    lemmatizer: Box<dyn Lemmatizer>,
}

impl Engine {
    pub fn new(config: &KeywordConfig, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        let keywords = KeywordIndex::new(config, lemmatizer.as_ref());
        Self {
            keywords,
            lemmatizer,
        }
    }

    /// Engine with the built-in keyword vocabulary and the suffix
    /// lemmatizer.
    pub fn with_defaults() -> Self {
        Self::new(&KeywordConfig::default(), Box::new(SuffixLemmatizer::new()))
    }

    pub fn keywords(&self) -> &KeywordIndex {
        &self.keywords
    }

    /// Whether the article mentions any hazard keyword.
    pub fn is_relevant(&self, doc: &ParsedDocument) -> bool {
        doc.tokens()
            .any(|t| self.keywords.article_relevance().contains(t.lemma()))
    }

    /// Process a whole article, one sentence at a time.
    ///
    /// Reports come back in sentence order with structural duplicates
    /// removed, keeping each first occurrence.
    pub fn process_article(&self, doc: &ParsedDocument) -> Vec<Report> {
        let mut reports: Vec<Report> = Vec::new();
        let mut locations_memory: Vec<Fact> = Vec::new();
        for sentence in doc.sentences() {
            reports.extend(self.process_sentence(&sentence, &locations_memory));
            let current = extract_locations(&sentence, None);
            if !current.is_empty() {
                locations_memory = current;
            }
        }
        let mut seen = HashSet::new();
        reports.retain(|r| seen.insert(r.clone()));
        reports
    }

    /// Extract reports from one sentence, given the locations carried
    /// over from earlier sentences.
    pub fn process_sentence(&self, sentence: &Span<'_>, locations_memory: &[Fact]) -> Vec<Report> {
        let classifier = VerbClassifier::new(&self.keywords);
        let mut reports = Vec::new();
        for verb in main_verbs(sentence) {
            let Some(matched) = classifier.classify(verb) else {
                continue;
            };
            debug!(
                verb = verb.text(),
                term = %matched.term.lemma,
                "classified reporting term"
            );
            reports.extend(self.branch_search(&matched, sentence, locations_memory));
        }
        reports
    }

    /// Branch out from a matched reporting term.
    ///
    /// Candidate argument tokens are ranked by subtree size so that a
    /// candidate carrying its own clause loses to a plain noun. The first
    /// candidate that is either a numeral in an accepted position or a
    /// unit keyword produces the report.
    fn branch_search(
        &self,
        matched: &VerbMatch,
        sentence: &Span<'_>,
        locations_memory: &[Fact],
    ) -> Vec<Report> {
        let doc = sentence.doc();
        let verb = doc.token(matched.term.anchor);
        let mut locations = extract_locations(sentence, Some(verb));
        if locations.is_empty() {
            locations = locations_memory.to_vec();
        }
        let converter = TermUnitConverter::new(&self.keywords, self.lemmatizer.as_ref());

        let mut candidates = subjects_and_objects(sentence, verb);
        candidates.sort_by_key(|t| t.subtree().len());

        let mut reports = Vec::new();
        for candidate in candidates {
            if is_numeral_like(candidate) {
                // A bare numeral counts only in positions tied to the
                // verb: directly before it, before the final word of a
                // compound term, before its passive auxiliary, or inside
                // the term span itself.
                let Some(next) = next_word(candidate) else {
                    continue;
                };
                let last_term_word = matched.term.lemma.split(' ').next_back().unwrap_or("");
                let accepted = next.i() == verb.i()
                    || next.text() == last_term_word
                    || (next.dep() == DepRel::AuxPass
                        && next_word(next).is_some_and(|n| n.i() == verb.i()))
                    || candidate.idx() < matched.term.end;
                if accepted {
                    let unit = match matched.scope {
                        UnitScope::Structure => ReportingUnit::Households,
                        UnitScope::Person | UnitScope::Joint => ReportingUnit::People,
                    };
                    let term = converter.convert_term(&matched.term.text, "");
                    let quantity_fact = Fact::from_token(FactKind::Quantity, candidate);
                    reports.push(build_report(
                        unit,
                        term,
                        &matched.term,
                        Some(&quantity_fact),
                        &locations,
                        sentence,
                    ));
                    break;
                }
            } else if self.keywords.unit_contains(matched.scope, candidate.lemma()) {
                // Widen the unit to the whole conjunction when the noun is
                // part of one ("families and individuals").
                let (unit_fact, quantity_fact) = match noun_conjunction(sentence, candidate) {
                    Some(conj) => (
                        Fact::from_span(FactKind::Unit, conj),
                        quantity(sentence, conj.root()),
                    ),
                    None => (
                        Fact::from_token(FactKind::Unit, candidate),
                        quantity(sentence, candidate),
                    ),
                };
                let unit = converter.convert_unit(&unit_fact.lemma);
                let term = converter.convert_term(&matched.term.text, &unit_fact.text);
                reports.push(build_report(
                    unit,
                    term,
                    &matched.term,
                    quantity_fact.as_ref(),
                    &locations,
                    sentence,
                ));
                break;
            }
        }
        reports
    }
}

fn build_report(
    unit: ReportingUnit,
    term: ReportingTerm,
    term_fact: &Fact,
    quantity_fact: Option<&Fact>,
    locations: &[Fact],
    sentence: &Span<'_>,
) -> Report {
    let mut tag_spans: Vec<TagSpan> = vec![term_fact.tag_span()];
    if let Some(q) = quantity_fact {
        tag_spans.push(q.tag_span());
    }
    tag_spans.extend(locations.iter().map(Fact::tag_span));
    Report {
        unit,
        term,
        quantity: quantity_fact.map_or_else(Quantity::absent, |q| Quantity::parse(&q.text)),
        locations: locations.iter().map(|f| f.text.clone()).collect(),
        sentence_start: sentence.start_char(),
        sentence_end: sentence.end_char(),
        tag_spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use displace_core::{DocBuilder, EntityLabel, Pos};

    #[test]
    fn test_location_memory_carries_between_sentences() {
        // "Floods struck Bosnia . 2000 people were evacuated ."
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("struck", "strike", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("Bosnia", "bosnia", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .punct(".", 1)
            .sent()
            .num("2000", DepRel::Nummod, 5)
            .token("people", "people", Pos::Noun, "NNS", DepRel::NsubjPass, 7)
            .token("were", "be", Pos::Aux, "VBD", DepRel::AuxPass, 7)
            .token("evacuated", "evacuate", Pos::Verb, "VBN", DepRel::Root, 7)
            .punct(".", 7)
            .entity(2, 3, EntityLabel::Gpe)
            .build()
            .unwrap();
        let engine = Engine::with_defaults();
        let reports = engine.process_article(&doc);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.term, ReportingTerm::Evacuated);
        assert_eq!(report.unit, ReportingUnit::People);
        assert_eq!(report.quantity.value, Some(2000));
        assert_eq!(report.locations, vec!["Bosnia".to_string()]);
    }

    #[test]
    fn test_numeral_before_compound_term_word() {
        // "Floods left 500 homeless ."
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("left", "leave", Pos::Verb, "VBD", DepRel::Root, 1)
            .num("500", DepRel::Dobj, 1)
            .token("homeless", "homeless", Pos::Adj, "JJ", DepRel::Oprd, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        let engine = Engine::with_defaults();
        let reports = engine.process_article(&doc);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.term, ReportingTerm::Homeless);
        assert_eq!(report.unit, ReportingUnit::People);
        assert_eq!(report.quantity.value, Some(500));
        assert!(report.locations.is_empty());
    }

    #[test]
    fn test_numeral_subject_of_passive() {
        // "500 were displaced ."
        let doc = DocBuilder::new()
            .num("500", DepRel::NsubjPass, 2)
            .token("were", "be", Pos::Aux, "VBD", DepRel::AuxPass, 2)
            .token("displaced", "displace", Pos::Verb, "VBN", DepRel::Root, 2)
            .punct(".", 2)
            .build()
            .unwrap();
        let engine = Engine::with_defaults();
        let reports = engine.process_article(&doc);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].term, ReportingTerm::Displaced);
        assert_eq!(reports[0].quantity.value, Some(500));
    }

    #[test]
    fn test_duplicate_reports_collapse_to_one() {
        // A parser emitting the same sentence span twice must not double
        // the article output.
        let doc = DocBuilder::new()
            .num("500", DepRel::NsubjPass, 2)
            .token("were", "be", Pos::Aux, "VBD", DepRel::AuxPass, 2)
            .token("displaced", "displace", Pos::Verb, "VBN", DepRel::Root, 2)
            .punct(".", 2)
            .build()
            .unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        let first = value["sentences"][0].clone();
        value["sentences"].as_array_mut().unwrap().push(first);
        let doc: ParsedDocument = serde_json::from_value(value).unwrap();
        assert_eq!(doc.sentences().count(), 2);

        let engine = Engine::with_defaults();
        let sentence = doc.sentences().next().unwrap();
        assert_eq!(engine.process_sentence(&sentence, &[]).len(), 1);
        let reports = engine.process_article(&doc);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].quantity.value, Some(500));
    }

    #[test]
    fn test_sentence_without_reporting_term_yields_nothing() {
        let doc = DocBuilder::new()
            .token("Officials", "official", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("visited", "visit", Pos::Verb, "VBD", DepRel::Root, 1)
            .token("London", "london", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .punct(".", 1)
            .entity(2, 3, EntityLabel::Gpe)
            .build()
            .unwrap();
        let engine = Engine::with_defaults();
        assert!(engine.process_article(&doc).is_empty());
    }

    #[test]
    fn test_tag_spans_cover_term_quantity_and_location() {
        // "Floods displaced 2000 people in Bosnia ."
        let doc = DocBuilder::new()
            .token("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("displaced", "displace", Pos::Verb, "VBD", DepRel::Root, 1)
            .num("2000", DepRel::Nummod, 3)
            .token("people", "people", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .token("in", "in", Pos::Adp, "IN", DepRel::Prep, 1)
            .token("Bosnia", "bosnia", Pos::Propn, "NNP", DepRel::Pobj, 4)
            .punct(".", 1)
            .entity(5, 6, EntityLabel::Gpe)
            .chunk(2, 4)
            .build()
            .unwrap();
        let engine = Engine::with_defaults();
        let reports = engine.process_article(&doc);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        let kinds: Vec<FactKind> = report.tag_spans.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![FactKind::Term, FactKind::Quantity, FactKind::Location]
        );
        // Term span marks "displaced" in the article text.
        let term_span = &report.tag_spans[0];
        assert_eq!(&doc.text()[term_span.start..term_span.end], "displaced");
    }

    #[test]
    fn test_article_relevance() {
        let engine = Engine::with_defaults();
        let relevant = DocBuilder::new()
            .token("The", "the", Pos::Det, "DT", DepRel::Det, 1)
            .token("storm", "storm", Pos::Noun, "NN", DepRel::Nsubj, 2)
            .token("passed", "pass", Pos::Verb, "VBD", DepRel::Root, 2)
            .punct(".", 2)
            .build()
            .unwrap();
        assert!(engine.is_relevant(&relevant));

        let irrelevant = DocBuilder::new()
            .token("Markets", "market", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .token("rallied", "rally", Pos::Verb, "VBD", DepRel::Root, 1)
            .punct(".", 1)
            .build()
            .unwrap();
        assert!(!engine.is_relevant(&irrelevant));
    }
}
