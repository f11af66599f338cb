//! Normalization of extracted term and unit phrases into canonical labels.
//!
//! Both inputs arrive as surface phrases ("washed", "ordered the eviction",
//! "2,000 people"). Each word is lemmatized and the lemma sets are run
//! through an ordered rule table; the first matching rule decides the
//! label, and precedence is load-bearing (the unit vocabulary outranks the
//! term, "refugee" outranks everything).

use std::collections::HashSet;

use displace_core::{KeywordIndex, Lemmatizer, ReportingTerm, ReportingUnit};

/// Lemma sets for one conversion: the words of the term phrase and of the
/// unit phrase.
struct TermCtx {
    term: HashSet<String>,
    unit: HashSet<String>,
}

impl TermCtx {
    fn term_has(&self, lemma: &str) -> bool {
        self.term.contains(lemma)
    }

    fn unit_has(&self, lemma: &str) -> bool {
        self.unit.contains(lemma)
    }
}

type TermRule = (ReportingTerm, fn(&TermCtx) -> bool);

/// Ordered conversion table; first match wins.
const TERM_RULES: &[TermRule] = &[
    (ReportingTerm::Refugee, |c| c.unit_has("refugee")),
    (ReportingTerm::AsylumSeeker, |c| c.unit_has("asylum")),
    (ReportingTerm::Refugee, |c| c.term_has("refugee")),
    (ReportingTerm::Refugee, |c| c.term_has("cross")),
    (ReportingTerm::Displaced, |c| c.term_has("displace")),
    (ReportingTerm::Evacuated, |c| c.term_has("evacuate")),
    (ReportingTerm::Fled, |c| c.term_has("flee")),
    (ReportingTerm::Homeless, |c| c.term_has("homeless")),
    (ReportingTerm::Camp, |c| c.term_has("camp")),
    (ReportingTerm::Sheltered, |c| {
        c.term_has("shelter") || c.term_has("accommodate")
    }),
    (ReportingTerm::Relocated, |c| c.term_has("relocate")),
    (ReportingTerm::Destroyed, |c| {
        c.term_has("destroy") || c.term_has("collapse")
    }),
    (ReportingTerm::Damaged, |c| {
        c.term_has("damage")
            || c.term_has("wash")
            || c.term_has("sweep")
            || c.term_has("flood")
            || c.term_has("inundate")
    }),
    (ReportingTerm::Uninhabitable, |c| c.term_has("uninhabitable")),
    (ReportingTerm::Evicted, |c| {
        c.term_has("evict") || c.term_has("eviction")
    }),
    (ReportingTerm::Sacked, |c| c.term_has("sack")),
];

/// Converts term and unit phrases into report labels.
pub struct TermUnitConverter<'e> {
    keywords: &'e KeywordIndex,
    lemmatizer: &'e dyn Lemmatizer,
}

impl<'e> TermUnitConverter<'e> {
    pub fn new(keywords: &'e KeywordIndex, lemmatizer: &'e dyn Lemmatizer) -> Self {
        Self {
            keywords,
            lemmatizer,
        }
    }

    fn lemma_set(&self, phrase: &str) -> HashSet<String> {
        phrase
            .split_whitespace()
            .map(|w| self.lemmatizer.lemma(w))
            .collect()
    }

    /// Canonical term for a term phrase, given the unit phrase it was
    /// found with. Anything unrecognized counts as a displacement.
    pub fn convert_term(&self, term_phrase: &str, unit_phrase: &str) -> ReportingTerm {
        let ctx = TermCtx {
            term: self.lemma_set(term_phrase),
            unit: self.lemma_set(unit_phrase),
        };
        TERM_RULES
            .iter()
            .find(|(_, matches)| matches(&ctx))
            .map(|(term, _)| *term)
            .unwrap_or(ReportingTerm::Displaced)
    }

    /// Canonical unit: structures and household words count households,
    /// everything else counts people.
    pub fn convert_unit(&self, unit_lemma: &str) -> ReportingUnit {
        if self.keywords.structure_unit().contains(unit_lemma)
            || self.keywords.household().contains(unit_lemma)
        {
            ReportingUnit::Households
        } else {
            ReportingUnit::People
        }
    }
}
