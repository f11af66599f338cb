//! Keyword configuration and the derived lemma index.
//!
//! Five curated keyword categories drive the extraction rules. They are
//! loaded once at engine construction, lemmatized through the shared
//! [`Lemmatizer`] pipeline, and never mutated afterwards. Multi-word
//! keywords ("relief camp") contribute one lemma per word, matching how
//! single tokens are compared against the sets.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::lemma::Lemmatizer;

/// Keyword category, as stored in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    PersonTerm,
    StructureTerm,
    PersonUnit,
    StructureUnit,
    ArticleRelevance,
}

/// Raw keyword lists, one per category. Deserializable from a TOML file;
/// the defaults are the curated displacement vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub person_term: Vec<String>,
    pub structure_term: Vec<String>,
    pub person_unit: Vec<String>,
    pub structure_unit: Vec<String>,
    pub article_relevance: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        fn list(terms: &[&str]) -> Vec<String> {
            terms.iter().map(|t| t.to_string()).collect()
        }
        Self {
            person_term: list(&[
                "displaced",
                "evacuated",
                "forced",
                "flee",
                "homeless",
                "relief camp",
                "sheltered",
                "relocated",
                "stranded",
                "stuck",
                "accommodated",
                "refugee camp",
                "refugee center",
                "evicted",
                "eviction",
                "sacked",
            ]),
            structure_term: list(&[
                "destroyed",
                "damaged",
                "swept",
                "collapsed",
                "flooded",
                "washed",
                "inundated",
                "evacuate",
            ]),
            person_unit: list(&[
                "families",
                "person",
                "people",
                "individuals",
                "locals",
                "villagers",
                "residents",
                "occupants",
                "citizens",
                "households",
                "refugee",
                "asylum seeker",
            ]),
            structure_unit: list(&["home", "house", "hut", "dwelling", "building"]),
            article_relevance: list(&[
                "Rainstorm",
                "hurricane",
                "tornado",
                "rain",
                "storm",
                "earthquake",
            ]),
        }
    }
}

impl KeywordConfig {
    /// Load keyword lists from a TOML file. Missing categories fall back
    /// to the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The raw descriptions for one category.
    pub fn category(&self, category: KeywordCategory) -> &[String] {
        match category {
            KeywordCategory::PersonTerm => &self.person_term,
            KeywordCategory::StructureTerm => &self.structure_term,
            KeywordCategory::PersonUnit => &self.person_unit,
            KeywordCategory::StructureUnit => &self.structure_unit,
            KeywordCategory::ArticleRelevance => &self.article_relevance,
        }
    }
}

/// Which reporting-unit lemma set a classified verb activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitScope {
    Person,
    Structure,
    /// Union of the person and structure unit sets.
    Joint,
}

/// Lemma sets derived from a [`KeywordConfig`]; read-only for the lifetime
/// of the engine.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    person_term: HashSet<String>,
    structure_term: HashSet<String>,
    joint_term: HashSet<String>,
    person_unit: HashSet<String>,
    structure_unit: HashSet<String>,
    article_relevance: HashSet<String>,
    household: HashSet<String>,
}

impl KeywordIndex {
    pub fn new(config: &KeywordConfig, lemmatizer: &dyn Lemmatizer) -> Self {
        let lemma_set = |terms: &[String]| -> HashSet<String> {
            terms
                .iter()
                .flat_map(|t| t.split_whitespace())
                .map(|w| lemmatizer.lemma(w))
                .collect()
        };
        let person_term = lemma_set(&config.person_term);
        let structure_term = lemma_set(&config.structure_term);
        let joint_term = person_term
            .intersection(&structure_term)
            .cloned()
            .collect();
        let household = ["families", "households"]
            .iter()
            .map(|w| lemmatizer.lemma(w))
            .collect();
        Self {
            joint_term,
            person_unit: lemma_set(&config.person_unit),
            structure_unit: lemma_set(&config.structure_unit),
            article_relevance: lemma_set(&config.article_relevance),
            household,
            person_term,
            structure_term,
        }
    }

    pub fn person_term(&self) -> &HashSet<String> {
        &self.person_term
    }

    pub fn structure_term(&self) -> &HashSet<String> {
        &self.structure_term
    }

    /// Lemmas present in both term categories.
    pub fn joint_term(&self) -> &HashSet<String> {
        &self.joint_term
    }

    pub fn person_unit(&self) -> &HashSet<String> {
        &self.person_unit
    }

    pub fn structure_unit(&self) -> &HashSet<String> {
        &self.structure_unit
    }

    pub fn article_relevance(&self) -> &HashSet<String> {
        &self.article_relevance
    }

    pub fn household(&self) -> &HashSet<String> {
        &self.household
    }

    /// Union membership across both term categories.
    pub fn is_reporting_term(&self, lemma: &str) -> bool {
        self.person_term.contains(lemma) || self.structure_term.contains(lemma)
    }

    /// Union membership across both unit categories.
    pub fn is_reporting_unit(&self, lemma: &str) -> bool {
        self.person_unit.contains(lemma) || self.structure_unit.contains(lemma)
    }

    /// Membership in the unit lemma set a verb classification activated.
    pub fn unit_contains(&self, scope: UnitScope, lemma: &str) -> bool {
        match scope {
            UnitScope::Person => self.person_unit.contains(lemma),
            UnitScope::Structure => self.structure_unit.contains(lemma),
            UnitScope::Joint => self.is_reporting_unit(lemma),
        }
    }
}
