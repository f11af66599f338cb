//! Fact and Report models.
//!
//! A [`Fact`] is the transient evidence unit built while walking a parse
//! tree: a token or span tagged with what role it plays (unit, term,
//! quantity, location) plus derived text, lemma and absolute character
//! offsets. A [`Report`] is the immutable output unit handed to the caller;
//! persistence is the caller's responsibility.

use serde::{Deserialize, Serialize};

use crate::doc::{Span, Token};

// ============================================================================
// Facts
// ============================================================================

/// Semantic role of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Unit,
    Term,
    Quantity,
    #[serde(rename = "loc")]
    Location,
}

impl FactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Term => "term",
            Self::Quantity => "quantity",
            Self::Location => "loc",
        }
    }
}

impl std::fmt::Display for FactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evidence wrapper around a token or span. Absence of evidence is
/// `Option<Fact>`, never an error.
///
/// Invariant: `end >= start`, and both lie within the owning sentence's
/// character range (offsets are document-absolute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub kind: FactKind,
    /// Surface text of the underlying token or span.
    pub text: String,
    /// Base form; classification rules may synthesize a compound lemma
    /// such as "leave homeless".
    pub lemma: String,
    /// Absolute character offset of the first character.
    pub start: usize,
    /// `start` plus the surface text length.
    pub end: usize,
    /// Document index of the anchor token (the verb for term facts, the
    /// first token for span facts).
    pub anchor: usize,
}

impl Fact {
    pub fn from_token(kind: FactKind, token: Token<'_>) -> Self {
        Self {
            kind,
            text: token.text().to_string(),
            lemma: token.lemma().to_string(),
            start: token.idx(),
            end: token.end_idx(),
            anchor: token.i(),
        }
    }

    pub fn from_span(kind: FactKind, span: Span<'_>) -> Self {
        let text = span.text().to_string();
        let start = span.start_char();
        Self {
            kind,
            lemma: span.lemma(),
            start,
            end: start + text.len(),
            text,
            anchor: span.start(),
        }
    }

    /// The marker span used for visualization.
    pub fn tag_span(&self) -> TagSpan {
        TagSpan {
            kind: self.kind,
            start: self.start,
            end: self.end,
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ============================================================================
// Report fields
// ============================================================================

/// Canonical classification of who or what a report counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingUnit {
    People,
    Households,
}

impl ReportingUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::People => "People",
            Self::Households => "Households",
        }
    }
}

impl std::fmt::Display for ReportingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical classification of what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingTerm {
    Displaced,
    Evacuated,
    Fled,
    Homeless,
    Camp,
    Sheltered,
    Relocated,
    Destroyed,
    Damaged,
    Uninhabitable,
    Evicted,
    Sacked,
    Refugee,
    AsylumSeeker,
}

impl ReportingTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Displaced => "Displaced",
            Self::Evacuated => "Evacuated",
            Self::Fled => "Fled",
            Self::Homeless => "Homeless",
            Self::Camp => "Camp",
            Self::Sheltered => "Sheltered",
            Self::Relocated => "Relocated",
            Self::Destroyed => "Destroyed",
            Self::Damaged => "Damaged",
            Self::Uninhabitable => "Uninhabitable",
            Self::Evicted => "Evicted",
            Self::Sacked => "Sacked",
            Self::Refugee => "Refugee",
            Self::AsylumSeeker => "Asylum Seeker",
        }
    }
}

impl std::fmt::Display for ReportingTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extracted quantity: a non-negative integer when the numeral parses,
/// otherwise the comma-stripped original text ("thousands", "dozens").
/// Both fields absent means no quantity was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Option<u64>,
    pub raw: Option<String>,
}

impl Quantity {
    /// Parse a numeral token's text, tolerating digit-group commas.
    pub fn parse(text: &str) -> Self {
        let cleaned = text.replace(',', "");
        match cleaned.parse::<u64>() {
            Ok(value) => Self {
                value: Some(value),
                raw: None,
            },
            Err(_) => Self {
                value: None,
                raw: Some(cleaned),
            },
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none() && self.raw.is_none()
    }
}

/// Marker span for visualizing an extracted fact within the article text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagSpan {
    #[serde(rename = "type")]
    pub kind: FactKind,
    pub start: usize,
    pub end: usize,
}

/// One structured displacement-event mention. Built once, immutable.
///
/// Equality and hashing are structural so article-level deduplication has
/// set semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Report {
    pub unit: ReportingUnit,
    pub term: ReportingTerm,
    pub quantity: Quantity,
    /// Location surface strings, grouped but never deduplicated.
    pub locations: Vec<String>,
    pub sentence_start: usize,
    pub sentence_end: usize,
    pub tag_spans: Vec<TagSpan>,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Locations:{} Unit:{} Term:{} Quantity:{:?}/{:?}",
            self.locations.join(","),
            self.unit,
            self.term,
            self.quantity.value,
            self.quantity.raw
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
