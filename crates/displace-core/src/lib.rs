//! Displace Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the system:
//! - The dependency-parsed document graph handed over by the external parser
//! - Fact and Report models produced by the extraction engine
//! - Keyword configuration and the derived lemma index
//! - Capability traits for collaborators (lemmatizer, date-phrase parser)
//! - Common error types and configuration management

pub mod config;
pub mod doc;
pub mod keywords;
pub mod lemma;
pub mod report;

pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use doc::{DepRel, DocBuilder, EntityLabel, ParsedDocument, Pos, Span, Token};
pub use keywords::{KeywordCategory, KeywordConfig, KeywordIndex, UnitScope};
pub use lemma::{Lemmatizer, SuffixLemmatizer};
pub use report::{Fact, FactKind, Quantity, Report, ReportingTerm, ReportingUnit, TagSpan};

use chrono::NaiveDateTime;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for extraction operations
#[derive(Error, Debug)]
pub enum DisplaceError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DisplaceError>;

// ============================================================================
// Collaborator capabilities
// ============================================================================

/// Capability: parse a natural-language date phrase into an absolute date.
///
/// This is the external calendar parser the date resolver delegates to.
/// `None` means "no date extracted", which is not an error.
pub trait DatePhraseParser: Send + Sync {
    fn parse(&self, phrase: &str, anchor: Option<NaiveDateTime>) -> Option<NaiveDateTime>;
}
