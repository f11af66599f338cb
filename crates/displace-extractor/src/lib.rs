//! Rule-based extraction of displacement reports from dependency-parsed
//! news articles.
//!
//! The entry point is [`Engine`]: feed it a [`displace_core::ParsedDocument`]
//! and it walks each sentence, classifies main verbs as reporting terms,
//! then branches out from each matched verb to find the reporting unit,
//! quantity and locations that make up a [`displace_core::Report`].
//!
//! The submodules are the pipeline stages:
//!
//! - [`verbs`]: reporting-term classification of main verbs
//! - [`resolve`]: subject and object resolution around a verb
//! - [`locations`]: place-entity extraction scoped to a parse subtree
//! - [`quantity`]: numeral search through noun chunks
//! - [`convert`]: normalization into canonical unit and term labels
//! - [`dates`]: relative-date anchoring against a publication date
//! - [`engine`]: sentence loop, branch search and deduplication

pub mod convert;
pub mod dates;
pub mod engine;
pub mod locations;
pub mod quantity;
pub mod resolve;
pub mod verbs;

pub use convert::TermUnitConverter;
pub use dates::DateResolver;
pub use engine::Engine;
pub use verbs::{VerbClassifier, VerbMatch};
