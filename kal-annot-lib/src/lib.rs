//! Semantic annotation and glossing for Kalaallisut morphological analyses.
//!
//! Input is a constraint-grammar analysis stream: surface-form lines
//! followed by tab-indented analysis lines, each a quoted lemma, optional
//! derivation morphemes, word-class markers, and flexion. The engine
//! resolves lemma and derivation spans against a lexicon snapshot and
//! either attaches semantic class tags or inserts translations.

pub mod annotate;
pub mod assemble;
pub mod cache;
pub mod candidates;
pub mod engine;
pub mod lexicon;
pub mod resolver;
pub mod tokenizer;
pub mod types;

pub use cache::{ResultCache, DEFAULT_CAPACITY};
pub use engine::{Annotator, Mode, Options};
pub use lexicon::{LexemeId, Lexicon, LexiconData, LexiconError};
