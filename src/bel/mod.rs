//! # BEL Language
//!
//! Lexer, parsers and document-level state for BEL text.
//! The term and statement parsers are pure functions; the control parser
//! and definitions parser hold per-document state.

pub mod ast;
pub mod control;
pub mod identifier;
pub mod lexer;
pub mod lines;
pub mod metadata;
pub mod parser;
pub mod vocab;

use crate::Error;

pub use ast::{Modifier, Statement, Term};
pub use control::{ControlParser, ControlState};
pub use identifier::Resolver;
pub use lines::{split_document, Line, SplitDocument};
pub use metadata::{Definition, Definitions, DocumentMetadata, MetadataParser};
pub use parser::{parse_statement, parse_term};

/// A parse result together with the non-fatal diagnostics raised while
/// producing it (deprecated spellings that were normalized).
#[derive(Debug)]
pub struct Parsed<T> {
    pub value: T,
    pub warnings: Vec<Error>,
}
