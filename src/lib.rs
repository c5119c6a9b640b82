//! # bel-graph — BEL compiler
//!
//! Compiles documents written in the Biological Expression Language into a
//! canonical semantic multigraph, and writes that graph back out as canonical
//! BEL.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `NamespaceOracle` is the contract between the parser and
//!    whatever knows which names exist
//! 2. **Clean DTOs**: `BelNode`, `EdgeData`, `Citation` cross all boundaries
//! 3. **Parser owns nothing**: a BEL line → `Statement` is a pure function
//! 4. **Content-addressed graph**: node and edge identity are hashes of
//!    canonical content, so insertion is idempotent
//!
//! ## Quick Start
//!
//! ```rust
//! use bel_graph::{Compiler, CompilerConfig, MemoryOracle};
//!
//! let oracle = MemoryOracle::new()
//!     .with_namespace("HGNC", ["AKT1", "MTOR"])
//!     .with_annotation("Species", ["9606"]);
//!
//! let compiler = Compiler::new(oracle, CompilerConfig::default());
//! let graph = compiler.compile_str(r#"
//! SET Citation = {"PubMed", "Example", "12345"}
//! SET Evidence = "AKT1 phosphorylates MTOR"
//! SET Species = "9606"
//! act(p(HGNC:AKT1), ma(kin)) -> p(HGNC:MTOR, pmod(Ph, Ser, 2448))
//! "#);
//!
//! assert!(graph.warnings().is_empty());
//! assert_eq!(graph.number_of_nodes(), 3);
//! print!("{}", bel_graph::to_bel_string(&graph));
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Line numbering  | `bel::lines` | definitions + numbered statement lines |
//! | Definitions | `bel::metadata` | document metadata, namespace / annotation definitions |
//! | Control lines | `bel::control` | citation, evidence, annotations |
//! | Statements | `bel::parser` | `Statement` AST |
//! | Canonicalization | `graph` | `BelGraph` |
//! | Emission | `export` | canonical BEL text |

// ============================================================================
// Modules
// ============================================================================

pub mod bel;
pub mod compiler;
pub mod config;
pub mod export;
pub mod graph;
pub mod model;
pub mod oracle;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Annotations, BelNode, Citation, Context, EdgeData, EdgeKey, Effect, EndpointModifier, Entity,
    Function, NodeData, NodeId, QualifiedEdge, Relation, Variant,
};

// ============================================================================
// Re-exports: Language, graph, emission
// ============================================================================

pub use bel::{parse_statement, parse_term, Statement, Term};
pub use compiler::{Compiler, Session};
pub use config::CompilerConfig;
pub use export::{decanonicalize_edge, decanonicalize_node, to_bel_string, write_bel};
pub use graph::{BelGraph, Edge, Warning};
pub use oracle::{MemoryOracle, NamespaceOracle};

// ============================================================================
// Error Types
// ============================================================================

/// How bad a diagnostic is. Warnings never reject a statement on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("BEL syntax error at position {position}: {message}")]
    Grammar { position: usize, message: String },

    #[error("Undefined namespace: {namespace}")]
    UndefinedNamespace { namespace: String },

    #[error("\"{name}\" is not in namespace {namespace}")]
    MissingNamespaceName { namespace: String, name: String },

    #[error("Naked name: {name}")]
    NakedName { name: String },

    #[error("Undefined annotation: {annotation}")]
    UndefinedAnnotation { annotation: String },

    #[error("Illegal value for annotation {annotation}: {value}")]
    IllegalAnnotationValue { annotation: String, value: String },

    #[error("Nested relation at position {position} is not supported")]
    NestedRelationNotSupported { position: usize },

    #[error("Translocation at position {position} needs both fromLoc and toLoc")]
    IllegalTranslocation { position: usize },

    #[error("Invalid citation: {0}")]
    InvalidCitation(String),

    #[error("Qualified statement without a citation")]
    MissingCitation,

    #[error("Annotation is not set: {key}")]
    MissingAnnotationKey { key: String },

    #[error("Required annotation is not set: {key}")]
    MissingRequiredAnnotation { key: String },

    #[error("Deprecated syntax at position {position}: {message}")]
    DeprecatedSyntax { position: usize, message: String },

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("Namespace oracle error: {0}")]
    Oracle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::DeprecatedSyntax { .. } | Error::MissingAnnotationKey { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

pub type Result<T> = std::result::Result<T, Error>;
