//! Document compilation: lines in, `BelGraph` out.
//!
//! ```text
//! text → split_document → definitions → MetadataParser
//!                       → statements  → ControlParser (SET / UNSET)
//!                                     → parse_statement → Resolver → BelGraph
//! ```
//!
//! Per-statement failures never abort a document. Each one is recorded as a
//! [`Warning`] on the graph, with the annotations in effect at that line,
//! and compilation continues with the next line.

use std::io::Read;

use crate::bel::{
    parse_statement, split_document, ControlParser, ControlState, Definitions, Line,
    MetadataParser, Resolver, Statement,
};
use crate::config::CompilerConfig;
use crate::graph::{BelGraph, Warning};
use crate::oracle::NamespaceOracle;
use crate::{Error, Result};

/// Compiles BEL documents against one namespace oracle.
///
/// A compiler holds no per-document state, so one instance can compile many
/// documents, also from several threads at once.
#[derive(Debug, Clone)]
pub struct Compiler<O: NamespaceOracle> {
    oracle: O,
    config: CompilerConfig,
}

impl<O: NamespaceOracle> Compiler<O> {
    pub fn new(oracle: O, config: CompilerConfig) -> Self {
        Self { oracle, config }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Start an incremental compilation.
    pub fn session(&self) -> Session<'_, O> {
        Session::new(self)
    }

    pub fn compile_str(&self, text: &str) -> BelGraph {
        let document = split_document(text);
        let mut session = self.session();
        for line in &document.definitions {
            session.feed_definition(line);
        }
        for line in &document.statements {
            session.feed_statement(line);
        }
        session.finish()
    }

    /// Read the whole document, then compile it.
    pub fn compile_reader<R: Read>(&self, mut reader: R) -> Result<BelGraph> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(self.compile_str(&text))
    }

    /// Compile independent documents in parallel and merge the results in
    /// input order. Fails only when two documents define the same keyword
    /// differently.
    pub fn compile_many(&self, documents: &[&str]) -> Result<BelGraph> {
        let graphs: Vec<BelGraph> = std::thread::scope(|scope| {
            let handles: Vec<_> = documents
                .iter()
                .map(|text| scope.spawn(move || self.compile_str(text)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut merged = BelGraph::new().with_complete_origin(self.config.complete_origin);
        for graph in graphs {
            merged.merge(graph)?;
        }
        tracing::info!(
            documents = documents.len(),
            nodes = merged.number_of_nodes(),
            edges = merged.number_of_edges(),
            "documents merged"
        );
        Ok(merged)
    }
}

// ============================================================================
// Session
// ============================================================================

/// One document being compiled, fed line by line.
///
/// Definition lines must come before statement lines: definitions fed after
/// the first statement still apply to the statements that follow them.
pub struct Session<'c, O: NamespaceOracle> {
    compiler: &'c Compiler<O>,
    metadata: MetadataParser,
    control: ControlParser,
    graph: BelGraph,
    /// A statement continued with a trailing `\`: first line number, text so far.
    pending: Option<(usize, String)>,
}

impl<'c, O: NamespaceOracle> Session<'c, O> {
    fn new(compiler: &'c Compiler<O>) -> Self {
        Self {
            compiler,
            metadata: MetadataParser::new(),
            control: ControlParser::new(),
            graph: BelGraph::new().with_complete_origin(compiler.config.complete_origin),
            pending: None,
        }
    }

    pub fn control(&self) -> &ControlParser {
        &self.control
    }

    pub fn graph(&self) -> &BelGraph {
        &self.graph
    }

    /// A `SET DOCUMENT` or `DEFINE` line.
    pub fn feed_definition(&mut self, line: &Line) {
        if let Err(error) = self.metadata.parse_line(&line.text) {
            self.reject(line.number, &line.text, error);
        }
    }

    /// A control line, a statement, or a continuation of either. Blank
    /// lines and comments are skipped unless they continue an open evidence
    /// value.
    pub fn feed_statement(&mut self, line: &Line) {
        if self.control.state() == ControlState::AccumulatingEvidence {
            self.control_line(line.number, &line.text);
            return;
        }
        if !line.is_content() {
            return;
        }

        let (number, text) = match self.pending.take() {
            Some((number, mut text)) => {
                text.push(' ');
                text.push_str(line.text.trim());
                (number, text)
            }
            None => (line.number, line.text.clone()),
        };

        // Evidence keeps its own continuation rules.
        if !ControlParser::is_evidence_line(&text) {
            if let Some(head) = text.strip_suffix('\\') {
                self.pending = Some((number, head.trim_end().to_string()));
                return;
            }
        }
        self.dispatch(number, &text);
    }

    /// Close the document and hand over the graph.
    pub fn finish(mut self) -> BelGraph {
        if let Some((number, text)) = self.pending.take() {
            self.dispatch(number, &text);
        }
        let open = self.control.open_evidence().map(|(number, text)| (number, text.to_string()));
        if let Some((number, text)) = open {
            self.reject(
                number,
                &text,
                Error::Grammar {
                    position: text.len(),
                    message: "Evidence is not closed at the end of the document".into(),
                },
            );
        }

        let MetadataParser { document, definitions } = self.metadata;
        self.graph.set_document(document, definitions);
        tracing::info!(
            nodes = self.graph.number_of_nodes(),
            edges = self.graph.number_of_edges(),
            warnings = self.graph.warnings().len(),
            "document compiled"
        );
        self.graph
    }

    fn dispatch(&mut self, number: usize, text: &str) {
        if ControlParser::is_control_line(text) {
            self.control_line(number, text);
        } else {
            self.statement_line(number, text);
        }
    }

    fn control_line(&mut self, number: usize, text: &str) {
        let resolver = resolver(self.compiler, &self.metadata.definitions);
        match self.control.parse_line(number, text, &resolver) {
            Ok(warnings) => {
                for warning in warnings {
                    self.reject(number, text, warning);
                }
            }
            Err(error) => self.reject(number, text, error),
        }
    }

    fn statement_line(&mut self, number: usize, text: &str) {
        tracing::debug!(line = number, statement = text, "statement");
        match self.add_statement(number, text) {
            Ok(deprecations) => {
                for warning in deprecations {
                    self.reject(number, text, warning);
                }
            }
            Err(error) => self.reject(number, text, error),
        }
    }

    /// Parse, validate and insert one statement. Returns the deprecation
    /// warnings of an accepted statement.
    fn add_statement(&mut self, number: usize, text: &str) -> Result<Vec<Error>> {
        let parsed = parse_statement(text)?;
        if !self.compiler.config.allow_deprecated {
            if let Some(first) = parsed.warnings.into_iter().next() {
                return Err(first);
            }
            return self.insert(number, &parsed.value).map(|()| Vec::new());
        }
        self.insert(number, &parsed.value)?;
        Ok(parsed.warnings)
    }

    fn insert(&mut self, number: usize, statement: &Statement) -> Result<()> {
        let compiler = self.compiler;
        let config = &compiler.config;
        resolver(compiler, &self.metadata.definitions).validate_statement(statement)?;

        if statement.is_qualified() {
            if config.require_citation && self.control.citation().is_none() {
                return Err(Error::MissingCitation);
            }
            if let Some(key) = config
                .required_annotations
                .iter()
                .find(|key| !self.control.annotations().contains_key(key.as_str()))
            {
                return Err(Error::MissingRequiredAnnotation { key: key.clone() });
            }
        }

        self.graph.add_statement(statement, &self.control.snapshot(), Some(number))?;
        Ok(())
    }

    fn reject(&mut self, line_number: usize, line: &str, error: Error) {
        tracing::warn!(line = line_number, %error, "statement rejected");
        self.graph.push_warning(Warning {
            line_number,
            line: line.to_string(),
            error,
            annotations: self.control.current_annotations(),
        });
    }
}

fn resolver<'a, O: NamespaceOracle>(
    compiler: &'a Compiler<O>,
    definitions: &'a Definitions,
) -> Resolver<'a> {
    Resolver::new(&compiler.oracle, definitions)
        .allow_naked_names(compiler.config.allow_naked_names)
        .skip_validation(compiler.config.skip_validation)
}
