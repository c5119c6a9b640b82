//! Control parser: the `SET` / `UNSET` state machine that holds the ambient
//! citation, evidence, statement group and annotations of a document.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::identifier::Resolver;
use super::lexer::{ends_with_unescaped_quote, tokenize, unescape, TokenKind};
use super::metadata::Cursor;
use crate::model::{Annotations, Citation, Context};
use crate::{Error, Result};

/// Externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Bare,
    /// A `SET Evidence = "...` line was opened and not yet closed.
    AccumulatingEvidence,
}

const EVIDENCE_KEYS: &[&str] = &["Evidence", "SupportingText"];
const STATEMENT_GROUP: &str = "STATEMENT_GROUP";

#[derive(Debug, Default)]
pub struct ControlParser {
    citation: Option<Citation>,
    evidence: Option<String>,
    statement_group: Option<String>,
    annotations: Annotations,
    pending_evidence: Option<PendingEvidence>,
}

/// A `SET Evidence` value still waiting for its closing quote.
#[derive(Debug, Clone)]
struct PendingEvidence {
    line_number: usize,
    line: String,
    segments: Vec<String>,
}

impl ControlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        if self.pending_evidence.is_some() {
            ControlState::AccumulatingEvidence
        } else {
            ControlState::Bare
        }
    }

    /// `SET ...` / `UNSET ...` lines.
    pub fn is_control_line(line: &str) -> bool {
        matches!(line.split_whitespace().next(), Some("SET" | "UNSET"))
    }

    /// `SET Evidence = ...` / `SET SupportingText = ...` lines.
    pub fn is_evidence_line(line: &str) -> bool {
        evidence_value(line).is_some()
    }

    /// Line number and text of the `SET Evidence` line that is still open.
    pub fn open_evidence(&self) -> Option<(usize, &str)> {
        self.pending_evidence.as_ref().map(|p| (p.line_number, p.line.as_str()))
    }

    pub fn citation(&self) -> Option<&Citation> {
        self.citation.as_ref()
    }

    pub fn evidence(&self) -> Option<&str> {
        self.evidence.as_deref()
    }

    pub fn statement_group(&self) -> Option<&str> {
        self.statement_group.as_deref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Citation fields as `citation_*` keys, followed by the user annotations.
    pub fn current_annotations(&self) -> IndexMap<String, BTreeSet<String>> {
        let mut merged = IndexMap::new();
        if let Some(citation) = &self.citation {
            for (key, value) in citation.annotation_pairs() {
                merged.insert(key.to_string(), BTreeSet::from([value]));
            }
        }
        for (key, values) in self.annotations.iter() {
            merged.insert(key.clone(), values.clone());
        }
        merged
    }

    /// The context stamped on qualified edges.
    pub fn snapshot(&self) -> Context {
        Context {
            citation: self.citation.clone(),
            evidence: self.evidence.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// `UNSET ALL`.
    pub fn clear(&mut self) {
        self.citation = None;
        self.evidence = None;
        self.statement_group = None;
        self.annotations.clear();
        self.pending_evidence = None;
    }

    /// Apply one control line (or one continuation line while accumulating
    /// evidence). Returns non-fatal warnings.
    pub fn parse_line(
        &mut self,
        number: usize,
        line: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Vec<Error>> {
        if self.pending_evidence.is_some() {
            self.continue_evidence(line);
            return Ok(Vec::new());
        }

        if let Some(value) = evidence_value(line) {
            self.start_evidence(number, line, value)?;
            return Ok(Vec::new());
        }

        let tokens = tokenize(line)?;
        let mut cursor = Cursor { tokens: &tokens, pos: 0 };
        match cursor.word()?.as_str() {
            "SET" => {
                self.parse_set(&mut cursor, resolver)?;
                Ok(Vec::new())
            }
            "UNSET" => self.parse_unset(&mut cursor),
            other => Err(Error::Grammar {
                position: 0,
                message: format!("Expected SET or UNSET, got {other}"),
            }),
        }
    }

    fn parse_set(&mut self, cursor: &mut Cursor<'_>, resolver: &Resolver<'_>) -> Result<()> {
        let key = cursor.word()?;
        cursor.expect(TokenKind::Eq)?;

        match key.as_str() {
            "Citation" => {
                // A new citation opens a new block, even if it turns out to be invalid.
                self.clear();
                let fields = cursor.braced_list()?;
                cursor.end()?;
                let citation = Citation::from_fields(&fields)?;
                tracing::trace!(reference = %citation.reference, "SET Citation");
                self.citation = Some(citation);
            }
            STATEMENT_GROUP => {
                let group = cursor.text()?;
                cursor.end()?;
                tracing::trace!(%group, "SET STATEMENT_GROUP");
                self.statement_group = Some(group);
            }
            _ => {
                let values: BTreeSet<String> = if cursor.at(TokenKind::LBrace) {
                    cursor.braced_list()?.into_iter().collect()
                } else {
                    BTreeSet::from([cursor.text()?])
                };
                cursor.end()?;
                resolver.check_annotation(&key, &values)?;
                tracing::trace!(%key, ?values, "SET annotation");
                self.annotations.set(key, values);
            }
        }
        Ok(())
    }

    fn parse_unset(&mut self, cursor: &mut Cursor<'_>) -> Result<Vec<Error>> {
        let keys = if cursor.at(TokenKind::LBrace) {
            cursor.braced_list()?
        } else {
            vec![cursor.word()?]
        };
        cursor.end()?;

        let mut warnings = Vec::new();
        for key in keys {
            tracing::trace!(%key, "UNSET");
            match key.as_str() {
                "ALL" => self.clear(),
                "Citation" => self.citation = None,
                STATEMENT_GROUP => self.statement_group = None,
                k if EVIDENCE_KEYS.contains(&k) => self.evidence = None,
                k => {
                    if !self.annotations.remove(k) {
                        warnings.push(Error::MissingAnnotationKey { key: k.to_string() });
                    }
                }
            }
        }
        Ok(warnings)
    }

    fn start_evidence(&mut self, number: usize, line: &str, value: &str) -> Result<()> {
        let Some(body) = value.strip_prefix('"') else {
            return Err(Error::Grammar {
                position: 0,
                message: "Evidence must be a quoted string".into(),
            });
        };

        if ends_with_unescaped_quote(body) {
            let text = unescape(&body[..body.len() - 1]);
            tracing::trace!(len = text.len(), "SET Evidence");
            self.evidence = Some(text);
        } else {
            tracing::trace!("evidence continues on the next line");
            let mut segments = Vec::new();
            push_segment(&mut segments, strip_continuation(body));
            self.pending_evidence = Some(PendingEvidence {
                line_number: number,
                line: line.to_string(),
                segments,
            });
        }
        Ok(())
    }

    fn continue_evidence(&mut self, line: &str) {
        let line = line.trim();
        let closes = ends_with_unescaped_quote(line);
        let segment = if closes { &line[..line.len() - 1] } else { strip_continuation(line) };

        if let Some(pending) = self.pending_evidence.as_mut() {
            push_segment(&mut pending.segments, segment);
        }
        if closes {
            let segments = self.pending_evidence.take().map(|p| p.segments).unwrap_or_default();
            let text = unescape(&segments.join(" "));
            tracing::trace!(len = text.len(), "SET Evidence (multi-line)");
            self.evidence = Some(text);
        }
    }
}

/// The raw value of a `SET Evidence = ...` / `SET SupportingText = ...` line.
fn evidence_value(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("SET")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let rest = EVIDENCE_KEYS.iter().find_map(|key| rest.strip_prefix(key))?;
    Some(rest.trim_start().strip_prefix('=')?.trim())
}

fn strip_continuation(segment: &str) -> &str {
    segment.strip_suffix('\\').unwrap_or(segment)
}

fn push_segment(segments: &mut Vec<String>, segment: &str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        segments.push(segment.to_string());
    }
}
