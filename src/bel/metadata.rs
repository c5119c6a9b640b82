//! Definitions section: `SET DOCUMENT`, `DEFINE NAMESPACE`, `DEFINE ANNOTATION`.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;

use super::lexer::{quote, tokenize, Token, TokenKind};
use crate::{Error, Result};

/// How a namespace or annotation keyword was declared.
#[derive(Debug, Clone)]
pub enum Definition {
    /// Resolved by the namespace oracle.
    Url(String),
    List(BTreeSet<String>),
    /// Values must match the whole pattern.
    Pattern { source: String, regex: Regex },
}

impl Definition {
    fn pattern(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$"))
            .map_err(|e| Error::InvalidDefinition(format!("bad pattern {source:?}: {e}")))?;
        Ok(Definition::Pattern { source: source.to_string(), regex })
    }

    /// `Some(valid)` for document-local definitions; `None` when the oracle decides.
    pub fn accepts(&self, value: &str) -> Option<bool> {
        match self {
            Definition::Url(_) => None,
            Definition::List(values) => Some(values.contains(value)),
            Definition::Pattern { regex, .. } => Some(regex.is_match(value)),
        }
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Definition::Url(a), Definition::Url(b)) => a == b,
            (Definition::List(a), Definition::List(b)) => a == b,
            (Definition::Pattern { source: a, .. }, Definition::Pattern { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Renders the part after `AS`.
impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Url(url) => write!(f, "URL {}", quote(url)),
            Definition::List(values) => {
                let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "LIST {{{}}}", values.join(", "))
            }
            Definition::Pattern { source, .. } => write!(f, "PATTERN {}", quote(source)),
        }
    }
}

/// Namespace and annotation keywords declared by a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    pub namespaces: IndexMap<String, Definition>,
    pub annotations: IndexMap<String, Definition>,
}

impl Definitions {
    pub fn namespace(&self, keyword: &str) -> Option<&Definition> {
        self.namespaces.get(keyword)
    }

    pub fn annotation(&self, keyword: &str) -> Option<&Definition> {
        self.annotations.get(keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.annotations.is_empty()
    }

    /// Fold `other` in; identical redefinitions are fine, conflicting ones are not.
    pub fn merge(&mut self, other: &Definitions) -> Result<()> {
        for (kind, mine, theirs) in [
            ("namespace", &mut self.namespaces, &other.namespaces),
            ("annotation", &mut self.annotations, &other.annotations),
        ] {
            for (keyword, definition) in theirs {
                match mine.get(keyword) {
                    Some(existing) if existing != definition => {
                        return Err(Error::InvalidDefinition(format!(
                            "conflicting definitions of {kind} {keyword}"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        mine.insert(keyword.clone(), definition.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

/// `SET DOCUMENT` key/value pairs in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentMetadata(pub IndexMap<String, String>);

impl DocumentMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Stateful parser for the definitions section of one document.
#[derive(Debug, Default)]
pub struct MetadataParser {
    pub document: DocumentMetadata,
    pub definitions: Definitions,
}

impl MetadataParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `line` belongs to the definitions section.
    pub fn is_definition_line(line: &str) -> bool {
        let mut words = line.split_whitespace();
        matches!(
            (words.next(), words.next()),
            (Some("SET"), Some("DOCUMENT"))
                | (Some("DEFINE"), Some("NAMESPACE"))
                | (Some("DEFINE"), Some("ANNOTATION"))
        )
    }

    pub fn parse_line(&mut self, line: &str) -> Result<()> {
        let tokens = tokenize(line)?;
        let mut cursor = Cursor { tokens: &tokens, pos: 0 };

        match (cursor.word()?.as_str(), cursor.word()?.as_str()) {
            ("SET", "DOCUMENT") => {
                let key = cursor.word()?;
                cursor.expect(TokenKind::Eq)?;
                let value = cursor.text()?;
                cursor.end()?;
                tracing::trace!(%key, %value, "document metadata");
                self.document.0.insert(key, value);
                Ok(())
            }
            ("DEFINE", kind @ ("NAMESPACE" | "ANNOTATION")) => {
                let keyword = cursor.word()?;
                if cursor.word()? != "AS" {
                    return Err(Error::InvalidDefinition(format!("expected AS in: {line}")));
                }
                let definition = match cursor.word()?.as_str() {
                    "URL" => Definition::Url(cursor.text()?),
                    "LIST" => Definition::List(cursor.braced_list()?.into_iter().collect()),
                    "PATTERN" => Definition::pattern(&cursor.text()?)?,
                    other => {
                        return Err(Error::InvalidDefinition(format!("unknown definition type {other}")));
                    }
                };
                cursor.end()?;

                let table = if kind == "NAMESPACE" {
                    &mut self.definitions.namespaces
                } else {
                    &mut self.definitions.annotations
                };
                if table.contains_key(&keyword) {
                    return Err(Error::InvalidDefinition(format!(
                        "{} {keyword} is already defined",
                        kind.to_lowercase()
                    )));
                }
                tracing::trace!(%keyword, kind, "definition");
                table.insert(keyword, definition);
                Ok(())
            }
            _ => Err(Error::InvalidDefinition(format!("not a definition line: {line}"))),
        }
    }
}

/// Token cursor shared by the definitions and control parsers.
pub(crate) struct Cursor<'t> {
    pub(crate) tokens: &'t [Token],
    pub(crate) pos: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn grammar(&self, message: String) -> Error {
        Error::Grammar { position: self.peek().span.start, message }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.next())
        } else {
            Err(self.grammar(format!("Expected {:?}, got '{}'", kind, tok.text)))
        }
    }

    pub(crate) fn word(&mut self) -> Result<String> {
        Ok(self.expect(TokenKind::Word)?.text.clone())
    }

    /// A quoted string or bare word.
    pub(crate) fn text(&mut self) -> Result<String> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::StringLiteral | TokenKind::Word => Ok(self.next().text.clone()),
            _ => Err(self.grammar(format!("Expected a value, got '{}'", tok.text))),
        }
    }

    /// `{"a", "b", ...}`
    pub(crate) fn braced_list(&mut self) -> Result<Vec<String>> {
        self.expect(TokenKind::LBrace)?;
        let mut values = Vec::new();
        if self.peek().kind != TokenKind::RBrace {
            loop {
                values.push(self.text()?);
                if self.peek().kind == TokenKind::Comma {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(values)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn end(&self) -> Result<()> {
        if self.at(TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.grammar(format!("Unexpected trailing '{}'", self.peek().text)))
        }
    }
}
