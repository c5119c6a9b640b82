//! BEL lexer — tokenizes one logical line.
//!
//! Every other component (term grammar, control parser, definitions parser)
//! works on this token stream, so the quoting rules live here too.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span (byte offsets into the line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Function names, namespace keywords, unquoted names, numbers, `?`, `*`.
    Word,
    /// Double-quoted string; `text` holds the unescaped content.
    StringLiteral,
    /// Relation operator: `->`, `=>`, `-|`, `=|`, `--`, `:>`, `>>`.
    Symbol,

    // Punctuation
    LParen, RParen, LBrace, RBrace,
    Comma, Colon, Eq,

    Eof,
}

/// Tokenize a BEL line.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            '"' => {
                chars.next(); // consume opening quote
                let start = pos;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            match chars.next() {
                                Some((_, '"')) => s.push('"'),
                                Some((_, '\\')) => s.push('\\'),
                                Some((_, c)) => { s.push('\\'); s.push(c); }
                                None => s.push('\\'),
                            }
                        }
                        Some((end, '"')) => {
                            tokens.push(Token {
                                kind: TokenKind::StringLiteral,
                                span: Span { start, end: end + 1 },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::Grammar {
                            position: start,
                            message: "Unterminated string literal".into(),
                        }),
                    }
                }
            }

            '(' => { chars.next(); tokens.push(punct(TokenKind::LParen, pos, "(")); }
            ')' => { chars.next(); tokens.push(punct(TokenKind::RParen, pos, ")")); }
            '{' => { chars.next(); tokens.push(punct(TokenKind::LBrace, pos, "{")); }
            '}' => { chars.next(); tokens.push(punct(TokenKind::RBrace, pos, "}")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }
            ':' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '>'))) {
                    chars.next();
                    tokens.push(punct(TokenKind::Symbol, pos, ":>"));
                } else {
                    tokens.push(punct(TokenKind::Colon, pos, ":"));
                }
            }
            '=' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '>')) => {
                        chars.next();
                        tokens.push(punct(TokenKind::Symbol, pos, "=>"));
                    }
                    Some(&(_, '|')) => {
                        chars.next();
                        tokens.push(punct(TokenKind::Symbol, pos, "=|"));
                    }
                    _ => tokens.push(punct(TokenKind::Eq, pos, "=")),
                }
            }
            '-' => {
                chars.next();
                let text = match chars.peek() {
                    Some(&(_, '>')) => "->",
                    Some(&(_, '|')) => "-|",
                    Some(&(_, '-')) => "--",
                    _ => return Err(Error::Grammar {
                        position: pos,
                        message: "Unexpected character: '-'".into(),
                    }),
                };
                chars.next();
                tokens.push(punct(TokenKind::Symbol, pos, text));
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '>'))) {
                    chars.next();
                    tokens.push(punct(TokenKind::Symbol, pos, ">>"));
                } else {
                    return Err(Error::Grammar {
                        position: pos,
                        message: "Unexpected character: '>'".into(),
                    });
                }
            }

            c if is_word_start(c) => {
                let start = pos;
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_word_char(c) {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Word,
                    span: Span { start, end: start + word.len() },
                    text: word,
                });
            }

            other => {
                return Err(Error::Grammar {
                    position: pos,
                    message: format!("Unexpected character: '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '?' | '*')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '?' | '*' | '+')
}

/// Whether a name has to be quoted to survive a round trip through the lexer.
pub fn needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() || c == '_' => {}
        _ => return true,
    }
    !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Wrap in double quotes, escaping backslashes and quotes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quote only when [`needs_quotes`] says so.
pub fn quote_if_needed(s: &str) -> String {
    if needs_quotes(s) { quote(s) } else { s.to_string() }
}

/// Reverse of [`quote`] for text that has already had its outer quotes removed.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => { out.push('\\'); out.push(other); }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// True when `s` ends in a `"` that is not escaped by a backslash.
pub fn ends_with_unescaped_quote(s: &str) -> bool {
    let Some(body) = s.strip_suffix('"') else {
        return false;
    };
    let backslashes = body.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 0
}
