//! BEL recursive descent parser.
//!
//! Parses one statement line into a [`Statement`]. Supports:
//! - the ten abundance / process functions in long and short form
//! - variants: `pmod`, `var`, `frag`, `gmod`, and the BEL 1.0 `sub` / `trunc`
//! - BEL 2.0 fusions and the BEL 1.0 trailing `fus(...)` form
//! - `complex(...)` / `composite(...)` lists, named complexes, `rxn(...)`
//! - endpoint wrappers `act`, `deg`, `tloc`, `sec`, `surf`, and the BEL 1.0
//!   activity functions (`kin(...)`, `tscript(...)`, ...)
//! - `subject relation object`, lone terms, and `hasMembers` / `hasComponents`
//!   list statements
//!
//! Legacy spellings are normalized and reported as `DeprecatedSyntax`
//! warnings on the returned [`Parsed`] value. Names are not validated here.

use super::ast::*;
use super::lexer::{tokenize, Token, TokenKind};
use super::{vocab, Parsed};
use crate::model::{
    Coordinate, Entity, Fragment, Function, FusionRange, Variant, BEL_DEFAULT_NAMESPACE,
};
use crate::{Error, Result};

const LOC: &[&str] = &["loc", "location"];
const FROM_LOC: &[&str] = &["fromLoc", "fromLocation"];
const TO_LOC: &[&str] = &["toLoc", "toLocation"];
const MA: &[&str] = &["ma", "molecularActivity"];
const FUSION: &[&str] = &["fus", "fusion"];

/// Parser state — wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    warnings: Vec<Error>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0, warnings: Vec::new() }
    }

    fn peek(&self) -> &'t Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &'t Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// At a word from `names` that opens a call: `name(`.
    fn at_call(&self, names: &[&str]) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Word
            && names.contains(&tok.text.as_str())
            && self.nth(1).kind == TokenKind::LParen
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: impl Into<String>) -> Error {
        Error::Grammar {
            position: self.peek().span.start,
            message: msg.into(),
        }
    }

    fn deprecated(&mut self, position: usize, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(position, %message, "deprecated BEL syntax normalized");
        self.warnings.push(Error::DeprecatedSyntax { position, message });
    }

    fn finish<T>(self, value: T) -> Parsed<T> {
        Parsed { value, warnings: self.warnings }
    }
}

/// Parse a complete statement line.
pub fn parse_statement(input: &str) -> Result<Parsed<Statement>> {
    let tokens = tokenize(input)?;
    let mut p = Parser::new(&tokens);

    let subject = parse_term_inner(&mut p)?;
    if p.at(TokenKind::Eof) {
        return Ok(p.finish(Statement::Term(subject)));
    }

    let rel = p.peek();
    if !matches!(rel.kind, TokenKind::Symbol | TokenKind::Word) {
        return Err(p.error(format!("Expected a relation, got '{}'", rel.text)));
    }

    if let Some(relation) = vocab::list_relation(&rel.text) {
        p.advance();
        let list_at = p.peek().span.start;
        let members = parse_member_list(&mut p)?;
        expect_end(&p)?;
        check_bare(&subject, 0)?;
        for member in &members {
            check_bare(member, list_at)?;
        }
        return Ok(p.finish(Statement::Members { subject, relation, members }));
    }

    let relation = vocab::relation(&rel.text)
        .ok_or_else(|| p.error(format!("Unknown relation: {}", rel.text)))?;
    p.advance();

    // `a -> (b -| c)`
    if p.at(TokenKind::LParen) {
        return Err(Error::NestedRelationNotSupported { position: p.peek().span.start });
    }

    let object_at = p.peek().span.start;
    let object = parse_term_inner(&mut p)?;
    expect_end(&p)?;
    if relation.is_unqualified() {
        check_bare(&subject, 0)?;
        check_bare(&object, object_at)?;
    }
    Ok(p.finish(Statement::Relation { subject, relation, object }))
}

/// Unqualified relations take plain terms: no endpoint wrapper, no `loc()`.
fn check_bare(term: &Term, position: usize) -> Result<()> {
    if term.modifier().is_some() || term.location().is_some() {
        return Err(Error::Grammar {
            position,
            message: "activity, degradation, translocation and loc() need a qualified relation"
                .into(),
        });
    }
    Ok(())
}

/// Parse a term that makes up the whole input.
pub fn parse_term(input: &str) -> Result<Parsed<Term>> {
    let tokens = tokenize(input)?;
    let mut p = Parser::new(&tokens);
    let term = parse_term_inner(&mut p)?;
    expect_end(&p)?;
    Ok(p.finish(term))
}

fn expect_end(p: &Parser) -> Result<()> {
    if p.at(TokenKind::Eof) {
        Ok(())
    } else {
        Err(p.error(format!("Unexpected token after statement: '{}'", p.peek().text)))
    }
}

// ============================================================================
// Terms
// ============================================================================

fn parse_term_inner(p: &mut Parser) -> Result<Term> {
    let tok = p.peek();
    if tok.kind != TokenKind::Word {
        return Err(p.error(format!("Expected a BEL function, got '{}'", tok.text)));
    }
    let start = tok.span.start;
    let name = tok.text.as_str();

    if let Some(function) = vocab::function(name) {
        p.advance();
        return match function {
            Function::Reaction => parse_reaction(p),
            Function::Complex | Function::Composite => parse_list(p, function),
            _ => parse_abundance(p, function),
        };
    }

    match name {
        "act" | "activity" => {
            p.advance();
            parse_activity(p)
        }
        "deg" | "degradation" => {
            p.advance();
            let target = parse_wrapped_target(p)?;
            Ok(modified(Modifier::Degradation, target))
        }
        "tloc" | "translocation" => {
            p.advance();
            parse_translocation(p, start)
        }
        "sec" | "cellSecretion" => {
            p.advance();
            let target = parse_wrapped_target(p)?;
            Ok(modified(Modifier::Secretion, target))
        }
        "surf" | "cellSurfaceExpression" => {
            p.advance();
            let target = parse_wrapped_target(p)?;
            Ok(modified(Modifier::SurfaceExpression, target))
        }
        _ => match vocab::activity_default(name) {
            Some(activity) => {
                p.advance();
                p.deprecated(start, format!("{name}(...) is replaced by act(..., ma({activity}))"));
                let target = parse_wrapped_target(p)?;
                Ok(modified(
                    Modifier::Activity { activity: Some(Entity::bel_default(activity)) },
                    target,
                ))
            }
            None => Err(p.error(format!("Unknown function: {name}"))),
        },
    }
}

fn modified(modifier: Modifier, target: Term) -> Term {
    Term::Modified { modifier, target: Box::new(target) }
}

/// A term that may not itself be wrapped in a modifier.
fn parse_member(p: &mut Parser) -> Result<Term> {
    let start = p.peek().span.start;
    let term = parse_term_inner(p)?;
    if matches!(term, Term::Modified { .. }) {
        return Err(Error::Grammar {
            position: start,
            message: "Modifier functions cannot be nested inside other terms".into(),
        });
    }
    Ok(term)
}

/// `( term )`
fn parse_wrapped_target(p: &mut Parser) -> Result<Term> {
    p.expect(TokenKind::LParen)?;
    let target = parse_member(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(target)
}

fn parse_abundance(p: &mut Parser, function: Function) -> Result<Term> {
    p.expect(TokenKind::LParen)?;

    if function.is_central_dogma() && p.at_call(FUSION) {
        p.advance();
        let (partner_5p, range_5p, partner_3p, range_3p) = parse_fusion(p)?;
        let location = parse_trailing_location(p)?;
        p.expect(TokenKind::RParen)?;
        return Ok(Term::Fusion { function, partner_5p, range_5p, partner_3p, range_3p, location });
    }

    let entity = parse_entity(p)?;
    let mut variants = Vec::new();
    let mut legacy_fusion = None;
    let mut location = None;

    while p.eat(TokenKind::Comma) {
        let tok = p.peek();
        let at = tok.span.start;
        if tok.kind != TokenKind::Word {
            return Err(p.error(format!("Expected a variant or loc(...), got '{}'", tok.text)));
        }
        match tok.text.as_str() {
            "loc" | "location" => {
                location = Some(parse_wrapped_entity(p, LOC)?);
                break;
            }
            "pmod" | "proteinModification" => {
                check_variant(function, at, "pmod", &[Function::Protein])?;
                p.advance();
                variants.push(parse_pmod(p)?);
            }
            "var" | "variant" => {
                check_variant(function, at, "var", CENTRAL_DOGMA)?;
                p.advance();
                variants.push(parse_hgvs(p)?);
            }
            "frag" | "fragment" => {
                check_variant(function, at, "frag", &[Function::Protein])?;
                p.advance();
                variants.push(parse_fragment(p)?);
            }
            "gmod" | "geneModification" => {
                check_variant(function, at, "gmod", &[Function::Gene])?;
                p.advance();
                variants.push(parse_gmod(p)?);
            }
            "sub" | "substitution" => {
                check_variant(function, at, "sub", &[Function::Protein, Function::Gene])?;
                p.advance();
                variants.push(parse_substitution(p, function, at)?);
            }
            "trunc" | "truncation" => {
                check_variant(function, at, "trunc", &[Function::Protein])?;
                p.advance();
                variants.push(parse_truncation(p, at)?);
            }
            "fus" | "fusion" => {
                check_variant(function, at, "fus", CENTRAL_DOGMA)?;
                p.advance();
                legacy_fusion = Some(parse_legacy_fusion(p, function, at)?);
            }
            other => return Err(p.error(format!("Unknown variant: {other}"))),
        }
    }
    p.expect(TokenKind::RParen)?;

    if let Some((partner_3p, range_5p, range_3p)) = legacy_fusion {
        if !variants.is_empty() {
            return Err(p.error("A fusion cannot carry variants"));
        }
        return Ok(Term::Fusion {
            function,
            partner_5p: entity,
            range_5p,
            partner_3p,
            range_3p,
            location,
        });
    }

    if variants.is_empty() {
        Ok(Term::Simple { function, entity, location })
    } else {
        Ok(Term::Variant { function, entity, variants, location })
    }
}

const CENTRAL_DOGMA: &[Function] =
    &[Function::Gene, Function::Rna, Function::MicroRna, Function::Protein];

fn check_variant(function: Function, position: usize, name: &str, allowed: &[Function]) -> Result<()> {
    if allowed.contains(&function) {
        Ok(())
    } else {
        Err(Error::Grammar {
            position,
            message: format!("{name}(...) is not allowed in {}", function.long_name()),
        })
    }
}

fn parse_trailing_location(p: &mut Parser) -> Result<Option<Entity>> {
    if p.eat(TokenKind::Comma) {
        Ok(Some(parse_wrapped_entity(p, LOC)?))
    } else {
        Ok(None)
    }
}

fn parse_list(p: &mut Parser, function: Function) -> Result<Term> {
    p.expect(TokenKind::LParen)?;

    // complex(ns:name)
    let opens_member = p.at(TokenKind::Word) && p.nth(1).kind == TokenKind::LParen;
    if function == Function::Complex && !opens_member {
        let entity = parse_entity(p)?;
        let location = parse_trailing_location(p)?;
        p.expect(TokenKind::RParen)?;
        return Ok(Term::Simple { function, entity, location });
    }

    let mut members = Vec::new();
    let mut location = None;
    loop {
        if p.at_call(LOC) && !members.is_empty() {
            location = Some(parse_wrapped_entity(p, LOC)?);
            break;
        }
        members.push(parse_member(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(Term::List { function, members, location })
}

fn parse_reaction(p: &mut Parser) -> Result<Term> {
    p.expect(TokenKind::LParen)?;
    let reactants = parse_participants(p, &["reactants"])?;
    p.expect(TokenKind::Comma)?;
    let products = parse_participants(p, &["products"])?;
    p.expect(TokenKind::RParen)?;
    Ok(Term::Reaction { reactants, products })
}

fn parse_participants(p: &mut Parser, names: &[&str]) -> Result<Vec<Term>> {
    if !p.at_call(names) {
        return Err(p.error(format!("Expected {}(...)", names[0])));
    }
    p.advance();
    p.expect(TokenKind::LParen)?;
    let mut terms = Vec::new();
    if !p.at(TokenKind::RParen) {
        loop {
            terms.push(parse_member(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(terms)
}

/// Object of `hasMembers`: `list(t1, t2, ...)` or `(t1, t2, ...)`.
fn parse_member_list(p: &mut Parser) -> Result<Vec<Term>> {
    if p.at_call(&["list"]) {
        p.advance();
    }
    p.expect(TokenKind::LParen)?;
    let mut members = Vec::new();
    loop {
        members.push(parse_member(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(members)
}

// ============================================================================
// Endpoint wrappers
// ============================================================================

fn parse_activity(p: &mut Parser) -> Result<Term> {
    p.expect(TokenKind::LParen)?;
    let target = parse_member(p)?;
    let mut activity = None;
    if p.eat(TokenKind::Comma) {
        if !p.at_call(MA) {
            return Err(p.error("Expected ma(...)"));
        }
        p.advance();
        p.expect(TokenKind::LParen)?;
        let entity = parse_entity(p)?;
        p.expect(TokenKind::RParen)?;
        activity = Some(match (&entity.namespace, vocab::activity_default(&entity.name)) {
            (None, Some(default)) => Entity::bel_default(default),
            _ => entity,
        });
    }
    p.expect(TokenKind::RParen)?;
    Ok(modified(Modifier::Activity { activity }, target))
}

fn parse_translocation(p: &mut Parser, start: usize) -> Result<Term> {
    p.expect(TokenKind::LParen)?;
    let target = parse_member(p)?;
    if !p.eat(TokenKind::Comma) {
        return Err(Error::IllegalTranslocation { position: start });
    }

    let (from, to) = if p.at_call(FROM_LOC) {
        let from = parse_wrapped_entity(p, FROM_LOC)?;
        p.expect(TokenKind::Comma)?;
        let to = parse_wrapped_entity(p, TO_LOC)?;
        (from, to)
    } else {
        let at = p.peek().span.start;
        let from = parse_entity(p)?;
        p.expect(TokenKind::Comma)?;
        let to = parse_entity(p)?;
        p.deprecated(at, "tloc(t, a, b) is replaced by tloc(t, fromLoc(a), toLoc(b))");
        (from, to)
    };

    p.expect(TokenKind::RParen)?;
    Ok(modified(Modifier::Translocation { from, to }, target))
}

// ============================================================================
// Variants
// ============================================================================

fn parse_pmod(p: &mut Parser) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let at = p.peek().span.start;
    let raw = parse_entity(p)?;
    let identifier = if raw.namespace.is_some() {
        raw
    } else if let Some(code) = vocab::pmod_default(&raw.name) {
        Entity::bel_default(code)
    } else if let Some(code) = vocab::pmod_legacy(&raw.name) {
        p.deprecated(at, format!("pmod code {} is replaced by {code}", raw.name));
        Entity::bel_default(code)
    } else {
        return Err(Error::Grammar {
            position: at,
            message: format!("Unknown protein modification: {}", raw.name),
        });
    };

    let mut code = None;
    let mut position = None;
    if p.eat(TokenKind::Comma) {
        code = Some(parse_amino_acid(p)?.to_string());
        if p.eat(TokenKind::Comma) {
            position = Some(parse_position(p)?);
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(Variant::ProteinModification { identifier, code, position })
}

fn parse_gmod(p: &mut Parser) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let at = p.peek().span.start;
    let raw = parse_entity(p)?;
    p.expect(TokenKind::RParen)?;
    let identifier = if raw.namespace.is_some() {
        raw
    } else if let Some(code) = vocab::gmod_default(&raw.name) {
        Entity::bel_default(code)
    } else {
        return Err(Error::Grammar {
            position: at,
            message: format!("Unknown gene modification: {}", raw.name),
        });
    };
    Ok(Variant::GeneModification { identifier })
}

fn parse_hgvs(p: &mut Parser) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let hgvs = parse_text(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(Variant::Hgvs(hgvs))
}

fn parse_fragment(p: &mut Parser) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let at = p.peek().span.start;
    let text = parse_text(p)?;
    let range = Fragment::parse_range(&text).ok_or_else(|| Error::Grammar {
        position: at,
        message: format!("Invalid fragment range: {text}"),
    })?;
    let description = if p.eat(TokenKind::Comma) { Some(parse_text(p)?) } else { None };
    p.expect(TokenKind::RParen)?;
    Ok(Variant::Fragment(Fragment { range, description }))
}

/// `sub(G, 12, V)` on a protein or `sub(C, 308, T)` on a gene, as HGVS.
fn parse_substitution(p: &mut Parser, function: Function, at: usize) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let hgvs = if function == Function::Protein {
        let reference = parse_amino_acid(p)?;
        p.expect(TokenKind::Comma)?;
        let position = parse_position(p)?;
        p.expect(TokenKind::Comma)?;
        let variant = parse_amino_acid(p)?;
        format!("p.{reference}{position}{variant}")
    } else {
        let reference = parse_nucleotide(p)?;
        p.expect(TokenKind::Comma)?;
        let position = parse_position(p)?;
        p.expect(TokenKind::Comma)?;
        let variant = parse_nucleotide(p)?;
        format!("c.{position}{reference}>{variant}")
    };
    p.expect(TokenKind::RParen)?;
    p.deprecated(at, format!("sub(...) is replaced by var(\"{hgvs}\")"));
    Ok(Variant::Hgvs(hgvs))
}

fn parse_truncation(p: &mut Parser, at: usize) -> Result<Variant> {
    p.expect(TokenKind::LParen)?;
    let position = parse_position(p)?;
    p.expect(TokenKind::RParen)?;
    let hgvs = format!("p.{position}*");
    p.deprecated(at, format!("trunc(...) is replaced by var(\"{hgvs}\")"));
    Ok(Variant::Hgvs(hgvs))
}

// ============================================================================
// Fusions
// ============================================================================

type FusionParts = (Entity, FusionRange, Entity, FusionRange);

/// `fus(ns:a, "r.1_79", ns:b, "r.312_5034")`
fn parse_fusion(p: &mut Parser) -> Result<FusionParts> {
    p.expect(TokenKind::LParen)?;
    let partner_5p = parse_entity(p)?;
    p.expect(TokenKind::Comma)?;
    let range_5p = parse_fusion_range(p)?;
    p.expect(TokenKind::Comma)?;
    let partner_3p = parse_entity(p)?;
    p.expect(TokenKind::Comma)?;
    let range_3p = parse_fusion_range(p)?;
    p.expect(TokenKind::RParen)?;
    Ok((partner_5p, range_5p, partner_3p, range_3p))
}

fn parse_fusion_range(p: &mut Parser) -> Result<FusionRange> {
    let at = p.peek().span.start;
    let text = parse_text(p)?;
    FusionRange::parse(&text).ok_or_else(|| Error::Grammar {
        position: at,
        message: format!("Invalid fusion range: {text}"),
    })
}

/// BEL 1.0 `p(ns:a, fus(ns:b, 5p_end, 3p_start))`, returning the 3' partner
/// and both ranges.
fn parse_legacy_fusion(
    p: &mut Parser,
    function: Function,
    at: usize,
) -> Result<(Entity, FusionRange, FusionRange)> {
    p.expect(TokenKind::LParen)?;
    let partner_3p = parse_entity(p)?;
    let (range_5p, range_3p) = if p.eat(TokenKind::Comma) {
        let end_5p = parse_coordinate(p)?;
        p.expect(TokenKind::Comma)?;
        let start_3p = parse_coordinate(p)?;
        let reference = function.fusion_reference().unwrap_or("p").to_string();
        (
            FusionRange::Range { reference: reference.clone(), start: Coordinate::Unknown, stop: end_5p },
            FusionRange::Range { reference, start: start_3p, stop: Coordinate::Unknown },
        )
    } else {
        (FusionRange::Missing, FusionRange::Missing)
    };
    p.expect(TokenKind::RParen)?;
    p.deprecated(at, "trailing fus(...) is replaced by fus(5', range, 3', range)");
    Ok((partner_3p, range_5p, range_3p))
}

// ============================================================================
// Leaves
// ============================================================================

/// `ns:name`, `ns:"quoted name"`, or a bare name. The built-in vocabulary
/// namespace cannot be written.
fn parse_entity(p: &mut Parser) -> Result<Entity> {
    let first = p.peek();
    match first.kind {
        TokenKind::Word => {
            p.advance();
            if p.eat(TokenKind::Colon) {
                if first.text == BEL_DEFAULT_NAMESPACE {
                    return Err(Error::UndefinedNamespace { namespace: first.text.clone() });
                }
                let name = parse_text(p)?;
                Ok(Entity::new(first.text.clone(), name))
            } else {
                Ok(Entity::naked(first.text.clone()))
            }
        }
        TokenKind::StringLiteral => {
            p.advance();
            Ok(Entity::naked(first.text.clone()))
        }
        _ => Err(p.error(format!("Expected an identifier, got '{}'", first.text))),
    }
}

/// `name(entity)` for one of `names`.
fn parse_wrapped_entity(p: &mut Parser, names: &[&str]) -> Result<Entity> {
    if !p.at_call(names) {
        return Err(p.error(format!("Expected {}(...)", names[0])));
    }
    p.advance();
    p.expect(TokenKind::LParen)?;
    let entity = parse_entity(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(entity)
}

/// A word or a quoted string.
fn parse_text(p: &mut Parser) -> Result<String> {
    let tok = p.peek();
    match tok.kind {
        TokenKind::Word | TokenKind::StringLiteral => {
            p.advance();
            Ok(tok.text.clone())
        }
        _ => Err(p.error(format!("Expected a name or string, got '{}'", tok.text))),
    }
}

fn parse_amino_acid(p: &mut Parser) -> Result<&'static str> {
    let tok = p.expect(TokenKind::Word)?;
    let code = vocab::amino_acid(&tok.text).ok_or_else(|| Error::Grammar {
        position: tok.span.start,
        message: format!("Unknown amino acid: {}", tok.text),
    })?;
    if tok.text.len() == 1 {
        p.deprecated(tok.span.start, format!("amino acid {} is replaced by {code}", tok.text));
    }
    Ok(code)
}

fn parse_nucleotide(p: &mut Parser) -> Result<String> {
    let tok = p.expect(TokenKind::Word)?;
    if vocab::is_nucleotide(&tok.text) {
        Ok(tok.text.clone())
    } else {
        Err(Error::Grammar {
            position: tok.span.start,
            message: format!("Unknown nucleotide: {}", tok.text),
        })
    }
}

fn parse_position(p: &mut Parser) -> Result<u64> {
    let tok = p.expect(TokenKind::Word)?;
    tok.text.parse().map_err(|_| Error::Grammar {
        position: tok.span.start,
        message: format!("Expected a sequence position, got '{}'", tok.text),
    })
}

fn parse_coordinate(p: &mut Parser) -> Result<Coordinate> {
    let at = p.peek().span.start;
    let text = parse_text(p)?;
    Coordinate::parse(&text).ok_or_else(|| Error::Grammar {
        position: at,
        message: format!("Expected a sequence position, got '{text}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relation;
    use pretty_assertions::assert_eq;

    fn stmt(input: &str) -> Statement {
        parse_statement(input).unwrap().value
    }

    fn term(input: &str) -> Term {
        parse_term(input).unwrap().value
    }

    fn hgnc(name: &str) -> Entity {
        Entity::new("HGNC", name)
    }

    fn protein(name: &str) -> Term {
        Term::Simple { function: Function::Protein, entity: hgnc(name), location: None }
    }

    #[test]
    fn test_simple_terms() {
        assert_eq!(term("p(HGNC:AKT1)"), protein("AKT1"));
        assert_eq!(term("proteinAbundance(HGNC:AKT1)"), protein("AKT1"));
        assert_eq!(
            term(r#"a(CHEBI:"sialic acid")"#),
            Term::Simple {
                function: Function::Abundance,
                entity: Entity::new("CHEBI", "sialic acid"),
                location: None,
            }
        );
        assert!(matches!(
            term(r#"bp(GO:"cell death")"#),
            Term::Simple { function: Function::BiologicalProcess, .. }
        ));
    }

    #[test]
    fn test_location_suffix() {
        assert_eq!(
            term("a(CHEBI:calcium, loc(GO:cytoplasm))"),
            Term::Simple {
                function: Function::Abundance,
                entity: Entity::new("CHEBI", "calcium"),
                location: Some(Entity::new("GO", "cytoplasm")),
            }
        );
    }

    #[test]
    fn test_variants() {
        let t = term(r#"p(HGNC:AKT1, pmod(Ph, Ser, 473), var("p.Ala127Tyr"), frag("5_20"))"#);
        let Term::Variant { variants, .. } = t else { panic!("not a variant term") };
        assert_eq!(variants.len(), 3);
        assert_eq!(
            variants[0],
            Variant::ProteinModification {
                identifier: Entity::bel_default("Ph"),
                code: Some("Ser".into()),
                position: Some(473),
            }
        );
        assert_eq!(variants[1], Variant::Hgvs("p.Ala127Tyr".into()));
        assert_eq!(
            variants[2],
            Variant::Fragment(Fragment {
                range: Some((Coordinate::At(5), Coordinate::At(20))),
                description: None,
            })
        );
    }

    #[test]
    fn test_pmod_long_name_is_canonicalized() {
        let Term::Variant { variants, .. } = term("p(HGNC:AKT1, pmod(phosphorylation))") else {
            panic!()
        };
        assert_eq!(variants[0].to_string(), "pmod(Ph)");
    }

    #[test]
    fn test_pmod_namespace_qualified() {
        let Term::Variant { variants, .. } = term(r#"p(HGNC:AKT1, pmod(GO:"protein phosphorylation", Thr, 308))"#) else {
            panic!()
        };
        assert_eq!(
            variants[0],
            Variant::ProteinModification {
                identifier: Entity::new("GO", "protein phosphorylation"),
                code: Some("Thr".into()),
                position: Some(308),
            }
        );
    }

    #[test]
    fn test_legacy_pmod_letters() {
        let parsed = parse_term("p(HGNC:AKT1, pmod(P, S, 473))").unwrap();
        let Term::Variant { variants, .. } = &parsed.value else { panic!() };
        assert_eq!(variants[0].to_string(), "pmod(Ph, Ser, 473)");
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings.iter().all(|w| matches!(w, Error::DeprecatedSyntax { .. })));
    }

    #[test]
    fn test_unknown_pmod() {
        let err = parse_term("p(HGNC:AKT1, pmod(Zz))").unwrap_err();
        assert!(matches!(err, Error::Grammar { position: 18, .. }));
    }

    #[test]
    fn test_variant_not_allowed_on_function() {
        assert!(parse_term("g(HGNC:AKT1, pmod(Ph))").is_err());
        assert!(parse_term("p(HGNC:AKT1, gmod(Me))").is_err());
        assert!(parse_term("a(CHEBI:x, var(\"p.Ala1Tyr\"))").is_err());
        assert!(parse_term("g(HGNC:AKT1, gmod(Me))").is_ok());
    }

    #[test]
    fn test_legacy_substitution() {
        let parsed = parse_term("p(HGNC:KRAS, sub(G, 12, V))").unwrap();
        let Term::Variant { variants, .. } = &parsed.value else { panic!() };
        assert_eq!(variants[0], Variant::Hgvs("p.Gly12Val".into()));
        assert!(!parsed.warnings.is_empty());

        let Term::Variant { variants, .. } = term("g(HGNC:CFTR, sub(C, 308, T))") else { panic!() };
        assert_eq!(variants[0], Variant::Hgvs("c.308C>T".into()));
    }

    #[test]
    fn test_legacy_truncation() {
        let parsed = parse_term("p(HGNC:AKT1, trunc(40))").unwrap();
        let Term::Variant { variants, .. } = &parsed.value else { panic!() };
        assert_eq!(variants[0], Variant::Hgvs("p.40*".into()));
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_fusion() {
        let t = term(r#"r(fus(HGNC:TMPRSS2, "r.1_79", HGNC:ERG, "r.312_5034"))"#);
        assert_eq!(
            t,
            Term::Fusion {
                function: Function::Rna,
                partner_5p: hgnc("TMPRSS2"),
                range_5p: FusionRange::Range {
                    reference: "r".into(),
                    start: Coordinate::At(1),
                    stop: Coordinate::At(79),
                },
                partner_3p: hgnc("ERG"),
                range_3p: FusionRange::Range {
                    reference: "r".into(),
                    start: Coordinate::At(312),
                    stop: Coordinate::At(5034),
                },
                location: None,
            }
        );
    }

    #[test]
    fn test_legacy_fusion() {
        let parsed = parse_term("p(HGNC:BCR, fus(HGNC:JAK2, 1875, 2626))").unwrap();
        let Term::Fusion { partner_5p, range_5p, partner_3p, range_3p, .. } = &parsed.value else {
            panic!()
        };
        assert_eq!(partner_5p, &hgnc("BCR"));
        assert_eq!(partner_3p, &hgnc("JAK2"));
        assert_eq!(range_5p.to_string(), r#""p.?_1875""#);
        assert_eq!(range_3p.to_string(), r#""p.2626_?""#);
        assert_eq!(parsed.warnings.len(), 1);

        let Term::Fusion { range_5p, range_3p, .. } = term("r(HGNC:BCR, fus(HGNC:JAK2))") else {
            panic!()
        };
        assert_eq!(range_5p, FusionRange::Missing);
        assert_eq!(range_3p, FusionRange::Missing);
    }

    #[test]
    fn test_complex_forms() {
        let t = term(r#"complex(p(HGNC:CD33), a(CHEBI:"sialic acid"))"#);
        let Term::List { function, members, .. } = t else { panic!() };
        assert_eq!(function, Function::Complex);
        assert_eq!(members.len(), 2);

        assert_eq!(
            term(r#"complex(SCOMP:"AP-1 Complex")"#),
            Term::Simple {
                function: Function::Complex,
                entity: Entity::new("SCOMP", "AP-1 Complex"),
                location: None,
            }
        );

        let t = term("complex(p(HGNC:A), complex(p(HGNC:B), p(HGNC:C)), loc(GO:nucleus))");
        let Term::List { members, location, .. } = t else { panic!() };
        assert!(matches!(members[1], Term::List { .. }));
        assert_eq!(location, Some(Entity::new("GO", "nucleus")));
    }

    #[test]
    fn test_reaction() {
        let t = term("rxn(reactants(a(CHEBI:superoxide)), products(a(CHEBI:oxygen), a(CHEBI:water)))");
        let Term::Reaction { reactants, products } = t else { panic!() };
        assert_eq!(reactants.len(), 1);
        assert_eq!(products.len(), 2);
        assert!(parse_term("rxn(products(a(CHEBI:x)), reactants(a(CHEBI:y)))").is_err());
    }

    #[test]
    fn test_activity() {
        assert_eq!(
            term("act(p(HGNC:AKT1), ma(kin))"),
            modified(
                Modifier::Activity { activity: Some(Entity::bel_default("kin")) },
                protein("AKT1")
            )
        );
        assert_eq!(
            term("act(p(HGNC:AKT1), ma(kinaseActivity))"),
            term("act(p(HGNC:AKT1), ma(kin))")
        );
        assert_eq!(
            term("act(p(HGNC:AKT1))"),
            modified(Modifier::Activity { activity: None }, protein("AKT1"))
        );
    }

    #[test]
    fn test_legacy_activity_function() {
        let parsed = parse_term("kin(p(HGNC:AKT1))").unwrap();
        assert_eq!(parsed.value, term("act(p(HGNC:AKT1), ma(kin))"));
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(term("tscript(p(HGNC:TP53))"), term("act(p(HGNC:TP53), ma(tscript))"));
    }

    #[test]
    fn test_translocation() {
        let expected = modified(
            Modifier::Translocation {
                from: Entity::new("GO", "cytoplasm"),
                to: Entity::new("GO", "nucleus"),
            },
            protein("NFE2L2"),
        );
        assert_eq!(term("tloc(p(HGNC:NFE2L2), fromLoc(GO:cytoplasm), toLoc(GO:nucleus))"), expected);

        let legacy = parse_term("tloc(p(HGNC:NFE2L2), GO:cytoplasm, GO:nucleus)").unwrap();
        assert_eq!(legacy.value, expected);
        assert_eq!(legacy.warnings.len(), 1);
    }

    #[test]
    fn test_translocation_without_locations() {
        let err = parse_term("tloc(p(HGNC:NFE2L2))").unwrap_err();
        assert!(matches!(err, Error::IllegalTranslocation { position: 0 }));
    }

    #[test]
    fn test_secretion_and_surface() {
        assert_eq!(term("sec(p(HGNC:IL6))"), modified(Modifier::Secretion, protein("IL6")));
        assert_eq!(
            term("surf(p(HGNC:CD33))"),
            modified(Modifier::SurfaceExpression, protein("CD33"))
        );
    }

    #[test]
    fn test_nested_modifiers_rejected() {
        assert!(parse_term("act(deg(p(HGNC:AKT1)))").is_err());
        assert!(parse_term("complex(act(p(HGNC:AKT1)), p(HGNC:B))").is_err());
    }

    #[test]
    fn test_relation_statement() {
        assert_eq!(
            stmt("p(HGNC:AKT1) -> p(HGNC:MTOR)"),
            Statement::Relation {
                subject: protein("AKT1"),
                relation: Relation::Increases,
                object: protein("MTOR"),
            }
        );
        assert_eq!(
            stmt("p(HGNC:AKT1) directlyDecreases p(HGNC:MTOR)"),
            Statement::Relation {
                subject: protein("AKT1"),
                relation: Relation::DirectlyDecreases,
                object: protein("MTOR"),
            }
        );
        assert!(matches!(
            stmt("g(HGNC:AKT1) :> r(HGNC:AKT1)"),
            Statement::Relation { relation: Relation::TranscribedTo, .. }
        ));
    }

    #[test]
    fn test_lone_term_statement() {
        assert_eq!(stmt("p(HGNC:AKT1)"), Statement::Term(protein("AKT1")));
    }

    #[test]
    fn test_nested_relation_rejected() {
        let err = parse_statement("a(CHEBI:X) -> (b(GO:Y) -| p(HGNC:Z))").unwrap_err();
        assert!(matches!(err, Error::NestedRelationNotSupported { position: 14 }));
    }

    #[test]
    fn test_has_members() {
        let s = stmt("p(FPLX:AKT) hasMembers list(p(HGNC:AKT1), p(HGNC:AKT2), p(HGNC:AKT3))");
        let Statement::Members { relation, members, .. } = s else { panic!() };
        assert_eq!(relation, Relation::HasMember);
        assert_eq!(members.len(), 3);

        let s = stmt("complex(FPLX:AP1) hasComponents (p(HGNC:FOS), p(HGNC:JUN))");
        assert!(matches!(s, Statement::Members { relation: Relation::HasComponent, .. }));
    }

    #[test]
    fn test_unqualified_relations_take_plain_terms() {
        let err = parse_statement("p(HGNC:A) isA act(p(HGNC:B))").unwrap_err();
        assert!(matches!(err, Error::Grammar { position: 14, .. }), "{err:?}");
        let err = parse_statement("act(p(HGNC:A)) isA p(HGNC:B)").unwrap_err();
        assert!(matches!(err, Error::Grammar { position: 0, .. }), "{err:?}");
        let err = parse_statement("p(FPLX:A) hasMembers list(p(HGNC:B, loc(GO:nucleus)))").unwrap_err();
        assert!(matches!(err, Error::Grammar { position: 21, .. }), "{err:?}");
        assert!(parse_statement("act(p(HGNC:A)) -> p(HGNC:B, loc(GO:nucleus))").is_ok());
    }

    #[test]
    fn test_builtin_namespace_cannot_be_written() {
        for input in [
            "p(bel:NOT_A_GENE)",
            "p(HGNC:AKT1, pmod(bel:Ph))",
            "act(p(HGNC:A), ma(bel:kin))",
        ] {
            let err = parse_term(input).unwrap_err();
            assert!(
                matches!(&err, Error::UndefinedNamespace { namespace } if namespace == "bel"),
                "{input}"
            );
        }
    }

    #[test]
    fn test_statement_errors() {
        assert!(matches!(
            parse_statement("p(HGNC:AKT1) frobnicates p(HGNC:MTOR)"),
            Err(Error::Grammar { position: 13, .. })
        ));
        assert!(parse_statement("p(HGNC:AKT1) -> p(HGNC:MTOR) -> p(HGNC:X)").is_err());
        assert!(parse_statement("p(HGNC:AKT1").is_err());
        assert!(parse_statement("q(HGNC:AKT1)").is_err());
    }
}
