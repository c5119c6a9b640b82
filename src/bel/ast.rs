//! BEL abstract syntax tree.
//!
//! Terms are the direct parse result: names are not validated yet and
//! ordering is as written. `graph::canonicalize` turns a `Term` into a
//! `BelNode`.

use crate::model::{Entity, Function, FusionRange, Relation, Variant};

/// A parsed term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Simple {
        function: Function,
        entity: Entity,
        location: Option<Entity>,
    },
    Variant {
        function: Function,
        entity: Entity,
        variants: Vec<Variant>,
        location: Option<Entity>,
    },
    Fusion {
        function: Function,
        partner_5p: Entity,
        range_5p: FusionRange,
        partner_3p: Entity,
        range_3p: FusionRange,
        location: Option<Entity>,
    },
    List {
        function: Function,
        members: Vec<Term>,
        location: Option<Entity>,
    },
    Reaction {
        reactants: Vec<Term>,
        products: Vec<Term>,
    },
    /// `act(...)`, `deg(...)`, `tloc(...)`, `sec(...)`, `surf(...)`.
    Modified {
        modifier: Modifier,
        target: Box<Term>,
    },
}

impl Term {
    /// The abundance under any modifier wrapper.
    pub fn abundance(&self) -> &Term {
        match self {
            Term::Modified { target, .. } => target,
            other => other,
        }
    }

    pub fn modifier(&self) -> Option<&Modifier> {
        match self {
            Term::Modified { modifier, .. } => Some(modifier),
            _ => None,
        }
    }

    /// The `loc(...)` written inside the abundance.
    pub fn location(&self) -> Option<&Entity> {
        match self.abundance() {
            Term::Simple { location, .. }
            | Term::Variant { location, .. }
            | Term::Fusion { location, .. }
            | Term::List { location, .. } => location.as_ref(),
            Term::Reaction { .. } | Term::Modified { .. } => None,
        }
    }

    /// Every entity mentioned by this term, for namespace validation.
    pub fn entities(&self) -> Vec<&Entity> {
        let mut out = Vec::new();
        self.collect_entities(&mut out);
        out
    }

    fn collect_entities<'a>(&'a self, out: &mut Vec<&'a Entity>) {
        match self {
            Term::Simple { entity, location, .. } => {
                out.push(entity);
                out.extend(location);
            }
            Term::Variant { entity, variants, location, .. } => {
                out.push(entity);
                for variant in variants {
                    match variant {
                        Variant::ProteinModification { identifier, .. }
                        | Variant::GeneModification { identifier } => out.push(identifier),
                        Variant::Hgvs(_) | Variant::Fragment(_) => {}
                    }
                }
                out.extend(location);
            }
            Term::Fusion { partner_5p, partner_3p, location, .. } => {
                out.push(partner_5p);
                out.push(partner_3p);
                out.extend(location);
            }
            Term::List { members, location, .. } => {
                for member in members {
                    member.collect_entities(out);
                }
                out.extend(location);
            }
            Term::Reaction { reactants, products } => {
                for t in reactants.iter().chain(products) {
                    t.collect_entities(out);
                }
            }
            Term::Modified { modifier, target } => {
                match modifier {
                    Modifier::Activity { activity: Some(a) } => out.push(a),
                    Modifier::Translocation { from, to } => {
                        out.push(from);
                        out.push(to);
                    }
                    _ => {}
                }
                target.collect_entities(out);
            }
        }
    }
}

/// Endpoint wrappers.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    Activity { activity: Option<Entity> },
    Degradation,
    Translocation { from: Entity, to: Entity },
    /// Shorthand for a translocation from intracellular to extracellular space.
    Secretion,
    /// Shorthand for a translocation from intracellular to the cell surface.
    SurfaceExpression,
}

/// A parsed statement line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A lone term: the node is added without edges.
    Term(Term),
    Relation {
        subject: Term,
        relation: Relation,
        object: Term,
    },
    /// `hasMembers` / `hasComponents` with a list object.
    Members {
        subject: Term,
        relation: Relation,
        members: Vec<Term>,
    },
}

impl Statement {
    pub fn is_qualified(&self) -> bool {
        match self {
            Statement::Relation { relation, .. } => !relation.is_unqualified(),
            Statement::Term(_) | Statement::Members { .. } => false,
        }
    }

    pub fn entities(&self) -> Vec<&Entity> {
        match self {
            Statement::Term(t) => t.entities(),
            Statement::Relation { subject, object, .. } => {
                let mut out = subject.entities();
                out.extend(object.entities());
                out
            }
            Statement::Members { subject, members, .. } => {
                let mut out = subject.entities();
                for m in members {
                    out.extend(m.entities());
                }
                out
            }
        }
    }
}
