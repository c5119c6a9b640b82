//! Variants attached to central-dogma nodes, and fusion breakpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::Entity;
use crate::bel::lexer::quote;

/// A sequence position in a fragment or fusion range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coordinate {
    At(u64),
    /// `?`
    Unknown,
    /// `*`, the C-terminal end.
    End,
}

impl Coordinate {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "?" => Some(Coordinate::Unknown),
            "*" => Some(Coordinate::End),
            _ => s.parse().ok().map(Coordinate::At),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::At(n) => write!(f, "{n}"),
            Coordinate::Unknown => f.write_str("?"),
            Coordinate::End => f.write_str("*"),
        }
    }
}

/// A protein fragment. `range == None` is the unknown fragment `frag("?")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    pub range: Option<(Coordinate, Coordinate)>,
    pub description: Option<String>,
}

impl Fragment {
    /// Parse `"5_20"`, `"5_?"`, `"?_*"` or `"?"`.
    pub fn parse_range(s: &str) -> Option<Option<(Coordinate, Coordinate)>> {
        if s == "?" {
            return Some(None);
        }
        let (start, stop) = s.split_once('_')?;
        Some(Some((Coordinate::parse(start)?, Coordinate::parse(stop)?)))
    }

    fn range_string(&self) -> String {
        match self.range {
            Some((start, stop)) => format!("{start}_{stop}"),
            None => "?".to_string(),
        }
    }
}

/// Variant of a gene, RNA, miRNA or protein.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// An HGVS expression such as `p.Ala127Tyr` or `c.308C>T`.
    Hgvs(String),
    ProteinModification {
        identifier: Entity,
        code: Option<String>,
        position: Option<u64>,
    },
    GeneModification {
        identifier: Entity,
    },
    Fragment(Fragment),
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Hgvs(hgvs) => write!(f, "var({})", quote(hgvs)),
            Variant::ProteinModification { identifier, code, position } => {
                write!(f, "pmod({}", identifier.vocabulary_form())?;
                if let Some(code) = code {
                    write!(f, ", {code}")?;
                    if let Some(position) = position {
                        write!(f, ", {position}")?;
                    }
                }
                f.write_str(")")
            }
            Variant::GeneModification { identifier } => {
                write!(f, "gmod({})", identifier.vocabulary_form())
            }
            Variant::Fragment(fragment) => {
                write!(f, "frag({}", quote(&fragment.range_string()))?;
                if let Some(description) = &fragment.description {
                    write!(f, ", {}", quote(description))?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One side of a fusion breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FusionRange {
    Range {
        reference: String,
        start: Coordinate,
        stop: Coordinate,
    },
    /// `"?"`: the breakpoint is not known.
    Missing,
}

impl FusionRange {
    /// Parse `"r.1_79"`, `"p.?_*"` or `"?"`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "?" {
            return Some(FusionRange::Missing);
        }
        let (reference, range) = s.split_once('.')?;
        if !matches!(reference, "c" | "r" | "p") {
            return None;
        }
        let (start, stop) = range.split_once('_')?;
        Some(FusionRange::Range {
            reference: reference.to_string(),
            start: Coordinate::parse(start)?,
            stop: Coordinate::parse(stop)?,
        })
    }
}

impl fmt::Display for FusionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionRange::Range { reference, start, stop } => {
                f.write_str(&quote(&format!("{reference}.{start}_{stop}")))
            }
            FusionRange::Missing => f.write_str("\"?\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmod_rendering() {
        let full = Variant::ProteinModification {
            identifier: Entity::bel_default("Ph"),
            code: Some("Ser".into()),
            position: Some(473),
        };
        assert_eq!(full.to_string(), "pmod(Ph, Ser, 473)");

        let bare = Variant::ProteinModification {
            identifier: Entity::new("GO", "protein phosphorylation"),
            code: None,
            position: None,
        };
        assert_eq!(bare.to_string(), r#"pmod(GO:"protein phosphorylation")"#);
    }

    #[test]
    fn test_fragment_rendering() {
        let known = Variant::Fragment(Fragment {
            range: Some((Coordinate::At(5), Coordinate::At(20))),
            description: Some("55kD".into()),
        });
        assert_eq!(known.to_string(), r#"frag("5_20", "55kD")"#);

        let unknown = Variant::Fragment(Fragment { range: None, description: None });
        assert_eq!(unknown.to_string(), r#"frag("?")"#);
    }

    #[test]
    fn test_fragment_range_parsing() {
        assert_eq!(
            Fragment::parse_range("1_*"),
            Some(Some((Coordinate::At(1), Coordinate::End)))
        );
        assert_eq!(Fragment::parse_range("?"), Some(None));
        assert_eq!(Fragment::parse_range("12"), None);
        assert_eq!(Fragment::parse_range("a_b"), None);
    }

    #[test]
    fn test_fusion_range_parsing() {
        assert_eq!(
            FusionRange::parse("r.1_79"),
            Some(FusionRange::Range {
                reference: "r".into(),
                start: Coordinate::At(1),
                stop: Coordinate::At(79),
            })
        );
        assert_eq!(FusionRange::parse("?"), Some(FusionRange::Missing));
        assert_eq!(FusionRange::parse("x.1_2"), None);
        assert_eq!(FusionRange::parse("r.1"), None);
    }

    #[test]
    fn test_hgvs_is_quoted() {
        assert_eq!(Variant::Hgvs("c.308C>T".into()).to_string(), r#"var("c.308C>T")"#);
    }
}
