//! Fixed BEL vocabularies: function names, relation keywords, the default
//! modification and activity namespaces, and the legacy one-letter codes.
//!
//! These tables are immutable and shared by every parser instance.

use crate::model::{Function, Relation};

/// Long and short function names.
pub fn function(name: &str) -> Option<Function> {
    let f = match name {
        "a" | "abundance" => Function::Abundance,
        "g" | "geneAbundance" => Function::Gene,
        "r" | "rnaAbundance" => Function::Rna,
        "m" | "microRNAAbundance" => Function::MicroRna,
        "p" | "proteinAbundance" => Function::Protein,
        "complex" | "complexAbundance" => Function::Complex,
        "composite" | "compositeAbundance" => Function::Composite,
        "rxn" | "reaction" => Function::Reaction,
        "bp" | "biologicalProcess" => Function::BiologicalProcess,
        "path" | "pathology" => Function::Pathology,
        _ => return None,
    };
    Some(f)
}

/// Relation keyword or symbol.
pub fn relation(keyword: &str) -> Option<Relation> {
    let r = match keyword {
        "->" | "increases" => Relation::Increases,
        "=>" | "directlyIncreases" => Relation::DirectlyIncreases,
        "-|" | "decreases" => Relation::Decreases,
        "=|" | "directlyDecreases" => Relation::DirectlyDecreases,
        "cnc" | "causesNoChange" => Relation::CausesNoChange,
        "reg" | "regulates" => Relation::Regulates,
        "rateLimitingStepOf" => Relation::RateLimitingStepOf,
        "pos" | "positiveCorrelation" => Relation::PositiveCorrelation,
        "neg" | "negativeCorrelation" => Relation::NegativeCorrelation,
        "--" | "association" => Relation::Association,
        "orthologous" => Relation::Orthologous,
        "analogous" | "analogousTo" => Relation::AnalogousTo,
        "biomarker" | "biomarkerFor" => Relation::BiomarkerFor,
        "prognosticBiomarker" | "prognosticBiomarkerFor" => Relation::PrognosticBiomarkerFor,
        "subProcessOf" => Relation::SubProcessOf,
        "partOf" => Relation::PartOf,
        "eq" | "equivalentTo" => Relation::EquivalentTo,
        "isA" => Relation::IsA,
        "hasMember" => Relation::HasMember,
        "hasComponent" => Relation::HasComponent,
        "hasVariant" => Relation::HasVariant,
        "hasReactant" => Relation::HasReactant,
        "hasProduct" => Relation::HasProduct,
        ":>" | "transcribedTo" => Relation::TranscribedTo,
        ">>" | "translatedTo" => Relation::TranslatedTo,
        "hasParent" => Relation::HasParent,
        _ => return None,
    };
    Some(r)
}

/// Relations whose object is a list that fans out into one edge per element.
pub fn list_relation(keyword: &str) -> Option<Relation> {
    match keyword {
        "hasMembers" => Some(Relation::HasMember),
        "hasComponents" => Some(Relation::HasComponent),
        _ => None,
    }
}

/// Default protein modification vocabulary: (canonical, long name).
pub const PMOD_DEFAULTS: &[(&str, &str)] = &[
    ("Ac", "acetylation"),
    ("ADPRib", "ADP-ribosylation"),
    ("Farn", "farnesylation"),
    ("Gerger", "geranylgeranylation"),
    ("Glyco", "glycosylation"),
    ("Hy", "hydroxylation"),
    ("ISG", "ISGylation"),
    ("Me", "methylation"),
    ("Me1", "monomethylation"),
    ("Me2", "dimethylation"),
    ("Me3", "trimethylation"),
    ("Myr", "myristoylation"),
    ("Nedd", "neddylation"),
    ("NGlyco", "N-linked glycosylation"),
    ("NO", "Nitrosylation"),
    ("OGlyco", "O-linked glycosylation"),
    ("Palm", "palmitoylation"),
    ("Ph", "phosphorylation"),
    ("Sulf", "sulfation"),
    ("Sumo", "sumoylation"),
    ("Ub", "ubiquitination"),
    ("UbK48", "Lysine 48-linked polyubiquitination"),
    ("UbK63", "Lysine 63-linked polyubiquitination"),
    ("UbMono", "monoubiquitination"),
    ("UbPoly", "polyubiquitination"),
];

/// BEL 1.0 one-letter modification codes.
pub const PMOD_LEGACY: &[(&str, &str)] = &[
    ("P", "Ph"),
    ("A", "Ac"),
    ("F", "Farn"),
    ("G", "Glyco"),
    ("H", "Hy"),
    ("M", "Me"),
    ("R", "ADPRib"),
    ("S", "Sumo"),
    ("U", "Ub"),
];

pub const GMOD_DEFAULTS: &[(&str, &str)] = &[("Me", "methylation"), ("ADPRib", "ADP-ribosylation")];

/// Default molecular activities: (canonical, long name). The same names are
/// the BEL 1.0 activity functions, e.g. `kin(p(X))`.
pub const ACTIVITY_DEFAULTS: &[(&str, &str)] = &[
    ("cat", "catalyticActivity"),
    ("chap", "chaperoneActivity"),
    ("gtp", "gtpBoundActivity"),
    ("kin", "kinaseActivity"),
    ("pep", "peptidaseActivity"),
    ("phos", "phosphataseActivity"),
    ("ribo", "ribosylationActivity"),
    ("tscript", "transcriptionalActivity"),
    ("tport", "transportActivity"),
];

pub const AMINO_ACIDS: &[(char, &str)] = &[
    ('A', "Ala"),
    ('R', "Arg"),
    ('N', "Asn"),
    ('D', "Asp"),
    ('C', "Cys"),
    ('E', "Glu"),
    ('Q', "Gln"),
    ('G', "Gly"),
    ('H', "His"),
    ('I', "Ile"),
    ('L', "Leu"),
    ('K', "Lys"),
    ('M', "Met"),
    ('F', "Phe"),
    ('P', "Pro"),
    ('S', "Ser"),
    ('T', "Thr"),
    ('W', "Trp"),
    ('Y', "Tyr"),
    ('V', "Val"),
];

pub const NUCLEOTIDES: &[&str] = &["A", "C", "G", "T", "U"];

fn lookup(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(short, long)| *short == name || *long == name)
        .map(|(short, _)| *short)
}

/// Canonical short form of a default pmod name.
pub fn pmod_default(name: &str) -> Option<&'static str> {
    lookup(PMOD_DEFAULTS, name)
}

pub fn pmod_legacy(name: &str) -> Option<&'static str> {
    PMOD_LEGACY.iter().find(|(letter, _)| *letter == name).map(|(_, code)| *code)
}

pub fn gmod_default(name: &str) -> Option<&'static str> {
    lookup(GMOD_DEFAULTS, name)
}

pub fn activity_default(name: &str) -> Option<&'static str> {
    lookup(ACTIVITY_DEFAULTS, name)
}

/// Accepts a one-letter or three-letter amino acid code; returns the three-letter form.
pub fn amino_acid(code: &str) -> Option<&'static str> {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => AMINO_ACIDS.iter().find(|(one, _)| *one == c).map(|(_, three)| *three),
        _ => AMINO_ACIDS.iter().find(|(_, three)| *three == code).map(|(_, three)| *three),
    }
}

pub fn is_nucleotide(code: &str) -> bool {
    NUCLEOTIDES.contains(&code)
}
