//! Relations and edge payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::context::{Annotations, Citation};
use super::node::{Entity, NodeId};

/// Every relation the graph can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    // Causal
    Increases,
    DirectlyIncreases,
    Decreases,
    DirectlyDecreases,
    CausesNoChange,
    Regulates,
    RateLimitingStepOf,

    // Correlative
    PositiveCorrelation,
    NegativeCorrelation,
    Association,

    // Genomic / other
    Orthologous,
    AnalogousTo,
    BiomarkerFor,
    PrognosticBiomarkerFor,
    SubProcessOf,
    PartOf,
    EquivalentTo,

    // Structural
    IsA,
    HasMember,
    HasComponent,
    HasVariant,
    HasReactant,
    HasProduct,
    TranscribedTo,
    TranslatedTo,
    HasParent,
}

impl Relation {
    pub const ALL: &'static [Relation] = &[
        Relation::Increases,
        Relation::DirectlyIncreases,
        Relation::Decreases,
        Relation::DirectlyDecreases,
        Relation::CausesNoChange,
        Relation::Regulates,
        Relation::RateLimitingStepOf,
        Relation::PositiveCorrelation,
        Relation::NegativeCorrelation,
        Relation::Association,
        Relation::Orthologous,
        Relation::AnalogousTo,
        Relation::BiomarkerFor,
        Relation::PrognosticBiomarkerFor,
        Relation::SubProcessOf,
        Relation::PartOf,
        Relation::EquivalentTo,
        Relation::IsA,
        Relation::HasMember,
        Relation::HasComponent,
        Relation::HasVariant,
        Relation::HasReactant,
        Relation::HasProduct,
        Relation::TranscribedTo,
        Relation::TranslatedTo,
        Relation::HasParent,
    ];

    /// Canonical camelCase keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Increases => "increases",
            Relation::DirectlyIncreases => "directlyIncreases",
            Relation::Decreases => "decreases",
            Relation::DirectlyDecreases => "directlyDecreases",
            Relation::CausesNoChange => "causesNoChange",
            Relation::Regulates => "regulates",
            Relation::RateLimitingStepOf => "rateLimitingStepOf",
            Relation::PositiveCorrelation => "positiveCorrelation",
            Relation::NegativeCorrelation => "negativeCorrelation",
            Relation::Association => "association",
            Relation::Orthologous => "orthologous",
            Relation::AnalogousTo => "analogousTo",
            Relation::BiomarkerFor => "biomarkerFor",
            Relation::PrognosticBiomarkerFor => "prognosticBiomarkerFor",
            Relation::SubProcessOf => "subProcessOf",
            Relation::PartOf => "partOf",
            Relation::EquivalentTo => "equivalentTo",
            Relation::IsA => "isA",
            Relation::HasMember => "hasMember",
            Relation::HasComponent => "hasComponent",
            Relation::HasVariant => "hasVariant",
            Relation::HasReactant => "hasReactant",
            Relation::HasProduct => "hasProduct",
            Relation::TranscribedTo => "transcribedTo",
            Relation::TranslatedTo => "translatedTo",
            Relation::HasParent => "hasParent",
        }
    }

    /// Structural relations carry no citation, evidence or annotations.
    pub fn is_unqualified(self) -> bool {
        matches!(
            self,
            Relation::HasReactant
                | Relation::HasProduct
                | Relation::HasComponent
                | Relation::HasMember
                | Relation::HasVariant
                | Relation::TranscribedTo
                | Relation::TranslatedTo
                | Relation::HasParent
                | Relation::IsA
        )
    }

    /// Materialized in both directions.
    pub fn is_symmetric(self) -> bool {
        matches!(
            self,
            Relation::NegativeCorrelation
                | Relation::PositiveCorrelation
                | Relation::Association
                | Relation::Orthologous
                | Relation::AnalogousTo
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What happens to an endpoint of a qualified edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Effect {
    Activity { activity: Option<Entity> },
    Degradation,
    Translocation { from: Entity, to: Entity },
}

/// Subject / object decoration of a qualified edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointModifier {
    pub effect: Option<Effect>,
    pub location: Option<Entity>,
}

impl EndpointModifier {
    pub fn is_empty(&self) -> bool {
        self.effect.is_none() && self.location.is_none()
    }
}

/// A relation with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedEdge {
    pub relation: Relation,
    pub citation: Option<Citation>,
    pub evidence: Option<String>,
    pub annotations: Annotations,
    pub subject: Option<EndpointModifier>,
    pub object: Option<EndpointModifier>,
}

impl QualifiedEdge {
    /// The same statement read from the other end: modifiers swap, and
    /// `subject_` / `object_` annotation keys trade prefixes.
    pub fn reversed(&self) -> Self {
        let annotations = self
            .annotations
            .iter()
            .map(|(key, values)| (swap_endpoint_prefix(key), values.clone()))
            .collect();
        Self {
            relation: self.relation,
            citation: self.citation.clone(),
            evidence: self.evidence.clone(),
            annotations,
            subject: self.object.clone(),
            object: self.subject.clone(),
        }
    }
}

fn swap_endpoint_prefix(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("subject_") {
        format!("object_{rest}")
    } else if let Some(rest) = key.strip_prefix("object_") {
        format!("subject_{rest}")
    } else {
        key.to_string()
    }
}

/// Payload of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EdgeData {
    Unqualified { relation: Relation },
    Qualified(QualifiedEdge),
}

impl EdgeData {
    pub fn unqualified(relation: Relation) -> Self {
        EdgeData::Unqualified { relation }
    }

    pub fn relation(&self) -> Relation {
        match self {
            EdgeData::Unqualified { relation } => *relation,
            EdgeData::Qualified(q) => q.relation,
        }
    }

    pub fn as_qualified(&self) -> Option<&QualifiedEdge> {
        match self {
            EdgeData::Qualified(q) => Some(q),
            EdgeData::Unqualified { .. } => None,
        }
    }
}

/// Edge identity: a hash of the endpoints and the full payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(pub u64);

impl EdgeKey {
    pub fn compute(source: NodeId, target: NodeId, data: &EdgeData) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.0.to_be_bytes());
        hasher.update(target.0.to_be_bytes());
        // Plain data: serializing into a Vec does not fail.
        hasher.update(serde_json::to_vec(data).unwrap_or_default());
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        EdgeKey(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
