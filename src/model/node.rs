//! Canonical node in the BEL graph.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smallvec::SmallVec;

use super::variant::{FusionRange, Variant};
use crate::bel::lexer::quote_if_needed;

/// Namespace keyword used for the built-in pmod / gmod / activity vocabularies.
pub const BEL_DEFAULT_NAMESPACE: &str = "bel";

/// Node identity: the leading 8 bytes of the SHA-256 of the canonical BEL form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Hash a canonical BEL string.
    pub fn from_canonical(bel: &str) -> Self {
        let digest = Sha256::digest(bel.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        NodeId(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// BEL abundance / process functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Function {
    Abundance,
    Gene,
    Rna,
    MicroRna,
    Protein,
    Complex,
    Composite,
    Reaction,
    BiologicalProcess,
    Pathology,
}

impl Function {
    /// Short form used in canonical output.
    pub fn short_name(self) -> &'static str {
        match self {
            Function::Abundance => "a",
            Function::Gene => "g",
            Function::Rna => "r",
            Function::MicroRna => "m",
            Function::Protein => "p",
            Function::Complex => "complex",
            Function::Composite => "composite",
            Function::Reaction => "rxn",
            Function::BiologicalProcess => "bp",
            Function::Pathology => "path",
        }
    }

    /// The BEL 2.0 long form.
    pub fn long_name(self) -> &'static str {
        match self {
            Function::Abundance => "abundance",
            Function::Gene => "geneAbundance",
            Function::Rna => "rnaAbundance",
            Function::MicroRna => "microRNAAbundance",
            Function::Protein => "proteinAbundance",
            Function::Complex => "complexAbundance",
            Function::Composite => "compositeAbundance",
            Function::Reaction => "reaction",
            Function::BiologicalProcess => "biologicalProcess",
            Function::Pathology => "pathology",
        }
    }

    /// HGVS reference letter used in fusion ranges.
    pub fn fusion_reference(self) -> Option<&'static str> {
        match self {
            Function::Gene => Some("c"),
            Function::Rna | Function::MicroRna => Some("r"),
            Function::Protein => Some("p"),
            _ => None,
        }
    }

    /// Gene, RNA, miRNA and protein: the functions that take variants and fusions.
    pub fn is_central_dogma(self) -> bool {
        matches!(self, Function::Gene | Function::Rna | Function::MicroRna | Function::Protein)
    }

    /// The function one step upstream in the central dogma, if any.
    pub fn origin(self) -> Option<Function> {
        match self {
            Function::Protein => Some(Function::Rna),
            Function::Rna | Function::MicroRna => Some(Function::Gene),
            _ => None,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A namespace-qualified name. `namespace` is `None` only for naked names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub namespace: Option<String>,
    pub name: String,
}

impl Entity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: Some(namespace.into()), name: name.into() }
    }

    pub fn naked(name: impl Into<String>) -> Self {
        Self { namespace: None, name: name.into() }
    }

    /// An entry of one of the built-in BEL vocabularies (pmod, gmod, activity).
    pub fn bel_default(name: impl Into<String>) -> Self {
        Self::new(BEL_DEFAULT_NAMESPACE, name)
    }

    pub fn is_bel_default(&self) -> bool {
        self.namespace.as_deref() == Some(BEL_DEFAULT_NAMESPACE)
    }

    /// Rendering inside `pmod(...)`, `gmod(...)` and `ma(...)`, where the
    /// built-in vocabulary is written without a prefix.
    pub fn vocabulary_form(&self) -> String {
        if self.is_bel_default() {
            quote_if_needed(&self.name)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, quote_if_needed(&self.name)),
            None => f.write_str(&quote_if_needed(&self.name)),
        }
    }
}

/// Canonical node content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeData {
    Simple {
        function: Function,
        entity: Entity,
    },
    Variant {
        function: Function,
        entity: Entity,
        variants: SmallVec<[Variant; 2]>,
    },
    Fusion {
        function: Function,
        partner_5p: Entity,
        range_5p: FusionRange,
        partner_3p: Entity,
        range_3p: FusionRange,
    },
    List {
        function: Function,
        members: Vec<BelNode>,
    },
    Reaction {
        reactants: Vec<BelNode>,
        products: Vec<BelNode>,
    },
}

impl NodeData {
    pub fn function(&self) -> Function {
        match self {
            NodeData::Simple { function, .. }
            | NodeData::Variant { function, .. }
            | NodeData::Fusion { function, .. }
            | NodeData::List { function, .. } => *function,
            NodeData::Reaction { .. } => Function::Reaction,
        }
    }

    /// Put order-insensitive parts into their total order.
    fn canonicalize(&mut self) {
        match self {
            NodeData::Variant { variants, .. } => {
                variants.sort_by_cached_key(|v| v.to_string());
            }
            NodeData::List { members, .. } => {
                members.sort_by(|a, b| a.bel.cmp(&b.bel));
            }
            NodeData::Reaction { reactants, products } => {
                reactants.sort_by(|a, b| a.bel.cmp(&b.bel));
                products.sort_by(|a, b| a.bel.cmp(&b.bel));
            }
            NodeData::Simple { .. } | NodeData::Fusion { .. } => {}
        }
    }

    fn render(&self) -> String {
        match self {
            NodeData::Simple { function, entity } => format!("{function}({entity})"),
            NodeData::Variant { function, entity, variants } => {
                let rendered: Vec<String> = variants.iter().map(ToString::to_string).collect();
                format!("{function}({entity}, {})", rendered.join(", "))
            }
            NodeData::Fusion { function, partner_5p, range_5p, partner_3p, range_3p } => {
                format!("{function}(fus({partner_5p}, {range_5p}, {partner_3p}, {range_3p}))")
            }
            NodeData::List { function, members } => {
                format!("{function}({})", join_bel(members))
            }
            NodeData::Reaction { reactants, products } => {
                format!("rxn(reactants({}), products({}))", join_bel(reactants), join_bel(products))
            }
        }
    }
}

fn join_bel(nodes: &[BelNode]) -> String {
    nodes.iter().map(BelNode::bel).collect::<Vec<_>>().join(", ")
}

/// A node with its canonical BEL string and identity memoized at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BelNode {
    id: NodeId,
    bel: String,
    data: NodeData,
}

impl BelNode {
    pub fn new(mut data: NodeData) -> Self {
        data.canonicalize();
        let bel = data.render();
        let id = NodeId::from_canonical(&bel);
        Self { id, bel, data }
    }

    pub fn simple(function: Function, entity: Entity) -> Self {
        Self::new(NodeData::Simple { function, entity })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Canonical BEL term.
    pub fn bel(&self) -> &str {
        &self.bel
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn function(&self) -> Function {
        self.data.function()
    }

    /// The same entity with its variants stripped.
    pub fn parent(&self) -> Option<BelNode> {
        match &self.data {
            NodeData::Variant { function, entity, .. } => {
                Some(BelNode::simple(*function, entity.clone()))
            }
            _ => None,
        }
    }

    /// The node one central-dogma step upstream (protein -> RNA -> gene).
    /// Only simple and fusion nodes have one; variants go through their parent.
    pub fn origin(&self) -> Option<BelNode> {
        let upstream = self.function().origin()?;
        match &self.data {
            NodeData::Simple { entity, .. } => Some(BelNode::simple(upstream, entity.clone())),
            NodeData::Fusion { partner_5p, range_5p, partner_3p, range_3p, .. } => {
                Some(BelNode::new(NodeData::Fusion {
                    function: upstream,
                    partner_5p: partner_5p.clone(),
                    range_5p: range_5p.clone(),
                    partner_3p: partner_3p.clone(),
                    range_3p: range_3p.clone(),
                }))
            }
            _ => None,
        }
    }

    /// Nodes this node is built from: variant parent, list members, reaction participants.
    pub fn children(&self) -> Vec<BelNode> {
        match &self.data {
            NodeData::Variant { .. } => self.parent().into_iter().collect(),
            NodeData::List { members, .. } => members.clone(),
            NodeData::Reaction { reactants, products } => {
                reactants.iter().chain(products.iter()).cloned().collect()
            }
            NodeData::Simple { .. } | NodeData::Fusion { .. } => Vec::new(),
        }
    }
}

impl PartialEq for BelNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.bel == other.bel
    }
}

impl Eq for BelNode {}

impl std::hash::Hash for BelNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for BelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bel)
    }
}
