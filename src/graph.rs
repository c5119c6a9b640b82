//! The compiled BEL graph.
//!
//! A content-addressed multigraph: node ids are hashes of canonical BEL, edge
//! keys are hashes of (source, target, payload). Inserting anything twice is
//! a no-op that returns the existing id.
//!
//! Inserting a node also materializes the structure it implies:
//!
//! | Node | Implied |
//! |------|---------|
//! | variant | parent + `hasVariant` parent → variant |
//! | complex / composite | members + `hasComponent` list → member |
//! | reaction | participants + `hasReactant` / `hasProduct` |
//! | RNA, miRNA (`complete_origin`) | gene + `transcribedTo` gene → RNA |
//! | protein (`complete_origin`) | RNA + `translatedTo` RNA → protein |

use std::collections::BTreeSet;

use hashbrown::HashMap;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::bel::ast::{Modifier, Statement, Term};
use crate::bel::metadata::{Definitions, DocumentMetadata};
use crate::model::*;
use crate::{Error, Result};

/// A stored edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: EdgeKey,
    pub source: NodeId,
    pub target: NodeId,
    pub data: EdgeData,
    /// Source line of the statement that produced it.
    pub line: Option<usize>,
    /// Set on the reverse half of a symmetric relation.
    pub mirror_of: Option<EdgeKey>,
}

/// A rejected statement.
#[derive(Debug)]
pub struct Warning {
    pub line_number: usize,
    pub line: String,
    pub error: Error,
    /// Annotations in effect when the statement was read.
    pub annotations: IndexMap<String, BTreeSet<String>>,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.error, self.line)
    }
}

#[derive(Debug, Default)]
pub struct BelGraph {
    nodes: IndexMap<NodeId, BelNode>,
    edges: IndexMap<EdgeKey, Edge>,
    /// node_id → outgoing edge keys
    adjacency: HashMap<NodeId, Vec<EdgeKey>>,
    warnings: Vec<Warning>,
    metadata: DocumentMetadata,
    definitions: Definitions,
    complete_origin: bool,
}

impl BelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every gene product to its RNA and gene on insertion.
    pub fn with_complete_origin(mut self, enabled: bool) -> Self {
        self.complete_origin = enabled;
        self
    }

    pub fn complete_origin(&self) -> bool {
        self.complete_origin
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn ensure_node(&mut self, term: &Term) -> NodeId {
        self.ensure_bel_node(canonicalize(term))
    }

    pub fn ensure_bel_node(&mut self, node: BelNode) -> NodeId {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return id;
        }
        tracing::debug!(node = %node, id = %id, "node inserted");
        self.nodes.insert(id, node.clone());

        match node.data() {
            NodeData::Variant { .. } => {
                if let Some(parent) = node.parent() {
                    let parent_id = self.ensure_bel_node(parent);
                    self.ensure_edge(parent_id, id, EdgeData::unqualified(Relation::HasVariant));
                }
            }
            NodeData::List { members, .. } => {
                for member in members {
                    let member_id = self.ensure_bel_node(member.clone());
                    self.ensure_edge(id, member_id, EdgeData::unqualified(Relation::HasComponent));
                }
            }
            NodeData::Reaction { reactants, products } => {
                for reactant in reactants {
                    let rid = self.ensure_bel_node(reactant.clone());
                    self.ensure_edge(id, rid, EdgeData::unqualified(Relation::HasReactant));
                }
                for product in products {
                    let pid = self.ensure_bel_node(product.clone());
                    self.ensure_edge(id, pid, EdgeData::unqualified(Relation::HasProduct));
                }
            }
            NodeData::Simple { .. } | NodeData::Fusion { .. } => {}
        }

        if self.complete_origin {
            if let Some(origin) = node.origin() {
                let relation = if node.function() == Function::Protein {
                    Relation::TranslatedTo
                } else {
                    Relation::TranscribedTo
                };
                let origin_id = self.ensure_bel_node(origin);
                self.ensure_edge(origin_id, id, EdgeData::unqualified(relation));
            }
        }

        id
    }

    pub fn node(&self, id: NodeId) -> Option<&BelNode> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &BelNode> {
        self.nodes.values()
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Insert an edge; symmetric qualified relations also get their reverse.
    pub fn ensure_edge(&mut self, source: NodeId, target: NodeId, data: EdgeData) -> EdgeKey {
        self.insert_edge(source, target, data, None)
    }

    fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        data: EdgeData,
        line: Option<usize>,
    ) -> EdgeKey {
        let key = EdgeKey::compute(source, target, &data);
        if self.edges.contains_key(&key) {
            return key;
        }

        let reverse = match &data {
            EdgeData::Qualified(q) if q.relation.is_symmetric() => {
                Some(EdgeData::Qualified(q.reversed()))
            }
            _ => None,
        };

        tracing::debug!(%source, %target, relation = %data.relation(), "edge inserted");
        self.put_edge(Edge { key, source, target, data, line, mirror_of: None });

        if let Some(reverse) = reverse {
            let reverse_key = EdgeKey::compute(target, source, &reverse);
            if !self.edges.contains_key(&reverse_key) {
                self.put_edge(Edge {
                    key: reverse_key,
                    source: target,
                    target: source,
                    data: reverse,
                    line,
                    mirror_of: Some(key),
                });
            }
        }
        key
    }

    fn put_edge(&mut self, edge: Edge) {
        self.adjacency.entry(edge.source).or_default().push(edge.key);
        self.edges.insert(edge.key, edge);
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(&key)
    }

    /// `(source, target, key, data)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&BelNode, &BelNode, EdgeKey, &EdgeData)> {
        self.edges.values().filter_map(|edge| {
            let source = self.nodes.get(&edge.source)?;
            let target = self.nodes.get(&edge.target)?;
            Some((source, target, edge.key, &edge.data))
        })
    }

    /// Stored edge records in insertion order.
    pub fn edge_records(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|key| self.edges.get(key))
    }

    /// Edges between `source` and `target` in that direction.
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> Vec<&Edge> {
        self.out_edges(source).filter(|e| e.target == target).collect()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether inserting the edge's endpoints alone would have created it.
    pub fn is_implied(&self, edge: &Edge) -> bool {
        let (Some(source), Some(target)) = (self.node(edge.source), self.node(edge.target)) else {
            return false;
        };
        match (edge.data.relation(), source.data()) {
            (Relation::HasVariant, _) => target.parent().as_ref() == Some(source),
            (Relation::HasComponent, NodeData::List { members, .. }) => members.contains(target),
            (Relation::HasReactant, NodeData::Reaction { reactants, .. }) => reactants.contains(target),
            (Relation::HasProduct, NodeData::Reaction { products, .. }) => products.contains(target),
            _ => false,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Add a parsed statement under `context`. Nothing is mutated when the
    /// statement is rejected.
    pub fn add_statement(
        &mut self,
        statement: &Statement,
        context: &Context,
        line: Option<usize>,
    ) -> Result<Vec<EdgeKey>> {
        match statement {
            Statement::Term(term) => {
                self.ensure_node(term);
                Ok(Vec::new())
            }
            Statement::Relation { subject, relation, object } if relation.is_unqualified() => {
                check_bare(subject)?;
                check_bare(object)?;
                let s = self.ensure_node(subject);
                let o = self.ensure_node(object);
                Ok(vec![self.insert_edge(s, o, EdgeData::unqualified(*relation), line)])
            }
            Statement::Relation { subject, relation, object } => {
                let data = EdgeData::Qualified(QualifiedEdge {
                    relation: *relation,
                    citation: context.citation.clone(),
                    evidence: context.evidence.clone(),
                    annotations: context.annotations.clone(),
                    subject: endpoint_modifier(subject),
                    object: endpoint_modifier(object),
                });
                let s = self.ensure_node(subject);
                let o = self.ensure_node(object);
                Ok(vec![self.insert_edge(s, o, data, line)])
            }
            Statement::Members { subject, relation, members } => {
                check_bare(subject)?;
                for member in members {
                    check_bare(member)?;
                }
                let s = self.ensure_node(subject);
                let mut keys = Vec::with_capacity(members.len());
                for member in members {
                    let m = self.ensure_node(member);
                    keys.push(self.insert_edge(s, m, EdgeData::unqualified(*relation), line));
                }
                Ok(keys)
            }
        }
    }

    // ========================================================================
    // Warnings and document metadata
    // ========================================================================

    pub fn add_warning(&mut self, line_number: usize, line: impl Into<String>, error: Error) {
        self.push_warning(Warning {
            line_number,
            line: line.into(),
            error,
            annotations: IndexMap::new(),
        });
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn set_document(&mut self, metadata: DocumentMetadata, definitions: Definitions) {
        self.metadata = metadata;
        self.definitions = definitions;
    }

    /// Fold another graph into this one. Nodes and edges are deduplicated by
    /// identity; document metadata keeps the first value of each key.
    pub fn merge(&mut self, other: BelGraph) -> Result<()> {
        let mut definitions = self.definitions.clone();
        definitions.merge(&other.definitions)?;
        self.definitions = definitions;

        for (key, value) in other.metadata.0 {
            self.metadata.0.entry(key).or_insert(value);
        }
        for (id, node) in other.nodes {
            self.nodes.entry(id).or_insert(node);
        }
        for (key, edge) in other.edges {
            if !self.edges.contains_key(&key) {
                self.put_edge(edge);
            }
        }
        self.warnings.extend(other.warnings);
        Ok(())
    }
}

/// Unqualified relations have nowhere to keep endpoint modifiers. Parsed
/// statements are checked with source positions; this covers statements
/// built in code, which have none.
fn check_bare(term: &Term) -> Result<()> {
    if term.modifier().is_some() || term.location().is_some() {
        return Err(Error::Grammar {
            position: 0,
            message: "activity, degradation, translocation and loc() need a qualified relation"
                .into(),
        });
    }
    Ok(())
}

// ============================================================================
// Canonicalization
// ============================================================================

/// The canonical node for a term. Endpoint modifiers and locations are not
/// part of node identity and are dropped.
pub fn canonicalize(term: &Term) -> BelNode {
    match term {
        Term::Simple { function, entity, .. } => BelNode::simple(*function, entity.clone()),
        Term::Variant { function, entity, variants, .. } => BelNode::new(NodeData::Variant {
            function: *function,
            entity: entity.clone(),
            variants: SmallVec::from_vec(variants.clone()),
        }),
        Term::Fusion { function, partner_5p, range_5p, partner_3p, range_3p, .. } => {
            BelNode::new(NodeData::Fusion {
                function: *function,
                partner_5p: partner_5p.clone(),
                range_5p: range_5p.clone(),
                partner_3p: partner_3p.clone(),
                range_3p: range_3p.clone(),
            })
        }
        Term::List { function, members, .. } => BelNode::new(NodeData::List {
            function: *function,
            members: members.iter().map(canonicalize).collect(),
        }),
        Term::Reaction { reactants, products } => BelNode::new(NodeData::Reaction {
            reactants: reactants.iter().map(canonicalize).collect(),
            products: products.iter().map(canonicalize).collect(),
        }),
        Term::Modified { target, .. } => canonicalize(target),
    }
}

pub const INTRACELLULAR: &str = "intracellular";
pub const EXTRACELLULAR: &str = "extracellular space";
pub const CELL_SURFACE: &str = "cell surface";

/// The endpoint decoration of a statement term.
pub fn endpoint_modifier(term: &Term) -> Option<EndpointModifier> {
    let effect = term.modifier().map(|modifier| match modifier {
        Modifier::Activity { activity } => Effect::Activity { activity: activity.clone() },
        Modifier::Degradation => Effect::Degradation,
        Modifier::Translocation { from, to } => {
            Effect::Translocation { from: from.clone(), to: to.clone() }
        }
        Modifier::Secretion => Effect::Translocation {
            from: Entity::new("GO", INTRACELLULAR),
            to: Entity::new("GO", EXTRACELLULAR),
        },
        Modifier::SurfaceExpression => Effect::Translocation {
            from: Entity::new("GO", INTRACELLULAR),
            to: Entity::new("GO", CELL_SURFACE),
        },
    });
    let modifier = EndpointModifier { effect, location: term.location().cloned() };
    (!modifier.is_empty()).then_some(modifier)
}
