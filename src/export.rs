//! Canonical BEL export: serialize a graph as a BEL document.
//!
//! ```text
//! BelGraph → write_bel() → header (SET DOCUMENT / DEFINE)
//!                        → unqualified statements
//!                        → singleton nodes
//!                        → qualified statements, grouped by citation and evidence
//! ```
//!
//! Output is ordered by content, never by insertion order, so two graphs with
//! the same nodes and edges always serialize to the same text. Compiling the
//! output yields the same graph again.

use std::collections::BTreeSet;
use std::io::Write;

use hashbrown::HashSet;

use crate::bel::lexer::quote;
use crate::graph::{BelGraph, Edge, CELL_SURFACE, EXTRACELLULAR, INTRACELLULAR};
use crate::model::*;
use crate::Result;

/// Canonical BEL of one node.
pub fn decanonicalize_node(graph: &BelGraph, id: NodeId) -> Option<String> {
    graph.node(id).map(|node| node.bel().to_string())
}

/// One BEL statement line for an edge.
pub fn decanonicalize_edge(source: &BelNode, target: &BelNode, data: &EdgeData) -> String {
    let (subject, object) = match data {
        EdgeData::Unqualified { .. } => (None, None),
        EdgeData::Qualified(q) => (q.subject.as_ref(), q.object.as_ref()),
    };
    format!(
        "{} {} {}",
        render_endpoint(source, subject),
        data.relation(),
        render_endpoint(target, object)
    )
}

fn render_endpoint(node: &BelNode, modifier: Option<&EndpointModifier>) -> String {
    let Some(modifier) = modifier else {
        return node.bel().to_string();
    };

    let mut term = node.bel().to_string();
    if let Some(location) = &modifier.location {
        // Every canonical term ends in the closing paren of its function.
        term.pop();
        term.push_str(&format!(", loc({location}))"));
    }

    match &modifier.effect {
        None => term,
        Some(Effect::Activity { activity: None }) => format!("act({term})"),
        Some(Effect::Activity { activity: Some(activity) }) => {
            format!("act({term}, ma({}))", activity.vocabulary_form())
        }
        Some(Effect::Degradation) => format!("deg({term})"),
        Some(Effect::Translocation { from, to }) => {
            if is_go(from, INTRACELLULAR) && is_go(to, EXTRACELLULAR) {
                format!("sec({term})")
            } else if is_go(from, INTRACELLULAR) && is_go(to, CELL_SURFACE) {
                format!("surf({term})")
            } else {
                format!("tloc({term}, fromLoc({from}), toLoc({to}))")
            }
        }
    }
}

fn is_go(entity: &Entity, name: &str) -> bool {
    entity.namespace.as_deref() == Some("GO") && entity.name == name
}

/// Write the whole graph as a BEL document.
pub fn write_bel(graph: &BelGraph, writer: &mut dyn Write) -> Result<()> {
    write_header(graph, writer)?;

    let mut covered: HashSet<NodeId> = HashSet::new();

    // Unqualified statements that node insertion would not recreate.
    let mut structural = BTreeSet::new();
    for edge in graph.edge_records() {
        if matches!(edge.data, EdgeData::Unqualified { .. }) && !graph.is_implied(edge) {
            if let Some(line) = edge_line(graph, edge) {
                structural.insert(line);
                cover(graph, edge.source, &mut covered);
                cover(graph, edge.target, &mut covered);
            }
        }
    }

    // Qualified statements; the reverse half of a symmetric pair is recreated
    // from its forward edge.
    let mut qualified: Vec<(&QualifiedEdge, String)> = Vec::new();
    for edge in graph.edge_records() {
        let EdgeData::Qualified(q) = &edge.data else { continue };
        if edge.mirror_of.is_some() {
            continue;
        }
        if let Some(line) = edge_line(graph, edge) {
            qualified.push((q, line));
            cover(graph, edge.source, &mut covered);
            cover(graph, edge.target, &mut covered);
        }
    }

    // Remaining nodes, minus those another remaining node already implies.
    let mut implied_by_singleton: HashSet<NodeId> = HashSet::new();
    for node in graph.nodes().filter(|n| !covered.contains(&n.id())) {
        for child in structural_children(graph, node) {
            cover(graph, child.id(), &mut implied_by_singleton);
        }
    }
    let singletons: BTreeSet<&str> = graph
        .nodes()
        .filter(|n| !covered.contains(&n.id()) && !implied_by_singleton.contains(&n.id()))
        .map(BelNode::bel)
        .collect();

    if !structural.is_empty() || !singletons.is_empty() {
        for line in &structural {
            writeln!(writer, "{line}")?;
        }
        for bel in &singletons {
            writeln!(writer, "{bel}")?;
        }
        writeln!(writer)?;
    }

    write_qualified(qualified, writer)
}

/// Emit to a `String`.
pub fn to_bel_string(graph: &BelGraph) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_bel(graph, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

fn write_header(graph: &BelGraph, writer: &mut dyn Write) -> Result<()> {
    let metadata = graph.metadata();
    let definitions = graph.definitions();
    if metadata.is_empty() && definitions.is_empty() {
        return Ok(());
    }

    for (key, value) in metadata.iter() {
        writeln!(writer, "SET DOCUMENT {key} = {}", quote(value))?;
    }
    for (keyword, definition) in &definitions.namespaces {
        writeln!(writer, "DEFINE NAMESPACE {keyword} AS {definition}")?;
    }
    for (keyword, definition) in &definitions.annotations {
        writeln!(writer, "DEFINE ANNOTATION {keyword} AS {definition}")?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_qualified(mut edges: Vec<(&QualifiedEdge, String)>, writer: &mut dyn Write) -> Result<()> {
    edges.sort_by(|(a, a_line), (b, b_line)| {
        (&a.citation, &a.evidence, a_line, a.annotations.sorted())
            .cmp(&(&b.citation, &b.evidence, b_line, b.annotations.sorted()))
    });

    let mut index = 0;
    while index < edges.len() {
        let head = edges[index].0;
        let group_end = edges[index..]
            .iter()
            .position(|(q, _)| q.citation != head.citation || q.evidence != head.evidence)
            .map_or(edges.len(), |offset| index + offset);

        if let Some(citation) = &head.citation {
            writeln!(writer, "SET Citation = {citation}")?;
        }
        if let Some(evidence) = &head.evidence {
            writeln!(writer, "SET Evidence = {}", quote(evidence))?;
        }
        for (edge, line) in &edges[index..group_end] {
            let annotations = edge.annotations.sorted();
            for (key, values) in &annotations {
                writeln!(writer, "SET {key} = {}", render_values(values))?;
            }
            writeln!(writer, "{line}")?;
            for key in annotations.keys() {
                writeln!(writer, "UNSET {key}")?;
            }
        }
        writeln!(writer, "UNSET ALL")?;
        writeln!(writer)?;
        index = group_end;
    }
    Ok(())
}

fn render_values(values: &BTreeSet<String>) -> String {
    if values.len() == 1 {
        values.iter().map(|v| quote(v)).collect()
    } else {
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        format!("{{{}}}", quoted.join(", "))
    }
}

fn edge_line(graph: &BelGraph, edge: &Edge) -> Option<String> {
    let source = graph.node(edge.source)?;
    let target = graph.node(edge.target)?;
    Some(decanonicalize_edge(source, target, &edge.data))
}

/// Nodes inserting `node` creates besides itself.
fn structural_children(graph: &BelGraph, node: &BelNode) -> Vec<BelNode> {
    let mut children = node.children();
    if graph.complete_origin() {
        children.extend(node.origin());
    }
    children
}

/// Mark `id` and everything its insertion implies.
fn cover(graph: &BelGraph, id: NodeId, covered: &mut HashSet<NodeId>) {
    if !covered.insert(id) {
        return;
    }
    if let Some(node) = graph.node(id) {
        for child in structural_children(graph, node) {
            cover(graph, child.id(), covered);
        }
    }
}
