//! End-to-end tests for document compilation.
//!
//! Each test exercises: text -> split -> control / statement parsing ->
//! validation -> BelGraph, through `Compiler::compile_str`.

use std::collections::BTreeSet;

use bel_graph::{
    BelGraph, Compiler, CompilerConfig, EdgeData, Error, Function, MemoryOracle, NamespaceOracle,
    NodeData, Relation,
};
use pretty_assertions::assert_eq;

fn oracle() -> MemoryOracle {
    MemoryOracle::new()
        .with_namespace("HGNC", ["AKT1", "AKT2", "CD33", "MTOR", "TP53", "MDM2"])
        .with_namespace("CHEBI", ["sialic acid", "water", "calcium"])
        .with_namespace("GO", ["cytoplasm", "nucleus"])
        .with_annotation("Species", ["9606", "10090"])
        .with_annotation("Tissue", ["liver", "brain"])
}

fn compile(text: &str) -> BelGraph {
    Compiler::new(oracle(), CompilerConfig::default()).compile_str(text)
}

fn qualified(graph: &BelGraph) -> Vec<&bel_graph::QualifiedEdge> {
    graph.edges().filter_map(|(_, _, _, data)| data.as_qualified()).collect()
}

// ============================================================================
// 1. The worked example: a complex increasing a phosphorylated protein
// ============================================================================

#[test]
fn test_complex_increases_modified_protein() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "Siglec paper", "26438529"}
SET Evidence = "e1"
complex(p(HGNC:CD33), a(CHEBI:"sialic acid")) -> p(HGNC:CD33, pmod(Ph))
"#,
    );

    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    assert_eq!(graph.number_of_nodes(), 4);

    let mut bels: Vec<&str> = graph.nodes().map(|n| n.bel()).collect();
    bels.sort();
    assert_eq!(
        bels,
        vec![
            r#"a(CHEBI:"sialic acid")"#,
            r#"complex(a(CHEBI:"sialic acid"), p(HGNC:CD33))"#,
            "p(HGNC:CD33)",
            "p(HGNC:CD33, pmod(Ph))",
        ]
    );

    let complex = graph.nodes().find(|n| n.function() == Function::Complex).unwrap();
    assert!(matches!(complex.data(), NodeData::List { members, .. } if members.len() == 2));

    let mut relations: Vec<Relation> = graph.edges().map(|(_, _, _, d)| d.relation()).collect();
    relations.sort();
    assert_eq!(
        relations,
        vec![Relation::Increases, Relation::HasComponent, Relation::HasComponent, Relation::HasVariant]
    );

    let (source, target, _, data) = graph
        .edges()
        .find(|(_, _, _, d)| matches!(d, EdgeData::Qualified(_)))
        .unwrap();
    assert_eq!(source.id(), complex.id());
    assert_eq!(target.bel(), "p(HGNC:CD33, pmod(Ph))");
    let q = data.as_qualified().unwrap();
    assert_eq!(q.citation.as_ref().map(|c| c.reference.as_str()), Some("26438529"));
    assert_eq!(q.evidence.as_deref(), Some("e1"));
}

// ============================================================================
// 2. Context scoping
// ============================================================================

#[test]
fn test_context_scoping() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
SET Evidence = "e1"
p(HGNC:AKT1) -> p(HGNC:MTOR)
SET Citation = {"PubMed", "B", "2"}
p(HGNC:AKT2) -> p(HGNC:MTOR)
UNSET ALL
p(HGNC:TP53) -| p(HGNC:MDM2)
"#,
    );
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());

    let edges = qualified(&graph);
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[0].citation.as_ref().unwrap().reference, "1");
    assert_eq!(edges[0].evidence.as_deref(), Some("e1"));
    assert_eq!(edges[1].citation.as_ref().unwrap().reference, "2");
    // A new citation drops the previous evidence.
    assert_eq!(edges[1].evidence, None);
    assert_eq!(edges[2].citation, None);
    assert_eq!(edges[2].evidence, None);
}

#[test]
fn test_annotations_are_scoped_and_unset() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
SET Evidence = "e"
SET Species = "9606"
SET Tissue = {"liver", "brain"}
p(HGNC:AKT1) -> p(HGNC:MTOR)
UNSET Tissue
p(HGNC:AKT2) -> p(HGNC:MTOR)
UNSET {Species, Tissue}
p(HGNC:TP53) -> p(HGNC:MTOR)
"#,
    );

    let edges = qualified(&graph);
    assert_eq!(
        edges[0].annotations.get("Tissue"),
        Some(&BTreeSet::from(["brain".to_string(), "liver".to_string()]))
    );
    assert!(edges[0].annotations.contains_key("Species"));
    assert!(!edges[1].annotations.contains_key("Tissue"));
    assert!(edges[1].annotations.contains_key("Species"));
    assert!(edges[2].annotations.is_empty());

    // Tissue was already gone on the last UNSET.
    assert_eq!(graph.warnings().len(), 1);
    let warning = &graph.warnings()[0];
    assert!(matches!(&warning.error, Error::MissingAnnotationKey { key } if key == "Tissue"));
    assert!(warning.error.is_warning());
    assert_eq!(warning.line_number, 8);
}

#[test]
fn test_invalid_annotation_values() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
SET Species = "9999"
SET Disease = "cancer"
SET Tissue = {"liver", "heart"}
"#,
    );
    let errors: Vec<&Error> = graph.warnings().iter().map(|w| &w.error).collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], Error::IllegalAnnotationValue { annotation, value }
        if annotation == "Species" && value == "9999"));
    assert!(matches!(errors[1], Error::UndefinedAnnotation { annotation } if annotation == "Disease"));
    assert!(matches!(errors[2], Error::IllegalAnnotationValue { value, .. } if value == "heart"));
}

#[test]
fn test_invalid_citation_clears_context() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
SET Evidence = "e"
SET Citation = {"PubMed", "B"}
p(HGNC:AKT1) -> p(HGNC:MTOR)
"#,
    );
    assert_eq!(graph.warnings().len(), 1);
    assert!(matches!(graph.warnings()[0].error, Error::InvalidCitation(_)));
    let edges = qualified(&graph);
    assert_eq!(edges[0].citation, None);
    assert_eq!(edges[0].evidence, None);
}

// ============================================================================
// 3. Multi-line evidence
// ============================================================================

#[test]
fn test_multi_line_evidence() {
    let graph = compile(
        "SET Citation = {\"PubMed\", \"A\", \"1\"}\n\
         SET Evidence = \"AKT1 is \\\n\
         \x20   a kinase \\\n\
         of MTOR\"\n\
         p(HGNC:AKT1) -> p(HGNC:MTOR)\n",
    );
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    let edges = qualified(&graph);
    assert_eq!(edges[0].evidence.as_deref(), Some("AKT1 is a kinase of MTOR"));
    assert_eq!(graph.edge_records().next().unwrap().line, Some(5));
}

#[test]
fn test_evidence_keeps_comment_and_blank_lines() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
SET Evidence = "Results: \
# 3 of 5 mice responded"
# a real comment
p(HGNC:AKT1) -> p(HGNC:MTOR)

SET Evidence = "first

second"
p(HGNC:TP53) -| p(HGNC:MDM2)
"#,
    );
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    let mut evidence: Vec<_> = qualified(&graph).iter().filter_map(|q| q.evidence.clone()).collect();
    evidence.sort();
    assert_eq!(evidence, vec!["Results: # 3 of 5 mice responded", "first second"]);
}

#[test]
fn test_continued_citation_line() {
    let graph = compile(
        r#"SET Citation = {"PubMed", \
    "A", "1"}
p(HGNC:AKT1) -> p(HGNC:MTOR)
"#,
    );
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    let edges = qualified(&graph);
    assert_eq!(edges[0].citation.as_ref().map(|c| c.reference.as_str()), Some("1"));
}

// ============================================================================
// 4. Rejection never aborts a document
// ============================================================================

#[test]
fn test_nested_relation_rejected_without_mutation() {
    let graph = compile("a(CHEBI:water) -> (a(CHEBI:calcium) -| p(HGNC:TP53))\n");
    assert_eq!(graph.number_of_nodes(), 0);
    assert_eq!(graph.number_of_edges(), 0);
    assert_eq!(graph.warnings().len(), 1);
    assert!(matches!(graph.warnings()[0].error, Error::NestedRelationNotSupported { .. }));
}

#[test]
fn test_errors_are_recorded_in_order() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
p(HGNC:AKT1) -> p(HGNC:NOPE)
p(MGI:Akt1) -> p(HGNC:MTOR)
p(AKT1) -> p(HGNC:MTOR)
tloc(p(HGNC:TP53)) -> p(HGNC:MDM2)
p(HGNC:AKT1) => p(HGNC:MTOR)
"#,
    );

    let lines: Vec<usize> = graph.warnings().iter().map(|w| w.line_number).collect();
    assert_eq!(lines, vec![2, 3, 4, 5]);
    let errors: Vec<&Error> = graph.warnings().iter().map(|w| &w.error).collect();
    assert!(matches!(errors[0], Error::MissingNamespaceName { name, .. } if name == "NOPE"));
    assert!(matches!(errors[1], Error::UndefinedNamespace { namespace } if namespace == "MGI"));
    assert!(matches!(errors[2], Error::NakedName { .. }));
    assert!(matches!(errors[3], Error::IllegalTranslocation { .. }));
    assert_eq!(graph.warnings()[0].line, "p(HGNC:AKT1) -> p(HGNC:NOPE)");
    assert_eq!(
        graph.warnings()[0].annotations.get("citation_reference"),
        Some(&BTreeSet::from(["1".to_string()]))
    );

    // Only the last statement made it in.
    assert_eq!(graph.number_of_nodes(), 2);
    assert_eq!(qualified(&graph)[0].relation, Relation::DirectlyIncreases);
}

struct UnreachableOracle;

impl NamespaceOracle for UnreachableOracle {
    fn has_namespace(&self, _: &str) -> bel_graph::Result<bool> {
        Err(Error::Oracle("timed out".into()))
    }
    fn is_member(&self, _: &str, _: &str) -> bel_graph::Result<bool> {
        Err(Error::Oracle("timed out".into()))
    }
    fn has_annotation(&self, _: &str) -> bel_graph::Result<bool> {
        Err(Error::Oracle("timed out".into()))
    }
    fn annotation_values(&self, _: &str) -> bel_graph::Result<BTreeSet<String>> {
        Err(Error::Oracle("timed out".into()))
    }
}

#[test]
fn test_oracle_failures_are_reported_per_statement() {
    let compiler = Compiler::new(UnreachableOracle, CompilerConfig::default());
    let graph = compiler.compile_str(
        r#"SET Species = "9606"
p(HGNC:AKT1) -> p(HGNC:MTOR)
bp(GO:"cell death") -> path(MESH:Cancer)
"#,
    );
    assert_eq!(graph.warnings().len(), 3);
    assert!(graph.warnings().iter().all(|w| matches!(w.error, Error::Oracle(_))));
    assert_eq!(graph.number_of_nodes(), 0);

    let lenient = Compiler::new(UnreachableOracle, CompilerConfig {
        skip_validation: true,
        ..CompilerConfig::default()
    });
    let graph = lenient.compile_str("p(HGNC:AKT1) -> p(HGNC:MTOR)\n");
    assert!(graph.warnings().is_empty());
    assert_eq!(graph.number_of_edges(), 1);
}

#[test]
fn test_builtin_vocabulary_namespace_is_not_a_namespace() {
    let graph = compile("p(bel:NOT_A_GENE) -> p(HGNC:MTOR)\n");
    assert_eq!(graph.number_of_nodes(), 0);
    assert_eq!(graph.warnings().len(), 1);
    assert!(matches!(
        &graph.warnings()[0].error,
        Error::UndefinedNamespace { namespace } if namespace == "bel"
    ));
}

// ============================================================================
// 5. Deprecated syntax
// ============================================================================

#[test]
fn test_legacy_spellings_normalize() {
    let graph = compile(
        r#"SET Citation = {"PubMed", "A", "1"}
kin(p(HGNC:AKT1)) -> p(HGNC:MTOR, sub(S, 2448, A))
act(p(HGNC:AKT1), ma(kin)) -> p(HGNC:MTOR, var("p.Ser2448Ala"))
"#,
    );

    assert!(!graph.warnings().is_empty());
    assert!(graph
        .warnings()
        .iter()
        .all(|w| matches!(w.error, Error::DeprecatedSyntax { .. }) && w.line_number == 2));
    // Both spellings describe the same statement.
    assert_eq!(qualified(&graph).len(), 1);
    assert_eq!(graph.number_of_nodes(), 3);
}

#[test]
fn test_strict_mode_rejects_legacy_spellings() {
    let compiler = Compiler::new(oracle(), CompilerConfig::strict());
    let graph = compiler.compile_str(
        r#"SET Citation = {"PubMed", "A", "1"}
kin(p(HGNC:AKT1)) -> p(HGNC:MTOR)
act(p(HGNC:AKT1), ma(kin)) -> p(HGNC:MTOR)
"#,
    );
    assert_eq!(graph.warnings().len(), 1);
    assert!(matches!(graph.warnings()[0].error, Error::DeprecatedSyntax { .. }));
    assert_eq!(graph.number_of_edges(), 1);
}

// ============================================================================
// 6. Definitions section
// ============================================================================

#[test]
fn test_document_definitions() {
    let graph = compile(
        r#"SET DOCUMENT Name = "Definitions"
SET DOCUMENT Version = "1.2"
DEFINE NAMESPACE HGNC AS URL "https://example.org/hgnc.belns"
DEFINE NAMESPACE DRUG AS LIST {"aspirin", "ibuprofen"}
DEFINE NAMESPACE SNP AS PATTERN "rs[0-9]+"
DEFINE NAMESPACE DRUG AS LIST {"heroin"}
DEFINE ANNOTATION Dose AS PATTERN "[0-9]+mg"

SET Citation = {"PubMed", "A", "1"}
SET Dose = "20mg"
a(DRUG:aspirin) -| p(HGNC:TP53)
g(SNP:rs1234) -> a(DRUG:ibuprofen)
g(SNP:rsABC) -> a(DRUG:ibuprofen)
SET Dose = "a lot"
"#,
    );

    assert_eq!(graph.metadata().get("Name"), Some("Definitions"));
    assert_eq!(graph.metadata().get("Version"), Some("1.2"));
    assert_eq!(graph.definitions().namespaces.len(), 3);

    let errors: Vec<(usize, &Error)> =
        graph.warnings().iter().map(|w| (w.line_number, &w.error)).collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], (6, Error::InvalidDefinition(_))));
    assert!(matches!(errors[1], (13, Error::MissingNamespaceName { .. })));
    assert!(matches!(errors[2], (14, Error::IllegalAnnotationValue { .. })));
    assert_eq!(qualified(&graph).len(), 2);
}

#[test]
fn test_url_namespace_not_loaded() {
    let graph = compile(
        r#"DEFINE NAMESPACE MGI AS URL "https://example.org/mgi.belns"
p(MGI:Akt1)
"#,
    );
    assert_eq!(graph.warnings().len(), 1);
    assert!(matches!(graph.warnings()[0].error, Error::Oracle(_)));
}

// ============================================================================
// 7. Many documents
// ============================================================================

#[test]
fn test_compile_many_merges() {
    let compiler = Compiler::new(oracle(), CompilerConfig::default());
    let graph = compiler
        .compile_many(&[
            "SET DOCUMENT Name = \"one\"\np(HGNC:AKT1) isA p(HGNC:AKT2)\n",
            "SET DOCUMENT Name = \"two\"\np(HGNC:AKT1) isA p(HGNC:AKT2)\np(HGNC:NOPE)\n",
            "complex(p(HGNC:AKT1), p(HGNC:MTOR))\n",
        ])
        .unwrap();

    assert_eq!(graph.number_of_nodes(), 4);
    assert_eq!(graph.number_of_edges(), 3);
    assert_eq!(graph.warnings().len(), 1);
    assert_eq!(graph.metadata().get("Name"), Some("one"));
}

#[test]
fn test_compile_many_rejects_conflicting_definitions() {
    let compiler = Compiler::new(oracle(), CompilerConfig::default());
    let result = compiler.compile_many(&[
        "DEFINE NAMESPACE DRUG AS LIST {\"aspirin\"}\na(DRUG:aspirin)\n",
        "DEFINE NAMESPACE DRUG AS LIST {\"heroin\"}\na(DRUG:heroin)\n",
    ]);
    assert!(matches!(result, Err(Error::InvalidDefinition(_))));
}

#[test]
fn test_config_from_json() {
    let config = CompilerConfig::from_json_str(r#"{"complete_origin": true}"#).unwrap();
    let graph = Compiler::new(oracle(), config).compile_str("p(HGNC:TP53)\n");
    assert_eq!(graph.number_of_nodes(), 3);
    assert_eq!(graph.number_of_edges(), 2);
}
