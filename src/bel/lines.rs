//! Line numbering and the definitions / statements split.

use super::metadata::MetadataParser;

/// One source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    /// Blank lines and `#` comments carry nothing outside evidence text.
    pub fn is_content(&self) -> bool {
        let text = self.text.trim();
        !text.is_empty() && !text.starts_with('#')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitDocument {
    /// Everything up to and including the last `SET DOCUMENT` / `DEFINE`
    /// line, without blanks and comments.
    pub definitions: Vec<Line>,
    /// Every line after that, blanks and comments included: an open
    /// multi-line evidence value keeps them as text.
    pub statements: Vec<Line>,
}

/// Every line, trimmed, with its 1-based number.
fn numbered(text: &str) -> impl Iterator<Item = Line> + '_ {
    text.lines()
        .enumerate()
        .map(|(i, raw)| Line { number: i + 1, text: raw.trim().to_string() })
}

pub fn split_document(text: &str) -> SplitDocument {
    let lines: Vec<Line> = numbered(text).collect();
    let boundary = lines
        .iter()
        .rposition(|line| MetadataParser::is_definition_line(&line.text))
        .map_or(0, |i| i + 1);

    let mut definitions = lines;
    let statements = definitions.split_off(boundary);
    definitions.retain(Line::is_content);
    SplitDocument { definitions, statements }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"# header comment
SET DOCUMENT Name = "Example"

DEFINE NAMESPACE HGNC AS URL "https://example.org/hgnc"
SET Citation = {"PubMed", "Title", "1"}
   # indented comment
p(HGNC:AKT1) -> p(HGNC:MTOR)
"#;

    #[test]
    fn test_split_keeps_line_numbers() {
        let doc = split_document(DOC);
        let defs: Vec<_> = doc.definitions.iter().map(|l| l.number).collect();
        let stmts: Vec<_> = doc.statements.iter().map(|l| l.number).collect();
        assert_eq!(defs, vec![2, 4]);
        assert_eq!(stmts, vec![5, 6, 7]);
        assert!(!doc.statements[1].is_content());
        assert_eq!(doc.statements[2].text, "p(HGNC:AKT1) -> p(HGNC:MTOR)");
    }

    #[test]
    fn test_no_definitions() {
        let doc = split_document("p(HGNC:AKT1)\n\np(HGNC:MTOR)\n");
        assert!(doc.definitions.is_empty());
        let content: Vec<_> =
            doc.statements.iter().filter(|l| l.is_content()).map(|l| l.number).collect();
        assert_eq!(content, vec![1, 3]);
    }

    #[test]
    fn test_only_definitions() {
        let doc = split_document("SET DOCUMENT Name = \"x\"\n");
        assert_eq!(doc.definitions.len(), 1);
        assert!(doc.statements.is_empty());
    }
}
