use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Point, Tree};

/// Tree-sitter parser loaded with the C# grammar.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(&SupportLang::CSharp.get_ts_language())
            .map_err(|_| TreeSitterError::LanguageSet)?;
        Ok(Self { parser })
    }

    pub fn parse_source<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)?;
        Ok(ParsedSource { source, tree })
    }
}

pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl ParsedSource<'_> {
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// `ERROR` nodes and tokens the grammar had to invent, in document order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_errors(self.tree.root_node(), &mut errors);
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: Point,
    /// Kind of the token the parser inserted, e.g. `;`. `None` for
    /// skipped text.
    pub missing: Option<&'static str>,
}

impl ErrorNode {
    /// Source text covered by the error, trimmed. Empty for missing tokens.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.byte_start..self.byte_end)
            .unwrap_or_default()
            .trim()
    }
}

fn collect_errors(node: Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            missing: node.is_missing().then(|| node.kind()),
        });
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_namespace_forms_parse_cleanly() {
        let mut parser = CSharpParser::new().unwrap();
        for source in [
            "namespace App;\n\nclass C { void M() { } }\n",
            "namespace App\n{\n    class C { void M() { } }\n}\n",
        ] {
            let parsed = parser.parse_source(source).unwrap();
            assert!(!parsed.has_errors(), "{source}");
            assert_eq!(parsed.tree.root_node().kind(), "compilation_unit");
        }
    }

    #[test]
    fn unbalanced_parameter_list_is_an_error() {
        let mut parser = CSharpParser::new().unwrap();
        let source = "class C { void M( { }\n";
        let parsed = parser.parse_source(source).unwrap();
        assert!(parsed.has_errors());
        let errors = parsed.error_nodes();
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.byte_end <= source.len()));
    }

    #[test]
    fn missing_semicolon_names_the_token() {
        let mut parser = CSharpParser::new().unwrap();
        let parsed = parser
            .parse_source("class C { void M() { int x = 1 } }\n")
            .unwrap();
        let errors = parsed.error_nodes();
        assert!(errors
            .iter()
            .any(|e| e.missing == Some(";") || !e.text(parsed.source).is_empty()));
    }
}
