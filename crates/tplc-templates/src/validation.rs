//! Expression safety checks over a finished template tree.
//!
//! Every directive value, `v-for` alias and iterator, slot scope, event
//! handler and interpolation is compiled with a [`SyntaxCheck`]. A failure
//! is then classified so that a reserved word used as a member name reads
//! differently from a plain syntax error. The pass only reports; it never
//! touches the tree and never stops at the first problem.

use std::sync::LazyLock;

use regex::Regex;
use tplc_source::Span;

use crate::ast::Ast;
use crate::ast::Element;
use crate::ast::Node;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::error::TemplateError;
use crate::syntax::SyntaxCheck;

const PROHIBITED_KEYWORDS: &[&str] = &[
    "do",
    "if",
    "for",
    "let",
    "new",
    "try",
    "var",
    "case",
    "else",
    "with",
    "await",
    "break",
    "catch",
    "class",
    "const",
    "super",
    "throw",
    "while",
    "yield",
    "delete",
    "export",
    "import",
    "return",
    "switch",
    "default",
    "extends",
    "finally",
    "continue",
    "debugger",
    "function",
    "arguments",
];

const UNARY_OPERATORS: &[&str] = &["delete", "typeof", "void"];

static PROHIBITED_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = PROHIBITED_KEYWORDS
        .iter()
        .map(|kw| format!(r"\b{kw}\b"))
        .collect();
    Regex::new(&alternatives.join("|")).expect("prohibited keyword regex")
});

static UNARY_OPERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = UNARY_OPERATORS
        .iter()
        .map(|op| format!(r"\b{op}\s*\([^\)]*\)"))
        .collect();
    Regex::new(&alternatives.join("|")).expect("unary operator regex")
});

static STRIP_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`(?:[^`\\]|\\.)*\$\{|\}(?:[^`\\]|\\.)*`|`(?:[^`\\]|\\.)*`"#,
    )
    .expect("string literal regex")
});

/// Attribute names that carry an expression.
#[must_use]
pub fn is_directive(name: &str) -> bool {
    name.starts_with("v-") || name.starts_with('@') || name.starts_with(':') || name.starts_with('#')
}

#[must_use]
pub fn is_event(name: &str) -> bool {
    name.starts_with('@') || name.starts_with("v-on:")
}

fn strip_strings(exp: &str) -> String {
    STRIP_STRING_RE.replace_all(exp, "").into_owned()
}

pub struct ExpressionValidator<'a> {
    syntax: &'a dyn SyntaxCheck,
}

impl<'a> ExpressionValidator<'a> {
    #[must_use]
    pub fn new(syntax: &'a dyn SyntaxCheck) -> Self {
        Self { syntax }
    }

    pub fn detect_errors(&self, ast: &Ast, sink: &mut dyn DiagnosticSink) {
        if let Some(root) = ast.root() {
            self.check_node(ast, root, sink);
        }
    }

    fn check_node(&self, ast: &Ast, id: NodeId, sink: &mut dyn DiagnosticSink) {
        match ast.get(id) {
            Some(Node::Element(el)) => {
                self.check_element(el, sink);
                for &child in &el.children {
                    self.check_node(ast, child, sink);
                }
            }
            Some(Node::Expression {
                expression,
                text,
                span,
                ..
            }) => {
                self.check_expression(expression, text, *span, sink);
            }
            Some(Node::Text { .. }) | None => {}
        }
    }

    fn check_element(&self, el: &Element, sink: &mut dyn DiagnosticSink) {
        for (name, value) in el.attrs_map.iter() {
            if !is_directive(name) || value.is_empty() {
                continue;
            }
            let span = el.attr_span(name);
            let text = format!("{name}=\"{value}\"");
            if name == "v-for" {
                self.check_for(el, &text, span, sink);
            } else if name == "v-slot" || name.starts_with('#') {
                self.check_params(value, &text, span, sink);
            } else if is_event(name) {
                self.check_event(value, &text, span, sink);
            } else {
                self.check_expression(value, &text, span, sink);
            }
        }
    }

    fn check_for(&self, el: &Element, text: &str, span: Option<Span>, sink: &mut dyn DiagnosticSink) {
        self.check_expression(el.for_expr.as_deref().unwrap_or(""), text, span, sink);
        self.check_identifier(el.alias.as_deref(), "v-for alias", text, span, sink);
        self.check_identifier(el.iterator1.as_deref(), "v-for iterator", text, span, sink);
        self.check_identifier(el.iterator2.as_deref(), "v-for iterator", text, span, sink);
    }

    fn check_identifier(
        &self,
        ident: Option<&str>,
        role: &'static str,
        text: &str,
        span: Option<Span>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let Some(ident) = ident else {
            return;
        };
        if self.syntax.check_body(&format!("var {ident}=_")).is_err() {
            let err = TemplateError::InvalidIdentifier {
                role,
                ident: ident.to_string(),
                raw: text.trim().to_string(),
            };
            sink.report(err.into_diagnostic(span), false);
        }
    }

    fn check_event(&self, exp: &str, text: &str, span: Option<Span>, sink: &mut dyn DiagnosticSink) {
        let stripped = strip_strings(exp);
        if let Some(found) = UNARY_OPERATOR_RE.find(&stripped) {
            let escaped = stripped[..found.start()].ends_with('$');
            if !escaped {
                let err = TemplateError::UnaryOperator {
                    operator: found.as_str().to_string(),
                    raw: text.trim().to_string(),
                };
                sink.report(err.into_diagnostic(span), false);
            }
        }
        self.check_expression(exp, text, span, sink);
    }

    fn check_expression(
        &self,
        exp: &str,
        text: &str,
        span: Option<Span>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let Err(syntax_error) = self.syntax.check_body(&format!("return {exp}")) else {
            return;
        };
        let stripped = strip_strings(exp);
        let err = match PROHIBITED_KEYWORD_RE.find(&stripped) {
            Some(keyword) => TemplateError::ProhibitedKeyword {
                keyword: keyword.as_str().to_string(),
                raw: text.trim().to_string(),
            },
            None => TemplateError::InvalidExpression {
                message: syntax_error.message,
                expression: exp.to_string(),
                raw: text.trim().to_string(),
            },
        };
        sink.report(err.into_diagnostic(span), false);
    }

    fn check_params(&self, exp: &str, text: &str, span: Option<Span>, sink: &mut dyn DiagnosticSink) {
        if let Err(syntax_error) = self.syntax.check_params(exp) {
            let err = TemplateError::InvalidParameters {
                message: syntax_error.message,
                expression: exp.to_string(),
                raw: text.trim().to_string(),
            };
            sink.report(err.into_diagnostic(span), false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Attr;
    use crate::diagnostics::Diagnostic;
    use crate::syntax::EcmaSyntax;

    fn validate(ast: &Ast) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        ExpressionValidator::new(&EcmaSyntax).detect_errors(ast, &mut diagnostics);
        diagnostics
    }

    fn single(tag: &str, attrs: Vec<Attr>) -> Ast {
        let mut ast = Ast::new();
        let root = ast.create_element(tag, attrs, None);
        ast.set_root(root);
        ast
    }

    fn bound(name: &str, value: &str) -> Ast {
        single("div", vec![Attr::new(name, value)])
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_valid_expressions_pass() {
        for exp in [
            "a + b",
            "typeof x === 'string'",
            "x instanceof Y",
            "'a' in obj",
            "item.class",
            "list.filter(x => x.done).length",
        ] {
            let diagnostics = validate(&bound(":title", exp));
            assert!(diagnostics.is_empty(), "{exp}: {diagnostics:?}");
        }
    }

    #[test]
    fn test_syntax_error_reported() {
        let diagnostics = validate(&bound(":title", "(a + b"));
        assert_eq!(codes(&diagnostics), vec!["T100"]);
        assert!(diagnostics[0].message.starts_with("invalid expression: "));
        assert!(diagnostics[0]
            .message
            .contains("Raw expression: :title=\"(a + b\""));
    }

    #[test]
    fn test_keyword_as_property_name() {
        let diagnostics = validate(&bound(":title", "foo.new + "));
        assert_eq!(codes(&diagnostics), vec!["T101"]);
        insta::assert_snapshot!(
            diagnostics[0].message,
            @r#"
        avoid using JavaScript keyword as property name: "new"
          Raw expression: :title="foo.new + "
        "#
        );
    }

    #[test]
    fn test_each_keyword_reported_once() {
        for keyword in ["new", "delete", "import", "class", "function"] {
            let diagnostics = validate(&bound(":title", &format!("{keyword} +")));
            assert_eq!(codes(&diagnostics), vec!["T101"], "{keyword}");
            assert!(diagnostics[0].message.contains(&format!("\"{keyword}\"")));
        }
    }

    #[test]
    fn test_keyword_inside_string_is_ignored() {
        let diagnostics = validate(&bound(":title", "'new' +"));
        assert_eq!(codes(&diagnostics), vec!["T100"]);
    }

    #[test]
    fn test_unary_operator_in_event_handler() {
        let diagnostics = validate(&bound("@click", "list.delete(item)"));
        assert_eq!(codes(&diagnostics), vec!["T102"]);
        assert_eq!(
            diagnostics[0].message,
            "avoid using JavaScript unary operator as property name: \"delete(item)\" in expression @click=\"list.delete(item)\""
        );
    }

    #[test]
    fn test_unary_operator_after_dollar_is_allowed() {
        let diagnostics = validate(&bound("v-on:click", "$delete(list, 0)"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_unary_operator_inside_string_is_ignored() {
        let diagnostics = validate(&bound("@click", "log('delete(x)')"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_for_alias_and_iterators() {
        let mut ast = single("li", vec![Attr::new("v-for", "(1a, idx, 2b) in items")]);
        let root = ast.root().unwrap();
        let el = ast.element_mut(root).unwrap();
        el.for_expr = Some("items".to_string());
        el.alias = Some("1a".to_string());
        el.iterator1 = Some("idx".to_string());
        el.iterator2 = Some("2b".to_string());

        let diagnostics = validate(&ast);
        assert_eq!(codes(&diagnostics), vec!["T103", "T103"]);
        assert!(diagnostics[0].message.starts_with("invalid v-for alias \"1a\""));
        assert!(diagnostics[1]
            .message
            .starts_with("invalid v-for iterator \"2b\""));
    }

    #[test]
    fn test_for_without_parsed_fields_is_quiet() {
        let diagnostics = validate(&bound("v-for", "item in items"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_slot_scope_parameters() {
        assert!(validate(&bound("v-slot", "{ item }")).is_empty());
        assert!(validate(&bound("#header", "props")).is_empty());

        let diagnostics = validate(&bound("#default", "{ item "));
        assert_eq!(codes(&diagnostics), vec!["T104"]);
        assert!(diagnostics[0]
            .message
            .starts_with("invalid function parameter expression: "));
    }

    #[test]
    fn test_empty_and_plain_attributes_skipped() {
        let ast = single(
            "div",
            vec![Attr::new(":title", ""), Attr::new("title", "(a + b")],
        );
        assert!(validate(&ast).is_empty());
    }

    #[test]
    fn test_walks_children_and_interpolations() {
        let mut ast = Ast::new();
        let root = ast.create_element("div", vec![], None);
        ast.set_root(root);
        let child = ast.create_element("span", vec![Attr::new(":id", "a +")], None);
        ast.append_child(root, child);
        let text = ast.push(Node::Expression {
            expression: "_s(a.)".to_string(),
            tokens: Vec::new(),
            text: "{{ a. }}".to_string(),
            span: Some(Span::new(30, 8)),
            parent: None,
        });
        ast.append_child(root, text);

        let diagnostics = validate(&ast);
        assert_eq!(codes(&diagnostics), vec!["T100", "T100"]);
        assert!(diagnostics[1].message.contains("Raw expression: {{ a. }}"));
        assert_eq!(diagnostics[1].span, Some(Span::new(30, 8)));
    }

    #[test]
    fn test_diagnostic_carries_attribute_span() {
        let ast = single(
            "div",
            vec![Attr::new(":title", "a +").with_span(Span::new(5, 12))],
        );
        let diagnostics = validate(&ast);
        assert_eq!(diagnostics[0].span, Some(Span::new(5, 12)));
    }

    #[test]
    fn test_validation_does_not_mutate_tree() {
        let ast = bound(":title", "(a");
        let before = ast.clone();
        let _ = validate(&ast);
        assert_eq!(ast, before);
    }
}
