use std::sync::LazyLock;

use regex::Regex;

use crate::ast::Ast;
use crate::ast::AttrBinding;
use crate::ast::DirectiveBinding;
use crate::ast::Element;
use crate::ast::EventBinding;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::error::TemplateError;
use crate::filters::parse_filters;
use crate::options::CompilerOptions;
use crate::text::parse_text;
use crate::validation::is_directive;

static FOR_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s+(?:in|of)\s+(.*)$").expect("v-for alias regex"));

static FOR_ITERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",([^,\}\]]*)(?:,([^,\}\]]*))?$").expect("v-for iterator regex")
});

static STRIP_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(|\)$").expect("paren regex"));

/// Element processing the upstream tree builder provides.
///
/// Compiler modules that rebuild elements need the same processing the
/// builder would have applied to the originals.
pub trait ElementProcessor: Send + Sync {
    /// Consume `v-for` from the attribute list and fill in the loop fields.
    fn process_for(&self, ast: &mut Ast, el: NodeId, sink: &mut dyn DiagnosticSink);

    /// Key, ref, module transforms and attribute classification.
    fn process_element(
        &self,
        ast: &mut Ast,
        el: NodeId,
        options: &CompilerOptions,
        sink: &mut dyn DiagnosticSink,
    );
}

#[derive(Debug, PartialEq, Eq)]
pub struct ForParse {
    pub for_expr: String,
    pub alias: String,
    pub iterator1: Option<String>,
    pub iterator2: Option<String>,
}

/// Split a `v-for` value such as `(item, key, index) in list`.
#[must_use]
pub fn parse_for(exp: &str) -> Option<ForParse> {
    let captures = FOR_ALIAS_RE.captures(exp)?;
    let for_expr = captures.get(2)?.as_str().trim().to_string();
    let alias = captures.get(1)?.as_str().trim();
    let alias = STRIP_PARENS_RE.replace_all(alias, "");

    match FOR_ITERATOR_RE.captures(&alias) {
        Some(iterators) => Some(ForParse {
            for_expr,
            alias: FOR_ITERATOR_RE.replace(&alias, "").trim().to_string(),
            iterator1: iterators.get(1).map(|m| m.as_str().trim().to_string()),
            iterator2: iterators
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|it| !it.is_empty()),
        }),
        None => Some(ForParse {
            for_expr,
            alias: alias.into_owned(),
            iterator1: None,
            iterator2: None,
        }),
    }
}

/// Split trailing `.modifier` segments off a directive name. Segments inside
/// a dynamic `[argument]` are part of the name.
fn split_modifiers(name: &str) -> (String, Vec<String>) {
    let tail_start = name.rfind(']').map_or(0, |i| i + 1);
    let (head, tail) = name.split_at(tail_start);
    let mut parts = tail.split('.');
    let kept = parts.next().unwrap_or_default();
    let modifiers: Vec<String> = parts
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    (format!("{head}{kept}"), modifiers)
}

fn strip_dynamic(name: &str) -> (String, bool) {
    match name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        Some(inner) => (inner.to_string(), true),
        None => (name.to_string(), false),
    }
}

fn strip_bind_prefix(name: &str) -> Option<&str> {
    name.strip_prefix(':')
        .or_else(|| name.strip_prefix("v-bind:"))
}

fn strip_on_prefix(name: &str) -> Option<&str> {
    name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:"))
}

fn strip_directive_prefix(name: &str) -> &str {
    ["v-", "@", ":", "#"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProcessor;

impl DefaultProcessor {
    fn process_attrs(el: &mut Element, options: &CompilerOptions, sink: &mut dyn DiagnosticSink) {
        let list = el.attrs_list.clone();
        for attr in list {
            let raw_name = attr.name.as_str();
            let mut value = attr.value.clone();

            if !is_directive(raw_name) {
                if parse_text(&value, options.delimiters.as_ref()).is_some() {
                    let err = TemplateError::AttributeInterpolation {
                        name: raw_name.to_string(),
                        value: value.clone(),
                    };
                    sink.report(err.into_diagnostic(attr.span), false);
                }
                el.attrs.push(AttrBinding {
                    name: raw_name.to_string(),
                    value: serde_json::Value::from(value).to_string(),
                    dynamic: false,
                    span: attr.span,
                });
                if raw_name == "muted"
                    && (options.must_use_prop)(&el.tag, el.attrs_map.get("type"), raw_name)
                {
                    el.props.push(AttrBinding {
                        name: raw_name.to_string(),
                        value: "true".to_string(),
                        dynamic: false,
                        span: attr.span,
                    });
                }
                continue;
            }

            el.has_bindings = true;
            let (name, modifiers) = split_modifiers(raw_name);

            if let Some(bound) = strip_bind_prefix(&name) {
                value = parse_filters(&value);
                let (bound, dynamic) = strip_dynamic(bound);
                let binding = AttrBinding {
                    name: bound,
                    value,
                    dynamic,
                    span: attr.span,
                };
                let as_prop = modifiers.iter().any(|m| m == "prop")
                    || (options.must_use_prop)(&el.tag, el.attrs_map.get("type"), &binding.name);
                if as_prop {
                    el.props.push(binding);
                } else {
                    el.attrs.push(binding);
                }
            } else if let Some(event) = strip_on_prefix(&name) {
                let (event, dynamic) = strip_dynamic(event);
                el.events.push(EventBinding {
                    name: event,
                    value,
                    modifiers,
                    dynamic,
                    span: attr.span,
                });
            } else {
                let stripped = strip_directive_prefix(&name);
                let (dir_name, arg, dynamic_arg) = match stripped.split_once(':') {
                    Some((dir_name, arg)) => {
                        let (arg, dynamic) = strip_dynamic(arg);
                        (dir_name.to_string(), Some(arg), dynamic)
                    }
                    None => (stripped.to_string(), None, false),
                };
                el.directives.push(DirectiveBinding {
                    name: dir_name,
                    raw_name: raw_name.to_string(),
                    value,
                    arg,
                    dynamic_arg,
                    modifiers,
                    span: attr.span,
                });
            }
        }
    }
}

impl ElementProcessor for DefaultProcessor {
    fn process_for(&self, ast: &mut Ast, el: NodeId, sink: &mut dyn DiagnosticSink) {
        let Some(el) = ast.element_mut(el) else {
            return;
        };
        let Some(exp) = el.get_and_remove_attr("v-for", false) else {
            return;
        };
        if exp.is_empty() {
            return;
        }
        match parse_for(&exp) {
            Some(parsed) => {
                el.for_expr = Some(parsed.for_expr);
                el.alias = Some(parsed.alias);
                el.iterator1 = parsed.iterator1;
                el.iterator2 = parsed.iterator2;
            }
            None => {
                let span = el.attr_span("v-for");
                let err = TemplateError::InvalidFor { expression: exp };
                sink.report(err.into_diagnostic(span), false);
            }
        }
    }

    fn process_element(
        &self,
        ast: &mut Ast,
        id: NodeId,
        options: &CompilerOptions,
        sink: &mut dyn DiagnosticSink,
    ) {
        let Some(el) = ast.element_mut(id) else {
            return;
        };
        if let Some(key) = el.get_binding_attr("key", true).filter(|k| !k.is_empty()) {
            el.key = Some(key);
        }
        el.plain = el.key.is_none() && el.attrs_list.is_empty();
        if let Some(ref_binding) = el.get_binding_attr("ref", true).filter(|r| !r.is_empty()) {
            el.ref_binding = Some(ref_binding);
        }

        options.transform(ast, id, sink);

        if let Some(el) = ast.element_mut(id) {
            Self::process_attrs(el, options, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Attr;

    fn element(ast: &mut Ast, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attr::new(*name, *value))
            .collect();
        ast.create_element(tag, attrs, None)
    }

    #[test]
    fn test_parse_for_simple() {
        assert_eq!(
            parse_for("item in items"),
            Some(ForParse {
                for_expr: "items".to_string(),
                alias: "item".to_string(),
                iterator1: None,
                iterator2: None,
            })
        );
    }

    #[test]
    fn test_parse_for_iterators() {
        assert_eq!(
            parse_for("(value, key, index) of object"),
            Some(ForParse {
                for_expr: "object".to_string(),
                alias: "value".to_string(),
                iterator1: Some("key".to_string()),
                iterator2: Some("index".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_for_destructuring() {
        let parsed = parse_for("({ id, name }, i) in users").unwrap();
        assert_eq!(parsed.alias, "{ id, name }");
        assert_eq!(parsed.iterator1, Some("i".to_string()));
        assert_eq!(parsed.iterator2, None);
    }

    #[test]
    fn test_parse_for_invalid() {
        assert_eq!(parse_for("items"), None);
    }

    #[test]
    fn test_split_modifiers() {
        assert_eq!(
            split_modifiers("@click.stop.prevent"),
            ("@click".to_string(), vec!["stop".to_string(), "prevent".to_string()])
        );
        assert_eq!(
            split_modifiers(":[key.path].sync"),
            (":[key.path]".to_string(), vec!["sync".to_string()])
        );
        assert_eq!(split_modifiers("v-model"), ("v-model".to_string(), vec![]));
    }

    #[test]
    fn test_process_for_sets_loop_fields() {
        let mut ast = Ast::new();
        let id = element(&mut ast, "li", &[("v-for", "(item, i) in items")]);
        let mut sink = Vec::new();
        DefaultProcessor.process_for(&mut ast, id, &mut sink);

        let el = ast.element(id).unwrap();
        assert_eq!(el.for_expr.as_deref(), Some("items"));
        assert_eq!(el.alias.as_deref(), Some("item"));
        assert_eq!(el.iterator1.as_deref(), Some("i"));
        assert!(el.attrs_list.is_empty());
        assert!(el.attrs_map.contains("v-for"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_process_for_invalid_reports() {
        let mut ast = Ast::new();
        let id = element(&mut ast, "li", &[("v-for", "items")]);
        let mut sink = Vec::new();
        DefaultProcessor.process_for(&mut ast, id, &mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].code, "T106");
        assert_eq!(sink[0].message, "Invalid v-for expression: items");
    }

    #[test]
    fn test_process_element_classifies_attributes() {
        let mut ast = Ast::new();
        let id = element(
            &mut ast,
            "input",
            &[
                ("key", "k1"),
                (":value", "text | trim"),
                (":title", "title"),
                ("@input.lazy", "onInput"),
                ("v-focus:[target].once", "true"),
                ("id", "name"),
            ],
        );
        let options = CompilerOptions {
            must_use_prop: |tag, _, attr| tag == "input" && attr == "value",
            ..Default::default()
        };
        let mut sink = Vec::new();
        DefaultProcessor.process_element(&mut ast, id, &options, &mut sink);

        let el = ast.element(id).unwrap();
        assert_eq!(el.key.as_deref(), Some("\"k1\""));
        assert!(!el.plain);
        assert!(el.has_bindings);
        assert_eq!(el.props.len(), 1);
        assert_eq!(el.props[0].name, "value");
        assert_eq!(el.props[0].value, "_f(\"trim\")(text)");
        let attrs: Vec<_> = el
            .attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(attrs, vec![("title", "title"), ("id", "\"name\"")]);
        assert_eq!(el.events[0].name, "input");
        assert_eq!(el.events[0].modifiers, vec!["lazy".to_string()]);
        let dir = &el.directives[0];
        assert_eq!(dir.name, "focus");
        assert_eq!(dir.arg.as_deref(), Some("target"));
        assert!(dir.dynamic_arg);
        assert_eq!(dir.modifiers, vec!["once".to_string()]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_process_element_plain() {
        let mut ast = Ast::new();
        let id = element(&mut ast, "div", &[]);
        let mut sink = Vec::new();
        DefaultProcessor.process_element(&mut ast, id, &CompilerOptions::default(), &mut sink);
        assert!(ast.element(id).unwrap().plain);
    }

    #[test]
    fn test_static_attribute_interpolation_warns() {
        let mut ast = Ast::new();
        let id = element(&mut ast, "a", &[("href", "/users/{{ id }}")]);
        let mut sink = Vec::new();
        DefaultProcessor.process_element(&mut ast, id, &CompilerOptions::default(), &mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].code, "T105");
        assert!(sink[0].message.starts_with("href=\"/users/{{ id }}\": "));
    }
}
