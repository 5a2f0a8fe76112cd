use crate::ast::Ast;
use crate::ast::Element;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::error::TemplateError;
use crate::modules::Module;
use crate::options::CompilerOptions;
use crate::text::parse_text;

/// Moves `class` and `:class` off the attribute list into dedicated fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassModule;

impl Module for ClassModule {
    fn static_keys(&self) -> &[&'static str] {
        &["staticClass"]
    }

    fn transform_node(
        &self,
        ast: &mut Ast,
        el: NodeId,
        options: &CompilerOptions,
        sink: &mut dyn DiagnosticSink,
    ) {
        let Some(el) = ast.element_mut(el) else {
            return;
        };

        let static_class = el
            .get_and_remove_attr("class", false)
            .filter(|class| !class.is_empty());
        if let Some(static_class) = static_class {
            if parse_text(&static_class, options.delimiters.as_ref()).is_some() {
                let err = TemplateError::AttributeInterpolation {
                    name: "class".to_string(),
                    value: static_class.clone(),
                };
                sink.report(err.into_diagnostic(el.attr_span("class")), false);
            }
            el.static_class = Some(serde_json::Value::from(static_class).to_string());
        }

        if let Some(binding) = el
            .get_binding_attr("class", false)
            .filter(|binding| !binding.is_empty())
        {
            el.class_binding = Some(binding);
        }
    }

    fn gen_data(&self, el: &Element) -> String {
        let mut data = String::new();
        if let Some(static_class) = &el.static_class {
            data.push_str(&format!("staticClass:{static_class},"));
        }
        if let Some(class_binding) = &el.class_binding {
            data.push_str(&format!("class:{class_binding},"));
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use tplc_source::Span;

    use super::*;
    use crate::ast::Attr;

    fn transform(attrs: Vec<Attr>) -> (Element, Vec<crate::diagnostics::Diagnostic>) {
        let mut ast = Ast::new();
        let id = ast.create_element("div", attrs, None);
        let mut sink = Vec::new();
        ClassModule.transform_node(&mut ast, id, &CompilerOptions::default(), &mut sink);
        (ast.element(id).cloned().unwrap(), sink)
    }

    #[test]
    fn test_static_and_bound_class() {
        let (el, sink) = transform(vec![
            Attr::new("class", "card active"),
            Attr::new(":class", "{ open: isOpen } | classes"),
        ]);

        assert!(sink.is_empty());
        assert_eq!(el.static_class.as_deref(), Some("\"card active\""));
        assert_eq!(
            el.class_binding.as_deref(),
            Some("_f(\"classes\")({ open: isOpen })")
        );
        assert!(el.attrs_list.is_empty());
        insta::assert_snapshot!(
            ClassModule.gen_data(&el),
            @r#"staticClass:"card active",class:_f("classes")({ open: isOpen }),"#
        );
    }

    #[test]
    fn test_static_class_is_not_read_as_binding() {
        let (el, _) = transform(vec![Attr::new("class", "a")]);
        assert_eq!(el.class_binding, None);
        assert_eq!(ClassModule.gen_data(&el), "staticClass:\"a\",");
    }

    #[test]
    fn test_interpolated_class_reports() {
        let (el, sink) = transform(vec![
            Attr::new("class", "{{ active }}").with_span(Span::new(5, 20))
        ]);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].code, "T105");
        assert_eq!(sink[0].span, Some(Span::new(5, 20)));
        assert_eq!(el.static_class.as_deref(), Some("\"{{ active }}\""));
    }

    #[test]
    fn test_no_class_no_data() {
        let (el, sink) = transform(vec![Attr::new("id", "x")]);
        assert!(sink.is_empty());
        assert_eq!(ClassModule.gen_data(&el), "");
    }
}
