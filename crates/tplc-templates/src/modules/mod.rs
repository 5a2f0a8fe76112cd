//! Compiler modules: per-element hooks run while the tree is built.

mod class;
mod model;

use std::sync::Arc;

pub use class::ClassModule;
pub use model::ModelExpansion;

use crate::ast::Ast;
use crate::ast::Element;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::options::CompilerOptions;

pub trait Module: Send + Sync {
    /// Data keys this module emits that never change between renders.
    fn static_keys(&self) -> &[&'static str] {
        &[]
    }

    /// Runs before the element's attributes are processed. Returning an id
    /// replaces the element with that node.
    fn pre_transform_node(
        &self,
        _ast: &mut Ast,
        _el: NodeId,
        _options: &CompilerOptions,
        _sink: &mut dyn DiagnosticSink,
    ) -> Option<NodeId> {
        None
    }

    fn transform_node(
        &self,
        _ast: &mut Ast,
        _el: NodeId,
        _options: &CompilerOptions,
        _sink: &mut dyn DiagnosticSink,
    ) {
    }

    /// Fields contributed to the element's generated data object, each
    /// followed by a comma.
    fn gen_data(&self, _el: &Element) -> String {
        String::new()
    }
}

#[must_use]
pub fn gen_static_keys(modules: &[Arc<dyn Module>]) -> String {
    modules
        .iter()
        .flat_map(|module| module.static_keys().iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::DefaultProcessor;

    struct Keyed;

    impl Module for Keyed {
        fn static_keys(&self) -> &[&'static str] {
            &["staticStyle", "staticAttrs"]
        }
    }

    #[test]
    fn test_gen_static_keys_in_module_order() {
        let modules: Vec<Arc<dyn Module>> = vec![
            Arc::new(ClassModule),
            Arc::new(ModelExpansion::new(Arc::new(DefaultProcessor))),
            Arc::new(Keyed),
        ];
        assert_eq!(
            gen_static_keys(&modules),
            "staticClass,staticStyle,staticAttrs"
        );
    }

    #[test]
    fn test_gen_static_keys_empty() {
        assert_eq!(gen_static_keys(&[]), "");
    }
}
