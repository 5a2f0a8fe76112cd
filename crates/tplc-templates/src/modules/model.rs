//! Expansion of `<input v-model>` with a dynamic `type`.
//!
//! The runtime model directive needs a static input type, so
//!
//! ```html
//! <input v-model="data[type]" :type="type">
//! ```
//!
//! becomes a conditional chain of three inputs:
//!
//! ```html
//! <input v-if="type === 'checkbox'" type="checkbox" v-model="data[type]">
//! <input v-else-if="type === 'radio'" type="radio" v-model="data[type]">
//! <input v-else :type="type" v-model="data[type]">
//! ```

use std::sync::Arc;

use crate::ast::Ast;
use crate::ast::Element;
use crate::ast::IfCondition;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::modules::Module;
use crate::options::CompilerOptions;
use crate::process::ElementProcessor;

pub struct ModelExpansion {
    processor: Arc<dyn ElementProcessor>,
}

impl ModelExpansion {
    #[must_use]
    pub fn new(processor: Arc<dyn ElementProcessor>) -> Self {
        Self { processor }
    }

    fn clone_element(ast: &mut Ast, source: &Element) -> NodeId {
        let id = ast.create_element(source.tag.clone(), source.attrs_list.clone(), source.parent);
        // keep source positions for diagnostics on the clones
        if let Some(clone) = ast.element_mut(id) {
            clone.raw_attrs_map.clone_from(&source.raw_attrs_map);
            clone.span = source.span;
        }
        id
    }

    fn set_if(ast: &mut Ast, id: NodeId, exp: String) {
        if let Some(el) = ast.element_mut(id) {
            el.if_expr = Some(exp);
        }
    }
}

/// The expression the input's `type` is bound to, if it is bound at all.
fn type_binding(el: &mut Element) -> Option<String> {
    let mut binding = None;
    if el.attrs_map.truthy(":type").is_some() || el.attrs_map.truthy("v-bind:type").is_some() {
        binding = el.get_binding_attr("type", true);
    }
    if binding.as_deref().is_none_or(str::is_empty) && el.attrs_map.truthy("type").is_none() {
        if let Some(spread) = el.attrs_map.truthy("v-bind") {
            binding = Some(format!("({spread}).type"));
        }
    }
    binding.filter(|binding| !binding.is_empty())
}

impl Module for ModelExpansion {
    fn pre_transform_node(
        &self,
        ast: &mut Ast,
        id: NodeId,
        options: &CompilerOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<NodeId> {
        let el = ast.element_mut(id)?;
        if el.tag != "input" || el.attrs_map.truthy("v-model").is_none() {
            return None;
        }
        let type_binding = type_binding(el)?;

        let if_condition = el
            .get_and_remove_attr("v-if", true)
            .filter(|cond| !cond.is_empty());
        let if_extra = if_condition
            .as_deref()
            .map(|cond| format!("&&({cond})"))
            .unwrap_or_default();
        let has_else = el.get_and_remove_attr("v-else", true).is_some();
        let else_if = el
            .get_and_remove_attr("v-else-if", true)
            .filter(|condition| !condition.is_empty());
        let source = el.clone();

        // 1. checkbox, carries the loop and anchors the chain
        let branch0 = Self::clone_element(ast, &source);
        self.processor.process_for(ast, branch0, sink);
        if let Some(el) = ast.element_mut(branch0) {
            el.add_raw_attr("type", "checkbox");
        }
        self.processor.process_element(ast, branch0, options, sink);
        let checkbox_if = format!("({type_binding})==='checkbox'{if_extra}");
        Self::set_if(ast, branch0, checkbox_if.clone());

        // 2. radio
        let branch1 = Self::clone_element(ast, &source);
        if let Some(el) = ast.element_mut(branch1) {
            el.get_and_remove_attr("v-for", true);
            el.add_raw_attr("type", "radio");
        }
        self.processor.process_element(ast, branch1, options, sink);

        // 3. anything else keeps the dynamic binding
        let branch2 = Self::clone_element(ast, &source);
        if let Some(el) = ast.element_mut(branch2) {
            el.get_and_remove_attr("v-for", true);
            el.add_raw_attr(":type", type_binding.clone());
        }
        self.processor.process_element(ast, branch2, options, sink);

        let anchor = ast.element_mut(branch0)?;
        anchor.processed = true;
        anchor.add_if_condition(IfCondition {
            exp: Some(checkbox_if),
            block: branch0,
        });
        anchor.add_if_condition(IfCondition {
            exp: Some(format!("({type_binding})==='radio'{if_extra}")),
            block: branch1,
        });
        anchor.add_if_condition(IfCondition {
            exp: if_condition,
            block: branch2,
        });

        if has_else {
            anchor.is_else = true;
        } else if let Some(else_if) = else_if {
            anchor.else_if = Some(else_if);
        }

        Some(branch0)
    }
}
