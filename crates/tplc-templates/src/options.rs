use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::Ast;
use crate::ast::DirectiveBinding;
use crate::ast::Element;
use crate::ast::NodeId;
use crate::diagnostics::DiagnosticSink;
use crate::modules::gen_static_keys;
use crate::modules::Module;
use crate::text::Delimiters;

/// Decides whether a bound attribute must be set as a DOM property.
/// Arguments are the tag, the static `type` attribute and the attribute name.
pub type MustUseProp = fn(&str, Option<&str>, &str) -> bool;

fn no_prop(_tag: &str, _type_attr: Option<&str>, _attr: &str) -> bool {
    false
}

/// Compile-time handler for a named directive such as `v-text`.
pub trait DirectiveHandler: Send + Sync {
    /// Apply the directive to `el`. Returns `true` when the directive still
    /// needs runtime handling.
    fn apply(&self, el: &mut Element, dir: &DirectiveBinding, sink: &mut dyn DiagnosticSink)
        -> bool;
}

/// Directive name to handler, layered over an optional shared base map.
///
/// Lookups fall back to the base; inserting only ever touches this layer,
/// so a base shared between compilers is never modified.
#[derive(Default)]
pub struct DirectiveMap {
    own: FxHashMap<String, Arc<dyn DirectiveHandler>>,
    base: Option<Arc<DirectiveMap>>,
}

impl DirectiveMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn overlay(base: Arc<DirectiveMap>) -> Self {
        Self {
            own: FxHashMap::default(),
            base: Some(base),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn DirectiveHandler>) {
        self.own.insert(name.into(), handler);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DirectiveHandler>> {
        self.own
            .get(name)
            .or_else(|| self.base.as_ref().and_then(|base| base.get(name)))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All visible directive names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names = self
            .base
            .as_ref()
            .map(|base| base.names())
            .unwrap_or_default();
        names.extend(self.own.keys().cloned());
        names.sort();
        names.dedup();
        names
    }
}

impl fmt::Debug for DirectiveMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Fully merged options for one compilation.
#[derive(Clone)]
pub struct CompilerOptions {
    pub delimiters: Option<Delimiters>,
    /// Run in order during tree transforms.
    pub modules: Vec<Arc<dyn Module>>,
    pub directives: Arc<DirectiveMap>,
    pub must_use_prop: MustUseProp,
    pub preserve_whitespace: bool,
    pub comments: bool,
    pub output_source_range: bool,
    pub optimize: bool,
    /// Comma separated data keys the optimizer may treat as static.
    pub static_keys: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            delimiters: None,
            modules: Vec::new(),
            directives: Arc::new(DirectiveMap::new()),
            must_use_prop: no_prop,
            preserve_whitespace: true,
            comments: false,
            output_source_range: false,
            optimize: true,
            static_keys: String::new(),
        }
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("delimiters", &self.delimiters)
            .field("modules", &self.modules.len())
            .field("directives", &self.directives)
            .field("preserve_whitespace", &self.preserve_whitespace)
            .field("comments", &self.comments)
            .field("output_source_range", &self.output_source_range)
            .field("optimize", &self.optimize)
            .field("static_keys", &self.static_keys)
            .finish_non_exhaustive()
    }
}

impl CompilerOptions {
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<Arc<dyn Module>>) -> Self {
        self.static_keys = gen_static_keys(&modules);
        self.modules = modules;
        self
    }

    /// Run every module's pre-transform on `el`. A module may replace the
    /// element; later modules see the replacement. Returns the element that
    /// should take the original's place.
    pub fn pre_transform(
        &self,
        ast: &mut Ast,
        el: NodeId,
        sink: &mut dyn DiagnosticSink,
    ) -> NodeId {
        self.modules.iter().fold(el, |current, module| {
            module
                .pre_transform_node(ast, current, self, sink)
                .unwrap_or(current)
        })
    }

    pub fn transform(&self, ast: &mut Ast, el: NodeId, sink: &mut dyn DiagnosticSink) {
        for module in &self.modules {
            module.transform_node(ast, el, self, sink);
        }
    }

    /// Data object fields contributed by the modules for `el`.
    #[must_use]
    pub fn gen_data(&self, el: &Element) -> String {
        self.modules.iter().map(|module| module.gen_data(el)).collect()
    }

    /// Apply the compile-time handlers for the directives on `el` and
    /// return the directives that still need runtime handling.
    pub fn apply_directives(
        &self,
        el: &mut Element,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<DirectiveBinding> {
        let directives = el.directives.clone();
        directives
            .into_iter()
            .filter(|dir| match self.directives.get(&dir.name) {
                Some(handler) => handler.apply(el, dir, sink),
                None => true,
            })
            .collect()
    }
}
