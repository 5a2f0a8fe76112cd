use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tplc_conf::Settings;
use tplc_templates::CompilerOptions;
use tplc_templates::Delimiters;
use tplc_templates::DiagnosticSink;
use tplc_templates::DirectiveHandler;
use tplc_templates::DirectiveMap;
use tplc_templates::Module;

/// Per-call options. Unset fields fall back to the compiler's base options.
#[derive(Default)]
pub struct CompileOptions {
    pub delimiters: Option<Delimiters>,
    /// Run after the base modules.
    pub modules: Vec<Arc<dyn Module>>,
    /// Shadow base directives of the same name.
    pub directives: FxHashMap<String, Arc<dyn DirectiveHandler>>,
    pub preserve_whitespace: Option<bool>,
    pub comments: Option<bool>,
    pub output_source_range: Option<bool>,
    pub optimize: Option<bool>,
    /// Receives compile reports from `compile_to_functions`. Defaults to
    /// logging them.
    pub warn: Option<Box<dyn DiagnosticSink>>,
}

impl CompileOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delimiters: settings
                .delimiters
                .as_ref()
                .map(|[open, close]| Delimiters::new(open.clone(), close.clone())),
            preserve_whitespace: Some(settings.preserve_whitespace),
            comments: Some(settings.comments),
            output_source_range: Some(settings.output_source_range),
            optimize: Some(settings.optimize),
            ..Default::default()
        }
    }

    /// Layer these options over `base` into a fresh set for one compilation.
    #[must_use]
    pub fn resolve(&self, base: &CompilerOptions) -> CompilerOptions {
        let mut merged = base.clone();

        if !self.modules.is_empty() {
            let modules = base
                .modules
                .iter()
                .chain(&self.modules)
                .map(Arc::clone)
                .collect();
            merged = merged.with_modules(modules);
        }

        if !self.directives.is_empty() {
            let mut directives = DirectiveMap::overlay(Arc::clone(&base.directives));
            for (name, handler) in &self.directives {
                directives.insert(name.clone(), Arc::clone(handler));
            }
            merged.directives = Arc::new(directives);
        }

        if let Some(delimiters) = &self.delimiters {
            merged.delimiters = Some(delimiters.clone());
        }
        if let Some(preserve_whitespace) = self.preserve_whitespace {
            merged.preserve_whitespace = preserve_whitespace;
        }
        if let Some(comments) = self.comments {
            merged.comments = comments;
        }
        if let Some(output_source_range) = self.output_source_range {
            merged.output_source_range = output_source_range;
        }
        if let Some(optimize) = self.optimize {
            merged.optimize = optimize;
        }

        merged
    }

    /// Cache key for `template` compiled with these options.
    #[must_use]
    pub fn cache_key(&self, template: &str) -> String {
        match &self.delimiters {
            Some(delimiters) => format!("{delimiters}{template}"),
            None => template.to_string(),
        }
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut directives: Vec<_> = self.directives.keys().collect();
        directives.sort();
        f.debug_struct("CompileOptions")
            .field("delimiters", &self.delimiters)
            .field("modules", &self.modules.len())
            .field("directives", &directives)
            .field("preserve_whitespace", &self.preserve_whitespace)
            .field("comments", &self.comments)
            .field("output_source_range", &self.output_source_range)
            .field("optimize", &self.optimize)
            .field("warn", &self.warn.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tplc_templates::Ast;
    use tplc_templates::DirectiveBinding;
    use tplc_templates::Element;
    use tplc_templates::NodeId;

    use super::*;

    struct Named(&'static str);

    impl Module for Named {
        fn static_keys(&self) -> &[&'static str] {
            std::slice::from_ref(&self.0)
        }

        fn transform_node(
            &self,
            ast: &mut Ast,
            el: NodeId,
            _options: &CompilerOptions,
            _sink: &mut dyn DiagnosticSink,
        ) {
            if let Some(el) = ast.element_mut(el) {
                el.tag.push_str(self.0);
            }
        }
    }

    struct Keep;

    impl DirectiveHandler for Keep {
        fn apply(
            &self,
            _el: &mut Element,
            _dir: &DirectiveBinding,
            _sink: &mut dyn DiagnosticSink,
        ) -> bool {
            true
        }
    }

    fn base() -> CompilerOptions {
        let mut directives = DirectiveMap::new();
        directives.insert("text", Arc::new(Keep));
        CompilerOptions {
            directives: Arc::new(directives),
            ..Default::default()
        }
        .with_modules(vec![Arc::new(Named("a"))])
    }

    #[test]
    fn test_modules_run_base_first() {
        let options = CompileOptions {
            modules: vec![Arc::new(Named("b"))],
            ..Default::default()
        };
        let merged = options.resolve(&base());
        assert_eq!(merged.modules.len(), 2);
        assert_eq!(merged.static_keys, "a,b");

        let mut ast = Ast::new();
        let id = ast.create_element("x-", vec![], None);
        let mut sink = Vec::new();
        merged.transform(&mut ast, id, &mut sink);
        assert_eq!(ast.element(id).unwrap().tag, "x-ab");
    }

    #[test]
    fn test_directives_overlay_leaves_base_untouched() {
        let base = base();
        let mut directives: FxHashMap<String, Arc<dyn DirectiveHandler>> = FxHashMap::default();
        directives.insert("focus".to_string(), Arc::new(Keep));
        let options = CompileOptions {
            directives,
            ..Default::default()
        };

        let merged = options.resolve(&base);
        assert_eq!(merged.directives.names(), vec!["focus", "text"]);
        assert_eq!(base.directives.names(), vec!["text"]);
    }

    #[test]
    fn test_call_values_win() {
        let options = CompileOptions {
            delimiters: Some(Delimiters::new("${", "}")),
            optimize: Some(false),
            output_source_range: Some(true),
            ..Default::default()
        };
        let merged = options.resolve(&base());
        assert_eq!(merged.delimiters, Some(Delimiters::new("${", "}")));
        assert!(!merged.optimize);
        assert!(merged.output_source_range);
        assert!(merged.preserve_whitespace);
        assert_eq!(merged.static_keys, "a");
    }

    #[test]
    fn test_empty_call_options_keep_base() {
        let base = base();
        let merged = CompileOptions::default().resolve(&base);
        assert!(Arc::ptr_eq(&merged.directives, &base.directives));
        assert_eq!(merged.modules.len(), 1);
    }

    #[test]
    fn test_cache_key() {
        let plain = CompileOptions::default();
        assert_eq!(plain.cache_key("<p>{{ a }}</p>"), "<p>{{ a }}</p>");

        let custom = CompileOptions {
            delimiters: Some(Delimiters::new("[[", "]]")),
            ..Default::default()
        };
        insta::assert_snapshot!(custom.cache_key("<p>[[ a ]]</p>"), @"[[,]]<p>[[ a ]]</p>");
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::default();
        let options = CompileOptions::from_settings(&settings);
        assert_eq!(options.delimiters, None);
        assert_eq!(options.optimize, Some(true));
        assert_eq!(options.preserve_whitespace, Some(true));
        assert_eq!(options.comments, Some(false));
        assert_eq!(options.output_source_range, Some(false));
    }
}
