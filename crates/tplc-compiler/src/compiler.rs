use std::sync::Arc;
use std::sync::Once;

use tplc_conf::Settings;
use tplc_source::DiagnosticRenderer;
use tplc_source::Severity;
use tplc_templates::Ast;
use tplc_templates::CompilerOptions;
use tplc_templates::Diagnostic;
use tplc_templates::DiagnosticSink;
use tplc_templates::Diagnostics;
use tplc_templates::EcmaSyntax;
use tplc_templates::ExpressionValidator;
use tplc_templates::SyntaxCheck;

use crate::cache::MemoryCache;
use crate::cache::TemplateCache;
use crate::error::CompilerError;
use crate::error::ConstructError;
use crate::options::CompileOptions;
use crate::pipeline::AstBuilder;
use crate::pipeline::CodeGenerator;
use crate::pipeline::Optimizer;
use crate::procedure::EcmaProcedureFactory;
use crate::procedure::Procedure;
use crate::procedure::ProcedureFactory;

/// Output of [`Compiler::compile`].
#[derive(Clone, Debug)]
pub struct CompiledResult {
    pub ast: Ast,
    pub render: String,
    pub static_render_fns: Vec<String>,
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

/// Materialized procedures for one template, shared through the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledFunctions {
    pub render: Procedure,
    pub static_render_fns: Vec<Procedure>,
}

/// Default report sink: errors become WARN events, tips INFO events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic, advisory: bool) {
        if advisory {
            tracing::info!(code = diagnostic.code, "{}", diagnostic.message);
        } else {
            tracing::warn!(code = diagnostic.code, "{}", diagnostic.message);
        }
    }
}

/// Drives the build, optimize and generate stages over a set of base
/// options and turns the generated source into cached procedures.
pub struct Compiler {
    base: CompilerOptions,
    builder: Arc<dyn AstBuilder>,
    optimizer: Option<Arc<dyn Optimizer>>,
    codegen: Arc<dyn CodeGenerator>,
    syntax: Arc<dyn SyntaxCheck>,
    factory: Arc<dyn ProcedureFactory>,
    cache: Arc<dyn TemplateCache>,
    probe: Once,
}

impl Compiler {
    #[must_use]
    pub fn new(
        base: CompilerOptions,
        builder: Arc<dyn AstBuilder>,
        codegen: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            base,
            builder,
            optimizer: None,
            codegen,
            syntax: Arc::new(EcmaSyntax),
            factory: Arc::new(EcmaProcedureFactory::default()),
            cache: Arc::new(MemoryCache::new()),
            probe: Once::new(),
        }
    }

    /// Fold project settings into the base options and pick the procedure
    /// factory they call for.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.base = CompileOptions::from_settings(settings).resolve(&self.base);
        self.factory = Arc::new(EcmaProcedureFactory::from_settings(settings));
        self
    }

    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Arc<dyn Optimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Arc<dyn SyntaxCheck>) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn ProcedureFactory>) -> Self {
        self.factory = factory;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn base_options(&self) -> &CompilerOptions {
        &self.base
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn TemplateCache> {
        &self.cache
    }

    /// Compile `template` to procedure source. Never fails: problems with
    /// the template come back as diagnostics next to a best-effort result.
    #[must_use]
    pub fn compile(&self, template: &str, options: &CompileOptions) -> CompiledResult {
        let options = options.resolve(&self.base);

        let trimmed = template.trim();
        let leading = template.len() - template.trim_start().len();
        let leading = u32::try_from(leading).unwrap_or(u32::MAX);
        let mut diagnostics = Diagnostics::new(options.output_source_range, leading);

        tracing::debug!(bytes = trimmed.len(), "compiling template");

        let mut ast = self.builder.build(trimmed, &options, &mut diagnostics);
        if options.optimize {
            if let Some(optimizer) = &self.optimizer {
                optimizer.optimize(&mut ast, &options);
            }
        }
        let code = self.codegen.generate(&ast, &options);

        ExpressionValidator::new(self.syntax.as_ref()).detect_errors(&ast, &mut diagnostics);

        let (errors, tips) = diagnostics.into_parts();
        tracing::debug!(errors = errors.len(), tips = tips.len(), "compiled template");

        CompiledResult {
            ast,
            render: code.render,
            static_render_fns: code.static_render_fns,
            errors,
            tips,
        }
    }

    /// Compile `template` and materialize its procedures, reusing a cached
    /// result for the same delimiters and source.
    pub fn compile_to_functions(
        &self,
        template: &str,
        mut options: CompileOptions,
    ) -> Arc<CompiledFunctions> {
        let mut fallback = TracingSink;
        let mut warn = options.warn.take();
        let sink: &mut dyn DiagnosticSink = match warn.as_deref_mut() {
            Some(sink) => sink,
            None => &mut fallback,
        };

        self.probe.call_once(|| {
            if let Err(ConstructError::Prohibited(reason)) = self.factory.probe() {
                tracing::debug!(%reason, "runtime compilation unavailable");
                sink.report(
                    CompilerError::RuntimeCompilationUnavailable.into_diagnostic(None),
                    true,
                );
            }
        });

        let key = options.cache_key(template);
        if let Some(functions) = self.cache.get(&key) {
            tracing::trace!("template cache hit");
            return functions;
        }
        tracing::trace!("template cache miss");

        let compiled = self.compile(template, &options);
        let output_source_range = options
            .output_source_range
            .unwrap_or(self.base.output_source_range);
        report_errors(template, &compiled.errors, output_source_range, sink);
        for tip in compiled.tips {
            sink.report(tip, true);
        }

        let mut failures = Vec::new();
        let render = self.materialize(&compiled.render, &mut failures);
        let static_render_fns = compiled
            .static_render_fns
            .iter()
            .map(|source| self.materialize(source, &mut failures))
            .collect();

        // compile errors usually explain a failed construction already
        if compiled.errors.is_empty() && !failures.is_empty() {
            let details = failures
                .iter()
                .map(|(err, source)| format!("{err} in\n\n{source}\n"))
                .collect::<Vec<_>>()
                .join("\n");
            sink.report(CompilerError::Generation { details }.into_diagnostic(None), false);
        }

        let functions = Arc::new(CompiledFunctions {
            render,
            static_render_fns,
        });
        self.cache.insert(key, Arc::clone(&functions));
        functions
    }

    fn materialize(
        &self,
        source: &str,
        failures: &mut Vec<(ConstructError, String)>,
    ) -> Procedure {
        match self.factory.construct(source) {
            Ok(procedure) => procedure,
            Err(err) => {
                tracing::debug!(error = %err, "failed to construct procedure");
                failures.push((err, source.to_string()));
                Procedure::Noop
            }
        }
    }
}

fn report_errors(
    template: &str,
    errors: &[Diagnostic],
    output_source_range: bool,
    sink: &mut dyn DiagnosticSink,
) {
    if errors.is_empty() {
        return;
    }

    if output_source_range {
        let renderer = DiagnosticRenderer::plain();
        for error in errors {
            let details = match error.span {
                Some(span) => {
                    let title = error.message.lines().next().unwrap_or_default();
                    let frame = renderer.render(&tplc_source::Diagnostic::new(
                        template,
                        "template",
                        error.code,
                        title,
                        Severity::Error,
                        span,
                        "",
                    ));
                    format!("{}\n\n{frame}", error.message)
                }
                None => error.message.clone(),
            };
            sink.report(
                CompilerError::Compile { details }.into_diagnostic(error.span),
                false,
            );
        }
    } else {
        let listing = errors
            .iter()
            .map(|error| format!("- {}", error.message))
            .collect::<Vec<_>>()
            .join("\n");
        let details = format!("{template}\n\n{listing}\n");
        sink.report(CompilerError::Compile { details }.into_diagnostic(None), false);
    }
}
