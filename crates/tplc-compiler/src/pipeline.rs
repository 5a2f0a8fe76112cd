//! Stages the compiler drives but does not implement itself.

use tplc_templates::Ast;
use tplc_templates::CompilerOptions;
use tplc_templates::DiagnosticSink;

/// Parses markup into an element tree, running the module hooks and
/// element processing from `options` as elements are created.
pub trait AstBuilder: Send + Sync {
    fn build(&self, template: &str, options: &CompilerOptions, sink: &mut dyn DiagnosticSink)
        -> Ast;
}

/// Marks static subtrees in place.
pub trait Optimizer: Send + Sync {
    fn optimize(&self, ast: &mut Ast, options: &CompilerOptions);
}

pub trait CodeGenerator: Send + Sync {
    fn generate(&self, ast: &Ast, options: &CompilerOptions) -> GeneratedCode;
}

/// Procedure source text produced by a [`CodeGenerator`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub render: String,
    pub static_render_fns: Vec<String>,
}
