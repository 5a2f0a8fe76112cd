use tplc_source::Span;
use tplc_templates::Diagnostic;
use tplc_templates::SyntaxError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompilerError {
    #[error("Error compiling template:\n\n{details}")]
    Compile { details: String },

    #[error("Failed to generate render function:\n\n{details}")]
    Generation { details: String },

    #[error(
        "It seems you are running the template compiler in an environment that prohibits \
         runtime code construction. The template compiler cannot work in this environment. \
         Consider relaxing the policy to allow runtime code construction, or pre-compiling \
         your templates into render functions."
    )]
    RuntimeCompilationUnavailable,
}

impl CompilerError {
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            CompilerError::Compile { .. } => "C100",
            CompilerError::Generation { .. } => "C101",
            CompilerError::RuntimeCompilationUnavailable => "C102",
        }
    }

    #[must_use]
    pub fn into_diagnostic(self, span: Option<Span>) -> Diagnostic {
        Diagnostic::new(self.diagnostic_code(), self.to_string(), span)
    }
}

/// Why a procedure could not be built from generated source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    #[error("runtime code construction is disabled: {0}")]
    Prohibited(String),

    #[error("SyntaxError: {0}")]
    Syntax(#[from] SyntaxError),
}
