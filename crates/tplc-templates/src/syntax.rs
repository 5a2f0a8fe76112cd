use swc_core::common::sync::Lrc;
use swc_core::common::FileName;
use swc_core::common::SourceMap;
use swc_core::ecma::ast::EsVersion;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::EsSyntax;
use swc_core::ecma::parser::Parser;
use swc_core::ecma::parser::StringInput;
use swc_core::ecma::parser::Syntax;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
}

/// Attempt-compile primitive for expression validation.
///
/// Implementations only answer "would this compile"; they never evaluate.
pub trait SyntaxCheck: Send + Sync {
    /// Check `body` as the body of a function taking no parameters.
    fn check_body(&self, body: &str) -> Result<(), SyntaxError>;

    /// Check `params` as the parameter list of an empty function.
    fn check_params(&self, params: &str) -> Result<(), SyntaxError>;
}

/// ECMAScript syntax check backed by the `swc` parser.
///
/// Code is wrapped in the same anonymous function shape a runtime
/// `Function` constructor would produce, then parsed as a script. Errors
/// the parser recovers from still count as failures.
#[derive(Clone, Copy, Debug, Default)]
pub struct EcmaSyntax;

impl EcmaSyntax {
    fn check_function(params: &str, body: &str) -> Result<(), SyntaxError> {
        let source = format!("(function anonymous({params}\n) {{\n{body}\n}})");

        let cm: Lrc<SourceMap> = Lrc::default();
        let fm = cm.new_source_file(FileName::Anon.into(), source);
        let lexer = Lexer::new(
            Syntax::Es(EsSyntax::default()),
            EsVersion::latest(),
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let result = parser.parse_script();
        let mut errors = parser.take_errors();
        match result {
            Err(err) => Err(SyntaxError {
                message: err.kind().msg().into_owned(),
            }),
            Ok(_) if !errors.is_empty() => Err(SyntaxError {
                message: errors.remove(0).kind().msg().into_owned(),
            }),
            Ok(_) => Ok(()),
        }
    }
}

impl SyntaxCheck for EcmaSyntax {
    fn check_body(&self, body: &str) -> Result<(), SyntaxError> {
        Self::check_function("", body)
    }

    fn check_params(&self, params: &str) -> Result<(), SyntaxError> {
        Self::check_function(params, "")
    }
}
