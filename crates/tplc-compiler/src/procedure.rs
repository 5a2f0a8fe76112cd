//! Turning generated source text into callable render procedures.

use std::sync::Arc;

use tplc_conf::Settings;
use tplc_templates::EcmaSyntax;
use tplc_templates::SyntaxCheck;

use crate::error::ConstructError;

/// Generated source that passed the construction check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub source: String,
}

/// Environment a render procedure is executed in.
pub trait RenderContext {
    type Output;

    fn execute(&mut self, program: &Program) -> Self::Output;

    /// Result of a procedure that could not be constructed.
    fn empty(&mut self) -> Self::Output;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Procedure {
    Compiled(Arc<Program>),
    /// Stand-in for source that failed to construct. Calling it does nothing.
    Noop,
}

impl Procedure {
    pub fn call<C: RenderContext>(&self, ctx: &mut C) -> C::Output {
        match self {
            Procedure::Compiled(program) => ctx.execute(program),
            Procedure::Noop => ctx.empty(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Procedure::Noop)
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self {
            Procedure::Compiled(program) => Some(&program.source),
            Procedure::Noop => None,
        }
    }
}

/// Builds procedures from source text.
pub trait ProcedureFactory: Send + Sync {
    fn construct(&self, source: &str) -> Result<Procedure, ConstructError>;

    /// Construct a trivial procedure to find out whether runtime
    /// construction works at all in this environment.
    fn probe(&self) -> Result<(), ConstructError> {
        self.construct("return 1").map(|_| ())
    }
}

/// Accepts any source that parses as an ECMAScript function body.
#[derive(Clone, Copy, Debug)]
pub struct EcmaProcedureFactory {
    allow_runtime_compilation: bool,
    syntax: EcmaSyntax,
}

impl EcmaProcedureFactory {
    #[must_use]
    pub fn new(allow_runtime_compilation: bool) -> Self {
        Self {
            allow_runtime_compilation,
            syntax: EcmaSyntax,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.allow_runtime_compilation)
    }
}

impl Default for EcmaProcedureFactory {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProcedureFactory for EcmaProcedureFactory {
    fn construct(&self, source: &str) -> Result<Procedure, ConstructError> {
        if !self.allow_runtime_compilation {
            return Err(ConstructError::Prohibited(
                "allow_runtime_compilation is off".to_string(),
            ));
        }
        self.syntax.check_body(source)?;
        Ok(Procedure::Compiled(Arc::new(Program {
            source: source.to_string(),
        })))
    }
}
