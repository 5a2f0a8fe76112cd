//! Template compilation orchestration.
//!
//! [`Compiler`] merges per-call [`CompileOptions`] over its base options,
//! runs the external build, optimize and generate stages, validates every
//! expression in the resulting tree and turns generated source into
//! [`Procedure`]s. Materialized templates are cached per delimiter pair
//! and source text.

mod cache;
mod compiler;
mod error;
mod options;
mod pipeline;
mod procedure;
pub mod web;

pub use cache::MemoryCache;
pub use cache::TemplateCache;
pub use compiler::CompiledFunctions;
pub use compiler::CompiledResult;
pub use compiler::Compiler;
pub use compiler::TracingSink;
pub use error::CompilerError;
pub use error::ConstructError;
pub use options::CompileOptions;
pub use pipeline::AstBuilder;
pub use pipeline::CodeGenerator;
pub use pipeline::GeneratedCode;
pub use pipeline::Optimizer;
pub use procedure::EcmaProcedureFactory;
pub use procedure::Procedure;
pub use procedure::ProcedureFactory;
pub use procedure::Program;
pub use procedure::RenderContext;
