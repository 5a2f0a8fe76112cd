//! Template expression and directive front-end.
//!
//! This crate holds the pieces of the template compiler that deal with
//! expressions embedded in markup:
//!
//! - [`filters`]: pipe filters (`value | format`) rewritten into nested calls
//! - [`text`]: interpolation (`{{ value }}`) tokenizing
//! - [`validation`]: safety checks over every expression in a finished tree
//! - [`modules`]: per-element compiler hooks, including the `v-model`
//!   expansion for inputs with a dynamic `type`
//!
//! The tree itself ([`Ast`]) comes from an upstream markup parser; this
//! crate only reads and rewrites it.
//!
//! ## Adding a new diagnostic
//!
//! 1. Add the variant to [`TemplateError`] with the next free `T1xx` code
//! 2. Report it through a [`DiagnosticSink`]
//! 3. Add corresponding tests

pub mod ast;
mod diagnostics;
mod directives;
mod error;
pub mod filters;
pub mod modules;
mod options;
mod process;
mod syntax;
pub mod text;
pub mod validation;

pub use ast::Ast;
pub use ast::Attr;
pub use ast::AttrBinding;
pub use ast::DirectiveBinding;
pub use ast::Element;
pub use ast::EventBinding;
pub use ast::IfCondition;
pub use ast::Node;
pub use ast::NodeId;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::Diagnostics;
pub use directives::HtmlDirective;
pub use directives::TextDirective;
pub use error::TemplateError;
pub use filters::parse_filters;
pub use filters::FilterExpression;
pub use modules::Module;
pub use options::CompilerOptions;
pub use options::DirectiveHandler;
pub use options::DirectiveMap;
pub use options::MustUseProp;
pub use process::parse_for;
pub use process::ForParse;
pub use process::DefaultProcessor;
pub use process::ElementProcessor;
pub use syntax::EcmaSyntax;
pub use syntax::SyntaxCheck;
pub use syntax::SyntaxError;
pub use text::parse_text;
pub use text::Delimiters;
pub use text::RawToken;
pub use text::TextParse;
pub use validation::ExpressionValidator;
