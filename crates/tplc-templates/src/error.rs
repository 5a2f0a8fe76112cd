use thiserror::Error;
use tplc_source::Span;

use crate::diagnostics::Diagnostic;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A bound expression or interpolation does not compile.
    #[error("invalid expression: {message} in\n\n    {expression}\n\n  Raw expression: {raw}\n")]
    InvalidExpression {
        message: String,
        expression: String,
        raw: String,
    },

    /// A reserved word is used where an identifier or member name is
    /// expected, e.g. `item.new` or `{{ class }}`. `typeof`, `instanceof`
    /// and `in` are operators and never reported.
    #[error("avoid using JavaScript keyword as property name: \"{keyword}\"\n  Raw expression: {raw}")]
    ProhibitedKeyword { keyword: String, raw: String },

    /// An event handler calls `delete`, `typeof` or `void` like a method,
    /// e.g. `@click="list.delete(item)"`.
    #[error("avoid using JavaScript unary operator as property name: \"{operator}\" in expression {raw}")]
    UnaryOperator { operator: String, raw: String },

    /// A `v-for` alias or iterator is not a valid binding name.
    #[error("invalid {role} \"{ident}\" in expression: {raw}")]
    InvalidIdentifier {
        role: &'static str,
        ident: String,
        raw: String,
    },

    /// A slot scope does not compile as a function parameter list.
    #[error("invalid function parameter expression: {message} in\n\n    {expression}\n\n  Raw expression: {raw}\n")]
    InvalidParameters {
        message: String,
        expression: String,
        raw: String,
    },

    /// A static attribute contains an interpolation, which is never
    /// evaluated.
    #[error("{name}=\"{value}\": Interpolation inside attributes has been removed. Use v-bind or the colon shorthand instead. For example, instead of <div {name}=\"{{{{ val }}}}\">, use <div :{name}=\"val\">.")]
    AttributeInterpolation { name: String, value: String },

    #[error("Invalid v-for expression: {expression}")]
    InvalidFor { expression: String },
}

impl TemplateError {
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            TemplateError::InvalidExpression { .. } => "T100",
            TemplateError::ProhibitedKeyword { .. } => "T101",
            TemplateError::UnaryOperator { .. } => "T102",
            TemplateError::InvalidIdentifier { .. } => "T103",
            TemplateError::InvalidParameters { .. } => "T104",
            TemplateError::AttributeInterpolation { .. } => "T105",
            TemplateError::InvalidFor { .. } => "T106",
        }
    }

    #[must_use]
    pub fn into_diagnostic(self, span: Option<Span>) -> Diagnostic {
        Diagnostic::new(self.diagnostic_code(), self.to_string(), span)
    }
}
