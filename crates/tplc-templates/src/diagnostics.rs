use serde::Serialize;
use tplc_source::Span;

/// A compile-time diagnostic with a stable code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }
}

/// Receiver for diagnostics produced while compiling.
///
/// `advisory` diagnostics are tips: they never indicate a broken template.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic, advisory: bool);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic, _advisory: bool) {
        self.push(diagnostic);
    }
}

/// Collects diagnostics into separate error and tip lists.
///
/// Spans are kept only when source ranges are requested. They are shifted
/// by the leading whitespace that was trimmed off the template, so they
/// point into the template as the caller passed it.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    tips: Vec<Diagnostic>,
    output_source_range: bool,
    leading_whitespace: u32,
}

impl Diagnostics {
    #[must_use]
    pub fn new(output_source_range: bool, leading_whitespace: u32) -> Self {
        Self {
            output_source_range,
            leading_whitespace,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    #[must_use]
    pub fn tips(&self) -> &[Diagnostic] {
        &self.tips
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.tips)
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, mut diagnostic: Diagnostic, advisory: bool) {
        diagnostic.span = if self.output_source_range {
            diagnostic
                .span
                .map(|span| span.shifted(self.leading_whitespace))
        } else {
            None
        };
        if advisory {
            self.tips.push(diagnostic);
        } else {
            self.errors.push(diagnostic);
        }
    }
}
