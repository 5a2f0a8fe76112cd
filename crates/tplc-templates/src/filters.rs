//! Pipe filter parsing for binding expressions.
//!
//! `message | capitalize | truncate(10)` is rewritten into nested runtime
//! filter lookups: `_f("truncate")(_f("capitalize")(message),10)`. Pipes
//! that sit inside string, template or regex literals, or inside any
//! bracket nesting, never split the expression, and `||` is left alone.

use serde::Serialize;

/// Name of the runtime helper that resolves a filter by name.
pub const RESOLVE_FILTER: &str = "_f";

/// Name of the runtime helper that stringifies an interpolated value.
pub const TO_DISPLAY_STRING: &str = "_s";

/// One filter invocation in a pipe chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterCall {
    pub name: String,
    /// Raw source after the opening parenthesis, closing parenthesis
    /// included, e.g. `10, 'x')`. `None` when the filter has no call syntax.
    pub args: Option<String>,
}

impl FilterCall {
    fn from_spec(spec: &str) -> Self {
        match spec.find('(') {
            Some(paren) => Self {
                name: spec[..paren].to_string(),
                args: Some(spec[paren + 1..].to_string()),
            },
            None => Self {
                name: spec.to_string(),
                args: None,
            },
        }
    }

    fn wrap(&self, exp: &str) -> String {
        match self.args.as_deref() {
            None | Some(")") => format!("{RESOLVE_FILTER}(\"{}\")({exp})", self.name),
            Some(args) => format!("{RESOLVE_FILTER}(\"{}\")({exp},{args}", self.name),
        }
    }
}

/// A base expression plus the filters applied to it, left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterExpression {
    pub base: String,
    pub filters: Vec<FilterCall>,
}

#[derive(Default)]
struct ScanState {
    in_single: bool,
    in_double: bool,
    in_template: bool,
    in_regex: bool,
    curly: i32,
    square: i32,
    paren: i32,
}

impl ScanState {
    fn is_nested(&self) -> bool {
        self.curly != 0 || self.square != 0 || self.paren != 0
    }
}

impl FilterExpression {
    #[must_use]
    pub fn parse(exp: &str) -> Self {
        let bytes = exp.as_bytes();
        let mut state = ScanState::default();
        let mut base: Option<String> = None;
        let mut specs: Vec<&str> = Vec::new();
        let mut last_filter_index = 0;
        let mut prev: Option<u8> = None;

        for (i, &c) in bytes.iter().enumerate() {
            let escaped = prev == Some(b'\\');
            prev = Some(c);

            if state.in_single {
                if c == b'\'' && !escaped {
                    state.in_single = false;
                }
            } else if state.in_double {
                if c == b'"' && !escaped {
                    state.in_double = false;
                }
            } else if state.in_template {
                if c == b'`' && !escaped {
                    state.in_template = false;
                }
            } else if state.in_regex {
                if c == b'/' && !escaped {
                    state.in_regex = false;
                }
            } else if c == b'|'
                && bytes.get(i + 1) != Some(&b'|')
                && (i == 0 || bytes[i - 1] != b'|')
                && !state.is_nested()
            {
                if base.is_none() {
                    base = Some(exp[..i].trim().to_string());
                } else {
                    specs.push(exp[last_filter_index..i].trim());
                }
                last_filter_index = i + 1;
            } else {
                match c {
                    b'"' => state.in_double = true,
                    b'\'' => state.in_single = true,
                    b'`' => state.in_template = true,
                    b'(' => state.paren += 1,
                    b')' => state.paren -= 1,
                    b'[' => state.square += 1,
                    b']' => state.square -= 1,
                    b'{' => state.curly += 1,
                    b'}' => state.curly -= 1,
                    b'/' => {
                        if starts_regex(&bytes[..i]) {
                            state.in_regex = true;
                        }
                    }
                    _ => {}
                }
            }
        }

        match base {
            None => Self {
                base: exp.trim().to_string(),
                filters: Vec::new(),
            },
            Some(base) => {
                specs.push(exp[last_filter_index..].trim());
                Self {
                    base,
                    filters: specs.into_iter().map(FilterCall::from_spec).collect(),
                }
            }
        }
    }

    /// Render the chain as nested filter calls, innermost first.
    #[must_use]
    pub fn to_source(&self) -> String {
        self.filters
            .iter()
            .fold(self.base.clone(), |exp, filter| filter.wrap(&exp))
    }
}

/// A `/` opens a regex literal unless the nearest non-space byte before it
/// could end an operand (identifier, number, `)`, `]`, `.`, `+`, `-`, `$`).
/// This is a lookback heuristic, not a tokenizer, so some divisions are
/// still taken for regex starts.
fn starts_regex(before: &[u8]) -> bool {
    match before.iter().rev().find(|&&b| b != b' ') {
        None => true,
        Some(&p) => !(p.is_ascii_alphanumeric() || b"_).+-$]".contains(&p)),
    }
}

/// Rewrite every top-level filter pipe in `exp` into nested filter calls.
#[must_use]
pub fn parse_filters(exp: &str) -> String {
    FilterExpression::parse(exp).to_source()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_trims_input() {
        assert_eq!(parse_filters("  message  "), "message");
    }

    #[test]
    fn test_single_filter() {
        assert_eq!(parse_filters("message | upper"), "_f(\"upper\")(message)");
    }

    #[test]
    fn test_chained_filters_nest_left_to_right() {
        insta::assert_snapshot!(
            parse_filters("a | f | g(x)"),
            @r#"_f("g")(_f("f")(a),x)"#
        );
    }

    #[test]
    fn test_filter_with_empty_args() {
        assert_eq!(parse_filters("a | f()"), "_f(\"f\")(a)");
    }

    #[test]
    fn test_filter_with_multiple_args() {
        insta::assert_snapshot!(
            parse_filters("price | currency('$', 2)"),
            @r#"_f("currency")(price,'$', 2)"#
        );
    }

    #[test]
    fn test_logical_or_is_not_a_pipe() {
        assert_eq!(parse_filters("a || b"), "a || b");
        assert_eq!(parse_filters("a || b | f"), "_f(\"f\")(a || b)");
    }

    #[test]
    fn test_pipe_in_string_literals() {
        insta::assert_snapshot!(
            parse_filters("'a|b' + c | upper"),
            @r#"_f("upper")('a|b' + c)"#
        );
        assert_eq!(parse_filters("\"a|b\""), "\"a|b\"");
        assert_eq!(parse_filters("`a|${b}`"), "`a|${b}`");
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        assert_eq!(parse_filters(r"'it\'s|here' | f"), r#"_f("f")('it\'s|here')"#);
    }

    #[test]
    fn test_pipe_inside_nesting() {
        assert_eq!(parse_filters("fn(a | b)"), "fn(a | b)");
        assert_eq!(parse_filters("list[a | b]"), "list[a | b]");
        assert_eq!(parse_filters("{ a: b | c }"), "{ a: b | c }");
        assert_eq!(parse_filters("fn(a | b) | f"), "_f(\"f\")(fn(a | b))");
    }

    #[test]
    fn test_pipe_inside_regex_literal() {
        assert_eq!(
            parse_filters("/a|b/.test(c) | f"),
            "_f(\"f\")(/a|b/.test(c))"
        );
        assert_eq!(parse_filters("x.match(/a|b/)"), "x.match(/a|b/)");
    }

    #[test]
    fn test_division_is_not_a_regex() {
        assert_eq!(parse_filters("a / b | f"), "_f(\"f\")(a / b)");
        assert_eq!(parse_filters("(a) / 2 | f"), "_f(\"f\")((a) / 2)");
        assert_eq!(parse_filters("list[0] / 2 | f"), "_f(\"f\")(list[0] / 2)");
    }

    #[test]
    fn test_regex_lookback_is_approximate() {
        // a regex after a keyword operator reads as division and splits
        assert_eq!(parse_filters("typeof /a|b/"), "_f(\"b/\")(typeof /a)");
        // `/` after `:` opens a regex that never closes and swallows the pipe
        assert_eq!(parse_filters("x ? 1 : / 2 | f"), "x ? 1 : / 2 | f");
    }

    #[test]
    fn test_structured_parse() {
        let parsed = FilterExpression::parse("value | round(2) | suffix");
        assert_eq!(parsed.base, "value");
        assert_eq!(
            parsed.filters,
            vec![
                FilterCall {
                    name: "round".to_string(),
                    args: Some("2)".to_string()),
                },
                FilterCall {
                    name: "suffix".to_string(),
                    args: None,
                },
            ]
        );
    }

    #[test]
    fn test_trailing_pipe_yields_empty_filter() {
        assert_eq!(parse_filters("a |"), "_f(\"\")(a)");
    }
}
