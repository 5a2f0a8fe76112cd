use std::fmt;
use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::filters::parse_filters;
use crate::filters::TO_DISPLAY_STRING;

// line terminators inside an interpolation are only `\n` or `\r\n`
static DEFAULT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{((?:[^\n\r\u{2028}\u{2029}]|\r?\n)+?)\}\}")
        .expect("default interpolation regex")
});

static CUSTOM_TAG_RES: LazyLock<DashMap<Delimiters, Regex>> = LazyLock::new(DashMap::new);

/// Opening and closing interpolation delimiters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn regex(&self) -> Option<Regex> {
        if let Some(re) = CUSTOM_TAG_RES.get(self) {
            return Some(re.clone());
        }
        let pattern = format!(
            "{}((?:[^\\n\\r\\u{{2028}}\\u{{2029}}]|\\r?\\n)+?){}",
            regex::escape(&self.open),
            regex::escape(&self.close)
        );
        match Regex::new(&pattern) {
            Ok(re) => {
                CUSTOM_TAG_RES.insert(self.clone(), re.clone());
                Some(re)
            }
            Err(err) => {
                tracing::error!(delimiters = %self, "failed to build interpolation regex: {err}");
                None
            }
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// Serialized as `open,close`, the form used in compile cache keys.
impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.open, self.close)
    }
}

/// A raw token of an interpolated text: verbatim literal text, or the
/// resolved expression of one interpolation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    Literal(String),
    Binding {
        #[serde(rename = "@binding")]
        binding: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextParse {
    /// Code tokens joined with `+`.
    pub expression: String,
    pub tokens: Vec<RawToken>,
}

/// Tokenize `text` around its interpolations.
///
/// Returns `None` when the text contains no interpolation at all, which
/// callers treat as plain static text.
#[must_use]
pub fn parse_text(text: &str, delimiters: Option<&Delimiters>) -> Option<TextParse> {
    let custom;
    let tag_re = match delimiters {
        Some(delimiters) => {
            custom = delimiters.regex()?;
            &custom
        }
        None => &*DEFAULT_TAG_RE,
    };

    if !tag_re.is_match(text) {
        return None;
    }

    let mut code = Vec::new();
    let mut tokens = Vec::new();
    let mut last_index = 0;

    for captures in tag_re.captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last_index {
            push_literal(&text[last_index..whole.start()], &mut code, &mut tokens);
        }
        let exp = parse_filters(inner.as_str().trim());
        code.push(format!("{TO_DISPLAY_STRING}({exp})"));
        tokens.push(RawToken::Binding { binding: exp });
        last_index = whole.end();
    }

    if last_index < text.len() {
        push_literal(&text[last_index..], &mut code, &mut tokens);
    }

    Some(TextParse {
        expression: code.join("+"),
        tokens,
    })
}

fn push_literal(literal: &str, code: &mut Vec<String>, tokens: &mut Vec<RawToken>) {
    code.push(serde_json::Value::from(literal).to_string());
    tokens.push(RawToken::Literal(literal.to_string()));
}
