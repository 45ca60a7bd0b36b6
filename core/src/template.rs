//! Path template compilation and rendering.
//!
//! # Design
//! A pattern such as `:owner/repos/:name` is split once into literal text and
//! named parameters. A parameter is `:` followed by the longest run of
//! `[A-Za-z0-9_]`; a `:` that is not followed by such a character stays
//! literal.
//!
//! Rendering takes the caller's identifier as a JSON value:
//! - no parameters: the literal pattern, the identifier is ignored;
//! - one parameter: a string or number;
//! - several parameters: an object keyed by parameter name, unknown keys
//!   ignored.
//!
//! Every substituted value is percent-encoded like `encodeURIComponent`, so
//! `/`, `?`, `&` and spaces never leak into the path structure.
//!
//! Numbers are written the way JavaScript prints them, so `1.0` renders as
//! `1`.
//!
//! A template naming the same parameter twice is not treated specially: the
//! name is listed twice and the template needs an object identifier.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::{json_type_name, ApiError, IdentifierShape};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    tokens: Vec<Token>,
    names: Vec<String>,
}

impl PathTemplate {
    pub fn compile(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut names = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if c != ':' {
                literal.push(c);
                continue;
            }
            let name_start = start + c.len_utf8();
            let mut name_end = name_start;
            while let Some(&(i, next)) = chars.peek() {
                if !is_name_char(next) {
                    break;
                }
                name_end = i + next.len_utf8();
                chars.next();
            }
            if name_end == name_start {
                literal.push(c);
                continue;
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            let name = pattern[name_start..name_end].to_string();
            names.push(name.clone());
            tokens.push(Token::Param(name));
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            pattern: pattern.to_string(),
            tokens,
            names,
        }
    }

    /// Parameter names, left to right.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Produce the concrete path for `id`.
    pub fn render(&self, id: Option<&Value>) -> Result<String, ApiError> {
        match self.names.len() {
            0 => Ok(self.pattern.clone()),
            1 => {
                let id = id.ok_or(ApiError::MissingIdentifier)?;
                if id.is_object() || id.is_null() {
                    return Err(ApiError::InvalidIdentifierShape {
                        expected: IdentifierShape::Primitive,
                    });
                }
                let encoded = encode_value(&self.names[0], id)?;
                self.fill(|_| Ok(encoded.clone()))
            }
            _ => {
                let id = id.ok_or(ApiError::MissingIdentifier)?;
                let Value::Object(values) = id else {
                    return Err(ApiError::InvalidIdentifierShape {
                        expected: IdentifierShape::Object,
                    });
                };
                self.fill(|name| {
                    let value = values.get(name).ok_or_else(|| ApiError::MissingPathValue {
                        name: name.to_string(),
                    })?;
                    encode_value(name, value)
                })
            }
        }
    }

    fn fill<F>(&self, mut lookup: F) -> Result<String, ApiError>
    where
        F: FnMut(&str) -> Result<String, ApiError>,
    {
        let mut path = String::with_capacity(self.pattern.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => path.push_str(text),
                Token::Param(name) => path.push_str(&lookup(name)?),
            }
        }
        Ok(path)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn encode_value(name: &str, value: &Value) -> Result<String, ApiError> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => {
            return Err(ApiError::InvalidPathValue {
                name: name.to_string(),
                found: json_type_name(other),
            })
        }
    };
    Ok(encode_component(&raw))
}

/// Percent-encode a single path segment value.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compile_collects_names_in_order() {
        let template = PathTemplate::compile(":owner/repos/:name_2");
        assert_eq!(template.names(), ["owner", "name_2"]);
    }

    #[test]
    fn lone_colon_is_literal() {
        let template = PathTemplate::compile("a:/b:-c");
        assert!(template.names().is_empty());
        assert_eq!(template.render(None).unwrap(), "a:/b:-c");
    }

    #[test]
    fn name_stops_at_first_non_word_char() {
        let template = PathTemplate::compile("files/:id.json");
        assert_eq!(template.names(), ["id"]);
        assert_eq!(template.render(Some(&json!(7))).unwrap(), "files/7.json");
    }

    #[test]
    fn integral_float_renders_without_fraction() {
        let template = PathTemplate::compile("bar/:id");
        assert_eq!(template.render(Some(&json!(1.0))).unwrap(), "bar/1");
        assert_eq!(template.render(Some(&json!(1.5))).unwrap(), "bar/1.5");
    }

    #[test]
    fn no_params_ignores_identifier() {
        let template = PathTemplate::compile("bar");
        assert_eq!(template.render(Some(&json!(123))).unwrap(), "bar");
        assert_eq!(template.render(None).unwrap(), "bar");
    }

    #[test]
    fn single_param_accepts_string_and_number() {
        let template = PathTemplate::compile("bar/:id");
        assert_eq!(template.render(Some(&json!(123))).unwrap(), "bar/123");
        assert_eq!(template.render(Some(&json!("123"))).unwrap(), "bar/123");
    }

    #[test]
    fn single_param_rejects_object() {
        let err = PathTemplate::compile(":id")
            .render(Some(&json!({"invalid": "id"})))
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidIdentifierShape {
                expected: IdentifierShape::Primitive
            }
        ));
        assert_eq!(err.to_string(), "Received non-primitive value for id");
    }

    #[test]
    fn single_param_rejects_boolean() {
        let err = PathTemplate::compile(":id").render(Some(&json!(true))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidPathValue { found: "boolean", .. }));
    }

    #[test]
    fn named_template_without_identifier() {
        let err = PathTemplate::compile(":id").render(None).unwrap_err();
        assert!(matches!(err, ApiError::MissingIdentifier));
    }

    #[test]
    fn multiple_params_require_object() {
        let err = PathTemplate::compile(":bar/:baz").render(Some(&json!(123))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected object id for path with multiple named params"
        );
    }

    #[test]
    fn multiple_params_missing_value_names_parameter() {
        let err = PathTemplate::compile(":bar/:baz")
            .render(Some(&json!({"bar": "bar"})))
            .unwrap_err();
        match err {
            ApiError::MissingPathValue { name } => assert_eq!(name, "baz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn multiple_params_ignore_unknown_keys() {
        let path = PathTemplate::compile(":bar/:baz/:qux")
            .render(Some(&json!({"ignore": "me", "bar": "bar", "baz": "baz", "qux": 1})))
            .unwrap();
        assert_eq!(path, "bar/baz/1");
    }

    #[test]
    fn values_are_percent_encoded() {
        let template = PathTemplate::compile("search/:term");
        let path = template.render(Some(&json!("a/b?c&d e"))).unwrap();
        assert_eq!(path, "search/a%2Fb%3Fc%26d%20e");
    }

    #[test]
    fn each_value_encoded_independently() {
        let path = PathTemplate::compile(":a/:b")
            .render(Some(&json!({"a": "x/y", "b": "é"})))
            .unwrap();
        assert_eq!(path, "x%2Fy/%C3%A9");
    }

    #[test]
    fn unreserved_marks_are_kept() {
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)"), "a-b_c.d!e~f*g'h(i)");
    }
}
