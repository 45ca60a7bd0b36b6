//! Error types for the resource-action builder.
//!
//! # Design
//! Construction problems (`Configuration`, `EndpointSchema`) are returned
//! directly from `ApiBuilder::new` / `ApiBuilder::create`. Everything an
//! invocable can reject at call time is returned through the call's future,
//! so callers handle validation failures and transport failures on one path.
//!
//! Messages carry the offending index, parameter name or JSON type so tests
//! can assert on them.

use std::fmt;

use crate::http::HttpMethod;

/// Errors produced while building resources or invoking actions.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid builder settings or resource definition.
    #[error("{0}")]
    Configuration(String),

    /// Malformed entry in a resource's endpoint list.
    #[error("endpoint at pos {index} {problem}")]
    EndpointSchema { index: usize, problem: SchemaProblem },

    #[error("Unable to complete request: missing resource identifier")]
    MissingIdentifier,

    #[error("Invalid type for id ({found}). Allowed types: string, number, object")]
    IdentifierType { found: &'static str },

    #[error("Unable to complete request: payload is required")]
    MissingPayload,

    /// The identifier does not match the number of named path parameters.
    #[error("{expected}")]
    InvalidIdentifierShape { expected: IdentifierShape },

    #[error("Expected \"{name}\" to be provided for the path")]
    MissingPathValue { name: String },

    #[error("Expected \"{name}\" to be a string or number, got {found}")]
    InvalidPathValue { name: String, found: &'static str },

    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Failure reported by the injected request function.
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Wrap any transport error so request functions can return `ApiError`.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport(err.into())
    }
}

/// What was wrong with an endpoint definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    MissingAction,
    InvalidActionType(&'static str),
    MissingMethod,
    InvalidMethodType(&'static str),
    UnknownMethod(String),
    MissingPath,
    InvalidPathType(&'static str),
    NotAnObject(&'static str),
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaProblem::MissingAction => write!(f, "is missing an action"),
            SchemaProblem::InvalidActionType(found) => {
                write!(f, "has an invalid type for action: {found}")
            }
            SchemaProblem::MissingMethod => write!(f, "is missing a method"),
            SchemaProblem::InvalidMethodType(found) => {
                write!(f, "has an invalid type for method: {found}")
            }
            SchemaProblem::UnknownMethod(method) => {
                let allowed: Vec<&str> = HttpMethod::ALL.iter().map(|m| m.as_str()).collect();
                write!(
                    f,
                    "has an unknown method: {method}. The allowed http methods are: {}",
                    allowed.join(", ")
                )
            }
            SchemaProblem::MissingPath => write!(f, "is missing a path"),
            SchemaProblem::InvalidPathType(found) => {
                write!(f, "has an invalid type for path: {found}")
            }
            SchemaProblem::NotAnObject(found) => {
                write!(f, "must be an object, got {found}")
            }
        }
    }
}

/// The identifier shape a path template expected but did not receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierShape {
    /// Exactly one named parameter: a string or number.
    Primitive,
    /// Several named parameters: an object keyed by parameter name.
    Object,
}

impl fmt::Display for IdentifierShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierShape::Primitive => write!(f, "Received non-primitive value for id"),
            IdentifierShape::Object => {
                write!(f, "Expected object id for path with multiple named params")
            }
        }
    }
}

/// JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
