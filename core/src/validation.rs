//! Validation of declarative (JSON) builder settings and resource
//! definitions.
//!
//! # Design
//! Definitions often come from configuration files rather than Rust code, so
//! they are accepted as `serde_json::Value` and checked field by field. Each
//! failure names the field, and for endpoint entries the position in the
//! list. A successful parse yields the same typed `ResourceDefinition` the
//! Rust API builds directly.

use serde_json::Value;

use crate::error::{json_type_name, ApiError, SchemaProblem};
use crate::http::HttpMethod;
use crate::types::{ActionDefinition, DefaultAction, ResourceDefinition};

/// Read the optional `baseURL` setting.
pub fn parse_base_url(settings: &Value) -> Result<Option<String>, ApiError> {
    match settings.get("baseURL") {
        None => Ok(None),
        Some(Value::String(url)) => Ok(Some(url.clone())),
        Some(_) => Err(ApiError::Configuration("baseURL must be a string".to_string())),
    }
}

/// Parse `{ "path": ..., "endpoints": [...] }`.
pub fn parse_resource(config: &Value) -> Result<ResourceDefinition, ApiError> {
    let path = match config.get("path") {
        None => return Err(ApiError::Configuration("path is required".to_string())),
        Some(path) if is_falsy(path) => {
            return Err(ApiError::Configuration("path is required".to_string()))
        }
        Some(Value::String(path)) => path.clone(),
        Some(_) => return Err(ApiError::Configuration("path must be a string".to_string())),
    };

    let endpoints = match config.get("endpoints") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => parse_endpoints(entries)?,
        Some(_) => {
            return Err(ApiError::Configuration("endpoints must be a list".to_string()))
        }
    };

    Ok(ResourceDefinition { path, endpoints })
}

/// Validate every endpoint entry, failing on the first malformed one.
pub fn parse_endpoints(entries: &[Value]) -> Result<Vec<ActionDefinition>, ApiError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_endpoint(entry).map_err(|problem| ApiError::EndpointSchema { index, problem })
        })
        .collect()
}

fn parse_endpoint(entry: &Value) -> Result<ActionDefinition, SchemaProblem> {
    let Value::Object(fields) = entry else {
        return Err(SchemaProblem::NotAnObject(json_type_name(entry)));
    };

    let action = match fields.get("action") {
        None => return Err(SchemaProblem::MissingAction),
        Some(action) if is_falsy(action) => return Err(SchemaProblem::MissingAction),
        Some(Value::String(action)) => action,
        Some(other) => return Err(SchemaProblem::InvalidActionType(json_type_name(other))),
    };

    // Default actions take method and path from the fixed table.
    if let Some(default) = DefaultAction::from_name(action) {
        return Ok(ActionDefinition::Default(default));
    }

    let method = match fields.get("method") {
        None => return Err(SchemaProblem::MissingMethod),
        Some(method) if is_falsy(method) => return Err(SchemaProblem::MissingMethod),
        Some(Value::String(method)) => HttpMethod::parse(method)
            .ok_or_else(|| SchemaProblem::UnknownMethod(method.clone()))?,
        Some(other) => return Err(SchemaProblem::InvalidMethodType(json_type_name(other))),
    };

    let path = match fields.get("path") {
        None => return Err(SchemaProblem::MissingPath),
        Some(Value::String(path)) => path.clone(),
        Some(other) => return Err(SchemaProblem::InvalidPathType(json_type_name(other))),
    };

    Ok(ActionDefinition::Custom {
        action: action.clone(),
        method,
        path,
    })
}

/// `null`, `false`, `0` and `""`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
