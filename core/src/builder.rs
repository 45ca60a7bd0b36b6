//! Builds resource action tables.
//!
//! # Design
//! `ApiBuilder` holds only the cleaned base URL and the injected request
//! function; both are fixed at construction. `create` turns a
//! `ResourceDefinition` into a `ResourceApi`, a name → `Action` table.
//! Nothing is shared mutably between resources: default definitions are
//! `Copy` values and each resource compiles its own actions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::action::{self, clean_url_segment, Action};
use crate::error::{ApiError, SchemaProblem};
use crate::http::{BoxFuture, RequestFn};
use crate::template::PathTemplate;
use crate::types::{ActionDefinition, DefaultAction, ResourceDefinition};
use crate::validation;

/// Settings for `ApiBuilder::new`.
pub struct BuilderConfig<T, E = ApiError> {
    pub base_url: Option<String>,
    pub request_fn: Option<RequestFn<T, E>>,
}

impl<T, E> BuilderConfig<T, E> {
    pub fn new(request_fn: RequestFn<T, E>) -> Self {
        Self {
            base_url: None,
            request_fn: Some(request_fn),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `{"baseURL": ...}` settings; `baseURL` must be a string if given.
    pub fn from_value(
        settings: &Value,
        request_fn: Option<RequestFn<T, E>>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: validation::parse_base_url(settings)?,
            request_fn,
        })
    }
}

impl<T, E> Default for BuilderConfig<T, E> {
    fn default() -> Self {
        Self {
            base_url: None,
            request_fn: None,
        }
    }
}

/// Generates invocable actions for REST resources.
pub struct ApiBuilder<T, E = ApiError> {
    base_url: Arc<str>,
    request_fn: RequestFn<T, E>,
}

impl<T, E> ApiBuilder<T, E> {
    pub fn new(config: BuilderConfig<T, E>) -> Result<Self, ApiError> {
        let request_fn = config
            .request_fn
            .ok_or_else(|| ApiError::Configuration("requestFn is required".to_string()))?;
        let base_url = config.base_url.unwrap_or_default();

        Ok(Self {
            base_url: Arc::from(clean_url_segment(&base_url)),
            request_fn,
        })
    }

    /// The cleaned base URL, empty when none was configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the action table for one resource. With no endpoints, the six
    /// default actions are generated. Duplicate names keep the last entry.
    pub fn create(&self, resource: ResourceDefinition) -> Result<ResourceApi<T, E>, ApiError> {
        if resource.path.is_empty() {
            return Err(ApiError::Configuration("path is required".to_string()));
        }

        let base_path: Arc<str> = Arc::from(resource.path.as_str());
        let definitions = if resource.endpoints.is_empty() {
            DefaultAction::ALL.into_iter().map(ActionDefinition::Default).collect()
        } else {
            resource.endpoints
        };

        let mut actions = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            if definition.name().is_empty() {
                return Err(ApiError::EndpointSchema {
                    index,
                    problem: SchemaProblem::MissingAction,
                });
            }
            let compiled = definition.compile();
            let name = compiled.name.clone();
            let action = Action::new(
                compiled,
                Arc::clone(&base_path),
                Arc::clone(&self.base_url),
                self.request_fn.clone(),
            );
            if actions.insert(name.clone(), action).is_some() {
                tracing::debug!(resource = %base_path, action = %name, "duplicate action replaced");
            }
        }

        tracing::debug!(resource = %base_path, actions = actions.len(), "built resource actions");
        Ok(ResourceApi { path: base_path, actions })
    }

    /// Validate a JSON resource definition and build it.
    pub fn create_from_value(&self, resource: &Value) -> Result<ResourceApi<T, E>, ApiError> {
        self.create(validation::parse_resource(resource)?)
    }

    /// The URL an action with `path` on `base_path` would call for `id`.
    pub fn build_url(
        &self,
        base_path: &str,
        path: &str,
        id: Option<&Value>,
    ) -> Result<String, ApiError> {
        action::build_url(&self.base_url, base_path, &PathTemplate::compile(path), id)
    }
}

impl<T, E> std::fmt::Debug for ApiBuilder<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// The invocable actions of one resource, keyed by action name.
pub struct ResourceApi<T, E = ApiError> {
    path: Arc<str>,
    actions: HashMap<String, Action<T, E>>,
}

impl<T, E> ResourceApi<T, E> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Action<T, E>> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Action names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Action<T, E>)> {
        self.actions.iter().map(|(name, action)| (name.as_str(), action))
    }
}

impl<T, E> ResourceApi<T, E>
where
    T: Send + 'static,
    E: From<ApiError> + Send + 'static,
{
    /// Call an action by name. An unknown name fails through the returned
    /// future like any other call error.
    pub fn call(&self, name: &str, args: Vec<Value>) -> BoxFuture<'static, Result<T, E>> {
        match self.actions.get(name) {
            Some(action) => action.call(args),
            None => {
                let err = ApiError::UnknownAction(name.to_string());
                Box::pin(async move { Err::<T, E>(E::from(err)) })
            }
        }
    }
}

impl<T, E> Clone for ResourceApi<T, E> {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            actions: self.actions.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for ResourceApi<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("path", &self.path)
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, RequestConfig};
    use serde_json::json;

    fn builder() -> ApiBuilder<RequestConfig> {
        ApiBuilder::new(BuilderConfig::new(RequestFn::from_sync(Ok))).unwrap()
    }

    #[test]
    fn custom_action_with_empty_name_is_rejected() {
        let resource = ResourceDefinition::new("foo")
            .endpoint(DefaultAction::List)
            .endpoint(ActionDefinition::custom("", HttpMethod::Get, ""));
        let err = builder().create(resource).unwrap_err();
        assert!(matches!(
            err,
            ApiError::EndpointSchema { index: 1, problem: SchemaProblem::MissingAction }
        ));
        assert_eq!(err.to_string(), "endpoint at pos 1 is missing an action");
    }

    #[test]
    fn request_fn_is_required() {
        let err = ApiBuilder::<RequestConfig>::new(BuilderConfig::default()).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert_eq!(err.to_string(), "requestFn is required");
    }

    #[test]
    fn base_url_slashes_are_removed() {
        let builder = ApiBuilder::new(
            BuilderConfig::new(RequestFn::<RequestConfig>::from_sync(Ok))
                .base_url("/https://example.com/"),
        )
        .unwrap();
        assert_eq!(builder.base_url(), "https://example.com");
    }

    #[test]
    fn base_url_from_settings_must_be_a_string() {
        let result = BuilderConfig::<RequestConfig>::from_value(&json!({"baseURL": 123}), None);
        let message = result.err().map(|e| e.to_string());
        assert_eq!(message.as_deref(), Some("baseURL must be a string"));
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = builder().create(ResourceDefinition::new("")).unwrap_err();
        assert_eq!(err.to_string(), "path is required");
    }

    #[test]
    fn default_actions_when_no_endpoints() {
        let api = builder().create(ResourceDefinition::new("foo")).unwrap();
        assert_eq!(
            api.names(),
            ["create", "destroy", "list", "partialUpdate", "retrieve", "update"]
        );
        assert_eq!(api.path(), "foo");
    }

    #[test]
    fn duplicate_actions_last_wins() {
        let api = builder()
            .create(
                ResourceDefinition::new("foo")
                    .endpoint(ActionDefinition::custom("custom", HttpMethod::Get, ""))
                    .endpoint(ActionDefinition::custom("custom", HttpMethod::Post, "x")),
            )
            .unwrap();
        assert_eq!(api.len(), 1);
        assert_eq!(api.get("custom").unwrap().method(), HttpMethod::Post);
    }

    #[test]
    fn build_url_uses_base_url() {
        let builder = ApiBuilder::new(
            BuilderConfig::new(RequestFn::<RequestConfig>::from_sync(Ok))
                .base_url("/https://example.com/"),
        )
        .unwrap();
        assert_eq!(
            builder.build_url("foo", ":bar", Some(&json!(123))).unwrap(),
            "https://example.com/foo/123/"
        );
    }

    #[tokio::test]
    async fn unknown_action_fails_through_future() {
        let api = builder().create(ResourceDefinition::new("foo")).unwrap();
        let err = api.call("missing", vec![]).await.unwrap_err();
        assert!(matches!(err, ApiError::UnknownAction(name) if name == "missing"));
    }
}
