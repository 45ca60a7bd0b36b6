//! The invocable generated for each action.
//!
//! # Design
//! An `Action` owns its `CompiledAction` (shared by `Arc`), the resource's
//! base path and the builder's base URL and request function. It holds no
//! mutable state, so one action can be cloned into many tasks and called
//! concurrently.
//!
//! A call runs in two steps: `prepare` sorts and validates the arguments and
//! composes the `RequestConfig`; the request function then receives it.
//! `invoke` and `call` always hand back a future, and validation failures
//! are delivered through that future.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{json_type_name, ApiError};
use crate::http::{BoxFuture, HttpMethod, RequestConfig, RequestFn};
use crate::template::PathTemplate;
use crate::types::{extra_options, ActionArgs, ArgRole, CompiledAction};

pub struct Action<T, E = ApiError> {
    compiled: Arc<CompiledAction>,
    base_path: Arc<str>,
    base_url: Arc<str>,
    request_fn: RequestFn<T, E>,
}

impl<T, E> Action<T, E> {
    pub(crate) fn new(
        compiled: CompiledAction,
        base_path: Arc<str>,
        base_url: Arc<str>,
        request_fn: RequestFn<T, E>,
    ) -> Self {
        Self {
            compiled: Arc::new(compiled),
            base_path,
            base_url,
            request_fn,
        }
    }

    pub fn name(&self) -> &str {
        &self.compiled.name
    }

    pub fn method(&self) -> HttpMethod {
        self.compiled.method
    }

    pub fn compiled(&self) -> &CompiledAction {
        &self.compiled
    }

    /// Sort positional arguments into identifier, payload and extra options
    /// according to `CompiledAction::arg_roles`. Surplus arguments are
    /// ignored.
    pub fn parse_args(&self, args: Vec<Value>) -> ActionArgs {
        let mut parsed = ActionArgs::new();
        for (role, arg) in self.compiled.arg_roles().iter().zip(args) {
            match role {
                ArgRole::Id => parsed.id = Some(arg),
                ArgRole::Payload => parsed.data = Some(arg),
                ArgRole::Extra => parsed.extra = extra_options(arg),
            }
        }
        parsed
    }

    /// Validate `args` and compose the request configuration.
    pub fn prepare(&self, args: ActionArgs) -> Result<RequestConfig, ApiError> {
        let ActionArgs { id, data, extra } = args;
        let compiled = &self.compiled;

        if compiled.id_required {
            match &id {
                None => return Err(ApiError::MissingIdentifier),
                // `null` passes as an object and is rejected by the template.
                Some(Value::String(_) | Value::Number(_) | Value::Object(_) | Value::Null) => {}
                Some(other) => {
                    return Err(ApiError::IdentifierType {
                        found: json_type_name(other),
                    })
                }
            }
        }
        if compiled.payload_required && data.is_none() {
            return Err(ApiError::MissingPayload);
        }

        let url = build_url(&self.base_url, &self.base_path, &compiled.template, id.as_ref())?;

        for key in ["method", "url"] {
            if extra.contains_key(key) {
                tracing::warn!(
                    action = %compiled.name,
                    key,
                    "extra options override computed request field"
                );
            }
        }

        Ok(RequestConfig::compose(compiled.method, url, extra, data))
    }
}

impl<T, E> Action<T, E>
where
    T: Send + 'static,
    E: From<ApiError> + Send + 'static,
{
    /// Call with positional arguments, e.g. `[id, payload, extra]`.
    pub fn call(&self, args: Vec<Value>) -> BoxFuture<'static, Result<T, E>> {
        self.invoke(self.parse_args(args))
    }

    /// Call with arguments already sorted into their roles.
    pub fn invoke(&self, args: ActionArgs) -> BoxFuture<'static, Result<T, E>> {
        let prepared = self.prepare(args);
        match &prepared {
            Ok(config) => tracing::trace!(
                action = %self.compiled.name,
                method = config.method().unwrap_or_default(),
                url = config.url().unwrap_or_default(),
                "dispatching request"
            ),
            Err(err) => {
                tracing::debug!(action = %self.compiled.name, error = %err, "rejected call")
            }
        }

        let request_fn = self.request_fn.clone();
        Box::pin(async move {
            let config = prepared.map_err(E::from)?;
            request_fn.call(config).await
        })
    }
}

impl<T, E> Clone for Action<T, E> {
    fn clone(&self) -> Self {
        Self {
            compiled: Arc::clone(&self.compiled),
            base_path: Arc::clone(&self.base_path),
            base_url: Arc::clone(&self.base_url),
            request_fn: self.request_fn.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Action<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("compiled", &self.compiled)
            .field("base_path", &self.base_path)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Strip exactly one leading and one trailing `/`.
pub fn clean_url_segment(segment: &str) -> &str {
    let segment = segment.strip_prefix('/').unwrap_or(segment);
    segment.strip_suffix('/').unwrap_or(segment)
}

/// Build the request URL.
///
/// `base_url` is expected to be cleaned already. An empty action path adds
/// nothing after the base path; otherwise the rendered path is appended
/// between slashes. Without a base URL the result is rooted at `/`.
pub fn build_url(
    base_url: &str,
    base_path: &str,
    template: &PathTemplate,
    id: Option<&Value>,
) -> Result<String, ApiError> {
    let mut url = clean_url_segment(base_path).to_string();
    if !template.is_empty() {
        url.push('/');
        url.push_str(&template.render(id)?);
        url.push('/');
    }
    if base_url.is_empty() {
        Ok(format!("/{url}"))
    } else {
        Ok(format!("{base_url}/{url}"))
    }
}
