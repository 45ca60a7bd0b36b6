//! HTTP plain-data types handed across the host-does-IO boundary.
//!
//! # Design
//! The builder never performs I/O. Each invocation produces a
//! `RequestConfig` and passes it to the caller's `RequestFn`, which owns the
//! transport. The request function's result is forwarded untouched.
//!
//! `RequestConfig` is a JSON object rather than a fixed struct: extra options
//! are merged onto it after `method` and `url`, and a caller may override
//! either of them through those extra options.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Boxed, sendable future returned by invocables and request functions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP method for a request. Always emitted lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Head,
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Head => "head",
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Case-insensitive lookup of a method name.
    pub fn parse(name: &str) -> Option<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    /// POST, PUT and PATCH require a payload.
    pub fn requires_payload(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request configuration passed to the request function:
/// `{ method, url, ...extra, data? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestConfig {
    fields: Map<String, Value>,
}

impl RequestConfig {
    /// Compose a configuration. `extra` is merged after `method` and `url`,
    /// so conflicting keys in `extra` win. `data` is set last.
    pub fn compose(
        method: HttpMethod,
        url: String,
        extra: Map<String, Value>,
        data: Option<Value>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("method".to_string(), Value::String(method.as_str().to_string()));
        fields.insert("url".to_string(), Value::String(url));
        fields.extend(extra);
        if let Some(data) = data {
            fields.insert("data".to_string(), data);
        }
        Self { fields }
    }

    /// `None` only if extra options replaced `method` with a non-string.
    pub fn method(&self) -> Option<&str> {
        self.fields.get("method").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.fields.get("url").and_then(Value::as_str)
    }

    pub fn data(&self) -> Option<&Value> {
        self.fields.get("data")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

type Handler<T, E> = dyn Fn(RequestConfig) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// The injected request function. Receives exactly one `RequestConfig`.
pub struct RequestFn<T, E = ApiError> {
    inner: Arc<Handler<T, E>>,
}

impl<T, E> RequestFn<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap an async request function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let inner: Arc<Handler<T, E>> =
            Arc::new(move |config: RequestConfig| -> BoxFuture<'static, Result<T, E>> {
                Box::pin(f(config))
            });
        Self { inner }
    }

    /// Wrap a synchronous request function. Its result is still delivered
    /// through a future.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(RequestConfig) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::new(move |config| std::future::ready(f(config)))
    }
}

impl<T, E> RequestFn<T, E> {
    pub fn call(&self, config: RequestConfig) -> BoxFuture<'static, Result<T, E>> {
        (self.inner)(config)
    }
}

impl<T, E> Clone for RequestFn<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for RequestFn<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestFn(..)")
    }
}
