//! Declarative REST resource actions.
//!
//! # Overview
//! Describe a resource by its path and the actions it supports, and get back
//! a table of invocable actions. Each call turns its arguments into a
//! `RequestConfig` (`method`, `url`, optional `data`, extra options) and
//! hands it to the caller's request function (host-does-IO pattern). The
//! crate never touches the network.
//!
//! # Design
//! - `ApiBuilder` holds the cleaned base URL and the injected `RequestFn`.
//! - `ActionDefinition` is either one of six default CRUD actions or a custom
//!   `{action, method, path}`; definitions may also be read from JSON with
//!   index-bearing validation errors.
//! - Paths such as `:owner/repos/:name` are compiled by `PathTemplate`,
//!   which percent-encodes every substituted value.
//! - Which positional argument is the id, the payload or the extra options
//!   follows from the method and whether the path has named segments
//!   (`CompiledAction::arg_roles`).
//! - Calls always return a future; argument errors are reported through it.
//!
//! ```no_run
//! use rest_api_builder::{
//!     ApiBuilder, ApiError, BuilderConfig, RequestConfig, RequestFn, ResourceDefinition,
//! };
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), ApiError> {
//! let echo = RequestFn::from_sync(|config: RequestConfig| Ok::<_, ApiError>(config));
//! let builder = ApiBuilder::new(BuilderConfig::new(echo).base_url("https://example.com"))?;
//! let todos = builder.create(ResourceDefinition::new("todos"))?;
//! let config = todos.call("retrieve", vec![json!(1)]).await?;
//! assert_eq!(config.url(), Some("https://example.com/todos/1/"));
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod builder;
pub mod error;
pub mod http;
pub mod template;
pub mod types;
pub mod validation;

pub use action::Action;
pub use builder::{ApiBuilder, BuilderConfig, ResourceApi};
pub use error::{ApiError, IdentifierShape, SchemaProblem};
pub use http::{BoxFuture, HttpMethod, RequestConfig, RequestFn};
pub use template::PathTemplate;
pub use types::{
    ActionArgs, ActionDefinition, ArgRole, CompiledAction, DefaultAction, ResourceDefinition,
};
