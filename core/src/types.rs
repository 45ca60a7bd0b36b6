//! Action definitions and their compiled form.
//!
//! # Design
//! An endpoint entry is either a reference to one of the six default actions
//! or a custom `{action, method, path}`. Both compile into an immutable
//! `CompiledAction` that records whether calls need an identifier and a
//! payload, and which positional argument plays which role.

use serde_json::Value;

use crate::http::HttpMethod;
use crate::template::PathTemplate;

/// Conventional CRUD actions with a fixed method and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultAction {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl DefaultAction {
    pub const ALL: [DefaultAction; 6] = [
        DefaultAction::List,
        DefaultAction::Retrieve,
        DefaultAction::Create,
        DefaultAction::Update,
        DefaultAction::PartialUpdate,
        DefaultAction::Destroy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DefaultAction::List => "list",
            DefaultAction::Retrieve => "retrieve",
            DefaultAction::Create => "create",
            DefaultAction::Update => "update",
            DefaultAction::PartialUpdate => "partialUpdate",
            DefaultAction::Destroy => "destroy",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            DefaultAction::List | DefaultAction::Retrieve => HttpMethod::Get,
            DefaultAction::Create => HttpMethod::Post,
            DefaultAction::Update => HttpMethod::Put,
            DefaultAction::PartialUpdate => HttpMethod::Patch,
            DefaultAction::Destroy => HttpMethod::Delete,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            DefaultAction::List | DefaultAction::Create => "",
            _ => ":id",
        }
    }

    pub fn from_name(name: &str) -> Option<DefaultAction> {
        DefaultAction::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Retrieve, update, partialUpdate and destroy always take an identifier.
    fn requires_id(self) -> bool {
        !matches!(self, DefaultAction::List | DefaultAction::Create)
    }
}

/// One entry of a resource's endpoint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDefinition {
    Default(DefaultAction),
    Custom {
        action: String,
        method: HttpMethod,
        path: String,
    },
}

impl ActionDefinition {
    /// A custom action. A default-action name resolves to the default
    /// definition and the given method and path are dropped.
    pub fn custom(action: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        let action = action.into();
        match DefaultAction::from_name(&action) {
            Some(default) => ActionDefinition::Default(default),
            None => ActionDefinition::Custom {
                action,
                method,
                path: path.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ActionDefinition::Default(default) => default.name(),
            ActionDefinition::Custom { action, .. } => action,
        }
    }

    pub fn compile(&self) -> CompiledAction {
        match self {
            ActionDefinition::Default(default) => CompiledAction::new(
                default.name().to_string(),
                default.method(),
                default.path(),
            ),
            ActionDefinition::Custom {
                action,
                method,
                path,
            } => match DefaultAction::from_name(action) {
                Some(default) => ActionDefinition::Default(default).compile(),
                None => CompiledAction::new(action.clone(), *method, path),
            },
        }
    }
}

impl From<DefaultAction> for ActionDefinition {
    fn from(action: DefaultAction) -> Self {
        ActionDefinition::Default(action)
    }
}

/// A resource: base path plus the actions to generate for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    pub path: String,
    pub endpoints: Vec<ActionDefinition>,
}

impl ResourceDefinition {
    /// A resource with the six default actions.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            endpoints: Vec::new(),
        }
    }

    pub fn endpoint(mut self, definition: impl Into<ActionDefinition>) -> Self {
        self.endpoints.push(definition.into());
        self
    }
}

/// Role of a positional call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRole {
    Id,
    Payload,
    Extra,
}

const ID_PAYLOAD_EXTRA: &[ArgRole] = &[ArgRole::Id, ArgRole::Payload, ArgRole::Extra];
const ID_EXTRA: &[ArgRole] = &[ArgRole::Id, ArgRole::Extra];
const PAYLOAD_EXTRA: &[ArgRole] = &[ArgRole::Payload, ArgRole::Extra];
const EXTRA: &[ArgRole] = &[ArgRole::Extra];

/// Immutable per-action data captured by the invocable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAction {
    pub name: String,
    pub method: HttpMethod,
    pub template: PathTemplate,
    pub id_required: bool,
    pub payload_required: bool,
}

impl CompiledAction {
    pub fn new(name: String, method: HttpMethod, path: &str) -> Self {
        let id_required = DefaultAction::from_name(&name).is_some_and(DefaultAction::requires_id)
            || path.contains(':');
        Self {
            name,
            method,
            template: PathTemplate::compile(path),
            id_required,
            payload_required: method.requires_payload(),
        }
    }

    /// Which positional argument is the identifier, the payload and the
    /// extra options.
    pub fn arg_roles(&self) -> &'static [ArgRole] {
        match (self.id_required, self.payload_required) {
            (true, true) => ID_PAYLOAD_EXTRA,
            (true, false) => ID_EXTRA,
            (false, true) => PAYLOAD_EXTRA,
            (false, false) => EXTRA,
        }
    }
}

/// Arguments of one call, sorted into their roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs {
    pub id: Option<Value>,
    pub data: Option<Value>,
    pub extra: serde_json::Map<String, Value>,
}

impl ActionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set extra options. Falsy or non-object values leave them empty.
    pub fn extra(mut self, extra: Value) -> Self {
        self.extra = extra_options(extra);
        self
    }
}

pub(crate) fn extra_options(extra: Value) -> serde_json::Map<String, Value> {
    match extra {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
