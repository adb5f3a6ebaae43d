// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component entity and the normalization applied to its fields at creation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known id of the root component; the parent of last resort.
pub const ROOT_ID: &str = "root";

/// Provenance flag carried by components created through [`TreeManager`](crate::TreeManager).
pub const CMC_FLAG: &str = "cmc";

/// A handler reference supplied at creation.
///
/// The caller that owns callable identity decides which variant it has:
/// a function is passed by its stable name, anything else is kept as a literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handler {
    /// Stable name of a callable handler.
    Named(String),
    /// Non-callable value, stored as-is.
    Value(Value),
}

impl Handler {
    /// Reference a callable handler by its stable name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wrap a literal handler value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    fn into_stored(self) -> Value {
        match self {
            Self::Named(name) => Value::String(name),
            Self::Value(value) => value,
        }
    }
}

/// One node of the component tree.
///
/// Identity fields (`id`, `type`, `parentId`, `flag`) and the position are fixed
/// once the component is built. The serialized form is what the transport layer
/// ships to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    id: String,
    #[serde(rename = "type")]
    component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flag: Option<String>,
    #[serde(default)]
    content: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handlers: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    binding: Option<Value>,
}

impl Component {
    /// Build the root component. Only tree setup does this.
    pub(crate) fn root(component_type: &str) -> Self {
        Self {
            id: ROOT_ID.into(),
            component_type: component_type.into(),
            parent_id: None,
            position: Some(0),
            flag: None,
            content: BTreeMap::new(),
            handlers: None,
            binding: None,
        }
    }

    /// Assemble a component from already resolved identity and raw field values.
    ///
    /// Content, handlers and binding are normalized here.
    pub(crate) fn assemble(
        id: String,
        component_type: &str,
        parent_id: String,
        position: Option<u32>,
        flag: Option<&str>,
        content: BTreeMap<String, Value>,
        handlers: BTreeMap<String, Handler>,
        binding: Option<Value>,
    ) -> Self {
        Self {
            id,
            component_type: component_type.into(),
            parent_id: Some(parent_id),
            position,
            flag: flag.map(Into::into),
            content: normalize_content(content),
            handlers: normalize_handlers(handlers),
            binding: normalize_binding(binding),
        }
    }

    /// Unique id across both tiers of the tree.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Component kind, interpreted by the renderer.
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Parent id; `None` only for the root.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Sibling order under the parent; `None` for positionless components.
    pub fn position(&self) -> Option<u32> {
        self.position
    }

    /// Provenance marker, e.g. [`CMC_FLAG`].
    pub fn flag(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    /// Content with every value already rendered as a string.
    pub fn content(&self) -> &BTreeMap<String, String> {
        &self.content
    }

    /// Event name to handler name (or literal value). `None` when there are no handlers.
    pub fn handlers(&self) -> Option<&BTreeMap<String, Value>> {
        self.handlers.as_ref()
    }

    /// Opaque binding. `None` when unbound or supplied empty.
    pub fn binding(&self) -> Option<&Value> {
        self.binding.as_ref()
    }
}

/// Render a content value as the string clients receive.
///
/// Strings are kept verbatim; everything else, mappings included, uses its
/// compact JSON encoding. Mapping keys come out sorted.
///
/// This is not byte-compatible with encoders that emit `", "` and `": "`
/// separators or keep insertion order: `{"b": 1, "a": 2}` becomes
/// `{"a":2,"b":1}`. Compare decoded values, not strings, across the two.
pub fn content_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Convert every content value to its string form.
pub fn normalize_content(raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .map(|(key, value)| (key, content_string(value)))
        .collect()
}

/// Resolve handler references; an empty set becomes `None`.
pub fn normalize_handlers(raw: BTreeMap<String, Handler>) -> Option<BTreeMap<String, Value>> {
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.into_iter()
            .map(|(event, handler)| (event, handler.into_stored()))
            .collect(),
    )
}

/// Drop a binding that carries nothing: `null`, `""`, `[]` or `{}`.
///
/// Any other value, `false` and `0` included, is kept as-is.
pub fn normalize_binding(raw: Option<Value>) -> Option<Value> {
    raw.filter(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    })
}
