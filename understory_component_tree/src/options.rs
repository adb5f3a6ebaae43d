// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional fields accepted when creating a component.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::component::Handler;

/// Optional fields for a new component.
///
/// Every field has an "absent" value that selects the default behavior:
///
/// - `id`: `None` generates a fresh id unique across both tiers.
/// - `parent_id`: `None` uses the innermost open container, then the root.
/// - `position`: `None` places the component after its last positioned sibling.
/// - `content`: values are converted to strings when the component is built.
/// - `handlers`: an empty map is stored as no handlers at all.
/// - `binding`: `None` means unbound; an empty value is stored as unbound too.
/// - `positionless`: excludes the component from sibling ordering.
///
/// ```
/// use understory_component_tree::{ComponentOptions, Handler};
///
/// let opts = ComponentOptions::default()
///     .id("greeting")
///     .content("text", "Hello")
///     .handler("click", Handler::named("on_click"));
/// assert_eq!(opts.id.as_deref(), Some("greeting"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentOptions {
    /// Caller-supplied id.
    pub id: Option<String>,
    /// Explicit parent, overriding the open container.
    pub parent_id: Option<String>,
    /// Explicit sibling position.
    pub position: Option<u32>,
    /// Raw content values.
    pub content: BTreeMap<String, Value>,
    /// Event name to handler reference.
    pub handlers: BTreeMap<String, Handler>,
    /// Opaque binding.
    pub binding: Option<Value>,
    /// Skip position bookkeeping for this component.
    pub positionless: bool,
}

impl ComponentOptions {
    /// Set the id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the parent id.
    #[must_use]
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set an explicit position.
    #[must_use]
    pub fn position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Add one content entry.
    #[must_use]
    pub fn content(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    /// Add one handler.
    #[must_use]
    pub fn handler(mut self, event: impl Into<String>, handler: Handler) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    /// Set the binding.
    #[must_use]
    pub fn binding(mut self, binding: impl Into<Value>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Mark the component positionless.
    #[must_use]
    pub fn positionless(mut self) -> Self {
        self.positionless = true;
        self
    }
}
