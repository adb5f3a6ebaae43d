// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack of open container scopes.
//!
//! Each [`TreeManager`](crate::TreeManager) owns its own stack, so concurrent
//! sessions never see each other's current container. Balanced push/pop is
//! enforced by [`ScopeGuard`](crate::ScopeGuard); the stack itself is a plain
//! data structure.

/// Ids of the containers currently open, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeStack {
    open: Vec<String>,
}

impl ScopeStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `container_id` the current container.
    pub fn push(&mut self, container_id: impl Into<String>) {
        let id = container_id.into();
        log::trace!("open scope `{id}` at depth {}", self.open.len());
        self.open.push(id);
    }

    /// Close the innermost scope and return its container id.
    pub fn pop(&mut self) -> Option<String> {
        let id = self.open.pop();
        if let Some(id) = &id {
            log::trace!("close scope `{id}` at depth {}", self.open.len());
        }
        id
    }

    /// The innermost open container, if any.
    pub fn current(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Returns true if no scope is open.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Iterate open container ids, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.open.iter().map(String::as_str)
    }

    /// Close every scope above `depth`.
    pub(crate) fn truncate(&mut self, depth: usize) {
        while self.open.len() > depth {
            self.pop();
        }
    }
}
