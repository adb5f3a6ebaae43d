// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error kinds surfaced by tree construction and lookup.
//!
//! Every failure is reported synchronously by the operation that detected it.
//! Nothing in this crate retries or recovers on the caller's behalf, and a failed
//! creation never leaves a partially attached component behind.

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, TreeError>;

/// Failures raised while building or querying a [`ComponentTree`](crate::ComponentTree).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    /// A component that needs an enclosing container was created with no scope open.
    #[error("a component can only be created inside a container")]
    NotInContainer,

    /// No component with this id exists in either tier.
    #[error("component `{id}` not found")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The id is already taken somewhere in the tree.
    #[error("component id `{id}` is already in use")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },

    /// The parent id does not resolve in either tier.
    #[error("component `{id}` refers to missing parent `{parent_id}`")]
    DanglingParent {
        /// The component that could not be attached.
        id: String,
        /// The parent id that did not resolve.
        parent_id: String,
    },

    /// An explicit position collides with a position-bearing sibling.
    #[error("position {position} under `{parent_id}` is already taken")]
    PositionTaken {
        /// The shared parent.
        parent_id: String,
        /// The requested position.
        position: u32,
    },

    /// Base-tier components are shared between sessions and cannot be removed by one.
    #[error("component `{id}` belongs to the shared base tree")]
    BaseTierImmutable {
        /// The base-tier id.
        id: String,
    },

    /// The base tree was assembled without a root component.
    ///
    /// This is a setup defect rather than a runtime condition.
    #[error("component tree has no root component")]
    RootUninitialized,
}

impl TreeError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.into() }
    }
}
