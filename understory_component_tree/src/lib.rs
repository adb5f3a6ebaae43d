// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_component_tree --heading-base-level=0

//! Understory Component Tree: the component tree behind a server-driven UI.
//!
//! Application code declares components imperatively; this crate records them
//! into a tree that a rendering or transport layer later ships to clients.
//!
//! - Container scopes give nested declarations an implicit parent.
//! - The tree has two tiers: a shared [`BaseTree`] assembled at startup and a
//!   per-session overlay that receives everything created at runtime.
//! - Sibling positions are assigned once, at creation, and stay unique per parent
//!   across both tiers without renumbering existing components.
//!
//! It does not render, dispatch events, or talk to clients.
//!
//! ## Where this fits
//!
//! - Startup code builds the [`BaseTree`] (root plus application layout) once and
//!   shares it behind an `Arc`.
//! - Each session gets a [`TreeManager`], which owns that session's
//!   [`ComponentTree`] overlay and its [`ScopeStack`].
//! - The transport layer serializes the [`ComponentTree`] (an id → component map)
//!   or ships the deltas from [`ComponentTree::drain_updates`].
//!
//! ## API overview
//!
//! - [`TreeManager`]: enter/exit scopes, create components, find them.
//! - [`ScopeGuard`]: an open container scope; closes on drop.
//! - [`ComponentOptions`]: optional creation fields with documented defaults.
//! - [`Component`]: one node. Content values are strings, handlers are names or literals.
//! - [`ComponentTree`]: lookup, attach, remove, ordered children, update draining.
//! - [`BaseTree`] / [`BaseTreeBuilder`]: the shared tier.
//! - [`TierMask`]: which tiers a query covers.
//! - [`TreeError`]: every failure kind.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use understory_component_tree::{BaseTree, ComponentOptions, Handler, TierMask, TreeManager};
//!
//! // Startup: a shared layout with one page.
//! let mut base = BaseTree::builder();
//! base.insert("page", ComponentOptions::default().id("main"))?;
//! let base = Arc::new(base.build());
//!
//! // Per session.
//! let mut ui = TreeManager::new(Arc::clone(&base));
//! {
//!     let mut page = ui.enter_scope("main")?;
//!     let row = page.create_component("horizontalstack", ComponentOptions::default())?;
//!     let mut row = page.enter_scope(row.id())?;
//!     row.create_component(
//!         "button",
//!         ComponentOptions::default()
//!             .content("text", "Save")
//!             .content("style", json!({"primary": true}))
//!             .handler("click", Handler::named("save_form")),
//!     )?;
//! }
//!
//! let tree = ui.tree();
//! let row = tree.children("main", TierMask::all())[0];
//! let button = tree.children(row.id(), TierMask::all())[0];
//! assert_eq!(button.content()["style"], r#"{"primary":true}"#);
//! assert_eq!(button.handlers().unwrap()["click"], json!("save_form"));
//!
//! // The transport layer sees one id → component map.
//! let wire = serde_json::to_value(tree).unwrap();
//! assert_eq!(wire[button.id()]["parentId"], json!(row.id()));
//! # Ok::<(), understory_component_tree::TreeError>(())
//! ```

mod component;
mod error;
mod manager;
mod options;
mod position;
mod scope;
mod store;
mod tier;

pub use component::{
    CMC_FLAG, Component, Handler, ROOT_ID, content_string, normalize_binding, normalize_content,
    normalize_handlers,
};
pub use error::{Result, TreeError};
pub use manager::{ScopeGuard, TreeManager};
pub use options::ComponentOptions;
pub use scope::ScopeStack;
pub use store::{BaseTree, BaseTreeBuilder, ComponentTree};
pub use tier::TierMask;
