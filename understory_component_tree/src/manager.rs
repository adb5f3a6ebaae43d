// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session-facing facade for declaring components.
//!
//! ## Overview
//!
//! A [`TreeManager`] pairs one session's [`ComponentTree`] with that session's
//! [`ScopeStack`]. Application code opens a container scope, creates components
//! inside it without naming a parent, and closes the scope again:
//!
//! ```
//! use std::sync::Arc;
//! use understory_component_tree::{BaseTree, ComponentOptions, TreeManager};
//!
//! let mut ui = TreeManager::new(Arc::new(BaseTree::new()));
//! let section = ui.create_container_component("section", ComponentOptions::default().id("c1"))?;
//! {
//!     let mut scope = ui.enter_scope(section.id())?;
//!     let first = scope.create_component("text", ComponentOptions::default())?;
//!     let second = scope.create_component("text", ComponentOptions::default())?;
//!     assert_eq!(first.parent_id(), Some("c1"));
//!     assert_eq!((first.position(), second.position()), (Some(0), Some(1)));
//! }
//! assert!(ui.create_component("text", ComponentOptions::default()).is_err());
//! # Ok::<(), understory_component_tree::TreeError>(())
//! ```
//!
//! ## Creation pipeline
//!
//! Both creation operations run the same steps:
//!
//! 1. Parent: the explicit `parent_id`, else the innermost open container, else the root.
//! 2. Id: the explicit `id`, else a fresh one.
//! 3. Content and handlers are normalized.
//! 4. Position: the explicit `position`, else the next free slot under the parent,
//!    unless the component is positionless.
//! 5. The component is attached to the session overlay, or nothing changes at all.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::component::{CMC_FLAG, Component, ROOT_ID};
use crate::error::{Result, TreeError};
use crate::options::ComponentOptions;
use crate::scope::ScopeStack;
use crate::store::{BaseTree, ComponentTree};

/// Declarative component creation for one session.
///
/// Creation takes `&mut self`, so reading the highest sibling position and
/// attaching the new component can never interleave with another creation in
/// the same session. Separate sessions own separate managers and only share the
/// immutable [`BaseTree`].
#[derive(Clone, Debug)]
pub struct TreeManager {
    tree: ComponentTree,
    scopes: ScopeStack,
}

impl TreeManager {
    /// Start a session on top of `base`.
    pub fn new(base: Arc<BaseTree>) -> Self {
        Self::with_tree(ComponentTree::new(base))
    }

    /// Manage an existing session tree.
    pub fn with_tree(tree: ComponentTree) -> Self {
        Self {
            tree,
            scopes: ScopeStack::new(),
        }
    }

    /// The session tree.
    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// The session tree, for removal and draining updates.
    pub fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.tree
    }

    /// Give up the manager and keep the tree.
    pub fn into_tree(self) -> ComponentTree {
        self.tree
    }

    /// Open container scopes.
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// The root component.
    ///
    /// # Panics
    ///
    /// Panics if the base tree has no root. [`BaseTree`] refuses to exist without
    /// one, so this indicates a broken setup rather than a runtime condition.
    pub fn root(&self) -> &Component {
        match self.try_root() {
            Ok(root) => root,
            Err(err) => panic!("{err}"),
        }
    }

    /// The root component, or [`TreeError::RootUninitialized`].
    pub fn try_root(&self) -> Result<&Component> {
        self.tree.root().ok_or(TreeError::RootUninitialized)
    }

    /// Look up a component in either tier.
    pub fn find(&self, id: &str) -> Result<&Component> {
        self.tree
            .get_component(id)
            .ok_or_else(|| TreeError::not_found(id))
    }

    /// The innermost open container.
    pub fn current_container(&self) -> Option<&str> {
        self.scopes.current()
    }

    /// Fails with [`TreeError::NotInContainer`] unless a container scope is open.
    pub fn assert_inside_container(&self) -> Result<()> {
        if self.scopes.is_empty() {
            return Err(TreeError::NotInContainer);
        }
        Ok(())
    }

    /// Open a scope on `container_id`.
    ///
    /// Components created through the returned guard default to this container
    /// as their parent. The scope closes when the guard is dropped, whether the
    /// enclosing code returns normally, bails out with `?`, or unwinds.
    pub fn enter_scope(&mut self, container_id: &str) -> Result<ScopeGuard<'_>> {
        self.find(container_id)?;
        let depth = self.scopes.depth();
        self.scopes.push(container_id);
        Ok(ScopeGuard {
            manager: self,
            depth,
        })
    }

    /// Run `f` with a scope open on `container_id`, closing it on every exit path.
    pub fn with_scope<R>(
        &mut self,
        container_id: &str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let mut scope = self.enter_scope(container_id)?;
        f(&mut *scope)
    }

    /// Create a component that may sit directly under the root.
    pub fn create_container_component(
        &mut self,
        component_type: &str,
        options: ComponentOptions,
    ) -> Result<Component> {
        self.create(component_type, options)
    }

    /// Create a component inside the current container scope.
    ///
    /// Fails with [`TreeError::NotInContainer`] if no scope is open.
    pub fn create_component(
        &mut self,
        component_type: &str,
        options: ComponentOptions,
    ) -> Result<Component> {
        self.assert_inside_container()?;
        self.create(component_type, options)
    }

    fn create(&mut self, component_type: &str, options: ComponentOptions) -> Result<Component> {
        let ComponentOptions {
            id,
            parent_id,
            position,
            content,
            handlers,
            binding,
            positionless,
        } = options;
        let parent_id = parent_id
            .or_else(|| self.scopes.current().map(str::to_owned))
            .unwrap_or_else(|| ROOT_ID.to_owned());
        let id = id.unwrap_or_else(|| self.tree.generate_id());
        let position = position
            .or_else(|| self.tree.determine_position(&id, &parent_id, positionless));
        let component = Component::assemble(
            id,
            component_type,
            parent_id,
            position,
            Some(CMC_FLAG),
            content,
            handlers,
            binding,
        );
        self.tree.attach(component).cloned()
    }
}

/// An open container scope.
///
/// Dereferences to the [`TreeManager`] that opened it, so components and nested
/// scopes are created through the guard. Dropping it closes this scope along with
/// any nested scope still open above it.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    manager: &'a mut TreeManager,
    depth: usize,
}

impl ScopeGuard<'_> {
    /// Close the scope now.
    pub fn exit(self) {}
}

impl Deref for ScopeGuard<'_> {
    type Target = TreeManager;

    fn deref(&self) -> &TreeManager {
        self.manager
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut TreeManager {
        self.manager
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.manager.scopes.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Handler;
    use crate::tier::TierMask;
    use serde_json::json;

    fn session() -> TreeManager {
        TreeManager::new(Arc::new(BaseTree::new()))
    }

    fn opts() -> ComponentOptions {
        ComponentOptions::default()
    }

    #[test]
    fn leaves_inside_container_are_ordered() {
        let mut ui = session();
        let c1 = ui
            .create_container_component("section", opts().id("c1"))
            .unwrap();
        let mut scope = ui.enter_scope(c1.id()).unwrap();
        let l1 = scope.create_component("text", opts()).unwrap();
        let l2 = scope.create_component("text", opts()).unwrap();
        assert_eq!(l1.parent_id(), Some("c1"));
        assert_eq!(l1.position(), Some(0));
        assert_eq!(l2.position(), Some(1));
        scope.exit();
        assert_eq!(
            ui.create_component("text", opts()).unwrap_err(),
            TreeError::NotInContainer
        );
    }

    #[test]
    fn container_at_top_level_goes_under_root() {
        let mut ui = session();
        assert_eq!(
            ui.create_component("text", opts()).unwrap_err(),
            TreeError::NotInContainer
        );
        let c = ui.create_container_component("section", opts()).unwrap();
        assert_eq!(c.parent_id(), Some(ROOT_ID));
        assert_eq!(c.flag(), Some(CMC_FLAG));
        assert_eq!(ui.find(c.id()).unwrap(), &c);
    }

    #[test]
    fn positions_strictly_increase() {
        let mut ui = session();
        let c = ui.create_container_component("section", opts()).unwrap();
        let mut scope = ui.enter_scope(c.id()).unwrap();
        let mut last = None;
        for i in 0..50 {
            let mut o = opts();
            if i % 7 == 0 {
                o = o.positionless();
            }
            let leaf = scope.create_component("text", o).unwrap();
            if i % 7 == 0 {
                assert_eq!(leaf.position(), None, "positionless leaves get no slot");
                continue;
            }
            let p = leaf.position().unwrap();
            assert!(last.is_none_or(|l| p > l), "positions must strictly increase");
            last = Some(p);
        }
    }

    #[test]
    fn nested_scopes_restore_the_outer_container() {
        let mut ui = session();
        ui.create_container_component("section", opts().id("outer"))
            .unwrap();
        let mut outer = ui.enter_scope("outer").unwrap();
        outer
            .create_component("column", opts().id("inner"))
            .unwrap();
        {
            let mut inner = outer.enter_scope("inner").unwrap();
            let deep = inner.create_component("text", opts()).unwrap();
            assert_eq!(deep.parent_id(), Some("inner"));
        }
        assert_eq!(outer.current_container(), Some("outer"));
        let shallow = outer.create_component("text", opts()).unwrap();
        assert_eq!(shallow.parent_id(), Some("outer"));
        assert_eq!(shallow.position(), Some(1), "after `inner` at 0");
    }

    #[test]
    fn scope_closes_when_body_fails() {
        let mut ui = session();
        ui.create_container_component("section", opts().id("c"))
            .unwrap();
        let err = ui
            .with_scope("c", |ui| {
                ui.create_component("text", opts().id("a"))?;
                ui.create_component("text", opts().id("a"))?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId { id: "a".into() });
        assert!(ui.scopes().is_empty(), "scope must be popped on the error path");
    }

    #[test]
    fn scope_closes_on_unwind() {
        let mut ui = session();
        ui.create_container_component("section", opts().id("c"))
            .unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ui.enter_scope("c").unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(ui.scopes().is_empty(), "scope must be popped while unwinding");
    }

    #[test]
    fn entering_an_unknown_container_fails() {
        let mut ui = session();
        assert_eq!(
            ui.enter_scope("nope").map(|_| ()).unwrap_err(),
            TreeError::NotFound { id: "nope".into() }
        );
        assert!(ui.scopes().is_empty());
    }

    #[test]
    fn explicit_parent_wins_over_scope() {
        let mut ui = session();
        ui.create_container_component("section", opts().id("a"))
            .unwrap();
        ui.create_container_component("section", opts().id("b"))
            .unwrap();
        let mut scope = ui.enter_scope("a").unwrap();
        let leaf = scope
            .create_component("text", opts().parent_id("b"))
            .unwrap();
        assert_eq!(leaf.parent_id(), Some("b"));
    }

    #[test]
    fn explicit_position_is_kept() {
        let mut ui = session();
        let c = ui
            .create_container_component("section", opts().position(10))
            .unwrap();
        assert_eq!(c.position(), Some(10));
        let next = ui.create_container_component("section", opts()).unwrap();
        assert_eq!(next.position(), Some(11));
    }

    #[test]
    fn failed_creation_leaves_no_trace() {
        let mut ui = session();
        let before = ui.tree().len();
        let err = ui
            .create_container_component("text", opts().parent_id("ghost"))
            .unwrap_err();
        assert!(matches!(err, TreeError::DanglingParent { .. }));
        assert_eq!(ui.tree().len(), before);
        assert!(ui.tree_mut().drain_updates().is_empty());
    }

    #[test]
    fn content_and_handlers_are_normalized() {
        let mut ui = session();
        let c = ui
            .create_container_component(
                "text",
                opts()
                    .content("a", json!({"a": 1}))
                    .content("b", "x")
                    .content("n", 3)
                    .handler("click", Handler::named("on_click")),
            )
            .unwrap();
        assert_eq!(c.content()["a"], r#"{"a":1}"#);
        assert_eq!(c.content()["b"], "x");
        assert_eq!(c.content()["n"], "3");
        assert_eq!(c.handlers().unwrap()["click"], json!("on_click"));

        let bare = ui.create_container_component("text", opts()).unwrap();
        assert_eq!(bare.handlers(), None, "empty handlers are stored as absent");
    }

    #[test]
    fn binding_passes_through() {
        let mut ui = session();
        let binding = json!({"eventType": "wf-change", "stateRef": "name"});
        let c = ui
            .create_container_component("textinput", opts().binding(binding.clone()))
            .unwrap();
        assert_eq!(c.binding(), Some(&binding));

        let unbound = ui
            .create_container_component("textinput", opts().binding(json!({})))
            .unwrap();
        assert_eq!(unbound.binding(), None, "an empty binding is stored as absent");
    }

    #[test]
    fn root_and_find() {
        let ui = session();
        assert_eq!(ui.root().id(), ROOT_ID);
        assert_eq!(ui.try_root().unwrap().id(), ROOT_ID);
        assert_eq!(
            ui.find("missing").unwrap_err(),
            TreeError::NotFound {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn sessions_share_base_but_not_overlays() {
        let mut builder = BaseTree::builder();
        builder
            .insert("page", opts().id("page"))
            .unwrap();
        let base = Arc::new(builder.build());

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let base = Arc::clone(&base);
                std::thread::spawn(move || {
                    let mut ui = TreeManager::new(base);
                    let mut scope = ui.enter_scope("page").unwrap();
                    for i in 0..10 {
                        scope
                            .create_component("text", opts().id(format!("s{n}-{i}")))
                            .unwrap();
                    }
                    drop(scope);
                    assert!(ui.current_container().is_none());
                    ui.into_tree()
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            let tree = handle.join().unwrap();
            assert_eq!(tree.session_len(), 10);
            let positions: Vec<_> = tree
                .children("page", TierMask::SESSION)
                .into_iter()
                .map(|c| c.position().unwrap())
                .collect();
            assert_eq!(positions, (0..10).collect::<Vec<u32>>());
            for other in (0..4).filter(|o| *o != n) {
                assert!(tree.get_component(&format!("s{other}-0")).is_none());
            }
        }
        assert_eq!(base.len(), 2, "the shared base is never touched");
    }
}
