// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-tier component store.
//!
//! - [`BaseTree`]: the shared tier, assembled once at startup and then frozen.
//!   Sessions hold it behind an [`Arc`] and never mutate it.
//! - [`ComponentTree`]: one session's view, layering a private overlay over the
//!   base. All attachments and removals land in the overlay.
//!
//! Lookups check the overlay first, then the base. Ids are unique across both
//! tiers, so the order only matters for speed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::component::{Component, ROOT_ID};
use crate::error::{Result, TreeError};
use crate::options::ComponentOptions;
use crate::position;
use crate::tier::{Tier, TierMask};

/// Generate an id that no tier has taken yet.
fn fresh_id(tiers: &[&Tier]) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !tiers.iter().any(|tier| tier.contains(&id)) {
            return id;
        }
    }
}

/// Check that `component` can join `tiers` without breaking an invariant.
fn validate(tiers: &[&Tier], component: &Component) -> Result<()> {
    let id = component.id();
    if tiers.iter().any(|tier| tier.contains(id)) {
        return Err(TreeError::DuplicateId { id: id.into() });
    }
    let Some(parent_id) = component.parent_id() else {
        return Err(TreeError::DanglingParent {
            id: id.into(),
            parent_id: String::new(),
        });
    };
    if !tiers.iter().any(|tier| tier.contains(parent_id)) {
        return Err(TreeError::DanglingParent {
            id: id.into(),
            parent_id: parent_id.into(),
        });
    }
    if let Some(p) = component.position()
        && position::is_taken(tiers, parent_id, p)
    {
        return Err(TreeError::PositionTaken {
            parent_id: parent_id.into(),
            position: p,
        });
    }
    Ok(())
}

/// Children of `parent_id` across `tiers`: positioned ones by position, then
/// positionless ones in attach order.
fn ordered_children<'a>(tiers: &[&'a Tier], parent_id: &str) -> Vec<&'a Component> {
    let mut out: Vec<&Component> = tiers
        .iter()
        .flat_map(|tier| tier.children_of(parent_id))
        .collect();
    // Stable sort keeps attach order among positionless siblings.
    out.sort_by_key(|c| c.position().map_or((1, 0), |p| (0, p)));
    out
}

/// The shared base tier.
///
/// Always contains a root component with id [`ROOT_ID`].
#[derive(Clone, Debug)]
pub struct BaseTree {
    tier: Tier,
}

impl Default for BaseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseTree {
    /// A base tree holding only a root of type `"root"`.
    pub fn new() -> Self {
        BaseTreeBuilder::new().build()
    }

    /// Start assembling a base tree.
    pub fn builder() -> BaseTreeBuilder {
        BaseTreeBuilder::new()
    }

    /// Build a base tree from already formed components, e.g. a deserialized layout.
    ///
    /// Input order does not matter. Fails if the root is missing, an id repeats,
    /// a parent does not resolve, or two siblings share a position.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Result<Self> {
        let mut pending: BTreeMap<String, Component> = BTreeMap::new();
        for component in components {
            let id = component.id().to_owned();
            if pending.contains_key(&id) {
                return Err(TreeError::DuplicateId { id });
            }
            pending.insert(id, component);
        }
        let Some(root) = pending.remove(ROOT_ID) else {
            return Err(TreeError::RootUninitialized);
        };
        if let Some(parent_id) = root.parent_id() {
            return Err(TreeError::DanglingParent {
                id: root.id().into(),
                parent_id: parent_id.into(),
            });
        }
        let mut tier = Tier::default();
        tier.insert(root);

        // Walk outward from the root so parents are always attached before their children.
        let mut frontier = vec![ROOT_ID.to_owned()];
        while let Some(parent_id) = frontier.pop() {
            let ready: Vec<String> = pending
                .values()
                .filter(|c| c.parent_id() == Some(parent_id.as_str()))
                .map(|c| c.id().to_owned())
                .collect();
            for id in ready {
                if let Some(component) = pending.remove(&id) {
                    validate(&[&tier], &component)?;
                    tier.insert(component);
                    frontier.push(id);
                }
            }
        }
        if let Some(orphan) = pending.into_values().next() {
            return Err(TreeError::DanglingParent {
                id: orphan.id().into(),
                parent_id: orphan.parent_id().unwrap_or_default().into(),
            });
        }
        Ok(Self { tier })
    }

    /// The root component.
    pub fn root(&self) -> Option<&Component> {
        self.tier.get(ROOT_ID)
    }

    /// Look up a base-tier component.
    pub fn get(&self, id: &str) -> Option<&Component> {
        self.tier.get(id)
    }

    /// Number of base-tier components, root included.
    pub fn len(&self) -> usize {
        self.tier.len()
    }

    /// Returns true if the tier holds nothing, which only a corrupted tree could.
    pub fn is_empty(&self) -> bool {
        self.tier.len() == 0
    }
}

/// Startup-time assembly of a [`BaseTree`].
///
/// Components inserted here go through the same normalization as session
/// components but carry no provenance flag, and default to the root as parent.
#[derive(Clone, Debug)]
pub struct BaseTreeBuilder {
    tier: Tier,
}

impl Default for BaseTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseTreeBuilder {
    /// Builder seeded with a root of type `"root"`.
    pub fn new() -> Self {
        Self::with_root_type("root")
    }

    /// Builder seeded with a root of the given type.
    pub fn with_root_type(component_type: &str) -> Self {
        let mut tier = Tier::default();
        tier.insert(Component::root(component_type));
        Self { tier }
    }

    /// Add a base-tier component.
    pub fn insert(
        &mut self,
        component_type: &str,
        options: ComponentOptions,
    ) -> Result<&Component> {
        let ComponentOptions {
            id,
            parent_id,
            position,
            content,
            handlers,
            binding,
            positionless,
        } = options;
        let tiers = [&self.tier];
        let id = id.unwrap_or_else(|| fresh_id(&tiers));
        let parent_id = parent_id.unwrap_or_else(|| ROOT_ID.to_owned());
        let position =
            position.or_else(|| position::resolve(&tiers, &id, &parent_id, positionless));
        let component = Component::assemble(
            id,
            component_type,
            parent_id,
            position,
            None,
            content,
            handlers,
            binding,
        );
        validate(&tiers, &component)?;
        Ok(self.tier.insert(component))
    }

    /// Freeze the tier.
    pub fn build(self) -> BaseTree {
        BaseTree { tier: self.tier }
    }
}

/// One session's component tree: a private overlay on a shared [`BaseTree`].
///
/// Only the overlay is ever mutated. Attachment validates before it writes, so a
/// failed call leaves the tree exactly as it was.
#[derive(Clone, Debug)]
pub struct ComponentTree {
    base: Arc<BaseTree>,
    session: Tier,
    // id -> true if attached, false if removed, since the last drain
    updates: BTreeMap<String, bool>,
}

impl ComponentTree {
    /// Create an empty overlay on `base`.
    pub fn new(base: Arc<BaseTree>) -> Self {
        Self {
            base,
            session: Tier::default(),
            updates: BTreeMap::new(),
        }
    }

    /// The shared base tier.
    pub fn base(&self) -> &Arc<BaseTree> {
        &self.base
    }

    fn tiers(&self) -> [&Tier; 2] {
        [&self.session, &self.base.tier]
    }

    /// The root component, if the base tree has one.
    pub fn root(&self) -> Option<&Component> {
        self.base.root()
    }

    /// Look up a component in either tier.
    pub fn get_component(&self, id: &str) -> Option<&Component> {
        self.session.get(id).or_else(|| self.base.tier.get(id))
    }

    /// Which tier holds `id`, if any.
    pub fn tier_of(&self, id: &str) -> Option<TierMask> {
        if self.session.contains(id) {
            Some(TierMask::SESSION)
        } else if self.base.tier.contains(id) {
            Some(TierMask::BASE)
        } else {
            None
        }
    }

    /// Returns true if `id` is in one of the tiers selected by `mask`.
    pub fn contains(&self, id: &str, mask: TierMask) -> bool {
        self.tier_of(id).is_some_and(|tier| mask.contains(tier))
    }

    /// Number of components across both tiers.
    pub fn len(&self) -> usize {
        self.base.len() + self.session.len()
    }

    /// Returns true if neither tier holds anything.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of components in the session overlay.
    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    /// A fresh id, unused in either tier.
    pub fn generate_id(&self) -> String {
        fresh_id(&self.tiers())
    }

    /// Position a component `id` would take under `parent_id`.
    ///
    /// Returns `None` for positionless components. Otherwise this is one past the
    /// highest position ever used under `parent_id` in either tier, or `0`.
    pub fn determine_position(&self, id: &str, parent_id: &str, positionless: bool) -> Option<u32> {
        position::resolve(&self.tiers(), id, parent_id, positionless)
    }

    /// Attach a component to the session overlay.
    ///
    /// Fails with [`TreeError::DuplicateId`] if the id exists in either tier,
    /// [`TreeError::DanglingParent`] if the parent does not resolve, and
    /// [`TreeError::PositionTaken`] if a sibling already holds its position.
    pub fn attach(&mut self, component: Component) -> Result<&Component> {
        if let Err(err) = validate(&self.tiers(), &component) {
            log::warn!("rejected component `{}`: {err}", component.id());
            return Err(err);
        }
        log::debug!(
            "attach `{}` ({}) under `{}` at {:?}",
            component.id(),
            component.component_type(),
            component.parent_id().unwrap_or_default(),
            component.position(),
        );
        self.updates.insert(component.id().to_owned(), true);
        Ok(self.session.insert(component))
    }

    /// Remove a session component together with its descendants.
    ///
    /// Returns the removed components, the requested one first. Base-tier
    /// components cannot be removed from a session.
    pub fn remove(&mut self, id: &str) -> Result<Vec<Component>> {
        match self.tier_of(id) {
            Some(tier) if tier == TierMask::SESSION => {}
            Some(_) => return Err(TreeError::BaseTierImmutable { id: id.into() }),
            None => return Err(TreeError::not_found(id)),
        }
        let mut order = vec![id.to_owned()];
        let mut i = 0;
        while let Some(current) = order.get(i) {
            let kids = self.session.child_ids(current).to_vec();
            order.extend(kids);
            i += 1;
        }
        let mut removed = Vec::with_capacity(order.len());
        for id in order {
            if let Some(component) = self.session.remove(&id) {
                log::debug!("remove `{id}`");
                self.updates.insert(id, false);
                removed.push(component);
            }
        }
        Ok(removed)
    }

    /// Children of `parent_id` in the selected tiers, in display order.
    ///
    /// Positioned children come first, sorted by position; positionless ones
    /// follow in attach order.
    pub fn children(&self, parent_id: &str, mask: TierMask) -> Vec<&Component> {
        let mut tiers = Vec::with_capacity(2);
        if mask.contains(TierMask::BASE) {
            tiers.push(&self.base.tier);
        }
        if mask.contains(TierMask::SESSION) {
            tiers.push(&self.session);
        }
        ordered_children(&tiers, parent_id)
    }

    /// Iterate every component, base tier first.
    pub fn iter(&self) -> impl Iterator<Item = &Component> + '_ {
        self.base.tier.iter().chain(self.session.iter())
    }

    /// Take the session changes recorded since the previous drain.
    ///
    /// Attached components map to `Some`, removed ids to `None`.
    pub fn drain_updates(&mut self) -> BTreeMap<String, Option<Component>> {
        core::mem::take(&mut self.updates)
            .into_iter()
            .map(|(id, attached)| {
                let component = if attached {
                    self.session.get(&id).cloned()
                } else {
                    None
                };
                (id, component)
            })
            .collect()
    }
}

impl Serialize for ComponentTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let merged: BTreeMap<&str, &Component> = self.iter().map(|c| (c.id(), c)).collect();
        let mut map = serializer.serialize_map(Some(merged.len()))?;
        for (id, component) in merged {
            map.serialize_entry(id, component)?;
        }
        map.end()
    }
}
