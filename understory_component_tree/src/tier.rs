// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One tier of the component store.

use std::collections::HashMap;

use crate::component::Component;

bitflags::bitflags! {
    /// Selects which tiers of a [`ComponentTree`](crate::ComponentTree) a query looks at.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TierMask: u8 {
        /// The shared base tree assembled at startup.
        const BASE    = 0b0000_0001;
        /// The per-session overlay.
        const SESSION = 0b0000_0010;
    }
}

impl Default for TierMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Components of one tier plus the per-parent indexes used for ordering.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tier {
    components: HashMap<String, Component>,
    // parent id -> child ids in attach order
    children: HashMap<String, Vec<String>>,
    // parent id -> highest position ever attached under it; survives removals
    high_water: HashMap<String, u32>,
}

impl Tier {
    pub(crate) fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.values()
    }

    /// Children of `parent_id` in attach order.
    pub(crate) fn children_of<'a>(
        &'a self,
        parent_id: &str,
    ) -> impl Iterator<Item = &'a Component> + use<'a> {
        self.children
            .get(parent_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.components.get(id))
    }

    pub(crate) fn child_ids(&self, parent_id: &str) -> &[String] {
        self.children.get(parent_id).map_or(&[], Vec::as_slice)
    }

    /// Highest position ever used under `parent_id` in this tier.
    pub(crate) fn max_position(&self, parent_id: &str) -> Option<u32> {
        self.high_water.get(parent_id).copied()
    }

    /// Returns true if a live position-bearing child of `parent_id` holds `position`.
    pub(crate) fn position_taken(&self, parent_id: &str, position: u32) -> bool {
        self.children_of(parent_id)
            .any(|c| c.position() == Some(position))
    }

    /// Insert a validated component and index it under its parent.
    pub(crate) fn insert(&mut self, component: Component) -> &Component {
        let id = component.id().to_owned();
        if let Some(parent_id) = component.parent_id() {
            self.children
                .entry(parent_id.to_owned())
                .or_default()
                .push(id.clone());
            if let Some(position) = component.position() {
                let mark = self.high_water.entry(parent_id.to_owned()).or_insert(position);
                *mark = (*mark).max(position);
            }
        }
        self.components.entry(id).or_insert(component)
    }

    /// Remove one component and unlink it from its parent. Children are left alone.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Component> {
        let component = self.components.remove(id)?;
        if let Some(parent_id) = component.parent_id()
            && let Some(siblings) = self.children.get_mut(parent_id)
        {
            siblings.retain(|c| c != id);
            if siblings.is_empty() {
                self.children.remove(parent_id);
            }
        }
        Some(component)
    }
}
