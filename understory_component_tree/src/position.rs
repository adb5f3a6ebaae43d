// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sibling position assignment.
//!
//! A new component goes after the highest position ever used under its parent,
//! looking across every tier. Each tier keeps that high-water mark per parent, so
//! resolving is a couple of map lookups and existing siblings are never renumbered.
//! The price is that positions freed by removal are not handed out again.
//!
//! Positionless components get no position and reserve nothing.

use crate::tier::Tier;

/// Resolve the position for `id` under `parent_id`.
///
/// If `id` is already attached under the same parent, its existing position is
/// returned unchanged.
pub(crate) fn resolve(
    tiers: &[&Tier],
    id: &str,
    parent_id: &str,
    positionless: bool,
) -> Option<u32> {
    if positionless {
        return None;
    }
    if let Some(existing) = tiers
        .iter()
        .find_map(|tier| tier.get(id))
        .filter(|c| c.parent_id() == Some(parent_id))
    {
        return existing.position();
    }
    let position = tiers
        .iter()
        .filter_map(|tier| tier.max_position(parent_id))
        .max()
        .map_or(0, |max| max.saturating_add(1));
    log::trace!("resolved position {position} for `{id}` under `{parent_id}`");
    Some(position)
}

/// Returns true if any tier already has a sibling at `position` under `parent_id`.
pub(crate) fn is_taken(tiers: &[&Tier], parent_id: &str, position: u32) -> bool {
    tiers
        .iter()
        .any(|tier| tier.position_taken(parent_id, position))
}
