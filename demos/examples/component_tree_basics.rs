// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component tree basics.
//!
//! Open container scopes, declare components inside them, and print the tree
//! the way a transport layer would ship it.
//!
//! Run:
//! - `cargo run -p understory_demos --example component_tree_basics`

use std::sync::Arc;

use serde_json::json;
use understory_component_tree::{
    BaseTree, ComponentOptions, Handler, TierMask, TreeError, TreeManager,
};

fn main() -> Result<(), TreeError> {
    let mut ui = TreeManager::new(Arc::new(BaseTree::new()));

    // Containers may sit directly under the root.
    let section = ui.create_container_component(
        "section",
        ComponentOptions::default()
            .id("c1")
            .content("title", "Inventory"),
    )?;

    {
        let mut scope = ui.enter_scope(section.id())?;
        for (name, count) in [("plant", 3), ("cup", 12)] {
            scope.create_component(
                "text",
                ComponentOptions::default().content("text", format!("{name}: {count}")),
            )?;
        }
        scope.create_component(
            "button",
            ComponentOptions::default()
                .content("text", "Restock")
                .content("style", json!({"primary": true}))
                .handler("click", Handler::named("restock")),
        )?;
        // Out-of-band component: no position is reserved for it.
        scope.create_component(
            "message",
            ComponentOptions::default().positionless(),
        )?;
    }

    for child in ui.tree().children("c1", TierMask::all()) {
        println!(
            "{:>4} {:<8} {:?}",
            child
                .position()
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            child.component_type(),
            child.content()
        );
    }

    // Outside any scope, only containers can be created.
    let err = ui
        .create_component("text", ComponentOptions::default())
        .unwrap_err();
    println!("outside a container: {err}");

    let wire = serde_json::to_string_pretty(ui.tree()).expect("tree serializes");
    println!("{wire}");
    Ok(())
}
