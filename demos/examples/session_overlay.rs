// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session overlays.
//!
//! Two sessions share one base layout. Each adds its own components, which are
//! ordered after the base children and invisible to the other session.
//!
//! Run:
//! - `cargo run -p understory_demos --example session_overlay`

use std::sync::Arc;

use understory_component_tree::{BaseTree, ComponentOptions, TierMask, TreeManager};

fn main() {
    let mut builder = BaseTree::builder();
    builder
        .insert("page", ComponentOptions::default().id("main"))
        .expect("fresh builder");
    for text in ["Header", "Intro"] {
        builder
            .insert(
                "text",
                ComponentOptions::default()
                    .parent_id("main")
                    .content("text", text),
            )
            .expect("page exists");
    }
    let base = Arc::new(builder.build());

    let mut alice = TreeManager::new(Arc::clone(&base));
    let mut bob = TreeManager::new(Arc::clone(&base));

    alice
        .with_scope("main", |ui| {
            ui.create_component(
                "text",
                ComponentOptions::default()
                    .id("greeting")
                    .content("text", "Hi Alice"),
            )?;
            Ok(())
        })
        .expect("alice builds");

    println!("alice sees:");
    for c in alice.tree().children("main", TierMask::all()) {
        println!("  {:?} {}", c.position(), c.id());
    }
    println!(
        "bob sees greeting: {}",
        bob.find("greeting").is_ok()
    );

    // Deltas for the transport layer.
    let updates = alice.tree_mut().drain_updates();
    println!("alice updates: {:?}", updates.keys().collect::<Vec<_>>());

    bob.tree_mut().remove("main").expect_err("base components are shared");
}
