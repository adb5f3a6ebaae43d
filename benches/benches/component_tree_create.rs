// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_component_tree::{BaseTree, ComponentOptions, TierMask, TreeManager};

/// Base tree with one page holding `n` positioned children.
fn base_with_children(n: usize) -> Arc<BaseTree> {
    let mut builder = BaseTree::builder();
    builder
        .insert("page", ComponentOptions::default().id("page"))
        .unwrap();
    for i in 0..n {
        builder
            .insert(
                "text",
                ComponentOptions::default()
                    .id(format!("b{i}"))
                    .parent_id("page"),
            )
            .unwrap();
    }
    Arc::new(builder.build())
}

fn bench_create_siblings(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_siblings");
    for &(base_n, session_n) in &[(0_usize, 1_000_usize), (10_000, 1_000)] {
        let base = base_with_children(base_n);
        group.throughput(Throughput::Elements(session_n as u64));
        group.bench_function(format!("base{base_n}_session{session_n}"), |b| {
            b.iter_batched(
                || TreeManager::new(Arc::clone(&base)),
                |mut ui| {
                    let mut scope = ui.enter_scope("page").unwrap();
                    for i in 0..session_n {
                        let c = scope
                            .create_component(
                                "text",
                                ComponentOptions::default()
                                    .id(format!("s{i}"))
                                    .content("text", i as u64),
                            )
                            .unwrap();
                        black_box(c.position());
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_generated_ids(c: &mut Criterion) {
    let base = base_with_children(0);
    c.bench_function("create_generated_ids_1000", |b| {
        b.iter_batched(
            || TreeManager::new(Arc::clone(&base)),
            |mut ui| {
                let mut scope = ui.enter_scope("page").unwrap();
                for _ in 0..1_000 {
                    black_box(
                        scope
                            .create_component("text", ComponentOptions::default())
                            .unwrap(),
                    );
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_ordered_children(c: &mut Criterion) {
    let base = base_with_children(5_000);
    let mut ui = TreeManager::new(base);
    {
        let mut scope = ui.enter_scope("page").unwrap();
        for _ in 0..5_000 {
            scope
                .create_component("text", ComponentOptions::default())
                .unwrap();
        }
    }
    c.bench_function("children_10k_across_tiers", |b| {
        b.iter(|| black_box(ui.tree().children("page", TierMask::all()).len()));
    });
}

criterion_group!(
    benches,
    bench_create_siblings,
    bench_generated_ids,
    bench_ordered_children
);
criterion_main!(benches);
