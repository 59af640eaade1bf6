//! Layout and transform benchmarks.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use petal::prelude::*;

fn flow_scene(rows: usize) -> Scene {
    let mut scene = Scene::new(SceneOptions::default().with_viewport(1280.0, 720.0));
    let scroll = scene
        .add(
            scene.root(),
            Node::scroll(ScrollConfig::new(ScrollDirection::Vertical)).fill_parent(),
        )
        .unwrap();
    let list = scene
        .add(
            scroll,
            Node::flow(FlowLayout::vertical().with_spacing(Vec2::splat(10.0)))
                .with_relative_size_axes(Axes::X)
                .with_size(Vec2::new(1.0, 0.0))
                .with_auto_size_axes(Axes::Y),
        )
        .unwrap();
    for i in 0..rows {
        let row = scene
            .add(
                list,
                Node::flow(FlowLayout::horizontal().with_spacing(Vec2::splat(4.0)))
                    .with_auto_size_axes(Axes::Both)
                    .with_padding(MarginPadding::uniform(5.0)),
            )
            .unwrap();
        for j in 0..8 {
            scene
                .add(
                    row,
                    Node::shape(Shape::Box)
                        .with_size(Vec2::new(40.0 + j as f32, 20.0 + (i % 5) as f32))
                        .with_depth(-(j as f32)),
                )
                .unwrap();
        }
    }
    scene
}

fn layout_small(c: &mut Criterion) {
    let mut scene = flow_scene(10);
    c.bench_function("layout_small", |b| {
        b.iter(|| {
            scene.tree_mut().invalidate();
            black_box(scene.tree_mut().update_layout())
        })
    });
}

fn layout_large(c: &mut Criterion) {
    let mut scene = flow_scene(500);
    c.bench_function("layout_large", |b| {
        b.iter(|| {
            scene.tree_mut().invalidate();
            black_box(scene.tree_mut().update_layout())
        })
    });
}

fn frame_with_transforms(c: &mut Criterion) {
    let mut scene = flow_scene(100);
    let ids: Vec<NodeId> = scene.tree().descendants_inclusive(scene.root());
    c.bench_function("frame_with_transforms", |b| {
        b.iter(|| {
            for &id in ids.iter().skip(1).step_by(3) {
                if let Ok(seq) = scene.animate(id) {
                    seq.fade_to(0.5, Duration::from_millis(100), Easing::OutQuint);
                }
            }
            black_box(scene.update(Duration::from_millis(16)))
        })
    });
}

fn draw_list(c: &mut Criterion) {
    let mut scene = flow_scene(100);
    let _ = scene.update(Duration::ZERO);
    c.bench_function("draw_list", |b| b.iter(|| black_box(scene.draw_list())));
}

criterion_group!(benches, layout_small, layout_large, frame_with_transforms, draw_list);
criterion_main!(benches);
