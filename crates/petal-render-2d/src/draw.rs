//! Draw list building from a laid-out scene tree.

use glam::Vec2;
use petal_core::NodeId;
use petal_layout::{Arrangement, Bounds, NodeKind, SceneTree, Shape};
use tracing::trace;

use crate::primitives::{DrawList, LinePrimitive, RectPrimitive, TrianglePrimitive};

/// Build the draw list for the last layout pass of `tree`.
///
/// Siblings are visited in descending depth, so lower depth ends up in
/// front. Scroll containers bracket their children with a clip push and pop.
/// Nodes that are unresolved, hidden or fully transparent draw nothing and
/// neither do their children.
pub fn build_draw_list(tree: &SceneTree) -> DrawList {
    let viewport = tree.options().viewport();
    let mut list = DrawList::new(viewport.x, viewport.y);
    let mut builder = DrawListBuilder {
        list: &mut list,
        tree,
    };
    builder.build_node(tree.root());
    trace!(commands = list.len(), "built draw list");
    list
}

struct DrawListBuilder<'a> {
    list: &'a mut DrawList,
    tree: &'a SceneTree,
}

impl<'a> DrawListBuilder<'a> {
    fn build_node(&mut self, id: NodeId) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        let Some(layout) = node.layout() else {
            return;
        };
        if layout.alpha <= 0.0 {
            return;
        }

        let bounds = layout.screen_bounds;
        let color = node.color.multiply_alpha(layout.alpha);

        match node.kind {
            NodeKind::Shape(Shape::Box) => {
                self.list.rect(RectPrimitive::new(id, bounds, color));
            }
            NodeKind::Shape(Shape::Triangle) => {
                self.list.triangle(TrianglePrimitive {
                    node: id,
                    points: triangle_points(&bounds),
                    color,
                });
            }
            NodeKind::Shape(Shape::Line { from, to, thickness }) => {
                self.list.line(LinePrimitive {
                    node: id,
                    from: bounds.position() + from.point_in(bounds.size()),
                    to: bounds.position() + to.point_in(bounds.size()),
                    thickness: thickness * layout.scale.min_element(),
                    color,
                });
            }
            NodeKind::Container(arrangement) => {
                let clips = matches!(arrangement, Arrangement::Scroll(_));
                if clips {
                    let region = match layout.clip {
                        Some(outer) => outer.intersect(&bounds),
                        None => Some(bounds),
                    };
                    // Scrolled entirely out of an enclosing viewport.
                    let Some(region) = region else {
                        return;
                    };
                    self.list.push_clip(region.into());
                }
                for child in self.tree.draw_children(id) {
                    self.build_node(child);
                }
                if clips {
                    self.list.pop_clip();
                }
            }
        }
    }
}

/// Apex at the top centre, base along the bottom edge.
fn triangle_points(bounds: &Bounds) -> [Vec2; 3] {
    [
        Vec2::new(bounds.center().x, bounds.y),
        Vec2::new(bounds.right(), bounds.bottom()),
        Vec2::new(bounds.x, bounds.bottom()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{ClipRegion, RenderCommand};
    use petal_core::{Anchor, Axes, Color};
    use petal_layout::{FlowLayout, LayoutOptions, Node, ScrollConfig};

    fn tree() -> SceneTree {
        SceneTree::new(LayoutOptions::new(1000.0, 1000.0))
    }

    #[test]
    fn test_box_becomes_rect() {
        let mut tree = tree();
        let id = tree
            .add(
                tree.root(),
                Node::shape(Shape::Box)
                    .aligned(Anchor::Centre)
                    .with_size(Vec2::splat(100.0))
                    .with_color(Color::rgb(1.0, 0.0, 0.0)),
            )
            .unwrap();
        tree.update_layout().unwrap();

        let list = build_draw_list(&tree);
        assert_eq!(list.len(), 1);
        match &list.commands[0] {
            RenderCommand::Rect(rect) => {
                assert_eq!(rect.node, id);
                assert_eq!(rect.bounds(), Bounds::new(450.0, 450.0, 100.0, 100.0));
                assert_eq!(rect.color, Color::rgb(1.0, 0.0, 0.0));
            }
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_orders_siblings() {
        let mut tree = tree();
        let root = tree.root();
        let shape = || Node::shape(Shape::Box).with_size(Vec2::splat(10.0));
        let a = tree.add(root, shape()).unwrap();
        let front = tree.add(root, shape().with_depth(-100.0)).unwrap();
        let b = tree.add(root, shape()).unwrap();
        let back = tree.add(root, shape().with_depth(5.0)).unwrap();
        tree.update_layout().unwrap();

        assert_eq!(build_draw_list(&tree).drawn_nodes(), vec![back, a, b, front]);
    }

    #[test]
    fn test_alpha_is_applied_and_hidden_skipped() {
        let mut tree = tree();
        let root = tree.root();
        let parent = tree
            .add(root, Node::container().fill_parent().with_alpha(0.5))
            .unwrap();
        let child = tree
            .add(parent, Node::shape(Shape::Box).with_size(Vec2::ONE).with_alpha(0.5))
            .unwrap();
        let hidden = tree
            .add(parent, Node::container().fill_parent().with_visible(false))
            .unwrap();
        tree.add(hidden, Node::shape(Shape::Box).with_size(Vec2::ONE)).unwrap();
        tree.update_layout().unwrap();

        let list = build_draw_list(&tree);
        assert_eq!(list.drawn_nodes(), vec![child]);
        match &list.commands[0] {
            RenderCommand::Rect(rect) => assert!((rect.color.a - 0.25).abs() < 0.001),
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_scroll_children_are_clipped() {
        let mut tree = tree();
        let scroll = tree
            .add(
                tree.root(),
                Node::scroll(ScrollConfig::default())
                    .with_position(Vec2::new(100.0, 100.0))
                    .with_size(Vec2::splat(200.0)),
            )
            .unwrap();
        let inner = tree
            .add(scroll, Node::shape(Shape::Box).with_size(Vec2::new(200.0, 800.0)))
            .unwrap();
        tree.update_layout().unwrap();

        let list = build_draw_list(&tree);
        assert_eq!(
            list.commands.first(),
            Some(&RenderCommand::PushClip(ClipRegion {
                x: 100.0,
                y: 100.0,
                width: 200.0,
                height: 200.0
            }))
        );
        assert_eq!(list.drawn_nodes(), vec![inner]);
        assert_eq!(list.commands.last(), Some(&RenderCommand::PopClip));
    }

    #[test]
    fn test_nested_scroll_outside_outer_viewport_draws_nothing() {
        let mut tree = tree();
        let outer = tree
            .add(
                tree.root(),
                Node::scroll(ScrollConfig::default()).with_size(Vec2::splat(200.0)),
            )
            .unwrap();
        let list = tree
            .add(
                outer,
                Node::flow(FlowLayout::vertical())
                    .with_size(Vec2::new(200.0, 0.0))
                    .with_auto_size_axes(Axes::Y),
            )
            .unwrap();
        let inner = tree
            .add(list, Node::scroll(ScrollConfig::default()).with_size(Vec2::splat(200.0)))
            .unwrap();
        let hidden = tree
            .add(inner, Node::shape(Shape::Box).with_size(Vec2::splat(50.0)))
            .unwrap();
        let tail = tree
            .add(list, Node::shape(Shape::Box).with_size(Vec2::new(200.0, 600.0)))
            .unwrap();
        tree.update_layout().unwrap();
        tree.drag_by(outer, Vec2::new(0.0, -500.0)).unwrap();
        tree.update_layout().unwrap();

        let list_commands = build_draw_list(&tree);
        let clips: Vec<ClipRegion> = list_commands
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::PushClip(region) => Some(*region),
                _ => None,
            })
            .collect();
        assert_eq!(
            clips,
            vec![ClipRegion {
                x: 0.0,
                y: 0.0,
                width: 200.0,
                height: 200.0
            }]
        );
        assert_eq!(list_commands.drawn_nodes(), vec![tail]);
        assert!(tree.hit_test(Vec2::new(10.0, 10.0)).contains(&tail));
        assert!(tree.hit_test(Vec2::new(10.0, -450.0)).is_empty());
        assert!(tree.get(hidden).unwrap().layout().is_some());
    }

    #[test]
    fn test_triangle_and_line_geometry() {
        let mut tree = tree();
        let root = tree.root();
        tree.add(root, Node::shape(Shape::Triangle).with_size(Vec2::new(100.0, 50.0)))
            .unwrap();
        tree.add(
            root,
            Node::shape(Shape::Line {
                from: Anchor::TopLeft,
                to: Anchor::BottomRight,
                thickness: 2.0,
            })
            .with_size(Vec2::splat(10.0))
            .with_position(Vec2::new(10.0, 10.0)),
        )
        .unwrap();
        tree.update_layout().unwrap();

        let list = build_draw_list(&tree);
        match &list.commands[0] {
            RenderCommand::Triangle(t) => {
                assert_eq!(t.points[0], Vec2::new(50.0, 0.0));
                assert_eq!(t.points[1], Vec2::new(100.0, 50.0));
                assert_eq!(t.points[2], Vec2::new(0.0, 50.0));
            }
            other => panic!("expected triangle, got {:?}", other),
        }
        match &list.commands[1] {
            RenderCommand::Line(line) => {
                assert_eq!(line.from, Vec2::new(10.0, 10.0));
                assert_eq!(line.to, Vec2::new(20.0, 20.0));
                assert_eq!(line.thickness, 2.0);
            }
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_tree_draws_nothing() {
        let mut tree = tree();
        tree.add(tree.root(), Node::shape(Shape::Box)).unwrap();
        assert!(build_draw_list(&tree).is_empty());
    }
}
