//! Layout pass over a scene tree.
//!
//! Two walks per pass. `measure` resolves sizes: top-down for absolute and
//! relative axes, bottom-up for auto-sized ones. `place` then positions every
//! measured node inside its parent and composes screen-space rectangles,
//! alpha and clip regions.

use std::collections::HashMap;

use glam::Vec2;
use petal_core::{Axes, Axis, LayoutError, NodeId};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::flow::FlowItem;
use crate::node::{Arrangement, Node, ResolvedLayout};
use crate::resolve::Placement;
use crate::tree::{Bounds, SceneTree};

/// Options for layout computation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutOptions {
    /// Width of the root viewport
    pub viewport_width: f32,
    /// Height of the root viewport
    pub viewport_height: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl LayoutOptions {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }
}

/// A measured child, as its parent sees it.
#[derive(Debug, Clone, Copy)]
struct Measured {
    id: NodeId,
    size: Vec2,
    placement: Placement,
}

/// What a parent hands down to its children during placement.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Screen position of the parent's (scaled) box
    origin: Vec2,
    scale: Vec2,
    alpha: f32,
    clip: Option<Bounds>,
}

impl Frame {
    const ROOT: Frame = Frame {
        origin: Vec2::ZERO,
        scale: Vec2::ONE,
        alpha: 1.0,
        clip: None,
    };
}

struct LayoutPass<'a> {
    nodes: &'a mut HashMap<NodeId, Node>,
    errors: Vec<LayoutError>,
}

/// Resolve every node reachable from the root.
///
/// Nodes whose configuration is rejected stay unresolved together with their
/// subtree; the rest of the tree is still laid out. The first error is returned.
pub(crate) fn compute_layout(tree: &mut SceneTree) -> Result<(), LayoutError> {
    for node in tree.nodes.values_mut() {
        node.measured = None;
        node.resolved = None;
    }

    let root = tree.root;
    let viewport = tree.options.viewport();
    let mut pass = LayoutPass {
        nodes: &mut tree.nodes,
        errors: Vec::new(),
    };

    match pass.measure(root, None, Axes::None, viewport) {
        Ok(size) => {
            let placement = pass.placement(root);
            let bounds = Bounds::from_vecs(placement.place(size, viewport), size);
            pass.place(root, bounds, &Frame::ROOT);
        }
        Err(err) => pass.errors.push(err),
    }

    trace!(errors = pass.errors.len(), "layout pass complete");
    match pass.errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl LayoutPass<'_> {
    fn placement(&self, id: NodeId) -> Placement {
        self.nodes.get(&id).map(Node::placement).unwrap_or_default()
    }

    fn measure(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        parent_auto: Axes,
        parent_content: Vec2,
    ) -> Result<Vec2, LayoutError> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(Vec2::ZERO);
        };
        let placement = node.placement();
        let auto = node.auto_size_axes;
        let padding = node.padding;
        let arrangement = node.kind.arrangement().copied();
        let children: SmallVec<[NodeId; 8]> = node.children.iter().copied().collect();

        for axis in Axis::BOTH {
            if auto.contains(axis) && placement.relative_size_axes.contains(axis) {
                return Err(LayoutError::ConflictingSizeModes { node: id, axis });
            }
            if let Some(parent) = parent {
                let relative = placement.relative_size_axes.contains(axis)
                    || placement.relative_position_axes.contains(axis);
                if parent_auto.contains(axis) && relative {
                    return Err(LayoutError::CircularAutoSize { node: id, parent, axis });
                }
            }
        }

        let mut size = placement.resolve_size(parent_content);
        for axis in Axis::BOTH {
            if auto.contains(axis) {
                axis.set(&mut size, 0.0);
            }
        }
        // Auto axes are still unknown here; nothing below may depend on them.
        let content = (size - padding.total()).max(Vec2::ZERO);

        let mut measured: SmallVec<[Measured; 8]> = SmallVec::new();
        for child in children {
            match self.measure(child, Some(id), auto, content) {
                Ok(child_size) => measured.push(Measured {
                    id: child,
                    size: child_size,
                    placement: self.placement(child),
                }),
                Err(err) => {
                    warn!(node = %child, error = %err, "subtree left unresolved");
                    self.errors.push(err);
                }
            }
        }

        for axis in Axis::BOTH {
            if !auto.contains(axis) {
                continue;
            }
            let extent = match arrangement {
                Some(Arrangement::Flow(flow)) if flow.direction.primary() == axis => {
                    let items: SmallVec<[FlowItem; 8]> = measured
                        .iter()
                        .map(|m| FlowItem::along(axis, m.size, &m.placement.margin))
                        .collect();
                    flow.arrange(&petal_core::MarginPadding::ZERO, &items).content_extent
                }
                _ => measured
                    .iter()
                    .map(|m| m.placement.required_extent(axis, axis.of(m.size)))
                    .fold(0.0, f32::max),
            };
            axis.set(&mut size, extent + padding.leading(axis) + padding.trailing(axis));
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.measured = Some(size);
        }
        Ok(size)
    }

    fn place(&mut self, id: NodeId, bounds: Bounds, frame: &Frame) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };

        // Scale about the origin point; layout size is unaffected.
        let origin = node.origin.fraction();
        let pivot = bounds.position() + origin * bounds.size();
        let drawn_size = bounds.size() * node.scale;
        let drawn_pos = pivot - origin * drawn_size;
        let screen_bounds = Bounds::from_vecs(
            frame.origin + drawn_pos * frame.scale,
            drawn_size * frame.scale,
        );
        let alpha = if node.visible {
            frame.alpha * node.alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scale = frame.scale * node.scale;
        node.resolved = Some(ResolvedLayout {
            bounds,
            screen_bounds,
            alpha,
            scale,
            clip: frame.clip,
        });

        let Some(arrangement) = node.kind.arrangement().copied() else {
            return;
        };
        let padding = node.padding;
        let children: SmallVec<[NodeId; 8]> = node.children.iter().copied().collect();

        let measured: SmallVec<[Measured; 8]> = children
            .iter()
            .filter_map(|&child| {
                let n = self.nodes.get(&child)?;
                Some(Measured {
                    id: child,
                    size: n.measured?,
                    placement: n.placement(),
                })
            })
            .collect();

        let content = (bounds.size() - padding.total()).max(Vec2::ZERO);
        let lead = padding.top_left();
        let mut clip = frame.clip;

        let placed: SmallVec<[(NodeId, Vec2); 8]> = match arrangement {
            Arrangement::Free => measured
                .iter()
                .map(|m| (m.id, m.placement.place(m.size, content) + lead))
                .collect(),
            Arrangement::Flow(flow) => {
                let primary = flow.direction.primary();
                let cross = flow.direction.cross();
                let items: SmallVec<[FlowItem; 8]> = measured
                    .iter()
                    .map(|m| FlowItem::along(primary, m.size, &m.placement.margin))
                    .collect();
                let arranged = flow.arrange(&padding, &items);
                measured
                    .iter()
                    .zip(arranged.offsets.iter())
                    .map(|(m, &offset)| {
                        let mut at = Vec2::ZERO;
                        primary.set(&mut at, offset);
                        let cross_at = m.placement.place_axis(cross, cross.of(m.size), cross.of(content))
                            + padding.leading(cross);
                        cross.set(&mut at, cross_at);
                        (m.id, at)
                    })
                    .collect()
            }
            Arrangement::Scroll(mut viewport) => {
                let local: SmallVec<[(NodeId, Vec2); 8]> = measured
                    .iter()
                    .map(|m| (m.id, m.placement.place(m.size, content) + lead))
                    .collect();

                let mut extent = Vec2::ZERO;
                for (m, (_, at)) in measured.iter().zip(local.iter()) {
                    let trailing = Vec2::new(m.placement.margin.right, m.placement.margin.bottom);
                    extent = extent.max(*at + m.size + trailing - lead);
                }
                viewport.set_extents(extent, content);
                let offset = viewport.offset();
                if let Some(v) = self.nodes.get_mut(&id).and_then(|n| n.scroll_viewport_mut()) {
                    *v = viewport;
                }

                clip = Some(match frame.clip {
                    Some(outer) => outer
                        .intersect(&screen_bounds)
                        .unwrap_or_else(|| Bounds::from_vecs(screen_bounds.position(), Vec2::ZERO)),
                    None => screen_bounds,
                });
                local.into_iter().map(|(child, at)| (child, at - offset)).collect()
            }
        };

        let child_frame = Frame {
            origin: screen_bounds.position(),
            scale,
            alpha,
            clip,
        };
        let sizes: HashMap<NodeId, Vec2> = measured.iter().map(|m| (m.id, m.size)).collect();
        for (child, at) in placed {
            let size = sizes.get(&child).copied().unwrap_or(Vec2::ZERO);
            self.place(child, Bounds::from_vecs(at, size), &child_frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowLayout;
    use crate::node::Shape;
    use crate::scroll::{ScrollConfig, ScrollDirection};
    use petal_core::{Anchor, MarginPadding};

    fn tree() -> SceneTree {
        SceneTree::new(LayoutOptions::default())
    }

    fn boxed(w: f32, h: f32) -> Node {
        Node::shape(Shape::Box).with_size(Vec2::new(w, h))
    }

    #[test]
    fn test_default_options() {
        let options = LayoutOptions::default();
        assert_eq!(options.viewport(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_root_fills_viewport() {
        let mut tree = tree();
        tree.update_layout().unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.bounds().unwrap(), Bounds::new(0.0, 0.0, 800.0, 600.0));

        tree.set_viewport(1024.0, 768.0);
        tree.update_layout().unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.resolved_size().unwrap(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_auto_sized_vertical_flow() {
        let mut tree = tree();
        let flow = tree
            .add(
                tree.root(),
                Node::flow(FlowLayout::vertical().with_spacing(Vec2::new(0.0, 10.0)))
                    .with_size(Vec2::new(200.0, 0.0))
                    .with_auto_size_axes(Axes::Y)
                    .with_padding(MarginPadding::uniform(5.0)),
            )
            .unwrap();
        let a = tree.add(flow, boxed(50.0, 100.0)).unwrap();
        let b = tree.add(flow, boxed(50.0, 50.0)).unwrap();
        tree.update_layout().unwrap();

        let size = tree.get(flow).unwrap().resolved_size().unwrap();
        assert!((size.x - 200.0).abs() < 0.001);
        assert!((size.y - 170.0).abs() < 0.001);

        let a = tree.get(a).unwrap().bounds().unwrap();
        let b = tree.get(b).unwrap().bounds().unwrap();
        assert!((a.y - 5.0).abs() < 0.001);
        assert!((a.x - 5.0).abs() < 0.001);
        assert!((b.y - 115.0).abs() < 0.001);
    }

    #[test]
    fn test_flow_padding_spacing_margin() {
        let mut tree = tree();
        let flow = tree
            .add(
                tree.root(),
                Node::flow(FlowLayout::horizontal().with_spacing(Vec2::splat(10.0)))
                    .fill_parent()
                    .with_padding(MarginPadding::uniform(15.0)),
            )
            .unwrap();
        let first = tree.add(flow, boxed(100.0, 100.0)).unwrap();
        let second = tree
            .add(flow, boxed(50.0, 50.0).with_margin(MarginPadding::default().with_left(20.0)))
            .unwrap();
        let third = tree
            .add(flow, boxed(50.0, 50.0).with_anchor(Anchor::CentreLeft).with_origin(Anchor::CentreLeft))
            .unwrap();
        tree.update_layout().unwrap();

        let first = tree.get(first).unwrap().screen_bounds().unwrap();
        let second = tree.get(second).unwrap().screen_bounds().unwrap();
        let third = tree.get(third).unwrap().screen_bounds().unwrap();
        assert!((first.x - 15.0).abs() < 0.001);
        assert!((first.y - 15.0).abs() < 0.001);
        assert!((second.x - 145.0).abs() < 0.001);
        assert!((third.x - 205.0).abs() < 0.001);
        // Cross axis keeps the child's own anchor: centred in 570 of content, after 15 padding.
        assert!((third.y - (15.0 + 285.0 - 25.0)).abs() < 0.001);
    }

    #[test]
    fn test_auto_size_free_container() {
        let mut tree = tree();
        let panel = tree
            .add(
                tree.root(),
                Node::container()
                    .with_auto_size_axes(Axes::Both)
                    .with_padding(MarginPadding::uniform(4.0)),
            )
            .unwrap();
        tree.add(panel, boxed(30.0, 40.0).with_position(Vec2::new(10.0, 20.0)))
            .unwrap();
        tree.add(panel, boxed(60.0, 10.0).aligned(Anchor::BottomRight)).unwrap();
        tree.update_layout().unwrap();

        let size = tree.get(panel).unwrap().resolved_size().unwrap();
        assert!((size.x - 68.0).abs() < 0.001);
        assert!((size.y - 68.0).abs() < 0.001);
    }

    #[test]
    fn test_nested_auto_size() {
        let mut tree = tree();
        let outer = tree
            .add(tree.root(), Node::flow(FlowLayout::vertical()).with_auto_size_axes(Axes::Both))
            .unwrap();
        let inner = tree
            .add(outer, Node::flow(FlowLayout::horizontal()).with_auto_size_axes(Axes::Both))
            .unwrap();
        tree.add(inner, boxed(20.0, 30.0)).unwrap();
        tree.add(inner, boxed(20.0, 50.0)).unwrap();
        tree.add(outer, boxed(10.0, 10.0)).unwrap();
        tree.update_layout().unwrap();

        assert_eq!(tree.get(inner).unwrap().resolved_size().unwrap(), Vec2::new(40.0, 50.0));
        assert_eq!(tree.get(outer).unwrap().resolved_size().unwrap(), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_relative_child_of_auto_axis_is_rejected() {
        let mut tree = tree();
        let root = tree.root();
        let parent = tree
            .add(
                root,
                Node::container()
                    .with_size(Vec2::new(100.0, 0.0))
                    .with_auto_size_axes(Axes::Y),
            )
            .unwrap();
        let bad = tree
            .add(parent, Node::shape(Shape::Box).fill_parent())
            .unwrap();
        let good = tree.add(root, boxed(10.0, 10.0)).unwrap();

        let err = tree.update_layout().unwrap_err();
        assert_eq!(
            err,
            LayoutError::CircularAutoSize {
                node: bad,
                parent,
                axis: Axis::Y
            }
        );
        assert!(tree.get(bad).unwrap().bounds().is_none());
        assert!(tree.get(parent).unwrap().bounds().is_some());
        assert!(tree.get(good).unwrap().bounds().is_some());
    }

    #[test]
    fn test_relative_on_other_axis_is_allowed() {
        let mut tree = tree();
        let parent = tree
            .add(
                tree.root(),
                Node::container()
                    .with_size(Vec2::new(300.0, 0.0))
                    .with_auto_size_axes(Axes::Y),
            )
            .unwrap();
        let child = tree
            .add(
                parent,
                Node::shape(Shape::Box)
                    .with_relative_size_axes(Axes::X)
                    .with_size(Vec2::new(0.5, 40.0)),
            )
            .unwrap();
        tree.update_layout().unwrap();
        assert_eq!(tree.get(child).unwrap().resolved_size().unwrap(), Vec2::new(150.0, 40.0));
        assert_eq!(tree.get(parent).unwrap().resolved_size().unwrap(), Vec2::new(300.0, 40.0));
    }

    #[test]
    fn test_conflicting_size_modes() {
        let mut tree = tree();
        let node = tree
            .add(
                tree.root(),
                Node::container()
                    .with_relative_size_axes(Axes::X)
                    .with_auto_size_axes(Axes::X),
            )
            .unwrap();
        let err = tree.update_layout().unwrap_err();
        assert_eq!(err, LayoutError::ConflictingSizeModes { node, axis: Axis::X });
    }

    #[test]
    fn test_scale_about_origin() {
        let mut tree = tree();
        let node = tree
            .add(
                tree.root(),
                boxed(100.0, 100.0).aligned(Anchor::Centre).with_scale(Vec2::splat(2.0)),
            )
            .unwrap();
        tree.update_layout().unwrap();

        let node = tree.get(node).unwrap();
        let layout = node.bounds().unwrap();
        let drawn = node.screen_bounds().unwrap();
        assert!((layout.width - 100.0).abs() < 0.001);
        assert!((drawn.x - 300.0).abs() < 0.001);
        assert!((drawn.y - 200.0).abs() < 0.001);
        assert!((drawn.width - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_children_follow_parent_scale() {
        let mut tree = tree();
        let parent = tree
            .add(
                tree.root(),
                Node::container()
                    .with_size(Vec2::splat(100.0))
                    .with_position(Vec2::new(50.0, 50.0))
                    .with_scale(Vec2::splat(0.5)),
            )
            .unwrap();
        let child = tree
            .add(parent, boxed(20.0, 20.0).with_position(Vec2::new(40.0, 40.0)))
            .unwrap();
        tree.update_layout().unwrap();

        let drawn = tree.get(child).unwrap().screen_bounds().unwrap();
        assert!((drawn.x - 70.0).abs() < 0.001);
        assert!((drawn.width - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_alpha_composes() {
        let mut tree = tree();
        let parent = tree
            .add(tree.root(), Node::container().fill_parent().with_alpha(0.5))
            .unwrap();
        let child = tree.add(parent, boxed(10.0, 10.0).with_alpha(0.5)).unwrap();
        let hidden = tree.add(parent, boxed(10.0, 10.0).with_visible(false)).unwrap();
        tree.update_layout().unwrap();

        assert!((tree.get(child).unwrap().draw_alpha() - 0.25).abs() < 0.001);
        assert_eq!(tree.get(hidden).unwrap().draw_alpha(), 0.0);
    }

    #[test]
    fn test_scroll_content_is_clamped_and_clipped() {
        let mut tree = tree();
        let scroll = tree
            .add(
                tree.root(),
                Node::scroll(ScrollConfig::new(ScrollDirection::Vertical)).with_size(Vec2::splat(500.0)),
            )
            .unwrap();
        let list = tree
            .add(
                scroll,
                Node::flow(FlowLayout::vertical())
                    .with_relative_size_axes(Axes::X)
                    .with_size(Vec2::new(1.0, 0.0))
                    .with_auto_size_axes(Axes::Y),
            )
            .unwrap();
        for _ in 0..15 {
            tree.add(list, boxed(100.0, 100.0)).unwrap();
        }
        tree.update_layout().unwrap();

        let viewport = *tree.get(scroll).unwrap().scroll_viewport().unwrap();
        assert_eq!(viewport.content_extent(), Vec2::new(500.0, 1500.0));
        assert_eq!(viewport.max_offset(), Vec2::new(0.0, 1000.0));

        let offset = tree.drag_by(scroll, Vec2::new(0.0, -5000.0)).unwrap();
        assert_eq!(offset, Vec2::new(0.0, 1000.0));
        tree.update_layout().unwrap();

        let list = tree.get(list).unwrap().layout().copied().unwrap();
        assert!((list.screen_bounds.y + 1000.0).abs() < 0.001);
        assert_eq!(list.clip, Some(Bounds::new(0.0, 0.0, 500.0, 500.0)));
    }

    #[test]
    fn test_scroll_on_plain_container_fails() {
        let mut tree = tree();
        let node = tree.add(tree.root(), Node::container()).unwrap();
        let err = tree.scroll_by(node, Vec2::new(0.0, 1.0)).unwrap_err();
        assert_eq!(err, petal_core::TreeError::NotScrollable { node });
    }

    #[test]
    fn test_detached_nodes_stay_unresolved() {
        let mut tree = tree();
        let detached = tree.insert(boxed(10.0, 10.0));
        tree.update_layout().unwrap();
        assert!(tree.get(detached).unwrap().bounds().is_none());
    }
}
