//! Frame driver: owns the tree, the scheduler and every screen stack.

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec2;
use indexmap::IndexMap;
use petal_core::{LoopId, NodeId, PetalError, ScreenError, ScreenId, TransformError, TreeError};
use petal_layout::{LayoutOptions, Node, SceneTree};
use petal_render_2d::{build_draw_list, DrawList};
use petal_screen::{Screen, ScreenStack};
use petal_transform::{Animatable, TransformScheduler, TransformSequence};
use tracing::{debug, trace, warn};

use crate::mutation::{Mutation, MutationSender};

/// Options for a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneOptions {
    pub layout: LayoutOptions,
}

impl SceneOptions {
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.layout = LayoutOptions::new(width, height);
        self
    }
}

/// A complete scene.
///
/// Call [`update`](Self::update) once per frame. It drains queued mutations,
/// advances transforms, settles finished screen transitions and re-runs
/// layout when anything changed.
pub struct Scene {
    tree: SceneTree,
    scheduler: TransformScheduler,
    stacks: IndexMap<NodeId, ScreenStack>,
    pending: VecDeque<Mutation>,
    inbox: Receiver<Mutation>,
    sender: Sender<Mutation>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneOptions::default())
    }
}

impl Scene {
    pub fn new(options: SceneOptions) -> Self {
        let (sender, inbox) = unbounded();
        Self {
            tree: SceneTree::new(options.layout),
            scheduler: TransformScheduler::new(),
            stacks: IndexMap::new(),
            pending: VecDeque::new(),
            inbox,
            sender,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    pub fn scheduler(&self) -> &TransformScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TransformScheduler {
        &mut self.scheduler
    }

    /// Stop a looping sequence at the next update.
    pub fn cancel_loop(&mut self, id: LoopId) {
        self.scheduler.cancel_loop(id);
    }

    /// Snap every pending transform of `node` to its end value.
    pub fn finish_transforms(&mut self, node: NodeId) {
        self.scheduler.finish(&mut self.tree, node);
    }

    /// Scene clock.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.tree.set_viewport(width, height);
    }

    /// Insert a node under `parent` right away.
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        self.tree.add(parent, node)
    }

    /// Destroy a node and its subtree, cancelling their transforms.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let removed = self.tree.remove(node)?;
        self.scheduler.cancel_nodes(removed.iter().copied());
        self.stacks.retain(|stack, _| !removed.contains(stack));
        Ok(removed)
    }

    /// Queue transforms on `node`.
    pub fn animate(&mut self, node: NodeId) -> Result<TransformSequence<'_, SceneTree>, TransformError> {
        self.scheduler.animate(&self.tree, node)
    }

    /// Queue a mutation for the start of the next update.
    pub fn defer(&mut self, mutation: Mutation) {
        self.pending.push_back(mutation);
    }

    /// Handle for queueing mutations from other threads.
    pub fn mutation_sender(&self) -> MutationSender {
        MutationSender {
            inner: self.sender.clone(),
        }
    }

    /// Create a full-size container under `parent` that hosts a screen stack.
    pub fn create_screen_stack(&mut self, parent: NodeId) -> Result<NodeId, TreeError> {
        let node = self
            .tree
            .add(parent, Node::container().fill_parent().with_name("screen-stack"))?;
        self.stacks.insert(node, ScreenStack::new(node));
        Ok(node)
    }

    pub fn screen_stack(&self, stack: NodeId) -> Option<&ScreenStack> {
        self.stacks.get(&stack)
    }

    fn stack_mut(&mut self, stack: NodeId) -> Result<&mut ScreenStack, ScreenError> {
        self.stacks
            .get_mut(&stack)
            .ok_or(ScreenError::UnknownStack { stack })
    }

    /// Register a screen with a stack without pushing it.
    pub fn create_screen(&mut self, stack: NodeId, screen: impl Screen + 'static) -> Result<ScreenId, ScreenError> {
        Ok(self.stack_mut(stack)?.create(screen))
    }

    /// Register a screen and push it in one step.
    pub fn push_new_screen(&mut self, stack: NodeId, screen: impl Screen + 'static) -> Result<ScreenId, PetalError> {
        let id = self.create_screen(stack, screen)?;
        self.push_screen(stack, id)?;
        Ok(id)
    }

    pub fn push_screen(&mut self, stack: NodeId, screen: ScreenId) -> Result<(), PetalError> {
        let stack = self
            .stacks
            .get_mut(&stack)
            .ok_or(ScreenError::UnknownStack { stack })?;
        stack.push(&mut self.tree, &mut self.scheduler, screen)
    }

    pub fn exit_screen(&mut self, stack: NodeId) -> Result<ScreenId, PetalError> {
        let stack = self
            .stacks
            .get_mut(&stack)
            .ok_or(ScreenError::UnknownStack { stack })?;
        stack.exit(&mut self.tree, &mut self.scheduler)
    }

    pub fn exit_screen_to(&mut self, stack: NodeId, screen: ScreenId) -> Result<Vec<ScreenId>, PetalError> {
        let stack = self
            .stacks
            .get_mut(&stack)
            .ok_or(ScreenError::UnknownStack { stack })?;
        stack.exit_to(&mut self.tree, &mut self.scheduler, screen)
    }

    /// Forward wheel input to a scroll container.
    pub fn scroll(&mut self, node: NodeId, wheel: Vec2) -> Result<Vec2, TreeError> {
        self.tree.scroll_by(node, wheel)
    }

    /// Forward a pointer drag to a scroll container.
    pub fn drag(&mut self, node: NodeId, delta: Vec2) -> Result<Vec2, TreeError> {
        self.tree.drag_by(node, delta)
    }

    /// Nodes under a screen-space point, innermost first.
    pub fn hit_test(&self, point: Vec2) -> Vec<NodeId> {
        self.tree.hit_test(point)
    }

    /// Renderer commands for the last layout pass.
    pub fn draw_list(&self) -> DrawList {
        build_draw_list(&self.tree)
    }

    /// Run one frame.
    ///
    /// Every step runs even if an earlier one failed; the first error is
    /// returned at the end.
    pub fn update(&mut self, dt: Duration) -> Result<(), PetalError> {
        let mut first_error: Option<PetalError> = None;

        self.pending.extend(self.inbox.try_iter());
        let drained = self.pending.len();
        while let Some(mutation) = self.pending.pop_front() {
            if let Err(err) = self.apply(mutation) {
                warn!(error = %err, "mutation failed");
                first_error.get_or_insert(err);
            }
        }

        self.scheduler.update(&mut self.tree, dt);

        for stack in self.stacks.values_mut() {
            let exited = stack.update(&mut self.tree, &mut self.scheduler);
            if !exited.is_empty() {
                debug!(stack = %stack.node(), count = exited.len(), "settled screen exits");
            }
        }

        if let Err(err) = self.tree.update_layout() {
            first_error.get_or_insert(err.into());
        }

        trace!(now = ?self.scheduler.now(), mutations = drained, "frame complete");
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), PetalError> {
        match mutation {
            Mutation::Add { parent, node } => {
                self.tree.add(parent, node)?;
            }
            Mutation::Remove(node) => {
                self.remove(node)?;
            }
            Mutation::Set { node, property, value } => {
                property.check(&value)?;
                if !self.tree.write(node, property, value) {
                    return Err(TreeError::UnknownNode { node }.into());
                }
            }
            Mutation::ScrollBy { node, wheel } => {
                self.tree.scroll_by(node, wheel)?;
            }
            Mutation::DragBy { node, delta } => {
                self.tree.drag_by(node, delta)?;
            }
            Mutation::Apply(f) => f(&mut self.tree)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_layout::Shape;
    use petal_transform::{Easing, Property, Value};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_deferred_mutations_apply_before_layout() {
        let mut scene = Scene::default();
        let root = scene.root();
        scene.defer(Mutation::Add {
            parent: root,
            node: Node::shape(Shape::Box).with_size(Vec2::splat(10.0)).with_name("late"),
        });
        assert_eq!(scene.tree().children(root).len(), 0);

        scene.update(Duration::ZERO).unwrap();
        let id = scene.tree().children(root)[0];
        assert!(scene.tree().get(id).unwrap().bounds().is_some());
    }

    #[test]
    fn test_sender_works_across_threads() {
        let mut scene = Scene::default();
        let root = scene.root();
        let box_id = scene.add(root, Node::shape(Shape::Box)).unwrap();
        let sender = scene.mutation_sender();

        std::thread::spawn(move || {
            sender
                .set(box_id, Property::Alpha, Value::Float(0.5))
                .unwrap();
            sender
                .apply(move |tree| {
                    tree.node_mut(box_id)?.depth = 3.0;
                    Ok(())
                })
                .unwrap();
        })
        .join()
        .unwrap();

        scene.update(ms(16)).unwrap();
        let node = scene.tree().get(box_id).unwrap();
        assert_eq!(node.alpha, 0.5);
        assert_eq!(node.depth, 3.0);
    }

    #[test]
    fn test_failed_mutation_does_not_block_the_frame() {
        let mut scene = Scene::default();
        let root = scene.root();
        scene.defer(Mutation::Remove(NodeId(999)));
        scene.defer(Mutation::Add {
            parent: root,
            node: Node::shape(Shape::Box),
        });

        let err = scene.update(ms(16)).unwrap_err();
        assert!(matches!(err, PetalError::Tree(TreeError::UnknownNode { .. })));
        assert_eq!(scene.tree().children(root).len(), 1);
    }

    #[test]
    fn test_set_with_wrong_shape_fails() {
        let mut scene = Scene::default();
        let id = scene.add(scene.root(), Node::shape(Shape::Box)).unwrap();
        scene.defer(Mutation::Set {
            node: id,
            property: Property::Position,
            value: Value::Float(1.0),
        });
        let err = scene.update(Duration::ZERO).unwrap_err();
        assert!(matches!(err, PetalError::Transform(TransformError::PropertyMismatch { .. })));
    }

    #[test]
    fn test_remove_cancels_transforms() {
        let mut scene = Scene::default();
        let parent = scene.add(scene.root(), Node::container()).unwrap();
        let child = scene.add(parent, Node::shape(Shape::Box)).unwrap();
        scene
            .animate(child)
            .unwrap()
            .fade_out(ms(100), Easing::Linear);
        scene.update(ms(10)).unwrap();

        let removed = scene.remove(parent).unwrap();
        assert_eq!(removed, vec![parent, child]);
        scene.update(ms(10)).unwrap();
        assert!(!scene.scheduler().has_pending(child));
    }

    #[test]
    fn test_finish_transforms_snaps_to_end() {
        let mut scene = Scene::default();
        let id = scene.add(scene.root(), Node::shape(Shape::Box)).unwrap();
        scene
            .animate(id)
            .unwrap()
            .fade_out(ms(100), Easing::Linear)
            .then()
            .depth_to(4.0, ms(100), Easing::Linear);
        scene.finish_transforms(id);

        let node = scene.tree().get(id).unwrap();
        assert_eq!(node.alpha, 0.0);
        assert_eq!(node.depth, 4.0);
        assert!(!scene.scheduler().has_pending(id));
    }

    #[test]
    fn test_removing_stack_node_drops_stack() {
        let mut scene = Scene::default();
        let stack = scene.create_screen_stack(scene.root()).unwrap();
        assert!(scene.screen_stack(stack).is_some());
        scene.remove(stack).unwrap();
        assert!(scene.screen_stack(stack).is_none());
        let err = scene.exit_screen(stack).unwrap_err();
        assert!(matches!(err, PetalError::Screen(ScreenError::UnknownStack { .. })));
    }
}
