//! Screen navigation stack.
//!
//! Screens are registered with [`ScreenStack::create`] and then pushed and
//! exited in LIFO order. The top of the navigation order is the only
//! `Current` screen; everything beneath it is `Suspended`. An exited screen
//! leaves the order at once but keeps its subtree until its exit transforms
//! have played out.

use std::time::Duration;

use indexmap::IndexMap;
use petal_core::{NodeId, PetalError, ScreenError, ScreenId};
use petal_layout::SceneTree;
use petal_transform::TransformScheduler;
use tracing::{debug, warn};

use crate::screen::{Screen, ScreenContext, ScreenState};

struct ScreenSlot {
    behaviour: Box<dyn Screen>,
    state: ScreenState,
    /// Pre-built root supplied at registration
    adopted_root: Option<NodeId>,
    root: Option<NodeId>,
    transition_end: Duration,
}

/// A LIFO stack of screens hosted under one container node.
pub struct ScreenStack {
    node: NodeId,
    order: Vec<ScreenId>,
    exiting: Vec<ScreenId>,
    screens: IndexMap<ScreenId, ScreenSlot>,
    next_id: u64,
}

impl std::fmt::Debug for ScreenStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenStack")
            .field("node", &self.node)
            .field("order", &self.order)
            .field("exiting", &self.exiting)
            .finish_non_exhaustive()
    }
}

impl ScreenStack {
    /// Host screens under `node`, which must be a container.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            order: Vec::new(),
            exiting: Vec::new(),
            screens: IndexMap::new(),
            next_id: 1,
        }
    }

    /// The container node screens are attached under.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Register a screen. Its root is built from [`Screen::root_node`] when pushed.
    pub fn create(&mut self, screen: impl Screen + 'static) -> ScreenId {
        self.register(Box::new(screen), None)
    }

    /// Register a screen whose root is an existing, unparented node.
    pub fn create_with_root(&mut self, screen: impl Screen + 'static, root: NodeId) -> ScreenId {
        self.register(Box::new(screen), Some(root))
    }

    fn register(&mut self, behaviour: Box<dyn Screen>, adopted_root: Option<NodeId>) -> ScreenId {
        let id = ScreenId(self.next_id);
        self.next_id += 1;
        self.screens.insert(
            id,
            ScreenSlot {
                behaviour,
                state: ScreenState::Created,
                adopted_root,
                root: None,
                transition_end: Duration::ZERO,
            },
        );
        id
    }

    /// Screen currently on top.
    pub fn current(&self) -> Option<ScreenId> {
        self.order.last().copied()
    }

    /// Navigation order, bottom first.
    pub fn screens(&self) -> &[ScreenId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn state(&self, screen: ScreenId) -> Option<ScreenState> {
        self.screens.get(&screen).map(|s| s.state)
    }

    /// Root node of a pushed screen.
    pub fn root(&self, screen: ScreenId) -> Option<NodeId> {
        self.screens.get(&screen).and_then(|s| s.root)
    }

    /// Whether the screen's last enter, resume, suspend or exit transition is still playing.
    pub fn is_transitioning(&self, screen: ScreenId, scheduler: &TransformScheduler) -> bool {
        self.screens
            .get(&screen)
            .is_some_and(|s| s.state == ScreenState::Exiting || s.transition_end > scheduler.now())
    }

    /// Screens that left the order but are still on display.
    pub fn exiting(&self) -> &[ScreenId] {
        &self.exiting
    }

    /// Push a registered screen on top of the stack.
    pub fn push(
        &mut self,
        tree: &mut SceneTree,
        scheduler: &mut TransformScheduler,
        screen: ScreenId,
    ) -> Result<(), PetalError> {
        if !tree.is_attached(self.node) {
            return Err(ScreenError::Detached { stack: self.node }.into());
        }
        let slot = self
            .screens
            .get(&screen)
            .ok_or(ScreenError::UnknownScreen { screen })?;
        if slot.state != ScreenState::Created {
            return Err(ScreenError::AlreadyStacked { screen }.into());
        }
        if let Some(root) = slot.adopted_root {
            if let Some(parent) = tree.node(root)?.parent() {
                return Err(ScreenError::AlreadyOwned { screen, parent }.into());
            }
        }

        let adopted = slot.adopted_root.is_some();
        let root = match slot.adopted_root {
            Some(root) => root,
            None => tree.insert(slot.behaviour.root_node()),
        };
        if let Err(err) = tree.add_child(self.node, root) {
            if !adopted {
                discard_subtree(tree, scheduler, root);
            }
            return Err(err.into());
        }
        self.slot_mut(screen)?.root = Some(root);

        // Nothing is visible to the rest of the stack until the screen has loaded.
        if let Err(err) = self.run(tree, scheduler, screen, ScreenState::Entering, |behaviour, ctx| {
            behaviour.load(ctx)
        }) {
            self.abort_push(tree, scheduler, screen, None);
            return Err(err);
        }
        let load_end = self.slot(screen)?.transition_end;

        let last = self.current();
        if let Some(last) = last {
            if let Err(err) = self.run(tree, scheduler, last, ScreenState::Suspended, |behaviour, ctx| {
                behaviour.on_suspending(ctx, screen)
            }) {
                self.abort_push(tree, scheduler, screen, Some(last));
                return Err(err);
            }
        }

        self.order.push(screen);
        if let Err(err) = self.run(tree, scheduler, screen, ScreenState::Entering, |behaviour, ctx| {
            behaviour.on_entering(ctx, last)
        }) {
            self.abort_push(tree, scheduler, screen, last);
            return Err(err);
        }
        let slot = self.slot_mut(screen)?;
        slot.transition_end = slot.transition_end.max(load_end);
        slot.state = ScreenState::Current;
        debug!(stack = %self.node, %screen, depth = self.order.len(), "pushed screen");
        Ok(())
    }

    /// Undo a push that failed part way: the screen is torn down and `last`
    /// is put back on top.
    fn abort_push(
        &mut self,
        tree: &mut SceneTree,
        scheduler: &mut TransformScheduler,
        screen: ScreenId,
        last: Option<ScreenId>,
    ) {
        self.order.retain(|id| *id != screen);
        if let Some(slot) = self.screens.get_mut(&screen) {
            slot.state = ScreenState::Exited;
            if let Some(root) = slot.root.take() {
                discard_subtree(tree, scheduler, root);
            }
        }
        if let Some(slot) = last.and_then(|id| self.screens.get_mut(&id)) {
            slot.state = ScreenState::Current;
        }
        warn!(stack = %self.node, %screen, "push failed, screen discarded");
    }

    /// Pop the top screen. Returns the screen that left.
    pub fn exit(
        &mut self,
        tree: &mut SceneTree,
        scheduler: &mut TransformScheduler,
    ) -> Result<ScreenId, PetalError> {
        let Some(top) = self.order.pop() else {
            return Err(ScreenError::EmptyStack { stack: self.node }.into());
        };
        let next = self.current();
        self.exiting.push(top);
        self.run(tree, scheduler, top, ScreenState::Exiting, |behaviour, ctx| {
            behaviour.on_exiting(ctx, next)
        })?;

        if let Some(next) = next {
            self.run(tree, scheduler, next, ScreenState::Current, |behaviour, ctx| {
                behaviour.on_resuming(ctx, top)
            })?;
        }
        debug!(stack = %self.node, screen = %top, depth = self.order.len(), "exited screen");
        Ok(top)
    }

    /// Exit until `screen` is on top.
    pub fn exit_to(
        &mut self,
        tree: &mut SceneTree,
        scheduler: &mut TransformScheduler,
        screen: ScreenId,
    ) -> Result<Vec<ScreenId>, PetalError> {
        if !self.order.contains(&screen) {
            return Err(ScreenError::NotInStack { screen }.into());
        }
        let mut exited = Vec::new();
        while self.current() != Some(screen) {
            exited.push(self.exit(tree, scheduler)?);
        }
        Ok(exited)
    }

    /// Remove exiting screens whose transitions have finished.
    ///
    /// Returns the screens that reached `Exited`.
    pub fn update(&mut self, tree: &mut SceneTree, scheduler: &mut TransformScheduler) -> Vec<ScreenId> {
        let now = scheduler.now();
        let mut done = Vec::new();
        let screens = &mut self.screens;
        self.exiting.retain(|id| {
            let Some(slot) = screens.get_mut(id) else {
                return false;
            };
            if slot.transition_end > now {
                return true;
            }
            slot.state = ScreenState::Exited;
            if let Some(root) = slot.root.take() {
                discard_subtree(tree, scheduler, root);
            }
            done.push(*id);
            false
        });
        for id in &done {
            debug!(stack = %self.node, screen = %id, "screen exited");
        }
        done
    }

    fn slot(&self, screen: ScreenId) -> Result<&ScreenSlot, ScreenError> {
        self.screens.get(&screen).ok_or(ScreenError::UnknownScreen { screen })
    }

    fn slot_mut(&mut self, screen: ScreenId) -> Result<&mut ScreenSlot, ScreenError> {
        self.screens
            .get_mut(&screen)
            .ok_or(ScreenError::UnknownScreen { screen })
    }

    /// Move a screen to `state` and run one of its callbacks, recording how
    /// long the transforms it queued will take.
    fn run<F>(
        &mut self,
        tree: &mut SceneTree,
        scheduler: &mut TransformScheduler,
        screen: ScreenId,
        state: ScreenState,
        callback: F,
    ) -> Result<(), PetalError>
    where
        F: FnOnce(&mut dyn Screen, &mut ScreenContext<'_>) -> Result<(), PetalError>,
    {
        let slot = self.slot_mut(screen)?;
        slot.state = state;
        let Some(root) = slot.root else {
            return Ok(());
        };
        debug!(%screen, %state, "screen transition");

        scheduler.begin_capture();
        let mut ctx = ScreenContext {
            tree,
            scheduler,
            screen,
            root,
        };
        let result = callback(slot.behaviour.as_mut(), &mut ctx);
        slot.transition_end = ctx.scheduler.end_capture();
        result
    }
}

/// Destroy a screen's subtree and drop its queued transforms.
fn discard_subtree(tree: &mut SceneTree, scheduler: &mut TransformScheduler, root: NodeId) {
    match tree.remove(root) {
        Ok(removed) => scheduler.cancel_nodes(removed),
        Err(err) => warn!(%root, error = %err, "could not remove screen subtree"),
    }
}
