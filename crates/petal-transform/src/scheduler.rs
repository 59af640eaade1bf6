//! Time-ordered transform queues.
//!
//! Each node has one queue per property. Entries in a queue run one after
//! another; queues for different properties run side by side. The scheduler
//! never owns nodes: it writes through [`Animatable`] and drops a node's
//! queues as soon as the node no longer exists.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use indexmap::IndexMap;
use petal_core::{Color, LoopId, NodeId, TransformError};
use tracing::{debug, trace, warn};

use crate::easing::Easing;
use crate::value::{Animatable, Property, Value};

#[derive(Debug, Clone)]
struct Entry {
    /// Enqueue order, used to scope cancellations
    seq: u64,
    property: Property,
    from: Value,
    to: Value,
    start: Duration,
    duration: Duration,
    easing: Easing,
    looping: Option<LoopId>,
}

impl Entry {
    fn end(&self) -> Duration {
        self.start + self.duration
    }

    fn value_at(&self, now: Duration) -> Value {
        if self.duration.is_zero() || now >= self.end() {
            return self.to;
        }
        let t = now.saturating_sub(self.start).as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(&self.to, self.easing.apply(t))
    }
}

#[derive(Debug, Default)]
struct Timeline {
    queues: IndexMap<Property, VecDeque<Entry>>,
}

impl Timeline {
    fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.queues.values().flat_map(|q| q.iter())
    }
}

#[derive(Debug, Clone, Copy)]
struct LoopState {
    node: NodeId,
    period: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Cancel {
    /// Entries of a node enqueued before `before`
    Node { node: NodeId, before: u64 },
    Loop(LoopId),
}

/// Drives every queued transform from a single clock.
#[derive(Debug, Default)]
pub struct TransformScheduler {
    now: Duration,
    timelines: IndexMap<NodeId, Timeline>,
    loops: IndexMap<LoopId, LoopState>,
    cancels: Vec<Cancel>,
    next_seq: u64,
    next_loop: u64,
    capture: Option<Duration>,
}

impl TransformScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler clock: total time advanced so far.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Start a transform chain on `node`, beginning now.
    pub fn animate<'a, T: Animatable>(
        &'a mut self,
        target: &'a T,
        node: NodeId,
    ) -> Result<TransformSequence<'a, T>, TransformError> {
        if !target.is_attached(node) {
            return Err(TransformError::DetachedNode { node });
        }
        let cursor = self.now;
        Ok(TransformSequence {
            scheduler: self,
            target,
            node,
            cursor,
            span_end: cursor,
            added: Vec::new(),
        })
    }

    /// Advance the clock by `dt` and write the current value of every running entry.
    pub fn update<T: Animatable>(&mut self, target: &mut T, dt: Duration) {
        self.apply_cancels();
        self.now += dt;
        let now = self.now;

        let mut gone = Vec::new();
        for (&node, timeline) in self.timelines.iter_mut() {
            if !target.exists(node) {
                gone.push(node);
                continue;
            }
            for queue in timeline.queues.values_mut() {
                // Several entries can complete within one tick.
                while let Some(head) = queue.front() {
                    if head.start > now {
                        break;
                    }
                    if now < head.end() {
                        target.write(node, head.property, head.value_at(now));
                        break;
                    }
                    let Some(entry) = queue.pop_front() else {
                        break;
                    };
                    target.write(node, entry.property, entry.to);

                    let period = entry
                        .looping
                        .and_then(|id| self.loops.get(&id))
                        .map(|state| state.period);
                    if let Some(period) = period {
                        let mut next = entry;
                        next.start += period;
                        insert_sorted(queue, next);
                    }
                }
            }
            timeline.queues.retain(|_, q| !q.is_empty());
            if timeline.is_empty() {
                gone.push(node);
            }
        }

        for node in gone {
            self.timelines.shift_remove(&node);
            self.loops.retain(|_, state| state.node != node);
        }
    }

    /// Drop every entry queued for `node` so far, without applying end values.
    ///
    /// Takes effect at the start of the next [`update`](Self::update).
    pub fn cancel_node(&mut self, node: NodeId) {
        self.cancels.push(Cancel::Node {
            node,
            before: self.next_seq,
        });
    }

    pub fn cancel_nodes(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            self.cancel_node(node);
        }
    }

    /// Stop a loop. Its queued entries are dropped at the next tick.
    pub fn cancel_loop(&mut self, id: LoopId) {
        self.cancels.push(Cancel::Loop(id));
    }

    fn apply_cancels(&mut self) {
        for cancel in std::mem::take(&mut self.cancels) {
            match cancel {
                Cancel::Node { node, before } => {
                    if let Some(timeline) = self.timelines.get_mut(&node) {
                        for queue in timeline.queues.values_mut() {
                            queue.retain(|e| e.seq >= before);
                        }
                        timeline.queues.retain(|_, q| !q.is_empty());
                        if timeline.is_empty() {
                            self.timelines.shift_remove(&node);
                        }
                    }
                    // Loops of this node with no entries left are over.
                    let timeline = self.timelines.get(&node);
                    self.loops.retain(|id, state| {
                        state.node != node
                            || timeline.is_some_and(|t| t.entries().any(|e| e.looping == Some(*id)))
                    });
                    debug!(%node, "cancelled transforms");
                }
                Cancel::Loop(id) => {
                    let Some(state) = self.loops.shift_remove(&id) else {
                        continue;
                    };
                    if let Some(timeline) = self.timelines.get_mut(&state.node) {
                        for queue in timeline.queues.values_mut() {
                            queue.retain(|e| e.looping != Some(id));
                        }
                        timeline.queues.retain(|_, q| !q.is_empty());
                    }
                    debug!(node = %state.node, loop_id = id.0, "cancelled loop");
                }
            }
        }
    }

    /// Snap every non-looping entry of `node` to its end value, in queue order.
    pub fn finish<T: Animatable>(&mut self, target: &mut T, node: NodeId) {
        let Some(timeline) = self.timelines.get_mut(&node) else {
            return;
        };
        for queue in timeline.queues.values_mut() {
            let mut kept = VecDeque::new();
            for entry in queue.drain(..) {
                if entry.looping.is_some() {
                    kept.push_back(entry);
                } else {
                    target.write(node, entry.property, entry.to);
                }
            }
            *queue = kept;
        }
        timeline.queues.retain(|_, q| !q.is_empty());
        if timeline.is_empty() {
            self.timelines.shift_remove(&node);
        }
    }

    /// Whether anything is still queued for `node`.
    pub fn has_pending(&self, node: NodeId) -> bool {
        self.timelines.get(&node).is_some_and(|t| !t.is_empty())
    }

    /// End time of the last non-looping entry queued for `node`.
    pub fn latest_end(&self, node: NodeId) -> Option<Duration> {
        self.timelines
            .get(&node)?
            .entries()
            .filter(|e| e.looping.is_none() && !self.is_cancelled(node, e))
            .map(Entry::end)
            .max()
    }

    /// Number of nodes with queued entries.
    pub fn active_nodes(&self) -> usize {
        self.timelines.len()
    }

    /// Number of loops still repeating.
    pub fn active_loops(&self) -> usize {
        self.loops.len()
    }

    /// Start recording the end time of everything scheduled from now on.
    pub fn begin_capture(&mut self) {
        self.capture = Some(self.now);
    }

    /// Stop recording and return the latest end time seen (at least `now`).
    pub fn end_capture(&mut self) -> Duration {
        self.capture.take().unwrap_or(self.now)
    }

    /// Last entry of a property queue that no pending cancellation covers.
    fn tail(&self, node: NodeId, property: Property) -> Option<&Entry> {
        self.timelines
            .get(&node)?
            .queues
            .get(&property)?
            .iter()
            .rev()
            .find(|e| !self.is_cancelled(node, e))
    }

    fn is_cancelled(&self, node: NodeId, entry: &Entry) -> bool {
        self.cancels.iter().any(|cancel| match *cancel {
            Cancel::Node { node: n, before } => n == node && entry.seq < before,
            Cancel::Loop(id) => entry.looping == Some(id),
        })
    }

    fn enqueue(&mut self, node: NodeId, mut entry: Entry) -> u64 {
        entry.seq = self.next_seq;
        self.next_seq += 1;
        if let Some(capture) = self.capture.as_mut() {
            *capture = (*capture).max(entry.end());
        }
        trace!(%node, property = %entry.property, start = ?entry.start, duration = ?entry.duration, "queued transform");
        let queue = self
            .timelines
            .entry(node)
            .or_default()
            .queues
            .entry(entry.property)
            .or_default();
        let seq = entry.seq;
        insert_sorted(queue, entry);
        seq
    }
}

fn insert_sorted(queue: &mut VecDeque<Entry>, entry: Entry) {
    let at = queue
        .iter()
        .position(|e| e.start > entry.start)
        .unwrap_or(queue.len());
    queue.insert(at, entry);
}

/// Fluent handle for queueing transforms on one node.
///
/// Each call starts at the handle's cursor, or later if the same property is
/// still busy. [`then`](Self::then) moves the cursor past everything queued so
/// far; [`delay`](Self::delay) moves it forward by a fixed amount.
pub struct TransformSequence<'a, T: Animatable> {
    scheduler: &'a mut TransformScheduler,
    target: &'a T,
    node: NodeId,
    cursor: Duration,
    span_end: Duration,
    added: Vec<u64>,
}

impl<'a, T: Animatable> TransformSequence<'a, T> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// End time of everything queued through this handle.
    pub fn end(&self) -> Duration {
        self.span_end
    }

    /// Queue a transform of `property` towards `value`.
    pub fn transform_to(
        mut self,
        property: Property,
        value: Value,
        duration: Duration,
        easing: Easing,
    ) -> Result<Self, TransformError> {
        self.push(property, value, duration, easing)?;
        Ok(self)
    }

    fn push(
        &mut self,
        property: Property,
        value: Value,
        duration: Duration,
        easing: Easing,
    ) -> Result<(), TransformError> {
        property.check(&value)?;
        let (from, busy_until) = match self.scheduler.tail(self.node, property) {
            Some(tail) => (tail.to, tail.end()),
            None => {
                let current = self
                    .target
                    .read(self.node, property)
                    .ok_or(TransformError::DetachedNode { node: self.node })?;
                (current, Duration::ZERO)
            }
        };
        let entry = Entry {
            seq: 0,
            property,
            from,
            to: value,
            start: self.cursor.max(busy_until),
            duration,
            easing,
            looping: None,
        };
        self.span_end = self.span_end.max(entry.end());
        let seq = self.scheduler.enqueue(self.node, entry);
        self.added.push(seq);
        Ok(())
    }

    fn typed(mut self, property: Property, value: Value, duration: Duration, easing: Easing) -> Self {
        if let Err(err) = self.push(property, value, duration, easing) {
            warn!(node = %self.node, error = %err, "transform dropped");
        }
        self
    }

    pub fn move_to(self, position: Vec2, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Position, Value::Vector(position), duration, easing)
    }

    pub fn resize_to(self, size: Vec2, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Size, Value::Vector(size), duration, easing)
    }

    pub fn scale_to(self, scale: Vec2, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Scale, Value::Vector(scale), duration, easing)
    }

    pub fn fade_to(self, alpha: f32, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Alpha, Value::Float(alpha), duration, easing)
    }

    pub fn fade_in(self, duration: Duration, easing: Easing) -> Self {
        self.fade_to(1.0, duration, easing)
    }

    pub fn fade_out(self, duration: Duration, easing: Easing) -> Self {
        self.fade_to(0.0, duration, easing)
    }

    pub fn color_to(self, color: Color, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Color, Value::Color(color), duration, easing)
    }

    pub fn depth_to(self, depth: f32, duration: Duration, easing: Easing) -> Self {
        self.typed(Property::Depth, Value::Float(depth), duration, easing)
    }

    /// Continue after everything queued through this handle has finished.
    pub fn then(mut self) -> Self {
        self.cursor = self.cursor.max(self.span_end);
        self
    }

    /// Push the cursor forward.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.cursor += delay;
        self.span_end = self.span_end.max(self.cursor);
        self
    }

    /// Repeat everything queued through this handle, `pause` after each run.
    ///
    /// Each repetition restarts from the original start values.
    pub fn looping(self, pause: Duration) -> Result<LoopId, TransformError> {
        let Some(timeline) = self.scheduler.timelines.get_mut(&self.node) else {
            return Err(TransformError::EmptyLoop);
        };
        let first = timeline
            .entries()
            .filter(|e| self.added.contains(&e.seq))
            .map(|e| e.start)
            .min();
        let Some(first) = first else {
            return Err(TransformError::EmptyLoop);
        };
        let period = self.span_end.saturating_sub(first) + pause;
        if period.is_zero() {
            return Err(TransformError::EmptyLoop);
        }

        let id = LoopId(self.scheduler.next_loop);
        self.scheduler.next_loop += 1;
        for queue in timeline.queues.values_mut() {
            for entry in queue.iter_mut() {
                if self.added.contains(&entry.seq) {
                    entry.looping = Some(id);
                }
            }
        }
        self.scheduler.loops.insert(
            id,
            LoopState {
                node: self.node,
                period,
            },
        );
        debug!(node = %self.node, loop_id = id.0, period = ?period, "started loop");
        Ok(id)
    }
}
