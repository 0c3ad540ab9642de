use std::ops::{Deref, DerefMut};

use glam::{Affine3A, Quat, Vec3};
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::channel::ChannelMask;
use crate::scene::node::Node;
use crate::scene::props::UserProps;
use crate::scene::transform::Transform;
use crate::time::{self, Interval, TimeValue};

/// Name given to the permanent root node.
pub const ROOT_NAME: &str = "Scene Root";

/// Host scene graph.
///
/// Nodes live in a slotmap arena and refer to each other by handle. The
/// scene always holds one root node; every other node hangs below it.
///
/// Transform writes go through [`Scene::set_position`] and friends. Inside a
/// [`RecordScope`] they create keys at the given tick; outside one they edit
/// the node's static transform and the tick is ignored.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,

    frame_rate: u32,
    anim_range: Interval,
    time: TimeValue,
    recording: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(ROOT_NAME));
        let tpf = time::ticks_per_frame(time::DEFAULT_FRAME_RATE);

        Self {
            nodes,
            root,
            frame_rate: time::DEFAULT_FRAME_RATE,
            anim_range: Interval::new(0, 100 * tpf),
            time: 0,
            recording: false,
        }
    }

    // ========================================================================
    // Node Creation & Access
    // ========================================================================

    /// The permanent root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self, handle: NodeHandle) -> bool {
        handle == self.root
    }

    /// Creates a node directly under the root.
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.create_child(name, self.root)
    }

    /// Creates a node under `parent`. Falls back to the root for stale
    /// parents.
    pub fn create_child(&mut self, name: &str, parent: NodeHandle) -> NodeHandle {
        let parent = if self.nodes.contains_key(parent) { parent } else { self.root };

        let mut node = Node::new(name);
        node.parent = Some(parent);
        let handle = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    /// Copies a node (name, transform, channels and properties, but not its
    /// children) and places the copy as the last child of the same parent.
    pub fn clone_node(&mut self, handle: NodeHandle) -> Option<NodeHandle> {
        let source = self.nodes.get(handle)?;
        let parent = source.parent.unwrap_or(self.root);

        let mut copy = Node::new(&source.name);
        copy.transform = source.transform;
        copy.channels = source.channels.clone();
        copy.props = source.props.clone();
        copy.parent = Some(parent);

        let new_handle = self.nodes.insert(copy);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(new_handle);
        }
        Some(new_handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // The root always exists.
        self.nodes.len() <= 1
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            name.clone_into(&mut node.name);
        }
    }

    #[must_use]
    pub fn props(&self, handle: NodeHandle) -> Option<&UserProps> {
        self.nodes.get(handle).map(|n| &n.props)
    }

    pub fn props_mut(&mut self, handle: NodeHandle) -> Option<&mut UserProps> {
        self.nodes.get_mut(handle).map(|n| &mut n.props)
    }

    /// Finds the first node named `name`, depth-first from the root.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.traverse()
            .into_iter()
            .find(|&h| self.nodes.get(h).is_some_and(|n| n.name == name))
    }

    /// Every node below the root in depth-first pre-order, siblings in
    /// child order.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeHandle> = Vec::with_capacity(64);

        if let Some(root) = self.nodes.get(self.root) {
            stack.extend(root.children.iter().rev());
        }

        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            order.push(handle);
            stack.extend(node.children.iter().rev());
        }

        order
    }

    // ========================================================================
    // Hierarchy Editing
    // ========================================================================

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle)?.parent
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    /// Returns true if `ancestor` is `handle` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.parent(h);
        }
        false
    }

    /// Appends `child` to `parent`'s children, keeping its world transform.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        self.attach_at(child, parent, usize::MAX)
    }

    /// Moves `child` under `parent` at position `index` (clamped), keeping
    /// the child's world transform at the current scene time.
    ///
    /// Only the static transform is adjusted; keyed channels are left as
    /// they are. Returns `false` for stale handles, for the root, and for
    /// moves that would create a cycle.
    pub fn attach_at(&mut self, child: NodeHandle, parent: NodeHandle, index: usize) -> bool {
        if child == self.root || !self.contains(child) || !self.contains(parent) {
            log::warn!("attach: invalid node handle");
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("attach: cannot attach a node below itself");
            return false;
        }

        let now = self.time;
        let child_world = self.node_tm(child, now);
        let old_parent_world = self.parent_tm(child, now);
        let new_parent_world = self.node_tm(parent, now);

        // 1. Detach from old
        if let Some(old) = self.parent(child)
            && let Some(p) = self.nodes.get_mut(old)
            && let Some(i) = p.children.iter().position(|&c| c == child)
        {
            p.children.remove(i);
        }

        // 2. Attach to new
        if let Some(p) = self.nodes.get_mut(parent) {
            let at = index.min(p.children.len());
            p.children.insert(at, child);
        }

        // 3. Update child
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            if old_parent_world != new_parent_world {
                let local = new_parent_world.inverse() * child_world;
                c.transform = Transform::decompose(&local);
            }
        }

        true
    }

    // ========================================================================
    // Timeline
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.frame_rate = frame_rate.max(1);
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_frame(&self) -> TimeValue {
        time::ticks_per_frame(self.frame_rate)
    }

    #[inline]
    #[must_use]
    pub fn anim_range(&self) -> Interval {
        self.anim_range
    }

    pub fn set_anim_range(&mut self, range: Interval) {
        self.anim_range = range;
    }

    /// Current time slider position; hierarchy edits keep world transforms
    /// at this time.
    #[inline]
    #[must_use]
    pub fn time(&self) -> TimeValue {
        self.time
    }

    pub fn set_time(&mut self, time: TimeValue) {
        self.time = time;
    }

    // ========================================================================
    // Channel Writes
    // ========================================================================

    /// Opens a recording scope. Transform writes made through the scope
    /// become keys; recording ends when the scope is dropped.
    pub fn record(&mut self) -> RecordScope<'_> {
        let previous = self.recording;
        self.recording = true;
        RecordScope {
            scene: self,
            previous,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn set_position(&mut self, handle: NodeHandle, time: TimeValue, value: Vec3) {
        let recording = self.recording;
        if let Some(node) = self.nodes.get_mut(handle) {
            if recording {
                node.channels.position.set_key(time, value);
            } else {
                node.transform.position = value;
            }
        }
    }

    /// `value` is in the host rotation convention.
    pub fn set_rotation(&mut self, handle: NodeHandle, time: TimeValue, value: Quat) {
        let recording = self.recording;
        if let Some(node) = self.nodes.get_mut(handle) {
            if recording {
                node.channels.rotation.set_key(time, value);
            } else {
                node.transform.rotation = value;
            }
        }
    }

    pub fn set_scale(&mut self, handle: NodeHandle, time: TimeValue, value: Vec3) {
        let recording = self.recording;
        if let Some(node) = self.nodes.get_mut(handle) {
            if recording {
                node.channels.scale.set_key(time, value);
            } else {
                node.transform.scale = value;
            }
        }
    }

    /// Writes a whole local matrix, split across the three channels.
    pub fn set_local_tm(&mut self, handle: NodeHandle, time: TimeValue, matrix: &Affine3A) {
        let trs = Transform::decompose(matrix);
        self.set_position(handle, time, trs.position);
        self.set_rotation(handle, time, trs.rotation);
        self.set_scale(handle, time, trs.scale);
    }

    pub fn delete_keys(&mut self, handle: NodeHandle, mask: ChannelMask) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.channels.delete_keys(mask);
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Local TRS of a node at `time`. Stale handles evaluate to identity.
    #[must_use]
    pub fn local_trs(&self, handle: NodeHandle, time: TimeValue) -> Transform {
        let Some(node) = self.nodes.get(handle) else {
            return Transform::IDENTITY;
        };
        let ch = &node.channels;
        Transform {
            position: ch.position.sample(time).unwrap_or(node.transform.position),
            rotation: ch.rotation.sample(time).unwrap_or(node.transform.rotation),
            scale: ch.scale.sample(time).unwrap_or(node.transform.scale),
        }
    }

    #[must_use]
    pub fn local_tm(&self, handle: NodeHandle, time: TimeValue) -> Affine3A {
        self.local_trs(handle, time).matrix()
    }

    /// World matrix of a node at `time`.
    #[must_use]
    pub fn node_tm(&self, handle: NodeHandle, time: TimeValue) -> Affine3A {
        let mut chain = Vec::with_capacity(16);
        let mut current = Some(handle);
        while let Some(h) = current {
            if !self.contains(h) {
                break;
            }
            chain.push(h);
            current = self.parent(h);
        }

        chain
            .iter()
            .rev()
            .fold(Affine3A::IDENTITY, |world, &h| world * self.local_tm(h, time))
    }

    /// World matrix of a node's parent at `time`; identity for the root.
    #[must_use]
    pub fn parent_tm(&self, handle: NodeHandle, time: TimeValue) -> Affine3A {
        self.parent(handle)
            .map_or(Affine3A::IDENTITY, |p| self.node_tm(p, time))
    }
}

/// Active recording region on a [`Scene`].
///
/// Dereferences to the scene. Dropping the scope restores the previous
/// recording state on every exit path, including early returns.
pub struct RecordScope<'a> {
    scene: &'a mut Scene,
    previous: bool,
}

impl Deref for RecordScope<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        self.scene
    }
}

impl DerefMut for RecordScope<'_> {
    fn deref_mut(&mut self) -> &mut Scene {
        self.scene
    }
}

impl Drop for RecordScope<'_> {
    fn drop(&mut self) {
        self.scene.recording = self.previous;
    }
}
