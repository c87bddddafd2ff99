//! A generic binary tree stored in an arena.
//!
//! Nodes live in a flat [`Tree`] and refer to each other through [`NodeId`] indices. The parent
//! link is an index as well, so a node never owns its parent; ownership of every node rests with
//! the arena and flows strictly root-to-leaves.
//!
//! The tree maintains one structural invariant across every mutation: a node is the `left` or
//! `right` child of its parent if and only if its own `parent` link points back at that parent.
//! Links are only ever rewired through [`Tree::set_left`], [`Tree::set_right`] and
//! [`Tree::set_side`], which update both ends of the relation.
//!
//! # Identity
//!
//! Arena indices are reused freely between trees (every tree starts at index zero), so each node
//! additionally carries a [`NodeUid`] drawn from a process-wide counter at construction time.
//! Uids are never copied: cloning a subtree assigns fresh uids to every cloned node, which is
//! what makes "did this rewrite touch my original tree?" checks possible.

use std::sync::atomic::{AtomicU64, Ordering};

/// The index of a node within its owning [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A process-wide unique identity assigned to a node at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeUid(u64);

fn next_uid() -> NodeUid {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    NodeUid(COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Which child slot of a parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

/// The signal a traversal visitor returns to continue or halt the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Visit {
    Continue,
    Stop,
}

/// Payload types stored in a [`Tree`] expose the name of their kind, used to build
/// [`Tree::path_to_root`] addresses.
pub trait TreeData {
    /// A short, stable name for this node's kind.
    fn kind_name(&self) -> &'static str;
}

#[derive(Debug)]
struct Node<T> {
    uid: NodeUid,
    data: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// An arena of linked binary-tree nodes.
///
/// A `Tree` may hold detached nodes: rewrites that replace a subtree leave the old nodes in the
/// arena, unlinked, so change records can still address and render the pre-rewrite state. Nodes
/// are reclaimed when the tree itself is dropped.
///
/// `Tree` deliberately does not implement [`Clone`]: copying nodes must go through
/// [`Tree::clone_subtree`] or [`Tree::clone_from_root`], which assign fresh uids.
#[derive(Debug)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// The total number of nodes allocated in this tree, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no nodes have been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a new unlinked node holding `data` and returns its id.
    pub fn add_node(&mut self, data: T) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            uid: next_uid(),
            data,
            parent: None,
            left: None,
            right: None,
        });
        id
    }

    /// The payload stored at `id`.
    pub fn data(&self, id: NodeId) -> &T {
        &self.nodes[id.index()].data
    }

    /// Mutable access to the payload stored at `id`.
    pub fn data_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()].data
    }

    /// The unique identity of the node at `id`.
    pub fn uid(&self, id: NodeId) -> NodeUid {
        self.nodes[id.index()].uid
    }

    /// The parent of `id`, if it is linked to one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The left child of `id`.
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].left
    }

    /// The right child of `id`.
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].right
    }

    /// The child of `id` on the given side.
    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left(id),
            Side::Right => self.right(id),
        }
    }

    /// Returns true if `id` has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.left(id).is_none() && self.right(id).is_none()
    }

    /// Walks parent links from `id` up to the root of its tree.
    pub fn get_root(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            node = parent;
        }
        node
    }

    /// Links `child` as the left child of `parent`, rewiring the child's parent pointer in the
    /// same step. Passing [`None`] detaches the current left child.
    pub fn set_left(&mut self, parent: NodeId, child: Option<NodeId>) {
        self.set_side(parent, child, Side::Left)
    }

    /// Links `child` as the right child of `parent`. Passing [`None`] detaches the current right
    /// child.
    pub fn set_right(&mut self, parent: NodeId, child: Option<NodeId>) {
        self.set_side(parent, child, Side::Right)
    }

    /// Links `child` into the given child slot of `parent`, keeping both ends of the relation in
    /// sync: the outgoing occupant's parent pointer is cleared, and if `child` was linked
    /// elsewhere, its old parent's slot is cleared too.
    pub fn set_side(&mut self, parent: NodeId, child: Option<NodeId>, side: Side) {
        let (occupant, other) = match side {
            Side::Left => (self.left(parent), self.right(parent)),
            Side::Right => (self.right(parent), self.left(parent)),
        };

        // Detach the outgoing occupant, unless it also sits in the other slot (mid-swap) or is
        // about to be relinked in place.
        if let Some(old) = occupant {
            if Some(old) != child && other != Some(old) && self.parent(old) == Some(parent) {
                self.nodes[old.index()].parent = None;
            }
        }

        match side {
            Side::Left => self.nodes[parent.index()].left = child,
            Side::Right => self.nodes[parent.index()].right = child,
        }

        if let Some(child) = child {
            if let Some(old_parent) = self.parent(child) {
                if old_parent != parent {
                    if self.left(old_parent) == Some(child) {
                        self.nodes[old_parent.index()].left = None;
                    } else if self.right(old_parent) == Some(child) {
                        self.nodes[old_parent.index()].right = None;
                    }
                }
            }
            self.nodes[child.index()].parent = Some(parent);
        }
    }

    /// Returns which side of `parent` the given node occupies, or [`None`] if it is not a direct
    /// child.
    pub fn get_side(&self, parent: NodeId, child: NodeId) -> Option<Side> {
        if self.left(parent) == Some(child) {
            Some(Side::Left)
        } else if self.right(parent) == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Detaches `id` from its parent, clearing both ends of the link. Returns `id` for chaining.
    pub fn unlink(&mut self, id: NodeId) -> NodeId {
        if let Some(parent) = self.parent(id) {
            if let Some(side) = self.get_side(parent, id) {
                self.set_side(parent, None, side);
            }
        }
        self.nodes[id.index()].parent = None;
        id
    }

    /// Visits the subtree under `root` in order: left, node, right. The visitor receives each
    /// node with its depth below `root` and may return [`Visit::Stop`] to halt the walk early.
    pub fn visit_inorder<F>(&self, root: NodeId, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        self.inorder_at(root, 0, visitor)
    }

    fn inorder_at<F>(&self, id: NodeId, depth: usize, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        if let Some(left) = self.left(id) {
            if self.inorder_at(left, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        if visitor(id, depth) == Visit::Stop {
            return Visit::Stop;
        }
        if let Some(right) = self.right(id) {
            if self.inorder_at(right, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Visits the subtree under `root` in order: node, left, right.
    pub fn visit_preorder<F>(&self, root: NodeId, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        self.preorder_at(root, 0, visitor)
    }

    fn preorder_at<F>(&self, id: NodeId, depth: usize, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        if visitor(id, depth) == Visit::Stop {
            return Visit::Stop;
        }
        if let Some(left) = self.left(id) {
            if self.preorder_at(left, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        if let Some(right) = self.right(id) {
            if self.preorder_at(right, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Visits the subtree under `root` in order: left, right, node.
    pub fn visit_postorder<F>(&self, root: NodeId, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        self.postorder_at(root, 0, visitor)
    }

    fn postorder_at<F>(&self, id: NodeId, depth: usize, visitor: &mut F) -> Visit
    where
        F: FnMut(NodeId, usize) -> Visit,
    {
        if let Some(left) = self.left(id) {
            if self.postorder_at(left, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        if let Some(right) = self.right(id) {
            if self.postorder_at(right, depth + 1, visitor) == Visit::Stop {
                return Visit::Stop;
            }
        }
        visitor(id, depth)
    }

    /// Finds the node with the given uid inside the subtree under `root`.
    pub fn find_by_uid(&self, root: NodeId, uid: NodeUid) -> Option<NodeId> {
        let mut found = None;
        let _ = self.visit_inorder(root, &mut |id, _| {
            if self.uid(id) == uid {
                found = Some(id);
                Visit::Stop
            } else {
                Visit::Continue
            }
        });
        found
    }

    /// Counts the nodes in the subtree under `root`.
    pub fn count_nodes(&self, root: NodeId) -> usize {
        let mut count = 0;
        let _ = self.visit_inorder(root, &mut |_, _| {
            count += 1;
            Visit::Continue
        });
        count
    }

    /// Collects the subtree under `root` into an inorder list of node ids.
    pub fn to_list(&self, root: NodeId) -> Vec<NodeId> {
        let mut list = Vec::new();
        let _ = self.visit_inorder(root, &mut |id, _| {
            list.push(id);
            Visit::Continue
        });
        list
    }

    /// Rotates `id` up into its parent's position, preserving inorder ordering.
    ///
    /// A left child rotates right (`(b ∘ c) ∘ a` becomes `b ∘ (c ∘ a)`); a right child rotates
    /// left (`a ∘ (b ∘ c)` becomes `(a ∘ b) ∘ c`). Rotating a root is a no-op.
    pub fn rotate(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let grandparent = self.parent(parent);
        let grand_side = grandparent.and_then(|g| self.get_side(g, parent));
        let Some(side) = self.get_side(parent, id) else {
            return;
        };

        match side {
            Side::Left => {
                let inner = self.right(id);
                self.set_right(id, None);
                self.set_left(parent, inner);
                self.set_right(id, Some(parent));
            }
            Side::Right => {
                let inner = self.left(id);
                self.set_left(id, None);
                self.set_right(parent, inner);
                self.set_left(id, Some(parent));
            }
        }

        match (grandparent, grand_side) {
            (Some(grand), Some(side)) => self.set_side(grand, Some(id), side),
            _ => self.nodes[id.index()].parent = None,
        }
    }
}

impl<T: TreeData + Clone> Tree<T> {
    /// Builds the dot-joined sequence of kind names from `id` up to its root. The address can be
    /// used to relocate a node inside a structurally identical tree.
    pub fn path_to_root(&self, id: NodeId) -> String {
        let mut points = vec![self.data(id).kind_name()];
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            node = parent;
            points.push(self.data(parent).kind_name());
        }
        points.join(".")
    }

    /// Copies the subtree under `id` into `dst`, assigning fresh uids, and returns the id of the
    /// copied root within `dst`. Parent links are rebuilt within the copy only.
    pub fn clone_into(&self, id: NodeId, dst: &mut Tree<T>) -> NodeId {
        let new = dst.add_node(self.data(id).clone());
        if let Some(left) = self.left(id) {
            let copied = self.clone_into(left, dst);
            dst.set_left(new, Some(copied));
        }
        if let Some(right) = self.right(id) {
            let copied = self.clone_into(right, dst);
            dst.set_right(new, Some(copied));
        }
        new
    }

    /// Copies the subtree under `id` into this same arena, assigning fresh uids. The copy is
    /// returned unlinked.
    pub fn copy_subtree(&mut self, id: NodeId) -> NodeId {
        let data = self.data(id).clone();
        let left = self.left(id);
        let right = self.right(id);
        let new = self.add_node(data);
        if let Some(left) = left {
            let copied = self.copy_subtree(left);
            self.set_left(new, Some(copied));
        }
        if let Some(right) = right {
            let copied = self.copy_subtree(right);
            self.set_right(new, Some(copied));
        }
        new
    }

    /// Deep-copies the subtree under `id` into a fresh tree. The clone's root has no parent.
    pub fn clone_subtree(&self, id: NodeId) -> (Tree<T>, NodeId) {
        let mut dst = Tree::new();
        let root = self.clone_into(id, &mut dst);
        (dst, root)
    }

    /// Clones the whole tree that `target` belongs to, starting from its root, and reports which
    /// clone node corresponds to `target`.
    ///
    /// The target's address is recorded before the walk and cross-checked at the capture point;
    /// capture itself goes by node identity, since two same-kind siblings share an address.
    pub fn clone_from_root(&self, target: NodeId) -> (Tree<T>, NodeId) {
        let root = self.get_root(target);
        let target_path = self.path_to_root(target);
        let mut dst = Tree::new();
        let mut tracked = None;
        let _ = self.clone_tracked(root, &mut dst, target, &target_path, &mut tracked);
        let tracked = tracked.expect("the tracked node is always inside its own root's subtree");
        (dst, tracked)
    }

    fn clone_tracked(
        &self,
        id: NodeId,
        dst: &mut Tree<T>,
        target: NodeId,
        target_path: &str,
        tracked: &mut Option<NodeId>,
    ) -> NodeId {
        let new = dst.add_node(self.data(id).clone());
        if id == target {
            debug_assert_eq!(self.path_to_root(id), target_path);
            *tracked = Some(new);
        }
        if let Some(left) = self.left(id) {
            let copied = self.clone_tracked(left, dst, target, target_path, tracked);
            dst.set_left(new, Some(copied));
        }
        if let Some(right) = self.right(id) {
            let copied = self.clone_tracked(right, dst, target, target_path, tracked);
            dst.set_right(new, Some(copied));
        }
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Label(&'static str);

    impl TreeData for Label {
        fn kind_name(&self) -> &'static str {
            self.0
        }
    }

    /// Builds `Branch(Leaf("a"), Branch(Leaf("b"), Leaf("c")))`.
    fn sample() -> (Tree<Label>, NodeId) {
        let mut tree = Tree::new();
        let root = tree.add_node(Label("Branch"));
        let a = tree.add_node(Label("a"));
        let inner = tree.add_node(Label("Branch"));
        let b = tree.add_node(Label("b"));
        let c = tree.add_node(Label("c"));
        tree.set_left(root, Some(a));
        tree.set_right(root, Some(inner));
        tree.set_left(inner, Some(b));
        tree.set_right(inner, Some(c));
        (tree, root)
    }

    fn labels(tree: &Tree<Label>, ids: &[NodeId]) -> Vec<&'static str> {
        ids.iter().map(|&id| tree.data(id).kind_name()).collect()
    }

    #[test]
    fn parent_links_follow_mutation() {
        let (mut tree, root) = sample();
        let inner = tree.right(root).unwrap();
        assert_eq!(tree.parent(inner), Some(root));
        assert_eq!(tree.get_side(root, inner), Some(Side::Right));

        tree.set_right(root, None);
        assert_eq!(tree.parent(inner), None);
        assert_eq!(tree.right(root), None);
    }

    #[test]
    fn relinking_clears_the_old_parent_slot() {
        let (mut tree, root) = sample();
        let inner = tree.right(root).unwrap();
        let b = tree.left(inner).unwrap();

        tree.set_left(root, Some(b));
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.left(inner), None);
    }

    #[test]
    fn traversal_orders() {
        let (tree, root) = sample();

        let mut inorder = Vec::new();
        let _ = tree.visit_inorder(root, &mut |id, _| {
            inorder.push(id);
            Visit::Continue
        });
        assert_eq!(labels(&tree, &inorder), ["a", "Branch", "b", "Branch", "c"]);

        let mut preorder = Vec::new();
        let _ = tree.visit_preorder(root, &mut |id, _| {
            preorder.push(id);
            Visit::Continue
        });
        assert_eq!(labels(&tree, &preorder), ["Branch", "a", "Branch", "b", "c"]);

        let mut postorder = Vec::new();
        let _ = tree.visit_postorder(root, &mut |id, _| {
            postorder.push(id);
            Visit::Continue
        });
        assert_eq!(labels(&tree, &postorder), ["a", "b", "c", "Branch", "Branch"]);
    }

    #[test]
    fn traversal_stops_early() {
        let (tree, root) = sample();
        let mut seen = 0;
        let result = tree.visit_inorder(root, &mut |_, _| {
            seen += 1;
            if seen == 2 { Visit::Stop } else { Visit::Continue }
        });
        assert_eq!(result, Visit::Stop);
        assert_eq!(seen, 2);
    }

    #[test]
    fn find_by_uid_matches_identity_only() {
        let (tree, root) = sample();
        let inner = tree.right(root).unwrap();
        let uid = tree.uid(inner);
        assert_eq!(tree.find_by_uid(root, uid), Some(inner));

        let (clone, clone_root) = tree.clone_subtree(root);
        assert_eq!(clone.find_by_uid(clone_root, uid), None);
    }

    #[test]
    fn count_nodes_covers_the_subtree() {
        let (tree, root) = sample();
        assert_eq!(tree.count_nodes(root), 5);
        let inner = tree.right(root).unwrap();
        assert_eq!(tree.count_nodes(inner), 3);
    }

    #[test]
    fn path_to_root_joins_kind_names() {
        let (tree, root) = sample();
        let inner = tree.right(root).unwrap();
        let b = tree.left(inner).unwrap();
        assert_eq!(tree.path_to_root(b), "b.Branch.Branch");
        assert_eq!(tree.path_to_root(root), "Branch");
    }

    #[test]
    fn clone_is_isolated_from_the_original() {
        let (tree, root) = sample();
        let (mut clone, clone_root) = tree.clone_subtree(root);
        assert_ne!(tree.uid(root), clone.uid(clone_root));

        let orphan = clone.add_node(Label("d"));
        clone.set_left(clone_root, Some(orphan));
        assert_eq!(tree.data(tree.left(root).unwrap()).0, "a");
    }

    #[test]
    fn clone_from_root_tracks_an_interior_node() {
        let (tree, root) = sample();
        let inner = tree.right(root).unwrap();
        let (clone, tracked) = tree.clone_from_root(inner);
        assert_eq!(clone.data(tracked).0, "Branch");
        assert_eq!(labels(&clone, &clone.to_list(tracked)), ["b", "Branch", "c"]);
        assert_eq!(clone.count_nodes(clone.get_root(tracked)), 5);
    }

    #[test]
    fn rotate_right_child_regroups_leftward() {
        // a ∘ (b ∘ c) -> (a ∘ b) ∘ c
        let (mut tree, root) = sample();
        let inner = tree.right(root).unwrap();
        tree.rotate(inner);

        assert_eq!(tree.parent(inner), None);
        assert_eq!(tree.get_root(root), inner);
        let list = tree.to_list(inner);
        assert_eq!(labels(&tree, &list), ["a", "Branch", "b", "Branch", "c"]);
        assert_eq!(tree.data(tree.right(inner).unwrap()).0, "c");
        assert_eq!(tree.left(inner), Some(root));
    }

    #[test]
    fn rotate_root_is_a_no_op() {
        let (mut tree, root) = sample();
        tree.rotate(root);
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.count_nodes(root), 5);
    }
}
