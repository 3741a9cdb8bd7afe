//! Tree operations: insert, remove, replace, reparent, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::metrics::{ResizeEvent, Size};
use super::node::{ElementData, ElementId};

/// Empty slice constant for returning when an element has no children.
const EMPTY_CHILDREN: &[ElementId] = &[];

/// The headless render surface: a DOM tree backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps so that element removal is O(subtree size) and
/// lookup is O(1). Recorded sizes and resize observation live alongside the
/// tree (see `metrics`).
pub struct Dom {
    pub(crate) elements: SlotMap<ElementId, ElementData>,
    children: SecondaryMap<ElementId, Vec<ElementId>>,
    parent: SecondaryMap<ElementId, ElementId>,
    root: Option<ElementId>,
    pub(crate) sizes: SecondaryMap<ElementId, Size>,
    pub(crate) observed: Vec<ElementId>,
    pub(crate) resize_queue: Vec<ResizeEvent>,
}

impl Dom {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            sizes: SecondaryMap::new(),
            observed: Vec::new(),
            resize_queue: Vec::new(),
        }
    }

    /// Insert a root-level element (no parent).
    ///
    /// If no root has been set yet, this element becomes the root.
    pub fn insert(&mut self, data: ElementData) -> ElementId {
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert an element as a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: ElementId, data: ElementData) -> ElementId {
        debug_assert!(
            self.elements.contains_key(parent),
            "parent element does not exist"
        );
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// Remove an element and all its descendants recursively.
    ///
    /// Returns the `ElementData` for the removed element, or `None` if it
    /// didn't exist.
    pub fn remove(&mut self, id: ElementId) -> Option<ElementData> {
        if !self.elements.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        // Clear root if we're removing it.
        if self.root == Some(id) {
            self.root = None;
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            // Queue children before removing.
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            self.sizes.remove(current);
            self.observed.retain(|&o| o != current);
            self.resize_queue.retain(|e| e.element != current);
            let data = self.elements.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Replace `old` with `new` in the tree: `new` takes `old`'s slot in its
    /// parent's children list, and `old`'s subtree is removed.
    ///
    /// If `old` was the root, `new` becomes the root.
    pub fn replace(&mut self, old: ElementId, new: ElementId) {
        debug_assert!(self.elements.contains_key(old), "old element does not exist");
        debug_assert!(self.elements.contains_key(new), "new element does not exist");

        if let Some(parent_id) = self.parent.get(old).copied() {
            // Detach new from any previous parent first.
            if let Some(prev) = self.parent.remove(new) {
                if let Some(siblings) = self.children.get_mut(prev) {
                    siblings.retain(|&child| child != new);
                }
            }
            let position = self
                .children
                .get(parent_id)
                .and_then(|kids| kids.iter().position(|&child| child == old));
            self.remove(old);
            self.parent.insert(new, parent_id);
            let siblings = self
                .children
                .get_mut(parent_id)
                .expect("parent must have children vec");
            match position {
                Some(pos) => siblings.insert(pos, new),
                None => siblings.push(new),
            }
        } else {
            let was_root = self.root == Some(old);
            self.remove(old);
            if was_root {
                self.root = Some(new);
            }
        }
    }

    /// Move `element` to become a child of `new_parent`.
    ///
    /// The element keeps its subtree intact. If `element` was previously a
    /// child of another parent, it is detached first.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either `element` or `new_parent` does not exist.
    pub fn reparent(&mut self, element: ElementId, new_parent: ElementId) {
        debug_assert!(self.elements.contains_key(element), "element does not exist");
        debug_assert!(
            self.elements.contains_key(new_parent),
            "new_parent does not exist"
        );

        // Detach from old parent.
        if let Some(old_parent) = self.parent.remove(element) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != element);
            }
        }

        // Attach to new parent.
        self.parent.insert(element, new_parent);
        self.children
            .get_mut(new_parent)
            .expect("new_parent must have children vec")
            .push(element);
    }

    /// Get the parent of an element, if it has one.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parent.get(id).copied()
    }

    /// Get the children of an element. Returns an empty slice if the element
    /// has no children or does not exist.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor element ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to an element's data.
    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(id)
    }

    /// Mutable access to an element's data.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.elements.get_mut(id)
    }

    /// The current root element, if set.
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Explicitly set the root element.
    pub fn set_root(&mut self, id: ElementId) {
        self.root = Some(id);
    }

    /// Number of elements on the surface.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the surface is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the surface contains an element with the given id.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.elements.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            let kids = self.children(current);
            for &child in kids.iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, ElementId, ElementId, ElementId, ElementId, ElementId) {
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div").with_id("root"));
        let a = dom.insert_child(root, ElementData::new("div").with_id("a").with_class("left"));
        let b = dom.insert_child(root, ElementData::new("div").with_id("b").with_class("right"));
        let c = dom.insert_child(a, ElementData::new("button").with_id("c"));
        let d = dom.insert_child(a, ElementData::new("span").with_id("d"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        assert_eq!(dom.root(), Some(id));
    }

    #[test]
    fn insert_second_does_not_change_root() {
        let mut dom = Dom::new();
        let first = dom.insert(ElementData::new("div"));
        let _second = dom.insert(ElementData::new("div"));
        assert_eq!(dom.root(), Some(first));
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn children_list() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert_eq!(dom.ancestors(a), vec![root]);
        assert!(dom.ancestors(root).is_empty());
    }

    #[test]
    fn remove_leaf() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        let removed = dom.remove(c);
        assert_eq!(removed.unwrap().tag, "button");
        assert!(!dom.contains(c));
        assert_eq!(dom.children(a), &[d]);
        assert_eq!(dom.len(), 4);
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.contains(root));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_root() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn replace_keeps_sibling_position() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let new = dom.insert(ElementData::new("section").with_id("new"));
        dom.replace(a, new);
        assert_eq!(dom.children(root), &[new, b]);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.parent(new), Some(root));
    }

    #[test]
    fn replace_root() {
        let mut dom = Dom::new();
        let old = dom.insert(ElementData::new("div"));
        let new = dom.insert(ElementData::new("section"));
        dom.replace(old, new);
        assert_eq!(dom.root(), Some(new));
        assert!(!dom.contains(old));
    }

    #[test]
    fn reparent() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.reparent(c, b);
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert!(dom.children(b).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        let order = dom.walk_depth_first(root);
        assert_eq!(order, vec![root, a, c, d, b]);
    }

    #[test]
    fn walk_depth_first_subtree() {
        let (dom, _root, a, _b, c, d) = build_tree();
        let order = dom.walk_depth_first(a);
        assert_eq!(order, vec![a, c, d]);
    }

    #[test]
    fn default_impl() {
        let dom = Dom::default();
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }
}
