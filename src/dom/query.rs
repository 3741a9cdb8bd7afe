//! Scoped selector queries over the render surface.
//!
//! All queries are scoped: they search the subtree under a scope element,
//! never the whole surface, so one control cannot reach into another's
//! elements. The scope element itself is not a candidate, but it does
//! participate in ancestor matching.

use super::node::ElementId;
use super::selector::Selector;
use super::tree::Dom;

impl Dom {
    /// First element in the subtree under `scope` (pre-order) matching the
    /// selector, or `None`.
    pub fn query_selector(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1) // the scope itself is not a candidate
            .find(|&id| self.matches_scoped(scope, id, selector))
    }

    /// All elements in the subtree under `scope` (pre-order) matching the
    /// selector.
    pub fn query_selector_all(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1)
            .filter(|&id| self.matches_scoped(scope, id, selector))
            .collect()
    }

    /// Whether `id` matches `selector` with ancestor compounds resolved
    /// against the chain between `id` and `scope` (scope inclusive).
    fn matches_scoped(&self, scope: ElementId, id: ElementId, selector: &Selector) -> bool {
        let Some(data) = self.get(id) else {
            return false;
        };
        if !selector.subject().matches(data) {
            return false;
        }

        // Ancestor compounds match right-to-left, each one against some
        // strictly higher ancestor, stopping at the scope boundary.
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            if parent == scope {
                break;
            }
            current = parent;
        }

        let mut chain_iter = chain.into_iter();
        for compound in selector.ancestors().iter().rev() {
            let matched = chain_iter
                .by_ref()
                .any(|anc| self.get(anc).is_some_and(|d| compound.matches(d)));
            if !matched {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::ElementData;

    /// ```text
    ///   scope(div.control)
    ///     menu(div.menu)
    ///       item1(button.u-item)
    ///       item2(button.u-item#last)
    ///     label(span.u-item)
    ///   outside(button.u-item)     (sibling of scope, not under it)
    /// ```
    fn build() -> (Dom, ElementId, ElementId, ElementId, ElementId, ElementId) {
        let mut dom = Dom::new();
        let top = dom.insert(ElementData::new("div"));
        let scope = dom.insert_child(top, ElementData::new("div").with_class("control"));
        let menu = dom.insert_child(scope, ElementData::new("div").with_class("menu"));
        let item1 = dom.insert_child(menu, ElementData::new("button").with_class("u-item"));
        let item2 = dom.insert_child(
            menu,
            ElementData::new("button").with_class("u-item").with_id("last"),
        );
        let _label = dom.insert_child(scope, ElementData::new("span").with_class("u-item"));
        let _outside = dom.insert_child(top, ElementData::new("button").with_class("u-item"));
        (dom, scope, menu, item1, item2, top)
    }

    #[test]
    fn query_first_in_preorder() {
        let (dom, scope, _menu, item1, _item2, _top) = build();
        let sel = Selector::parse("button.u-item").unwrap();
        assert_eq!(dom.query_selector(scope, &sel), Some(item1));
    }

    #[test]
    fn query_all_stays_in_scope() {
        let (dom, scope, _menu, item1, item2, _top) = build();
        let sel = Selector::parse(".u-item").unwrap();
        let hits = dom.query_selector_all(scope, &sel);
        // Three .u-item under scope; the outside sibling is not found.
        assert_eq!(hits.len(), 3);
        assert!(hits.contains(&item1));
        assert!(hits.contains(&item2));
    }

    #[test]
    fn scope_itself_is_not_a_candidate() {
        let (dom, scope, ..) = build();
        let sel = Selector::parse(".control").unwrap();
        assert_eq!(dom.query_selector(scope, &sel), None);
    }

    #[test]
    fn descendant_combinator() {
        let (dom, scope, _menu, item1, item2, _top) = build();
        let sel = Selector::parse(".menu button").unwrap();
        let hits = dom.query_selector_all(scope, &sel);
        assert_eq!(hits, vec![item1, item2]);
        // The span is under scope but not under .menu.
        let sel = Selector::parse(".menu span").unwrap();
        assert!(dom.query_selector(scope, &sel).is_none());
    }

    #[test]
    fn ancestor_match_can_use_scope() {
        let (dom, scope, menu, ..) = build();
        let sel = Selector::parse(".control .menu").unwrap();
        assert_eq!(dom.query_selector(scope, &sel), Some(menu));
    }

    #[test]
    fn ancestor_match_does_not_escape_scope() {
        let (dom, _scope, _menu, item1, _item2, top) = build();
        // Queried from under the menu, the .control ancestor is outside the
        // scope chain and must not match.
        let sel = Selector::parse(".control button").unwrap();
        let menu = dom.parent(item1).unwrap();
        assert!(dom.query_selector(menu, &sel).is_none());
        // From the top it matches fine.
        assert!(dom.query_selector(top, &sel).is_some());
    }

    #[test]
    fn id_query() {
        let (dom, scope, _menu, _item1, item2, _top) = build();
        let sel = Selector::parse("#last").unwrap();
        assert_eq!(dom.query_selector(scope, &sel), Some(item2));
    }
}
