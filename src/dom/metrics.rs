//! Measurement and resize observation for the render surface.
//!
//! The engine never computes layout geometry itself. The embedder records
//! per-element sizes with [`Dom::set_size`]; the surface derives the
//! `client_width` / `scroll_width` pair the overflow probe needs, and queues
//! coalesced [`ResizeEvent`]s for elements under observation.

use super::node::ElementId;
use super::tree::Dom;

/// A recorded element size, in embedder units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An observed element changed size. Carries the new size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub element: ElementId,
    pub size: Size,
}

impl Dom {
    /// Record an element's size as measured by the embedder.
    ///
    /// If the element is under resize observation and the size actually
    /// changed, a [`ResizeEvent`] is queued. At most one pending event is
    /// kept per element; a later size overwrites the queued one, so rapid
    /// consecutive resizes collapse into a single event per drain.
    pub fn set_size(&mut self, id: ElementId, size: Size) {
        let previous = self.sizes.insert(id, size);
        if previous == Some(size) {
            return;
        }
        if self.observed.contains(&id) {
            if let Some(pending) = self.resize_queue.iter_mut().find(|e| e.element == id) {
                pending.size = size;
            } else {
                self.resize_queue.push(ResizeEvent { element: id, size });
            }
        }
    }

    /// The recorded size of an element. Unmeasured elements are zero-sized.
    pub fn size(&self, id: ElementId) -> Size {
        self.sizes.get(id).copied().unwrap_or_default()
    }

    /// The element's own recorded width (the "client" width of its box).
    pub fn client_width(&self, id: ElementId) -> u32 {
        self.size(id).width
    }

    /// The width the element's content wants: the sum of the recorded widths
    /// of its non-hidden children.
    pub fn scroll_width(&self, id: ElementId) -> u32 {
        self.children(id)
            .iter()
            .filter(|&&child| self.get(child).is_some_and(|data| !data.hidden))
            .map(|&child| self.size(child).width)
            .sum()
    }

    /// The overflow probe: content wider than the box.
    pub fn is_overflowing(&self, id: ElementId) -> bool {
        self.client_width(id) < self.scroll_width(id)
    }

    /// Start observing an element for size changes.
    pub fn observe_resize(&mut self, id: ElementId) {
        if !self.observed.contains(&id) {
            self.observed.push(id);
        }
    }

    /// Stop observing an element. Pending events for it are dropped.
    pub fn unobserve_resize(&mut self, id: ElementId) {
        self.observed.retain(|&o| o != id);
        self.resize_queue.retain(|e| e.element != id);
    }

    /// Drain the pending resize events, in observation order of arrival.
    pub fn take_resize_events(&mut self) -> Vec<ResizeEvent> {
        std::mem::take(&mut self.resize_queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::ElementData;

    fn bar_with_children(widths: &[u32]) -> (Dom, ElementId, Vec<ElementId>) {
        let mut dom = Dom::new();
        let bar = dom.insert(ElementData::new("div").with_id("bar"));
        let kids: Vec<_> = widths
            .iter()
            .map(|&w| {
                let id = dom.insert_child(bar, ElementData::new("button"));
                dom.set_size(id, Size::new(w, 10));
                id
            })
            .collect();
        (dom, bar, kids)
    }

    #[test]
    fn unmeasured_is_zero() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        assert_eq!(dom.size(id), Size::default());
        assert_eq!(dom.client_width(id), 0);
    }

    #[test]
    fn scroll_width_sums_visible_children() {
        let (mut dom, bar, kids) = bar_with_children(&[30, 40, 50]);
        assert_eq!(dom.scroll_width(bar), 120);
        dom.get_mut(kids[1]).unwrap().hidden = true;
        assert_eq!(dom.scroll_width(bar), 80);
    }

    #[test]
    fn overflow_probe() {
        let (mut dom, bar, _kids) = bar_with_children(&[30, 40, 50]);
        dom.set_size(bar, Size::new(200, 10));
        assert!(!dom.is_overflowing(bar));
        dom.set_size(bar, Size::new(100, 10));
        assert!(dom.is_overflowing(bar));
        // Equal widths just fit.
        dom.set_size(bar, Size::new(120, 10));
        assert!(!dom.is_overflowing(bar));
    }

    #[test]
    fn resize_events_only_for_observed() {
        let (mut dom, bar, kids) = bar_with_children(&[10]);
        dom.observe_resize(bar);
        dom.set_size(bar, Size::new(50, 10));
        dom.set_size(kids[0], Size::new(20, 10));
        let events = dom.take_resize_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].element, bar);
        assert_eq!(events[0].size, Size::new(50, 10));
    }

    #[test]
    fn resize_events_coalesce_per_element() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        dom.observe_resize(id);
        dom.set_size(id, Size::new(10, 10));
        dom.set_size(id, Size::new(20, 10));
        dom.set_size(id, Size::new(30, 10));
        let events = dom.take_resize_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].size, Size::new(30, 10));
        assert!(dom.take_resize_events().is_empty());
    }

    #[test]
    fn unchanged_size_queues_nothing() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        dom.observe_resize(id);
        dom.set_size(id, Size::new(10, 10));
        dom.take_resize_events();
        dom.set_size(id, Size::new(10, 10));
        assert!(dom.take_resize_events().is_empty());
    }

    #[test]
    fn remove_drops_observation() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("div"));
        dom.observe_resize(id);
        dom.set_size(id, Size::new(10, 10));
        dom.remove(id);
        assert!(dom.take_resize_events().is_empty());
    }
}
