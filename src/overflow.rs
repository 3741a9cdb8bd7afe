//! Measurement-driven overflow layout for composite toolbar-style classes.
//!
//! The pass runs against live measurement: the container overflows when its
//! recorded width is smaller than the summed widths of its visible mounts.
//! Eviction hides a mount and, unless its behavior is `Hide`, materializes
//! a menu entry from the evicted control's compact value rendition. The
//! indicator and menu are shown exactly when at least one entry exists.

use std::collections::BTreeMap;

use tracing::warn;

use crate::control::ControlInstance;
use crate::dom::{Dom, ElementData, ElementId, Selector};
use crate::value::{Value, ValueFormatting};
use crate::worker::subcontrol::SUB_CONTROL_ID_ATTR;

/// Class marking an overflow-evicted mount.
pub const OVERFLOWN_CLASS: &str = "u-overflown";

/// Class on materialized menu entries.
pub const MENU_ITEM_CLASS: &str = "u-menu-item";

/// Per-child overflow behavior, from the `<id>_overflow-behavior` property.
///
/// An unset behavior makes the child an ordinary eviction candidate that
/// goes to the menu, same as `Move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowBehavior {
    /// Always shown, never evicted.
    None,
    /// Evicted when space runs out, without a menu entry.
    Hide,
    /// Always in the menu, never in the bar.
    Menu,
    /// Evicted when space runs out, moved into the menu.
    Move,
}

impl OverflowBehavior {
    /// Parse a property value. Unknown text yields `None` (the caller warns
    /// and refuses the value before it is stored).
    pub fn parse(value: &Value) -> Option<Self> {
        match value.to_attr_string()?.as_str() {
            "none" => Some(Self::None),
            "hide" => Some(Self::Hide),
            "menu" => Some(Self::Menu),
            "move" => Some(Self::Move),
            _ => None,
        }
    }
}

/// Where a composite class keeps its overflow machinery, and which property
/// key re-triggers the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowConfig {
    /// Setting this property (any value) re-runs the overflow pass. The
    /// host writes it when draining resize events.
    pub resize_prop: String,
    /// Class of the element whose children are the sub-control mounts.
    pub container_class: String,
    /// Class of the more-button indicator element.
    pub indicator_class: String,
    /// Class of the menu container element.
    pub menu_class: String,
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self {
            resize_prop: "overflow-check".into(),
            container_class: "u-sub-controls".into(),
            indicator_class: "u-overflow-indicator".into(),
            menu_class: "u-overflow-menu".into(),
        }
    }
}

struct Candidate {
    id: String,
    element: ElementId,
    behavior: Option<OverflowBehavior>,
    priority: Option<i64>,
}

impl ControlInstance {
    /// Run the overflow pass. A no-op for classes without an overflow
    /// configuration, for unconnected instances, and for empty containers
    /// (which only hide the indicator).
    pub fn check_overflow(&mut self, dom: &mut Dom) {
        let Some(config) = self.schema.overflow().cloned() else {
            return;
        };
        let Some(root) = self.root else {
            return;
        };
        let container_sel = Selector::class(config.container_class.clone());
        let Some(container) = dom.query_selector(root, &container_sel) else {
            warn!(class = %config.container_class, "overflow container not found");
            return;
        };
        let indicator = dom.query_selector(root, &Selector::class(config.indicator_class.clone()));
        let menu = dom.query_selector(root, &Selector::class(config.menu_class.clone()));

        if let Some(menu) = menu {
            for entry in dom.children(menu).to_vec() {
                dom.remove(entry);
            }
        }

        let mut candidates = Vec::new();
        for child in dom.children(container).to_vec() {
            let Some(id) = dom
                .get(child)
                .and_then(|data| data.attr(SUB_CONTROL_ID_ATTR))
                .map(str::to_owned)
            else {
                continue;
            };
            let behavior = self
                .data
                .get(&format!("{id}_overflow-behavior"))
                .and_then(OverflowBehavior::parse);
            let priority = self.data.int(&format!("{id}_priority")).filter(|n| *n >= 0);
            candidates.push(Candidate {
                id,
                element: child,
                behavior,
                priority,
            });
        }

        let mut menu_entries = 0usize;
        if !candidates.is_empty() {
            // Everything visible before measuring.
            for candidate in &candidates {
                if let Some(data) = dom.get_mut(candidate.element) {
                    data.hidden = false;
                    data.remove_class(OVERFLOWN_CLASS);
                }
            }

            // Menu behavior goes straight to the menu.
            for candidate in &candidates {
                if candidate.behavior == Some(OverflowBehavior::Menu) {
                    self.evict(dom, candidate, menu, &mut menu_entries);
                }
            }

            let evictable: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| {
                    !matches!(
                        c.behavior,
                        Some(OverflowBehavior::None) | Some(OverflowBehavior::Menu)
                    )
                })
                .collect();

            // No-priority children first, one at a time, last in DOM order
            // first, re-measuring after each eviction.
            for candidate in evictable.iter().filter(|c| c.priority.is_none()).rev() {
                if !dom.is_overflowing(container) {
                    break;
                }
                self.evict(dom, candidate, menu, &mut menu_entries);
            }

            // Then whole priority groups, numerically highest value first.
            let mut groups: BTreeMap<i64, Vec<&Candidate>> = BTreeMap::new();
            for candidate in &evictable {
                if let Some(priority) = candidate.priority {
                    groups.entry(priority).or_default().push(*candidate);
                }
            }
            for (_, group) in groups.iter().rev() {
                if !dom.is_overflowing(container) {
                    break;
                }
                for candidate in group {
                    self.evict(dom, candidate, menu, &mut menu_entries);
                }
            }
        }

        let show = menu_entries > 0;
        if let Some(data) = indicator.and_then(|id| dom.get_mut(id)) {
            data.hidden = !show;
        }
        if let Some(data) = menu.and_then(|id| dom.get_mut(id)) {
            data.hidden = !show;
        }
    }

    fn evict(
        &self,
        dom: &mut Dom,
        candidate: &Candidate,
        menu: Option<ElementId>,
        menu_entries: &mut usize,
    ) {
        if let Some(data) = dom.get_mut(candidate.element) {
            data.hidden = true;
            data.add_class(OVERFLOWN_CLASS);
        }
        if candidate.behavior == Some(OverflowBehavior::Hide) {
            return;
        }
        let Some(menu) = menu else {
            return;
        };
        let formatting = match self.sub_controls.get(&candidate.id) {
            Some(sub) => sub.menu_item(),
            None => ValueFormatting {
                primary_text: candidate.id.clone(),
                not_supported: true,
                ..ValueFormatting::default()
            },
        };
        dom.insert_child(menu, menu_entry(&candidate.id, &formatting));
        *menu_entries += 1;
    }
}

fn menu_entry(id: &str, formatting: &ValueFormatting) -> ElementData {
    let mut data = ElementData::new("div")
        .with_class(MENU_ITEM_CLASS)
        .with_attr(SUB_CONTROL_ID_ATTR, id);
    data.text = formatting.primary_text.clone();
    if !formatting.secondary_text.is_empty() {
        data.attrs
            .insert("secondary-text".into(), formatting.secondary_text.clone());
    }
    if let Some(icon) = &formatting.prefix_icon {
        data.add_class("u-icon");
        data.add_class(&format!("u-icon--{icon}"));
    }
    if let Some(message) = &formatting.error_message {
        data.add_class("u-error");
        data.attrs.insert("title".into(), message.clone());
    }
    if formatting.not_supported {
        data.add_class("u-not-supported");
    }
    data
}
