//! Element-building workers: layout structure, slotted content, valrep
//! expansion and error visualization.

use std::rc::Rc;

use tracing::warn;

use crate::definition::ObjectDefinition;
use crate::dom::{Dom, ElementData, ElementId, Selector};
use crate::value::Value;

use super::{Binding, BoundControlMut, Worker};

// ---------------------------------------------------------------------------
// ElementWorker
// ---------------------------------------------------------------------------

/// Builds one element and composes child workers under it. The backbone of
/// every structure tree.
pub struct ElementWorker {
    tag: String,
    classes: Vec<String>,
    slot: Option<String>,
    children: Vec<Rc<dyn Worker>>,
}

impl ElementWorker {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            slot: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    pub fn with_child(mut self, child: Rc<dyn Worker>) -> Self {
        self.children.push(child);
        self
    }
}

impl Worker for ElementWorker {
    fn child_workers(&self) -> Vec<Rc<dyn Worker>> {
        self.children.clone()
    }

    fn layout(&self, dom: &mut Dom, def: &ObjectDefinition) -> Option<ElementId> {
        let mut data = ElementData::new(self.tag.clone());
        for class in &self.classes {
            data.add_class(class);
        }
        data.slot = self.slot.clone();
        let element = dom.insert(data);
        for child in &self.children {
            if let Some(child_element) = child.layout(dom, def) {
                dom.reparent(child_element, element);
            }
        }
        Some(element)
    }
}

// ---------------------------------------------------------------------------
// SlottedElement
// ---------------------------------------------------------------------------

/// A slotted icon-or-text element. When the icon property is set, the slot
/// renders the icon; otherwise it renders the text property's content.
pub struct SlottedElement {
    slot: String,
    tag: String,
    text_prop: String,
    icon_prop: String,
    text_default: Value,
    icon_default: Value,
}

impl SlottedElement {
    pub fn new(
        slot: impl Into<String>,
        text_prop: impl Into<String>,
        icon_prop: impl Into<String>,
    ) -> Self {
        Self {
            slot: slot.into(),
            tag: "span".into(),
            text_prop: text_prop.into(),
            icon_prop: icon_prop.into(),
            text_default: Value::Text(String::new()),
            icon_default: Value::Text(String::new()),
        }
    }

    pub fn with_defaults(mut self, text: impl Into<Value>, icon: impl Into<Value>) -> Self {
        self.text_default = text.into();
        self.icon_default = icon.into();
        self
    }

    fn slot_class(&self) -> String {
        format!("u-slot-{}", self.slot)
    }
}

impl Worker for SlottedElement {
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::Setter(self.text_prop.clone()),
            Binding::Setter(self.icon_prop.clone()),
            Binding::Default(self.text_prop.clone(), self.text_default.clone()),
            Binding::Default(self.icon_prop.clone(), self.icon_default.clone()),
        ]
    }

    fn layout(&self, dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        let mut data = ElementData::new(self.tag.clone()).with_class(self.slot_class());
        data.slot = Some(self.slot.clone());
        Some(dom.insert(data))
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let selector = Selector::class(self.slot_class());
        let Some(element) = dom.query_selector(ctl.root, &selector) else {
            warn!(slot = %self.slot, "slotted element not found");
            return;
        };
        let icon = ctl.data.text(&self.icon_prop);
        let data = dom.get_mut(element).expect("queried element exists");
        data.remove_classes_where(|c| c.starts_with("u-icon"));
        if icon.is_empty() {
            data.text = ctl.data.text(&self.text_prop);
        } else {
            data.text.clear();
            data.add_class("u-icon");
            data.add_class(&format!("u-icon--{icon}"));
        }
    }
}

// ---------------------------------------------------------------------------
// SlottedError
// ---------------------------------------------------------------------------

/// Error visualization: a slotted error icon whose visibility and tooltip
/// follow the `error` / `format-error` property pairs. Format errors take
/// precedence over data errors.
pub struct SlottedError {
    slot: String,
}

impl SlottedError {
    pub fn new() -> Self {
        Self {
            slot: "error".into(),
        }
    }

    fn slot_class(&self) -> String {
        format!("u-slot-{}", self.slot)
    }
}

impl Default for SlottedError {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker for SlottedError {
    fn bindings(&self) -> Vec<Binding> {
        [
            "error",
            "error-message",
            "format-error",
            "format-error-message",
        ]
        .into_iter()
        .flat_map(|prop| {
            let default = if prop.ends_with("message") {
                Value::Text(String::new())
            } else {
                Value::Bool(false)
            };
            [
                Binding::Setter(prop.to_owned()),
                Binding::Default(prop.to_owned(), default),
            ]
        })
        .collect()
    }

    fn layout(&self, dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        let mut data = ElementData::new("span")
            .with_class(self.slot_class())
            .with_class("u-error-icon")
            .with_hidden(true);
        data.slot = Some(self.slot.clone());
        Some(dom.insert(data))
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let selector = Selector::class(self.slot_class());
        let Some(element) = dom.query_selector(ctl.root, &selector) else {
            warn!("error slot element not found");
            return;
        };
        let format_error = ctl.data.truthy("format-error");
        let data_error = ctl.data.truthy("error");
        let message = if format_error {
            ctl.data.text("format-error-message")
        } else {
            ctl.data.text("error-message")
        };
        let data = dom.get_mut(element).expect("queried element exists");
        data.hidden = !(format_error || data_error);
        data.apply_attr("title", (!message.is_empty()).then_some(message));
    }
}

// ---------------------------------------------------------------------------
// ValrepElements
// ---------------------------------------------------------------------------

/// Rebuilds one child element per valrep entry, honoring the display
/// format: `rep`, `val` or `valrep`.
pub struct ValrepElements {
    container_class: String,
    child_tag: String,
}

impl ValrepElements {
    pub fn new(child_tag: impl Into<String>) -> Self {
        Self {
            container_class: "u-valrep".into(),
            child_tag: child_tag.into(),
        }
    }

    fn format(representation: &str, value: &str, format: &str) -> String {
        match format {
            "val" => value.to_owned(),
            "valrep" => format!("{representation} ({value})"),
            _ => representation.to_owned(),
        }
    }
}

impl Worker for ValrepElements {
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::Setter("valrep".into()),
            Binding::Setter("display-format".into()),
            Binding::Default("display-format".into(), Value::Text("rep".into())),
        ]
    }

    fn layout(&self, dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        Some(dom.insert(ElementData::new("div").with_class(self.container_class.clone())))
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let selector = Selector::class(self.container_class.clone());
        let Some(container) = dom.query_selector(ctl.root, &selector) else {
            warn!(class = %self.container_class, "valrep container not found");
            return;
        };
        for child in dom.children(container).to_vec() {
            dom.remove(child);
        }
        let items = match ctl.data.get("valrep") {
            Some(Value::Valrep(items)) => items.clone(),
            Some(Value::Text(text)) => crate::value::parse_valrep(text),
            _ => Vec::new(),
        };
        let format = ctl.data.text("display-format");
        for item in items {
            let mut data = ElementData::new(self.child_tag.clone())
                .with_attr("value", item.value.clone());
            data.text = Self::format(&item.representation, &item.value, &format);
            dom.insert_child(container, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropMap;

    fn refresh(worker: &dyn Worker, dom: &mut Dom, root: ElementId, data: &mut PropMap) {
        let mut touched = Vec::new();
        worker.refresh(
            BoundControlMut {
                data,
                root,
                touched: &mut touched,
            },
            dom,
        );
    }

    #[test]
    fn element_worker_builds_nested_layout() {
        let inner: Rc<dyn Worker> = Rc::new(ElementWorker::new("span").with_class("inner"));
        let outer = ElementWorker::new("div").with_class("outer").with_child(inner);
        let mut dom = Dom::new();
        let def = ObjectDefinition::new("f", "field");
        let root = outer.layout(&mut dom, &def).unwrap();
        assert!(dom.get(root).unwrap().has_class("outer"));
        let kids = dom.children(root);
        assert_eq!(kids.len(), 1);
        assert!(dom.get(kids[0]).unwrap().has_class("inner"));
    }

    #[test]
    fn slotted_element_text_vs_icon() {
        let worker = SlottedElement::new("content", "label-text", "icon");
        let mut dom = Dom::new();
        let def = ObjectDefinition::new("f", "field");
        let root = dom.insert(ElementData::new("div"));
        let slot = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(slot, root);

        let mut data = PropMap::from([("label-text", Value::from("Save"))]);
        refresh(&worker, &mut dom, root, &mut data);
        assert_eq!(dom.get(slot).unwrap().text, "Save");
        assert!(!dom.get(slot).unwrap().has_class("u-icon"));

        data.set("icon", Value::from("Filter"));
        refresh(&worker, &mut dom, root, &mut data);
        let slot_data = dom.get(slot).unwrap();
        assert!(slot_data.text.is_empty());
        assert!(slot_data.has_class("u-icon"));
        assert!(slot_data.has_class("u-icon--Filter"));

        // Back to text: icon classes are swept.
        data.set("icon", Value::from(""));
        refresh(&worker, &mut dom, root, &mut data);
        let slot_data = dom.get(slot).unwrap();
        assert_eq!(slot_data.text, "Save");
        assert!(!slot_data.has_class("u-icon--Filter"));
    }

    #[test]
    fn slotted_error_visibility_and_precedence() {
        let worker = SlottedError::new();
        let mut dom = Dom::new();
        let def = ObjectDefinition::new("f", "field");
        let root = dom.insert(ElementData::new("div"));
        let icon = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(icon, root);
        assert!(dom.get(icon).unwrap().hidden);

        let mut data = PropMap::from([
            ("error", Value::Bool(true)),
            ("error-message", Value::from("bad data")),
            ("format-error", Value::Bool(true)),
            ("format-error-message", Value::from("bad format")),
        ]);
        refresh(&worker, &mut dom, root, &mut data);
        let icon_data = dom.get(icon).unwrap();
        assert!(!icon_data.hidden);
        assert_eq!(icon_data.attr("title"), Some("bad format"));

        data.set("format-error", Value::Bool(false));
        refresh(&worker, &mut dom, root, &mut data);
        assert_eq!(dom.get(icon).unwrap().attr("title"), Some("bad data"));

        data.set("error", Value::Bool(false));
        refresh(&worker, &mut dom, root, &mut data);
        assert!(dom.get(icon).unwrap().hidden);
    }

    #[test]
    fn valrep_elements_rebuild() {
        let worker = ValrepElements::new("option");
        let mut dom = Dom::new();
        let def = ObjectDefinition::new("f", "field");
        let root = dom.insert(ElementData::new("div"));
        let container = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(container, root);

        let mut data = PropMap::from([("valrep", Value::from("a=Alpha;b=Beta"))]);
        refresh(&worker, &mut dom, root, &mut data);
        let kids = dom.children(container).to_vec();
        assert_eq!(kids.len(), 2);
        assert_eq!(dom.get(kids[0]).unwrap().text, "Alpha");
        assert_eq!(dom.get(kids[0]).unwrap().attr("value"), Some("a"));

        data.set("display-format", Value::from("valrep"));
        data.set("valrep", Value::from("c=Gamma"));
        refresh(&worker, &mut dom, root, &mut data);
        let kids = dom.children(container).to_vec();
        assert_eq!(kids.len(), 1);
        assert_eq!(dom.get(kids[0]).unwrap().text, "Gamma (c)");
    }
}
