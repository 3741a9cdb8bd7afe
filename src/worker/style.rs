//! Style workers: class toggles and the `class:` / `style:` namespaces.

use tracing::warn;

use crate::dom::{Dom, Selector};
use crate::value::Value;

use super::{resolve_element, Binding, BoundControlMut, Worker};

// ---------------------------------------------------------------------------
// ClassToggle
// ---------------------------------------------------------------------------

/// Boolean property toggling a single style class on an element.
pub struct ClassToggle {
    prop: String,
    class: String,
    selector: Option<Selector>,
    default: Option<Value>,
}

impl ClassToggle {
    pub fn new(prop: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            class: class.into(),
            selector: None,
            default: None,
        }
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Worker for ClassToggle {
    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![Binding::Setter(self.prop.clone())];
        if let Some(default) = &self.default {
            bindings.push(Binding::Default(self.prop.clone(), default.clone()));
        }
        bindings
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(element) = resolve_element(dom, ctl.root, self.selector.as_ref()) else {
            warn!(prop = %self.prop, "target element not found");
            return;
        };
        let on = ctl.data.truthy(&self.prop);
        if let Some(data) = dom.get_mut(element) {
            if on {
                data.add_class(&self.class);
            } else {
                data.remove_class(&self.class);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StyleClassWorker
// ---------------------------------------------------------------------------

/// Handles the whole `class:` namespace on the root element: every
/// `class:<name>` property toggles `<name>` by its truthiness.
pub struct StyleClassWorker;

impl Worker for StyleClassWorker {
    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::Setter("class:".into())]
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(data) = dom.get_mut(ctl.root) else {
            return;
        };
        for (key, value) in ctl.data.iter() {
            let Some(class) = key.strip_prefix("class:") else {
                continue;
            };
            if class.is_empty() {
                continue;
            }
            if value.truthy() {
                data.add_class(class);
            } else {
                data.remove_class(class);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StylePropertyWorker
// ---------------------------------------------------------------------------

/// Handles the whole `style:` namespace on the root element: every
/// `style:<name>` property becomes an inline style entry; `Null` and the
/// reset sentinel clear it.
pub struct StylePropertyWorker;

impl Worker for StylePropertyWorker {
    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::Setter("style:".into())]
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(data) = dom.get_mut(ctl.root) else {
            return;
        };
        for (key, value) in ctl.data.iter() {
            let Some(name) = key.strip_prefix("style:") else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            match value.to_attr_string() {
                Some(text) => {
                    data.styles.insert(name.to_owned(), text);
                }
                None => {
                    data.styles.remove(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementData, ElementId};
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
    fn class_toggle() {
        let worker = ClassToggle::new("outlined", "u-outlined");
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let mut data = PropMap::from([("outlined", Value::from("true"))]);
        refresh(&worker, &mut dom, root, &mut data);
        assert!(dom.get(root).unwrap().has_class("u-outlined"));

        data.set("outlined", Value::Bool(false));
        refresh(&worker, &mut dom, root, &mut data);
        assert!(!dom.get(root).unwrap().has_class("u-outlined"));
    }

    #[test]
    fn style_class_namespace() {
        let worker = StyleClassWorker;
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let mut data = PropMap::from([
            ("class:wide", Value::Bool(true)),
            ("class:narrow", Value::Bool(false)),
            ("label-text", Value::from("not a class")),
        ]);
        refresh(&worker, &mut dom, root, &mut data);
        let root_data = dom.get(root).unwrap();
        assert!(root_data.has_class("wide"));
        assert!(!root_data.has_class("narrow"));
        assert_eq!(root_data.classes.len(), 1);

        data.set("class:wide", Value::Bool(false));
        refresh(&worker, &mut dom, root, &mut data);
        assert!(!dom.get(root).unwrap().has_class("wide"));
    }

    #[test]
    fn style_property_namespace() {
        let worker = StylePropertyWorker;
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let mut data = PropMap::from([
            ("style:width", Value::from("10rem")),
            ("style:color", Value::from("red")),
        ]);
        refresh(&worker, &mut dom, root, &mut data);
        assert_eq!(
            dom.get(root).unwrap().styles.get("width").map(String::as_str),
            Some("10rem")
        );

        data.set("style:color", Value::Null);
        refresh(&worker, &mut dom, root, &mut data);
        assert!(!dom.get(root).unwrap().styles.contains_key("color"));
    }
}
