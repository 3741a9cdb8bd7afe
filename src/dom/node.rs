//! Element types: `ElementId`, `ElementData`.

use std::collections::BTreeMap;

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM element. Copy, lightweight (u64).
    pub struct ElementId;
}

/// Data associated with a single element on the render surface.
///
/// This is the engine's entire view of a rendered widget: tag name, identity,
/// style classes, named attributes and inline styles, text content, and the
/// handful of boolean states the binding contract manipulates directly.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Tag name (e.g. "div", "fluent-button").
    pub tag: String,
    /// Optional unique id carried over from the occurrence placeholder.
    pub id: Option<String>,
    /// Style classes, in insertion order.
    pub classes: Vec<String>,
    /// Named string attributes.
    pub attrs: BTreeMap<String, String>,
    /// Inline style properties (`style:` namespace).
    pub styles: BTreeMap<String, String>,
    /// Text content.
    pub text: String,
    /// Slot this element is assigned into, if any.
    pub slot: Option<String>,
    /// Whether the element is hidden.
    pub hidden: bool,
    /// Whether the element is disabled.
    pub disabled: bool,
    /// Whether the element is read-only.
    pub readonly: bool,
}

impl ElementData {
    /// Create element data with the given tag name and defaults.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the element id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a style class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set hidden (builder).
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Check whether the element has a given style class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a style class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a style class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Remove every style class for which `predicate` returns true.
    pub fn remove_classes_where(&mut self, predicate: impl Fn(&str) -> bool) {
        self.classes.retain(|c| !predicate(c));
    }

    /// Read a named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Set or remove a named attribute.
    ///
    /// The boolean element states (`hidden`, `disabled`, `readonly`) and the
    /// text content (`text`) are addressable by name so attribute workers can
    /// treat them uniformly with plain attributes.
    pub fn apply_attr(&mut self, name: &str, value: Option<String>) {
        match name {
            "hidden" => self.hidden = value.is_some_and(|v| v != "false"),
            "disabled" => self.disabled = value.is_some_and(|v| v != "false"),
            "readonly" => self.readonly = value.is_some_and(|v| v != "false"),
            "text" => self.text = value.unwrap_or_default(),
            _ => match value {
                Some(v) => {
                    self.attrs.insert(name.to_owned(), v);
                }
                None => {
                    self.attrs.remove(name);
                }
            },
        }
    }

    /// Read an attribute through the same name mapping as [`apply_attr`].
    ///
    /// [`apply_attr`]: Self::apply_attr
    pub fn read_attr(&self, name: &str) -> Option<String> {
        match name {
            "hidden" => Some(self.hidden.to_string()),
            "disabled" => Some(self.disabled.to_string()),
            "readonly" => Some(self.readonly.to_string()),
            "text" => Some(self.text.clone()),
            _ => self.attrs.get(name).cloned(),
        }
    }
}
