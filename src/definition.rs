//! Host-supplied static configuration for a control occurrence.

use std::cell::{Ref, RefCell};

use crate::value::{PropMap, Value};

/// The static definition handed to the engine for one control occurrence:
/// name, kind, control class and the initial property bag, plus child
/// definitions for composite layouts.
///
/// Properties and the control class are interiorly mutable because layout
/// processing writes back into the definition (placeholder classes become
/// `class:` properties, invalid sub-control ids are pruned from list
/// properties).
#[derive(Debug, Default)]
pub struct ObjectDefinition {
    name: String,
    kind: String,
    control_class: RefCell<String>,
    properties: RefCell<PropMap>,
    children: Vec<ObjectDefinition>,
}

impl ObjectDefinition {
    /// Create a definition with the given name and kind.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Set a property (builder).
    pub fn with_property(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.borrow_mut().set(name, value.into());
        self
    }

    /// Set the control class (builder).
    pub fn with_control_class(self, class: impl Into<String>) -> Self {
        *self.control_class.borrow_mut() = class.into();
        self
    }

    /// Add a child definition (builder).
    pub fn with_child(mut self, child: ObjectDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// The occurrence name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The occurrence kind (e.g. "field", "entity").
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The control class registered for this occurrence.
    pub fn control_class(&self) -> Ref<'_, String> {
        self.control_class.borrow()
    }

    /// Overwrite the control class.
    pub fn set_control_class(&self, class: impl Into<String>) {
        *self.control_class.borrow_mut() = class.into();
    }

    /// Look up a property, cloned out of the bag.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    /// Text view of a property. Absent yields the empty string.
    pub fn property_text(&self, name: &str) -> String {
        self.properties.borrow().text(name)
    }

    /// Set a property. `Value::Null` removes it.
    pub fn set_property(&self, name: &str, value: Value) {
        let mut props = self.properties.borrow_mut();
        if matches!(value, Value::Null) {
            props.remove(name);
        } else {
            props.set(name, value);
        }
    }

    /// All property names, in key order.
    pub fn property_names(&self) -> Vec<String> {
        self.properties.borrow().keys().map(str::to_owned).collect()
    }

    /// Child definitions.
    pub fn children(&self) -> &[ObjectDefinition] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain() {
        let def = ObjectDefinition::new("occ.field1", "field")
            .with_control_class("plain-button")
            .with_property("label-text", "Save");
        assert_eq!(def.name(), "occ.field1");
        assert_eq!(def.kind(), "field");
        assert_eq!(&*def.control_class(), "plain-button");
        assert_eq!(def.property_text("label-text"), "Save");
    }

    #[test]
    fn set_property_null_removes() {
        let def = ObjectDefinition::new("f", "field").with_property("x", Value::Int(1));
        def.set_property("x", Value::Null);
        assert!(def.property("x").is_none());
    }

    #[test]
    fn set_property_through_shared_ref() {
        let def = ObjectDefinition::new("f", "field");
        def.set_property("hidden", Value::Bool(true));
        assert_eq!(def.property("hidden"), Some(Value::Bool(true)));
    }

    #[test]
    fn property_names_sorted() {
        let def = ObjectDefinition::new("f", "field")
            .with_property("b", Value::Int(2))
            .with_property("a", Value::Int(1));
        assert_eq!(def.property_names(), vec!["a", "b"]);
    }

    #[test]
    fn children() {
        let def = ObjectDefinition::new("parent", "entity")
            .with_child(ObjectDefinition::new("child1", "field"))
            .with_child(ObjectDefinition::new("child2", "field"));
        let names: Vec<_> = def.children().iter().map(ObjectDefinition::name).collect();
        assert_eq!(names, vec!["child1", "child2"]);
    }
}
