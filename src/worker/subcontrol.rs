//! Sub-control workers: static slotted composition and dynamic composition
//! from host configuration.
//!
//! Both produce a mount element per sub-control: a wrapper carrying the
//! style-scope class and the `sub-control-id` attribute. The sub-control's
//! own layout is built inside the wrapper at connect time, so the wrapper
//! stays a stable handle for visibility toggles and overflow eviction.

use tracing::warn;

use crate::definition::ObjectDefinition;
use crate::dom::{Dom, ElementData, ElementId, Selector};
use crate::schema::{ControlRegistry, SubControlDef};
use crate::value::Value;

use super::{Binding, BoundControlMut, Worker};

/// Attribute naming the sub-control a mount element belongs to.
pub const SUB_CONTROL_ID_ATTR: &str = "sub-control-id";

/// Build a mount wrapper element for a sub-control.
pub(crate) fn mount_element(id: &str, style_class: &str) -> ElementData {
    ElementData::new("div")
        .with_class(style_class)
        .with_attr(SUB_CONTROL_ID_ATTR, id)
}

// ---------------------------------------------------------------------------
// StaticSubControl
// ---------------------------------------------------------------------------

/// A fixed nested control declared by the class itself, mounted in a slot
/// of the parent layout.
pub struct StaticSubControl {
    id: String,
    def: SubControlDef,
    slot: Option<String>,
    visible_prop: Option<String>,
    defaults: Vec<(String, Value)>,
}

impl StaticSubControl {
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        let id = id.into();
        let def = SubControlDef::new(&id, class);
        Self {
            id,
            def,
            slot: None,
            visible_prop: None,
            defaults: Vec::new(),
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Register a boolean property toggling the sub-control's visibility.
    pub fn with_visible_prop(mut self, prop: impl Into<String>) -> Self {
        self.visible_prop = Some(prop.into());
        self
    }

    /// Register a class default for one of the sub-control's properties.
    /// The key is prefixed with `<id>:` automatically.
    pub fn with_default(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.defaults
            .push((format!("{}:{}", self.id, key.as_ref()), value.into()));
        self
    }

    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def = self.def.with_triggers(triggers);
        self
    }

    pub fn with_delegated_properties<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def = self.def.with_delegated_properties(props);
        self
    }
}

impl Worker for StaticSubControl {
    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![Binding::SubControl(self.id.clone(), self.def.clone())];
        for (key, value) in &self.defaults {
            bindings.push(Binding::Default(key.clone(), value.clone()));
        }
        if let Some(prop) = &self.visible_prop {
            bindings.push(Binding::Setter(prop.clone()));
            bindings.push(Binding::Default(prop.clone(), Value::Bool(true)));
        }
        bindings
    }

    fn layout(&self, dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        let mut data = mount_element(&self.id, &self.def.style_class);
        data.slot = self.slot.clone();
        Some(dom.insert(data))
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(prop) = &self.visible_prop else {
            return;
        };
        let selector = Selector::class(self.def.style_class.clone());
        let Some(mount) = dom.query_selector(ctl.root, &selector) else {
            warn!(id = %self.id, "sub-control mount not found");
            return;
        };
        let visible = ctl.data.truthy(prop);
        if let Some(data) = dom.get_mut(mount) {
            data.hidden = !visible;
        }
    }
}

// ---------------------------------------------------------------------------
// SubControlsByProperty
// ---------------------------------------------------------------------------

/// Dynamic sub-controls derived from a host property listing ids.
///
/// For each id in the semicolon-separated list, the definition supplies
/// `<id>_control-class` and optionally `<id>_delegated-properties`. Ids
/// whose class is missing or unregistered are pruned from the definition
/// property with a warning.
pub struct SubControlsByProperty {
    prop: String,
    container_class: String,
}

impl SubControlsByProperty {
    pub fn new(prop: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            container_class: "u-sub-controls".into(),
        }
    }

    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    fn split_list(text: &str) -> Vec<String> {
        text.split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl Worker for SubControlsByProperty {
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::Setter(self.prop.clone()),
            Binding::SubControlProvider,
        ]
    }

    fn layout(&self, dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        Some(dom.insert(ElementData::new("div").with_class(self.container_class.clone())))
    }

    fn sub_control_mounts(
        &self,
        dom: &mut Dom,
        root: ElementId,
        def: &ObjectDefinition,
        registry: &ControlRegistry,
    ) -> Vec<(String, SubControlDef)> {
        let selector = Selector::class(self.container_class.clone());
        let container = match dom.query_selector(root, &selector) {
            Some(container) => container,
            None => {
                warn!(class = %self.container_class, "sub-control container not found, using root");
                root
            }
        };

        let requested = Self::split_list(&def.property_text(&self.prop));
        let mut kept = Vec::new();
        let mut defs = Vec::new();
        for id in requested {
            let class = def.property_text(&format!("{id}_control-class"));
            if class.is_empty() {
                warn!(%id, "sub-control has no control class, dropped");
                continue;
            }
            if registry.get(&class).is_none() {
                warn!(%id, %class, "sub-control class not registered, dropped");
                continue;
            }
            let mut sub_def = SubControlDef::new(&id, class);
            let delegated = def.property_text(&format!("{id}_delegated-properties"));
            if !delegated.is_empty() {
                sub_def = sub_def.with_delegated_properties(Self::split_list(&delegated));
            }
            dom.insert_child(container, mount_element(&id, &sub_def.style_class));
            defs.push((id.clone(), sub_def));
            kept.push(id);
        }

        // Prune invalid ids back into the definition so later reads see the
        // effective list.
        let effective = kept.join(";");
        if effective != def.property_text(&self.prop) {
            def.set_property(&self.prop, Value::Text(effective));
        }
        defs
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::schema::SchemaBuilder;
    use crate::value::PropMap;
    use crate::worker::ElementWorker;

    fn registry_with(class: &str) -> ControlRegistry {
        let mut registry = ControlRegistry::new();
        let schema = SchemaBuilder::new(class)
            .structure(Rc::new(ElementWorker::new("button")))
            .build()
            .unwrap();
        registry.register(schema);
        registry
    }

    #[test]
    fn static_sub_control_bindings_and_mount() {
        let worker = StaticSubControl::new("changebutton", "plain-button")
            .with_slot("actions")
            .with_visible_prop("changebutton-shown")
            .with_default("icon", "Edit");
        let bindings = worker.bindings();
        assert!(bindings
            .iter()
            .any(|b| matches!(b, Binding::SubControl(id, _) if id == "changebutton")));
        assert!(bindings
            .iter()
            .any(|b| matches!(b, Binding::Default(k, v)
                if k == "changebutton:icon" && *v == Value::Text("Edit".into()))));

        let mut dom = Dom::new();
        let def = ObjectDefinition::new("f", "field");
        let mount = worker.layout(&mut dom, &def).unwrap();
        let data = dom.get(mount).unwrap();
        assert!(data.has_class("u-sub-changebutton"));
        assert_eq!(data.attr(SUB_CONTROL_ID_ATTR), Some("changebutton"));
        assert_eq!(data.slot.as_deref(), Some("actions"));
    }

    #[test]
    fn static_sub_control_visibility_toggle() {
        let worker = StaticSubControl::new("badge", "plain-text").with_visible_prop("badge-shown");
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let def = ObjectDefinition::new("f", "field");
        let mount = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(mount, root);

        let mut data = PropMap::from([("badge-shown", Value::Bool(false))]);
        let mut touched = Vec::new();
        worker.refresh(
            BoundControlMut {
                data: &mut data,
                root,
                touched: &mut touched,
            },
            &mut dom,
        );
        assert!(dom.get(mount).unwrap().hidden);
    }

    #[test]
    fn dynamic_mounts_and_pruning() {
        let worker = SubControlsByProperty::new("controls");
        let registry = registry_with("plain-button");
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let def = ObjectDefinition::new("bar", "field")
            .with_property("controls", "save;bogus;open")
            .with_property("save_control-class", "plain-button")
            .with_property("open_control-class", "unregistered-class");
        let container = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(container, root);

        let defs = worker.sub_control_mounts(&mut dom, root, &def, &registry);
        // Only "save" survives: "bogus" has no class, "open" an unknown one.
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].0, "save");
        assert_eq!(defs[0].1.class, "plain-button");
        assert_eq!(def.property_text("controls"), "save");

        let kids = dom.children(container);
        assert_eq!(kids.len(), 1);
        assert!(dom.get(kids[0]).unwrap().has_class("u-sub-save"));
    }

    #[test]
    fn dynamic_delegated_properties_parsed() {
        let worker = SubControlsByProperty::new("controls");
        let registry = registry_with("plain-button");
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("div"));
        let def = ObjectDefinition::new("bar", "field")
            .with_property("controls", "save")
            .with_property("save_control-class", "plain-button")
            .with_property("save_delegated-properties", "icon; label-text");
        let container = worker.layout(&mut dom, &def).unwrap();
        dom.reparent(container, root);

        let defs = worker.sub_control_mounts(&mut dom, root, &def, &registry);
        assert_eq!(defs[0].1.delegated_properties, vec!["icon", "label-text"]);
    }
}
