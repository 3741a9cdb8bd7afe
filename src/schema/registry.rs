//! The built `ControlSchema` and the class registry.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::definition::ObjectDefinition;
use crate::dom::{Dom, ElementId};
use crate::overflow::OverflowConfig;
use crate::value::{PropMap, Value, ValueFormatting};
use crate::worker::Worker;

use super::{SubControlDef, UiBlocking};

/// Index of a worker in its schema's worker arena. Stable registration
/// order; dispatch dedup sets are ordered by it.
pub type WorkerId = usize;

/// Formatter producing a compact menu rendition from a property snapshot.
pub type MenuItemFormatter = fn(&PropMap) -> ValueFormatting;

/// Everything a control class can do, built once by
/// [`SchemaBuilder`](super::SchemaBuilder) and immutable afterwards.
/// Shared by `Rc` between the registry and every live instance.
pub struct ControlSchema {
    pub(crate) name: String,
    pub(crate) workers: Vec<Rc<dyn Worker>>,
    pub(crate) setters: BTreeMap<String, Vec<WorkerId>>,
    pub(crate) suffix_setters: Vec<(String, WorkerId)>,
    pub(crate) getters: BTreeMap<String, WorkerId>,
    pub(crate) triggers: BTreeMap<String, WorkerId>,
    pub(crate) defaults: PropMap,
    pub(crate) sub_controls: BTreeMap<String, SubControlDef>,
    pub(crate) sub_control_workers: Vec<WorkerId>,
    pub(crate) structure: Option<WorkerId>,
    pub(crate) ui_blocking: Option<UiBlocking>,
    pub(crate) warn_unsupported_properties: bool,
    pub(crate) warn_unsupported_triggers: bool,
    pub(crate) menu_item: Option<MenuItemFormatter>,
    pub(crate) overflow: Option<OverflowConfig>,
}

impl ControlSchema {
    /// The class name this schema is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a worker by id.
    pub(crate) fn worker(&self, id: WorkerId) -> &Rc<dyn Worker> {
        &self.workers[id]
    }

    /// The workers that handle a property key, in registration order:
    /// exact setters, then the key's namespace setters (`class:`, `style:`),
    /// then suffix setters whose suffix the key ends with.
    pub fn workers_for_key(&self, key: &str) -> Vec<WorkerId> {
        let mut ids = Vec::new();
        if let Some(exact) = self.setters.get(key) {
            ids.extend_from_slice(exact);
        }
        if let Some(pos) = key.find(':') {
            let namespace = &key[..=pos];
            if namespace.len() < key.len() {
                if let Some(ns) = self.setters.get(namespace) {
                    ids.extend_from_slice(ns);
                }
            }
        }
        for (suffix, id) in &self.suffix_setters {
            if key.len() > suffix.len() && key.ends_with(suffix) {
                ids.push(*id);
            }
        }
        ids.dedup();
        ids
    }

    /// Whether any worker handles this property key.
    pub fn supports_property(&self, key: &str) -> bool {
        !self.workers_for_key(key).is_empty()
    }

    /// The class default for a property.
    pub fn default(&self, prop: &str) -> Option<&Value> {
        self.defaults.get(prop)
    }

    /// All class defaults.
    pub fn defaults(&self) -> &PropMap {
        &self.defaults
    }

    /// The single getter worker for a property, if registered.
    pub(crate) fn getter(&self, prop: &str) -> Option<WorkerId> {
        self.getters.get(prop).copied()
    }

    /// The mapping worker for a trigger name, if registered.
    pub(crate) fn trigger(&self, name: &str) -> Option<WorkerId> {
        self.triggers.get(name).copied()
    }

    /// Static sub-control declarations, keyed by id.
    pub fn sub_controls(&self) -> &BTreeMap<String, SubControlDef> {
        &self.sub_controls
    }

    pub(crate) fn sub_control_workers(&self) -> &[WorkerId] {
        &self.sub_control_workers
    }

    /// The class UI blocking policy.
    pub fn ui_blocking(&self) -> Option<UiBlocking> {
        self.ui_blocking
    }

    pub(crate) fn warn_unsupported_properties(&self) -> bool {
        self.warn_unsupported_properties
    }

    pub(crate) fn warn_unsupported_triggers(&self) -> bool {
        self.warn_unsupported_triggers
    }

    pub(crate) fn menu_item_formatter(&self) -> Option<MenuItemFormatter> {
        self.menu_item
    }

    /// The overflow layout configuration, for composite classes.
    pub fn overflow(&self) -> Option<&OverflowConfig> {
        self.overflow.as_ref()
    }

    /// Build this class's layout in place of `placeholder`.
    ///
    /// Runs the structure worker tree once, carries the placeholder's id over
    /// to the new root, copies placeholder style classes into the definition
    /// as `class:<name>` properties, and replaces the placeholder in the
    /// tree. Returns the new root (the placeholder itself when the structure
    /// worker produces nothing).
    pub fn process_layout(
        &self,
        dom: &mut Dom,
        placeholder: ElementId,
        def: &ObjectDefinition,
    ) -> ElementId {
        let (carried_id, classes) = match dom.get(placeholder) {
            Some(data) => (data.id.clone(), data.classes.clone()),
            None => (None, Vec::new()),
        };
        for class in classes {
            def.set_property(&format!("class:{class}"), Value::Bool(true));
        }

        let Some(structure) = self.structure else {
            return placeholder;
        };
        match self.workers[structure].layout(dom, def) {
            Some(new_root) => {
                if let Some(data) = dom.get_mut(new_root) {
                    if data.id.is_none() {
                        data.id = carried_id;
                    }
                }
                dom.replace(placeholder, new_root);
                new_root
            }
            None => {
                warn!(class = %self.name, "structure worker produced no layout");
                placeholder
            }
        }
    }
}

// Workers are trait objects, so the derive is unavailable.
impl fmt::Debug for ControlSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSchema")
            .field("name", &self.name)
            .field("workers", &self.workers.len())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .field("triggers", &self.triggers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name to schema mapping, passed by reference wherever dynamic sub-control
/// classes are resolved. No global state.
#[derive(Default)]
pub struct ControlRegistry {
    classes: BTreeMap<String, Rc<ControlSchema>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its class name. Re-registering a name
    /// replaces the previous schema with a warning.
    pub fn register(&mut self, schema: ControlSchema) -> Rc<ControlSchema> {
        let schema = Rc::new(schema);
        if self
            .classes
            .insert(schema.name.clone(), Rc::clone(&schema))
            .is_some()
        {
            warn!(class = %schema.name, "control class re-registered");
        }
        schema
    }

    /// Resolve a class name.
    pub fn get(&self, name: &str) -> Option<Rc<ControlSchema>> {
        self.classes.get(name).map(Rc::clone)
    }

    /// Registered class names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use crate::worker::ElementWorker;

    #[test]
    fn schema_debug_names_the_class() {
        let schema = SchemaBuilder::new("plain-button")
            .structure(Rc::new(ElementWorker::new("button")))
            .build()
            .unwrap();
        let rendered = format!("{schema:?}");
        assert!(rendered.contains("plain-button"));
        assert!(rendered.starts_with("ControlSchema"));
    }
}
