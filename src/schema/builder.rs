//! `SchemaBuilder`: assembles a `ControlSchema` from worker trees.

use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

use crate::overflow::OverflowConfig;
use crate::value::{PropMap, Value};
use crate::worker::{Binding, Worker};

use super::registry::{ControlSchema, MenuItemFormatter, WorkerId};
use super::{SubControlDef, UiBlocking};

/// A class capability registration was invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two workers claimed the value getter for the same property.
    #[error("duplicate getter registration for property {0:?}")]
    DuplicateGetter(String),
    /// Two workers claimed the mapping for the same trigger.
    #[error("duplicate trigger registration for {0:?}")]
    DuplicateTrigger(String),
    /// The class has no structure worker.
    #[error("control class {0:?} has no structure worker")]
    MissingStructure(String),
}

/// Builds an immutable [`ControlSchema`].
///
/// Workers attach through [`structure`](Self::structure) (the layout worker
/// tree) or [`worker`](Self::worker) (non-structural workers such as the
/// namespace style workers). Attaching applies the worker's [`Binding`]s and
/// recurses into its children; the same worker object (by pointer identity)
/// is attached once no matter how often it appears.
pub struct SchemaBuilder {
    name: String,
    workers: Vec<Rc<dyn Worker>>,
    setters: BTreeMap<String, Vec<WorkerId>>,
    suffix_setters: Vec<(String, WorkerId)>,
    getters: BTreeMap<String, WorkerId>,
    triggers: BTreeMap<String, WorkerId>,
    defaults: PropMap,
    sub_controls: BTreeMap<String, SubControlDef>,
    sub_control_workers: Vec<WorkerId>,
    structure: Option<WorkerId>,
    ui_blocking: Option<UiBlocking>,
    warn_unsupported_properties: bool,
    warn_unsupported_triggers: bool,
    menu_item: Option<MenuItemFormatter>,
    overflow: Option<OverflowConfig>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Start building a schema for the given class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: Vec::new(),
            setters: BTreeMap::new(),
            suffix_setters: Vec::new(),
            getters: BTreeMap::new(),
            triggers: BTreeMap::new(),
            defaults: PropMap::new(),
            sub_controls: BTreeMap::new(),
            sub_control_workers: Vec::new(),
            structure: None,
            ui_blocking: None,
            warn_unsupported_properties: true,
            warn_unsupported_triggers: true,
            menu_item: None,
            overflow: None,
            error: None,
        }
    }

    /// Attach the root layout worker tree.
    pub fn structure(mut self, worker: Rc<dyn Worker>) -> Self {
        let id = self.attach(worker);
        self.structure = Some(id);
        self
    }

    /// Attach a non-structural worker.
    pub fn worker(mut self, worker: Rc<dyn Worker>) -> Self {
        self.attach(worker);
        self
    }

    /// Register (or overwrite) a class default directly.
    pub fn default_value(mut self, prop: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.set(prop, value.into());
        self
    }

    /// Declare a static sub-control directly.
    pub fn sub_control(mut self, id: impl Into<String>, def: SubControlDef) -> Self {
        self.sub_controls.insert(id.into(), def);
        self
    }

    /// Set the class UI blocking policy.
    pub fn ui_blocking(mut self, policy: UiBlocking) -> Self {
        self.ui_blocking = Some(policy);
        self
    }

    /// Control whether unsupported property keys are warned about.
    pub fn warn_unsupported_properties(mut self, warn: bool) -> Self {
        self.warn_unsupported_properties = warn;
        self
    }

    /// Control whether unmapped trigger names are warned about.
    pub fn warn_unsupported_triggers(mut self, warn: bool) -> Self {
        self.warn_unsupported_triggers = warn;
        self
    }

    /// Set the menu-item formatter for overflow menu renditions.
    pub fn menu_item(mut self, formatter: MenuItemFormatter) -> Self {
        self.menu_item = Some(formatter);
        self
    }

    /// Enable the measurement-driven overflow layout for this class.
    pub fn overflow(mut self, config: OverflowConfig) -> Self {
        self.overflow = Some(config);
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> Result<ControlSchema, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.structure.is_none() {
            return Err(SchemaError::MissingStructure(self.name));
        }
        Ok(ControlSchema {
            name: self.name,
            workers: self.workers,
            setters: self.setters,
            suffix_setters: self.suffix_setters,
            getters: self.getters,
            triggers: self.triggers,
            defaults: self.defaults,
            sub_controls: self.sub_controls,
            sub_control_workers: self.sub_control_workers,
            structure: self.structure,
            ui_blocking: self.ui_blocking,
            warn_unsupported_properties: self.warn_unsupported_properties,
            warn_unsupported_triggers: self.warn_unsupported_triggers,
            menu_item: self.menu_item,
            overflow: self.overflow,
        })
    }

    // -----------------------------------------------------------------------
    // Attachment
    // -----------------------------------------------------------------------

    fn attach(&mut self, worker: Rc<dyn Worker>) -> WorkerId {
        if let Some(existing) = self
            .workers
            .iter()
            .position(|w| Rc::ptr_eq(w, &worker))
        {
            return existing;
        }
        let id = self.workers.len();
        self.workers.push(Rc::clone(&worker));

        for binding in worker.bindings() {
            self.apply(id, binding);
        }
        for child in worker.child_workers() {
            self.attach(child);
        }
        id
    }

    fn apply(&mut self, id: WorkerId, binding: Binding) {
        match binding {
            Binding::Setter(prop) => {
                let list = self.setters.entry(prop).or_default();
                if !list.contains(&id) {
                    list.push(id);
                }
            }
            Binding::SuffixSetter(suffix) => {
                self.suffix_setters.push((suffix, id));
            }
            Binding::Getter(prop) => {
                if self.getters.insert(prop.clone(), id).is_some() && self.error.is_none() {
                    self.error = Some(SchemaError::DuplicateGetter(prop));
                }
            }
            Binding::Default(prop, value) => {
                self.defaults.set(prop, value);
            }
            Binding::Trigger(name) => {
                if self.triggers.insert(name.clone(), id).is_some() && self.error.is_none() {
                    self.error = Some(SchemaError::DuplicateTrigger(name));
                }
            }
            Binding::SubControl(sub_id, def) => {
                self.sub_controls.insert(sub_id, def);
            }
            Binding::SubControlProvider => {
                self.sub_control_workers.push(id);
            }
        }
    }
}
