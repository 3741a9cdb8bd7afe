//! `ControlInstance`: the live binding between one occurrence and the
//! render surface, implementing the host boundary contract.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::definition::ObjectDefinition;
use crate::dom::{Dom, ElementData, ElementId, Selector};
use crate::overflow::OverflowBehavior;
use crate::schema::{ControlRegistry, ControlSchema, SubControlDef, UiBlocking, WorkerId};
use crate::value::{PropMap, Value, ValueFormatting, FORMAT_ERROR_MESSAGE};
use crate::worker::{BoundControl, BoundControlMut, TriggerMapping, UpdaterEffect, ValueUpdater};

use super::delegate;
use super::lifecycle::{LifecycleState, LifecycleTracker};

/// Identifier of the structured validation error payload.
pub const VALIDATION_ERRORS_ID: &str = "VALIDATION_ERRORS";

#[derive(Serialize, Deserialize)]
struct ValidationErrors {
    id: String,
    messages: BTreeMap<String, String>,
}

/// One live control: its schema, property snapshot, root element and owned
/// sub-control instances.
pub struct ControlInstance {
    pub(crate) schema: Rc<ControlSchema>,
    pub(crate) data: PropMap,
    pub(crate) root: Option<ElementId>,
    pub(crate) sub_control_defs: BTreeMap<String, SubControlDef>,
    pub(crate) sub_controls: BTreeMap<String, ControlInstance>,
    lifecycle: LifecycleTracker,
}

impl ControlInstance {
    /// Construct an instance of a class. Static sub-control declarations are
    /// copied from the schema; the sub-control instances themselves are
    /// created at connect time, when the registry is available.
    pub fn new(schema: Rc<ControlSchema>) -> Self {
        Self {
            sub_control_defs: schema.sub_controls().clone(),
            schema,
            data: PropMap::new(),
            root: None,
            sub_controls: BTreeMap::new(),
            lifecycle: LifecycleTracker::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn schema(&self) -> &Rc<ControlSchema> {
        &self.schema
    }

    /// The current property snapshot.
    pub fn data(&self) -> &PropMap {
        &self.data
    }

    /// The bound root element, once connected.
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// A connected sub-control instance by id.
    pub fn sub_control(&self, id: &str) -> Option<&ControlInstance> {
        self.sub_controls.get(id)
    }

    fn guard_disposed(&self, operation: &str) -> bool {
        if self.lifecycle.is_disposed() {
            warn!(class = %self.schema.name(), operation, "call on disposed instance ignored");
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Connect
    // -----------------------------------------------------------------------

    /// Bind the instance to its laid-out root element, resolve and connect
    /// all sub-controls, and return the flattened value updater list (the
    /// sub-controls' updaters plus this instance's own getter's). Enters
    /// `LaidOut` when the root is bound, `Connected` when done.
    pub fn connect(
        &mut self,
        dom: &mut Dom,
        root: ElementId,
        def: &ObjectDefinition,
        registry: &ControlRegistry,
    ) -> Vec<ValueUpdater> {
        if self.guard_disposed("connect") {
            return Vec::new();
        }
        self.root = Some(root);
        self.lifecycle.transition(LifecycleState::LaidOut);
        let schema = Rc::clone(&self.schema);

        // Dynamic sub-control definitions, derived from host configuration.
        for &worker_id in schema.sub_control_workers() {
            for (id, sub_def) in schema
                .worker(worker_id)
                .sub_control_mounts(dom, root, def, registry)
            {
                self.sub_control_defs.insert(id, sub_def);
            }
        }

        let mut updaters = Vec::new();
        let defs: Vec<(String, SubControlDef)> = self
            .sub_control_defs
            .iter()
            .map(|(id, d)| (id.clone(), d.clone()))
            .collect();
        for (id, sub_def) in defs {
            let Some(sub_schema) = registry.get(&sub_def.class) else {
                warn!(%id, class = %sub_def.class, "sub-control class not registered, skipped");
                continue;
            };
            let selector = Selector::class(sub_def.style_class.clone());
            let Some(mount) = dom.query_selector(root, &selector) else {
                warn!(%id, class = %sub_def.style_class, "sub-control mount not found, skipped");
                continue;
            };
            let sub_object = delegate::slice_definition(def, &id, &sub_def);
            let placeholder = dom.insert_child(mount, ElementData::new("div"));
            let sub_root = sub_schema.process_layout(dom, placeholder, &sub_object);
            let mut sub = ControlInstance::new(sub_schema);
            updaters.extend(sub.connect(dom, sub_root, &sub_object, registry));
            self.sub_controls.insert(id, sub);
        }

        if let Some(getter) = schema.getter("value") {
            updaters.extend(schema.worker(getter).value_updaters(
                BoundControl {
                    data: &self.data,
                    root,
                },
                dom,
            ));
        }

        self.lifecycle.transition(LifecycleState::Connected);
        updaters
    }

    // -----------------------------------------------------------------------
    // Data flow
    // -----------------------------------------------------------------------

    /// Replace the snapshot wholesale with a fresh copy of the class
    /// defaults. Anything layered on by earlier updates is discarded, and
    /// `class:`-derived style classes leave the root element. Prefixed
    /// defaults are sliced out per sub-control (honoring its allow-list) and
    /// forwarded; the rest dispatches through the instance's own workers.
    pub fn data_init(&mut self, dom: &mut Dom) {
        if self.guard_disposed("data_init") {
            return;
        }
        let stale: Vec<String> = self.data.keys().map(str::to_owned).collect();
        for name in &stale {
            if let Some(class) = name.strip_prefix("class:") {
                if let Some(data) = self.root.and_then(|root| dom.get_mut(root)) {
                    data.remove_class(class);
                }
            }
        }
        self.data = PropMap::new();
        let mut defaults = self.schema.defaults().clone();
        let defs = self.sub_control_defs.clone();
        for (id, sub_def) in &defs {
            let slice = delegate::extract_sub_data(&mut defaults, sub_def);
            if let Some(sub) = self.sub_controls.get_mut(id) {
                sub.data_init(dom);
                if !slice.is_empty() {
                    sub.data_update(dom, slice);
                }
            }
        }
        self.lifecycle.transition(LifecycleState::Active);
        self.set_properties(dom, defaults);
    }

    /// Apply a property diff: prefixed keys route to sub-controls, the rest
    /// dispatches here.
    pub fn data_update(&mut self, dom: &mut Dom, diff: PropMap) {
        if self.guard_disposed("data_update") {
            return;
        }
        let mut diff = diff;
        let defs = self.sub_control_defs.clone();
        for (id, sub_def) in &defs {
            let slice = delegate::extract_sub_data(&mut diff, sub_def);
            if slice.is_empty() {
                continue;
            }
            match self.sub_controls.get_mut(id) {
                Some(sub) => sub.data_update(dom, slice),
                None => warn!(%id, "diff for unconnected sub-control dropped"),
            }
        }
        self.set_properties(dom, diff);
    }

    /// The property dispatcher. Stores each value (substituting the class
    /// default for the reset sentinel), collects the affected workers into
    /// an ordered set and refreshes each exactly once per batch. Property
    /// writes made by workers during refresh dispatch within the same batch.
    pub fn set_properties(&mut self, dom: &mut Dom, diff: PropMap) {
        if self.guard_disposed("set_properties") {
            return;
        }
        let Some(root) = self.root else {
            warn!(class = %self.schema.name(), "set_properties before connect ignored");
            return;
        };
        let schema = Rc::clone(&self.schema);

        let mut pending: Vec<String> = Vec::new();
        for (key, value) in diff.iter() {
            if schema.overflow().is_some() && !self.store_overflow_prop(key, value) {
                continue;
            }
            let resolved = if value.is_reset() {
                schema.default(key).cloned().unwrap_or(Value::Null)
            } else {
                value.clone()
            };
            self.data.set(key.to_owned(), resolved);
            pending.push(key.to_owned());
        }

        let mut refreshed: BTreeSet<WorkerId> = BTreeSet::new();
        let mut overflow_pending = false;
        while !pending.is_empty() {
            let keys = std::mem::take(&mut pending);
            let mut batch: BTreeSet<WorkerId> = BTreeSet::new();
            for key in &keys {
                let mut handled = false;
                if let Some(config) = schema.overflow() {
                    if *key == config.resize_prop
                        || key.ends_with("_overflow-behavior")
                        || key.ends_with("_priority")
                    {
                        overflow_pending = true;
                        handled = true;
                    }
                }
                let workers = schema.workers_for_key(key);
                if workers.is_empty() {
                    if !handled && schema.warn_unsupported_properties() {
                        warn!(class = %schema.name(), property = %key, "unsupported property ignored");
                    }
                    continue;
                }
                for id in workers {
                    if !refreshed.contains(&id) {
                        batch.insert(id);
                    }
                }
            }

            let mut touched = Vec::new();
            for id in batch {
                refreshed.insert(id);
                schema.worker(id).refresh(
                    BoundControlMut {
                        data: &mut self.data,
                        root,
                        touched: &mut touched,
                    },
                    dom,
                );
            }
            pending = touched;
        }

        if overflow_pending {
            self.check_overflow(dom);
        }
    }

    /// Validate an overflow-related property value before it is stored.
    /// Returns whether the value is acceptable.
    fn store_overflow_prop(&self, key: &str, value: &Value) -> bool {
        if value.is_reset() || matches!(value, Value::Null) {
            return true;
        }
        if key.ends_with("_overflow-behavior") && OverflowBehavior::parse(value).is_none() {
            warn!(property = %key, value = %value, "invalid overflow behavior ignored");
            return false;
        }
        if key.ends_with("_priority") && !value.as_int().is_some_and(|n| n >= 0) {
            warn!(property = %key, value = %value, "invalid overflow priority ignored");
            return false;
        }
        true
    }

    /// The control's current value: the registered getter's reading, or
    /// empty text when the class has no getter.
    pub fn get_value(&self, dom: &Dom) -> Value {
        let Some(root) = self.root else {
            return Value::Text(String::new());
        };
        self.schema
            .getter("value")
            .and_then(|id| {
                self.schema.worker(id).value(
                    BoundControl {
                        data: &self.data,
                        root,
                    },
                    dom,
                )
            })
            .unwrap_or_else(|| Value::Text(String::new()))
    }

    /// Apply an updater's side effect before re-reading the value.
    pub fn apply_updater_effect(&mut self, dom: &mut Dom, effect: UpdaterEffect) {
        match effect {
            UpdaterEffect::ClearErrors => self.set_properties(
                dom,
                PropMap::from([
                    ("format-error", Value::Bool(false)),
                    ("format-error-message", Value::Text(String::new())),
                ]),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Validation and errors
    // -----------------------------------------------------------------------

    fn own_error_message(&self) -> Option<String> {
        if self.data.truthy("format-error") {
            let message = self.data.text("format-error-message");
            return Some(if message.is_empty() {
                FORMAT_ERROR_MESSAGE.to_owned()
            } else {
                message
            });
        }
        if self.data.truthy("error") {
            let message = self.data.text("error-message");
            if !message.is_empty() {
                return Some(message);
            }
        }
        None
    }

    /// Collect error state. Leaf instances report their own message; a
    /// composite with erroneous sub-controls reports a JSON-encoded
    /// structured map keyed by sub-control id. `None` when clean.
    pub fn validate(&self) -> Option<String> {
        let mut messages = BTreeMap::new();
        for (id, sub) in &self.sub_controls {
            if let Some(message) = sub.validate() {
                messages.insert(id.clone(), message);
            }
        }
        if messages.is_empty() {
            return self.own_error_message();
        }
        let payload = ValidationErrors {
            id: VALIDATION_ERRORS_ID.to_owned(),
            messages,
        };
        serde_json::to_string(&payload).ok()
    }

    /// Show an error: a structured map fans out to the named sub-controls,
    /// anything else becomes this instance's own `error` state.
    pub fn show_error(&mut self, dom: &mut Dom, message: &str) {
        if self.guard_disposed("show_error") {
            return;
        }
        if let Ok(parsed) = serde_json::from_str::<ValidationErrors>(message) {
            if parsed.id == VALIDATION_ERRORS_ID {
                for (id, sub_message) in parsed.messages {
                    match self.sub_controls.get_mut(&id) {
                        Some(sub) => sub.show_error(dom, &sub_message),
                        None => warn!(%id, "validation message for unknown sub-control"),
                    }
                }
                return;
            }
        }
        self.set_properties(
            dom,
            PropMap::from([
                ("error", Value::Bool(true)),
                ("error-message", Value::from(message)),
            ]),
        );
    }

    /// Clear error state, recursively.
    pub fn hide_error(&mut self, dom: &mut Dom) {
        if self.guard_disposed("hide_error") {
            return;
        }
        for sub in self.sub_controls.values_mut() {
            sub.hide_error(dom);
        }
        self.set_properties(
            dom,
            PropMap::from([
                ("error", Value::Bool(false)),
                ("error-message", Value::Text(String::new())),
            ]),
        );
    }

    // -----------------------------------------------------------------------
    // UI blocking
    // -----------------------------------------------------------------------

    /// Block interaction, recursively, applying the class blocking policy
    /// to the root element.
    pub fn block_ui(&mut self, dom: &mut Dom) {
        if self.guard_disposed("block_ui") {
            return;
        }
        for sub in self.sub_controls.values_mut() {
            sub.block_ui(dom);
        }
        if let Some(data) = self.root.and_then(|root| dom.get_mut(root)) {
            data.add_class("u-blocked");
            match self.schema.ui_blocking() {
                Some(UiBlocking::Disabled) => data.disabled = true,
                Some(UiBlocking::Readonly) => data.readonly = true,
                None => {}
            }
        }
        self.lifecycle.transition(LifecycleState::Blocked);
    }

    /// Undo [`block_ui`](Self::block_ui), restoring the property-derived
    /// disabled/readonly state.
    pub fn unblock_ui(&mut self, dom: &mut Dom) {
        if self.guard_disposed("unblock_ui") {
            return;
        }
        for sub in self.sub_controls.values_mut() {
            sub.unblock_ui(dom);
        }
        let disabled = self.data.truthy("html:disabled");
        let readonly = self.data.truthy("html:readonly");
        if let Some(data) = self.root.and_then(|root| dom.get_mut(root)) {
            data.remove_class("u-blocked");
            match self.schema.ui_blocking() {
                Some(UiBlocking::Disabled) => data.disabled = disabled,
                Some(UiBlocking::Readonly) => data.readonly = readonly,
                None => {}
            }
        }
        self.lifecycle.transition(LifecycleState::Active);
    }

    // -----------------------------------------------------------------------
    // Triggers
    // -----------------------------------------------------------------------

    /// Resolve a trigger name to its element/event mapping: the instance's
    /// own trigger table first, then sub-controls by prefix stripping,
    /// honoring each sub-control's trigger filter. First match wins.
    pub fn map_trigger(&self, dom: &Dom, name: &str) -> Option<TriggerMapping> {
        if self.guard_disposed("map_trigger") {
            return None;
        }
        let root = self.root?;
        if let Some(worker_id) = self.schema.trigger(name) {
            let mapping = self.schema.worker(worker_id).trigger_mapping(
                BoundControl {
                    data: &self.data,
                    root,
                },
                dom,
            );
            if mapping.is_some() {
                return mapping;
            }
        }
        for (id, sub) in &self.sub_controls {
            let Some(sub_def) = self.sub_control_defs.get(id) else {
                continue;
            };
            if let Some(stripped) = delegate::accepted_trigger(name, sub_def) {
                if let Some(mapping) = sub.map_trigger(dom, stripped) {
                    return Some(mapping);
                }
            }
        }
        if self.schema.warn_unsupported_triggers() {
            warn!(class = %self.schema.name(), trigger = %name, "trigger not mapped");
        }
        None
    }

    // -----------------------------------------------------------------------
    // Cleanup and disposal
    // -----------------------------------------------------------------------

    /// Remove the named properties, undoing the style classes `class:`
    /// properties introduced. Recurses into sub-controls by prefix.
    pub fn data_cleanup(&mut self, dom: &mut Dom, names: &[String]) {
        if self.guard_disposed("data_cleanup") {
            return;
        }
        let defs = self.sub_control_defs.clone();
        for (id, sub_def) in &defs {
            let sub_names: Vec<String> = names
                .iter()
                .filter_map(|n| delegate::strip_prefix(n, &sub_def.prefix))
                .map(str::to_owned)
                .collect();
            if sub_names.is_empty() {
                continue;
            }
            if let Some(sub) = self.sub_controls.get_mut(id) {
                sub.data_cleanup(dom, &sub_names);
            }
        }
        for name in names {
            if let Some(class) = name.strip_prefix("class:") {
                if let Some(data) = self.root.and_then(|root| dom.get_mut(root)) {
                    data.remove_class(class);
                }
            }
            self.data.remove(name);
        }
    }

    /// Tear the instance down: dispose sub-controls depth-first, remove the
    /// bound subtree from the surface and enter the terminal state. Any
    /// later host call on this instance warns and does nothing.
    pub fn dispose(&mut self, dom: &mut Dom) {
        if self.guard_disposed("dispose") {
            return;
        }
        for sub in self.sub_controls.values_mut() {
            sub.dispose(dom);
        }
        if let Some(root) = self.root.take() {
            dom.remove(root);
        }
        debug!(class = %self.schema.name(), "instance disposed");
        self.lifecycle.transition(LifecycleState::Disposed);
    }

    // -----------------------------------------------------------------------
    // Menu rendition
    // -----------------------------------------------------------------------

    /// The compact rendition used when this control is evicted into an
    /// overflow menu. Classes without a formatter yield the "not supported"
    /// fallback.
    pub fn menu_item(&self) -> ValueFormatting {
        match self.schema.menu_item_formatter() {
            Some(format) => {
                let mut formatting = format(&self.data);
                if formatting.error_message.is_none() {
                    formatting.error_message = self.own_error_message();
                }
                formatting
            }
            None => ValueFormatting {
                primary_text: format!(
                    "ERROR: {} not supported as menu-item!",
                    self.schema.name()
                ),
                prefix_icon: Some("Blocked".into()),
                error_message: self.own_error_message(),
                not_supported: true,
                ..ValueFormatting::default()
            },
        }
    }
}
