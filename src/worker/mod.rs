//! The worker contract and the standard worker library.
//!
//! A worker is a small immutable strategy object owned by a `ControlSchema`.
//! Workers declare which properties, defaults and triggers they handle
//! through [`Binding`]s, build their share of the layout once, and translate
//! property state into element mutations on every refresh. Per-instance
//! state never lives on a worker; it lives on the control instance and is
//! handed in as a [`BoundControl`] view.

pub mod attribute;
pub mod element;
pub mod style;
pub mod subcontrol;
pub mod trigger;

use std::rc::Rc;

use crate::definition::ObjectDefinition;
use crate::dom::{Dom, ElementId};
use crate::schema::{ControlRegistry, SubControlDef};
use crate::value::{PropMap, Value};

pub use attribute::{
    AttributeWorker, BoolAttribute, ChoiceAttribute, MinMaxAttribute, NumberAttribute,
    PropertyFilter, ValueBoolAttribute,
};
pub use element::{ElementWorker, SlottedElement, SlottedError, ValrepElements};
pub use style::{ClassToggle, StyleClassWorker, StylePropertyWorker};
pub use subcontrol::{StaticSubControl, SubControlsByProperty};
pub use trigger::TriggerWorker;

// ---------------------------------------------------------------------------
// Declarative bindings
// ---------------------------------------------------------------------------

/// What a worker wants registered on the schema it is attached to.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Append this worker to the ordered setter list for a property.
    /// A trailing-colon id (`"class:"`, `"style:"`) claims the whole
    /// namespace.
    Setter(String),
    /// Register this worker as the single value getter for a property.
    Getter(String),
    /// Register a class default for a property.
    Default(String, Value),
    /// Register this worker as the mapping provider for a trigger name.
    Trigger(String),
    /// Append this worker to the suffix setter list: any property whose
    /// name ends with the suffix dispatches to it.
    SuffixSetter(String),
    /// Declare a static sub-control.
    SubControl(String, SubControlDef),
    /// Mark this worker as a dynamic sub-control provider; it is consulted
    /// at connect time for definitions derived from host configuration.
    SubControlProvider,
}

// ---------------------------------------------------------------------------
// Instance views
// ---------------------------------------------------------------------------

/// Read view of a bound control instance, handed to workers.
#[derive(Clone, Copy)]
pub struct BoundControl<'a> {
    /// The instance's current property snapshot.
    pub data: &'a PropMap,
    /// The instance's root element. All element lookups are scoped under it.
    pub root: ElementId,
}

/// Mutable view used during refresh. Property writes made through
/// [`set_prop`] are picked up by the dispatcher and routed to their own
/// workers within the same batch (each worker still refreshes at most once).
///
/// [`set_prop`]: BoundControlMut::set_prop
pub struct BoundControlMut<'a> {
    pub data: &'a mut PropMap,
    pub root: ElementId,
    pub(crate) touched: &'a mut Vec<String>,
}

impl BoundControlMut<'_> {
    /// Write a property and mark it for same-batch dispatch.
    pub fn set_prop(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.data.set(name.clone(), value);
        self.touched.push(name);
    }

    /// The read view of this instance.
    pub fn as_read(&self) -> BoundControl<'_> {
        BoundControl {
            data: self.data,
            root: self.root,
        }
    }
}

// ---------------------------------------------------------------------------
// Event descriptors
// ---------------------------------------------------------------------------

/// Side effect the host applies on the instance when an updater fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterEffect {
    /// Clear format-error state before reading the value.
    ClearErrors,
}

/// "When this element fires this event, re-read the control's value."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueUpdater {
    pub element: ElementId,
    pub event: String,
    pub effect: Option<UpdaterEffect>,
}

/// "This trigger is raised when this element fires this event."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMapping {
    pub element: ElementId,
    pub event: String,
    /// Whether the host must run validation before delivering the trigger.
    pub validate: bool,
}

// ---------------------------------------------------------------------------
// The worker trait
// ---------------------------------------------------------------------------

/// A reusable binding unit. Object-safe; composed by delegation.
///
/// Every method has a default no-op so a worker implements only the aspects
/// it participates in.
pub trait Worker {
    /// Registrations this worker wants on its schema.
    fn bindings(&self) -> Vec<Binding> {
        Vec::new()
    }

    /// Nested workers attached together with this one (layout children).
    fn child_workers(&self) -> Vec<Rc<dyn Worker>> {
        Vec::new()
    }

    /// Build this worker's share of the layout. Pure construction: reads the
    /// definition only, never instance data. Returns the element it created,
    /// or `None` for workers that only bind to existing elements.
    fn layout(&self, _dom: &mut Dom, _def: &ObjectDefinition) -> Option<ElementId> {
        None
    }

    /// Re-apply property state to the surface. Idempotent; must not panic on
    /// malformed values (coerce with a warning or record a format error
    /// through the property bag).
    fn refresh(&self, _ctl: BoundControlMut<'_>, _dom: &mut Dom) {}

    /// Read the control's current value, possibly from live element state.
    fn value(&self, _ctl: BoundControl<'_>, _dom: &Dom) -> Option<Value> {
        None
    }

    /// Events that should cause the host to re-read the value.
    fn value_updaters(&self, _ctl: BoundControl<'_>, _dom: &Dom) -> Vec<ValueUpdater> {
        Vec::new()
    }

    /// The element/event pair a mapped trigger is wired to.
    fn trigger_mapping(&self, _ctl: BoundControl<'_>, _dom: &Dom) -> Option<TriggerMapping> {
        None
    }

    /// Dynamic sub-control providers: derive definitions from the host
    /// configuration and create a mount element for each under `root`.
    /// Called once at connect time.
    fn sub_control_mounts(
        &self,
        _dom: &mut Dom,
        _root: ElementId,
        _def: &ObjectDefinition,
        _registry: &ControlRegistry,
    ) -> Vec<(String, SubControlDef)> {
        Vec::new()
    }
}

/// Resolve a worker's target element: its selector scoped under the
/// instance root, or the root itself when no selector is configured.
pub(crate) fn resolve_element(
    dom: &Dom,
    root: ElementId,
    selector: Option<&crate::dom::Selector>,
) -> Option<ElementId> {
    match selector {
        Some(sel) => dom.query_selector(root, sel),
        None => Some(root),
    }
}
