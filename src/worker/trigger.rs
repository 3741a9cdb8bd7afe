//! Trigger mapping worker.

use tracing::warn;

use crate::dom::{Dom, Selector};

use super::{resolve_element, Binding, BoundControl, TriggerMapping, Worker};

/// Maps a named trigger to an element/event pair, optionally requiring
/// validation before delivery.
pub struct TriggerWorker {
    name: String,
    event: String,
    selector: Option<Selector>,
    validate: bool,
}

impl TriggerWorker {
    pub fn new(name: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event: event.into(),
            selector: None,
            validate: false,
        }
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Require host-side validation before the trigger fires.
    pub fn with_validation(mut self) -> Self {
        self.validate = true;
        self
    }
}

impl Worker for TriggerWorker {
    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::Trigger(self.name.clone())]
    }

    fn trigger_mapping(&self, ctl: BoundControl<'_>, dom: &Dom) -> Option<TriggerMapping> {
        let Some(element) = resolve_element(dom, ctl.root, self.selector.as_ref()) else {
            warn!(trigger = %self.name, "trigger element not found");
            return None;
        };
        Some(TriggerMapping {
            element,
            event: self.event.clone(),
            validate: self.validate,
        })
    }
}
