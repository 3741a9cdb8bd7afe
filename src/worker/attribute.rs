//! Attribute workers: property-to-attribute translation with coercion and
//! range/choice validation.

use tracing::warn;

use crate::dom::{Dom, Selector};
use crate::value::{field_bool, ConvertError, Value};

use super::{
    resolve_element, Binding, BoundControl, BoundControlMut, UpdaterEffect, ValueUpdater, Worker,
};

// ---------------------------------------------------------------------------
// AttributeWorker
// ---------------------------------------------------------------------------

/// Copies a property into a string attribute. When bound to the `value`
/// property it is also the control's getter and updater source.
pub struct AttributeWorker {
    prop: String,
    attr: String,
    selector: Option<Selector>,
    default: Option<Value>,
    event: String,
}

impl AttributeWorker {
    pub fn new(prop: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            attr: attr.into(),
            selector: None,
            default: None,
            event: "change".into(),
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

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    fn is_value_prop(&self) -> bool {
        self.prop == "value"
    }
}

impl Worker for AttributeWorker {
    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![Binding::Setter(self.prop.clone())];
        if let Some(default) = &self.default {
            bindings.push(Binding::Default(self.prop.clone(), default.clone()));
        }
        if self.is_value_prop() {
            bindings.push(Binding::Getter(self.prop.clone()));
        }
        bindings
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(element) = resolve_element(dom, ctl.root, self.selector.as_ref()) else {
            warn!(prop = %self.prop, "target element not found");
            return;
        };
        let value = ctl.data.get(&self.prop).cloned().unwrap_or_default();
        if let Some(data) = dom.get_mut(element) {
            data.apply_attr(&self.attr, value.to_attr_string());
        }
    }

    fn value(&self, ctl: BoundControl<'_>, dom: &Dom) -> Option<Value> {
        if !self.is_value_prop() {
            return None;
        }
        let element = resolve_element(dom, ctl.root, self.selector.as_ref())?;
        dom.get(element)?
            .read_attr(&self.attr)
            .map(Value::Text)
            .or(Some(Value::Text(String::new())))
    }

    fn value_updaters(&self, ctl: BoundControl<'_>, dom: &Dom) -> Vec<ValueUpdater> {
        if !self.is_value_prop() {
            return Vec::new();
        }
        resolve_element(dom, ctl.root, self.selector.as_ref())
            .map(|element| ValueUpdater {
                element,
                event: self.event.clone(),
                effect: None,
            })
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// BoolAttribute
// ---------------------------------------------------------------------------

/// Lenient boolean attribute: truthy sets it, falsy removes it. Never fails.
pub struct BoolAttribute {
    prop: String,
    attr: String,
    selector: Option<Selector>,
    default: Option<Value>,
}

impl BoolAttribute {
    pub fn new(prop: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            attr: attr.into(),
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

impl Worker for BoolAttribute {
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
            data.apply_attr(&self.attr, on.then(|| "true".to_owned()));
        }
    }
}

// ---------------------------------------------------------------------------
// ValueBoolAttribute
// ---------------------------------------------------------------------------

/// Strict boolean bound to the `value` property (checkbox-style controls).
///
/// A value that fails the strict field coercion is not applied; instead the
/// failure is recorded as a `format-error` property update, which the
/// dispatcher routes to the error worker within the same batch. Its updaters
/// carry the clear-errors effect so a user edit resets the error state.
pub struct ValueBoolAttribute {
    attr: String,
    selector: Option<Selector>,
    event: String,
}

impl ValueBoolAttribute {
    pub fn new(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            selector: None,
            event: "change".into(),
        }
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }
}

impl Worker for ValueBoolAttribute {
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::Setter("value".into()),
            Binding::Getter("value".into()),
            Binding::Default("value".into(), Value::Text("false".into())),
        ]
    }

    fn refresh(&self, mut ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(element) = resolve_element(dom, ctl.root, self.selector.as_ref()) else {
            warn!("target element not found");
            return;
        };
        let value = ctl.data.get("value").cloned().unwrap_or_default();
        match field_bool(&value) {
            Ok(on) => {
                if let Some(data) = dom.get_mut(element) {
                    data.apply_attr(&self.attr, on.then(|| "true".to_owned()));
                }
                // Clear a previous format error once a valid value arrives.
                if ctl.data.truthy("format-error") {
                    ctl.set_prop("format-error", Value::Bool(false));
                    ctl.set_prop("format-error-message", Value::Text(String::new()));
                }
            }
            Err(error) => {
                warn!(%error, "value is not a valid boolean field value");
                for (prop, value) in ConvertError::format_error() {
                    ctl.set_prop(prop, value);
                }
            }
        }
    }

    fn value(&self, ctl: BoundControl<'_>, dom: &Dom) -> Option<Value> {
        let element = resolve_element(dom, ctl.root, self.selector.as_ref())?;
        let on = dom
            .get(element)?
            .read_attr(&self.attr)
            .is_some_and(|v| v == "true");
        Some(Value::Bool(on))
    }

    fn value_updaters(&self, ctl: BoundControl<'_>, dom: &Dom) -> Vec<ValueUpdater> {
        resolve_element(dom, ctl.root, self.selector.as_ref())
            .map(|element| ValueUpdater {
                element,
                event: self.event.clone(),
                effect: Some(UpdaterEffect::ClearErrors),
            })
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ChoiceAttribute
// ---------------------------------------------------------------------------

/// Enumerated attribute: only listed values are applied, anything else
/// warns and leaves the attribute unchanged.
pub struct ChoiceAttribute {
    prop: String,
    attr: String,
    choices: Vec<String>,
    selector: Option<Selector>,
    default: Option<Value>,
}

impl ChoiceAttribute {
    pub fn new<I, S>(prop: impl Into<String>, attr: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prop: prop.into(),
            attr: attr.into(),
            choices: choices.into_iter().map(Into::into).collect(),
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

impl Worker for ChoiceAttribute {
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
        match ctl.data.get(&self.prop) {
            None | Some(Value::Null) => {
                if let Some(data) = dom.get_mut(element) {
                    data.apply_attr(&self.attr, None);
                }
            }
            Some(value) => {
                let text = value.to_attr_string().unwrap_or_default();
                if self.choices.iter().any(|c| c == &text) {
                    if let Some(data) = dom.get_mut(element) {
                        data.apply_attr(&self.attr, Some(text));
                    }
                } else {
                    warn!(prop = %self.prop, value = %text, "not an allowed choice, ignored");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NumberAttribute
// ---------------------------------------------------------------------------

/// Integer attribute with optional bounds. Out-of-range or non-numeric
/// values warn and leave the attribute unchanged.
pub struct NumberAttribute {
    prop: String,
    attr: String,
    min: Option<i64>,
    max: Option<i64>,
    selector: Option<Selector>,
    default: Option<Value>,
}

impl NumberAttribute {
    pub fn new(prop: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            attr: attr.into(),
            min: None,
            max: None,
            selector: None,
            default: None,
        }
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
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

impl Worker for NumberAttribute {
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
        match ctl.data.get(&self.prop) {
            None | Some(Value::Null) => {
                if let Some(data) = dom.get_mut(element) {
                    data.apply_attr(&self.attr, None);
                }
            }
            Some(value) => match value.as_int() {
                Some(n)
                    if self.min.is_none_or(|min| n >= min)
                        && self.max.is_none_or(|max| n <= max) =>
                {
                    if let Some(data) = dom.get_mut(element) {
                        data.apply_attr(&self.attr, Some(n.to_string()));
                    }
                }
                Some(n) => {
                    warn!(prop = %self.prop, value = n, "out of range, ignored");
                }
                None => {
                    warn!(prop = %self.prop, "not a number, ignored");
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// MinMaxAttribute
// ---------------------------------------------------------------------------

/// Paired min/max attributes with combined validation: an inverted pair
/// (min greater than max) warns and applies neither side.
pub struct MinMaxAttribute {
    min_prop: String,
    max_prop: String,
    min_attr: String,
    max_attr: String,
    selector: Option<Selector>,
}

impl MinMaxAttribute {
    pub fn new(
        min_prop: impl Into<String>,
        max_prop: impl Into<String>,
        min_attr: impl Into<String>,
        max_attr: impl Into<String>,
    ) -> Self {
        Self {
            min_prop: min_prop.into(),
            max_prop: max_prop.into(),
            min_attr: min_attr.into(),
            max_attr: max_attr.into(),
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }
}

impl Worker for MinMaxAttribute {
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::Setter(self.min_prop.clone()),
            Binding::Setter(self.max_prop.clone()),
        ]
    }

    fn refresh(&self, ctl: BoundControlMut<'_>, dom: &mut Dom) {
        let Some(element) = resolve_element(dom, ctl.root, self.selector.as_ref()) else {
            warn!(prop = %self.min_prop, "target element not found");
            return;
        };
        let min = ctl.data.int(&self.min_prop);
        let max = ctl.data.int(&self.max_prop);
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                warn!(min, max, "inverted min/max pair, ignored");
                return;
            }
        }
        if let Some(data) = dom.get_mut(element) {
            data.apply_attr(&self.min_attr, min.map(|n| n.to_string()));
            data.apply_attr(&self.max_attr, max.map(|n| n.to_string()));
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyFilter
// ---------------------------------------------------------------------------

/// Claims a property key (and optionally a default) without doing anything
/// on refresh. Keeps intentionally inert keys out of the unsupported
/// warning path.
pub struct PropertyFilter {
    prop: String,
    default: Option<Value>,
}

impl PropertyFilter {
    pub fn new(prop: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Worker for PropertyFilter {
    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![Binding::Setter(self.prop.clone())];
        if let Some(default) = &self.default {
            bindings.push(Binding::Default(self.prop.clone(), default.clone()));
        }
        bindings
    }
}
