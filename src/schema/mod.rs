//! Control class capabilities: the immutable `ControlSchema`, its builder
//! and the class registry.

pub mod builder;
pub mod registry;

pub use builder::{SchemaBuilder, SchemaError};
pub use registry::{ControlRegistry, ControlSchema, WorkerId};

/// How a control class visualizes UI blocking on its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiBlocking {
    /// Block by disabling the root element.
    Disabled,
    /// Block by making the root element read-only.
    Readonly,
}

/// Declaration of one nested control inside a composite class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubControlDef {
    /// Control class name, resolved against the registry at connect time.
    pub class: String,
    /// Style-scope class on the sub-control's mount element.
    pub style_class: String,
    /// Property/trigger prefix: parent keys `<prefix>:<key>` and
    /// `<prefix>_<key>` route here.
    pub prefix: String,
    /// Trigger names this sub-control accepts. Empty accepts all.
    pub triggers: Vec<String>,
    /// Properties forwarded on delegation. Empty forwards all; non-empty
    /// forwards listed keys only and keeps the rest with the parent.
    pub delegated_properties: Vec<String>,
}

impl SubControlDef {
    /// Declare a sub-control with the conventional style-scope class
    /// `u-sub-<id>` and `id` as its routing prefix.
    pub fn new(id: impl AsRef<str>, class: impl Into<String>) -> Self {
        let id = id.as_ref();
        Self {
            class: class.into(),
            style_class: format!("u-sub-{id}"),
            prefix: id.to_owned(),
            triggers: Vec::new(),
            delegated_properties: Vec::new(),
        }
    }

    /// Restrict the triggers this sub-control accepts (builder).
    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the properties forwarded on delegation (builder).
    pub fn with_delegated_properties<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delegated_properties = props.into_iter().map(Into::into).collect();
        self
    }

    /// Override the style-scope class (builder).
    pub fn with_style_class(mut self, class: impl Into<String>) -> Self {
        self.style_class = class.into();
        self
    }
}
