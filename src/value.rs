//! Property value model: `Value`, `PropMap`, coercions and valrep parsing.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Message stored alongside `format-error` when a strict coercion fails.
pub const FORMAT_ERROR_MESSAGE: &str = "Value cannot be converted";

/// A strict value conversion failed. Carries the offending text.
///
/// This is the only error a coercion can raise; call sites turn it into a
/// `format-error` / `format-error-message` property update rather than
/// letting it escape a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {0:?} to a field value")]
pub struct ConvertError(pub String);

impl ConvertError {
    /// The property pair to merge into a control's data when the conversion
    /// failure must be surfaced to the user.
    pub fn format_error() -> [(String, Value); 2] {
        [
            ("format-error".into(), Value::Bool(true)),
            (
                "format-error-message".into(),
                Value::Text(FORMAT_ERROR_MESSAGE.into()),
            ),
        ]
    }
}

/// One entry of a value/representation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValrepItem {
    pub value: String,
    pub representation: String,
}

/// Parse a `"v1=r1;v2=r2"` list into ordered valrep items.
///
/// Entries without `=` use the value as its own representation. Empty
/// segments are skipped.
pub fn parse_valrep(text: &str) -> Vec<ValrepItem> {
    text.split(';')
        .filter(|seg| !seg.is_empty())
        .map(|seg| match seg.split_once('=') {
            Some((v, r)) => ValrepItem {
                value: v.to_owned(),
                representation: r.to_owned(),
            },
            None => ValrepItem {
                value: seg.to_owned(),
                representation: seg.to_owned(),
            },
        })
        .collect()
}

/// A property value as exchanged with the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absent / unset.
    #[default]
    Null,
    /// The reset sentinel: "restore the class default for this property".
    Reset,
    Bool(bool),
    Int(i64),
    Text(String),
    Valrep(Vec<ValrepItem>),
}

impl Value {
    /// Lenient boolean coercion. Never fails.
    ///
    /// Text is true when its first character is `1`, `T`, `Y` or `J`
    /// (case-insensitive); integers are true when non-zero; `Null` and
    /// `Reset` are false; a valrep list is true when non-empty.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null | Value::Reset => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Text(s) => s
                .chars()
                .next()
                .is_some_and(|c| matches!(c.to_ascii_uppercase(), '1' | 'T' | 'Y' | 'J')),
            Value::Valrep(items) => !items.is_empty(),
        }
    }

    /// Borrow the text content, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view: `Int` directly, `Text` parsed.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the valrep items, if this is a `Valrep` value.
    pub fn as_valrep(&self) -> Option<&[ValrepItem]> {
        match self {
            Value::Valrep(items) => Some(items),
            _ => None,
        }
    }

    /// Render as an attribute string. `None` means "remove the attribute".
    pub fn to_attr_string(&self) -> Option<String> {
        match self {
            Value::Null | Value::Reset => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Valrep(items) => Some(
                items
                    .iter()
                    .map(|i| format!("{}={}", i.value, i.representation))
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
        }
    }

    /// Whether this is the reset sentinel.
    pub fn is_reset(&self) -> bool {
        matches!(self, Value::Reset)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_attr_string() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// Strict field-value boolean coercion.
///
/// Accepts `1`, `t`, `true`, `on`, `yes` / `0`, `f`, `false`, `off`, `no`
/// (case-insensitive), `Bool` directly and `Int` 0/1. Anything else is a
/// `ConvertError`.
pub fn field_bool(value: &Value) -> Result<bool, ConvertError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "on" | "yes" => Ok(true),
            "0" | "f" | "false" | "off" | "no" => Ok(false),
            _ => Err(ConvertError(s.clone())),
        },
        other => Err(ConvertError(other.to_string())),
    }
}

/// Compact rendition of a control's value for menu-style display.
///
/// Produced by a class's menu-item formatter when an overflow-evicted
/// control is materialized as a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueFormatting {
    pub primary_text: String,
    pub secondary_text: String,
    pub prefix_icon: Option<String>,
    pub suffix_icon: Option<String>,
    pub error_message: Option<String>,
    /// Set on the fallback rendition of a class without a formatter.
    pub not_supported: bool,
}

// ---------------------------------------------------------------------------
// PropMap
// ---------------------------------------------------------------------------

/// Ordered property bag keyed by property name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropMap {
    entries: BTreeMap<String, Value>,
}

impl PropMap {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Set a property, returning the previous value if any.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(name.into(), value)
    }

    /// Remove a property.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Lenient boolean view of a property. Absent is false.
    pub fn truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::truthy)
    }

    /// Text view of a property. Absent or non-text yields the empty string
    /// rendition via `to_attr_string`.
    pub fn text(&self, name: &str) -> String {
        self.get(name)
            .and_then(Value::to_attr_string)
            .unwrap_or_default()
    }

    /// Integer view of a property.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate property names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: &PropMap) {
        for (k, v) in other.iter() {
            self.entries.insert(k.to_owned(), v.clone());
        }
    }
}

impl FromIterator<(String, Value)> for PropMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, Value); N]> for PropMap {
    fn from(pairs: [(&str, Value); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_text_prefixes() {
        for s in ["1", "true", "T", "yes", "Ja", "Y"] {
            assert!(Value::Text(s.into()).truthy(), "{s} should be truthy");
        }
        for s in ["0", "false", "no", "", "nein", "off"] {
            assert!(!Value::Text(s.into()).truthy(), "{s} should be falsy");
        }
    }

    #[test]
    fn truthy_non_text() {
        assert!(Value::Bool(true).truthy());
        assert!(Value::Int(-3).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Null.truthy());
        assert!(!Value::Reset.truthy());
    }

    #[test]
    fn field_bool_accepts_canonical_forms() {
        for s in ["1", "t", "TRUE", "On", "yes"] {
            assert_eq!(field_bool(&Value::Text(s.into())), Ok(true));
        }
        for s in ["0", "F", "false", "off", "NO"] {
            assert_eq!(field_bool(&Value::Text(s.into())), Ok(false));
        }
        assert_eq!(field_bool(&Value::Bool(true)), Ok(true));
        assert_eq!(field_bool(&Value::Int(0)), Ok(false));
        assert_eq!(field_bool(&Value::Int(1)), Ok(true));
    }

    #[test]
    fn field_bool_rejects_everything_else() {
        assert!(field_bool(&Value::Text("maybe".into())).is_err());
        assert!(field_bool(&Value::Int(2)).is_err());
        assert!(field_bool(&Value::Null).is_err());
    }

    #[test]
    fn field_bool_trims_whitespace() {
        assert_eq!(field_bool(&Value::Text("  true ".into())), Ok(true));
    }

    #[test]
    fn parse_valrep_pairs() {
        let items = parse_valrep("a=Alpha;b=Beta");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].value, "a");
        assert_eq!(items[0].representation, "Alpha");
        assert_eq!(items[1].representation, "Beta");
    }

    #[test]
    fn parse_valrep_bare_and_empty() {
        let items = parse_valrep("x;;y=Y");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].value, "x");
        assert_eq!(items[0].representation, "x");
        assert!(parse_valrep("").is_empty());
    }

    #[test]
    fn as_int_parses_text() {
        assert_eq!(Value::Text(" 42 ".into()).as_int(), Some(42));
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Text("x".into()).as_int(), None);
    }

    #[test]
    fn to_attr_string() {
        assert_eq!(Value::Null.to_attr_string(), None);
        assert_eq!(Value::Reset.to_attr_string(), None);
        assert_eq!(Value::Bool(false).to_attr_string().as_deref(), Some("false"));
        assert_eq!(Value::Int(5).to_attr_string().as_deref(), Some("5"));
        assert_eq!(
            Value::Valrep(parse_valrep("a=A;b=B")).to_attr_string().as_deref(),
            Some("a=A;b=B")
        );
    }

    #[test]
    fn propmap_basic_ops() {
        let mut props = PropMap::new();
        assert!(props.is_empty());
        props.set("label", Value::from("Save"));
        props.set("count", Value::Int(3));
        assert_eq!(props.len(), 2);
        assert_eq!(props.text("label"), "Save");
        assert_eq!(props.int("count"), Some(3));
        assert_eq!(props.remove("count"), Some(Value::Int(3)));
        assert!(props.get("count").is_none());
    }

    #[test]
    fn propmap_truthy_absent_is_false() {
        let props = PropMap::from([("on", Value::from("true"))]);
        assert!(props.truthy("on"));
        assert!(!props.truthy("missing"));
    }

    #[test]
    fn propmap_merge_overwrites() {
        let mut a = PropMap::from([("x", Value::Int(1)), ("y", Value::Int(2))]);
        let b = PropMap::from([("y", Value::Int(9)), ("z", Value::Int(3))]);
        a.merge(&b);
        assert_eq!(a.int("x"), Some(1));
        assert_eq!(a.int("y"), Some(9));
        assert_eq!(a.int("z"), Some(3));
    }

    #[test]
    fn propmap_iter_is_key_ordered() {
        let props = PropMap::from([("b", Value::Int(2)), ("a", Value::Int(1))]);
        let keys: Vec<_> = props.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn convert_error_format_props() {
        let [(k1, v1), (k2, v2)] = ConvertError::format_error();
        assert_eq!(k1, "format-error");
        assert_eq!(v1, Value::Bool(true));
        assert_eq!(k2, "format-error-message");
        assert_eq!(v2, Value::Text(FORMAT_ERROR_MESSAGE.into()));
    }
}
