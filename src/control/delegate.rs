//! Sub-control delegation: prefix stripping, diff slicing and definition
//! slicing.

use crate::definition::ObjectDefinition;
use crate::schema::SubControlDef;
use crate::value::PropMap;

/// Strip a sub-control prefix from a key: `<prefix>:<key>` and
/// `<prefix>_<key>` both yield `<key>`. Returns `None` when the key does
/// not carry the prefix or nothing remains after it.
pub fn strip_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':').or_else(|| rest.strip_prefix('_')))
        .filter(|stripped| !stripped.is_empty())
}

/// Whether a stripped key passes the delegated-properties allow-list.
/// An empty list forwards everything.
fn delegated(def: &SubControlDef, stripped: &str) -> bool {
    def.delegated_properties.is_empty()
        || def.delegated_properties.iter().any(|p| p == stripped)
}

/// Slice one sub-control's share out of a property diff.
///
/// Keys carrying the sub-control's prefix and passing its allow-list are
/// removed from `diff` and returned with the prefix stripped. Prefixed keys
/// not on the allow-list stay in `diff`: they remain parent-only properties
/// (this is how `<id>_overflow-behavior` style keys reach the parent's
/// suffix setters).
pub fn extract_sub_data(diff: &mut PropMap, def: &SubControlDef) -> PropMap {
    let mut forwarded = PropMap::new();
    let keys: Vec<String> = diff.keys().map(str::to_owned).collect();
    for key in keys {
        let Some(stripped) = strip_prefix(&key, &def.prefix) else {
            continue;
        };
        if !delegated(def, stripped) {
            continue;
        }
        let stripped = stripped.to_owned();
        if let Some(value) = diff.remove(&key) {
            forwarded.set(stripped, value);
        }
    }
    forwarded
}

/// Build a sub-control's object definition from its parent's: prefixed
/// properties are stripped and copied over (honoring the allow-list), and
/// the control class comes from the sub-control declaration.
pub fn slice_definition(
    parent: &ObjectDefinition,
    id: &str,
    def: &SubControlDef,
) -> ObjectDefinition {
    let sub = ObjectDefinition::new(format!("{}:{}", parent.name(), id), parent.kind())
        .with_control_class(def.class.clone());
    for name in parent.property_names() {
        let Some(stripped) = strip_prefix(&name, &def.prefix) else {
            continue;
        };
        if !delegated(def, stripped) {
            continue;
        }
        if let Some(value) = parent.property(&name) {
            sub.set_property(stripped, value);
        }
    }
    sub
}

/// Resolve a trigger name against a sub-control: strip the prefix and check
/// the trigger filter (an empty filter accepts everything).
pub fn accepted_trigger<'a>(name: &'a str, def: &SubControlDef) -> Option<&'a str> {
    let stripped = strip_prefix(name, &def.prefix)?;
    if def.triggers.is_empty() || def.triggers.iter().any(|t| t == stripped) {
        Some(stripped)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn def() -> SubControlDef {
        SubControlDef::new("save", "plain-button")
    }

    #[test]
    fn strip_both_separators() {
        assert_eq!(strip_prefix("save:icon", "save"), Some("icon"));
        assert_eq!(strip_prefix("save_icon", "save"), Some("icon"));
        assert_eq!(strip_prefix("saveicon", "save"), None);
        assert_eq!(strip_prefix("other:icon", "save"), None);
        assert_eq!(strip_prefix("save:", "save"), None);
    }

    #[test]
    fn extract_moves_prefixed_keys() {
        let mut diff = PropMap::from([
            ("save:icon", Value::from("Save")),
            ("save_label-text", Value::from("Save it")),
            ("label-text", Value::from("parent")),
        ]);
        let forwarded = extract_sub_data(&mut diff, &def());
        assert_eq!(forwarded.text("icon"), "Save");
        assert_eq!(forwarded.text("label-text"), "Save it");
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.text("label-text"), "parent");
    }

    #[test]
    fn allow_list_keeps_unlisted_keys_with_parent() {
        let def = def().with_delegated_properties(["icon"]);
        let mut diff = PropMap::from([
            ("save:icon", Value::from("Save")),
            ("save_overflow-behavior", Value::from("hide")),
        ]);
        let forwarded = extract_sub_data(&mut diff, &def);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded.text("icon"), "Save");
        // The unlisted key stays with the parent.
        assert_eq!(diff.text("save_overflow-behavior"), "hide");
    }

    #[test]
    fn slice_definition_strips_and_filters() {
        let parent = ObjectDefinition::new("occ.bar", "field")
            .with_property("save:icon", "Save")
            .with_property("save_label-text", "Save it")
            .with_property("save_overflow-behavior", "hide")
            .with_property("label-text", "parent");
        let def = def().with_delegated_properties(["icon", "label-text"]);
        let sub = slice_definition(&parent, "save", &def);
        assert_eq!(sub.name(), "occ.bar:save");
        assert_eq!(&*sub.control_class(), "plain-button");
        assert_eq!(sub.property_text("icon"), "Save");
        assert_eq!(sub.property_text("label-text"), "Save it");
        assert!(sub.property("overflow-behavior").is_none());
    }

    #[test]
    fn trigger_filter() {
        let open = def();
        assert_eq!(accepted_trigger("save:detail", &open), Some("detail"));
        assert_eq!(accepted_trigger("other:detail", &open), None);

        let filtered = def().with_triggers(["detail"]);
        assert_eq!(accepted_trigger("save:detail", &filtered), Some("detail"));
        assert_eq!(accepted_trigger("save:commit", &filtered), None);
    }
}
