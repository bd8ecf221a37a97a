use serde_json::{Map, Value};

/// Deep-merges `fragment` into `target`.
///
/// Objects merge key by key: a key present on both sides as an object is
/// merged recursively, anything else is assigned from the fragment. Every
/// non-object fragment (arrays and scalars included) overwrites the target.
pub fn merge(target: &mut Value, fragment: &Value) {
    let Value::Object(src) = fragment else {
        *target = fragment.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(dst) = target {
        for (key, value) in src {
            let nested = value.is_object() && dst.get(key).is_some_and(Value::is_object);
            if !nested {
                dst.insert(key.clone(), value.clone());
            } else if let Some(existing) = dst.get_mut(key) {
                merge(existing, value);
            }
        }
    }
}

/// Firmware-supplied configuration and command schema fragments
#[derive(Debug, Default, Clone)]
pub struct SchemaStore {
    config: Value,
    command: Value,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the accumulated configuration schema
    pub fn set_config_schema(&mut self, fragment: &Value) {
        self.config = Value::Null;
        merge(&mut self.config, fragment);
    }

    /// Replaces the accumulated command schema
    pub fn set_command_schema(&mut self, fragment: &Value) {
        self.command = Value::Null;
        merge(&mut self.command, fragment);
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn command(&self) -> &Value {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn merged(fragments: &[Value]) -> Value {
        let mut doc = Value::Null;
        for f in fragments {
            merge(&mut doc, f);
        }
        doc
    }

    #[test]
    fn merge_is_idempotent() {
        let fragment = json!({
            "dim": {"type": "integer", "minimum": 0, "maximum": 100},
            "channels": {"type": "array", "items": {"type": "object", "properties": {"id": {"type": "integer"}}}},
            "enabled": {"type": "boolean"}
        });
        assert_eq!(merged(&[fragment.clone(), fragment.clone()]), merged(&[fragment]));
    }

    #[test]
    fn scalars_overwrite() {
        assert_eq!(merged(&[json!({"a": 1}), json!({"a": 2})]), json!({"a": 2}));
    }

    #[test]
    fn objects_union() {
        assert_eq!(
            merged(&[json!({"a": {"x": 1}}), json!({"a": {"y": 2}})]),
            json!({"a": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn nested_collision_prefers_newest() {
        assert_eq!(
            merged(&[
                json!({"a": {"x": {"type": "string"}, "keep": true}}),
                json!({"a": {"x": {"type": "integer"}}})
            ]),
            json!({"a": {"x": {"type": "integer"}, "keep": true}})
        );
    }

    #[test]
    fn arrays_are_replaced_not_joined() {
        assert_eq!(
            merged(&[json!({"enum": [1, 2]}), json!({"enum": [3]})]),
            json!({"enum": [3]})
        );
    }

    #[test]
    fn non_object_fragment_replaces_document() {
        assert_eq!(merged(&[json!({"a": 1}), json!(7)]), json!(7));
        assert_eq!(merged(&[json!(7), json!({"a": 1})]), json!({"a": 1}));
    }

    #[test]
    fn falsy_existing_value_is_replaced_by_object() {
        assert_eq!(
            merged(&[json!({"a": false}), json!({"a": {"x": 1}})]),
            json!({"a": {"x": 1}})
        );
    }

    #[test]
    fn set_schema_replaces() {
        let mut store = SchemaStore::new();
        store.set_config_schema(&json!({"a": {"x": 1}}));
        store.set_config_schema(&json!({"a": {"y": 2}, "b": true}));
        assert_eq!(store.config(), &merged(&[json!({"a": {"y": 2}, "b": true})]));

        store.set_command_schema(&json!({"reboot": {"type": "boolean"}}));
        store.set_command_schema(&json!({}));
        assert_eq!(store.command(), &json!({}));
    }

    #[test]
    fn unset_schemas_are_null() {
        let store = SchemaStore::new();
        assert!(store.config().is_null());
        assert!(store.command().is_null());
    }
}
