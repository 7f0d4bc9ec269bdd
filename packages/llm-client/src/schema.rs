//! Strict JSON schema generation for structured outputs.
//!
//! Uses `schemars` to derive a schema from a Rust type, then rewrites it into
//! the subset accepted by strict structured-output endpoints:
//!
//! 1. `additionalProperties: false` on every object schema
//! 2. every property listed in `required`
//! 3. no `$ref` (definitions are inlined)
//! 4. no numeric `format` annotations such as `uint32`

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types that can be requested as structured output.
///
/// Implemented for every `JsonSchema + DeserializeOwned` type.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Strict-mode JSON schema for this type.
    fn strict_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = match &mut value {
            Value::Object(map) => {
                map.remove("$schema");
                map.remove("definitions")
            }
            _ => None,
        };

        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }
        make_strict(&mut value);

        value
    }

    /// Schema name used in the `response_format` envelope.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn make_strict(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(props)) = map.get("properties") {
                    let all_keys = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(all_keys));
                }
            }

            if is_numeric_schema(map) {
                map.remove("format");
            }

            for (_, v) in map.iter_mut() {
                make_strict(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                make_strict(item);
            }
        }
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    map.get("type") == Some(&Value::String("object".to_string()))
}

fn is_numeric_schema(map: &Map<String, Value>) -> bool {
    matches!(
        map.get("type").and_then(Value::as_str),
        Some("integer") | Some("number")
    )
}

/// Replace `{"$ref": "#/definitions/X"}` with the definition of `X`.
fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut def) = target {
                inline_refs(&mut def, definitions);
                *value = def;
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Mention {
        name: String,
        count: u32,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Page {
        title: String,
        summary: Option<String>,
        mentions: Vec<Mention>,
    }

    #[test]
    fn test_root_is_strict_object() {
        let schema = Page::strict_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("$schema"));
        assert!(!obj.contains_key("definitions"));
        assert_eq!(obj.get("additionalProperties"), Some(&Value::Bool(false)));

        let required: Vec<&str> = obj["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"title"));
        assert!(required.contains(&"summary"), "optional fields must be required in strict mode");
        assert!(required.contains(&"mentions"));
    }

    #[test]
    fn test_nested_struct_inlined() {
        let schema = Page::strict_schema();
        let text = serde_json::to_string(&schema).unwrap();
        assert!(!text.contains("$ref"), "refs should be inlined: {text}");

        let items = &schema["properties"]["mentions"]["items"];
        assert_eq!(items["type"], "object");
        assert_eq!(items["additionalProperties"], false);
        assert!(items["properties"]["count"].get("format").is_none());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Page::type_name(), "Page");
    }
}
