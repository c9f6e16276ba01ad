//! JSON Schema generation for the Veil configuration file.

use crate::config::VeilConfig;

/// Generates a JSON Schema for the Veil configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(VeilConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!("https://raw.githubusercontent.com/veil-app/veil/main/veil.schema.json"),
        );
    }

    schema
}

/// Returns the schema as a pretty-printed JSON string.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_schema_produces_valid_json() {
        let schema_json = print_schema();
        let parsed: serde_json::Value = serde_json::from_str(&schema_json).unwrap();

        assert!(parsed["$id"].as_str().unwrap().contains("veil.schema.json"));
        assert_eq!(parsed["title"], "VeilConfig");
        assert!(parsed["properties"]["hiding"].is_object());
        assert!(parsed["properties"]["privacy"].is_object());
        assert!(parsed["properties"]["alwaysHidden"].is_object());
    }
}
