//! JSON Schema export for contract documents.

use schemars::schema_for;
use serde_json::Value;

use crate::document::ContractDocument;

/// The document schema as a JSON value.
pub fn schema_value() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schema_for!(ContractDocument))
}

/// The document schema rendered as pretty-printed JSON.
pub fn schema_json_pretty() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(ContractDocument))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_the_wire_fields() {
        let schema = schema_value().unwrap();
        let text = schema.to_string();
        for needle in [
            "spec_version",
            "dataSources",
            "bindings",
            "fieldMappings",
            "cellCoordinate",
            "displayLabel",
        ] {
            assert!(text.contains(needle), "schema missing `{needle}`");
        }
    }
}
