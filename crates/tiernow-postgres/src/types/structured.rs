//! Reconciliation of heterogeneously-encoded structured columns.

use serde_json::Value;

/// A structured column as returned by the store, before normalization.
///
/// Aggregated JSON columns can arrive in one of two representations
/// depending on how the underlying store and driver negotiate column
/// types: already-structured JSON, or an opaque text blob containing
/// encoded JSON (a `::text` cast, or a driver that refuses to decode the
/// aggregate). The variant is resolved here, once, at the store-adapter
/// boundary; callers only ever see the normalized structured form.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredColumn {
    /// Text blob containing encoded JSON.
    Text(String),
    /// Already-structured JSON data.
    Structured(Value),
}

impl StructuredColumn {
    /// Classifies a raw column value by its representation.
    ///
    /// A JSON string at the top level is treated as the text-encoded
    /// representation; anything else is already structured. Aggregated
    /// columns are always arrays of objects, so a legitimate top-level
    /// string can only mean the encoded form.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            structured => Self::Structured(structured),
        }
    }

    /// Normalizes the column into structured JSON.
    ///
    /// Decodes the text representation, passes the structured one through
    /// unchanged. Equivalent underlying data produces identical output
    /// regardless of which representation was stored.
    pub fn normalize(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Text(text) => serde_json::from_str(&text),
            Self::Structured(value) => Ok(value),
        }
    }
}

impl From<Value> for StructuredColumn {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn structured_input_passes_through() {
        let value = json!([{"id": 1, "name": "S", "position": 0, "entries": []}]);
        let normalized = StructuredColumn::from_value(value.clone())
            .normalize()
            .unwrap();
        assert_eq!(normalized, value);
    }

    #[test]
    fn text_input_is_decoded() {
        let value = json!([{"id": 7, "tierId": null, "fileKey": "a1.png"}]);
        let encoded = Value::String(serde_json::to_string(&value).unwrap());

        let normalized = StructuredColumn::from_value(encoded).normalize().unwrap();
        assert_eq!(normalized, value);
    }

    #[test]
    fn both_representations_serialize_identically() {
        let value = json!([
            {"id": 1, "name": "S", "position": 0, "entries": [{"id": 3, "fileKey": "x.png"}]},
            {"id": 2, "name": "A", "position": 1, "entries": []}
        ]);
        let encoded = Value::String(serde_json::to_string(&value).unwrap());

        let from_structured = StructuredColumn::from_value(value).normalize().unwrap();
        let from_text = StructuredColumn::from_value(encoded).normalize().unwrap();

        assert_eq!(
            serde_json::to_vec(&from_structured).unwrap(),
            serde_json::to_vec(&from_text).unwrap()
        );
    }

    #[test]
    fn malformed_text_is_an_error() {
        let column = StructuredColumn::from_value(Value::String("not json".into()));
        assert!(column.normalize().is_err());
    }

    #[test]
    fn classification() {
        assert!(matches!(
            StructuredColumn::from_value(json!("[]")),
            StructuredColumn::Text(_)
        ));
        assert!(matches!(
            StructuredColumn::from_value(json!([])),
            StructuredColumn::Structured(_)
        ));
    }
}
