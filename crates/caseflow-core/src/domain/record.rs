//! Raw case records as delivered by the ingestion layer.

use std::collections::BTreeMap;

use crate::domain::error::{CaseflowError, Result};

/// One case: field name to raw string value. Read-only input to the engine.
pub type RawRecord = BTreeMap<String, String>;

/// Look up a non-empty text field.
pub fn text_field<'a>(record: &'a RawRecord, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parse a numeric field, substituting `fallback` when it is absent,
/// unparsable, non-finite or zero.
///
/// Zero counts as missing: upstream exports write `0` for "not recorded",
/// so a literal zero case-mix index or severity takes the fallback. The
/// whole trimmed value must parse: `"1,200"` or `"12abc"` take the fallback
/// rather than their leading digits.
pub fn numeric_field(record: &RawRecord, field: &str, fallback: f64) -> f64 {
    record
        .get(field)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value != 0.0)
        .unwrap_or(fallback)
}

/// Convert a JSON document into records.
///
/// The document must be an array of objects. String values are kept
/// verbatim, numbers and booleans are stringified, `null` is dropped.
pub fn records_from_json(value: &serde_json::Value) -> Result<Vec<RawRecord>> {
    let rows = value.as_array().ok_or_else(|| {
        CaseflowError::MalformedInput("expected an array of records".to_string())
    })?;

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let object = row.as_object().ok_or_else(|| {
                CaseflowError::MalformedInput(format!("record {idx} is not an object"))
            })?;
            let mut record = RawRecord::new();
            for (key, field) in object {
                let text = match field {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(CaseflowError::MalformedInput(format!(
                            "record {idx} field '{key}' is not a scalar: {other}"
                        )))
                    }
                };
                record.insert(key.clone(), text);
            }
            Ok(record)
        })
        .collect()
}
