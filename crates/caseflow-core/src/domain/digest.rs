//! Content digest of an input snapshot.
//!
//! Records are rendered as canonical JSON (object keys in UTF-16 code unit
//! order, compact separators) and hashed with SHA256, so two runs over the
//! same snapshot report the same digest regardless of field order.

use sha2::{Digest, Sha256};

use crate::domain::error::Result;
use crate::domain::record::RawRecord;

fn utf16_key_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn canonical_record(record: &RawRecord) -> Result<String> {
    let mut keys: Vec<&String> = record.keys().collect();
    keys.sort_by(|a, b| utf16_key_order(a, b));

    let mut fields = Vec::with_capacity(keys.len());
    for key in keys {
        fields.push(format!(
            "{}:{}",
            serde_json::to_string(key)?,
            serde_json::to_string(&record[key])?
        ));
    }
    Ok(format!("{{{}}}", fields.join(",")))
}

/// Canonical JSON text of a record sequence. Record order is significant.
pub fn canonical_json(records: &[RawRecord]) -> Result<String> {
    let rows = records
        .iter()
        .map(canonical_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[{}]", rows.join(",")))
}

/// SHA256 hex digest of the canonical JSON of `records`.
pub fn snapshot_digest(records: &[RawRecord]) -> Result<String> {
    let canonical = canonical_json(records)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_json_compact_sorted() {
        let records = vec![record(&[("b", "2"), ("a", "1")])];
        let canonical = canonical_json(&records).expect("canonical_json");
        assert_eq!(canonical, r#"[{"a":"1","b":"2"}]"#);
    }

    #[test]
    fn test_canonical_json_utf16_ordering() {
        // U+10000 is the surrogate pair D800 DC00 in UTF-16, so it sorts
        // before U+FF21 even though its UTF-8 bytes sort after.
        let records = vec![record(&[("\u{FF21}", "y"), ("\u{10000}", "x")])];
        let canonical = canonical_json(&records).expect("canonical_json");
        let fullwidth = canonical.find('\u{FF21}').expect("fullwidth key");
        let supplementary = canonical.find('\u{10000}').expect("supplementary key");
        assert!(supplementary < fullwidth);
        assert!("\u{FF21}" < "\u{10000}");
    }

    #[test]
    fn test_snapshot_digest_is_hex_sha256() {
        let digest = snapshot_digest(&[record(&[("Month", "2025-01")])]).expect("digest");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_snapshot_digest_depends_on_record_order() {
        let a = record(&[("Month", "2025-01")]);
        let b = record(&[("Month", "2025-02")]);
        let d1 = snapshot_digest(&[a.clone(), b.clone()]).expect("digest");
        let d2 = snapshot_digest(&[b, a]).expect("digest");
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_snapshot_digest_empty_input() {
        let digest = snapshot_digest(&[]).expect("digest");
        let again = snapshot_digest(&[]).expect("digest");
        assert_eq!(digest, again);
    }
}
