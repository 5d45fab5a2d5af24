//! Decoding of loosely typed snapshot records.

use serde_json::Value;
use tracing::warn;

use crate::{Diagnostic, ItemId, RawItem};

/// The records of one fetch, plus the ones that could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    /// Records that decoded as [`RawItem`]
    pub items: Vec<RawItem>,
    /// One `MalformedItem` per record that did not
    pub rejected: Vec<Diagnostic>,
}

impl RawSnapshot {
    /// Decode every value on its own, so one bad record only costs itself.
    pub fn decode(values: impl IntoIterator<Item = Value>) -> Self {
        let mut snapshot = Self::default();
        for value in values {
            let id = value.get("id").and_then(Value::as_u64).map(ItemId::new);
            match serde_json::from_value::<RawItem>(value) {
                Ok(item) => snapshot.items.push(item),
                Err(e) => {
                    let diagnostic = Diagnostic::MalformedItem {
                        id,
                        reason: e.to_string(),
                    };
                    warn!("{}", diagnostic);
                    snapshot.rejected.push(diagnostic);
                }
            }
        }
        snapshot
    }

    /// Append another snapshot's records and rejections.
    pub fn extend(&mut self, other: RawSnapshot) {
        self.items.extend(other.items);
        self.rejected.extend(other.rejected);
    }

    /// Number of decoded records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no record decoded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<RawItem>> for RawSnapshot {
    fn from(items: Vec<RawItem>) -> Self {
        Self {
            items,
            rejected: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bad_records_are_rejected_one_by_one() {
        let snapshot = RawSnapshot::decode([
            json!({ "id": 1, "object": "radical" }),
            json!({ "id": "oops", "object": "kanji" }),
            json!({ "id": 3, "object": "kanji", "assignments": { "srs_stage": -1 } }),
            json!({ "id": 4, "object": "kanji", "assignments": { "unlocked_at": "yesterday" } }),
            json!({ "id": 5, "object": "kanji" }),
        ]);

        let ids: Vec<_> = snapshot.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![Some(1), Some(5)]);

        let rejected: Vec<_> = snapshot
            .rejected
            .iter()
            .map(|d| match d {
                Diagnostic::MalformedItem { id, .. } => *id,
                other => panic!("unexpected diagnostic {other:?}"),
            })
            .collect();
        assert_eq!(rejected, vec![None, Some(ItemId::new(3)), Some(ItemId::new(4))]);
    }

    #[test]
    fn test_rejection_keeps_the_decode_error() {
        let snapshot = RawSnapshot::decode([json!({ "id": 3, "assignments": { "srs_stage": -1 } })]);
        assert!(snapshot.is_empty());
        let message = snapshot.rejected[0].to_string();
        assert!(message.starts_with("malformed item 3: "), "{message}");
        assert!(message.contains("-1"), "{message}");
    }

    #[test]
    fn test_extend_merges_both_sides() {
        let mut first = RawSnapshot::decode([json!({ "id": 1, "object": "radical" })]);
        first.extend(RawSnapshot::decode([json!({ "id": [] }), json!({ "id": 2 })]));
        assert_eq!(first.len(), 2);
        assert_eq!(first.rejected.len(), 1);
    }
}
