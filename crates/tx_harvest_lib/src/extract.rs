use crate::model::NodeTransaction;
use crate::utils::value_to_text;
use serde_json::Value;

pub const HASH_FIELDS: &[&str] = &["hash", "tx_hash", "transaction_hash"];
pub const SENDER_FIELDS: &[&str] = &["sender_address", "from_address", "caller_address", "from"];
pub const CALLDATA_FIELDS: &[&str] = &["calldata", "call_data", "data", "input"];

/// First non-null value among `names`, trying attributes before mapping keys.
fn first_present(tx: &NodeTransaction, names: &[&str]) -> Option<Value> {
    if let Some(value) = names.iter().find_map(|name| tx.attribute(name)) {
        return Some(value);
    }
    names
        .iter()
        .find_map(|name| tx.entry(name).filter(|value| !value.is_null()).cloned())
}

pub fn extract_hash(tx: &NodeTransaction, fallback: Option<&str>) -> Option<String> {
    first_present(tx, HASH_FIELDS)
        .map(|value| value_to_text(&value))
        .or_else(|| fallback.map(|hash| hash.to_string()))
}

pub fn extract_sender(tx: &NodeTransaction) -> Option<String> {
    first_present(tx, SENDER_FIELDS).map(|value| value_to_text(&value))
}

/// Element count for list calldata, estimated byte count for hex text.
pub fn extract_calldata_len(tx: &NodeTransaction) -> u64 {
    match first_present(tx, CALLDATA_FIELDS) {
        Some(Value::Array(items)) => items.len() as u64,
        Some(Value::String(text)) => estimate_hex_bytes(&text),
        _ => 0,
    }
}

/// Half the hex digit count; the character set is not validated.
pub fn estimate_hex_bytes(text: &str) -> u64 {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    (digits.chars().count() / 2) as u64
}

pub fn extract_tx_type(tx: &NodeTransaction) -> String {
    tx.variant_tag()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> NodeTransaction {
        NodeTransaction::from_json(value)
    }

    #[test]
    fn test_hash_fallback_when_no_candidate_present() {
        let tx = mapping(json!({"type": "INVOKE"}));
        assert_eq!(extract_hash(&tx, Some("0xfeed")), Some("0xfeed".to_string()));
        assert_eq!(extract_hash(&tx, None), None);
    }

    #[test]
    fn test_hash_candidates_in_order() {
        let tx = mapping(json!({"transaction_hash": "0x3", "tx_hash": "0x2"}));
        assert_eq!(extract_hash(&tx, Some("0xfeed")), Some("0x2".to_string()));

        let tx = mapping(json!({"hash": null, "transaction_hash": "0x3"}));
        assert_eq!(extract_hash(&tx, None), Some("0x3".to_string()));
    }

    #[test]
    fn test_hash_is_stringified() {
        let tx = mapping(json!({"transaction_hash": 255}));
        assert_eq!(extract_hash(&tx, None), Some("255".to_string()));
    }

    #[test]
    fn test_sender_candidates() {
        let tx = mapping(json!({"from_address": "0xabc", "caller_address": "0xdef"}));
        assert_eq!(extract_sender(&tx), Some("0xabc".to_string()));

        let tx = mapping(json!({"type": "L1_HANDLER"}));
        assert_eq!(extract_sender(&tx), None);
    }

    #[test]
    fn test_calldata_len_sequence() {
        let tx = mapping(json!({"calldata": ["0x1", "0x2", "0x3", "0x4"]}));
        assert_eq!(extract_calldata_len(&tx), 4);

        let tx = mapping(json!({"call_data": []}));
        assert_eq!(extract_calldata_len(&tx), 0);
    }

    #[test]
    fn test_calldata_len_text() {
        assert_eq!(extract_calldata_len(&mapping(json!({"data": "0xabcdef"}))), 3);
        assert_eq!(extract_calldata_len(&mapping(json!({"data": "abcdef"}))), 3);
        assert_eq!(extract_calldata_len(&mapping(json!({"data": "0xabc"}))), 1);
        assert_eq!(extract_calldata_len(&mapping(json!({"data": ""}))), 0);
    }

    #[test]
    fn test_calldata_len_other_shapes() {
        assert_eq!(extract_calldata_len(&mapping(json!({}))), 0);
        assert_eq!(extract_calldata_len(&mapping(json!({"calldata": 12}))), 0);
        assert_eq!(extract_calldata_len(&mapping(json!({"calldata": {"a": 1}}))), 0);
        assert_eq!(extract_calldata_len(&NodeTransaction::Opaque(json!("0xabcdef"))), 0);
    }

    #[test]
    fn test_typed_transaction_fields() {
        let tx = NodeTransaction::from_json(json!({
            "hash": "0x13d8a54dec1c0a30f1cd5129f690c3e27b9aadd59504957bad4d247966dadae7",
            "nonce": "0x0",
            "from": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
            "value": "0x0",
            "gas": "0x5208",
            "input": "0xa9059cbb0000",
        }));
        assert!(matches!(tx, NodeTransaction::Typed { .. }));
        assert_eq!(
            extract_hash(&tx, Some("0xfeed")),
            Some("0x13d8a54dec1c0a30f1cd5129f690c3e27b9aadd59504957bad4d247966dadae7".to_string())
        );
        assert_eq!(
            extract_sender(&tx),
            Some("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".to_string())
        );
        assert_eq!(extract_calldata_len(&tx), 6);
        assert_eq!(extract_tx_type(&tx), "LegacyTransaction");
    }

    #[test]
    fn test_typed_transaction_falls_back_to_raw_keys() {
        let tx = NodeTransaction::from_json(json!({
            "hash": "0x13d8a54dec1c0a30f1cd5129f690c3e27b9aadd59504957bad4d247966dadae7",
            "nonce": "0x0",
            "value": "0x0",
            "gas": "0x5208",
            "input": "0x",
            "sender_address": "0xabc",
            "calldata": ["0x1", "0x2", "0x3"],
        }));
        assert!(matches!(tx, NodeTransaction::Typed { .. }));
        assert_eq!(extract_sender(&tx), Some("0xabc".to_string()));
        assert_eq!(extract_calldata_len(&tx), 3);
    }

    #[test]
    fn test_missing_attribute_does_not_hide_other_fields() {
        // no `from`: the sender lookup comes up empty, the rest still resolves
        let tx = NodeTransaction::from_json(json!({
            "hash": "0x13d8a54dec1c0a30f1cd5129f690c3e27b9aadd59504957bad4d247966dadae7",
            "nonce": "0x0",
            "value": "0x0",
            "gas": "0x5208",
            "input": "0xabcd",
        }));
        assert_eq!(extract_sender(&tx), None);
        assert_eq!(extract_calldata_len(&tx), 2);
        assert!(extract_hash(&tx, None).is_some());
    }
}
