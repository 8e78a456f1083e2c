use crate::err_parse_create;
use crate::error::HarvestError;
use crate::utils::{json_type_name, to_pascal_case, truncate_chars, value_to_text, value_to_u64};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use web3::types::Transaction;

pub const DEBUG_REPR_MAX_CHARS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    Latest,
    Number(u64),
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Latest => write!(f, "latest"),
            BlockRef::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Block as returned by the node, reduced to what the harvester reads.
#[derive(Debug, Clone)]
pub struct NodeBlock {
    pub number: Option<u64>,
    pub timestamp: Option<u64>,
    pub transactions: Value,
    pub transaction_hashes: Option<Value>,
}

impl NodeBlock {
    pub fn from_json(value: Value) -> Result<Self, HarvestError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(err_parse_create!(
                    "Block is not an object but {}",
                    json_type_name(&other)
                ))
            }
        };
        let number = ["block_number", "number"]
            .iter()
            .find_map(|name| fields.get(*name).and_then(value_to_u64));
        let timestamp = fields.get("timestamp").and_then(value_to_u64);
        Ok(NodeBlock {
            number,
            timestamp,
            transactions: fields.remove("transactions").unwrap_or(Value::Null),
            transaction_hashes: fields
                .remove("transaction_hashes")
                .filter(|v| !v.is_null()),
        })
    }

    /// Decides once per block how its transactions have to be harvested.
    pub fn payload(&self) -> TxPayload {
        if let Value::Array(items) = &self.transactions {
            if items.first().map_or(false, |first| !is_text_like(first)) {
                return TxPayload::Inline(items.iter().cloned().map(NodeTransaction::from_json).collect());
            }
        }

        let references: &[Value] = match &self.transaction_hashes {
            Some(Value::Array(hashes)) if !hashes.is_empty() => hashes.as_slice(),
            _ => match &self.transactions {
                Value::Array(items) => items.as_slice(),
                _ => &[],
            },
        };
        let hashes: Vec<String> = references.iter().map(hash_reference_to_text).collect();
        if hashes.is_empty() {
            let repr = serde_json::to_string(&self.transactions)
                .unwrap_or_else(|_| self.transactions.to_string());
            TxPayload::Unusable {
                field_type: json_type_name(&self.transactions).to_string(),
                repr: truncate_chars(&repr, DEBUG_REPR_MAX_CHARS),
            }
        } else {
            TxPayload::HashRefs(hashes)
        }
    }
}

#[derive(Debug, Clone)]
pub enum TxPayload {
    /// Full transaction objects embedded in the block.
    Inline(Vec<NodeTransaction>),
    /// Bare hashes, each needs a secondary fetch.
    HashRefs(Vec<String>),
    /// Empty or unrecognized payload.
    Unusable { field_type: String, repr: String },
}

fn is_text_like(value: &Value) -> bool {
    value.is_string() || is_byte_array(value)
}

fn is_byte_array(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_u64().map_or(false, |b| b <= u8::MAX as u64))
        }
        _ => false,
    }
}

fn hash_reference_to_text(value: &Value) -> String {
    match value {
        Value::Array(items) if is_byte_array(value) => {
            let bytes: Vec<u8> = items
                .iter()
                .filter_map(|item| item.as_u64().map(|b| b as u8))
                .collect();
            format!("0x{}", hex::encode(bytes))
        }
        other => value_to_text(other),
    }
}

/// A transaction in whatever shape the node handed it over.
#[derive(Debug, Clone)]
pub enum NodeTransaction {
    /// Decoded Ethereum transaction, fields reachable as attributes. The raw
    /// keys stay available for fields the typed model does not know.
    Typed {
        tx: Box<Transaction>,
        fields: Map<String, Value>,
    },
    /// Key-value mapping of a shape without a typed model (e.g. Starknet).
    Mapping(Map<String, Value>),
    /// Anything that is not an object at all.
    Opaque(Value),
}

impl NodeTransaction {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(fields) => {
                match serde_json::from_value::<Transaction>(Value::Object(fields.clone())) {
                    Ok(tx) => NodeTransaction::Typed {
                        tx: Box::new(tx),
                        fields,
                    },
                    Err(_) => NodeTransaction::Mapping(fields),
                }
            }
            other => NodeTransaction::Opaque(other),
        }
    }

    /// Attribute access, only meaningful for typed transactions.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let NodeTransaction::Typed { tx, .. } = self else {
            return None;
        };
        let text = match name {
            "hash" => format!("{:#x}", tx.hash),
            "from" => format!("{:#x}", tx.from?),
            "to" => format!("{:#x}", tx.to?),
            "input" => format!("0x{}", hex::encode(&tx.input.0)),
            "nonce" => format!("{:#x}", tx.nonce),
            "value" => format!("{:#x}", tx.value),
            _ => return None,
        };
        Some(Value::String(text))
    }

    /// Key access on the raw object, typed or not.
    pub fn entry(&self, name: &str) -> Option<&Value> {
        match self {
            NodeTransaction::Typed { fields, .. } | NodeTransaction::Mapping(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Name of the concrete transaction variant, used as a coarse kind.
    pub fn variant_tag(&self) -> String {
        match self {
            NodeTransaction::Typed { tx, .. } => {
                ethereum_variant_name(tx.transaction_type.map(|t| t.as_u64()).unwrap_or(0))
            }
            NodeTransaction::Mapping(fields) => mapping_variant_name(fields),
            NodeTransaction::Opaque(value) => format!("Opaque{}", to_pascal_case(json_type_name(value))),
        }
    }
}

fn ethereum_variant_name(tx_type: u64) -> String {
    match tx_type {
        0 => "LegacyTransaction".to_string(),
        1 => "AccessListTransaction".to_string(),
        2 => "DynamicFeeTransaction".to_string(),
        n => format!("Type{}Transaction", n),
    }
}

fn mapping_variant_name(fields: &Map<String, Value>) -> String {
    let Some(tx_type) = fields.get("type").filter(|v| !v.is_null()) else {
        return "RawTransaction".to_string();
    };
    let tx_type = value_to_text(tx_type);
    if tx_type.starts_with("0x") {
        if let Some(n) = crate::utils::parse_quantity(&tx_type) {
            return ethereum_variant_name(n);
        }
    }
    let version = fields.get("version").and_then(value_to_u64);
    match version {
        Some(v) => format!("{}TransactionV{}", to_pascal_case(&tx_type), v),
        None => format!("{}Transaction", to_pascal_case(&tx_type)),
    }
}

/// One row of the harvested table. Column order is part of the output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub block_number: u64,
    pub block_timestamp: Option<u64>,
    pub tx_hash: Option<String>,
    pub tx_type: Option<String>,
    pub sender: Option<String>,
    pub calldata_len: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSample {
    pub block_number: u64,
    pub transactions_field_type: String,
    pub transactions_repr: String,
}
