//! Feature table derived from the raw harvested rows: numeric coercion, hour
//! of day and a categorical code for the transaction kind.

use crate::err_from;
use crate::error::HarvestError;
use chrono::{TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const UNKNOWN_TX_TYPE: &str = "unknown";

#[derive(Debug, Deserialize)]
struct RawRow {
    block_number: Option<String>,
    block_timestamp: Option<String>,
    tx_hash: Option<String>,
    tx_type: Option<String>,
    sender: Option<String>,
    calldata_len: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRecord {
    pub block_number: Option<i64>,
    pub block_timestamp: Option<f64>,
    pub block_datetime: Option<String>,
    pub hour: i32,
    pub tx_hash: String,
    pub tx_type: String,
    pub tx_type_code: i64,
    pub sender: Option<String>,
    pub calldata_len: i64,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.parse::<f64>().ok()).filter(|v| v.is_finite())
}

/// Integer columns: exact integer parse first, whole in-range floats
/// (e.g. `12.0`) as a fallback.
fn parse_integer(field: Option<&str>) -> Option<i64> {
    let field = field?;
    if let Ok(v) = field.parse::<i64>() {
        return Some(v);
    }
    parse_number(Some(field))
        .filter(|v| v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v as i64)
}

pub fn ensure_hex(sender: Option<String>) -> Option<String> {
    sender.map(|s| if s.starts_with("0x") { s } else { format!("0x{}", s) })
}

/// Normalizes all rows at once; the categorical code depends on the full set
/// of transaction types.
pub fn preprocess_rows<R: std::io::Read>(reader: R) -> Result<Vec<ProcessedRecord>, HarvestError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<RawRow>() {
        let row = row.map_err(err_from!())?;
        let block_number = parse_integer(non_empty(row.block_number).as_deref());
        let block_timestamp = parse_number(non_empty(row.block_timestamp).as_deref());
        let datetime = block_timestamp.and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single());
        records.push(ProcessedRecord {
            block_number,
            block_timestamp,
            block_datetime: datetime.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            hour: datetime.map(|dt| dt.hour() as i32).unwrap_or(-1),
            tx_hash: non_empty(row.tx_hash).unwrap_or_default(),
            tx_type: non_empty(row.tx_type).unwrap_or_else(|| UNKNOWN_TX_TYPE.to_string()),
            tx_type_code: 0,
            sender: ensure_hex(non_empty(row.sender)),
            calldata_len: parse_integer(non_empty(row.calldata_len).as_deref()).unwrap_or(0),
        });
    }

    let categories: Vec<String> = records
        .iter()
        .map(|r| r.tx_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    for record in &mut records {
        record.tx_type_code = categories
            .binary_search(&record.tx_type)
            .map(|idx| idx as i64)
            .unwrap_or(-1);
    }
    Ok(records)
}

pub fn write_processed<W: std::io::Write>(records: &[ProcessedRecord], writer: W) -> Result<(), HarvestError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record).map_err(err_from!())?;
    }
    wtr.flush().map_err(err_from!())?;
    Ok(())
}

pub fn preprocess(raw_csv: &Path, processed_csv: &Path) -> Result<Vec<ProcessedRecord>, HarvestError> {
    let input = fs::File::open(raw_csv).map_err(err_from!())?;
    let records = preprocess_rows(input)?;
    if let Some(parent) = processed_csv.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(err_from!())?;
    }
    let output = fs::File::create(processed_csv).map_err(err_from!())?;
    write_processed(&records, output)?;
    log::info!("Wrote {} rows to {}", records.len(), processed_csv.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "block_number,block_timestamp,tx_hash,tx_type,sender,calldata_len\n\
                       10,1700000000,0xaa,InvokeTransactionV1,5e,3\n\
                       10,1700000000,0xbb,,0x01,\n\
                       9,,0xcc,DeclareTransactionV2,,x\n";

    #[test]
    fn test_preprocess_rows() {
        let records = preprocess_rows(RAW.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].block_number, Some(10));
        assert_eq!(records[0].block_datetime.as_deref(), Some("2023-11-14 22:13:20"));
        assert_eq!(records[0].hour, 22);
        assert_eq!(records[0].sender.as_deref(), Some("0x5e"));
        assert_eq!(records[0].calldata_len, 3);

        assert_eq!(records[1].tx_type, UNKNOWN_TX_TYPE);
        assert_eq!(records[1].sender.as_deref(), Some("0x01"));
        assert_eq!(records[1].calldata_len, 0);

        assert_eq!(records[2].block_timestamp, None);
        assert_eq!(records[2].block_datetime, None);
        assert_eq!(records[2].hour, -1);
        assert_eq!(records[2].sender, None);
        assert_eq!(records[2].calldata_len, 0);
    }

    #[test]
    fn test_integer_columns_keep_precision() {
        let raw = "block_number,block_timestamp,tx_hash,tx_type,sender,calldata_len\n\
                   9007199254740993,,0xaa,,,12.0\n\
                   99999999999999999999,,0xbb,,,1.5\n";
        let records = preprocess_rows(raw.as_bytes()).unwrap();
        assert_eq!(records[0].block_number, Some(9007199254740993));
        assert_eq!(records[0].calldata_len, 12);
        assert_eq!(records[1].block_number, None);
        assert_eq!(records[1].calldata_len, 0);
    }

    #[test]
    fn test_tx_type_codes_follow_sorted_categories() {
        let records = preprocess_rows(RAW.as_bytes()).unwrap();
        let codes: Vec<(&str, i64)> = records.iter().map(|r| (r.tx_type.as_str(), r.tx_type_code)).collect();
        assert_eq!(
            codes,
            vec![("InvokeTransactionV1", 1), ("unknown", 2), ("DeclareTransactionV2", 0)]
        );
    }

    #[test]
    fn test_preprocess_files() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        let processed = dir.path().join("out").join("processed.csv");
        fs::write(&raw, RAW).unwrap();

        preprocess(&raw, &processed).unwrap();
        let written = fs::read_to_string(&processed).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("block_number,block_timestamp,block_datetime,hour,tx_hash,tx_type,tx_type_code,sender,calldata_len")
        );
        assert_eq!(
            lines.next(),
            Some("10,1700000000.0,2023-11-14 22:13:20,22,0xaa,InvokeTransactionV1,1,0x5e,3")
        );
        assert_eq!(lines.count(), 2);
    }
}
