use crate::err_from;
use crate::error::HarvestError;
use crate::model::TransactionRecord;
use std::fs;
use std::path::Path;

pub const COLUMNS: [&str; 6] = [
    "block_number",
    "block_timestamp",
    "tx_hash",
    "tx_type",
    "sender",
    "calldata_len",
];

/// Harvested rows in emission order. An empty table means nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionTable {
    rows: Vec<TransactionRecord>,
}

impl TransactionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<TransactionRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<TransactionRecord> {
        self.rows
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), HarvestError> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            wtr.write_record(COLUMNS).map_err(err_from!())?;
        }
        for row in &self.rows {
            wtr.serialize(row).map_err(err_from!())?;
        }
        wtr.flush().map_err(err_from!())?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), HarvestError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(err_from!())?;
        }
        let file = fs::File::create(path).map_err(err_from!())?;
        self.write_csv(file)?;
        log::info!("Saved {} transactions to {}", self.len(), path.display());
        Ok(())
    }
}
