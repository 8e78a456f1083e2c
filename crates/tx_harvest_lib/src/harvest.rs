use crate::debug::DebugRecorder;
use crate::extract::{extract_calldata_len, extract_hash, extract_sender, extract_tx_type};
use crate::model::{BlockRef, DebugSample, NodeBlock, NodeTransaction, TransactionRecord, TxPayload};
use crate::source::BlockSource;
use crate::table::TransactionTable;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Descending scan range: `block_count` blocks ending at `head`, clamped at 0.
pub fn scan_range(head: u64, block_count: u64) -> RangeInclusive<u64> {
    let end = head.saturating_add(1).saturating_sub(block_count);
    end..=head
}

fn record_from_tx(
    block_number: u64,
    block: &NodeBlock,
    tx: &NodeTransaction,
    fallback_hash: Option<&str>,
) -> TransactionRecord {
    TransactionRecord {
        block_number,
        block_timestamp: block.timestamp,
        tx_hash: extract_hash(tx, fallback_hash),
        tx_type: Some(extract_tx_type(tx)),
        sender: extract_sender(tx),
        calldata_len: Some(extract_calldata_len(tx)),
    }
}

/// Walks recent blocks one fetch at a time and turns their transactions into
/// table rows.
pub struct Harvester<S: BlockSource> {
    source: S,
    debug_path: Option<PathBuf>,
}

impl<S: BlockSource> Harvester<S> {
    pub fn new(source: S) -> Self {
        Harvester {
            source,
            debug_path: None,
        }
    }

    /// Where debug samples are written at the end of a run. Without a path
    /// samples are only logged.
    pub fn with_debug_path(mut self, path: PathBuf) -> Self {
        self.debug_path = Some(path);
        self
    }

    pub async fn harvest(&self, block_count: u64, inter_tx_delay: Duration) -> TransactionTable {
        let (table, _recorder) = self.harvest_with_samples(block_count, inter_tx_delay).await;
        table
    }

    /// Same as [`Harvester::harvest`], also handing back the debug samples of
    /// the run.
    pub async fn harvest_with_samples(
        &self,
        block_count: u64,
        inter_tx_delay: Duration,
    ) -> (TransactionTable, DebugRecorder) {
        let mut recorder = DebugRecorder::new();

        let head = match self.source.block(BlockRef::Latest).await {
            Ok(block) => block,
            Err(err) => {
                log::error!("Failed to fetch latest block: {}", err);
                return (TransactionTable::empty(), recorder);
            }
        };
        let Some(start) = head.number else {
            log::error!("Latest block missing block number; aborting");
            return (TransactionTable::empty(), recorder);
        };

        let range = scan_range(start, block_count);
        log::info!("Scanning blocks {} down to {}", range.end(), range.start());

        let mut rows = Vec::new();
        for block_number in range.rev() {
            let block = match self.source.block(BlockRef::Number(block_number)).await {
                Ok(block) => block,
                Err(err) => {
                    log::warn!("Error fetching block {}: {}", block_number, err);
                    continue;
                }
            };

            match block.payload() {
                TxPayload::Inline(txs) => {
                    log::debug!("Block {}: {} inline transactions", block_number, txs.len());
                    for tx in &txs {
                        rows.push(record_from_tx(block_number, &block, tx, None));
                    }
                }
                TxPayload::HashRefs(hashes) => {
                    log::debug!("Block {}: {} transaction hashes", block_number, hashes.len());
                    for hash in &hashes {
                        let row = match self.source.transaction(hash).await {
                            Ok(tx) => record_from_tx(block_number, &block, &tx, Some(hash.as_str())),
                            Err(err) => {
                                log::warn!("Could not fetch tx {} in block {}: {}", hash, block_number, err);
                                TransactionRecord {
                                    block_number,
                                    block_timestamp: block.timestamp,
                                    tx_hash: Some(hash.clone()),
                                    tx_type: None,
                                    sender: None,
                                    calldata_len: None,
                                }
                            }
                        };
                        rows.push(row);
                        if !inter_tx_delay.is_zero() {
                            tokio::time::sleep(inter_tx_delay).await;
                        }
                    }
                }
                TxPayload::Unusable { field_type, repr } => {
                    log::warn!("No usable tx info in block {}", block_number);
                    recorder.record(DebugSample {
                        block_number,
                        transactions_field_type: field_type,
                        transactions_repr: repr,
                    });
                }
            }
        }

        if let Some(path) = &self.debug_path {
            match recorder.flush(path) {
                Ok(true) => log::info!("Wrote debug samples to {}", path.display()),
                Ok(false) => {}
                Err(err) => log::error!("Failed to write debug JSON: {}", err),
            }
        } else if !recorder.is_empty() {
            log::warn!("{} blocks without usable transactions", recorder.samples().len());
        }

        log::info!("Harvested {} transactions", rows.len());
        (TransactionTable::from_rows(rows), recorder)
    }
}
