use crate::config::Dialect;
use crate::err_custom_create;
use crate::error::HarvestError;
use crate::model::{BlockRef, NodeBlock, NodeTransaction};
use async_trait::async_trait;
use serde_json::{json, Value};
use web3::transports::Http;
use web3::{Transport, Web3};

/// Where blocks and transactions come from. Every call may fail on its own.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn block(&self, block: BlockRef) -> Result<NodeBlock, HarvestError>;
    async fn transaction(&self, hash: &str) -> Result<NodeTransaction, HarvestError>;
}

/// Raw JSON-RPC access to a full node, independent of the node's block shape.
pub struct RpcBlockSource {
    web3: Web3<Http>,
    dialect: Dialect,
    full_transactions: bool,
}

impl RpcBlockSource {
    pub fn new(web3: Web3<Http>, dialect: Dialect, full_transactions: bool) -> Self {
        Self {
            web3,
            dialect,
            full_transactions,
        }
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, HarvestError> {
        log::debug!("rpc call {} {:?}", method, params);
        let result = self.web3.transport().execute(method, params).await?;
        if result.is_null() {
            return Err(err_custom_create!("{} returned null", method));
        }
        Ok(result)
    }
}

fn block_request(dialect: Dialect, block: BlockRef, full_transactions: bool) -> (&'static str, Vec<Value>) {
    match dialect {
        Dialect::Ethereum => {
            let tag = match block {
                BlockRef::Latest => json!("latest"),
                BlockRef::Number(n) => json!(format!("{:#x}", n)),
            };
            ("eth_getBlockByNumber", vec![tag, json!(full_transactions)])
        }
        Dialect::Starknet => {
            let method = if full_transactions {
                "starknet_getBlockWithTxs"
            } else {
                "starknet_getBlockWithTxHashes"
            };
            let block_id = match block {
                BlockRef::Latest => json!("latest"),
                BlockRef::Number(n) => json!({ "block_number": n }),
            };
            (method, vec![block_id])
        }
    }
}

fn transaction_request(dialect: Dialect, hash: &str) -> (&'static str, Vec<Value>) {
    match dialect {
        Dialect::Ethereum => ("eth_getTransactionByHash", vec![json!(hash)]),
        Dialect::Starknet => ("starknet_getTransactionByHash", vec![json!(hash)]),
    }
}

#[async_trait]
impl BlockSource for RpcBlockSource {
    async fn block(&self, block: BlockRef) -> Result<NodeBlock, HarvestError> {
        let (method, params) = block_request(self.dialect, block, self.full_transactions);
        NodeBlock::from_json(self.call(method, params).await?)
    }

    async fn transaction(&self, hash: &str) -> Result<NodeTransaction, HarvestError> {
        let (method, params) = transaction_request(self.dialect, hash);
        Ok(NodeTransaction::from_json(self.call(method, params).await?))
    }
}
