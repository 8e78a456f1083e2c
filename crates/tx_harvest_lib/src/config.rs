use serde::Deserialize;
use std::collections::btree_map::BTreeMap as Map;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HarvestError;
use crate::{err_custom_create, err_from};

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestSettings,
    pub chain: Map<String, Chain>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    Ethereum,
    Starknet,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct HarvestSettings {
    pub block_count: u64,
    pub tx_delay_ms: u64,
    pub raw_csv: PathBuf,
    pub debug_json: PathBuf,
    pub processed_csv: PathBuf,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        HarvestSettings {
            block_count: 20,
            tx_delay_ms: 10,
            raw_csv: PathBuf::from("data/raw.csv"),
            debug_json: PathBuf::from("data/fetch_debug.json"),
            processed_csv: PathBuf::from("data/processed.csv"),
        }
    }
}

fn default_full_transactions() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub dialect: Dialect,
    pub rpc_endpoints: Vec<String>,
    #[serde(default = "default_full_transactions")]
    pub full_transactions: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HarvestError> {
        let content = fs::read_to_string(path).map_err(err_from!())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, HarvestError> {
        toml::from_str(content).map_err(err_from!())
    }

    pub fn get_chain(&self, chain_name: &str) -> Result<&Chain, HarvestError> {
        self.chain
            .get(chain_name)
            .ok_or_else(|| err_custom_create!("No chain {} in config", chain_name))
    }
}
