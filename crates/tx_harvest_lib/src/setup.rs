use crate::config::{Config, Dialect, HarvestSettings};
use crate::err_custom_create;
use crate::error::HarvestError;
use crate::source::RpcBlockSource;
use rand::Rng;
use std::time::Duration;
use web3::transports::Http;
use web3::Web3;

#[derive(Clone, Debug)]
pub struct ProviderSetup {
    pub endpoint: String,
    pub provider: Web3<Http>,
}

#[derive(Clone, Debug)]
pub struct HarvestSetup {
    pub chain_name: String,
    pub dialect: Dialect,
    pub full_transactions: bool,
    pub providers: Vec<ProviderSetup>,
    pub settings: HarvestSettings,
}

impl HarvestSetup {
    pub fn new(config: &Config, chain_name: &str) -> Result<Self, HarvestError> {
        let chain = config.get_chain(chain_name)?;
        if chain.rpc_endpoints.is_empty() {
            return Err(err_custom_create!("No rpc endpoints for chain {}", chain_name));
        }
        let mut providers = Vec::new();
        for endp in &chain.rpc_endpoints {
            let Ok(transport) = Http::new(endp) else {
                return Err(err_custom_create!("Failed to create transport for endpoint: {}", endp));
            };
            providers.push(ProviderSetup {
                endpoint: endp.clone(),
                provider: Web3::new(transport),
            });
        }
        Ok(HarvestSetup {
            chain_name: chain_name.to_string(),
            dialect: chain.dialect,
            full_transactions: chain.full_transactions,
            providers,
            settings: config.harvest.clone(),
        })
    }

    pub fn tx_delay(&self) -> Duration {
        Duration::from_millis(self.settings.tx_delay_ms)
    }

    /// Picks one of the configured endpoints at random for this run.
    pub fn block_source(&self) -> Result<RpcBlockSource, HarvestError> {
        let mut rng = rand::thread_rng();
        let provider = self
            .providers
            .get(rng.gen_range(0..self.providers.len()))
            .ok_or_else(|| err_custom_create!("No providers found for chain: {}", self.chain_name))?;
        log::info!("Using endpoint {} for chain {}", provider.endpoint, self.chain_name);
        Ok(RpcBlockSource::new(
            provider.provider.clone(),
            self.dialect,
            self.full_transactions,
        ))
    }
}
