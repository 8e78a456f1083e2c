mod options;

use tx_harvest_lib::config::Config;
use tx_harvest_lib::error::HarvestError;
use tx_harvest_lib::harvest::Harvester;
use tx_harvest_lib::preprocess::preprocess;
use tx_harvest_lib::setup::HarvestSetup;

use crate::options::{validated_cli, Command, FetchOptions};

/// Returns false when nothing was harvested and the pipeline has to stop.
async fn fetch(config: &Config, opts: &FetchOptions) -> Result<bool, HarvestError> {
    let mut setup = HarvestSetup::new(config, &opts.chain_name)?;
    if let Some(blocks) = opts.blocks {
        setup.settings.block_count = blocks;
    }
    if let Some(tx_delay_ms) = opts.tx_delay_ms {
        setup.settings.tx_delay_ms = tx_delay_ms;
    }
    log::debug!("Starting harvester: {:#?}", setup.settings);

    let harvester =
        Harvester::new(setup.block_source()?).with_debug_path(setup.settings.debug_json.clone());
    let table = harvester
        .harvest(setup.settings.block_count, setup.tx_delay())
        .await;
    if table.is_empty() {
        log::warn!("No transactions fetched");
        return Ok(false);
    }
    table.save_csv(&setup.settings.raw_csv)?;
    Ok(true)
}

async fn main_internal() -> Result<(), HarvestError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = validated_cli()?;
    let config = Config::load(&cli.config)?;

    match &cli.command {
        Command::Fetch(opts) => {
            fetch(&config, opts).await?;
        }
        Command::Preprocess => {
            preprocess(&config.harvest.raw_csv, &config.harvest.processed_csv)?;
        }
        Command::Run(opts) => {
            if !fetch(&config, opts).await? {
                log::warn!("No rows fetched; aborting pipeline");
                return Ok(());
            }
            preprocess(&config.harvest.raw_csv, &config.harvest.processed_csv)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), HarvestError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Error: {}", e);
            Err(e)
        }
    }
}
