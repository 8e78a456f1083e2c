use std::path::PathBuf;
use structopt::StructOpt;
use tx_harvest_lib::err_custom_create;
use tx_harvest_lib::error::HarvestError;

#[derive(Debug, StructOpt)]
pub struct FetchOptions {
    #[structopt(long = "chain-name", default_value = "starknet-mainnet")]
    pub chain_name: String,

    #[structopt(long = "blocks", help = "Number of blocks to scan back from the head")]
    pub blocks: Option<u64>,

    #[structopt(
        long = "tx-delay-ms",
        help = "Delay between transaction fetches, overrides config"
    )]
    pub tx_delay_ms: Option<u64>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Harvest recent transactions into the raw table.
    #[structopt(name = "fetch")]
    Fetch(FetchOptions),
    /// Build the feature table from the raw table.
    #[structopt(name = "preprocess")]
    Preprocess,
    /// Fetch and then preprocess.
    #[structopt(name = "run")]
    Run(FetchOptions),
}

#[derive(Debug, StructOpt)]
#[structopt(name = "tx_harvester", about = "Harvests block transactions into a flat table")]
pub struct CliOptions {
    #[structopt(long = "config", default_value = "config-harvest.toml", parse(from_os_str))]
    pub config: PathBuf,

    #[structopt(subcommand)]
    pub command: Command,
}

pub fn validated_cli() -> Result<CliOptions, HarvestError> {
    let cli = CliOptions::from_args();
    if let Command::Fetch(fetch) | Command::Run(fetch) = &cli.command {
        if fetch.blocks == Some(0) {
            return Err(err_custom_create!("Number of blocks has to be greater than 0"));
        }
    }
    Ok(cli)
}
