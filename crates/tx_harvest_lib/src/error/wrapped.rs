use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("web3 error: {0}")]
    Web3Error(#[from] web3::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("Other error: {0}")]
    OtherError(String),
}
