pub mod config;
pub mod debug;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod model;
pub mod preprocess;
pub mod setup;
pub mod source;
pub mod table;
pub mod utils;
