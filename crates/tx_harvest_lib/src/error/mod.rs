mod wrapped;

pub use wrapped::HarvestError;

/// Export macros for creating errors
mod macros;
