#[macro_export]
macro_rules! err_custom_create {
    ($($arg:tt)*) => {
        $crate::error::HarvestError::OtherError(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! err_parse_create {
    ($($arg:tt)*) => {
        $crate::error::HarvestError::ParsingError(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! err_from {
    () => {
        |err| -> $crate::error::HarvestError { err.into() }
    };
}
