//! Error macros for nbody-grade

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::GradeError::Usage($msg.to_string()))
    };
}

/// Macro for creating catalog invariant errors
#[macro_export]
macro_rules! bail_catalog {
    ($($arg:tt)*) => {
        return Err($crate::error::GradeError::InvalidCatalog(format!($($arg)*)))
    };
}
