use lanec_core::error::Error;

/// Create a simple optimization error
pub fn optimization_error(message: impl Into<String>) -> Error {
    Error::Optimization(message.into())
}

/// Create an internal error for pipeline-integration bugs that must block
/// code generation
pub fn internal_error(message: impl Into<String>) -> Error {
    Error::Internal(message.into())
}

/// Create a generic error (when we don't have specific error information)
pub fn generic_error(message: impl Into<eyre::Error>) -> Error {
    Error::Generic(message.into().to_string())
}

// Convenience macros for generating optimization errors

/// Macro to return early with an optimization error
#[macro_export]
macro_rules! opt_bail {
    ($message:expr) => {
        return Err($crate::error::optimization_error($message))
    };
}

/// Macro to ensure a condition is true, or return an optimization error
#[macro_export]
macro_rules! opt_ensure {
    ($cond:expr, $message:expr) => {
        if !($cond) {
            $crate::opt_bail!($message);
        }
    };
}
