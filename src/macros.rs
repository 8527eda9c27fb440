//! Logging macros
//!
//! Same placeholder syntax as the [`crate::Logger`] methods, but the caller
//! fragment also names the function the call was made from.
//!
//! ```no_run
//! use levelog::{Config, Logger};
//!
//! let logger = Logger::new(Config::default()).unwrap();
//! levelog::info!(logger, "listening on ? with ? workers", "0.0.0.0:80", 8);
//! levelog::error!(logger, "request failed");
//! ```

/// The call site of the macro invocation, enclosing function included
#[doc(hidden)]
#[macro_export]
macro_rules! __caller {
    () => {
        $crate::Caller::new(file!(), line!(), {
            fn __levelog_here() {}
            $crate::format::enclosing_function(__levelog_here)
        })
    };
}

/// Log at an explicit severity; `Fatal` exits the process
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $logger.log_at(
            $severity,
            &$crate::__caller!(),
            $format,
            &[$(&$arg as &dyn $crate::LogValue),*],
        )
    };
}

/// Log at debug severity
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($rest)+)
    };
}

/// Log at info severity
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($rest)+)
    };
}

/// Log at error severity
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($rest)+)
    };
}

/// Log at fatal severity and exit the process with status 1
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $logger.fatal_at(
            &$crate::__caller!(),
            $format,
            &[$(&$arg as &dyn $crate::LogValue),*],
        )
    };
}
