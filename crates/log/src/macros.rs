//! Convenience macros that capture the call site

/// Fully qualified path of the enclosing function
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Build a [`LogRequest`](crate::LogRequest) with file, line and function
/// captured at the call site
///
/// ```rust
/// use lab_log::{Level, request};
///
/// let req = request!(Level::Info, "copied {} files", 12);
/// assert_eq!(req.level(), Level::Info);
/// ```
#[macro_export]
macro_rules! request {
    ($level:expr, $($arg:tt)+) => {
        $crate::LogRequest::new($level, ::std::format!($($arg)+))
            .at(::std::file!(), ::std::line!())
            .function($crate::function_name!())
    };
}

/// Log at an explicit level
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($crate::request!($level, $($arg)+))
    };
}

/// Log at ERROR
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Error, $($arg)+) };
}

/// Log at WARN
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Warn, $($arg)+) };
}

/// Log at INFO
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Info, $($arg)+) };
}

/// Log at SUCCESS
#[macro_export]
macro_rules! log_success {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Success, $($arg)+) };
}

/// Log at DEBUG
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Debug, $($arg)+) };
}

/// Log at TRACE
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Trace, $($arg)+) };
}

/// Log at VERBOSE
#[macro_export]
macro_rules! log_verbose {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Verbose, $($arg)+) };
}

/// Time a block of code as a performance trace
#[macro_export]
macro_rules! timed {
    ($logger:expr, $name:expr, $body:expr) => {{
        let _trace = $logger.trace_scope($name);
        $body
    }};
}
