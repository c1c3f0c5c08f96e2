// FOLD LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_fold")]
macro_rules! fold_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_fold"))]
macro_rules! fold_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// SAFETY CLASSIFIER LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_safety")]
macro_rules! safety_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_safety"))]
macro_rules! safety_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
