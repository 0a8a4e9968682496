//! Abstraction over `regex` and `regex-lite` depending on whether we have `unicode` crate feature
//! enabled.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "unicode")] {
        pub(crate) use regex::{escape, Regex};

        /// Engine name reported in diagnostics.
        pub(crate) const ENGINE: &str = "regex";
    } else {
        pub(crate) use regex_lite::{escape, Regex};

        /// Engine name reported in diagnostics.
        pub(crate) const ENGINE: &str = "regex-lite";
    }
}

/// Checks that `pattern` is accepted by the engine, returning the engine's diagnostic otherwise.
pub(crate) fn validate(pattern: &str) -> Result<(), String> {
    Regex::new(pattern).map(drop).map_err(|err| err.to_string())
}
