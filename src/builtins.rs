//! Built-in filters.

use crate::filter::{Converter, Filter, FilterParts, FilterRegistry};

const DEFAULT_PATTERN: &str = "[^/]+";
const INT_PATTERN: &str = r"-?\d+";
const FLOAT_PATTERN: &str = r"-?[\d.]+";
const PATH_PATTERN: &str = ".+?";

/// Matches a single path segment, or whatever regex the configuration supplies.
///
/// Registered as `re` and `default`; every segment without an explicit filter uses it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexFilter;

impl Filter for RegexFilter {
    fn parse(&self, config: Option<&str>) -> FilterParts {
        let pattern = match config {
            Some(config) if !config.is_empty() => config,
            _ => DEFAULT_PATTERN,
        };

        (pattern.to_owned(), None)
    }
}

/// Matches an optionally negative run of digits and converts it to [`Value::Int`].
///
/// Configuration is ignored.
///
/// [`Value::Int`]: crate::Value::Int
#[derive(Debug, Clone, Copy, Default)]
pub struct IntFilter;

impl Filter for IntFilter {
    fn parse(&self, _: Option<&str>) -> FilterParts {
        (INT_PATTERN.to_owned(), Some(Converter::int()))
    }
}

/// Matches digits and dots and converts them to [`Value::Float`].
///
/// Configuration is ignored.
///
/// [`Value::Float`]: crate::Value::Float
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatFilter;

impl Filter for FloatFilter {
    fn parse(&self, _: Option<&str>) -> FilterParts {
        (FLOAT_PATTERN.to_owned(), Some(Converter::float()))
    }
}

/// Matches one or more characters, slashes included, as few as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFilter;

impl Filter for PathFilter {
    fn parse(&self, _: Option<&str>) -> FilterParts {
        (PATH_PATTERN.to_owned(), None)
    }
}

pub(crate) fn register(registry: &mut FilterRegistry) {
    registry
        .register_with_aliases("re", RegexFilter, ["default"])
        .register("int", IntFilter)
        .register("float", FloatFilter)
        .register("path", PathFilter);
}
