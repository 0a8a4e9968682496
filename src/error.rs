//! Compile-time and match-time errors.

use std::error::Error as StdError;

use derive_more::{Display, From};

/// A rule referenced a filter name that has no registration.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("unknown filter `{name}`")]
pub struct UnknownFilterError {
    name: String,
}

impl UnknownFilterError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the filter that could not be resolved.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl StdError for UnknownFilterError {}

/// A rule assembled into a pattern the regex engine rejects.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("bad route: {rule} ({message})")]
pub struct RuleSyntaxError {
    rule: String,
    message: String,
}

impl RuleSyntaxError {
    pub(crate) fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Rule text as given to the compiler.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Diagnostic produced while validating the rule.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl StdError for RuleSyntaxError {}

/// A path did not satisfy a compiled route.
///
/// This is the expected outcome when probing a list of routes; callers move on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("route `{route}` does not match `{path}`")]
pub struct RouteNotFoundError {
    route: String,
    path: String,
}

impl RouteNotFoundError {
    pub(crate) fn new(route: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            path: path.into(),
        }
    }

    /// Canonical name of the route that was tried.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The path that was tried.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl StdError for RouteNotFoundError {}

/// A path matched a route but a captured value was rejected by its converter.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("wrong format for {param} ({value})")]
pub struct FilterConversionError {
    param: String,
    value: String,
}

impl FilterConversionError {
    pub(crate) fn new(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            value: value.into(),
        }
    }

    /// Parameter whose value failed conversion.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Raw captured text.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl StdError for FilterConversionError {}

/// Errors returned while compiling a rule.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
#[non_exhaustive]
pub enum CompileError {
    /// Rule references an unregistered filter.
    #[display("{}", _0)]
    UnknownFilter(UnknownFilterError),

    /// Rule produced an invalid pattern.
    #[display("{}", _0)]
    Syntax(RuleSyntaxError),
}

impl StdError for CompileError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompileError::UnknownFilter(err) => Some(err),
            CompileError::Syntax(err) => Some(err),
        }
    }
}

/// Errors returned while matching a path against a compiled route.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
#[non_exhaustive]
pub enum MatchError {
    /// Path does not match; try the next route.
    #[display("{}", _0)]
    NotFound(RouteNotFoundError),

    /// Path matched but a parameter is malformed; report a client error.
    #[display("{}", _0)]
    Conversion(FilterConversionError),
}

impl MatchError {
    /// Returns `true` if the route simply did not match.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MatchError::NotFound(_))
    }

    /// Returns `true` if the route matched but a parameter failed conversion.
    pub fn is_conversion(&self) -> bool {
        matches!(self, MatchError::Conversion(_))
    }
}

impl StdError for MatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MatchError::NotFound(err) => Some(err),
            MatchError::Conversion(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            UnknownFilterError::new("nope").to_string(),
            "unknown filter `nope`"
        );
        assert_eq!(
            RuleSyntaxError::new("/<a:re:(>", "unclosed group").to_string(),
            "bad route: /<a:re:(> (unclosed group)"
        );
        assert_eq!(
            FilterConversionError::new("n", "abc").to_string(),
            "wrong format for n (abc)"
        );

        let err = CompileError::from(UnknownFilterError::new("nope"));
        assert_eq!(err.to_string(), "unknown filter `nope`");
    }

    #[test]
    fn match_error_kind() {
        let err = MatchError::from(RouteNotFoundError::new("/a", "/b"));
        assert!(err.is_not_found());
        assert!(!err.is_conversion());
        assert!(err.source().is_some());

        let err = MatchError::from(FilterConversionError::new("n", "x"));
        assert!(err.is_conversion());
        assert!(!err.is_not_found());
    }
}
