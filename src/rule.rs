use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::PoisonError,
};

use once_cell::sync::OnceCell;
use tracing::{debug, error, trace};

use crate::{
    engine::{self, escape, Regex},
    error::{CompileError, FilterConversionError, MatchError, RouteNotFoundError, RuleSyntaxError},
    filter::{Converter, FilterRegistry},
    token::Token,
    Params, ResourcePath, Value,
};

/// Compiles rules into [`CompiledRoute`]s.
///
/// # Rule syntax
/// A rule is literal text with dynamic segments. Each segment resolves a named filter to a regex
/// fragment and an optional converter:
///
/// | segment | filter | captured as |
/// |---|---|---|
/// | `<id>`, `:id` | `default` (`[^/]+`) | `id` |
/// | `<id:int>` | `int` (`-?\d+`) | `id`, converted to an integer |
/// | `<y:re:\d{4}>`, `:y#\d{4}#` | `default` with an inline regex | `y` |
/// | `<:path>` | `path` (`.+?`) | nothing; unnamed segments only constrain the match |
///
/// See the [`token`](crate::Token) docs for escaping rules.
///
/// # Static and dynamic routes
/// A rule without segments is static: its name and pattern are the rule itself and it only matches
/// its own literal text, with escaped markers resolved. Otherwise the pattern is an anchored regex and the name is the same regex with
/// every group made non-capturing, so routes differing only in grouping style share a name.
///
/// # Examples
/// ```
/// use route_rules::{Rule, Value};
///
/// let route = Rule::compile("/user/<id:int>/posts/<slug>").unwrap();
/// assert_eq!(route.pattern(), r"^(?:/user/(?P<id>-?\d+)/posts/(?P<slug>[^/]+))$");
/// assert_eq!(route.name(), r"^(?:/user/(?:-?\d+)/posts/(?:[^/]+))$");
///
/// let params = route.match_path("/user/42/posts/hello").unwrap();
/// assert_eq!(params["id"], Value::Int(42));
/// assert_eq!(params["slug"], "hello");
/// ```
#[derive(Debug)]
pub struct Rule;

impl Rule {
    /// Compiles `rule` against the [global filter registry](FilterRegistry::global).
    pub fn compile(rule: &str) -> Result<CompiledRoute, CompileError> {
        let registry = FilterRegistry::global()
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        Self::compile_with(rule, &registry)
    }

    /// Compiles `rule` resolving filters from `registry`.
    pub fn compile_with(rule: &str, registry: &FilterRegistry) -> Result<CompiledRoute, CompileError> {
        let mut body = String::with_capacity(rule.len() * 2);
        let mut literal = String::new();
        let mut filters: Vec<(String, Option<Converter>)> = Vec::new();
        let mut is_static = true;

        for token in Token::scan(rule) {
            match token {
                Token::Literal(text) => {
                    body.push_str(&escape(&text));
                    literal.push_str(&text);
                }

                Token::Dynamic {
                    name,
                    filter,
                    config,
                } => {
                    is_static = false;

                    let (fragment, converter) = registry.parse(filter, config.as_deref())?;

                    match name {
                        Some(name) => {
                            if filters.iter().any(|(existing, _)| existing == name) {
                                return Err(RuleSyntaxError::new(
                                    rule,
                                    format!("duplicate parameter `{}`", name),
                                )
                                .into());
                            }

                            body.push_str(&format!("(?P<{}>{})", name, fragment));
                            filters.push((name.to_owned(), converter));
                        }
                        None => body.push_str(&format!("(?:{})", fragment)),
                    }
                }
            }
        }

        if is_static {
            debug!("compiled static rule {:?}", rule);
            return Ok(CompiledRoute::new_static(rule, literal));
        }

        let pattern = format!("^(?:{})$", body);
        let name = canonical_name(&pattern);

        if let Err(err) = engine::validate(&pattern) {
            return Err(RuleSyntaxError::new(rule, err).into());
        }

        debug!(
            "compiled rule {:?} into {:?} ({} parameters, {} engine)",
            rule,
            pattern,
            filters.len(),
            engine::ENGINE
        );

        Ok(CompiledRoute {
            rule: rule.to_owned(),
            name,
            pattern,
            filters,
            kind: RouteKind::Dynamic(OnceCell::new()),
        })
    }

    /// Tokenizes `rule` without compiling it.
    pub fn tokens(rule: &str) -> crate::Tokens<'_> {
        Token::scan(rule)
    }
}

/// Compiles `rule` against the [global filter registry](FilterRegistry::global).
///
/// Shorthand for [`Rule::compile`].
pub fn compile(rule: &str) -> Result<CompiledRoute, CompileError> {
    Rule::compile(rule)
}

/// Matches `path` against `route`.
///
/// Shorthand for [`CompiledRoute::match_path`].
pub fn match_path<R>(route: &CompiledRoute, path: &R) -> Result<Params, MatchError>
where
    R: ResourcePath + ?Sized,
{
    route.match_path(path)
}

#[derive(Debug, Clone)]
enum RouteKind {
    /// Matches the rule's literal text, escapes resolved, exactly.
    Static(String),

    /// Matching engine built on first use.
    Dynamic(OnceCell<Regex>),
}

/// An immutable compiled rule.
///
/// Equality and hashing use the canonical [name](Self::name) only, so a set of compiled routes
/// rejects rules that would match the same paths with the same parameters.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    rule: String,
    name: String,
    pattern: String,
    filters: Vec<(String, Option<Converter>)>,
    kind: RouteKind,
}

impl CompiledRoute {
    fn new_static(rule: &str, literal: String) -> Self {
        CompiledRoute {
            rule: rule.to_owned(),
            name: rule.to_owned(),
            pattern: rule.to_owned(),
            filters: Vec::new(),
            kind: RouteKind::Static(literal),
        }
    }

    /// Rule text the route was compiled from.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Canonical name used to detect equivalent routes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Anchored regex source used for matching; the rule itself for static routes.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Named parameters in declaration order with their converters.
    pub fn filters(&self) -> &[(String, Option<Converter>)] {
        &self.filters
    }

    /// Returns `true` if the rule has no dynamic segments.
    pub fn is_static(&self) -> bool {
        matches!(self.kind, RouteKind::Static(_))
    }

    /// Returns `true` if `path` matches, without converting parameters.
    ///
    /// A path that matches here may still fail [`match_path`](Self::match_path) with a
    /// conversion error.
    pub fn is_match<R>(&self, path: &R) -> bool
    where
        R: ResourcePath + ?Sized,
    {
        let path = path.path();

        match &self.kind {
            RouteKind::Static(literal) => literal == path,
            RouteKind::Dynamic(cell) => self
                .engine(cell)
                .map_or(false, |regex| regex.is_match(path)),
        }
    }

    /// Matches `path`, returning converted named parameters.
    ///
    /// # Errors
    /// - [`MatchError::NotFound`] if the path does not satisfy the route.
    /// - [`MatchError::Conversion`] if it does but a converter rejects a captured value.
    ///
    /// # Examples
    /// ```
    /// use route_rules::Rule;
    ///
    /// let route = Rule::compile("/x/<n:int>").unwrap();
    /// assert_eq!(route.match_path("/x/42").unwrap()["n"], 42);
    /// assert!(route.match_path("/x/").unwrap_err().is_not_found());
    /// ```
    pub fn match_path<R>(&self, path: &R) -> Result<Params, MatchError>
    where
        R: ResourcePath + ?Sized,
    {
        let path = path.path();

        let cell = match &self.kind {
            RouteKind::Static(literal) if literal == path => {
                trace!("static route {:?} matched", self.name);
                return Ok(Params::new());
            }
            RouteKind::Static(_) => return Err(self.not_found(path)),
            RouteKind::Dynamic(cell) => cell,
        };

        let regex = self.engine(cell).ok_or_else(|| self.not_found(path))?;
        let captures = regex.captures(path).ok_or_else(|| self.not_found(path))?;

        let mut params = Params::with_capacity(self.filters.len());

        for (name, converter) in &self.filters {
            let raw = match captures.name(name) {
                Some(m) => m.as_str(),
                None => {
                    error!("Dynamic path match but not all segments found: {}", name);
                    return Err(self.not_found(path));
                }
            };

            let value = match converter {
                Some(converter) => converter
                    .convert(raw)
                    .ok_or_else(|| FilterConversionError::new(name.as_str(), raw))?,
                None => Value::Str(raw.to_owned()),
            };

            params.push(name.clone(), value);
        }

        trace!("route {:?} matched {:?}", self.name, path);

        Ok(params)
    }

    fn engine<'a>(&self, cell: &'a OnceCell<Regex>) -> Option<&'a Regex> {
        match cell.get_or_try_init(|| Regex::new(&self.pattern)) {
            Ok(regex) => Some(regex),
            Err(err) => {
                error!("Wrong path pattern: {:?} {}", self.pattern, err);
                None
            }
        }
    }

    fn not_found(&self, path: &str) -> MatchError {
        RouteNotFoundError::new(self.name.as_str(), path).into()
    }
}

impl PartialEq for CompiledRoute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CompiledRoute {}

impl Hash for CompiledRoute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.pattern)
    }
}

impl FromStr for CompiledRoute {
    type Err = CompileError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        Rule::compile(rule)
    }
}

impl TryFrom<&str> for CompiledRoute {
    type Error = CompileError;

    fn try_from(rule: &str) -> Result<Self, Self::Error> {
        Rule::compile(rule)
    }
}

/// Rewrites every named group and plain capturing group opening in `pattern` to `(?:`.
///
/// Escaped parentheses and parentheses inside character classes are left alone, as are groups
/// that already carry `?` syntax (non-capturing groups, flags).
fn canonical_name(pattern: &str) -> String {
    let bytes = pattern.as_bytes();
    let mut out = String::with_capacity(pattern.len());
    let mut copied = 0;
    let mut class_depth = 0usize;
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            // skip the escaped char; a multi-byte char's tail bytes never match below
            b'\\' => idx += 2,

            b'[' => {
                class_depth += 1;
                idx += 1;

                // a leading `]` (after an optional `^`) is literal in a class
                if class_depth == 1 {
                    if bytes.get(idx) == Some(&b'^') {
                        idx += 1;
                    }
                    if bytes.get(idx) == Some(&b']') {
                        idx += 1;
                    }
                }
            }

            b']' if class_depth > 0 => {
                class_depth -= 1;
                idx += 1;
            }

            b'(' if class_depth == 0 => {
                let open_len = group_opening_len(&pattern[idx..]);

                if open_len > 0 {
                    out.push_str(&pattern[copied..idx]);
                    out.push_str("(?:");
                    idx += open_len;
                    copied = idx;
                } else {
                    idx += 1;
                }
            }

            _ => idx += 1,
        }
    }

    out.push_str(&pattern[copied.min(pattern.len())..]);
    out
}

/// Length of a capturing group opening at the start of `rest`, or 0 if it is not one.
fn group_opening_len(rest: &str) -> usize {
    let after_paren = &rest[1..];

    let named = after_paren
        .strip_prefix("?P<")
        .or_else(|| after_paren.strip_prefix("?<"));

    match named {
        Some(group) => {
            let ident_len = group
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();

            let starts_ok = group
                .bytes()
                .next()
                .map_or(false, |b| b.is_ascii_alphabetic() || b == b'_');

            if starts_ok && group.as_bytes().get(ident_len) == Some(&b'>') {
                rest.len() - group.len() + ident_len + 1
            } else {
                0
            }
        }
        None if after_paren.starts_with('?') => 0,
        None => 1,
    }
}
