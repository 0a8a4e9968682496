//! Named filters and the registry that resolves them.
//!
//! A filter turns the optional configuration of a dynamic segment into a regex fragment and an
//! optional [`Converter`] for the captured text. Filters are looked up by name while a rule
//! compiles; after that the compiled route no longer refers to the registry.

use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{builtins, error::UnknownFilterError, Value};

/// Regex fragment plus optional converter produced by [`Filter::parse`].
pub type FilterParts = (String, Option<Converter>);

/// A named rule mapping a segment's configuration to a regex fragment and a converter.
///
/// Closures of the shape `Fn(Option<&str>) -> FilterParts` implement this trait, which is handy
/// for one-off filters:
///
/// ```
/// use route_rules::{Converter, FilterRegistry, Rule, Value};
///
/// let mut registry = FilterRegistry::new();
/// registry.register("hex", |_: Option<&str>| {
///     let conv = Converter::new("hex", |raw| i64::from_str_radix(raw, 16).ok().map(Value::Int));
///     ("[0-9a-f]+".to_owned(), Some(conv))
/// });
///
/// let route = Rule::compile_with("/color/<c:hex>", &registry).unwrap();
/// let params = route.match_path("/color/ff").unwrap();
/// assert_eq!(params.get("c"), Some(&Value::Int(255)));
/// ```
pub trait Filter: Send + Sync {
    /// Produces the regex fragment and converter for a segment with the given configuration.
    fn parse(&self, config: Option<&str>) -> FilterParts;
}

impl<F> Filter for F
where
    F: Fn(Option<&str>) -> FilterParts + Send + Sync,
{
    fn parse(&self, config: Option<&str>) -> FilterParts {
        (self)(config)
    }
}

type ConvertFn = dyn Fn(&str) -> Option<Value> + Send + Sync;

/// Converts captured text into a typed [`Value`].
///
/// Converters are identified by name: two converters with the same name are considered equal.
#[derive(Clone)]
pub struct Converter {
    name: Cow<'static, str>,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Creates a converter. `func` returns `None` when the raw text is malformed.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Parses the raw text as a signed 64-bit integer.
    pub fn int() -> Self {
        Self::new("int", |raw| raw.parse().ok().map(Value::Int))
    }

    /// Parses the raw text as a 64-bit float.
    pub fn float() -> Self {
        Self::new("float", |raw| raw.parse().ok().map(Value::Float))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the converter to `raw`.
    pub fn convert(&self, raw: &str) -> Option<Value> {
        (self.func)(raw)
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Converter {}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converter").field(&self.name).finish()
    }
}

static GLOBAL: Lazy<RwLock<FilterRegistry>> = Lazy::new(|| RwLock::new(FilterRegistry::new()));

/// Mapping from filter names to filter implementations.
///
/// Registering a name twice replaces the earlier filter. A registry built with
/// [`new`](Self::new) holds the built-in filters:
///
/// | name | fragment | converter |
/// |---|---|---|
/// | `re`, `default` | `[^/]+`, or the configuration when given | none |
/// | `int` | `-?\d+` | [`Converter::int`] |
/// | `float` | `-?[\d.]+` | [`Converter::float`] |
/// | `path` | `.+?` | none |
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// Constructs a registry holding the built-in filters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builtins::register(&mut registry);
        registry
    }

    /// Constructs a registry with no filters at all.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Process-wide registry used by [`compile`](crate::compile).
    ///
    /// It is created with the built-in filters on first access. Extension filters must be
    /// registered before compiling any rule that references them; routes compiled earlier are not
    /// affected by later registrations.
    pub fn global() -> &'static RwLock<FilterRegistry> {
        &GLOBAL
    }

    /// Registers `filter` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Filter + 'static,
    {
        self.insert(name.into(), Arc::new(filter));
        self
    }

    /// Registers `filter` under `name` and every alias in `aliases`.
    ///
    /// All names resolve to the same filter instance.
    pub fn register_with_aliases<F, I, S>(
        &mut self,
        name: impl Into<String>,
        filter: F,
        aliases: I,
    ) -> &mut Self
    where
        F: Filter + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter: Arc<dyn Filter> = Arc::new(filter);

        self.insert(name.into(), Arc::clone(&filter));
        for alias in aliases {
            self.insert(alias.into(), Arc::clone(&filter));
        }

        self
    }

    fn insert(&mut self, name: String, filter: Arc<dyn Filter>) {
        if self.filters.insert(name.clone(), filter).is_some() {
            debug!("filter `{}` replaced", name);
        } else {
            debug!("filter `{}` registered", name);
        }
    }

    /// Resolves a filter by name.
    pub fn fetch(&self, name: &str) -> Result<Arc<dyn Filter>, UnknownFilterError> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownFilterError::new(name))
    }

    /// Resolves a filter by name and parses `config` with it.
    pub fn parse(&self, name: &str, config: Option<&str>) -> Result<FilterParts, UnknownFilterError> {
        match self.filters.get(name) {
            Some(filter) => Ok(filter.parse(config)),
            None => Err(UnknownFilterError::new(name)),
        }
    }

    /// Returns `true` if a filter is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Returns registered names, including aliases, in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.filters.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// Registers `filter` in the [global registry](FilterRegistry::global) under `name` and `aliases`.
pub fn register_filter<F, I, S>(name: impl Into<String>, filter: F, aliases: I)
where
    F: Filter + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FilterRegistry::global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_with_aliases(name, filter, aliases);
}
