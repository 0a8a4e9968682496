//! Route rule compiler and path matcher.
//!
//! A rule such as `/user/<id:int>/:tab` is compiled into a [`CompiledRoute`]: an anchored regex
//! pattern, a canonical name shared by rules that differ only in grouping style, and the list of
//! named parameters with their value converters. Matching a path returns the converted
//! [`Params`], which can also be [loaded](Params::load) into any `serde` type.
//!
//! Dynamic segments are resolved through named [filters](Filter). The built-in `re` (alias
//! `default`), `int`, `float` and `path` filters are always present in the
//! [global registry](FilterRegistry::global); applications add their own with
//! [`register_filter`].
//!
//! ```
//! use route_rules::{compile, Value};
//!
//! let route = compile("/user/<id:int>/:tab")?;
//! let params = route.match_path("/user/7/settings")?;
//!
//! assert_eq!(params["id"], Value::Int(7));
//! assert_eq!(params["tab"], "settings");
//!
//! let (id, tab): (u32, String) = params.load()?;
//! assert_eq!((id, tab.as_str()), (7, "settings"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Crate features
//! - `unicode` (default): match with the `regex` crate. Without it the smaller `regex-lite` engine
//!   is used and character classes are ASCII only.
//! - `http` (default): implements [`ResourcePath`] for `http::Uri`.

#![deny(rust_2018_idioms, nonstandard_style)]

mod builtins;
mod de;
mod engine;
mod error;
mod filter;
mod params;
mod router;
mod rule;
mod token;
mod value;

pub use self::builtins::{FloatFilter, IntFilter, PathFilter, RegexFilter};
pub use self::error::{
    CompileError, FilterConversionError, MatchError, RouteNotFoundError, RuleSyntaxError,
    UnknownFilterError,
};
pub use self::filter::{register_filter, Converter, Filter, FilterParts, FilterRegistry};
pub use self::params::{Iter, Params};
pub use self::router::{Router, RouterBuilder};
pub use self::rule::{compile, match_path, CompiledRoute, Rule};
pub use self::token::{Token, Tokens, DEFAULT_FILTER};
pub use self::value::Value;

/// Source of the path string a route is matched against.
pub trait ResourcePath {
    fn path(&self) -> &str;
}

impl ResourcePath for str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for String {
    fn path(&self) -> &str {
        self.as_str()
    }
}

impl ResourcePath for bytestring::ByteString {
    fn path(&self) -> &str {
        self
    }
}

impl<T: ResourcePath + ?Sized> ResourcePath for &T {
    fn path(&self) -> &str {
        (**self).path()
    }
}

#[cfg(feature = "http")]
impl ResourcePath for http::Uri {
    fn path(&self) -> &str {
        self.path()
    }
}
