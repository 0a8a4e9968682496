use crate::{
    error::{CompileError, FilterConversionError, MatchError},
    CompiledRoute, Params, ResourcePath, Rule,
};

/// Ordered list of compiled routes.
///
/// Routes are tried in insertion order. A route that does not match hands over to the next one; a
/// route that matches but fails to convert a parameter ends the search with that error, so the
/// caller can answer with a client error instead of "not found".
///
/// ```
/// use route_rules::{Router, Value};
///
/// let mut router = Router::build();
/// router.rule("/users/<id:int>", "user")?;
/// router.rule("/users/<name>", "user_by_name")?;
/// let router = router.finish();
///
/// let (val, params) = router.recognize("/users/42").unwrap().unwrap();
/// assert_eq!(*val, "user");
/// assert_eq!(params["id"], Value::Int(42));
///
/// let (val, _) = router.recognize("/users/ferris").unwrap().unwrap();
/// assert_eq!(*val, "user_by_name");
///
/// assert!(router.recognize("/teams/1").unwrap().is_none());
/// # Ok::<(), route_rules::CompileError>(())
/// ```
pub struct Router<T> {
    routes: Vec<(CompiledRoute, T)>,
}

impl<T> Router<T> {
    /// Constructs new `RouterBuilder` with empty route list.
    pub fn build() -> RouterBuilder<T> {
        RouterBuilder { routes: Vec::new() }
    }

    /// Finds the first route matching `path`.
    ///
    /// Returns `Ok(None)` when no route matches.
    pub fn recognize<R>(&self, path: &R) -> Result<Option<(&T, Params)>, FilterConversionError>
    where
        R: ResourcePath + ?Sized,
    {
        Ok(self
            .recognize_route(path)?
            .map(|(_, val, params)| (val, params)))
    }

    /// Same as [`recognize`](Self::recognize) but also returns the matched route.
    pub fn recognize_route<R>(
        &self,
        path: &R,
    ) -> Result<Option<(&CompiledRoute, &T, Params)>, FilterConversionError>
    where
        R: ResourcePath + ?Sized,
    {
        for (route, val) in &self.routes {
            match route.match_path(path) {
                Ok(params) => return Ok(Some((route, val, params))),
                Err(MatchError::NotFound(_)) => continue,
                Err(MatchError::Conversion(err)) => return Err(err),
            }
        }

        Ok(None)
    }

    /// Returns number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns an iterator over routes and their values, in recognition order.
    pub fn iter(&self) -> impl Iterator<Item = (&CompiledRoute, &T)> {
        self.routes.iter().map(|(route, val)| (route, val))
    }
}

/// Builder for an ordered [routing](Router) list.
pub struct RouterBuilder<T> {
    routes: Vec<(CompiledRoute, T)>,
}

impl<T> RouterBuilder<T> {
    /// Adds a compiled route to the end of the routing list.
    ///
    /// Returns mutable references to elements of the new route.
    pub fn push(&mut self, route: CompiledRoute, val: T) -> (&mut CompiledRoute, &mut T) {
        let idx = self.routes.len();
        self.routes.push((route, val));
        let (route, val) = &mut self.routes[idx];
        (route, val)
    }

    /// Compiles `rule` with the global filter registry and adds it to the routing list.
    pub fn rule(&mut self, rule: &str, val: T) -> Result<&mut Self, CompileError> {
        let route = Rule::compile(rule)?;
        self.routes.push((route, val));
        Ok(self)
    }

    /// Finish configuration and create router instance.
    pub fn finish(self) -> Router<T> {
        Router {
            routes: self.routes,
        }
    }
}
