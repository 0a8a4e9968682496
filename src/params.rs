use std::{ops::Index, slice};

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::Value;

/// Named parameters captured by a successful match, in declaration order.
///
/// Unnamed segments never appear here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    items: Vec<(String, Value)>,
}

impl Params {
    /// Constructs an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: String, value: Value) {
        self.items.push((name, value));
    }

    /// Returns the value of parameter `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns `true` if a parameter called `name` was captured.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns number of captured parameters.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.items.iter(),
        }
    }

    pub(crate) fn items(&self) -> &[(String, Value)] {
        &self.items
    }
}

impl Index<&str> for Params {
    type Output = Value;

    /// # Panics
    /// Panics if no parameter is called `name`.
    fn index(&self, name: &str) -> &Value {
        self.get(name)
            .unwrap_or_else(|| panic!("no parameter named `{}`", name))
    }
}

/// Iterator over [`Params`] entries.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (String, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;

        for (name, value) in &self.items {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        let mut params = Params::new();
        params.push("id".to_owned(), Value::Int(3));
        params.push("slug".to_owned(), Value::from("intro"));
        params
    }

    #[test]
    fn lookup() {
        let params = params();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some(&Value::Int(3)));
        assert_eq!(params["slug"], "intro");
        assert!(params.contains_key("slug"));
        assert!(!params.contains_key("tab"));
        assert!(params.get("tab").is_none());
        assert!(Params::new().is_empty());
    }

    #[test]
    #[should_panic(expected = "no parameter named `tab`")]
    fn index_missing() {
        let _ = &params()["tab"];
    }

    #[test]
    fn iteration_order() {
        let params = params();
        let names = params.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, ["id", "slug"]);
        assert_eq!(params.iter().len(), 2);

        let owned = params.into_iter().collect::<Vec<_>>();
        assert_eq!(owned[0], ("id".to_owned(), Value::Int(3)));
    }
}
