//! Cell style maps.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::codec::attr::{decode_style, encode_style};

/// Style properties of a cell (`style` attribute).
///
/// An empty value marks a bare flag such as `ellipse`. The map itself is
/// unordered; [`fmt::Display`] renders keys in sorted order so output is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap(FxHashMap<String, String>);

impl StyleMap {
    /// Creates an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `;`-separated style string.
    pub fn parse(style: &str) -> Self {
        decode_style(style)
    }

    /// Sets a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Sets a bare flag property (no `=value`).
    pub fn insert_flag(&mut self, key: impl Into<String>) -> Option<String> {
        self.insert(key, "")
    }

    /// Removes a property.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Returns the value of a property, `Some("")` for bare flags.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates properties in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_style(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_and_values() {
        let mut style = StyleMap::new();
        style.insert_flag("ellipse");
        style.insert("aspect", "fixed");

        assert_eq!(style.get("ellipse"), Some(""));
        assert_eq!(style.get("aspect"), Some("fixed"));
        assert_eq!(style.get("html"), None);
        assert_eq!(style.len(), 2);
        assert_eq!(style.to_string(), "aspect=fixed;ellipse");
    }

    #[test]
    fn test_insert_replaces() {
        let mut style: StyleMap = [("rounded", "0")].into_iter().collect();
        assert_eq!(style.insert("rounded", "1"), Some("0".to_string()));
        assert_eq!(style.remove("rounded"), Some("1".to_string()));
        assert!(style.is_empty());
    }
}
