//! The package catalog served at `<url>/all.json`.

use serde_json::Value;

use crate::error::{RegistryError, Result};

/// Ordered list of package names published by a repository.
///
/// The catalog document is either a JSON array of names or a JSON object
/// whose keys are the names. Document order is preserved in both cases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
        }
    }

    /// Parses a catalog document fetched from `url`.
    pub fn from_slice(url: &str, body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|source| {
            RegistryError::InvalidBody {
                url: url.to_string(),
                source,
            }
        })?;
        Self::from_value(url, value)
    }

    fn from_value(url: &str, value: Value) -> Result<Self> {
        let invalid = |reason: String| {
            RegistryError::InvalidCatalog {
                url: url.to_string(),
                reason,
            }
        };

        let names = match value {
            Value::Array(items) => {
                items
                    .into_iter()
                    .map(|item| {
                        match item {
                            Value::String(name) => Ok(name),
                            other => {
                                Err(invalid(format!(
                                    "expected a package name, found {}",
                                    kind(&other)
                                )))
                            }
                        }
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            Value::Object(entries) => entries.into_iter().map(|(name, _)| name).collect(),
            other => {
                return Err(invalid(format!(
                    "expected an array or an object, found {}",
                    kind(&other)
                )))
            }
        };

        Ok(Self::new(names))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Names containing `term` as a case-sensitive substring, in catalog order.
    ///
    /// An empty term matches every name.
    pub fn search(&self, term: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| name.contains(term))
            .cloned()
            .collect()
    }
}

impl From<Vec<String>> for Catalog {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://a/x/all.json";

    #[test]
    fn test_parse_array_catalog() {
        let catalog = Catalog::from_slice(URL, br#"["foo","bar","foobar"]"#).unwrap();
        assert_eq!(catalog.names(), ["foo", "bar", "foobar"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("bar"));
    }

    #[test]
    fn test_parse_object_catalog_keeps_key_order() {
        let body = br#"{"zeta": {"version": "1"}, "alpha": {}, "mid": null}"#;
        let catalog = Catalog::from_slice(URL, body).unwrap();
        assert_eq!(catalog.names(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_empty_catalogs() {
        assert!(Catalog::from_slice(URL, b"[]").unwrap().is_empty());
        assert!(Catalog::from_slice(URL, b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_json() {
        let err = Catalog::from_slice(URL, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBody { .. }));
        assert!(err.is_protocol());
    }

    #[test]
    fn test_rejects_scalar_document() {
        let err = Catalog::from_slice(URL, b"42").unwrap_err();
        match err {
            RegistryError::InvalidCatalog {
                url,
                reason,
            } => {
                assert_eq!(url, URL);
                assert!(reason.contains("a number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_string_entries() {
        let err = Catalog::from_slice(URL, br#"["foo", 1]"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCatalog { .. }));
    }

    #[test]
    fn test_search_is_case_sensitive_substring() {
        let catalog = Catalog::from(vec![
            "foo".to_string(),
            "bar".to_string(),
            "foobar".to_string(),
            "Foo".to_string(),
        ]);
        assert_eq!(catalog.search("foo"), ["foo", "foobar"]);
        assert_eq!(catalog.search("oba"), ["foobar"]);
        assert!(catalog.search("baz").is_empty());
    }

    #[test]
    fn test_empty_term_matches_everything() {
        let catalog = Catalog::from(vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(catalog.search(""), ["foo", "bar"]);
    }
}
