//! Package descriptor (`package.json`) loading.
//!
//! Descriptors are loaded fresh on every resolution that needs one; the core
//! is deliberately stateless and callers wrap the store if they want caching.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ResolveError;
use crate::store::Store;
use modrive_util::path;

/// Parsed `package.json` fields relevant to resolution. Everything else in
/// the document is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Kept raw: `null`/`false`/`""` mean "absent", other non-strings are a
    /// policy error surfaced by [`PackageDescriptor::main`].
    #[serde(default)]
    pub main: Option<Value>,
    pub exports: Option<Value>,
    pub imports: Option<Value>,
}

impl PackageDescriptor {
    /// The `main` entry, validated.
    ///
    /// Returns `Ok(None)` when `main` is absent or falsy (`null`, `false`,
    /// `""`), `Ok(Some(_))` for a usable string, and `InvalidPackageMain`
    /// naming `specifier` for any other shape.
    pub fn main(&self, specifier: &str) -> Result<Option<&str>, ResolveError> {
        match &self.main {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ResolveError::invalid_main(specifier)),
        }
    }
}

/// Load the descriptor for `dir`, honoring source overwrites.
///
/// An overwrite entry for `<dir>/package.json` shadows the store for that
/// exact path. A missing descriptor is `Ok(None)`; malformed JSON from either
/// source is fatal.
pub async fn load_descriptor<S: Store>(
    store: &S,
    dir: &str,
    overwrites: Option<&HashMap<String, Bytes>>,
) -> Result<Option<PackageDescriptor>, ResolveError> {
    let descriptor_path = path::join(dir, "package.json");

    let bytes = match overwrites.and_then(|map| map.get(&descriptor_path)) {
        Some(overwrite) => overwrite.clone(),
        None => match store.entry(&descriptor_path).await {
            Some(_) => match store.get(&descriptor_path).await {
                Some(bytes) => bytes,
                None => return Ok(None),
            },
            None => return Ok(None),
        },
    };

    let descriptor =
        serde_json::from_slice(&bytes).map_err(|source| ResolveError::DescriptorParse {
            path: descriptor_path,
            source,
        })?;

    Ok(Some(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn store_with_pkg(pkg: &Value) -> MemoryStore {
        [("/pkg/package.json", pkg.to_string())].into_iter().collect()
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = MemoryStore::new();
        let loaded = load_descriptor(&store, "/pkg", None).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_parses_fields() {
        let store = store_with_pkg(&json!({
            "name": "demo",
            "version": "2.1.0",
            "main": "./lib/index.js",
            "exports": { ".": "./lib/index.js" }
        }));

        let desc = load_descriptor(&store, "/pkg", None).await.unwrap().unwrap();
        assert_eq!(desc.name.as_deref(), Some("demo"));
        assert_eq!(desc.version.as_deref(), Some("2.1.0"));
        assert_eq!(desc.main("demo").unwrap(), Some("./lib/index.js"));
        assert!(desc.exports.is_some());
        assert!(desc.imports.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal() {
        let store: MemoryStore = [("/pkg/package.json", "{ not json")].into_iter().collect();

        let err = load_descriptor(&store, "/pkg", None).await.unwrap_err();
        assert_eq!(err.code(), crate::error::codes::DESCRIPTOR_PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_overwrite_shadows_store() {
        let store = store_with_pkg(&json!({ "main": "./store.js" }));

        let mut overwrites = HashMap::new();
        overwrites.insert(
            "/pkg/package.json".to_string(),
            Bytes::from(json!({ "main": "./overwrite.js" }).to_string()),
        );

        let desc = load_descriptor(&store, "/pkg", Some(&overwrites))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(desc.main("pkg").unwrap(), Some("./overwrite.js"));
    }

    #[tokio::test]
    async fn test_overwrite_works_without_store_entry() {
        let store = MemoryStore::new();

        let mut overwrites = HashMap::new();
        overwrites.insert(
            "/virtual/package.json".to_string(),
            Bytes::from(json!({ "name": "virtual" }).to_string()),
        );

        let desc = load_descriptor(&store, "/virtual", Some(&overwrites))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(desc.name.as_deref(), Some("virtual"));
    }

    #[test]
    fn test_main_policy() {
        let ok = |value: Value| PackageDescriptor {
            main: Some(value),
            ..Default::default()
        };

        assert_eq!(ok(json!(null)).main("p").unwrap(), None);
        assert_eq!(ok(json!(false)).main("p").unwrap(), None);
        assert_eq!(ok(json!("")).main("p").unwrap(), None);
        assert_eq!(ok(json!("lib")).main("p").unwrap(), Some("lib"));

        for invalid in [json!(true), json!(42), json!(["a"]), json!({"x": 1})] {
            let err = ok(invalid).main("./invalid_main").unwrap_err();
            assert_eq!(err.code(), crate::error::codes::INVALID_PACKAGE_MAIN);
        }
    }
}
