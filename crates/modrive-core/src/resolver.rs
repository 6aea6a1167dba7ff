//! Module specifier resolution.
//!
//! The public entry points classify a specifier, then run the appropriate
//! candidate chain: extension probing and directory resolution for paths,
//! the `node_modules` ancestor walk for bare identifiers, imports-map lookup
//! for `#name` specifiers.
//!
//! Every chain is an ordered sequence of store probes evaluated sequentially,
//! short-circuiting on the first hit. The ordering is a guarantee, not an
//! optimization: speculative parallel probes can disagree about which of two
//! simultaneously-present candidates wins.

use bytes::Bytes;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::descriptor::load_descriptor;
use crate::error::ResolveError;
use crate::exports::{resolve_exports, resolve_imports};
use crate::specifier::{classify, Specifier};
use crate::store::{is_dir, Store};
use modrive_util::path;

/// Default extensions for probing, in order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".cjs", ".json", ".mjs"];

/// Per-call resolution configuration. Immutable once a call starts.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Extensions to probe, in order.
    pub extensions: Vec<String>,
    /// Directory specifiers resolve from.
    pub basedir: String,
    /// Active conditions for `exports`/`imports` matching.
    pub conditions: HashSet<String>,
    /// Bytes that shadow the store for exact descriptor paths.
    pub source_overwrites: HashMap<String, Bytes>,
    /// Caller-supplied imports map for `#name` specifiers, consulted before
    /// the nearest enclosing descriptor's `imports` field.
    pub imports: Option<Value>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            basedir: String::from("/"),
            conditions: HashSet::new(),
            source_overwrites: HashMap::new(),
            imports: None,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_basedir(mut self, basedir: impl Into<String>) -> Self {
        self.basedir = basedir.into();
        self
    }

    #[must_use]
    pub fn with_extensions<I, E>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.insert(condition.into());
        self
    }

    #[must_use]
    pub fn with_source_overwrite(
        mut self,
        descriptor_path: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.source_overwrites
            .insert(descriptor_path.into(), bytes.into());
        self
    }

    #[must_use]
    pub fn with_imports(mut self, imports: Value) -> Self {
        self.imports = Some(imports);
        self
    }
}

/// Resolve `specifier` to the absolute path of an existing file.
///
/// # Errors
/// `MODULE_NOT_FOUND` when every candidate chain is exhausted,
/// `INVALID_PACKAGE_MAIN` for a truthy non-string `main`, and a descriptor
/// parse error for malformed `package.json` anywhere along the way.
pub async fn resolve<S: Store>(
    store: &S,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<String, ResolveError> {
    let basedir = path::normalize(&options.basedir);
    trace!("resolving '{}' from '{}'", specifier, basedir);

    let outcome = match classify(specifier, &basedir) {
        Specifier::Absolute { path, dir_only } | Specifier::Relative { path, dir_only } => {
            resolve_path(store, &path, dir_only, specifier, options).await?
        }
        Specifier::Import { name } => {
            resolve_import(store, &name, &basedir, options).await?
        }
        Specifier::Bare {
            name,
            subpath,
            dir_only,
        } => resolve_bare(store, &name, &subpath, dir_only, &basedir, specifier, options).await?,
    };

    match outcome {
        Some(found) => {
            trace!("resolved '{}' -> '{}'", specifier, found);
            Ok(found)
        }
        None => {
            debug!("exhausted candidates for '{}' from '{}'", specifier, basedir);
            Err(ResolveError::not_found(specifier, &basedir))
        }
    }
}

/// Defensive variant of [`resolve`]: verifies up front that the base
/// directory exists in the store.
///
/// # Errors
/// `INVALID_BASE_DIRECTORY` when the base directory has no children, plus
/// everything [`resolve`] can return.
pub async fn resolve_checked<S: Store>(
    store: &S,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<String, ResolveError> {
    let basedir = path::normalize(&options.basedir);
    if !is_dir(store, &basedir).await {
        return Err(ResolveError::InvalidBaseDirectory { path: basedir });
    }
    resolve(store, specifier, options).await
}

/// Probe `stem` verbatim, then `stem` + each extension in order. First hit
/// wins; strictly sequential.
async fn probe_file<S: Store>(store: &S, stem: &str, extensions: &[String]) -> Option<String> {
    if store.entry(stem).await.is_some() {
        return Some(stem.to_string());
    }

    for ext in extensions {
        let candidate = format!("{stem}{ext}");
        if store.entry(&candidate).await.is_some() {
            return Some(candidate);
        }
    }

    None
}

/// Probe `<dir>/index` + each extension in order.
async fn probe_index<S: Store>(store: &S, dir: &str, extensions: &[String]) -> Option<String> {
    for ext in extensions {
        let candidate = path::join(dir, &format!("index{ext}"));
        if store.entry(&candidate).await.is_some() {
            return Some(candidate);
        }
    }

    None
}

/// Resolve an absolute target: file probing (unless a trailing slash forced
/// directory semantics), then directory resolution.
async fn resolve_path<S: Store>(
    store: &S,
    target: &str,
    dir_only: bool,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, ResolveError> {
    if !dir_only {
        if let Some(found) = probe_file(store, target, &options.extensions).await {
            return Ok(Some(found));
        }
    }

    resolve_directory(store, target, specifier, options).await
}

/// Resolve a directory via its descriptor: exports(`.`), then `main`, then
/// `index` probing.
async fn resolve_directory<S: Store>(
    store: &S,
    dir: &str,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, ResolveError> {
    let descriptor = load_descriptor(store, dir, Some(&options.source_overwrites)).await?;

    if let Some(descriptor) = &descriptor {
        if let Some(exports) = &descriptor.exports {
            if let Some(target) = resolve_exports(exports, ".", &options.conditions) {
                let resolved = path::resolve(dir, &target);
                if let Some(found) = probe_file(store, &resolved, &options.extensions).await {
                    return Ok(Some(found));
                }
            }
        }

        let main = descriptor.main(specifier)?.unwrap_or("index.js");
        let main_path = path::resolve(dir, main);
        if store.entry(&main_path).await.is_some() {
            return Ok(Some(main_path));
        }

        // `main` may itself name a directory.
        if let Some(found) = probe_index(store, &main_path, &options.extensions).await {
            return Ok(Some(found));
        }
    }

    Ok(probe_index(store, dir, &options.extensions).await)
}

/// Resolve a `#name` specifier through the options-level imports map, then
/// the `imports` field of the nearest enclosing descriptor.
async fn resolve_import<S: Store>(
    store: &S,
    name: &str,
    basedir: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, ResolveError> {
    if let Some(imports) = &options.imports {
        if let Some(target) = resolve_imports(imports, name, &options.conditions) {
            let resolved = path::resolve(basedir, &target);
            if let Some(found) = probe_file(store, &resolved, &options.extensions).await {
                return Ok(Some(found));
            }
        }
    }

    for dir in path::ancestors(basedir) {
        let Some(descriptor) =
            load_descriptor(store, dir, Some(&options.source_overwrites)).await?
        else {
            continue;
        };

        if let Some(imports) = &descriptor.imports {
            if let Some(target) = resolve_imports(imports, name, &options.conditions) {
                let resolved = path::resolve(dir, &target);
                return Ok(probe_file(store, &resolved, &options.extensions).await);
            }
        }

        // The nearest enclosing package decides; no match there is final.
        break;
    }

    Ok(None)
}

/// Walk the `node_modules` ancestor chain for a bare identifier, nearest
/// first.
async fn resolve_bare<S: Store>(
    store: &S,
    name: &str,
    subpath: &str,
    dir_only: bool,
    basedir: &str,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, ResolveError> {
    for ancestor in path::ancestors(basedir) {
        let candidate = path::resolve(ancestor, &format!("node_modules/{name}"));

        if subpath == "." {
            if !dir_only {
                if let Some(found) = probe_file(store, &candidate, &options.extensions).await {
                    return Ok(Some(found));
                }
            }

            if let Some(found) = resolve_directory(store, &candidate, specifier, options).await? {
                return Ok(Some(found));
            }
        } else if let Some(found) =
            resolve_package_subpath(store, &candidate, subpath, specifier, options).await?
        {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Resolve a subpath inside a candidate package directory: the exports map
/// when the descriptor has one, then the plain path fallback.
async fn resolve_package_subpath<S: Store>(
    store: &S,
    pkg_dir: &str,
    subpath: &str,
    specifier: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, ResolveError> {
    let descriptor = load_descriptor(store, pkg_dir, Some(&options.source_overwrites)).await?;

    if let Some(descriptor) = &descriptor {
        if let Some(exports) = &descriptor.exports {
            if let Some(target) = resolve_exports(exports, subpath, &options.conditions) {
                let resolved = path::resolve(pkg_dir, &target);
                if let Some(found) = probe_file(store, &resolved, &options.extensions).await {
                    return Ok(Some(found));
                }
            }
        }
    }

    let target = path::resolve(pkg_dir, subpath);
    if let Some(found) = probe_file(store, &target, &options.extensions).await {
        return Ok(Some(found));
    }

    resolve_directory(store, &target, specifier, options).await
}
