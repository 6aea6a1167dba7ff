//! Store adapter interface.
//!
//! The resolver never touches a native filesystem. It issues read/existence
//! queries against a [`Store`]: a hierarchical namespace keyed by absolute
//! unix-style paths, typically backed by a versioned or content-addressed
//! tree. Every operation is a suspension point; backends own pooling,
//! coalescing, and cancellation.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::future::Future;

use modrive_util::path;

/// Metadata for a file entry in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Size of the entry's contents in bytes.
    pub size: u64,
}

/// Read-only access to a hierarchical content store.
///
/// Only files have entries; directories exist implicitly as common prefixes
/// and are observed through [`Store::readdir`].
pub trait Store: Send + Sync {
    /// Existence check: metadata for the file at `path`, or `None` if absent.
    fn entry(&self, path: &str) -> impl Future<Output = Option<Metadata>> + Send;

    /// Read the full contents of the file at `path`, or `None` if absent.
    fn get(&self, path: &str) -> impl Future<Output = Option<Bytes>> + Send;

    /// Names of the direct children of the directory at `path`.
    ///
    /// The resolver only uses this to test whether a directory has any
    /// children; backends with huge directories may return a truncated list.
    fn readdir(&self, path: &str) -> impl Future<Output = Vec<String>> + Send;
}

/// Whether `path` exists as a directory, i.e. has at least one child.
pub(crate) async fn is_dir<S: Store>(store: &S, path: &str) -> bool {
    !store.readdir(path).await.is_empty()
}

/// In-memory [`Store`] over a sorted path → contents map.
///
/// The reference backend for tests and embedders that assemble module trees
/// programmatically. Paths are normalized on insert.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, Bytes>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous contents at that path.
    pub fn put(&mut self, path: &str, contents: impl Into<Bytes>) {
        self.files.insert(path::normalize(path), contents.into());
    }

    /// Remove a file. Returns the previous contents, if any.
    pub fn remove(&mut self, path: &str) -> Option<Bytes> {
        self.files.remove(&path::normalize(path))
    }
}

impl<P: AsRef<str>, B: Into<Bytes>> FromIterator<(P, B)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (P, B)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (p, b) in iter {
            store.put(p.as_ref(), b);
        }
        store
    }
}

impl Store for MemoryStore {
    fn entry(&self, path: &str) -> impl Future<Output = Option<Metadata>> + Send {
        let meta = self.files.get(path).map(|bytes| Metadata {
            size: bytes.len() as u64,
        });
        async move { meta }
    }

    fn get(&self, path: &str) -> impl Future<Output = Option<Bytes>> + Send {
        let contents = self.files.get(path).cloned();
        async move { contents }
    }

    fn readdir(&self, path: &str) -> impl Future<Output = Vec<String>> + Send {
        let prefix = if path == "/" {
            String::from("/")
        } else {
            format!("{path}/")
        };

        let mut names: Vec<String> = Vec::new();
        for (key, _) in self.files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            let name = rest.split('/').next().unwrap_or(rest);
            if names.last().map(String::as_str) != Some(name) {
                names.push(name.to_string());
            }
        }

        async move { names }
    }
}
