#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Store-backed CommonJS/ESM module resolution.
//!
//! Replicates the Node-style resolution algorithm — specifier
//! classification, extension probing, `package.json` `main` and conditional
//! `exports`/`imports`, the `node_modules` ancestor walk — against a
//! [`Store`]: any hierarchical content tree keyed by absolute unix-style
//! paths, rather than a native filesystem. A sibling entry point discovers
//! platform-specific prebuilt addon binaries.
//!
//! Resolution is a pure function of (store contents, specifier, options):
//! nothing is cached, nothing is mutated, and candidate probing is strictly
//! sequential so results are deterministic even when multiple candidates
//! exist at once. Independent calls may run concurrently without
//! coordination.
//!
//! ```no_run
//! use modrive_core::{resolve, MemoryStore, ResolveOptions};
//!
//! # async fn demo() -> Result<(), modrive_core::ResolveError> {
//! let store: MemoryStore = [
//!     ("/app/node_modules/leftpad/package.json", r#"{ "main": "./index.js" }"#),
//!     ("/app/node_modules/leftpad/index.js", "module.exports = pad"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let options = ResolveOptions::new().with_basedir("/app");
//! let entry = resolve(&store, "leftpad", &options).await?;
//! assert_eq!(entry, "/app/node_modules/leftpad/index.js");
//! # Ok(())
//! # }
//! ```

pub mod addon;
pub mod descriptor;
pub mod error;
pub mod exports;
pub mod resolver;
pub mod specifier;
pub mod store;

pub use addon::resolve_addon;
pub use descriptor::{load_descriptor, PackageDescriptor};
pub use error::{codes, ResolveError};
pub use exports::{resolve_exports, resolve_imports};
pub use resolver::{resolve, resolve_checked, ResolveOptions, DEFAULT_EXTENSIONS};
pub use specifier::{classify, Specifier};
pub use store::{MemoryStore, Metadata, Store};
