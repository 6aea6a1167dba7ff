//! Specifier classification.
//!
//! Pure string analysis: a specifier is classified by its first characters
//! and never touches the store. Path-shaped specifiers are pre-joined against
//! the base directory here so downstream code only sees absolute paths.

use modrive_util::path;

/// A classified module specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Began with `/`.
    Absolute {
        /// Normalized absolute target.
        path: String,
        /// Trailing `/` on the input: directory semantics win even if a
        /// same-named file exists.
        dir_only: bool,
    },
    /// Began with `.`; already joined against the base directory.
    Relative { path: String, dir_only: bool },
    /// Began with `#`: a subpath import resolved through an imports map.
    Import { name: String },
    /// A bare package identifier, optionally scope-prefixed.
    Bare {
        /// Package name (`lodash`, `@scope/pkg`).
        name: String,
        /// Package-relative subpath in exports form: `"."` or `"./x"`.
        subpath: String,
        dir_only: bool,
    },
}

/// Classify `specifier` against `basedir`. Always succeeds.
#[must_use]
pub fn classify(specifier: &str, basedir: &str) -> Specifier {
    let dir_only = specifier.len() > 1 && specifier.ends_with('/');

    if specifier.starts_with('/') {
        return Specifier::Absolute {
            path: path::normalize(specifier),
            dir_only,
        };
    }

    if specifier.starts_with('.') {
        return Specifier::Relative {
            path: path::resolve(basedir, specifier),
            dir_only,
        };
    }

    if specifier.starts_with('#') {
        return Specifier::Import {
            name: specifier.to_string(),
        };
    }

    let trimmed = specifier.trim_end_matches('/');
    let (name, subpath) = split_bare(trimmed);
    Specifier::Bare {
        name: name.to_string(),
        subpath: match subpath {
            Some(sub) => format!("./{sub}"),
            None => String::from("."),
        },
        dir_only,
    }
}

/// Split a bare specifier into package name and optional subpath.
///
/// Scoped packages keep their first two segments: `@scope/pkg/sub` splits as
/// (`@scope/pkg`, `sub`).
fn split_bare(spec: &str) -> (&str, Option<&str>) {
    if spec.starts_with('@') {
        let mut slashes = 0;
        for (idx, ch) in spec.char_indices() {
            if ch == '/' {
                slashes += 1;
                if slashes == 2 {
                    return (&spec[..idx], Some(&spec[idx + 1..]));
                }
            }
        }
        return (spec, None);
    }

    match spec.find('/') {
        Some(idx) => (&spec[..idx], Some(&spec[idx + 1..])),
        None => (spec, None),
    }
}
