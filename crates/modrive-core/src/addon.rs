//! Native addon / prebuild discovery.
//!
//! Locates the platform-specific binary artifact for the package enclosing a
//! base directory. The host identifier (`"<platform>-<arch>"` or a finer
//! triplet) is always supplied by the caller; this module never inspects the
//! runtime environment.

use tracing::trace;

use crate::descriptor::load_descriptor;
use crate::error::ResolveError;
use crate::store::Store;
use modrive_util::path;

/// Resolve the prebuilt addon binary for the package enclosing `basedir`.
///
/// Ascends from `basedir` (inclusive) to the root; the first descriptor
/// found supplies `name`/`version` and the walk stops there. From that
/// directory, candidates are probed in order:
///
/// 1. `prebuilds/<host>/<name>.bare`
/// 2. `prebuilds/<host>/<name>@<version>.bare`
/// 3. `prebuilds/<host>/<name>.node`
/// 4. `prebuilds/<host>/<name>@<version>.node`
///
/// Versioned forms are skipped when the descriptor has no `version`. A
/// missing prebuild is `Ok(None)` — addon lookup is typically optional at
/// the call site — but a malformed descriptor is still fatal.
pub async fn resolve_addon<S: Store>(
    store: &S,
    basedir: &str,
    host: &str,
) -> Result<Option<String>, ResolveError> {
    let basedir = path::normalize(basedir);
    trace!("resolving addon for '{}' on host '{}'", basedir, host);

    for dir in path::ancestors(&basedir) {
        let Some(descriptor) = load_descriptor(store, dir, None).await? else {
            continue;
        };

        let Some(name) = descriptor.name.as_deref() else {
            return Ok(None);
        };

        for candidate in prebuild_candidates(name, descriptor.version.as_deref(), host) {
            let candidate = path::resolve(dir, &candidate);
            if store.entry(&candidate).await.is_some() {
                trace!("found prebuild '{}'", candidate);
                return Ok(Some(candidate));
            }
        }

        // The nearest descriptor decides; the walk never continues past it.
        return Ok(None);
    }

    Ok(None)
}

fn prebuild_candidates(name: &str, version: Option<&str>, host: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(4);

    for ext in ["bare", "node"] {
        candidates.push(format!("./prebuilds/{host}/{name}.{ext}"));
        if let Some(version) = version {
            candidates.push(format!("./prebuilds/{host}/{name}@{version}.{ext}"));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let candidates = prebuild_candidates("x", Some("1.0.0"), "linux-x64");
        assert_eq!(
            candidates,
            vec![
                "./prebuilds/linux-x64/x.bare",
                "./prebuilds/linux-x64/x@1.0.0.bare",
                "./prebuilds/linux-x64/x.node",
                "./prebuilds/linux-x64/x@1.0.0.node",
            ]
        );
    }

    #[test]
    fn test_candidates_without_version() {
        let candidates = prebuild_candidates("x", None, "darwin-arm64");
        assert_eq!(
            candidates,
            vec![
                "./prebuilds/darwin-arm64/x.bare",
                "./prebuilds/darwin-arm64/x.node",
            ]
        );
    }
}
