//! Prebuild discovery over an in-memory store.

use modrive_core::{codes, resolve_addon, MemoryStore};
use serde_json::json;

const HOST: &str = "linux-x64";

fn package(dir: &str, name: &str, version: &str) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.put(
        &format!("{dir}/package.json"),
        json!({ "name": name, "version": version }).to_string(),
    );
    store
}

#[tokio::test]
async fn finds_versioned_bare_prebuild() {
    let mut store = package("/bare-prebuilds", "bare-prebuilds", "1.0.0");
    store.put(
        "/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds@1.0.0.bare",
        "\0",
    );

    let result = resolve_addon(&store, "/bare-prebuilds", HOST).await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds@1.0.0.bare")
    );
}

#[tokio::test]
async fn finds_unversioned_bare_prebuild() {
    let mut store = package("/bare-prebuilds", "bare-prebuilds", "1.0.0");
    store.put("/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds.bare", "\0");

    let result = resolve_addon(&store, "/bare-prebuilds", HOST).await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds.bare")
    );
}

#[tokio::test]
async fn finds_node_prebuilds() {
    let mut store = package("/node-prebuilds", "node-prebuilds", "1.0.0");
    store.put(
        "/node-prebuilds/prebuilds/linux-x64/node-prebuilds@1.0.0.node",
        "\0",
    );

    let result = resolve_addon(&store, "/node-prebuilds", HOST).await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/node-prebuilds/prebuilds/linux-x64/node-prebuilds@1.0.0.node")
    );

    let mut store = package("/node-prebuilds", "node-prebuilds", "1.0.0");
    store.put("/node-prebuilds/prebuilds/linux-x64/node-prebuilds.node", "\0");

    let result = resolve_addon(&store, "/node-prebuilds", HOST).await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/node-prebuilds/prebuilds/linux-x64/node-prebuilds.node")
    );
}

#[tokio::test]
async fn bare_extension_wins_over_node() {
    let mut store = package("/pkg", "pkg", "2.0.0");
    store.put("/pkg/prebuilds/linux-x64/pkg@2.0.0.node", "\0");
    store.put("/pkg/prebuilds/linux-x64/pkg@2.0.0.bare", "\0");

    let result = resolve_addon(&store, "/pkg", HOST).await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/pkg/prebuilds/linux-x64/pkg@2.0.0.bare")
    );
}

#[tokio::test]
async fn unversioned_candidate_probed_first() {
    let mut store = package("/pkg", "pkg", "2.0.0");
    store.put("/pkg/prebuilds/linux-x64/pkg.bare", "\0");
    store.put("/pkg/prebuilds/linux-x64/pkg@2.0.0.bare", "\0");

    let result = resolve_addon(&store, "/pkg", HOST).await.unwrap();
    assert_eq!(result.as_deref(), Some("/pkg/prebuilds/linux-x64/pkg.bare"));
}

#[tokio::test]
async fn walks_ancestors_to_enclosing_package() {
    let mut store = package("/bare-prebuilds", "bare-prebuilds", "1.0.0");
    store.put(
        "/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds@1.0.0.bare",
        "\0",
    );

    let result = resolve_addon(&store, "/bare-prebuilds/child/path", HOST)
        .await
        .unwrap();
    assert_eq!(
        result.as_deref(),
        Some("/bare-prebuilds/prebuilds/linux-x64/bare-prebuilds@1.0.0.bare")
    );
}

#[tokio::test]
async fn stops_at_nearest_descriptor() {
    // The inner package has no prebuilds; the walk must not reach the outer
    // package that does.
    let mut store = MemoryStore::new();
    store.put(
        "/outer/package.json",
        json!({ "name": "outer", "version": "1.0.0" }).to_string(),
    );
    store.put("/outer/prebuilds/linux-x64/outer.bare", "\0");
    store.put(
        "/outer/inner/package.json",
        json!({ "name": "inner", "version": "1.0.0" }).to_string(),
    );

    let result = resolve_addon(&store, "/outer/inner", HOST).await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn missing_descriptor_is_none() {
    let store = MemoryStore::new();
    let result = resolve_addon(&store, "/anywhere/at/all", HOST).await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn missing_prebuild_is_none() {
    let store = package("/pkg", "pkg", "1.0.0");
    let result = resolve_addon(&store, "/pkg", HOST).await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn descriptor_without_version_still_matches_unversioned() {
    let mut store = MemoryStore::new();
    store.put("/pkg/package.json", json!({ "name": "pkg" }).to_string());
    store.put("/pkg/prebuilds/linux-x64/pkg.bare", "\0");

    let result = resolve_addon(&store, "/pkg", HOST).await.unwrap();
    assert_eq!(result.as_deref(), Some("/pkg/prebuilds/linux-x64/pkg.bare"));
}

#[tokio::test]
async fn malformed_descriptor_is_fatal() {
    let mut store = MemoryStore::new();
    store.put("/pkg/package.json", "not json at all");

    let err = resolve_addon(&store, "/pkg", HOST).await.unwrap_err();
    assert_eq!(err.code(), codes::DESCRIPTOR_PARSE_ERROR);
}

#[tokio::test]
async fn host_is_caller_supplied() {
    // Nothing reads the ambient platform: the same store answers differently
    // for different host identifiers.
    let mut store = package("/pkg", "pkg", "1.0.0");
    store.put("/pkg/prebuilds/darwin-arm64/pkg.bare", "\0");

    assert_eq!(resolve_addon(&store, "/pkg", "linux-x64").await.unwrap(), None);
    assert_eq!(
        resolve_addon(&store, "/pkg", "darwin-arm64")
            .await
            .unwrap()
            .as_deref(),
        Some("/pkg/prebuilds/darwin-arm64/pkg.bare")
    );
}
