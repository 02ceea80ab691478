//! Image reference helpers
//!
//! References look like `name[:tag]` or `name@digest`, where `name` may carry
//! a registry host (`ghcr.io/org/app`, `localhost:5000/app`).

/// Marker the runtime reports for containers whose image was removed
pub const NO_IMAGE_SENTINEL: &str = "<none>";

/// Prefixes of images that live in a local registry
pub const LOCAL_REGISTRY_PREFIXES: &[&str] = &["localhost/", "local/"];

/// Substring that marks an image as locally built
pub const BUILD_MARKER: &str = "build";

pub const LATEST_TAG: &str = "latest";

/// Namespace of official Docker Hub images
pub const OFFICIAL_NAMESPACE: &str = "library";

const DOCKER_HUB_HOSTS: &[&str] = &["docker.io/", "index.docker.io/", "registry-1.docker.io/"];

/// Returns the reference without its `@digest` suffix
fn strip_digest(reference: &str) -> &str {
    reference
        .split_once('@')
        .map_or(reference, |(name, _)| name)
}

/// Splits `name[:tag]` into name and tag, ignoring colons of a registry port
fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let name = strip_digest(reference);
    match name.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, Some(tag)),
        _ => (name, None),
    }
}

/// Extracts the tag of a reference, defaulting to "latest"
pub fn extract_tag(reference: &str) -> String {
    match split_tag(reference) {
        (_, Some(tag)) if !tag.is_empty() => tag.to_string(),
        _ => LATEST_TAG.to_string(),
    }
}

/// Derives the namespaced repository path used by the tag-listing endpoint
///
/// Official images get the `library/` namespace and Docker Hub hosts are dropped.
/// Returns `None` when the reference has no name.
pub fn repository_path(reference: &str) -> Option<String> {
    let (name, _) = split_tag(reference);
    let name = DOCKER_HUB_HOSTS
        .iter()
        .find_map(|host| name.strip_prefix(host))
        .unwrap_or(name);

    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        Some(name.to_string())
    } else {
        Some(format!("{}/{}", OFFICIAL_NAMESPACE, name))
    }
}

/// Returns true if the reference points at a dangling or removed image
pub fn is_dangling(reference: &str) -> bool {
    reference.contains(NO_IMAGE_SENTINEL)
}

/// Returns true if the reference is served by a local registry
pub fn is_local_registry(reference: &str) -> bool {
    LOCAL_REGISTRY_PREFIXES
        .iter()
        .any(|prefix| reference.starts_with(prefix))
}

/// Returns true if the reference looks like a locally built image
pub fn looks_locally_built(reference: &str) -> bool {
    reference.contains(BUILD_MARKER)
}

/// Returns true if the reference matches an exclusion pattern
///
/// A pattern matches the full reference, the reference without its tag,
/// or, when it ends with `*`, any reference starting with the prefix.
pub fn matches_pattern(reference: &str, pattern: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        return reference.starts_with(prefix);
    }

    let (name, _) = split_tag(reference);
    reference == pattern || name == pattern
}
