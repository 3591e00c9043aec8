//! Site address normalization
//!
//! Configured site addresses arrive in several deployment shapes: bare
//! hostnames, addresses that already include a REST prefix, Data Center
//! context paths, trailing slashes. Every address funnels through here
//! before a gateway is built, so request URLs are assembled from exactly
//! one canonical root form.

/// Default to https when no scheme is given.
///
/// An explicit `http://` prefix is honored for local test instances.
/// Trailing slashes are stripped either way; empty input stays empty.
pub fn ensure_secure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.trim_end_matches('/').to_string();
    }

    format!("https://{}", trimmed.trim_end_matches('/'))
}

/// Canonical root for a service address.
///
/// Suffixes are tried in order and only the first match is stripped, so
/// lists must be ordered most specific first. A context path that is not a
/// known suffix survives untouched.
pub fn normalize_root(raw: &str, known_suffixes: &[&str]) -> String {
    let mut root = ensure_secure_scheme(raw);
    if root.is_empty() {
        return root;
    }

    for suffix in known_suffixes {
        if let Some(stripped) = root.strip_suffix(suffix) {
            root = stripped.trim_end_matches('/').to_string();
            break;
        }
    }

    root
}

/// Join a root, a service API prefix, and path segments into a request URL.
///
/// Segments that are empty after slash trimming are skipped entirely, so a
/// blank segment never produces a double slash.
pub fn build_path(root: &str, api_prefix: &str, segments: &[&str]) -> String {
    let mut path = String::new();
    path.push_str(root.trim_end_matches('/'));
    path.push_str(api_prefix.trim_end_matches('/'));

    for segment in segments {
        let trimmed = segment.trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(trimmed);
    }

    path
}
