//! UTF-8 URI helpers
//!
//! Database URIs are `/`-separated and relative to the music root. Playlist
//! entries may also carry absolute paths or URLs.

/// Does the URI start with a scheme such as `http://` or `mpd://`?
pub fn has_scheme(uri: &str) -> bool {
    let Some(pos) = uri.find("://") else {
        return false;
    };

    let scheme = &uri[..pos];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

pub fn is_absolute(uri: &str) -> bool {
    uri.starts_with('/')
}

/// URIs that are not relative to a directory in the tree
pub fn is_absolute_or_has_scheme(uri: &str) -> bool {
    is_absolute(uri) || has_scheme(uri)
}

/// Join two path segments with a single `/`; an empty side yields the other
pub fn build(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }

    let mut result = String::with_capacity(a.len() + b.len() + 1);
    result.push_str(a.trim_end_matches('/'));
    result.push('/');
    result.push_str(b);
    result
}

/// Split at the last `/` into the parent part and the base name
pub fn split_parent(uri: &str) -> (Option<&str>, &str) {
    match uri.rfind('/') {
        Some(pos) => (Some(&uri[..pos]), &uri[pos + 1..]),
        None => (None, uri),
    }
}
