//! Resolution of hrefs found in resource markup.

use percent_encoding::percent_decode_str;

/// Resolve `href` relative to the resource located at `base`.
///
/// Absolute URLs, `data:` URIs and root-absolute paths are returned
/// unchanged. Relative paths are joined to the directory of `base`, with
/// `.` and `..` segments collapsed, and percent-decoded.
///
/// ```
/// use lectern::href::resolve_href;
///
/// assert_eq!(resolve_href("/dir/res.xhtml", "image.png"), "/dir/image.png");
/// assert_eq!(resolve_href("/dir/res.xhtml", "../cover.jpg"), "/cover.jpg");
/// ```
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.contains("://") || href.starts_with("data:") || href.starts_with('/') {
        return href.to_string();
    }

    // Fragments and queries of the base never take part in resolution
    let base = base.split(['#', '?']).next().unwrap_or_default();
    let base_dir = match base.rfind('/') {
        Some(pos) => &base[..=pos],
        None => "",
    };

    let (path, suffix) = match href.find(['#', '?']) {
        Some(pos) => href.split_at(pos),
        None => (href, ""),
    };

    let absolute = base_dir.starts_with('/');
    let mut components: Vec<&str> = Vec::new();
    for component in base_dir.split('/').chain(path.split('/')) {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            name => components.push(name),
        }
    }

    let mut resolved = if absolute {
        String::from("/")
    } else {
        String::new()
    };
    resolved.push_str(&components.join("/"));
    if path.ends_with('/') && !components.is_empty() {
        resolved.push('/');
    }

    let mut resolved = percent_decode_str(&resolved).decode_utf8_lossy().into_owned();
    resolved.push_str(suffix);
    resolved
}
