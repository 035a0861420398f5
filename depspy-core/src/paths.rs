//! Id and path helpers shared by the tree builder and the renderer.

/// Recover the graph id from a tree id minted as `"{graph_id}-{count}"`.
///
/// Graph ids may themselves contain `-`; only the last segment is stripped.
/// An id without any `-` is returned unchanged.
pub fn graph_id_from_tree_id(tree_id: &str) -> &str {
    match tree_id.rsplit_once('-') {
        Some((graph_id, _)) => graph_id,
        None => tree_id,
    }
}

/// Mint the tree id for the `occurrence`-th appearance of a graph id.
pub fn tree_id(graph_id: &str, occurrence: usize) -> String {
    format!("{graph_id}-{occurrence}")
}

/// Short label for a module path.
///
/// Index files are shown together with their directory (`button/index.ts`)
/// since the bare file name says nothing. Other paths show their last
/// segment. Paths without a separator are returned as they are.
pub fn display_name(path: &str) -> String {
    let Some((head, last)) = path.rsplit_once('/') else {
        return path.to_string();
    };

    if let Some(ext) = last.strip_prefix("index.") {
        if !ext.is_empty() {
            if let Some((_, dir)) = head.rsplit_once('/') {
                if !dir.is_empty() {
                    return format!("{dir}/{last}");
                }
            }
        }
    }

    if last.is_empty() {
        path.to_string()
    } else {
        last.to_string()
    }
}
