use crate::{ClusterError, ClusterNode};
use std::fs;
use std::path::Path;
use tracing::info;

/// Renders a cluster tree as pretty printed JSON with a two space indent.
///
/// Each node emits its keys in the order `name`, `preview`, `size`, `x`, `y`, `radius`,
/// `children`, leaving out those that are unset. Terminal nodes never emit `children`. Equal
/// trees always render to identical text.
///
/// # Examples
/// ```
/// use photospheres::{to_json, ClusterNode};
///
/// let mut root = ClusterNode::new(1);
/// let mut leaf = ClusterNode::new(1);
/// leaf.name = Some(String::from("a.png"));
/// root.children = Some(vec![leaf]);
///
/// let expected = r#"{
///   "size": 1,
///   "children": [
///     {
///       "name": "a.png",
///       "size": 1
///     }
///   ]
/// }"#;
/// assert_eq!(expected, to_json(&root).unwrap());
/// ```
pub fn to_json(root: &ClusterNode) -> Result<String, ClusterError> {
    root.check_sizes()?;
    Ok(serde_json::to_string_pretty(root)?)
}

/// Writes the JSON rendering of `root` to `path`, followed by a newline. Missing parent
/// directories are created.
pub fn write_json(root: &ClusterNode, path: impl AsRef<Path>) -> Result<(), ClusterError> {
    let path = path.as_ref();
    let mut document = to_json(root)?;
    document.push('\n');
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)?;
    info!(path = %path.display(), "wrote cluster tree");
    Ok(())
}
