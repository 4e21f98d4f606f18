//! Resource-location helpers shared by the analyzers.

use crate::error::Result;
use camino::Utf8Path;
use walkdir::WalkDir;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Drop the namespace and normalize separators: `minecraft:a\b` -> `a/b`.
pub fn flatten(name: &str) -> String {
    name.rsplit(':').next().unwrap_or(name).replace('\\', "/")
}

/// Flattened name without its file extension.
pub fn file_stem(name: &str) -> String {
    let flat = flatten(name);
    let file_start = flat.rfind('/').map_or(0, |i| i + 1);
    match flat[file_start..].rfind('.') {
        Some(dot) if dot > 0 => flat[..file_start + dot].to_string(),
        _ => flat,
    }
}

/// Namespaced form of `name`, defaulting to `ns` (or `minecraft`).
pub fn namespaced(name: &str, ns: Option<&str>) -> String {
    let ns = match name.split_once(':') {
        Some((prefix, _)) => prefix.to_string(),
        None => ns.unwrap_or(DEFAULT_NAMESPACE).to_lowercase(),
    };
    format!("{}:{}", ns, flatten(name))
}

/// Shorthand for [`namespaced`] in the default namespace.
pub fn ns(name: &str) -> String {
    namespaced(name, None)
}

/// Whether two (possibly unnamespaced) ids denote the same thing.
pub fn same_id(a: &str, b: &str) -> bool {
    ns(a) == ns(b)
}

/// Relative paths (with `/` separators) of every file under `dir` ending in `.ext`.
///
/// Sorted; a missing directory yields an empty list.
pub fn files_with_ext(dir: &Utf8Path, ext: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let suffix = format!(".{ext}");
    let mut files = Vec::new();
    for entry in WalkDir::new(dir.as_std_path()).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir.as_std_path()) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if rel.ends_with(&suffix) {
            files.push(rel);
        }
    }
    Ok(files)
}

/// Namespaced ids of the JSON files under `dir`, `#`-prefixed for tags.
pub fn enum_json(dir: &Utf8Path, is_tag: bool) -> Result<Vec<String>> {
    let prefix = if is_tag { "#" } else { "" };
    Ok(files_with_ext(dir, "json")?
        .iter()
        .map(|rel| format!("{}{}", prefix, ns(&file_stem(rel))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_flatten() {
        assert_eq!(flatten("minecraft:chests/abandoned_mineshaft"), "chests/abandoned_mineshaft");
        assert_eq!(flatten("chests\\igloo_chest"), "chests/igloo_chest");
        assert_eq!(flatten("stone"), "stone");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("entities/zombie.json"), "entities/zombie");
        assert_eq!(file_stem("a.b/c"), "a.b/c");
        assert_eq!(file_stem("minecraft:gameplay/fishing.json"), "gameplay/fishing");
    }

    #[test]
    fn test_namespaced() {
        assert_eq!(ns("stone"), "minecraft:stone");
        assert_eq!(ns("custom:thing"), "custom:thing");
        assert_eq!(namespaced("block/stone", Some("Realms")), "realms:block/stone");
        assert!(same_id("minecraft:item", "item"));
        assert!(!same_id("tag", "item"));
    }

    #[test]
    fn test_enum_json_sorted_and_tagged() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("zeta.json"), "{}").unwrap();
        std::fs::write(root.join("sub/alpha.json"), "{}").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();

        assert_eq!(
            enum_json(&root, false).unwrap(),
            vec!["minecraft:sub/alpha", "minecraft:zeta"]
        );
        assert_eq!(enum_json(&root, true).unwrap()[1], "#minecraft:zeta");
        assert!(enum_json(&root.join("missing"), false).unwrap().is_empty());
    }
}
