use camino::{Utf8Path, Utf8PathBuf};
use mcgd_listing::{Error, ListingBuilder};
use std::collections::BTreeMap;
use tempfile::TempDir;
use walkdir::WalkDir;

fn tree() -> (TempDir, Utf8PathBuf) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

fn write(root: &Utf8Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(root: &Utf8Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

/// Every file under `lists/`, keyed by relative path.
fn snapshot(root: &Utf8Path) -> BTreeMap<String, Vec<u8>> {
    let lists = root.join("lists");
    WalkDir::new(lists.as_std_path())
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(lists.as_std_path()).unwrap();
            (rel.to_string_lossy().into_owned(), std::fs::read(e.path()).unwrap())
        })
        .collect()
}

/// A small modern tree: reports, data with a datapack overlay, and assets.
fn sample_tree(root: &Utf8Path) {
    write(
        root,
        "data/minecraft/loot_table/chests/sample.json",
        r#"{"type": "minecraft:chest", "pools": [
            {"rolls": 1, "entries": [{"type": "minecraft:empty", "weight": 1}]},
            {"rolls": {"min": 1, "max": 3}, "entries": [
                {"type": "minecraft:item", "name": "minecraft:stone", "weight": 1},
                {"type": "minecraft:item", "name": "minecraft:dirt", "weight": 3}
            ]}
        ]}"#,
    );
    write(
        root,
        "reports/registries.json",
        r#"{"minecraft:item": {"entries": {"minecraft:stone": {"protocol_id": 1}, "minecraft:dirt": {"protocol_id": 2}}}}"#,
    );
    write(
        root,
        "reports/blocks.json",
        r#"{"minecraft:stone": {"definition": {"type": "minecraft:block", "properties": {}},
            "states": [{"id": 1, "default": true}]}}"#,
    );
    write(
        root,
        "reports/commands.json",
        r#"{"type": "root", "children": {
            "seed": {"type": "literal", "executable": true, "permission_level": 2}
        }}"#,
    );
    write(root, "data/minecraft/tags/item/stones.json", r#"{"values": ["minecraft:x", "minecraft:y"]}"#);
    write(
        root,
        "data/minecraft/datapacks/bundle/data/minecraft/tags/item/stones.json",
        r#"{"values": ["minecraft:y", {"id": "minecraft:z", "required": false}]}"#,
    );
    write(root, "data/minecraft/datapacks/bundle/pack.mcmeta", "{}");
    write(
        root,
        "data/minecraft/advancement/story/root.json",
        r#"{"display": {"icon": {"id": "minecraft:grass_block"},
            "title": {"translate": "advancements.story.root.title"}, "description": "The heart"}}"#,
    );
    write(
        root,
        "assets/minecraft/lang/en_us.json",
        r#"{"advancements.story.root.title": "Minecraft"}"#,
    );
}

#[test]
fn test_loot_table_csv() {
    let (_dir, root) = tree();
    sample_tree(&root);

    ListingBuilder::new(root.clone()).build().unwrap();

    assert_eq!(
        read(&root, "lists/loot_tables/chests/sample.csv"),
        [
            r#""Name","Count","Chance (%)","Weight","Comment""#,
            r#""1 time","--","--","--","""#,
            r#""empty","","100","1","""#,
            r#""","","","","""#,
            r#""1 to 3 time","--","--","--","""#,
            r#""minecraft:stone","1","25","1/4","""#,
            r#""minecraft:dirt","1","75","3/4","""#,
            "",
        ]
        .join("\n")
    );
    assert_eq!(
        read(&root, "lists/loot_tables/chests/sample.txt"),
        "empty\n\nminecraft:stone\nminecraft:dirt\n"
    );
    assert!(root.join("lists/loot_tables/chests/sample.md").is_file());
}

#[test]
fn test_full_build() {
    let (_dir, root) = tree();
    sample_tree(&root);

    let result = ListingBuilder::new(root.clone()).build().unwrap();
    assert!(result.written > 10);

    assert_eq!(read(&root, "lists/datapacks.txt"), "minecraft:bundle\n");
    assert_eq!(
        read(&root, "lists/tags/item/stones.txt"),
        "minecraft:x\nminecraft:y\nminecraft:z\n"
    );
    assert_eq!(
        read(&root, "lists/item.txt"),
        "minecraft:dirt\nminecraft:stone\n#minecraft:stones\n"
    );
    assert_eq!(read(&root, "lists/commands/seed.txt"), "[permission level 2]\nseed\n");
    assert_eq!(read(&root, "lists/advancements.txt"), "minecraft:story/root\n");

    let tree: serde_json::Value =
        serde_json::from_str(&read(&root, "lists/advancements.tree.json")).unwrap();
    assert_eq!(tree["minecraft:story/root"]["title"], "Minecraft");

    for (path, content) in snapshot(&root) {
        let text = String::from_utf8(content).unwrap();
        if text.is_empty() {
            continue;
        }
        assert!(text.ends_with('\n'), "{path} lacks a final newline");
        assert!(!text.ends_with("\n\n"), "{path} ends with a blank line");
        assert!(!text.contains('\r'), "{path} has CR line endings");
    }
}

#[test]
fn test_rebuild_is_deterministic() {
    let (_dir, root) = tree();
    sample_tree(&root);

    ListingBuilder::new(root.clone()).build().unwrap();
    let first = snapshot(&root);
    ListingBuilder::new(root.clone()).build().unwrap();

    assert_eq!(first, snapshot(&root));
}

#[test]
fn test_unknown_loot_function_fails_build() {
    let (_dir, root) = tree();
    write(
        &root,
        "data/minecraft/loot_table/entities/odd.json",
        r#"{"pools": [{"rolls": 1, "entries": [{"type": "minecraft:item", "name": "minecraft:stone",
            "functions": [{"function": "minecraft:teleport_item"}]}]}]}"#,
    );

    let err = ListingBuilder::new(root).build().unwrap_err();
    match err {
        Error::Schema { category, file, .. } => {
            assert_eq!(category, "loot_tables");
            assert_eq!(file, "entities/odd");
        }
        other => panic!("expected a schema error, got {other}"),
    }
}
