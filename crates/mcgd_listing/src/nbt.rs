//! Structure files and SNBT text.
//!
//! Structure templates are gzip-compressed binary NBT. They are rewritten as
//! indented SNBT so that structure changes show up in text diffs. Compound
//! keys are sorted, so the same structure always produces the same text.

use crate::error::{Error, Result};
use camino::Utf8Path;
use quartz_nbt::io::{read_nbt, Flavor};
use quartz_nbt::{NbtCompound, NbtTag};
use std::fs::File;
use std::io::BufReader;

const INDENT: &str = "  ";

/// Read a gzip-compressed NBT file.
pub fn read_structure(path: &Utf8Path) -> Result<NbtCompound> {
    let mut reader = BufReader::new(File::open(path)?);
    let (root, _) = read_nbt(&mut reader, Flavor::GzCompressed).map_err(|source| Error::Nbt {
        path: path.to_owned(),
        source,
    })?;
    Ok(root)
}

/// Parse an SNBT compound such as a `set_nbt` tag.
pub fn parse_snbt(text: &str) -> Option<NbtCompound> {
    match quartz_nbt::snbt::parse(text) {
        Ok(compound) => Some(compound),
        Err(err) => {
            tracing::warn!("Unreadable SNBT '{}': {}", text, err);
            None
        }
    }
}

/// Indented SNBT for a compound, without a final newline.
///
/// A compound or list spans several lines when it holds a non-empty compound
/// or list, and stays on one line otherwise.
pub fn to_snbt(root: &NbtCompound) -> String {
    let mut out = String::new();
    write_compound(&mut out, root, 0);
    out
}

fn write_tag(out: &mut String, tag: &NbtTag, depth: usize) {
    match tag {
        NbtTag::Byte(v) => out.push_str(&format!("{v}b")),
        NbtTag::Short(v) => out.push_str(&format!("{v}s")),
        NbtTag::Int(v) => out.push_str(&v.to_string()),
        NbtTag::Long(v) => out.push_str(&format!("{v}L")),
        NbtTag::Float(v) => out.push_str(&format!("{v:?}f")),
        NbtTag::Double(v) => out.push_str(&format!("{v:?}d")),
        NbtTag::String(s) => out.push_str(&quote(s)),
        NbtTag::ByteArray(values) => write_array(out, 'B', values.iter().map(|v| format!("{v}b"))),
        NbtTag::IntArray(values) => write_array(out, 'I', values.iter().map(|v| v.to_string())),
        NbtTag::LongArray(values) => write_array(out, 'L', values.iter().map(|v| format!("{v}L"))),
        NbtTag::List(list) => {
            let items: Vec<(Option<&str>, &NbtTag)> = list.iter().map(|tag| (None, tag)).collect();
            write_entries(out, ('[', ']'), &items, depth);
        }
        NbtTag::Compound(compound) => write_compound(out, compound, depth),
    }
}

fn write_compound(out: &mut String, compound: &NbtCompound, depth: usize) {
    let mut items: Vec<(Option<&str>, &NbtTag)> =
        compound.inner().iter().map(|(key, tag)| (Some(key.as_str()), tag)).collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    write_entries(out, ('{', '}'), &items, depth);
}

fn write_entries(out: &mut String, (open, close): (char, char), items: &[(Option<&str>, &NbtTag)], depth: usize) {
    let expand = items.iter().any(|(_, tag)| is_container(tag));

    out.push(open);
    for (i, (key, tag)) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
            if !expand {
                out.push(' ');
            }
        }
        if expand {
            out.push('\n');
            out.push_str(&INDENT.repeat(depth + 1));
        }
        if let Some(key) = key {
            out.push_str(&snbt_key(key));
            out.push_str(": ");
        }
        write_tag(out, tag, depth + 1);
    }
    if expand {
        out.push('\n');
        out.push_str(&INDENT.repeat(depth));
    }
    out.push(close);
}

fn write_array(out: &mut String, prefix: char, values: impl Iterator<Item = String>) {
    let values: Vec<String> = values.collect();
    if values.is_empty() {
        out.push_str(&format!("[{prefix};]"));
    } else {
        out.push_str(&format!("[{prefix}; {}]", values.join(", ")));
    }
}

fn is_container(tag: &NbtTag) -> bool {
    match tag {
        NbtTag::Compound(compound) => compound.len() > 0,
        NbtTag::List(list) => list.len() > 0,
        _ => false,
    }
}

fn snbt_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'));
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartz_nbt::io::write_nbt;

    fn compound(snbt: &str) -> NbtCompound {
        quartz_nbt::snbt::parse(snbt).unwrap()
    }

    #[test]
    fn test_flat_compound_stays_inline() {
        let tag = compound(r#"{b:1b,a:"x y",c:2.5d,d:[I;1,2],e:[]}"#);
        assert_eq!(to_snbt(&tag), r#"{a: "x y", b: 1b, c: 2.5d, d: [I; 1, 2], e: []}"#);
    }

    #[test]
    fn test_nested_containers_expand() {
        let tag = compound(r#"{size:[I;1,1,1],palette:[{Name:"minecraft:stone"}],"odd key":1L}"#);
        assert_eq!(
            to_snbt(&tag),
            "{\n  \"odd key\": 1L,\n  palette: [\n    {Name: \"minecraft:stone\"}\n  ],\n  size: [I; 1, 1, 1]\n}"
        );
    }

    #[test]
    fn test_gzip_structure_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("igloo.nbt");
        let original = compound(r#"{DataVersion:3465,blocks:[{pos:[I;0,0,0],state:0}],entities:[]}"#);
        let mut bytes = Vec::new();
        write_nbt(&mut bytes, None, &original, Flavor::GzCompressed).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let read = read_structure(&path).unwrap();
        assert_eq!(read, original);
        assert_eq!(compound(&to_snbt(&read)), original);
    }

    #[test]
    fn test_broken_structure_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("broken.nbt");
        std::fs::write(&path, b"not nbt").unwrap();
        assert!(matches!(read_structure(&path), Err(Error::Nbt { .. })));
    }

    #[test]
    fn test_parse_snbt() {
        let tag = parse_snbt(r#"{Count: 1b, Potion: "minecraft:water_breathing"}"#).unwrap();
        assert_eq!(tag.get::<_, &str>("Potion").unwrap(), "minecraft:water_breathing");
        assert!(parse_snbt("{Potion:").is_none());
    }
}
