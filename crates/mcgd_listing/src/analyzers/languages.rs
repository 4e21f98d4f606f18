//! Available languages, from legacy `.lang` headers or `pack.mcmeta`.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::Result;
use crate::writer::OutputWriter;
use camino::Utf8Path;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const LEGACY_LANG_DIR: &str = "assets/lang";
const PACK_MCMETA: &str = "assets/pack.mcmeta";

/// `language.code`, `language.name` and `language.region` of a legacy file.
fn legacy_header(path: &Utf8Path) -> Result<Option<(String, Value)>> {
    let content = std::fs::read_to_string(path.as_std_path())?;
    let mut fields: BTreeMap<&str, String> = BTreeMap::new();
    for line in content.lines() {
        for field in ["code", "name", "region"] {
            if let Some(value) = line.strip_prefix(&format!("language.{field}=")) {
                fields.insert(field, value.trim_end().to_string());
            }
        }
        if fields.len() == 3 {
            break;
        }
    }
    match (fields.remove("code"), fields.remove("name"), fields.remove("region")) {
        (Some(code), Some(name), Some(region)) => Ok(Some((code, json!({"region": region, "name": name})))),
        _ => Ok(None),
    }
}

/// Languages keyed by lowercase code, `en_us` first, the rest sorted.
pub fn ordered_languages(mut languages: Map<String, Value>) -> Map<String, Value> {
    let mut ordered = Map::new();
    for english in ["en_us", "en_US"] {
        if let Some(value) = languages.remove(english) {
            ordered.insert("en_us".to_string(), value);
        }
    }
    let rest: BTreeMap<String, Value> = languages.into_iter().collect();
    for (code, value) in rest {
        ordered.insert(code.to_lowercase(), value);
    }
    ordered
}

pub struct LanguagesAnalyzer;

impl Analyzer for LanguagesAnalyzer {
    fn name(&self) -> &'static str {
        "languages"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let mut languages = Map::new();

        let legacy_dir = ctx.root().join(LEGACY_LANG_DIR);
        if legacy_dir.is_dir() {
            for entry in std::fs::read_dir(legacy_dir.as_std_path())? {
                let path = entry?.path();
                let Some(path) = Utf8Path::from_path(&path) else {
                    continue;
                };
                if path.extension() != Some("lang") {
                    continue;
                }
                if let Some((code, value)) = legacy_header(path)? {
                    languages.insert(code, value);
                }
            }
        }

        if languages.is_empty() {
            let mcmeta = ctx.root().join(PACK_MCMETA);
            if mcmeta.is_file() {
                if let Some(Value::Object(map)) = read_json(&mcmeta)?.get("language") {
                    languages = map.clone();
                }
            }
        }

        if languages.is_empty() {
            return Ok(());
        }
        tracing::info!("Listing {} languages", languages.len());
        out.write_json("lists/languages.json", &ordered_languages(languages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;

    #[test]
    fn test_pack_mcmeta_languages() {
        let (_dir, root) = tree();
        write(
            &root,
            "assets/pack.mcmeta",
            r#"{"language": {
                "fr_fr": {"name": "Français", "region": "France", "bidirectional": false},
                "en_us": {"name": "English", "region": "United States", "bidirectional": false},
                "de_de": {"name": "Deutsch", "region": "Deutschland", "bidirectional": false}
            }}"#,
        );

        run(&LanguagesAnalyzer, &root).unwrap();

        let languages: Map<String, Value> =
            serde_json::from_str(&read(&root, "lists/languages.json")).unwrap();
        let codes: Vec<_> = languages.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["en_us", "de_de", "fr_fr"]);
    }

    #[test]
    fn test_legacy_lang_headers() {
        let (_dir, root) = tree();
        write(
            &root,
            "assets/lang/en_US.lang",
            "language.name=English\nlanguage.region=US\nlanguage.code=en_US\nitem.stone.name=Stone\n",
        );
        write(
            &root,
            "assets/lang/fr_FR.lang",
            "language.name=Francais\nlanguage.region=France\nlanguage.code=fr_FR\n",
        );
        write(&root, "assets/lang/broken.lang", "language.name=Nothing\n");

        run(&LanguagesAnalyzer, &root).unwrap();

        let languages: Value = serde_json::from_str(&read(&root, "lists/languages.json")).unwrap();
        assert_eq!(languages["en_us"]["name"], "English");
        assert_eq!(languages["fr_fr"]["region"], "France");
        assert_eq!(languages.as_object().unwrap().len(), 2);
    }
}
