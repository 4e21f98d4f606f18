//! Items out of `reports/items.json`, regrouped by component.

use super::blocks::scalar_text;
use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::{Error, Result};
use crate::names::{flatten, ns};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const CATEGORY: &str = "items";
const ITEM_KEYS: &[&str] = &["components", "protocol_id"];

/// Components whose values are worth a listing of their own.
pub const GROUPED_COMPONENTS: &[&str] = &["max_stack_size", "rarity", "break_sound"];

/// Every item component type known to this tool.
pub const KNOWN_COMPONENTS: &[&str] = &[
    "attack_range",
    "attribute_modifiers",
    "axolotl/variant",
    "banner_patterns",
    "base_color",
    "bees",
    "block_entity_data",
    "block_state",
    "blocks_attacks",
    "break_sound",
    "bucket_entity_data",
    "bundle_contents",
    "can_break",
    "can_place_on",
    "cat/collar",
    "cat/variant",
    "charged_projectiles",
    "chicken/variant",
    "consumable",
    "container",
    "container_loot",
    "cow/variant",
    "creative_slot_lock",
    "custom_data",
    "custom_model_data",
    "custom_name",
    "damage",
    "damage_resistant",
    "damage_type",
    "death_protection",
    "debug_stick_state",
    "dyed_color",
    "enchantable",
    "enchantment_glint_override",
    "enchantments",
    "entity_data",
    "equippable",
    "fire_resistant",
    "firework_explosion",
    "fireworks",
    "food",
    "fox/variant",
    "frog/variant",
    "glider",
    "hide_additional_tooltip",
    "hide_tooltip",
    "horse/variant",
    "instrument",
    "intangible_projectile",
    "item_model",
    "item_name",
    "jukebox_playable",
    "kinetic_weapon",
    "llama/variant",
    "lock",
    "lodestone_tracker",
    "lore",
    "map_color",
    "map_decorations",
    "map_id",
    "map_post_processing",
    "max_damage",
    "max_stack_size",
    "minimum_attack_charge",
    "mooshroom/variant",
    "note_block_sound",
    "ominous_bottle_amplifier",
    "painting/variant",
    "parrot/variant",
    "pig/variant",
    "piercing_weapon",
    "pot_decorations",
    "potion_contents",
    "potion_duration_scale",
    "profile",
    "provides_banner_patterns",
    "provides_trim_material",
    "rabbit/variant",
    "rarity",
    "recipes",
    "repair_cost",
    "repairable",
    "salmon/size",
    "sheep/color",
    "shulker/color",
    "stored_enchantments",
    "suspicious_stew_effects",
    "swing_animation",
    "tool",
    "tooltip_display",
    "tooltip_style",
    "trim",
    "tropical_fish/base_color",
    "tropical_fish/pattern",
    "tropical_fish/pattern_color",
    "unbreakable",
    "use_cooldown",
    "use_effects",
    "use_remainder",
    "villager/variant",
    "weapon",
    "wolf/collar",
    "wolf/sound_variant",
    "wolf/variant",
    "writable_book_content",
    "written_book_content",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub name: String,
    /// Flattened component type and value, in report order.
    pub components: Vec<(String, Value)>,
}

impl ItemReport {
    /// Components come either as an object or, in early reports, as a list
    /// of `{type, value}` pairs.
    pub fn parse(key: &str, value: &Value) -> Result<Self> {
        let unknown = |kind: &'static str, detail: String| Error::schema(CATEGORY, key, kind, detail);
        let Value::Object(item) = value else {
            return Err(unknown("item", value.to_string()));
        };
        if let Some(extra) = item.keys().find(|k| !ITEM_KEYS.contains(&k.as_str())) {
            return Err(unknown("item key", extra.clone()));
        }

        let raw: Vec<(String, Value)> = match item.get("components") {
            None => Vec::new(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(Value::Array(list)) => list
                .iter()
                .map(|c| match c.get("type").and_then(Value::as_str) {
                    Some(kind) => Ok((kind.to_string(), c.get("value").cloned().unwrap_or(Value::Null))),
                    None => Err(unknown("component", c.to_string())),
                })
                .collect::<Result<_>>()?,
            Some(other) => return Err(unknown("components", other.to_string())),
        };

        let mut components = Vec::with_capacity(raw.len());
        for (kind, value) in raw {
            let kind = flatten(&kind);
            if !KNOWN_COMPONENTS.contains(&kind.as_str()) {
                return Err(unknown("component", kind));
            }
            components.push((kind, value));
        }

        Ok(Self {
            name: ns(key),
            components,
        })
    }
}

pub struct ItemsAnalyzer;

impl Analyzer for ItemsAnalyzer {
    fn name(&self) -> &'static str {
        "items"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let Some(path) = ctx.resolver().find(categories::ITEMS_REPORT) else {
            return Ok(());
        };
        let Value::Object(report) = read_json(&path)? else {
            return Err(Error::schema(CATEGORY, "items.json", "report", "not an object"));
        };
        tracing::info!("Listing {} items", report.len());

        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, value) in &report {
            let item = ItemReport::parse(key, value)?;
            out.write_json(format!("lists/items/{}.json", flatten(key)), value)?;

            for (kind, value) in &item.components {
                groups
                    .entry(format!("lists/items/components/{kind}.txt"))
                    .or_default()
                    .insert(item.name.clone());
                if GROUPED_COMPONENTS.contains(&kind.as_str()) {
                    if let Some(text) = scalar_text(value) {
                        groups
                            .entry(format!("lists/items/components/{kind}/{text}.txt"))
                            .or_default()
                            .insert(item.name.clone());
                    }
                }
            }
        }

        for (path, items) in groups {
            out.write_lines(path, &items.into_iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use serde_json::json;

    #[test]
    fn test_legacy_component_list() {
        let item = ItemReport::parse(
            "minecraft:apple",
            &json!({"components": [
                {"type": "minecraft:max_stack_size", "value": 64},
                {"type": "minecraft:food", "value": {"nutrition": 4}}
            ]}),
        )
        .unwrap();

        assert_eq!(item.components[0], ("max_stack_size".to_string(), json!(64)));
        assert_eq!(item.components[1].0, "food");
    }

    #[test]
    fn test_unknown_component_is_rejected() {
        let err = ItemReport::parse("x", &json!({"components": {"minecraft:telepathy": {}}})).unwrap_err();
        match err {
            Error::Schema { kind, detail, .. } => {
                assert_eq!(kind, "component");
                assert_eq!(detail, "telepathy");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = ItemReport::parse("x", &json!({"id": 3})).unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "item key", .. }));
    }

    #[test]
    fn test_analyzer_groupings() {
        let (_dir, root) = tree();
        write(
            &root,
            "reports/items.json",
            r#"{
                "minecraft:apple": {"protocol_id": 1, "components": {
                    "minecraft:max_stack_size": 64, "minecraft:rarity": "common", "minecraft:food": {}}},
                "minecraft:elytra": {"protocol_id": 2, "components": {
                    "minecraft:max_stack_size": 1, "minecraft:rarity": "epic", "minecraft:glider": {}}},
                "minecraft:stick": {"protocol_id": 3, "components": {
                    "minecraft:max_stack_size": 64, "minecraft:rarity": "common"}}
            }"#,
        );

        run(&ItemsAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/items/components/max_stack_size.txt"),
            "minecraft:apple\nminecraft:elytra\nminecraft:stick\n"
        );
        assert_eq!(
            read(&root, "lists/items/components/max_stack_size/64.txt"),
            "minecraft:apple\nminecraft:stick\n"
        );
        assert_eq!(read(&root, "lists/items/components/rarity/epic.txt"), "minecraft:elytra\n");
        assert_eq!(read(&root, "lists/items/components/glider.txt"), "minecraft:elytra\n");
        assert!(!root.join("lists/items/components/food").exists());
        assert!(root.join("lists/items/apple.json").exists());
    }

    #[test]
    fn test_missing_report_is_skipped() {
        let (_dir, root) = tree();
        run(&ItemsAnalyzer, &root).unwrap();
        assert!(!root.join("lists/items").exists());
    }
}
