//! Typed loot-table model.
//!
//! Loot tables have gone through several schema generations (`items` vs
//! `entries`, `{min,max}` vs typed number providers, `name` vs `value`
//! references). Everything is parsed into these types up front; a kind this
//! module does not recognize is a schema error, never silently skipped.

use crate::error::{Error, Result};
use serde_json::{Number, Value};

const CATEGORY: &str = "loot_tables";

/// Parse context: the table being read, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a>(pub &'a str);

impl Source<'_> {
    fn unknown(&self, kind: &'static str, detail: impl Into<String>) -> Error {
        Error::schema(CATEGORY, self.0, kind, detail)
    }
}

/// `minecraft:foo` / `foo` -> `foo`; other namespaces are kept as-is.
pub fn type_id(value: &Value, key: &str) -> Option<String> {
    let id = value.get(key)?.as_str()?;
    Some(id.strip_prefix("minecraft:").unwrap_or(id).to_string())
}

/// JSON number as text, without a trailing `.0`.
pub fn number_text(n: &Number) -> String {
    let text = n.to_string();
    match text.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberProvider {
    Constant(String),
    Uniform {
        min: Box<NumberProvider>,
        max: Box<NumberProvider>,
    },
    Binomial {
        n: Box<NumberProvider>,
        p: Box<NumberProvider>,
    },
}

impl NumberProvider {
    pub fn constant(text: impl Into<String>) -> Self {
        Self::Constant(text.into())
    }

    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(Self::Constant(number_text(n))),
            Value::Object(_) => {
                let kind = match type_id(value, "type") {
                    Some(kind) => kind,
                    None if value.get("min").is_some() && value.get("max").is_some() => {
                        "uniform".to_string()
                    }
                    None if value.get("value").is_some() => "constant".to_string(),
                    None => return Err(src.unknown("number provider", value.to_string())),
                };
                let field = |name: &str| -> Result<Box<NumberProvider>> {
                    let inner = value
                        .get(name)
                        .ok_or_else(|| src.unknown("number provider", format!("missing '{name}'")))?;
                    Ok(Box::new(NumberProvider::parse(inner, src)?))
                };
                match kind.as_str() {
                    "constant" => Ok(*field("value")?),
                    "uniform" => Ok(Self::Uniform {
                        min: field("min")?,
                        max: field("max")?,
                    }),
                    "binomial" => Ok(Self::Binomial {
                        n: field("n")?,
                        p: field("p")?,
                    }),
                    other => Err(src.unknown("number provider", other)),
                }
            }
            other => Err(src.unknown("number provider", other.to_string())),
        }
    }

    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Self::Constant(text) => Some(text),
            _ => None,
        }
    }

    /// `3`, `1..3`, or `binomial(n, p)`.
    pub fn render(&self) -> String {
        match self {
            Self::Constant(text) => text.clone(),
            Self::Uniform { min, max } => {
                let (min, max) = (min.render(), max.render());
                if min == max {
                    min
                } else {
                    format!("{min}..{max}")
                }
            }
            Self::Binomial { n, p } => format!("binomial({}, {})", n.render(), p.render()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LootFunction {
    SetCount(NumberProvider),
    LimitCount {
        min: Option<String>,
        max: Option<String>,
    },
    FurnaceSmelt,
    ExplosionDecay,
    /// `None` means any enchantment.
    EnchantRandomly(Option<Vec<String>>),
    EnchantWithLevels {
        levels: NumberProvider,
        treasure: bool,
    },
    SetEnchantments(Vec<(String, NumberProvider)>),
    ExplorationMap {
        destination: String,
    },
    SetPotion(String),
    /// Legacy SNBT tag, kept raw.
    SetNbt(String),
    SetData(i64),
    SetDamage(NumberProvider),
    EnchantedCountIncrease {
        enchantment: String,
        count: NumberProvider,
    },
    ApplyBonus {
        enchantment: String,
    },
    SetInstrument(String),
    SetStewEffect(Vec<String>),
    /// Recognized, but does not show up in comments.
    Silent(String),
}

/// Functions that change the item without anything worth listing.
const SILENT_FUNCTIONS: &[&str] = &[
    "copy_components",
    "copy_custom_data",
    "copy_name",
    "copy_nbt",
    "copy_state",
    "fill_player_head",
    "filtered",
    "modify_contents",
    "reference",
    "sequence",
    "set_attributes",
    "set_banner_pattern",
    "set_book_cover",
    "set_components",
    "set_contents",
    "set_custom_data",
    "set_custom_model_data",
    "set_firework_explosion",
    "set_fireworks",
    "set_item",
    "set_loot_table",
    "set_lore",
    "set_name",
    "set_ominous_bottle_amplifier",
    "set_random_dyes",
    "set_random_potion",
    "set_writable_book_pages",
    "set_written_book_pages",
    "toggle_tooltips",
];

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

fn limit_bound(value: Option<&Value>, src: Source) -> Result<Option<String>> {
    value
        .map(|v| NumberProvider::parse(v, src).map(|p| p.render()))
        .transpose()
}

impl LootFunction {
    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        let kind = type_id(value, "function")
            .ok_or_else(|| src.unknown("function", value.to_string()))?;
        let provider = |key: &str, default: &str| -> Result<NumberProvider> {
            match value.get(key) {
                Some(v) => NumberProvider::parse(v, src),
                None => Ok(NumberProvider::constant(default)),
            }
        };

        Ok(match kind.as_str() {
            "set_count" => Self::SetCount(provider("count", "1")?),
            "limit_count" => match value.get("limit") {
                Some(Value::Number(n)) => Self::LimitCount {
                    min: None,
                    max: Some(number_text(n)),
                },
                Some(limit) => Self::LimitCount {
                    min: limit_bound(limit.get("min"), src)?,
                    max: limit_bound(limit.get("max"), src)?,
                },
                None => Self::LimitCount { min: None, max: None },
            },
            "furnace_smelt" => Self::FurnaceSmelt,
            "explosion_decay" => Self::ExplosionDecay,
            "enchant_randomly" => Self::EnchantRandomly(
                string_list(value.get("enchantments")).or_else(|| string_list(value.get("options"))),
            ),
            "enchant_with_levels" => Self::EnchantWithLevels {
                levels: provider("levels", "1")?,
                treasure: value
                    .get("treasure")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "set_enchantments" => {
                let mut enchantments = Vec::new();
                if let Some(Value::Object(map)) = value.get("enchantments") {
                    for (id, level) in map {
                        enchantments.push((id.clone(), NumberProvider::parse(level, src)?));
                    }
                }
                Self::SetEnchantments(enchantments)
            }
            "exploration_map" => Self::ExplorationMap {
                destination: str_field(value, "destination")
                    .unwrap_or_else(|| "on_treasure_maps".to_string()),
            },
            "set_potion" => Self::SetPotion(str_field(value, "id").unwrap_or_default()),
            "set_nbt" => Self::SetNbt(str_field(value, "tag").unwrap_or_default()),
            "set_data" => Self::SetData(value.get("data").and_then(Value::as_i64).unwrap_or(0)),
            "set_damage" => Self::SetDamage(provider("damage", "1")?),
            "looting_enchant" => Self::EnchantedCountIncrease {
                enchantment: "minecraft:looting".to_string(),
                count: provider("count", "1")?,
            },
            "enchanted_count_increase" => Self::EnchantedCountIncrease {
                enchantment: str_field(value, "enchantment")
                    .unwrap_or_else(|| "minecraft:looting".to_string()),
                count: provider("count", "1")?,
            },
            "apply_bonus" => Self::ApplyBonus {
                enchantment: str_field(value, "enchantment").unwrap_or_default(),
            },
            "set_instrument" => Self::SetInstrument(str_field(value, "options").unwrap_or_default()),
            "set_stew_effect" => Self::SetStewEffect(
                value
                    .get("effects")
                    .and_then(Value::as_array)
                    .map(|effects| {
                        effects
                            .iter()
                            .filter_map(|e| str_field(e, "type"))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            silent if SILENT_FUNCTIONS.contains(&silent) => Self::Silent(silent.to_string()),
            other => return Err(src.unknown("function", other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LootCondition {
    KilledByPlayer,
    RandomChance(NumberProvider),
    RandomChanceWithLooting {
        chance: NumberProvider,
        looting_multiplier: NumberProvider,
    },
    RandomChanceWithEnchantedBonus {
        unenchanted_chance: NumberProvider,
        enchantment: String,
    },
    EntityProperties {
        entity: String,
    },
    DamageSource,
    MatchTool,
    SurvivesExplosion,
    TableBonus {
        enchantment: String,
    },
    BlockState {
        block: String,
        properties: Vec<(String, String)>,
    },
    Inverted(Box<LootCondition>),
    AnyOf(Vec<LootCondition>),
    AllOf(Vec<LootCondition>),
    LocationCheck,
    WeatherCheck {
        raining: Option<bool>,
        thundering: Option<bool>,
    },
    TimeCheck,
    ValueCheck,
    EntityScores {
        entity: String,
    },
    Reference(String),
    EnchantmentActive(bool),
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Object(range) => {
            let bound = |k: &str| range.get(k).map(property_text).unwrap_or_default();
            format!("{}..{}", bound("min"), bound("max"))
        }
        other => other.to_string(),
    }
}

impl LootCondition {
    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        let kind = type_id(value, "condition")
            .ok_or_else(|| src.unknown("condition", value.to_string()))?;
        let provider = |key: &str| -> Result<NumberProvider> {
            match value.get(key) {
                Some(v) => NumberProvider::parse(v, src),
                None => Ok(NumberProvider::constant("0")),
            }
        };
        let terms = |key: &str| -> Result<Vec<LootCondition>> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|terms| terms.iter().map(|t| LootCondition::parse(t, src)).collect())
                .unwrap_or_else(|| Ok(Vec::new()))
        };

        Ok(match kind.as_str() {
            "killed_by_player" => Self::KilledByPlayer,
            "random_chance" => Self::RandomChance(provider("chance")?),
            "random_chance_with_looting" => Self::RandomChanceWithLooting {
                chance: provider("chance")?,
                looting_multiplier: provider("looting_multiplier")?,
            },
            "random_chance_with_enchanted_bonus" => Self::RandomChanceWithEnchantedBonus {
                unenchanted_chance: provider("unenchanted_chance")?,
                enchantment: str_field(value, "enchantment").unwrap_or_default(),
            },
            "entity_properties" => Self::EntityProperties {
                entity: str_field(value, "entity").unwrap_or_else(|| "this".to_string()),
            },
            "damage_source_properties" => Self::DamageSource,
            "match_tool" => Self::MatchTool,
            "survives_explosion" => Self::SurvivesExplosion,
            "table_bonus" => Self::TableBonus {
                enchantment: str_field(value, "enchantment").unwrap_or_default(),
            },
            "block_state_property" => Self::BlockState {
                block: str_field(value, "block").unwrap_or_default(),
                properties: value
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(k, v)| (k.clone(), property_text(v)))
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            "inverted" => {
                let term = value
                    .get("term")
                    .ok_or_else(|| src.unknown("condition", "inverted without 'term'"))?;
                Self::Inverted(Box::new(Self::parse(term, src)?))
            }
            "alternative" | "any_of" => Self::AnyOf(terms("terms")?),
            "all_of" => Self::AllOf(terms("terms")?),
            "location_check" => Self::LocationCheck,
            "weather_check" => Self::WeatherCheck {
                raining: value.get("raining").and_then(Value::as_bool),
                thundering: value.get("thundering").and_then(Value::as_bool),
            },
            "time_check" => Self::TimeCheck,
            "value_check" => Self::ValueCheck,
            "entity_scores" => Self::EntityScores {
                entity: str_field(value, "entity").unwrap_or_else(|| "this".to_string()),
            },
            "reference" => Self::Reference(str_field(value, "name").unwrap_or_default()),
            "enchantment_active_check" => {
                Self::EnchantmentActive(value.get("active").and_then(Value::as_bool).unwrap_or(true))
            }
            other => return Err(src.unknown("condition", other.to_string())),
        })
    }
}

/// A `loot_table` entry points either at another table or embeds one.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Named(String),
    Inline(Box<LootTable>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Item(String),
    Tag(String),
    LootTable(TableRef),
    Empty,
    Dynamic(String),
    Alternatives(Vec<LootEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootEntry {
    pub kind: EntryKind,
    pub weight: u64,
    pub functions: Vec<LootFunction>,
    pub conditions: Vec<LootCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootPool {
    pub rolls: NumberProvider,
    pub bonus_rolls: Option<NumberProvider>,
    pub entries: Vec<LootEntry>,
    pub functions: Vec<LootFunction>,
    pub conditions: Vec<LootCondition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LootTable {
    pub pools: Vec<LootPool>,
}

fn parse_functions(value: &Value, src: Source) -> Result<Vec<LootFunction>> {
    match value.get("functions").and_then(Value::as_array) {
        Some(functions) => functions.iter().map(|f| LootFunction::parse(f, src)).collect(),
        None => Ok(Vec::new()),
    }
}

fn parse_conditions(value: &Value, src: Source) -> Result<Vec<LootCondition>> {
    match value.get("conditions").and_then(Value::as_array) {
        Some(conditions) => conditions.iter().map(|c| LootCondition::parse(c, src)).collect(),
        None => Ok(Vec::new()),
    }
}

fn weight_of(value: &Value) -> u64 {
    match value.get("weight") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0).round() as u64))
            .unwrap_or(0),
        _ => 1,
    }
}

impl LootEntry {
    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        let name = || str_field(value, "name").unwrap_or_default();
        let kind = match type_id(value, "type") {
            // Pre-1.13 tables list bare items.
            None => match str_field(value, "item") {
                Some(item) => EntryKind::Item(item),
                None => EntryKind::Empty,
            },
            Some(kind) => match kind.as_str() {
                "item" => EntryKind::Item(name()),
                "tag" => EntryKind::Tag(name()),
                "empty" => EntryKind::Empty,
                "dynamic" => EntryKind::Dynamic(name()),
                "loot_table" => match value.get("value").or_else(|| value.get("name")) {
                    Some(Value::String(target)) => EntryKind::LootTable(TableRef::Named(target.clone())),
                    Some(inline @ Value::Object(_)) => {
                        EntryKind::LootTable(TableRef::Inline(Box::new(LootTable::parse(inline, src)?)))
                    }
                    _ => return Err(src.unknown("loot_table entry", value.to_string())),
                },
                "alternatives" => EntryKind::Alternatives(
                    value
                        .get("children")
                        .and_then(Value::as_array)
                        .map(|children| children.iter().map(|c| LootEntry::parse(c, src)).collect())
                        .unwrap_or_else(|| Ok(Vec::new()))?,
                ),
                "group" | "sequence" => {
                    return Err(src.unknown("entry type", format!("'{kind}' composite entries")))
                }
                other => return Err(src.unknown("entry type", other.to_string())),
            },
        };

        Ok(Self {
            kind,
            weight: weight_of(value),
            functions: parse_functions(value, src)?,
            conditions: parse_conditions(value, src)?,
        })
    }
}

impl LootPool {
    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        let entries = value
            .get("entries")
            .or_else(|| value.get("items"))
            .and_then(Value::as_array)
            .ok_or_else(|| src.unknown("pool", "pool without 'entries'"))?;

        Ok(Self {
            rolls: match value.get("rolls") {
                Some(rolls) => NumberProvider::parse(rolls, src)?,
                None => NumberProvider::constant("1"),
            },
            bonus_rolls: value
                .get("bonus_rolls")
                .map(|b| NumberProvider::parse(b, src))
                .transpose()?,
            entries: entries
                .iter()
                .map(|e| LootEntry::parse(e, src))
                .collect::<Result<_>>()?,
            functions: parse_functions(value, src)?,
            conditions: parse_conditions(value, src)?,
        })
    }
}

impl LootTable {
    pub fn parse(value: &Value, src: Source) -> Result<Self> {
        let pools = match value.get("pools") {
            Some(Value::Array(pools)) => pools
                .iter()
                .map(|p| LootPool::parse(p, src))
                .collect::<Result<_>>()?,
            Some(_) => return Err(src.unknown("table", "'pools' is not a list")),
            None => Vec::new(),
        };
        Ok(Self { pools })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SRC: Source = Source("test");

    #[test]
    fn test_number_providers() {
        let render = |v: Value| NumberProvider::parse(&v, SRC).unwrap().render();

        assert_eq!(render(json!(2.0)), "2");
        assert_eq!(render(json!(0.5)), "0.5");
        assert_eq!(render(json!({"min": 1, "max": 3})), "1..3");
        assert_eq!(render(json!({"type": "minecraft:uniform", "min": 2.0, "max": 2})), "2");
        assert_eq!(render(json!({"type": "minecraft:constant", "value": 4})), "4");
        assert_eq!(render(json!({"type": "binomial", "n": 3, "p": 0.5})), "binomial(3, 0.5)");
    }

    #[test]
    fn test_unknown_number_provider_is_rejected() {
        let err = NumberProvider::parse(&json!({"type": "minecraft:score", "score": "x"}), SRC)
            .unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "number provider", .. }));
    }

    #[test]
    fn test_legacy_pool_with_items() {
        let pool = LootPool::parse(
            &json!({"rolls": {"min": 1, "max": 2}, "items": [{"item": "stone"}, {}]}),
            SRC,
        )
        .unwrap();

        assert_eq!(pool.entries[0].kind, EntryKind::Item("stone".into()));
        assert_eq!(pool.entries[1].kind, EntryKind::Empty);
        assert_eq!(pool.rolls.render(), "1..2");
    }

    #[test]
    fn test_loot_table_reference_forms() {
        let by_name = LootEntry::parse(
            &json!({"type": "minecraft:loot_table", "name": "minecraft:chests/x"}),
            SRC,
        )
        .unwrap();
        assert_eq!(
            by_name.kind,
            EntryKind::LootTable(TableRef::Named("minecraft:chests/x".into()))
        );

        let inline = LootEntry::parse(
            &json!({"type": "loot_table", "value": {"pools": []}}),
            SRC,
        )
        .unwrap();
        assert!(matches!(inline.kind, EntryKind::LootTable(TableRef::Inline(_))));
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        let err = LootEntry::parse(
            &json!({"type": "item", "name": "stone", "functions": [{"function": "minecraft:teleport"}]}),
            SRC,
        )
        .unwrap_err();
        match err {
            Error::Schema { kind, detail, .. } => {
                assert_eq!(kind, "function");
                assert_eq!(detail, "teleport");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_condition_is_rejected() {
        let err = LootEntry::parse(
            &json!({"type": "item", "name": "stone", "conditions": [{"condition": "moon_phase"}]}),
            SRC,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "condition", .. }));
    }

    #[test]
    fn test_group_entries_are_rejected() {
        let err = LootEntry::parse(&json!({"type": "minecraft:group", "children": []}), SRC)
            .unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "entry type", .. }));
    }

    #[test]
    fn test_nested_conditions() {
        let cond = LootCondition::parse(
            &json!({"condition": "inverted", "term": {"condition": "any_of", "terms": [
                {"condition": "killed_by_player"},
                {"condition": "survives_explosion"}
            ]}}),
            SRC,
        )
        .unwrap();
        assert_eq!(
            cond,
            LootCondition::Inverted(Box::new(LootCondition::AnyOf(vec![
                LootCondition::KilledByPlayer,
                LootCondition::SurvivesExplosion
            ])))
        );
    }
}
