//! Human-readable comments for loot functions and conditions.

use super::model::{LootCondition, LootFunction, NumberProvider};
use crate::names::{flatten, ns, same_id};
use crate::nbt::parse_snbt;

/// Fixed-point `value` with trailing zeros removed.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    trim_decimal(format!("{value:.decimals$}"))
}

pub fn trim_decimal(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Flattened id, keeping a leading `#` for tags.
fn short(id: &str) -> String {
    match id.strip_prefix('#') {
        Some(tag) => format!("#{}", flatten(tag)),
        None => flatten(id),
    }
}

/// A probability provider as a percentage, when it is a constant.
fn percent(chance: &NumberProvider) -> String {
    match chance.as_constant().and_then(|c| c.parse::<f64>().ok()) {
        Some(value) => format!("{}%", format_decimal(value * 100.0, 4)),
        None => chance.render(),
    }
}

fn bracketed(items: &[String]) -> String {
    match items {
        [single] => single.clone(),
        _ => format!("[{}]", items.join(", ")),
    }
}

/// The `Potion` id of a legacy `set_nbt` tag.
fn potion_from_snbt(tag: &str) -> Option<String> {
    let compound = parse_snbt(tag)?;
    let potion = compound.get::<_, &str>("Potion").ok()?;
    (!potion.is_empty()).then(|| flatten(potion))
}

fn potion_name(id: &str) -> Option<String> {
    if same_id(id, "empty") {
        return None;
    }
    let mut name = flatten(id);
    let mut modifiers = Vec::new();
    for modifier in ["strong", "long"] {
        let prefix = format!("{modifier}_");
        if name.contains(&prefix) {
            name = name.replace(&prefix, "");
            modifiers.push(modifier);
        }
    }
    if modifiers.is_empty() {
        Some(name)
    } else {
        Some(format!("{} ({})", name, modifiers.join(", ")))
    }
}

pub fn function_comment(function: &LootFunction) -> Option<String> {
    match function {
        LootFunction::FurnaceSmelt => Some("furnace smelt".to_string()),
        LootFunction::ExplosionDecay => Some("explosion decay".to_string()),
        LootFunction::EnchantRandomly(None) => Some("enchantments: *".to_string()),
        LootFunction::EnchantRandomly(Some(list)) if list.is_empty() => {
            Some("enchantments: *".to_string())
        }
        LootFunction::EnchantRandomly(Some(list)) => {
            let names: Vec<String> = list.iter().map(|e| short(e)).collect();
            Some(format!("enchantments: {}", bracketed(&names)))
        }
        LootFunction::EnchantWithLevels { levels, treasure } => {
            let levels = levels.render();
            let mut parts = vec![match levels.parse::<i64>() {
                Ok(level) => format!("level: {level}"),
                Err(_) => format!("levels: {levels}"),
            }];
            if *treasure {
                parts.push("treasure: true".to_string());
            }
            Some(format!("enchantments: {{{}}}", parts.join(", ")))
        }
        LootFunction::SetEnchantments(list) if list.is_empty() => None,
        LootFunction::SetEnchantments(list) => {
            let names: Vec<String> = list
                .iter()
                .map(|(id, level)| format!("{} {}", flatten(id), level.render()))
                .collect();
            Some(format!("enchantments: {}", bracketed(&names)))
        }
        LootFunction::ExplorationMap { destination } => Some(format!(
            "destination: #{}",
            ns(destination.trim_start_matches('#'))
        )),
        LootFunction::SetPotion(id) => potion_name(id),
        LootFunction::SetNbt(tag) => potion_from_snbt(tag),
        LootFunction::SetDamage(damage) => Some(format!("damage: {}", damage.render())),
        LootFunction::EnchantedCountIncrease { enchantment, count } => {
            Some(format!("{}: +{}", flatten(enchantment), count.render()))
        }
        LootFunction::ApplyBonus { enchantment } => Some(format!("bonus: {}", flatten(enchantment))),
        LootFunction::SetInstrument(options) => Some(format!("instrument: {}", short(options))),
        LootFunction::SetStewEffect(effects) if effects.is_empty() => None,
        LootFunction::SetStewEffect(effects) => {
            let names: Vec<String> = effects.iter().map(|e| flatten(e)).collect();
            Some(format!("stew effect: {}", bracketed(&names)))
        }
        LootFunction::SetCount(_)
        | LootFunction::LimitCount { .. }
        | LootFunction::SetData(_)
        | LootFunction::Silent(_) => None,
    }
}

pub fn condition_comment(condition: &LootCondition) -> String {
    match condition {
        LootCondition::KilledByPlayer => "killed by player".to_string(),
        LootCondition::RandomChance(chance) => format!("random chance: {}", percent(chance)),
        LootCondition::RandomChanceWithLooting {
            chance,
            looting_multiplier,
        } => format!(
            "random chance: {} (+{} per looting level)",
            percent(chance),
            percent(looting_multiplier)
        ),
        LootCondition::RandomChanceWithEnchantedBonus {
            unenchanted_chance,
            enchantment,
        } => format!(
            "random chance: {} (enchanted bonus: {})",
            percent(unenchanted_chance),
            flatten(enchantment)
        ),
        LootCondition::EntityProperties { entity } => format!("entity properties: {entity}"),
        LootCondition::DamageSource => "damage source".to_string(),
        LootCondition::MatchTool => "match tool".to_string(),
        LootCondition::SurvivesExplosion => "survives explosion".to_string(),
        LootCondition::TableBonus { enchantment } => format!("table bonus: {}", flatten(enchantment)),
        LootCondition::BlockState { block, properties } => {
            let props: Vec<String> = properties.iter().map(|(k, v)| format!("{k}={v}")).collect();
            if props.is_empty() {
                format!("block state: {}", flatten(block))
            } else {
                format!("block state: {}[{}]", flatten(block), props.join(","))
            }
        }
        LootCondition::Inverted(term) => format!("not ({})", condition_comment(term)),
        LootCondition::AnyOf(terms) => format!(
            "any of ({})",
            terms.iter().map(condition_comment).collect::<Vec<_>>().join(" | ")
        ),
        LootCondition::AllOf(terms) => format!(
            "all of ({})",
            terms.iter().map(condition_comment).collect::<Vec<_>>().join(" & ")
        ),
        LootCondition::LocationCheck => "location check".to_string(),
        LootCondition::WeatherCheck {
            raining,
            thundering,
        } => {
            let mut parts = Vec::new();
            if let Some(raining) = raining {
                parts.push(if *raining { "raining" } else { "not raining" });
            }
            if let Some(thundering) = thundering {
                parts.push(if *thundering { "thundering" } else { "not thundering" });
            }
            if parts.is_empty() {
                "weather check".to_string()
            } else {
                format!("weather: {}", parts.join(", "))
            }
        }
        LootCondition::TimeCheck => "time check".to_string(),
        LootCondition::ValueCheck => "value check".to_string(),
        LootCondition::EntityScores { entity } => format!("entity scores: {entity}"),
        LootCondition::Reference(name) => format!("reference: {}", flatten(name)),
        LootCondition::EnchantmentActive(true) => "enchantment active".to_string(),
        LootCondition::EnchantmentActive(false) => "enchantment inactive".to_string(),
    }
}

/// Comment for one entry or pool: function comments, then condition comments.
pub fn comment(functions: &[LootFunction], conditions: &[LootCondition]) -> String {
    functions
        .iter()
        .filter_map(function_comment)
        .chain(conditions.iter().map(condition_comment))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
