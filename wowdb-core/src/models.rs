//! Data models for World of Warcraft reference data.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WowDbError;

/// Entity kinds that own a primary loot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LootSource {
    Creature,
    GameObject,
    Item,
}

impl LootSource {
    /// Table holding this source's primary loot rows.
    pub fn table_name(self) -> &'static str {
        match self {
            LootSource::Creature => "creature_loot",
            LootSource::GameObject => "gameobject_loot",
            LootSource::Item => "item_loot",
        }
    }
}

impl FromStr for LootSource {
    type Err = WowDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "creature" | "npc" => Ok(LootSource::Creature),
            "object" | "gameobject" => Ok(LootSource::GameObject),
            "item" | "container" => Ok(LootSource::Item),
            other => Err(WowDbError::Parse(format!("Unknown loot source: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LootTableKind {
    Primary(LootSource),
    Reference,
}

impl LootTableKind {
    pub fn table_name(self) -> &'static str {
        match self {
            LootTableKind::Primary(source) => source.table_name(),
            LootTableKind::Reference => "reference_loot",
        }
    }
}

/// Identifies one loot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LootTableRef {
    pub kind: LootTableKind,
    pub id: i32,
}

impl LootTableRef {
    pub fn primary(source: LootSource, id: i32) -> Self {
        Self { kind: LootTableKind::Primary(source), id }
    }

    pub fn reference(id: i32) -> Self {
        Self { kind: LootTableKind::Reference, id }
    }
}

/// One row of a loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootRow {
    pub item_or_ref_id: i32,
    pub chance: f64,            // Negative marks a quest drop
    pub group_id: i32,
    pub min_count_or_ref: i32,  // Negative: -value is a reference table id
    pub max_count: i32,
}

impl LootRow {
    pub fn item(item_id: i32, chance: f64, min_count: i32, max_count: i32) -> Self {
        Self {
            item_or_ref_id: item_id,
            chance,
            group_id: 0,
            min_count_or_ref: min_count,
            max_count,
        }
    }

    pub fn reference(reference_id: i32, chance: f64) -> Self {
        Self {
            item_or_ref_id: reference_id,
            chance,
            group_id: 0,
            min_count_or_ref: -reference_id,
            max_count: 1,
        }
    }

    /// True when the count field marks this row as a reference, not an item drop.
    pub fn is_reference(&self) -> bool {
        self.min_count_or_ref < 0
    }

    /// Reference table this row points into. `None` for item drops and for
    /// count values with no positive counterpart.
    pub fn reference_id(&self) -> Option<i32> {
        if self.is_reference() {
            self.min_count_or_ref.checked_neg()
        } else {
            None
        }
    }
}

/// Item drop after flattening a loot graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLootItem {
    pub item_id: i32,
    pub item_name: String,
    pub icon: String,
    pub quality: i32,
    pub chance: f64,            // Aggregated percentage
    pub min_count: i32,
    pub max_count: i32,
}

/// Display metadata joined onto resolved loot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub name: String,
    pub icon: String,
    pub quality: i32,
}

/// Spell effect magnitudes used for description placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellEffectParams {
    pub base_points: [i32; 3],
    pub die_sides: [i32; 3],
    pub duration_index: i32,
}

/// Spell row as stored in the spells table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellRecord {
    pub entry: i32,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub effects: SpellEffectParams,
    pub range_index: i32,
    pub cast_time_index: i32,
}

/// Item set row: fixed-width member and bonus slots, zero meaning empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSetRecord {
    pub set_id: i32,
    pub name: String,
    pub item_ids: [i32; 10],
    pub spell_ids: [i32; 8],
    pub thresholds: [i32; 8],
}

impl ItemSetRecord {
    /// Non-zero member item ids in slot order.
    pub fn member_ids(&self) -> Vec<i32> {
        self.item_ids.iter().copied().filter(|&id| id > 0).collect()
    }
}

/// Entry in the item search list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub entry: i32,
    pub name: String,
    pub icon: String,
    pub quality: i32,
    pub item_level: i32,
}

/// Entry in the item set browse list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSetSummary {
    pub set_id: i32,
    pub name: String,
    pub item_ids: Vec<i32>,
}

/// Resolved set bonus, ordered by threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBonus {
    pub threshold: i32,
    pub spell_id: i32,
    pub description: String,
}

impl SetBonus {
    /// Tooltip line, e.g. "(2) Set: Increases armor by 200."
    pub fn line(&self) -> String {
        format!("({}) Set: {}", self.threshold, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItemSet {
    pub set_id: i32,
    pub name: String,
    pub item_count: usize,
    pub member_names: Vec<String>,
    pub bonuses: Vec<SetBonus>,
}

/// Full item template as stored in the items table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub entry: i32,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub quality: i32,
    pub item_level: i32,
    pub required_level: i32,
    pub class: i32,
    pub subclass: i32,
    pub inventory_type: i32,
    pub sell_price: i32,
    pub allowable_class: i32,
    pub allowable_race: i32,
    pub bonding: i32,
    pub max_count: i32,
    pub max_durability: i32,
    pub stats: [(i32, i32); 10],     // (stat type, value)
    pub delay: i32,                  // Milliseconds
    pub dmg_min1: f64,
    pub dmg_max1: f64,
    pub dmg_type1: i32,
    pub dmg_min2: f64,
    pub dmg_max2: f64,
    pub dmg_type2: i32,
    pub armor: i32,
    pub holy_res: i32,
    pub fire_res: i32,
    pub nature_res: i32,
    pub frost_res: i32,
    pub shadow_res: i32,
    pub arcane_res: i32,
    pub spells: [(i32, i32); 3],     // (spell id, trigger)
    pub set_id: i32,
}

/// Row for the creatures table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureRecord {
    pub entry: i32,
    pub name: String,
    pub level_min: i32,
    pub level_max: i32,
    pub loot_id: i32,
}

/// Creature whose primary loot table drops a given item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureDrop {
    pub entry: i32,
    pub name: String,
    pub level_min: i32,
    pub level_max: i32,
    pub chance: f64,            // Raw table chance, negative for quest drops
}

/// Row for the objects table. Chests keep their loot id in `data1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameObjectRecord {
    pub entry: i32,
    pub name: String,
    pub object_type: i32,
    pub data1: i32,
}

/// Set block of an item tooltip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSetInfo {
    pub name: String,
    pub items: Vec<String>,
    pub bonuses: Vec<String>,
}

/// Display-ready item tooltip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipModel {
    pub entry: i32,
    pub name: String,
    pub quality: i32,
    pub quality_name: String,
    pub item_level: i32,
    pub required_level: i32,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_damage_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stats: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub resistances: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub spell_effects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_info: Option<ItemSetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub races: Option<String>,
}

impl TooltipModel {
    /// Flatten into display lines in tooltip order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        if self.item_level > 0 {
            lines.push(format!("Item Level {}", self.item_level));
        }
        lines.extend(self.binding.clone());
        if self.unique {
            lines.push("Unique".to_string());
        }
        match (&self.slot_name, &self.type_name) {
            (Some(slot), Some(kind)) => lines.push(format!("{}\t{}", slot, kind)),
            (Some(slot), None) => lines.push(slot.clone()),
            (None, Some(kind)) => lines.push(kind.clone()),
            (None, None) => {}
        }
        match (&self.damage_text, &self.speed_text) {
            (Some(damage), Some(speed)) => lines.push(format!("{}\t{}", damage, speed)),
            (Some(damage), None) => lines.push(damage.clone()),
            _ => {}
        }
        lines.extend(self.bonus_damage_text.clone());
        lines.extend(self.dps.clone());
        if let Some(armor) = self.armor {
            lines.push(format!("{} Armor", armor));
        }
        lines.extend(self.stats.iter().cloned());
        lines.extend(self.resistances.iter().cloned());
        lines.extend(self.durability.clone());
        lines.extend(self.classes.clone());
        lines.extend(self.races.clone());
        if self.required_level > 0 {
            lines.push(format!("Requires Level {}", self.required_level));
        }
        lines.extend(self.spell_effects.iter().cloned());
        if let Some(set) = &self.set_info {
            lines.push(String::new());
            lines.push(set.name.clone());
            lines.extend(set.items.iter().map(|name| format!("  {}", name)));
            lines.push(String::new());
            lines.extend(set.bonuses.iter().cloned());
        }
        if let Some(description) = &self.description {
            lines.push(format!("\"{}\"", description));
        }
        if let Some(price) = &self.sell_price {
            lines.push(format!("Sell Price: {}", price));
        }
        lines
    }
}

/// Display-ready spell tooltip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellTooltip {
    pub entry: i32,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub duration: String,
    pub range: String,
    pub cast_time: String,
}
