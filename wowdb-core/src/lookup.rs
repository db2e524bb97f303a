//! Read-only lookup contract consumed by the resolvers.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{
    CreatureDrop, CreatureRecord, GameObjectRecord, ItemMeta, ItemRecord, ItemSetRecord, LootRow, LootSource,
    LootTableRef, SpellRecord,
};

/// Game object type whose `data1` holds a loot table id.
pub const GAMEOBJECT_TYPE_CHEST: i32 = 3;

/// Source of stored game data.
///
/// Lookups must be safe to call repeatedly. A missing record is `Ok(None)`;
/// `Err` is reserved for infrastructure failures.
pub trait LookupProvider: Send + Sync {
    /// All rows of one loot table. Unknown tables yield an empty list.
    fn loot_rows(&self, table: LootTableRef) -> Result<Vec<LootRow>>;

    fn item_meta(&self, item_id: i32) -> Result<Option<ItemMeta>>;

    fn item(&self, item_id: i32) -> Result<Option<ItemRecord>>;

    fn spell(&self, spell_id: i32) -> Result<Option<SpellRecord>>;

    /// Duration in milliseconds for a spell duration index.
    fn duration_millis(&self, index: i32) -> Result<Option<i32>>;

    fn item_set(&self, set_id: i32) -> Result<Option<ItemSetRecord>>;

    /// Root loot table id owned by an entity.
    fn loot_id(&self, source: LootSource, entry: i32) -> Result<Option<i32>>;

    /// Creatures whose own loot table lists `item_id` directly, highest chance
    /// first, at most `limit` of them.
    fn creature_drops(&self, item_id: i32, limit: usize) -> Result<Vec<CreatureDrop>>;

    fn range_yards(&self, _index: i32) -> Result<Option<f64>> {
        Ok(None)
    }

    fn cast_time_millis(&self, _index: i32) -> Result<Option<i32>> {
        Ok(None)
    }
}

/// In-memory LookupProvider for tests and callers that already hold the data.
#[derive(Debug, Default, Clone)]
pub struct MemoryLookup {
    loot: HashMap<LootTableRef, Vec<LootRow>>,
    items: HashMap<i32, ItemRecord>,
    spells: HashMap<i32, SpellRecord>,
    durations: HashMap<i32, i32>,
    ranges: HashMap<i32, f64>,
    cast_times: HashMap<i32, i32>,
    sets: HashMap<i32, ItemSetRecord>,
    creatures: HashMap<i32, CreatureRecord>,
    objects: HashMap<i32, GameObjectRecord>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loot_row(mut self, table: LootTableRef, row: LootRow) -> Self {
        self.loot.entry(table).or_default().push(row);
        self
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.items.insert(item.entry, item);
        self
    }

    /// Register an item with only the fields loot display needs.
    pub fn with_item_meta(self, entry: i32, name: &str, quality: i32) -> Self {
        self.with_item(ItemRecord {
            entry,
            name: name.to_string(),
            icon: format!("inv_{}", entry),
            quality,
            ..Default::default()
        })
    }

    pub fn with_spell(mut self, spell: SpellRecord) -> Self {
        self.spells.insert(spell.entry, spell);
        self
    }

    pub fn with_duration(mut self, index: i32, millis: i32) -> Self {
        self.durations.insert(index, millis);
        self
    }

    pub fn with_range(mut self, index: i32, yards: f64) -> Self {
        self.ranges.insert(index, yards);
        self
    }

    pub fn with_cast_time(mut self, index: i32, millis: i32) -> Self {
        self.cast_times.insert(index, millis);
        self
    }

    pub fn with_item_set(mut self, set: ItemSetRecord) -> Self {
        self.sets.insert(set.set_id, set);
        self
    }

    pub fn with_creature(mut self, creature: CreatureRecord) -> Self {
        self.creatures.insert(creature.entry, creature);
        self
    }

    pub fn with_object(mut self, object: GameObjectRecord) -> Self {
        self.objects.insert(object.entry, object);
        self
    }
}

impl LookupProvider for MemoryLookup {
    fn loot_rows(&self, table: LootTableRef) -> Result<Vec<LootRow>> {
        Ok(self.loot.get(&table).cloned().unwrap_or_default())
    }

    fn item_meta(&self, item_id: i32) -> Result<Option<ItemMeta>> {
        Ok(self.items.get(&item_id).map(|item| ItemMeta {
            name: item.name.clone(),
            icon: item.icon.clone(),
            quality: item.quality,
        }))
    }

    fn item(&self, item_id: i32) -> Result<Option<ItemRecord>> {
        Ok(self.items.get(&item_id).cloned())
    }

    fn spell(&self, spell_id: i32) -> Result<Option<SpellRecord>> {
        Ok(self.spells.get(&spell_id).cloned())
    }

    fn duration_millis(&self, index: i32) -> Result<Option<i32>> {
        Ok(self.durations.get(&index).copied())
    }

    fn item_set(&self, set_id: i32) -> Result<Option<ItemSetRecord>> {
        Ok(self.sets.get(&set_id).cloned())
    }

    fn loot_id(&self, source: LootSource, entry: i32) -> Result<Option<i32>> {
        let id = match source {
            LootSource::Creature => self.creatures.get(&entry).map(|c| c.loot_id),
            LootSource::GameObject => self
                .objects
                .get(&entry)
                .filter(|o| o.object_type == GAMEOBJECT_TYPE_CHEST)
                .map(|o| o.data1),
            LootSource::Item => self.items.contains_key(&entry).then_some(entry),
        };
        Ok(id)
    }

    fn creature_drops(&self, item_id: i32, limit: usize) -> Result<Vec<CreatureDrop>> {
        let mut drops: Vec<CreatureDrop> = self
            .creatures
            .values()
            .flat_map(|creature| {
                let table = LootTableRef::primary(LootSource::Creature, creature.loot_id);
                self.loot
                    .get(&table)
                    .into_iter()
                    .flatten()
                    .filter(|row| !row.is_reference() && row.item_or_ref_id == item_id)
                    .map(move |row| CreatureDrop {
                        entry: creature.entry,
                        name: creature.name.clone(),
                        level_min: creature.level_min,
                        level_max: creature.level_max,
                        chance: row.chance,
                    })
            })
            .collect();

        drops.sort_by(|a, b| {
            b.chance
                .partial_cmp(&a.chance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.entry.cmp(&b.entry))
        });
        drops.truncate(limit);
        Ok(drops)
    }

    fn range_yards(&self, index: i32) -> Result<Option<f64>> {
        Ok(self.ranges.get(&index).copied())
    }

    fn cast_time_millis(&self, index: i32) -> Result<Option<i32>> {
        Ok(self.cast_times.get(&index).copied())
    }
}
