//! Loot table flattening.
//!
//! A primary table row either drops an item or, when its count field is
//! negative, points into a shared reference table whose chances are scaled by
//! the referencing row's chance. The graph is walked depth-first and every
//! path to an item contributes its own probability to that item's total.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{Result, WowDbError};
use crate::lookup::LookupProvider;
use crate::models::{CreatureDrop, LootSource, LootTableRef, ResolvedLootItem};
use crate::rules::clean_name;

/// Deepest reference level visited. Reference data may contain cycles.
pub const MAX_REFERENCE_DEPTH: u32 = 10;

/// Smallest chance a single drop path contributes, in percent.
pub const CHANCE_FLOOR: f64 = 0.0001;

/// Drop accumulated during traversal, before metadata is joined.
#[derive(Debug, Clone, Copy)]
struct Accumulated {
    chance: f64,
    min_count: i32,
    max_count: i32,
}

pub struct LootResolver<'a, P: LookupProvider + ?Sized> {
    provider: &'a P,
    source: LootSource,
}

impl<'a, P: LookupProvider + ?Sized> LootResolver<'a, P> {
    pub fn new(provider: &'a P, source: LootSource) -> Self {
        Self { provider, source }
    }

    /// Flatten the loot owned by an entity (creature entry, chest entry, item entry).
    pub fn resolve_entity(&self, entry: i32) -> Result<Vec<ResolvedLootItem>> {
        match self.provider.loot_id(self.source, entry)? {
            Some(loot_id) => self.resolve(loot_id),
            None => {
                tracing::debug!("No {:?} with entry {}", self.source, entry);
                Ok(Vec::new())
            }
        }
    }

    /// Flatten the loot graph rooted at a primary table. Order is unspecified.
    pub fn resolve(&self, root_table_id: i32) -> Result<Vec<ResolvedLootItem>> {
        if root_table_id == 0 {
            return Ok(Vec::new());
        }

        let mut results: HashMap<i32, Accumulated> = HashMap::new();
        self.visit(
            LootTableRef::primary(self.source, root_table_id),
            1.0,
            0,
            &mut results,
        )?;

        let mut loot = Vec::with_capacity(results.len());
        for (item_id, drop) in results {
            match self.provider.item_meta(item_id)? {
                Some(meta) => loot.push(ResolvedLootItem {
                    item_id,
                    item_name: meta.name,
                    icon: meta.icon,
                    quality: meta.quality,
                    chance: drop.chance,
                    min_count: drop.min_count,
                    max_count: drop.max_count,
                }),
                None => tracing::debug!("Dropping loot item {}: no item record", item_id),
            }
        }
        Ok(loot)
    }

    fn visit(
        &self,
        table: LootTableRef,
        multiplier: f64,
        depth: u32,
        results: &mut HashMap<i32, Accumulated>,
    ) -> Result<()> {
        if depth > MAX_REFERENCE_DEPTH {
            tracing::debug!("Reference depth exceeded at table {}", table.id);
            return Ok(());
        }

        for row in self.provider.loot_rows(table)? {
            let chance = row.chance.abs() * multiplier;

            if row.is_reference() {
                match row.reference_id() {
                    Some(reference_id) => self.visit(
                        LootTableRef::reference(reference_id),
                        chance / 100.0,
                        depth + 1,
                        results,
                    )?,
                    None => tracing::debug!(
                        "Skipping row in table {} with bad reference {}",
                        table.id,
                        row.min_count_or_ref
                    ),
                }
                continue;
            }

            let chance = chance.max(CHANCE_FLOOR);
            results
                .entry(row.item_or_ref_id)
                .and_modify(|drop| drop.chance += chance)
                .or_insert(Accumulated {
                    chance,
                    min_count: row.min_count_or_ref,
                    max_count: row.max_count,
                });
        }
        Ok(())
    }
}

/// Orderings offered to browse views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LootSort {
    #[default]
    Chance,
    Quality,
    Name,
}

impl FromStr for LootSort {
    type Err = WowDbError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chance" => Ok(LootSort::Chance),
            "quality" => Ok(LootSort::Quality),
            "name" => Ok(LootSort::Name),
            other => Err(WowDbError::Parse(format!("Unknown loot sort: {}", other))),
        }
    }
}

fn by_chance_desc(a: &ResolvedLootItem, b: &ResolvedLootItem) -> Ordering {
    b.chance
        .partial_cmp(&a.chance)
        .unwrap_or(Ordering::Equal)
        .then(a.item_id.cmp(&b.item_id))
}

/// Default row cap for the "dropped by" view.
pub const DROPPED_BY_LIMIT: usize = 50;

/// Creatures that drop an item from their own loot table, best chance first.
pub fn dropped_by<P: LookupProvider + ?Sized>(
    provider: &P,
    item_id: i32,
    limit: usize,
) -> Result<Vec<CreatureDrop>> {
    let mut drops = provider.creature_drops(item_id, limit)?;
    for drop in &mut drops {
        drop.name = clean_name(&drop.name);
    }
    Ok(drops)
}

pub fn sort_loot(loot: &mut [ResolvedLootItem], sort: LootSort) {
    match sort {
        LootSort::Chance => loot.sort_by(by_chance_desc),
        LootSort::Quality => {
            loot.sort_by(|a, b| b.quality.cmp(&a.quality).then_with(|| by_chance_desc(a, b)))
        }
        LootSort::Name => loot.sort_by(|a, b| {
            a.item_name
                .cmp(&b.item_name)
                .then(a.item_id.cmp(&b.item_id))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MemoryLookup;
    use crate::models::{CreatureRecord, LootRow};

    fn creature_table(id: i32) -> LootTableRef {
        LootTableRef::primary(LootSource::Creature, id)
    }

    fn find(loot: &[ResolvedLootItem], item_id: i32) -> Option<&ResolvedLootItem> {
        loot.iter().find(|item| item.item_id == item_id)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_direct_items() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::item(1, 50.0, 1, 3))
            .with_loot_row(creature_table(100), LootRow::item(2, -25.0, 1, 1))
            .with_item_meta(1, "Linen Cloth", 1)
            .with_item_meta(2, "Quest Token", 1);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 2);
        let cloth = find(&loot, 1).unwrap();
        assert_close(cloth.chance, 50.0);
        assert_eq!((cloth.min_count, cloth.max_count), (1, 3));
        assert_eq!(cloth.item_name, "Linen Cloth");
        assert_close(find(&loot, 2).unwrap().chance, 25.0);
    }

    #[test]
    fn test_reference_chance_is_scaled() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::reference(5000, 20.0))
            .with_loot_row(LootTableRef::reference(5000), LootRow::item(7, 50.0, 1, 1))
            .with_item_meta(7, "Green Sword", 2);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 1);
        assert_close(loot[0].chance, 10.0);
    }

    #[test]
    fn test_multiple_paths_are_summed() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::item(7, 5.0, 1, 1))
            .with_loot_row(creature_table(100), LootRow::reference(5000, 50.0))
            .with_loot_row(creature_table(100), LootRow::reference(5001, 10.0))
            .with_loot_row(LootTableRef::reference(5000), LootRow::item(7, 20.0, 2, 4))
            .with_loot_row(LootTableRef::reference(5001), LootRow::reference(5002, 50.0))
            .with_loot_row(LootTableRef::reference(5002), LootRow::item(7, 100.0, 1, 1))
            .with_item_meta(7, "Green Sword", 2);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 1);
        // 5 + 50% of 20 + 10% of 50% of 100
        assert_close(loot[0].chance, 5.0 + 10.0 + 5.0);
        assert_eq!((loot[0].min_count, loot[0].max_count), (1, 1));
    }

    #[test]
    fn test_unusable_reference_row_is_skipped() {
        let bad_row = LootRow {
            item_or_ref_id: 0,
            chance: 100.0,
            group_id: 0,
            min_count_or_ref: i32::MIN,
            max_count: 1,
        };
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), bad_row)
            .with_loot_row(creature_table(100), LootRow::item(1, 40.0, 1, 1))
            .with_item_meta(1, "Linen Cloth", 1);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 1);
        assert_eq!(loot[0].item_id, 1);
        assert_close(loot[0].chance, 40.0);
    }

    #[test]
    fn test_chance_floor_applies_per_path() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::item(9, 0.0, 1, 1))
            .with_loot_row(creature_table(100), LootRow::reference(5000, 0.001))
            .with_loot_row(LootTableRef::reference(5000), LootRow::item(9, 1.0, 1, 1))
            .with_item_meta(9, "Rare Pet", 3);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_close(loot[0].chance, CHANCE_FLOOR * 2.0);
    }

    #[test]
    fn test_depth_bound() {
        // Chain of 11 references below the root: item 110 sits at depth 10, item 111 at 11.
        let mut lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::reference(1, 100.0));
        for depth in 1..=11 {
            lookup = lookup
                .with_loot_row(LootTableRef::reference(depth), LootRow::item(100 + depth, 100.0, 1, 1))
                .with_item_meta(100 + depth, "Chain Drop", 1);
            if depth < 11 {
                lookup = lookup
                    .with_loot_row(LootTableRef::reference(depth), LootRow::reference(depth + 1, 100.0));
            }
        }

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert!(find(&loot, 110).is_some());
        assert!(find(&loot, 111).is_none());
        assert_eq!(loot.len(), 10);
    }

    #[test]
    fn test_cycle_terminates() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::reference(1, 100.0))
            .with_loot_row(LootTableRef::reference(1), LootRow::item(5, 10.0, 1, 1))
            .with_loot_row(LootTableRef::reference(1), LootRow::reference(1, 100.0))
            .with_item_meta(5, "Looping Drop", 1);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 1);
        assert_close(loot[0].chance, 10.0 * 10.0);
    }

    #[test]
    fn test_missing_item_is_excluded() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::item(999999, 50.0, 1, 1))
            .with_loot_row(creature_table(100), LootRow::item(1, 50.0, 1, 1))
            .with_item_meta(1, "Linen Cloth", 1);

        let loot = LootResolver::new(&lookup, LootSource::Creature).resolve(100).unwrap();

        assert_eq!(loot.len(), 1);
        assert_eq!(loot[0].item_id, 1);
    }

    #[test]
    fn test_empty_and_zero_root() {
        let lookup = MemoryLookup::new();
        let resolver = LootResolver::new(&lookup, LootSource::Creature);
        assert!(resolver.resolve(0).unwrap().is_empty());
        assert!(resolver.resolve(12345).unwrap().is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let lookup = MemoryLookup::new()
            .with_loot_row(creature_table(100), LootRow::item(1, 30.0, 1, 1))
            .with_loot_row(creature_table(100), LootRow::reference(5000, 40.0))
            .with_loot_row(LootTableRef::reference(5000), LootRow::item(2, 25.0, 1, 1))
            .with_loot_row(LootTableRef::reference(5000), LootRow::item(1, 75.0, 1, 1))
            .with_item_meta(1, "A", 1)
            .with_item_meta(2, "B", 1);
        let resolver = LootResolver::new(&lookup, LootSource::Creature);

        let mut first = resolver.resolve(100).unwrap();
        let mut second = resolver.resolve(100).unwrap();
        sort_loot(&mut first, LootSort::Chance);
        sort_loot(&mut second, LootSort::Chance);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_entity_uses_creature_loot_id() {
        let lookup = MemoryLookup::new()
            .with_creature(CreatureRecord {
                entry: 448,
                name: "Hogger".to_string(),
                level_min: 11,
                level_max: 11,
                loot_id: 448,
            })
            .with_creature(CreatureRecord { entry: 6, loot_id: 0, ..Default::default() })
            .with_loot_row(creature_table(448), LootRow::item(1, 50.0, 1, 1))
            .with_item_meta(1, "Linen Cloth", 1);
        let resolver = LootResolver::new(&lookup, LootSource::Creature);

        assert_eq!(resolver.resolve_entity(448).unwrap().len(), 1);
        assert!(resolver.resolve_entity(6).unwrap().is_empty());
        assert!(resolver.resolve_entity(7).unwrap().is_empty());
    }

    #[test]
    fn test_dropped_by_lists_direct_drops() {
        let creature = |entry: i32, name: &str| CreatureRecord {
            entry,
            name: name.to_string(),
            level_min: 10,
            level_max: 12,
            loot_id: entry,
        };
        let lookup = MemoryLookup::new()
            .with_creature(creature(1, "'Murloc Forager'"))
            .with_creature(creature(2, "Murloc Tidehunter"))
            .with_creature(creature(3, "Murloc Oracle"))
            .with_loot_row(creature_table(1), LootRow::item(730, 5.0, 1, 1))
            .with_loot_row(creature_table(2), LootRow::item(730, 40.0, 1, 1))
            .with_loot_row(creature_table(3), LootRow::reference(730, 100.0));

        let drops = dropped_by(&lookup, 730, DROPPED_BY_LIMIT).unwrap();

        let entries: Vec<i32> = drops.iter().map(|d| d.entry).collect();
        assert_eq!(entries, vec![2, 1]);
        assert_eq!(drops[1].name, "Murloc Forager");
        assert_close(drops[0].chance, 40.0);
        assert_eq!(dropped_by(&lookup, 730, 1).unwrap().len(), 1);
        assert!(dropped_by(&lookup, 999999, DROPPED_BY_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_sort_loot() {
        let item = |item_id: i32, name: &str, quality: i32, chance: f64| ResolvedLootItem {
            item_id,
            item_name: name.to_string(),
            icon: String::new(),
            quality,
            chance,
            min_count: 1,
            max_count: 1,
        };
        let mut loot = vec![
            item(1, "Cloth", 1, 40.0),
            item(2, "Axe", 4, 0.5),
            item(3, "Boots", 2, 40.0),
        ];

        sort_loot(&mut loot, LootSort::Chance);
        assert_eq!(loot.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![1, 3, 2]);

        sort_loot(&mut loot, LootSort::Quality);
        assert_eq!(loot.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![2, 3, 1]);

        sort_loot(&mut loot, LootSort::Name);
        assert_eq!(loot.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
