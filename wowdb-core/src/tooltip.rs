//! Item and spell tooltip assembly.

use crate::error::Result;
use crate::item_set::SetBonusResolver;
use crate::lookup::LookupProvider;
use crate::models::{ItemRecord, ItemSetInfo, SpellTooltip, TooltipModel};
use crate::rules::{
    self, Bonding, SpellTrigger, class_restrictions, clean_name, format_money, format_stat,
    quality_name, race_restrictions,
};
use crate::spell_text::SpellTextExpander;

pub struct TooltipComposer<'a, P: LookupProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: LookupProvider + ?Sized> TooltipComposer<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub fn compose_by_id(&self, item_id: i32) -> Result<Option<TooltipModel>> {
        Ok(self.provider.item(item_id)?.map(|item| self.compose(&item)))
    }

    /// Build the tooltip for an item. Absent or zero fields leave their line out.
    pub fn compose(&self, item: &ItemRecord) -> TooltipModel {
        let mut tooltip = TooltipModel {
            entry: item.entry,
            name: clean_name(&item.name),
            quality: item.quality,
            quality_name: quality_name(item.quality).to_string(),
            item_level: item.item_level,
            required_level: item.required_level,
            unique: item.max_count == 1,
            ..Default::default()
        };

        tooltip.binding = Bonding::from_code(item.bonding).map(|b| b.text().to_string());
        tooltip.slot_name = rules::slot_name(item.inventory_type).map(str::to_string);
        tooltip.type_name = rules::type_name(item.class, item.subclass).map(str::to_string);

        if item.armor > 0 {
            tooltip.armor = Some(item.armor);
        }

        if item.dmg_max1 > 0.0 && item.delay > 0 {
            let speed = item.delay as f64 / 1000.0;
            let dps = rules::round1((item.dmg_min1 + item.dmg_max1) / 2.0 / speed);
            tooltip.damage_text = Some(format!("{:.0} - {:.0} Damage", item.dmg_min1, item.dmg_max1));
            tooltip.speed_text = Some(format!("Speed {:.2}", speed));
            tooltip.dps = Some(format!("({:.1} damage per second)", dps));
        }

        if item.dmg_min2 > 0.0 || item.dmg_max2 > 0.0 {
            tooltip.bonus_damage_text = Some(format!(
                "+{:.0} - {:.0} {} Damage",
                item.dmg_min2,
                item.dmg_max2,
                rules::school_name(item.dmg_type2)
            ));
        }

        tooltip.stats = item
            .stats
            .iter()
            .filter(|(code, value)| *code > 0 && *value != 0)
            .map(|&(code, value)| format_stat(code, value))
            .collect();

        tooltip.resistances = [
            (item.holy_res, "Holy"),
            (item.fire_res, "Fire"),
            (item.nature_res, "Nature"),
            (item.frost_res, "Frost"),
            (item.shadow_res, "Shadow"),
            (item.arcane_res, "Arcane"),
        ]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, school)| format!("+{} {} Resistance", value, school))
        .collect();

        if item.max_durability > 0 {
            tooltip.durability = Some(format!(
                "Durability {} / {}",
                item.max_durability, item.max_durability
            ));
        }

        let expander = SpellTextExpander::new(self.provider);
        tooltip.spell_effects = item
            .spells
            .iter()
            .filter(|(spell_id, _)| *spell_id > 0)
            .filter_map(|&(spell_id, trigger)| {
                expander
                    .spell_text(spell_id)
                    .map(|text| format!("{} {}", SpellTrigger::from_code(trigger).prefix(), text))
            })
            .collect();

        if item.set_id > 0 {
            tooltip.set_info = self.set_info(item.set_id);
        }

        let description = clean_name(&item.description);
        if !description.is_empty() {
            tooltip.description = Some(description);
        }

        if item.sell_price > 0 {
            tooltip.sell_price = Some(format_money(item.sell_price));
        }

        tooltip.classes = class_restrictions(item.allowable_class);
        tooltip.races = race_restrictions(item.allowable_race);

        tooltip
    }

    fn set_info(&self, set_id: i32) -> Option<ItemSetInfo> {
        let set = match SetBonusResolver::new(self.provider).resolve(set_id) {
            Ok(Some(set)) => set,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Item set {} lookup failed: {}", set_id, e);
                return None;
            }
        };

        Some(ItemSetInfo {
            name: format!("{} (0/{})", set.name, set.item_count),
            bonuses: set.bonuses.iter().map(|bonus| bonus.line()).collect(),
            items: set.member_names,
        })
    }

    /// Spell detail view: expanded text plus duration, range and cast time.
    pub fn compose_spell(&self, spell_id: i32) -> Result<Option<SpellTooltip>> {
        let Some(spell) = self.provider.spell(spell_id)? else {
            return Ok(None);
        };

        let duration = match self.provider.duration_millis(spell.effects.duration_index)? {
            Some(millis) if spell.effects.duration_index > 0 && millis >= 60_000 => {
                format!("{}m", millis / 60_000)
            }
            Some(millis) if spell.effects.duration_index > 0 && millis > 0 => {
                format!("{}s", millis / 1000)
            }
            _ => "Instant".to_string(),
        };

        let range = match self.provider.range_yards(spell.range_index)? {
            Some(yards) if spell.range_index > 0 && yards > 0.0 => format!("{:.0} yd", yards),
            _ => "Self".to_string(),
        };

        let cast_time = match self.provider.cast_time_millis(spell.cast_time_index)? {
            Some(millis) if spell.cast_time_index > 0 && millis > 0 => {
                format!("{:.1}s", millis as f64 / 1000.0)
            }
            _ => "Instant".to_string(),
        };

        let description = SpellTextExpander::new(self.provider).expand_record(&spell);

        Ok(Some(SpellTooltip {
            entry: spell.entry,
            name: spell.name,
            icon: spell.icon,
            description,
            duration,
            range,
            cast_time,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MemoryLookup;
    use crate::models::{ItemSetRecord, SpellEffectParams, SpellRecord};

    fn sword() -> ItemRecord {
        ItemRecord {
            entry: 2000,
            name: " 'Sword of Testing'".to_string(),
            quality: 3,
            item_level: 40,
            required_level: 35,
            class: 2,
            subclass: 7,
            inventory_type: 13,
            bonding: 2,
            delay: 2500,
            dmg_min1: 10.0,
            dmg_max1: 20.0,
            max_durability: 75,
            sell_price: 12345,
            allowable_class: -1,
            allowable_race: -1,
            ..Default::default()
        }
    }

    #[test]
    fn test_weapon_tooltip() {
        let lookup = MemoryLookup::new();
        let tooltip = TooltipComposer::new(&lookup).compose(&sword());

        assert_eq!(tooltip.name, "Sword of Testing");
        assert_eq!(tooltip.quality_name, "Rare");
        assert_eq!(tooltip.binding.as_deref(), Some("Binds when equipped"));
        assert_eq!(tooltip.slot_name.as_deref(), Some("One-Hand"));
        assert_eq!(tooltip.type_name.as_deref(), Some("Sword"));
        assert_eq!(tooltip.damage_text.as_deref(), Some("10 - 20 Damage"));
        assert_eq!(tooltip.speed_text.as_deref(), Some("Speed 2.50"));
        assert_eq!(tooltip.dps.as_deref(), Some("(6.0 damage per second)"));
        assert_eq!(tooltip.durability.as_deref(), Some("Durability 75 / 75"));
        assert_eq!(tooltip.sell_price.as_deref(), Some("1g 23s 45c"));
        assert!(tooltip.classes.is_none());
        assert!(tooltip.races.is_none());
        assert!(tooltip.armor.is_none());
        assert!(tooltip.set_info.is_none());
        assert!(!tooltip.unique);
    }

    #[test]
    fn test_damage_requires_speed() {
        let lookup = MemoryLookup::new();
        let item = ItemRecord { delay: 0, ..sword() };
        let tooltip = TooltipComposer::new(&lookup).compose(&item);

        assert!(tooltip.damage_text.is_none());
        assert!(tooltip.dps.is_none());
    }

    #[test]
    fn test_bonus_damage_without_speed() {
        let lookup = MemoryLookup::new();
        let item = ItemRecord {
            delay: 0,
            dmg_min2: 3.0,
            dmg_max2: 7.0,
            dmg_type2: 5,
            ..sword()
        };
        let tooltip = TooltipComposer::new(&lookup).compose(&item);

        assert_eq!(tooltip.bonus_damage_text.as_deref(), Some("+3 - 7 Shadow Damage"));
    }

    #[test]
    fn test_stats_resistances_and_restrictions() {
        let lookup = MemoryLookup::new();
        let mut stats = [(0, 0); 10];
        stats[0] = (4, 15);
        stats[1] = (7, -2);
        stats[2] = (45, 23);
        stats[3] = (77, 4);
        stats[4] = (0, 9);
        let item = ItemRecord {
            stats,
            fire_res: 10,
            shadow_res: 5,
            frost_res: 0,
            allowable_class: 128 | 256,
            allowable_race: 0xFF,
            max_count: 1,
            ..sword()
        };
        let tooltip = TooltipComposer::new(&lookup).compose(&item);

        assert_eq!(
            tooltip.stats,
            vec![
                "+15 Strength".to_string(),
                "-2 Stamina".to_string(),
                "Equip: Increases spell power by 23.".to_string(),
                "+4 Unknown Stat 77".to_string(),
            ]
        );
        assert_eq!(
            tooltip.resistances,
            vec!["+10 Fire Resistance".to_string(), "+5 Shadow Resistance".to_string()]
        );
        assert_eq!(tooltip.classes.as_deref(), Some("Classes: Mage, Warlock"));
        assert!(tooltip.races.is_none());
        assert!(tooltip.unique);
    }

    #[test]
    fn test_spell_effects_with_trigger_prefix() {
        let lookup = MemoryLookup::new()
            .with_spell(SpellRecord {
                entry: 7597,
                name: "Increased Critical 1".to_string(),
                description: "Improves your chance to get a critical strike by $s1%.".to_string(),
                effects: SpellEffectParams { base_points: [0, 0, 0], ..Default::default() },
                ..Default::default()
            })
            .with_spell(SpellRecord {
                entry: 18203,
                name: "Shadow Bolt".to_string(),
                description: "Blasts the target for $s1 Shadow damage.".to_string(),
                effects: SpellEffectParams {
                    base_points: [99, 0, 0],
                    die_sides: [21, 0, 0],
                    duration_index: 0,
                },
                ..Default::default()
            });
        let mut item = sword();
        item.spells = [(7597, 1), (18203, 2), (424242, 0)];

        let tooltip = TooltipComposer::new(&lookup).compose(&item);

        assert_eq!(
            tooltip.spell_effects,
            vec![
                "Equip: Improves your chance to get a critical strike by 1%.".to_string(),
                "Chance on hit: Blasts the target for 120 Shadow damage.".to_string(),
            ]
        );
    }

    #[test]
    fn test_set_info_block() {
        let mut item_ids = [0; 10];
        item_ids[..2].copy_from_slice(&[2000, 2001]);
        let mut spell_ids = [0; 8];
        spell_ids[..2].copy_from_slice(&[500, 501]);
        let mut thresholds = [0; 8];
        thresholds[..2].copy_from_slice(&[4, 2]);
        let lookup = MemoryLookup::new()
            .with_item(sword())
            .with_item_meta(2001, "Shield of Testing", 3)
            .with_item_set(ItemSetRecord {
                set_id: 77,
                name: "Testing Regalia".to_string(),
                item_ids,
                spell_ids,
                thresholds,
            })
            .with_spell(SpellRecord {
                entry: 500,
                description: "Increases damage by $s1.".to_string(),
                effects: SpellEffectParams { base_points: [9, 0, 0], ..Default::default() },
                ..Default::default()
            })
            .with_spell(SpellRecord {
                entry: 501,
                description: "Restores $s1 mana every $d.".to_string(),
                effects: SpellEffectParams { base_points: [4, 0, 0], ..Default::default() },
                ..Default::default()
            });
        let item = ItemRecord { set_id: 77, ..sword() };

        let tooltip = TooltipComposer::new(&lookup).compose(&item);
        let set = tooltip.set_info.unwrap();

        assert_eq!(set.name, "Testing Regalia (0/2)");
        assert_eq!(set.items, vec!["Sword of Testing".to_string(), "Shield of Testing".to_string()]);
        assert_eq!(
            set.bonuses,
            vec![
                "(2) Set: Restores 5 mana every duration.".to_string(),
                "(4) Set: Increases damage by 10.".to_string(),
            ]
        );
    }

    #[test]
    fn test_description_cleanup_and_zero_price() {
        let lookup = MemoryLookup::new();
        let quoted = ItemRecord {
            description: "'Smells faintly of murloc.'".to_string(),
            sell_price: 0,
            ..sword()
        };
        let tooltip = TooltipComposer::new(&lookup).compose(&quoted);
        assert_eq!(tooltip.description.as_deref(), Some("Smells faintly of murloc."));
        assert!(tooltip.sell_price.is_none());

        let empty = ItemRecord { description: " ''".to_string(), ..sword() };
        assert!(TooltipComposer::new(&lookup).compose(&empty).description.is_none());
    }

    #[test]
    fn test_unknown_codes_omit_lines() {
        let lookup = MemoryLookup::new();
        let item = ItemRecord {
            entry: 1,
            name: "Odd Trinket".to_string(),
            quality: 9,
            bonding: 7,
            inventory_type: 0,
            class: 15,
            ..Default::default()
        };
        let tooltip = TooltipComposer::new(&lookup).compose(&item);

        assert_eq!(tooltip.quality_name, "Unknown");
        assert!(tooltip.binding.is_none());
        assert!(tooltip.slot_name.is_none());
        assert!(tooltip.type_name.is_none());
        assert!(tooltip.durability.is_none());
        assert!(tooltip.stats.is_empty());
    }

    #[test]
    fn test_compose_spell() {
        let lookup = MemoryLookup::new()
            .with_spell(SpellRecord {
                entry: 139,
                name: "Renew".to_string(),
                icon: "spell_holy_renew".to_string(),
                description: "Heals the target of $o1 damage over $d.".to_string(),
                effects: SpellEffectParams {
                    base_points: [44, 0, 0],
                    die_sides: [1, 0, 0],
                    duration_index: 9,
                },
                range_index: 5,
                cast_time_index: 0,
            })
            .with_duration(9, 15_000)
            .with_range(5, 40.0);

        let spell = TooltipComposer::new(&lookup).compose_spell(139).unwrap().unwrap();

        assert_eq!(spell.description, "Heals the target of 45 damage over 15 sec.");
        assert_eq!(spell.duration, "15s");
        assert_eq!(spell.range, "40 yd");
        assert_eq!(spell.cast_time, "Instant");
        assert!(TooltipComposer::new(&lookup).compose_spell(1).unwrap().is_none());
    }

    #[test]
    fn test_compose_spell_long_duration_cast_time_and_self_range() {
        let lookup = MemoryLookup::new()
            .with_spell(SpellRecord {
                entry: 10181,
                name: "Frostbolt".to_string(),
                description: "Slows movement for $d.".to_string(),
                effects: SpellEffectParams {
                    duration_index: 28,
                    ..Default::default()
                },
                range_index: 1,
                cast_time_index: 5,
                ..Default::default()
            })
            .with_spell(SpellRecord {
                entry: 10182,
                name: "Arcane Intellect".to_string(),
                range_index: 7,
                ..Default::default()
            })
            .with_duration(28, 1_800_000)
            .with_range(1, 0.0)
            .with_cast_time(5, 2500);
        let composer = TooltipComposer::new(&lookup);

        let frostbolt = composer.compose_spell(10181).unwrap().unwrap();
        assert_eq!(frostbolt.duration, "30m");
        assert_eq!(frostbolt.cast_time, "2.5s");
        assert_eq!(frostbolt.range, "Self");
        assert_eq!(frostbolt.description, "Slows movement for 30 min.");

        let intellect = composer.compose_spell(10182).unwrap().unwrap();
        assert_eq!(intellect.range, "Self");
        assert_eq!(intellect.duration, "Instant");
        assert_eq!(intellect.cast_time, "Instant");
    }

    #[test]
    fn test_tooltip_serializes_camel_case_without_empty_fields() {
        let lookup = MemoryLookup::new();
        let tooltip = TooltipComposer::new(&lookup).compose(&sword());
        let json = serde_json::to_value(&tooltip).unwrap();

        assert_eq!(json["qualityName"], "Rare");
        assert_eq!(json["dps"], "(6.0 damage per second)");
        assert!(json.get("setInfo").is_none());
        assert!(json.get("stats").is_none());
        assert!(json.get("unique").is_none());
    }
}
