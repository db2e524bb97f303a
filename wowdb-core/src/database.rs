use crate::error::{Result, WowDbError};
use crate::lookup::{GAMEOBJECT_TYPE_CHEST, LookupProvider};
use crate::models::{
    CreatureDrop, CreatureRecord, GameObjectRecord, ItemMeta, ItemRecord, ItemSetRecord, ItemSetSummary,
    ItemSummary, LootRow, LootSource, LootTableRef, SpellEffectParams, SpellRecord,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, ToSql, params};
use rusqlite_migration::{M, Migrations};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    icon TEXT,
    quality INTEGER NOT NULL DEFAULT 0,
    item_level INTEGER NOT NULL DEFAULT 0,
    required_level INTEGER NOT NULL DEFAULT 0,
    class INTEGER NOT NULL DEFAULT 0,
    subclass INTEGER NOT NULL DEFAULT 0,
    inventory_type INTEGER NOT NULL DEFAULT 0,
    sell_price INTEGER NOT NULL DEFAULT 0,
    allowable_class INTEGER NOT NULL DEFAULT -1,
    allowable_race INTEGER NOT NULL DEFAULT -1,
    bonding INTEGER NOT NULL DEFAULT 0,
    max_count INTEGER NOT NULL DEFAULT 0,
    max_durability INTEGER NOT NULL DEFAULT 0,
    stat_type1 INTEGER NOT NULL DEFAULT 0, stat_value1 INTEGER NOT NULL DEFAULT 0,
    stat_type2 INTEGER NOT NULL DEFAULT 0, stat_value2 INTEGER NOT NULL DEFAULT 0,
    stat_type3 INTEGER NOT NULL DEFAULT 0, stat_value3 INTEGER NOT NULL DEFAULT 0,
    stat_type4 INTEGER NOT NULL DEFAULT 0, stat_value4 INTEGER NOT NULL DEFAULT 0,
    stat_type5 INTEGER NOT NULL DEFAULT 0, stat_value5 INTEGER NOT NULL DEFAULT 0,
    stat_type6 INTEGER NOT NULL DEFAULT 0, stat_value6 INTEGER NOT NULL DEFAULT 0,
    stat_type7 INTEGER NOT NULL DEFAULT 0, stat_value7 INTEGER NOT NULL DEFAULT 0,
    stat_type8 INTEGER NOT NULL DEFAULT 0, stat_value8 INTEGER NOT NULL DEFAULT 0,
    stat_type9 INTEGER NOT NULL DEFAULT 0, stat_value9 INTEGER NOT NULL DEFAULT 0,
    stat_type10 INTEGER NOT NULL DEFAULT 0, stat_value10 INTEGER NOT NULL DEFAULT 0,
    delay INTEGER NOT NULL DEFAULT 0,
    dmg_min1 REAL NOT NULL DEFAULT 0, dmg_max1 REAL NOT NULL DEFAULT 0, dmg_type1 INTEGER NOT NULL DEFAULT 0,
    dmg_min2 REAL NOT NULL DEFAULT 0, dmg_max2 REAL NOT NULL DEFAULT 0, dmg_type2 INTEGER NOT NULL DEFAULT 0,
    armor INTEGER NOT NULL DEFAULT 0,
    holy_res INTEGER NOT NULL DEFAULT 0,
    fire_res INTEGER NOT NULL DEFAULT 0,
    nature_res INTEGER NOT NULL DEFAULT 0,
    frost_res INTEGER NOT NULL DEFAULT 0,
    shadow_res INTEGER NOT NULL DEFAULT 0,
    arcane_res INTEGER NOT NULL DEFAULT 0,
    spell_id1 INTEGER NOT NULL DEFAULT 0, spell_trigger1 INTEGER NOT NULL DEFAULT 0,
    spell_id2 INTEGER NOT NULL DEFAULT 0, spell_trigger2 INTEGER NOT NULL DEFAULT 0,
    spell_id3 INTEGER NOT NULL DEFAULT 0, spell_trigger3 INTEGER NOT NULL DEFAULT 0,
    set_id INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_items_name ON items(name);

CREATE TABLE IF NOT EXISTS itemsets (
    itemset_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    item1 INTEGER DEFAULT 0, item2 INTEGER DEFAULT 0, item3 INTEGER DEFAULT 0,
    item4 INTEGER DEFAULT 0, item5 INTEGER DEFAULT 0, item6 INTEGER DEFAULT 0,
    item7 INTEGER DEFAULT 0, item8 INTEGER DEFAULT 0, item9 INTEGER DEFAULT 0,
    item10 INTEGER DEFAULT 0,
    spell1 INTEGER DEFAULT 0, spell2 INTEGER DEFAULT 0, spell3 INTEGER DEFAULT 0,
    spell4 INTEGER DEFAULT 0, spell5 INTEGER DEFAULT 0, spell6 INTEGER DEFAULT 0,
    spell7 INTEGER DEFAULT 0, spell8 INTEGER DEFAULT 0,
    bonus1 INTEGER DEFAULT 0, bonus2 INTEGER DEFAULT 0, bonus3 INTEGER DEFAULT 0,
    bonus4 INTEGER DEFAULT 0, bonus5 INTEGER DEFAULT 0, bonus6 INTEGER DEFAULT 0,
    bonus7 INTEGER DEFAULT 0, bonus8 INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS spells (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    icon TEXT,
    effect_base_points1 INTEGER DEFAULT 0,
    effect_base_points2 INTEGER DEFAULT 0,
    effect_base_points3 INTEGER DEFAULT 0,
    effect_die_sides1 INTEGER DEFAULT 0,
    effect_die_sides2 INTEGER DEFAULT 0,
    effect_die_sides3 INTEGER DEFAULT 0,
    duration_index INTEGER DEFAULT 0,
    range_index INTEGER DEFAULT 0,
    cast_time_index INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS spell_durations (
    id INTEGER PRIMARY KEY,
    duration_base INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS spell_ranges (
    id INTEGER PRIMARY KEY,
    range_max REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS spell_cast_times (
    id INTEGER PRIMARY KEY,
    base INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS creatures (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    level_min INTEGER DEFAULT 0,
    level_max INTEGER DEFAULT 0,
    loot_id INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS objects (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    type INTEGER DEFAULT 0,
    data1 INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS creature_loot (
    entry INTEGER NOT NULL,
    item INTEGER NOT NULL,
    chance REAL NOT NULL,
    groupid INTEGER DEFAULT 0,
    mincount_or_ref INTEGER DEFAULT 1,
    maxcount INTEGER DEFAULT 1,
    PRIMARY KEY (entry, item)
);

CREATE TABLE IF NOT EXISTS gameobject_loot (
    entry INTEGER NOT NULL,
    item INTEGER NOT NULL,
    chance REAL NOT NULL,
    groupid INTEGER DEFAULT 0,
    mincount_or_ref INTEGER DEFAULT 1,
    maxcount INTEGER DEFAULT 1,
    PRIMARY KEY (entry, item)
);

CREATE TABLE IF NOT EXISTS item_loot (
    entry INTEGER NOT NULL,
    item INTEGER NOT NULL,
    chance REAL NOT NULL,
    groupid INTEGER DEFAULT 0,
    mincount_or_ref INTEGER DEFAULT 1,
    maxcount INTEGER DEFAULT 1,
    PRIMARY KEY (entry, item)
);

CREATE TABLE IF NOT EXISTS reference_loot (
    entry INTEGER NOT NULL,
    item INTEGER NOT NULL,
    chance REAL NOT NULL,
    groupid INTEGER DEFAULT 0,
    mincount_or_ref INTEGER DEFAULT 1,
    maxcount INTEGER DEFAULT 1,
    PRIMARY KEY (entry, item)
);
"#;

/// Column order shared by item reads and writes.
const ITEM_COLUMNS: [&str; 57] = [
    "entry", "name", "description", "icon", "quality", "item_level", "required_level",
    "class", "subclass", "inventory_type", "sell_price", "allowable_class", "allowable_race",
    "bonding", "max_count", "max_durability",
    "stat_type1", "stat_value1", "stat_type2", "stat_value2", "stat_type3", "stat_value3",
    "stat_type4", "stat_value4", "stat_type5", "stat_value5", "stat_type6", "stat_value6",
    "stat_type7", "stat_value7", "stat_type8", "stat_value8", "stat_type9", "stat_value9",
    "stat_type10", "stat_value10",
    "delay", "dmg_min1", "dmg_max1", "dmg_type1", "dmg_min2", "dmg_max2", "dmg_type2",
    "armor", "holy_res", "fire_res", "nature_res", "frost_res", "shadow_res", "arcane_res",
    "spell_id1", "spell_trigger1", "spell_id2", "spell_trigger2", "spell_id3", "spell_trigger3",
    "set_id",
];
const ITEM_STATS_START: usize = 16;
const ITEM_WEAPON_START: usize = 36;
const ITEM_SPELLS_START: usize = 50;

const ITEMSET_COLUMNS: &str = "itemset_id, name, \
    item1, item2, item3, item4, item5, item6, item7, item8, item9, item10, \
    spell1, spell2, spell3, spell4, spell5, spell6, spell7, spell8, \
    bonus1, bonus2, bonus3, bonus4, bonus5, bonus6, bonus7, bonus8";

const SPELL_COLUMNS: &str = "entry, name, description, icon, \
    effect_base_points1, effect_base_points2, effect_base_points3, \
    effect_die_sides1, effect_die_sides2, effect_die_sides3, \
    duration_index, range_index, cast_time_index";

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(SCHEMA)])
}

/// SQLite-backed reference database.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn new(path: &std::path::Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(WowDbError::Pool)?;

        let db = Self { pool };
        db.run_migrations()?;
        tracing::debug!("Opened database at {:?}", path);
        Ok(db)
    }

    /// Private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool holds a
    /// single connection.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(WowDbError::Pool)?;

        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(WowDbError::Pool)
    }

    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.connection()?;
        migrations().to_latest(&mut conn)?;
        Ok(())
    }

    pub fn insert_item(&self, item: &ItemRecord) -> Result<()> {
        let conn = self.connection()?;

        let header: [&dyn ToSql; 16] = [
            &item.entry,
            &item.name,
            &item.description,
            &item.icon,
            &item.quality,
            &item.item_level,
            &item.required_level,
            &item.class,
            &item.subclass,
            &item.inventory_type,
            &item.sell_price,
            &item.allowable_class,
            &item.allowable_race,
            &item.bonding,
            &item.max_count,
            &item.max_durability,
        ];
        let mut values: Vec<&dyn ToSql> = header.to_vec();
        for (stat_type, stat_value) in &item.stats {
            values.push(stat_type);
            values.push(stat_value);
        }
        let weapon_and_armor: [&dyn ToSql; 14] = [
            &item.delay,
            &item.dmg_min1,
            &item.dmg_max1,
            &item.dmg_type1,
            &item.dmg_min2,
            &item.dmg_max2,
            &item.dmg_type2,
            &item.armor,
            &item.holy_res,
            &item.fire_res,
            &item.nature_res,
            &item.frost_res,
            &item.shadow_res,
            &item.arcane_res,
        ];
        values.extend_from_slice(&weapon_and_armor);
        for (spell_id, trigger) in &item.spells {
            values.push(spell_id);
            values.push(trigger);
        }
        values.push(&item.set_id);

        let placeholders: Vec<String> = (1..=ITEM_COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO items ({}) VALUES ({})",
            ITEM_COLUMNS.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, values.as_slice())?;
        Ok(())
    }

    pub fn insert_spell(&self, spell: &SpellRecord) -> Result<()> {
        let conn = self.connection()?;
        let effects = &spell.effects;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO spells ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                SPELL_COLUMNS
            ),
            params![
                spell.entry,
                spell.name,
                spell.description,
                spell.icon,
                effects.base_points[0],
                effects.base_points[1],
                effects.base_points[2],
                effects.die_sides[0],
                effects.die_sides[1],
                effects.die_sides[2],
                effects.duration_index,
                spell.range_index,
                spell.cast_time_index,
            ],
        )?;
        Ok(())
    }

    pub fn insert_duration(&self, index: i32, millis: i32) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO spell_durations (id, duration_base) VALUES (?1, ?2)",
            (index, millis),
        )?;
        Ok(())
    }

    pub fn insert_range(&self, index: i32, yards: f64) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO spell_ranges (id, range_max) VALUES (?1, ?2)",
            (index, yards),
        )?;
        Ok(())
    }

    pub fn insert_cast_time(&self, index: i32, millis: i32) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO spell_cast_times (id, base) VALUES (?1, ?2)",
            (index, millis),
        )?;
        Ok(())
    }

    pub fn insert_item_set(&self, set: &ItemSetRecord) -> Result<()> {
        let conn = self.connection()?;

        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(28);
        values.push(&set.set_id);
        values.push(&set.name);
        values.extend(set.item_ids.iter().map(|id| id as &dyn ToSql));
        values.extend(set.spell_ids.iter().map(|id| id as &dyn ToSql));
        values.extend(set.thresholds.iter().map(|t| t as &dyn ToSql));

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO itemsets ({}) VALUES ({})",
            ITEMSET_COLUMNS,
            placeholders.join(", ")
        );
        conn.execute(&sql, values.as_slice())?;
        Ok(())
    }

    pub fn insert_loot_row(&self, table: LootTableRef, row: &LootRow) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (entry, item, chance, groupid, mincount_or_ref, maxcount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table.kind.table_name()
            ),
            (
                table.id,
                row.item_or_ref_id,
                row.chance,
                row.group_id,
                row.min_count_or_ref,
                row.max_count,
            ),
        )?;
        Ok(())
    }

    pub fn insert_creature(&self, creature: &CreatureRecord) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO creatures (entry, name, level_min, level_max, loot_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                creature.entry,
                &creature.name,
                creature.level_min,
                creature.level_max,
                creature.loot_id,
            ),
        )?;
        Ok(())
    }

    pub fn insert_object(&self, object: &GameObjectRecord) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO objects (entry, name, type, data1) VALUES (?1, ?2, ?3, ?4)",
            (object.entry, &object.name, object.object_type, object.data1),
        )?;
        Ok(())
    }

    /// Items whose name contains `query`, best quality first.
    pub fn search_items(&self, query: &str, limit: usize) -> Result<Vec<ItemSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT entry, name, COALESCE(icon, ''), quality, item_level
             FROM items
             WHERE name LIKE ?1
             ORDER BY quality DESC, name ASC
             LIMIT ?2",
        )?;

        let pattern = format!("%{}%", query);
        let items = stmt
            .query_map(params![pattern, limit as i64], |row| {
                Ok(ItemSummary {
                    entry: row.get(0)?,
                    name: row.get(1)?,
                    icon: row.get(2)?,
                    quality: row.get(3)?,
                    item_level: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// All item sets ordered by name.
    pub fn item_sets(&self) -> Result<Vec<ItemSetSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM itemsets ORDER BY name ASC",
            ITEMSET_COLUMNS
        ))?;

        let sets = stmt
            .query_map([], item_set_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sets
            .into_iter()
            .map(|set| ItemSetSummary {
                item_ids: set.member_ids(),
                set_id: set.set_id,
                name: set.name,
            })
            .collect())
    }
}

fn item_from_row(row: &Row) -> rusqlite::Result<ItemRecord> {
    let mut stats = [(0, 0); 10];
    for (i, stat) in stats.iter_mut().enumerate() {
        let col = ITEM_STATS_START + i * 2;
        *stat = (row.get(col)?, row.get(col + 1)?);
    }

    let mut spells = [(0, 0); 3];
    for (i, spell) in spells.iter_mut().enumerate() {
        let col = ITEM_SPELLS_START + i * 2;
        *spell = (row.get(col)?, row.get(col + 1)?);
    }

    let w = ITEM_WEAPON_START;
    Ok(ItemRecord {
        entry: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        icon: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        quality: row.get(4)?,
        item_level: row.get(5)?,
        required_level: row.get(6)?,
        class: row.get(7)?,
        subclass: row.get(8)?,
        inventory_type: row.get(9)?,
        sell_price: row.get(10)?,
        allowable_class: row.get(11)?,
        allowable_race: row.get(12)?,
        bonding: row.get(13)?,
        max_count: row.get(14)?,
        max_durability: row.get(15)?,
        stats,
        delay: row.get(w)?,
        dmg_min1: row.get(w + 1)?,
        dmg_max1: row.get(w + 2)?,
        dmg_type1: row.get(w + 3)?,
        dmg_min2: row.get(w + 4)?,
        dmg_max2: row.get(w + 5)?,
        dmg_type2: row.get(w + 6)?,
        armor: row.get(w + 7)?,
        holy_res: row.get(w + 8)?,
        fire_res: row.get(w + 9)?,
        nature_res: row.get(w + 10)?,
        frost_res: row.get(w + 11)?,
        shadow_res: row.get(w + 12)?,
        arcane_res: row.get(w + 13)?,
        spells,
        set_id: row.get(ITEM_SPELLS_START + 6)?,
    })
}

fn item_set_from_row(row: &Row) -> rusqlite::Result<ItemSetRecord> {
    let mut item_ids = [0; 10];
    for (i, id) in item_ids.iter_mut().enumerate() {
        *id = row.get::<_, Option<i32>>(2 + i)?.unwrap_or(0);
    }
    let mut spell_ids = [0; 8];
    for (i, id) in spell_ids.iter_mut().enumerate() {
        *id = row.get::<_, Option<i32>>(12 + i)?.unwrap_or(0);
    }
    let mut thresholds = [0; 8];
    for (i, threshold) in thresholds.iter_mut().enumerate() {
        *threshold = row.get::<_, Option<i32>>(20 + i)?.unwrap_or(0);
    }

    Ok(ItemSetRecord {
        set_id: row.get(0)?,
        name: row.get(1)?,
        item_ids,
        spell_ids,
        thresholds,
    })
}

fn spell_from_row(row: &Row) -> rusqlite::Result<SpellRecord> {
    let int = |idx: usize| -> rusqlite::Result<i32> {
        Ok(row.get::<_, Option<i32>>(idx)?.unwrap_or(0))
    };

    Ok(SpellRecord {
        entry: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        icon: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        effects: SpellEffectParams {
            base_points: [int(4)?, int(5)?, int(6)?],
            die_sides: [int(7)?, int(8)?, int(9)?],
            duration_index: int(10)?,
        },
        range_index: int(11)?,
        cast_time_index: int(12)?,
    })
}

impl LookupProvider for Database {
    fn loot_rows(&self, table: LootTableRef) -> Result<Vec<LootRow>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT item, chance, groupid, mincount_or_ref, maxcount FROM {} WHERE entry = ?1",
            table.kind.table_name()
        ))?;

        let rows = stmt
            .query_map([table.id], |row| {
                Ok(LootRow {
                    item_or_ref_id: row.get(0)?,
                    chance: row.get(1)?,
                    group_id: row.get::<_, Option<i32>>(2)?.unwrap_or(0),
                    min_count_or_ref: row.get::<_, Option<i32>>(3)?.unwrap_or(1),
                    max_count: row.get::<_, Option<i32>>(4)?.unwrap_or(1),
                })
            })?
            .filter_map(|row| match row {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::debug!("Skipping unreadable row in {:?}: {}", table, e);
                    None
                }
            })
            .collect();

        Ok(rows)
    }

    fn item_meta(&self, item_id: i32) -> Result<Option<ItemMeta>> {
        let conn = self.connection()?;
        let meta = conn
            .query_row(
                "SELECT name, COALESCE(icon, ''), quality FROM items WHERE entry = ?1",
                [item_id],
                |row| {
                    Ok(ItemMeta {
                        name: row.get(0)?,
                        icon: row.get(1)?,
                        quality: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }

    fn item(&self, item_id: i32) -> Result<Option<ItemRecord>> {
        let conn = self.connection()?;
        let item = conn
            .query_row(
                &format!(
                    "SELECT {} FROM items WHERE entry = ?1",
                    ITEM_COLUMNS.join(", ")
                ),
                [item_id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    fn spell(&self, spell_id: i32) -> Result<Option<SpellRecord>> {
        let conn = self.connection()?;
        let spell = conn
            .query_row(
                &format!("SELECT {} FROM spells WHERE entry = ?1", SPELL_COLUMNS),
                [spell_id],
                spell_from_row,
            )
            .optional()?;
        Ok(spell)
    }

    fn duration_millis(&self, index: i32) -> Result<Option<i32>> {
        let conn = self.connection()?;
        let millis = conn
            .query_row(
                "SELECT duration_base FROM spell_durations WHERE id = ?1",
                [index],
                |row| row.get(0),
            )
            .optional()?;
        Ok(millis)
    }

    fn item_set(&self, set_id: i32) -> Result<Option<ItemSetRecord>> {
        let conn = self.connection()?;
        let set = conn
            .query_row(
                &format!("SELECT {} FROM itemsets WHERE itemset_id = ?1", ITEMSET_COLUMNS),
                [set_id],
                item_set_from_row,
            )
            .optional()?;
        Ok(set)
    }

    fn loot_id(&self, source: LootSource, entry: i32) -> Result<Option<i32>> {
        let conn = self.connection()?;
        let loot_id = match source {
            LootSource::Creature => conn
                .query_row(
                    "SELECT loot_id FROM creatures WHERE entry = ?1",
                    [entry],
                    |row| row.get::<_, Option<i32>>(0),
                )
                .optional()?
                .flatten(),
            LootSource::GameObject => conn
                .query_row(
                    "SELECT data1 FROM objects WHERE entry = ?1 AND type = ?2",
                    [entry, GAMEOBJECT_TYPE_CHEST],
                    |row| row.get::<_, Option<i32>>(0),
                )
                .optional()?
                .flatten(),
            LootSource::Item => conn
                .query_row("SELECT entry FROM items WHERE entry = ?1", [entry], |row| {
                    row.get(0)
                })
                .optional()?,
        };
        Ok(loot_id)
    }

    fn creature_drops(&self, item_id: i32, limit: usize) -> Result<Vec<CreatureDrop>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT c.entry, c.name, c.level_min, c.level_max, cl.chance
             FROM creature_loot cl
             JOIN creatures c ON cl.entry = c.loot_id
             WHERE cl.item = ?1 AND cl.mincount_or_ref >= 0
             ORDER BY cl.chance DESC, c.entry ASC
             LIMIT ?2",
        )?;

        let drops = stmt
            .query_map(params![item_id, limit as i64], |row| {
                Ok(CreatureDrop {
                    entry: row.get(0)?,
                    name: row.get(1)?,
                    level_min: row.get::<_, Option<i32>>(2)?.unwrap_or(0),
                    level_max: row.get::<_, Option<i32>>(3)?.unwrap_or(0),
                    chance: row.get(4)?,
                })
            })?
            .filter_map(|row| match row {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::debug!("Skipping unreadable drop row for item {}: {}", item_id, e);
                    None
                }
            })
            .collect();

        Ok(drops)
    }

    fn range_yards(&self, index: i32) -> Result<Option<f64>> {
        let conn = self.connection()?;
        let yards = conn
            .query_row(
                "SELECT range_max FROM spell_ranges WHERE id = ?1",
                [index],
                |row| row.get(0),
            )
            .optional()?;
        Ok(yards)
    }

    fn cast_time_millis(&self, index: i32) -> Result<Option<i32>> {
        let conn = self.connection()?;
        let millis = conn
            .query_row(
                "SELECT base FROM spell_cast_times WHERE id = ?1",
                [index],
                |row| row.get(0),
            )
            .optional()?;
        Ok(millis)
    }
}
