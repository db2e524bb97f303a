//! Fixed game lookup tables and formatting helpers.
//!
//! Every table is a closed enumeration. Codes outside the known range map to
//! `None` or to a formatted placeholder so newer game data still renders.

/// Item quality, indexed by the stored quality code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Poor,
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
}

impl Quality {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Quality::Poor),
            1 => Some(Quality::Common),
            2 => Some(Quality::Uncommon),
            3 => Some(Quality::Rare),
            4 => Some(Quality::Epic),
            5 => Some(Quality::Legendary),
            6 => Some(Quality::Artifact),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quality::Poor => "Poor",
            Quality::Common => "Common",
            Quality::Uncommon => "Uncommon",
            Quality::Rare => "Rare",
            Quality::Epic => "Epic",
            Quality::Legendary => "Legendary",
            Quality::Artifact => "Artifact",
        }
    }
}

pub fn quality_name(code: i32) -> &'static str {
    Quality::from_code(code).map_or("Unknown", Quality::name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bonding {
    OnPickup,
    OnEquip,
    OnUse,
    QuestItem,
}

impl Bonding {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Bonding::OnPickup),
            2 => Some(Bonding::OnEquip),
            3 => Some(Bonding::OnUse),
            4 => Some(Bonding::QuestItem),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Bonding::OnPickup => "Binds when picked up",
            Bonding::OnEquip => "Binds when equipped",
            Bonding::OnUse => "Binds when used",
            Bonding::QuestItem => "Quest Item",
        }
    }
}

/// Equipment slot label for an inventory type code.
pub fn slot_name(inventory_type: i32) -> Option<&'static str> {
    let name = match inventory_type {
        1 => "Head",
        2 => "Neck",
        3 => "Shoulder",
        4 => "Shirt",
        5 => "Chest",
        6 => "Waist",
        7 => "Legs",
        8 => "Feet",
        9 => "Wrist",
        10 => "Hands",
        11 => "Finger",
        12 => "Trinket",
        13 => "One-Hand",
        14 | 22 => "Off Hand",
        15 | 26 => "Ranged",
        16 => "Back",
        17 => "Two-Hand",
        18 => "Bag",
        19 => "Tabard",
        20 => "Robe",
        21 => "Main Hand",
        23 => "Held In Off-Hand",
        24 => "Ammo",
        25 => "Thrown",
        27 => "Quiver",
        28 => "Relic",
        _ => return None,
    };
    Some(name)
}

const ITEM_CLASS_WEAPON: i32 = 2;
const ITEM_CLASS_ARMOR: i32 = 4;

/// Weapon or armor type label for a class/subclass pair.
pub fn type_name(class: i32, subclass: i32) -> Option<&'static str> {
    let name = match (class, subclass) {
        (ITEM_CLASS_WEAPON, 0 | 1) => "Axe",
        (ITEM_CLASS_WEAPON, 2) => "Bow",
        (ITEM_CLASS_WEAPON, 3) => "Gun",
        (ITEM_CLASS_WEAPON, 4 | 5) => "Mace",
        (ITEM_CLASS_WEAPON, 6) => "Polearm",
        (ITEM_CLASS_WEAPON, 7 | 8) => "Sword",
        (ITEM_CLASS_WEAPON, 10) => "Staff",
        (ITEM_CLASS_WEAPON, 13) => "Fist Weapon",
        (ITEM_CLASS_WEAPON, 14) => "Miscellaneous",
        (ITEM_CLASS_WEAPON, 15) => "Dagger",
        (ITEM_CLASS_WEAPON, 16) => "Thrown",
        (ITEM_CLASS_WEAPON, 17) => "Spear",
        (ITEM_CLASS_WEAPON, 18) => "Crossbow",
        (ITEM_CLASS_WEAPON, 19) => "Wand",
        (ITEM_CLASS_WEAPON, 20) => "Fishing Pole",
        (ITEM_CLASS_ARMOR, 0) => "Misc",
        (ITEM_CLASS_ARMOR, 1) => "Cloth",
        (ITEM_CLASS_ARMOR, 2) => "Leather",
        (ITEM_CLASS_ARMOR, 3) => "Mail",
        (ITEM_CLASS_ARMOR, 4) => "Plate",
        (ITEM_CLASS_ARMOR, 5) => "Buckler",
        (ITEM_CLASS_ARMOR, 6) => "Shield",
        (ITEM_CLASS_ARMOR, 7) => "Libram",
        (ITEM_CLASS_ARMOR, 8) => "Idol",
        (ITEM_CLASS_ARMOR, 9) => "Totem",
        _ => return None,
    };
    Some(name)
}

/// Item stat codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatType {
    Mana,
    Health,
    Agility,
    Strength,
    Intellect,
    Spirit,
    Stamina,
    DefenseRating,
    DodgeRating,
    ParryRating,
    BlockRating,
    MeleeHitRating,
    RangedHitRating,
    SpellHitRating,
    MeleeCritRating,
    RangedCritRating,
    SpellCritRating,
    SpellHasteRating,
    HitRating,
    CritRating,
    ResilienceRating,
    HasteRating,
    ExpertiseRating,
    AttackPower,
    RangedAttackPower,
    SpellHealing,
    SpellDamage,
    ManaRegeneration,
    ArmorPenetrationRating,
    SpellPower,
    HealthRegeneration,
    SpellPenetration,
    BlockValue,
}

impl StatType {
    pub fn from_code(code: i32) -> Option<Self> {
        use StatType::*;
        let stat = match code {
            0 => Mana,
            1 => Health,
            3 => Agility,
            4 => Strength,
            5 => Intellect,
            6 => Spirit,
            7 => Stamina,
            12 => DefenseRating,
            13 => DodgeRating,
            14 => ParryRating,
            15 => BlockRating,
            16 => MeleeHitRating,
            17 => RangedHitRating,
            18 => SpellHitRating,
            19 => MeleeCritRating,
            20 => RangedCritRating,
            21 => SpellCritRating,
            30 => SpellHasteRating,
            31 => HitRating,
            32 => CritRating,
            35 => ResilienceRating,
            36 => HasteRating,
            37 => ExpertiseRating,
            38 => AttackPower,
            39 => RangedAttackPower,
            41 => SpellHealing,
            42 => SpellDamage,
            43 => ManaRegeneration,
            44 => ArmorPenetrationRating,
            45 => SpellPower,
            46 => HealthRegeneration,
            47 => SpellPenetration,
            48 => BlockValue,
            _ => return None,
        };
        Some(stat)
    }

    /// Name shown on "+N Name" lines for primary stats.
    pub fn primary_name(self) -> Option<&'static str> {
        match self {
            StatType::Mana => Some("Mana"),
            StatType::Health => Some("Health"),
            StatType::Agility => Some("Agility"),
            StatType::Strength => Some("Strength"),
            StatType::Intellect => Some("Intellect"),
            StatType::Spirit => Some("Spirit"),
            StatType::Stamina => Some("Stamina"),
            _ => None,
        }
    }

    fn equip_sentence(self, value: i32) -> String {
        use StatType::*;
        match self {
            DefenseRating => format!("Equip: Increases defense rating by {}.", value),
            DodgeRating => format!("Equip: Increases your dodge rating by {}.", value),
            ParryRating => format!("Equip: Increases your parry rating by {}.", value),
            BlockRating => format!("Equip: Increases your shield block rating by {}.", value),
            MeleeHitRating => format!("Equip: Increases your melee hit rating by {}.", value),
            RangedHitRating => format!("Equip: Increases your ranged hit rating by {}.", value),
            SpellHitRating => format!("Equip: Increases your spell hit rating by {}.", value),
            MeleeCritRating | CritRating => {
                format!("Equip: Increases your critical strike rating by {}.", value)
            }
            RangedCritRating => {
                format!("Equip: Increases your ranged critical strike rating by {}.", value)
            }
            SpellCritRating => {
                format!("Equip: Increases your spell critical strike rating by {}.", value)
            }
            SpellHasteRating => format!("Equip: Increases your spell haste rating by {}.", value),
            HitRating => format!("Equip: Increases your hit rating by {}.", value),
            ResilienceRating => format!("Equip: Increases your resilience rating by {}.", value),
            HasteRating => format!("Equip: Increases your haste rating by {}.", value),
            ExpertiseRating => format!("Equip: Increases your expertise rating by {}.", value),
            AttackPower => format!("Equip: Increases attack power by {}.", value),
            RangedAttackPower => format!("Equip: Increases ranged attack power by {}.", value),
            SpellHealing => {
                format!("Equip: Increases healing done by spells and effects by up to {}.", value)
            }
            SpellDamage => format!(
                "Equip: Increases damage done by magical spells and effects by up to {}.",
                value
            ),
            ManaRegeneration => format!("Equip: Restores {} mana per 5 sec.", value),
            ArmorPenetrationRating => {
                format!("Equip: Increases your armor penetration rating by {}.", value)
            }
            SpellPower => format!("Equip: Increases spell power by {}.", value),
            HealthRegeneration => format!("Equip: Restores {} health per 5 sec.", value),
            SpellPenetration => format!("Equip: Increases your spell penetration by {}.", value),
            BlockValue => format!("Equip: Increases the block value of your shield by {}.", value),
            Mana | Health | Agility | Strength | Intellect | Spirit | Stamina => {
                signed_stat(value, self.primary_name().unwrap_or_default())
            }
        }
    }
}

fn signed_stat(value: i32, name: &str) -> String {
    if value > 0 {
        format!("+{} {}", value, name)
    } else {
        format!("{} {}", value, name)
    }
}

/// Tooltip line for one stat slot.
pub fn format_stat(code: i32, value: i32) -> String {
    match StatType::from_code(code) {
        Some(stat) => match stat.primary_name() {
            Some(name) => signed_stat(value, name),
            None => stat.equip_sentence(value),
        },
        None => signed_stat(value, &format!("Unknown Stat {}", code)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSchool {
    Physical,
    Holy,
    Fire,
    Nature,
    Frost,
    Shadow,
    Arcane,
}

impl DamageSchool {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DamageSchool::Physical),
            1 => Some(DamageSchool::Holy),
            2 => Some(DamageSchool::Fire),
            3 => Some(DamageSchool::Nature),
            4 => Some(DamageSchool::Frost),
            5 => Some(DamageSchool::Shadow),
            6 => Some(DamageSchool::Arcane),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DamageSchool::Physical => "Physical",
            DamageSchool::Holy => "Holy",
            DamageSchool::Fire => "Fire",
            DamageSchool::Nature => "Nature",
            DamageSchool::Frost => "Frost",
            DamageSchool::Shadow => "Shadow",
            DamageSchool::Arcane => "Arcane",
        }
    }
}

pub fn school_name(code: i32) -> String {
    DamageSchool::from_code(code)
        .map(|school| school.name().to_string())
        .unwrap_or_else(|| format!("School {}", code))
}

/// How an item spell fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellTrigger {
    Use,
    Equip,
    ChanceOnHit,
}

impl SpellTrigger {
    /// Unrecognized codes behave like equip effects.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | 4 | 5 | 6 => SpellTrigger::Use,
            2 => SpellTrigger::ChanceOnHit,
            _ => SpellTrigger::Equip,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            SpellTrigger::Use => "Use:",
            SpellTrigger::Equip => "Equip:",
            SpellTrigger::ChanceOnHit => "Chance on hit:",
        }
    }
}

const CLASS_MASKS: [(i32, &str); 9] = [
    (1, "Warrior"),
    (2, "Paladin"),
    (4, "Hunter"),
    (8, "Rogue"),
    (16, "Priest"),
    (64, "Shaman"),
    (128, "Mage"),
    (256, "Warlock"),
    (1024, "Druid"),
];

const RACE_MASKS: [(i32, &str); 8] = [
    (1, "Human"),
    (2, "Orc"),
    (4, "Dwarf"),
    (8, "Night Elf"),
    (16, "Undead"),
    (32, "Tauren"),
    (64, "Gnome"),
    (128, "Troll"),
];

fn decode_mask(mask: i32, sentinel: i32, table: &[(i32, &str)], label: &str) -> Option<String> {
    if mask <= 0 || mask == sentinel {
        return None;
    }
    let names: Vec<&str> = table
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(format!("{}: {}", label, names.join(", ")))
    }
}

/// "Classes: ..." line, or `None` when the mask means "any class".
pub fn class_restrictions(mask: i32) -> Option<String> {
    decode_mask(mask, 0xFFFF, &CLASS_MASKS, "Classes")
}

/// "Races: ..." line, or `None` when the mask means "any race".
pub fn race_restrictions(mask: i32) -> Option<String> {
    decode_mask(mask, 0xFF, &RACE_MASKS, "Races")
}

/// Format copper as "1g 23s 45c", skipping zero denominations.
pub fn format_money(copper: i32) -> String {
    let gold = copper / 10000;
    let silver = (copper % 10000) / 100;
    let cop = copper % 100;

    let mut parts = Vec::new();
    if gold > 0 {
        parts.push(format!("{}g", gold));
    }
    if silver > 0 {
        parts.push(format!("{}s", silver));
    }
    if cop > 0 || parts.is_empty() {
        parts.push(format!("{}c", cop));
    }
    parts.join(" ")
}

/// Strip quote artifacts left by the SQL extraction step.
pub fn clean_name(raw: &str) -> String {
    let mut name = raw;
    if let Some(rest) = name.strip_prefix(" '") {
        if !rest.is_empty() {
            name = rest;
        }
    }
    if let Some(rest) = name.strip_prefix('\'') {
        name = rest;
    }
    if let Some(rest) = name.strip_suffix('\'') {
        name = rest;
    }
    name.to_string()
}

/// Round half-up to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
