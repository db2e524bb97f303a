//! Core library for browsing World of Warcraft reference data: loot graphs,
//! spell text, item sets and item tooltips.

pub mod config;
pub mod database;
pub mod error;
pub mod item_set;
pub mod lookup;
pub mod loot;
pub mod models;
pub mod rules;
pub mod spell_text;
pub mod tooltip;

pub use config::BrowserConfig;
pub use database::Database;
pub use error::{Result, WowDbError};
pub use item_set::SetBonusResolver;
pub use lookup::{LookupProvider, MemoryLookup};
pub use loot::{DROPPED_BY_LIMIT, LootResolver, LootSort, dropped_by, sort_loot};
pub use spell_text::SpellTextExpander;
pub use tooltip::TooltipComposer;
