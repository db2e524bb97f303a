//! Item set member and bonus resolution.

use crate::error::Result;
use crate::lookup::LookupProvider;
use crate::models::{ResolvedItemSet, SetBonus};
use crate::rules::clean_name;
use crate::spell_text::SpellTextExpander;

pub struct SetBonusResolver<'a, P: LookupProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: LookupProvider + ?Sized> SetBonusResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Member names and threshold-ordered bonuses for a set.
    ///
    /// Missing member items and bonuses whose spell has no text are left out.
    pub fn resolve(&self, set_id: i32) -> Result<Option<ResolvedItemSet>> {
        let Some(set) = self.provider.item_set(set_id)? else {
            return Ok(None);
        };

        let member_ids = set.member_ids();
        let mut member_names = Vec::with_capacity(member_ids.len());
        for item_id in &member_ids {
            match self.provider.item_meta(*item_id)? {
                Some(meta) if !meta.name.is_empty() => member_names.push(clean_name(&meta.name)),
                _ => tracing::debug!("Set {} member {} has no item record", set_id, item_id),
            }
        }

        let mut pairs: Vec<(i32, i32)> = set
            .spell_ids
            .iter()
            .zip(set.thresholds.iter())
            .filter(|(spell_id, threshold)| **spell_id > 0 && **threshold > 0)
            .map(|(spell_id, threshold)| (*spell_id, *threshold))
            .collect();
        pairs.sort_by_key(|&(_, threshold)| threshold);

        let expander = SpellTextExpander::new(self.provider);
        let bonuses = pairs
            .into_iter()
            .filter_map(|(spell_id, threshold)| {
                expander.spell_text(spell_id).map(|description| SetBonus {
                    threshold,
                    spell_id,
                    description,
                })
            })
            .collect();

        Ok(Some(ResolvedItemSet {
            set_id: set.set_id,
            name: clean_name(&set.name),
            item_count: member_ids.len(),
            member_names,
            bonuses,
        }))
    }
}
