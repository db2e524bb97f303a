//! Spell description placeholder substitution.
//!
//! Recognized tokens: `$d`/`$D` (duration), `$s1..3`/`$S1..3` and
//! `$o1..3`/`$O1..3` (effect magnitude), plus the braced `${s1}` forms.
//! Anything else is left as written.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::lookup::LookupProvider;
use crate::models::{SpellEffectParams, SpellRecord};

lazy_static! {
    static ref TOKEN_RE: Regex =
        Regex::new(r"\$(?:\{([sSoO])([1-3])\}|([sSoO])([1-3])|([dD]))").expect("valid token regex");
}

/// Shown for `$d` when the duration is unknown.
pub const DURATION_FALLBACK: &str = "duration";

/// Displayed magnitude of one effect slot. Random effects show their maximum roll.
pub fn effect_value(base_points: i32, die_sides: i32) -> i64 {
    if die_sides > 1 {
        base_points as i64 + die_sides as i64
    } else {
        base_points as i64 + 1
    }
}

/// "N sec" under a minute, "N min" under an hour, else "N hr".
pub fn format_duration(millis: i32) -> String {
    let seconds = millis / 1000;
    if seconds < 60 {
        format!("{} sec", seconds)
    } else if seconds < 3600 {
        format!("{} min", seconds / 60)
    } else {
        format!("{} hr", seconds / 3600)
    }
}

fn duration_text<F>(duration_index: i32, duration_lookup: F) -> String
where
    F: Fn(i32) -> Option<i32>,
{
    if duration_index <= 0 {
        return DURATION_FALLBACK.to_string();
    }
    match duration_lookup(duration_index) {
        Some(millis) if millis > 0 => format_duration(millis),
        _ => DURATION_FALLBACK.to_string(),
    }
}

/// Substitute placeholders in a raw spell description.
pub fn expand<F>(description: &str, effects: &SpellEffectParams, duration_lookup: F) -> String
where
    F: Fn(i32) -> Option<i32>,
{
    if !description.contains('$') {
        return description.to_string();
    }

    let values: [i64; 3] =
        std::array::from_fn(|i| effect_value(effects.base_points[i], effects.die_sides[i]));
    let duration = if TOKEN_RE
        .captures_iter(description)
        .any(|caps| caps.get(5).is_some())
    {
        duration_text(effects.duration_index, duration_lookup)
    } else {
        String::new()
    };

    TOKEN_RE
        .replace_all(description, |caps: &Captures| {
            if caps.get(5).is_some() {
                return duration.clone();
            }
            let slot = caps
                .get(2)
                .or_else(|| caps.get(4))
                .and_then(|m| m.as_str().parse::<usize>().ok());
            match slot {
                Some(n @ 1..=3) => values[n - 1].to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Resolves spell ids to expanded display text through a LookupProvider.
pub struct SpellTextExpander<'a, P: LookupProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: LookupProvider + ?Sized> SpellTextExpander<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Duration lookup that treats provider failures as "unknown".
    pub fn duration_millis(&self, index: i32) -> Option<i32> {
        self.provider.duration_millis(index).unwrap_or_else(|e| {
            tracing::warn!("Duration lookup {} failed: {}", index, e);
            None
        })
    }

    /// Expand a spell's own description.
    pub fn expand_record(&self, spell: &SpellRecord) -> String {
        expand(&spell.description, &spell.effects, |index| self.duration_millis(index))
    }

    /// Expanded description (or name, if the spell has none) for a spell id.
    /// `None` when the spell is missing or has no text at all.
    pub fn spell_text(&self, spell_id: i32) -> Option<String> {
        let spell = match self.provider.spell(spell_id) {
            Ok(Some(spell)) => spell,
            Ok(None) => {
                tracing::debug!("Spell {} not found", spell_id);
                return None;
            }
            Err(e) => {
                tracing::warn!("Spell lookup {} failed: {}", spell_id, e);
                return None;
            }
        };

        let raw = if spell.description.is_empty() {
            &spell.name
        } else {
            &spell.description
        };
        if raw.is_empty() {
            return None;
        }
        Some(expand(raw, &spell.effects, |index| self.duration_millis(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MemoryLookup;

    fn params(base_points: [i32; 3], die_sides: [i32; 3], duration_index: i32) -> SpellEffectParams {
        SpellEffectParams { base_points, die_sides, duration_index }
    }

    #[test]
    fn test_effect_value() {
        assert_eq!(effect_value(9, 0), 10);
        assert_eq!(effect_value(9, 1), 10);
        assert_eq!(effect_value(9, 11), 20);
        assert_eq!(effect_value(-1, 0), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(15_000), "15 sec");
        assert_eq!(format_duration(59_999), "59 sec");
        assert_eq!(format_duration(60_000), "1 min");
        assert_eq!(format_duration(1_800_000), "30 min");
        assert_eq!(format_duration(7_200_000), "2 hr");
    }

    #[test]
    fn test_expand_substitutes_case_insensitive_tokens() {
        let effects = params([49, 4, 0], [1, 0, 0], 0);
        let text = expand("Heals $s1 and $S1, then $o2 over time.", &effects, |_| None);
        assert_eq!(text, "Heals 50 and 50, then 5 over time.");
    }

    #[test]
    fn test_expand_braced_tokens() {
        let effects = params([9, 0, 0], [0, 0, 0], 0);
        let text = expand("Deals ${s1} damage, ${O1} total.", &effects, |_| None);
        assert_eq!(text, "Deals 10 damage, 10 total.");
    }

    #[test]
    fn test_expand_duration_lookup() {
        let effects = params([0, 0, 0], [0, 0, 0], 21);
        let lookup = |index: i32| (index == 21).then_some(120_000);
        assert_eq!(expand("Lasts $d.", &effects, lookup), "Lasts 2 min.");
        assert_eq!(expand("Lasts $D.", &effects, lookup), "Lasts 2 min.");
    }

    #[test]
    fn test_expand_duration_fallback() {
        let no_index = params([0, 0, 0], [0, 0, 0], 0);
        assert_eq!(expand("For $d.", &no_index, |_| Some(5000)), "For duration.");

        let zero_millis = params([0, 0, 0], [0, 0, 0], 3);
        assert_eq!(expand("For $d.", &zero_millis, |_| Some(0)), "For duration.");
        assert_eq!(expand("For $d.", &zero_millis, |_| None), "For duration.");
    }

    #[test]
    fn test_expand_leaves_unknown_tokens() {
        let effects = params([4, 0, 0], [0, 0, 0], 0);
        let text = expand("Every $t1 sec for $s1, radius $a1, $s4.", &effects, |_| None);
        assert_eq!(text, "Every $t1 sec for 5, radius $a1, $s4.");
    }

    #[test]
    fn test_expand_without_tokens_is_identity() {
        let effects = params([1, 2, 3], [4, 5, 6], 7);
        let text = "Increases your stamina. Costs $ nothing.";
        assert_eq!(expand(text, &effects, |_| Some(1000)), text);
    }

    #[test]
    fn test_spell_text_falls_back_to_name() {
        let lookup = MemoryLookup::new()
            .with_spell(SpellRecord {
                entry: 1,
                name: "Blessing of $s1".to_string(),
                effects: params([2, 0, 0], [0, 0, 0], 0),
                ..Default::default()
            })
            .with_spell(SpellRecord { entry: 2, ..Default::default() });
        let expander = SpellTextExpander::new(&lookup);

        assert_eq!(expander.spell_text(1), Some("Blessing of 3".to_string()));
        assert_eq!(expander.spell_text(2), None);
        assert_eq!(expander.spell_text(3), None);
    }
}
