use serde::{Deserialize, Serialize};

/// The three fixed hit tiers, each worth a fixed base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTier {
    Noble,
    Royal,
    Imperial,
}

impl HitTier {
    pub const ALL: [HitTier; 3] = [HitTier::Noble, HitTier::Royal, HitTier::Imperial];

    pub fn value(self) -> i32 {
        match self {
            HitTier::Noble => 2,
            HitTier::Royal => 3,
            HitTier::Imperial => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HitTier::Noble => "Noble",
            HitTier::Royal => "Royal",
            HitTier::Imperial => "Imperial",
        }
    }
}

/// Calculator inputs. `tier: None` means "no tier selected", which is distinct
/// from any tier legitimately worth a value; the interaction layer guarantees
/// at most one tier is ever active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageInput {
    pub tier: Option<HitTier>,
    pub crit: bool,
    pub base: i32,
    pub buff: i32,
    /// Display-only: never subtracted from the total, only annotated.
    pub pen: i32,
}

/// Computed total plus the ordered human-readable breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageBreakdown {
    pub total: i32,
    pub crit: bool,
    pub text: String,
}

/// Pure strike-damage formula: `tier + base + buff`, tripled on a critical.
/// Negative totals are not floored. Returns `None` when no tier is selected
/// (the placeholder state).
pub fn calculate(input: DamageInput) -> Option<DamageBreakdown> {
    let tier = input.tier?;

    let mut total = tier.value() + input.base + input.buff;
    let mut text = format!(
        "{} ({}) + Base ({})",
        tier.label(),
        tier.value(),
        input.base
    );

    if input.buff != 0 {
        text.push_str(&format!(" + Buff ({:+})", input.buff));
    }

    if input.crit {
        total *= 3;
        text.push_str(" × 3 crit");
    }

    if input.pen > 0 {
        text.push_str(&format!(" (ignores {} reduction)", input.pen));
    }

    text.push_str(&format!(" = {}", total));

    Some(DamageBreakdown {
        total,
        crit: input.crit,
        text,
    })
}
