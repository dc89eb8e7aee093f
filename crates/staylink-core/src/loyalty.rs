// ── Loyalty tiers ──
//
// Guest points and tier progression. Pure functions over a membership
// snapshot; the backend owns the points ledger.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use staylink_api::models::MembershipRecord;

use crate::error::CoreError;

/// Loyalty tiers, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

/// Points needed to enter each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub bronze: u64,
    pub silver: u64,
    pub gold: u64,
    pub platinum: u64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            bronze: 0,
            silver: 1_000,
            gold: 5_000,
            platinum: 15_000,
        }
    }
}

impl TierThresholds {
    pub fn floor(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Bronze => self.bronze,
            Tier::Silver => self.silver,
            Tier::Gold => self.gold,
            Tier::Platinum => self.platinum,
        }
    }
}

/// Default exchange rate: 100 points are worth one currency unit.
pub const DEFAULT_POINTS_RATIO: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyMembership {
    pub current_tier: Tier,
    /// Lifetime points; never decreases.
    pub tier_points: u64,
    /// Points that can still be redeemed.
    pub available_points: u64,
}

impl TryFrom<MembershipRecord> for LoyaltyMembership {
    type Error = CoreError;

    fn try_from(record: MembershipRecord) -> Result<Self, Self::Error> {
        let current_tier = record
            .current_tier
            .parse()
            .map_err(|_| CoreError::Api {
                message: format!("unknown loyalty tier '{}'", record.current_tier),
                status: None,
            })?;
        Ok(Self {
            current_tier,
            tier_points: record.tier_points,
            available_points: record.available_points,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub next_tier: Option<Tier>,
    pub points_to_next_tier: u64,
    /// 0..=100
    pub progress_percentage: f64,
}

/// Progress from the current tier's floor towards the next tier.
#[allow(clippy::cast_precision_loss)]
pub fn compute_progress(membership: &LoyaltyMembership, thresholds: &TierThresholds) -> TierProgress {
    let Some(next) = membership.current_tier.next() else {
        return TierProgress {
            next_tier: None,
            points_to_next_tier: 0,
            progress_percentage: 100.0,
        };
    };

    let floor = thresholds.floor(membership.current_tier);
    let target = thresholds.floor(next);
    let span = target.saturating_sub(floor);
    let progress_percentage = if span == 0 {
        100.0
    } else {
        let earned = membership.tier_points.saturating_sub(floor);
        (100.0 * earned as f64 / span as f64).clamp(0.0, 100.0)
    };

    TierProgress {
        next_tier: Some(next),
        points_to_next_tier: target.saturating_sub(membership.tier_points),
        progress_percentage,
    }
}

/// Currency value of the redeemable points. A non-positive ratio is worth 0.
#[allow(clippy::cast_precision_loss)]
pub fn redeemable_value(membership: &LoyaltyMembership, points_per_unit: f64) -> f64 {
    if !points_per_unit.is_finite() || points_per_unit <= 0.0 {
        return 0.0;
    }
    membership.available_points as f64 / points_per_unit
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn member(tier: Tier, tier_points: u64, available_points: u64) -> LoyaltyMembership {
        LoyaltyMembership {
            current_tier: tier,
            tier_points,
            available_points,
        }
    }

    #[test]
    fn top_tier_has_no_next() {
        let progress = compute_progress(&member(Tier::Platinum, 40_000, 0), &TierThresholds::default());
        assert_eq!(progress.next_tier, None);
        assert_eq!(progress.points_to_next_tier, 0);
        assert_eq!(progress.progress_percentage, 100.0);
    }

    #[test]
    fn midway_through_silver() {
        let progress = compute_progress(&member(Tier::Silver, 3_000, 0), &TierThresholds::default());
        assert_eq!(progress.next_tier, Some(Tier::Gold));
        assert_eq!(progress.points_to_next_tier, 2_000);
        assert_eq!(progress.progress_percentage, 50.0);
    }

    #[test]
    fn percentage_is_clamped() {
        let thresholds = TierThresholds::default();
        // Below the tier floor (e.g. thresholds changed after promotion).
        let low = compute_progress(&member(Tier::Gold, 100, 0), &thresholds);
        assert_eq!(low.progress_percentage, 0.0);
        // Past the next threshold but not yet promoted.
        let high = compute_progress(&member(Tier::Bronze, 1_500, 0), &thresholds);
        assert_eq!(high.progress_percentage, 100.0);
        assert_eq!(high.points_to_next_tier, 0);
    }

    #[test]
    fn redeemable_value_uses_ratio() {
        let m = member(Tier::Bronze, 0, 850);
        assert_eq!(redeemable_value(&m, DEFAULT_POINTS_RATIO), 8.5);
        assert_eq!(redeemable_value(&m, 0.0), 0.0);
    }

    #[test]
    fn tier_parses_wire_names() {
        let record = MembershipRecord {
            current_tier: "gold".into(),
            tier_points: 6_000,
            available_points: 10,
        };
        let m = LoyaltyMembership::try_from(record).unwrap();
        assert_eq!(m.current_tier, Tier::Gold);
        assert_eq!(Tier::Gold.to_string(), "GOLD");
    }
}
