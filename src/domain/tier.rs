//! Usage: Subscription tier policy engine (pure capability checks).

use serde::{Deserialize, Serialize};

/// Tier hierarchy levels for comparison.
/// Student accounts are treated as LifetimePro for local features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Free,
    Lifetime,
    LifetimePro,
    Pro,
    Team,
}

impl Tier {
    pub fn level(self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Lifetime => 1,
            Tier::LifetimePro => 2,
            Tier::Pro => 3,
            Tier::Team => 4,
        }
    }

    /// Tolerant parser: case-insensitive, unknown values map to `None` so the
    /// policy degrades to the free baseline instead of failing.
    pub fn parse(raw: &str) -> Option<Tier> {
        match raw.trim().to_uppercase().as_str() {
            "FREE" => Some(Tier::Free),
            "LIFETIME" => Some(Tier::Lifetime),
            "LIFETIME_PRO" => Some(Tier::LifetimePro),
            "PRO" => Some(Tier::Pro),
            "TEAM" => Some(Tier::Team),
            _ => None,
        }
    }
}

/// Raw entitlement record as supplied by the account backend. Every field is
/// optional-friendly: the policy engine never fails on a partial record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub tier: Option<String>,
    pub trial_active: bool,
    /// Unix seconds; ignored unless `trial_active` is set.
    pub trial_ends_at: Option<i64>,
    pub email: Option<String>,
}

/// Snapshot of effective capabilities, computed fresh from a [`UserRecord`]
/// on every check. Holds no I/O handles and never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    tier: Option<Tier>,
    has_active_trial: bool,
    is_student: bool,
}

impl TierPolicy {
    pub fn evaluate(user: &UserRecord, now_unix: i64) -> Self {
        let tier = user.tier.as_deref().and_then(Tier::parse);
        let has_active_trial = user.trial_active
            && user.trial_ends_at.map(|ends| ends > now_unix).unwrap_or(false);
        let is_student = user
            .email
            .as_deref()
            .map(|email| email.trim().to_lowercase().ends_with(".edu"))
            .unwrap_or(false);

        TierPolicy {
            tier,
            has_active_trial,
            is_student,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn has_active_trial(&self) -> bool {
        self.has_active_trial
    }

    pub fn is_student(&self) -> bool {
        self.is_student
    }

    pub fn is_free(&self) -> bool {
        matches!(self.tier, None | Some(Tier::Free))
    }

    pub fn has_paid_tier(&self) -> bool {
        !self.is_free()
    }

    /// Students can access paid features (local only), same as trial users.
    pub fn can_access_paid_features(&self) -> bool {
        self.has_paid_tier() || self.has_active_trial || self.is_student
    }

    pub fn has_minimum_tier(&self, required: Tier) -> bool {
        // An active trial grants everything.
        if self.has_active_trial {
            return true;
        }

        // Student ceiling: LifetimePro-level access, but never Pro/Team gates.
        if self.is_student && !matches!(required, Tier::Pro | Tier::Team) {
            return Tier::LifetimePro.level() >= required.level();
        }

        match self.tier {
            Some(tier) => tier.level() >= required.level(),
            // No tier at all still satisfies the free baseline.
            None => required == Tier::Free,
        }
    }

    pub fn can_access_client(&self, required: Tier) -> bool {
        self.has_minimum_tier(required)
    }

    /// Cloud sync is Pro and Team only; the student ceiling never reaches it.
    pub fn can_use_cloud_sync(&self) -> bool {
        self.has_minimum_tier(Tier::Pro)
    }

    /// Team features key off the raw tier, not trial/student adjustments.
    pub fn can_use_team_features(&self) -> bool {
        self.tier == Some(Tier::Team)
    }
}
