use crate::error::ScoringError;
use crate::models::{ModalitySet, PositionPoints, Ruleset};
use uuid::Uuid;

/// Resolve the single active ruleset of a pool.
///
/// `candidates` are the rows the store reports as active for the pool. Zero
/// rows, or more than one, is `NoActiveRuleset`: an ambiguous configuration is
/// surfaced instead of picking a version.
pub fn resolve_active(pool_id: Uuid, candidates: Vec<Ruleset>) -> Result<Ruleset, ScoringError> {
    let mut active: Vec<Ruleset> = candidates
        .into_iter()
        .filter(|r| r.is_active && r.pool_id == pool_id)
        .collect();

    if active.len() != 1 {
        return Err(ScoringError::NoActiveRuleset {
            pool_id,
            active: active.len(),
        });
    }

    Ok(active.remove(0))
}

/// Ruleset in the shape the calculator consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRules {
    pub version: i32,
    pub points: PositionPoints,
    pub exclusive_winner_points: i32,
    pub modalities: ModalitySet,
}

impl ScoringRules {
    /// Number of official positions that can score. Without the `place`
    /// modality only the winner position is scored.
    pub fn scored_positions(&self) -> usize {
        self.modalities.scored_positions()
    }

    /// Upper bound of what one prediction can earn, `None` on overflow
    pub fn max_points(&self) -> Option<i32> {
        let winner = self.points.first.max(self.exclusive_winner_points);
        self.points.checked_total(winner, self.scored_positions())
    }
}

impl From<&Ruleset> for ScoringRules {
    fn from(ruleset: &Ruleset) -> Self {
        Self {
            version: ruleset.version,
            points: ruleset.points_by_position(),
            exclusive_winner_points: ruleset.exclusive_winner_points,
            modalities: ruleset.modalities(),
        }
    }
}
