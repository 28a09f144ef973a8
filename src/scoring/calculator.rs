use super::picks::NormalizedPicks;
use super::rules::ScoringRules;
use crate::models::BreakdownEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of scoring one prediction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub points_total: i32,
    pub breakdown: Vec<BreakdownEntry>,
}

/// Score one participant's normalized picks against the official order.
///
/// Each official position is visited once, up to the number of positions the
/// rules score. A backed winner pays `exclusive_winner_points` when the
/// participant is its only backer (`winner_backers == 1`), otherwise
/// `points.first`. Breakdown entries follow official order, not pick order.
/// The total saturates at `i32::MAX`.
pub fn calculate(
    official_order: &[Uuid],
    picks: &NormalizedPicks,
    rules: &ScoringRules,
    winner_backers: usize,
) -> ScoreCard {
    let mut card = ScoreCard::default();

    for (position, entry_id) in official_order
        .iter()
        .copied()
        .enumerate()
        .take(rules.scored_positions())
    {
        let Some(modality) = picks.modality_of(entry_id) else {
            continue;
        };

        let exclusive = position == 0 && winner_backers == 1;
        let points = if exclusive {
            rules.exclusive_winner_points
        } else {
            rules.points.at(position)
        };

        card.points_total = card.points_total.saturating_add(points);
        card.breakdown.push(BreakdownEntry {
            position,
            entry_id,
            modality,
            points,
            exclusive,
        });
    }

    card
}
