use super::picks::normalize_with;
use crate::models::{ModalitySet, Prediction};
use std::collections::HashSet;
use uuid::Uuid;

/// Count the distinct participants whose normalized picks include the
/// official winner. Computed once per race, before any score, since the
/// winner bonus depends on the race-wide count.
pub fn count_winner_backers(
    winner_id: Uuid,
    predictions: &[Prediction],
    enabled: &ModalitySet,
) -> usize {
    predictions
        .iter()
        .filter(|p| normalize_with(p, enabled).contains(winner_id))
        .map(|p| p.participant_id)
        .collect::<HashSet<_>>()
        .len()
}
