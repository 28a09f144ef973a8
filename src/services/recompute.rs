use crate::error::{RepositoryError, ScoringError};
use crate::models::{NewScore, Prediction, Race, UpsertOutcome};
use crate::scoring::{calculate, count_winner_backers, normalize_with, resolve_active, ScoringRules};
use crate::store::ScoringStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A participant whose score could not be written
#[derive(Debug)]
pub struct ParticipantFailure {
    pub participant_id: Uuid,
    pub error: RepositoryError,
}

/// Outcome of one successful race recompute.
///
/// The race was fully resolved; `failures` lists the participants whose
/// upsert failed while the rest were written.
#[derive(Debug)]
pub struct RecomputeReport {
    pub race_id: Uuid,
    pub ruleset_version: i32,
    pub winner_backers: usize,
    pub created: usize,
    pub updated: usize,
    pub failures: Vec<ParticipantFailure>,
}

impl RecomputeReport {
    fn new(race_id: Uuid, ruleset_version: i32, winner_backers: usize) -> Self {
        Self {
            race_id,
            ruleset_version,
            winner_backers,
            created: 0,
            updated: 0,
            failures: Vec::new(),
        }
    }

    /// Score rows written (created + updated)
    pub fn scores_written(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Scores computed for a race, ready to be written
#[derive(Debug, Clone)]
pub struct PreparedRace {
    pub race: Race,
    pub ruleset_version: i32,
    pub winner_backers: usize,
    pub scores: Vec<NewScore>,
}

/// Recompute orchestrator: the only writer of score rows
pub struct ScoringService {
    store: Arc<dyn ScoringStore>,
}

impl ScoringService {
    /// Create a new scoring service over a store
    pub fn new(store: Arc<dyn ScoringStore>) -> Self {
        Self { store }
    }

    /// Recompute and persist every participant's score for a race.
    ///
    /// Any race-level error aborts before the first write. Re-running after a
    /// result or ruleset correction overwrites the same rows.
    pub async fn recompute(&self, race_id: Uuid) -> Result<RecomputeReport, ScoringError> {
        info!("Recomputing scores for race {}", race_id);

        let prepared = self.prepare(race_id).await?;
        let mut report =
            RecomputeReport::new(race_id, prepared.ruleset_version, prepared.winner_backers);

        for score in &prepared.scores {
            match self.store.upsert_score(score).await {
                Ok(UpsertOutcome::Created) => report.created += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(e) => {
                    error!(
                        "Failed to write score for participant {} on race {}: {}",
                        score.participant_id, race_id, e
                    );
                    report.failures.push(ParticipantFailure {
                        participant_id: score.participant_id,
                        error: e,
                    });
                }
            }
        }

        info!(
            "Race {} scored with ruleset v{}: {} created, {} updated, {} failed",
            race_id,
            report.ruleset_version,
            report.created,
            report.updated,
            report.failures.len()
        );

        Ok(report)
    }

    /// Load and score a race without writing anything
    pub async fn prepare(&self, race_id: Uuid) -> Result<PreparedRace, ScoringError> {
        let race = self
            .store
            .find_race(race_id)
            .await?
            .ok_or(ScoringError::RaceNotFound(race_id))?;

        if !race.is_result_published() {
            return Err(ScoringError::RaceNotPublished {
                race_id,
                status: race.status.clone(),
            });
        }

        let result = self
            .store
            .find_result(race_id)
            .await?
            .ok_or(ScoringError::NoOfficialResult(race_id))?;
        let winner = result
            .winner()
            .ok_or(ScoringError::NoOfficialResult(race_id))?;

        if let Some(entry_id) = result.first_duplicate() {
            return Err(ScoringError::MalformedOfficialResult { race_id, entry_id });
        }

        let ruleset = resolve_active(race.pool_id, self.store.active_rulesets(race.pool_id).await?)?;
        let rules = ScoringRules::from(&ruleset);

        let predictions = latest_per_participant(self.store.predictions_for_race(race_id).await?);
        if predictions.is_empty() {
            info!("Race {} has no predictions, nothing to score", race_id);
            return Ok(PreparedRace {
                race,
                ruleset_version: rules.version,
                winner_backers: 0,
                scores: Vec::new(),
            });
        }

        let official_order = &result.official_order;
        let winner_backers = count_winner_backers(winner, &predictions, &rules.modalities);
        debug!(
            "Race {} winner {} backed by {} participant(s)",
            race_id, winner, winner_backers
        );

        let scores = predictions
            .iter()
            .map(|prediction| {
                let picks = normalize_with(prediction, &rules.modalities);
                let card = calculate(official_order, &picks, &rules, winner_backers);
                NewScore {
                    race_id,
                    participant_id: prediction.participant_id,
                    points_total: card.points_total,
                    breakdown: card.breakdown,
                    ruleset_version: rules.version,
                }
            })
            .collect();

        Ok(PreparedRace {
            race,
            ruleset_version: rules.version,
            winner_backers,
            scores,
        })
    }
}

/// Keep one prediction per participant (the most recently updated), ordered
/// by participant id so writes happen in a stable order.
fn latest_per_participant(predictions: Vec<Prediction>) -> Vec<Prediction> {
    let mut by_participant: BTreeMap<Uuid, Prediction> = BTreeMap::new();
    for prediction in predictions {
        match by_participant.get(&prediction.participant_id) {
            Some(existing) => {
                warn!(
                    "Participant {} has more than one prediction for race {}",
                    prediction.participant_id, prediction.race_id
                );
                if prediction.updated_at >= existing.updated_at {
                    by_participant.insert(prediction.participant_id, prediction);
                }
            }
            None => {
                by_participant.insert(prediction.participant_id, prediction);
            }
        }
    }
    by_participant.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_latest_prediction_per_participant_wins() {
        let (race_id, participant) = (Uuid::new_v4(), Uuid::new_v4());
        let (old_pick, new_pick) = (Uuid::new_v4(), Uuid::new_v4());

        let mut old = Prediction::new(race_id, participant).with_winner(old_pick);
        old.updated_at -= Duration::minutes(5);
        let new = Prediction::new(race_id, participant).with_winner(new_pick);
        let other = Prediction::new(race_id, Uuid::new_v4());

        let kept = latest_per_participant(vec![new, old, other]);
        assert_eq!(kept.len(), 2);
        let mine = kept.iter().find(|p| p.participant_id == participant).unwrap();
        assert_eq!(mine.winner_pick, Some(new_pick));
    }
}
