use super::recompute::{ParticipantFailure, RecomputeReport, ScoringService};
use crate::error::ScoringError;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one race inside a batch
#[derive(Debug)]
pub enum RaceOutcome {
    Scored(RecomputeReport),
    Failed(ScoringError),
    /// Still running (or never started) when the batch deadline passed
    Unfinished,
}

impl From<Result<RecomputeReport, ScoringError>> for RaceOutcome {
    fn from(result: Result<RecomputeReport, ScoringError>) -> Self {
        match result {
            Ok(report) => RaceOutcome::Scored(report),
            Err(e) => RaceOutcome::Failed(e),
        }
    }
}

/// Per-race outcomes of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub per_race: BTreeMap<Uuid, RaceOutcome>,
}

impl BatchReport {
    pub fn races_scored(&self) -> usize {
        self.per_race
            .values()
            .filter(|o| matches!(o, RaceOutcome::Scored(_)))
            .count()
    }

    pub fn participants_scored(&self) -> usize {
        self.reports().map(RecomputeReport::scores_written).sum()
    }

    pub fn reports(&self) -> impl Iterator<Item = &RecomputeReport> {
        self.per_race.values().filter_map(|o| match o {
            RaceOutcome::Scored(report) => Some(report),
            _ => None,
        })
    }

    /// Races that failed outright
    pub fn race_failures(&self) -> impl Iterator<Item = (&Uuid, &ScoringError)> {
        self.per_race.iter().filter_map(|(race_id, o)| match o {
            RaceOutcome::Failed(e) => Some((race_id, e)),
            _ => None,
        })
    }

    /// Participants whose score write failed in an otherwise scored race
    pub fn participant_failures(&self) -> impl Iterator<Item = (&Uuid, &ParticipantFailure)> {
        self.reports()
            .flat_map(|report| report.failures.iter().map(move |f| (&report.race_id, f)))
    }

    pub fn unfinished(&self) -> impl Iterator<Item = &Uuid> {
        self.per_race
            .iter()
            .filter(|(_, o)| matches!(o, RaceOutcome::Unfinished))
            .map(|(race_id, _)| race_id)
    }

    pub fn has_failures(&self) -> bool {
        self.race_failures().next().is_some()
            || self.participant_failures().next().is_some()
            || self.unfinished().next().is_some()
    }
}

/// Runs the orchestrator over many races with bounded concurrency.
/// One race failing never stops the others.
pub struct BatchRunner {
    service: Arc<ScoringService>,
    concurrency: usize,
}

impl BatchRunner {
    /// Create a batch runner; `concurrency` is clamped to at least 1
    pub fn new(service: Arc<ScoringService>, concurrency: usize) -> Self {
        Self {
            service,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run_all(&self, race_ids: &[Uuid]) -> BatchReport {
        self.run(race_ids, None).await
    }

    /// Like `run_all`, but stops waiting once `deadline` elapses. Races not
    /// finished by then are reported as `Unfinished`; re-running them is safe
    /// because every write is an upsert.
    pub async fn run_all_with_deadline(&self, race_ids: &[Uuid], deadline: Duration) -> BatchReport {
        self.run(race_ids, Some(deadline)).await
    }

    async fn run(&self, race_ids: &[Uuid], deadline: Option<Duration>) -> BatchReport {
        let mut seen = HashSet::new();
        let race_ids: Vec<Uuid> = race_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        info!(
            "Batch recompute of {} race(s), concurrency {}",
            race_ids.len(),
            self.concurrency
        );

        let mut per_race = BTreeMap::new();
        let mut results = stream::iter(race_ids.iter().copied())
            .map(|race_id| {
                let service = Arc::clone(&self.service);
                async move { (race_id, service.recompute(race_id).await) }
            })
            .buffer_unordered(self.concurrency);

        let drain = async {
            while let Some((race_id, result)) = results.next().await {
                per_race.insert(race_id, RaceOutcome::from(result));
            }
        };

        match deadline {
            Some(limit) => {
                if tokio::time::timeout(limit, drain).await.is_err() {
                    warn!("Batch deadline of {:?} reached before all races finished", limit);
                }
            }
            None => drain.await,
        }

        for race_id in &race_ids {
            per_race.entry(*race_id).or_insert(RaceOutcome::Unfinished);
        }

        let report = BatchReport { per_race };
        info!(
            "Batch finished: {} race(s) scored, {} participant score(s) written, {} race failure(s), {} participant failure(s), {} unfinished",
            report.races_scored(),
            report.participants_scored(),
            report.race_failures().count(),
            report.participant_failures().count(),
            report.unfinished().count()
        );
        report
    }
}
