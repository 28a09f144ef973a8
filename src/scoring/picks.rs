use crate::models::{Modality, ModalitySet, Prediction};
use uuid::Uuid;

/// An entry a participant backs, tagged with the modality it first appeared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPick {
    pub entry_id: Uuid,
    pub modality: Modality,
}

/// Deduplicated picks of one prediction, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPicks {
    picks: Vec<NormalizedPick>,
}

impl NormalizedPicks {
    fn push(&mut self, entry_id: Uuid, modality: Modality) {
        if !self.contains(entry_id) {
            self.picks.push(NormalizedPick { entry_id, modality });
        }
    }

    pub fn contains(&self, entry_id: Uuid) -> bool {
        self.picks.iter().any(|p| p.entry_id == entry_id)
    }

    /// Modality of the first pick that named `entry_id`
    pub fn modality_of(&self, entry_id: Uuid) -> Option<Modality> {
        self.picks
            .iter()
            .find(|p| p.entry_id == entry_id)
            .map(|p| p.modality)
    }

    pub fn entry_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.picks.iter().map(|p| p.entry_id)
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// Normalize with every modality enabled
pub fn normalize(prediction: &Prediction) -> NormalizedPicks {
    normalize_with(prediction, &ModalitySet::all())
}

/// Flatten winner, exacta and trifecta picks (in that order) into one
/// deduplicated sequence. Picks of modalities not in `enabled` are dropped.
pub fn normalize_with(prediction: &Prediction, enabled: &ModalitySet) -> NormalizedPicks {
    let mut picks = NormalizedPicks::default();

    if enabled.contains(Modality::Winner) {
        if let Some(entry_id) = prediction.winner_pick {
            picks.push(entry_id, Modality::Winner);
        }
    }

    let ordered = [
        (Modality::Exacta, prediction.exacta_pick.as_deref()),
        (Modality::Trifecta, prediction.trifecta_pick.as_deref()),
    ];
    for (modality, entries) in ordered {
        if !enabled.contains(modality) {
            continue;
        }
        for entry_id in entries.unwrap_or_default() {
            picks.push(*entry_id, modality);
        }
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_winner_then_exacta_then_trifecta() {
        let e = ids(4);
        let prediction = Prediction::new(Uuid::new_v4(), Uuid::new_v4())
            .with_winner(e[0])
            .with_exacta(vec![e[1], e[2]])
            .with_trifecta(vec![e[3]]);

        let picks = normalize(&prediction);
        assert_eq!(picks.entry_ids().collect::<Vec<_>>(), e);
        assert_eq!(picks.modality_of(e[0]), Some(Modality::Winner));
        assert_eq!(picks.modality_of(e[2]), Some(Modality::Exacta));
        assert_eq!(picks.modality_of(e[3]), Some(Modality::Trifecta));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let e = ids(3);
        let prediction = Prediction::new(Uuid::new_v4(), Uuid::new_v4())
            .with_winner(e[0])
            .with_exacta(vec![e[0], e[1]])
            .with_trifecta(vec![e[1], e[0], e[2], e[2]]);

        let picks = normalize(&prediction);
        assert_eq!(picks.len(), 3);
        assert_eq!(picks.entry_ids().collect::<Vec<_>>(), e);
        assert_eq!(picks.modality_of(e[0]), Some(Modality::Winner));
        assert_eq!(picks.modality_of(e[1]), Some(Modality::Exacta));
    }

    #[test]
    fn test_empty_prediction_normalizes_to_empty_set() {
        let prediction = Prediction::new(Uuid::new_v4(), Uuid::new_v4()).with_exacta(vec![]);
        assert!(prediction.is_empty());
        assert!(normalize(&prediction).is_empty());
    }

    #[test]
    fn test_disabled_modalities_are_dropped() {
        let e = ids(3);
        let prediction = Prediction::new(Uuid::new_v4(), Uuid::new_v4())
            .with_winner(e[0])
            .with_exacta(vec![e[0], e[1]])
            .with_trifecta(vec![e[2]]);

        let enabled: ModalitySet = [Modality::Exacta].into_iter().collect();
        let picks = normalize_with(&prediction, &enabled);
        assert_eq!(picks.entry_ids().collect::<Vec<_>>(), vec![e[0], e[1]]);
        assert_eq!(picks.modality_of(e[0]), Some(Modality::Exacta));
        assert!(!picks.contains(e[2]));
    }
}
