use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Number of official positions a ruleset can award points for
pub const SCORED_POSITIONS: usize = 4;

/// Pick modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Winner,
    Exacta,
    Trifecta,
    Place,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Winner,
        Modality::Exacta,
        Modality::Trifecta,
        Modality::Place,
    ];

    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "winner" => Ok(Modality::Winner),
            "exacta" => Ok(Modality::Exacta),
            "trifecta" => Ok(Modality::Trifecta),
            "place" => Ok(Modality::Place),
            _ => Err(format!("Invalid modality: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Winner => "winner",
            Modality::Exacta => "exacta",
            Modality::Trifecta => "trifecta",
            Modality::Place => "place",
        }
    }
}

/// Set of enabled modalities
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalitySet(BTreeSet<Modality>);

impl ModalitySet {
    pub fn all() -> Self {
        Self(Modality::ALL.into_iter().collect())
    }

    pub fn contains(&self, modality: Modality) -> bool {
        self.0.contains(&modality)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Official positions that can score: all of them with `place`,
    /// otherwise only the winner
    pub fn scored_positions(&self) -> usize {
        if self.contains(Modality::Place) {
            SCORED_POSITIONS
        } else {
            1
        }
    }
}

impl FromIterator<Modality> for ModalitySet {
    fn from_iter<I: IntoIterator<Item = Modality>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Points per official finishing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionPoints {
    pub first: i32,
    pub second: i32,
    pub third: i32,
    pub fourth: i32,
}

impl PositionPoints {
    /// Points for a 0-based official position; positions past the fourth award 0
    pub fn at(&self, position: usize) -> i32 {
        match position {
            0 => self.first,
            1 => self.second,
            2 => self.third,
            3 => self.fourth,
            _ => 0,
        }
    }

    /// Best total over the first `positions` places when the winner pays
    /// `winner_points`; `None` if it does not fit in `i32`
    pub fn checked_total(&self, winner_points: i32, positions: usize) -> Option<i32> {
        (1..positions.min(SCORED_POSITIONS))
            .try_fold(winner_points, |acc, i| acc.checked_add(self.at(i)))
    }
}

/// Versioned scoring configuration of a pool.
/// Rows are never mutated after creation except to clear `is_active`
/// when a newer version supersedes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ruleset {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub version: i32,
    pub points_first: i32,
    pub points_second: i32,
    pub points_third: i32,
    pub points_fourth: i32,
    pub exclusive_winner_points: i32,
    pub modalities_enabled: Vec<String>, // Stored as TEXT[], use modalities() for type safety
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Ruleset {
    pub fn points_by_position(&self) -> PositionPoints {
        PositionPoints {
            first: self.points_first,
            second: self.points_second,
            third: self.points_third,
            fourth: self.points_fourth,
        }
    }

    /// Enabled modalities; unrecognised strings are skipped
    pub fn modalities(&self) -> ModalitySet {
        self.modalities_enabled
            .iter()
            .filter_map(|s| Modality::from_str(s).ok())
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        let points = self.points_by_position();
        if [points.first, points.second, points.third, points.fourth, self.exclusive_winner_points]
            .iter()
            .any(|p| *p < 0)
        {
            return Err("Point values must not be negative".to_string());
        }
        if let Some(bad) = self
            .modalities_enabled
            .iter()
            .find(|s| Modality::from_str(s).is_err())
        {
            return Err(format!("Unknown modality: {}", bad));
        }
        let modalities = self.modalities();
        if modalities.is_empty() {
            return Err("At least one modality must be enabled".to_string());
        }
        let winner_points = points.first.max(self.exclusive_winner_points);
        if points
            .checked_total(winner_points, modalities.scored_positions())
            .is_none()
        {
            return Err("Maximum attainable points exceed the supported range".to_string());
        }
        Ok(())
    }
}

/// Input for publishing a new ruleset version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRuleset {
    pub points_by_position: PositionPoints,
    pub exclusive_winner_points: i32,
    pub modalities: Vec<Modality>,
}

impl NewRuleset {
    /// Materialise as the active row for `pool_id` at `version`
    pub fn into_ruleset(self, pool_id: Uuid, version: i32) -> Ruleset {
        Ruleset {
            id: Uuid::new_v4(),
            pool_id,
            version,
            points_first: self.points_by_position.first,
            points_second: self.points_by_position.second,
            points_third: self.points_by_position.third,
            points_fourth: self.points_by_position.fourth,
            exclusive_winner_points: self.exclusive_winner_points,
            modalities_enabled: self.modalities.iter().map(|m| m.as_str().to_string()).collect(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset(modalities: &[&str]) -> Ruleset {
        NewRuleset {
            points_by_position: PositionPoints { first: 10, second: 7, third: 5, fourth: 3 },
            exclusive_winner_points: 25,
            modalities: vec![],
        }
        .into_ruleset(Uuid::new_v4(), 1)
        .with_modalities(modalities)
    }

    impl Ruleset {
        fn with_modalities(mut self, modalities: &[&str]) -> Self {
            self.modalities_enabled = modalities.iter().map(|s| s.to_string()).collect();
            self
        }
    }

    #[test]
    fn test_position_points_lookup() {
        let points = ruleset(&["winner"]).points_by_position();
        assert_eq!(points.at(0), 10);
        assert_eq!(points.at(3), 3);
        assert_eq!(points.at(4), 0);
        assert_eq!(points.checked_total(25, SCORED_POSITIONS), Some(25 + 7 + 5 + 3));
        assert_eq!(points.checked_total(10, 1), Some(10));
    }

    #[test]
    fn test_modalities_skip_unknown_values() {
        let rs = ruleset(&["winner", "EXACTA", "parlay"]);
        let set = rs.modalities();
        assert!(set.contains(Modality::Winner));
        assert!(set.contains(Modality::Exacta));
        assert!(!set.contains(Modality::Place));
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_points() {
        let mut rs = ruleset(&["winner"]);
        assert!(rs.validate().is_ok());
        rs.points_third = -1;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_modalities() {
        assert!(ruleset(&[]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_total() {
        let mut rs = ruleset(&["winner", "exacta", "place"]);
        rs.points_second = i32::MAX;
        assert!(rs.validate().is_err());

        // Without place only the winner position can score
        let mut rs = ruleset(&["winner", "exacta"]);
        rs.points_second = i32::MAX;
        assert!(rs.validate().is_ok());
    }

    #[test]
    fn test_scored_positions_follow_place() {
        assert_eq!(ModalitySet::all().scored_positions(), SCORED_POSITIONS);
        let winner_only: ModalitySet = [Modality::Winner].into_iter().collect();
        assert_eq!(winner_only.scored_positions(), 1);
    }
}
