use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    models::{Achievement, EmissionsReport, TransportMode, UserCreditState},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub level: u32,
    pub name: String,
    pub min_credits: f64,
}

impl LevelThreshold {
    fn new(level: u32, name: &str, min_credits: f64) -> Self {
        Self {
            level,
            name: name.to_string(),
            min_credits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementRules {
    pub explorer_trips: usize,
    pub globetrotter_trips: usize,
    pub rail_trips: usize,
    pub low_impact_min_trips: usize,
    pub low_impact_average_kg: f64,
    pub collector_credits: f64,
    pub champion_credits: f64,
}

impl Default for AchievementRules {
    fn default() -> Self {
        Self {
            explorer_trips: 5,
            globetrotter_trips: 20,
            rail_trips: 3,
            low_impact_min_trips: 3,
            low_impact_average_kg: 100.0,
            collector_credits: 500.0,
            champion_credits: 2_500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    /// Emissions of a typical trip; only trips below it earn credits.
    pub baseline_kg: f64,
    pub credits_per_kg_saved: f64,
    /// Ascending by `min_credits`; the first entry starts at zero.
    pub levels: Vec<LevelThreshold>,
    pub achievements: AchievementRules,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            baseline_kg: 500.0,
            credits_per_kg_saved: 1.0,
            levels: vec![
                LevelThreshold::new(1, "Seedling", 0.0),
                LevelThreshold::new(2, "Sprout", 100.0),
                LevelThreshold::new(3, "Sapling", 250.0),
                LevelThreshold::new(4, "Tree", 500.0),
                LevelThreshold::new(5, "Grove", 1_000.0),
                LevelThreshold::new(6, "Forest", 2_500.0),
                LevelThreshold::new(7, "Guardian", 5_000.0),
            ],
            achievements: AchievementRules::default(),
        }
    }
}

impl CreditConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let first = self
            .levels
            .first()
            .ok_or_else(|| ConfigError::Invalid("credits.levels must not be empty".to_string()))?;
        if first.min_credits != 0.0 {
            return Err(ConfigError::Invalid(
                "credits.levels must start at 0 credits".to_string(),
            ));
        }
        let ascending = self.levels.windows(2).all(|w| {
            w[1].min_credits.is_finite()
                && (w[0].min_credits < w[1].min_credits
                    || (w[0].min_credits == w[1].min_credits && w[0].level < w[1].level))
        });
        if !ascending {
            return Err(ConfigError::Invalid(
                "credits.levels must be sorted by min_credits".to_string(),
            ));
        }
        Ok(())
    }

    /// Credits earned by one trip; never negative.
    pub fn credits_for(&self, report: &EmissionsReport) -> f64 {
        if !report.total_kg.is_finite() {
            return 0.0;
        }
        let saved = (self.baseline_kg - report.total_kg).max(0.0);
        saved * self.credits_per_kg_saved.max(0.0)
    }
}

/// Aggregate figures the achievements are defined over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripStats {
    pub trip_count: usize,
    pub mode_counts: BTreeMap<TransportMode, usize>,
    pub average_total_kg: f64,
    pub total_credits: f64,
}

impl TripStats {
    pub fn from_reports(reports: &[EmissionsReport], config: &CreditConfig) -> Self {
        let mut mode_counts = BTreeMap::new();
        let mut total_kg = 0.0;
        let mut total_credits = 0.0;
        for report in reports {
            *mode_counts.entry(report.transport_mode).or_insert(0) += 1;
            if report.total_kg.is_finite() {
                total_kg += report.total_kg;
            }
            total_credits += config.credits_for(report);
        }
        let average_total_kg = if reports.is_empty() {
            0.0
        } else {
            total_kg / reports.len() as f64
        };
        Self {
            trip_count: reports.len(),
            mode_counts,
            average_total_kg,
            total_credits,
        }
    }

    pub fn trips_by(&self, mode: TransportMode) -> usize {
        self.mode_counts.get(&mode).copied().unwrap_or(0)
    }
}

impl AchievementRules {
    pub fn is_unlocked(&self, achievement: Achievement, stats: &TripStats) -> bool {
        match achievement {
            Achievement::FirstTrip => stats.trip_count >= 1,
            Achievement::Explorer => stats.trip_count >= self.explorer_trips,
            Achievement::Globetrotter => stats.trip_count >= self.globetrotter_trips,
            Achievement::RailEnthusiast => stats.trips_by(TransportMode::Train) >= self.rail_trips,
            Achievement::ZeroEmissionTraveler => {
                stats.trips_by(TransportMode::Bicycle) + stats.trips_by(TransportMode::Walk) >= 1
            }
            Achievement::LowImpactAverage => {
                stats.trip_count >= self.low_impact_min_trips
                    && stats.average_total_kg <= self.low_impact_average_kg
            }
            Achievement::CreditCollector => stats.total_credits >= self.collector_credits,
            Achievement::CarbonChampion => stats.total_credits >= self.champion_credits,
        }
    }
}

struct LevelPosition<'a> {
    current: Option<&'a LevelThreshold>,
    next: Option<&'a LevelThreshold>,
}

/// Highest level whose threshold is at or below `credits`; equal thresholds favour the higher level.
fn locate_level(levels: &[LevelThreshold], credits: f64) -> LevelPosition<'_> {
    let current_index = levels
        .iter()
        .enumerate()
        .filter(|(_, l)| l.min_credits <= credits)
        .max_by(|(_, a), (_, b)| {
            a.min_credits
                .total_cmp(&b.min_credits)
                .then(a.level.cmp(&b.level))
        })
        .map(|(i, _)| i);

    let current = current_index.map(|i| &levels[i]);
    let next = levels
        .iter()
        .filter(|l| l.min_credits > credits)
        .min_by(|a, b| a.min_credits.total_cmp(&b.min_credits).then(a.level.cmp(&b.level)));

    LevelPosition { current, next }
}

/// Fold a user's past reports into credits, level and achievements.
///
/// Recomputed from scratch on every call; nothing about previous unlocks is kept.
pub fn aggregate(reports: &[EmissionsReport], config: &CreditConfig) -> UserCreditState {
    let stats = TripStats::from_reports(reports, config);
    let credits = stats.total_credits;
    let position = locate_level(&config.levels, credits);

    let floor = position.current.map_or(0.0, |l| l.min_credits);
    let progress_to_next_level = match position.next {
        Some(next) if next.min_credits > floor => {
            ((credits - floor) / (next.min_credits - floor) * 100.0).clamp(0.0, 100.0)
        }
        Some(_) => 0.0,
        None => 100.0,
    };

    let unlocked_achievements = Achievement::ALL
        .into_iter()
        .filter(|a| config.achievements.is_unlocked(*a, &stats))
        .collect();

    UserCreditState {
        trip_count: stats.trip_count,
        total_credits_earned: credits,
        level: position.current.map_or(0, |l| l.level),
        level_name: position
            .current
            .map_or_else(|| "Unranked".to_string(), |l| l.name.clone()),
        progress_to_next_level,
        next_level_threshold: position.next.map(|l| l.min_credits),
        unlocked_achievements,
    }
}
