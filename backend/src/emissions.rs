use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    credits::CreditConfig,
    models::{
        AccommodationType, ActivityType, EmissionCategory, EmissionsReport, Equivalents,
        PercentageBreakdown, TransportMode, TripInputs,
    },
};

/// Per-passenger transport factors in kg CO₂e per km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportFactors {
    pub flight_short_haul: f64,
    pub flight_long_haul: f64,
    /// Flights shorter than this use the short-haul factor.
    pub flight_short_haul_max_km: f64,
    /// Per vehicle; divided by `car_average_occupancy`.
    pub car_per_vehicle: f64,
    /// Per vehicle; divided by `car_average_occupancy`.
    pub electric_car_per_vehicle: f64,
    pub car_average_occupancy: f64,
    pub motorcycle: f64,
    pub bus: f64,
    pub train: f64,
    pub ferry: f64,
    pub bicycle: f64,
    pub walk: f64,
}

impl Default for TransportFactors {
    fn default() -> Self {
        Self {
            flight_short_haul: 0.255,
            flight_long_haul: 0.195,
            flight_short_haul_max_km: 1_500.0,
            car_per_vehicle: 0.192,
            electric_car_per_vehicle: 0.070,
            car_average_occupancy: 1.5,
            motorcycle: 0.114,
            bus: 0.105,
            train: 0.035,
            ferry: 0.115,
            bicycle: 0.0,
            walk: 0.0,
        }
    }
}

impl TransportFactors {
    /// kg CO₂e per passenger-km for a mode at a given trip distance.
    pub fn per_km(&self, mode: TransportMode, distance_km: f64) -> f64 {
        let occupancy = if self.car_average_occupancy.is_finite() && self.car_average_occupancy >= 1.0 {
            self.car_average_occupancy
        } else {
            1.0
        };
        let factor = match mode {
            TransportMode::Flight if distance_km < self.flight_short_haul_max_km => {
                self.flight_short_haul
            }
            TransportMode::Flight => self.flight_long_haul,
            TransportMode::Car => self.car_per_vehicle / occupancy,
            TransportMode::ElectricCar => self.electric_car_per_vehicle / occupancy,
            TransportMode::Motorcycle => self.motorcycle,
            TransportMode::Bus => self.bus,
            TransportMode::Train => self.train,
            TransportMode::Ferry => self.ferry,
            TransportMode::Bicycle => self.bicycle,
            TransportMode::Walk => self.walk,
        };
        non_negative(factor)
    }
}

/// kg CO₂e per night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccommodationFactors {
    pub eco_resort: f64,
    pub hostel: f64,
    pub homestay: f64,
    pub vacation_rental: f64,
    pub hotel: f64,
    pub luxury_hotel: f64,
}

impl Default for AccommodationFactors {
    fn default() -> Self {
        Self {
            eco_resort: 5.0,
            hostel: 7.5,
            homestay: 9.0,
            vacation_rental: 12.0,
            hotel: 18.0,
            luxury_hotel: 40.0,
        }
    }
}

impl AccommodationFactors {
    pub fn per_night(&self, kind: AccommodationType) -> f64 {
        non_negative(match kind {
            AccommodationType::EcoResort => self.eco_resort,
            AccommodationType::Hostel => self.hostel,
            AccommodationType::Homestay => self.homestay,
            AccommodationType::VacationRental => self.vacation_rental,
            AccommodationType::Hotel => self.hotel,
            AccommodationType::LuxuryHotel => self.luxury_hotel,
        })
    }
}

/// kg CO₂e per activity occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFactors {
    pub sightseeing: f64,
    pub adventure: f64,
    pub local_travel: f64,
    pub events: f64,
    pub dining: f64,
    pub shopping: f64,
}

impl Default for ActivityFactors {
    fn default() -> Self {
        Self {
            sightseeing: 2.0,
            adventure: 15.0,
            local_travel: 3.5,
            events: 8.0,
            dining: 4.0,
            shopping: 6.0,
        }
    }
}

impl ActivityFactors {
    pub fn per_activity(&self, kind: ActivityType) -> f64 {
        non_negative(match kind {
            ActivityType::Sightseeing => self.sightseeing,
            ActivityType::Adventure => self.adventure,
            ActivityType::LocalTravel => self.local_travel,
            ActivityType::Events => self.events,
            ActivityType::Dining => self.dining,
            ActivityType::Shopping => self.shopping,
        })
    }
}

/// Exclusive upper bounds of kg CO₂e per day for each category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryThresholds {
    pub low_below: f64,
    pub medium_below: f64,
    pub high_below: f64,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            low_below: 25.0,
            medium_below: 75.0,
            high_below: 150.0,
        }
    }
}

impl CategoryThresholds {
    pub fn classify(&self, per_day_kg: f64) -> EmissionCategory {
        if per_day_kg < self.low_below {
            EmissionCategory::Low
        } else if per_day_kg < self.medium_below {
            EmissionCategory::Medium
        } else if per_day_kg < self.high_below {
            EmissionCategory::High
        } else {
            EmissionCategory::VeryHigh
        }
    }
}

/// kg CO₂e represented by one unit of each equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalencyConstants {
    pub kg_per_tree_year: f64,
    pub kg_per_vehicle_mile: f64,
    pub kg_per_kwh: f64,
    pub kg_per_smartphone_charge: f64,
    pub kg_per_gasoline_gallon: f64,
}

impl Default for EquivalencyConstants {
    fn default() -> Self {
        // US EPA greenhouse gas equivalency figures
        Self {
            kg_per_tree_year: 21.77,
            kg_per_vehicle_mile: 0.404,
            kg_per_kwh: 0.394,
            kg_per_smartphone_charge: 0.008_22,
            kg_per_gasoline_gallon: 8.887,
        }
    }
}

impl EquivalencyConstants {
    pub fn for_total(&self, total_kg: f64) -> Equivalents {
        Equivalents {
            tree_years: per_unit(total_kg, self.kg_per_tree_year),
            vehicle_miles: per_unit(total_kg, self.kg_per_vehicle_mile),
            kwh: per_unit(total_kg, self.kg_per_kwh),
            smartphone_charges: per_unit(total_kg, self.kg_per_smartphone_charge),
            gasoline_gallons: per_unit(total_kg, self.kg_per_gasoline_gallon),
        }
    }

    pub fn trees(&self, kg: f64) -> f64 {
        per_unit(kg, self.kg_per_tree_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativeConfig {
    /// Beyond this distance the low-emission substitute mode is not a realistic option.
    pub max_feasible_distance_km: f64,
}

impl Default for AlternativeConfig {
    fn default() -> Self {
        Self {
            max_feasible_distance_km: 2_500.0,
        }
    }
}

/// Every constant the emissions, optimizer and credit calculations depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionsConfig {
    pub transport: TransportFactors,
    pub accommodation: AccommodationFactors,
    pub activities: ActivityFactors,
    pub categories: CategoryThresholds,
    /// Global per-capita emissions per day, in kg CO₂e.
    pub global_daily_average_kg: f64,
    pub equivalents: EquivalencyConstants,
    pub offset_price_usd_per_tonne: f64,
    pub alternative: AlternativeConfig,
    pub credits: CreditConfig,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            transport: TransportFactors::default(),
            accommodation: AccommodationFactors::default(),
            activities: ActivityFactors::default(),
            categories: CategoryThresholds::default(),
            global_daily_average_kg: 12.9,
            equivalents: EquivalencyConstants::default(),
            offset_price_usd_per_tonne: 15.0,
            alternative: AlternativeConfig::default(),
            credits: CreditConfig::default(),
        }
    }
}

impl EmissionsConfig {
    /// Load overrides from a JSON file; missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!("Loaded emissions configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.transport;
        let a = &self.accommodation;
        let act = &self.activities;
        let e = &self.equivalents;
        let named = [
            ("transport.flight_short_haul", t.flight_short_haul),
            ("transport.flight_long_haul", t.flight_long_haul),
            ("transport.flight_short_haul_max_km", t.flight_short_haul_max_km),
            ("transport.car_per_vehicle", t.car_per_vehicle),
            ("transport.electric_car_per_vehicle", t.electric_car_per_vehicle),
            ("transport.motorcycle", t.motorcycle),
            ("transport.bus", t.bus),
            ("transport.train", t.train),
            ("transport.ferry", t.ferry),
            ("transport.bicycle", t.bicycle),
            ("transport.walk", t.walk),
            ("accommodation.eco_resort", a.eco_resort),
            ("accommodation.hostel", a.hostel),
            ("accommodation.homestay", a.homestay),
            ("accommodation.vacation_rental", a.vacation_rental),
            ("accommodation.hotel", a.hotel),
            ("accommodation.luxury_hotel", a.luxury_hotel),
            ("activities.sightseeing", act.sightseeing),
            ("activities.adventure", act.adventure),
            ("activities.local_travel", act.local_travel),
            ("activities.events", act.events),
            ("activities.dining", act.dining),
            ("activities.shopping", act.shopping),
            ("offset_price_usd_per_tonne", self.offset_price_usd_per_tonne),
            ("alternative.max_feasible_distance_km", self.alternative.max_feasible_distance_km),
            ("credits.baseline_kg", self.credits.baseline_kg),
            ("credits.credits_per_kg_saved", self.credits.credits_per_kg_saved),
        ];
        if let Some((name, _)) = named.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(format!("{name} must be a finite, non-negative number")));
        }

        let divisors = [
            ("transport.car_average_occupancy", t.car_average_occupancy),
            ("global_daily_average_kg", self.global_daily_average_kg),
            ("equivalents.kg_per_tree_year", e.kg_per_tree_year),
            ("equivalents.kg_per_vehicle_mile", e.kg_per_vehicle_mile),
            ("equivalents.kg_per_kwh", e.kg_per_kwh),
            ("equivalents.kg_per_smartphone_charge", e.kg_per_smartphone_charge),
            ("equivalents.kg_per_gasoline_gallon", e.kg_per_gasoline_gallon),
        ];
        if let Some((name, _)) = divisors.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }

        let c = &self.categories;
        if !(c.low_below < c.medium_below && c.medium_below < c.high_below) {
            return Err(ConfigError::Invalid(
                "category thresholds must be strictly increasing".to_string(),
            ));
        }

        self.credits.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTripInputs {
    #[error("transport distance must be a positive number of kilometres, got {0}")]
    NonPositiveDistance(String),
}

/// Boundary check for caller-supplied inputs.
///
/// Nights and activity counts are unsigned, so negatives are already rejected
/// when the inputs are deserialized.
pub fn validate_inputs(inputs: &TripInputs) -> Result<(), InvalidTripInputs> {
    let distance = inputs.transport.distance_km;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(InvalidTripInputs::NonPositiveDistance(distance.to_string()));
    }
    Ok(())
}

/// Sanitized distance used by every calculation: non-finite or negative becomes 0.
pub fn effective_distance_km(inputs: &TripInputs) -> f64 {
    non_negative(inputs.transport.distance_km)
}

pub fn transport_emissions(mode: TransportMode, distance_km: f64, config: &EmissionsConfig) -> f64 {
    let distance = non_negative(distance_km);
    config.transport.per_km(mode, distance) * distance
}

pub fn accommodation_emissions(kind: AccommodationType, nights: u32, config: &EmissionsConfig) -> f64 {
    config.accommodation.per_night(kind) * f64::from(nights)
}

/// Build the full report for a trip. Pure: no I/O, never panics, never errors.
///
/// Invalid numbers are zeroed rather than propagated, so the worst outcome is
/// an all-zero report; callers check [`EmissionsReport::is_calculable`].
pub fn compute_emissions(inputs: &TripInputs, config: &EmissionsConfig) -> EmissionsReport {
    let mode = inputs.transport.mode;
    let distance_km = effective_distance_km(inputs);
    let nights = inputs.accommodation.nights;

    let transport_kg = transport_emissions(mode, distance_km, config);
    let accommodation_kg = accommodation_emissions(inputs.accommodation.kind, nights, config);
    let activities_kg: f64 = inputs
        .activities
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(kind, count)| config.activities.per_activity(*kind) * f64::from(*count))
        .sum();

    let total_kg = transport_kg + accommodation_kg + activities_kg;
    let per_day_kg = total_kg / f64::from(nights.max(1));
    let per_km_kg = if distance_km > 0.0 {
        total_kg / distance_km
    } else {
        0.0
    };

    let breakdown = if total_kg > 0.0 {
        PercentageBreakdown {
            transport: transport_kg / total_kg * 100.0,
            accommodation: accommodation_kg / total_kg * 100.0,
            activities: activities_kg / total_kg * 100.0,
        }
    } else {
        PercentageBreakdown {
            transport: 0.0,
            accommodation: 0.0,
            activities: 0.0,
        }
    };

    EmissionsReport {
        transport_mode: mode,
        distance_km,
        accommodation_type: inputs.accommodation.kind,
        nights,
        transport_kg,
        accommodation_kg,
        activities_kg,
        total_kg,
        per_day_kg,
        per_km_kg,
        breakdown,
        category: config.categories.classify(per_day_kg),
        equivalents: config.equivalents.for_total(total_kg),
        comparison_percentage: per_unit(per_day_kg, config.global_daily_average_kg) * 100.0,
        offset_cost_usd: total_kg / 1_000.0 * non_negative(config.offset_price_usd_per_tonne),
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn per_unit(kg: f64, kg_per_unit: f64) -> f64 {
    if kg_per_unit.is_finite() && kg_per_unit > 0.0 {
        kg / kg_per_unit
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccommodationStay, TransportLeg};
    use std::collections::BTreeMap;

    fn trip(
        mode: TransportMode,
        distance_km: f64,
        kind: AccommodationType,
        nights: u32,
        activities: &[(ActivityType, u32)],
    ) -> TripInputs {
        TripInputs {
            transport: TransportLeg { mode, distance_km },
            accommodation: AccommodationStay { kind, nights },
            activities: activities.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn medium_flight_uses_short_haul_bracket_and_beats_train() {
        let config = EmissionsConfig::default();
        let flight = compute_emissions(
            &trip(TransportMode::Flight, 1_200.0, AccommodationType::Hotel, 0, &[]),
            &config,
        );
        let train = compute_emissions(
            &trip(TransportMode::Train, 1_200.0, AccommodationType::Hotel, 0, &[]),
            &config,
        );
        assert_eq!(flight.transport_kg, 1_200.0 * config.transport.flight_short_haul);
        assert!(flight.transport_kg / 1_200.0 > train.transport_kg / 1_200.0);
    }

    #[test]
    fn long_haul_flight_factor_is_lower_per_km() {
        let factors = TransportFactors::default();
        assert!(
            factors.per_km(TransportMode::Flight, 1_000.0) > factors.per_km(TransportMode::Flight, 6_000.0)
        );
        assert_eq!(factors.per_km(TransportMode::Flight, 1_500.0), factors.flight_long_haul);
    }

    #[test]
    fn car_factor_is_divided_by_occupancy() {
        let factors = TransportFactors::default();
        let per_km = factors.per_km(TransportMode::Car, 100.0);
        assert!((per_km - 0.192 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn eco_resort_is_cheaper_than_hotel() {
        let config = EmissionsConfig::default();
        let eco = compute_emissions(
            &trip(TransportMode::Train, 100.0, AccommodationType::EcoResort, 3, &[]),
            &config,
        );
        let hotel = compute_emissions(
            &trip(TransportMode::Train, 100.0, AccommodationType::Hotel, 3, &[]),
            &config,
        );
        assert!(eco.accommodation_kg < hotel.accommodation_kg);
    }

    #[test]
    fn accommodation_factors_strictly_increase() {
        let factors = AccommodationFactors::default();
        let ordered: Vec<f64> = AccommodationType::ALL
            .iter()
            .map(|kind| factors.per_night(*kind))
            .collect();
        assert!(ordered.windows(2).all(|w| w[0] < w[1]), "{ordered:?}");
    }

    #[test]
    fn empty_trip_is_all_zero_without_panicking() {
        let report = compute_emissions(
            &trip(
                TransportMode::Car,
                0.0,
                AccommodationType::Hotel,
                0,
                &[(ActivityType::Sightseeing, 0), (ActivityType::Adventure, 0)],
            ),
            &EmissionsConfig::default(),
        );
        assert_eq!(report.total_kg, 0.0);
        assert_eq!(report.per_day_kg, 0.0);
        assert_eq!(report.per_km_kg, 0.0);
        assert_eq!(report.breakdown.transport, 0.0);
        assert_eq!(report.breakdown.accommodation, 0.0);
        assert_eq!(report.breakdown.activities, 0.0);
        assert_eq!(report.category, EmissionCategory::Low);
        assert!(!report.is_calculable());
    }

    #[test]
    fn invalid_distance_is_zeroed() {
        let config = EmissionsConfig::default();
        for distance in [f64::NAN, f64::INFINITY, -250.0] {
            let report = compute_emissions(
                &trip(TransportMode::Bus, distance, AccommodationType::Hostel, 2, &[]),
                &config,
            );
            assert_eq!(report.transport_kg, 0.0);
            assert_eq!(report.distance_km, 0.0);
            assert_eq!(report.total_kg, 2.0 * config.accommodation.hostel);
            assert!(report.is_calculable());
        }
    }

    #[test]
    fn zero_nights_counts_as_one_day() {
        let report = compute_emissions(
            &trip(TransportMode::Train, 200.0, AccommodationType::Hotel, 0, &[]),
            &EmissionsConfig::default(),
        );
        assert_eq!(report.per_day_kg, report.total_kg);
    }

    #[test]
    fn per_day_rate_drives_category() {
        let config = EmissionsConfig::default();
        // 10 nights of hostel plus a short bus ride is low intensity overall
        let long_trip = compute_emissions(
            &trip(TransportMode::Bus, 100.0, AccommodationType::Hostel, 10, &[]),
            &config,
        );
        assert_eq!(long_trip.category, EmissionCategory::Low);

        let short_trip = compute_emissions(
            &trip(TransportMode::Flight, 1_000.0, AccommodationType::LuxuryHotel, 1, &[]),
            &config,
        );
        assert_eq!(short_trip.category, EmissionCategory::VeryHigh);
    }

    #[test]
    fn category_boundaries_belong_to_upper_category() {
        let thresholds = CategoryThresholds::default();
        assert_eq!(thresholds.classify(24.999), EmissionCategory::Low);
        assert_eq!(thresholds.classify(25.0), EmissionCategory::Medium);
        assert_eq!(thresholds.classify(75.0), EmissionCategory::High);
        assert_eq!(thresholds.classify(150.0), EmissionCategory::VeryHigh);
    }

    #[test]
    fn equivalents_and_offsets_scale_linearly() {
        let config = EmissionsConfig::default();
        let report = compute_emissions(
            &trip(
                TransportMode::Car,
                500.0,
                AccommodationType::Hotel,
                2,
                &[(ActivityType::Dining, 3), (ActivityType::Events, 1)],
            ),
            &config,
        );
        let expected_activities = 3.0 * config.activities.dining + config.activities.events;
        assert_eq!(report.activities_kg, expected_activities);
        assert_eq!(
            report.equivalents.tree_years,
            report.total_kg / config.equivalents.kg_per_tree_year
        );
        assert_eq!(
            report.equivalents.vehicle_miles,
            report.total_kg / config.equivalents.kg_per_vehicle_mile
        );
        assert_eq!(report.offset_cost_usd, report.total_kg / 1_000.0 * 15.0);
        assert_eq!(
            report.comparison_percentage,
            report.per_day_kg / config.global_daily_average_kg * 100.0
        );
        assert_eq!(report.per_km_kg, report.total_kg / 500.0);
    }

    #[test]
    fn validate_inputs_rejects_non_positive_distance() {
        let ok = trip(TransportMode::Train, 10.0, AccommodationType::Hotel, 1, &[]);
        assert!(validate_inputs(&ok).is_ok());
        for distance in [0.0, -1.0, f64::NAN] {
            let bad = trip(TransportMode::Train, distance, AccommodationType::Hotel, 1, &[]);
            assert!(matches!(
                validate_inputs(&bad),
                Err(InvalidTripInputs::NonPositiveDistance(_))
            ));
        }
    }

    #[test]
    fn unknown_activity_keys_are_rejected_at_the_boundary() {
        let json = r#"{
            "transport": {"mode": "train", "distance_km": 300.0},
            "accommodation": {"type": "ecoresort", "nights": 2},
            "activities": {"sightseeing": 2, "skydiving": 1}
        }"#;
        assert!(serde_json::from_str::<TripInputs>(json).is_err());

        let negative = r#"{
            "transport": {"mode": "train", "distance_km": 300.0},
            "accommodation": {"type": "hotel", "nights": -1}
        }"#;
        assert!(serde_json::from_str::<TripInputs>(negative).is_err());
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let mut config = EmissionsConfig::default();
        assert!(config.validate().is_ok());

        config.transport.train = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EmissionsConfig::default();
        config.categories.medium_below = 10.0;
        assert!(config.validate().is_err());

        let mut config = EmissionsConfig::default();
        config.equivalents.kg_per_kwh = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_loads_partial_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emissions.json");
        std::fs::write(&path, r#"{"transport": {"train": 0.006}, "offset_price_usd_per_tonne": 25.0}"#)
            .unwrap();

        let config = EmissionsConfig::from_path(&path).unwrap();
        assert_eq!(config.transport.train, 0.006);
        assert_eq!(config.transport.bus, TransportFactors::default().bus);
        assert_eq!(config.offset_price_usd_per_tonne, 25.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_trip() -> impl Strategy<Value = TripInputs> {
            (
                proptest::sample::select(TransportMode::ALL.to_vec()),
                -100.0f64..20_000.0,
                proptest::sample::select(AccommodationType::ALL.to_vec()),
                0u32..60,
                proptest::collection::btree_map(
                    proptest::sample::select(ActivityType::ALL.to_vec()),
                    0u32..20,
                    0..6,
                ),
            )
                .prop_map(|(mode, distance_km, kind, nights, activities)| TripInputs {
                    transport: TransportLeg { mode, distance_km },
                    accommodation: AccommodationStay { kind, nights },
                    activities,
                })
        }

        proptest! {
            #[test]
            fn prop_compute_is_pure(inputs in any_trip()) {
                let config = EmissionsConfig::default();
                let first = compute_emissions(&inputs, &config);
                let second = compute_emissions(&inputs, &config);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn prop_total_is_exact_sum(inputs in any_trip()) {
                let report = compute_emissions(&inputs, &EmissionsConfig::default());
                prop_assert_eq!(
                    report.total_kg,
                    report.transport_kg + report.accommodation_kg + report.activities_kg
                );
            }

            #[test]
            fn prop_percentages_sum_to_hundred(inputs in any_trip()) {
                let report = compute_emissions(&inputs, &EmissionsConfig::default());
                let b = report.breakdown;
                let sum = b.transport + b.accommodation + b.activities;
                if report.total_kg > 0.0 {
                    prop_assert!((sum - 100.0).abs() <= 0.1, "sum = {}", sum);
                } else {
                    prop_assert_eq!(sum, 0.0);
                }
            }

            #[test]
            fn prop_values_are_finite_and_non_negative(inputs in any_trip()) {
                let report = compute_emissions(&inputs, &EmissionsConfig::default());
                for value in [
                    report.transport_kg,
                    report.accommodation_kg,
                    report.activities_kg,
                    report.total_kg,
                    report.per_day_kg,
                    report.per_km_kg,
                    report.offset_cost_usd,
                    report.comparison_percentage,
                ] {
                    prop_assert!(value.is_finite() && value >= 0.0);
                }
            }
        }
    }
}
