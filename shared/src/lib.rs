use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Flight,
    Car,
    ElectricCar,
    Motorcycle,
    Bus,
    Train,
    Ferry,
    Bicycle,
    Walk,
}

impl TransportMode {
    pub const ALL: [TransportMode; 9] = [
        TransportMode::Flight,
        TransportMode::Car,
        TransportMode::ElectricCar,
        TransportMode::Motorcycle,
        TransportMode::Bus,
        TransportMode::Train,
        TransportMode::Ferry,
        TransportMode::Bicycle,
        TransportMode::Walk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Flight => "flight",
            TransportMode::Car => "car",
            TransportMode::ElectricCar => "electriccar",
            TransportMode::Motorcycle => "motorcycle",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Ferry => "ferry",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Walk => "walk",
        }
    }

    /// Human-powered modes emit nothing per kilometre.
    pub fn is_active(self) -> bool {
        matches!(self, TransportMode::Bicycle | TransportMode::Walk)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = normalize_variant(s);
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == needle)
            .ok_or_else(|| format!("unknown transport mode '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccommodationType {
    EcoResort,
    Hostel,
    Homestay,
    VacationRental,
    Hotel,
    LuxuryHotel,
}

impl AccommodationType {
    pub const ALL: [AccommodationType; 6] = [
        AccommodationType::EcoResort,
        AccommodationType::Hostel,
        AccommodationType::Homestay,
        AccommodationType::VacationRental,
        AccommodationType::Hotel,
        AccommodationType::LuxuryHotel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccommodationType::EcoResort => "ecoresort",
            AccommodationType::Hostel => "hostel",
            AccommodationType::Homestay => "homestay",
            AccommodationType::VacationRental => "vacationrental",
            AccommodationType::Hotel => "hotel",
            AccommodationType::LuxuryHotel => "luxuryhotel",
        }
    }
}

impl fmt::Display for AccommodationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccommodationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = normalize_variant(s);
        AccommodationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("unknown accommodation type '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Sightseeing,
    Adventure,
    LocalTravel,
    Events,
    Dining,
    Shopping,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::Sightseeing,
        ActivityType::Adventure,
        ActivityType::LocalTravel,
        ActivityType::Events,
        ActivityType::Dining,
        ActivityType::Shopping,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Sightseeing => "sightseeing",
            ActivityType::Adventure => "adventure",
            ActivityType::LocalTravel => "localtravel",
            ActivityType::Events => "events",
            ActivityType::Dining => "dining",
            ActivityType::Shopping => "shopping",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = normalize_variant(s);
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("unknown activity type '{s}'"))
    }
}

/// Lowercases and drops separators so "Local Travel", "local_travel" and
/// "localtravel" all name the same variant.
fn normalize_variant(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportLeg {
    pub mode: TransportMode,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccommodationStay {
    #[serde(rename = "type")]
    pub kind: AccommodationType,
    pub nights: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInputs {
    pub transport: TransportLeg,
    pub accommodation: AccommodationStay,
    #[serde(default)]
    pub activities: BTreeMap<ActivityType, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRequest {
    pub origin: String,
    pub destination: String,
    pub mode: TransportMode,
}

/// Which geodesic solution produced a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    Vincenty,
    Haversine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub distance_km: f64,
    pub geodesic_distance_km: f64,
    pub adjustment_factor: f64,
    pub mode: TransportMode,
    pub route_description: String,
    pub origin_place: String,
    pub destination_place: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub method: DistanceMethod,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageBreakdown {
    pub transport: f64,
    pub accommodation: f64,
    pub activities: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equivalents {
    pub tree_years: f64,
    pub vehicle_miles: f64,
    pub kwh: f64,
    pub smartphone_charges: f64,
    pub gasoline_gallons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsReport {
    pub transport_mode: TransportMode,
    pub distance_km: f64,
    pub accommodation_type: AccommodationType,
    pub nights: u32,
    pub transport_kg: f64,
    pub accommodation_kg: f64,
    pub activities_kg: f64,
    pub total_kg: f64,
    pub per_day_kg: f64,
    pub per_km_kg: f64,
    pub breakdown: PercentageBreakdown,
    pub category: EmissionCategory,
    pub equivalents: Equivalents,
    pub comparison_percentage: f64,
    pub offset_cost_usd: f64,
}

impl EmissionsReport {
    /// A zero or non-finite total means required inputs were missing and the
    /// report must not be shown as a real footprint.
    pub fn is_calculable(&self) -> bool {
        self.total_kg.is_finite() && self.total_kg > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScenario {
    pub current_transport_kg: f64,
    pub current_accommodation_kg: f64,
    pub best_transport_mode: TransportMode,
    pub best_transport_kg: f64,
    pub best_accommodation_type: AccommodationType,
    pub best_accommodation_kg: f64,
    pub transport_savings_kg: f64,
    pub accommodation_savings_kg: f64,
    pub savings_kg: f64,
    pub savings_percent: f64,
    pub trees_saved: f64,
    pub feasible: bool,
    pub guidance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstTrip,
    Explorer,
    Globetrotter,
    RailEnthusiast,
    ZeroEmissionTraveler,
    LowImpactAverage,
    CreditCollector,
    CarbonChampion,
}

impl Achievement {
    pub const ALL: [Achievement; 8] = [
        Achievement::FirstTrip,
        Achievement::Explorer,
        Achievement::Globetrotter,
        Achievement::RailEnthusiast,
        Achievement::ZeroEmissionTraveler,
        Achievement::LowImpactAverage,
        Achievement::CreditCollector,
        Achievement::CarbonChampion,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreditState {
    pub trip_count: usize,
    pub total_credits_earned: f64,
    pub level: u32,
    pub level_name: String,
    pub progress_to_next_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_level_threshold: Option<f64>,
    pub unlocked_achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: i64,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub inputs: TripInputs,
    pub report: EmissionsReport,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
