use crate::models::TransportMode;

/// Latitude spread beyond which a short overland route is assumed to cross mountains.
const MOUNTAIN_LAT_DELTA_DEG: f64 = 20.0;
const MOUNTAIN_MAX_GEODESIC_KM: f64 = 2_000.0;
const TRANSCONTINENTAL_MIN_GEODESIC_KM: f64 = 5_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteClass {
    Air,
    Road,
    Rail,
    Sea,
    Active,
}

fn route_class(mode: TransportMode) -> RouteClass {
    match mode {
        TransportMode::Flight => RouteClass::Air,
        TransportMode::Car
        | TransportMode::ElectricCar
        | TransportMode::Motorcycle
        | TransportMode::Bus => RouteClass::Road,
        TransportMode::Train => RouteClass::Rail,
        TransportMode::Ferry => RouteClass::Sea,
        TransportMode::Bicycle | TransportMode::Walk => RouteClass::Active,
    }
}

struct Bracket {
    /// Exclusive upper bound of the geodesic distance, `None` for the last bracket.
    below_km: Option<f64>,
    factor: f64,
    label: &'static str,
}

const fn bracket(below_km: f64, factor: f64, label: &'static str) -> Bracket {
    Bracket {
        below_km: Some(below_km),
        factor,
        label,
    }
}

const fn open_bracket(factor: f64, label: &'static str) -> Bracket {
    Bracket {
        below_km: None,
        factor,
        label,
    }
}

// Short flights spend proportionally more distance on taxi, climb and descent.
const FLIGHT_BRACKETS: &[Bracket] = &[
    bracket(500.0, 1.09, "short-haul flight (<500 km)"),
    bracket(1_500.0, 1.07, "short/medium-haul flight (500-1500 km)"),
    bracket(3_700.0, 1.05, "medium-haul flight (1500-3700 km)"),
    bracket(8_000.0, 1.03, "long-haul flight (3700-8000 km)"),
    open_bracket(1.02, "ultra long-haul flight (>=8000 km)"),
];

// Urban street grids dominate short road trips.
const ROAD_BRACKETS: &[Bracket] = &[
    bracket(50.0, 1.40, "urban road route (<50 km)"),
    bracket(200.0, 1.30, "regional road route (50-200 km)"),
    bracket(500.0, 1.25, "intercity road route (200-500 km)"),
    bracket(1_000.0, 1.20, "long road route (500-1000 km)"),
    open_bracket(1.15, "highway corridor (>=1000 km)"),
];

const RAIL_BRACKETS: &[Bracket] = &[
    bracket(100.0, 1.30, "regional rail (<100 km)"),
    bracket(500.0, 1.20, "intercity rail (100-500 km)"),
    bracket(1_500.0, 1.15, "long-distance rail (500-1500 km)"),
    open_bracket(1.10, "trunk rail corridor (>=1500 km)"),
];

const SEA_BRACKETS: &[Bracket] = &[
    bracket(100.0, 1.15, "short ferry crossing (<100 km)"),
    open_bracket(1.10, "open-sea ferry route (>=100 km)"),
];

const BICYCLE_BRACKETS: &[Bracket] = &[
    bracket(10.0, 1.35, "urban cycle route (<10 km)"),
    bracket(50.0, 1.30, "regional cycle route (10-50 km)"),
    open_bracket(1.25, "long-distance cycle route (>=50 km)"),
];

const WALK_BRACKETS: &[Bracket] = &[
    bracket(5.0, 1.30, "urban walk (<5 km)"),
    bracket(20.0, 1.25, "day hike (5-20 km)"),
    open_bracket(1.20, "long-distance trail (>=20 km)"),
];

fn brackets_for(mode: TransportMode) -> &'static [Bracket] {
    match mode {
        TransportMode::Flight => FLIGHT_BRACKETS,
        TransportMode::Car
        | TransportMode::ElectricCar
        | TransportMode::Motorcycle
        | TransportMode::Bus => ROAD_BRACKETS,
        TransportMode::Train => RAIL_BRACKETS,
        TransportMode::Ferry => SEA_BRACKETS,
        TransportMode::Bicycle => BICYCLE_BRACKETS,
        TransportMode::Walk => WALK_BRACKETS,
    }
}

/// Terrain bonuses for (mountainous, transcontinental) routes.
fn terrain_bonus(class: RouteClass) -> Option<(f64, f64)> {
    match class {
        RouteClass::Road => Some((0.10, 0.07)),
        RouteClass::Rail => Some((0.08, 0.07)),
        RouteClass::Air | RouteClass::Sea | RouteClass::Active => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModeAdjustment {
    pub factor: f64,
    pub description: String,
}

/// Convert a straight-line distance into an expected travel distance factor.
///
/// The factor comes from the mode's distance bracket; road and rail routes get
/// an additional markup for likely mountain crossings (large latitude spread
/// over a short distance) and for transcontinental distances.
pub fn adjust(geodesic_km: f64, mode: TransportMode, origin_lat: f64, dest_lat: f64) -> ModeAdjustment {
    let distance = if geodesic_km.is_finite() {
        geodesic_km.max(0.0)
    } else {
        0.0
    };

    let brackets = brackets_for(mode);
    let selected = brackets
        .iter()
        .find(|b| b.below_km.is_none_or(|limit| distance < limit))
        .unwrap_or(&brackets[brackets.len() - 1]);

    let mut factor = selected.factor;
    let mut description = format!("{mode}: {} x{:.2}", selected.label, selected.factor);

    if let Some((mountain, transcontinental)) = terrain_bonus(route_class(mode)) {
        let lat_spread = (origin_lat - dest_lat).abs();
        if lat_spread > MOUNTAIN_LAT_DELTA_DEG && distance < MOUNTAIN_MAX_GEODESIC_KM {
            factor += mountain;
            description.push_str(&format!(", mountainous terrain +{mountain:.2}"));
        }
        if distance > TRANSCONTINENTAL_MIN_GEODESIC_KM {
            factor += transcontinental;
            description.push_str(&format!(", transcontinental +{transcontinental:.2}"));
        }
    }

    ModeAdjustment {
        factor: factor.max(1.0),
        description,
    }
}
