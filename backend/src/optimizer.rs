use crate::{
    emissions::{
        EmissionsConfig, accommodation_emissions, effective_distance_km, transport_emissions,
    },
    models::{AccommodationType, AlternativeScenario, TransportMode, TripInputs},
};

/// Lowest-emission motorized mode for the given distance.
///
/// Walking and cycling are excluded: they are never a realistic replacement
/// for the inter-city trips this model covers.
pub fn best_transport_mode(distance_km: f64, config: &EmissionsConfig) -> TransportMode {
    TransportMode::ALL
        .into_iter()
        .filter(|mode| !mode.is_active())
        .min_by(|a, b| {
            config
                .transport
                .per_km(*a, distance_km)
                .total_cmp(&config.transport.per_km(*b, distance_km))
        })
        .unwrap_or(TransportMode::Train)
}

pub fn best_accommodation_type(config: &EmissionsConfig) -> AccommodationType {
    AccommodationType::ALL
        .into_iter()
        .min_by(|a, b| {
            config
                .accommodation
                .per_night(*a)
                .total_cmp(&config.accommodation.per_night(*b))
        })
        .unwrap_or(AccommodationType::EcoResort)
}

/// Recompute a trip with the lowest-emission transport and accommodation.
///
/// Savings are clamped per component so a trip that already uses the best
/// option never reports negative savings. Feasibility only changes the
/// guidance text; the numbers are always reported.
pub fn optimize(inputs: &TripInputs, config: &EmissionsConfig) -> AlternativeScenario {
    let distance_km = effective_distance_km(inputs);
    let nights = inputs.accommodation.nights;

    let current_transport_kg = transport_emissions(inputs.transport.mode, distance_km, config);
    let current_accommodation_kg =
        accommodation_emissions(inputs.accommodation.kind, nights, config);

    let best_transport_mode = best_transport_mode(distance_km, config);
    let best_accommodation_type = best_accommodation_type(config);
    let best_transport_kg = transport_emissions(best_transport_mode, distance_km, config);
    let best_accommodation_kg = accommodation_emissions(best_accommodation_type, nights, config);

    let transport_savings_kg = (current_transport_kg - best_transport_kg).max(0.0);
    let accommodation_savings_kg = (current_accommodation_kg - best_accommodation_kg).max(0.0);
    let savings_kg = transport_savings_kg + accommodation_savings_kg;

    let current_total = current_transport_kg + current_accommodation_kg;
    let savings_percent = if current_total > 0.0 {
        savings_kg / current_total * 100.0
    } else {
        0.0
    };

    let feasible = distance_km <= config.alternative.max_feasible_distance_km;
    let guidance = if savings_kg <= 0.0 {
        "This trip already uses the lowest-emission options available.".to_string()
    } else if feasible {
        format!(
            "Travel by {best_transport_mode} and stay in a {best_accommodation_type} to save {savings_kg:.1} kg CO2e."
        )
    } else {
        format!(
            "At {distance_km:.0} km, {best_transport_mode} is unlikely to be practical; \
             choosing a {best_accommodation_type} still saves {accommodation_savings_kg:.1} kg CO2e."
        )
    };

    AlternativeScenario {
        current_transport_kg,
        current_accommodation_kg,
        best_transport_mode,
        best_transport_kg,
        best_accommodation_type,
        best_accommodation_kg,
        transport_savings_kg,
        accommodation_savings_kg,
        savings_kg,
        savings_percent,
        trees_saved: config.equivalents.trees(savings_kg),
        feasible,
        guidance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccommodationStay, TransportLeg};

    fn trip(mode: TransportMode, distance_km: f64, kind: AccommodationType, nights: u32) -> TripInputs {
        TripInputs {
            transport: TransportLeg { mode, distance_km },
            accommodation: AccommodationStay { kind, nights },
            activities: Default::default(),
        }
    }

    #[test]
    fn default_best_choices_are_train_and_eco_resort() {
        let config = EmissionsConfig::default();
        assert_eq!(best_transport_mode(800.0, &config), TransportMode::Train);
        assert_eq!(best_accommodation_type(&config), AccommodationType::EcoResort);
    }

    #[test]
    fn flight_and_hotel_trip_saves_both_components() {
        let config = EmissionsConfig::default();
        let scenario = optimize(
            &trip(TransportMode::Flight, 1_000.0, AccommodationType::Hotel, 4),
            &config,
        );
        assert!((scenario.transport_savings_kg - 1_000.0 * (0.255 - 0.035)).abs() < 1e-9);
        assert!((scenario.accommodation_savings_kg - 4.0 * (18.0 - 5.0)).abs() < 1e-9);
        assert_eq!(
            scenario.savings_kg,
            scenario.transport_savings_kg + scenario.accommodation_savings_kg
        );
        assert!(scenario.feasible);
        assert!(scenario.savings_percent > 0.0 && scenario.savings_percent < 100.0);
        assert_eq!(scenario.trees_saved, scenario.savings_kg / 21.77);
    }

    #[test]
    fn walking_trip_has_no_negative_transport_savings() {
        let scenario = optimize(
            &trip(TransportMode::Walk, 15.0, AccommodationType::EcoResort, 2),
            &EmissionsConfig::default(),
        );
        assert_eq!(scenario.transport_savings_kg, 0.0);
        assert_eq!(scenario.accommodation_savings_kg, 0.0);
        assert_eq!(scenario.savings_kg, 0.0);
        assert!(scenario.guidance.contains("already"));
    }

    #[test]
    fn long_haul_is_infeasible_but_still_reports_savings() {
        let scenario = optimize(
            &trip(TransportMode::Flight, 9_000.0, AccommodationType::LuxuryHotel, 7),
            &EmissionsConfig::default(),
        );
        assert!(!scenario.feasible);
        assert!(scenario.transport_savings_kg > 0.0);
        assert!(scenario.guidance.contains("unlikely"));
    }

    #[test]
    fn empty_trip_has_zero_percent() {
        let scenario = optimize(
            &trip(TransportMode::Car, 0.0, AccommodationType::Hotel, 0),
            &EmissionsConfig::default(),
        );
        assert_eq!(scenario.savings_percent, 0.0);
        assert_eq!(scenario.savings_kg, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_savings_never_negative(
                mode in proptest::sample::select(TransportMode::ALL.to_vec()),
                distance in -10.0f64..20_000.0,
                kind in proptest::sample::select(AccommodationType::ALL.to_vec()),
                nights in 0u32..30
            ) {
                let scenario = optimize(&trip(mode, distance, kind, nights), &EmissionsConfig::default());
                prop_assert!(scenario.transport_savings_kg >= 0.0);
                prop_assert!(scenario.accommodation_savings_kg >= 0.0);
                prop_assert!(scenario.savings_kg >= 0.0);
                prop_assert!(scenario.savings_percent >= 0.0 && scenario.savings_percent <= 100.0 + 1e-9);
            }
        }
    }
}
