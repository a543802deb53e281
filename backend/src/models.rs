pub use shared::{
    AccommodationStay, AccommodationType, Achievement, ActivityType, AlternativeScenario,
    ApiError, Coordinate, DistanceMethod, DistanceRequest, DistanceResult, EmissionCategory,
    EmissionsReport, Equivalents, PercentageBreakdown, TransportLeg, TransportMode, TripInputs,
    TripRecord, UserCreditState,
};
