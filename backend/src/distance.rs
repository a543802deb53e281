use chrono::{DateTime, Utc};

use crate::{
    adjustment::adjust,
    cache::DistanceCache,
    geocoder::{GeocodeError, GeocodedPlace, Geocoder},
    geodesy::ellipsoidal_distance,
    models::{DistanceResult, TransportMode},
};

/// Place names in, mode-adjusted travel distance out.
pub struct DistanceService<G> {
    geocoder: G,
    cache: DistanceCache,
}

impl<G: Geocoder> DistanceService<G> {
    pub fn new(geocoder: G, cache: DistanceCache) -> Self {
        Self { geocoder, cache }
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Estimate the travel distance between two named places for a mode.
    ///
    /// Cached results are returned without touching the geocoder. On a miss
    /// both endpoints are geocoded concurrently and the fresh result is cached;
    /// a failing cache write is logged and does not fail the estimate.
    pub async fn estimate(
        &self,
        origin: &str,
        destination: &str,
        mode: TransportMode,
    ) -> Result<DistanceResult, GeocodeError> {
        if let Some(cached) = self.cache.get(origin, destination, mode) {
            return Ok(cached);
        }

        let (from, to) = tokio::try_join!(
            self.geocoder.geocode(origin),
            self.geocoder.geocode(destination)
        )?;

        let result = compute_distance(&from, &to, mode, self.cache.now());
        tracing::info!(
            "{} -> {} by {mode}: {:.1} km (geodesic {:.1} km x{:.2}, {:?})",
            result.origin_place,
            result.destination_place,
            result.distance_km,
            result.geodesic_distance_km,
            result.adjustment_factor,
            result.method
        );

        if let Err(err) = self.cache.put(origin, destination, mode, &result) {
            tracing::warn!("Failed to cache distance {origin} -> {destination}: {err}");
        }
        Ok(result)
    }
}

/// Combine two resolved places into a [`DistanceResult`].
pub fn compute_distance(
    origin: &GeocodedPlace,
    destination: &GeocodedPlace,
    mode: TransportMode,
    computed_at: DateTime<Utc>,
) -> DistanceResult {
    let geodesic = ellipsoidal_distance(origin.coordinate, destination.coordinate);
    let adjustment = adjust(
        geodesic.km,
        mode,
        origin.coordinate.lat,
        destination.coordinate.lat,
    );

    DistanceResult {
        distance_km: geodesic.km * adjustment.factor,
        geodesic_distance_km: geodesic.km,
        adjustment_factor: adjustment.factor,
        mode,
        route_description: adjustment.description,
        origin_place: origin.display_name.clone(),
        destination_place: destination.display_name.clone(),
        origin: origin.coordinate,
        destination: destination.coordinate,
        method: geodesic.method,
        computed_at,
    }
}
