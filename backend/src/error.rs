use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::database::DatabaseError;
use crate::emissions::InvalidTripInputs;
use crate::geocoder::GeocodeError;

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error("distance cache error: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    InvalidInputs(#[from] InvalidTripInputs),
    #[error("emissions could not be calculated for these inputs")]
    NotCalculable,
    #[error("geocoder client could not be built: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
