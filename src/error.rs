use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendsError {
    #[error("CSV missing columns: {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a boundary feature was left out of the centroid map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("feature has no region code")]
    MissingCode,

    #[error("unsupported geometry type: {0}")]
    UnsupportedType(String),

    #[error("geometry has no usable coordinates")]
    MissingCoordinates,

    #[error("centroid is not finite")]
    NonFinite,
}

pub type Result<T> = std::result::Result<T, TrendsError>;
