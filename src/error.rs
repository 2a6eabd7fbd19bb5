//! Error types.
//!
//! `AppError` is what the binary sees: a message plus a process exit code.
//! The library modules return typed errors (`thiserror`) which convert into
//! `AppError` at the application boundary.

use thiserror::Error;

/// Exit code for usage, input and configuration problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for a selection that does not line up with the catalog.
pub const EXIT_CONTRACT: u8 = 3;
/// Exit code for remote or runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures while turning an AOI geometry into an area.
///
/// These never leave the area estimator: they are logged and reported as a
/// degraded zero-area result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("malformed geometry: {0}")]
    Parse(String),
    #[error("geometry has no `coordinates` member")]
    MissingCoordinates,
    #[error("unsupported geometry type `{0}`")]
    UnsupportedGeometry(String),
    #[error("polygon has an empty exterior ring")]
    EmptyRing,
    #[error("coordinate out of range: lon={lon}, lat={lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },
    #[error("polygon centroid is undefined")]
    DegenerateCentroid,
    #[error("projection error: {0}")]
    Projection(String),
}

/// Failures of the cost model evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("resource `{0}` is not in the catalog")]
    UnknownResourceKey(String),
    #[error("area must be finite and non-negative, got {0}")]
    InvalidArea(f64),
    #[error("credit total overflows at resource `{0}`")]
    Overflow(String),
}

/// Failures while loading or validating the resource catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no entries")]
    Empty,
    #[error("duplicate catalog key `{0}`")]
    DuplicateKey(String),
    #[error("catalog key `{key}` has no known namespace prefix")]
    UnknownNamespace { key: String },
    #[error("catalog key `{key}` does not match its namespace `{namespace}`")]
    NamespaceMismatch { key: String, namespace: String },
    #[error("catalog entry `{0}` has negative or non-finite credits")]
    NegativeCredits(String),
}

/// Failures of the primary remote pricing service.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The service refused the AOI. This is the only error that allows the
    /// local fallback estimate.
    #[error("pricing service rejected the area: {0}")]
    InvalidArea(String),
    #[error("pricing request failed: {0}")]
    Request(String),
    #[error("pricing request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("pricing service returned an empty response")]
    EmptyResponse,
    #[error("failed to parse pricing response: {0}")]
    Decode(String),
}

impl From<CostError> for AppError {
    fn from(err: CostError) -> Self {
        let code = match err {
            CostError::UnknownResourceKey(_) => EXIT_CONTRACT,
            CostError::InvalidArea(_) | CostError::Overflow(_) => EXIT_RUNTIME,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::new(EXIT_USAGE, err.to_string())
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::new(EXIT_RUNTIME, err.to_string())
    }
}
