use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for the reconstruction engine
// ---------------------------------------------------------------------------

/// Every failure the core can report. All of them are deterministic data or
/// usage defects; none is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectralError {
    /// Bad or empty input to spectrum construction.
    #[error("malformed spectrum at ({x}, {y}): {reason}")]
    MalformedRecord { x: f64, y: f64, reason: String },

    /// The same stage coordinate was seen twice while building a grid.
    #[error("duplicate stage coordinate ({x}, {y})")]
    DuplicateCoordinate { x: f64, y: f64 },

    /// `resolve` was asked for a coordinate that is not in the grid.
    #[error("stage coordinate ({x}, {y}) is not part of the grid")]
    CoordinateNotFound { x: f64, y: f64 },

    /// Intensity lookup outside the spectrum's wavenumber axis.
    #[error("wavenumber {wavenumber} lies outside [{first}, {last}]")]
    OutOfRange {
        wavenumber: f64,
        first: f64,
        last: f64,
    },

    /// Too few points inside a window for integration or regression.
    #[error("only {found} point(s) in [{w_low}, {w_high}], need at least {required}")]
    InsufficientRange {
        w_low: f64,
        w_high: f64,
        found: usize,
        required: usize,
    },

    /// Convex hull is undefined (collinear or fewer than 3 distinct points).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Window bounds given in the wrong order.
    #[error("invalid wavenumber window: {w_low} > {w_high}")]
    InvalidRange { w_low: f64, w_high: f64 },
}

pub type Result<T> = std::result::Result<T, SpectralError>;
