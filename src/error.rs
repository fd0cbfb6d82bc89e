use thiserror::Error;

/// Errors raised by the display surface.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// A write landed outside the grid. Always a bug in the caller's boundary math.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange {
        row: i32,
        col: i32,
        rows: usize,
        cols: usize,
    },
    #[error("a {rows}x{cols} grid is too small, need at least {min_rows}x{min_cols}")]
    TooSmall {
        rows: usize,
        cols: usize,
        min_rows: usize,
        min_cols: usize,
    },
    #[error("terminal write failed")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while reading or validating the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO failed")]
    Io(#[from] std::io::Error),
    #[error("config JSON failed")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {message}")]
    Validation { message: String },
}
