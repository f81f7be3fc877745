use thiserror::Error;

/// Errors raised by the density and alkalinity computations.
///
/// Every variant is produced synchronously where the problem is detected;
/// nothing is retried and no partial result accompanies an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A physical input lies outside its valid domain (negative salinity,
    /// non-positive sample mass or acid molarity).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Titration data is malformed or incomplete.
    #[error("Invalid titration sample: {0}")]
    InvalidSample(String),

    /// Too few usable points remain for a regression.
    #[error("Insufficient data: {available} usable point(s), at least {required} required")]
    InsufficientData { available: usize, required: usize },

    /// The non-linear fit hit its iteration bound or diverged.
    #[error("Non-linear fit did not converge after {iterations} iteration(s): {reason}")]
    Convergence { iterations: usize, reason: String },

    /// Element-wise inputs of incompatible lengths.
    #[error("Shape mismatch: cannot combine lengths {left} and {right}")]
    ShapeMismatch { left: usize, right: usize },
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Errors surfaced by the command-line front end.
#[cfg(feature = "cli")]
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error reading from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON for --sample-json: {source}")]
    ParseSampleJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON in input document: {source}")]
    ParseInputDocument {
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not serialize output to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing titration data: provide --input or --sample-json")]
    MissingInputData,

    #[error(transparent)]
    Calc(#[from] CalcError),
}
