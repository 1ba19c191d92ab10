//! Error types for the semantics crate.

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by the execution layer.
///
/// The scope manager and inference engine never return these: their failure
/// modes are logged and degrade to empty results by design.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Building the rayon worker pool failed
    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A frontend failed while building its translation unit
    #[error("Frontend failed on '{path}': {message}")]
    Frontend { path: String, message: String },
}
