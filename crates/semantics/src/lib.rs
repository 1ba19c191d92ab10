//! Semantic enrichment of the program graph.
//!
//! This crate turns the flat node arenas produced by language frontends into
//! a semantically connected graph:
//!
//! - [`scopes`] builds and maintains a tree of lexical scopes mirroring the
//!   program structure and resolves references against it.
//! - [`inference`] synthesizes plausible declarations for symbols that cannot
//!   be resolved because their defining code is not part of the input.
//! - [`execution`] fans translation units out to worker threads, one scope
//!   manager per unit, and deterministically merges the results.
//!
//! The layer is deliberately tolerant: protocol violations and resolution
//! misses are logged and degrade to "no result" instead of aborting, because
//! static analysis routinely runs on partial or malformed codebases.

pub mod error;
pub mod execution;
pub mod inference;
pub mod scopes;

pub use error::{AnalysisError, Result};
pub use execution::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisExecutor, AnalysisResult, AnalysisStats,
    TranslationContext,
};
pub use inference::{Inference, TypeObserver};
pub use scopes::{Scope, ScopeId, ScopeKind, ScopeManager};
