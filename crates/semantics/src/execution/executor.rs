use crate::error::{AnalysisError, Result};
use crate::execution::config::AnalysisConfig;
use crate::execution::stats::AnalysisStats;
use crate::scopes::ScopeManager;
use graph::{Graph, LanguageConfig, Name, NodeId, NodeKind, Unit};
use rayon::prelude::*;
use tracing::{info, warn};

/// Everything a frontend needs while building one translation unit: the
/// unit's node arena, a scope manager private to the unit, and the root node
/// the global scope is anchored at.
pub struct TranslationContext<'a> {
    pub unit: &'a mut Unit,
    pub scopes: &'a mut ScopeManager,
    pub translation_unit: NodeId,
}

/// The merged output of an analysis run.
pub struct AnalysisResult {
    pub graph: Graph,
    pub scopes: ScopeManager,
    pub stats: AnalysisStats,
}

/// Fans translation units out to a worker pool and merges the results.
///
/// Each unit is built in isolation: its own arena, its own scope manager, no
/// shared state. Node ids are globally unique because every unit gets a
/// distinct id up front, so the merge never rewrites identities. A frontend
/// error marks its unit as errored and analysis continues with the rest.
pub struct AnalysisExecutor {
    config: AnalysisConfig,
    language: LanguageConfig,
}

impl AnalysisExecutor {
    pub fn new(config: AnalysisConfig, language: LanguageConfig) -> Self {
        Self { config, language }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn execute<F>(&self, paths: &[String], frontend: F) -> Result<AnalysisResult>
    where
        F: Fn(&mut TranslationContext) -> anyhow::Result<()> + Sync,
    {
        let start_time = std::time::Instant::now();
        info!(
            "Analyzing {} units on {} worker threads",
            paths.len(),
            self.config.worker_threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()?;

        let outcomes: Vec<(Unit, ScopeManager, Option<AnalysisError>)> = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| {
                    let mut unit = Unit::new(index as u32, path);
                    let mut scopes = ScopeManager::new(self.language.clone());
                    let translation_unit =
                        unit.add(Name::new(path.as_str()), NodeKind::TranslationUnit);
                    scopes.reset_to_global(translation_unit);

                    let mut context = TranslationContext {
                        unit: &mut unit,
                        scopes: &mut scopes,
                        translation_unit,
                    };
                    let error = match frontend(&mut context) {
                        Ok(()) => None,
                        Err(source) => {
                            let error = AnalysisError::Frontend {
                                path: path.clone(),
                                message: source.to_string(),
                            };
                            warn!("{error}");
                            Some(error)
                        }
                    };
                    (unit, scopes, error)
                })
                .collect()
        });

        // single-threaded merge, in unit order
        let mut graph = Graph::new();
        let mut managers = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for (unit, scopes, error) in outcomes {
            graph.add_unit(unit);
            managers.push(scopes);
            if let Some(error) = error {
                errors.push(error.to_string());
            }
        }
        let mut scopes = ScopeManager::new(self.language.clone());
        scopes.merge_from(managers);

        let stats = AnalysisStats {
            units_processed: graph.unit_count(),
            units_errored: errors.len(),
            total_nodes: graph.total_nodes(),
            total_scopes: scopes.scope_count(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
            errors,
        };
        info!("{}", stats.format_stats());

        Ok(AnalysisResult {
            graph,
            scopes,
            stats,
        })
    }
}
