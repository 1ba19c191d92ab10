/// Settings shared by every analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Worker threads for the per-unit build phase. Zero means one per core.
    pub worker_threads: usize,
    /// Synthesize declarations (functions, fields, namespaces, templates)
    /// for symbols that cannot be resolved.
    pub infer_declarations: bool,
    /// Synthesize record declarations for unknown object types.
    pub infer_records: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfigBuilder::build(0)
    }
}

pub struct AnalysisConfigBuilder;

impl AnalysisConfigBuilder {
    pub fn build(threads: usize) -> AnalysisConfig {
        let effective_threads = AnalysisConfigBuilder::get_effective_threads(threads);
        AnalysisConfig {
            worker_threads: effective_threads,
            infer_declarations: true,
            infer_records: true,
        }
    }

    pub fn get_effective_threads(threads: usize) -> usize {
        if threads == 0 {
            num_cpus::get()
        } else {
            threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_zero_threads() {
        let config = AnalysisConfigBuilder::build(0);

        assert!(config.worker_threads > 0);
        assert!(config.infer_declarations);
        assert!(config.infer_records);
    }

    #[test]
    fn test_build_with_explicit_threads() {
        let config = AnalysisConfigBuilder::build(3);

        assert_eq!(config.worker_threads, 3);
    }
}
