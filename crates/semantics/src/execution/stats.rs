use serde::{Deserialize, Serialize};

/// Summary of one analysis run, collected after the merge phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub units_processed: usize,
    pub units_errored: usize,
    pub total_nodes: usize,
    pub total_scopes: usize,
    pub duration_seconds: f64,
    /// Formatted frontend errors, one per errored unit.
    pub errors: Vec<String>,
}

impl AnalysisStats {
    pub fn format_stats(&self) -> String {
        format!(
            "Analyzed {} units ({} errored) into {} nodes and {} scopes in {:.2}s",
            self.units_processed,
            self.units_errored,
            self.total_nodes,
            self.total_scopes,
            self.duration_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stats() {
        let stats = AnalysisStats {
            units_processed: 3,
            units_errored: 1,
            total_nodes: 42,
            total_scopes: 7,
            duration_seconds: 0.25,
            errors: vec!["Frontend failed on 'b.cpp': unexpected token".to_string()],
        };

        let formatted = stats.format_stats();
        assert!(formatted.contains("3 units"));
        assert!(formatted.contains("1 errored"));
        assert!(formatted.contains("42 nodes"));
    }
}
