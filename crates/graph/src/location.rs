use serde::{Deserialize, Serialize};

/// Source region of a node within its translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Start line number (1-based)
    pub start_line: u32,
    /// End line number (1-based)
    pub end_line: u32,
    /// Start column number
    pub start_col: u32,
    /// End column number
    pub end_col: u32,
}

impl Location {
    pub fn new(start_line: u32, end_line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_line,
            end_line,
            start_col,
            end_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_serializes_to_plain_fields() {
        let location = Location::new(1, 3, 5, 9);
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(
            json,
            r#"{"start_line":1,"end_line":3,"start_col":5,"end_col":9}"#
        );
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
    }
}
