use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// One piece type at the CLI/server boundary: a length and how many are needed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PieceDemand {
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

/// One feasible way to cut a single stock bar.
///
/// `counts[j]` is the number of pieces of type `j`, index-aligned to the
/// instance's piece lengths. Never all-zero, never longer than the bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern {
    pub counts: Vec<u32>,
}

impl Pattern {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Total material consumed by one bar cut with this pattern.
    pub fn used_length(&self, piece_lengths: &[u32]) -> u64 {
        self.counts
            .iter()
            .zip(piece_lengths)
            .map(|(&c, &l)| c as u64 * l as u64)
            .sum()
    }

    pub fn scrap(&self, stock_length: u32, piece_lengths: &[u32]) -> u64 {
        stock_length as u64 - self.used_length(piece_lengths)
    }

    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

/// A pattern together with how many bars are cut using it.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub pattern: Pattern,
    pub count: u32,
    /// Material used per bar of this pattern.
    pub used: u64,
    /// Leftover per bar of this pattern.
    pub scrap: u64,
}

/// The terminal output of the optimizer: patterns with positive counts.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
    pub stock_length: u32,
    pub piece_lengths: Vec<u32>,
}

impl Plan {
    pub fn bar_count(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64).sum()
    }

    pub fn total_scrap(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64 * e.scrap).sum()
    }

    pub fn waste_percent(&self) -> f64 {
        let total_stock = self.stock_length as u64 * self.bar_count();
        if total_stock == 0 {
            return 0.0;
        }
        self.total_scrap() as f64 / total_stock as f64 * 100.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    #[error("no feasible cutting plan exists: {0}")]
    InfeasibleInstance(String),

    #[error("pattern limit exceeded ({0} patterns)")]
    PatternLimitExceeded(usize),

    #[error("timed out after {0:?}")]
    SolverTimeout(Duration),

    #[error("solver failure: {0}")]
    SolverFailure(String),
}

pub type Result<T> = std::result::Result<T, SolveError>;

/// Accepts JSON numbers like `4.0` for integer fields (common from JS clients).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(deserializer)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {v}"
        )));
    }
    Ok(v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_used_and_scrap() {
        let p = Pattern::new(vec![2, 1, 0]);
        let lengths = [722, 210, 140];
        assert_eq!(p.used_length(&lengths), 2 * 722 + 210);
        assert_eq!(p.scrap(2000, &lengths), 2000 - 1654);
    }

    #[test]
    fn test_pattern_display() {
        let p = Pattern::new(vec![3, 0, 2]);
        assert_eq!(p.to_string(), "(3,0,2)");
    }

    #[test]
    fn test_empty_plan_has_no_waste() {
        let plan = Plan {
            entries: vec![],
            stock_length: 2000,
            piece_lengths: vec![],
        };
        assert_eq!(plan.bar_count(), 0);
        assert_eq!(plan.total_scrap(), 0);
        assert_eq!(plan.waste_percent(), 0.0);
    }

    #[test]
    fn test_plan_totals() {
        let lengths = vec![5, 3];
        let p1 = Pattern::new(vec![2, 0]);
        let p2 = Pattern::new(vec![0, 3]);
        let plan = Plan {
            entries: vec![
                PlanEntry {
                    used: p1.used_length(&lengths),
                    scrap: p1.scrap(10, &lengths),
                    pattern: p1,
                    count: 2,
                },
                PlanEntry {
                    used: p2.used_length(&lengths),
                    scrap: p2.scrap(10, &lengths),
                    pattern: p2,
                    count: 1,
                },
            ],
            stock_length: 10,
            piece_lengths: lengths,
        };
        assert_eq!(plan.bar_count(), 3);
        assert_eq!(plan.total_scrap(), 1);
    }

    #[test]
    fn test_deserialize_qty_from_float() {
        let d: PieceDemand = serde_json::from_str(r#"{"length": 722, "qty": 4.0}"#).unwrap();
        assert_eq!(d.qty, 4);
        assert!(serde_json::from_str::<PieceDemand>(r#"{"length": 722, "qty": 4.5}"#).is_err());
        assert!(serde_json::from_str::<PieceDemand>(r#"{"length": 722, "qty": -1}"#).is_err());
    }
}
