use std::time::Duration;

use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, constraint, default_solver,
    variable, variables,
};

use crate::patterns::generate_patterns;
use crate::types::{Pattern, PieceDemand, Plan, PlanEntry, Result, SolveError};

/// Resource limits and numeric policy for one solve.
///
/// Passed explicitly rather than read from ambient state so concurrent
/// solves can run with different settings.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Cap on enumerated patterns; `PatternLimitExceeded` when hit.
    pub max_patterns: Option<usize>,
    /// Bound on the enumeration phase; `SolverTimeout` when exceeded.
    pub time_limit: Option<Duration>,
    /// Maximum deviation tolerated when coercing solver values to integers.
    pub integrality_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_patterns: None,
            time_limit: None,
            integrality_tolerance: 1e-6,
        }
    }
}

pub struct Solver {
    stock_length: u32,
    piece_lengths: Vec<u32>,
    demands: Vec<u32>,
    config: SolverConfig,
}

impl Solver {
    pub fn new(stock_length: u32, piece_lengths: Vec<u32>, demands: Vec<u32>) -> Self {
        Self::with_config(stock_length, piece_lengths, demands, SolverConfig::default())
    }

    pub fn with_config(
        stock_length: u32,
        piece_lengths: Vec<u32>,
        demands: Vec<u32>,
        config: SolverConfig,
    ) -> Self {
        Self {
            stock_length,
            piece_lengths,
            demands,
            config,
        }
    }

    pub fn from_demands(stock_length: u32, demands: &[PieceDemand], config: SolverConfig) -> Self {
        let (piece_lengths, qtys) = demands.iter().map(|d| (d.length, d.qty)).unzip();
        Self::with_config(stock_length, piece_lengths, qtys, config)
    }

    /// Computes the minimum-waste cutting plan.
    ///
    /// The plan satisfies every demand exactly and uses exactly
    /// `ceil(total required length / stock length)` bars; among such plans
    /// total scrap is minimal.
    pub fn solve(&self) -> Result<Plan> {
        self.validate()?;

        // Nothing demanded: an empty plan, no solver call.
        if self.demands.iter().all(|&d| d == 0) {
            return Ok(Plan {
                entries: vec![],
                stock_length: self.stock_length,
                piece_lengths: self.piece_lengths.clone(),
            });
        }

        let patterns = generate_patterns(
            &self.piece_lengths,
            self.stock_length,
            &self.demands,
            self.config.max_patterns,
            self.config.time_limit,
        )?;
        if patterns.is_empty() {
            return Err(SolveError::InfeasibleInstance(
                "no piece combination fits on a single bar".to_string(),
            ));
        }

        let total_required: u64 = self
            .piece_lengths
            .iter()
            .zip(&self.demands)
            .map(|(&l, &d)| l as u64 * d as u64)
            .sum();
        let min_bars = total_required.div_ceil(self.stock_length as u64);
        let scraps: Vec<u64> = patterns
            .iter()
            .map(|p| p.scrap(self.stock_length, &self.piece_lengths))
            .collect();

        // One integer variable per pattern: how many bars to cut with it.
        let mut vars = variables!();
        let xs: Vec<Variable> = (0..patterns.len())
            .map(|i| vars.add(variable().integer().min(0).name(format!("x_{i}"))))
            .collect();

        let total_scrap = xs
            .iter()
            .zip(&scraps)
            .fold(Expression::from(0.0), |acc, (&x, &s)| acc + s as f64 * x);
        let mut model = vars.minimise(total_scrap).using(default_solver);

        for (j, &demand) in self.demands.iter().enumerate() {
            let produced = patterns
                .iter()
                .zip(&xs)
                .fold(Expression::from(0.0), |acc, (p, &x)| {
                    acc + p.counts[j] as f64 * x
                });
            model = model.with(constraint!(produced == demand as f64));
        }
        let bars = xs
            .iter()
            .fold(Expression::from(0.0), |acc, &x| acc + x);
        model = model.with(constraint!(bars == min_bars as f64));

        let solution = match model.solve() {
            Ok(s) => s,
            Err(ResolutionError::Infeasible) => {
                return Err(SolveError::InfeasibleInstance(format!(
                    "demands cannot be met with exactly {min_bars} bar(s)"
                )));
            }
            Err(e) => return Err(SolveError::SolverFailure(e.to_string())),
        };

        self.extract_plan(patterns, &xs, &solution)
    }

    fn validate(&self) -> Result<()> {
        if self.piece_lengths.len() != self.demands.len() {
            return Err(SolveError::InvalidInstance(format!(
                "{} piece lengths but {} demands",
                self.piece_lengths.len(),
                self.demands.len()
            )));
        }
        if self.stock_length == 0 {
            return Err(SolveError::InvalidInstance(
                "stock length must be positive".to_string(),
            ));
        }
        if let Some(j) = self.piece_lengths.iter().position(|&l| l == 0) {
            return Err(SolveError::InvalidInstance(format!(
                "piece length at index {j} must be positive"
            )));
        }
        Ok(())
    }

    /// Coerces the solver's values to exact integer counts and keeps the
    /// patterns actually used. Fractional bar counts are meaningless, so a
    /// value off by more than the tolerance is a solver failure, not noise
    /// to round away.
    fn extract_plan(
        &self,
        patterns: Vec<Pattern>,
        xs: &[Variable],
        solution: &impl Solution,
    ) -> Result<Plan> {
        let mut entries = Vec::new();
        for (pattern, &x) in patterns.into_iter().zip(xs) {
            let raw = solution.value(x);
            let rounded = raw.round();
            if (raw - rounded).abs() > self.config.integrality_tolerance || rounded < 0.0 {
                return Err(SolveError::SolverFailure(format!(
                    "non-integral count {raw} for pattern {pattern}"
                )));
            }
            let count = rounded as u32;
            if count == 0 {
                continue;
            }
            let used = pattern.used_length(&self.piece_lengths);
            entries.push(PlanEntry {
                scrap: self.stock_length as u64 - used,
                used,
                pattern,
                count,
            });
        }
        Ok(Plan {
            entries,
            stock_length: self.stock_length,
            piece_lengths: self.piece_lengths.clone(),
        })
    }
}
