use std::time::{Duration, Instant};

use crate::types::{Pattern, Result, SolveError};

/// Enumerates every distinct way to cut one stock bar.
///
/// Depth-first over piece types: at type `i` the count ranges over
/// `0..=min(remaining / piece_lengths[i], demands[i])`. Every emitted pattern
/// fits the bar and never exceeds any demand; the all-zero pattern is
/// excluded. The set is complete, and callers must not rely on its order.
///
/// `max_patterns` caps the output size and `time_limit` bounds the search,
/// since the pattern count grows combinatorially with the number of piece
/// types.
///
/// No input checking is done here. The caller must guarantee that
/// `piece_lengths` and `demands` have the same length and that every piece
/// length is non-zero (`Solver::validate` does this); violating either can
/// panic on an out-of-bounds index or a division by zero.
pub fn generate_patterns(
    piece_lengths: &[u32],
    stock_length: u32,
    demands: &[u32],
    max_patterns: Option<usize>,
    time_limit: Option<Duration>,
) -> Result<Vec<Pattern>> {
    // A limit too large to represent as an Instant is no limit at all.
    let deadline = time_limit
        .and_then(|limit| Instant::now().checked_add(limit).map(|at| (at, limit)));
    let mut patterns = Vec::new();
    let mut counts = vec![0u32; piece_lengths.len()];
    recurse(
        piece_lengths,
        demands,
        0,
        stock_length,
        &mut counts,
        &mut patterns,
        max_patterns,
        deadline,
    )?;
    Ok(patterns)
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    piece_lengths: &[u32],
    demands: &[u32],
    i: usize,
    remaining: u32,
    counts: &mut [u32],
    out: &mut Vec<Pattern>,
    max_patterns: Option<usize>,
    deadline: Option<(Instant, Duration)>,
) -> Result<()> {
    if let Some((at, limit)) = deadline
        && Instant::now() >= at
    {
        return Err(SolveError::SolverTimeout(limit));
    }

    if i == piece_lengths.len() {
        if counts.iter().any(|&c| c > 0) {
            if let Some(max) = max_patterns
                && out.len() >= max
            {
                return Err(SolveError::PatternLimitExceeded(max));
            }
            out.push(Pattern::new(counts.to_vec()));
        }
        return Ok(());
    }

    let max_count = std::cmp::min(remaining / piece_lengths[i], demands[i]);
    for c in 0..=max_count {
        counts[i] = c;
        recurse(
            piece_lengths,
            demands,
            i + 1,
            remaining - c * piece_lengths[i],
            counts,
            out,
            max_patterns,
            deadline,
        )?;
    }
    counts[i] = 0;
    Ok(())
}
