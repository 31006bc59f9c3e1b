//! End-of-round scoring.

use crate::domain::state::Grid;

/// Sum of rank-derived values over every occupied cell. Face state is
/// irrelevant here: end-game reveals everything before scoring runs.
pub fn score_grid(grid: &Grid) -> i32 {
    grid.occupied().map(|(_, card)| card.value()).sum()
}
