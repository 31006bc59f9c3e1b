//! Dealing: partition a shuffled deck into per-player grids.

use tracing::warn;

use crate::domain::cards::Card;
use crate::domain::state::{rows_for_game_mode, Grid, GridPos, PlayerId, GRID_COLS};
use crate::errors::domain::DomainError;

/// Deal `game_mode` cards to each player in order, row-major from the deck
/// head, every dealt card face down. Returns one grid per player id, in the
/// same order as `player_ids`; the deck keeps whatever was not dealt.
///
/// A short deck is not an error: remaining cells stay empty and a
/// diagnostic is logged. With `number_of_decks = 2 * player_count` this
/// never happens in practice.
pub fn deal(
    deck: &mut Vec<Card>,
    player_ids: &[PlayerId],
    game_mode: u8,
) -> Result<Vec<(PlayerId, Grid)>, DomainError> {
    let rows = rows_for_game_mode(game_mode)?;

    let needed = player_ids.len() * rows * GRID_COLS;
    if deck.len() < needed {
        warn!(
            deck_len = deck.len(),
            needed,
            players = player_ids.len(),
            game_mode,
            "deck too small for full deal; short-dealing with empty cells"
        );
    }

    let mut grids = Vec::with_capacity(player_ids.len());
    for &player_id in player_ids {
        let mut grid = Grid::new(rows);
        for row in 0..rows {
            for col in 0..GRID_COLS {
                if deck.is_empty() {
                    break;
                }
                let mut card = deck.remove(0);
                card.face_up = false;
                grid.put(GridPos::new(row, col), card)?;
            }
        }
        grids.push((player_id, grid));
    }

    Ok(grids)
}
