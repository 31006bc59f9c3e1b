//! Domain layer: pure game logic types and transitions.

pub mod cards;
pub mod dealing;
pub mod deck;
pub mod events;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod transitions;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_abilities;
#[cfg(test)]
mod tests_dealing;

// Re-exports for ergonomics
pub use cards::{ability_for, point_value, Ability, Card, CardId, Rank, Suit};
pub use dealing::deal;
pub use deck::create_deck;
pub use scoring::score_grid;
pub use state::{ActiveAbility, Game, GameId, GameStatus, Grid, GridPos, Player, PlayerId};
pub use transitions::{AbilityTarget, StopPolicy};
