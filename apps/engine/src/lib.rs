#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod store;
pub mod util;


// Re-exports for public API
pub use config::FlowConfig;
pub use domain::cards::{ability_for, point_value, Ability, Card, CardId, Rank, Suit};
pub use domain::events::GameEvent;
pub use domain::state::{
    ActiveAbility, Game, GameId, GameStatus, Grid, GridPos, Player, PlayerId,
};
pub use domain::transitions::{AbilityTarget, StopPolicy};
pub use errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
pub use services::game_flow::{GameFlowService, MutationOutcome, NewGame};
pub use store::{ChangeNotice, GameStore, MemoryStore, Versioned};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
