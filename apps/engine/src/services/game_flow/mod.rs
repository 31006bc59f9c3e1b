//! Game flow service - bridges pure domain transitions with the store.
//!
//! Every mutating operation goes through the optimistic commit loop in
//! `mutation`; actor legality is re-validated by the domain transition
//! against the freshly loaded document on every attempt, so a delayed
//! action from a player who has since lost the turn is rejected rather
//! than applied.

mod lifecycle;
mod mutation;
mod player_actions;

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::FlowConfig;
use crate::domain::cards::Card;
use crate::domain::state::{GameId, PlayerId};
use crate::store::GameStore;

pub use lifecycle::NewGame;
pub use mutation::MutationOutcome;

/// Deferred lifecycle jobs, one slot per kind per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum JobKind {
    Start,
    Finish,
}

pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    config: FlowConfig,
    /// Transient held cards keyed by (game, player). A held card belongs to
    /// the acting player and is not board state; it re-enters the document
    /// on discard or replace, or is surrendered to the discard pile when
    /// the end-game fires while it is still outstanding.
    held: Arc<Mutex<HashMap<(GameId, PlayerId), HeldSlot>>>,
    /// Scheduled deferred transitions, deduplicated per game and kind.
    jobs: Arc<DashMap<(GameId, JobKind), CancellationToken>>,
}

/// A held-card slot: reserved while the draw/pick commit is in flight so a
/// second concurrent draw by the same player is rejected up front.
#[derive(Debug, Clone)]
pub(crate) enum HeldSlot {
    Reserved,
    Card(Card),
}

impl GameFlowService {
    pub fn new(store: Arc<dyn GameStore>, config: FlowConfig) -> Self {
        Self {
            store,
            config,
            held: Arc::new(Mutex::new(HashMap::new())),
            jobs: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// The card the player currently holds, if any.
    pub fn held_card(&self, game_id: GameId, player_id: PlayerId) -> Option<Card> {
        match self.held.lock().get(&(game_id, player_id)) {
            Some(HeldSlot::Card(card)) => Some(card.clone()),
            _ => None,
        }
    }
}
