//! In-memory reference store.
//!
//! The shard entry lock of `DashMap` makes each commit's read-compare-write
//! atomic, which is all the CAS contract needs. Used by tests and as the
//! template for real backends.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::state::{Game, GameId};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::store::{ChangeNotice, GameStore, Versioned};

const WATCH_BUFFER: usize = 32;

#[derive(Default)]
pub struct MemoryStore {
    games: DashMap<GameId, Versioned<Game>>,
    watchers: DashMap<GameId, broadcast::Sender<ChangeNotice>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, game_id: GameId, version: u64) {
        if let Some(tx) = self.watchers.get(&game_id) {
            // Nobody listening is fine.
            let _ = tx.send(ChangeNotice { game_id, version });
        }
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create(&self, game: Game) -> Result<Versioned<Game>, DomainError> {
        let game_id = game.id;
        let stored = match self.games.entry(game_id) {
            Entry::Occupied(_) => {
                return Err(DomainError::conflict(
                    ConflictKind::GameExists,
                    format!("game {game_id} already exists"),
                ))
            }
            Entry::Vacant(vacant) => {
                let versioned = Versioned {
                    version: 1,
                    doc: game,
                };
                vacant.insert(versioned.clone());
                versioned
            }
        };
        self.notify(game_id, stored.version);
        Ok(stored)
    }

    async fn load(&self, game_id: GameId) -> Result<Versioned<Game>, DomainError> {
        self.games
            .get(&game_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Game, format!("game {game_id} not found"))
            })
    }

    async fn commit(
        &self,
        game_id: GameId,
        expected_version: u64,
        game: Game,
    ) -> Result<Versioned<Game>, DomainError> {
        let committed = match self.games.entry(game_id) {
            Entry::Vacant(_) => {
                return Err(DomainError::not_found(
                    NotFoundKind::Game,
                    format!("game {game_id} not found"),
                ))
            }
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                if current != expected_version {
                    debug!(
                        %game_id,
                        expected_version,
                        current,
                        "commit lost the race"
                    );
                    return Err(DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        format!(
                            "game was modified concurrently (expected version {expected_version}, \
                             actual {current}); re-fetch and retry"
                        ),
                    ));
                }
                let next = Versioned {
                    version: current + 1,
                    doc: game,
                };
                occupied.insert(next.clone());
                next
            }
        };
        self.notify(game_id, committed.version);
        Ok(committed)
    }

    fn subscribe(&self, game_id: GameId) -> broadcast::Receiver<ChangeNotice> {
        self.watchers
            .entry(game_id)
            .or_insert_with(|| broadcast::channel(WATCH_BUFFER).0)
            .subscribe()
    }
}
