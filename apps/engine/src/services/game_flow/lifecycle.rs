//! Game creation and the deferred, idempotent lifecycle transitions.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{GameFlowService, HeldSlot, JobKind};
use crate::domain::dealing::deal;
use crate::domain::deck::create_deck;
use crate::domain::state::{Game, GameId, GameStatus, Player, PlayerId};
use crate::domain::transitions;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::services::game_flow::mutation::commit_if_applied;
use crate::store::Versioned;
use crate::util::room_code::generate_room_code;

/// End-game wrapper for the deferred finish job. Any card still held when
/// the end-game fires is surrendered face up to the discard pile first, so
/// the finished document keeps every card it was dealt. The surrender is
/// recomputed from the registry on every retry; entries are removed only
/// after the commit lands (see `spawn_job`).
fn finish_with_surrender(
    game: &mut Game,
    held: &Mutex<HashMap<(GameId, PlayerId), HeldSlot>>,
) -> Result<bool, DomainError> {
    if game.status == GameStatus::Ending {
        let held = held.lock();
        for ((game_id, player_id), slot) in held.iter() {
            if *game_id != game.id {
                continue;
            }
            if let HeldSlot::Card(card) = slot {
                debug!(%game_id, %player_id, card_id = %card.id, "surrendering outstanding held card");
                let mut card = card.clone();
                card.face_up = true;
                game.discard_pile.insert(0, card);
            }
        }
    }
    transitions::finish_game(game)
}

/// Setup for a new game. The first player listed is the host and opens the
/// turn order.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub players: Vec<(PlayerId, String)>,
    /// Cells per player; multiple of 3 in 6..=30.
    pub game_mode: u8,
    /// Defaults to `2 * player_count`.
    pub number_of_decks: Option<usize>,
    /// Shuffle seed; defaults to entropy. Tests pass a fixed one.
    pub seed: Option<u64>,
}

impl GameFlowService {
    /// Deal and persist a new game in Starting, then schedule the deferred
    /// Starting -> Playing transition after the start grace window.
    pub async fn create_game(&self, setup: NewGame) -> Result<Versioned<Game>, DomainError> {
        if setup.players.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::InvalidPlayerCount,
                "a game needs at least two players",
            ));
        }

        let seed = setup.seed.unwrap_or_else(|| {
            use rand::Rng;
            rand::rng().random()
        });
        let number_of_decks = setup
            .number_of_decks
            .unwrap_or_else(|| 2 * setup.players.len());

        let player_ids: Vec<PlayerId> = setup.players.iter().map(|(id, _)| *id).collect();
        let mut deck = create_deck(number_of_decks, seed);
        let grids = deal(&mut deck, &player_ids, setup.game_mode)?;

        let players: Vec<Player> = grids
            .into_iter()
            .zip(setup.players.iter())
            .enumerate()
            .map(|(i, ((id, grid), (_, name)))| {
                let mut player = Player::new(id, name.clone(), grid);
                player.is_host = i == 0;
                player
            })
            .collect();

        let mut game = Game {
            id: Uuid::new_v4(),
            room_code: generate_room_code(),
            players,
            current_player_index: 0,
            deck,
            discard_pile: Vec::new(),
            game_mode: setup.game_mode,
            status: GameStatus::Starting,
            active_ability: None,
            winner: None,
        };
        game.set_current_index(0);

        let stored = self.store.create(game).await?;
        info!(
            game_id = %stored.doc.id,
            room_code = %stored.doc.room_code,
            players = stored.doc.players.len(),
            game_mode = setup.game_mode,
            number_of_decks,
            "game created"
        );

        self.schedule_start(stored.doc.id);
        Ok(stored)
    }

    /// Schedule the Starting -> Playing transition. Deduplicated per game;
    /// a reconnecting client calling this again is a no-op, and the
    /// transition itself is idempotent if the job fires late or twice.
    pub fn schedule_start(&self, game_id: GameId) {
        self.spawn_job(
            game_id,
            JobKind::Start,
            self.config.start_grace,
            transitions::begin_play,
        );
    }

    /// Schedule the Ending -> Finished transition. Outstanding held cards
    /// are surrendered to the discard pile as part of the finish commit.
    pub fn schedule_finish(&self, game_id: GameId) {
        let held = self.held.clone();
        self.spawn_job(
            game_id,
            JobKind::Finish,
            self.config.ending_grace,
            move |game| finish_with_surrender(game, &held),
        );
    }

    /// Cancel any pending deferred transitions for a game.
    pub fn cancel_jobs(&self, game_id: GameId) {
        for kind in [JobKind::Start, JobKind::Finish] {
            if let Some((_, token)) = self.jobs.remove(&(game_id, kind)) {
                token.cancel();
            }
        }
    }

    fn spawn_job<F>(&self, game_id: GameId, kind: JobKind, delay: Duration, apply: F)
    where
        F: Fn(&mut Game) -> Result<bool, DomainError> + Send + Sync + 'static,
    {
        use dashmap::mapref::entry::Entry;
        let token = match self.jobs.entry((game_id, kind)) {
            Entry::Occupied(_) => {
                debug!(%game_id, ?kind, "deferred transition already scheduled");
                return;
            }
            Entry::Vacant(vacant) => {
                let token = CancellationToken::new();
                vacant.insert(token.clone());
                token
            }
        };

        let store = self.store.clone();
        let retries = self.config.max_commit_retries;
        let jobs = self.jobs.clone();
        let held = self.held.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(%game_id, ?kind, "deferred transition cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    match commit_if_applied(&store, retries, game_id, apply).await {
                        Ok(true) => {
                            info!(%game_id, ?kind, "deferred transition applied");
                            // A finished game has no held cards; any
                            // surrendered ones are in the document now.
                            if kind == JobKind::Finish {
                                held.lock().retain(|(gid, _), _| *gid != game_id);
                            }
                        }
                        Ok(false) => {
                            debug!(%game_id, ?kind, "deferred transition was already applied");
                        }
                        Err(err) => {
                            warn!(%game_id, ?kind, %err, "deferred transition failed");
                        }
                    }
                }
            }
            jobs.remove(&(game_id, kind));
        });
    }
}
