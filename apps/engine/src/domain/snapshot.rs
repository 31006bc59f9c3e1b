//! The serialized document shape and the single defensive ingestion pass.
//!
//! Everything the store persists or transports goes through these types.
//! Stored cards may arrive with missing or stale fields; coercion happens
//! here, once, using the rank-derived tables from `cards`, and is never
//! scattered through transitions. Irrecoverable cards become a clearly
//! marked `Rank::Unknown` placeholder with a diagnostic instead of
//! crashing.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::cards::{point_value, Ability, Card, CardId, Rank, Suit};
use crate::domain::state::{
    rows_for_game_mode, ActiveAbility, Game, GameId, GameStatus, Grid, GridPos, Player, PlayerId,
    GRID_COLS,
};
use crate::errors::domain::DomainError;

/// Wire shape of a card. Every field a partial or legacy writer might omit
/// is optional; `value` is carried for readers but is never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSnapshot {
    #[serde(default)]
    pub id: Option<CardId>,
    #[serde(default)]
    pub suit: Option<Suit>,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub special_ability: Option<Ability>,
    #[serde(default)]
    pub face_up: bool,
}

impl From<&Card> for CardSnapshot {
    fn from(card: &Card) -> Self {
        Self {
            id: Some(card.id),
            suit: card.suit,
            rank: Some(card.rank),
            value: Some(card.value()),
            special_ability: card.ability(),
            face_up: card.face_up,
        }
    }
}

/// Reconstruct a rank from a stored scoring value, where unambiguous.
/// 15 maps to J, Q, and K alike, so it cannot be recovered.
fn rank_from_value(value: i32) -> Option<Rank> {
    match value {
        -1 => Some(Rank::Joker),
        0 => Some(Rank::Ten),
        1 => Some(Rank::Ace),
        2 => Some(Rank::Two),
        3 => Some(Rank::Three),
        4 => Some(Rank::Four),
        5 => Some(Rank::Five),
        6 => Some(Rank::Six),
        7 => Some(Rank::Seven),
        8 => Some(Rank::Eight),
        9 => Some(Rank::Nine),
        _ => None,
    }
}

/// Coerce a stored card into a valid domain card. Missing rank is
/// reconstructed from the stored value when that is unambiguous; a missing
/// id gets a fresh one; a stored value that disagrees with the rank is
/// discarded in favor of the derived one.
pub fn coerce_card(snapshot: &CardSnapshot) -> Card {
    let rank = match (snapshot.rank, snapshot.value) {
        (Some(rank), _) => rank,
        (None, Some(value)) => rank_from_value(value).unwrap_or_else(|| {
            warn!(value, "stored card rank unrecoverable from value; substituting placeholder");
            Rank::Unknown
        }),
        (None, None) => {
            warn!("stored card has neither rank nor value; substituting placeholder");
            Rank::Unknown
        }
    };

    if let (Some(_), Some(stored)) = (snapshot.rank, snapshot.value) {
        if stored != point_value(rank) {
            warn!(
                ?rank,
                stored,
                derived = point_value(rank),
                "stored card value disagrees with rank; using derived value"
            );
        }
    }

    let id = snapshot.id.unwrap_or_else(|| {
        warn!(?rank, "stored card missing id; assigning a fresh one");
        Uuid::new_v4()
    });

    let suit = if rank == Rank::Joker || rank == Rank::Unknown {
        None
    } else {
        snapshot.suit
    };

    Card {
        id,
        suit,
        rank,
        face_up: snapshot.face_up,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAbilitySnapshot {
    pub player_id: PlayerId,
    pub ability: Ability,
    pub card_id: CardId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    /// Rows of cells, row-major, matching the game mode's shape.
    pub grid: Vec<Vec<Option<CardSnapshot>>>,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_current_turn: bool,
    #[serde(default)]
    pub has_called_stop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: GameId,
    pub room_code: String,
    pub players: Vec<PlayerSnapshot>,
    pub current_player_index: usize,
    pub deck: Vec<CardSnapshot>,
    pub discard_pile: Vec<CardSnapshot>,
    pub game_mode: u8,
    pub status: GameStatus,
    #[serde(default)]
    pub active_ability: Option<ActiveAbilitySnapshot>,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let players = game
            .players
            .iter()
            .map(|player| {
                let grid = (0..player.grid.rows())
                    .map(|row| {
                        (0..GRID_COLS)
                            .map(|col| {
                                player
                                    .grid
                                    .cell(GridPos::new(row, col))
                                    .ok()
                                    .flatten()
                                    .map(CardSnapshot::from)
                            })
                            .collect()
                    })
                    .collect();
                PlayerSnapshot {
                    id: player.id,
                    name: player.name.clone(),
                    grid,
                    score: player.score,
                    is_host: player.is_host,
                    is_current_turn: player.is_current_turn,
                    has_called_stop: player.has_called_stop,
                }
            })
            .collect();

        Self {
            id: game.id,
            room_code: game.room_code.clone(),
            players,
            current_player_index: game.current_player_index,
            deck: game.deck.iter().map(CardSnapshot::from).collect(),
            discard_pile: game.discard_pile.iter().map(CardSnapshot::from).collect(),
            game_mode: game.game_mode,
            status: game.status,
            active_ability: game.active_ability.map(|a| ActiveAbilitySnapshot {
                player_id: a.player_id,
                ability: a.ability,
                card_id: a.card_id,
            }),
            winner: game.winner,
        }
    }
}

/// Ingest a stored document into the typed shape. Grid dimensions come
/// from the game mode, never from the stored nesting; anything outside the
/// expected shape is dropped with a diagnostic.
pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<Game, DomainError> {
    let rows = rows_for_game_mode(snapshot.game_mode)?;

    let players = snapshot
        .players
        .iter()
        .map(|ps| {
            if ps.grid.len() != rows {
                warn!(
                    player = %ps.id,
                    stored_rows = ps.grid.len(),
                    rows,
                    "stored grid row count disagrees with game mode"
                );
            }
            let mut grid = Grid::new(rows);
            for (row, cells) in ps.grid.iter().take(rows).enumerate() {
                for (col, cell) in cells.iter().take(GRID_COLS).enumerate() {
                    if let Some(card) = cell {
                        // In-bounds by construction.
                        let _ = grid.put(GridPos::new(row, col), coerce_card(card));
                    }
                }
            }
            let mut player = Player::new(ps.id, ps.name.clone(), grid);
            player.score = ps.score;
            player.is_host = ps.is_host;
            player.is_current_turn = ps.is_current_turn;
            player.has_called_stop = ps.has_called_stop;
            player
        })
        .collect();

    let mut game = Game {
        id: snapshot.id,
        room_code: snapshot.room_code.clone(),
        players,
        current_player_index: snapshot.current_player_index,
        deck: snapshot.deck.iter().map(coerce_card).collect(),
        discard_pile: snapshot.discard_pile.iter().map(coerce_card).collect(),
        game_mode: snapshot.game_mode,
        status: snapshot.status,
        active_ability: snapshot.active_ability.as_ref().map(|a| ActiveAbility {
            player_id: a.player_id,
            ability: a.ability,
            card_id: a.card_id,
        }),
        winner: snapshot.winner,
    };

    // Turn flags are derived state and stored writers may disagree with
    // the index; normalize both here rather than trusting the snapshot.
    if !game.players.is_empty() {
        if game.current_player_index >= game.players.len() {
            warn!(
                game_id = %game.id,
                stored_index = game.current_player_index,
                players = game.players.len(),
                "stored current_player_index out of range; resetting to the first player"
            );
            game.current_player_index = 0;
        }
        if game.status == GameStatus::Finished {
            game.clear_turn_flags();
        } else {
            game.set_current_index(game.current_player_index);
        }
    }

    Ok(game)
}

pub fn to_snapshot(game: &Game) -> GameSnapshot {
    GameSnapshot::from(game)
}
