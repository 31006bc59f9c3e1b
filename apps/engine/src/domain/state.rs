//! The shared game document and its container types.
//!
//! `Game` is the single shared mutable resource of the whole system. Pure
//! transition functions (see `transitions`) compute successor documents in
//! memory; the store layer writes them back atomically.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::{Ability, Card, CardId};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

pub type GameId = Uuid;
pub type PlayerId = Uuid;

/// Grids are always 3 columns wide; game mode picks the row count.
pub const GRID_COLS: usize = 3;

/// Overall game progression states.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Dealt, but the round has not opened; clients may peek locally.
    Starting,
    /// Normal turn-taking play.
    Playing,
    /// A discarded ability card is waiting for its target.
    AwaitingAbilityTarget,
    /// Stop has been called; the round is frozen until the grace window
    /// elapses.
    Ending,
    /// Scores and winner are final and never recomputed.
    Finished,
}

/// Zero-indexed grid cell address: `row < game_mode / 3`, `col < 3`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A player's n×3 matrix of card-or-empty cells. Dimensions are fixed at
/// deal time; vacated cells stay empty for the rest of the round.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cells: Vec<Option<Card>>,
}

impl Grid {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            cells: vec![None; rows * GRID_COLS],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < GRID_COLS
    }

    fn index(&self, pos: GridPos) -> Result<usize, DomainError> {
        if !self.contains(pos) {
            return Err(DomainError::validation(
                ValidationKind::InvalidPosition,
                format!(
                    "position ({}, {}) outside {}x{} grid",
                    pos.row, pos.col, self.rows, GRID_COLS
                ),
            ));
        }
        Ok(pos.row * GRID_COLS + pos.col)
    }

    pub fn cell(&self, pos: GridPos) -> Result<Option<&Card>, DomainError> {
        Ok(self.cells[self.index(pos)?].as_ref())
    }

    pub fn cell_mut(&mut self, pos: GridPos) -> Result<Option<&mut Card>, DomainError> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx].as_mut())
    }

    /// Remove and return the occupant, leaving the cell empty.
    pub fn take(&mut self, pos: GridPos) -> Result<Option<Card>, DomainError> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx].take())
    }

    /// Place a card into a cell, returning any previous occupant.
    pub fn put(&mut self, pos: GridPos, card: Card) -> Result<Option<Card>, DomainError> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx].replace(card))
    }

    /// Flip every occupant face up (end-game reveal).
    pub fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.face_up = true;
        }
    }

    /// Iterate occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (GridPos, &Card)> {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.as_ref()
                .map(|card| (GridPos::new(i / GRID_COLS, i % GRID_COLS), card))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub grid: Grid,
    /// Valid only once the game is Finished.
    pub score: Option<i32>,
    pub is_host: bool,
    pub is_current_turn: bool,
    pub has_called_stop: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, grid: Grid) -> Self {
        Self {
            id,
            name: name.into(),
            grid,
            score: None,
            is_host: false,
            is_current_turn: false,
            has_called_stop: false,
        }
    }
}

/// The pending ability sub-state: which ability, whose discard triggered
/// it, and the card that carried it. Non-None iff status is
/// AwaitingAbilityTarget.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ActiveAbility {
    pub player_id: PlayerId,
    pub ability: Ability,
    pub card_id: CardId,
}

/// The authoritative game document.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub room_code: String,
    /// Turn order is list order and wraps.
    pub players: Vec<Player>,
    pub current_player_index: usize,
    /// Draw from the head (index 0).
    pub deck: Vec<Card>,
    /// Most recent discard at the head (index 0).
    pub discard_pile: Vec<Card>,
    /// Total cells per player; multiple of 3 in 6..=30.
    pub game_mode: u8,
    pub status: GameStatus,
    pub active_ability: Option<ActiveAbility>,
    pub winner: Option<PlayerId>,
}

impl Game {
    pub fn rows(&self) -> usize {
        self.game_mode as usize / GRID_COLS
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, DomainError> {
        self.players.iter().find(|p| p.id == id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {id} not in game"))
        })
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players.iter_mut().find(|p| p.id == id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {id} not in game"))
        })
    }

    pub fn player_index(&self, id: PlayerId) -> Result<usize, DomainError> {
        self.players.iter().position(|p| p.id == id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {id} not in game"))
        })
    }

    pub fn current_player(&self) -> Result<&Player, DomainError> {
        self.players.get(self.current_player_index).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::Other("current_player_index".into()),
                format!(
                    "current_player_index {} out of range for {} players",
                    self.current_player_index,
                    self.players.len()
                ),
            )
        })
    }

    /// Point the turn at `index` and recompute every `is_current_turn`
    /// flag so exactly one player carries it.
    pub fn set_current_index(&mut self, index: usize) {
        self.current_player_index = index;
        for (i, player) in self.players.iter_mut().enumerate() {
            player.is_current_turn = i == index;
        }
    }

    /// Rotate the turn to the next player in list order, wrapping.
    pub fn advance_turn(&mut self) {
        let next = (self.current_player_index + 1) % self.player_count();
        self.set_current_index(next);
    }

    /// Drop every turn flag; used when the game finishes.
    pub fn clear_turn_flags(&mut self) {
        for player in &mut self.players {
            player.is_current_turn = false;
        }
    }

    pub fn discard_head(&self) -> Option<&Card> {
        self.discard_pile.first()
    }
}

/// Validate a game mode and return the row count it implies.
pub fn rows_for_game_mode(game_mode: u8) -> Result<usize, DomainError> {
    if game_mode % GRID_COLS as u8 != 0 || !(6..=30).contains(&game_mode) {
        return Err(DomainError::validation(
            ValidationKind::InvalidGameMode,
            format!("game mode {game_mode} must be a multiple of 3 in 6..=30"),
        ));
    }
    Ok(game_mode as usize / GRID_COLS)
}
